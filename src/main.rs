mod cli;
mod commands;
mod config;
mod engine;
mod progress;
mod project;
mod resource;
mod state;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::borrow::Cow;
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub config: PathBuf,
}

#[cfg(test)]
impl Context {
    pub fn for_config(config: PathBuf) -> Self {
        Self {
            verbose: 0,
            quiet: true,
            config,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let raw = cli.config.to_string_lossy().into_owned();
    let config = PathBuf::from(
        shellexpand::full(&raw)
            .unwrap_or(Cow::Borrowed(raw.as_str()))
            .as_ref(),
    );
    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config,
    };

    match cli.command {
        Command::Validate => commands::validate::run(&ctx),
        Command::Plan(args) => commands::plan::run(&ctx, args.target.as_deref()),
        Command::Apply(args) => commands::apply::apply(&ctx, &args),
        Command::Destroy(args) => commands::apply::destroy(&ctx, &args),
        Command::Refresh(args) => commands::refresh::run(&ctx, args.target.as_deref()),
        Command::Import { address, id } => commands::import::run(&ctx, &address, &id),
        Command::Show { address } => commands::show::run(&ctx, &address),
        Command::Render(args) => commands::render::run(&ctx, args.target.as_deref()),
        Command::Schema { type_name, json } => commands::schema::run(type_name.as_deref(), json),
        Command::Completions { shell } => {
            generate(shell, &mut Cli::command(), "junosform", &mut io::stdout());
            Ok(())
        }
    }
}
