use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "junosform")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declarative Junos configuration over set lines", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "JUNOSFORM_CONFIG",
        default_value = "junosform.toml"
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check every configured resource without touching the device
    Validate,

    /// Show what apply would change
    Plan(TargetArgs),

    /// Make the device match the configuration
    Apply(ApplyArgs),

    /// Delete every tracked resource from the device
    Destroy(ApplyArgs),

    /// Re-read tracked resources from the device
    Refresh(TargetArgs),

    /// Adopt an existing device object into state
    Import {
        /// Resource address (type.label)
        address: String,

        /// Import ID, e.g. `app1` or `trust:untrust`
        id: String,
    },

    /// Show a tracked resource and its device configuration
    Show {
        /// Resource address (type.label)
        address: String,
    },

    /// Print the set lines of configured resources
    Render(TargetArgs),

    /// Describe resource schemas
    Schema {
        /// Resource type (all types when omitted)
        type_name: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
pub struct TargetArgs {
    /// Only this resource type or address (type or type.label)
    #[arg(short, long)]
    pub target: Option<String>,
}

#[derive(Parser)]
pub struct ApplyArgs {
    /// Only this resource type or address (type or type.label)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Show the plan without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Number of resources applied in parallel
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_apply_flags() {
        let cli = Cli::parse_from([
            "junosform",
            "-vv",
            "--config",
            "lab.toml",
            "apply",
            "--target",
            "junos_application",
            "--jobs",
            "2",
            "--yes",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, PathBuf::from("lab.toml"));
        match cli.command {
            Command::Apply(args) => {
                assert_eq!(args.target.as_deref(), Some("junos_application"));
                assert_eq!(args.jobs, 2);
                assert!(args.yes);
                assert!(!args.dry_run);
            }
            _ => panic!("expected apply"),
        }
    }

    #[test]
    fn test_import_args() {
        let cli = Cli::parse_from([
            "junosform",
            "import",
            "junos_security_policy.lan_wan",
            "trust:untrust",
        ]);
        match cli.command {
            Command::Import { address, id } => {
                assert_eq!(address, "junos_security_policy.lan_wan");
                assert_eq!(id, "trust:untrust");
            }
            _ => panic!("expected import"),
        }
    }
}
