//! Progress bar and confirmation prompt for plan execution.

use anyhow::{Context, Result};
use colored::Colorize;
use declarative::{Action, ChangeResult, ConfirmCallback, ProgressCallback};
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}";

fn style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-")
}

/// Reports each change on an indicatif bar.
pub struct BarProgress {
    pb: ProgressBar,
    verbose: bool,
}

impl BarProgress {
    pub fn new(verbose: bool) -> Self {
        Self {
            pb: ProgressBar::hidden(),
            verbose,
        }
    }
}

impl ProgressCallback for BarProgress {
    fn on_start(&mut self, count: usize) {
        self.pb = ProgressBar::new(count as u64);
        self.pb.set_style(style());
        self.pb.set_message("Applying");
    }

    fn on_change_start(&mut self, address: &str, action: Action) {
        if self.verbose {
            self.pb.println(format!("  {} {} {}", "→".cyan(), action.verb(), address));
        }
    }

    fn on_change_complete(&mut self, address: &str, result: &ChangeResult) {
        let symbol = match result {
            ChangeResult::NoChange => "○".dimmed(),
            ChangeResult::Created
            | ChangeResult::Updated
            | ChangeResult::Replaced
            | ChangeResult::Deleted => "✓".green(),
            ChangeResult::Failed { .. } => "✗".red(),
            ChangeResult::Skipped { .. } => "⊘".yellow(),
        };
        if let ChangeResult::Failed { error } = result {
            self.pb.println(format!("  {symbol} {address}: {error}"));
        }
        self.pb.set_message(format!("{symbol} {address}"));
        self.pb.inc(1);
    }

    fn on_finish(&mut self) {
        self.pb.finish_and_clear();
    }
}

/// Asks on the terminal unless `--yes` was given.
pub struct PromptConfirm {
    pub yes: bool,
}

impl ConfirmCallback for PromptConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        if self.yes {
            return Ok(true);
        }
        println!();
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .context("Failed to read confirmation")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yes_skips_prompt() {
        let mut confirm = PromptConfirm { yes: true };
        assert!(confirm.confirm("Apply 3 change(s)?").unwrap());
    }

    #[test]
    fn test_bar_counts_changes() {
        let mut progress = BarProgress::new(false);
        progress.on_start(2);
        progress.on_change_start("junos_application.web", Action::Create);
        progress.on_change_complete("junos_application.web", &ChangeResult::Created);
        progress.on_change_complete(
            "junos_application.dns",
            &ChangeResult::Failed {
                error: "boom".to_string(),
            },
        );
        assert_eq!(progress.pb.position(), 2);
        progress.on_finish();
    }
}
