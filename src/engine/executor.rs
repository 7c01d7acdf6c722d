//! Execution - apply a plan on the device and record the results in state

use anyhow::{Result, bail};
use colored::Colorize;
use declarative::{ExecuteOptions, ExecuteSummary, Plan, execute};

use crate::progress::{BarProgress, PromptConfirm};
use crate::project::Project;

/// Options for one `apply` or `destroy` run
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    /// Show the plan only
    pub dry_run: bool,
    /// Number of parallel jobs
    pub jobs: usize,
    /// Skip the confirmation prompt
    pub yes: bool,
    /// Verbose output
    pub verbose: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            jobs: 4,
            yes: false,
            verbose: false,
        }
    }
}

/// Apply `plan`, record every outcome in state and save it
///
/// State is saved even when some changes failed, so that objects which
/// did reach the device stay tracked.
pub fn apply(project: &mut Project, plan: Plan, opts: &ApplyOptions) -> Result<ExecuteSummary> {
    if !plan.has_changes() {
        return Ok(ExecuteSummary::default());
    }
    if opts.dry_run {
        println!();
        println!("  {} Dry run - no changes made", "ℹ".blue());
        return Ok(ExecuteSummary::default());
    }

    let client = project.client()?;
    let exec_opts = ExecuteOptions {
        dry_run: false,
        jobs: opts.jobs.max(1),
        verbose: opts.verbose,
    };
    let mut progress = BarProgress::new(opts.verbose);
    let mut confirm = PromptConfirm { yes: opts.yes };
    let execution = execute(
        plan,
        &project.registry,
        &client,
        &exec_opts,
        &mut progress,
        &mut confirm,
    )?;

    if execution.summary.skipped == execution.summary.total() {
        println!();
        println!("  {} Aborted", "✗".red());
        return Ok(execution.summary);
    }

    for outcome in &execution.outcomes {
        project.state.record(&project.registry, outcome)?;
    }
    project.save_state()?;
    log::info!("Saved state to {}", project.state_path().display());

    print_summary(&execution.summary);
    if !execution.summary.is_success() {
        bail!("{} change(s) failed", execution.summary.failed);
    }
    Ok(execution.summary)
}

fn print_summary(summary: &ExecuteSummary) {
    println!();
    if summary.is_success() {
        println!(
            "  {} Configuration applied successfully!",
            "✓".green().bold()
        );
    } else {
        println!(
            "  {} Configuration applied with errors",
            "⚠".yellow().bold()
        );
    }

    if summary.created > 0 {
        println!("    • {} resources created", summary.created);
    }
    if summary.updated > 0 {
        println!("    • {} resources updated", summary.updated);
    }
    if summary.replaced > 0 {
        println!("    • {} resources replaced", summary.replaced);
    }
    if summary.deleted > 0 {
        println!("    • {} resources destroyed", summary.deleted);
    }
    if summary.skipped > 0 {
        println!("    • {} resources skipped", summary.skipped);
    }
    if summary.failed > 0 {
        println!("    • {} {} failed", summary.failed, "resources".red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::planner;
    use crate::project::tests::write_project;
    use declarative::Address;
    use std::fs;

    const WEB: &str = "[resources.junos_application.web]\nname = \"web\"\nprotocol = \"tcp\"\ndestination_port = \"80\"\n";

    fn yes() -> ApplyOptions {
        ApplyOptions {
            yes: true,
            ..ApplyOptions::default()
        }
    }

    #[test]
    fn test_apply_creates_and_tracks() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_project(dir.path(), WEB);
        let mut project = Project::load(&path).unwrap();

        let plan = planner::plan(&project, None).unwrap();
        let summary = apply(&mut project, plan, &yes()).unwrap();
        assert_eq!(summary.created, 1);

        let device = fs::read_to_string(dir.path().join("router.set")).unwrap();
        assert!(device.contains("set applications application web protocol tcp"));

        let reloaded = Project::load(&path).unwrap();
        assert!(
            reloaded
                .state
                .get(&Address::new("junos_application", "web"))
                .is_some()
        );
        // a second plan finds nothing to do
        let plan = planner::plan(&reloaded, None).unwrap();
        assert!(!plan.has_changes());
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_project(dir.path(), WEB);
        let mut project = Project::load(&path).unwrap();

        let plan = planner::plan(&project, None).unwrap();
        let opts = ApplyOptions {
            dry_run: true,
            ..yes()
        };
        let summary = apply(&mut project, plan, &opts).unwrap();
        assert_eq!(summary.total(), 0);
        assert!(!dir.path().join("state.json").exists());
    }

    #[test]
    fn test_destroy_forgets() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_project(dir.path(), WEB);
        let mut project = Project::load(&path).unwrap();
        let plan = planner::plan(&project, None).unwrap();
        apply(&mut project, plan, &yes()).unwrap();

        let plan = Plan::destroy(&project.current(None));
        let summary = apply(&mut project, plan, &yes()).unwrap();
        assert_eq!(summary.deleted, 1);
        assert!(project.state.current().is_empty());
        let device = fs::read_to_string(dir.path().join("router.set")).unwrap();
        assert!(!device.contains("application web"));
    }
}
