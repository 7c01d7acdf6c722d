use anyhow::{Result, bail};

use crate::Context;
use crate::engine::planner;
use crate::project::Project;
use crate::ui;

pub fn run(ctx: &Context) -> Result<()> {
    let project = Project::load(&ctx.config)?;
    let desired = project.desired(None)?;
    let findings = planner::validate(&project.registry, &desired);

    if findings.is_empty() {
        ui::success(&format!("{} resource(s) valid", desired.len()));
        return Ok(());
    }

    planner::display_findings(&findings);
    println!();
    let invalid = findings.iter().filter(|(_, d)| d.has_errors()).count();
    if invalid > 0 {
        bail!("{invalid} of {} resource(s) invalid", desired.len());
    }
    ui::warn(&format!("{} resource(s) valid with warnings", desired.len()));
    Ok(())
}
