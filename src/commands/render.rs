use anyhow::{Context as _, Result, bail};

use crate::Context;
use crate::engine::planner;
use crate::project::Project;

/// Print the set lines each configured resource renders to
pub fn run(ctx: &Context, target: Option<&str>) -> Result<()> {
    let project = Project::load(&ctx.config)?;
    let desired = project.desired(target)?;

    let findings = planner::validate(&project.registry, &desired);
    if findings.iter().any(|(_, d)| d.has_errors()) {
        planner::display_findings(&findings);
        println!();
        bail!("Cannot render invalid configuration");
    }

    for (address, config) in &desired {
        let handler = project.registry.get(&address.type_name)?;
        let lines = handler
            .render(config)
            .with_context(|| format!("Failed to render {address}"))?;
        if !ctx.quiet {
            println!("# {address}");
        }
        for line in lines {
            println!("{line}");
        }
    }
    Ok(())
}
