//! `apply` and `destroy`

use anyhow::Result;
use declarative::Plan;

use crate::Context;
use crate::cli::ApplyArgs;
use crate::engine::{self, ApplyOptions, planner};
use crate::project::Project;
use crate::ui;

fn options(ctx: &Context, args: &ApplyArgs) -> ApplyOptions {
    ApplyOptions {
        dry_run: args.dry_run,
        jobs: args.jobs,
        yes: args.yes,
        verbose: ctx.verbose > 0,
    }
}

/// Make the device match the configuration
pub fn apply(ctx: &Context, args: &ApplyArgs) -> Result<()> {
    let mut project = Project::load(&ctx.config)?;
    let plan = planner::plan(&project, args.target.as_deref())?;
    engine::display_plan(&plan, &project.registry, ctx.verbose > 0);
    engine::apply(&mut project, plan, &options(ctx, args))?;
    Ok(())
}

/// Delete every tracked resource matching the target
pub fn destroy(ctx: &Context, args: &ApplyArgs) -> Result<()> {
    let mut project = Project::load(&ctx.config)?;
    let current = project.current(args.target.as_deref());
    if current.is_empty() {
        ui::info("No tracked resources to destroy");
        return Ok(());
    }
    let plan = Plan::destroy(&current);
    engine::display_plan(&plan, &project.registry, ctx.verbose > 0);
    engine::apply(&mut project, plan, &options(ctx, args))?;
    Ok(())
}
