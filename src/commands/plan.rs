use anyhow::Result;

use crate::Context;
use crate::engine::{self, planner};
use crate::project::Project;

pub fn run(ctx: &Context, target: Option<&str>) -> Result<()> {
    let project = Project::load(&ctx.config)?;
    let plan = planner::plan(&project, target)?;
    engine::display_plan(&plan, &project.registry, ctx.verbose > 0);
    Ok(())
}
