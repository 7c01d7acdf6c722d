use anyhow::{Result, bail};

use crate::Context;
use crate::project::Project;
use crate::ui;

/// Re-read tracked resources and update state
///
/// Objects that disappeared from the device are dropped from state so the
/// next plan creates them again.
pub fn run(ctx: &Context, target: Option<&str>) -> Result<()> {
    let mut project = Project::load(&ctx.config)?;
    let current = project.current(target);
    if current.is_empty() {
        ui::info("No tracked resources");
        return Ok(());
    }

    let client = project.client()?;
    let (mut refreshed, mut gone, mut failed) = (0, 0, 0);
    for (address, prior) in &current {
        let handler = project.registry.get(&address.type_name)?;
        match handler.refresh(&client, prior) {
            Ok(Some(value)) => {
                project.state.track(&project.registry, address, value)?;
                refreshed += 1;
            }
            Ok(None) => {
                project.state.forget(address);
                ui::warn(&format!(
                    "{address} no longer exists on the device, removed from state"
                ));
                gone += 1;
            }
            Err(e) => {
                ui::error(&format!("{address}: {e}"));
                failed += 1;
            }
        }
    }
    project.save_state()?;

    ui::success(&format!("Refreshed {refreshed} resource(s)"));
    if gone > 0 {
        ui::dim(&format!("{gone} removed from state"));
    }
    if failed > 0 {
        bail!("{failed} resource(s) could not be refreshed");
    }
    Ok(())
}
