use anyhow::{Context as _, Result};

use crate::Context;
use crate::project::{Project, parse_address};
use crate::ui;

/// Show a tracked resource next to what the device holds for it
pub fn run(ctx: &Context, address: &str) -> Result<()> {
    let project = Project::load(&ctx.config)?;
    let address = parse_address(address)?;
    let tracked = project
        .state
        .get(&address)
        .with_context(|| format!("{address} is not tracked"))?;

    ui::header(&address.to_string());
    ui::kv("Type", &tracked.type_name);
    ui::kv("Identity", &tracked.identity);
    ui::kv("Updated", &tracked.updated.to_rfc3339());

    ui::section("State");
    println!("{}", serde_json::to_string_pretty(&tracked.attributes)?);

    ui::section("Device");
    let handler = project.registry.get(&address.type_name)?;
    let identity = handler.identity(&tracked.attributes)?;
    let client = project.client()?;
    match handler.read(&client, &identity)? {
        Some(value) => {
            for line in handler.render(&value)? {
                println!("  {line}");
            }
        }
        None => ui::warn("Not found on the device"),
    }
    Ok(())
}
