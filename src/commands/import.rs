use anyhow::{Context as _, Result, bail};

use crate::Context;
use crate::project::{Project, parse_address};
use crate::ui;

/// Adopt an existing device object into state
pub fn run(ctx: &Context, address: &str, id: &str) -> Result<()> {
    let mut project = Project::load(&ctx.config)?;
    let address = parse_address(address)?;
    if project.state.get(&address).is_some() {
        bail!("{address} is already tracked");
    }

    let handler = project.registry.get(&address.type_name)?;
    let client = project.client()?;
    let value = handler
        .import(&client, id)
        .with_context(|| format!("Failed to import {address} from {id:?}"))?;
    project.state.track(&project.registry, &address, value)?;
    project.save_state()?;

    ui::success(&format!("Imported {address} from {id:?}"));
    if !project.config.desired()?.contains_key(&address) {
        ui::warn(&format!(
            "{address} is not in the configuration, the next apply will destroy it"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::tests::write_project;
    use declarative::Address;
    use std::fs;

    #[test]
    fn test_import_policy_pair() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("router.set"),
            "set security policies from-zone trust to-zone untrust policy p1 match source-address any\n\
             set security policies from-zone trust to-zone untrust policy p1 match destination-address any\n\
             set security policies from-zone trust to-zone untrust policy p1 match application any\n\
             set security policies from-zone trust to-zone untrust policy p1 then permit\n",
        )
        .unwrap();
        let config = write_project(dir.path(), "");
        let ctx = Context::for_config(config.clone());

        run(&ctx, "junos_security_policy.outbound", "trust:untrust").unwrap();
        // tracked twice is refused
        assert!(run(&ctx, "junos_security_policy.outbound", "trust:untrust").is_err());

        let project = Project::load(&config).unwrap();
        let tracked = project
            .state
            .get(&Address::new("junos_security_policy", "outbound"))
            .unwrap();
        assert_eq!(tracked.identity, "trust:untrust");
        assert_eq!(tracked.attributes["policy"][0]["name"], "p1");
    }

    #[test]
    fn test_import_missing_object() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_project(dir.path(), "");
        let ctx = Context::for_config(config);
        assert!(run(&ctx, "junos_application.web", "web").is_err());
        assert!(run(&ctx, "junos_nothing.web", "web").is_err());
    }
}
