//! Planning - validate configured resources and compare them with state

use anyhow::{Result, bail};
use colored::Colorize;
use declarative::{Address, Diagnostics, Plan, Registry, summary};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use crate::project::Project;
use crate::ui;

/// Validate every configured resource
///
/// Returns only resources with findings. Two labels of one type that
/// resolve to the same device identity are reported as duplicates.
pub fn validate(
    registry: &Registry,
    desired: &BTreeMap<Address, Value>,
) -> Vec<(Address, Diagnostics)> {
    let mut findings = Vec::new();
    let mut identities: HashMap<(String, String), &Address> = HashMap::new();

    for (address, config) in desired {
        let mut diags = Diagnostics::new();
        match registry.get(&address.type_name) {
            Err(e) => diags.error("Unknown Resource Type", e.to_string()),
            Ok(handler) => {
                diags.extend(handler.validate(config));
                if !diags.has_errors()
                    && let Ok(identity) = handler.identity(config)
                {
                    let key = (address.type_name.clone(), identity.to_string());
                    if let Some(first) = identities.insert(key, address) {
                        diags.error(
                            summary::DUPLICATE,
                            format!("{address} and {first} manage the same object {identity}"),
                        );
                    }
                }
            }
        }
        if !diags.is_empty() {
            findings.push((address.clone(), diags));
        }
    }
    findings
}

/// Print findings grouped by resource
pub fn display_findings(findings: &[(Address, Diagnostics)]) {
    for (address, diags) in findings {
        println!();
        println!("  {}", address.to_string().bold());
        for d in diags.iter() {
            ui::diagnostic(d);
        }
    }
}

/// Build the plan for `target`, refusing invalid configuration
pub fn plan(project: &Project, target: Option<&str>) -> Result<Plan> {
    let desired = project.desired(target)?;
    let findings = validate(&project.registry, &desired);
    let invalid = findings.iter().filter(|(_, d)| d.has_errors()).count();
    if invalid > 0 {
        display_findings(&findings);
        println!();
        bail!("{invalid} resource(s) have invalid configuration");
    }
    let plan = Plan::build(&project.registry, &desired, &project.current(target))?;
    log::debug!("Planned {} change(s)", plan.summary().total());
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource;
    use serde_json::json;

    #[test]
    fn test_validate_reports_per_resource() {
        let registry = resource::registry();
        let mut desired = BTreeMap::new();
        desired.insert(
            Address::new("junos_application", "ok"),
            json!({ "name": "app1", "protocol": "tcp" }),
        );
        desired.insert(
            Address::new("junos_application", "bad"),
            json!({ "name": "app2", "inactivity_timeout": 300, "inactivity_timeout_never": true }),
        );
        desired.insert(Address::new("junos_vlan", "v10"), json!({ "name": "v10" }));

        let findings = validate(&registry, &desired);
        let flagged: Vec<String> = findings.iter().map(|(a, _)| a.to_string()).collect();
        assert_eq!(flagged, vec!["junos_application.bad", "junos_vlan.v10"]);
        assert!(findings.iter().all(|(_, d)| d.has_errors()));
    }

    #[test]
    fn test_validate_same_identity_twice() {
        let registry = resource::registry();
        let mut desired = BTreeMap::new();
        desired.insert(
            Address::new("junos_application", "a"),
            json!({ "name": "app1", "protocol": "tcp" }),
        );
        desired.insert(
            Address::new("junos_application", "b"),
            json!({ "name": "app1", "protocol": "udp" }),
        );
        let findings = validate(&registry, &desired);
        assert_eq!(findings.len(), 1);
        assert!(
            findings[0]
                .1
                .errors()
                .any(|d| d.summary == summary::DUPLICATE)
        );
    }
}
