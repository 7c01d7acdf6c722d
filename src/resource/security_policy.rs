//! `junos_security_policy`: `security policies from-zone <a> to-zone <b>`
//!
//! One resource owns every policy of a zone pair, so its identity has two
//! fields and imports use `<from_zone>:<to_zone>`.

use super::is_false;
use declarative::{
    AttrKind, AttrPath, Attribute, BlockSchema, Diagnostics, Identity, ImportFormat, NameFormat,
    RenderError, Resource, Schema, require_one_of, summary,
};
use junos::cmd::show_config;
use serde::{Deserialize, Serialize};
use serde_json::json;
use setline::{
    Keyed, KeywordTable, Renderer, Snapshot, delete_line, find_duplicate, merge_line, required,
    text_value, word,
};
use std::sync::LazyLock;

const PERMIT: &str = "permit";

/// Policies applied to traffic from one zone to another.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityPolicy {
    pub from_zone: String,
    pub to_zone: String,
    pub policy: Vec<Policy>,
}

/// One `policy` entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub name: String,
    pub match_source_address: Vec<String>,
    pub match_destination_address: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub match_source_address_excluded: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub match_destination_address_excluded: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub match_application: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub match_dynamic_application: Vec<String>,
    pub then: String,
    #[serde(skip_serializing_if = "is_false")]
    pub count: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub log_init: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub log_close: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permit_tunnel_ipsec_vpn: Option<String>,
}

impl Keyed for Policy {
    fn key(&self) -> &str {
        &self.name
    }

    fn with_key(key: String) -> Self {
        Self {
            name: key,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Field {
    SourceAddress,
    DestinationAddress,
    SourceAddressExcluded,
    DestinationAddressExcluded,
    Application,
    DynamicApplication,
    Then,
    Count,
    LogInit,
    LogClose,
    PermitTunnel,
}

static FIELDS: LazyLock<KeywordTable<Field>> = LazyLock::new(|| {
    KeywordTable::new(&[
        ("match source-address", Field::SourceAddress),
        ("match destination-address", Field::DestinationAddress),
        ("match source-address-excluded", Field::SourceAddressExcluded),
        ("match destination-address-excluded", Field::DestinationAddressExcluded),
        ("match application", Field::Application),
        ("match dynamic-application", Field::DynamicApplication),
        ("then", Field::Then),
        ("then count", Field::Count),
        ("then log session-init", Field::LogInit),
        ("then log session-close", Field::LogClose),
        ("then permit tunnel ipsec-vpn", Field::PermitTunnel),
    ])
});

impl Policy {
    fn render(&self, r: &mut Renderer) {
        r.words("match source-address", &self.match_source_address);
        r.words("match destination-address", &self.match_destination_address);
        r.flag("match source-address-excluded", self.match_source_address_excluded);
        r.flag(
            "match destination-address-excluded",
            self.match_destination_address_excluded,
        );
        r.words("match application", &self.match_application);
        r.words("match dynamic-application", &self.match_dynamic_application);
        // the tunnel statement implies the bare permit
        match &self.permit_tunnel_ipsec_vpn {
            Some(vpn) => r.word("then permit tunnel ipsec-vpn", Some(vpn)),
            None => r.word("then", Some(&self.then)),
        }
        r.flag("then count", self.count);
        r.flag("then log session-init", self.log_init);
        r.flag("then log session-close", self.log_close);
    }

    fn read_line(&mut self, line: &str) -> setline::Result<()> {
        let Some((field, value)) = FIELDS.lookup(line) else {
            return Ok(());
        };
        let list = |keyword: &str| required(keyword, value).map(text_value);
        match field {
            Field::SourceAddress => self.match_source_address.push(list("source-address")?),
            Field::DestinationAddress => {
                self.match_destination_address.push(list("destination-address")?);
            }
            Field::SourceAddressExcluded => self.match_source_address_excluded = true,
            Field::DestinationAddressExcluded => self.match_destination_address_excluded = true,
            Field::Application => self.match_application.push(list("application")?),
            Field::DynamicApplication => {
                self.match_dynamic_application.push(list("dynamic-application")?);
            }
            Field::Then => {
                // `then permit application-services ...` and similar keep only the action
                let action = required("then", value)?;
                self.then = action.split(' ').next().unwrap_or(action).to_string();
            }
            Field::Count => self.count = true,
            Field::LogInit => self.log_init = true,
            Field::LogClose => self.log_close = true,
            Field::PermitTunnel => {
                self.permit_tunnel_ipsec_vpn = Some(list("ipsec-vpn")?);
                self.then = PERMIT.to_string();
            }
        }
        Ok(())
    }

    fn validate(&self, path: &AttrPath, diags: &mut Diagnostics) {
        for (attr, values) in [
            ("match_source_address", &self.match_source_address),
            ("match_destination_address", &self.match_destination_address),
        ] {
            if values.is_empty() {
                diags.error_at(
                    path.join(attr),
                    summary::MISSING,
                    format!("\"{}\" needs at least one address", path.join(attr)),
                );
            }
        }
        require_one_of(
            diags,
            path,
            &[
                ("match_application", !self.match_application.is_empty()),
                (
                    "match_dynamic_application",
                    !self.match_dynamic_application.is_empty(),
                ),
            ],
        );
        if self.permit_tunnel_ipsec_vpn.is_some() && self.then != PERMIT {
            diags.error_at(
                path.join("permit_tunnel_ipsec_vpn"),
                summary::CONFLICT,
                format!("\"{}\" only applies when then is {PERMIT}", path.join("permit_tunnel_ipsec_vpn")),
            );
        }
    }
}

fn prefix(from_zone: &str, to_zone: &str) -> String {
    format!(
        "security policies from-zone {} to-zone {}",
        word(from_zone),
        word(to_zone)
    )
}

impl Resource for SecurityPolicy {
    const TYPE_NAME: &'static str = "junos_security_policy";
    const IMPORT_FORMAT: ImportFormat = ImportFormat::new(&["from_zone", "to_zone"]);

    fn schema() -> Schema {
        let addresses = |name: &'static str, description: &'static str| {
            Attribute::required(name, AttrKind::StringList).describe(description)
        };
        Schema::new(0)
            .describe("Provides a security policy resource.")
            .attribute(
                Attribute::required("from_zone", AttrKind::String)
                    .describe("The name of source zone.")
                    .length(1, 63)
                    .format(NameFormat::Default)
                    .requires_replace(),
            )
            .attribute(
                Attribute::required("to_zone", AttrKind::String)
                    .describe("The name of destination zone.")
                    .length(1, 63)
                    .format(NameFormat::Default)
                    .requires_replace(),
            )
            .block(
                BlockSchema::list("policy")
                    .describe("Define a security policy.")
                    .keyed_by("name")
                    .min_items(1)
                    .attribute(
                        Attribute::required("name", AttrKind::String)
                            .describe("Security policy name.")
                            .length(1, 63)
                            .format(NameFormat::Default),
                    )
                    .attribute(addresses(
                        "match_source_address",
                        "List of source address match.",
                    ))
                    .attribute(addresses(
                        "match_destination_address",
                        "List of destination address match.",
                    ))
                    .attribute(
                        Attribute::optional("match_source_address_excluded", AttrKind::Bool)
                            .describe("Exclude source addresses."),
                    )
                    .attribute(
                        Attribute::optional("match_destination_address_excluded", AttrKind::Bool)
                            .describe("Exclude destination addresses."),
                    )
                    .attribute(
                        Attribute::optional("match_application", AttrKind::StringSet)
                            .describe("List of applications match."),
                    )
                    .attribute(
                        Attribute::optional("match_dynamic_application", AttrKind::StringSet)
                            .describe("List of dynamic application or group match."),
                    )
                    .attribute(
                        Attribute::optional("then", AttrKind::String)
                            .describe("Action of policy.")
                            .one_of(&["permit", "reject", "deny"])
                            .default_value(json!(PERMIT)),
                    )
                    .attribute(
                        Attribute::optional("count", AttrKind::Bool)
                            .describe("Enable count."),
                    )
                    .attribute(
                        Attribute::optional("log_init", AttrKind::Bool)
                            .describe("Log at session init time."),
                    )
                    .attribute(
                        Attribute::optional("log_close", AttrKind::Bool)
                            .describe("Log at session close time."),
                    )
                    .attribute(
                        Attribute::optional("permit_tunnel_ipsec_vpn", AttrKind::String)
                            .describe("Name of vpn to permit with a tunnel.")
                            .length(1, 63),
                    ),
            )
    }

    fn identity(&self) -> Identity {
        Identity::new(vec![self.from_zone.clone(), self.to_zone.clone()])
    }

    fn validate(&self, diags: &mut Diagnostics) {
        let path = AttrPath::attr("policy");
        for (i, policy) in self.policy.iter().enumerate() {
            policy.validate(&path.index(i), diags);
        }
    }

    fn render(&self) -> Result<Vec<String>, RenderError> {
        if let Some(dup) = find_duplicate(&self.policy) {
            return Err(RenderError::duplicate(&AttrPath::root(), "policy", &dup));
        }
        let mut r = Renderer::set(&prefix(&self.from_zone, &self.to_zone));
        for policy in &self.policy {
            let mut block = r.block("policy", &policy.name);
            policy.render(&mut block);
            r.append(block);
        }
        Ok(r.into_lines())
    }

    fn show_command(identity: &Identity) -> String {
        show_config(&prefix(identity.field(0), identity.field(1)))
    }

    fn parse(identity: &Identity, snapshot: &Snapshot) -> setline::Result<Self> {
        let mut policies = Self {
            from_zone: identity.field(0).to_string(),
            to_zone: identity.field(1).to_string(),
            policy: Vec::new(),
        };
        for line in snapshot.lines() {
            if let Some(rest) = setline::take(line, "policy") {
                let (policy, rest) = merge_line(&mut policies.policy, rest)?;
                policy.read_line(rest)?;
            }
        }
        Ok(policies)
    }

    fn delete_lines(identity: &Identity) -> Vec<String> {
        vec![delete_line(&prefix(identity.field(0), identity.field(1)))]
    }
}
