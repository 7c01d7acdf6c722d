//! `junos_security_ike_proposal`: `security ike proposal <name>`

use super::{int, text};
use declarative::{
    AttrKind, Attribute, Identity, ImportFormat, NameFormat, RenderError, Resource, Schema,
};
use junos::cmd::show_config;
use serde::{Deserialize, Serialize};
use serde_json::json;
use setline::{KeywordTable, Renderer, Snapshot, delete_line, word};
use std::sync::LazyLock;

const PATH: &str = "security ike proposal";

/// An IKE (phase 1) proposal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IkeProposal {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dh_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifetime_seconds: Option<i64>,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    AuthenticationAlgorithm,
    AuthenticationMethod,
    Description,
    DhGroup,
    EncryptionAlgorithm,
    LifetimeSeconds,
}

static FIELDS: LazyLock<KeywordTable<Field>> = LazyLock::new(|| {
    KeywordTable::new(&[
        ("authentication-algorithm", Field::AuthenticationAlgorithm),
        ("authentication-method", Field::AuthenticationMethod),
        ("description", Field::Description),
        ("dh-group", Field::DhGroup),
        ("encryption-algorithm", Field::EncryptionAlgorithm),
        ("lifetime-seconds", Field::LifetimeSeconds),
    ])
});

impl Resource for IkeProposal {
    const TYPE_NAME: &'static str = "junos_security_ike_proposal";
    const IMPORT_FORMAT: ImportFormat = ImportFormat::new(&["name"]);

    fn schema() -> Schema {
        Schema::new(0)
            .describe("Provides a security IKE proposal resource.")
            .attribute(
                Attribute::required("name", AttrKind::String)
                    .describe("The name of IKE proposal.")
                    .length(1, 32)
                    .format(NameFormat::Default)
                    .requires_replace(),
            )
            .attribute(
                Attribute::optional("authentication_algorithm", AttrKind::String)
                    .describe("Authentication algorithm.")
                    .one_of(&["md5", "sha-256", "sha-384", "sha-512", "sha1"]),
            )
            .attribute(
                Attribute::optional("authentication_method", AttrKind::String)
                    .describe("Authentication method.")
                    .one_of(&[
                        "dsa-signatures",
                        "ecdsa-signatures-256",
                        "ecdsa-signatures-384",
                        "pre-shared-keys",
                        "rsa-signatures",
                    ])
                    .default_value(json!("pre-shared-keys")),
            )
            .attribute(
                Attribute::optional("description", AttrKind::String)
                    .describe("Text description of IKE proposal.")
                    .length(1, 80)
                    .no_double_quote(),
            )
            .attribute(
                Attribute::optional("dh_group", AttrKind::String)
                    .describe("Diffie-Hellman group.")
                    .one_of(&[
                        "group1", "group2", "group5", "group14", "group15", "group16", "group19",
                        "group20", "group21", "group24",
                    ]),
            )
            .attribute(
                Attribute::optional("encryption_algorithm", AttrKind::String)
                    .describe("Encryption algorithm.")
                    .one_of(&[
                        "3des-cbc",
                        "aes-128-cbc",
                        "aes-128-gcm",
                        "aes-192-cbc",
                        "aes-256-cbc",
                        "aes-256-gcm",
                        "des-cbc",
                    ]),
            )
            .attribute(
                Attribute::optional("lifetime_seconds", AttrKind::Int64)
                    .describe("Lifetime, in seconds.")
                    .range(180, 86400),
            )
    }

    fn identity(&self) -> Identity {
        Identity::single(&self.name)
    }

    fn render(&self) -> Result<Vec<String>, RenderError> {
        let mut r = Renderer::set(&format!("{PATH} {}", word(&self.name)));
        r.word("authentication-algorithm", self.authentication_algorithm.as_deref());
        r.word("authentication-method", self.authentication_method.as_deref());
        r.text("description", self.description.as_deref());
        r.word("dh-group", self.dh_group.as_deref());
        r.word("encryption-algorithm", self.encryption_algorithm.as_deref());
        r.int("lifetime-seconds", self.lifetime_seconds);
        Ok(r.into_lines())
    }

    fn show_command(identity: &Identity) -> String {
        show_config(&format!("{PATH} {}", word(identity.field(0))))
    }

    fn parse(identity: &Identity, snapshot: &Snapshot) -> setline::Result<Self> {
        let mut proposal = Self {
            name: identity.field(0).to_string(),
            ..Self::default()
        };
        for line in snapshot.lines() {
            let Some((field, value)) = FIELDS.lookup(line) else {
                continue;
            };
            match field {
                Field::AuthenticationAlgorithm => {
                    proposal.authentication_algorithm = text("authentication-algorithm", value)?;
                }
                Field::AuthenticationMethod => {
                    proposal.authentication_method = text("authentication-method", value)?;
                }
                Field::Description => proposal.description = text("description", value)?,
                Field::DhGroup => proposal.dh_group = text("dh-group", value)?,
                Field::EncryptionAlgorithm => {
                    proposal.encryption_algorithm = text("encryption-algorithm", value)?;
                }
                Field::LifetimeSeconds => {
                    proposal.lifetime_seconds = int("lifetime-seconds", value)?;
                }
            }
        }
        Ok(proposal)
    }

    fn delete_lines(identity: &Identity) -> Vec<String> {
        vec![delete_line(&format!("{PATH} {}", word(identity.field(0))))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::{AttrPath, Registry, summary};

    #[test]
    fn test_default_authentication_method() {
        let registry = Registry::new().with::<IkeProposal>();
        let handler = registry.get(IkeProposal::TYPE_NAME).unwrap();
        let normalized = handler
            .normalize(&json!({ "name": "ike-1", "dh_group": "group14" }))
            .unwrap();
        assert_eq!(normalized["authentication_method"], "pre-shared-keys");
        assert_eq!(
            handler.render(&normalized).unwrap(),
            vec![
                "set security ike proposal ike-1 authentication-method pre-shared-keys",
                "set security ike proposal ike-1 dh-group group14",
            ]
        );
    }

    #[test]
    fn test_rejects_unknown_group_and_short_lifetime() {
        let diags = IkeProposal::schema().validate(&json!({
            "name": "ike-1",
            "dh_group": "group3",
            "lifetime_seconds": 60,
        }));
        assert!(diags.has_error_at(&AttrPath::attr("dh_group")));
        assert!(diags.has_error_at(&AttrPath::attr("lifetime_seconds")));
        assert!(diags.errors().all(|d| d.summary == summary::INVALID));
    }

    #[test]
    fn test_parse_round_trip() {
        let proposal = IkeProposal {
            name: "ike-1".to_string(),
            authentication_algorithm: Some("sha-256".to_string()),
            authentication_method: Some("pre-shared-keys".to_string()),
            description: Some("site to site".to_string()),
            dh_group: Some("group14".to_string()),
            encryption_algorithm: Some("aes-256-cbc".to_string()),
            lifetime_seconds: Some(28800),
        };
        let prefix = "set security ike proposal ike-1 ";
        let relative: String = proposal
            .render()
            .unwrap()
            .iter()
            .map(|l| format!("set {}\n", l.strip_prefix(prefix).unwrap()))
            .collect();
        let parsed = IkeProposal::parse(&proposal.identity(), &Snapshot::parse(&relative)).unwrap();
        assert_eq!(parsed, proposal);
    }
}
