//! `junos_security_ipsec_proposal`: `security ipsec proposal <name>`

use super::{int, text};
use declarative::{
    AttrKind, AttrPath, Attribute, Diagnostics, Identity, ImportFormat, NameFormat, RenderError,
    Resource, Schema, summary,
};
use junos::cmd::show_config;
use serde::{Deserialize, Serialize};
use setline::{KeywordTable, Renderer, Snapshot, delete_line, word};
use std::sync::LazyLock;

const PATH: &str = "security ipsec proposal";

/// An IPsec (phase 2) proposal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpsecProposal {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifetime_kilobytes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifetime_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    AuthenticationAlgorithm,
    Description,
    EncryptionAlgorithm,
    LifetimeKilobytes,
    LifetimeSeconds,
    Protocol,
}

static FIELDS: LazyLock<KeywordTable<Field>> = LazyLock::new(|| {
    KeywordTable::new(&[
        ("authentication-algorithm", Field::AuthenticationAlgorithm),
        ("description", Field::Description),
        ("encryption-algorithm", Field::EncryptionAlgorithm),
        ("lifetime-kilobytes", Field::LifetimeKilobytes),
        ("lifetime-seconds", Field::LifetimeSeconds),
        ("protocol", Field::Protocol),
    ])
});

impl Resource for IpsecProposal {
    const TYPE_NAME: &'static str = "junos_security_ipsec_proposal";
    const IMPORT_FORMAT: ImportFormat = ImportFormat::new(&["name"]);

    fn schema() -> Schema {
        Schema::new(0)
            .describe("Provides a security IPsec proposal resource.")
            .attribute(
                Attribute::required("name", AttrKind::String)
                    .describe("The name of IPsec proposal.")
                    .length(1, 32)
                    .format(NameFormat::Default)
                    .requires_replace(),
            )
            .attribute(
                Attribute::optional("authentication_algorithm", AttrKind::String)
                    .describe("Authentication algorithm.")
                    .one_of(&[
                        "hmac-md5-96",
                        "hmac-sha-256-128",
                        "hmac-sha-256-96",
                        "hmac-sha-384",
                        "hmac-sha-512",
                        "hmac-sha1-96",
                    ]),
            )
            .attribute(
                Attribute::optional("description", AttrKind::String)
                    .describe("Text description of IPsec proposal.")
                    .length(1, 80)
                    .no_double_quote(),
            )
            .attribute(
                Attribute::optional("encryption_algorithm", AttrKind::String)
                    .describe("Encryption algorithm.")
                    .one_of(&[
                        "3des-cbc",
                        "aes-128-cbc",
                        "aes-128-gcm",
                        "aes-192-cbc",
                        "aes-192-gcm",
                        "aes-256-cbc",
                        "aes-256-gcm",
                        "des-cbc",
                    ]),
            )
            .attribute(
                Attribute::optional("lifetime_kilobytes", AttrKind::Int64)
                    .describe("Lifetime, in kilobytes.")
                    .range(64, 4_294_967_294),
            )
            .attribute(
                Attribute::optional("lifetime_seconds", AttrKind::Int64)
                    .describe("Lifetime, in seconds.")
                    .range(180, 86400),
            )
            .attribute(
                Attribute::optional("protocol", AttrKind::String)
                    .describe("IPsec protocol.")
                    .one_of(&["esp", "ah"]),
            )
    }

    fn identity(&self) -> Identity {
        Identity::single(&self.name)
    }

    fn validate(&self, diags: &mut Diagnostics) {
        // AH authenticates only
        if self.protocol.as_deref() == Some("ah") && self.encryption_algorithm.is_some() {
            diags.error_at(
                AttrPath::attr("encryption_algorithm"),
                summary::CONFLICT,
                "encryption_algorithm cannot be used with protocol ah",
            );
        }
    }

    fn render(&self) -> Result<Vec<String>, RenderError> {
        let mut r = Renderer::set(&format!("{PATH} {}", word(&self.name)));
        r.word("authentication-algorithm", self.authentication_algorithm.as_deref());
        r.text("description", self.description.as_deref());
        r.word("encryption-algorithm", self.encryption_algorithm.as_deref());
        r.int("lifetime-kilobytes", self.lifetime_kilobytes);
        r.int("lifetime-seconds", self.lifetime_seconds);
        r.word("protocol", self.protocol.as_deref());
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
                Field::Description => proposal.description = text("description", value)?,
                Field::EncryptionAlgorithm => {
                    proposal.encryption_algorithm = text("encryption-algorithm", value)?;
                }
                Field::LifetimeKilobytes => {
                    proposal.lifetime_kilobytes = int("lifetime-kilobytes", value)?;
                }
                Field::LifetimeSeconds => {
                    proposal.lifetime_seconds = int("lifetime-seconds", value)?;
                }
                Field::Protocol => proposal.protocol = text("protocol", value)?,
            }
        }
        Ok(proposal)
    }

    fn delete_lines(identity: &Identity) -> Vec<String> {
        vec![delete_line(&format!("{PATH} {}", word(identity.field(0))))]
    }
}
