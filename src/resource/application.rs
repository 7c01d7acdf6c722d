//! `junos_application`: `applications application <name>`

use super::{int, is_false, text};
use declarative::{
    AttrKind, AttrPath, Attribute, BlockSchema, Collision, Identity, ImportFormat, NameFormat,
    RenderError, Resource, Schema,
};
use junos::cmd::show_config;
use serde::{Deserialize, Serialize};
use setline::{Keyed, KeywordTable, Renderer, Snapshot, delete_line, find_duplicate, merge_line, word};
use std::sync::LazyLock;

const PATH: &str = "applications application";

const UUID_PATTERN: &str =
    "^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$";

/// Top-level match attributes that cannot be combined with terms.
const MATCH_ATTRIBUTES: &[&str] = &[
    "application_protocol",
    "destination_port",
    "ether_type",
    "icmp_code",
    "icmp_type",
    "icmp6_code",
    "icmp6_type",
    "inactivity_timeout",
    "inactivity_timeout_never",
    "protocol",
    "rpc_program_number",
    "source_port",
    "uuid",
];

/// A custom application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Application {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_port: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ether_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icmp_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icmp_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icmp6_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icmp6_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactivity_timeout: Option<i64>,
    #[serde(skip_serializing_if = "is_false")]
    pub inactivity_timeout_never: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_program_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_port: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub term: Vec<Term>,
}

/// One `term` of a multi-term application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Term {
    pub name: String,
    pub protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_port: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icmp_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icmp_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icmp6_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icmp6_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactivity_timeout: Option<i64>,
    #[serde(skip_serializing_if = "is_false")]
    pub inactivity_timeout_never: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_program_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_port: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

impl Keyed for Term {
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
    ApplicationProtocol,
    Description,
    DestinationPort,
    EtherType,
    IcmpCode,
    IcmpType,
    Icmp6Code,
    Icmp6Type,
    InactivityTimeout,
    InactivityTimeoutNever,
    Protocol,
    RpcProgramNumber,
    SourcePort,
    Uuid,
    Term,
}

static FIELDS: LazyLock<KeywordTable<Field>> = LazyLock::new(|| {
    KeywordTable::new(&[
        ("application-protocol", Field::ApplicationProtocol),
        ("description", Field::Description),
        ("destination-port", Field::DestinationPort),
        ("ether-type", Field::EtherType),
        ("icmp-code", Field::IcmpCode),
        ("icmp-type", Field::IcmpType),
        ("icmp6-code", Field::Icmp6Code),
        ("icmp6-type", Field::Icmp6Type),
        ("inactivity-timeout never", Field::InactivityTimeoutNever),
        ("inactivity-timeout", Field::InactivityTimeout),
        ("protocol", Field::Protocol),
        ("rpc-program-number", Field::RpcProgramNumber),
        ("source-port", Field::SourcePort),
        ("uuid", Field::Uuid),
        ("term", Field::Term),
    ])
});

#[derive(Debug, Clone, Copy)]
enum TermField {
    Alg,
    DestinationPort,
    IcmpCode,
    IcmpType,
    Icmp6Code,
    Icmp6Type,
    InactivityTimeout,
    InactivityTimeoutNever,
    Protocol,
    RpcProgramNumber,
    SourcePort,
    Uuid,
}

static TERM_FIELDS: LazyLock<KeywordTable<TermField>> = LazyLock::new(|| {
    KeywordTable::new(&[
        ("alg", TermField::Alg),
        ("destination-port", TermField::DestinationPort),
        ("icmp-code", TermField::IcmpCode),
        ("icmp-type", TermField::IcmpType),
        ("icmp6-code", TermField::Icmp6Code),
        ("icmp6-type", TermField::Icmp6Type),
        ("inactivity-timeout never", TermField::InactivityTimeoutNever),
        ("inactivity-timeout", TermField::InactivityTimeout),
        ("protocol", TermField::Protocol),
        ("rpc-program-number", TermField::RpcProgramNumber),
        ("source-port", TermField::SourcePort),
        ("uuid", TermField::Uuid),
    ])
});

impl Term {
    fn render(&self, r: &mut Renderer) {
        r.word("protocol", Some(&self.protocol));
        r.word("alg", self.alg.as_deref());
        r.text("destination-port", self.destination_port.as_deref());
        r.word("icmp-code", self.icmp_code.as_deref());
        r.word("icmp-type", self.icmp_type.as_deref());
        r.word("icmp6-code", self.icmp6_code.as_deref());
        r.word("icmp6-type", self.icmp6_type.as_deref());
        r.int("inactivity-timeout", self.inactivity_timeout);
        r.flag("inactivity-timeout never", self.inactivity_timeout_never);
        r.word("rpc-program-number", self.rpc_program_number.as_deref());
        r.text("source-port", self.source_port.as_deref());
        r.word("uuid", self.uuid.as_deref());
    }

    fn read_line(&mut self, line: &str) -> setline::Result<()> {
        let Some((field, value)) = TERM_FIELDS.lookup(line) else {
            return Ok(());
        };
        match field {
            TermField::Alg => self.alg = text("alg", value)?,
            TermField::DestinationPort => {
                self.destination_port = text("destination-port", value)?;
            }
            TermField::IcmpCode => self.icmp_code = text("icmp-code", value)?,
            TermField::IcmpType => self.icmp_type = text("icmp-type", value)?,
            TermField::Icmp6Code => self.icmp6_code = text("icmp6-code", value)?,
            TermField::Icmp6Type => self.icmp6_type = text("icmp6-type", value)?,
            TermField::InactivityTimeout => {
                self.inactivity_timeout = int("inactivity-timeout", value)?;
            }
            TermField::InactivityTimeoutNever => self.inactivity_timeout_never = true,
            TermField::Protocol => {
                self.protocol = text("protocol", value)?.unwrap_or_default();
            }
            TermField::RpcProgramNumber => {
                self.rpc_program_number = text("rpc-program-number", value)?;
            }
            TermField::SourcePort => self.source_port = text("source-port", value)?,
            TermField::Uuid => self.uuid = text("uuid", value)?,
        }
        Ok(())
    }
}

/// Match attributes shared by the application and its terms.
fn match_attributes() -> Vec<Attribute> {
    vec![
        Attribute::optional("destination_port", AttrKind::String)
            .describe("Port(s) destination used by application.")
            .no_double_quote(),
        Attribute::optional("icmp_code", AttrKind::String).describe("Match ICMP message code."),
        Attribute::optional("icmp_type", AttrKind::String).describe("Match ICMP message type."),
        Attribute::optional("icmp6_code", AttrKind::String).describe("Match ICMP6 message code."),
        Attribute::optional("icmp6_type", AttrKind::String).describe("Match ICMP6 message type."),
        Attribute::optional("inactivity_timeout", AttrKind::Int64)
            .describe("Application-specific inactivity timeout.")
            .range(4, 86400)
            .conflicts_with(&["inactivity_timeout_never"]),
        Attribute::optional("inactivity_timeout_never", AttrKind::Bool)
            .describe("Disables inactivity timeout.")
            .conflicts_with(&["inactivity_timeout"]),
        Attribute::optional("rpc_program_number", AttrKind::String)
            .describe("Match range of RPC program numbers.")
            .pattern(r"^\d+(-\d+)?$", "must be a number or a range of numbers"),
        Attribute::optional("source_port", AttrKind::String)
            .describe("Port(s) source used by application.")
            .no_double_quote(),
        Attribute::optional("uuid", AttrKind::String)
            .describe("Match universal unique identifier for DCE RPC objects.")
            .pattern(UUID_PATTERN, "must be a UUID"),
    ]
}

impl Resource for Application {
    const TYPE_NAME: &'static str = "junos_application";
    const IMPORT_FORMAT: ImportFormat = ImportFormat::new(&["name"]);

    fn schema() -> Schema {
        let term = BlockSchema::list("term")
            .describe("Define multiple terms for application.")
            .keyed_by("name")
            .conflicts_with(MATCH_ATTRIBUTES)
            .attribute(
                Attribute::required("name", AttrKind::String)
                    .describe("Term name.")
                    .length(1, 63)
                    .format(NameFormat::Default),
            )
            .attribute(Attribute::required("protocol", AttrKind::String).describe("Match IP protocol type."))
            .attribute(Attribute::optional("alg", AttrKind::String).describe("Application Layer Gateway."));
        let term = match_attributes().into_iter().fold(term, BlockSchema::attribute);

        let schema = Schema::new(0)
            .describe("Provides an application resource.")
            .attribute(
                Attribute::required("name", AttrKind::String)
                    .describe("The name of application.")
                    .length(1, 63)
                    .format(NameFormat::Default)
                    .requires_replace(),
            )
            .attribute(
                Attribute::optional("application_protocol", AttrKind::String)
                    .describe("Application protocol type."),
            )
            .attribute(
                Attribute::optional("description", AttrKind::String)
                    .describe("Text description of application.")
                    .length(1, 900)
                    .no_double_quote(),
            )
            .attribute(
                Attribute::optional("ether_type", AttrKind::String)
                    .describe("Match ether type.")
                    .pattern("^0[xX][0-9a-fA-F]{4}$", "must be in hexadecimal format 0x0000"),
            )
            .attribute(Attribute::optional("protocol", AttrKind::String).describe("Match IP protocol type."));
        match_attributes()
            .into_iter()
            .fold(schema, Schema::attribute)
            .block(term)
    }

    fn identity(&self) -> Identity {
        Identity::single(&self.name)
    }

    fn render(&self) -> Result<Vec<String>, RenderError> {
        if let Some(dup) = find_duplicate(&self.term) {
            return Err(RenderError::duplicate(&AttrPath::root(), "term", &dup));
        }

        let mut r = Renderer::set(&format!("{PATH} {}", word(&self.name)));
        r.word("application-protocol", self.application_protocol.as_deref());
        r.text("description", self.description.as_deref());
        r.text("destination-port", self.destination_port.as_deref());
        r.word("ether-type", self.ether_type.as_deref());
        r.word("icmp-code", self.icmp_code.as_deref());
        r.word("icmp-type", self.icmp_type.as_deref());
        r.word("icmp6-code", self.icmp6_code.as_deref());
        r.word("icmp6-type", self.icmp6_type.as_deref());
        r.int("inactivity-timeout", self.inactivity_timeout);
        r.flag("inactivity-timeout never", self.inactivity_timeout_never);
        r.word("protocol", self.protocol.as_deref());
        r.word("rpc-program-number", self.rpc_program_number.as_deref());
        r.text("source-port", self.source_port.as_deref());
        r.word("uuid", self.uuid.as_deref());
        for term in &self.term {
            let mut block = r.block("term", &term.name);
            term.render(&mut block);
            r.append(block);
        }
        Ok(r.into_lines())
    }

    fn show_command(identity: &Identity) -> String {
        show_config(&format!("{PATH} {}", word(identity.field(0))))
    }

    fn parse(identity: &Identity, snapshot: &Snapshot) -> setline::Result<Self> {
        let mut app = Self {
            name: identity.field(0).to_string(),
            ..Self::default()
        };
        for line in snapshot.lines() {
            let Some((field, value)) = FIELDS.lookup(line) else {
                continue;
            };
            match field {
                Field::ApplicationProtocol => {
                    app.application_protocol = text("application-protocol", value)?;
                }
                Field::Description => app.description = text("description", value)?,
                Field::DestinationPort => {
                    app.destination_port = text("destination-port", value)?;
                }
                Field::EtherType => app.ether_type = text("ether-type", value)?,
                Field::IcmpCode => app.icmp_code = text("icmp-code", value)?,
                Field::IcmpType => app.icmp_type = text("icmp-type", value)?,
                Field::Icmp6Code => app.icmp6_code = text("icmp6-code", value)?,
                Field::Icmp6Type => app.icmp6_type = text("icmp6-type", value)?,
                Field::InactivityTimeout => {
                    app.inactivity_timeout = int("inactivity-timeout", value)?;
                }
                Field::InactivityTimeoutNever => app.inactivity_timeout_never = true,
                Field::Protocol => app.protocol = text("protocol", value)?,
                Field::RpcProgramNumber => {
                    app.rpc_program_number = text("rpc-program-number", value)?;
                }
                Field::SourcePort => app.source_port = text("source-port", value)?,
                Field::Uuid => app.uuid = text("uuid", value)?,
                Field::Term => {
                    let (term, rest) = merge_line(&mut app.term, value)?;
                    term.read_line(rest)?;
                }
            }
        }
        Ok(app)
    }

    fn delete_lines(identity: &Identity) -> Vec<String> {
        vec![delete_line(&format!("{PATH} {}", word(identity.field(0))))]
    }

    fn collisions(identity: &Identity) -> Vec<Collision> {
        let name = word(identity.field(0));
        vec![Collision {
            what: format!("application-set {name}"),
            command: show_config(&format!("applications application-set {name}")),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::{Client, Options, Session, Transport, check, summary};
    use junos::MemoryDevice;
    use serde_json::json;

    fn app(name: &str) -> Application {
        Application {
            name: name.to_string(),
            ..Application::default()
        }
    }

    fn term(name: &str, protocol: &str) -> Term {
        Term {
            protocol: protocol.to_string(),
            ..Term::with_key(name.to_string())
        }
    }

    fn client() -> Client {
        Client::new(Box::new(MemoryDevice::new()), Options::default())
    }

    #[test]
    fn test_render_protocol_and_port() {
        let a = Application {
            protocol: Some("tcp".to_string()),
            destination_port: Some("80".to_string()),
            ..app("app1")
        };
        let mut lines = a.render().unwrap();
        lines.sort();
        assert_eq!(
            lines,
            vec![
                "set applications application app1 destination-port \"80\"",
                "set applications application app1 protocol tcp",
            ]
        );
        // deterministic across calls
        assert_eq!(a.render().unwrap(), a.render().unwrap());
    }

    #[test]
    fn test_inactivity_timeout_conflict() {
        let diags = Application::schema().validate(&json!({
            "name": "app1",
            "inactivity_timeout": 300,
            "inactivity_timeout_never": true,
        }));
        assert!(diags.has_error_at(&AttrPath::attr("inactivity_timeout")));
        assert!(diags.errors().any(|d| d.summary == summary::CONFLICT));
    }

    #[test]
    fn test_inactivity_timeout_range() {
        let diags = Application::schema().validate(&json!({
            "name": "app1",
            "inactivity_timeout": 2,
        }));
        assert!(diags.has_error_at(&AttrPath::attr("inactivity_timeout")));
    }

    #[test]
    fn test_term_conflicts_with_top_level_protocol() {
        let diags = Application::schema().validate(&json!({
            "name": "app1",
            "protocol": "tcp",
            "term": [{ "name": "t1", "protocol": "udp" }],
        }));
        assert!(diags.has_error_at(&AttrPath::attr("term")));
    }

    #[test]
    fn test_term_requires_protocol() {
        let diags = Application::schema().validate(&json!({
            "name": "app1",
            "term": [{ "name": "t1" }],
        }));
        assert!(diags.has_error_at(&AttrPath::attr("term").index(0).join("protocol")));
    }

    #[test]
    fn test_never_renders_keyword() {
        let a = Application {
            inactivity_timeout_never: true,
            ..app("app1")
        };
        assert_eq!(
            a.render().unwrap(),
            vec!["set applications application app1 inactivity-timeout never"]
        );
    }

    #[test]
    fn test_bare_application_renders_identity_line() {
        assert_eq!(app("app1").render().unwrap(), vec!["set applications application app1"]);
    }

    #[test]
    fn test_duplicate_terms_fail_render() {
        let a = Application {
            term: vec![term("t1", "tcp"), term("t2", "udp"), term("t1", "udp")],
            ..app("app1")
        };
        let err = a.render().unwrap_err();
        assert_eq!(err.summary, summary::DUPLICATE);
        assert_eq!(err.path, AttrPath::attr("term").index(2));
        assert!(check(&a).is_err());
    }

    #[test]
    fn test_parse_interleaved_terms() {
        let snapshot = Snapshot::parse(
            "set term t1 protocol tcp\n\
             set term t2 protocol udp\n\
             set term t1 destination-port \"443\"\n\
             set term t2 inactivity-timeout never\n\
             set term t1 inactivity-timeout 600\n",
        );
        let a = Application::parse(&Identity::single("app1"), &snapshot).unwrap();
        assert_eq!(a.term.len(), 2);
        assert_eq!(a.term[0].name, "t1");
        assert_eq!(a.term[0].destination_port.as_deref(), Some("443"));
        assert_eq!(a.term[0].inactivity_timeout, Some(600));
        assert!(a.term[1].inactivity_timeout_never);
        assert_eq!(a.term[1].inactivity_timeout, None);
    }

    #[test]
    fn test_parse_rejects_bad_integer() {
        let snapshot = Snapshot::parse("set inactivity-timeout soon\n");
        assert!(Application::parse(&Identity::single("app1"), &snapshot).is_err());
    }

    #[test]
    fn test_create_and_read_back() {
        let client = client();
        let a = Application {
            description: Some("web traffic".to_string()),
            term: vec![
                Term {
                    destination_port: Some("80".to_string()),
                    inactivity_timeout: Some(300),
                    ..term("t1", "tcp")
                },
                Term {
                    alg: Some("dns".to_string()),
                    ..term("t2", "udp")
                },
            ],
            ..app("web")
        };
        let created = client.create(&a).unwrap();
        assert_eq!(created, a);

        let read = client.read::<Application>(&a.identity()).unwrap();
        assert_eq!(read, Some(a));
    }

    #[test]
    fn test_read_absent_is_none() {
        let client = client();
        assert_eq!(client.read::<Application>(&Identity::single("nope")).unwrap(), None);
    }

    #[test]
    fn test_create_collides_with_application_set() {
        let device = MemoryDevice::new();
        {
            let mut session = device.open().unwrap();
            session.config_lock().unwrap();
            session
                .config_set(&["set applications application-set web application junos-http".to_string()])
                .unwrap();
            session.commit_conf("seed").unwrap();
        }
        let client = Client::new(Box::new(device), Options::default());
        let a = Application {
            protocol: Some("tcp".to_string()),
            ..app("web")
        };
        let err = client.create(&a).unwrap_err();
        assert!(err.to_string().contains("application-set web already exists"));
    }
}
