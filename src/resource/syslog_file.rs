//! `junos_system_syslog_file`: `system syslog file <filename>`

use super::{is_false, text};
use declarative::{
    AttrKind, Attribute, BlockSchema, Identity, ImportFormat, NameFormat, RenderError, Resource,
    Schema,
};
use junos::cmd::show_config;
use serde::{Deserialize, Serialize};
use setline::{KeywordTable, Renderer, Snapshot, delete_line, required, text_value, word};
use std::sync::LazyLock;

const PATH: &str = "system syslog file";

const SEVERITIES: &[&str] = &[
    "alert",
    "any",
    "critical",
    "emergency",
    "error",
    "info",
    "none",
    "notice",
    "warning",
];

/// Facilities as (device keyword, attribute name).
const FACILITIES: [(&str, &str); 15] = [
    ("any", "any_severity"),
    ("authorization", "authorization_severity"),
    ("change-log", "changelog_severity"),
    ("conflict-log", "conflictlog_severity"),
    ("daemon", "daemon_severity"),
    ("dfc", "dfc_severity"),
    ("external", "external_severity"),
    ("firewall", "firewall_severity"),
    ("ftp", "ftp_severity"),
    ("interactive-commands", "interactivecommands_severity"),
    ("kernel", "kernel_severity"),
    ("ntp", "ntp_severity"),
    ("pfe", "pfe_severity"),
    ("security", "security_severity"),
    ("user", "user_severity"),
];

/// A syslog file destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyslogFile {
    pub filename: String,
    #[serde(skip_serializing_if = "is_false")]
    pub allow_duplicates: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub explicit_priority: bool,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub match_regex: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub match_strings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any_severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changelog_severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflictlog_severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daemon_severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dfc_severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firewall_severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ftp_severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactivecommands_severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kernel_severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ntp_severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pfe_severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_data: Option<StructuredData>,
}

/// Structured-data log format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredData {
    #[serde(skip_serializing_if = "is_false")]
    pub brief: bool,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    AllowDuplicates,
    ExplicitPriority,
    Match,
    MatchStrings,
    Facility(usize),
    StructuredData,
    StructuredDataBrief,
}

static FIELDS: LazyLock<KeywordTable<Field>> = LazyLock::new(|| {
    let mut entries = vec![
        ("allow-duplicates", Field::AllowDuplicates),
        ("explicit-priority", Field::ExplicitPriority),
        ("match", Field::Match),
        ("match-strings", Field::MatchStrings),
        ("structured-data", Field::StructuredData),
        ("structured-data brief", Field::StructuredDataBrief),
    ];
    entries.extend(
        FACILITIES
            .iter()
            .enumerate()
            .map(|(i, (keyword, _))| (*keyword, Field::Facility(i))),
    );
    KeywordTable::new(&entries)
});

impl SyslogFile {
    /// Severity slot of the facility at `index` in [`FACILITIES`].
    fn facility_mut(&mut self, index: usize) -> Option<&mut Option<String>> {
        Some(match index {
            0 => &mut self.any_severity,
            1 => &mut self.authorization_severity,
            2 => &mut self.changelog_severity,
            3 => &mut self.conflictlog_severity,
            4 => &mut self.daemon_severity,
            5 => &mut self.dfc_severity,
            6 => &mut self.external_severity,
            7 => &mut self.firewall_severity,
            8 => &mut self.ftp_severity,
            9 => &mut self.interactivecommands_severity,
            10 => &mut self.kernel_severity,
            11 => &mut self.ntp_severity,
            12 => &mut self.pfe_severity,
            13 => &mut self.security_severity,
            14 => &mut self.user_severity,
            _ => return None,
        })
    }

    fn severities(&self) -> [&Option<String>; 15] {
        [
            &self.any_severity,
            &self.authorization_severity,
            &self.changelog_severity,
            &self.conflictlog_severity,
            &self.daemon_severity,
            &self.dfc_severity,
            &self.external_severity,
            &self.firewall_severity,
            &self.ftp_severity,
            &self.interactivecommands_severity,
            &self.kernel_severity,
            &self.ntp_severity,
            &self.pfe_severity,
            &self.security_severity,
            &self.user_severity,
        ]
    }
}

impl Resource for SyslogFile {
    const TYPE_NAME: &'static str = "junos_system_syslog_file";
    const IMPORT_FORMAT: ImportFormat = ImportFormat::new(&["filename"]);

    fn schema() -> Schema {
        let schema = Schema::new(0)
            .describe("Provides a system syslog file resource.")
            .attribute(
                Attribute::required("filename", AttrKind::String)
                    .describe("The name of file in which to log data.")
                    .length(1, 250)
                    .format(NameFormat::Address)
                    .requires_replace(),
            )
            .attribute(
                Attribute::optional("allow_duplicates", AttrKind::Bool)
                    .describe("Do not suppress the repeated message."),
            )
            .attribute(
                Attribute::optional("explicit_priority", AttrKind::Bool)
                    .describe("Include priority and facility in messages."),
            )
            .attribute(
                Attribute::optional("match", AttrKind::String)
                    .describe("Regular expression for lines to be logged.")
                    .no_double_quote()
                    .conflicts_with(&["match_strings"]),
            )
            .attribute(
                Attribute::optional("match_strings", AttrKind::StringList)
                    .describe("Matching string(s) for lines to be logged.")
                    .no_double_quote()
                    .conflicts_with(&["match"]),
            );
        FACILITIES
            .iter()
            .map(|&(_, name)| {
                Attribute::optional(name, AttrKind::String)
                    .describe("Severity level for the facility.")
                    .one_of(SEVERITIES)
            })
            .fold(schema, Schema::attribute)
            .block(
                BlockSchema::single("structured_data")
                    .describe("Log system message in structured format.")
                    .attribute(
                        Attribute::optional("brief", AttrKind::Bool)
                            .describe("Omit English-language text from end of logged message."),
                    ),
            )
    }

    fn identity(&self) -> Identity {
        Identity::single(&self.filename)
    }

    fn render(&self) -> Result<Vec<String>, RenderError> {
        let mut r = Renderer::set(&format!("{PATH} {}", word(&self.filename)));
        r.flag("allow-duplicates", self.allow_duplicates);
        r.flag("explicit-priority", self.explicit_priority);
        r.text("match", self.match_regex.as_deref());
        r.texts("match-strings", &self.match_strings);
        for ((keyword, _), severity) in FACILITIES.iter().zip(self.severities()) {
            r.word(keyword, severity.as_deref());
        }
        if let Some(data) = &self.structured_data {
            let mut child = r.child("structured-data");
            child.flag("brief", data.brief);
            r.append(child);
        }
        Ok(r.into_lines())
    }

    fn show_command(identity: &Identity) -> String {
        show_config(&format!("{PATH} {}", word(identity.field(0))))
    }

    fn parse(identity: &Identity, snapshot: &Snapshot) -> setline::Result<Self> {
        let mut file = Self {
            filename: identity.field(0).to_string(),
            ..Self::default()
        };
        for line in snapshot.lines() {
            let Some((field, value)) = FIELDS.lookup(line) else {
                continue;
            };
            match field {
                Field::AllowDuplicates => file.allow_duplicates = true,
                Field::ExplicitPriority => file.explicit_priority = true,
                Field::Match => file.match_regex = text("match", value)?,
                Field::MatchStrings => file
                    .match_strings
                    .push(text_value(required("match-strings", value)?)),
                Field::Facility(index) => {
                    let keyword = FACILITIES[index].0;
                    let severity = text(keyword, value)?;
                    if let Some(slot) = file.facility_mut(index) {
                        *slot = severity;
                    }
                }
                Field::StructuredData => {
                    file.structured_data.get_or_insert_default();
                }
                Field::StructuredDataBrief => {
                    file.structured_data.get_or_insert_default().brief = true;
                }
            }
        }
        Ok(file)
    }

    fn delete_lines(identity: &Identity) -> Vec<String> {
        vec![delete_line(&format!("{PATH} {}", word(identity.field(0))))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::{AttrPath, Client, Options, summary};
    use junos::MemoryDevice;
    use serde_json::json;

    fn file(name: &str) -> SyslogFile {
        SyslogFile {
            filename: name.to_string(),
            ..SyslogFile::default()
        }
    }

    #[test]
    fn test_render_facilities_in_order() {
        let f = SyslogFile {
            any_severity: Some("warning".to_string()),
            user_severity: Some("info".to_string()),
            changelog_severity: Some("notice".to_string()),
            ..file("messages")
        };
        assert_eq!(
            f.render().unwrap(),
            vec![
                "set system syslog file messages any warning",
                "set system syslog file messages change-log notice",
                "set system syslog file messages user info",
            ]
        );
    }

    #[test]
    fn test_match_conflicts_with_match_strings() {
        let diags = SyslogFile::schema().validate(&json!({
            "filename": "messages",
            "match": "error",
            "match_strings": ["fail"],
        }));
        assert!(diags.has_error_at(&AttrPath::attr("match")));
        assert!(diags.has_error_at(&AttrPath::attr("match_strings")));
        assert!(diags.errors().all(|d| d.summary == summary::CONFLICT));
    }

    #[test]
    fn test_unknown_severity() {
        let diags = SyslogFile::schema().validate(&json!({
            "filename": "messages",
            "kernel_severity": "loud",
        }));
        assert!(diags.has_error_at(&AttrPath::attr("kernel_severity")));
    }

    #[test]
    fn test_structured_data_container() {
        let f = SyslogFile {
            structured_data: Some(StructuredData::default()),
            ..file("sd.log")
        };
        assert_eq!(
            f.render().unwrap(),
            vec!["set system syslog file sd.log structured-data"]
        );

        let brief = SyslogFile {
            structured_data: Some(StructuredData { brief: true }),
            ..file("sd.log")
        };
        assert_eq!(
            brief.render().unwrap(),
            vec!["set system syslog file sd.log structured-data brief"]
        );
    }

    #[test]
    fn test_parse_does_not_confuse_match_keywords() {
        let snapshot = Snapshot::parse(
            "set match-strings \"link down\"\n\
             set match-strings fail\n\
             set interactive-commands any\n\
             set structured-data brief\n\
             set explicit-priority\n",
        );
        let f = SyslogFile::parse(&Identity::single("messages"), &snapshot).unwrap();
        assert_eq!(f.match_regex, None);
        assert_eq!(f.match_strings, vec!["link down", "fail"]);
        assert_eq!(f.interactivecommands_severity.as_deref(), Some("any"));
        assert_eq!(f.any_severity, None);
        assert_eq!(f.structured_data, Some(StructuredData { brief: true }));
        assert!(f.explicit_priority);
    }

    #[test]
    fn test_round_trip_through_device() {
        let client = Client::new(Box::new(MemoryDevice::new()), Options::default());
        let f = SyslogFile {
            allow_duplicates: true,
            match_regex: Some("(error|fail)".to_string()),
            daemon_severity: Some("error".to_string()),
            structured_data: Some(StructuredData::default()),
            ..file("messages")
        };
        client.create(&f).unwrap();
        assert_eq!(client.read::<SyslogFile>(&f.identity()).unwrap(), Some(f));
    }
}
