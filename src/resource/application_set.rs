//! `junos_application_set`: `applications application-set <name>`

use super::text;
use declarative::{
    AttrKind, AttrPath, Attribute, Collision, Diagnostics, Identity, ImportFormat, NameFormat,
    RenderError, Resource, Schema, require_one_of,
};
use junos::cmd::show_config;
use serde::{Deserialize, Serialize};
use setline::{KeywordTable, Renderer, Snapshot, delete_line, text_value, word};
use std::sync::LazyLock;

const PATH: &str = "applications application-set";

/// A named group of applications and nested application sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSet {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub applications: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub application_set: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Application,
    ApplicationSet,
    Description,
}

static FIELDS: LazyLock<KeywordTable<Field>> = LazyLock::new(|| {
    KeywordTable::new(&[
        ("application", Field::Application),
        ("application-set", Field::ApplicationSet),
        ("description", Field::Description),
    ])
});

impl Resource for ApplicationSet {
    const TYPE_NAME: &'static str = "junos_application_set";
    const IMPORT_FORMAT: ImportFormat = ImportFormat::new(&["name"]);

    fn schema() -> Schema {
        Schema::new(0)
            .describe("Provides an application set resource.")
            .attribute(
                Attribute::required("name", AttrKind::String)
                    .describe("The name of application set.")
                    .length(1, 63)
                    .format(NameFormat::Default)
                    .requires_replace(),
            )
            .attribute(
                Attribute::optional("applications", AttrKind::StringSet)
                    .describe("Application to be included in the set."),
            )
            .attribute(
                Attribute::optional("application_set", AttrKind::StringSet)
                    .describe("Application-set to be included in the set."),
            )
            .attribute(
                Attribute::optional("description", AttrKind::String)
                    .describe("Text description of application set.")
                    .length(1, 900)
                    .no_double_quote(),
            )
    }

    fn identity(&self) -> Identity {
        Identity::single(&self.name)
    }

    fn validate(&self, diags: &mut Diagnostics) {
        require_one_of(
            diags,
            &AttrPath::root(),
            &[
                ("applications", !self.applications.is_empty()),
                ("application_set", !self.application_set.is_empty()),
            ],
        );
    }

    fn render(&self) -> Result<Vec<String>, RenderError> {
        let mut r = Renderer::set(&format!("{PATH} {}", word(&self.name)));
        r.words("application", &self.applications);
        r.words("application-set", &self.application_set);
        r.text("description", self.description.as_deref());
        Ok(r.into_lines())
    }

    fn show_command(identity: &Identity) -> String {
        show_config(&format!("{PATH} {}", word(identity.field(0))))
    }

    fn parse(identity: &Identity, snapshot: &Snapshot) -> setline::Result<Self> {
        let mut set = Self {
            name: identity.field(0).to_string(),
            ..Self::default()
        };
        for line in snapshot.lines() {
            match FIELDS.lookup(line) {
                Some((Field::Application, value)) => {
                    set.applications.push(text_value(setline::required("application", value)?));
                }
                Some((Field::ApplicationSet, value)) => {
                    set.application_set
                        .push(text_value(setline::required("application-set", value)?));
                }
                Some((Field::Description, value)) => set.description = text("description", value)?,
                None => {}
            }
        }
        Ok(set)
    }

    fn delete_lines(identity: &Identity) -> Vec<String> {
        vec![delete_line(&format!("{PATH} {}", word(identity.field(0))))]
    }

    fn collisions(identity: &Identity) -> Vec<Collision> {
        let name = word(identity.field(0));
        vec![Collision {
            what: format!("application {name}"),
            command: show_config(&format!("applications application {name}")),
        }]
    }
}
