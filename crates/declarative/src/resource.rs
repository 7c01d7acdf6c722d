//! Resource contract.
//!
//! A [`Resource`] maps a typed attribute set onto the Junos flat dialect and
//! back. The orchestrator in [`crate::client`] drives the lifecycle; resource
//! types only describe their schema, how to render themselves and how to
//! parse a device snapshot.
//!
//! # Example
//!
//! ```ignore
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct ApplicationSet {
//!     name: String,
//!     applications: Vec<String>,
//! }
//!
//! impl Resource for ApplicationSet {
//!     const TYPE_NAME: &'static str = "junos_application_set";
//!     const IMPORT_FORMAT: ImportFormat = ImportFormat::new(&["name"]);
//!
//!     fn schema() -> Schema { /* ... */ }
//!     fn identity(&self) -> Identity { Identity::single(&self.name) }
//!
//!     fn render(&self) -> Result<Vec<String>, RenderError> {
//!         let mut r = Renderer::set(&format!("applications application-set {}", self.name));
//!         for app in &self.applications {
//!             r.word("application", Some(app));
//!         }
//!         Ok(r.into_lines())
//!     }
//!     // ...
//! }
//! ```

use crate::diag::{Diagnostics, summary};
use crate::error::{Error, RenderError, Result};
use crate::schema::Schema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use setline::Snapshot;
use std::fmt;

/// Separator between the fields of a composite identity.
pub const ID_SEPARATOR: char = ':';

/// Identity of a device object, one element per identifying attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(Vec<String>);

impl Identity {
    /// Build an identity from its fields.
    pub fn new(fields: Vec<String>) -> Self {
        Self(fields)
    }

    /// Identity of an object named by one attribute.
    pub fn single(name: &str) -> Self {
        Self(vec![name.to_string()])
    }

    /// Field at `index`, empty when out of range.
    pub fn field(&self, index: usize) -> &str {
        self.0.get(index).map_or("", String::as_str)
    }

    /// All fields in order.
    pub fn fields(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{ID_SEPARATOR}")?;
            }
            f.write_str(field)?;
        }
        Ok(())
    }
}

/// Positional layout of an import ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportFormat {
    fields: &'static [&'static str],
}

impl ImportFormat {
    /// Declare the identifying attributes, in ID order.
    pub const fn new(fields: &'static [&'static str]) -> Self {
        Self { fields }
    }

    /// Attribute names in ID order.
    pub fn fields(&self) -> &'static [&'static str] {
        self.fields
    }

    /// The expected format, e.g. `<from_zone>:<to_zone>`.
    pub fn describe(&self) -> String {
        self.fields
            .iter()
            .map(|f| format!("<{f}>"))
            .collect::<Vec<_>>()
            .join(&ID_SEPARATOR.to_string())
    }

    /// Split an import ID into an identity.
    ///
    /// A wrong number of fields or an empty field is reported as "not found"
    /// with the expected format.
    pub fn parse(&self, id: &str) -> Result<Identity> {
        let parts: Vec<&str> = id.split(ID_SEPARATOR).collect();
        if parts.len() != self.fields.len() || parts.iter().any(|p| p.is_empty()) {
            return Err(Error::NotFound {
                message: format!("malformed import ID {id:?}, must be {}", self.describe()),
            });
        }
        Ok(Identity(parts.into_iter().map(str::to_string).collect()))
    }
}

/// An extra existence probe run before creating an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    /// What the probe looks for, e.g. `application-set app1`
    pub what: String,
    /// Show command returning the colliding object
    pub command: String,
}

/// A Junos configuration object managed declaratively.
///
/// Implementors are plain data: the serde form is the attribute set checked
/// by [`Resource::schema`], stored in state and compared during planning.
pub trait Resource:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Resource type name, e.g. `junos_application`.
    const TYPE_NAME: &'static str;

    /// Import ID layout.
    const IMPORT_FORMAT: ImportFormat;

    /// Attributes, blocks, constraints and plan behavior.
    fn schema() -> Schema;

    /// Identity derived from the identifying attributes.
    fn identity(&self) -> Identity;

    /// Cross-field checks the schema cannot express.
    fn validate(&self, _diags: &mut Diagnostics) {}

    /// Render `set` lines, identity line first.
    fn render(&self) -> std::result::Result<Vec<String>, RenderError>;

    /// Command fetching the object as relative `set` lines.
    fn show_command(identity: &Identity) -> String;

    /// Rebuild the attribute set from a non-empty snapshot.
    fn parse(identity: &Identity, snapshot: &Snapshot) -> setline::Result<Self>;

    /// Lines removing the object and its whole subtree.
    fn delete_lines(identity: &Identity) -> Vec<String>;

    /// Objects that must not exist before this one is created.
    fn collisions(_identity: &Identity) -> Vec<Collision> {
        Vec::new()
    }
}

/// Run schema and custom validation on a typed resource.
pub fn check<R: Resource>(resource: &R) -> Result<()> {
    let value = serde_json::to_value(resource)?;
    let mut diags = R::schema().validate(&value);
    let mut custom = Diagnostics::new();
    resource.validate(&mut custom);
    diags.merge(custom);
    if diags.has_errors() {
        return Err(Error::Validation {
            resource: format!("{} {}", R::TYPE_NAME, resource.identity()),
            diagnostics: diags,
        });
    }
    Ok(())
}

/// Report a block-level mismatch the schema validator cannot see.
pub fn require_one_of(
    diags: &mut Diagnostics,
    path: &crate::diag::AttrPath,
    present: &[(&str, bool)],
) {
    if present.iter().any(|(_, set)| *set) {
        return;
    }
    let names: Vec<String> = present.iter().map(|(n, _)| format!("\"{}\"", path.join(n))).collect();
    diags.error_at(
        path.clone(),
        summary::MISSING,
        format!("one of {} must be specified", names.join(", ")),
    );
}
