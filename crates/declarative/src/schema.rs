//! Resource schemas and structural validation.
//!
//! A [`Schema`] declares a resource's attributes and nested blocks together
//! with their constraints and plan-time behavior. Validation works on the
//! JSON form of a resource (as written in configuration, or as serialized
//! from its typed struct) and reports every violation with its path.
//!
//! Presence follows the device dialect: an attribute counts as set when it is
//! not null, not `false` and not an empty list, because those values render
//! no configuration line at all.

use crate::diag::{AttrPath, Diagnostics, summary};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, PoisonError};

/// Semantic type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrKind {
    /// A single string
    String,
    /// A signed 64-bit integer
    Int64,
    /// A boolean flag
    Bool,
    /// Unordered unique strings
    StringSet,
    /// Ordered strings
    StringList,
}

impl AttrKind {
    /// Human-readable type name.
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int64 => "integer",
            Self::Bool => "boolean",
            Self::StringSet => "set of strings",
            Self::StringList => "list of strings",
        }
    }
}

/// Whether an attribute must, may or cannot be configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    /// Must be configured
    Required,
    /// May be configured
    Optional,
    /// Set by the provider only
    Computed,
}

/// Plan-time behavior of an attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanBehavior {
    /// Changing the value replaces the object instead of updating it
    RequiresReplace,
    /// Value used when the attribute is not configured
    Default(Value),
}

/// Character classes accepted for Junos object names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NameFormat {
    /// Letters, digits, `-` and `_`
    Default,
    /// [`NameFormat::Default`] plus `.`, `/` and `:`
    Address,
}

impl NameFormat {
    fn accepts(self, c: char) -> bool {
        let base = c.is_ascii_alphanumeric() || c == '-' || c == '_';
        match self {
            Self::Default => base,
            Self::Address => base || matches!(c, '.' | '/' | ':'),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::Default => "letters, digits, '-' and '_'",
            Self::Address => "letters, digits, '-', '_', '.', '/' and ':'",
        }
    }
}

/// A constraint on an attribute value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    /// String length bounds, inclusive
    Length {
        /// Minimum length
        min: usize,
        /// Maximum length
        max: usize,
    },
    /// Value must match a regular expression
    Pattern {
        /// The expression
        regex: &'static str,
        /// Explanation shown on mismatch
        message: &'static str,
    },
    /// Integer bounds, inclusive
    Range {
        /// Minimum value
        min: i64,
        /// Maximum value
        max: i64,
    },
    /// Value must be one of a fixed set
    OneOf(&'static [&'static str]),
    /// Cannot be set together with any of these siblings
    ConflictsWith(&'static [&'static str]),
    /// Requires every one of these siblings to be set
    AlsoRequires(&'static [&'static str]),
    /// Allowed characters for names
    Format(NameFormat),
    /// Free text must not contain a double quote
    NoDoubleQuote,
}

/// One attribute of a resource or block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    /// Attribute name
    pub name: &'static str,
    /// Semantic type
    pub kind: AttrKind,
    /// Required, optional or computed
    pub presence: Presence,
    /// Human-readable description
    pub description: &'static str,
    /// Value constraints
    pub constraints: Vec<Constraint>,
    /// Plan-time behavior
    pub plan: Vec<PlanBehavior>,
}

impl Attribute {
    fn new(name: &'static str, kind: AttrKind, presence: Presence) -> Self {
        Self {
            name,
            kind,
            presence,
            description: "",
            constraints: Vec::new(),
            plan: Vec::new(),
        }
    }

    /// A required attribute.
    pub fn required(name: &'static str, kind: AttrKind) -> Self {
        Self::new(name, kind, Presence::Required)
    }

    /// An optional attribute.
    pub fn optional(name: &'static str, kind: AttrKind) -> Self {
        Self::new(name, kind, Presence::Optional)
    }

    /// A provider-set attribute.
    pub fn computed(name: &'static str, kind: AttrKind) -> Self {
        Self::new(name, kind, Presence::Computed)
    }

    /// Set the description.
    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Bound the string length.
    pub fn length(mut self, min: usize, max: usize) -> Self {
        self.constraints.push(Constraint::Length { min, max });
        self
    }

    /// Require a regular expression match.
    pub fn pattern(mut self, regex: &'static str, message: &'static str) -> Self {
        self.constraints.push(Constraint::Pattern { regex, message });
        self
    }

    /// Bound the integer value.
    pub fn range(mut self, min: i64, max: i64) -> Self {
        self.constraints.push(Constraint::Range { min, max });
        self
    }

    /// Restrict to an enumeration.
    pub fn one_of(mut self, values: &'static [&'static str]) -> Self {
        self.constraints.push(Constraint::OneOf(values));
        self
    }

    /// Declare mutually exclusive siblings.
    pub fn conflicts_with(mut self, others: &'static [&'static str]) -> Self {
        self.constraints.push(Constraint::ConflictsWith(others));
        self
    }

    /// Declare siblings that must be set together with this one.
    pub fn also_requires(mut self, others: &'static [&'static str]) -> Self {
        self.constraints.push(Constraint::AlsoRequires(others));
        self
    }

    /// Restrict the characters of a name.
    pub fn format(mut self, format: NameFormat) -> Self {
        self.constraints.push(Constraint::Format(format));
        self
    }

    /// Reject double quotes in free text.
    pub fn no_double_quote(mut self) -> Self {
        self.constraints.push(Constraint::NoDoubleQuote);
        self
    }

    /// Changing this attribute replaces the object.
    pub fn requires_replace(mut self) -> Self {
        self.plan.push(PlanBehavior::RequiresReplace);
        self
    }

    /// Value used when not configured.
    pub fn default_value(mut self, value: Value) -> Self {
        self.plan.push(PlanBehavior::Default(value));
        self
    }

    /// Whether changing this attribute forces replacement.
    pub fn is_requires_replace(&self) -> bool {
        self.plan.contains(&PlanBehavior::RequiresReplace)
    }

    fn default(&self) -> Option<&Value> {
        self.plan.iter().find_map(|p| match p {
            PlanBehavior::Default(v) => Some(v),
            PlanBehavior::RequiresReplace => None,
        })
    }
}

/// A nested block, repeatable or singleton.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockSchema {
    /// Block name
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Identifying attribute, unique across entries
    pub key: Option<&'static str>,
    /// Minimum number of entries
    pub min_items: usize,
    /// Maximum number of entries
    pub max_items: Option<usize>,
    /// Siblings that cannot be set together with this block
    pub conflicts: &'static [&'static str],
    /// Block attributes
    pub attributes: Vec<Attribute>,
    /// Nested blocks
    pub blocks: Vec<BlockSchema>,
}

impl BlockSchema {
    /// A repeatable block.
    pub fn list(name: &'static str) -> Self {
        Self {
            name,
            description: "",
            key: None,
            min_items: 0,
            max_items: None,
            conflicts: &[],
            attributes: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// A block that appears at most once.
    pub fn single(name: &'static str) -> Self {
        Self {
            max_items: Some(1),
            ..Self::list(name)
        }
    }

    /// Set the description.
    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Entries are identified by `attr`.
    pub fn keyed_by(mut self, attr: &'static str) -> Self {
        self.key = Some(attr);
        self
    }

    /// Require at least `n` entries.
    pub fn min_items(mut self, n: usize) -> Self {
        self.min_items = n;
        self
    }

    /// Declare mutually exclusive siblings.
    pub fn conflicts_with(mut self, others: &'static [&'static str]) -> Self {
        self.conflicts = others;
        self
    }

    /// Add an attribute.
    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.attributes.push(attr);
        self
    }

    /// Add a nested block.
    pub fn block(mut self, block: Self) -> Self {
        self.blocks.push(block);
        self
    }
}

/// The schema of a resource type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    /// Schema version
    pub version: u32,
    /// Human-readable description
    pub description: &'static str,
    /// Top-level attributes, in rendering order
    pub attributes: Vec<Attribute>,
    /// Top-level blocks, in rendering order
    pub blocks: Vec<BlockSchema>,
}

impl Schema {
    /// An empty schema.
    pub fn new(version: u32) -> Self {
        Self {
            version,
            description: "",
            attributes: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Set the description.
    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Add an attribute.
    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.attributes.push(attr);
        self
    }

    /// Add a block.
    pub fn block(mut self, block: BlockSchema) -> Self {
        self.blocks.push(block);
        self
    }

    /// Look up a top-level attribute.
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Top-level attributes whose change forces replacement.
    pub fn requires_replace(&self) -> Vec<&'static str> {
        self.attributes
            .iter()
            .filter(|a| a.is_requires_replace())
            .map(|a| a.name)
            .collect()
    }

    /// Check `value` against the schema, collecting every violation.
    pub fn validate(&self, value: &Value) -> Diagnostics {
        let mut diags = Diagnostics::new();
        match value.as_object() {
            Some(obj) => {
                validate_object(&self.attributes, &self.blocks, obj, &AttrPath::root(), &mut diags);
            }
            None => diags.error(summary::TYPE, "resource configuration must be a table"),
        }
        diags
    }

    /// Fill in defaults for attributes that are not configured.
    pub fn apply_defaults(&self, value: &mut Value) {
        if let Some(obj) = value.as_object_mut() {
            fill_defaults(&self.attributes, &self.blocks, obj);
        }
    }
}

/// Whether a value renders any configuration.
pub fn is_set(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null | Value::Bool(false)) => false,
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

fn validate_object(
    attributes: &[Attribute],
    blocks: &[BlockSchema],
    obj: &Map<String, Value>,
    path: &AttrPath,
    diags: &mut Diagnostics,
) {
    for key in obj.keys() {
        let known = attributes.iter().any(|a| a.name == key) || blocks.iter().any(|b| b.name == key);
        if !known {
            diags.error_at(
                path.join(key),
                "Unsupported Argument",
                format!("an argument named \"{key}\" is not expected here"),
            );
        }
    }

    for attr in attributes {
        validate_attribute(attr, obj, path, diags);
    }

    for block in blocks {
        validate_block(block, obj, path, diags);
    }
}

fn validate_attribute(
    attr: &Attribute,
    obj: &Map<String, Value>,
    parent: &AttrPath,
    diags: &mut Diagnostics,
) {
    let path = parent.join(attr.name);
    let value = obj.get(attr.name).filter(|v| !v.is_null());

    let Some(value) = value else {
        if attr.presence == Presence::Required {
            diags.error_at(
                path,
                summary::MISSING,
                format!("the argument \"{}\" is required", attr.name),
            );
        }
        return;
    };

    if attr.presence == Presence::Computed {
        diags.error_at(
            path,
            summary::INVALID,
            format!("\"{}\" is computed and cannot be configured", attr.name),
        );
        return;
    }

    let strings: Vec<&str> = match (attr.kind, value) {
        (AttrKind::String, Value::String(s)) => vec![s.as_str()],
        (AttrKind::Int64, Value::Number(n)) if n.is_i64() => Vec::new(),
        (AttrKind::Bool, Value::Bool(_)) => Vec::new(),
        (AttrKind::StringSet | AttrKind::StringList, Value::Array(items))
            if items.iter().all(Value::is_string) =>
        {
            items.iter().filter_map(Value::as_str).collect()
        }
        _ => {
            diags.error_at(
                path,
                summary::TYPE,
                format!("\"{}\" must be a {}", attr.name, attr.kind.name()),
            );
            return;
        }
    };

    if attr.kind == AttrKind::StringSet {
        let mut seen = HashMap::new();
        for (i, s) in strings.iter().enumerate() {
            if let Some(first) = seen.insert(*s, i) {
                diags.error_at(
                    path.index(i),
                    summary::DUPLICATE,
                    format!("duplicate element {s:?} (first at index {first})"),
                );
            }
        }
    }

    for constraint in &attr.constraints {
        match constraint {
            Constraint::Range { min, max } => {
                if let Some(n) = value.as_i64()
                    && (n < *min || n > *max)
                {
                    diags.error_at(
                        path.clone(),
                        summary::INVALID,
                        format!("value must be between {min} and {max}, got {n}"),
                    );
                }
            }
            Constraint::ConflictsWith(others) => {
                if !is_set(Some(value)) {
                    continue;
                }
                for other in *others {
                    if is_set(obj.get(*other)) {
                        diags.error_at(
                            path.clone(),
                            summary::CONFLICT,
                            format!(
                                "\"{path}\" cannot be specified when \"{}\" is specified",
                                parent.join(other)
                            ),
                        );
                    }
                }
            }
            Constraint::AlsoRequires(others) => {
                if !is_set(Some(value)) {
                    continue;
                }
                for other in *others {
                    if !is_set(obj.get(*other)) {
                        diags.error_at(
                            path.clone(),
                            summary::MISSING,
                            format!(
                                "\"{}\" must be specified when \"{path}\" is specified",
                                parent.join(other)
                            ),
                        );
                    }
                }
            }
            _ => {
                let element_path = |i: usize| {
                    if attr.kind == AttrKind::String {
                        path.clone()
                    } else {
                        path.index(i)
                    }
                };
                for (i, s) in strings.iter().enumerate() {
                    if let Some(problem) = check_string(constraint, s) {
                        diags.error_at(element_path(i), summary::INVALID, problem);
                    }
                }
            }
        }
    }
}

/// Compiled `Pattern` constraints, keyed by their source.
static PATTERNS: LazyLock<Mutex<HashMap<&'static str, Regex>>> = LazyLock::new(Default::default);

fn compiled(pattern: &'static str) -> Result<Regex, regex::Error> {
    let mut cache = PATTERNS.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(re) = cache.get(pattern) {
        return Ok(re.clone());
    }
    let re = Regex::new(pattern)?;
    cache.insert(pattern, re.clone());
    Ok(re)
}

fn check_string(constraint: &Constraint, s: &str) -> Option<String> {
    match constraint {
        Constraint::Length { min, max } => {
            let len = s.chars().count();
            (len < *min || len > *max)
                .then(|| format!("string length must be between {min} and {max}, got {len}"))
        }
        Constraint::Pattern { regex, message } => match compiled(*regex) {
            Ok(re) if re.is_match(s) => None,
            Ok(_) => Some(format!("{s:?} {message}")),
            Err(e) => Some(format!("invalid pattern {regex:?}: {e}")),
        },
        Constraint::OneOf(values) => (!values.contains(&s))
            .then(|| format!("value must be one of: {}, got {s:?}", values.join(", "))),
        Constraint::Format(format) => s
            .chars()
            .find(|c| !format.accepts(*c))
            .map(|c| format!("{s:?} contains {c:?}; only {} are allowed", format.describe())),
        Constraint::NoDoubleQuote => s
            .contains('"')
            .then(|| format!("{s:?} must not contain a double quote")),
        Constraint::Range { .. } | Constraint::ConflictsWith(_) | Constraint::AlsoRequires(_) => {
            None
        }
    }
}

fn validate_block(
    block: &BlockSchema,
    obj: &Map<String, Value>,
    parent: &AttrPath,
    diags: &mut Diagnostics,
) {
    let path = parent.join(block.name);
    let items: Vec<&Map<String, Value>> = match obj.get(block.name) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Object(item)) => vec![item],
        Some(Value::Array(items)) => {
            let mut maps = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                match item.as_object() {
                    Some(map) => maps.push(map),
                    None => diags.error_at(
                        path.index(i),
                        summary::TYPE,
                        format!("each \"{}\" entry must be a table", block.name),
                    ),
                }
            }
            maps
        }
        Some(_) => {
            diags.error_at(
                path,
                summary::TYPE,
                format!("\"{}\" must be a block", block.name),
            );
            return;
        }
    };

    if items.len() < block.min_items {
        diags.error_at(
            path.clone(),
            summary::MISSING,
            format!(
                "at least {} \"{}\" block(s) required, got {}",
                block.min_items,
                block.name,
                items.len()
            ),
        );
    }
    if let Some(max) = block.max_items
        && items.len() > max
    {
        diags.error_at(
            path.clone(),
            summary::BLOCK_COUNT,
            format!("at most {max} \"{}\" block(s) allowed, got {}", block.name, items.len()),
        );
    }

    if !items.is_empty() {
        for other in block.conflicts {
            if is_set(obj.get(*other)) {
                diags.error_at(
                    path.clone(),
                    summary::CONFLICT,
                    format!(
                        "\"{path}\" cannot be specified when \"{}\" is specified",
                        parent.join(other)
                    ),
                );
            }
        }
    }

    let single = matches!(obj.get(block.name), Some(Value::Object(_)));
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (i, item) in items.iter().enumerate() {
        let item_path = if single { path.clone() } else { path.index(i) };
        if let Some(key) = block.key
            && let Some(name) = item.get(key).and_then(Value::as_str)
            && let Some(first) = seen.insert(name, i)
        {
            diags.error_at(
                item_path.clone(),
                summary::DUPLICATE,
                format!(
                    "multiple blocks {} with the same name {name} (first at index {first})",
                    block.name
                ),
            );
        }
        validate_object(&block.attributes, &block.blocks, item, &item_path, diags);
    }
}

fn fill_defaults(attributes: &[Attribute], blocks: &[BlockSchema], obj: &mut Map<String, Value>) {
    for attr in attributes {
        if let Some(default) = attr.default()
            && obj.get(attr.name).is_none_or(Value::is_null)
        {
            obj.insert(attr.name.to_string(), default.clone());
        }
    }
    for block in blocks {
        match obj.get_mut(block.name) {
            Some(Value::Array(items)) => {
                for item in items.iter_mut().filter_map(Value::as_object_mut) {
                    fill_defaults(&block.attributes, &block.blocks, item);
                }
            }
            Some(Value::Object(item)) => fill_defaults(&block.attributes, &block.blocks, item),
            _ => {}
        }
    }
}
