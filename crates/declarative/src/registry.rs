//! Type-erased resource handlers.
//!
//! Configuration and state hold resources as JSON values tagged with a type
//! name. The registry maps those names to a [`ResourceType`] that decodes the
//! value into the concrete [`Resource`] and forwards to the [`Client`].

use crate::client::Client;
use crate::diag::{Diagnostics, summary};
use crate::error::{Error, Result};
use crate::resource::{Identity, ImportFormat, Resource};
use crate::schema::Schema;
use serde_json::Value;
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// Object-safe view of a resource type.
pub trait ResourceType: Send + Sync {
    /// Resource type name.
    fn type_name(&self) -> &'static str;

    /// Schema of the type.
    fn schema(&self) -> Schema;

    /// Import ID layout.
    fn import_format(&self) -> ImportFormat;

    /// Validate raw configuration, collecting every violation.
    fn validate(&self, config: &Value) -> Diagnostics;

    /// Decode and re-encode with defaults applied, for stable comparison.
    fn normalize(&self, config: &Value) -> Result<Value>;

    /// Identity of a configured or tracked object.
    fn identity(&self, config: &Value) -> Result<Identity>;

    /// Render the `set` lines of a configured object.
    fn render(&self, config: &Value) -> Result<Vec<String>>;

    /// Lines a delete would send.
    fn delete_lines(&self, prior: &Value) -> Result<Vec<String>>;

    /// Create on the device.
    fn create(&self, client: &Client, planned: &Value) -> Result<Value>;

    /// Read by identity.
    fn read(&self, client: &Client, identity: &Identity) -> Result<Option<Value>>;

    /// Refresh tracked state.
    fn refresh(&self, client: &Client, prior: &Value) -> Result<Option<Value>>;

    /// Replace `prior` with `planned`.
    fn update(&self, client: &Client, prior: &Value, planned: &Value) -> Result<Value>;

    /// Delete from the device.
    fn delete(&self, client: &Client, prior: &Value) -> Result<()>;

    /// Adopt by import ID.
    fn import(&self, client: &Client, id: &str) -> Result<Value>;
}

/// Adapter from a typed [`Resource`] to [`ResourceType`].
pub struct Handler<R>(PhantomData<fn() -> R>);

impl<R> Default for Handler<R> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

fn decode<R: Resource>(value: &Value) -> Result<R> {
    let mut value = value.clone();
    R::schema().apply_defaults(&mut value);
    Ok(serde_json::from_value(value)?)
}

fn encode<R: Resource>(resource: &R) -> Result<Value> {
    Ok(serde_json::to_value(resource)?)
}

impl<R: Resource> ResourceType for Handler<R> {
    fn type_name(&self) -> &'static str {
        R::TYPE_NAME
    }

    fn schema(&self) -> Schema {
        R::schema()
    }

    fn import_format(&self) -> ImportFormat {
        R::IMPORT_FORMAT
    }

    fn validate(&self, config: &Value) -> Diagnostics {
        let mut diags = R::schema().validate(config);
        match decode::<R>(config) {
            Ok(resource) => {
                let mut custom = Diagnostics::new();
                resource.validate(&mut custom);
                diags.merge(custom);
            }
            // a schema error already explains why decoding failed
            Err(e) if !diags.has_errors() => diags.error(summary::TYPE, e.to_string()),
            Err(_) => {}
        }
        diags
    }

    fn normalize(&self, config: &Value) -> Result<Value> {
        encode(&decode::<R>(config)?)
    }

    fn identity(&self, config: &Value) -> Result<Identity> {
        Ok(decode::<R>(config)?.identity())
    }

    fn render(&self, config: &Value) -> Result<Vec<String>> {
        Ok(decode::<R>(config)?.render()?)
    }

    fn delete_lines(&self, prior: &Value) -> Result<Vec<String>> {
        Ok(R::delete_lines(&decode::<R>(prior)?.identity()))
    }

    fn create(&self, client: &Client, planned: &Value) -> Result<Value> {
        encode(&client.create(&decode::<R>(planned)?)?)
    }

    fn read(&self, client: &Client, identity: &Identity) -> Result<Option<Value>> {
        client.read::<R>(identity)?.as_ref().map(encode).transpose()
    }

    fn refresh(&self, client: &Client, prior: &Value) -> Result<Option<Value>> {
        client
            .refresh(&decode::<R>(prior)?)?
            .as_ref()
            .map(encode)
            .transpose()
    }

    fn update(&self, client: &Client, prior: &Value, planned: &Value) -> Result<Value> {
        let prior = decode::<R>(prior)?;
        encode(&client.update(&prior, &decode::<R>(planned)?)?)
    }

    fn delete(&self, client: &Client, prior: &Value) -> Result<()> {
        client.delete(&decode::<R>(prior)?)
    }

    fn import(&self, client: &Client, id: &str) -> Result<Value> {
        encode(&client.import::<R>(id)?)
    }
}

/// Registered resource types by name.
#[derive(Default)]
pub struct Registry {
    types: BTreeMap<&'static str, Box<dyn ResourceType>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `R` under its type name.
    #[must_use]
    pub fn with<R: Resource>(mut self) -> Self {
        self.register::<R>();
        self
    }

    /// Register `R` under its type name.
    pub fn register<R: Resource>(&mut self) {
        self.types
            .insert(R::TYPE_NAME, Box::new(Handler::<R>::default()));
    }

    /// Look up a handler.
    pub fn get(&self, type_name: &str) -> Result<&dyn ResourceType> {
        self.types
            .get(type_name)
            .map(|handler| &**handler)
            .ok_or_else(|| Error::UnknownType(type_name.to_string()))
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.types.keys().copied()
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no type is registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Options;
    use crate::client::tests::{MockTransport, Thing};
    use serde_json::json;

    #[test]
    fn test_unknown_type() {
        let registry = Registry::new().with::<Thing>();
        assert_eq!(registry.len(), 1);
        assert!(registry.get("test_thing").is_ok());
        assert!(matches!(registry.get("nope"), Err(Error::UnknownType(_))));
    }

    #[test]
    fn test_validate_raw_config() {
        let registry = Registry::new().with::<Thing>();
        let handler = registry.get("test_thing").unwrap();
        assert!(handler.validate(&json!({"name": "a", "value": "v"})).is_empty());

        let diags = handler.validate(&json!({"name": "a", "value": "v", "extra": 1}));
        assert!(diags.has_errors());
        let diags = handler.validate(&json!({"name": "a"}));
        assert!(diags.has_errors());
    }

    #[test]
    fn test_roundtrip_through_client() {
        let registry = Registry::new().with::<Thing>();
        let handler = registry.get("test_thing").unwrap();
        let client = Client::new(Box::new(MockTransport::default()), Options::default());

        let planned = json!({"name": "a", "value": "v"});
        assert_eq!(
            handler.render(&planned).unwrap(),
            vec!["set things thing a value \"v\""]
        );
        let created = handler.create(&client, &planned).unwrap();
        assert_eq!(created, planned);

        let imported = handler.import(&client, "a").unwrap();
        assert_eq!(imported, planned);

        handler.delete(&client, &created).unwrap();
        let identity = handler.identity(&created).unwrap();
        assert_eq!(handler.read(&client, &identity).unwrap(), None);
    }
}
