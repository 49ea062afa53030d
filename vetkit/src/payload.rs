//! Request payloads for driving form request validation in tests.
//!
//! A [`Payload`] is the body a test hands to the harness: a flat or nested
//! JSON object, built from `serde_json::json!`, a serializable value, or a
//! urlencoded form string.

use serde::Serialize;
use serde_json::{Map, Value};

/// The input data for a single validation run.
///
/// Field names map to JSON values, so nested objects and arrays work the
/// same way they do in a real request body.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use vetkit::payload::Payload;
///
/// let payload = Payload::from(json!({"email": "a@b.com"}));
/// assert_eq!(payload.get("email"), Some(&json!("a@b.com")));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    fields: Map<String, Value>,
}

impl Payload {
    /// Creates an empty payload.
    pub fn new() -> Self {
        Self { fields: Map::new() }
    }

    /// Builds a payload by serializing any value into a JSON object.
    ///
    /// # Panics
    ///
    /// Panics when the value does not serialize to a JSON object. Payloads
    /// model request bodies, which are always keyed by field name.
    pub fn from_serialize<T: Serialize>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(Value::Object(fields)) => Self { fields },
            Ok(other) => panic!("payload must serialize to a JSON object, got: {other}"),
            Err(err) => panic!("payload could not be serialized: {err}"),
        }
    }

    /// Builds a payload from a urlencoded form string such as
    /// `"email=a%40b.com&name=Jay"`. Every value comes out as a JSON string,
    /// matching how form bodies arrive on the wire.
    ///
    /// # Panics
    ///
    /// Panics when the string is not valid urlencoded form data.
    pub fn from_form_str(form: &str) -> Self {
        let pairs: Vec<(String, String)> = match serde_urlencoded::from_str(form) {
            Ok(pairs) => pairs,
            Err(err) => panic!("payload is not valid form data: {err}"),
        };
        pairs
            .into_iter()
            .map(|(name, value)| (name, Value::String(value)))
            .collect()
    }

    /// Adds a field, replacing any existing value under the same name.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Returns the value of a field, if present.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterates over the fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// The payload as a JSON value, ready for deserialization.
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// Pretty-printed JSON, used in assertion failure output.
    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(&self.fields).unwrap_or_else(|_| "{}".to_string())
    }
}

impl From<Value> for Payload {
    /// Converts a JSON value into a payload.
    ///
    /// # Panics
    ///
    /// Panics when the value is not a JSON object.
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            other => panic!("payload must be a JSON object, got: {other}"),
        }
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Payload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}
