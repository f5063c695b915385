//! The decoded request envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder type name used in example arguments.
pub const EXAMPLE_EVENT_NAME: &str = "Module.Event";

/// Request naming an event type and carrying its optional payload.
///
/// Field names are accepted in lower or title case so callers written
/// against either convention decode alike.
///
/// # Example
///
/// ```
/// use eventgate_dispatch::Argument;
///
/// let argument: Argument =
///     serde_json::from_str(r#"{"Name":"Sales.OrderPlaced","Data":{"order":7}}"#)
///         .expect("valid argument");
/// assert_eq!(argument.name, "Sales.OrderPlaced");
/// assert!(argument.data.is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    /// Qualified name of the event type.
    #[serde(alias = "Name")]
    pub name: String,
    /// Event payload; absent means "construct the default event".
    #[serde(default, alias = "Data")]
    pub data: Option<Value>,
}

impl Argument {
    /// Creates an argument with a payload.
    #[must_use]
    pub fn new(name: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Returns the example argument shown to callers who sent a malformed
    /// or unknown request.
    #[must_use]
    pub fn example() -> Self {
        Self::new(EXAMPLE_EVENT_NAME, None)
    }

    /// Returns the argument as a canonical JSON tree.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut fields = serde_json::Map::with_capacity(2);
        fields.insert("name".to_owned(), Value::String(self.name.clone()));
        fields.insert("data".to_owned(), self.data.clone().unwrap_or(Value::Null));
        Value::Object(fields)
    }
}
