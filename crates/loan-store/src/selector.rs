use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;

use crate::error::StoreResult;

/// A rich-query selector: a conjunction of field equality predicates.
///
/// Predicates are kept in insertion order so that identical builder calls
/// always render identical query strings. Values are carried as data and
/// escaped on rendering, never spliced into query text.
///
/// ```
/// use loan_store::Selector;
///
/// let selector = Selector::new()
///     .where_eq("Type", "lender")
///     .where_eq("username", "alice");
/// assert_eq!(
///     selector.to_query_string().unwrap(),
///     r#"{"selector":{"Type":"lender","username":"alice"}}"#,
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Selector {
    predicates: Vec<(String, String)>,
}

impl Selector {
    /// An empty selector, which matches every JSON object document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`.
    ///
    /// Requiring the same field twice keeps its original position and
    /// replaces the value.
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        let field = field.into();
        let value = value.into();
        match self.predicates.iter_mut().find(|(f, _)| *f == field) {
            Some((_, existing)) => *existing = value,
            None => self.predicates.push((field, value)),
        }
        self
    }

    /// The predicates, in insertion order.
    pub fn predicates(&self) -> impl Iterator<Item = (&str, &str)> {
        self.predicates.iter().map(|(f, v)| (f.as_str(), v.as_str()))
    }

    /// The value required for `field`, if any.
    pub fn value_of(&self, field: &str) -> Option<&str> {
        self.predicates
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, v)| v.as_str())
    }

    /// Number of predicates.
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Returns `true` if there are no predicates.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Evaluate the selector against a decoded document.
    ///
    /// Only JSON objects can match. Every predicate field must be present as
    /// a string equal to the required value.
    pub fn matches(&self, document: &Value) -> bool {
        let Some(object) = document.as_object() else {
            return false;
        };
        self.predicates.iter().all(|(field, value)| {
            matches!(object.get(field), Some(Value::String(s)) if s == value)
        })
    }

    /// Render as a CouchDB-style query string: `{"selector":{...}}`.
    pub fn to_query_string(&self) -> StoreResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Inner `{"field":"value",...}` object, in insertion order.
struct Predicates<'a>(&'a [(String, String)]);

impl Serialize for Predicates<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, value) in self.0 {
            map.serialize_entry(field, value)?;
        }
        map.end()
    }
}

impl Serialize for Selector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("selector", &Predicates(&self.predicates))?;
        map.end()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self.to_query_string().map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}
