//! Order-preserving schema document parsing.
//!
//! Catalog schema documents are JSON objects made of named groups, for example:
//!
//! ```json
//! {
//!   "component": { "kind": "component", "scheme": "timer", "syntax": "timer:timerName" },
//!   "properties": {
//!     "timerName": { "kind": "path", "required": true, "type": "string" },
//!     "period": { "kind": "parameter", "type": "duration", "defaultValue": "1000" }
//!   }
//! }
//! ```
//!
//! Rows are emitted in the order members appear in the source text. Callers
//! display and positionally match rows, so the document is decoded straight
//! into ordered pairs and never into a keyed map.

use std::fmt;

use serde::de::{Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};

use crate::error::SchemaError;

/// A decoded schema value, discriminated by the shape of the JSON value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaValue {
    Null,
    /// Strings, plus booleans and numbers kept in their textual form.
    Scalar(String),
    /// Object members in source order.
    Object(Vec<(String, SchemaValue)>),
    List(Vec<SchemaValue>),
}

impl SchemaValue {
    /// Returns the scalar text, if this is a scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SchemaValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the object members, or an empty slice for non-objects.
    pub fn members(&self) -> &[(String, SchemaValue)] {
        match self {
            SchemaValue::Object(members) => members,
            _ => &[],
        }
    }

    /// Looks up the first object member with the given key.
    pub fn get(&self, key: &str) -> Option<&SchemaValue> {
        self.members()
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// Returns true for `true` in either boolean or string form.
    pub fn is_true(&self) -> bool {
        self.as_str() == Some("true")
    }

    /// Flattens the value into a list of scalars.
    ///
    /// Lists yield their scalar items, a scalar is split on commas. Used for
    /// `enum` attributes, which older schemas encode as `"a,b,c"`.
    pub fn to_string_list(&self) -> Vec<String> {
        match self {
            SchemaValue::Scalar(s) if s.is_empty() => Vec::new(),
            SchemaValue::Scalar(s) => s.split(',').map(|v| v.trim().to_string()).collect(),
            SchemaValue::List(items) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl<'de> Deserialize<'de> for SchemaValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(SchemaValueVisitor)
    }
}

struct SchemaValueVisitor;

impl<'de> Visitor<'de> for SchemaValueVisitor {
    type Value = SchemaValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<SchemaValue, E> {
        Ok(SchemaValue::Scalar(v.to_string()))
    }

    fn visit_i64<E>(self, v: i64) -> Result<SchemaValue, E> {
        Ok(SchemaValue::Scalar(v.to_string()))
    }

    fn visit_u64<E>(self, v: u64) -> Result<SchemaValue, E> {
        Ok(SchemaValue::Scalar(v.to_string()))
    }

    fn visit_f64<E>(self, v: f64) -> Result<SchemaValue, E> {
        Ok(SchemaValue::Scalar(v.to_string()))
    }

    fn visit_str<E>(self, v: &str) -> Result<SchemaValue, E> {
        Ok(SchemaValue::Scalar(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<SchemaValue, E> {
        Ok(SchemaValue::Scalar(v))
    }

    fn visit_unit<E>(self) -> Result<SchemaValue, E> {
        Ok(SchemaValue::Null)
    }

    fn visit_none<E>(self) -> Result<SchemaValue, E> {
        Ok(SchemaValue::Null)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<SchemaValue, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(SchemaValue::List(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<SchemaValue, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut members = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, SchemaValue>()? {
            members.push((key, value));
        }
        Ok(SchemaValue::Object(members))
    }
}

/// One declaration from a schema group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRow {
    /// Group the row was declared in (e.g. "component", "properties").
    pub group: String,
    pub name: String,
    pub value: SchemaValue,
}

impl SchemaRow {
    /// Scalar attribute of a property row (`None` for absent or nested values).
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(SchemaValue::as_str)
    }
}

/// A parsed schema document: its top-level groups in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDocument {
    groups: Vec<(String, SchemaValue)>,
}

impl SchemaDocument {
    /// Parse schema text.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Malformed` if the text cannot be tokenized as JSON
    /// or its root is not an object.
    pub fn parse(text: &str) -> Result<Self, SchemaError> {
        let root: SchemaValue = serde_json::from_str(text)
            .map_err(|source| SchemaError::Malformed {
                source: Some(source),
            })?;
        match root {
            SchemaValue::Object(groups) => Ok(Self { groups }),
            _ => Err(SchemaError::Malformed { source: None }),
        }
    }

    /// Names of the top-level groups, in source order.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(name, _)| name.as_str())
    }

    /// Raw value of a top-level group.
    pub fn group(&self, name: &str) -> Option<&SchemaValue> {
        self.groups
            .iter()
            .find(|(group, _)| group == name)
            .map(|(_, value)| value)
    }

    /// Rows of a group, in declaration order.
    ///
    /// Object groups yield one row per member. Array groups yield the members
    /// of each object element in turn. Missing or scalar groups yield nothing.
    pub fn rows(&self, group: &str) -> Vec<SchemaRow> {
        let mut rows = Vec::new();
        match self.group(group) {
            Some(SchemaValue::Object(members)) => push_rows(group, members, &mut rows),
            Some(SchemaValue::List(items)) => {
                for item in items {
                    push_rows(group, item.members(), &mut rows);
                }
            }
            _ => {}
        }
        rows
    }

    /// Scalar value of a row in a group (e.g. `component` / `syntax`).
    pub fn scalar(&self, group: &str, name: &str) -> Option<&str> {
        match self.group(group)? {
            SchemaValue::List(items) => items
                .iter()
                .find_map(|item| item.get(name).and_then(SchemaValue::as_str)),
            value => value.get(name).and_then(SchemaValue::as_str),
        }
    }
}

fn push_rows(group: &str, members: &[(String, SchemaValue)], rows: &mut Vec<SchemaRow>) {
    rows.extend(members.iter().map(|(name, value)| SchemaRow {
        group: group.to_string(),
        name: name.clone(),
        value: value.clone(),
    }));
}

/// Parse schema text and return the rows of one group.
///
/// # Errors
///
/// Returns `SchemaError::Malformed` if the text cannot be parsed.
pub fn parse_json_schema(group: &str, text: &str) -> Result<Vec<SchemaRow>, SchemaError> {
    Ok(SchemaDocument::parse(text)?.rows(group))
}
