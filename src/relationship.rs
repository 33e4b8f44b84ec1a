//! Relationship encoding: raw payloads to resource-identifier entries.
//!
//! Raw relationship data arrives in two shapes: a bare payload (a resource or
//! collection), or a wrapper object `{links?, meta?, data}`. Either way the
//! payload is classified and dispatched exactly like a document's `data`, and
//! each contained resource is reduced to its minimal `(type, id)` identifier.
//!
//! The parse path uses the same types through [`Relationships::from_value`],
//! which auto-upgrades bare `{type, id}` maps (to-one) and arrays of such
//! maps (to-many) into identifiers.

use crate::classify::ResourceInput;
use crate::element::{Links, Meta};
use crate::resource::ResourceIdentifier;
use crate::{Error, Result};
use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::Serialize;
use serde_json::Value;

/// Raw relationship data under one relationship name, before resolution.
#[derive(Clone, Debug)]
pub enum RelationshipInput {
    /// A bare resource or collection payload.
    Data(ResourceInput),
    /// A `{links?, meta?, data}` wrapper around the payload.
    Full {
        links: Option<Links>,
        meta: Option<Meta>,
        data: ResourceInput,
    },
}

impl RelationshipInput {
    /// Splits the input into its `(links, meta, data)` parts.
    pub(crate) fn into_parts(self) -> (Option<Links>, Option<Meta>, ResourceInput) {
        match self {
            RelationshipInput::Data(data) => (None, None, data),
            RelationshipInput::Full { links, meta, data } => (links, meta, data),
        }
    }
}

impl<T: Into<ResourceInput>> From<T> for RelationshipInput {
    fn from(data: T) -> Self {
        RelationshipInput::Data(data.into())
    }
}

/// The resolved `data` member of a relationship entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelationshipData {
    /// To-one.
    One(ResourceIdentifier),
    /// To-many, in payload order.
    Many(Vec<ResourceIdentifier>),
    /// An explicit empty to-one.
    Null,
}

impl Serialize for RelationshipData {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            RelationshipData::One(identifier) => identifier.serialize(serializer),
            RelationshipData::Many(identifiers) => {
                let mut seq = serializer.serialize_seq(Some(identifiers.len()))?;
                for identifier in identifiers {
                    seq.serialize_element(identifier)?;
                }
                seq.end()
            }
            RelationshipData::Null => serializer.serialize_unit(),
        }
    }
}

/// One resolved relationship: optional `links`/`meta` plus identifier data.
#[derive(Clone, Debug, PartialEq)]
pub struct RelationshipEntry {
    pub links: Option<Links>,
    pub meta: Option<Meta>,
    pub data: RelationshipData,
}

impl RelationshipEntry {
    /// Creates an entry carrying only identifier data.
    #[must_use]
    pub fn new(data: RelationshipData) -> Self {
        RelationshipEntry {
            links: None,
            meta: None,
            data,
        }
    }
}

impl Serialize for RelationshipEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(links) = &self.links {
            map.serialize_entry("links", links)?;
        }
        if let Some(meta) = &self.meta {
            map.serialize_entry("meta", meta)?;
        }
        map.serialize_entry("data", &self.data)?;
        map.end()
    }
}

/// An ordered map of relationship name to resolved entry.
///
/// Rejects the reserved names `id` and `type`.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Relationships {
    entries: IndexMap<String, RelationshipEntry>,
}

impl Relationships {
    /// Creates an empty relationships element.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReservedField`] if `name` is `id` or `type`.
    pub fn insert(&mut self, name: impl Into<String>, entry: RelationshipEntry) -> Result<&mut Self> {
        let name = name.into();
        if name == "id" || name == "type" {
            return Err(Error::reserved_field(&name, "relationships"));
        }
        self.entries.insert(name, entry);
        Ok(self)
    }

    /// Returns the entry under `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RelationshipEntry> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates over `(name, entry)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &RelationshipEntry)> {
        self.entries.iter()
    }

    /// Builds relationships from raw JSON, auto-upgrading bare `{type, id}`
    /// maps (to-one) and arrays of such maps (to-many) into identifiers.
    ///
    /// A member is treated as a `{links?, meta?, data}` wrapper when it is an
    /// object containing a `data` key; otherwise the whole member is the
    /// payload. Each entry is validated independently.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReservedField`] for the names `id`/`type`, and
    /// [`Error::InvalidElement`] for payloads that are not identifiers,
    /// identifier arrays, or `null`.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| {
            Error::invalid_element(format!("relationships must be an object, got {value}"))
        })?;

        let mut relationships = Relationships::new();
        for (name, member) in map {
            let (links, meta, payload) = match member.as_object() {
                Some(wrapper) if wrapper.contains_key("data") => {
                    let links = wrapper.get("links").map(Links::from_value).transpose()?;
                    let meta = wrapper.get("meta").map(Meta::from_value).transpose()?;
                    // Members other than links/meta/data are not part of a
                    // relationship entry and are dropped.
                    (links, meta, &wrapper["data"])
                }
                _ => (None, None, member),
            };

            let entry = RelationshipEntry {
                links,
                meta,
                data: data_from_value(payload)?,
            };
            relationships.insert(name.clone(), entry)?;
        }
        Ok(relationships)
    }
}

impl Serialize for Relationships {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, entry) in &self.entries {
            map.serialize_entry(name, entry)?;
        }
        map.end()
    }
}

/// Relationships input: an already-built element or raw JSON to upgrade.
#[derive(Clone, Debug)]
pub enum RelationshipsSource {
    Built(Relationships),
    Raw(Value),
}

impl RelationshipsSource {
    pub(crate) fn resolve(self) -> Result<Relationships> {
        match self {
            RelationshipsSource::Built(relationships) => Ok(relationships),
            RelationshipsSource::Raw(value) => Relationships::from_value(&value),
        }
    }
}

impl From<Relationships> for RelationshipsSource {
    fn from(relationships: Relationships) -> Self {
        RelationshipsSource::Built(relationships)
    }
}

impl From<Value> for RelationshipsSource {
    fn from(value: Value) -> Self {
        RelationshipsSource::Raw(value)
    }
}

/// Upgrades a raw relationship payload into identifier data.
fn data_from_value(payload: &Value) -> Result<RelationshipData> {
    match payload {
        Value::Null => Ok(RelationshipData::Null),
        Value::Object(_) => Ok(RelationshipData::One(identifier_from_value(payload)?)),
        Value::Array(items) => {
            let mut identifiers = Vec::with_capacity(items.len());
            for item in items {
                identifiers.push(identifier_from_value(item)?);
            }
            Ok(RelationshipData::Many(identifiers))
        }
        other => Err(Error::invalid_element(format!(
            "relationship data must be an identifier, identifier array or null, got {other}"
        ))),
    }
}

/// Upgrades a bare `{type, id}` map into a [`ResourceIdentifier`].
fn identifier_from_value(value: &Value) -> Result<ResourceIdentifier> {
    let map = value.as_object().ok_or_else(|| {
        Error::invalid_element(format!("resource identifier must be an object, got {value}"))
    })?;

    let kind = match map.get("type") {
        Some(Value::String(kind)) if !kind.is_empty() => kind.clone(),
        _ => {
            return Err(Error::invalid_element(
                "resource identifier must have a non-empty string `type`",
            ))
        }
    };

    let id = match map.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => {
            return Err(Error::invalid_element(
                "resource identifier must have a string or integer `id`",
            ))
        }
    };

    Ok(ResourceIdentifier::new(kind, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_to_one_upgrade() {
        let relationships =
            Relationships::from_value(&json!({"author": {"type": "people", "id": 9}})).unwrap();
        let entry = relationships.get("author").unwrap();
        assert_eq!(
            entry.data,
            RelationshipData::One(ResourceIdentifier::new("people", "9"))
        );
        assert!(entry.links.is_none());
    }

    #[test]
    fn test_wrapped_to_many_with_links_and_meta() {
        let relationships = Relationships::from_value(&json!({
            "comments": {
                "links": {"related": "/posts/1/comments"},
                "meta": {"count": 2},
                "data": [
                    {"type": "comments", "id": "5"},
                    {"type": "comments", "id": "12"}
                ]
            }
        }))
        .unwrap();

        let entry = relationships.get("comments").unwrap();
        assert!(entry.links.is_some());
        assert!(entry.meta.is_some());
        assert_eq!(
            entry.data,
            RelationshipData::Many(vec![
                ResourceIdentifier::new("comments", "5"),
                ResourceIdentifier::new("comments", "12"),
            ])
        );
    }

    #[test]
    fn test_null_data_kept_explicit() {
        let relationships =
            Relationships::from_value(&json!({"author": {"data": null}})).unwrap();
        assert_eq!(
            relationships.get("author").unwrap().data,
            RelationshipData::Null
        );
        assert_eq!(
            serde_json::to_value(&relationships).unwrap(),
            json!({"author": {"data": null}})
        );
    }

    #[test]
    fn test_reserved_names_rejected() {
        let err =
            Relationships::from_value(&json!({"type": {"data": null}})).unwrap_err();
        assert_eq!(err, Error::reserved_field("type", "relationships"));
    }

    #[test]
    fn test_identifier_requires_type_and_id() {
        assert!(Relationships::from_value(&json!({"author": {"type": "people"}})).is_err());
        assert!(Relationships::from_value(&json!({"author": {"id": "9"}})).is_err());
    }

    #[test]
    fn test_serialized_shape() {
        let mut relationships = Relationships::new();
        relationships
            .insert(
                "author",
                RelationshipEntry::new(RelationshipData::One(ResourceIdentifier::new(
                    "people", "9",
                ))),
            )
            .unwrap();
        assert_eq!(
            serde_json::to_value(&relationships).unwrap(),
            json!({"author": {"data": {"type": "people", "id": "9"}}})
        );
    }
}
