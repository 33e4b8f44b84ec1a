//! The materialized resource view and resource identifiers.
//!
//! A [`Resource`] is the typed, identified unit of the wire format: `type`,
//! `id`, `attributes`, `relationships`, `links`, `meta`. Resources are
//! produced by adapting a domain object through its registered
//! [`ResourceAdapter`](crate::ResourceAdapter), or by materializing a
//! [`FlexibleResource`](crate::FlexibleResource); once attached to a document
//! they are immutable.
//!
//! A [`ResourceIdentifier`] is the minimal `(type, id)` reference used inside
//! relationships; equality is exactly on that pair.

use crate::element::{Links, Meta};
use crate::relationship::{RelationshipEntry, Relationships};
use crate::{Error, Result};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};

/// A resource id accepted as either a string or an integer, coerced to its
/// wire string form.
///
/// # Examples
///
/// ```rust
/// use jsonapi_document::ResourceId;
///
/// assert_eq!(ResourceId::from(7).as_str(), "7");
/// assert_eq!(ResourceId::from("7").as_str(), "7");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceId(String);

impl ResourceId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        ResourceId(id)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        ResourceId(id.to_string())
    }
}

impl From<i32> for ResourceId {
    fn from(id: i32) -> Self {
        ResourceId(id.to_string())
    }
}

impl From<i64> for ResourceId {
    fn from(id: i64) -> Self {
        ResourceId(id.to_string())
    }
}

impl From<u32> for ResourceId {
    fn from(id: u32) -> Self {
        ResourceId(id.to_string())
    }
}

impl From<u64> for ResourceId {
    fn from(id: u64) -> Self {
        ResourceId(id.to_string())
    }
}

/// The minimal `(type, id)` reference used inside relationships.
///
/// # Examples
///
/// ```rust
/// use jsonapi_document::ResourceIdentifier;
///
/// let a = ResourceIdentifier::new("posts", "1");
/// let b = ResourceIdentifier::new("posts", "1");
/// assert_eq!(a, b);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceIdentifier {
    kind: String,
    id: String,
}

impl ResourceIdentifier {
    #[must_use]
    pub fn new(kind: impl Into<String>, id: impl Into<ResourceId>) -> Self {
        ResourceIdentifier {
            kind: kind.into(),
            id: id.into().into_string(),
        }
    }

    /// The resource type.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The resource id, string-coerced.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Serialize for ResourceIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", &self.kind)?;
        map.serialize_entry("id", &self.id)?;
        map.end()
    }
}

/// Fails with [`Error::ReservedField`] if `keys` contains `id` or `type`.
pub(crate) fn check_reserved<'a>(
    keys: impl Iterator<Item = &'a String>,
    location: &str,
) -> Result<()> {
    for key in keys {
        if key == "id" || key == "type" {
            return Err(Error::reserved_field(key, location));
        }
    }
    Ok(())
}

/// A fully materialized resource object.
///
/// Serializes its members in wire order: `type`, `id` (only if non-empty),
/// `attributes` (only if non-empty), then `relationships`, `links`, `meta`
/// (each only if non-empty).
#[derive(Clone, Debug, PartialEq)]
pub struct Resource {
    kind: String,
    id: String,
    attributes: Map<String, Value>,
    relationships: Option<Relationships>,
    links: Option<Links>,
    meta: Option<Meta>,
}

impl Resource {
    /// Assembles a resource, enforcing the reserved-field invariant on
    /// attribute keys (relationship names are checked when the relationships
    /// element is built).
    pub(crate) fn assemble(
        kind: String,
        id: String,
        attributes: Map<String, Value>,
        relationships: Option<Relationships>,
        links: Option<Links>,
        meta: Option<Meta>,
    ) -> Result<Self> {
        check_reserved(attributes.keys(), "attributes")?;
        Ok(Resource {
            kind,
            id,
            attributes,
            relationships,
            links,
            meta,
        })
    }

    /// The resource type.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The resource id (empty string when never assigned).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The attribute map, in insertion order.
    #[must_use]
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// The relationships element, if any.
    #[must_use]
    pub fn relationships(&self) -> Option<&Relationships> {
        self.relationships.as_ref()
    }

    /// The named relationship entry, if any.
    #[must_use]
    pub fn relationship(&self, name: &str) -> Option<&RelationshipEntry> {
        self.relationships.as_ref().and_then(|r| r.get(name))
    }

    /// The links element, if any.
    #[must_use]
    pub fn links(&self) -> Option<&Links> {
        self.links.as_ref()
    }

    /// The meta element, if any.
    #[must_use]
    pub fn meta(&self) -> Option<&Meta> {
        self.meta.as_ref()
    }

    /// The `(type, id)` identifier of this resource.
    #[must_use]
    pub fn identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier::new(self.kind.clone(), self.id.as_str())
    }

    /// The dedup key: `Some((type, id))` once the identity is fixed, `None`
    /// while the id is still unassigned. Resources without a fixed identity
    /// never deduplicate against each other.
    #[must_use]
    pub(crate) fn key(&self) -> Option<(String, String)> {
        if self.id.is_empty() {
            return None;
        }
        Some((self.kind.clone(), self.id.clone()))
    }

    /// Looks up a queryable field by key: `"type"`, `"id"`, or an attribute
    /// dot-path such as `"attributes.title"`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jsonapi_document::{Document, FlexibleResource};
    /// use serde_json::json;
    ///
    /// let mut post = FlexibleResource::new();
    /// post.set_type("posts").unwrap();
    /// post.set_id(1);
    /// post.set_attribute("author", json!({"name": "A"}));
    ///
    /// let mut doc = Document::flexible();
    /// doc.set_data(post).unwrap();
    ///
    /// let resource = doc.query().first().unwrap();
    /// assert_eq!(resource.field("type"), Some(json!("posts")));
    /// assert_eq!(resource.field("attributes.author.name"), Some(json!("A")));
    /// assert_eq!(resource.field("attributes.missing"), None);
    /// ```
    #[must_use]
    pub fn field(&self, key: &str) -> Option<Value> {
        match key {
            "type" => return Some(Value::String(self.kind.clone())),
            "id" => return Some(Value::String(self.id.clone())),
            _ => {}
        }

        let mut segments = key.split('.');
        if segments.next() != Some("attributes") {
            return None;
        }

        let first = segments.next()?;
        let mut current = self.attributes.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current.clone())
    }
}

impl Serialize for Resource {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", &self.kind)?;
        if !self.id.is_empty() {
            map.serialize_entry("id", &self.id)?;
        }
        if !self.attributes.is_empty() {
            map.serialize_entry("attributes", &self.attributes)?;
        }
        if let Some(relationships) = &self.relationships {
            if !relationships.is_empty() {
                map.serialize_entry("relationships", relationships)?;
            }
        }
        if let Some(links) = &self.links {
            if !links.is_empty() {
                map.serialize_entry("links", links)?;
            }
        }
        if let Some(meta) = &self.meta {
            if !meta.is_empty() {
                map.serialize_entry("meta", meta)?;
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resource(kind: &str, id: &str, attributes: Value) -> Resource {
        let Value::Object(attributes) = attributes else {
            panic!("attributes fixture must be an object");
        };
        Resource::assemble(kind.into(), id.into(), attributes, None, None, None).unwrap()
    }

    #[test]
    fn test_reserved_attribute_rejected() {
        let attributes = json!({"type": "sneaky"}).as_object().unwrap().clone();
        let err = Resource::assemble("posts".into(), "1".into(), attributes, None, None, None)
            .unwrap_err();
        assert_eq!(err, Error::reserved_field("type", "attributes"));
    }

    #[test]
    fn test_serialization_order_and_omission() {
        let r = resource("posts", "1", json!({"title": "t"}));
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            json!({"type": "posts", "id": "1", "attributes": {"title": "t"}})
        );

        // Empty id and empty attributes are omitted
        let bare = resource("posts", "", json!({}));
        assert_eq!(serde_json::to_value(&bare).unwrap(), json!({"type": "posts"}));
    }

    #[test]
    fn test_identifier_equality_is_on_the_pair() {
        assert_eq!(
            ResourceIdentifier::new("posts", 1),
            ResourceIdentifier::new("posts", "1")
        );
        assert_ne!(
            ResourceIdentifier::new("posts", "1"),
            ResourceIdentifier::new("comments", "1")
        );
    }

    #[test]
    fn test_key_requires_fixed_identity() {
        assert_eq!(resource("posts", "", json!({})).key(), None);
        assert_eq!(
            resource("posts", "1", json!({})).key(),
            Some(("posts".into(), "1".into()))
        );
    }
}
