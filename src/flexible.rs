//! The schema-free, mutable resource.
//!
//! A [`FlexibleResource`] is built through explicit setters rather than a
//! compiled adapter. It serves two roles: hand-built ad hoc documents, and
//! the reconstruction target of the parser. It is only valid inside a
//! flexible document; its identity (`type` + `id`) becomes fixed for dedup
//! purposes once both are set.
//!
//! ## Examples
//!
//! ```rust
//! use jsonapi_document::{Document, FlexibleResource};
//! use serde_json::json;
//!
//! let mut article = FlexibleResource::new();
//! article.set_type("articles").unwrap();
//! article.set_id(1);
//! article.set_attribute("title", json!("JSON:API paints my bikeshed"));
//! article
//!     .set_relationships(json!({
//!         "author": {"data": {"type": "people", "id": "9"}}
//!     }))
//!     .unwrap();
//!
//! let mut doc = Document::flexible();
//! doc.set_data(article).unwrap();
//! assert_eq!(doc.to_value().unwrap()["data"]["id"], json!("1"));
//! ```

use crate::element::{Links, LinksSource, Meta, MetaSource};
use crate::relationship::{Relationships, RelationshipsSource};
use crate::resource::{Resource, ResourceId, ResourceIdentifier};
use crate::{Error, Result};
use serde_json::{Map, Value};

/// A mutable, schema-free resource populated through setters.
#[derive(Clone, Debug, Default)]
pub struct FlexibleResource {
    kind: Option<String>,
    id: Option<String>,
    attributes: Map<String, Value>,
    relationships: Option<Relationships>,
    links: Option<Links>,
    meta: Option<Meta>,
}

impl FlexibleResource {
    /// Creates an empty flexible resource.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the resource type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidResource`] if the type is empty.
    pub fn set_type(&mut self, kind: impl Into<String>) -> Result<&mut Self> {
        let kind = kind.into();
        if kind.is_empty() {
            return Err(Error::invalid_resource(
                "resource type must be a non-empty string",
            ));
        }
        self.kind = Some(kind);
        Ok(self)
    }

    /// Sets the resource id; integers are coerced to their wire string form.
    pub fn set_id(&mut self, id: impl Into<ResourceId>) -> &mut Self {
        self.id = Some(id.into().into_string());
        self
    }

    /// Replaces the attribute map.
    pub fn set_attributes(&mut self, attributes: Map<String, Value>) -> &mut Self {
        self.attributes = attributes;
        self
    }

    /// Sets one attribute, replacing any previous value under the same key.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Sets the relationships: either an already-built [`Relationships`]
    /// element, or raw association data; bare `{type, id}` maps for to-one
    /// and arrays of such maps for to-many are auto-upgraded into concrete
    /// identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReservedField`] or [`Error::InvalidElement`] when
    /// raw data fails relationship validation.
    pub fn set_relationships(
        &mut self,
        relationships: impl Into<RelationshipsSource>,
    ) -> Result<&mut Self> {
        self.relationships = Some(relationships.into().resolve()?);
        Ok(self)
    }

    /// Sets the links element from built [`Links`] or raw JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLink`] when raw data fails link validation.
    pub fn set_links(&mut self, links: impl Into<LinksSource>) -> Result<&mut Self> {
        self.links = Some(links.into().resolve()?);
        Ok(self)
    }

    /// Sets the meta element from built [`Meta`] or raw JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidElement`] when raw data is not an object.
    pub fn set_meta(&mut self, meta: impl Into<MetaSource>) -> Result<&mut Self> {
        self.meta = Some(meta.into().resolve()?);
        Ok(self)
    }

    /// The resource type, if set.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// The resource id, if set (string-coerced).
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The identifier of this resource; the id is an empty string while
    /// unassigned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidResource`] if the type is not set.
    pub(crate) fn identifier(&self) -> Result<ResourceIdentifier> {
        let kind = self
            .kind
            .clone()
            .ok_or_else(|| Error::invalid_resource("flexible resource has no type"))?;
        Ok(ResourceIdentifier::new(kind, self.id.clone().unwrap_or_default()))
    }

    /// Materializes into an immutable [`Resource`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidResource`] if the type is not set, or
    /// [`Error::ReservedField`] if the attributes define `id`/`type`.
    pub(crate) fn into_resource(self) -> Result<Resource> {
        let kind = self
            .kind
            .ok_or_else(|| Error::invalid_resource("flexible resource has no type"))?;
        Resource::assemble(
            kind,
            self.id.unwrap_or_default(),
            self.attributes,
            self.relationships,
            self.links,
            self.meta,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_setters_and_materialization() {
        let mut resource = FlexibleResource::new();
        resource.set_type("articles").unwrap();
        resource.set_id(42);
        resource.set_attribute("title", json!("t"));

        let materialized = resource.into_resource().unwrap();
        assert_eq!(materialized.kind(), "articles");
        assert_eq!(materialized.id(), "42");
        assert_eq!(
            serde_json::to_value(&materialized).unwrap(),
            json!({"type": "articles", "id": "42", "attributes": {"title": "t"}})
        );
    }

    #[test]
    fn test_empty_type_rejected() {
        let mut resource = FlexibleResource::new();
        assert!(resource.set_type("").is_err());
    }

    #[test]
    fn test_type_required_for_materialization() {
        let mut resource = FlexibleResource::new();
        resource.set_id("1");
        assert!(matches!(
            resource.into_resource(),
            Err(Error::InvalidResource(_))
        ));
    }

    #[test]
    fn test_raw_relationship_upgrade() {
        let mut resource = FlexibleResource::new();
        resource.set_type("articles").unwrap();
        resource
            .set_relationships(json!({
                "comments": [
                    {"type": "comments", "id": "5"},
                    {"type": "comments", "id": "12"}
                ]
            }))
            .unwrap();

        let materialized = resource.into_resource().unwrap();
        let entry = materialized.relationship("comments").unwrap();
        assert_eq!(
            serde_json::to_value(&entry.data).unwrap(),
            json!([
                {"type": "comments", "id": "5"},
                {"type": "comments", "id": "12"}
            ])
        );
    }

    #[test]
    fn test_reserved_attribute_fails_on_materialization() {
        let mut resource = FlexibleResource::new();
        resource.set_type("articles").unwrap();
        resource.set_attribute("id", json!("1"));
        assert!(matches!(
            resource.into_resource(),
            Err(Error::ReservedField { .. })
        ));
    }
}
