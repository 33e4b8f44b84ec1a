//! The document assembler: the unit that becomes one wire payload.
//!
//! A [`Document`] collects primary data, included resources, errors, meta and
//! links, enforces the wire format's structural rules while they are being
//! attached, and serializes to the final JSON body. The two construction modes
//! differ only in what kinds of resources they accept:
//!
//! - [`Document::new`] takes a [`Config`] with a non-empty resource map and
//!   adapts registered domain objects;
//! - [`Document::flexible`] accepts hand-built [`FlexibleResource`]s (and
//!   mapped models too, when a resource map is supplied via
//!   [`Document::flexible_with`]).
//!
//! Two invariants are enforced on every mutation: `data` and `errors` are
//! mutually exclusive, and `included` can only be attached while primary data
//! exists.
//!
//! ## Examples
//!
//! ```rust
//! use jsonapi_document::{Config, Document, Model, ResourceAdapter, ResourceMap};
//! use serde_json::{json, Map, Value};
//!
//! struct Post { id: u64, title: String }
//!
//! struct PostAdapter;
//!
//! impl ResourceAdapter<Post> for PostAdapter {
//!     fn resource_type(&self) -> &str {
//!         "posts"
//!     }
//!     fn id(&self, post: &Post) -> String {
//!         post.id.to_string()
//!     }
//!     fn attributes(&self, post: &Post) -> Map<String, Value> {
//!         let mut attributes = Map::new();
//!         attributes.insert("title".into(), json!(post.title));
//!         attributes
//!     }
//! }
//!
//! let config = Config::new().with_resource_map(ResourceMap::new().register(PostAdapter));
//! let mut doc = Document::new(config).unwrap();
//! doc.set_data(Model::new(Post { id: 1, title: "Hello".into() })).unwrap();
//!
//! assert_eq!(
//!     doc.to_value().unwrap(),
//!     json!({"data": {"type": "posts", "id": "1", "attributes": {"title": "Hello"}}})
//! );
//! ```

use crate::adapter::ResourceMap;
use crate::classify::{classify, dispatch, Classification, ResourceInput, ResourceItem};
use crate::config::Config;
use crate::element::{ErrorObject, Links, LinksSource, Meta, MetaSource};
use crate::query::{Query, QueryIndex, Related};
use crate::relationship::{RelationshipData, RelationshipEntry, RelationshipInput, Relationships};
use crate::resource::{Resource, ResourceIdentifier};
use crate::{Error, Result};
use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// How `set_data` encodes the resources it is given.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataMode {
    /// Full resource objects (the default).
    Resource,
    /// Bare `{type, id}` resource identifiers, for relationship endpoints.
    Relationship,
}

/// The primary `data` member in its four wire shapes.
#[derive(Clone, Debug)]
enum DocumentData {
    One(Rc<Resource>),
    Many(Vec<Rc<Resource>>),
    Identifier(ResourceIdentifier),
    Identifiers(Vec<ResourceIdentifier>),
}

impl Serialize for DocumentData {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            DocumentData::One(resource) => resource.as_ref().serialize(serializer),
            DocumentData::Many(resources) => {
                let mut seq = serializer.serialize_seq(Some(resources.len()))?;
                for resource in resources {
                    seq.serialize_element(resource.as_ref())?;
                }
                seq.end()
            }
            DocumentData::Identifier(identifier) => identifier.serialize(serializer),
            DocumentData::Identifiers(identifiers) => identifiers.serialize(serializer),
        }
    }
}

/// Normalizable error input: built objects or raw JSON.
#[derive(Clone, Debug)]
pub enum ErrorsSource {
    One(ErrorObject),
    Many(Vec<ErrorObject>),
    Raw(Value),
}

impl ErrorsSource {
    fn normalize(self) -> Result<Vec<ErrorObject>> {
        match self {
            ErrorsSource::One(error) => Ok(vec![error]),
            ErrorsSource::Many(errors) => Ok(errors),
            ErrorsSource::Raw(Value::Array(items)) => {
                items.iter().map(ErrorObject::from_value).collect()
            }
            ErrorsSource::Raw(value) => Ok(vec![ErrorObject::from_value(&value)?]),
        }
    }
}

impl From<ErrorObject> for ErrorsSource {
    fn from(error: ErrorObject) -> Self {
        ErrorsSource::One(error)
    }
}

impl From<Vec<ErrorObject>> for ErrorsSource {
    fn from(errors: Vec<ErrorObject>) -> Self {
        ErrorsSource::Many(errors)
    }
}

impl From<Value> for ErrorsSource {
    fn from(value: Value) -> Self {
        ErrorsSource::Raw(value)
    }
}

#[derive(Serialize)]
struct ApiVersion {
    version: &'static str,
}

/// One wire payload under assembly.
pub struct Document {
    resource_map: ResourceMap,
    api_url: Option<String>,
    auto_set_links: bool,
    show_api_version: bool,
    flexible: bool,
    data: Option<DocumentData>,
    included: Vec<Rc<Resource>>,
    errors: Vec<ErrorObject>,
    meta: Option<Meta>,
    links: Option<Links>,
    index: QueryIndex,
}

impl Document {
    /// The wire-format version emitted under `jsonapi.version`.
    pub const VERSION: &'static str = "1.0";

    /// Creates a non-flexible document from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the resource map is empty or the
    /// API URL is malformed.
    pub fn new(config: Config) -> Result<Self> {
        config.require_resource_map()?;
        Self::build(config, false)
    }

    /// Creates a flexible document with an empty configuration.
    #[must_use]
    pub fn flexible() -> Self {
        Document {
            resource_map: ResourceMap::new(),
            api_url: None,
            auto_set_links: false,
            show_api_version: false,
            flexible: true,
            data: None,
            included: Vec::new(),
            errors: Vec::new(),
            meta: None,
            links: None,
            index: QueryIndex::default(),
        }
    }

    /// Creates a flexible document carrying a configuration; the resource map
    /// may be empty or populated (flexible documents accept mapped models
    /// alongside flexible resources).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the API URL is malformed.
    pub fn flexible_with(config: Config) -> Result<Self> {
        Self::build(config, true)
    }

    fn build(config: Config, flexible: bool) -> Result<Self> {
        let api_url = config.normalized_api_url()?;
        Ok(Document {
            resource_map: config.resource_map,
            api_url,
            auto_set_links: config.auto_set_links,
            show_api_version: config.show_api_version,
            flexible,
            data: None,
            included: Vec::new(),
            errors: Vec::new(),
            meta: None,
            links: None,
            index: QueryIndex::default(),
        })
    }

    /// Whether this document accepts flexible resources.
    #[must_use]
    pub fn is_flexible(&self) -> bool {
        self.flexible
    }

    /// Classifies an input against this document's resource map and mode
    /// without mutating anything.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FlexibleUsage`] when a flexible resource is handed to
    /// a non-flexible document.
    pub fn classify(&self, input: &ResourceInput, allow_mixed: bool) -> Result<Classification> {
        classify(input, &self.resource_map, self.flexible, allow_mixed)
    }

    /// Sets the primary data as full resource objects, replacing any previous
    /// data. Collections are deduplicated by `(type, id)`, first occurrence
    /// kept; resources without an id never deduplicate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataErrorsConflict`] if errors are already set, and
    /// the classification errors ([`Error::InvalidResource`],
    /// [`Error::InvalidCollection`], [`Error::MixedCollection`],
    /// [`Error::FlexibleUsage`]) for malformed input. Adapter output failing
    /// resource validation surfaces here as well.
    pub fn set_data(&mut self, input: impl Into<ResourceInput>) -> Result<&mut Self> {
        self.set_data_as(input, DataMode::Resource)
    }

    /// Sets the primary data in an explicit [`DataMode`].
    ///
    /// In [`DataMode::Relationship`] each resource is reduced to its
    /// `{type, id}` identifier; collection dedup applies the same way.
    ///
    /// # Errors
    ///
    /// Same as [`set_data`](Document::set_data).
    pub fn set_data_as(
        &mut self,
        input: impl Into<ResourceInput>,
        mode: DataMode,
    ) -> Result<&mut Self> {
        if !self.errors.is_empty() {
            return Err(Error::data_errors_conflict(
                "cannot set data, errors are already attached",
            ));
        }

        let input = input.into();
        let data = match self.classify(&input, false)? {
            Classification::Resource | Classification::FlexibleResource => {
                let ResourceInput::One(item) = input else {
                    return Err(Error::invalid_resource(
                        "collection classified as a single resource",
                    ));
                };
                match mode {
                    DataMode::Resource => {
                        let resource = self.adapt_item(item)?;
                        self.index.register(&resource);
                        DocumentData::One(resource)
                    }
                    DataMode::Relationship => {
                        DocumentData::Identifier(self.identifier_of(&item)?)
                    }
                }
            }
            Classification::Collection | Classification::FlexibleCollection => {
                let ResourceInput::Many(items) = input else {
                    return Err(Error::invalid_collection(
                        "single resource classified as a collection",
                    ));
                };
                match mode {
                    DataMode::Resource => {
                        let mut seen = HashSet::new();
                        let mut resources = Vec::with_capacity(items.len());
                        for item in items {
                            let resource = self.adapt_item(item)?;
                            self.index.register(&resource);
                            if let Some(key) = resource.key() {
                                if !seen.insert(key) {
                                    continue;
                                }
                            }
                            resources.push(resource);
                        }
                        DocumentData::Many(resources)
                    }
                    DataMode::Relationship => {
                        let mut seen = HashSet::new();
                        let mut identifiers = Vec::with_capacity(items.len());
                        for item in &items {
                            let identifier = self.identifier_of(item)?;
                            if !identifier.id().is_empty() {
                                let key = (
                                    identifier.kind().to_string(),
                                    identifier.id().to_string(),
                                );
                                if !seen.insert(key) {
                                    continue;
                                }
                            }
                            identifiers.push(identifier);
                        }
                        DocumentData::Identifiers(identifiers)
                    }
                }
            }
            Classification::InvalidResource => {
                return Err(Error::invalid_resource("value is not a recognized resource"))
            }
            Classification::InvalidCollection => {
                return Err(Error::invalid_collection(
                    "collection contains a non-conforming element",
                ))
            }
            Classification::MixedCollection => return Err(Error::MixedCollection),
        };

        self.data = Some(data);
        Ok(self)
    }

    /// Replaces the `errors` array. Raw JSON input is normalized into
    /// [`ErrorObject`]s; an array becomes one entry per element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataErrorsConflict`] if primary data is already set,
    /// or [`Error::InvalidElement`] for malformed error input.
    pub fn set_errors(&mut self, errors: impl Into<ErrorsSource>) -> Result<&mut Self> {
        let errors = self.normalize_errors(errors)?;
        self.errors = errors;
        Ok(self)
    }

    /// Appends to the `errors` array, skipping entries equal to one already
    /// present.
    ///
    /// # Errors
    ///
    /// Same as [`set_errors`](Document::set_errors).
    pub fn add_errors(&mut self, errors: impl Into<ErrorsSource>) -> Result<&mut Self> {
        let errors = self.normalize_errors(errors)?;
        for error in errors {
            if !self.errors.contains(&error) {
                self.errors.push(error);
            }
        }
        Ok(self)
    }

    fn normalize_errors(&self, errors: impl Into<ErrorsSource>) -> Result<Vec<ErrorObject>> {
        if self.data.is_some() {
            return Err(Error::data_errors_conflict(
                "cannot set errors, data is already attached",
            ));
        }
        errors.into().normalize()
    }

    /// Replaces the `included` set. Input classifies and adapts exactly like
    /// `set_data`; the result is deduplicated by `(type, id)`, first
    /// occurrence kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncludedBeforeData`] if no primary data is set, plus
    /// the classification and adaptation errors of
    /// [`set_data`](Document::set_data). An empty collection is accepted and
    /// leaves the document untouched.
    pub fn set_included(&mut self, input: impl Into<ResourceInput>) -> Result<&mut Self> {
        self.apply_included(input.into(), true)
    }

    /// Merges more resources into the `included` set; resources whose
    /// `(type, id)` is already present are dropped.
    ///
    /// # Errors
    ///
    /// Same as [`set_included`](Document::set_included).
    pub fn add_included(&mut self, input: impl Into<ResourceInput>) -> Result<&mut Self> {
        self.apply_included(input.into(), false)
    }

    fn apply_included(&mut self, input: ResourceInput, replace: bool) -> Result<&mut Self> {
        if input.is_empty() {
            return Ok(self);
        }
        if self.data.is_none() {
            return Err(Error::IncludedBeforeData);
        }

        let adapted = match self.classify(&input, false)? {
            Classification::Resource | Classification::FlexibleResource => {
                let ResourceInput::One(item) = input else {
                    return Err(Error::invalid_resource(
                        "collection classified as a single resource",
                    ));
                };
                vec![self.adapt_item(item)?]
            }
            Classification::Collection | Classification::FlexibleCollection => {
                let ResourceInput::Many(items) = input else {
                    return Err(Error::invalid_collection(
                        "single resource classified as a collection",
                    ));
                };
                let mut resources = Vec::with_capacity(items.len());
                for item in items {
                    resources.push(self.adapt_item(item)?);
                }
                resources
            }
            Classification::InvalidResource => {
                return Err(Error::invalid_resource("value is not a recognized resource"))
            }
            Classification::InvalidCollection => {
                return Err(Error::invalid_collection(
                    "collection contains a non-conforming element",
                ))
            }
            Classification::MixedCollection => return Err(Error::MixedCollection),
        };

        for resource in &adapted {
            self.index.register(resource);
        }

        let combined = if replace {
            adapted
        } else {
            let mut combined = std::mem::take(&mut self.included);
            combined.extend(adapted);
            combined
        };
        self.included = dedup_by_identity(combined);
        Ok(self)
    }

    /// Replaces the document `meta`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidElement`] if raw input is not an object.
    pub fn set_meta(&mut self, meta: impl Into<MetaSource>) -> Result<&mut Self> {
        self.meta = Some(meta.into().resolve()?);
        Ok(self)
    }

    /// Shallow-merges into the document `meta`; new keys win on conflict.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidElement`] if raw input is not an object.
    pub fn add_meta(&mut self, meta: impl Into<MetaSource>) -> Result<&mut Self> {
        let meta = meta.into().resolve()?;
        match &mut self.meta {
            Some(existing) => existing.merge(meta),
            None => self.meta = Some(meta),
        }
        Ok(self)
    }

    /// Replaces the document `links`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLink`] if raw input fails link validation.
    pub fn set_links(&mut self, links: impl Into<LinksSource>) -> Result<&mut Self> {
        self.links = Some(links.into().resolve()?);
        Ok(self)
    }

    /// Merges into the document `links`; new names win on conflict.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLink`] if raw input fails link validation.
    pub fn add_links(&mut self, links: impl Into<LinksSource>) -> Result<&mut Self> {
        let links = links.into().resolve()?;
        match &mut self.links {
            Some(existing) => existing.merge(links),
            None => self.links = Some(links),
        }
        Ok(self)
    }

    /// The `included` set, in its deduplicated wire order.
    #[must_use]
    pub fn included(&self) -> &[Rc<Resource>] {
        &self.included
    }

    /// The `errors` array.
    #[must_use]
    pub fn errors(&self) -> &[ErrorObject] {
        &self.errors
    }

    /// The document `meta`, if any.
    #[must_use]
    pub fn meta(&self) -> Option<&Meta> {
        self.meta.as_ref()
    }

    /// The document `links`, if any.
    #[must_use]
    pub fn links(&self) -> Option<&Links> {
        self.links.as_ref()
    }

    /// A query over every resource this document has adapted, in
    /// registration order.
    #[must_use]
    pub fn query(&self) -> Query {
        Query::new(self.index.snapshot())
    }

    /// Materializes a resource's named relationship back into live resources
    /// from the document index. Returns `None` when the resource has no such
    /// relationship; identifiers with no indexed match are omitted.
    #[must_use]
    pub fn related(&self, resource: &Resource, name: &str) -> Option<Related> {
        let entry = resource.relationship(name)?;
        Some(match &entry.data {
            RelationshipData::Null => Related::One(None),
            RelationshipData::One(identifier) => Related::One(self.index.find(identifier)),
            RelationshipData::Many(identifiers) => Related::Many(
                identifiers
                    .iter()
                    .filter_map(|identifier| self.index.find(identifier))
                    .collect(),
            ),
        })
    }

    /// Serializes to a [`Value`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if serialization fails.
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(Error::encode)
    }

    /// Serializes to a compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::encode)
    }

    /// Serializes to a pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Error::encode)
    }

    /// Adapts one item into a materialized resource: models go through their
    /// registered adapter (with relationship resolution and optional
    /// auto-link synthesis), flexible resources materialize directly.
    fn adapt_item(&self, item: ResourceItem) -> Result<Rc<Resource>> {
        match item {
            ResourceItem::Model(model) => {
                let adapter = self.resource_map.adapter_for(&model).ok_or_else(|| {
                    Error::invalid_resource("no adapter registered for this model")
                })?;
                let kind = adapter.resource_type().to_string();
                let raw = adapter.adapt_raw(&model)?;

                let relationships = if raw.relationships.is_empty() {
                    None
                } else {
                    Some(self.build_relationships(raw.relationships)?)
                };
                let links = match raw.links {
                    Some(links) => Some(links),
                    None => self.auto_self_link(&kind, &raw.id)?,
                };
                let meta = if raw.meta.is_empty() {
                    None
                } else {
                    Some(Meta::from(raw.meta))
                };

                Ok(Rc::new(Resource::assemble(
                    kind,
                    raw.id,
                    raw.attributes,
                    relationships,
                    links,
                    meta,
                )?))
            }
            ResourceItem::Flexible(resource) => Ok(Rc::new(resource.into_resource()?)),
        }
    }

    /// Synthesizes `links.self` when configured and an API URL is present.
    fn auto_self_link(&self, kind: &str, id: &str) -> Result<Option<Links>> {
        if !self.auto_set_links {
            return Ok(None);
        }
        let Some(url) = &self.api_url else {
            return Ok(None);
        };
        let mut links = Links::new();
        links.insert_url("self", format!("{url}/{kind}/{id}"))?;
        Ok(Some(links))
    }

    /// Resolves raw adapter relationship data into identifier entries. Each
    /// payload classifies like document data and reduces to `(type, id)`;
    /// relationship targets are never fully adapted, so cyclic object graphs
    /// terminate.
    fn build_relationships(
        &self,
        raw: IndexMap<String, RelationshipInput>,
    ) -> Result<Relationships> {
        let mut relationships = Relationships::new();
        for (name, input) in raw {
            let (links, meta, data) = input.into_parts();
            let data = dispatch(
                data,
                &self.resource_map,
                self.flexible,
                false,
                |item| Ok(RelationshipData::One(self.identifier_of(&item)?)),
                |items| {
                    let mut identifiers = Vec::with_capacity(items.len());
                    for item in &items {
                        identifiers.push(self.identifier_of(item)?);
                    }
                    Ok(RelationshipData::Many(identifiers))
                },
            )?;
            relationships.insert(name, RelationshipEntry { links, meta, data })?;
        }
        Ok(relationships)
    }

    /// The `(type, id)` identifier of an item, without full adaptation.
    fn identifier_of(&self, item: &ResourceItem) -> Result<ResourceIdentifier> {
        match item {
            ResourceItem::Model(model) => {
                let adapter = self.resource_map.adapter_for(model).ok_or_else(|| {
                    Error::invalid_resource("no adapter registered for this model")
                })?;
                Ok(ResourceIdentifier::new(
                    adapter.resource_type(),
                    adapter.id_of(model)?,
                ))
            }
            ResourceItem::Flexible(resource) => resource.identifier(),
        }
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("flexible", &self.flexible)
            .field("data", &self.data)
            .field("included", &self.included)
            .field("errors", &self.errors)
            .field("meta", &self.meta)
            .field("links", &self.links)
            .finish_non_exhaustive()
    }
}

/// Deduplicates resources by `(type, id)`, keeping the first occurrence.
/// Resources without a fixed identity (no id) are always kept.
fn dedup_by_identity(resources: Vec<Rc<Resource>>) -> Vec<Rc<Resource>> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(resources.len());
    for resource in resources {
        if let Some(key) = resource.key() {
            if !seen.insert(key) {
                continue;
            }
        }
        kept.push(resource);
    }
    kept
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(data) = &self.data {
            map.serialize_entry("data", data)?;
            if !self.included.is_empty() {
                map.serialize_entry("included", &IncludedMember(&self.included))?;
            }
        }
        if !self.errors.is_empty() {
            map.serialize_entry("errors", &self.errors)?;
        }
        if let Some(meta) = &self.meta {
            if !meta.is_empty() {
                map.serialize_entry("meta", meta)?;
            }
        }
        if let Some(links) = &self.links {
            if !links.is_empty() {
                map.serialize_entry("links", links)?;
            }
        }
        if self.show_api_version {
            map.serialize_entry(
                "jsonapi",
                &ApiVersion {
                    version: Document::VERSION,
                },
            )?;
        }
        map.end()
    }
}

struct IncludedMember<'a>(&'a [Rc<Resource>]);

impl Serialize for IncludedMember<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for resource in self.0 {
            seq.serialize_element(resource.as_ref())?;
        }
        seq.end()
    }
}
