//! Input classification: single resource, collection, flexible, or invalid.
//!
//! Every value handed to a document (data, included, relationship payloads)
//! goes through [`classify`] first. Classification decides which handler runs
//! (single-resource vs collection) and turns malformed input into its typed
//! error before anything is mutated.
//!
//! Inputs are closed variants: a [`ResourceItem`] is either a domain
//! [`Model`] or a [`FlexibleResource`], and a [`ResourceInput`] is one item
//! or a collection of items. `From` conversions keep call sites terse:
//! `doc.set_data(model)`, `doc.set_data(vec![a, b])`.

use crate::adapter::{Model, ResourceMap};
use crate::flexible::FlexibleResource;
use crate::{Error, Result};
use std::any::TypeId;

/// One classifiable element: a mapped domain object or a flexible resource.
#[derive(Clone, Debug)]
pub enum ResourceItem {
    Model(Model),
    Flexible(FlexibleResource),
}

impl ResourceItem {
    /// The element's exact kind, for collection homogeneity checks. All
    /// flexible resources count as one kind; models are distinguished by
    /// their concrete type.
    fn kind(&self) -> ItemKind {
        match self {
            ResourceItem::Model(model) => ItemKind::Model(model.type_id()),
            ResourceItem::Flexible(_) => ItemKind::Flexible,
        }
    }
}

#[derive(PartialEq, Eq, Clone, Copy)]
enum ItemKind {
    Model(TypeId),
    Flexible,
}

/// A value being attached to a document: one resource or a collection.
#[derive(Clone, Debug)]
pub enum ResourceInput {
    One(ResourceItem),
    Many(Vec<ResourceItem>),
}

impl ResourceInput {
    /// Whether this input is an empty collection.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, ResourceInput::Many(items) if items.is_empty())
    }
}

impl From<Model> for ResourceItem {
    fn from(model: Model) -> Self {
        ResourceItem::Model(model)
    }
}

impl From<FlexibleResource> for ResourceItem {
    fn from(resource: FlexibleResource) -> Self {
        ResourceItem::Flexible(resource)
    }
}

impl From<Model> for ResourceInput {
    fn from(model: Model) -> Self {
        ResourceInput::One(ResourceItem::Model(model))
    }
}

impl From<FlexibleResource> for ResourceInput {
    fn from(resource: FlexibleResource) -> Self {
        ResourceInput::One(ResourceItem::Flexible(resource))
    }
}

impl From<ResourceItem> for ResourceInput {
    fn from(item: ResourceItem) -> Self {
        ResourceInput::One(item)
    }
}

impl From<Vec<Model>> for ResourceInput {
    fn from(models: Vec<Model>) -> Self {
        ResourceInput::Many(models.into_iter().map(ResourceItem::Model).collect())
    }
}

impl From<Vec<FlexibleResource>> for ResourceInput {
    fn from(resources: Vec<FlexibleResource>) -> Self {
        ResourceInput::Many(resources.into_iter().map(ResourceItem::Flexible).collect())
    }
}

impl From<Vec<ResourceItem>> for ResourceInput {
    fn from(items: Vec<ResourceItem>) -> Self {
        ResourceInput::Many(items)
    }
}

/// The outcome of classifying a [`ResourceInput`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    /// A single mapped resource.
    Resource,
    /// A collection of mapped resources (possibly empty).
    Collection,
    /// A single flexible resource.
    FlexibleResource,
    /// A collection made entirely of flexible resources.
    FlexibleCollection,
    /// Not a recognized resource.
    InvalidResource,
    /// A collection containing a non-conforming element.
    InvalidCollection,
    /// A non-flexible collection mixing distinct resource types.
    MixedCollection,
}

/// Classifies an input against a resource map.
///
/// A model is a `Resource` when its concrete type is registered in the map.
/// Flexible resources are valid only when `flexible_mode` is set; elsewhere
/// they are a usage error, not a classification. A collection is walked once:
/// every element must independently classify as a resource, and unless
/// `allow_mixed` is set every element after the first must share the first
/// element's exact kind. An empty collection classifies as `Collection`.
///
/// # Errors
///
/// Returns [`Error::FlexibleUsage`] when a flexible resource appears while
/// `flexible_mode` is off. All other outcomes are classifications, not
/// errors; [`dispatch`] converts the invalid ones.
pub fn classify(
    input: &ResourceInput,
    map: &ResourceMap,
    flexible_mode: bool,
    allow_mixed: bool,
) -> Result<Classification> {
    match input {
        ResourceInput::One(ResourceItem::Model(model)) => {
            if map.contains(model) {
                Ok(Classification::Resource)
            } else {
                Ok(Classification::InvalidResource)
            }
        }
        ResourceInput::One(ResourceItem::Flexible(_)) => {
            if flexible_mode {
                Ok(Classification::FlexibleResource)
            } else {
                Err(Error::flexible_usage(
                    "the enclosing document is not flexible",
                ))
            }
        }
        ResourceInput::Many(items) => {
            let mut first_kind: Option<ItemKind> = None;
            let mut all_flexible = !items.is_empty();

            for item in items {
                match item {
                    ResourceItem::Model(model) => {
                        if !map.contains(model) {
                            return Ok(Classification::InvalidCollection);
                        }
                        all_flexible = false;
                    }
                    ResourceItem::Flexible(_) => {
                        if !flexible_mode {
                            return Err(Error::flexible_usage(
                                "the enclosing document is not flexible",
                            ));
                        }
                    }
                }

                match first_kind {
                    None => first_kind = Some(item.kind()),
                    Some(kind) => {
                        if !allow_mixed && item.kind() != kind {
                            return Ok(Classification::MixedCollection);
                        }
                    }
                }
            }

            if all_flexible {
                Ok(Classification::FlexibleCollection)
            } else {
                Ok(Classification::Collection)
            }
        }
    }
}

/// Routes a classified input to the matching handler, or raises the typed
/// error for the failure classifications.
pub(crate) fn dispatch<T>(
    input: ResourceInput,
    map: &ResourceMap,
    flexible_mode: bool,
    allow_mixed: bool,
    on_resource: impl FnOnce(ResourceItem) -> Result<T>,
    on_collection: impl FnOnce(Vec<ResourceItem>) -> Result<T>,
) -> Result<T> {
    match classify(&input, map, flexible_mode, allow_mixed)? {
        Classification::Resource | Classification::FlexibleResource => match input {
            ResourceInput::One(item) => on_resource(item),
            ResourceInput::Many(_) => Err(Error::invalid_resource(
                "collection classified as a single resource",
            )),
        },
        Classification::Collection | Classification::FlexibleCollection => match input {
            ResourceInput::Many(items) => on_collection(items),
            ResourceInput::One(_) => Err(Error::invalid_collection(
                "single resource classified as a collection",
            )),
        },
        Classification::InvalidResource => {
            Err(Error::invalid_resource("value is not a recognized resource"))
        }
        Classification::InvalidCollection => Err(Error::invalid_collection(
            "collection contains a non-conforming element",
        )),
        Classification::MixedCollection => Err(Error::MixedCollection),
    }
}
