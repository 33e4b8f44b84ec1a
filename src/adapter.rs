//! Domain-object handles, the resource adapter contract, and the resource map.
//!
//! A [`Model`] is a cheap, cloneable, type-erased handle around any domain
//! object. A [`ResourceAdapter`] maps one domain type to its resource view:
//! type, id, attributes, relationships, links, meta. The [`ResourceMap`] is
//! the statically registered factory map from domain type to adapter that a
//! document consults whenever it classifies or adapts an input; membership in
//! the map is what makes a value a recognized resource.
//!
//! ## Examples
//!
//! ```rust
//! use jsonapi_document::{Model, ResourceAdapter, ResourceMap};
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
//!
//!     fn id(&self, post: &Post) -> String {
//!         post.id.to_string()
//!     }
//!
//!     fn attributes(&self, post: &Post) -> Map<String, Value> {
//!         let mut attributes = Map::new();
//!         attributes.insert("title".into(), json!(post.title));
//!         attributes
//!     }
//! }
//!
//! let map = ResourceMap::new().register(PostAdapter);
//! let post = Model::new(Post { id: 1, title: "Hello".into() });
//! assert!(map.contains(&post));
//! ```

use crate::element::Links;
use crate::relationship::RelationshipInput;
use crate::{Error, Result};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

/// A cloneable, type-erased handle around a domain object.
///
/// Models are how domain objects enter the engine: as document data, as
/// collection elements, and as relationship targets. Cloning a model clones
/// the handle, not the underlying object.
#[derive(Clone)]
pub struct Model {
    inner: Rc<dyn Any>,
}

impl Model {
    /// Wraps a domain object.
    #[must_use]
    pub fn new<T: 'static>(value: T) -> Self {
        Model {
            inner: Rc::new(value),
        }
    }

    /// Borrows the underlying object if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// The concrete type id of the wrapped object.
    pub(crate) fn type_id(&self) -> TypeId {
        (*self.inner).type_id()
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Model").field(&self.type_id()).finish()
    }
}

/// Maps one domain type `M` to its resource view.
///
/// `relationships`, `links` and `meta` have empty defaults; a `None` from
/// `links` lets the document synthesize a `self` link when `auto_set_links`
/// is configured, while an explicit value (even an empty one) suppresses it.
pub trait ResourceAdapter<M: 'static>: 'static {
    /// The wire `type` of resources produced by this adapter.
    fn resource_type(&self) -> &str;

    /// The resource id, in its wire string form.
    fn id(&self, model: &M) -> String;

    /// The attribute map. Must not contain the reserved keys `id` or `type`.
    fn attributes(&self, model: &M) -> Map<String, Value>;

    /// Raw relationship data, keyed by relationship name.
    fn relationships(&self, model: &M) -> IndexMap<String, RelationshipInput> {
        let _ = model;
        IndexMap::new()
    }

    /// Resource links. `None` opts into auto-link synthesis.
    fn links(&self, model: &M) -> Option<Links> {
        let _ = model;
        None
    }

    /// Resource meta.
    fn meta(&self, model: &M) -> Map<String, Value> {
        let _ = model;
        Map::new()
    }
}

/// The adapter output for one model, before relationship resolution.
pub(crate) struct RawAdapted {
    pub id: String,
    pub attributes: Map<String, Value>,
    pub relationships: IndexMap<String, RelationshipInput>,
    pub links: Option<Links>,
    pub meta: Map<String, Value>,
}

/// Object-safe bridge over a typed [`ResourceAdapter`].
pub(crate) trait ErasedAdapter {
    fn resource_type(&self) -> &str;
    fn id_of(&self, model: &Model) -> Result<String>;
    fn adapt_raw(&self, model: &Model) -> Result<RawAdapted>;
}

struct Bridge<M, A> {
    adapter: A,
    _model: PhantomData<fn() -> M>,
}

impl<M, A> Bridge<M, A>
where
    M: 'static,
    A: ResourceAdapter<M>,
{
    fn downcast<'a>(&self, model: &'a Model) -> Result<&'a M> {
        model.downcast_ref::<M>().ok_or_else(|| {
            Error::invalid_resource(format!(
                "model does not match the adapter registered for type `{}`",
                self.adapter.resource_type()
            ))
        })
    }
}

impl<M, A> ErasedAdapter for Bridge<M, A>
where
    M: 'static,
    A: ResourceAdapter<M>,
{
    fn resource_type(&self) -> &str {
        self.adapter.resource_type()
    }

    fn id_of(&self, model: &Model) -> Result<String> {
        Ok(self.adapter.id(self.downcast(model)?))
    }

    fn adapt_raw(&self, model: &Model) -> Result<RawAdapted> {
        let model = self.downcast(model)?;
        Ok(RawAdapted {
            id: self.adapter.id(model),
            attributes: self.adapter.attributes(model),
            relationships: self.adapter.relationships(model),
            links: self.adapter.links(model),
            meta: self.adapter.meta(model),
        })
    }
}

/// The statically registered map from domain type to adapter.
///
/// Supplied at document construction; a non-flexible document requires at
/// least one registration.
#[derive(Clone, Default)]
pub struct ResourceMap {
    entries: HashMap<TypeId, Rc<dyn ErasedAdapter>>,
}

impl ResourceMap {
    /// Creates an empty resource map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an adapter for domain type `M`, replacing any previous one.
    #[must_use]
    pub fn register<M: 'static>(mut self, adapter: impl ResourceAdapter<M>) -> Self {
        self.entries.insert(
            TypeId::of::<M>(),
            Rc::new(Bridge {
                adapter,
                _model: PhantomData::<fn() -> M>,
            }),
        );
        self
    }

    /// Whether the model's concrete type has a registered adapter.
    #[must_use]
    pub fn contains(&self, model: &Model) -> bool {
        self.entries.contains_key(&model.type_id())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn adapter_for(&self, model: &Model) -> Option<Rc<dyn ErasedAdapter>> {
        self.entries.get(&model.type_id()).cloned()
    }
}

impl fmt::Debug for ResourceMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceMap")
            .field("len", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Widget {
        id: u64,
    }

    struct WidgetAdapter;

    impl ResourceAdapter<Widget> for WidgetAdapter {
        fn resource_type(&self) -> &str {
            "widgets"
        }

        fn id(&self, widget: &Widget) -> String {
            widget.id.to_string()
        }

        fn attributes(&self, _widget: &Widget) -> Map<String, Value> {
            json!({"shape": "round"}).as_object().cloned().unwrap_or_default()
        }
    }

    #[test]
    fn test_registration_and_membership() {
        let map = ResourceMap::new().register(WidgetAdapter);
        assert!(map.contains(&Model::new(Widget { id: 1 })));
        assert!(!map.contains(&Model::new("not a widget")));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_erased_adaptation() {
        let map = ResourceMap::new().register(WidgetAdapter);
        let widget = Model::new(Widget { id: 9 });
        let adapter = map.adapter_for(&widget).unwrap();
        assert_eq!(adapter.resource_type(), "widgets");
        assert_eq!(adapter.id_of(&widget).unwrap(), "9");

        let raw = adapter.adapt_raw(&widget).unwrap();
        assert_eq!(raw.attributes.get("shape"), Some(&json!("round")));
        assert!(raw.relationships.is_empty());
    }

    #[test]
    fn test_mismatched_model_is_an_invalid_resource() {
        let map = ResourceMap::new().register(WidgetAdapter);
        let widget = Model::new(Widget { id: 1 });
        let adapter = map.adapter_for(&widget).unwrap();
        let err = adapter.id_of(&Model::new(17_u8)).unwrap_err();
        assert!(matches!(err, crate::Error::InvalidResource(_)));
    }
}
