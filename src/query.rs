//! The per-document resource index and its fluent query chain.
//!
//! Every resource materialized during `set_data`/`set_included` is registered
//! into a single flat index, deduplicated by object identity: registering
//! the same resource twice is a no-op. This is deliberately distinct from the
//! `(type, id)` dedup applied to `included`: the index remembers everything
//! the document has ever seen.
//!
//! [`Query`] filters the index through chained equality predicates and is the
//! mechanism that materializes relationship identifiers back into live
//! resources.
//!
//! ## Examples
//!
//! ```rust
//! use jsonapi_document::{Document, FlexibleResource};
//! use serde_json::json;
//!
//! let mut doc = Document::flexible();
//! let mut post = FlexibleResource::new();
//! post.set_type("posts").unwrap();
//! post.set_id(1);
//! post.set_attribute("title", json!("Hello"));
//! doc.set_data(post).unwrap();
//!
//! let found = doc
//!     .query()
//!     .where_eq("type", "posts")
//!     .where_eq("attributes.title", "Hello")
//!     .first()
//!     .unwrap();
//! assert_eq!(found.id(), "1");
//! ```

use crate::resource::{Resource, ResourceIdentifier};
use serde_json::Value;
use std::rc::Rc;

/// The append-only, identity-deduplicated registry of adapted resources.
#[derive(Clone, Default)]
pub(crate) struct QueryIndex {
    resources: Vec<Rc<Resource>>,
}

impl QueryIndex {
    /// Registers a resource; a handle already present is a no-op.
    pub(crate) fn register(&mut self, resource: &Rc<Resource>) {
        if self.resources.iter().any(|seen| Rc::ptr_eq(seen, resource)) {
            return;
        }
        self.resources.push(Rc::clone(resource));
    }

    /// Finds the first indexed resource matching the identifier.
    pub(crate) fn find(&self, identifier: &ResourceIdentifier) -> Option<Rc<Resource>> {
        self.resources
            .iter()
            .find(|r| r.kind() == identifier.kind() && r.id() == identifier.id())
            .cloned()
    }

    pub(crate) fn snapshot(&self) -> Vec<Rc<Resource>> {
        self.resources.clone()
    }
}

/// A fluent filter over the document's resource index.
///
/// Each [`where_eq`](Query::where_eq) call narrows the candidate set by
/// equality on a field key (`"type"`, `"id"`, or an attribute dot-path);
/// multiple calls AND together. The remaining set is countable and iterable
/// in registration order.
#[derive(Clone)]
pub struct Query {
    matches: Vec<Rc<Resource>>,
}

impl Query {
    pub(crate) fn new(matches: Vec<Rc<Resource>>) -> Self {
        Query { matches }
    }

    /// Keeps only resources whose field under `key` equals `value`.
    ///
    /// Ids compare in their wire string form: `where_eq("id", "1")`.
    #[must_use]
    pub fn where_eq(mut self, key: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.matches.retain(|r| r.field(key).as_ref() == Some(&value));
        self
    }

    /// The first remaining match, if any.
    #[must_use]
    pub fn first(&self) -> Option<Rc<Resource>> {
        self.matches.first().cloned()
    }

    /// The number of remaining matches.
    #[must_use]
    pub fn count(&self) -> usize {
        self.matches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Iterates over the remaining matches.
    pub fn iter(&self) -> impl Iterator<Item = &Rc<Resource>> {
        self.matches.iter()
    }
}

impl IntoIterator for Query {
    type Item = Rc<Resource>;
    type IntoIter = std::vec::IntoIter<Rc<Resource>>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.into_iter()
    }
}

/// Relationship data materialized back into live resources.
///
/// To-one resolves to at most one resource; to-many keeps the identifiers'
/// original order, omitting identifiers with no indexed match.
#[derive(Clone, Debug)]
pub enum Related {
    One(Option<Rc<Resource>>),
    Many(Vec<Rc<Resource>>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resource(kind: &str, id: &str) -> Rc<Resource> {
        let mut flexible = crate::FlexibleResource::new();
        flexible.set_type(kind).unwrap();
        flexible.set_id(id);
        flexible.set_attribute("label", json!(format!("{kind}-{id}")));
        Rc::new(flexible.into_resource().unwrap())
    }

    #[test]
    fn test_identity_registration_is_a_no_op() {
        let mut index = QueryIndex::default();
        let post = resource("posts", "1");
        index.register(&post);
        index.register(&post);
        assert_eq!(index.snapshot().len(), 1);

        // Same (type, id), different object: both are indexed
        index.register(&resource("posts", "1"));
        assert_eq!(index.snapshot().len(), 2);
    }

    #[test]
    fn test_where_chain_ands_together() {
        let mut index = QueryIndex::default();
        index.register(&resource("posts", "1"));
        index.register(&resource("comments", "1"));

        let query = Query::new(index.snapshot())
            .where_eq("type", "comments")
            .where_eq("id", "1");
        assert_eq!(query.count(), 1);
        assert_eq!(query.first().unwrap().kind(), "comments");
    }

    #[test]
    fn test_attribute_path_filter() {
        let mut index = QueryIndex::default();
        index.register(&resource("posts", "1"));
        index.register(&resource("posts", "2"));

        let query = Query::new(index.snapshot()).where_eq("attributes.label", "posts-2");
        assert_eq!(query.count(), 1);
        assert_eq!(query.first().unwrap().id(), "2");
    }

    #[test]
    fn test_no_match_yields_empty() {
        let query = Query::new(vec![]).where_eq("type", "ghosts");
        assert!(query.is_empty());
        assert!(query.first().is_none());
    }
}
