//! # jsonapi_document
//!
//! A document assembly and resource-graph engine for the JSON:API wire format.
//!
//! ## What does it do?
//!
//! The crate turns your domain objects into well-formed JSON:API documents
//! (`data`, `included`, `errors`, `meta`, `links`, `jsonapi`) and parses such
//! documents back. Domain objects stay untouched: a [`ResourceAdapter`]
//! registered per type describes how each one maps to a resource object, and
//! the [`Document`] enforces the format's structural rules while members are
//! attached.
//!
//! ## Key Features
//!
//! - **Adapter-Based**: One [`ResourceAdapter`] per domain type; the document
//!   classifies and adapts inputs through a [`ResourceMap`] registry
//! - **Invariants Enforced Eagerly**: `data`/`errors` mutual exclusion,
//!   `included`-requires-`data`, reserved `id`/`type` fields, link validation;
//!   every violation fails at the mutating call, never at serialize time
//! - **Deduplicated `included`**: resources deduplicate by `(type, id)`,
//!   first occurrence kept
//! - **Flexible Documents**: schema-free [`FlexibleResource`]s for ad hoc
//!   payloads and as the parser's reconstruction target
//! - **Queryable**: every adapted resource lands in a per-document index with
//!   a fluent [`Query`] chain and relationship resolution
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! jsonapi_document = "0.1"
//! serde_json = "1.0"
//! ```
//!
//! ### Assembling a Document
//!
//! ```rust
//! use jsonapi_document::{Config, Document, Model, ResourceAdapter, ResourceMap};
//! use serde_json::{json, Map, Value};
//!
//! struct Post {
//!     id: u64,
//!     title: String,
//! }
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
//! let config = Config::new()
//!     .with_resource_map(ResourceMap::new().register(PostAdapter));
//! let mut doc = Document::new(config).unwrap();
//! doc.set_data(Model::new(Post { id: 1, title: "Hello".into() })).unwrap();
//!
//! assert_eq!(
//!     doc.to_value().unwrap(),
//!     json!({"data": {"type": "posts", "id": "1", "attributes": {"title": "Hello"}}})
//! );
//! ```
//!
//! ### Flexible Documents
//!
//! ```rust
//! use jsonapi_document::{Document, FlexibleResource};
//! use serde_json::json;
//!
//! let mut article = FlexibleResource::new();
//! article.set_type("articles").unwrap();
//! article.set_id(1);
//! article.set_attribute("title", json!("JSON:API paints my bikeshed"));
//!
//! let mut doc = Document::flexible();
//! doc.set_data(article).unwrap();
//! doc.set_meta(json!({"copyright": "2026"})).unwrap();
//!
//! assert_eq!(doc.to_value().unwrap()["meta"]["copyright"], json!("2026"));
//! ```
//!
//! ### Parsing and Round-Tripping
//!
//! ```rust
//! use jsonapi_document::{parse_str, Config, StructuralValidator};
//! use serde_json::json;
//!
//! let input = r#"{"data": {"type": "articles", "id": "1", "attributes": {"title": "t"}}}"#;
//! let doc = parse_str(input, Config::new(), &StructuralValidator).unwrap();
//!
//! assert_eq!(
//!     doc.to_value().unwrap(),
//!     json!({"data": {"type": "articles", "id": "1", "attributes": {"title": "t"}}})
//! );
//! ```
//!
//! ### Querying the Resource Graph
//!
//! ```rust
//! use jsonapi_document::{Document, FlexibleResource, Related};
//! use serde_json::json;
//!
//! let mut post = FlexibleResource::new();
//! post.set_type("posts").unwrap();
//! post.set_id(1);
//! post.set_relationships(json!({
//!     "comments": [{"type": "comments", "id": "5"}]
//! })).unwrap();
//!
//! let mut comment = FlexibleResource::new();
//! comment.set_type("comments").unwrap();
//! comment.set_id(5);
//!
//! let mut doc = Document::flexible();
//! doc.set_data(post).unwrap();
//! doc.set_included(comment).unwrap();
//!
//! let post = doc.query().where_eq("type", "posts").first().unwrap();
//! let Some(Related::Many(comments)) = doc.related(&post, "comments") else {
//!     panic!("expected a to-many relationship");
//! };
//! assert_eq!(comments[0].id(), "5");
//! ```
//!
//! ## Concurrency Model
//!
//! Entirely synchronous and single-threaded: a document and its resources
//! form a builder graph shared through [`std::rc::Rc`], so a `Document` is
//! neither `Send` nor `Sync` by construction. One document per logical
//! writer; all operations complete or fail immediately.
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Proper error propagation with `Result` types
//! - No panics in public API (except for logic errors that indicate bugs)

pub mod adapter;
pub mod classify;
pub mod config;
pub mod document;
pub mod element;
pub mod error;
pub mod flexible;
pub mod parse;
pub mod query;
pub mod relationship;
pub mod resource;
pub mod validator;

pub use adapter::{Model, ResourceAdapter, ResourceMap};
pub use classify::{classify, Classification, ResourceInput, ResourceItem};
pub use config::Config;
pub use document::{DataMode, Document, ErrorsSource};
pub use element::{
    ErrorObject, ErrorSource, Link, Links, LinksSource, Meta, MetaSource, Pagination,
};
pub use error::{Error, Result};
pub use flexible::FlexibleResource;
pub use parse::{parse_str, parse_value};
pub use query::{Query, Related};
pub use relationship::{
    RelationshipData, RelationshipEntry, RelationshipInput, Relationships, RelationshipsSource,
};
pub use resource::{Resource, ResourceId, ResourceIdentifier};
pub use validator::{StructuralValidator, Validator};
