//! Error types for document assembly and parsing.
//!
//! Every violation of a document invariant fails fast, synchronously, at the
//! point of violation; the document is left in its prior state. The core never
//! retries, degrades, or logs; callers decide how to present failures.
//!
//! ## Error Categories
//!
//! - **Classification errors**: a value is not a recognized resource, a
//!   collection contains a non-conforming element, or a non-flexible
//!   collection mixes resource types
//! - **Invariant errors**: reserved fields (`id`/`type`) inside attributes or
//!   relationships, `data`/`errors` mutual exclusion, `included` before `data`
//! - **Boundary errors**: malformed configuration, invalid link targets,
//!   wire input rejected by the grammar validator
//!
//! ## Examples
//!
//! ```rust
//! use jsonapi_document::{Document, Error, FlexibleResource};
//! use serde_json::json;
//!
//! let mut doc = Document::flexible();
//! doc.set_errors(json!({"title": "Not Found", "status": 404})).unwrap();
//!
//! // `data` and `errors` are mutually exclusive
//! let mut post = FlexibleResource::new();
//! post.set_type("posts").unwrap();
//! let err = doc.set_data(post).unwrap_err();
//! assert!(matches!(err, Error::DataErrorsConflict(_)));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors raised during document assembly, resource
/// adaptation, and parsing.
///
/// Each variant carries enough context to identify the offending member.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A value is neither a recognized resource nor a collection.
    #[error("invalid resource: {0}")]
    InvalidResource(String),

    /// A collection contains an element that is not a valid resource.
    #[error("invalid resource collection: {0}")]
    InvalidCollection(String),

    /// A non-flexible collection mixes distinct resource types.
    #[error("collection contains mixed resource types")]
    MixedCollection,

    /// A flexible resource or collection was used in a non-flexible document.
    #[error("flexible resource used outside a flexible document: {0}")]
    FlexibleUsage(String),

    /// `attributes` or `relationships` defines a reserved member.
    #[error("reserved field `{field}` is not allowed in {location}")]
    ReservedField { field: String, location: String },

    /// Attempt to set `data` while `errors` is populated, or vice versa.
    #[error("document `data` and `errors` are mutually exclusive: {0}")]
    DataErrorsConflict(String),

    /// `included` was set before the document had `data`.
    #[error("document `data` is not set yet - `included` must not be set")]
    IncludedBeforeData,

    /// Missing or malformed construction-time configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A link value is neither a relative path nor a well-formed absolute URL.
    #[error("invalid link: {0}")]
    InvalidLink(String),

    /// Malformed element input (meta, error object, error source).
    #[error("invalid element: {0}")]
    InvalidElement(String),

    /// Parser input failed external validation against both the response and
    /// the request grammar, or was not valid JSON at all.
    #[error("document failed validation: {0}")]
    Format(String),

    /// The assembled tree could not be handed to the JSON encoder.
    #[error("JSON encoding failed: {0}")]
    Encode(String),
}

impl Error {
    /// Creates an invalid-resource error with a display message.
    pub fn invalid_resource<T: fmt::Display>(msg: T) -> Self {
        Error::InvalidResource(msg.to_string())
    }

    /// Creates an invalid-collection error with a display message.
    pub fn invalid_collection<T: fmt::Display>(msg: T) -> Self {
        Error::InvalidCollection(msg.to_string())
    }

    /// Creates a flexible-usage error with a display message.
    pub fn flexible_usage<T: fmt::Display>(msg: T) -> Self {
        Error::FlexibleUsage(msg.to_string())
    }

    /// Creates a reserved-field error naming the field and where it appeared.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jsonapi_document::Error;
    ///
    /// let err = Error::reserved_field("type", "attributes");
    /// assert!(err.to_string().contains("`type`"));
    /// ```
    pub fn reserved_field(field: &str, location: &str) -> Self {
        Error::ReservedField {
            field: field.to_string(),
            location: location.to_string(),
        }
    }

    /// Creates a data/errors conflict error with a display message.
    pub fn data_errors_conflict<T: fmt::Display>(msg: T) -> Self {
        Error::DataErrorsConflict(msg.to_string())
    }

    /// Creates an invalid-configuration error with a display message.
    pub fn invalid_config<T: fmt::Display>(msg: T) -> Self {
        Error::InvalidConfig(msg.to_string())
    }

    /// Creates an invalid-link error with a display message.
    pub fn invalid_link<T: fmt::Display>(msg: T) -> Self {
        Error::InvalidLink(msg.to_string())
    }

    /// Creates an invalid-element error with a display message.
    pub fn invalid_element<T: fmt::Display>(msg: T) -> Self {
        Error::InvalidElement(msg.to_string())
    }

    /// Creates a format error with a display message.
    pub fn format<T: fmt::Display>(msg: T) -> Self {
        Error::Format(msg.to_string())
    }

    /// Creates an encoding error with a display message.
    pub fn encode<T: fmt::Display>(msg: T) -> Self {
        Error::Encode(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
