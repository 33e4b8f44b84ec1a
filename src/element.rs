//! Document element wrappers: meta, links, pagination, and error objects.
//!
//! Elements are small validated value types that serialize straight into
//! their wire shape. Each one can be built programmatically or from a raw
//! [`Value`] (the JSON-decode side of the round trip), and each validates its
//! input eagerly:
//!
//! - [`Meta`]: a free-form JSON object
//! - [`Link`] / [`Links`]: URL string, `{href, meta?}` object, or `null`
//! - [`Pagination`]: a [`Links`] variant with required `first`/`last` members
//! - [`ErrorObject`] / [`ErrorSource`]: the `errors` array entries
//!
//! ## Examples
//!
//! ```rust
//! use jsonapi_document::{Links, Link};
//!
//! let mut links = Links::new();
//! links.insert_url("self", "http://example.com/api/posts/1").unwrap();
//! assert_eq!(links.len(), 1);
//!
//! // Neither a relative path nor a well-formed URL
//! assert!(Link::url("not-a-url").is_err());
//! ```

use crate::{Error, Result};
use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

/// A free-form meta object with string keys.
///
/// # Examples
///
/// ```rust
/// use jsonapi_document::Meta;
/// use serde_json::json;
///
/// let meta = Meta::from_value(&json!({"total": 13})).unwrap();
/// assert_eq!(meta.get("total"), Some(&json!(13)));
///
/// // Meta must be an object
/// assert!(Meta::from_value(&json!([1, 2])).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Meta(Map<String, Value>);

impl Meta {
    /// Creates an empty meta object.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a meta object from a raw JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidElement`] if the value is not an object.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Meta(map.clone())),
            other => Err(Error::invalid_element(format!(
                "meta must be an object, got {other}"
            ))),
        }
    }

    /// Inserts a member, replacing any previous value under the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns the member under `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the underlying object map.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Shallow-merges `other` over `self`; keys from `other` win on conflict.
    pub(crate) fn merge(&mut self, other: Meta) {
        for (key, value) in other.0 {
            self.0.insert(key, value);
        }
    }
}

impl From<Map<String, Value>> for Meta {
    fn from(map: Map<String, Value>) -> Self {
        Meta(map)
    }
}

impl Serialize for Meta {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// Checks that a link target is a relative path or a well-formed absolute URL.
fn validate_link_target(target: &str) -> Result<()> {
    if target.contains('/') || Url::parse(target).is_ok() {
        return Ok(());
    }
    Err(Error::invalid_link(format!("`{target}` is not a valid url")))
}

/// A single link: `null`, a URL string, or an `{href, meta?}` object.
#[derive(Clone, Debug, PartialEq)]
pub enum Link {
    Null,
    Url(String),
    Object { href: String, meta: Option<Meta> },
}

impl Link {
    /// Creates a URL-string link, validating the target.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLink`] if the target is neither a relative
    /// path (containing `/`) nor a well-formed absolute URL.
    pub fn url(target: impl Into<String>) -> Result<Self> {
        let target = target.into();
        validate_link_target(&target)?;
        Ok(Link::Url(target))
    }

    /// Creates an `{href, meta?}` link object, validating the href.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLink`] if the href is not a valid link target.
    pub fn object(href: impl Into<String>, meta: Option<Meta>) -> Result<Self> {
        let href = href.into();
        validate_link_target(&href)?;
        Ok(Link::Object { href, meta })
    }

    /// Builds a link from a raw JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLink`] for non-string/non-object values,
    /// objects without `href`, or objects with members other than `href`
    /// and `meta`.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Link::Null),
            Value::String(target) => Link::url(target.clone()),
            Value::Object(map) => {
                let href = match map.get("href") {
                    Some(Value::String(href)) => href.clone(),
                    Some(other) => {
                        return Err(Error::invalid_link(format!(
                            "link href must be a string, got {other}"
                        )))
                    }
                    None => return Err(Error::invalid_link("link object must contain `href`")),
                };

                let mut meta = None;
                for (key, member) in map {
                    match key.as_str() {
                        "href" => {}
                        "meta" => {
                            meta = Some(
                                Meta::from_value(member)
                                    .map_err(|e| Error::invalid_link(e.to_string()))?,
                            )
                        }
                        other => {
                            return Err(Error::invalid_link(format!(
                                "link object cannot contain key `{other}`"
                            )))
                        }
                    }
                }

                Link::object(href, meta)
            }
            other => Err(Error::invalid_link(format!(
                "link must be a string, object or null, got {other}"
            ))),
        }
    }
}

impl Serialize for Link {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Link::Null => serializer.serialize_unit(),
            Link::Url(target) => serializer.serialize_str(target),
            Link::Object { href, meta } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("href", href)?;
                if let Some(meta) = meta {
                    map.serialize_entry("meta", meta)?;
                }
                map.end()
            }
        }
    }
}

/// An ordered map of link name to [`Link`].
///
/// # Examples
///
/// ```rust
/// use jsonapi_document::Links;
/// use serde_json::json;
///
/// let links = Links::from_value(&json!({
///     "self": "http://example.com/api/posts/1",
///     "related": {"href": "/posts/1/comments", "meta": {"count": 3}}
/// })).unwrap();
/// assert_eq!(links.len(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Links {
    entries: IndexMap<String, Link>,
}

impl Links {
    /// Creates an empty links map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a links map from a raw JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLink`] if the value is not an object or any
    /// member fails link validation.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| Error::invalid_link(format!("links must be an object, got {value}")))?;

        let mut links = Links::new();
        for (name, member) in map {
            links.entries.insert(name.clone(), Link::from_value(member)?);
        }
        Ok(links)
    }

    /// Inserts a link under `name`, replacing any previous one.
    pub fn insert(&mut self, name: impl Into<String>, link: Link) -> &mut Self {
        self.entries.insert(name.into(), link);
        self
    }

    /// Inserts a validated URL-string link under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLink`] if the target is not a valid link.
    pub fn insert_url(&mut self, name: impl Into<String>, target: impl Into<String>) -> Result<&mut Self> {
        self.entries.insert(name.into(), Link::url(target)?);
        Ok(self)
    }

    /// Returns the link under `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Link> {
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

    /// Iterates over `(name, link)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Link)> {
        self.entries.iter()
    }

    /// Shallow-merges `other` over `self`; names from `other` win on conflict.
    pub(crate) fn merge(&mut self, other: Links) {
        for (name, link) in other.entries {
            self.entries.insert(name, link);
        }
    }
}

impl Serialize for Links {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, link) in &self.entries {
            map.serialize_entry(name, link)?;
        }
        map.end()
    }
}

/// Pagination link names accepted by [`Pagination`].
const PAGINATION_KEYS: [&str; 5] = ["self", "first", "last", "next", "prev"];

/// A pagination [`Links`] variant.
///
/// Requires `first` and `last`, and restricts member names to
/// `self`/`first`/`last`/`next`/`prev`.
///
/// # Examples
///
/// ```rust
/// use jsonapi_document::Pagination;
/// use serde_json::json;
///
/// let pagination = Pagination::from_value(&json!({
///     "first": "/posts?page=1",
///     "last": "/posts?page=9",
///     "next": "/posts?page=2"
/// })).unwrap();
/// assert_eq!(pagination.as_links().len(), 3);
///
/// assert!(Pagination::from_value(&json!({"first": "/posts?page=1"})).is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Pagination(Links);

impl Pagination {
    /// Validates an existing links map as pagination links.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLink`] if `first` or `last` is missing, or if
    /// any member name is not a pagination member.
    pub fn new(links: Links) -> Result<Self> {
        for required in ["first", "last"] {
            if links.get(required).is_none() {
                return Err(Error::invalid_link(format!(
                    "pagination must have `{required}` member"
                )));
            }
        }
        for (name, _) in links.iter() {
            if !PAGINATION_KEYS.contains(&name.as_str()) {
                return Err(Error::invalid_link(format!(
                    "pagination cannot contain member `{name}`"
                )));
            }
        }
        Ok(Pagination(links))
    }

    /// Builds pagination links from a raw JSON object.
    pub fn from_value(value: &Value) -> Result<Self> {
        Pagination::new(Links::from_value(value)?)
    }

    /// Returns the validated links map.
    #[must_use]
    pub fn as_links(&self) -> &Links {
        &self.0
    }
}

impl From<Pagination> for Links {
    fn from(pagination: Pagination) -> Links {
        pagination.0
    }
}

impl Serialize for Pagination {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// Links input: an already-built element or raw JSON to validate.
///
/// Built from [`Links`], [`Pagination`], or a raw [`Value`] via `From`, so
/// setters can accept either form.
#[derive(Clone, Debug)]
pub enum LinksSource {
    Built(Links),
    Raw(Value),
}

impl LinksSource {
    pub(crate) fn resolve(self) -> Result<Links> {
        match self {
            LinksSource::Built(links) => Ok(links),
            LinksSource::Raw(value) => Links::from_value(&value),
        }
    }
}

impl From<Links> for LinksSource {
    fn from(links: Links) -> Self {
        LinksSource::Built(links)
    }
}

impl From<Pagination> for LinksSource {
    fn from(pagination: Pagination) -> Self {
        LinksSource::Built(pagination.into())
    }
}

impl From<Value> for LinksSource {
    fn from(value: Value) -> Self {
        LinksSource::Raw(value)
    }
}

/// Meta input: an already-built element or raw JSON to validate.
#[derive(Clone, Debug)]
pub enum MetaSource {
    Built(Meta),
    Raw(Value),
}

impl MetaSource {
    pub(crate) fn resolve(self) -> Result<Meta> {
        match self {
            MetaSource::Built(meta) => Ok(meta),
            MetaSource::Raw(value) => Meta::from_value(&value),
        }
    }
}

impl From<Meta> for MetaSource {
    fn from(meta: Meta) -> Self {
        MetaSource::Built(meta)
    }
}

impl From<Map<String, Value>> for MetaSource {
    fn from(map: Map<String, Value>) -> Self {
        MetaSource::Built(Meta(map))
    }
}

impl From<Value> for MetaSource {
    fn from(value: Value) -> Self {
        MetaSource::Raw(value)
    }
}

/// Coerces a scalar JSON value to its wire string form.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// The `source` member of an error object.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ErrorSource {
    pub pointer: Option<String>,
    pub parameter: Option<String>,
}

impl ErrorSource {
    /// Builds an error source from a raw JSON object.
    ///
    /// Members other than `pointer` and `parameter` are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidElement`] if the value is not an object or a
    /// kept member is not a string.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| {
            Error::invalid_element(format!("error source must be an object, got {value}"))
        })?;

        let mut source = ErrorSource::default();
        for (key, member) in map {
            if key != "pointer" && key != "parameter" {
                continue;
            }
            let Value::String(text) = member else {
                return Err(Error::invalid_element(format!(
                    "error source `{key}` must be a string"
                )));
            };
            match key.as_str() {
                "pointer" => source.pointer = Some(text.clone()),
                _ => source.parameter = Some(text.clone()),
            }
        }
        Ok(source)
    }
}

impl Serialize for ErrorSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(pointer) = &self.pointer {
            map.serialize_entry("pointer", pointer)?;
        }
        if let Some(parameter) = &self.parameter {
            map.serialize_entry("parameter", parameter)?;
        }
        map.end()
    }
}

/// One entry of a document's `errors` array.
///
/// Scalar members are coerced to strings per wire-format convention; unknown
/// members are dropped; a fully blank error is rejected.
///
/// # Examples
///
/// ```rust
/// use jsonapi_document::ErrorObject;
/// use serde_json::json;
///
/// let error = ErrorObject::from_value(&json!({
///     "status": 404,
///     "title": "Not Found",
///     "source": {"pointer": "/data/attributes/title"}
/// })).unwrap();
/// assert_eq!(error.status.as_deref(), Some("404"));
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ErrorObject {
    pub id: Option<String>,
    pub code: Option<String>,
    pub status: Option<String>,
    pub title: Option<String>,
    pub detail: Option<String>,
    pub meta: Option<Meta>,
    pub source: Option<ErrorSource>,
}

impl ErrorObject {
    /// Creates an empty error object. Populate it before attaching to a
    /// document; blank errors are rejected there.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    #[must_use]
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: ErrorSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Builds an error object from a raw JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidElement`] if the value is not an object, a
    /// scalar member is not coercible to a string, or the result is blank.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| {
            Error::invalid_element(format!("error data must be an object, got {value}"))
        })?;

        let mut error = ErrorObject::new();
        for (key, member) in map {
            match key.as_str() {
                "id" | "code" | "status" | "title" | "detail" => {
                    let text = scalar_string(member).ok_or_else(|| {
                        Error::invalid_element(format!("error `{key}` must be a scalar"))
                    })?;
                    match key.as_str() {
                        "id" => error.id = Some(text),
                        "code" => error.code = Some(text),
                        "status" => error.status = Some(text),
                        "title" => error.title = Some(text),
                        _ => error.detail = Some(text),
                    }
                }
                "meta" => error.meta = Some(Meta::from_value(member)?),
                "source" => error.source = Some(ErrorSource::from_value(member)?),
                _ => {}
            }
        }

        if error == ErrorObject::default() {
            return Err(Error::invalid_element("error data cannot be blank"));
        }
        Ok(error)
    }
}

impl Serialize for ErrorObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(id) = &self.id {
            map.serialize_entry("id", id)?;
        }
        if let Some(code) = &self.code {
            map.serialize_entry("code", code)?;
        }
        if let Some(status) = &self.status {
            map.serialize_entry("status", status)?;
        }
        if let Some(title) = &self.title {
            map.serialize_entry("title", title)?;
        }
        if let Some(detail) = &self.detail {
            map.serialize_entry("detail", detail)?;
        }
        if let Some(meta) = &self.meta {
            map.serialize_entry("meta", meta)?;
        }
        if let Some(source) = &self.source {
            map.serialize_entry("source", source)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_link_accepts_relative_path_and_url() {
        assert!(Link::url("/posts/1").is_ok());
        assert!(Link::url("http://example.com/api").is_ok());
        assert!(Link::url("nonsense").is_err());
    }

    #[test]
    fn test_link_object_rejects_unknown_keys() {
        let err = Link::from_value(&json!({"href": "/x", "extra": 1})).unwrap_err();
        assert!(matches!(err, Error::InvalidLink(_)));
    }

    #[test]
    fn test_links_round_trip() {
        let raw = json!({"self": "/posts/1", "related": {"href": "/posts/1/comments"}});
        let links = Links::from_value(&raw).unwrap();
        assert_eq!(serde_json::to_value(&links).unwrap(), raw);
    }

    #[test]
    fn test_pagination_requires_first_and_last() {
        assert!(Pagination::from_value(&json!({"first": "/p?page=1"})).is_err());
        assert!(Pagination::from_value(&json!({
            "first": "/p?page=1",
            "last": "/p?page=9",
            "filter": "/p?x=1"
        }))
        .is_err());
        assert!(Pagination::from_value(&json!({
            "first": "/p?page=1",
            "last": "/p?page=9"
        }))
        .is_ok());
    }

    #[test]
    fn test_error_object_coerces_scalars() {
        let error = ErrorObject::from_value(&json!({"code": 123, "status": "500"})).unwrap();
        assert_eq!(error.code.as_deref(), Some("123"));
        assert_eq!(error.status.as_deref(), Some("500"));
    }

    #[test]
    fn test_error_object_rejects_blank() {
        assert!(ErrorObject::from_value(&json!({})).is_err());
        // Members that are dropped do not count as content
        assert!(ErrorObject::from_value(&json!({"unknown": 1})).is_err());
    }

    #[test]
    fn test_error_source_members_must_be_strings() {
        assert!(ErrorSource::from_value(&json!({"pointer": 42})).is_err());
        let source = ErrorSource::from_value(&json!({"pointer": "/data", "junk": 1})).unwrap();
        assert_eq!(source.pointer.as_deref(), Some("/data"));
        assert_eq!(source.parameter, None);
    }

    #[test]
    fn test_meta_serializes_verbatim() {
        let raw = json!({"copyright": "2015", "count": 7});
        let meta = Meta::from_value(&raw).unwrap();
        assert_eq!(serde_json::to_value(&meta).unwrap(), raw);
    }
}
