//! Parsing wire documents back into flexible documents.
//!
//! The inverse of serialization: decode, validate against the grammar
//! predicate, then rebuild a flexible [`Document`] member by member through
//! the same setters the assembly path uses, so everything a parsed document
//! holds has passed the same validation as a hand-built one, and
//! re-serializing reproduces a structurally equal JSON tree.
//!
//! ## Examples
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

use crate::config::Config;
use crate::document::Document;
use crate::flexible::FlexibleResource;
use crate::validator::Validator;
use crate::{Error, Result};
use serde_json::Value;

/// Parses a JSON string into a flexible [`Document`].
///
/// # Errors
///
/// Returns [`Error::Format`] if the text is not valid JSON or fails the
/// validator, plus any setter error from rebuilding the members.
pub fn parse_str(text: &str, config: Config, validator: &impl Validator) -> Result<Document> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| Error::format(format!("input is not valid JSON: {e}")))?;
    parse_value(&value, config, validator)
}

/// Parses a decoded JSON value into a flexible [`Document`].
///
/// The input must satisfy the validator as a response or a request document.
/// A `data: null` member parses the same as an absent one. When the input
/// carries a `jsonapi` member the parsed document emits it again regardless
/// of the configuration.
///
/// # Errors
///
/// Returns [`Error::Format`] if the validator rejects the value under both
/// grammars, plus any setter error from rebuilding the members.
pub fn parse_value(value: &Value, config: Config, validator: &impl Validator) -> Result<Document> {
    if !validator.is_valid_response(value) && !validator.is_valid_request(value) {
        return Err(Error::format(
            "input matches neither the response nor the request grammar",
        ));
    }
    let map = value
        .as_object()
        .ok_or_else(|| Error::format("document must be an object"))?;

    let mut config = config;
    if map.contains_key("jsonapi") {
        config.show_api_version = true;
    }
    let mut doc = Document::flexible_with(config)?;

    if let Some(data) = map.get("data") {
        match data {
            Value::Null => {}
            Value::Object(_) => {
                doc.set_data(resource_from_value(data)?)?;
            }
            Value::Array(items) => {
                let resources = items
                    .iter()
                    .map(resource_from_value)
                    .collect::<Result<Vec<FlexibleResource>>>()?;
                doc.set_data(resources)?;
            }
            other => {
                return Err(Error::format(format!(
                    "document `data` must be an object, array or null, got {other}"
                )))
            }
        }
    }

    if let Some(included) = map.get("included") {
        let items = included
            .as_array()
            .ok_or_else(|| Error::format("document `included` must be an array"))?;
        let resources = items
            .iter()
            .map(resource_from_value)
            .collect::<Result<Vec<FlexibleResource>>>()?;
        doc.set_included(resources)?;
    }

    if let Some(errors) = map.get("errors") {
        doc.set_errors(errors.clone())?;
    }
    if let Some(meta) = map.get("meta") {
        doc.set_meta(meta.clone())?;
    }
    if let Some(links) = map.get("links") {
        doc.set_links(links.clone())?;
    }

    Ok(doc)
}

/// Rebuilds one resource object as a [`FlexibleResource`], setting its
/// members in wire order.
fn resource_from_value(value: &Value) -> Result<FlexibleResource> {
    let map = value
        .as_object()
        .ok_or_else(|| Error::format(format!("resource must be an object, got {value}")))?;

    let mut resource = FlexibleResource::new();
    match map.get("type") {
        Some(Value::String(kind)) => {
            resource.set_type(kind.clone())?;
        }
        _ => return Err(Error::format("resource must have a string `type`")),
    }
    match map.get("id") {
        Some(Value::String(id)) => {
            resource.set_id(id.as_str());
        }
        Some(Value::Number(id)) => {
            resource.set_id(id.to_string());
        }
        Some(other) => {
            return Err(Error::format(format!(
                "resource `id` must be a string or number, got {other}"
            )))
        }
        None => {}
    }
    if let Some(attributes) = map.get("attributes") {
        let attributes = attributes
            .as_object()
            .ok_or_else(|| Error::format("resource `attributes` must be an object"))?;
        resource.set_attributes(attributes.clone());
    }
    if let Some(relationships) = map.get("relationships") {
        resource.set_relationships(relationships.clone())?;
    }
    if let Some(links) = map.get("links") {
        resource.set_links(links.clone())?;
    }
    if let Some(meta) = map.get("meta") {
        resource.set_meta(meta.clone())?;
    }
    Ok(resource)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StructuralValidator;
    use serde_json::json;

    fn parse(value: Value) -> Result<Document> {
        parse_value(&value, Config::new(), &StructuralValidator)
    }

    #[test]
    fn test_minimal_round_trip() {
        let input = json!({"data": {"type": "articles", "id": "1", "attributes": {"title": "t"}}});
        let doc = parse(input.clone()).unwrap();
        assert_eq!(doc.to_value().unwrap(), input);
    }

    #[test]
    fn test_invalid_json_is_a_format_error() {
        let err = parse_str("{not json", Config::new(), &StructuralValidator).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_rejected_by_both_grammars() {
        let err = parse(json!({"unknown": 1})).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_null_data_parses_as_absent() {
        let doc = parse(json!({"data": null, "meta": {"ok": true}})).unwrap();
        assert_eq!(doc.to_value().unwrap(), json!({"meta": {"ok": true}}));
    }

    #[test]
    fn test_collection_with_included() {
        let input = json!({
            "data": [
                {"type": "posts", "id": "1", "attributes": {"title": "a"}},
                {"type": "posts", "id": "2", "attributes": {"title": "b"}}
            ],
            "included": [
                {"type": "comments", "id": "5", "attributes": {"body": "hi"}}
            ]
        });
        let doc = parse(input.clone()).unwrap();
        assert_eq!(doc.to_value().unwrap(), input);
        assert_eq!(doc.included().len(), 1);
    }

    #[test]
    fn test_errors_document() {
        let input = json!({"errors": [{"status": "404", "title": "Not Found"}]});
        let doc = parse(input.clone()).unwrap();
        assert_eq!(doc.to_value().unwrap(), input);
    }

    #[test]
    fn test_jsonapi_member_is_reproduced() {
        let input = json!({
            "data": {"type": "posts", "id": "1"},
            "jsonapi": {"version": "1.0"}
        });
        let doc = parse(input.clone()).unwrap();
        assert_eq!(doc.to_value().unwrap(), input);
    }

    #[test]
    fn test_relationships_survive_the_trip() {
        let input = json!({
            "data": {
                "type": "articles",
                "id": "1",
                "relationships": {
                    "author": {"data": {"type": "people", "id": "9"}}
                }
            }
        });
        let doc = parse(input.clone()).unwrap();
        assert_eq!(doc.to_value().unwrap(), input);
    }
}
