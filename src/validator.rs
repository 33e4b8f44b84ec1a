//! The grammar predicate consulted before parsing.
//!
//! The parser treats validation as a black box: any [`Validator`] can be
//! plugged in, including one delegating to an external service. The built-in
//! [`StructuralValidator`] checks the top-level wire grammar (member set,
//! `data`/`errors` exclusion, resource-object shape, errors-array shape) and
//! is what the crate's own round-trip guarantees are stated against.
//!
//! Response and request grammars differ in one rule: a response resource must
//! carry an `id`, a request resource (creation payload) may omit it.

use serde_json::Value;

/// A yes/no predicate over a decoded document, asked twice by the parser:
/// once as a response, once as a request.
pub trait Validator {
    /// Whether the value is acceptable as a response document.
    fn is_valid_response(&self, document: &Value) -> bool;

    /// Whether the value is acceptable as a request document.
    fn is_valid_request(&self, document: &Value) -> bool;
}

/// Members allowed at the top level of a document.
const TOP_LEVEL_MEMBERS: [&str; 6] = ["data", "errors", "meta", "links", "included", "jsonapi"];

/// Members allowed inside a resource object.
const RESOURCE_MEMBERS: [&str; 6] = ["type", "id", "attributes", "relationships", "links", "meta"];

/// The built-in top-level grammar check.
///
/// # Examples
///
/// ```rust
/// use jsonapi_document::{StructuralValidator, Validator};
/// use serde_json::json;
///
/// let validator = StructuralValidator;
/// let doc = json!({"data": {"type": "posts", "id": "1"}});
/// assert!(validator.is_valid_response(&doc));
///
/// // A creation payload has no id yet: request-only
/// let creation = json!({"data": {"type": "posts", "attributes": {"title": "t"}}});
/// assert!(!validator.is_valid_response(&creation));
/// assert!(validator.is_valid_request(&creation));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct StructuralValidator;

impl Validator for StructuralValidator {
    fn is_valid_response(&self, document: &Value) -> bool {
        check_document(document, true)
    }

    fn is_valid_request(&self, document: &Value) -> bool {
        check_document(document, false)
    }
}

fn check_document(document: &Value, require_ids: bool) -> bool {
    let Some(map) = document.as_object() else {
        return false;
    };

    if !map.keys().all(|k| TOP_LEVEL_MEMBERS.contains(&k.as_str())) {
        return false;
    }
    // At least one of data / errors / meta must be present
    if !["data", "errors", "meta"].iter().any(|k| map.contains_key(*k)) {
        return false;
    }
    if map.contains_key("data") && map.contains_key("errors") {
        return false;
    }
    if map.contains_key("included") && !map.contains_key("data") {
        return false;
    }

    if let Some(data) = map.get("data") {
        if !check_data(data, require_ids) {
            return false;
        }
    }
    if let Some(included) = map.get("included") {
        let Some(items) = included.as_array() else {
            return false;
        };
        if !items.iter().all(|item| check_resource(item, require_ids)) {
            return false;
        }
    }
    if let Some(errors) = map.get("errors") {
        let Some(items) = errors.as_array() else {
            return false;
        };
        if !items
            .iter()
            .all(|item| item.as_object().is_some_and(|e| !e.is_empty()))
        {
            return false;
        }
    }
    for member in ["meta", "links", "jsonapi"] {
        if let Some(value) = map.get(member) {
            if !value.is_object() {
                return false;
            }
        }
    }
    true
}

fn check_data(data: &Value, require_ids: bool) -> bool {
    match data {
        Value::Null => true,
        Value::Object(_) => check_resource(data, require_ids),
        Value::Array(items) => items.iter().all(|item| check_resource(item, require_ids)),
        _ => false,
    }
}

fn check_resource(value: &Value, require_id: bool) -> bool {
    let Some(map) = value.as_object() else {
        return false;
    };
    if !map.keys().all(|k| RESOURCE_MEMBERS.contains(&k.as_str())) {
        return false;
    }
    match map.get("type") {
        Some(Value::String(kind)) if !kind.is_empty() => {}
        _ => return false,
    }
    match map.get("id") {
        Some(Value::String(_)) | Some(Value::Number(_)) => {}
        None if !require_id => {}
        _ => return false,
    }
    for member in ["attributes", "relationships", "links", "meta"] {
        if let Some(value) = map.get(member) {
            if !value.is_object() {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_documents() {
        let validator = StructuralValidator;
        assert!(validator.is_valid_response(&json!({"meta": {"status": "ok"}})));
        assert!(validator.is_valid_response(&json!({"data": null})));
        assert!(!validator.is_valid_response(&json!({})));
        assert!(!validator.is_valid_response(&json!([])));
        assert!(!validator.is_valid_response(&json!({"links": {"self": "/x"}})));
    }

    #[test]
    fn test_data_errors_exclusion() {
        let validator = StructuralValidator;
        assert!(!validator.is_valid_response(&json!({
            "data": {"type": "posts", "id": "1"},
            "errors": [{"title": "boom"}]
        })));
    }

    #[test]
    fn test_included_requires_data() {
        let validator = StructuralValidator;
        assert!(!validator.is_valid_response(&json!({
            "meta": {"ok": true},
            "included": [{"type": "comments", "id": "5"}]
        })));
    }

    #[test]
    fn test_resource_shape() {
        let validator = StructuralValidator;
        assert!(!validator.is_valid_response(&json!({"data": {"id": "1"}})));
        assert!(!validator.is_valid_response(&json!({
            "data": {"type": "posts", "id": "1", "extra": 1}
        })));
        assert!(!validator.is_valid_response(&json!({
            "data": {"type": "posts", "id": "1", "attributes": []}
        })));
    }

    #[test]
    fn test_request_allows_missing_id() {
        let validator = StructuralValidator;
        let creation = json!({"data": {"type": "posts", "attributes": {"title": "t"}}});
        assert!(!validator.is_valid_response(&creation));
        assert!(validator.is_valid_request(&creation));
    }

    #[test]
    fn test_errors_must_be_nonblank_objects() {
        let validator = StructuralValidator;
        assert!(validator.is_valid_response(&json!({"errors": [{"title": "boom"}]})));
        assert!(!validator.is_valid_response(&json!({"errors": [{}]})));
        assert!(!validator.is_valid_response(&json!({"errors": {"title": "boom"}})));
    }
}
