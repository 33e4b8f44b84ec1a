//! Property-based tests for the document invariants that must hold for any
//! input: included dedup idempotence, data/errors mutual exclusion, and the
//! parse round trip.

use jsonapi_document::{
    parse_value, Config, Document, Error, FlexibleResource, StructuralValidator, Validator,
};
use proptest::prelude::*;
use serde_json::json;

fn kind_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("posts".to_string()),
        Just("comments".to_string()),
        Just("people".to_string()),
    ]
}

fn resource_strategy() -> impl Strategy<Value = FlexibleResource> {
    (kind_strategy(), 1u32..50, "[a-z]{0,12}").prop_map(|(kind, id, title)| {
        let mut resource = FlexibleResource::new();
        resource.set_type(kind).unwrap();
        resource.set_id(id);
        if !title.is_empty() {
            resource.set_attribute("title", json!(title));
        }
        resource
    })
}

fn collection_strategy() -> impl Strategy<Value = Vec<FlexibleResource>> {
    prop::collection::vec(resource_strategy(), 1..8)
}

proptest! {
    #[test]
    fn prop_included_dedup_is_idempotent(
        primary in resource_strategy(),
        included in collection_strategy(),
        repeats in 1usize..4,
    ) {
        let mut once = Document::flexible();
        once.set_data(primary.clone()).unwrap();
        once.set_included(included.clone()).unwrap();

        let mut many = Document::flexible();
        many.set_data(primary).unwrap();
        many.set_included(included.clone()).unwrap();
        for _ in 0..repeats {
            many.add_included(included.clone()).unwrap();
        }

        prop_assert_eq!(once.to_value().unwrap(), many.to_value().unwrap());
    }

    #[test]
    fn prop_errors_after_data_rejected(primary in resource_strategy()) {
        let mut doc = Document::flexible();
        doc.set_data(primary).unwrap();
        let before = doc.to_value().unwrap();

        let err = doc.set_errors(json!({"title": "boom"})).unwrap_err();
        prop_assert!(matches!(err, Error::DataErrorsConflict(_)));
        prop_assert_eq!(doc.to_value().unwrap(), before);
    }

    #[test]
    fn prop_data_after_errors_rejected(primary in resource_strategy()) {
        let mut doc = Document::flexible();
        doc.set_errors(json!({"title": "boom"})).unwrap();
        let before = doc.to_value().unwrap();

        let err = doc.set_data(primary).unwrap_err();
        prop_assert!(matches!(err, Error::DataErrorsConflict(_)));
        prop_assert_eq!(doc.to_value().unwrap(), before);
    }

    #[test]
    fn prop_serialized_documents_reparse_equal(
        primary in collection_strategy(),
        included in collection_strategy(),
    ) {
        let mut doc = Document::flexible();
        doc.set_data(primary).unwrap();
        doc.set_included(included).unwrap();

        let value = doc.to_value().unwrap();
        prop_assert!(StructuralValidator.is_valid_response(&value));

        let reparsed = parse_value(&value, Config::new(), &StructuralValidator).unwrap();
        prop_assert_eq!(reparsed.to_value().unwrap(), value);
    }

    #[test]
    fn prop_collection_dedup_keeps_first(collection in collection_strategy()) {
        let mut doc = Document::flexible();
        doc.set_data(collection.clone()).unwrap();

        let value = doc.to_value().unwrap();
        let data = value["data"].as_array().unwrap();

        // No (type, id) pair appears twice, and surviving entries keep the
        // order of their first occurrence in the input
        let mut seen = Vec::new();
        for resource in data {
            let key = (resource["type"].clone(), resource["id"].clone());
            prop_assert!(!seen.contains(&key));
            seen.push(key);
        }

        let mut expected = Vec::new();
        for resource in &collection {
            let key = (
                json!(resource.kind().unwrap()),
                json!(resource.id().unwrap()),
            );
            if !expected.contains(&key) {
                expected.push(key);
            }
        }
        prop_assert_eq!(seen, expected);
    }
}
