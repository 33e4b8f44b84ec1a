use jsonapi_document::{
    parse_str, parse_value, Config, Document, Error, FlexibleResource, StructuralValidator,
    Validator,
};
use serde_json::{json, Value};

fn parse(value: &Value) -> Result<Document, Error> {
    parse_value(value, Config::new(), &StructuralValidator)
}

#[test]
fn test_minimal_document_round_trip() {
    let input = json!({"data": {"type": "articles", "id": "1", "attributes": {"title": "t"}}});
    let doc = parse(&input).unwrap();
    assert_eq!(doc.to_value().unwrap(), input);
}

#[test]
fn test_full_document_round_trip() {
    let input = json!({
        "data": [
            {
                "type": "articles",
                "id": "1",
                "attributes": {"title": "JSON:API paints my bikeshed"},
                "relationships": {
                    "author": {"data": {"type": "people", "id": "9"}},
                    "comments": {
                        "links": {"related": "/articles/1/comments"},
                        "data": [
                            {"type": "comments", "id": "5"},
                            {"type": "comments", "id": "12"}
                        ]
                    }
                },
                "links": {"self": "/articles/1"}
            }
        ],
        "included": [
            {"type": "people", "id": "9", "attributes": {"name": "Dan"}},
            {"type": "comments", "id": "5", "attributes": {"body": "First!"}},
            {"type": "comments", "id": "12", "attributes": {"body": "I like XML better"}}
        ],
        "meta": {"copyright": "2026"},
        "links": {"self": "/articles"}
    });

    let doc = parse(&input).unwrap();
    let output = doc.to_value().unwrap();
    assert_eq!(output, input);

    // And the serialized form is still grammatical
    assert!(StructuralValidator.is_valid_response(&output));
}

#[test]
fn test_assembled_document_survives_reparse() {
    let mut article = FlexibleResource::new();
    article.set_type("articles").unwrap();
    article.set_id(7);
    article.set_attribute("title", json!("t"));
    article
        .set_relationships(json!({"author": {"data": null}}))
        .unwrap();

    let mut doc = Document::flexible();
    doc.set_data(article).unwrap();
    doc.set_meta(json!({"generated": true})).unwrap();

    let serialized = doc.to_json().unwrap();
    let reparsed = parse_str(&serialized, Config::new(), &StructuralValidator).unwrap();
    assert_eq!(reparsed.to_value().unwrap(), doc.to_value().unwrap());
}

#[test]
fn test_errors_document_round_trip() {
    let input = json!({
        "errors": [
            {
                "status": "422",
                "title": "Invalid Attribute",
                "detail": "First name must contain at least two characters.",
                "source": {"pointer": "/data/attributes/firstName"}
            }
        ]
    });
    let doc = parse(&input).unwrap();
    assert_eq!(doc.to_value().unwrap(), input);
    assert_eq!(doc.errors().len(), 1);
}

#[test]
fn test_numeric_id_is_string_coerced() {
    let input = json!({"data": {"type": "posts", "id": 3}});
    let doc = parse(&input).unwrap();
    assert_eq!(
        doc.to_value().unwrap(),
        json!({"data": {"type": "posts", "id": "3"}})
    );
}

#[test]
fn test_jsonapi_member_forces_version_output() {
    let input = json!({"data": null, "meta": {}, "jsonapi": {"version": "1.0"}});
    let doc = parse(&input).unwrap();
    assert_eq!(
        doc.to_value().unwrap()["jsonapi"],
        json!({"version": "1.0"})
    );
}

#[test]
fn test_non_json_input_is_a_format_error() {
    let err = parse_str("{oops", Config::new(), &StructuralValidator).unwrap_err();
    assert!(matches!(err, Error::Format(_)));
}

#[test]
fn test_ungrammatical_input_is_a_format_error() {
    for bad in [
        json!({"wat": 1}),
        json!({"data": {"id": "1"}}),
        json!({"data": {"type": "posts", "id": "1"}, "errors": [{"title": "x"}]}),
        json!(["not", "an", "object"]),
    ] {
        let err = parse(&bad).unwrap_err();
        assert!(matches!(err, Error::Format(_)), "accepted {bad}");
    }
}

#[test]
fn test_request_grammar_accepts_creation_payload() {
    // No id yet: response-invalid, request-valid
    let input = json!({"data": {"type": "posts", "attributes": {"title": "draft"}}});
    let doc = parse(&input).unwrap();
    assert_eq!(doc.to_value().unwrap(), input);
}

#[test]
fn test_parsed_document_is_queryable() {
    let input = json!({
        "data": {"type": "posts", "id": "1", "attributes": {"title": "t"}},
        "included": [{"type": "comments", "id": "5", "attributes": {"body": "hi"}}]
    });
    let doc = parse(&input).unwrap();
    let found = doc
        .query()
        .where_eq("attributes.body", "hi")
        .first()
        .unwrap();
    assert_eq!(found.kind(), "comments");
}

#[test]
fn test_custom_validator_is_honored() {
    struct RejectEverything;

    impl Validator for RejectEverything {
        fn is_valid_response(&self, _: &Value) -> bool {
            false
        }
        fn is_valid_request(&self, _: &Value) -> bool {
            false
        }
    }

    let input = json!({"data": {"type": "posts", "id": "1"}});
    let err = parse_value(&input, Config::new(), &RejectEverything).unwrap_err();
    assert!(matches!(err, Error::Format(_)));
}
