use std::io::Write;

use cyphergen::graph_catalog::{
    Direction, FieldKind, GraphSchemaConfig, GraphSchemaError, StructuredKind, TypeRef,
};
use test_case::test_case;

const VALID: &str = r#"
types:
  - name: Person
    primary_key: email
    fields:
      - name: email
        type: String
      - name: born
        type: LocalDateTime
      - name: knows
        type: Person
        list: true
        relation: { name: KNOWS, direction: in }
      - name: score
        type: Float
        cypher: "RETURN 1.0"
"#;

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(VALID.as_bytes()).unwrap();

    let schema = GraphSchemaConfig::from_yaml_file(file.path())
        .unwrap()
        .to_graph_schema()
        .unwrap();
    let person = schema.get_type("Person").unwrap();

    assert_eq!(person.primary_key().map(|f| f.name.as_str()), Some("email"));
    assert!(person.is_unique_key("email"));
    assert_eq!(
        person.field("born").unwrap().structured_kind(),
        Some(StructuredKind::LocalDateTime)
    );
    assert_eq!(
        person.field("knows").unwrap().relation().map(|r| r.direction),
        Some(Direction::Inbound)
    );
    assert!(matches!(
        &person.field("score").unwrap().kind,
        FieldKind::Computed { returns: TypeRef::Scalar(_), .. }
    ));
}

#[test]
fn test_missing_file() {
    let err = GraphSchemaConfig::from_yaml_file("/nonexistent/schema.yaml").unwrap_err();
    assert!(matches!(err, GraphSchemaError::ConfigReadError { .. }));
}

#[test_case(
    "relation: { name: KNOWS }",
    "MissingDirection" ; "relation without direction"
)]
#[test_case(
    "relation: { direction: OUT }",
    "MissingRelationName" ; "relation without name"
)]
#[test_case(
    "relation: { name: KNOWS, direction: SIDEWAYS }",
    "InvalidDirection" ; "unknown direction"
)]
#[test_case(
    "relation: { name: KNOWS, direction: OUT }\n        cypher: \"RETURN 1\"",
    "RelationshipAndComputed" ; "relation and custom statement"
)]
#[test_case("list: true", "UnboundObjectField" ; "object field without binding")]
fn test_invalid_relationship_field(extra: &str, expected: &str) {
    let yaml = format!(
        r#"
types:
  - name: Person
    fields:
      - name: friend
        type: Person
        {}
"#,
        extra
    );
    let err = GraphSchemaConfig::from_yaml_str(&yaml)
        .unwrap()
        .to_graph_schema()
        .unwrap_err();
    assert!(format!("{:?}", err).starts_with(expected), "{:?}", err);
}

#[test]
fn test_unknown_relation_target() {
    let yaml = r#"
types:
  - name: Person
    fields:
      - name: pet
        type: Dog
        relation: { name: OWNS, direction: OUT }
"#;
    let err = GraphSchemaConfig::from_yaml_str(yaml)
        .unwrap()
        .to_graph_schema()
        .unwrap_err();
    assert_eq!(
        err,
        GraphSchemaError::UnknownRelationTarget {
            type_name: "Person".to_string(),
            field: "pet".to_string(),
            target: "Dog".to_string(),
        }
    );
}

#[test]
fn test_duplicate_type() {
    let yaml = r#"
types:
  - name: Person
    fields: [{ name: name, type: String }]
  - name: Person
    fields: [{ name: name, type: String }]
"#;
    let err = GraphSchemaConfig::from_yaml_str(yaml)
        .unwrap()
        .to_graph_schema()
        .unwrap_err();
    assert_eq!(
        err,
        GraphSchemaError::DuplicateType {
            type_name: "Person".to_string()
        }
    );
}
