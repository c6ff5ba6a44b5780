//! Fixture schemas shared by unit tests

use super::graph_schema::{Direction, FieldMetadata, GraphSchema, OperationScopes, TypeMetadata};
use super::schema_types::{ScalarType, StructuredKind, TypeRef};

/// Person / Movie / Genre catalog covering every field kind
pub fn movies_schema() -> GraphSchema {
    let person = TypeMetadata::new(
        "Person",
        vec![
            FieldMetadata::scalar("userId", ScalarType::Id).id(),
            FieldMetadata::scalar("name", ScalarType::String).search("personSearch"),
            FieldMetadata::scalar("age", ScalarType::Int),
            FieldMetadata::scalar("active", ScalarType::Boolean),
            FieldMetadata::structured("born", StructuredKind::Date),
            FieldMetadata::structured("lastSeen", StructuredKind::DateTime),
            FieldMetadata::structured("location", StructuredKind::Point),
            FieldMetadata::relationship("movies", "ACTED_IN", Direction::Outbound, "Movie").list(),
            FieldMetadata::relationship("bestFriend", "BEST_FRIEND", Direction::Outbound, "Person"),
            FieldMetadata::computed(
                "friendCount",
                "MATCH (this)-[:FRIEND]->(f) RETURN count(f)",
                TypeRef::Scalar(ScalarType::Int),
            ),
            FieldMetadata::computed(
                "coActors",
                "MATCH (this)-[:ACTED_IN]->()<-[:ACTED_IN]-(o) RETURN o LIMIT $limit",
                TypeRef::Object("Person".to_string()),
            )
            .list()
            .arguments(&["limit"]),
            FieldMetadata::scalar("secret", ScalarType::String).scopes(&["read:secret"]),
        ],
        None,
    )
    .expect("valid Person fixture");

    let movie = TypeMetadata::new(
        "Movie",
        vec![
            FieldMetadata::scalar("movieId", ScalarType::Id).id(),
            FieldMetadata::scalar("title", ScalarType::String).unique(),
            FieldMetadata::scalar("year", ScalarType::Int),
            FieldMetadata::scalar("rating", ScalarType::Float),
            FieldMetadata::relationship("genres", "IN_GENRE", Direction::Outbound, "Genre").list(),
            FieldMetadata::relationship("actors", "ACTED_IN", Direction::Inbound, "Person").list(),
        ],
        None,
    )
    .expect("valid Movie fixture")
    .with_auth(OperationScopes {
        delete: vec!["delete:movie".to_string()],
        ..Default::default()
    });

    let genre = TypeMetadata::new(
        "Genre",
        vec![
            FieldMetadata::scalar("name", ScalarType::String).unique(),
            FieldMetadata::relationship("movies", "IN_GENRE", Direction::Inbound, "Movie").list(),
        ],
        None,
    )
    .expect("valid Genre fixture");

    GraphSchema::build(vec![person, movie, genre]).expect("valid movies fixture")
}

/// Equipment / Facility / Company catalog used for multi-hop group keys
pub fn equipment_schema() -> GraphSchema {
    let equipment = TypeMetadata::new(
        "Equipment",
        vec![
            FieldMetadata::scalar("id", ScalarType::Id).required(),
            FieldMetadata::scalar("type", ScalarType::String)
                .required()
                .search("equipmentSearch"),
            FieldMetadata::relationship("facilities", "IN_FACILITY", Direction::Outbound, "Facility")
                .list(),
        ],
        None,
    )
    .expect("valid Equipment fixture");

    let facility = TypeMetadata::new(
        "Facility",
        vec![
            FieldMetadata::scalar("id", ScalarType::Id).required(),
            FieldMetadata::scalar("name", ScalarType::String).required(),
            FieldMetadata::scalar("tag", ScalarType::String),
            FieldMetadata::relationship("company", "IN_COMPANY", Direction::Outbound, "Company"),
        ],
        None,
    )
    .expect("valid Facility fixture");

    let company = TypeMetadata::new(
        "Company",
        vec![FieldMetadata::scalar("name", ScalarType::String)],
        None,
    )
    .expect("valid Company fixture");

    GraphSchema::build(vec![equipment, facility, company]).expect("valid equipment fixture")
}
