use cyphergen::config::TranslatorConfig;
use cyphergen::cypher_generator::translate;
use cyphergen::query_context::{AuthContext, OperationKind, ResolutionContext, SelectionNode};
use cyphergen::query_planner::TranslationError;
use serde_json::json;

use super::{load_schema, run};

#[test]
fn test_create_returns_projected_node() {
    let schema = load_schema("movies");
    let ctx = ResolutionContext::mutation(
        OperationKind::Create,
        "Movie",
        SelectionNode::new("CreateMovie")
            .with_argument("data", json!({"movieId": 42, "title": "Up", "genres": [{"name": "Family"}]}))
            .with_selections(vec![
                SelectionNode::new("title"),
                SelectionNode::new("genres").with_selection(SelectionNode::new("name")),
            ]),
    );
    let plan = run(&schema, &ctx).unwrap();
    assert_eq!(
        plan.text,
        "CREATE (`movie`:`Movie` {movieId: $data_movieId, title: $data_title}) \
         CREATE (`movie`)-[:`IN_GENRE`]->(`movie_genres_0`:`Genre` {name: $data_genres_0_name}) \
         RETURN `movie` {.title, genres: COLLECT { MATCH (`movie`)-[:`IN_GENRE`]->(`movie_genres`:`Genre`) \
         RETURN `movie_genres` {.name} AS `genres` }} AS `CreateMovie`"
    );
    assert_eq!(
        serde_json::to_value(&plan.parameters).unwrap(),
        json!({"data_movieId": "42", "data_title": "Up", "data_genres_0_name": "Family"})
    );
}

#[test]
fn test_update_by_non_unique_key_is_ambiguous() {
    let schema = load_schema("movies");
    let ctx = ResolutionContext::mutation(
        OperationKind::Update,
        "Movie",
        SelectionNode::new("UpdateMovie")
            .with_argument("where", json!({"year": 1999}))
            .with_argument("data", json!({"rating": 4.5})),
    );
    let err = run(&schema, &ctx).unwrap_err();
    assert_eq!(
        err,
        TranslationError::AmbiguousMatch {
            type_name: "Movie".to_string(),
            keys: "year".to_string(),
        }
    );
}

#[test]
fn test_update_sets_only_given_fields() {
    let schema = load_schema("movies");
    let ctx = ResolutionContext::mutation(
        OperationKind::Update,
        "Movie",
        SelectionNode::new("UpdateMovie")
            .with_argument("where", json!({"title": "Up"}))
            .with_argument("data", json!({"rating": 4.5}))
            .with_selection(SelectionNode::new("rating")),
    );
    let plan = run(&schema, &ctx).unwrap();
    assert_eq!(
        plan.text,
        "MATCH (`movie`:`Movie` {title: $where_title}) SET `movie` += {rating: $data_rating} \
         RETURN `movie` {.rating} AS `UpdateMovie`"
    );
}

#[test]
fn test_update_without_keys_is_ambiguous() {
    let schema = load_schema("movies");
    let ctx = ResolutionContext::mutation(
        OperationKind::Update,
        "Movie",
        SelectionNode::new("UpdateMovie").with_argument("data", json!({"rating": 1})),
    );
    assert!(matches!(
        run(&schema, &ctx),
        Err(TranslationError::AmbiguousMatch { ref keys, .. }) if keys.is_empty()
    ));
}

#[test]
fn test_merge_keeps_key_out_of_set() {
    let schema = load_schema("movies");
    let ctx = ResolutionContext::mutation(
        OperationKind::Merge,
        "Genre",
        SelectionNode::new("MergeGenre")
            .with_argument("where", json!({"name": "Drama"}))
            .with_argument("data", json!({"name": "Drama"}))
            .with_selection(SelectionNode::new("name")),
    );
    let plan = run(&schema, &ctx).unwrap();
    assert_eq!(
        plan.text,
        "MERGE (`genre`:`Genre` {name: $where_name}) RETURN `genre` {.name} AS `MergeGenre`"
    );
}

#[test]
fn test_delete_requires_scope() {
    let schema = load_schema("movies");
    let config = TranslatorConfig {
        auth_scopes: true,
        ..Default::default()
    };
    let ctx = ResolutionContext::mutation(
        OperationKind::Delete,
        "Movie",
        SelectionNode::new("DeleteMovie")
            .with_argument("where", json!({"movieId": "m1"}))
            .with_selection(SelectionNode::new("title")),
    );
    assert_eq!(
        translate(&ctx, &schema, &config).unwrap_err(),
        TranslationError::Forbidden("DeleteMovie".to_string())
    );

    let granted = ctx.with_auth(AuthContext::with_scopes(&["delete:movie"]));
    let plan = translate(&granted, &schema, &config).unwrap();
    assert_eq!(
        plan.text,
        "MATCH (`movie`:`Movie` {movieId: $where_movieId}) \
         WITH `movie` AS `movie_deleted`, `movie` {.title} AS `movie` \
         DETACH DELETE `movie_deleted` RETURN `movie` AS `DeleteMovie`"
    );
}

#[test]
fn test_connect_on_create() {
    let schema = load_schema("movies");
    let ctx = ResolutionContext::mutation(
        OperationKind::Create,
        "Person",
        SelectionNode::new("CreatePerson")
            .with_argument("data", json!({"userId": "u1", "bestFriend": {"connect": {"userId": "u2"}}}))
            .with_selection(SelectionNode::new("userId")),
    );
    let plan = run(&schema, &ctx).unwrap();
    assert_eq!(
        plan.text,
        "CREATE (`person`:`Person`:`Actor` {userId: $data_userId}) \
         CALL { WITH `person` MATCH (`person_bestFriend_connect_0`:`Person`:`Actor` {userId: $data_bestFriend_connect_0_userId}) \
         MERGE (`person`)-[:`BEST_FRIEND`]->(`person_bestFriend_connect_0`) } \
         RETURN `person` {.userId} AS `CreatePerson`"
    );
}

#[test]
fn test_connect_key_must_be_unique() {
    let schema = load_schema("movies");
    let ctx = ResolutionContext::mutation(
        OperationKind::Update,
        "Person",
        SelectionNode::new("UpdatePerson")
            .with_argument("where", json!({"userId": "u1"}))
            .with_argument("data", json!({"movies": {"connect": [{"year": 1999}]}})),
    );
    assert_eq!(
        run(&schema, &ctx).unwrap_err(),
        TranslationError::AmbiguousMatch {
            type_name: "Movie".to_string(),
            keys: "year".to_string(),
        }
    );
}
