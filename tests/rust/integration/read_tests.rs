use cyphergen::query_context::{ResolutionContext, SelectionNode};
use cyphergen::query_planner::TranslationError;
use serde_json::json;

use super::{load_schema, run};

#[test]
fn test_filter_order_and_page_with_nested_collection() {
    let schema = load_schema("movies");
    let ctx = ResolutionContext::query(
        "Person",
        SelectionNode::new("Person")
            .with_argument("filter", json!({"name_contains": "Tom", "movies_some": {"year_gt": 1990}}))
            .with_argument("orderBy", json!("name_asc"))
            .with_argument("first", json!(10))
            .with_argument("offset", json!(5))
            .with_selections(vec![
                SelectionNode::new("name"),
                SelectionNode::new("movies")
                    .with_argument("first", json!(2))
                    .with_argument("orderBy", json!("year_desc"))
                    .with_selections(SelectionNode::leaves(&["title", "year"])),
            ]),
    );
    let plan = run(&schema, &ctx).unwrap();
    assert_eq!(
        plan.text,
        "MATCH (`person`:`Person`:`Actor`) \
         WHERE (`person`.name CONTAINS $filter_name_contains AND \
         EXISTS { MATCH (`person`)-[:`ACTED_IN`]->(`person_movies`:`Movie`) WHERE (`person_movies`.year > $filter_movies_some_year_gt) }) \
         RETURN `person` {.name, movies: COLLECT { MATCH (`person`)-[:`ACTED_IN`]->(`person_movies`:`Movie`) \
         RETURN `person_movies` {.title, .year} AS `movies` ORDER BY `person_movies`.year DESC LIMIT $person_movies_first }} AS `Person` \
         ORDER BY `person`.name ASC SKIP $offset LIMIT $first"
    );
    assert_eq!(
        serde_json::to_value(&plan.parameters).unwrap(),
        json!({
            "filter_name_contains": "Tom",
            "filter_movies_some_year_gt": 1990,
            "person_movies_first": 2,
            "offset": 5,
            "first": 10
        })
    );
}

#[test]
fn test_unbounded_first_emits_no_limit() {
    let schema = load_schema("movies");
    let ctx = ResolutionContext::query(
        "Movie",
        SelectionNode::new("Movie")
            .with_argument("first", json!(-1))
            .with_selection(SelectionNode::new("title")),
    );
    let plan = run(&schema, &ctx).unwrap();
    assert_eq!(plan.text, "MATCH (`movie`:`Movie`) RETURN `movie` {.title} AS `Movie`");
    assert!(plan.parameters.is_empty());
}

#[test]
fn test_structured_values_expand() {
    let schema = load_schema("movies");
    let ctx = ResolutionContext::query(
        "Person",
        SelectionNode::new("Person").with_selections(vec![
            SelectionNode::new("born"),
            SelectionNode::new("lastSeen").with_selection(SelectionNode::new("formatted")),
            SelectionNode::new("location").with_selections(SelectionNode::leaves(&["latitude", "longitude"])),
        ]),
    );
    let plan = run(&schema, &ctx).unwrap();
    assert_eq!(
        plan.text,
        "MATCH (`person`:`Person`:`Actor`) RETURN `person` {\
         born: {year: `person`.born.year, month: `person`.born.month, day: `person`.born.day}, \
         lastSeen: {formatted: toString(`person`.lastSeen)}, \
         location: {latitude: `person`.location.latitude, longitude: `person`.location.longitude}} AS `Person`"
    );
}

#[test]
fn test_temporal_filter_uses_constructor() {
    let schema = load_schema("movies");
    let ctx = ResolutionContext::query(
        "Person",
        SelectionNode::new("Person")
            .with_argument("filter", json!({"born_lt": {"year": 1970, "month": 1, "day": 1}}))
            .with_selection(SelectionNode::new("name")),
    );
    let plan = run(&schema, &ctx).unwrap();
    assert_eq!(
        plan.text,
        "MATCH (`person`:`Person`:`Actor`) WHERE (`person`.born < date($filter_born_lt)) \
         RETURN `person` {.name} AS `Person`"
    );
    assert_eq!(
        plan.parameters.get("filter_born_lt"),
        Some(&json!({"year": 1970, "month": 1, "day": 1}))
    );
}

#[test]
fn test_projection_extras() {
    let schema = load_schema("movies");
    let ctx = ResolutionContext::query(
        "Person",
        SelectionNode::new("Person").with_alias("people").with_selections(vec![
            SelectionNode::new("__typename"),
            SelectionNode::new("_id"),
            SelectionNode::new("name").with_alias("fullName"),
            SelectionNode::new("friendCount"),
        ]),
    );
    let plan = run(&schema, &ctx).unwrap();
    assert_eq!(
        plan.text,
        "MATCH (`person`:`Person`:`Actor`) RETURN `person` {__typename: \"Person\", _id: ID(`person`), \
         fullName: `person`.name, \
         friendCount: apoc.cypher.runFirstColumnSingle(\"MATCH (this)-[:FRIEND]->(f) RETURN count(f)\", {this: `person`})} \
         AS `people`"
    );
}

#[test]
fn test_computed_object_field_with_argument() {
    let schema = load_schema("movies");
    let ctx = ResolutionContext::query(
        "Person",
        SelectionNode::new("Person").with_selection(
            SelectionNode::new("coActors")
                .with_argument("limit", json!(3))
                .with_selection(SelectionNode::new("name")),
        ),
    );
    let plan = run(&schema, &ctx).unwrap();
    assert_eq!(
        plan.text,
        "MATCH (`person`:`Person`:`Actor`) RETURN `person` {coActors: [`person_coActors` IN \
         apoc.cypher.runFirstColumnMany(\"MATCH (this)-[:ACTED_IN]->()<-[:ACTED_IN]-(o) RETURN o LIMIT $limit\", \
         {this: `person`, limit: $person_coActors_limit}) | `person_coActors` {.name}]} AS `Person`"
    );
    assert_eq!(plan.parameters.get("person_coActors_limit"), Some(&json!(3)));
}

#[test]
fn test_cypher_params_bound_into_custom_statement() {
    let schema = load_schema("movies");
    let ctx = ResolutionContext::query(
        "Person",
        SelectionNode::new("Person")
            .with_selection(SelectionNode::new("recommended").with_selection(SelectionNode::new("title"))),
    )
    .with_cypher_param("tenant", json!("acme"));
    let plan = run(&schema, &ctx).unwrap();
    assert_eq!(
        plan.text,
        "MATCH (`person`:`Person`:`Actor`) RETURN `person` {recommended: [`person_recommended` IN \
         apoc.cypher.runFirstColumnMany(\"MATCH (m:Movie) WHERE m.tenant = $cypherParams.tenant RETURN m\", \
         {this: `person`, cypherParams: $cypherParams}) | `person_recommended` {.title}]} AS `Person`"
    );
    assert_eq!(
        serde_json::to_value(&plan.parameters).unwrap(),
        json!({"cypherParams": {"tenant": "acme"}})
    );
}

#[test]
fn test_singular_relationship_takes_head() {
    let schema = load_schema("movies");
    let ctx = ResolutionContext::query(
        "Person",
        SelectionNode::new("Person").with_selection(
            SelectionNode::new("bestFriend").with_selection(SelectionNode::new("name")),
        ),
    );
    let plan = run(&schema, &ctx).unwrap();
    assert_eq!(
        plan.text,
        "MATCH (`person`:`Person`:`Actor`) RETURN `person` {bestFriend: head(COLLECT { \
         MATCH (`person`)-[:`BEST_FRIEND`]->(`person_bestFriend`:`Person`) \
         RETURN `person_bestFriend` {.name} AS `bestFriend` })} AS `Person`"
    );
}

#[test]
fn test_or_and_not_keep_their_meaning() {
    let schema = load_schema("movies");
    let ctx = ResolutionContext::query(
        "Person",
        SelectionNode::new("Person")
            .with_argument(
                "filter",
                json!({"OR": [{"name": "Tom"}, {"NOT": {"age_lt": 30}}]}),
            )
            .with_selection(SelectionNode::new("name")),
    );
    let plan = run(&schema, &ctx).unwrap();
    assert_eq!(
        plan.text,
        "MATCH (`person`:`Person`:`Actor`) \
         WHERE (((`person`.name = $filter_OR_0_name) OR (NOT (`person`.age < $filter_OR_1_NOT_age_lt)))) \
         RETURN `person` {.name} AS `Person`"
    );
}

#[test]
fn test_empty_or_matches_nothing() {
    let schema = load_schema("movies");
    let ctx = ResolutionContext::query(
        "Person",
        SelectionNode::new("Person")
            .with_argument("filter", json!({"OR": []}))
            .with_selection(SelectionNode::new("name")),
    );
    let plan = run(&schema, &ctx).unwrap();
    assert_eq!(
        plan.text,
        "MATCH (`person`:`Person`:`Actor`) WHERE (false) RETURN `person` {.name} AS `Person`"
    );
}

#[test]
fn test_shape_errors_name_the_offender() {
    let schema = load_schema("movies");
    let cases = [
        (json!({"filter": {"nickname": "T"}}), TranslationError::InvalidFilterField("nickname".to_string())),
        (json!({"orderBy": "movies_asc"}), TranslationError::InvalidOrderField("movies_asc".to_string())),
        (json!({"nickname": "T"}), TranslationError::InvalidFilterField("nickname".to_string())),
        (json!({"search": "Tom", "first": -3}), TranslationError::InvalidPagination {
            argument: "first".to_string(),
            value: "-3".to_string(),
        }),
    ];
    for (arguments, expected) in cases {
        let mut field = SelectionNode::new("Person").with_selection(SelectionNode::new("name"));
        for (name, value) in arguments.as_object().unwrap() {
            field = field.with_argument(name.clone(), value.clone());
        }
        let ctx = ResolutionContext::query("Person", field);
        assert_eq!(run(&schema, &ctx).unwrap_err(), expected, "{}", arguments);
    }
}

#[test]
fn test_response_key_shaped_like_nested_alias() {
    let schema = load_schema("movies");
    let ctx = ResolutionContext::query(
        "Person",
        SelectionNode::new("Person").with_selections(vec![
            SelectionNode::new("movies").with_selection(
                SelectionNode::new("genres")
                    .with_argument("first", json!(1))
                    .with_selection(SelectionNode::new("name")),
            ),
            SelectionNode::new("bestFriend")
                .with_alias("movies_genres")
                .with_argument("first", json!(2))
                .with_selection(SelectionNode::new("name")),
        ]),
    );
    let plan = run(&schema, &ctx).unwrap();
    assert_eq!(
        plan.text,
        "MATCH (`person`:`Person`:`Actor`) RETURN `person` {\
         movies: COLLECT { MATCH (`person`)-[:`ACTED_IN`]->(`person_movies`:`Movie`) \
         RETURN `person_movies` {genres: COLLECT { MATCH (`person_movies`)-[:`IN_GENRE`]->(`person_movies_genres_2`:`Genre`) \
         RETURN `person_movies_genres_2` {.name} AS `genres` LIMIT $person_movies_genres_2_first }} AS `movies` }, \
         movies_genres: head(COLLECT { MATCH (`person`)-[:`BEST_FRIEND`]->(`person_movies_genres`:`Person`) \
         RETURN `person_movies_genres` {.name} AS `movies_genres` LIMIT $person_movies_genres_first })} AS `Person`"
    );
    assert_eq!(
        serde_json::to_value(&plan.parameters).unwrap(),
        json!({"person_movies_genres_2_first": 1, "person_movies_genres_first": 2})
    );
}

#[test]
fn test_search_score_gets_its_own_alias() {
    let schema = load_schema("movies");
    let ctx = ResolutionContext::query(
        "Person",
        SelectionNode::new("Person")
            .with_argument("search", json!("Tom"))
            .with_selection(SelectionNode::new("name")),
    );
    let plan = run(&schema, &ctx).unwrap();
    assert_eq!(
        plan.text,
        "CALL db.index.fulltext.queryNodes(\"personSearch\", $search) YIELD node AS `person`, score AS `person_score` \
         MATCH (`person`:`Person`:`Actor`) RETURN `person` {.name} AS `Person` ORDER BY `person_score` DESC"
    );
}
