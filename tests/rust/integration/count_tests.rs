use cyphergen::config::TranslatorConfig;
use cyphergen::cypher_generator::translate;
use cyphergen::query_context::{ResolutionContext, SelectionNode};
use cyphergen::query_planner::TranslationError;
use serde_json::json;

use super::{load_schema, run};

#[test]
fn test_count_with_equality_argument() {
    let schema = load_schema("movies");
    let ctx = ResolutionContext::count(
        SelectionNode::new("CountPerson").with_argument("userId", json!("123")),
    );
    let plan = run(&schema, &ctx).unwrap();
    assert_eq!(
        plan.text,
        "MATCH (`person`:`Person`:`Actor`) WHERE (`person`.userId = $userId) \
         RETURN {count: count(`person`)} AS `CountPerson`"
    );
    assert_eq!(serde_json::to_value(&plan.parameters).unwrap(), json!({"userId": "123"}));
}

#[test]
fn test_count_grouped_by_two_hops() {
    let schema = load_schema("equipment");
    let ctx = ResolutionContext::count(
        SelectionNode::new("CountEquipment")
            .with_argument("filter", json!({"type": "pump"}))
            .with_argument("groupBy", json!("facilities.company.name")),
    );
    let plan = run(&schema, &ctx).unwrap();
    assert_eq!(
        plan.text,
        "MATCH (`equipment`:`Equipment`)-[:`IN_FACILITY`]->(`equipment_facilities`:`Facility`)\
         -[:`IN_COMPANY`]->(`equipment_facilities_company`:`Company`) \
         WHERE (`equipment`.type = $filter_type) \
         RETURN {group: `equipment_facilities_company`.name, count: count(`equipment`)} AS `CountEquipment`"
    );
}

#[test]
fn test_count_grouped_through_inbound_relation() {
    let schema = load_schema("movies");
    let ctx = ResolutionContext::count(
        SelectionNode::new("CountGenre").with_argument("groupBy", json!("movies.year")),
    );
    let plan = run(&schema, &ctx).unwrap();
    assert_eq!(
        plan.text,
        "MATCH (`genre`:`Genre`)<-[:`IN_GENRE`]-(`genre_movies`:`Movie`) \
         RETURN {group: `genre_movies`.year, count: count(`genre`)} AS `CountGenre`"
    );
    assert!(plan.parameters.is_empty());
}

#[test]
fn test_misspelled_group_segment() {
    let schema = load_schema("equipment");
    let ctx = ResolutionContext::count(
        SelectionNode::new("CountEquipment").with_argument("groupBy", json!("facilities.compay.name")),
    );
    let err = run(&schema, &ctx).unwrap_err();
    assert_eq!(err, TranslationError::InvalidGroupByPath("compay".to_string()));
    assert_eq!(err.to_string(), "Unable to group by \"compay\"");
}

#[test]
fn test_custom_count_prefix() {
    let schema = load_schema("movies");
    let config = TranslatorConfig {
        count_prefix: "Total".to_string(),
        ..Default::default()
    };
    let ctx = ResolutionContext::count(SelectionNode::new("TotalMovie"));
    let plan = translate(&ctx, &schema, &config).unwrap();
    assert_eq!(
        plan.text,
        "MATCH (`movie`:`Movie`) RETURN {count: count(`movie`)} AS `TotalMovie`"
    );

    let ctx = ResolutionContext::count(SelectionNode::new("CountMovie"));
    assert_eq!(
        translate(&ctx, &schema, &config).unwrap_err(),
        TranslationError::UnknownCountTarget("CountMovie".to_string())
    );
}

#[test]
fn test_count_with_relationship_filter() {
    let schema = load_schema("movies");
    let ctx = ResolutionContext::count(
        SelectionNode::new("CountMovie").with_argument("filter", json!({"genres_none": {"name": "Horror"}})),
    );
    let plan = run(&schema, &ctx).unwrap();
    assert_eq!(
        plan.text,
        "MATCH (`movie`:`Movie`) WHERE (NOT EXISTS { MATCH (`movie`)-[:`IN_GENRE`]->(`movie_genres`:`Genre`) \
         WHERE (`movie_genres`.name = $filter_genres_none_name) }) \
         RETURN {count: count(`movie`)} AS `CountMovie`"
    );
}

#[test]
fn test_grouped_count_keeps_quantified_filter_in_subquery() {
    let schema = load_schema("movies");
    let ctx = ResolutionContext::count(
        SelectionNode::new("CountGenre")
            .with_argument("filter", json!({"movies_none": {"title": "Up"}}))
            .with_argument("groupBy", json!("movies.year")),
    );
    let plan = run(&schema, &ctx).unwrap();
    assert_eq!(
        plan.text,
        "MATCH (`genre`:`Genre`)<-[:`IN_GENRE`]-(`genre_movies`:`Movie`) \
         WHERE (NOT EXISTS { MATCH (`genre`)<-[:`IN_GENRE`]-(`genre_movies_2`:`Movie`) \
         WHERE (`genre_movies_2`.title = $filter_movies_none_title) }) \
         RETURN {group: `genre_movies`.year, count: count(`genre`)} AS `CountGenre`"
    );

    let ctx = ResolutionContext::count(
        SelectionNode::new("CountGenre")
            .with_argument("filter", json!({"movies": null}))
            .with_argument("groupBy", json!("movies.year")),
    );
    let plan = run(&schema, &ctx).unwrap();
    assert_eq!(
        plan.text,
        "MATCH (`genre`:`Genre`)<-[:`IN_GENRE`]-(`genre_movies`:`Movie`) \
         WHERE (NOT EXISTS { MATCH (`genre`)<-[:`IN_GENRE`]-(`genre_movies_2`:`Movie`) }) \
         RETURN {group: `genre_movies`.year, count: count(`genre`)} AS `CountGenre`"
    );
}

#[test]
fn test_grouped_count_shares_step_with_plain_filter() {
    let schema = load_schema("movies");
    let ctx = ResolutionContext::count(
        SelectionNode::new("CountGenre")
            .with_argument("filter", json!({"movies": {"year_gt": 2000}}))
            .with_argument("groupBy", json!("movies.year")),
    );
    let plan = run(&schema, &ctx).unwrap();
    assert_eq!(
        plan.text,
        "MATCH (`genre`:`Genre`)<-[:`IN_GENRE`]-(`genre_movies`:`Movie`) \
         WHERE (EXISTS { MATCH (`genre`)<-[:`IN_GENRE`]-(`genre_movies`:`Movie`) \
         WHERE (`genre_movies`.year > $filter_movies_year_gt) }) \
         RETURN {group: `genre_movies`.year, count: count(`genre`)} AS `CountGenre`"
    );
}
