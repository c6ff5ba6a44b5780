//! Integration tests - full translations against the YAML fixture schemas
//!
//! These tests drive `translate` end to end: schema loading, planning and
//! statement generation together.

use std::path::PathBuf;

use cyphergen::config::TranslatorConfig;
use cyphergen::cypher_generator::{translate, StatementPlan};
use cyphergen::graph_catalog::{GraphSchema, GraphSchemaConfig};
use cyphergen::query_context::ResolutionContext;
use cyphergen::query_planner::TranslationError;

mod count_tests;
mod mutation_tests;
mod read_tests;

pub fn load_schema(name: &str) -> GraphSchema {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(format!("{}.yaml", name));
    GraphSchemaConfig::from_yaml_file(&path)
        .and_then(|config| config.to_graph_schema())
        .unwrap_or_else(|e| panic!("fixture {} failed to load: {}", name, e))
}

pub fn run(schema: &GraphSchema, ctx: &ResolutionContext) -> Result<StatementPlan, TranslationError> {
    translate(ctx, schema, &TranslatorConfig::default())
}
