//! Cyphergen - GraphQL selection to Cypher translation
//!
//! This crate compiles one resolved GraphQL operation field into a single
//! parameterized Cypher statement through:
//! - Schema metadata loaded from YAML (`graph_catalog`)
//! - Filter lowering and traversal planning (`query_planner`)
//! - Statement generation for reads, counts and mutations (`cypher_generator`)
//!
//! ```no_run
//! use cyphergen::config::TranslatorConfig;
//! use cyphergen::cypher_generator::translate;
//! use cyphergen::graph_catalog::GraphSchemaConfig;
//! use cyphergen::query_context::{ResolutionContext, SelectionNode};
//!
//! let schema = GraphSchemaConfig::from_yaml_file("schema.yaml")
//!     .unwrap()
//!     .to_graph_schema()
//!     .unwrap();
//! let ctx = ResolutionContext::query(
//!     "Person",
//!     SelectionNode::new("Person").with_selections(SelectionNode::leaves(&["name"])),
//! );
//! let plan = translate(&ctx, &schema, &TranslatorConfig::default()).unwrap();
//! println!("{} {:?}", plan.text, plan.parameters);
//! ```

pub mod utils;

pub mod config;
pub mod cypher_generator;
pub mod graph_catalog;
pub mod query_context;
pub mod query_planner;
