use serde_json::Value;

use crate::{
    graph_catalog::graph_schema::GraphSchema,
    query_context::selection::SelectionNode,
    utils::alias_naming::{AliasRegistry, ParamPath},
};

pub mod auth;
pub mod errors;
pub mod operators;
pub mod parameters;
pub mod predicate;
pub mod traversal;

pub use errors::TranslationError;
pub use parameters::{ParamRef, ParameterMap};
pub use predicate::{PredicateBuilder, PredicateNode};
pub use traversal::{RootBinding, TraversalPlan, TraversalPlanner};

/// Output of planning one read field: its predicate and the steps needed to
/// evaluate it.
#[derive(Debug, Clone)]
pub struct ReadPlan {
    pub predicate: PredicateNode,
    pub traversal: TraversalPlan,
}

/// How a read field is planned
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions<'a> {
    /// Plan steps for relationship fields in the selection
    pub project_selection: bool,
    /// Dotted group-by path (counts only)
    pub group_by: Option<&'a str>,
    pub strict_arguments: bool,
}

/// `groupBy` argument of a field, which must be a dotted path string
pub fn group_by_path(node: &SelectionNode) -> Result<Option<&str>, TranslationError> {
    match node.group_by() {
        None => Ok(None),
        Some(Value::String(path)) => Ok(Some(path.as_str())),
        Some(other) => Err(TranslationError::InvalidGroupByPath(other.to_string())),
    }
}

/// Plan a read field: lower its arguments to a predicate, then plan the
/// traversal over selection, predicate and group-by paths.
pub fn plan_read_field(
    node: &SelectionNode,
    root: RootBinding,
    schema: &GraphSchema,
    params: &mut ParameterMap,
    param_path: &ParamPath,
    aliases: &mut AliasRegistry,
    options: ReadOptions<'_>,
) -> Result<ReadPlan, TranslationError> {
    let type_meta = schema.get_type_or_err(&root.type_name)?;

    let predicate = PredicateBuilder::new(schema, params).build_for_field(
        node,
        type_meta,
        param_path,
        options.strict_arguments,
    )?;

    let selections: &[SelectionNode] = if options.project_selection {
        &node.selections
    } else {
        &[]
    };

    let traversal = TraversalPlanner::new(schema).plan(
        root,
        selections,
        Some(&predicate),
        options.group_by,
        aliases,
    )?;

    Ok(ReadPlan {
        predicate,
        traversal,
    })
}
