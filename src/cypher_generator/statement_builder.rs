//! Statement assembly for read and count operations.
//!
//! A read statement is built in one pass, clause by clause:
//!
//! ```text
//! [CALL fulltext … YIELD node AS `a`, score AS `a_score`] MATCH <root>[<group-by hops>]
//! [WHERE <predicate>] RETURN `a` {…} AS `<key>` [ORDER BY …] [SKIP …] [LIMIT …]
//! ```
//!
//! Nested relationship selections call back into [`CypherBuilder::read_statement`]
//! with a root bound to the parent alias, so filtering, ordering and
//! pagination behave the same at every depth. Every level claims its aliases
//! from the builder's one [`AliasRegistry`].

use std::cell::RefCell;

use serde_json::Value;

use crate::config::TranslatorConfig;
use crate::graph_catalog::{GraphSchema, TypeMetadata};
use crate::query_context::selection::{SelectionNode, SEARCH_ARG};
use crate::query_context::ResolutionContext;
use crate::query_planner::errors::TranslationError;
use crate::query_planner::parameters::ParameterMap;
use crate::query_planner::traversal::{MatchMode, RootBinding, TraversalPlan};
use crate::query_planner::{group_by_path, plan_read_field, PredicateNode, ReadOptions};
use crate::utils::alias_naming::{child_alias, root_alias, AliasRegistry, ParamPath};

use super::aggregation::AggregationBuilder;
use super::common::{hop_pattern, node_pattern, quote_identifier, relation_arrow, string_literal};
use super::ordering::{order_by_clause, pagination_clause, SEARCH_SCORE};
use super::to_cypher::ToCypher;

pub(crate) struct CypherBuilder<'a> {
    pub(crate) schema: &'a GraphSchema,
    pub(crate) config: &'a TranslatorConfig,
    pub(crate) ctx: &'a ResolutionContext,
    /// Aliases bound so far in the statement being built
    pub(crate) aliases: RefCell<AliasRegistry>,
}

/// Fulltext index call binding the statement root
struct SearchCall {
    clause: String,
    /// Variable holding the match score
    score: String,
}

impl<'a> CypherBuilder<'a> {
    pub(crate) fn new(
        schema: &'a GraphSchema,
        config: &'a TranslatorConfig,
        ctx: &'a ResolutionContext,
    ) -> Self {
        CypherBuilder {
            schema,
            config,
            ctx,
            aliases: RefCell::new(AliasRegistry::new()),
        }
    }

    /// Claim `base` (or a suffixed variant) for this statement
    pub(crate) fn claim_alias(&self, base: &str) -> String {
        self.aliases.borrow_mut().claim(base)
    }

    /// Top-level read of the operation field
    pub(crate) fn build_query(
        &self,
        type_meta: &TypeMetadata,
        params: &mut ParameterMap,
    ) -> Result<String, TranslationError> {
        let root = RootBinding {
            alias: root_alias(&type_meta.name),
            type_name: type_meta.name.clone(),
            incoming: None,
        };
        self.read_statement(&self.ctx.field, root, params, &ParamPath::root())
    }

    /// Read statement for `node`, rooted at `root`
    pub(crate) fn read_statement(
        &self,
        node: &SelectionNode,
        root: RootBinding,
        params: &mut ParameterMap,
        param_path: &ParamPath,
    ) -> Result<String, TranslationError> {
        let type_meta = self.schema.get_type_or_err(&root.type_name)?;
        let alias = root.alias.clone();

        let search = self.search_call(node, &root, type_meta, params, param_path)?;
        let plan = plan_read_field(
            node,
            root,
            self.schema,
            params,
            param_path,
            &mut self.aliases.borrow_mut(),
            ReadOptions {
                project_selection: true,
                group_by: None,
                strict_arguments: self.config.strict_arguments,
            },
        )?;

        let mut clauses = vec![match_clause(&plan.traversal, type_meta, search.as_ref())?];
        if let Some(condition) = where_condition(&plan.predicate, &plan.traversal)? {
            clauses.push(format!("WHERE {}", condition));
        }

        let projection = self.build_projection(
            &node.selections,
            type_meta,
            &alias,
            &plan.traversal,
            params,
        )?;
        clauses.push(format!(
            "RETURN {} AS {}",
            projection,
            quote_identifier(node.response_key())
        ));

        let score = search.as_ref().map(|s| s.score.as_str());
        if let Some(order_by) = order_by_clause(node, type_meta, &alias, score)? {
            clauses.push(order_by);
        }
        if let Some(window) = pagination_clause(node, params, param_path)? {
            clauses.push(window);
        }

        Ok(clauses.join(" "))
    }

    /// Count (optionally grouped) of the nodes matching the field's filter
    pub(crate) fn build_count(
        &self,
        type_meta: &TypeMetadata,
        params: &mut ParameterMap,
    ) -> Result<String, TranslationError> {
        let node = &self.ctx.field;
        let root = RootBinding {
            alias: root_alias(&type_meta.name),
            type_name: type_meta.name.clone(),
            incoming: None,
        };
        let param_path = ParamPath::root();

        let search = self.search_call(node, &root, type_meta, params, &param_path)?;
        let plan = plan_read_field(
            node,
            root,
            self.schema,
            params,
            &param_path,
            &mut self.aliases.borrow_mut(),
            ReadOptions {
                project_selection: false,
                group_by: group_by_path(node)?,
                strict_arguments: self.config.strict_arguments,
            },
        )?;

        let mut clauses = vec![match_clause(&plan.traversal, type_meta, search.as_ref())?];
        if let Some(condition) = where_condition(&plan.predicate, &plan.traversal)? {
            clauses.push(format!("WHERE {}", condition));
        }
        let aggregation = plan.traversal.build_aggregation();
        clauses.push(format!(
            "RETURN {} AS {}",
            aggregation.to_cypher(),
            quote_identifier(node.response_key())
        ));

        Ok(clauses.join(" "))
    }

    /// Fulltext index call for a `search` argument on the statement root
    fn search_call(
        &self,
        node: &SelectionNode,
        root: &RootBinding,
        type_meta: &TypeMetadata,
        params: &mut ParameterMap,
        param_path: &ParamPath,
    ) -> Result<Option<SearchCall>, TranslationError> {
        let Some(value) = node.argument(SEARCH_ARG) else {
            return Ok(None);
        };
        let invalid = || TranslationError::InvalidFilterField(SEARCH_ARG.to_string());
        let index = type_meta.search_index().ok_or_else(invalid)?;
        if root.incoming.is_some() || !matches!(value, Value::String(_)) {
            return Err(invalid());
        }

        let param = params.insert(param_path.child(SEARCH_ARG).name(), value.clone())?;
        self.aliases.borrow_mut().reserve(&root.alias);
        let score = self.claim_alias(&child_alias(&root.alias, SEARCH_SCORE));
        let clause = format!(
            "CALL db.index.fulltext.queryNodes({}, {}) YIELD node AS {}, {} AS {}",
            string_literal(index),
            param,
            quote_identifier(&root.alias),
            SEARCH_SCORE,
            quote_identifier(&score)
        );
        Ok(Some(SearchCall { clause, score }))
    }
}

/// Root pattern followed by the required group-by hops
fn match_clause(
    plan: &TraversalPlan,
    type_meta: &TypeMetadata,
    search: Option<&SearchCall>,
) -> Result<String, TranslationError> {
    let root = plan.root();
    let mut pattern = match &root.incoming {
        Some(incoming) => hop_pattern(&incoming.parent_alias, &incoming.relation, &root.alias),
        None => node_pattern(&root.alias, type_meta.labels()),
    };

    let mut previous = root.alias.as_str();
    for step in plan.group_by_steps() {
        let incoming = step.incoming.as_ref().ok_or_else(|| {
            TranslationError::SchemaInconsistency(format!("group-by step `{}` has no parent", step.alias))
        })?;
        if incoming.parent_alias != previous {
            return Err(TranslationError::SchemaInconsistency(format!(
                "group-by step `{}` does not continue `{}`",
                step.alias, previous
            )));
        }
        pattern.push_str(&relation_arrow(&incoming.relation, None));
        pattern.push_str(&node_pattern(&step.alias, [step.type_name.as_str()]));
        previous = step.alias.as_str();
    }

    Ok(match search {
        Some(call) => format!("{} MATCH {}", call.clause, pattern),
        None => format!("MATCH {}", pattern),
    })
}

/// Predicate plus an existence check for every selected relationship that
/// must be present, or `None` when nothing constrains the match.
fn where_condition(
    predicate: &PredicateNode,
    plan: &TraversalPlan,
) -> Result<Option<String>, TranslationError> {
    let mut conditions = Vec::new();
    if !predicate.is_vacuous() {
        conditions.push(predicate.to_cypher(plan)?);
    }

    for step in plan.steps() {
        let selection_only = step.origin.selection && !step.origin.predicate && !step.origin.group_by;
        if step.mode != MatchMode::Required || !selection_only {
            continue;
        }
        if let Some(incoming) = &step.incoming {
            conditions.push(format!(
                "EXISTS {{ MATCH {} }}",
                hop_pattern(&incoming.parent_alias, &incoming.relation, &step.alias)
            ));
        }
    }

    Ok((!conditions.is_empty()).then(|| conditions.join(" AND ")))
}
