//! Projection builder.
//!
//! Builds the map projection `` `alias` {…} `` mirroring a selection. Entries
//! keep the selection order. Relationship fields recurse into a full read
//! statement scoped to the child alias and wrapped in `COLLECT { … }`;
//! computed fields invoke their custom statement through APOC.

use regex::Regex;
use std::sync::LazyLock;

use crate::graph_catalog::schema_types::FORMATTED_FIELD;
use crate::graph_catalog::{FieldKind, FieldMetadata, StructuredKind, TypeMetadata, TypeRef};
use crate::query_context::selection::SelectionNode;
use crate::query_planner::errors::TranslationError;
use crate::query_planner::parameters::ParameterMap;
use crate::query_planner::predicate::NODE_ID_ARG;
use crate::query_planner::traversal::{RootBinding, TraversalPlan, TraversalPlanner};
use crate::utils::alias_naming::{child_alias, ParamPath};

use super::common::{property, property_key, quote_identifier, string_literal};
use super::statement_builder::CypherBuilder;

/// Introspection field answered with the type name
pub const TYPENAME_FIELD: &str = "__typename";

/// Parameter carrying the caller's ambient variables
pub const CYPHER_PARAMS: &str = "cypherParams";

/// Subject node bound into custom statements
const THIS: &str = "this";

/// `$name` references inside a custom statement
static PARAM_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)").unwrap());

impl CypherBuilder<'_> {
    /// `` `alias` {…} `` for `selections` read from a node of `type_meta`
    pub(crate) fn build_projection(
        &self,
        selections: &[SelectionNode],
        type_meta: &TypeMetadata,
        alias: &str,
        plan: &TraversalPlan,
        params: &mut ParameterMap,
    ) -> Result<String, TranslationError> {
        let mut items = Vec::with_capacity(selections.len());
        for child in selections {
            items.push(self.projection_item(child, type_meta, alias, plan, params)?);
        }
        Ok(format!("{} {{{}}}", quote_identifier(alias), items.join(", ")))
    }

    fn projection_item(
        &self,
        child: &SelectionNode,
        type_meta: &TypeMetadata,
        alias: &str,
        plan: &TraversalPlan,
        params: &mut ParameterMap,
    ) -> Result<String, TranslationError> {
        let key = property_key(child.response_key());

        match child.name.as_str() {
            TYPENAME_FIELD => return Ok(format!("{}: {}", key, string_literal(&type_meta.name))),
            NODE_ID_ARG => return Ok(format!("{}: ID({})", key, quote_identifier(alias))),
            _ => {}
        }

        let field = type_meta.field(&child.name).ok_or_else(|| {
            TranslationError::SchemaInconsistency(format!(
                "type `{}` has no field `{}`",
                type_meta.name, child.name
            ))
        })?;
        log::trace!("projecting `{}.{}`", type_meta.name, field.name);

        let value = match &field.kind {
            FieldKind::Scalar(_) if child.alias.is_none() => {
                return Ok(format!(".{}", property_key(&field.name)));
            }
            FieldKind::Scalar(_) => property(alias, &field.name),
            FieldKind::Structured(kind) => structured_projection(child, *kind, alias, &field.name)?,
            FieldKind::Relationship(_) => self.relationship_projection(child, field, plan, params)?,
            FieldKind::Computed { statement, returns } => {
                self.computed_projection(child, field, statement, returns, alias, params)?
            }
        };
        Ok(format!("{}: {}", key, value))
    }

    /// Recursive translation of a relationship field, scoped to its step
    fn relationship_projection(
        &self,
        child: &SelectionNode,
        field: &FieldMetadata,
        plan: &TraversalPlan,
        params: &mut ParameterMap,
    ) -> Result<String, TranslationError> {
        let step = plan.selection_step(child.response_key()).ok_or_else(|| {
            TranslationError::SchemaInconsistency(format!(
                "no traversal step planned for `{}`",
                child.response_key()
            ))
        })?;

        let nested_root = RootBinding {
            alias: step.alias.clone(),
            type_name: step.type_name.clone(),
            incoming: step.incoming.clone(),
        };
        let scope = ParamPath::scoped(&step.alias);
        let nested = self.read_statement(child, nested_root, params, &scope)?;

        let collected = format!("COLLECT {{ {} }}", nested);
        Ok(if field.list {
            collected
        } else {
            format!("head({})", collected)
        })
    }

    fn computed_projection(
        &self,
        child: &SelectionNode,
        field: &FieldMetadata,
        statement: &str,
        returns: &TypeRef,
        alias: &str,
        params: &mut ParameterMap,
    ) -> Result<String, TranslationError> {
        let referenced: Vec<&str> = PARAM_REFERENCE
            .captures_iter(statement)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();

        let mut bindings = vec![format!("{}: {}", THIS, quote_identifier(alias))];
        if referenced.contains(&CYPHER_PARAMS) {
            let cypher_params = self.ctx.cypher_params.clone();
            let param = params.share(CYPHER_PARAMS, || cypher_params.into());
            bindings.push(format!("{}: {}", CYPHER_PARAMS, param));
        }

        for name in child.arguments.keys() {
            if !field.arguments.contains(name) {
                if self.config.strict_arguments {
                    return Err(TranslationError::InvalidFilterField(name.clone()));
                }
                log::warn!("ignoring argument `{}` on computed field `{}`", name, field.name);
            }
        }

        let scope = ParamPath::scoped(alias).child(child.response_key());
        for argument in &field.arguments {
            match child.arguments.get(argument) {
                Some(value) => {
                    let param = params.insert(scope.child(argument.as_str()).name(), value.clone())?;
                    bindings.push(format!("{}: {}", property_key(argument), param));
                }
                None if referenced.contains(&argument.as_str()) => {
                    bindings.push(format!("{}: null", property_key(argument)));
                }
                None => {}
            }
        }

        for name in &referenced {
            let bound = *name == THIS
                || *name == CYPHER_PARAMS
                || field.arguments.iter().any(|a| a.as_str() == *name);
            if !bound {
                log::warn!(
                    "custom statement of `{}` references unbound parameter ${}",
                    field.name,
                    name
                );
            }
        }

        let bindings = bindings.join(", ");
        let run = |variant: &str| {
            format!(
                "apoc.cypher.runFirstColumn{}({}, {{{}}})",
                variant,
                string_literal(statement),
                bindings
            )
        };

        match returns {
            TypeRef::Object(target) if !child.is_leaf() => {
                let item_alias = self.claim_alias(&child_alias(alias, child.response_key()));
                let target_meta = self.schema.get_type_or_err(target)?;
                let plan = TraversalPlanner::new(self.schema).plan(
                    RootBinding {
                        alias: item_alias.clone(),
                        type_name: target.clone(),
                        incoming: None,
                    },
                    &child.selections,
                    None,
                    None,
                    &mut self.aliases.borrow_mut(),
                )?;
                let projection =
                    self.build_projection(&child.selections, target_meta, &item_alias, &plan, params)?;
                let mapped = format!(
                    "[{} IN {} | {}]",
                    quote_identifier(&item_alias),
                    run("Many"),
                    projection
                );
                Ok(if field.list {
                    mapped
                } else {
                    format!("head({})", mapped)
                })
            }
            _ if field.list => Ok(run("Many")),
            _ => Ok(run("Single")),
        }
    }
}

/// Inline map of a structured value's sub-fields. A bare leaf expands to
/// every declared constituent.
fn structured_projection(
    child: &SelectionNode,
    kind: StructuredKind,
    alias: &str,
    field: &str,
) -> Result<String, TranslationError> {
    let read = property(alias, field);

    let entries: Vec<String> = if child.is_leaf() {
        kind.constituents()
            .iter()
            .map(|c| format!("{}: {}.{}", c, read, c))
            .collect()
    } else {
        child
            .selections
            .iter()
            .map(|sub| {
                let key = property_key(sub.response_key());
                if !kind.has_sub_field(&sub.name) {
                    return Err(TranslationError::SchemaInconsistency(format!(
                        "`{}` has no sub-field `{}`",
                        kind, sub.name
                    )));
                }
                Ok(if sub.name == FORMATTED_FIELD {
                    format!("{}: toString({})", key, read)
                } else {
                    format!("{}: {}.{}", key, read, sub.name)
                })
            })
            .collect::<Result<_, _>>()?
    };

    Ok(format!("{{{}}}", entries.join(", ")))
}
