//! Cypher generation.
//!
//! [`translate`] is the single entry point: it resolves the operation's root
//! type, checks scopes, then dispatches to the read, count or mutation
//! builder. The result is one statement text plus the parameters it
//! references.

use serde::{Deserialize, Serialize};

use crate::config::TranslatorConfig;
use crate::graph_catalog::{GraphSchema, TypeMetadata};
use crate::query_context::{OperationKind, ResolutionContext};
use crate::query_planner::auth::check_scopes;
use crate::query_planner::errors::TranslationError;
use crate::query_planner::parameters::ParameterMap;

pub mod aggregation;
pub mod common;
mod mutation;
pub mod ordering;
mod projection;
mod statement_builder;
pub mod to_cypher;

pub use projection::{CYPHER_PARAMS, TYPENAME_FIELD};

use statement_builder::CypherBuilder;

/// A parameterized statement ready for a driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementPlan {
    pub text: String,
    pub parameters: ParameterMap,
}

/// Translate one operation field into a parameterized Cypher statement.
///
/// Pure and deterministic: the same context, schema and config always give
/// the same text and the same parameters in the same order.
pub fn translate(
    ctx: &ResolutionContext,
    schema: &GraphSchema,
    config: &TranslatorConfig,
) -> Result<StatementPlan, TranslationError> {
    let type_meta = resolve_root_type(ctx, schema, config)?;
    log::debug!(
        "translating {:?} `{}` on `{}`",
        ctx.operation,
        ctx.field.name,
        type_meta.name
    );

    if config.auth_scopes {
        check_scopes(ctx, schema, type_meta)?;
    }

    let mut parameters = ParameterMap::new();
    if !ctx.cypher_params.is_empty() {
        parameters.insert(CYPHER_PARAMS, ctx.cypher_params.clone().into())?;
    }

    let builder = CypherBuilder::new(schema, config, ctx);
    let text = match ctx.operation {
        OperationKind::Query => builder.build_query(type_meta, &mut parameters)?,
        OperationKind::Count => builder.build_count(type_meta, &mut parameters)?,
        OperationKind::Create
        | OperationKind::Update
        | OperationKind::Delete
        | OperationKind::Merge => builder.build_mutation(type_meta, &mut parameters)?,
    };

    log::debug!("statement: {}", text);
    log::debug!("parameters: {:?}", parameters.names().collect::<Vec<_>>());
    Ok(StatementPlan { text, parameters })
}

/// Root type of the operation. Counts recover it from the field name.
fn resolve_root_type<'s>(
    ctx: &ResolutionContext,
    schema: &'s GraphSchema,
    config: &TranslatorConfig,
) -> Result<&'s TypeMetadata, TranslationError> {
    if ctx.operation == OperationKind::Count {
        let name = &ctx.field.name;
        return name
            .strip_prefix(config.count_prefix.as_str())
            .and_then(|type_name| schema.get_type(type_name))
            .ok_or_else(|| TranslationError::UnknownCountTarget(name.clone()));
    }

    let type_name = ctx.type_name.as_deref().ok_or_else(|| {
        TranslationError::SchemaInconsistency(format!(
            "no return type given for `{}`",
            ctx.field.name
        ))
    })?;
    Ok(schema.get_type_or_err(type_name)?)
}
