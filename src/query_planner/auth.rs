//! Scope checks run before anything is built.
//!
//! The operation's type-level requirement is checked on the root type, then
//! field-level requirements on every selected field at every depth. The
//! first failure names only the field (or operation field) that was denied.

use crate::graph_catalog::{FieldKind, GraphSchema, TypeMetadata, TypeRef};
use crate::query_context::{AuthContext, ResolutionContext, SelectionNode};

use super::errors::TranslationError;

pub fn check_scopes(
    ctx: &ResolutionContext,
    schema: &GraphSchema,
    root_type: &TypeMetadata,
) -> Result<(), TranslationError> {
    let operation = ctx.operation.schema_operation();
    if !ctx.auth.permits(root_type.auth.for_operation(operation)) {
        log::debug!(
            "{} on `{}` denied for `{}`",
            operation,
            root_type.name,
            ctx.field.name
        );
        return Err(TranslationError::Forbidden(ctx.field.name.clone()));
    }
    check_selection(&ctx.field.selections, root_type, schema, &ctx.auth)
}

fn check_selection(
    selections: &[SelectionNode],
    type_meta: &TypeMetadata,
    schema: &GraphSchema,
    auth: &AuthContext,
) -> Result<(), TranslationError> {
    for child in selections {
        let Some(field) = type_meta.field(&child.name) else {
            continue;
        };
        if !auth.permits(&field.scopes) {
            return Err(TranslationError::Forbidden(field.name.clone()));
        }
        let target = match &field.kind {
            FieldKind::Relationship(relation) => Some(&relation.target_type),
            FieldKind::Computed {
                returns: TypeRef::Object(target),
                ..
            } => Some(target),
            _ => None,
        };
        if let Some(target) = target {
            let target_meta = schema.get_type_or_err(target)?;
            check_selection(&child.selections, target_meta, schema, auth)?;
        }
    }
    Ok(())
}
