//! Translation error taxonomy.
//!
//! Field-shape errors name the offending key, path or value so they can be
//! shown to whoever issued the query. `Forbidden` names only the field or
//! operation. `SchemaInconsistency` and `ParameterCollision` are defects in
//! an upstream collaborator or in the translator itself.
//!
//! Every error is raised before any statement text is returned, and none of
//! them is worth retrying: translation is deterministic.

use thiserror::Error;

use crate::graph_catalog::GraphSchemaError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TranslationError {
    #[error("Invalid filter field \"{0}\"")]
    InvalidFilterField(String),

    #[error("Unable to group by \"{0}\"")]
    InvalidGroupByPath(String),

    #[error("Invalid order field \"{0}\" (expected <field>_asc or <field>_desc)")]
    InvalidOrderField(String),

    #[error("Invalid pagination: {argument} = {value}")]
    InvalidPagination { argument: String, value: String },

    #[error("Keys [{keys}] do not identify a single `{type_name}` (use a unique or id field)")]
    AmbiguousMatch { type_name: String, keys: String },

    #[error("Unknown count target \"{0}\"")]
    UnknownCountTarget(String),

    #[error("Not authorized to access \"{0}\"")]
    Forbidden(String),

    #[error("Invalid input field \"{0}\"")]
    InvalidInputField(String),

    #[error("Schema inconsistency: {0}")]
    SchemaInconsistency(String),

    #[error("Parameter `{0}` produced twice in one statement")]
    ParameterCollision(String),
}

impl From<GraphSchemaError> for TranslationError {
    fn from(e: GraphSchemaError) -> Self {
        TranslationError::SchemaInconsistency(e.to_string())
    }
}

impl TranslationError {
    /// Whether the error describes the query's shape (safe to show to its issuer)
    pub fn is_field_shape_error(&self) -> bool {
        matches!(
            self,
            TranslationError::InvalidFilterField(_)
                | TranslationError::InvalidGroupByPath(_)
                | TranslationError::InvalidOrderField(_)
                | TranslationError::InvalidPagination { .. }
                | TranslationError::UnknownCountTarget(_)
                | TranslationError::InvalidInputField(_)
        )
    }

    pub(crate) fn pagination(argument: &str, value: impl ToString) -> Self {
        TranslationError::InvalidPagination {
            argument: argument.to_string(),
            value: value.to_string(),
        }
    }
}
