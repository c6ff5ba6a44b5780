//! # Graph Schema Error Types
//!
//! Errors raised while building the schema metadata catalog.
//!
//! ## Error Categories
//!
//! - **Type Errors**: duplicate or unknown type names
//! - **Field Errors**: fields whose declaration contradicts the metadata contract
//!   (relationship without direction, relationship and custom statement at once, ...)
//! - **Configuration Errors**: file I/O and YAML parsing while loading a schema
//!
//! Every variant is an upstream defect: translation never starts on a catalog
//! that failed to build.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GraphSchemaError {
    #[error("Duplicate type definition `{type_name}`")]
    DuplicateType { type_name: String },
    #[error("Duplicate field `{type_name}.{field}`")]
    DuplicateField { type_name: String, field: String },
    #[error("No type metadata found for `{type_name}`")]
    UnknownType { type_name: String },
    #[error("Relationship field `{type_name}.{field}` has no direction")]
    MissingDirection { type_name: String, field: String },
    #[error("Relationship field `{type_name}.{field}` has no relation name")]
    MissingRelationName { type_name: String, field: String },
    #[error("Invalid direction `{direction}` on `{type_name}.{field}` (expected IN or OUT)")]
    InvalidDirection {
        type_name: String,
        field: String,
        direction: String,
    },
    #[error("Field `{type_name}.{field}` cannot be both a relationship and a custom statement")]
    RelationshipAndComputed { type_name: String, field: String },
    #[error("Field `{type_name}.{field}` references type `{target}` without a relation or custom statement")]
    UnboundObjectField {
        type_name: String,
        field: String,
        target: String,
    },
    #[error("Field `{type_name}.{field}` declares a relation but has scalar type `{scalar}`")]
    RelationOnScalar {
        type_name: String,
        field: String,
        scalar: String,
    },
    #[error("Relationship `{type_name}.{field}` targets unknown type `{target}`")]
    UnknownRelationTarget {
        type_name: String,
        field: String,
        target: String,
    },
    #[error("Primary key `{field}` of `{type_name}` is not a scalar field of that type")]
    InvalidPrimaryKey { type_name: String, field: String },
    #[error("Failed to read schema file: {error}")]
    ConfigReadError { error: String },
    #[error("Failed to parse schema: {error}")]
    ConfigParseError { error: String },
}

impl GraphSchemaError {
    /// Attach the schema source (file name, inline document, ...) to read/parse errors.
    pub fn config_error_with_context(error: impl Into<String>, context: impl Into<String>) -> Self {
        GraphSchemaError::ConfigParseError {
            error: format!("{}\n  Context: {}", error.into(), context.into()),
        }
    }
}
