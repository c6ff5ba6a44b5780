//! Resolution Context - per-invocation input to the translator
//!
//! One `ResolutionContext` describes one operation field to translate: what
//! kind of operation it is, the requested selection tree with its arguments,
//! ambient variables supplied by the caller and the already-verified auth
//! scopes. It is created fresh per request and only read during translation.

pub mod selection;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::graph_catalog::SchemaOperation;

pub use selection::SelectionNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Query,
    Count,
    Create,
    Update,
    Delete,
    Merge,
}

impl OperationKind {
    pub fn schema_operation(&self) -> SchemaOperation {
        match self {
            OperationKind::Query | OperationKind::Count => SchemaOperation::Read,
            OperationKind::Create => SchemaOperation::Create,
            OperationKind::Update => SchemaOperation::Update,
            OperationKind::Delete => SchemaOperation::Delete,
            OperationKind::Merge => SchemaOperation::Merge,
        }
    }
}

/// Scopes granted to the caller. Token verification happens upstream; the
/// translator only asks whether a requirement is met.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    #[serde(default)]
    pub granted_scopes: BTreeSet<String>,
}

impl AuthContext {
    pub fn with_scopes(scopes: &[&str]) -> Self {
        AuthContext {
            granted_scopes: scopes.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// A requirement is met when it is empty or any listed scope is granted
    pub fn permits(&self, required: &[String]) -> bool {
        required.is_empty() || required.iter().any(|s| self.granted_scopes.contains(s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionContext {
    pub operation: OperationKind,
    pub field: SelectionNode,
    /// Return type of the operation field. Ignored for counts, whose target
    /// type is recovered from the field name.
    #[serde(default)]
    pub type_name: Option<String>,
    /// Ambient variables, exposed to custom statements as `$cypherParams`
    #[serde(default)]
    pub cypher_params: Map<String, Value>,
    #[serde(default)]
    pub auth: AuthContext,
}

impl ResolutionContext {
    pub fn new(operation: OperationKind, field: SelectionNode) -> Self {
        ResolutionContext {
            operation,
            field,
            type_name: None,
            cypher_params: Map::new(),
            auth: AuthContext::default(),
        }
    }

    pub fn query(type_name: impl Into<String>, field: SelectionNode) -> Self {
        Self::new(OperationKind::Query, field).with_type(type_name)
    }

    pub fn count(field: SelectionNode) -> Self {
        Self::new(OperationKind::Count, field)
    }

    pub fn mutation(
        operation: OperationKind,
        type_name: impl Into<String>,
        field: SelectionNode,
    ) -> Self {
        Self::new(operation, field).with_type(type_name)
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_cypher_param(mut self, name: impl Into<String>, value: Value) -> Self {
        self.cypher_params.insert(name.into(), value);
        self
    }

    pub fn with_auth(mut self, auth: AuthContext) -> Self {
        self.auth = auth;
        self
    }
}
