pub mod config;
pub mod errors;
pub mod graph_schema;
pub mod schema_types;

#[cfg(test)]
pub mod testing;

// Re-export commonly used types
pub use config::GraphSchemaConfig;
pub use errors::GraphSchemaError;
pub use graph_schema::{
    Direction, FieldKind, FieldMetadata, GraphSchema, OperationScopes, RelationMeta,
    SchemaOperation, TypeMetadata,
};
pub use schema_types::{ScalarType, StructuredKind, TypeRef};
