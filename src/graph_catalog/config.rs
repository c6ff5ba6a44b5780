use super::errors::GraphSchemaError;
use super::graph_schema::{
    Direction, FieldKind, FieldMetadata, GraphSchema, OperationScopes, RelationMeta, TypeMetadata,
};
use super::schema_types::TypeRef;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Schema metadata loading.
///
/// The catalog is described in YAML with the following structure:
///
/// ```yaml
/// name: movies                 # Optional schema name
/// types:
///   - name: Person
///     additional_labels: [Actor]
///     primary_key: userId      # Optional, otherwise resolved from markers
///     auth:
///       read: ["read:user"]
///     fields:
///       - name: userId
///         type: ID
///         id: true
///       - name: name
///         type: String
///         search: personSearch
///       - name: born
///         type: Date
///       - name: movies
///         type: Movie
///         list: true
///         relation: { name: ACTED_IN, direction: OUT }
///       - name: coActors
///         type: Person
///         list: true
///         cypher: "MATCH (this)-[:ACTED_IN]->()<-[:ACTED_IN]-(o) RETURN o LIMIT $limit"
///         arguments: [limit]
/// ```
///
/// # Usage
///
/// ```ignore
/// use cyphergen::graph_catalog::GraphSchemaConfig;
///
/// let schema = GraphSchemaConfig::from_yaml_file("schema.yaml")?.to_graph_schema()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSchemaConfig {
    /// Optional schema name (used in log output only)
    #[serde(default)]
    pub name: Option<String>,
    pub types: Vec<TypeDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub name: String,
    #[serde(default)]
    pub additional_labels: Vec<String>,
    #[serde(default)]
    pub primary_key: Option<String>,
    #[serde(default)]
    pub auth: OperationScopes,
    pub fields: Vec<FieldDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    /// GraphQL type name, without list/non-null wrappers
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub list: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub id: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub relation: Option<RelationDefinition>,
    /// Custom statement template
    #[serde(default)]
    pub cypher: Option<String>,
    #[serde(default)]
    pub arguments: Vec<String>,
}

/// Raw relation declaration. Both members are optional here so that a
/// missing direction surfaces as a schema error instead of a YAML error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationDefinition {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
}

impl GraphSchemaConfig {
    /// Load graph schema configuration from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, GraphSchemaError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| GraphSchemaError::ConfigReadError {
            error: format!("{}: {}", path.display(), e),
        })?;

        Self::from_yaml_str(&contents).map_err(|e| match e {
            GraphSchemaError::ConfigParseError { error } => {
                GraphSchemaError::config_error_with_context(error, path.display().to_string())
            }
            other => other,
        })
    }

    /// Parse graph schema configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, GraphSchemaError> {
        serde_yaml::from_str(yaml).map_err(|e| GraphSchemaError::ConfigParseError {
            error: e.to_string(),
        })
    }

    /// Validate every declaration and build the immutable catalog
    pub fn to_graph_schema(&self) -> Result<GraphSchema, GraphSchemaError> {
        let mut types = Vec::with_capacity(self.types.len());
        for def in &self.types {
            let fields = def
                .fields
                .iter()
                .map(|f| build_field(&def.name, f))
                .collect::<Result<Vec<_>, _>>()?;
            let mut t = TypeMetadata::new(def.name.clone(), fields, def.primary_key.clone())?;
            t.additional_labels = def.additional_labels.clone();
            t.auth = def.auth.clone();
            types.push(t);
        }

        log::info!(
            "Loaded schema '{}' ({} types)",
            self.name.as_deref().unwrap_or("default"),
            types.len()
        );
        GraphSchema::build(types)
    }
}

fn build_field(type_name: &str, def: &FieldDefinition) -> Result<FieldMetadata, GraphSchemaError> {
    let type_ref = TypeRef::classify(&def.type_name);
    let kind = match (&def.relation, &def.cypher) {
        (Some(_), Some(_)) => {
            return Err(GraphSchemaError::RelationshipAndComputed {
                type_name: type_name.to_string(),
                field: def.name.clone(),
            })
        }
        (None, Some(statement)) => FieldKind::Computed {
            statement: statement.clone(),
            returns: type_ref,
        },
        (Some(relation), None) => {
            let target_type = match type_ref {
                TypeRef::Object(target) => target,
                _ => {
                    return Err(GraphSchemaError::RelationOnScalar {
                        type_name: type_name.to_string(),
                        field: def.name.clone(),
                        scalar: def.type_name.clone(),
                    })
                }
            };
            let name = relation
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .ok_or_else(|| GraphSchemaError::MissingRelationName {
                    type_name: type_name.to_string(),
                    field: def.name.clone(),
                })?;
            let raw_direction =
                relation
                    .direction
                    .as_deref()
                    .ok_or_else(|| GraphSchemaError::MissingDirection {
                        type_name: type_name.to_string(),
                        field: def.name.clone(),
                    })?;
            let direction = Direction::parse(raw_direction).ok_or_else(|| {
                GraphSchemaError::InvalidDirection {
                    type_name: type_name.to_string(),
                    field: def.name.clone(),
                    direction: raw_direction.to_string(),
                }
            })?;
            FieldKind::Relationship(RelationMeta {
                name,
                direction,
                target_type,
            })
        }
        (None, None) => match type_ref {
            TypeRef::Scalar(scalar) => FieldKind::Scalar(scalar),
            TypeRef::Structured(kind) => FieldKind::Structured(kind),
            TypeRef::Object(target) => {
                return Err(GraphSchemaError::UnboundObjectField {
                    type_name: type_name.to_string(),
                    field: def.name.clone(),
                    target,
                })
            }
        },
    };

    Ok(FieldMetadata {
        name: def.name.clone(),
        kind,
        list: def.list,
        required: def.required,
        id: def.id,
        unique: def.unique,
        search_index: def.search.clone(),
        scopes: def.scopes.clone(),
        arguments: def.arguments.clone(),
    })
}
