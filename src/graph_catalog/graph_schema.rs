use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::errors::GraphSchemaError;
use super::schema_types::{ScalarType, StructuredKind, TypeRef};

/// Edge direction as seen from the type that declares the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "OUT")]
    Outbound,
    #[serde(rename = "IN")]
    Inbound,
}

impl Direction {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "OUT" | "OUTBOUND" => Some(Direction::Outbound),
            "IN" | "INBOUND" => Some(Direction::Inbound),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Outbound => write!(f, "OUT"),
            Direction::Inbound => write!(f, "IN"),
        }
    }
}

/// Graph edge bound to a schema field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationMeta {
    pub name: String,
    pub direction: Direction,
    pub target_type: String,
}

/// Declared value kind of a field. A field is exactly one of these, so a
/// relationship can never also carry a custom statement.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Scalar(ScalarType),
    Structured(StructuredKind),
    Relationship(RelationMeta),
    /// Value produced by an embedded custom statement. `this` is bound to the
    /// owning node when the statement runs.
    Computed { statement: String, returns: TypeRef },
}

/// Operations that can carry type-level auth scope requirements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaOperation {
    Read,
    Create,
    Update,
    Delete,
    Merge,
}

impl fmt::Display for SchemaOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchemaOperation::Read => "read",
            SchemaOperation::Create => "create",
            SchemaOperation::Update => "update",
            SchemaOperation::Delete => "delete",
            SchemaOperation::Merge => "merge",
        };
        write!(f, "{}", name)
    }
}

/// Per-operation scope requirements. An empty list means unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationScopes {
    #[serde(default)]
    pub read: Vec<String>,
    #[serde(default)]
    pub create: Vec<String>,
    #[serde(default)]
    pub update: Vec<String>,
    #[serde(default)]
    pub delete: Vec<String>,
    #[serde(default)]
    pub merge: Vec<String>,
}

impl OperationScopes {
    pub fn for_operation(&self, operation: SchemaOperation) -> &[String] {
        match operation {
            SchemaOperation::Read => &self.read,
            SchemaOperation::Create => &self.create,
            SchemaOperation::Update => &self.update,
            SchemaOperation::Delete => &self.delete,
            SchemaOperation::Merge => &self.merge,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldMetadata {
    pub name: String,
    pub kind: FieldKind,
    /// List-typed field (to-many for relationships)
    pub list: bool,
    /// Non-null field
    pub required: bool,
    pub id: bool,
    pub unique: bool,
    /// Fulltext index this field participates in
    pub search_index: Option<String>,
    /// Field-level auth scopes
    pub scopes: Vec<String>,
    /// Declared argument names (only meaningful for computed fields)
    pub arguments: Vec<String>,
}

impl FieldMetadata {
    fn with_kind(name: impl Into<String>, kind: FieldKind) -> Self {
        FieldMetadata {
            name: name.into(),
            kind,
            list: false,
            required: false,
            id: false,
            unique: false,
            search_index: None,
            scopes: Vec::new(),
            arguments: Vec::new(),
        }
    }

    pub fn scalar(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self::with_kind(name, FieldKind::Scalar(scalar))
    }

    pub fn structured(name: impl Into<String>, kind: StructuredKind) -> Self {
        Self::with_kind(name, FieldKind::Structured(kind))
    }

    pub fn relationship(
        name: impl Into<String>,
        relation: impl Into<String>,
        direction: Direction,
        target_type: impl Into<String>,
    ) -> Self {
        Self::with_kind(
            name,
            FieldKind::Relationship(RelationMeta {
                name: relation.into(),
                direction,
                target_type: target_type.into(),
            }),
        )
    }

    pub fn computed(name: impl Into<String>, statement: impl Into<String>, returns: TypeRef) -> Self {
        Self::with_kind(
            name,
            FieldKind::Computed {
                statement: statement.into(),
                returns,
            },
        )
    }

    pub fn list(mut self) -> Self {
        self.list = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn id(mut self) -> Self {
        self.id = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn search(mut self, index: impl Into<String>) -> Self {
        self.search_index = Some(index.into());
        self
    }

    pub fn scopes(mut self, scopes: &[&str]) -> Self {
        self.scopes = scopes.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn arguments(mut self, arguments: &[&str]) -> Self {
        self.arguments = arguments.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn relation(&self) -> Option<&RelationMeta> {
        match &self.kind {
            FieldKind::Relationship(relation) => Some(relation),
            _ => None,
        }
    }

    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self.kind {
            FieldKind::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn structured_kind(&self) -> Option<StructuredKind> {
        match self.kind {
            FieldKind::Structured(kind) => Some(kind),
            _ => None,
        }
    }

    /// Stored property (scalar or structured scalar)
    pub fn is_property(&self) -> bool {
        matches!(self.kind, FieldKind::Scalar(_) | FieldKind::Structured(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeMetadata {
    pub name: String,
    pub additional_labels: Vec<String>,
    pub auth: OperationScopes,
    fields: Vec<FieldMetadata>,
    field_index: HashMap<String, usize>,
    primary_key: Option<String>,
}

impl TypeMetadata {
    /// Build a type, resolving its primary key.
    ///
    /// Primary key resolution order: `explicit_key`, first `id` field, first
    /// `ID`-typed scalar, none.
    pub fn new(
        name: impl Into<String>,
        fields: Vec<FieldMetadata>,
        explicit_key: Option<String>,
    ) -> Result<Self, GraphSchemaError> {
        let name = name.into();
        let mut field_index = HashMap::new();
        for (i, field) in fields.iter().enumerate() {
            if field_index.insert(field.name.clone(), i).is_some() {
                return Err(GraphSchemaError::DuplicateField {
                    type_name: name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        let primary_key = match explicit_key {
            Some(key) => {
                let is_scalar = field_index
                    .get(&key)
                    .map(|i| fields[*i].scalar_type().is_some())
                    .unwrap_or(false);
                if !is_scalar {
                    return Err(GraphSchemaError::InvalidPrimaryKey {
                        type_name: name,
                        field: key,
                    });
                }
                Some(key)
            }
            None => fields
                .iter()
                .find(|f| f.id && f.scalar_type().is_some())
                .or_else(|| {
                    fields
                        .iter()
                        .find(|f| f.scalar_type() == Some(ScalarType::Id))
                })
                .map(|f| f.name.clone()),
        };

        Ok(TypeMetadata {
            name,
            additional_labels: Vec::new(),
            auth: OperationScopes::default(),
            fields,
            field_index,
            primary_key,
        })
    }

    pub fn with_labels(mut self, labels: &[&str]) -> Self {
        self.additional_labels = labels.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_auth(mut self, auth: OperationScopes) -> Self {
        self.auth = auth;
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldMetadata> {
        self.field_index.get(name).map(|i| &self.fields[*i])
    }

    pub fn fields(&self) -> &[FieldMetadata] {
        &self.fields
    }

    pub fn primary_key(&self) -> Option<&FieldMetadata> {
        self.primary_key.as_deref().and_then(|key| self.field(key))
    }

    /// Whether `name` alone identifies at most one node of this type
    pub fn is_unique_key(&self, name: &str) -> bool {
        match self.field(name) {
            Some(field) if field.scalar_type().is_some() => {
                field.id || field.unique || self.primary_key.as_deref() == Some(name)
            }
            _ => false,
        }
    }

    /// Primary label first, then additional labels in declared order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.additional_labels.iter().map(|l| l.as_str()))
    }

    /// First fulltext index declared on any field
    pub fn search_index(&self) -> Option<&str> {
        self.fields.iter().find_map(|f| f.search_index.as_deref())
    }
}

/// Immutable catalog of every schema type, keyed by name.
///
/// Built once and shared by reference with every translation; there is no
/// way to mutate it after `GraphSchema::build` returns.
#[derive(Debug, Clone)]
pub struct GraphSchema {
    types: Vec<TypeMetadata>,
    type_index: HashMap<String, usize>,
}

impl GraphSchema {
    pub fn build(types: Vec<TypeMetadata>) -> Result<Self, GraphSchemaError> {
        let mut type_index = HashMap::new();
        for (i, t) in types.iter().enumerate() {
            if type_index.insert(t.name.clone(), i).is_some() {
                return Err(GraphSchemaError::DuplicateType {
                    type_name: t.name.clone(),
                });
            }
        }

        for t in &types {
            for field in t.fields() {
                let target = match &field.kind {
                    FieldKind::Relationship(relation) => Some(&relation.target_type),
                    FieldKind::Computed {
                        returns: TypeRef::Object(target),
                        ..
                    } => Some(target),
                    _ => None,
                };
                if let Some(target) = target {
                    if !type_index.contains_key(target) {
                        return Err(GraphSchemaError::UnknownRelationTarget {
                            type_name: t.name.clone(),
                            field: field.name.clone(),
                            target: target.clone(),
                        });
                    }
                }
            }
        }

        log::debug!("graph schema built with {} types", types.len());
        Ok(GraphSchema { types, type_index })
    }

    pub fn get_type(&self, name: &str) -> Option<&TypeMetadata> {
        self.type_index.get(name).map(|i| &self.types[*i])
    }

    pub fn get_type_or_err(&self, name: &str) -> Result<&TypeMetadata, GraphSchemaError> {
        self.get_type(name).ok_or_else(|| GraphSchemaError::UnknownType {
            type_name: name.to_string(),
        })
    }

    pub fn types(&self) -> &[TypeMetadata] {
        &self.types
    }
}
