//! Mutation statements: create, update, merge and delete.
//!
//! Every written value is hoisted under `data_<path>` and every key value
//! under `where_<key>`. Relationship inputs either create related nodes
//! (a plain object or list of objects, create only) or use the
//! `{create, connect, disconnect}` form on the mutated node itself.
//!
//! ```text
//! CREATE (`person`:`Person` {name: $data_name})
//! CREATE (`person`)-[:`ACTED_IN`]->(`person_movies_0`:`Movie` {title: $data_movies_0_title})
//! RETURN `person` {.name} AS `CreatePerson`
//! ```

use serde_json::{Map, Value};

use crate::graph_catalog::{FieldKind, FieldMetadata, RelationMeta, TypeMetadata};
use crate::query_context::selection::{DATA_ARG, WHERE_ARG};
use crate::query_context::OperationKind;
use crate::query_planner::errors::TranslationError;
use crate::query_planner::parameters::{normalize_scalar, ParameterMap};
use crate::query_planner::traversal::{RootBinding, TraversalPlanner};
use crate::utils::alias_naming::{child_alias, indexed_alias, root_alias, ParamPath};

use super::common::{label_list, node_pattern, property_key, quote_identifier, relation_arrow};
use super::statement_builder::CypherBuilder;

const NESTED_CREATE: &str = "create";
const NESTED_CONNECT: &str = "connect";
const NESTED_DISCONNECT: &str = "disconnect";
const NESTED_OPERATIONS: &[&str] = &[NESTED_CREATE, NESTED_CONNECT, NESTED_DISCONNECT];

/// Suffix of the alias that keeps a deleted node reachable until it is removed
const DELETED_SUFFIX: &str = "deleted";

/// One `data` object split into property entries and relationship inputs
struct DataInput<'a> {
    properties: Vec<String>,
    relations: Vec<(&'a FieldMetadata, &'a Value)>,
}

impl CypherBuilder<'_> {
    pub(crate) fn build_mutation(
        &self,
        type_meta: &TypeMetadata,
        params: &mut ParameterMap,
    ) -> Result<String, TranslationError> {
        let node = &self.ctx.field;
        let operation = self.ctx.operation;
        let alias = root_alias(&type_meta.name);
        self.aliases.borrow_mut().reserve(&alias);
        let data_path = ParamPath::root().child(DATA_ARG);

        for name in node.arguments.keys() {
            let allowed = match operation {
                OperationKind::Create => name == DATA_ARG,
                OperationKind::Delete => name == WHERE_ARG,
                _ => name == DATA_ARG || name == WHERE_ARG,
            };
            if !allowed {
                return Err(TranslationError::InvalidInputField(name.clone()));
            }
        }

        let mut clauses = Vec::new();
        match operation {
            OperationKind::Create => {
                let data = data_object(node.argument(DATA_ARG))?;
                let input = split_data(data, type_meta, &data_path, &[], params)?;
                clauses.push(format!(
                    "CREATE {}",
                    node_with_properties(&alias, type_meta.labels(), &input.properties)
                ));
                self.write_relations(&alias, &input.relations, &data_path, true, params, &mut clauses)?;
            }
            OperationKind::Update | OperationKind::Merge => {
                let (keys, key_map) = unique_key_map(
                    node.argument(WHERE_ARG),
                    type_meta,
                    &ParamPath::root().child(WHERE_ARG),
                    params,
                )?;
                let data = data_object(node.argument(DATA_ARG))?;
                let skip = if operation == OperationKind::Merge {
                    keys
                } else {
                    Vec::new()
                };
                let input = split_data(data, type_meta, &data_path, &skip, params)?;

                let keyword = if operation == OperationKind::Merge {
                    "MERGE"
                } else {
                    "MATCH"
                };
                clauses.push(format!(
                    "{} ({}{} {})",
                    keyword,
                    quote_identifier(&alias),
                    label_list(type_meta.labels()),
                    key_map
                ));
                if !input.properties.is_empty() {
                    clauses.push(format!(
                        "SET {} += {{{}}}",
                        quote_identifier(&alias),
                        input.properties.join(", ")
                    ));
                }
                self.write_relations(&alias, &input.relations, &data_path, true, params, &mut clauses)?;
            }
            OperationKind::Delete => {
                let (_, key_map) = unique_key_map(
                    node.argument(WHERE_ARG),
                    type_meta,
                    &ParamPath::root().child(WHERE_ARG),
                    params,
                )?;
                let deleted = self.claim_alias(&child_alias(&alias, DELETED_SUFFIX));
                let projection = self.mutation_projection(type_meta, &alias, params)?;
                clauses.push(format!(
                    "MATCH ({}{} {})",
                    quote_identifier(&alias),
                    label_list(type_meta.labels()),
                    key_map
                ));
                clauses.push(format!(
                    "WITH {} AS {}, {} AS {}",
                    quote_identifier(&alias),
                    quote_identifier(&deleted),
                    projection,
                    quote_identifier(&alias)
                ));
                clauses.push(format!("DETACH DELETE {}", quote_identifier(&deleted)));
                clauses.push(format!(
                    "RETURN {} AS {}",
                    quote_identifier(&alias),
                    quote_identifier(node.response_key())
                ));
                return Ok(clauses.join(" "));
            }
            OperationKind::Query | OperationKind::Count => {
                return Err(TranslationError::SchemaInconsistency(format!(
                    "`{}` is not a mutation",
                    node.name
                )));
            }
        }

        let projection = self.mutation_projection(type_meta, &alias, params)?;
        clauses.push(format!(
            "RETURN {} AS {}",
            projection,
            quote_identifier(node.response_key())
        ));
        Ok(clauses.join(" "))
    }

    /// The mutated node projected with the mutation field's selection
    fn mutation_projection(
        &self,
        type_meta: &TypeMetadata,
        alias: &str,
        params: &mut ParameterMap,
    ) -> Result<String, TranslationError> {
        let selections = &self.ctx.field.selections;
        let plan = TraversalPlanner::new(self.schema).plan(
            RootBinding {
                alias: alias.to_string(),
                type_name: type_meta.name.clone(),
                incoming: None,
            },
            selections,
            None,
            None,
            &mut self.aliases.borrow_mut(),
        )?;
        self.build_projection(selections, type_meta, alias, &plan, params)
    }

    /// Relationship inputs of the node bound to `alias`
    fn write_relations(
        &self,
        alias: &str,
        relations: &[(&FieldMetadata, &Value)],
        data_path: &ParamPath,
        top_level: bool,
        params: &mut ParameterMap,
        clauses: &mut Vec<String>,
    ) -> Result<(), TranslationError> {
        for (field, value) in relations {
            let relation = field
                .relation()
                .ok_or_else(|| TranslationError::InvalidInputField(field.name.clone()))?;
            let target = self.schema.get_type_or_err(&relation.target_type)?;
            let field_path = data_path.child(field.name.as_str());

            if let Some(operations) = nested_operations(value, target) {
                if !top_level {
                    return Err(TranslationError::InvalidInputField(field.name.clone()));
                }
                self.write_nested_operations(alias, field, relation, target, operations, &field_path, params, clauses)?;
                continue;
            }

            if top_level && self.ctx.operation != OperationKind::Create {
                return Err(TranslationError::InvalidInputField(field.name.clone()));
            }
            match value {
                Value::Array(_) => {
                    for (i, item) in related_items(value, field)?.into_iter().enumerate() {
                        self.create_related(
                            alias,
                            &self.claim_alias(&indexed_alias(alias, &field.name, i)),
                            relation,
                            target,
                            item,
                            &data_path.indexed(&field.name, i),
                            params,
                            clauses,
                        )?;
                    }
                }
                Value::Object(item) => {
                    self.create_related(
                        alias,
                        &self.claim_alias(&child_alias(alias, &field.name)),
                        relation,
                        target,
                        item,
                        &field_path,
                        params,
                        clauses,
                    )?;
                }
                _ => return Err(TranslationError::InvalidInputField(field.name.clone())),
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn write_nested_operations(
        &self,
        alias: &str,
        field: &FieldMetadata,
        relation: &RelationMeta,
        target: &TypeMetadata,
        operations: &Map<String, Value>,
        field_path: &ParamPath,
        params: &mut ParameterMap,
        clauses: &mut Vec<String>,
    ) -> Result<(), TranslationError> {
        let base = child_alias(alias, &field.name);
        let parent = quote_identifier(alias);

        for (operation, entries) in operations {
            let items = related_items(entries, field)?;
            match operation.as_str() {
                NESTED_CREATE => {
                    for (i, item) in items.into_iter().enumerate() {
                        self.create_related(
                            alias,
                            &self.claim_alias(&indexed_alias(&base, NESTED_CREATE, i)),
                            relation,
                            target,
                            item,
                            &field_path.indexed(NESTED_CREATE, i),
                            params,
                            clauses,
                        )?;
                    }
                }
                NESTED_CONNECT => {
                    for (i, item) in items.into_iter().enumerate() {
                        let connected = self.claim_alias(&indexed_alias(&base, NESTED_CONNECT, i));
                        let (_, key_map) = unique_key_map(
                            Some(&Value::Object(item.clone())),
                            target,
                            &field_path.indexed(NESTED_CONNECT, i),
                            params,
                        )?;
                        clauses.push(format!(
                            "CALL {{ WITH {} MATCH ({}{} {}) MERGE {}{}{} }}",
                            parent,
                            quote_identifier(&connected),
                            label_list(target.labels()),
                            key_map,
                            node_pattern(alias, std::iter::empty()),
                            relation_arrow(relation, None),
                            node_pattern(&connected, std::iter::empty())
                        ));
                    }
                }
                NESTED_DISCONNECT => {
                    if self.ctx.operation == OperationKind::Create {
                        return Err(TranslationError::InvalidInputField(NESTED_DISCONNECT.to_string()));
                    }
                    for (i, item) in items.into_iter().enumerate() {
                        let edge = self.claim_alias(&indexed_alias(&base, NESTED_DISCONNECT, i));
                        let (_, key_map) = unique_key_map(
                            Some(&Value::Object(item.clone())),
                            target,
                            &field_path.indexed(NESTED_DISCONNECT, i),
                            params,
                        )?;
                        clauses.push(format!(
                            "CALL {{ WITH {} MATCH {}{}({} {}) DELETE {} }}",
                            parent,
                            node_pattern(alias, std::iter::empty()),
                            relation_arrow(relation, Some(&edge)),
                            label_list(target.labels()),
                            key_map,
                            quote_identifier(&edge)
                        ));
                    }
                }
                other => return Err(TranslationError::InvalidInputField(other.to_string())),
            }
        }
        Ok(())
    }

    /// `CREATE (parent)-[:R]->(alias:U {…})`, then the new node's own
    /// relationship inputs
    #[allow(clippy::too_many_arguments)]
    fn create_related(
        &self,
        parent: &str,
        alias: &str,
        relation: &RelationMeta,
        target: &TypeMetadata,
        item: &Map<String, Value>,
        data_path: &ParamPath,
        params: &mut ParameterMap,
        clauses: &mut Vec<String>,
    ) -> Result<(), TranslationError> {
        let input = split_data(item, target, data_path, &[], params)?;
        clauses.push(format!(
            "CREATE {}{}{}",
            node_pattern(parent, std::iter::empty()),
            relation_arrow(relation, None),
            node_with_properties(alias, target.labels(), &input.properties)
        ));
        self.write_relations(alias, &input.relations, data_path, false, params, clauses)
    }
}

fn data_object(value: Option<&Value>) -> Result<&Map<String, Value>, TranslationError> {
    value
        .and_then(Value::as_object)
        .ok_or_else(|| TranslationError::InvalidInputField(DATA_ARG.to_string()))
}

/// Hoist every property of `data`, keeping relationship inputs aside.
/// Keys listed in `skip` are left out.
fn split_data<'a>(
    data: &'a Map<String, Value>,
    type_meta: &'a TypeMetadata,
    data_path: &ParamPath,
    skip: &[String],
    params: &mut ParameterMap,
) -> Result<DataInput<'a>, TranslationError> {
    let mut input = DataInput {
        properties: Vec::new(),
        relations: Vec::new(),
    };

    for (key, value) in data {
        if skip.contains(key) {
            continue;
        }
        let field = type_meta
            .field(key)
            .ok_or_else(|| TranslationError::InvalidInputField(key.clone()))?;
        let path = data_path.child(key.as_str());

        let written = match &field.kind {
            FieldKind::Scalar(scalar) => params
                .insert(path.name(), normalize_scalar(value, *scalar))?
                .to_string(),
            FieldKind::Structured(kind) => {
                let param = params.insert(path.name(), value.clone())?;
                if field.list {
                    format!("[value IN {} | {}(value)]", param, kind.constructor())
                } else {
                    format!("{}({})", kind.constructor(), param)
                }
            }
            FieldKind::Relationship(_) => {
                if !value.is_null() {
                    input.relations.push((field, value));
                }
                continue;
            }
            FieldKind::Computed { .. } => {
                return Err(TranslationError::InvalidInputField(key.clone()));
            }
        };
        log::trace!("writing `{}.{}`", type_meta.name, key);
        input
            .properties
            .push(format!("{}: {}", property_key(key), written));
    }

    Ok(input)
}

/// `{k: $p, …}` for a key object that must identify a single node.
///
/// Every key must be a unique or id field of `type_meta` with a plain value.
fn unique_key_map(
    value: Option<&Value>,
    type_meta: &TypeMetadata,
    path: &ParamPath,
    params: &mut ParameterMap,
) -> Result<(Vec<String>, String), TranslationError> {
    let ambiguous = |keys: String| TranslationError::AmbiguousMatch {
        type_name: type_meta.name.clone(),
        keys,
    };
    let object = match value {
        Some(Value::Object(object)) if !object.is_empty() => object,
        _ => return Err(ambiguous(String::new())),
    };
    let keys: Vec<String> = object.keys().cloned().collect();

    let mut validated = Vec::with_capacity(object.len());
    for (key, entry) in object {
        let field = type_meta
            .field(key)
            .ok_or_else(|| TranslationError::InvalidFilterField(key.clone()))?;
        let plain = !(entry.is_object() || entry.is_array() || entry.is_null());
        match field.scalar_type() {
            Some(scalar) if plain && type_meta.is_unique_key(key) => {
                validated.push((key, normalize_scalar(entry, scalar)))
            }
            _ => return Err(ambiguous(keys.join(", "))),
        }
    }

    let mut entries = Vec::with_capacity(validated.len());
    for (key, entry) in validated {
        let param = params.insert(path.child(key.as_str()).name(), entry)?;
        entries.push(format!("{}: {}", property_key(key), param));
    }
    Ok((keys, format!("{{{}}}", entries.join(", "))))
}

/// The `{create, connect, disconnect}` form: every key is an operation and
/// none of them is a field of the related type
fn nested_operations<'v>(value: &'v Value, target: &TypeMetadata) -> Option<&'v Map<String, Value>> {
    let object = value.as_object()?;
    let is_operations = !object.is_empty()
        && object
            .keys()
            .all(|k| NESTED_OPERATIONS.contains(&k.as_str()) && target.field(k).is_none());
    is_operations.then_some(object)
}

/// Objects of a relationship input; lists only on to-many fields
fn related_items<'v>(
    value: &'v Value,
    field: &FieldMetadata,
) -> Result<Vec<&'v Map<String, Value>>, TranslationError> {
    let invalid = || TranslationError::InvalidInputField(field.name.clone());
    match value {
        Value::Object(item) => Ok(vec![item]),
        Value::Array(items) if field.list => items
            .iter()
            .map(|item| item.as_object().ok_or_else(invalid))
            .collect(),
        _ => Err(invalid()),
    }
}

fn node_with_properties<'l>(
    alias: &str,
    labels: impl IntoIterator<Item = &'l str>,
    properties: &[String],
) -> String {
    if properties.is_empty() {
        node_pattern(alias, labels)
    } else {
        format!(
            "({}{} {{{}}})",
            quote_identifier(alias),
            label_list(labels),
            properties.join(", ")
        )
    }
}
