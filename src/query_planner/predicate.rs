//! Predicate builder.
//!
//! Lowers a filter argument (and the plain equality arguments of a read
//! field) into a [`PredicateNode`] tree. Every user-supplied value is hoisted
//! into the [`ParameterMap`] on the way; the tree only carries parameter
//! references.
//!
//! Comparisons remember the relationship path of the node they read, so the
//! renderer can resolve the alias that the traversal planner assigned to
//! that path. A path segment is the field name for a plain `some` hop. A hop
//! that is quantified otherwise, or sits under `NOT`, is evaluated against
//! the whole relationship set, so its segment also carries the quantifier
//! (`movies_none`) and never names a step bound in the outer `MATCH`.

use serde_json::{Map, Value};

use crate::graph_catalog::{
    FieldKind, FieldMetadata, GraphSchema, RelationMeta, ScalarType, StructuredKind,
    TypeMetadata,
};
use crate::graph_catalog::schema_types::FORMATTED_FIELD;
use crate::query_context::selection::{SelectionNode, FILTER_ARG, RESERVED_READ_ARGS};
use crate::utils::alias_naming::ParamPath;

use super::errors::TranslationError;
use super::operators::{
    parse_filter_key, CombinatorKind, ComparisonOp, FilterKey, RelationQuantifier,
};
use super::parameters::{normalize_scalar, ParamRef, ParameterMap};

pub type PredicateResult<T> = Result<T, TranslationError>;

/// Argument addressing the database-internal node id
pub const NODE_ID_ARG: &str = "_id";

#[derive(Debug, Clone, PartialEq)]
pub enum PredicateNode {
    Comparison(Comparison),
    Combinator {
        kind: CombinatorKind,
        children: Vec<PredicateNode>,
    },
    RelationshipExists(RelationshipFilter),
}

/// What a comparison reads from its node
#[derive(Debug, Clone, PartialEq)]
pub enum CompareTarget {
    Property {
        name: String,
        /// Constructor applied to the parameter for structured values
        structured: Option<StructuredKind>,
    },
    /// Database-internal node id (`ID(alias)`)
    NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Param(ParamRef),
    /// `null` filter value: `IS NULL` / `IS NOT NULL`
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Relationship hops from the predicate's root node to the node read
    pub path: Vec<String>,
    pub target: CompareTarget,
    pub op: ComparisonOp,
    pub operand: Operand,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipFilter {
    /// Relationship hops from the predicate's root, including this one
    pub path: Vec<String>,
    /// Schema field of this hop
    pub field: String,
    pub relation: RelationMeta,
    pub quantifier: RelationQuantifier,
    pub predicate: Box<PredicateNode>,
}

impl PredicateNode {
    pub fn and(children: Vec<PredicateNode>) -> Self {
        PredicateNode::Combinator {
            kind: CombinatorKind::And,
            children,
        }
    }

    /// Empty `AND`: always true
    pub fn is_vacuous(&self) -> bool {
        matches!(
            self,
            PredicateNode::Combinator { kind: CombinatorKind::And, children } if children.is_empty()
        )
    }

    /// Visit every relationship filter, outermost first
    pub fn walk_relationships(&self, visit: &mut dyn FnMut(&RelationshipFilter)) {
        match self {
            PredicateNode::Comparison(_) => {}
            PredicateNode::Combinator { children, .. } => {
                for child in children {
                    child.walk_relationships(visit);
                }
            }
            PredicateNode::RelationshipExists(rel) => {
                visit(rel);
                rel.predicate.walk_relationships(visit);
            }
        }
    }
}

pub struct PredicateBuilder<'a> {
    schema: &'a GraphSchema,
    params: &'a mut ParameterMap,
    /// `NOT` combinators enclosing the entry being built
    negations: usize,
}

impl<'a> PredicateBuilder<'a> {
    pub fn new(schema: &'a GraphSchema, params: &'a mut ParameterMap) -> Self {
        PredicateBuilder {
            schema,
            params,
            negations: 0,
        }
    }

    /// Predicate for a read field: its equality arguments followed by the
    /// children of its `filter` argument, joined by `AND`.
    ///
    /// Unknown arguments fail when `strict` and are skipped otherwise.
    pub fn build_for_field(
        &mut self,
        node: &SelectionNode,
        type_meta: &TypeMetadata,
        param_path: &ParamPath,
        strict: bool,
    ) -> PredicateResult<PredicateNode> {
        let mut children = Vec::new();

        for (name, value) in &node.arguments {
            if RESERVED_READ_ARGS.contains(&name.as_str()) || value.is_null() {
                continue;
            }
            match self.build_argument(name, value, type_meta, param_path) {
                Ok(predicate) => children.push(predicate),
                Err(TranslationError::InvalidFilterField(key)) if !strict => {
                    log::warn!("ignoring argument `{}` on `{}`", key, node.name);
                }
                Err(e) => return Err(e),
            }
        }

        if let Some(filter) = node.filter() {
            let filter_path = param_path.child(FILTER_ARG);
            match self.build_filter(filter, type_meta, &filter_path)? {
                PredicateNode::Combinator {
                    kind: CombinatorKind::And,
                    children: filter_children,
                } => children.extend(filter_children),
                other => children.push(other),
            }
        }

        let predicate = PredicateNode::and(children);
        log::debug!("built predicate for `{}`: {:?}", node.response_key(), predicate);
        Ok(predicate)
    }

    /// Lower one filter object. Keys become the children of an implicit `AND`.
    pub fn build_filter(
        &mut self,
        filter: &Value,
        type_meta: &TypeMetadata,
        param_path: &ParamPath,
    ) -> PredicateResult<PredicateNode> {
        self.build_object(filter, type_meta, &[], param_path, || FILTER_ARG.to_string())
    }

    fn build_argument(
        &mut self,
        name: &str,
        value: &Value,
        type_meta: &TypeMetadata,
        param_path: &ParamPath,
    ) -> PredicateResult<PredicateNode> {
        if name == NODE_ID_ARG {
            let value = normalize_scalar(value, ScalarType::Id);
            let param = self.params.insert(param_path.child(name).name(), value)?;
            return Ok(PredicateNode::Comparison(Comparison {
                path: Vec::new(),
                target: CompareTarget::NodeId,
                op: ComparisonOp::Eq,
                operand: Operand::Param(param),
            }));
        }

        let field = type_meta
            .field(name)
            .filter(|f| f.is_property())
            .ok_or_else(|| TranslationError::InvalidFilterField(name.to_string()))?;
        let op = if value.is_array() && !field.list {
            ComparisonOp::In
        } else {
            ComparisonOp::Eq
        };
        self.build_comparison(field, op, name, value, &[], &param_path.child(name))
    }

    fn build_object(
        &mut self,
        value: &Value,
        type_meta: &TypeMetadata,
        hops: &[String],
        param_path: &ParamPath,
        describe: impl Fn() -> String,
    ) -> PredicateResult<PredicateNode> {
        let object = value
            .as_object()
            .ok_or_else(|| TranslationError::InvalidFilterField(describe()))?;
        let mut children = Vec::with_capacity(object.len());
        for (key, entry) in object {
            children.push(self.build_entry(key, entry, type_meta, hops, param_path)?);
        }
        Ok(PredicateNode::and(children))
    }

    fn build_entry(
        &mut self,
        key: &str,
        value: &Value,
        type_meta: &TypeMetadata,
        hops: &[String],
        param_path: &ParamPath,
    ) -> PredicateResult<PredicateNode> {
        match parse_filter_key(key, type_meta)? {
            FilterKey::Combinator(kind @ (CombinatorKind::And | CombinatorKind::Or)) => {
                let items = value
                    .as_array()
                    .ok_or_else(|| TranslationError::InvalidFilterField(key.to_string()))?;
                let children = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        self.build_object(item, type_meta, hops, &param_path.indexed(key, i), || {
                            key.to_string()
                        })
                    })
                    .collect::<PredicateResult<Vec<_>>>()?;
                Ok(PredicateNode::Combinator { kind, children })
            }
            FilterKey::Combinator(CombinatorKind::Not) => {
                self.negations += 1;
                let inner = self.build_object(value, type_meta, hops, &param_path.child(key), || {
                    key.to_string()
                });
                self.negations -= 1;
                let inner = inner?;
                Ok(PredicateNode::Combinator {
                    kind: CombinatorKind::Not,
                    children: vec![inner],
                })
            }
            FilterKey::Comparison { field, op } => {
                self.build_comparison(field, op, key, value, hops, &param_path.child(key))
            }
            FilterKey::Relationship { field, quantifier } => {
                self.build_relationship(field, quantifier, key, value, hops, param_path)
            }
        }
    }

    fn build_relationship(
        &mut self,
        field: &FieldMetadata,
        quantifier: RelationQuantifier,
        key: &str,
        value: &Value,
        hops: &[String],
        param_path: &ParamPath,
    ) -> PredicateResult<PredicateNode> {
        let relation = field
            .relation()
            .ok_or_else(|| TranslationError::InvalidFilterField(key.to_string()))?;
        let target = self.schema.get_type_or_err(&relation.target_type)?;

        // `movies: null` asks for nodes without any related node
        let quantifier = if value.is_null() {
            match quantifier {
                RelationQuantifier::Some => RelationQuantifier::None,
                RelationQuantifier::None => RelationQuantifier::Some,
                _ => return Err(TranslationError::InvalidFilterField(key.to_string())),
            }
        } else {
            quantifier
        };

        let mut path = hops.to_vec();
        if quantifier == RelationQuantifier::Some && self.negations == 0 {
            path.push(field.name.clone());
        } else {
            path.push(format!("{}_{}", field.name, quantifier.suffix()));
        }

        let predicate = if value.is_null() {
            PredicateNode::and(Vec::new())
        } else {
            self.build_object(value, target, &path, &param_path.child(key), || {
                key.to_string()
            })?
        };

        Ok(PredicateNode::RelationshipExists(RelationshipFilter {
            path,
            field: field.name.clone(),
            relation: relation.clone(),
            quantifier,
            predicate: Box::new(predicate),
        }))
    }

    fn build_comparison(
        &mut self,
        field: &FieldMetadata,
        op: ComparisonOp,
        key: &str,
        value: &Value,
        hops: &[String],
        param_path: &ParamPath,
    ) -> PredicateResult<PredicateNode> {
        let target = CompareTarget::Property {
            name: field.name.clone(),
            structured: field.structured_kind(),
        };

        let operand = if value.is_null() {
            match op {
                ComparisonOp::Eq | ComparisonOp::Not => Operand::Null,
                _ => return Err(TranslationError::InvalidFilterField(key.to_string())),
            }
        } else {
            let hoisted = filter_value(field, op, value)
                .ok_or_else(|| TranslationError::InvalidFilterField(key.to_string()))?;
            Operand::Param(self.params.insert(param_path.name(), hoisted)?)
        };

        Ok(PredicateNode::Comparison(Comparison {
            path: hops.to_vec(),
            target,
            op,
            operand,
        }))
    }
}

/// Shape-check and normalise a filter value; `None` when the value's shape
/// does not fit the operator and field kind.
fn filter_value(field: &FieldMetadata, op: ComparisonOp, value: &Value) -> Option<Value> {
    let list_op = matches!(op, ComparisonOp::In | ComparisonOp::NotIn);
    if let ComparisonOp::Distance(_) = op {
        let object = value.as_object()?;
        let point_ok = object.get("point").map(Value::is_object).unwrap_or(false);
        let distance_ok = object.get("distance").map(Value::is_number).unwrap_or(false);
        return (point_ok && distance_ok).then(|| value.clone());
    }

    match (list_op, value) {
        (true, Value::Array(items)) => items
            .iter()
            .map(|item| single_value(field, item))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        (true, _) => None,
        (false, Value::Array(_)) if !field.list => None,
        (false, _) => single_value(field, value),
    }
}

fn single_value(field: &FieldMetadata, value: &Value) -> Option<Value> {
    match &field.kind {
        FieldKind::Scalar(scalar) => match value {
            Value::Object(_) => None,
            other => Some(normalize_scalar(other, *scalar)),
        },
        FieldKind::Structured(StructuredKind::Point) => value.is_object().then(|| value.clone()),
        FieldKind::Structured(kind) => structured_literal(*kind, value),
        FieldKind::Relationship(_) | FieldKind::Computed { .. } => None,
    }
}

/// Temporal input is either a constituent map or `{formatted: "..."}`; the
/// constructor accepts a string or a map.
fn structured_literal(kind: StructuredKind, value: &Value) -> Option<Value> {
    match value {
        Value::String(_) => Some(value.clone()),
        Value::Object(map) => {
            if let Some(formatted) = map.get(FORMATTED_FIELD) {
                return formatted.is_string().then(|| formatted.clone());
            }
            let constituents: Map<String, Value> = map
                .iter()
                .filter(|(k, v)| kind.constituents().contains(&k.as_str()) && !v.is_null())
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            (constituents.len() == map.len() && !constituents.is_empty())
                .then(|| Value::Object(constituents))
        }
        _ => None,
    }
}
