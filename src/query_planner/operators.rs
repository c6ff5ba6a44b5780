//! Filter key grammar.
//!
//! Every key of a filter argument is either a combinator (`AND`, `OR`,
//! `NOT`) or `<field>[_<suffix>]`. The suffix selects a comparison operator
//! for property fields or a quantifier for relationship fields. An exact
//! field-name match always wins over suffix splitting, so a field literally
//! named `name_not` is compared for equality.

use crate::graph_catalog::{FieldKind, FieldMetadata, StructuredKind, TypeMetadata};

use super::errors::TranslationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinatorKind {
    And,
    Or,
    Not,
}

impl CombinatorKind {
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "AND" => Some(CombinatorKind::And),
            "OR" => Some(CombinatorKind::Or),
            "NOT" => Some(CombinatorKind::Not),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Not,
    In,
    NotIn,
    Regexp,
    Contains,
    NotContains,
    StartsWith,
    NotStartsWith,
    EndsWith,
    NotEndsWith,
    Lt,
    Lte,
    Gt,
    Gte,
    /// Spatial distance compared with the inner operator (`Eq`, `Lt`, ...)
    Distance(DistanceOp),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceOp {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl DistanceOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            DistanceOp::Eq => "=",
            DistanceOp::Lt => "<",
            DistanceOp::Lte => "<=",
            DistanceOp::Gt => ">",
            DistanceOp::Gte => ">=",
        }
    }
}

/// How a relationship filter constrains the related nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationQuantifier {
    /// At least one related node matches (`movies`, `movies_some`)
    Some,
    /// No related node matches (`movies_none`, `movies_not`)
    None,
    /// Every related node matches (`movies_every`)
    Every,
    /// Exactly one related node matches (`movies_single`)
    Single,
}

impl RelationQuantifier {
    /// Canonical filter-key suffix
    pub fn suffix(&self) -> &'static str {
        match self {
            RelationQuantifier::Some => "some",
            RelationQuantifier::None => "none",
            RelationQuantifier::Every => "every",
            RelationQuantifier::Single => "single",
        }
    }
}

// Longest suffixes first so `not_in` is never read as `in`.
const COMPARISON_SUFFIXES: &[(&str, ComparisonOp)] = &[
    ("not_starts_with", ComparisonOp::NotStartsWith),
    ("not_ends_with", ComparisonOp::NotEndsWith),
    ("not_contains", ComparisonOp::NotContains),
    ("distance_lte", ComparisonOp::Distance(DistanceOp::Lte)),
    ("distance_gte", ComparisonOp::Distance(DistanceOp::Gte)),
    ("starts_with", ComparisonOp::StartsWith),
    ("distance_lt", ComparisonOp::Distance(DistanceOp::Lt)),
    ("distance_gt", ComparisonOp::Distance(DistanceOp::Gt)),
    ("ends_with", ComparisonOp::EndsWith),
    ("contains", ComparisonOp::Contains),
    ("distance", ComparisonOp::Distance(DistanceOp::Eq)),
    ("not_in", ComparisonOp::NotIn),
    ("regexp", ComparisonOp::Regexp),
    ("not", ComparisonOp::Not),
    ("lte", ComparisonOp::Lte),
    ("gte", ComparisonOp::Gte),
    ("in", ComparisonOp::In),
    ("lt", ComparisonOp::Lt),
    ("gt", ComparisonOp::Gt),
];

const QUANTIFIER_SUFFIXES: &[(&str, RelationQuantifier)] = &[
    ("single", RelationQuantifier::Single),
    ("every", RelationQuantifier::Every),
    ("some", RelationQuantifier::Some),
    ("none", RelationQuantifier::None),
    ("not", RelationQuantifier::None),
];

/// Parsed meaning of one filter key
#[derive(Debug, Clone, Copy)]
pub enum FilterKey<'a> {
    Combinator(CombinatorKind),
    Comparison {
        field: &'a FieldMetadata,
        op: ComparisonOp,
    },
    Relationship {
        field: &'a FieldMetadata,
        quantifier: RelationQuantifier,
    },
}

pub fn parse_filter_key<'a>(
    key: &str,
    type_meta: &'a TypeMetadata,
) -> Result<FilterKey<'a>, TranslationError> {
    if let Some(kind) = CombinatorKind::parse(key) {
        return Ok(FilterKey::Combinator(kind));
    }

    let invalid = || TranslationError::InvalidFilterField(key.to_string());

    if let Some(field) = type_meta.field(key) {
        return classify(field, None).ok_or_else(invalid);
    }

    let suffixes = COMPARISON_SUFFIXES
        .iter()
        .map(|(s, _)| *s)
        .chain(QUANTIFIER_SUFFIXES.iter().map(|(s, _)| *s));

    for suffix in suffixes {
        let Some(prefix) = key
            .strip_suffix(suffix)
            .and_then(|rest| rest.strip_suffix('_'))
        else {
            continue;
        };
        if let Some(field) = type_meta.field(prefix) {
            return classify(field, Some(suffix)).ok_or_else(invalid);
        }
    }

    Err(invalid())
}

/// Resolve a (field, suffix) pair, `None` when the suffix does not apply
/// to the field's kind.
fn classify<'a>(field: &'a FieldMetadata, suffix: Option<&str>) -> Option<FilterKey<'a>> {
    match &field.kind {
        FieldKind::Relationship(_) => {
            let quantifier = match suffix {
                None => RelationQuantifier::Some,
                Some(s) => QUANTIFIER_SUFFIXES
                    .iter()
                    .find(|(name, _)| *name == s)
                    .map(|(_, q)| *q)?,
            };
            Some(FilterKey::Relationship { field, quantifier })
        }
        FieldKind::Scalar(_) | FieldKind::Structured(_) => {
            let op = match suffix {
                None => ComparisonOp::Eq,
                Some(s) => COMPARISON_SUFFIXES
                    .iter()
                    .find(|(name, _)| *name == s)
                    .map(|(_, op)| *op)?,
            };
            if operator_applies(field, op) {
                Some(FilterKey::Comparison { field, op })
            } else {
                None
            }
        }
        FieldKind::Computed { .. } => None,
    }
}

/// Whether `op` is defined for the field's value kind
pub fn operator_applies(field: &FieldMetadata, op: ComparisonOp) -> bool {
    use ComparisonOp::*;

    match &field.kind {
        FieldKind::Scalar(scalar) => match op {
            Eq | Not => true,
            In | NotIn => *scalar != crate::graph_catalog::ScalarType::Boolean,
            Regexp | Contains | NotContains | StartsWith | NotStartsWith | EndsWith
            | NotEndsWith => scalar.is_textual(),
            Lt | Lte | Gt | Gte => scalar.is_numeric(),
            Distance(_) => false,
        },
        FieldKind::Structured(StructuredKind::Point) => matches!(op, Eq | Not | Distance(_)),
        FieldKind::Structured(_) => matches!(op, Eq | Not | In | NotIn | Lt | Lte | Gt | Gte),
        FieldKind::Relationship(_) | FieldKind::Computed { .. } => false,
    }
}
