//! ORDER BY / SKIP / LIMIT for read statements.
//!
//! Ordering only ever reads properties of the statement's root alias.
//! Pagination values are hoisted like any other user value; `first = -1`
//! means "no limit" and emits nothing.

use serde_json::Value;

use crate::graph_catalog::TypeMetadata;
use crate::query_context::selection::{SelectionNode, FIRST_ARG, OFFSET_ARG, ORDER_BY_ARG};
use crate::query_planner::errors::TranslationError;
use crate::query_planner::parameters::ParameterMap;
use crate::query_planner::predicate::NODE_ID_ARG;
use crate::utils::alias_naming::ParamPath;

use super::common::{property, quote_identifier};

/// `first` value meaning "unbounded"
pub const UNBOUNDED: i64 = -1;

/// Score column yielded by a fulltext index call
pub const SEARCH_SCORE: &str = "score";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderItem {
    /// Parse `<field>_asc` / `<field>_desc` against the type's fields
    pub fn parse(value: &str, type_meta: &TypeMetadata) -> Result<Self, TranslationError> {
        let invalid = || TranslationError::InvalidOrderField(value.to_string());
        let (field, direction) = if let Some(field) = value.strip_suffix("_asc") {
            (field, SortDirection::Asc)
        } else if let Some(field) = value.strip_suffix("_desc") {
            (field, SortDirection::Desc)
        } else {
            return Err(invalid());
        };

        let orderable = field == NODE_ID_ARG
            || type_meta
                .field(field)
                .map(|f| f.is_property() && !f.list)
                .unwrap_or(false);
        if !orderable {
            return Err(invalid());
        }

        Ok(OrderItem {
            field: field.to_string(),
            direction,
        })
    }

    fn to_cypher(&self, alias: &str) -> String {
        let read = if self.field == NODE_ID_ARG {
            format!("ID({})", quote_identifier(alias))
        } else {
            property(alias, &self.field)
        };
        match self.direction {
            SortDirection::Asc => format!("{} ASC", read),
            SortDirection::Desc => format!("{} DESC", read),
        }
    }
}

/// Window requested by `first` / `offset`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub first: i64,
    pub offset: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            first: UNBOUNDED,
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn from_arguments(node: &SelectionNode) -> Result<Self, TranslationError> {
        let mut pagination = Pagination::default();
        if let Some(value) = node.argument(FIRST_ARG) {
            let first = integer(FIRST_ARG, value)?;
            if first < UNBOUNDED {
                return Err(TranslationError::pagination(FIRST_ARG, first));
            }
            pagination.first = first;
        }
        if let Some(value) = node.argument(OFFSET_ARG) {
            let offset = integer(OFFSET_ARG, value)?;
            if offset < 0 {
                return Err(TranslationError::pagination(OFFSET_ARG, offset));
            }
            pagination.offset = offset;
        }
        Ok(pagination)
    }

    pub fn is_limited(&self) -> bool {
        self.first != UNBOUNDED
    }
}

fn integer(argument: &str, value: &Value) -> Result<i64, TranslationError> {
    value
        .as_i64()
        .ok_or_else(|| TranslationError::pagination(argument, value))
}

/// `ORDER BY ...` for a read field, or `None` when nothing is ordered.
///
/// Without an explicit ordering, fulltext matches come back best first,
/// sorted on the score variable bound by the index call.
pub fn order_by_clause(
    node: &SelectionNode,
    type_meta: &TypeMetadata,
    alias: &str,
    search_score: Option<&str>,
) -> Result<Option<String>, TranslationError> {
    let items = match node.argument(ORDER_BY_ARG) {
        None => Vec::new(),
        Some(Value::String(value)) => vec![OrderItem::parse(value, type_meta)?],
        Some(Value::Array(values)) => values
            .iter()
            .map(|v| match v.as_str() {
                Some(value) => OrderItem::parse(value, type_meta),
                None => Err(TranslationError::InvalidOrderField(v.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => return Err(TranslationError::InvalidOrderField(other.to_string())),
    };

    if items.is_empty() {
        return Ok(search_score.map(|score| format!("ORDER BY {} DESC", quote_identifier(score))));
    }

    let rendered: Vec<String> = items.iter().map(|item| item.to_cypher(alias)).collect();
    Ok(Some(format!("ORDER BY {}", rendered.join(", "))))
}

/// `SKIP $offset LIMIT $first`, each part only when it bounds the result
pub fn pagination_clause(
    node: &SelectionNode,
    params: &mut ParameterMap,
    param_path: &ParamPath,
) -> Result<Option<String>, TranslationError> {
    let pagination = Pagination::from_arguments(node)?;
    let mut parts = Vec::new();

    if pagination.offset > 0 {
        let param = params.insert(param_path.child(OFFSET_ARG).name(), pagination.offset.into())?;
        parts.push(format!("SKIP {}", param));
    }
    if pagination.is_limited() {
        let param = params.insert(param_path.child(FIRST_ARG).name(), pagination.first.into())?;
        parts.push(format!("LIMIT {}", param));
    }

    Ok((!parts.is_empty()).then(|| parts.join(" ")))
}
