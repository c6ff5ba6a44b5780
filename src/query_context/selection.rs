//! Selection tree handed over by the query front-end
//!
//! A `SelectionNode` is one requested field: its name, optional response
//! alias, raw argument values and ordered sub-selections. The root node of a
//! request is the operation field itself (`Person`, `CountPerson`,
//! `CreatePerson`, ...).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Argument names with translator-defined meaning on read fields
pub const FILTER_ARG: &str = "filter";
pub const ORDER_BY_ARG: &str = "orderBy";
pub const FIRST_ARG: &str = "first";
pub const OFFSET_ARG: &str = "offset";
pub const GROUP_BY_ARG: &str = "groupBy";
pub const SEARCH_ARG: &str = "search";
/// Mutation arguments
pub const DATA_ARG: &str = "data";
pub const WHERE_ARG: &str = "where";

pub const RESERVED_READ_ARGS: &[&str] = &[
    FILTER_ARG,
    ORDER_BY_ARG,
    FIRST_ARG,
    OFFSET_ARG,
    GROUP_BY_ARG,
    SEARCH_ARG,
];

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectionNode {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    /// Raw argument values, in the order the query supplied them
    #[serde(default)]
    pub arguments: Map<String, Value>,
    #[serde(default)]
    pub selections: Vec<SelectionNode>,
}

impl SelectionNode {
    pub fn new(name: impl Into<String>) -> Self {
        SelectionNode {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Leaf selection for each name, in order
    pub fn leaves(names: &[&str]) -> Vec<SelectionNode> {
        names.iter().map(|n| SelectionNode::new(*n)).collect()
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: Value) -> Self {
        self.arguments.insert(name.into(), value);
        self
    }

    pub fn with_selection(mut self, child: SelectionNode) -> Self {
        self.selections.push(child);
        self
    }

    pub fn with_selections(mut self, children: Vec<SelectionNode>) -> Self {
        self.selections.extend(children);
        self
    }

    /// Key under which this field appears in the result
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name).filter(|v| !v.is_null())
    }

    pub fn filter(&self) -> Option<&Value> {
        self.argument(FILTER_ARG)
    }

    pub fn group_by(&self) -> Option<&Value> {
        self.argument(GROUP_BY_ARG)
    }

    pub fn is_leaf(&self) -> bool {
        self.selections.is_empty()
    }
}
