//! Count projections, optionally grouped by a property reached through the
//! outer `MATCH` chain.

use crate::query_planner::traversal::TraversalPlan;

use super::common::{property, quote_identifier};

/// `count(...)` map returned by count operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    /// Alias whose rows are counted
    pub count: String,
    /// `(alias, field)` whose value groups the rows
    pub group: Option<(String, String)>,
}

impl Aggregation {
    /// `{count: count(`a`)}` or `{group: `g`.field, count: count(`a`)}`.
    /// Non-aggregated map entries act as the implicit grouping key.
    pub fn to_cypher(&self) -> String {
        let count = format!("count: count({})", quote_identifier(&self.count));
        match &self.group {
            Some((alias, field)) => format!("{{group: {}, {}}}", property(alias, field), count),
            None => format!("{{{}}}", count),
        }
    }
}

pub(crate) trait AggregationBuilder {
    fn build_aggregation(&self) -> Aggregation;
}

impl AggregationBuilder for TraversalPlan {
    fn build_aggregation(&self) -> Aggregation {
        Aggregation {
            count: self.root().alias.clone(),
            group: self
                .group_key()
                .map(|key| (key.alias.clone(), key.field.clone())),
        }
    }
}
