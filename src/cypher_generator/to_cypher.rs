use crate::query_planner::errors::TranslationError;
use crate::query_planner::operators::{CombinatorKind, ComparisonOp, RelationQuantifier};
use crate::query_planner::predicate::{
    CompareTarget, Comparison, Operand, PredicateNode, RelationshipFilter,
};
use crate::query_planner::traversal::{PathSource, TraversalPlan};

use super::common::{hop_pattern, property, quote_identifier};

/// Convert a planned node to Cypher text
pub trait ToCypher {
    /// Render against the aliases assigned by `plan`
    fn to_cypher(&self, plan: &TraversalPlan) -> Result<String, TranslationError>;
}

impl ToCypher for PredicateNode {
    fn to_cypher(&self, plan: &TraversalPlan) -> Result<String, TranslationError> {
        match self {
            PredicateNode::Comparison(comparison) => comparison.to_cypher(plan),
            PredicateNode::RelationshipExists(filter) => filter.to_cypher(plan),
            PredicateNode::Combinator { kind, children } => {
                let rendered = children
                    .iter()
                    .map(|c| c.to_cypher(plan))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(match kind {
                    CombinatorKind::And if rendered.is_empty() => "true".to_string(),
                    CombinatorKind::Or if rendered.is_empty() => "false".to_string(),
                    CombinatorKind::And => format!("({})", rendered.join(" AND ")),
                    CombinatorKind::Or => format!("({})", rendered.join(" OR ")),
                    CombinatorKind::Not => match rendered.as_slice() {
                        [single] if single.starts_with('(') => format!("NOT {}", single),
                        _ => format!("NOT ({})", rendered.join(" AND ")),
                    },
                })
            }
        }
    }
}

impl ToCypher for Comparison {
    fn to_cypher(&self, plan: &TraversalPlan) -> Result<String, TranslationError> {
        let alias = plan
            .alias_for(&self.path, PathSource::Predicate)
            .ok_or_else(|| unplanned(&self.path))?;

        let (lhs, structured) = match &self.target {
            CompareTarget::Property { name, structured } => (property(alias, name), *structured),
            CompareTarget::NodeId => (format!("ID({})", quote_identifier(alias)), None),
        };

        let param = match &self.operand {
            Operand::Null => {
                return match self.op {
                    ComparisonOp::Not => Ok(format!("{} IS NOT NULL", lhs)),
                    _ => Ok(format!("{} IS NULL", lhs)),
                };
            }
            Operand::Param(param) => param,
        };

        let list_op = matches!(self.op, ComparisonOp::In | ComparisonOp::NotIn);
        let value = match (&self.target, structured) {
            (CompareTarget::NodeId, _) => format!("toInteger({})", param),
            (_, Some(kind)) if list_op => {
                format!("[value IN {} | {}(value)]", param, kind.constructor())
            }
            (_, Some(kind)) => format!("{}({})", kind.constructor(), param),
            (_, None) => param.to_string(),
        };

        Ok(match self.op {
            ComparisonOp::Eq => format!("{} = {}", lhs, value),
            ComparisonOp::Not => format!("NOT {} = {}", lhs, value),
            ComparisonOp::In => format!("{} IN {}", lhs, value),
            ComparisonOp::NotIn => format!("NOT {} IN {}", lhs, value),
            ComparisonOp::Regexp => format!("{} =~ {}", lhs, value),
            ComparisonOp::Contains => format!("{} CONTAINS {}", lhs, value),
            ComparisonOp::NotContains => format!("NOT {} CONTAINS {}", lhs, value),
            ComparisonOp::StartsWith => format!("{} STARTS WITH {}", lhs, value),
            ComparisonOp::NotStartsWith => format!("NOT {} STARTS WITH {}", lhs, value),
            ComparisonOp::EndsWith => format!("{} ENDS WITH {}", lhs, value),
            ComparisonOp::NotEndsWith => format!("NOT {} ENDS WITH {}", lhs, value),
            ComparisonOp::Lt => format!("{} < {}", lhs, value),
            ComparisonOp::Lte => format!("{} <= {}", lhs, value),
            ComparisonOp::Gt => format!("{} > {}", lhs, value),
            ComparisonOp::Gte => format!("{} >= {}", lhs, value),
            ComparisonOp::Distance(op) => format!(
                "distance({}, point({}.point)) {} {}.distance",
                lhs,
                param,
                op.symbol(),
                param
            ),
        })
    }
}

impl ToCypher for RelationshipFilter {
    fn to_cypher(&self, plan: &TraversalPlan) -> Result<String, TranslationError> {
        let step = plan
            .step(&self.path, PathSource::Predicate)
            .ok_or_else(|| unplanned(&self.path))?;
        let incoming = step
            .incoming
            .as_ref()
            .ok_or_else(|| unplanned(&self.path))?;
        let hop = hop_pattern(&incoming.parent_alias, &self.relation, &step.alias);

        let inner = if self.predicate.is_vacuous() {
            None
        } else {
            Some(self.predicate.to_cypher(plan)?)
        };
        let matched = match &inner {
            Some(condition) => format!("MATCH {} WHERE {}", hop, condition),
            None => format!("MATCH {}", hop),
        };

        Ok(match self.quantifier {
            RelationQuantifier::Some => format!("EXISTS {{ {} }}", matched),
            RelationQuantifier::None => format!("NOT EXISTS {{ {} }}", matched),
            RelationQuantifier::Single => format!("COUNT {{ {} }} = 1", matched),
            RelationQuantifier::Every => match inner {
                Some(condition) => {
                    format!("NOT EXISTS {{ MATCH {} WHERE NOT {} }}", hop, condition)
                }
                None => "true".to_string(),
            },
        })
    }
}

fn unplanned(path: &[String]) -> TranslationError {
    TranslationError::SchemaInconsistency(format!(
        "no traversal step planned for `{}`",
        path.join(".")
    ))
}
