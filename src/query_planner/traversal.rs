//! Traversal planner.
//!
//! Collects every relationship path a read statement touches and assigns
//! each one a single step with a stable alias. Paths come from three
//! sources, merged in this order:
//!
//! 1. relationship fields in the selection (keyed by response key)
//! 2. segments of the dotted group-by path (keyed by field name)
//! 3. relationship filters in the predicate (keyed by path segment, see
//!    [`crate::query_planner::predicate`])
//!
//! A path seen twice reuses its step; the match mode is upgraded to
//! `Required` if any source requires it. Aliases are claimed from the
//! statement-wide [`AliasRegistry`].

use crate::graph_catalog::{FieldKind, GraphSchema, RelationMeta, TypeMetadata};
use crate::query_context::selection::SelectionNode;
use crate::utils::alias_naming::{child_alias, AliasRegistry};

use super::errors::TranslationError;
use super::predicate::{PredicateNode, RelationshipFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Absence of the related node removes the row
    Required,
    /// Absence yields an empty collection / null
    Optional,
}

/// Which sources asked for a step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOrigin {
    pub selection: bool,
    pub predicate: bool,
    pub group_by: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSource {
    Selection,
    Predicate,
    GroupBy,
}

impl StepOrigin {
    fn of(source: PathSource) -> Self {
        let mut origin = StepOrigin::default();
        origin.add(source);
        origin
    }

    fn add(&mut self, source: PathSource) {
        match source {
            PathSource::Selection => self.selection = true,
            PathSource::Predicate => self.predicate = true,
            PathSource::GroupBy => self.group_by = true,
        }
    }

    pub fn has(&self, source: PathSource) -> bool {
        match source {
            PathSource::Selection => self.selection,
            PathSource::Predicate => self.predicate,
            PathSource::GroupBy => self.group_by,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IncomingRelation {
    pub parent_alias: String,
    pub relation: RelationMeta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraversalStep {
    pub alias: String,
    pub type_name: String,
    /// Keys from the root step; empty for the root
    pub path: Vec<String>,
    pub incoming: Option<IncomingRelation>,
    pub mode: MatchMode,
    pub origin: StepOrigin,
}

/// Where a plan starts: the statement root, or the child node of a nested
/// selection reached from its parent alias.
#[derive(Debug, Clone, PartialEq)]
pub struct RootBinding {
    pub alias: String,
    pub type_name: String,
    pub incoming: Option<IncomingRelation>,
}

/// Resolved final segment of a group-by path
#[derive(Debug, Clone, PartialEq)]
pub struct GroupKey {
    pub alias: String,
    pub field: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraversalPlan {
    steps: Vec<TraversalStep>,
    group_key: Option<GroupKey>,
}

impl TraversalPlan {
    pub fn root(&self) -> &TraversalStep {
        &self.steps[0]
    }

    pub fn steps(&self) -> &[TraversalStep] {
        &self.steps
    }

    /// Step planned for `path` by `source`. The empty path is the root.
    ///
    /// Selection paths are keyed by response key while filter and group-by
    /// paths are keyed by field name, so the same path can name two steps.
    pub fn step(&self, path: &[String], source: PathSource) -> Option<&TraversalStep> {
        find_step(&self.steps, path, source)
    }

    pub fn alias_for(&self, path: &[String], source: PathSource) -> Option<&str> {
        self.step(path, source).map(|s| s.alias.as_str())
    }

    /// Step of a selected relationship field
    pub fn selection_step(&self, response_key: &str) -> Option<&TraversalStep> {
        self.step(&[response_key.to_string()], PathSource::Selection)
    }

    pub fn group_key(&self) -> Option<&GroupKey> {
        self.group_key.as_ref()
    }

    /// Steps bound in the outer `MATCH` chain, in discovery order
    pub fn group_by_steps(&self) -> impl Iterator<Item = &TraversalStep> {
        self.steps.iter().filter(|s| s.origin.group_by)
    }
}

pub struct TraversalPlanner<'a> {
    schema: &'a GraphSchema,
}

impl<'a> TraversalPlanner<'a> {
    pub fn new(schema: &'a GraphSchema) -> Self {
        TraversalPlanner { schema }
    }

    pub fn plan(
        &self,
        root: RootBinding,
        selections: &[SelectionNode],
        predicate: Option<&PredicateNode>,
        group_by: Option<&str>,
        aliases: &mut AliasRegistry,
    ) -> Result<TraversalPlan, TranslationError> {
        let root_type = self.schema.get_type_or_err(&root.type_name)?;
        aliases.reserve(&root.alias);
        let mut builder = PlanBuilder {
            steps: vec![TraversalStep {
                alias: root.alias.clone(),
                type_name: root.type_name.clone(),
                path: Vec::new(),
                incoming: root.incoming,
                mode: MatchMode::Required,
                origin: StepOrigin::default(),
            }],
            aliases,
        };

        for child in selections {
            let Some(field) = root_type.field(&child.name) else {
                continue;
            };
            if let FieldKind::Relationship(relation) = &field.kind {
                let mode = if !field.list && field.required {
                    MatchMode::Required
                } else {
                    MatchMode::Optional
                };
                builder.add_step(
                    &[],
                    child.response_key(),
                    child.response_key(),
                    relation,
                    mode,
                    PathSource::Selection,
                );
            }
        }

        let group_key = match group_by {
            Some(path) => Some(self.resolve_group_by(root_type, path, &mut builder)?),
            None => None,
        };

        if let Some(predicate) = predicate {
            let mut hops: Vec<(Vec<String>, String, RelationMeta)> = Vec::new();
            predicate.walk_relationships(&mut |rel: &RelationshipFilter| {
                hops.push((rel.path.clone(), rel.field.clone(), rel.relation.clone()))
            });
            for (path, field, relation) in hops {
                let (segment, parent) = match path.split_last() {
                    Some(split) => split,
                    None => continue,
                };
                builder.add_step(
                    parent,
                    segment,
                    &field,
                    &relation,
                    MatchMode::Required,
                    PathSource::Predicate,
                );
            }
        }

        log::debug!(
            "planned {} traversal step(s) from `{}`: [{}]",
            builder.steps.len(),
            builder.steps[0].alias,
            builder
                .steps
                .iter()
                .map(|s| s.alias.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(TraversalPlan {
            steps: builder.steps,
            group_key,
        })
    }

    /// Walk `a.b.c`: every segment but the last must be a relationship, the
    /// last must be a stored property.
    fn resolve_group_by(
        &self,
        root_type: &TypeMetadata,
        path: &str,
        builder: &mut PlanBuilder<'_>,
    ) -> Result<GroupKey, TranslationError> {
        let segments: Vec<&str> = path.split('.').collect();
        let Some((last, hops)) = segments.split_last() else {
            return Err(TranslationError::InvalidGroupByPath(path.to_string()));
        };

        let mut current_type = root_type;
        let mut current_path: Vec<String> = Vec::new();

        for segment in hops {
            let relation = current_type
                .field(segment)
                .and_then(|f| f.relation())
                .ok_or_else(|| TranslationError::InvalidGroupByPath(segment.to_string()))?;
            builder.add_step(
                &current_path,
                segment,
                segment,
                relation,
                MatchMode::Required,
                PathSource::GroupBy,
            );
            current_path.push(segment.to_string());
            current_type = self.schema.get_type_or_err(&relation.target_type)?;
        }

        match current_type.field(last) {
            Some(field) if field.is_property() => {}
            _ => return Err(TranslationError::InvalidGroupByPath(last.to_string())),
        }

        let alias = builder
            .alias_at(&current_path, PathSource::GroupBy)
            .ok_or_else(|| TranslationError::SchemaInconsistency(format!("no step for `{}`", path)))?;

        Ok(GroupKey {
            alias: alias.to_string(),
            field: last.to_string(),
        })
    }
}

struct PlanBuilder<'r> {
    steps: Vec<TraversalStep>,
    aliases: &'r mut AliasRegistry,
}

fn find_step<'s>(
    steps: &'s [TraversalStep],
    path: &[String],
    source: PathSource,
) -> Option<&'s TraversalStep> {
    if path.is_empty() {
        return steps.first();
    }
    steps
        .iter()
        .find(|s| s.path == path && s.origin.has(source))
}

impl PlanBuilder<'_> {
    fn alias_at(&self, path: &[String], source: PathSource) -> Option<&str> {
        find_step(&self.steps, path, source).map(|s| s.alias.as_str())
    }

    /// Plan the hop `key` below `parent_path`, naming its alias after
    /// `alias_key`
    fn add_step(
        &mut self,
        parent_path: &[String],
        key: &str,
        alias_key: &str,
        relation: &RelationMeta,
        mode: MatchMode,
        source: PathSource,
    ) {
        let mut path = parent_path.to_vec();
        path.push(key.to_string());

        if let Some(existing) = self
            .steps
            .iter_mut()
            .find(|s| s.path == path && s.incoming.as_ref().map(|i| &i.relation) == Some(relation))
        {
            if mode == MatchMode::Required {
                existing.mode = MatchMode::Required;
            }
            existing.origin.add(source);
            return;
        }

        // Parents are always planned before their children
        let Some(parent_alias) = self.alias_at(parent_path, source).map(str::to_string) else {
            return;
        };

        let alias = self.aliases.claim(&child_alias(&parent_alias, alias_key));
        log::trace!("step `{}` via {:?} {}", alias, relation.direction, relation.name);

        self.steps.push(TraversalStep {
            alias,
            type_name: relation.target_type.clone(),
            path,
            incoming: Some(IncomingRelation {
                parent_alias,
                relation: relation.clone(),
            }),
            mode,
            origin: StepOrigin::of(source),
        });
    }
}
