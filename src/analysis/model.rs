//! Hierarchical source-entity model and metric aggregation.
//!
//! One entity struct with a kind discriminant covers the whole
//! Project ⊃ File ⊃ Namespace ⊃ Type ⊃ Member hierarchy; entities live in an
//! arena and refer to each other by index. Metrics are recorded on entities
//! during the visitor pass and rolled up once by [`EntityArena::finalize`]:
//! a bottom-up pass sums `Sum` metrics into parents, then a top-down pass
//! recomputes calculated metrics from the aggregated inputs.

use rustc_hash::FxHashMap;
use tracing::warn;

pub type EntityId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Project,
    File,
    Namespace,
    Type,
    Member,
}

/// Metric identifiers with their aggregation policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricId {
    Files,
    Lines,
    LinesOfCode,
    CommentLines,
    CommentedOutCodeLines,
    Statements,
    Complexity,
    Classes,
    Methods,
    Accessors,
    PublicApi,
    UndocumentedPublicApi,
    CommentDensity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Summed into the parent entity during finalization.
    Sum,
    /// Stays on the entity it was recorded on.
    None,
    /// Derived from sibling metrics after aggregation; never summed.
    Calculated,
}

impl MetricId {
    pub fn aggregation(self) -> Aggregation {
        match self {
            // complexity belongs to the member it was counted in
            MetricId::Complexity => Aggregation::None,
            MetricId::CommentDensity => Aggregation::Calculated,
            _ => Aggregation::Sum,
        }
    }

    /// Whether [`EntityArena::record`] adds to an existing value or
    /// overwrites it.
    pub fn accumulates(self) -> bool {
        !matches!(self, MetricId::CommentDensity)
    }

    pub const ALL: [MetricId; 13] = [
        MetricId::Files,
        MetricId::Lines,
        MetricId::LinesOfCode,
        MetricId::CommentLines,
        MetricId::CommentedOutCodeLines,
        MetricId::Statements,
        MetricId::Complexity,
        MetricId::Classes,
        MetricId::Methods,
        MetricId::Accessors,
        MetricId::PublicApi,
        MetricId::UndocumentedPublicApi,
        MetricId::CommentDensity,
    ];
}

/// One node of the structural model.
#[derive(Debug, Clone)]
pub struct SourceEntity {
    pub kind: EntityKind,
    /// Session-unique hierarchical key, e.g. `Ns.Type#Member:12`.
    pub key: String,
    pub name: String,
    pub start_line: u32,
    pub parent: Option<EntityId>,
    pub children: Vec<EntityId>,
    metrics: FxHashMap<MetricId, f64>,
}

impl SourceEntity {
    pub fn metric(&self, id: MetricId) -> f64 {
        self.metrics.get(&id).copied().unwrap_or(0.0)
    }

    pub fn has_metric(&self, id: MetricId) -> bool {
        self.metrics.contains_key(&id)
    }
}

/// Arena-backed entity tree rooted at a Project entity.
pub struct EntityArena {
    entities: Vec<SourceEntity>,
}

impl EntityArena {
    pub fn new(project_key: impl Into<String>, project_name: impl Into<String>) -> Self {
        Self {
            entities: vec![SourceEntity {
                kind: EntityKind::Project,
                key: project_key.into(),
                name: project_name.into(),
                start_line: 0,
                parent: None,
                children: Vec::new(),
                metrics: FxHashMap::default(),
            }],
        }
    }

    pub fn root(&self) -> EntityId {
        0
    }

    pub fn entity(&self, id: EntityId) -> &SourceEntity {
        &self.entities[id]
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Creates a child entity. Type and member keys are expected to be
    /// unique for the scan session (namespaces legitimately repeat across
    /// files); a duplicate is logged, never silently merged.
    pub fn add(
        &mut self,
        parent: EntityId,
        kind: EntityKind,
        key: impl Into<String>,
        name: impl Into<String>,
        start_line: u32,
    ) -> EntityId {
        let key = key.into();
        if matches!(kind, EntityKind::Type | EntityKind::Member)
            && self.entities.iter().any(|e| e.key == key)
        {
            warn!(key = %key, "duplicate source entity key");
        }
        let id = self.entities.len();
        self.entities.push(SourceEntity {
            kind,
            key,
            name: name.into(),
            start_line,
            parent: Some(parent),
            children: Vec::new(),
            metrics: FxHashMap::default(),
        });
        self.entities[parent].children.push(id);
        id
    }

    /// Adds `delta` to (or, for non-accumulating metrics, overwrites) the
    /// metric on one entity.
    pub fn record(&mut self, id: EntityId, metric: MetricId, delta: f64) {
        let slot = self.entities[id].metrics.entry(metric).or_insert(0.0);
        if metric.accumulates() {
            *slot += delta;
        } else {
            *slot = delta;
        }
    }

    pub fn find_by_key(&self, key: &str) -> Option<EntityId> {
        self.entities.iter().position(|e| e.key == key)
    }

    /// All entities below `id` in depth-first order, excluding `id` itself.
    pub fn descendants(&self, id: EntityId) -> Vec<EntityId> {
        let mut result = Vec::new();
        let mut pending = self.entities[id].children.clone();
        pending.reverse();
        while let Some(next) = pending.pop() {
            result.push(next);
            for &child in self.entities[next].children.iter().rev() {
                pending.push(child);
            }
        }
        result
    }

    /// One bottom-up summation of `Sum` metrics followed by one top-down
    /// recomputation of calculated metrics. Call once per scan session,
    /// after the last file has been merged.
    pub fn finalize(&mut self) {
        self.sum_up(self.root());
        self.compute_calculated();
    }

    fn sum_up(&mut self, id: EntityId) {
        let children = self.entities[id].children.clone();
        for child in children {
            self.sum_up(child);
            let contributions: Vec<(MetricId, f64)> = self.entities[child]
                .metrics
                .iter()
                .filter(|(metric, _)| metric.aggregation() == Aggregation::Sum)
                .map(|(metric, value)| (*metric, *value))
                .collect();
            for (metric, value) in contributions {
                self.record(id, metric, value);
            }
        }
    }

    fn compute_calculated(&mut self) {
        for id in 0..self.entities.len() {
            let comment_lines = self.entities[id].metric(MetricId::CommentLines);
            let loc = self.entities[id].metric(MetricId::LinesOfCode);
            if comment_lines + loc > 0.0 {
                self.record(id, MetricId::CommentDensity, comment_lines / (comment_lines + loc));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_aggregation_reaches_the_root() {
        // Project > Type > Member with LOC recorded on the member only
        let mut arena = EntityArena::new("project", "project");
        let ty = arena.add(arena.root(), EntityKind::Type, "Ns.T", "T", 1);
        let member = arena.add(ty, EntityKind::Member, "Ns.T#m:3", "m", 3);
        arena.record(member, MetricId::LinesOfCode, 5.0);
        arena.finalize();

        assert_eq!(arena.entity(member).metric(MetricId::LinesOfCode), 5.0);
        assert_eq!(arena.entity(ty).metric(MetricId::LinesOfCode), 5.0);
        assert_eq!(arena.entity(arena.root()).metric(MetricId::LinesOfCode), 5.0);
    }

    #[test]
    fn test_no_aggregation_metrics_stay_on_their_entity() {
        let mut arena = EntityArena::new("project", "project");
        let ty = arena.add(arena.root(), EntityKind::Type, "Ns.T", "T", 1);
        let member = arena.add(ty, EntityKind::Member, "Ns.T#m:3", "m", 3);
        arena.record(member, MetricId::Complexity, 3.0);
        arena.finalize();

        assert_eq!(arena.entity(member).metric(MetricId::Complexity), 3.0);
        assert_eq!(arena.entity(ty).metric(MetricId::Complexity), 0.0);
        assert!(!arena.entity(ty).has_metric(MetricId::Complexity));
    }

    #[test]
    fn test_calculated_metrics_use_aggregated_inputs() {
        let mut arena = EntityArena::new("project", "project");
        let file = arena.add(arena.root(), EntityKind::File, "a.cs", "a.cs", 1);
        arena.record(file, MetricId::LinesOfCode, 6.0);
        arena.record(file, MetricId::CommentLines, 2.0);
        arena.finalize();

        let density = arena.entity(arena.root()).metric(MetricId::CommentDensity);
        assert!((density - 0.25).abs() < 1e-9);
        // the calculated metric itself is never summed upward
        assert_eq!(arena.entity(arena.root()).metric(MetricId::CommentLines), 2.0);
    }

    #[test]
    fn test_record_accumulates_counters() {
        let mut arena = EntityArena::new("project", "project");
        arena.record(0, MetricId::Statements, 2.0);
        arena.record(0, MetricId::Statements, 3.0);
        assert_eq!(arena.entity(0).metric(MetricId::Statements), 5.0);
    }

    #[test]
    fn test_descendants_are_depth_first() {
        let mut arena = EntityArena::new("p", "p");
        let file = arena.add(0, EntityKind::File, "f", "f", 1);
        let ns = arena.add(file, EntityKind::Namespace, "N", "N", 1);
        let ty = arena.add(ns, EntityKind::Type, "N.T", "T", 2);
        let other = arena.add(file, EntityKind::Namespace, "M", "M", 9);
        assert_eq!(arena.descendants(0), vec![file, ns, ty, other]);
    }
}
