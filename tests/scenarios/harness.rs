use taskgraph_canvas::canvas::{CanvasEffect, CanvasIntent, GraphCanvas};
use taskgraph_canvas::graph::{GraphFilters, NodeKind, TaskSnapshot, TaskStatus};
use taskgraph_canvas::services::{DependencyValidation, TaskDependency};

use euclid::default::Point2D;

/// Drives a `GraphCanvas` the way a host application would: applies intents,
/// drains effects, and plays the scripted collaborator for the round-trips
/// under test.
pub(crate) struct TestHarness {
    pub(crate) canvas: GraphCanvas,
}

impl TestHarness {
    pub(crate) fn new() -> Self {
        Self {
            canvas: GraphCanvas::default(),
        }
    }

    pub(crate) fn task(id: &str) -> TaskSnapshot {
        TaskSnapshot {
            id: id.to_string(),
            title: format!("Task {id}"),
            status: TaskStatus::Todo,
            kind: NodeKind::Task,
        }
    }

    pub(crate) fn dependency(id: &str, from: &str, to: &str) -> TaskDependency {
        TaskDependency {
            id: id.to_string(),
            predecessor_id: from.to_string(),
            successor_id: to.to_string(),
            dependency_type: Default::default(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    pub(crate) fn rebuild(&mut self, task_ids: &[&str], deps: &[(&str, &str, &str)]) {
        let tasks: Vec<TaskSnapshot> = task_ids.iter().map(|id| Self::task(id)).collect();
        let deps: Vec<TaskDependency> = deps
            .iter()
            .map(|(id, from, to)| Self::dependency(id, from, to))
            .collect();
        self.canvas
            .rebuild(&tasks, &deps, &GraphFilters::default(), None);
    }

    /// A chain t0 -> t1 -> ... with one dependency per consecutive pair.
    pub(crate) fn rebuild_chain(&mut self, count: usize) {
        let tasks: Vec<TaskSnapshot> =
            (0..count).map(|i| Self::task(&format!("t{i}"))).collect();
        let deps: Vec<TaskDependency> = (1..count)
            .map(|i| Self::dependency(&format!("d{i}"), &format!("t{}", i - 1), &format!("t{i}")))
            .collect();
        self.canvas
            .rebuild(&tasks, &deps, &GraphFilters::default(), None);
    }

    /// Full drag-to-connect gesture ending in a drop; returns drained effects.
    pub(crate) fn drag_connect(&mut self, from: &str, to: &str) -> Vec<CanvasEffect> {
        self.canvas.apply(CanvasIntent::BeginConnection {
            source_id: from.to_string(),
            screen: Point2D::new(10.0, 10.0),
        });
        self.canvas
            .apply(CanvasIntent::PointerEnterNode { id: to.to_string() });
        self.canvas.apply(CanvasIntent::PointerUp);
        self.canvas.drain_effects()
    }

    /// The single validation request out of a batch of effects.
    pub(crate) fn expect_validate(effects: &[CanvasEffect]) -> (u64, String, String) {
        let mut found = None;
        for effect in effects {
            if let CanvasEffect::ValidateDependency {
                seq,
                predecessor_id,
                successor_id,
            } = effect
            {
                assert!(found.is_none(), "more than one validation request");
                found = Some((*seq, predecessor_id.clone(), successor_id.clone()));
            }
        }
        found.expect("expected a validation request")
    }

    pub(crate) fn expect_create(effects: &[CanvasEffect]) -> u64 {
        effects
            .iter()
            .find_map(|effect| match effect {
                CanvasEffect::CreateDependency { seq, .. } => Some(*seq),
                _ => None,
            })
            .expect("expected a create request")
    }

    pub(crate) fn cycle_verdict(path: &[&str]) -> DependencyValidation {
        DependencyValidation {
            is_valid: false,
            error_message: Some(
                "Adding this dependency would create a circular dependency".to_string(),
            ),
            would_create_cycle: true,
            cycle_path: Some(path.iter().map(|s| s.to_string()).collect()),
        }
    }
}
