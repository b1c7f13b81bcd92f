/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Dependency graph store for the task canvas.
//!
//! Core structures:
//! - `DependencyGraph`: node/edge container backed by petgraph::StableGraph,
//!   rebuilt wholesale from the host's task/dependency feed
//! - `Node`: one task on the canvas with position, size, and derived flags
//! - `Edge`: one precedence relationship between two tasks
//!
//! Boundary: topology mutators are `pub(crate)` — callers outside the canvas
//! reducer path are single-write-path invariant violations. The store never
//! mutates task fields; it only projects them.

use euclid::default::{Point2D, Rect, Size2D};
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::{Directed, Direction};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::services::TaskDependency;

/// Stable node handle (petgraph NodeIndex — survives other deletions)
pub type NodeKey = NodeIndex;

/// Stable edge handle (petgraph EdgeIndex)
pub type EdgeKey = EdgeIndex;

/// Seed grid used for nodes that have not been laid out yet.
const SEED_COLUMNS: usize = 8;
const SEED_COLUMN_STEP: f32 = 280.0;
const SEED_ROW_STEP: f32 = 130.0;

/// Lifecycle status of a task record, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Blocked,
    Completed,
    Cancelled,
    Archived,
}

impl TaskStatus {
    /// Terminal "done" status used by readiness derivation.
    pub fn is_done(self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

/// Visual class of a node. Each kind has a fixed sprite size; the render
/// registry maps kinds to styles once at engine construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    #[default]
    Task,
    Milestone,
}

impl NodeKind {
    pub fn sprite_size(self) -> Size2D<f32> {
        match self {
            NodeKind::Task => Size2D::new(220.0, 88.0),
            NodeKind::Milestone => Size2D::new(180.0, 56.0),
        }
    }
}

/// Temporal relationship between two tasks' start/finish times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    /// A must finish before B can start (default)
    #[default]
    FinishToStart,
    /// A must start before B can start
    StartToStart,
    /// A must finish before B can finish
    FinishToFinish,
    /// A must start before B can finish
    StartToFinish,
}

impl std::fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DependencyKind::FinishToStart => write!(f, "finish_to_start"),
            DependencyKind::StartToStart => write!(f, "start_to_start"),
            DependencyKind::FinishToFinish => write!(f, "finish_to_finish"),
            DependencyKind::StartToFinish => write!(f, "start_to_finish"),
        }
    }
}

/// Engine-visible projection of one external task record. Read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSnapshot {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub kind: NodeKind,
}

/// A task node on the canvas.
#[derive(Debug, Clone)]
pub struct Node {
    /// Projection of the external task record this node renders.
    pub task: TaskSnapshot,

    /// Position in graph space. Owned by the layout orchestrator until a
    /// user drag takes over (see `user_positioned`).
    pub position: Point2D<f32>,

    /// Fixed sprite size for the node's kind.
    pub size: Size2D<f32>,

    /// Every predecessor task has reached the terminal done status.
    pub is_ready: bool,

    /// Not ready and not itself done.
    pub is_blocked: bool,

    /// On the collaborator-computed critical path. Never locally guessed;
    /// absent data renders no highlight.
    pub on_critical_path: bool,

    /// Position was last written by a user drag rather than a layout pass.
    pub user_positioned: bool,
}

impl Node {
    pub fn id(&self) -> &str {
        &self.task.id
    }

    /// Bounding rectangle in graph space.
    pub fn rect(&self) -> Rect<f32> {
        Rect::new(self.position, self.size)
    }
}

/// A precedence edge between two task nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Dependency id — the edge's identity across rebuilds.
    pub id: String,
    pub predecessor_id: String,
    pub successor_id: String,
    pub kind: DependencyKind,
    /// Mirrors the selection manager; synced before scene derivation.
    pub selected: bool,
}

/// Display filters applied at rebuild time.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphFilters {
    /// Case-insensitive substring match against task titles. Empty matches all.
    pub search: String,
    /// When false, completed and archived tasks are excluded.
    pub show_completed: bool,
    /// When true and collaborator data is present, critical-path nodes are flagged.
    pub highlight_critical_path: bool,
}

impl Default for GraphFilters {
    fn default() -> Self {
        Self {
            search: String::new(),
            show_completed: true,
            highlight_critical_path: false,
        }
    }
}

/// Authoritative graph-algorithm results from the dependency-service
/// collaborator. When present these override the store's local derivation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphInsights {
    /// Task ids the collaborator reports as ready to start.
    pub ready_task_ids: Vec<String>,
    /// Task ids on the critical path, in path order.
    pub critical_path: Vec<String>,
}

/// Canonical in-memory graph, rebuilt (never incrementally patched) whenever
/// the source feed or the display filters change.
///
/// Rebuilding from scratch guarantees derived flags can never go stale, at
/// the cost of discarding manual node positions on every rebuild — including
/// rebuilds caused by unrelated filter changes. That trade-off is inherited
/// behavior; see DESIGN.md before changing it.
pub struct DependencyGraph {
    inner: StableGraph<Node, Edge, Directed>,
    id_to_node: HashMap<String, NodeKey>,
    id_to_edge: HashMap<String, EdgeKey>,
    revision: u64,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self {
            inner: StableGraph::new(),
            id_to_node: HashMap::new(),
            id_to_edge: HashMap::new(),
            revision: 0,
        }
    }

    /// Monotonic counter bumped on every rebuild and topology mutation.
    /// In-flight layout and validation results are discarded when the
    /// revision they were computed against no longer matches.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Rebuild the node/edge collections from the source feed.
    ///
    /// Task filter: title substring search plus the show-completed toggle.
    /// An edge is included only if both endpoints survive the task filter —
    /// this silently prunes valid dependencies from view, which is the
    /// intended behavior, not a bug.
    ///
    /// Readiness is derived over the *unfiltered* feed (a predecessor hidden
    /// by search still blocks its successor), then overridden by collaborator
    /// `insights` when supplied.
    pub fn rebuild(
        &mut self,
        tasks: &[TaskSnapshot],
        dependencies: &[TaskDependency],
        filters: &GraphFilters,
        insights: Option<&GraphInsights>,
    ) {
        self.inner = StableGraph::new();
        self.id_to_node.clear();
        self.id_to_edge.clear();

        let search = filters.search.trim().to_lowercase();
        let status_by_id: HashMap<&str, TaskStatus> = tasks
            .iter()
            .map(|task| (task.id.as_str(), task.status))
            .collect();

        let mut seed_index = 0usize;
        for task in tasks {
            if !task_passes_filters(task, &search, filters) {
                continue;
            }
            let size = task.kind.sprite_size();
            let position = seed_position(seed_index);
            seed_index += 1;

            let key = self.inner.add_node(Node {
                task: task.clone(),
                position,
                size,
                is_ready: false,
                is_blocked: false,
                on_critical_path: false,
                user_positioned: false,
            });
            self.id_to_node.insert(task.id.clone(), key);
        }

        for dependency in dependencies {
            let (Some(&from), Some(&to)) = (
                self.id_to_node.get(&dependency.predecessor_id),
                self.id_to_node.get(&dependency.successor_id),
            ) else {
                log::debug!(
                    "dropping edge {}: endpoint not visible ({} -> {})",
                    dependency.id,
                    dependency.predecessor_id,
                    dependency.successor_id
                );
                continue;
            };

            if let Some(&stale) = self.id_to_edge.get(&dependency.id) {
                log::warn!(
                    "duplicate dependency id {} in feed; keeping last",
                    dependency.id
                );
                let _ = self.inner.remove_edge(stale);
            }
            let key = self.inner.add_edge(
                from,
                to,
                Edge {
                    id: dependency.id.clone(),
                    predecessor_id: dependency.predecessor_id.clone(),
                    successor_id: dependency.successor_id.clone(),
                    kind: dependency.dependency_type,
                    selected: false,
                },
            );
            self.id_to_edge.insert(dependency.id.clone(), key);
        }

        self.derive_flags(dependencies, &status_by_id, filters, insights);
        self.revision = self.revision.saturating_add(1);
    }

    fn derive_flags(
        &mut self,
        dependencies: &[TaskDependency],
        status_by_id: &HashMap<&str, TaskStatus>,
        filters: &GraphFilters,
        insights: Option<&GraphInsights>,
    ) {
        // Successors with at least one not-yet-done predecessor, over the full feed.
        let mut blocked_by_feed: HashSet<&str> = HashSet::new();
        for dependency in dependencies {
            let done = status_by_id
                .get(dependency.predecessor_id.as_str())
                .is_some_and(|status| status.is_done());
            if !done && status_by_id.contains_key(dependency.predecessor_id.as_str()) {
                blocked_by_feed.insert(dependency.successor_id.as_str());
            }
        }

        let authoritative_ready: Option<HashSet<&str>> = insights
            .map(|i| i.ready_task_ids.iter().map(String::as_str).collect());
        let critical: Option<HashSet<&str>> = insights
            .filter(|_| filters.highlight_critical_path)
            .map(|i| i.critical_path.iter().map(String::as_str).collect());

        for key in self.inner.node_indices().collect::<Vec<_>>() {
            let Some(node) = self.inner.node_weight_mut(key) else {
                continue;
            };
            let id = node.task.id.as_str();
            node.is_ready = match &authoritative_ready {
                Some(ready) => ready.contains(id),
                None => !blocked_by_feed.contains(id),
            };
            node.is_blocked = !node.is_ready && !node.task.status.is_done();
            node.on_critical_path = critical.as_ref().is_some_and(|path| path.contains(id));
        }
    }

    /// Insert an edge for a dependency the collaborator just created.
    pub(crate) fn insert_edge(&mut self, dependency: &TaskDependency) -> Option<EdgeKey> {
        let (Some(&from), Some(&to)) = (
            self.id_to_node.get(&dependency.predecessor_id),
            self.id_to_node.get(&dependency.successor_id),
        ) else {
            log::debug!(
                "not inserting edge {}: endpoint missing from store",
                dependency.id
            );
            return None;
        };
        if let Some(&existing) = self.id_to_edge.get(&dependency.id) {
            return Some(existing);
        }
        let key = self.inner.add_edge(
            from,
            to,
            Edge {
                id: dependency.id.clone(),
                predecessor_id: dependency.predecessor_id.clone(),
                successor_id: dependency.successor_id.clone(),
                kind: dependency.dependency_type,
                selected: false,
            },
        );
        self.id_to_edge.insert(dependency.id.clone(), key);
        self.revision = self.revision.saturating_add(1);
        Some(key)
    }

    /// Remove an edge by dependency id. Returns whether anything was removed.
    pub(crate) fn remove_edge_by_id(&mut self, id: &str) -> bool {
        let Some(key) = self.id_to_edge.remove(id) else {
            return false;
        };
        let removed = self.inner.remove_edge(key).is_some();
        if removed {
            self.revision = self.revision.saturating_add(1);
        }
        removed
    }

    /// Change an edge's dependency kind in place.
    pub(crate) fn retype_edge(&mut self, id: &str, kind: DependencyKind) -> bool {
        let Some(&key) = self.id_to_edge.get(id) else {
            return false;
        };
        match self.inner.edge_weight_mut(key) {
            Some(edge) => {
                edge.kind = kind;
                true
            }
            None => false,
        }
    }

    /// User drag: move a node and transfer position ownership to the user.
    pub(crate) fn set_node_position(&mut self, id: &str, position: Point2D<f32>) -> bool {
        let Some(&key) = self.id_to_node.get(id) else {
            return false;
        };
        match self.inner.node_weight_mut(key) {
            Some(node) => {
                node.position = position;
                node.user_positioned = true;
                true
            }
            None => false,
        }
    }

    /// Layout write-back: apply computed positions and reclaim ownership.
    /// Ids absent from `positions` keep their current position.
    pub(crate) fn apply_positions(&mut self, positions: &HashMap<String, Point2D<f32>>) {
        for key in self.inner.node_indices().collect::<Vec<_>>() {
            let Some(node) = self.inner.node_weight_mut(key) else {
                continue;
            };
            if let Some(position) = positions.get(node.task.id.as_str()) {
                node.position = *position;
                node.user_positioned = false;
            }
        }
    }

    /// Sync every edge's `selected` flag from the selection manager.
    pub(crate) fn sync_selection(&mut self, selected: &HashSet<String>) {
        for key in self.inner.edge_indices().collect::<Vec<_>>() {
            if let Some(edge) = self.inner.edge_weight_mut(key) {
                edge.selected = selected.contains(&edge.id);
            }
        }
    }

    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.inner.node_weight(key)
    }

    pub fn node_by_id(&self, id: &str) -> Option<(NodeKey, &Node)> {
        let key = *self.id_to_node.get(id)?;
        Some((key, self.inner.node_weight(key)?))
    }

    pub fn contains_node_id(&self, id: &str) -> bool {
        self.id_to_node.contains_key(id)
    }

    pub fn edge(&self, key: EdgeKey) -> Option<&Edge> {
        self.inner.edge_weight(key)
    }

    pub fn edge_by_id(&self, id: &str) -> Option<(EdgeKey, &Edge)> {
        let key = *self.id_to_edge.get(id)?;
        Some((key, self.inner.edge_weight(key)?))
    }

    pub fn edge_endpoints(&self, key: EdgeKey) -> Option<(NodeKey, NodeKey)> {
        self.inner.edge_endpoints(key)
    }

    /// Iterate over all nodes as (key, node) pairs.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeKey, &Node)> {
        self.inner
            .node_indices()
            .map(move |idx| (idx, &self.inner[idx]))
    }

    /// Iterate over all edges as (key, edge, from, to) tuples.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeKey, &Edge, NodeKey, NodeKey)> {
        self.inner
            .edge_references()
            .map(|e| (e.id(), e.weight(), e.source(), e.target()))
    }

    /// Iterate predecessor node keys of a node.
    pub fn predecessors(&self, key: NodeKey) -> impl Iterator<Item = NodeKey> + '_ {
        self.inner.neighbors_directed(key, Direction::Incoming)
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Union of all node rectangles, or None for an empty graph.
    pub fn bounding_rect(&self) -> Option<Rect<f32>> {
        let mut bounds: Option<Rect<f32>> = None;
        for (_, node) in self.nodes() {
            let rect = node.rect();
            bounds = Some(match bounds {
                Some(acc) => acc.union(&rect),
                None => rect,
            });
        }
        bounds
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

fn task_passes_filters(task: &TaskSnapshot, search: &str, filters: &GraphFilters) -> bool {
    if !filters.show_completed
        && matches!(task.status, TaskStatus::Completed | TaskStatus::Archived)
    {
        return false;
    }
    if search.is_empty() {
        return true;
    }
    task.title.to_lowercase().contains(search)
}

fn seed_position(index: usize) -> Point2D<f32> {
    let column = (index % SEED_COLUMNS) as f32;
    let row = (index / SEED_COLUMNS) as f32;
    Point2D::new(column * SEED_COLUMN_STEP, row * SEED_ROW_STEP)
}
