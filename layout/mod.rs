/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Auto-layout orchestration.
//!
//! Two interchangeable algorithms position the graph: the in-process
//! layered algorithm (synchronous, deterministic) and a constraint solver
//! the host runs asynchronously on the engine's behalf. The orchestrator
//! holds the active selection explicitly — no ambient registry — and
//! guarantees the graph is never left unlaid-out: a failed or rejected
//! solve falls back to the layered algorithm, and `Failed` is reachable
//! only when the fallback itself errors.
//!
//! Stale results are discarded by sequence number plus the store revision
//! the request was computed against.

pub mod layered;

use euclid::default::{Point2D, Size2D};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::graph::DependencyGraph;
use crate::layout::layered::LayeredLayout;

/// Axis orientation for a layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutDirection {
    TopDown,
    BottomUp,
    LeftRight,
    RightLeft,
}

/// Which algorithm a layout request runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutAlgorithmKind {
    /// In-process layered placement; synchronous.
    Layered,
    /// Host-side constraint solver; asynchronous, falls back to layered.
    Constraint,
}

/// One node of a layout snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    pub id: String,
    pub size: Size2D<f32>,
}

/// The node/edge snapshot a layout request is computed against. Detached
/// from the store so it can cross the host boundary unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutInput {
    pub nodes: Vec<LayoutNode>,
    /// (predecessor id, successor id) pairs.
    pub edges: Vec<(String, String)>,
}

impl LayoutInput {
    pub fn from_graph(graph: &DependencyGraph) -> Self {
        Self {
            nodes: graph
                .nodes()
                .map(|(_, node)| LayoutNode {
                    id: node.task.id.clone(),
                    size: node.size,
                })
                .collect(),
            edges: graph
                .edges()
                .map(|(_, edge, _, _)| (edge.predecessor_id.clone(), edge.successor_id.clone()))
                .collect(),
        }
    }
}

/// Strategy interface for synchronous placement algorithms.
pub trait LayoutAlgorithm {
    fn name(&self) -> &'static str;

    fn compute(
        &self,
        input: &LayoutInput,
        direction: LayoutDirection,
    ) -> Result<HashMap<String, Point2D<f32>>, LayoutError>;
}

/// Errors from a layout pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The host-side constraint solver failed or rejected the request.
    Solver(String),
}

impl std::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutError::Solver(e) => write!(f, "layout solver error: {e}"),
        }
    }
}

impl std::error::Error for LayoutError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutPhase {
    Idle,
    /// A solver round-trip is in flight.
    Computing {
        seq: u64,
        revision: u64,
        direction: LayoutDirection,
    },
    Applied {
        algorithm: LayoutAlgorithmKind,
    },
    Failed,
}

/// What a layout request resolved to.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LayoutOutcome {
    /// Positions ready to write back into the store.
    Applied {
        positions: HashMap<String, Point2D<f32>>,
    },
    /// The host must run its solver and feed the result back.
    Pending { request: SolveLayoutRequest },
    Failed { error: LayoutError },
}

/// The effect payload for a host-side solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveLayoutRequest {
    pub seq: u64,
    pub input: LayoutInput,
    pub direction: LayoutDirection,
}

pub struct LayoutOrchestrator {
    sync_algorithm: Box<dyn LayoutAlgorithm>,
    phase: LayoutPhase,
    next_seq: u64,
}

impl LayoutOrchestrator {
    pub fn new(layered: LayeredLayout) -> Self {
        Self {
            sync_algorithm: Box::new(layered),
            phase: LayoutPhase::Idle,
            next_seq: 1,
        }
    }

    pub fn phase(&self) -> &LayoutPhase {
        &self.phase
    }

    pub fn is_computing(&self) -> bool {
        matches!(self.phase, LayoutPhase::Computing { .. })
    }

    /// Start a layout pass. A new request supersedes any in-flight one —
    /// the superseded result will fail the sequence check and be discarded.
    pub(crate) fn request(
        &mut self,
        graph: &DependencyGraph,
        algorithm: LayoutAlgorithmKind,
        direction: LayoutDirection,
    ) -> LayoutOutcome {
        let input = LayoutInput::from_graph(graph);
        match algorithm {
            LayoutAlgorithmKind::Layered => self.run_sync(&input, direction, algorithm),
            LayoutAlgorithmKind::Constraint => {
                let seq = self.next_seq;
                self.next_seq = self.next_seq.saturating_add(1);
                self.phase = LayoutPhase::Computing {
                    seq,
                    revision: graph.revision(),
                    direction,
                };
                LayoutOutcome::Pending {
                    request: SolveLayoutRequest {
                        seq,
                        input,
                        direction,
                    },
                }
            }
        }
    }

    /// Apply a solver completion, or fall back to the layered algorithm.
    /// Returns None when the result is stale and nothing changed.
    pub(crate) fn solver_completed(
        &mut self,
        graph: &DependencyGraph,
        seq: u64,
        result: Result<HashMap<String, Point2D<f32>>, LayoutError>,
    ) -> Option<LayoutOutcome> {
        let LayoutPhase::Computing {
            seq: live_seq,
            revision,
            direction,
        } = self.phase
        else {
            log::debug!("dropping layout result #{seq}: no computation in flight");
            return None;
        };
        if seq != live_seq {
            log::debug!("dropping layout result #{seq}: superseded by #{live_seq}");
            return None;
        }
        if revision != graph.revision() {
            log::debug!("dropping layout result #{seq}: graph changed while solving");
            self.phase = LayoutPhase::Idle;
            return None;
        }

        match result {
            Ok(positions) => {
                self.phase = LayoutPhase::Applied {
                    algorithm: LayoutAlgorithmKind::Constraint,
                };
                Some(LayoutOutcome::Applied { positions })
            }
            Err(error) => {
                log::warn!(
                    "constraint layout failed ({error}); falling back to {}",
                    self.sync_algorithm.name()
                );
                let input = LayoutInput::from_graph(graph);
                Some(self.run_sync(&input, direction, LayoutAlgorithmKind::Layered))
            }
        }
    }

    fn run_sync(
        &mut self,
        input: &LayoutInput,
        direction: LayoutDirection,
        algorithm: LayoutAlgorithmKind,
    ) -> LayoutOutcome {
        match self.sync_algorithm.compute(input, direction) {
            Ok(positions) => {
                self.phase = LayoutPhase::Applied { algorithm };
                LayoutOutcome::Applied { positions }
            }
            Err(error) => {
                self.phase = LayoutPhase::Failed;
                LayoutOutcome::Failed { error }
            }
        }
    }
}
