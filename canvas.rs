/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The canvas facade: one reducer over every interaction state machine.
//!
//! The host drives the engine with `CanvasIntent`s (pointer events, key
//! presses, frame ticks, completed remote calls) and drains `CanvasEffect`s
//! after each application: remote calls to execute, confirmations to show,
//! and notifications of committed user intent. All reducers are synchronous;
//! the only suspension points live on the host side of the effect queue.
//!
//! Collaborator completions carry the sequence number of the request they
//! answer. A completion whose sequence or store revision no longer matches
//! is discarded — "snapshot + compare-before-apply" instead of locks.

use euclid::default::{Point2D, Rect, Size2D, Vector2D};
use std::collections::HashMap;

use crate::graph::{
    DependencyGraph, DependencyKind, GraphFilters, GraphInsights, TaskSnapshot,
};
use crate::interaction::bulk::{BulkEditKind, BulkOperation, BulkOutcome};
use crate::interaction::connect::{
    ConnectionMachine, ConnectionPhase, CreateAction, DropAction, ValidationAction,
};
use crate::interaction::selection::EdgeSelection;
use crate::layout::layered::LayeredLayout;
use crate::layout::{
    LayoutAlgorithmKind, LayoutDirection, LayoutError, LayoutOrchestrator, LayoutOutcome,
    LayoutPhase, SolveLayoutRequest,
};
use crate::render::materialize::{MaterializeConfig, Materializer};
use crate::render::virtualize::{visible_set, VirtualizeConfig};
use crate::render::{
    derive_scene, output_anchor, ConnectionSprite, Scene, SceneInputs, StyleRegistry,
};
use crate::services::{DependencyCreateInput, DependencyValidation, TaskDependency};
use crate::viewport::Viewport;

/// Engine construction parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasConfig {
    pub screen_size: Size2D<f32>,
    pub virtualize: VirtualizeConfig,
    pub materialize: MaterializeConfig,
    pub layered: LayeredLayout,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            screen_size: Size2D::new(1280.0, 720.0),
            virtualize: VirtualizeConfig::default(),
            materialize: MaterializeConfig::default(),
            layered: LayeredLayout::default(),
        }
    }
}

/// Discrete events driving the engine. Pointer coordinates arrive in screen
/// space and are projected through the viewport; `DragNode` positions are
/// already in graph space (the host resolves the drag against the sprite it
/// started on).
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasIntent {
    Resize { size: Size2D<f32> },
    Pan { delta: Vector2D<f32> },
    ZoomAbout { anchor: Point2D<f32>, factor: f32 },
    SetZoom { zoom: f32 },
    FitToScreen,
    FrameTick,

    ClickTask { id: String },
    DragNode { id: String, position: Point2D<f32> },

    BeginConnection { source_id: String, screen: Point2D<f32> },
    PointerMove { screen: Point2D<f32> },
    PointerEnterNode { id: String },
    PointerLeaveNode,
    PointerUp,
    Escape,
    DismissRejection,
    ValidationCompleted {
        seq: u64,
        result: Result<DependencyValidation, String>,
    },
    CreateCompleted {
        seq: u64,
        result: Result<TaskDependency, String>,
    },

    ClickEdge { id: String, multi: bool },
    SetMultiSelect { enabled: bool },
    ClearSelection,
    DeleteKey,
    ConfirmBulkDelete,
    RequestBulkRetype { kind: DependencyKind },
    DeleteCompleted {
        id: String,
        result: Result<(), String>,
    },
    RetypeCompleted {
        id: String,
        result: Result<(), String>,
    },

    RequestLayout {
        algorithm: LayoutAlgorithmKind,
        direction: LayoutDirection,
    },
    LayoutSolved {
        seq: u64,
        result: Result<HashMap<String, Point2D<f32>>, String>,
    },
}

/// Work the host must perform, drained after each intent application.
/// Command effects carry everything needed to issue the remote call;
/// notification effects report user intent the engine already committed.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEffect {
    ValidateDependency {
        seq: u64,
        predecessor_id: String,
        successor_id: String,
    },
    CreateDependency {
        seq: u64,
        input: DependencyCreateInput,
    },
    DeleteDependency { id: String },
    RetypeDependency { id: String, kind: DependencyKind },
    SolveLayout { request: SolveLayoutRequest },
    RequestDeleteConfirmation { count: usize },
    /// Another materialization batch wants an animation frame.
    ScheduleFrame,

    DependencyAdded {
        predecessor_id: String,
        successor_id: String,
    },
    DependencyRemoved { id: String },
    TaskClicked { id: String },
    BulkCompleted { outcome: BulkOutcome },
    LayoutFailed { message: String },
}

pub struct GraphCanvas {
    graph: DependencyGraph,
    viewport: Viewport,
    virtualize: VirtualizeConfig,
    materializer: Materializer,
    connection: ConnectionMachine,
    selection: EdgeSelection,
    bulk: Option<BulkOperation>,
    layout: LayoutOrchestrator,
    styles: StyleRegistry,
    effects: Vec<CanvasEffect>,
}

impl GraphCanvas {
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            graph: DependencyGraph::new(),
            viewport: Viewport::new(config.screen_size),
            virtualize: config.virtualize,
            materializer: Materializer::new(config.materialize),
            connection: ConnectionMachine::new(),
            selection: EdgeSelection::new(),
            bulk: None,
            layout: LayoutOrchestrator::new(config.layered),
            styles: StyleRegistry::new(),
            effects: Vec::new(),
        }
    }

    /// Rebuild the store from the source feed. Stale in-flight results are
    /// invalidated by the revision bump; gestures whose nodes vanished are
    /// cancelled; selection is pruned to surviving edges.
    pub fn rebuild(
        &mut self,
        tasks: &[TaskSnapshot],
        dependencies: &[TaskDependency],
        filters: &GraphFilters,
        insights: Option<&GraphInsights>,
    ) {
        self.graph.rebuild(tasks, dependencies, filters, insights);
        self.selection.retain_existing(&self.graph);
        let graph = &self.graph;
        self.connection
            .prune_missing_nodes(|id| graph.contains_node_id(id));
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn selection(&self) -> &EdgeSelection {
        &self.selection
    }

    pub fn connection_phase(&self) -> &ConnectionPhase {
        self.connection.phase()
    }

    pub fn layout_phase(&self) -> &LayoutPhase {
        self.layout.phase()
    }

    /// Effects accumulated since the last drain, in emission order.
    pub fn drain_effects(&mut self) -> Vec<CanvasEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Apply a batch of intents in order.
    pub fn apply_intents<I>(&mut self, intents: I)
    where
        I: IntoIterator<Item = CanvasIntent>,
    {
        for intent in intents {
            self.apply(intent);
        }
    }

    pub fn apply(&mut self, intent: CanvasIntent) {
        match intent {
            CanvasIntent::Resize { size } => self.viewport.resize(size),
            CanvasIntent::Pan { delta } => self.viewport.pan_by(delta),
            CanvasIntent::ZoomAbout { anchor, factor } => {
                self.viewport.zoom_about(anchor, factor);
            }
            CanvasIntent::SetZoom { zoom } => self.viewport.set_zoom(zoom),
            CanvasIntent::FitToScreen => self.fit_to_screen(),
            CanvasIntent::FrameTick => {
                if self.materializer.tick() && !self.materializer.is_complete() {
                    self.schedule_frame();
                }
            }

            CanvasIntent::ClickTask { id } => {
                if self.graph.contains_node_id(&id) {
                    self.effects.push(CanvasEffect::TaskClicked { id });
                }
            }
            CanvasIntent::DragNode { id, position } => {
                self.graph.set_node_position(&id, position);
            }

            CanvasIntent::BeginConnection { source_id, screen } => {
                if !self.graph.contains_node_id(&source_id) {
                    log::debug!("connection drag from unknown node {source_id}");
                    return;
                }
                let cursor = self.viewport.screen_to_graph(screen);
                self.connection.begin_drag(&source_id, cursor);
            }
            CanvasIntent::PointerMove { screen } => {
                let cursor = self.viewport.screen_to_graph(screen);
                self.connection.move_cursor(cursor);
            }
            CanvasIntent::PointerEnterNode { id } => {
                if self.graph.contains_node_id(&id) {
                    self.connection.hover_enter(&id);
                }
            }
            CanvasIntent::PointerLeaveNode => self.connection.hover_leave(),
            CanvasIntent::PointerUp => {
                match self.connection.drop_gesture(self.graph.revision()) {
                    DropAction::Validate {
                        seq,
                        predecessor_id,
                        successor_id,
                    } => self.effects.push(CanvasEffect::ValidateDependency {
                        seq,
                        predecessor_id,
                        successor_id,
                    }),
                    DropAction::None | DropAction::Cancelled | DropAction::RejectedLocally => {}
                }
            }
            CanvasIntent::Escape => self.connection.cancel(),
            CanvasIntent::DismissRejection => self.connection.dismiss_rejection(),
            CanvasIntent::ValidationCompleted { seq, result } => {
                let revision = self.graph.revision();
                match self.connection.validation_completed(seq, revision, result) {
                    ValidationAction::Create { seq, input } => {
                        self.effects
                            .push(CanvasEffect::CreateDependency { seq, input });
                    }
                    ValidationAction::Stale | ValidationAction::Rejected => {}
                }
            }
            CanvasIntent::CreateCompleted { seq, result } => {
                let revision = self.graph.revision();
                match self.connection.create_completed(seq, revision, result) {
                    CreateAction::Committed { dependency, insert } => {
                        if insert {
                            self.graph.insert_edge(&dependency);
                        }
                        self.effects.push(CanvasEffect::DependencyAdded {
                            predecessor_id: dependency.predecessor_id,
                            successor_id: dependency.successor_id,
                        });
                    }
                    CreateAction::Stale | CreateAction::Failed => {}
                }
            }

            CanvasIntent::ClickEdge { id, multi } => {
                if self.graph.edge_by_id(&id).is_none() {
                    return;
                }
                if multi || self.selection.is_multi_select() {
                    self.selection.toggle(&id);
                } else {
                    self.selection.select_single(&id);
                }
            }
            CanvasIntent::SetMultiSelect { enabled } => {
                self.selection.set_multi_select(enabled);
            }
            CanvasIntent::ClearSelection => self.selection.clear(),
            CanvasIntent::DeleteKey => {
                if self.bulk.is_some() {
                    log::debug!("ignoring delete: bulk operation in flight");
                    return;
                }
                if self.selection.is_empty() {
                    return;
                }
                self.effects.push(CanvasEffect::RequestDeleteConfirmation {
                    count: self.selection.len(),
                });
            }
            CanvasIntent::ConfirmBulkDelete => {
                self.start_bulk(BulkEditKind::Delete);
            }
            CanvasIntent::RequestBulkRetype { kind } => {
                self.start_bulk(BulkEditKind::Retype(kind));
            }
            CanvasIntent::DeleteCompleted { id, result } => {
                self.bulk_item_completed(&id, result, BulkItemKind::Delete);
            }
            CanvasIntent::RetypeCompleted { id, result } => {
                self.bulk_item_completed(&id, result, BulkItemKind::Retype);
            }

            CanvasIntent::RequestLayout {
                algorithm,
                direction,
            } => {
                let outcome = self.layout.request(&self.graph, algorithm, direction);
                self.finish_layout(outcome);
            }
            CanvasIntent::LayoutSolved { seq, result } => {
                let result = result.map_err(LayoutError::Solver);
                if let Some(outcome) = self.layout.solver_completed(&self.graph, seq, result) {
                    self.finish_layout(outcome);
                }
            }
        }
    }

    /// Derive the current frame's render packet. Also advances the
    /// materializer's bookkeeping against the current visible set and, when
    /// the reveal is unfinished, asks the host for another frame.
    pub fn scene(&mut self) -> Scene {
        let visible = visible_set(&self.graph, &self.viewport, &self.virtualize);
        self.materializer.sync(&visible);
        if !self.materializer.is_complete() {
            self.schedule_frame();
        }

        self.graph.sync_selection(self.selection.id_set());
        let materialized = self.materializer.materialize(&self.graph, &visible);

        let connection = self.connection.gesture().and_then(|(source, cursor, target)| {
            let (_, node) = self.graph.node_by_id(source)?;
            Some(ConnectionSprite {
                source_id: source.to_string(),
                from: output_anchor(node),
                to: cursor,
                hovered_target_id: target.map(str::to_string),
            })
        });

        let busy =
            self.connection.is_busy() || self.layout.is_computing() || self.bulk.is_some();

        derive_scene(SceneInputs {
            graph: &self.graph,
            materialized: &materialized,
            registry: &self.styles,
            connection,
            pan: self.viewport.pan(),
            zoom: self.viewport.zoom(),
            is_virtualized: visible.is_virtualized,
            progress: self.materializer.progress(),
            busy,
        })
    }

    fn fit_to_screen(&mut self) {
        let bounds = self
            .graph
            .bounding_rect()
            .unwrap_or_else(|| Rect::new(Point2D::zero(), Size2D::zero()));
        self.viewport.fit_to_rect(bounds);
    }

    fn schedule_frame(&mut self) {
        if !self
            .effects
            .iter()
            .any(|e| matches!(e, CanvasEffect::ScheduleFrame))
        {
            self.effects.push(CanvasEffect::ScheduleFrame);
        }
    }

    fn start_bulk(&mut self, kind: BulkEditKind) {
        if self.bulk.is_some() {
            log::debug!("ignoring bulk request: operation already in flight");
            return;
        }
        if self.selection.is_empty() {
            return;
        }
        let ids: Vec<String> = self.selection.iter().map(str::to_string).collect();
        for id in &ids {
            match kind {
                BulkEditKind::Delete => self
                    .effects
                    .push(CanvasEffect::DeleteDependency { id: id.clone() }),
                BulkEditKind::Retype(dependency_kind) => {
                    self.effects.push(CanvasEffect::RetypeDependency {
                        id: id.clone(),
                        kind: dependency_kind,
                    });
                }
            }
        }
        self.bulk = Some(BulkOperation::new(kind, ids));
    }

    fn bulk_item_completed(
        &mut self,
        id: &str,
        result: Result<(), String>,
        item_kind: BulkItemKind,
    ) {
        let Some(op) = self.bulk.as_mut() else {
            log::debug!("dropping bulk completion for {id}: no operation in flight");
            return;
        };
        let expected = match (op.kind(), item_kind) {
            (BulkEditKind::Delete, BulkItemKind::Delete) => true,
            (BulkEditKind::Retype(_), BulkItemKind::Retype) => true,
            _ => false,
        };
        if !expected {
            log::debug!("dropping bulk completion for {id}: kind mismatch");
            return;
        }

        match result {
            Ok(()) => {
                if op.complete(id) {
                    match op.kind() {
                        BulkEditKind::Delete => {
                            self.graph.remove_edge_by_id(id);
                            self.selection.remove(id);
                            self.effects
                                .push(CanvasEffect::DependencyRemoved { id: id.to_string() });
                        }
                        BulkEditKind::Retype(kind) => {
                            self.graph.retype_edge(id, kind);
                        }
                    }
                }
            }
            Err(message) => {
                log::warn!("bulk item {id} failed: {message}");
                op.fail(id);
            }
        }

        let settled = self
            .bulk
            .as_ref()
            .and_then(BulkOperation::outcome);
        if let Some(outcome) = settled {
            self.effects.push(CanvasEffect::BulkCompleted { outcome });
            if outcome.failed == 0 {
                self.selection.clear();
            }
            self.bulk = None;
        }
    }

    fn finish_layout(&mut self, outcome: LayoutOutcome) {
        match outcome {
            LayoutOutcome::Applied { positions } => {
                self.graph.apply_positions(&positions);
                self.fit_to_screen();
            }
            LayoutOutcome::Pending { request } => {
                self.effects.push(CanvasEffect::SolveLayout { request });
            }
            LayoutOutcome::Failed { error } => {
                self.effects.push(CanvasEffect::LayoutFailed {
                    message: error.to_string(),
                });
            }
        }
    }
}

impl Default for GraphCanvas {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BulkItemKind {
    Delete,
    Retype,
}
