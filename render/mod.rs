/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Render-packet derivation for the task canvas.
//!
//! The engine hands the host an owned `Scene` per frame: node and edge
//! sprites in graph space, the in-flight connection line, and HUD state.
//! Sprites carry style ids resolved through a closed kind→style registry
//! built once at engine construction — no string-keyed dispatch at draw
//! time.

pub mod materialize;
pub mod virtualize;

use euclid::default::{Point2D, Size2D, Vector2D};
use serde::Serialize;

use crate::graph::{DependencyGraph, DependencyKind, Node, NodeKind};
use crate::render::materialize::MaterializedSet;

/// Draw style for one node kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeStyle {
    pub style_id: &'static str,
    pub size: Size2D<f32>,
}

/// Draw style for one dependency kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeStyle {
    pub style_id: &'static str,
    /// Short label drawn on the edge ("FS", "SS", ...).
    pub label: &'static str,
    pub dashed: bool,
}

/// Closed kind→style mapping, resolved once at engine construction. Both
/// kind enums are closed sets, so lookups are total — there is no fallback
/// entry and no string-keyed dispatch.
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    task: NodeStyle,
    milestone: NodeStyle,
    finish_to_start: EdgeStyle,
    start_to_start: EdgeStyle,
    finish_to_finish: EdgeStyle,
    start_to_finish: EdgeStyle,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self {
            task: NodeStyle {
                style_id: "node:task",
                size: NodeKind::Task.sprite_size(),
            },
            milestone: NodeStyle {
                style_id: "node:milestone",
                size: NodeKind::Milestone.sprite_size(),
            },
            finish_to_start: EdgeStyle {
                style_id: "edge:finish_to_start",
                label: "FS",
                dashed: false,
            },
            start_to_start: EdgeStyle {
                style_id: "edge:start_to_start",
                label: "SS",
                dashed: true,
            },
            finish_to_finish: EdgeStyle {
                style_id: "edge:finish_to_finish",
                label: "FF",
                dashed: true,
            },
            start_to_finish: EdgeStyle {
                style_id: "edge:start_to_finish",
                label: "SF",
                dashed: true,
            },
        }
    }

    pub fn node_style(&self, kind: NodeKind) -> NodeStyle {
        match kind {
            NodeKind::Task => self.task,
            NodeKind::Milestone => self.milestone,
        }
    }

    pub fn edge_style(&self, kind: DependencyKind) -> EdgeStyle {
        match kind {
            DependencyKind::FinishToStart => self.finish_to_start,
            DependencyKind::StartToStart => self.start_to_start,
            DependencyKind::FinishToFinish => self.finish_to_finish,
            DependencyKind::StartToFinish => self.start_to_finish,
        }
    }
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Outgoing-connection anchor: center of the node's right edge.
pub fn output_anchor(node: &Node) -> Point2D<f32> {
    Point2D::new(
        node.position.x + node.size.width,
        node.position.y + node.size.height / 2.0,
    )
}

/// Incoming-connection anchor: center of the node's left edge.
pub fn input_anchor(node: &Node) -> Point2D<f32> {
    Point2D::new(node.position.x, node.position.y + node.size.height / 2.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSprite {
    pub id: String,
    pub title: String,
    pub position: Point2D<f32>,
    pub size: Size2D<f32>,
    pub style_id: &'static str,
    pub is_ready: bool,
    pub is_blocked: bool,
    pub on_critical_path: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeSprite {
    pub id: String,
    pub from: Point2D<f32>,
    pub to: Point2D<f32>,
    pub style_id: &'static str,
    pub label: &'static str,
    pub dashed: bool,
    pub selected: bool,
}

/// The in-flight drag-to-connect line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSprite {
    pub source_id: String,
    pub from: Point2D<f32>,
    pub to: Point2D<f32>,
    pub hovered_target_id: Option<String>,
}

/// One frame's render packet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub nodes: Vec<NodeSprite>,
    pub edges: Vec<EdgeSprite>,
    pub connection: Option<ConnectionSprite>,
    pub pan: Vector2D<f32>,
    pub zoom: f32,
    pub is_virtualized: bool,
    /// Progressive-reveal percentage, 100 when fully materialized.
    pub progress: u8,
    /// A remote round-trip or layout computation is in flight.
    pub busy: bool,
}

pub(crate) struct SceneInputs<'a> {
    pub graph: &'a DependencyGraph,
    pub materialized: &'a MaterializedSet,
    pub registry: &'a StyleRegistry,
    pub connection: Option<ConnectionSprite>,
    pub pan: Vector2D<f32>,
    pub zoom: f32,
    pub is_virtualized: bool,
    pub progress: u8,
    pub busy: bool,
}

pub(crate) fn derive_scene(inputs: SceneInputs<'_>) -> Scene {
    let SceneInputs {
        graph,
        materialized,
        registry,
        connection,
        pan,
        zoom,
        is_virtualized,
        progress,
        busy,
    } = inputs;

    let nodes = materialized
        .node_keys
        .iter()
        .filter_map(|key| graph.node(*key))
        .map(|node| {
            let style = registry.node_style(node.task.kind);
            NodeSprite {
                id: node.task.id.clone(),
                title: node.task.title.clone(),
                position: node.position,
                size: node.size,
                style_id: style.style_id,
                is_ready: node.is_ready,
                is_blocked: node.is_blocked,
                on_critical_path: node.on_critical_path,
            }
        })
        .collect();

    let edges = materialized
        .edge_keys
        .iter()
        .filter_map(|key| {
            let edge = graph.edge(*key)?;
            let (from_key, to_key) = graph.edge_endpoints(*key)?;
            let from = graph.node(from_key)?;
            let to = graph.node(to_key)?;
            let style = registry.edge_style(edge.kind);
            Some(EdgeSprite {
                id: edge.id.clone(),
                from: output_anchor(from),
                to: input_anchor(to),
                style_id: style.style_id,
                label: style.label,
                dashed: style.dashed,
                selected: edge.selected,
            })
        })
        .collect();

    Scene {
        nodes,
        edges,
        connection,
        pan,
        zoom,
        is_virtualized,
        progress,
        busy,
    }
}
