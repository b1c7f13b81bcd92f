/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Viewport virtualization: cull the store down to the nodes whose bounding
//! rectangles intersect the padded visible rectangle, then keep only edges
//! with both endpoints visible (an edge dangling into empty space is hidden
//! even when one endpoint is on screen).
//!
//! A plain O(nodes) scan per call — cheap enough to run on every pan/zoom
//! tick at the scale this canvas targets, so no spatial index is kept.

use euclid::default::Rect;
use std::collections::HashSet;

use crate::graph::{DependencyGraph, EdgeKey, NodeKey};
use crate::viewport::Viewport;

/// Node count at or below which virtualization is skipped entirely.
pub const DEFAULT_VIRTUALIZE_THRESHOLD: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualizeConfig {
    pub threshold: usize,
}

impl Default for VirtualizeConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_VIRTUALIZE_THRESHOLD,
        }
    }
}

/// The virtualizer's output: keys into the store, in store iteration order.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleSet {
    pub node_keys: Vec<NodeKey>,
    pub edge_keys: Vec<EdgeKey>,
    pub is_virtualized: bool,
}

/// Inclusive AABB overlap. Rectangles that merely touch still count as
/// intersecting, so nodes sitting exactly on the padded boundary render.
fn rects_overlap(a: &Rect<f32>, b: &Rect<f32>) -> bool {
    a.origin.x <= b.max_x()
        && b.origin.x <= a.max_x()
        && a.origin.y <= b.max_y()
        && b.origin.y <= a.max_y()
}

/// Compute the visible subset of the graph for the current viewport.
pub fn visible_set(
    graph: &DependencyGraph,
    viewport: &Viewport,
    config: &VirtualizeConfig,
) -> VisibleSet {
    if graph.node_count() <= config.threshold {
        return VisibleSet {
            node_keys: graph.nodes().map(|(key, _)| key).collect(),
            edge_keys: graph.edges().map(|(key, ..)| key).collect(),
            is_virtualized: false,
        };
    }

    let window = viewport.visible_rect();
    let mut node_keys = Vec::new();
    let mut kept: HashSet<NodeKey> = HashSet::new();
    for (key, node) in graph.nodes() {
        if rects_overlap(&node.rect(), &window) {
            node_keys.push(key);
            kept.insert(key);
        }
    }

    let edge_keys = graph
        .edges()
        .filter(|(_, _, from, to)| kept.contains(from) && kept.contains(to))
        .map(|(key, ..)| key)
        .collect();

    VisibleSet {
        node_keys,
        edge_keys,
        is_virtualized: true,
    }
}
