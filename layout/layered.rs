/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Synchronous layered layout.
//!
//! Ranks are assigned by longest path from the roots over a Kahn traversal,
//! then each rank is placed on a uniform grid: ranks advance along the
//! primary axis, nodes within a rank are centered on the cross axis.
//! Deterministic for a given input order. Nodes left over after the
//! traversal (a cycle in an unvalidated feed) land on one trailing rank
//! rather than being dropped.

use euclid::default::Point2D;
use std::collections::{HashMap, VecDeque};

use crate::layout::{LayoutAlgorithm, LayoutDirection, LayoutError, LayoutInput};

/// Cross-axis gap between neighboring nodes in a rank.
pub const DEFAULT_NODE_GAP: f32 = 48.0;

/// Primary-axis gap between consecutive ranks.
pub const DEFAULT_RANK_GAP: f32 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayeredLayout {
    pub node_gap: f32,
    pub rank_gap: f32,
}

impl Default for LayeredLayout {
    fn default() -> Self {
        Self {
            node_gap: DEFAULT_NODE_GAP,
            rank_gap: DEFAULT_RANK_GAP,
        }
    }
}

impl LayoutAlgorithm for LayeredLayout {
    fn name(&self) -> &'static str {
        "layered"
    }

    fn compute(
        &self,
        input: &LayoutInput,
        direction: LayoutDirection,
    ) -> Result<HashMap<String, Point2D<f32>>, LayoutError> {
        if input.nodes.is_empty() {
            return Ok(HashMap::new());
        }

        let index_of: HashMap<&str, usize> = input
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.as_str(), i))
            .collect();

        let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); input.nodes.len()];
        let mut indegree: Vec<usize> = vec![0; input.nodes.len()];
        for (from_id, to_id) in &input.edges {
            let (Some(&from), Some(&to)) = (index_of.get(from_id.as_str()), index_of.get(to_id.as_str()))
            else {
                log::debug!("layout edge references unknown node ({from_id} -> {to_id})");
                continue;
            };
            outgoing[from].push(to);
            indegree[to] += 1;
        }

        // Kahn traversal; rank = longest path from any root.
        let mut rank: Vec<usize> = vec![0; input.nodes.len()];
        let mut remaining = indegree.clone();
        let mut queue: VecDeque<usize> = (0..input.nodes.len())
            .filter(|&i| remaining[i] == 0)
            .collect();
        let mut visited: Vec<bool> = vec![false; input.nodes.len()];
        let mut max_rank = 0usize;
        while let Some(node) = queue.pop_front() {
            visited[node] = true;
            max_rank = max_rank.max(rank[node]);
            for &next in &outgoing[node] {
                rank[next] = rank[next].max(rank[node] + 1);
                remaining[next] -= 1;
                if remaining[next] == 0 {
                    queue.push_back(next);
                }
            }
        }

        // Cycle leftovers: one trailing rank, input order.
        let mut leftover = false;
        for (i, seen) in visited.iter().enumerate() {
            if !seen {
                rank[i] = max_rank + 1;
                leftover = true;
            }
        }
        if leftover {
            log::debug!("layered layout input contains a cycle; leftovers placed on a trailing rank");
        }

        // Uniform slot size across the whole graph keeps the grid regular.
        let slot_width = input
            .nodes
            .iter()
            .map(|n| n.size.width)
            .fold(0.0f32, f32::max)
            + self.node_gap;
        let slot_height = input
            .nodes
            .iter()
            .map(|n| n.size.height)
            .fold(0.0f32, f32::max)
            + self.node_gap;

        let mut by_rank: HashMap<usize, Vec<usize>> = HashMap::new();
        for (i, &r) in rank.iter().enumerate() {
            by_rank.entry(r).or_default().push(i);
        }

        let horizontal = matches!(
            direction,
            LayoutDirection::LeftRight | LayoutDirection::RightLeft
        );
        let (rank_extent, cross_slot) = if horizontal {
            (slot_width + self.rank_gap, slot_height)
        } else {
            (slot_height + self.rank_gap, slot_width)
        };

        let mut positions = HashMap::with_capacity(input.nodes.len());
        for (r, members) in by_rank {
            let primary = r as f32 * rank_extent;
            let span = members.len() as f32 * cross_slot;
            for (slot, &member) in members.iter().enumerate() {
                let cross = slot as f32 * cross_slot - span / 2.0;
                let (x, y) = match direction {
                    LayoutDirection::TopDown => (cross, primary),
                    LayoutDirection::BottomUp => (cross, -primary),
                    LayoutDirection::LeftRight => (primary, cross),
                    LayoutDirection::RightLeft => (-primary, cross),
                };
                positions.insert(input.nodes[member].id.clone(), Point2D::new(x, y));
            }
        }

        Ok(positions)
    }
}
