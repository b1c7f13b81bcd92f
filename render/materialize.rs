/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Progressive materialization: reveal a large visible set in fixed-size
//! batches across animation frames so the first paint stays fast.
//!
//! The materializer is frame-paced, never loop-blocking: each tick reveals
//! one batch and the canvas requests another frame until the run completes.
//! A change to the input set (detected by an order-insensitive signature)
//! resets progress to zero and starts a fresh run.

use std::collections::HashSet;
use std::hash::{DefaultHasher, Hash, Hasher};

use crate::graph::{DependencyGraph, EdgeKey, NodeKey};
use crate::render::virtualize::VisibleSet;

/// Nodes revealed per animation-frame tick.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Input size above which batching activates; smaller sets render at once.
pub const DEFAULT_ACTIVATION_THRESHOLD: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterializeConfig {
    pub batch_size: usize,
    pub activation_threshold: usize,
}

impl Default for MaterializeConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            activation_threshold: DEFAULT_ACTIVATION_THRESHOLD,
        }
    }
}

#[derive(Debug)]
pub struct Materializer {
    config: MaterializeConfig,
    signature: u64,
    total: usize,
    revealed: usize,
}

impl Materializer {
    pub fn new(config: MaterializeConfig) -> Self {
        Self {
            config,
            signature: 0,
            total: 0,
            revealed: 0,
        }
    }

    /// Align with the current visible set. A changed input resets the run;
    /// an unchanged input keeps the current progress.
    pub fn sync(&mut self, visible: &VisibleSet) {
        let signature = signature_of(&visible.node_keys);
        if signature == self.signature && visible.node_keys.len() == self.total {
            return;
        }
        self.signature = signature;
        self.total = visible.node_keys.len();
        self.revealed = if self.total > self.config.activation_threshold {
            self.config.batch_size.min(self.total)
        } else {
            self.total
        };
    }

    /// Reveal the next batch. Returns whether anything new was revealed.
    pub fn tick(&mut self) -> bool {
        if self.revealed >= self.total {
            return false;
        }
        self.revealed = (self.revealed + self.config.batch_size).min(self.total);
        true
    }

    pub fn is_complete(&self) -> bool {
        self.revealed >= self.total
    }

    /// Percentage of the input revealed so far, 0–100. Monotonically
    /// non-decreasing within a single run.
    pub fn progress(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.revealed * 100) / self.total) as u8
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed
    }

    /// Project the visible set down to the revealed prefix. Edges are kept
    /// only when both endpoints are already revealed.
    pub fn materialize(&self, graph: &DependencyGraph, visible: &VisibleSet) -> MaterializedSet {
        let node_keys: Vec<NodeKey> = visible
            .node_keys
            .iter()
            .take(self.revealed)
            .copied()
            .collect();
        let revealed: HashSet<NodeKey> = node_keys.iter().copied().collect();
        let edge_keys: Vec<EdgeKey> = visible
            .edge_keys
            .iter()
            .filter(|key| {
                graph
                    .edge_endpoints(**key)
                    .is_some_and(|(from, to)| revealed.contains(&from) && revealed.contains(&to))
            })
            .copied()
            .collect();
        MaterializedSet {
            node_keys,
            edge_keys,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterializedSet {
    pub node_keys: Vec<NodeKey>,
    pub edge_keys: Vec<EdgeKey>,
}

/// Order-insensitive signature of a key set, so a reordered-but-equal
/// virtualizer output does not restart the reveal.
fn signature_of(keys: &[NodeKey]) -> u64 {
    let mut combined = 0u64;
    for key in keys {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        combined = combined.wrapping_add(hasher.finish());
    }
    combined
}
