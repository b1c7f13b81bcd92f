/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Edge (dependency) selection state.
//!
//! Single-select replaces the whole set and leaves multi-select mode;
//! multi-select toggles membership of one id at a time. Selection order is
//! preserved for stable iteration.

use std::collections::HashSet;

use crate::graph::DependencyGraph;

#[derive(Debug, Default)]
pub struct EdgeSelection {
    ids: HashSet<String>,
    order: Vec<String>,
    multi_select: bool,
    revision: u64,
}

impl EdgeSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic revision incremented whenever the selection changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_multi_select(&self) -> bool {
        self.multi_select
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Selected ids in selection order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub(crate) fn id_set(&self) -> &HashSet<String> {
        &self.ids
    }

    /// Replace the selection with one edge and exit multi-select mode.
    pub fn select_single(&mut self, id: &str) {
        self.ids.clear();
        self.order.clear();
        self.ids.insert(id.to_string());
        self.order.push(id.to_string());
        self.multi_select = false;
        self.revision = self.revision.saturating_add(1);
    }

    /// Toggle one edge's membership; enters multi-select mode.
    pub fn toggle(&mut self, id: &str) {
        self.multi_select = true;
        if self.ids.remove(id) {
            self.order.retain(|existing| existing != id);
        } else {
            self.ids.insert(id.to_string());
            self.order.push(id.to_string());
        }
        self.revision = self.revision.saturating_add(1);
    }

    /// Explicit multi-select mode toggle; does not touch membership.
    pub fn set_multi_select(&mut self, enabled: bool) {
        if self.multi_select != enabled {
            self.multi_select = enabled;
            self.revision = self.revision.saturating_add(1);
        }
    }

    /// Empty the set and exit multi-select mode.
    pub fn clear(&mut self) {
        if self.ids.is_empty() && !self.multi_select {
            return;
        }
        self.ids.clear();
        self.order.clear();
        self.multi_select = false;
        self.revision = self.revision.saturating_add(1);
    }

    /// Remove one id, keeping the current mode (used as bulk deletions land).
    pub(crate) fn remove(&mut self, id: &str) {
        if self.ids.remove(id) {
            self.order.retain(|existing| existing != id);
            self.revision = self.revision.saturating_add(1);
        }
    }

    /// Drop ids that no longer resolve to an edge after a store rebuild.
    pub(crate) fn retain_existing(&mut self, graph: &DependencyGraph) {
        let before = self.ids.len();
        self.order.retain(|id| graph.edge_by_id(id).is_some());
        self.ids.retain(|id| graph.edge_by_id(id).is_some());
        if self.ids.len() != before {
            self.revision = self.revision.saturating_add(1);
        }
    }
}
