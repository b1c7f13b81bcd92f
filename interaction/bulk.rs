/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Bulk edit bookkeeping: one in-flight delete or retype operation over the
//! current selection, with independent per-id outcomes. A failing id never
//! aborts the batch — succeeded mutations stay applied and the remainder is
//! reported when the last outcome lands.

use std::collections::HashSet;

use crate::graph::DependencyKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkEditKind {
    Delete,
    Retype(DependencyKind),
}

/// Final tally of a settled bulk operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkOutcome {
    pub requested: usize,
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug)]
pub struct BulkOperation {
    kind: BulkEditKind,
    requested: usize,
    pending: HashSet<String>,
    succeeded: Vec<String>,
    failed: Vec<String>,
}

impl BulkOperation {
    pub fn new(kind: BulkEditKind, ids: Vec<String>) -> Self {
        let pending: HashSet<String> = ids.into_iter().collect();
        Self {
            kind,
            requested: pending.len(),
            pending,
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn kind(&self) -> BulkEditKind {
        self.kind
    }

    /// Record one id's success. Returns false for an id this operation
    /// never asked about (a stray completion).
    pub fn complete(&mut self, id: &str) -> bool {
        if !self.pending.remove(id) {
            return false;
        }
        self.succeeded.push(id.to_string());
        true
    }

    /// Record one id's failure.
    pub fn fail(&mut self, id: &str) -> bool {
        if !self.pending.remove(id) {
            return false;
        }
        self.failed.push(id.to_string());
        true
    }

    pub fn is_settled(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn failed_ids(&self) -> &[String] {
        &self.failed
    }

    /// The tally, once every id has reported back.
    pub fn outcome(&self) -> Option<BulkOutcome> {
        if !self.is_settled() {
            return None;
        }
        Some(BulkOutcome {
            requested: self.requested,
            succeeded: self.succeeded.len(),
            failed: self.failed.len(),
        })
    }
}
