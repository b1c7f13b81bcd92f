/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Drag-to-connect state machine.
//!
//! `Idle → Dragging → Hovering? → Validating → Creating → Idle`, with a
//! `Rejected` display state for verdicts the user needs to read. Every
//! error path has an explicit return to `Idle` — the machine can never be
//! left stuck in a non-terminal state.
//!
//! The two remote round-trips (validate, create) are host-executed: the
//! machine hands out a sequence number with each request and discards any
//! completion whose sequence or store revision no longer matches. A
//! self-dependency drop is rejected locally, without a validator call.

use euclid::default::Point2D;

use crate::services::{DependencyCreateInput, DependencyValidation, TaskDependency};

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionPhase {
    Idle,
    /// Dragging from a node's output anchor; no target under the pointer.
    Dragging {
        source_id: String,
        cursor: Point2D<f32>,
    },
    /// Pointer is over a potential target node.
    Hovering {
        source_id: String,
        target_id: String,
        cursor: Point2D<f32>,
    },
    /// Waiting on the remote validator.
    Validating {
        seq: u64,
        revision: u64,
        source_id: String,
        target_id: String,
    },
    /// Verdict was valid; waiting on the create call.
    Creating {
        seq: u64,
        revision: u64,
        source_id: String,
        target_id: String,
    },
    /// Rejection notice held for a short display window.
    Rejected { notice: DependencyValidation },
}

/// What a pointer-up resolved to.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DropAction {
    /// No gesture was in progress.
    None,
    /// Dropped over empty space; gesture cancelled with no side effects.
    Cancelled,
    /// Self-dependency, rejected locally. The notice is in the phase.
    RejectedLocally,
    /// The host must call the remote validator.
    Validate {
        seq: u64,
        predecessor_id: String,
        successor_id: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ValidationAction {
    /// Sequence or revision mismatch; nothing changed.
    Stale,
    /// Verdict valid: the host must issue the create call.
    Create {
        seq: u64,
        input: DependencyCreateInput,
    },
    /// Verdict invalid (or transport failed); notice is in the phase.
    Rejected,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CreateAction {
    Stale,
    /// The dependency exists server-side. `insert` is false when the store
    /// was rebuilt mid-flight — the next feed will carry the edge instead.
    Committed {
        dependency: TaskDependency,
        insert: bool,
    },
    /// Transport failed; notice is in the phase. No edge was confirmed.
    Failed,
}

#[derive(Debug)]
pub struct ConnectionMachine {
    phase: ConnectionPhase,
    next_seq: u64,
}

impl ConnectionMachine {
    pub fn new() -> Self {
        Self {
            phase: ConnectionPhase::Idle,
            next_seq: 1,
        }
    }

    pub fn phase(&self) -> &ConnectionPhase {
        &self.phase
    }

    /// A remote round-trip is in flight (drives the loading indicator).
    pub fn is_busy(&self) -> bool {
        matches!(
            self.phase,
            ConnectionPhase::Validating { .. } | ConnectionPhase::Creating { .. }
        )
    }

    /// The active gesture, if any: (source, cursor, hovered target).
    pub fn gesture(&self) -> Option<(&str, Point2D<f32>, Option<&str>)> {
        match &self.phase {
            ConnectionPhase::Dragging { source_id, cursor } => Some((source_id, *cursor, None)),
            ConnectionPhase::Hovering {
                source_id,
                target_id,
                cursor,
            } => Some((source_id, *cursor, Some(target_id.as_str()))),
            _ => None,
        }
    }

    /// The rejection notice currently on display, if any.
    pub fn rejection(&self) -> Option<&DependencyValidation> {
        match &self.phase {
            ConnectionPhase::Rejected { notice } => Some(notice),
            _ => None,
        }
    }

    /// Pointer-down on a node's output anchor. Returns whether a gesture
    /// started; ignored while a round-trip is in flight.
    pub(crate) fn begin_drag(&mut self, source_id: &str, cursor: Point2D<f32>) -> bool {
        if self.is_busy() {
            log::debug!("ignoring drag start on {source_id}: round-trip in flight");
            return false;
        }
        // A new gesture clears any rejection notice still on display.
        self.phase = ConnectionPhase::Dragging {
            source_id: source_id.to_string(),
            cursor,
        };
        true
    }

    pub(crate) fn move_cursor(&mut self, cursor: Point2D<f32>) {
        match &mut self.phase {
            ConnectionPhase::Dragging { cursor: c, .. }
            | ConnectionPhase::Hovering { cursor: c, .. } => *c = cursor,
            _ => {}
        }
    }

    /// Pointer entered a node's bounds while dragging. The source itself is
    /// tracked too, so a drop on it can be rejected as a self-dependency.
    pub(crate) fn hover_enter(&mut self, target_id: &str) {
        match &self.phase {
            ConnectionPhase::Dragging { source_id, cursor }
            | ConnectionPhase::Hovering {
                source_id, cursor, ..
            } => {
                self.phase = ConnectionPhase::Hovering {
                    source_id: source_id.clone(),
                    target_id: target_id.to_string(),
                    cursor: *cursor,
                };
            }
            _ => {}
        }
    }

    /// Pointer left the hovered node's bounds.
    pub(crate) fn hover_leave(&mut self) {
        if let ConnectionPhase::Hovering {
            source_id, cursor, ..
        } = &self.phase
        {
            self.phase = ConnectionPhase::Dragging {
                source_id: source_id.clone(),
                cursor: *cursor,
            };
        }
    }

    /// Pointer-up. `revision` is the store revision the validation request
    /// will be checked against when its result lands.
    pub(crate) fn drop_gesture(&mut self, revision: u64) -> DropAction {
        match std::mem::replace(&mut self.phase, ConnectionPhase::Idle) {
            ConnectionPhase::Dragging { .. } => DropAction::Cancelled,
            ConnectionPhase::Hovering {
                source_id,
                target_id,
                ..
            } => {
                if source_id == target_id {
                    self.phase = ConnectionPhase::Rejected {
                        notice: DependencyValidation::self_dependency(&source_id),
                    };
                    return DropAction::RejectedLocally;
                }
                let seq = self.next_seq;
                self.next_seq = self.next_seq.saturating_add(1);
                self.phase = ConnectionPhase::Validating {
                    seq,
                    revision,
                    source_id: source_id.clone(),
                    target_id: target_id.clone(),
                };
                DropAction::Validate {
                    seq,
                    predecessor_id: source_id,
                    successor_id: target_id,
                }
            }
            other => {
                self.phase = other;
                DropAction::None
            }
        }
    }

    /// Explicit cancel (escape key). Clears any gesture or notice with no
    /// side effects; an in-flight completion will land as stale.
    pub(crate) fn cancel(&mut self) {
        self.phase = ConnectionPhase::Idle;
    }

    /// Host timer dismissing the rejection display window.
    pub(crate) fn dismiss_rejection(&mut self) {
        if matches!(self.phase, ConnectionPhase::Rejected { .. }) {
            self.phase = ConnectionPhase::Idle;
        }
    }

    /// Validator round-trip completed. Transport failure is an `Err` with a
    /// message — treated as a rejection with a generic notice, never
    /// swallowed and never left hanging.
    pub(crate) fn validation_completed(
        &mut self,
        seq: u64,
        current_revision: u64,
        result: Result<DependencyValidation, String>,
    ) -> ValidationAction {
        let ConnectionPhase::Validating {
            seq: live_seq,
            revision,
            source_id,
            target_id,
        } = &self.phase
        else {
            log::debug!("dropping validation result #{seq}: no validation in flight");
            return ValidationAction::Stale;
        };
        if seq != *live_seq {
            log::debug!("dropping validation result #{seq}: superseded");
            return ValidationAction::Stale;
        }
        if *revision != current_revision {
            log::debug!("dropping validation result #{seq}: graph changed");
            self.phase = ConnectionPhase::Idle;
            return ValidationAction::Stale;
        }

        let (source_id, target_id) = (source_id.clone(), target_id.clone());
        match result {
            Ok(verdict) if verdict.is_valid => {
                self.phase = ConnectionPhase::Creating {
                    seq,
                    revision: current_revision,
                    source_id: source_id.clone(),
                    target_id: target_id.clone(),
                };
                ValidationAction::Create {
                    seq,
                    input: DependencyCreateInput {
                        predecessor_id: source_id,
                        successor_id: target_id,
                        dependency_type: None,
                    },
                }
            }
            Ok(verdict) => {
                self.phase = ConnectionPhase::Rejected { notice: verdict };
                ValidationAction::Rejected
            }
            Err(message) => {
                log::warn!("validate {source_id} -> {target_id} transport failure: {message}");
                self.phase = ConnectionPhase::Rejected {
                    notice: DependencyValidation::transport_failure(),
                };
                ValidationAction::Rejected
            }
        }
    }

    /// Create round-trip completed.
    pub(crate) fn create_completed(
        &mut self,
        seq: u64,
        current_revision: u64,
        result: Result<TaskDependency, String>,
    ) -> CreateAction {
        let ConnectionPhase::Creating {
            seq: live_seq,
            revision,
            source_id,
            target_id,
        } = &self.phase
        else {
            log::debug!("dropping create result #{seq}: no create in flight");
            return CreateAction::Stale;
        };
        if seq != *live_seq {
            log::debug!("dropping create result #{seq}: superseded");
            return CreateAction::Stale;
        }
        let fresh = *revision == current_revision;
        let (source_id, target_id) = (source_id.clone(), target_id.clone());

        match result {
            Ok(dependency) => {
                self.phase = ConnectionPhase::Idle;
                CreateAction::Committed {
                    dependency,
                    insert: fresh,
                }
            }
            Err(message) => {
                log::warn!("create {source_id} -> {target_id} transport failure: {message}");
                self.phase = ConnectionPhase::Rejected {
                    notice: DependencyValidation::transport_failure(),
                };
                CreateAction::Failed
            }
        }
    }

    /// Called after a store rebuild: a gesture whose endpoints vanished is
    /// cancelled; in-flight round-trips are left for the revision guard.
    pub(crate) fn prune_missing_nodes(&mut self, exists: impl Fn(&str) -> bool) {
        let cancel = match &self.phase {
            ConnectionPhase::Dragging { source_id, .. } => !exists(source_id),
            ConnectionPhase::Hovering {
                source_id,
                target_id,
                ..
            } => !exists(source_id) || !exists(target_id),
            _ => false,
        };
        if cancel {
            self.phase = ConnectionPhase::Idle;
        }
    }
}

impl Default for ConnectionMachine {
    fn default() -> Self {
        Self::new()
    }
}
