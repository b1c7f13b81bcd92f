/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Wire types for the dependency-service collaborator boundary.
//!
//! The engine owns no transport: the host executes these calls and feeds the
//! completions back as canvas intents. Field names follow the service's JSON
//! contract (camelCase records, snake_case kind names).

use serde::{Deserialize, Serialize};

use crate::graph::DependencyKind;

/// A persisted dependency record, as returned by the collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDependency {
    pub id: String,
    pub predecessor_id: String,
    pub successor_id: String,
    #[serde(default)]
    pub dependency_type: DependencyKind,
    pub created_at: String,
}

/// Input for a create-dependency call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyCreateInput {
    pub predecessor_id: String,
    pub successor_id: String,
    /// Resolved to finish-to-start by the service when unspecified.
    pub dependency_type: Option<DependencyKind>,
}

/// Verdict of a validate-dependency call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyValidation {
    pub is_valid: bool,
    pub error_message: Option<String>,
    pub would_create_cycle: bool,
    pub cycle_path: Option<Vec<String>>,
}

impl DependencyValidation {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error_message: None,
            would_create_cycle: false,
            cycle_path: None,
        }
    }

    /// Local verdict for a self-dependency drop. Matches the service's own
    /// verdict for the same input, so the UI reads identically either way.
    pub(crate) fn self_dependency(task_id: &str) -> Self {
        Self {
            is_valid: false,
            error_message: Some("Task cannot depend on itself".to_string()),
            would_create_cycle: true,
            cycle_path: Some(vec![task_id.to_string()]),
        }
    }

    /// Generic verdict standing in for a failed transport round-trip.
    pub(crate) fn transport_failure() -> Self {
        Self {
            is_valid: false,
            error_message: Some("Dependency service unavailable".to_string()),
            would_create_cycle: false,
            cycle_path: None,
        }
    }
}
