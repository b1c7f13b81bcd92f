/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Framework-agnostic task dependency-graph canvas engine.
//!
//! Store derivation, camera/projection, viewport virtualization,
//! progressive reveal, drag-to-connect interaction with remote validation,
//! edge selection with bulk editing, layout orchestration, and
//! render-packet derivation for a task planner's dependency canvas.
//!
//! The engine is a pure in-process component: the host drives it with
//! [`canvas::CanvasIntent`]s, drains [`canvas::CanvasEffect`]s (remote calls
//! to execute, notifications of committed user intent), and draws the
//! [`render::Scene`] packet it derives each frame. All durable state lives
//! behind the host's dependency-service collaborator; the engine holds only
//! view state.

pub mod canvas;
pub mod graph;
pub mod interaction;
pub mod layout;
pub mod render;
pub mod services;
pub mod viewport;

pub use canvas::{CanvasConfig, CanvasEffect, CanvasIntent, GraphCanvas};
pub use graph::{
    DependencyGraph, DependencyKind, GraphFilters, GraphInsights, NodeKind, TaskSnapshot,
    TaskStatus,
};
pub use render::Scene;
pub use services::{DependencyCreateInput, DependencyValidation, TaskDependency};
