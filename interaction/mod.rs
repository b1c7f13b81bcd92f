/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! User interaction state machines: drag-to-connect, edge selection, and
//! bulk editing. Each machine is plain data plus transition functions so it
//! can be unit-tested without any rendering surface; the canvas reducer
//! wires them to the store and to host effects.

pub mod bulk;
pub mod connect;
pub mod selection;
