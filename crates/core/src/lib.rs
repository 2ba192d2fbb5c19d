// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Core foundational types for Herald.
//!
//! The `herald-core` crate is designed to be lightweight and dependency-free in spirit.
//! It supplies the building blocks the notifier machinery in `herald-common` is made of:
//!
//! - Identities for receiver objects and notifiers.
//! - A generation-checked, arena-backed linked list with stable keys.
//! - Correctness validation functions.
//!
//! Everything in this crate is single-threaded by intent; nothing here is `Sync`
//! beyond what falls out of plain data.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod collections;
pub mod correctness;
pub mod identity;

// Re-exports
pub use crate::{
    collections::{SlotKey, SlotList},
    identity::{ObjectId, OwnerId},
};
