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

//! Lifetime-safe notifiers, listeners and trackable receivers.
//!
//! The `herald-common` crate provides an in-process publish/subscribe primitive for
//! single-threaded programs:
//!
//! - A [`Listener`] binds a function, or a method on a receiver, behind a uniform call shape.
//! - A [`Notifier`] holds an ordered set of listeners and invokes them all on demand.
//! - A receiver embedding a [`Tracker`] (see [`Trackable`]) is forgotten by every notifier
//!   it subscribed to as soon as it is dropped.
//! - Dropping a [`Notifier`] unregisters it from every live tracked receiver.
//!
//! Neither side ever holds a strong reference to the other, so teardown is safe in both
//! directions without manual unsubscription.
//!
//! All types here are `!Send` and `!Sync`.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod error;
pub mod listener;
pub mod logging;
pub mod notifier;
pub mod testing;
pub mod trackable;

pub use crate::{
    error::BroadcastError,
    listener::Listener,
    notifier::{Connection, DispatchOrder, Notifier, NotifierConfig, Outcome, SubscriptionOwner},
    trackable::{DisappearanceCallback, Trackable, Tracker},
};
