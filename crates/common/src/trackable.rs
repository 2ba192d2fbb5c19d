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

//! Lifetime tracking for receivers of trackable listeners.
//!
//! A receiver opts in by embedding a [`Tracker`] and implementing [`Trackable`]:
//!
//! ```
//! use herald_common::trackable::{Trackable, Tracker};
//!
//! #[derive(Default)]
//! struct Position {
//!     tracker: Tracker,
//! }
//!
//! impl Trackable for Position {
//!     fn tracker(&self) -> &Tracker {
//!         &self.tracker
//!     }
//! }
//! ```
//!
//! Each subscription of such a receiver registers one [`DisappearanceCallback`]. When the
//! receiver is dropped its tracker fires every remaining callback, and each notifier
//! forgets all listeners bound to the receiver.

use std::{
    cell::RefCell,
    fmt::Debug,
    rc::Weak,
};

use herald_core::{ObjectId, OwnerId, SlotKey};

use crate::{error::BroadcastError, notifier::SubscriptionOwner};

/// Represents the capability of taking part in lifetime tracking.
pub trait Trackable {
    /// Returns the tracker embedded in this object.
    fn tracker(&self) -> &Tracker;
}

/// A registration telling one notifier to forget a receiver once it is dropped.
pub struct DisappearanceCallback {
    owner: OwnerId,
    slot: SlotKey,
    object: ObjectId,
    target: Weak<dyn SubscriptionOwner>,
}

impl DisappearanceCallback {
    /// Creates a new [`DisappearanceCallback`] instance.
    #[must_use]
    pub fn new(
        owner: OwnerId,
        slot: SlotKey,
        object: ObjectId,
        target: Weak<dyn SubscriptionOwner>,
    ) -> Self {
        Self {
            owner,
            slot,
            object,
            target,
        }
    }

    /// Returns the notifier this callback points back at.
    #[must_use]
    pub const fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Returns the subscription slot this callback corresponds to.
    #[must_use]
    pub const fn slot(&self) -> SlotKey {
        self.slot
    }

    /// Returns the identity of the tracked receiver.
    #[must_use]
    pub const fn object(&self) -> ObjectId {
        self.object
    }

    fn fire(self) {
        match self.target.upgrade() {
            Some(target) => {
                let forgotten = target.forget_object(self.object);
                log::debug!(
                    "Receiver {} dropped, notifier {} forgot {forgotten} listener(s)",
                    self.object,
                    self.owner,
                );
            }
            None => log::trace!("Notifier {} already dropped", self.owner),
        }
    }
}

impl Debug for DisappearanceCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(DisappearanceCallback))
            .field("owner", &self.owner)
            .field("slot", &self.slot)
            .field("object", &self.object)
            .finish()
    }
}

/// The registry of notifiers a trackable receiver is subscribed to.
///
/// Dropping the tracker fires every remaining [`DisappearanceCallback`] (in unspecified
/// order), so no notifier is left holding a listener for a dropped receiver.
#[derive(Default)]
pub struct Tracker {
    callbacks: RefCell<Vec<DisappearanceCallback>>,
}

impl Tracker {
    /// Creates a new empty [`Tracker`] instance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            callbacks: RefCell::new(Vec::new()),
        }
    }

    /// Registers the `callback`.
    ///
    /// # Errors
    ///
    /// Returns [`BroadcastError::Allocation`] if the registry cannot grow.
    pub fn register(&self, callback: DisappearanceCallback) -> Result<(), BroadcastError> {
        let mut callbacks = self.callbacks.borrow_mut();
        callbacks
            .try_reserve(1)
            .map_err(BroadcastError::allocation("disappearance callback"))?;
        callbacks.push(callback);
        Ok(())
    }

    /// Removes every callback registered by `owner`, returning how many were removed.
    pub fn unregister(&self, owner: OwnerId) -> usize {
        let mut callbacks = self.callbacks.borrow_mut();
        let before = callbacks.len();
        callbacks.retain(|callback| callback.owner != owner);
        before - callbacks.len()
    }

    /// Removes the callback for the single subscription `slot` of `owner`.
    ///
    /// Returns whether a callback was removed.
    pub fn unregister_slot(&self, owner: OwnerId, slot: SlotKey) -> bool {
        let mut callbacks = self.callbacks.borrow_mut();
        match callbacks
            .iter()
            .position(|callback| callback.owner == owner && callback.slot == slot)
        {
            Some(index) => {
                callbacks.swap_remove(index);
                true
            }
            None => false,
        }
    }

    /// Returns the number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.borrow().len()
    }

    /// Returns whether no callbacks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.borrow().is_empty()
    }

    /// Returns whether `owner` has at least one callback registered.
    #[must_use]
    pub fn is_tracked_by(&self, owner: OwnerId) -> bool {
        self.callbacks
            .borrow()
            .iter()
            .any(|callback| callback.owner == owner)
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        let callbacks = std::mem::take(self.callbacks.get_mut());
        for callback in callbacks {
            callback.fire();
        }
    }
}

impl Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(Tracker))
            .field("callbacks", &self.callbacks.borrow())
            .finish()
    }
}
