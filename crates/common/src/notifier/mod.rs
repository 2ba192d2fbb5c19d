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

//! A single-threaded broadcaster which invokes an ordered set of listeners on demand.
//!
//! A [`Notifier`] is the only strong owner of its subscription table. Everything else which
//! refers back to the table (a [`Connection`], or a disappearance callback registered on a
//! tracked receiver) holds a `Weak` reference, so:
//!
//! - dropping a tracked receiver removes its listeners from every notifier (forward teardown);
//! - dropping a notifier unregisters it from every live tracked receiver (backward teardown);
//! - a [`Connection`] used after its notifier is gone is a no-op.
//!
//! # Example
//!
//! ```
//! use std::{cell::Cell, rc::Rc};
//!
//! use herald_common::{listener::Listener, notifier::Notifier};
//!
//! let total = Rc::new(Cell::new(0_u64));
//! let total_clone = total.clone();
//!
//! let notifier: Notifier<u64> = Notifier::new();
//! let mut connection = notifier
//!     .subscribe(Listener::from_fn(move |v: &u64| total_clone.set(total_clone.get() + v)))
//!     .unwrap();
//!
//! notifier.notify(&5).unwrap();
//! assert!(connection.disconnect());
//! notifier.notify(&5).unwrap();
//!
//! assert_eq!(total.get(), 5);
//! ```

/// Configuration for notifiers.
pub mod config;


use std::{
    cell::RefCell,
    fmt::Debug,
    rc::{Rc, Weak},
};

use herald_core::{ObjectId, OwnerId, SlotKey, SlotList, correctness::FAILED};
use smallvec::SmallVec;
use ustr::Ustr;

pub use self::config::{DispatchOrder, NotifierConfig};
use crate::{error::BroadcastError, listener::Listener, trackable::DisappearanceCallback};

/// The number of listeners a notify pass can snapshot without allocating.
const INLINE_LISTENERS: usize = 8;

/// Maps the return value of a listener into the result of a notify pass.
pub trait Outcome {
    /// Converts `self` into a result, where an error stops the notify pass.
    ///
    /// # Errors
    ///
    /// Returns the failure raised by the listener.
    fn into_result(self) -> anyhow::Result<()>;
}

impl Outcome for () {
    fn into_result(self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl<E> Outcome for Result<(), E>
where
    E: Into<anyhow::Error>,
{
    fn into_result(self) -> anyhow::Result<()> {
        self.map_err(Into::into)
    }
}

/// The object-safe face of a notifier's subscription table.
///
/// Trackers and connections only ever hold this behind a `Weak` reference.
pub trait SubscriptionOwner {
    /// Returns the identity of the notifier owning the table.
    fn owner_id(&self) -> OwnerId;
    /// Removes every listener bound to `object`, returning how many were removed.
    fn forget_object(&self, object: ObjectId) -> usize;
    /// Removes the listener at `slot`, returning whether it was still present.
    fn remove_slot(&self, slot: SlotKey) -> bool;
    /// Returns whether the listener at `slot` is still present.
    fn contains_slot(&self, slot: SlotKey) -> bool;
}

struct Table<T: ?Sized, R> {
    owner: OwnerId,
    name: Ustr,
    listeners: RefCell<SlotList<Listener<T, R>>>,
}

impl<T: ?Sized, R> Table<T, R> {
    fn new(name: Ustr) -> Self {
        Self {
            owner: OwnerId::next(),
            name,
            listeners: RefCell::new(SlotList::new()),
        }
    }

    // Must be called with the table unborrowed: dropping a listener can drop a receiver,
    // whose tracker then calls back into this table.
    fn release<I>(&self, removed: I)
    where
        I: IntoIterator<Item = (SlotKey, Listener<T, R>)>,
    {
        for (slot, listener) in removed {
            if let Ok(Some(receiver)) = listener.tracked_receiver() {
                receiver.tracker().unregister_slot(self.owner, slot);
            }
        }
    }
}

impl<T: ?Sized, R> SubscriptionOwner for Table<T, R> {
    fn owner_id(&self) -> OwnerId {
        self.owner
    }

    fn forget_object(&self, object: ObjectId) -> usize {
        let removed = match self.listeners.try_borrow_mut() {
            Ok(mut listeners) => listeners.retain(|listener| listener.object_id() != Some(object)),
            Err(e) => {
                log::warn!(
                    "Notifier {} '{}' cannot forget {object}: {e}",
                    self.owner,
                    self.name,
                );
                return 0;
            }
        };

        let count = removed.len();
        self.release(removed);
        count
    }

    fn remove_slot(&self, slot: SlotKey) -> bool {
        let removed = match self.listeners.try_borrow_mut() {
            Ok(mut listeners) => listeners.remove(slot),
            Err(e) => {
                log::warn!(
                    "Notifier {} '{}' cannot remove {slot:?}: {e}",
                    self.owner,
                    self.name,
                );
                return false;
            }
        };

        match removed {
            Some(listener) => {
                self.release(std::iter::once((slot, listener)));
                true
            }
            None => false,
        }
    }

    fn contains_slot(&self, slot: SlotKey) -> bool {
        self.listeners.borrow().contains(slot)
    }
}

impl<T: ?Sized, R> Drop for Table<T, R> {
    fn drop(&mut self) {
        let removed = self.listeners.get_mut().drain();
        log::debug!(
            "Dropping notifier {} '{}' with {} listener(s)",
            self.owner,
            self.name,
            removed.len(),
        );

        for (_, listener) in removed {
            if let Ok(Some(receiver)) = listener.tracked_receiver() {
                receiver.tracker().unregister(self.owner);
            }
        }
    }
}

/// Broadcasts values of type `T` to an ordered set of [`Listener`]s.
///
/// Listeners return `R`, which is `()` for infallible listeners or `Result<(), E>` for
/// fallible ones. Listener return values are never collected, so `R` is limited to the
/// [`Outcome`] implementors:
///
/// ```compile_fail
/// use herald_common::Notifier;
///
/// let counts: Notifier<str, u32> = Notifier::new();
/// ```
pub struct Notifier<T: ?Sized, R: Outcome = ()> {
    table: Rc<Table<T, R>>,
    config: NotifierConfig,
}

impl<T: ?Sized, R: Outcome> Notifier<T, R> {
    /// Creates a new [`Notifier`] instance with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(NotifierConfig::default())
    }

    /// Creates a new [`Notifier`] instance with correctness checking.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid.
    pub fn new_checked(config: NotifierConfig) -> anyhow::Result<Self> {
        config.validate()?;

        Ok(Self {
            table: Rc::new(Table::new(config.name)),
            config,
        })
    }

    /// Creates a new [`Notifier`] instance.
    ///
    /// # Panics
    ///
    /// Panics if `config` is invalid.
    #[must_use]
    pub fn with_config(config: NotifierConfig) -> Self {
        Self::new_checked(config).expect(FAILED)
    }

    /// Returns the unique identity of this notifier.
    #[must_use]
    pub fn id(&self) -> OwnerId {
        self.table.owner
    }

    /// Returns the name of this notifier.
    #[must_use]
    pub fn name(&self) -> Ustr {
        self.table.name
    }

    /// Returns the configuration of this notifier.
    #[must_use]
    pub const fn config(&self) -> &NotifierConfig {
        &self.config
    }

    /// Returns the number of subscribed listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.listeners.borrow().len()
    }

    /// Returns whether no listeners are subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.listeners.borrow().is_empty()
    }

    /// Returns whether at least one listener is bound to `object`.
    #[must_use]
    pub fn is_subscribed(&self, object: ObjectId) -> bool {
        self.table
            .listeners
            .borrow()
            .iter()
            .any(|(_, listener)| listener.object_id() == Some(object))
    }

    /// Removes every listener bound to `receiver`, returning how many were removed.
    pub fn unsubscribe<O: ?Sized>(&self, receiver: &Rc<O>) -> usize {
        self.unsubscribe_object(ObjectId::of(receiver))
    }

    /// Removes every listener bound to the object identified by `object`.
    ///
    /// Returns how many listeners were removed.
    pub fn unsubscribe_object(&self, object: ObjectId) -> usize {
        let count = self.table.forget_object(object);
        log::debug!(
            "Notifier {} '{}' unsubscribed {count} listener(s) of {object}",
            self.table.owner,
            self.table.name,
        );
        count
    }

    /// Removes every listener, returning how many were removed.
    pub fn unsubscribe_all(&self) -> usize {
        let removed = self.table.listeners.borrow_mut().drain();
        let count = removed.len();
        self.table.release(removed);
        log::debug!(
            "Notifier {} '{}' unsubscribed all {count} listener(s)",
            self.table.owner,
            self.table.name,
        );
        count
    }
}

impl<T, R> Notifier<T, R>
where
    T: ?Sized + 'static,
    R: Outcome + 'static,
{
    /// Subscribes `listener`, returning a [`Connection`] which can later remove it.
    ///
    /// If the listener is trackable, a disappearance callback is registered with its
    /// receiver so the listener is forgotten when the receiver is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The listener is trackable and its receiver was already dropped.
    /// - The table or the receiver's tracker cannot grow. Nothing is left registered.
    pub fn subscribe(&self, listener: Listener<T, R>) -> Result<Connection, BroadcastError> {
        let receiver = listener.tracked_receiver()?;
        let object = listener.object_id();

        let slot = {
            let mut listeners = self.table.listeners.borrow_mut();
            match self.config.order {
                DispatchOrder::NewestFirst => listeners.try_push_front(listener),
                DispatchOrder::OldestFirst => listeners.try_push_back(listener),
            }
            .map_err(BroadcastError::allocation("listener slot"))?
        };

        let table: Weak<dyn SubscriptionOwner> = Rc::<Table<T, R>>::downgrade(&self.table);

        if let (Some(receiver), Some(object)) = (receiver, object) {
            let callback =
                DisappearanceCallback::new(self.table.owner, slot, object, table.clone());
            if let Err(e) = receiver.tracker().register(callback) {
                let removed = self.table.listeners.borrow_mut().remove(slot);
                drop(removed);
                return Err(e);
            }
        }

        log::debug!(
            "Notifier {} '{}' subscribed listener at {slot:?} (object={object:?})",
            self.table.owner,
            self.table.name,
        );

        Ok(Connection {
            owner: self.table.owner,
            slot,
            table: Some(table),
        })
    }

    /// Invokes every subscribed listener with `args`, in dispatch order.
    ///
    /// Listeners removed during the pass are not invoked afterwards, and listeners added
    /// during the pass are first invoked on the next pass. Tracked listeners whose receiver
    /// is mid-drop are skipped.
    ///
    /// # Errors
    ///
    /// Returns the first failure raised by a listener; later listeners are not invoked.
    /// Also returns an error if a non-tracked receiver was dropped while still subscribed.
    pub fn notify(&self, args: &T) -> anyhow::Result<()> {
        let snapshot: SmallVec<[(SlotKey, Listener<T, R>); INLINE_LISTENERS]> = self
            .table
            .listeners
            .borrow()
            .iter()
            .map(|(slot, listener)| (slot, listener.clone()))
            .collect();

        log::trace!(
            "Notifier {} '{}' dispatching to {} listener(s)",
            self.table.owner,
            self.table.name,
            snapshot.len(),
        );

        for (slot, listener) in snapshot {
            if !self.table.contains_slot(slot) {
                log::trace!("Skipping {slot:?} removed during dispatch");
                continue;
            }
            match listener.invoke(args) {
                Ok(outcome) => outcome.into_result()?,
                // A tracked receiver being dropped; its tracker forgets it once it fires
                Err(BroadcastError::ReceiverDropped(object)) if listener.is_trackable() => {
                    log::trace!("Skipping {slot:?} bound to dropping receiver {object}");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }
}

impl<T: ?Sized, R: Outcome> Default for Notifier<T, R> {
    /// Creates a new default [`Notifier`] instance.
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized, R: Outcome> Debug for Notifier<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(Notifier))
            .field("id", &self.table.owner)
            .field("name", &self.table.name.as_str())
            .field("order", &self.config.order)
            .field("listeners", &self.len())
            .finish()
    }
}

/// A handle to one subscription, able to remove exactly that listener.
///
/// Dropping a connection does not disconnect it.
pub struct Connection {
    owner: OwnerId,
    slot: SlotKey,
    table: Option<Weak<dyn SubscriptionOwner>>,
}

impl Connection {
    /// Removes the subscribed listener.
    ///
    /// Returns whether a listener was removed. Disconnecting again, after the listener was
    /// removed by other means, or after the notifier was dropped, does nothing.
    pub fn disconnect(&mut self) -> bool {
        let Some(table) = self.table.take().and_then(|table| table.upgrade()) else {
            return false;
        };

        let removed = table.remove_slot(self.slot);
        if removed {
            log::debug!("Notifier {} disconnected {:?}", self.owner, self.slot);
        }
        removed
    }

    /// Returns whether the subscribed listener is still present.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.table
            .as_ref()
            .and_then(Weak::upgrade)
            .is_some_and(|table| table.contains_slot(self.slot))
    }

    /// Returns the slot of the subscribed listener.
    #[must_use]
    pub const fn slot(&self) -> SlotKey {
        self.slot
    }

    /// Returns the identity of the notifier the listener was subscribed to.
    #[must_use]
    pub const fn owner(&self) -> OwnerId {
        self.owner
    }
}

impl Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(Connection))
            .field("owner", &self.owner)
            .field("slot", &self.slot)
            .field("connected", &self.is_connected())
            .finish()
    }
}
