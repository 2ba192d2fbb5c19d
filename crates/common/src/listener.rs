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

//! Listener functionality for invoking a bound target.
//!
//! A [`Listener`] stores one invocable target behind the uniform call shape `&T -> R`,
//! so a [`Notifier`](crate::notifier::Notifier) never needs to know whether a given entry
//! targets a free function or a method on some receiver object.
//!
//! Binding is resolved once, when the listener is constructed:
//!
//! - [`Listener::from_fn`] binds a function or closure (no receiver).
//! - [`Listener::from_method`] binds a method on a receiver which does not take part in
//!   lifetime tracking. Keeping the receiver alive is the caller's responsibility.
//! - [`Listener::from_tracked`] binds a method on a [`Trackable`] receiver. A notifier
//!   holding the listener is told to drop it when the receiver is dropped.
//!
//! Listeners never own their receiver; they hold a `Weak` reference and report
//! [`BroadcastError::ReceiverDropped`] if invoked after the receiver is gone.

use std::{
    fmt::Debug,
    rc::{Rc, Weak},
};

use herald_core::ObjectId;

use crate::{error::BroadcastError, trackable::Trackable};

/// A type-erased handle to one invocable target (function or receiver + method).
///
/// Cloning is cheap: clones share the bound target.
pub struct Listener<T: ?Sized, R = ()> {
    target: Target<T, R>,
}

enum Target<T: ?Sized, R> {
    Function(Rc<dyn Fn(&T) -> R>),
    Method(Method<T, R>),
}

struct Method<T: ?Sized, R> {
    object: ObjectId,
    call: Rc<dyn Fn(&T) -> Option<R>>,
    tracked: Option<Weak<dyn Trackable>>,
}

impl<T: ?Sized + 'static, R: 'static> Listener<T, R> {
    /// Creates a new [`Listener`] bound to the function `f`.
    ///
    /// The listener has no receiver and is never trackable.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&T) -> R + 'static,
    {
        Self {
            target: Target::Function(Rc::new(f)),
        }
    }

    /// Creates a new [`Listener`] bound to `method` on `receiver`.
    ///
    /// The listener is not trackable: if `receiver` is dropped, invoking the listener
    /// returns [`BroadcastError::ReceiverDropped`] until it is unsubscribed.
    pub fn from_method<O, M>(receiver: &Rc<O>, method: M) -> Self
    where
        O: 'static,
        M: Fn(&O, &T) -> R + 'static,
    {
        Self {
            target: Target::Method(Method {
                object: ObjectId::of(receiver),
                call: bind(receiver, method),
                tracked: None,
            }),
        }
    }

    /// Creates a new trackable [`Listener`] bound to `method` on `receiver`.
    ///
    /// When subscribed, the notifier registers itself with the receiver's
    /// [`Tracker`](crate::trackable::Tracker) and forgets this listener when the
    /// receiver is dropped.
    pub fn from_tracked<O, M>(receiver: &Rc<O>, method: M) -> Self
    where
        O: Trackable + 'static,
        M: Fn(&O, &T) -> R + 'static,
    {
        let tracked: Weak<dyn Trackable> = Rc::<O>::downgrade(receiver);
        Self {
            target: Target::Method(Method {
                object: ObjectId::of(receiver),
                call: bind(receiver, method),
                tracked: Some(tracked),
            }),
        }
    }
}

fn bind<T, R, O, M>(receiver: &Rc<O>, method: M) -> Rc<dyn Fn(&T) -> Option<R>>
where
    T: ?Sized + 'static,
    R: 'static,
    O: 'static,
    M: Fn(&O, &T) -> R + 'static,
{
    let receiver = Rc::downgrade(receiver);
    Rc::new(move |args: &T| receiver.upgrade().map(|receiver| method(&*receiver, args)))
}

impl<T: ?Sized, R> Listener<T, R> {
    /// Invokes the bound target with `args`, returning its result verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`BroadcastError::ReceiverDropped`] if the listener is bound to a receiver
    /// which no longer exists.
    pub fn invoke(&self, args: &T) -> Result<R, BroadcastError> {
        match &self.target {
            Target::Function(f) => Ok(f(args)),
            Target::Method(method) => {
                (method.call)(args).ok_or(BroadcastError::ReceiverDropped(method.object))
            }
        }
    }

    /// Returns whether the listener's receiver takes part in lifetime tracking.
    #[must_use]
    pub const fn is_trackable(&self) -> bool {
        matches!(
            &self.target,
            Target::Method(Method {
                tracked: Some(_),
                ..
            })
        )
    }

    /// Returns whether the listener is bound to a receiver object.
    #[must_use]
    pub const fn has_object(&self) -> bool {
        matches!(self.target, Target::Method(_))
    }

    /// Returns the identity of the listener's receiver, or `None` for function targets.
    #[must_use]
    pub const fn object_id(&self) -> Option<ObjectId> {
        match &self.target {
            Target::Function(_) => None,
            Target::Method(method) => Some(method.object),
        }
    }

    /// Returns the tracked receiver, if this listener is trackable.
    ///
    /// # Errors
    ///
    /// Returns [`BroadcastError::ReceiverDropped`] if the tracked receiver no longer exists.
    pub(crate) fn tracked_receiver(&self) -> Result<Option<Rc<dyn Trackable>>, BroadcastError> {
        match &self.target {
            Target::Method(Method {
                object,
                tracked: Some(tracked),
                ..
            }) => tracked
                .upgrade()
                .map(Some)
                .ok_or(BroadcastError::ReceiverDropped(*object)),
            _ => Ok(None),
        }
    }
}

impl<T: ?Sized, R> Clone for Listener<T, R> {
    fn clone(&self) -> Self {
        let target = match &self.target {
            Target::Function(f) => Target::Function(Rc::clone(f)),
            Target::Method(method) => Target::Method(Method {
                object: method.object,
                call: Rc::clone(&method.call),
                tracked: method.tracked.clone(),
            }),
        };
        Self { target }
    }
}

impl<T: ?Sized, R> Debug for Listener<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(Listener))
            .field("object", &self.object_id())
            .field("trackable", &self.is_trackable())
            .finish()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use rstest::rstest;

    use super::*;
    use crate::testing::{CallLog, TrackedRecorder, UntrackedRecorder};

    fn double(value: &u32) -> u32 {
        value * 2
    }

    #[rstest]
    fn test_from_fn_invokes_function() {
        let listener = Listener::from_fn(double);

        assert_eq!(listener.invoke(&21).unwrap(), 42);
        assert!(!listener.is_trackable());
        assert!(!listener.has_object());
        assert_eq!(listener.object_id(), None);
    }

    #[rstest]
    fn test_from_fn_with_closure_and_unsized_args() {
        let seen = Rc::new(Cell::new(0_usize));
        let seen_clone = seen.clone();
        let listener: Listener<str> = Listener::from_fn(move |s: &str| seen_clone.set(s.len()));

        listener.invoke("hello").unwrap();

        assert_eq!(seen.get(), 5);
    }

    #[rstest]
    fn test_from_method_invokes_receiver() {
        let log = CallLog::default();
        let receiver = UntrackedRecorder::new("plain", &log);
        let listener = Listener::from_method(&receiver, UntrackedRecorder::record);

        listener.invoke(&7).unwrap();

        assert_eq!(receiver.calls(), 1);
        assert_eq!(log.entries(), vec!["plain:7"]);
        assert!(listener.has_object());
        assert!(!listener.is_trackable());
        assert_eq!(listener.object_id(), Some(ObjectId::of(&receiver)));
    }

    #[rstest]
    fn test_from_tracked_is_trackable() {
        let log = CallLog::default();
        let receiver = TrackedRecorder::new("tracked", &log);
        let listener = Listener::from_tracked(&receiver, TrackedRecorder::record);

        listener.invoke(&1).unwrap();

        assert!(listener.is_trackable());
        assert!(listener.has_object());
        assert_eq!(listener.object_id(), Some(ObjectId::of(&receiver)));
        assert_eq!(receiver.calls(), 1);
        assert!(listener.tracked_receiver().unwrap().is_some());
    }

    #[rstest]
    fn test_listener_does_not_keep_receiver_alive() {
        let log = CallLog::default();
        let receiver = UntrackedRecorder::new("plain", &log);
        let object = ObjectId::of(&receiver);
        let listener = Listener::from_method(&receiver, UntrackedRecorder::record);

        drop(receiver);

        assert_eq!(
            listener.invoke(&1),
            Err(BroadcastError::ReceiverDropped(object))
        );
        assert!(log.entries().is_empty());
    }

    #[rstest]
    fn test_tracked_receiver_reports_dropped() {
        let log = CallLog::default();
        let receiver = TrackedRecorder::new("tracked", &log);
        let object = ObjectId::of(&receiver);
        let listener = Listener::from_tracked(&receiver, TrackedRecorder::record);

        drop(receiver);

        assert!(matches!(
            listener.tracked_receiver(),
            Err(BroadcastError::ReceiverDropped(id)) if id == object
        ));
    }

    #[rstest]
    fn test_invoke_propagates_target_result() {
        let log = CallLog::default();
        let receiver = TrackedRecorder::failing("bad", &log);
        let listener = Listener::from_tracked(&receiver, TrackedRecorder::handle);

        let result = listener.invoke(&3).unwrap();

        assert_eq!(result.unwrap_err().to_string(), "bad failed on 3");
    }

    #[rstest]
    fn test_clone_shares_target() {
        let log = CallLog::default();
        let receiver = UntrackedRecorder::new("plain", &log);
        let listener = Listener::from_method(&receiver, UntrackedRecorder::record);
        let clone = listener.clone();

        listener.invoke(&1).unwrap();
        clone.invoke(&2).unwrap();

        assert_eq!(receiver.calls(), 2);
        assert_eq!(clone.object_id(), listener.object_id());
    }

    #[rstest]
    fn test_debug_shows_identity() {
        let listener: Listener<u32> = Listener::from_fn(|_| {});
        let debug = format!("{listener:?}");

        assert_eq!(debug, "Listener { object: None, trackable: false }");
    }
}
