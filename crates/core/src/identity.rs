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

//! Opaque identities for receiver objects and notifiers.

use std::{
    fmt::{self, Display},
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

static NEXT_OWNER_ID: AtomicU64 = AtomicU64::new(1);

/// Represents the identity of a receiver object.
///
/// The identity is the address of the object's `Rc` allocation. An allocation is not
/// released while any `Rc` or `Weak` to it exists, so the identity cannot be reused for a
/// different object while something still refers to it by identity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

impl ObjectId {
    /// Returns the identity of the object behind `receiver`.
    #[must_use]
    pub fn of<O: ?Sized>(receiver: &Rc<O>) -> Self {
        Self(Rc::as_ptr(receiver).cast::<()>().addr())
    }

    /// Returns the raw address value.
    #[must_use]
    pub const fn as_usize(&self) -> usize {
        self.0
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Represents the identity of one notifier (the owner of a set of subscriptions).
///
/// Identities are allocated from a process-wide monotonic counter and are never reused.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(u64);

impl OwnerId {
    /// Allocates a new unique [`OwnerId`].
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_OWNER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the inner value.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
