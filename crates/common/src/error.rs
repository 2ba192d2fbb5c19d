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

//! Errors raised by listeners, trackers and notifiers.
//!
//! Failures raised by listener targets themselves are not represented here; they travel
//! through [`anyhow::Error`] unchanged.

use std::collections::TryReserveError;

use herald_core::ObjectId;

/// Represents a failure of the notifier machinery itself.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BroadcastError {
    /// The receiver a listener is bound to no longer exists.
    #[error("Receiver {0} was dropped")]
    ReceiverDropped(ObjectId),
    /// Growing a subscription table or tracker registry failed.
    #[error("Failed to allocate {context}: {source}")]
    Allocation {
        /// What was being allocated.
        context: &'static str,
        /// The underlying allocation error.
        source: TryReserveError,
    },
}

impl BroadcastError {
    /// Returns a short stable label (snake_case) for use in logs.
    #[must_use]
    pub const fn as_label(&self) -> &'static str {
        match self {
            Self::ReceiverDropped(_) => "receiver_dropped",
            Self::Allocation { .. } => "allocation_failed",
        }
    }

    pub(crate) fn allocation(context: &'static str) -> impl FnOnce(TryReserveError) -> Self {
        move |source| Self::Allocation { context, source }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_receiver_dropped_display() {
        let receiver = Rc::new(0_u8);
        let object = ObjectId::of(&receiver);
        let err = BroadcastError::ReceiverDropped(object);

        assert_eq!(err.to_string(), format!("Receiver {object} was dropped"));
        assert_eq!(err.as_label(), "receiver_dropped");
    }

    #[rstest]
    fn test_allocation_display() {
        let source = Vec::<u8>::new().try_reserve(usize::MAX).unwrap_err();
        let err = BroadcastError::allocation("listener slot")(source.clone());

        assert!(err.to_string().starts_with("Failed to allocate listener slot"));
        assert_eq!(err.as_label(), "allocation_failed");
        assert_eq!(
            err,
            BroadcastError::Allocation {
                context: "listener slot",
                source,
            }
        );
    }
}
