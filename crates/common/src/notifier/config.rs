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

use herald_core::correctness::check_valid_string_ascii;
use serde::{Deserialize, Serialize};
use ustr::Ustr;

/// The order in which a notifier invokes its listeners.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOrder {
    /// The most recently subscribed listener is invoked first.
    #[default]
    NewestFirst,
    /// Listeners are invoked in subscription order.
    OldestFirst,
}

/// Configuration for `Notifier` instances.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// The name used to identify the notifier in logs.
    pub name: Ustr,
    /// The dispatch order, fixed for the lifetime of the notifier.
    pub order: DispatchOrder,
}

impl Default for NotifierConfig {
    /// Creates a new default [`NotifierConfig`] instance.
    fn default() -> Self {
        Self {
            name: Ustr::from("Notifier"),
            order: DispatchOrder::NewestFirst,
        }
    }
}

impl NotifierConfig {
    /// Creates a new [`NotifierConfig`] instance.
    #[must_use]
    pub fn new(name: &str, order: DispatchOrder) -> Self {
        Self {
            name: Ustr::from(name),
            order,
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is empty, all whitespace or contains non-ASCII chars.
    pub fn validate(&self) -> anyhow::Result<()> {
        check_valid_string_ascii(self.name, stringify!(name))
    }
}
