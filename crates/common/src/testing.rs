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

//! Common test related helper functions.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use log::LevelFilter;

use crate::{
    logging::{init_logging, logger::LoggerConfig},
    trackable::{Trackable, Tracker},
};

/// Installs the logger at `stdout_level` (defaults to `Trace`) for a test run.
///
/// # Errors
///
/// Returns an error if a logger was already installed.
pub fn init_logger_for_testing(stdout_level: Option<LevelFilter>) -> anyhow::Result<()> {
    let mut config = LoggerConfig::default();
    config.stdout_level = stdout_level.unwrap_or(LevelFilter::Trace);
    init_logging(config)
}

/// A shared, ordered record of listener invocations.
///
/// Clones share the same record, so one log can observe several receivers.
#[derive(Clone, Debug, Default)]
pub struct CallLog(Rc<RefCell<Vec<String>>>);

impl CallLog {
    /// Appends `entry` to the log.
    pub fn push<S: Into<String>>(&self, entry: S) {
        self.0.borrow_mut().push(entry.into());
    }

    /// Returns a copy of every entry, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Returns whether the log has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// A receiver which does not take part in lifetime tracking.
#[derive(Debug)]
pub struct UntrackedRecorder {
    label: String,
    log: CallLog,
    calls: Cell<usize>,
}

impl UntrackedRecorder {
    /// Creates a new shared [`UntrackedRecorder`] writing to `log`.
    #[must_use]
    pub fn new(label: &str, log: &CallLog) -> Rc<Self> {
        Rc::new(Self {
            label: label.to_string(),
            log: log.clone(),
            calls: Cell::new(0),
        })
    }

    /// Records `value` as `"{label}:{value}"`.
    pub fn record(&self, value: &u32) {
        self.calls.set(self.calls.get() + 1);
        self.log.push(format!("{}:{value}", self.label));
    }

    /// Returns how many times this receiver was invoked.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

/// A receiver which embeds a [`Tracker`], so notifiers forget it when it is dropped.
#[derive(Debug)]
pub struct TrackedRecorder {
    label: String,
    log: CallLog,
    calls: Cell<usize>,
    failing: bool,
    tracker: Tracker,
}

impl TrackedRecorder {
    /// Creates a new shared [`TrackedRecorder`] writing to `log`.
    #[must_use]
    pub fn new(label: &str, log: &CallLog) -> Rc<Self> {
        Self::build(label, log, false)
    }

    /// Creates a new shared [`TrackedRecorder`] whose [`TrackedRecorder::handle`] fails.
    #[must_use]
    pub fn failing(label: &str, log: &CallLog) -> Rc<Self> {
        Self::build(label, log, true)
    }

    fn build(label: &str, log: &CallLog, failing: bool) -> Rc<Self> {
        Rc::new(Self {
            label: label.to_string(),
            log: log.clone(),
            calls: Cell::new(0),
            failing,
            tracker: Tracker::new(),
        })
    }

    /// Records `value` as `"{label}:{value}"`.
    pub fn record(&self, value: &u32) {
        self.calls.set(self.calls.get() + 1);
        self.log.push(format!("{}:{value}", self.label));
    }

    /// Records `value`, then fails if this recorder was created with [`Self::failing`].
    ///
    /// # Errors
    ///
    /// Returns an error if this recorder is failing.
    pub fn handle(&self, value: &u32) -> anyhow::Result<()> {
        self.record(value);
        if self.failing {
            anyhow::bail!("{} failed on {value}", self.label);
        }
        Ok(())
    }

    /// Returns how many times this receiver was invoked.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Trackable for TrackedRecorder {
    fn tracker(&self) -> &Tracker {
        &self.tracker
    }
}
