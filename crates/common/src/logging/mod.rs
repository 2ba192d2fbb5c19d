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

//! A minimal logging backend for the `log` facade.
//!
//! Library code only ever logs through `log` macros. Applications (and tests) which want
//! to see those lines install the [`Logger`](logger::Logger) once, configured in code or via
//! the `HERALD_LOG` environment variable.

/// The [`Logger`](logger::Logger) backend and its configuration.
pub mod logger;

use std::{
    str::FromStr,
    sync::atomic::{AtomicBool, Ordering},
};

use log::LevelFilter;

use self::logger::{Logger, LoggerConfig};

static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);
static LOGGING_COLORED: AtomicBool = AtomicBool::new(false);

/// Returns whether the logger is installed.
pub fn logging_is_initialized() -> bool {
    LOGGING_INITIALIZED.load(Ordering::Relaxed)
}

/// Returns whether the logger is using ANSI colors.
pub fn logging_is_colored() -> bool {
    LOGGING_COLORED.load(Ordering::Relaxed)
}

/// Initialize logging.
///
/// Should only be called once during an applications run, ideally at the beginning.
///
/// # Errors
///
/// Returns an error if a logger was already installed.
pub fn init_logging(config: LoggerConfig) -> anyhow::Result<()> {
    let is_colored = config.is_colored;
    Logger::init_with_config(config)?;

    LOGGING_INITIALIZED.store(true, Ordering::Relaxed);
    LOGGING_COLORED.store(is_colored, Ordering::Relaxed);
    Ok(())
}

/// Initialize logging from the `HERALD_LOG` environment variable, if set.
///
/// Returns whether a logger was installed.
///
/// # Errors
///
/// Returns an error if the variable holds an invalid spec, or a logger was already installed.
pub fn init_logging_from_env() -> anyhow::Result<bool> {
    match std::env::var(logger::HERALD_LOG) {
        Ok(spec) => {
            init_logging(LoggerConfig::from_spec(&spec)?)?;
            Ok(true)
        }
        Err(_) => Ok(false),
    }
}

/// Parses a string into a [`LevelFilter`], accepting `WARNING` as an alias of `WARN`.
///
/// # Errors
///
/// Returns an error if `s` is not a valid level.
pub fn parse_level_filter_str(s: &str) -> anyhow::Result<LevelFilter> {
    let mut log_level_str = s.to_uppercase();
    if log_level_str == "WARNING" {
        log_level_str = "WARN".to_string();
    }
    LevelFilter::from_str(&log_level_str)
        .map_err(|_| anyhow::anyhow!("Invalid `LevelFilter` string, was {s}"))
}
