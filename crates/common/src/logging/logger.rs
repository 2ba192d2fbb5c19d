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

use std::{
    env,
    io::{self, Write},
};

use ahash::AHashMap;
use log::{Level, LevelFilter, Log, set_boxed_logger, set_max_level};
use ustr::Ustr;

use super::parse_level_filter_str;

/// The environment variable holding a logger spec string.
pub const HERALD_LOG: &str = "HERALD_LOG";

const ANSI_RESET: &str = "\x1b[0m";

/// Configuration for the [`Logger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Maximum log level to write to stdout.
    pub stdout_level: LevelFilter,
    /// Per-component log levels, keyed by module path prefix.
    component_level: AHashMap<Ustr, LevelFilter>,
    /// If logger is using ANSI color codes.
    pub is_colored: bool,
    /// If the configuration should be printed to stdout at initialization.
    pub print_config: bool,
}

impl Default for LoggerConfig {
    /// Creates a new default [`LoggerConfig`] instance.
    fn default() -> Self {
        Self {
            stdout_level: LevelFilter::Info,
            component_level: AHashMap::new(),
            is_colored: false,
            print_config: false,
        }
    }
}

impl LoggerConfig {
    /// Creates a new [`LoggerConfig`] instance.
    #[must_use]
    pub const fn new(
        stdout_level: LevelFilter,
        component_level: AHashMap<Ustr, LevelFilter>,
        is_colored: bool,
        print_config: bool,
    ) -> Self {
        Self {
            stdout_level,
            component_level,
            is_colored,
            print_config,
        }
    }

    /// Parses a spec string such as `"stdout=debug;herald_common::notifier=trace;is_colored"`.
    ///
    /// # Errors
    ///
    /// Returns an error if a pair is malformed or names an unknown level.
    pub fn from_spec(spec: &str) -> anyhow::Result<Self> {
        let mut config = Self::default();
        for kv in spec.split(';') {
            let kv = kv.trim();
            if kv.is_empty() {
                continue;
            }
            let kv_lower = kv.to_lowercase(); // For case-insensitive comparison
            if kv_lower == "is_colored" {
                config.is_colored = true;
            } else if kv_lower == "print_config" {
                config.print_config = true;
            } else {
                let Some((k, v)) = kv.split_once('=') else {
                    anyhow::bail!("Invalid spec pair: {kv}");
                };
                let k = k.trim();
                let lvl = parse_level_filter_str(v.trim())?;
                if k.is_empty() {
                    anyhow::bail!("Invalid spec pair: {kv}");
                }
                if k.eq_ignore_ascii_case("stdout") {
                    config.stdout_level = lvl;
                } else {
                    config.component_level.insert(Ustr::from(k), lvl);
                }
            }
        }
        Ok(config)
    }

    /// Retrieves the logger configuration from the "`HERALD_LOG`" environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is unset or invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        let spec = env::var(HERALD_LOG)?;
        Self::from_spec(&spec)
    }

    /// Returns the per-component log levels.
    #[must_use]
    pub const fn component_level(&self) -> &AHashMap<Ustr, LevelFilter> {
        &self.component_level
    }

    /// Returns the most verbose level any destination or component accepts.
    #[must_use]
    pub fn max_level(&self) -> LevelFilter {
        self.component_level
            .values()
            .copied()
            .fold(self.stdout_level, Ord::max)
    }

    /// Returns the level filter which applies to records from `target`.
    ///
    /// The longest component whose path equals `target`, or is a module path prefix of it,
    /// wins over the stdout level.
    #[must_use]
    pub fn level_for(&self, target: &str) -> LevelFilter {
        self.component_level
            .iter()
            .filter(|(component, _)| is_component_of(component, target))
            .max_by_key(|(component, _)| component.len())
            .map_or(self.stdout_level, |(_, level)| *level)
    }
}

fn is_component_of(component: &str, target: &str) -> bool {
    match target.strip_prefix(component) {
        Some(rest) => rest.is_empty() || rest.starts_with("::"),
        None => false,
    }
}

/// Returns the ANSI color for a log `level`.
#[must_use]
pub const fn level_color(level: Level) -> &'static str {
    match level {
        Level::Error => "\x1b[1;31m",
        Level::Warn => "\x1b[1;33m",
        Level::Info => "",
        Level::Debug => "\x1b[36m",
        Level::Trace => "\x1b[35m",
    }
}

/// A synchronous logger writing errors and warnings to stderr, everything else to stdout.
///
/// Per-component levels are matched against the record target (the module path by default).
#[derive(Debug)]
pub struct Logger {
    /// Configuration for logging levels and behavior.
    pub config: LoggerConfig,
}

impl Logger {
    /// Creates a new [`Logger`] instance.
    #[must_use]
    pub const fn new(config: LoggerConfig) -> Self {
        Self { config }
    }

    /// Installs a [`Logger`] as the global `log` implementation.
    ///
    /// # Errors
    ///
    /// Returns an error if a global logger was already installed.
    pub fn init_with_config(config: LoggerConfig) -> anyhow::Result<()> {
        let max_level = config.max_level();
        let print_config = config.print_config;
        let logger = Self::new(config);

        if print_config {
            println!("Logger initialized with {:?}", logger.config);
        }

        set_boxed_logger(Box::new(logger))
            .map_err(|e| anyhow::anyhow!("Failed to set logger: {e}"))?;
        set_max_level(max_level);

        Ok(())
    }

    /// Formats a single line for `level`, `target` and `message`.
    #[must_use]
    pub fn format_line(&self, level: Level, target: &str, message: &str) -> String {
        if self.config.is_colored {
            format!(
                "{}[{level}] {target}: {message}{ANSI_RESET}\n",
                level_color(level)
            )
        } else {
            format!("[{level}] {target}: {message}\n")
        }
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.config.level_for(metadata.target())
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = self.format_line(
            record.level(),
            record.target(),
            &format!("{}", record.args()),
        );

        let result = match record.level() {
            Level::Error | Level::Warn => io::stderr().lock().write_all(line.as_bytes()),
            _ => io::stdout().lock().write_all(line.as_bytes()),
        };
        if let Err(e) = result {
            eprintln!("Error writing log line: {e}");
        }
    }

    fn flush(&self) {
        if let Err(e) = io::stdout().flush() {
            eprintln!("Error flushing stdout: {e}");
        }
    }
}
