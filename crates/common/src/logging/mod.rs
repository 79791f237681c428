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

//! The logging framework for Itinera.

pub mod config;

use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::EnvFilter;

// Re-exports
pub use crate::logging::config::{ENV_LOG, LoggingConfig, parse_level_filter_str};
use crate::enums::MessageType;

pub const RECV: &str = "<--";
pub const SEND: &str = "-->";
pub const REQ: &str = "[REQ]";
pub const RES: &str = "[RES]";
pub const EVT: &str = "[EVT]";
pub const ALR: &str = "[ALR]";

static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Returns whether the logging subscriber has been installed.
pub fn logging_is_initialized() -> bool {
    LOGGING_INITIALIZED.load(Ordering::Acquire)
}

/// Returns the log marker for the `message_type`.
#[must_use]
pub const fn message_type_marker(message_type: MessageType) -> &'static str {
    match message_type {
        MessageType::Request => REQ,
        MessageType::Response => RES,
        MessageType::Event => EVT,
        MessageType::Alert => ALR,
    }
}

/// Initialize logging.
///
/// Installs a global `tracing` fmt subscriber filtered by the `config` levels.
/// The configuration can be overridden by setting the `ITINERA_LOG` environment variable to a
/// spec string (see [`LoggingConfig::from_env`]).
///
/// Calling this function again after a successful initialization is a no-op.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the subscriber fails to initialize.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    if logging_is_initialized() {
        return Ok(());
    }

    let config = LoggingConfig::from_env()?.unwrap_or_else(|| config.clone());
    let env_filter = EnvFilter::try_new(config.env_filter_directives()?)?;

    // Only the first of any concurrent callers installs the subscriber
    if LOGGING_INITIALIZED
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        return Ok(());
    }

    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(config.ansi)
        .with_target(true)
        .try_init()
    {
        LOGGING_INITIALIZED.store(false, Ordering::Release);
        anyhow::bail!("Failed to initialize tracing subscriber: {e}");
    }

    tracing::debug!("Initialized logging with {config:?}");
    Ok(())
}

/// Logs that a task has started using `tracing::debug!`.
pub fn log_task_started(task_name: &str) {
    tracing::debug!("Started task '{task_name}'");
}

/// Logs that a task has stopped using `tracing::debug!`.
pub fn log_task_stopped(task_name: &str) {
    tracing::debug!("Stopped task '{task_name}'");
}

/// Logs that a task was aborted using `tracing::debug!`.
pub fn log_task_aborted(task_name: &str) {
    tracing::debug!("Aborted task '{task_name}'");
}
