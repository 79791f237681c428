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

//! Configuration for the system kernel.

use std::path::Path;

use anyhow::Context;
use itinera_common::{logging::LoggingConfig, msgbus::MessageBusConfig};
use itinera_core::{
    UUID4,
    correctness::{check_positive_u64, check_valid_string_ascii},
};
use itinera_trip::PlannerConfig;
use serde::{Deserialize, Serialize};

/// The default kernel name.
pub const DEFAULT_KERNEL_NAME: &str = "ITINERA-001";

/// Configuration for an [`ItineraKernel`](crate::ItineraKernel).
///
/// Every field is optional in serialized form and falls back to its default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KernelConfig {
    /// The kernel name, used for identification in logs and status reports.
    pub name: String,
    /// The unique instance ID, generated on kernel creation when absent.
    pub instance_id: Option<UUID4>,
    /// The logging configuration.
    pub logging: LoggingConfig,
    /// The message bus configuration.
    pub msgbus: MessageBusConfig,
    /// The trip planner configuration.
    pub planner: PlannerConfig,
    /// The interval between periodic agent health checks (milliseconds), disabled when absent.
    pub health_check_interval_ms: Option<u64>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_KERNEL_NAME.to_string(),
            instance_id: None,
            logging: LoggingConfig::default(),
            msgbus: MessageBusConfig::default(),
            planner: PlannerConfig::default(),
            health_check_interval_ms: None,
        }
    }
}

impl KernelConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for a configuration, or if validation fails.
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse kernel config")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration from the TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, or if [`KernelConfig::from_toml_str`] fails.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read kernel config {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Encodes the configuration as TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any section is invalid.
    pub fn validate(&self) -> anyhow::Result<()> {
        check_valid_string_ascii(&self.name, stringify!(name))?;
        self.logging.validate()?;
        self.msgbus.validate()?;
        self.planner.validate()?;
        if let Some(interval_ms) = self.health_check_interval_ms {
            check_positive_u64(interval_ms, stringify!(health_check_interval_ms))?;
        }
        Ok(())
    }
}
