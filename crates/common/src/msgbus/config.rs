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

use std::time::Duration;

use itinera_core::correctness::{check_positive_u64, check_positive_usize};
use serde::{Deserialize, Serialize};

/// The default number of envelopes retained in the message log.
pub const DEFAULT_MAX_LOG_SIZE: usize = 1_000;

/// The default request timeout (milliseconds).
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Configuration for `MessageBus` instances.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MessageBusConfig {
    /// The maximum number of envelopes retained in the message log (oldest evicted first).
    pub max_log_size: usize,
    /// The timeout applied to requests which do not specify one (milliseconds).
    pub default_request_timeout_ms: u64,
}

impl Default for MessageBusConfig {
    fn default() -> Self {
        Self {
            max_log_size: DEFAULT_MAX_LOG_SIZE,
            default_request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl MessageBusConfig {
    /// Returns the default request timeout as a [`Duration`].
    #[must_use]
    pub const fn default_request_timeout(&self) -> Duration {
        Duration::from_millis(self.default_request_timeout_ms)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_log_size` or `default_request_timeout_ms` is zero.
    pub fn validate(&self) -> anyhow::Result<()> {
        check_positive_usize(self.max_log_size, "max_log_size")?;
        check_positive_u64(self.default_request_timeout_ms, "default_request_timeout_ms")?;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_default() {
        let config = MessageBusConfig::default();
        assert_eq!(config.max_log_size, 1_000);
        assert_eq!(config.default_request_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[rstest]
    fn test_deserialize_partial_uses_defaults() {
        let config: MessageBusConfig = serde_json::from_str(r#"{"max_log_size": 5}"#).unwrap();
        assert_eq!(config.max_log_size, 5);
        assert_eq!(config.default_request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
    }

    #[rstest]
    fn test_deserialize_unknown_field_fails() {
        let result: Result<MessageBusConfig, _> = serde_json::from_str(r#"{"max_logs": 5}"#);
        assert!(result.is_err());
    }

    #[rstest]
    #[case(0, 100)]
    #[case(100, 0)]
    fn test_validate_rejects_zero(#[case] max_log_size: usize, #[case] timeout_ms: u64) {
        let config = MessageBusConfig {
            max_log_size,
            default_request_timeout_ms: timeout_ms,
        };
        assert!(config.validate().is_err());
    }
}
