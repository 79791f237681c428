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

//! Agent health derived from message counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::HealthStatus;

/// Error rates above this threshold report [`HealthStatus::Degraded`].
pub const DEGRADED_ERROR_RATE: f64 = 0.1;

/// Error rates above this threshold report [`HealthStatus::Unhealthy`].
pub const UNHEALTHY_ERROR_RATE: f64 = 0.5;

/// Returns the ratio of `errors` to `messages_processed` (zero when nothing was processed).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn error_rate(messages_processed: u64, errors: u64) -> f64 {
    if messages_processed == 0 {
        return 0.0;
    }
    errors as f64 / messages_processed as f64
}

/// Computes the health status from the message counters.
#[must_use]
pub fn compute_health_status(messages_processed: u64, errors: u64) -> HealthStatus {
    if messages_processed == 0 {
        return HealthStatus::Starting;
    }

    let rate = error_rate(messages_processed, errors);
    if rate > UNHEALTHY_ERROR_RATE {
        HealthStatus::Unhealthy
    } else if rate > DEGRADED_ERROR_RATE {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}

/// Counter details backing an [`AgentHealth`] report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthDetails {
    /// Milliseconds since the agent was created.
    pub uptime_ms: u64,
    /// The number of messages delivered to the agent.
    pub messages_processed: u64,
    /// The number of messages the agent failed to handle.
    pub errors: u64,
}

/// The health of a single agent at a point in time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentHealth {
    /// The computed status.
    pub status: HealthStatus,
    /// When the health was computed.
    pub last_check_at: DateTime<Utc>,
    /// The counters the status was computed from.
    pub details: HealthDetails,
}

impl AgentHealth {
    /// Creates a new [`AgentHealth`] computed from the given counters.
    #[must_use]
    pub fn from_counters(uptime_ms: u64, messages_processed: u64, errors: u64) -> Self {
        Self {
            status: compute_health_status(messages_processed, errors),
            last_check_at: Utc::now(),
            details: HealthDetails {
                uptime_ms,
                messages_processed,
                errors,
            },
        }
    }

    /// Returns the error rate of the underlying counters.
    #[must_use]
    pub fn error_rate(&self) -> f64 {
        error_rate(self.details.messages_processed, self.details.errors)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, 0, HealthStatus::Starting)]
    #[case(10, 0, HealthStatus::Healthy)]
    #[case(10, 1, HealthStatus::Healthy)] // <-- exactly 10% is not degraded
    #[case(100, 11, HealthStatus::Degraded)]
    #[case(10, 5, HealthStatus::Degraded)] // <-- exactly 50% is not unhealthy
    #[case(100, 51, HealthStatus::Unhealthy)]
    #[case(1, 1, HealthStatus::Unhealthy)]
    fn test_compute_health_status(
        #[case] processed: u64,
        #[case] errors: u64,
        #[case] expected: HealthStatus,
    ) {
        assert_eq!(compute_health_status(processed, errors), expected);
    }

    #[rstest]
    fn test_from_counters() {
        let health = AgentHealth::from_counters(1_500, 20, 4);
        assert_eq!(health.status, HealthStatus::Degraded);
        assert_eq!(health.details.uptime_ms, 1_500);
        assert!((health.error_rate() - 0.2).abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn prop_status_matches_error_rate(processed in 1u64..10_000, error_pct in 0u64..=100) {
            let errors = processed * error_pct / 100;
            let status = compute_health_status(processed, errors);
            let rate = error_rate(processed, errors);

            match status {
                HealthStatus::Starting => prop_assert!(false, "processed > 0 is never STARTING"),
                HealthStatus::Healthy => prop_assert!(rate <= DEGRADED_ERROR_RATE),
                HealthStatus::Degraded => {
                    prop_assert!(rate > DEGRADED_ERROR_RATE && rate <= UNHEALTHY_ERROR_RATE);
                }
                HealthStatus::Unhealthy => prop_assert!(rate > UNHEALTHY_ERROR_RATE),
            }
        }

        #[test]
        fn prop_more_errors_never_improves_status(processed in 1u64..1_000, errors in 0u64..1_000) {
            let errors = errors.min(processed);
            let before = compute_health_status(processed, errors);
            let after = compute_health_status(processed, (errors + 1).min(processed));
            prop_assert!(after >= before);
        }
    }
}
