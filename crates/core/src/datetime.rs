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

//! Common date and time functions.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};

/// Number of milliseconds in one second.
pub const MILLISECONDS_IN_SECOND: u64 = 1_000;

/// Number of milliseconds in one minute.
pub const MILLISECONDS_IN_MINUTE: u64 = 60 * MILLISECONDS_IN_SECOND;

/// Returns the number of whole milliseconds elapsed from `start` to `end`.
///
/// Returns zero when `end` is before `start` (e.g. after a wall clock adjustment).
#[must_use]
pub fn millis_between(start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    let millis = (end - start).num_milliseconds();
    u64::try_from(millis).unwrap_or(0)
}

/// Returns the number of whole milliseconds elapsed since `start` (saturating at zero).
#[must_use]
pub fn millis_since(start: DateTime<Utc>) -> u64 {
    millis_between(start, Utc::now())
}

/// Converts a [`Duration`] to whole milliseconds, saturating at `u64::MAX`.
#[must_use]
pub fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Formats the `datetime` as an ISO 8601 (RFC 3339) string with millisecond precision.
#[must_use]
pub fn format_iso8601_millis(datetime: DateTime<Utc>) -> String {
    datetime.to_rfc3339_opts(SecondsFormat::Millis, true)
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(1_500, 1_500)]
    #[case(-250, 0)]
    fn test_millis_between(#[case] delta_ms: i64, #[case] expected: u64) {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let end = start + TimeDelta::milliseconds(delta_ms);
        assert_eq!(millis_between(start, end), expected);
    }

    #[rstest]
    fn test_millis_since_past_instant() {
        let start = Utc::now() - TimeDelta::seconds(2);
        assert!(millis_since(start) >= 2_000);
    }

    #[rstest]
    #[case(Duration::from_millis(50), 50)]
    #[case(Duration::from_secs(30), 30_000)]
    #[case(Duration::from_micros(1_999), 1)]
    #[case(Duration::MAX, u64::MAX)]
    fn test_duration_to_millis(#[case] duration: Duration, #[case] expected: u64) {
        assert_eq!(duration_to_millis(duration), expected);
    }

    #[rstest]
    fn test_format_iso8601_millis() {
        let datetime = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 5).unwrap()
            + TimeDelta::milliseconds(42);
        assert_eq!(format_iso8601_millis(datetime), "2025-03-01T12:30:05.042Z");
    }

    #[rstest]
    fn test_minute_constant() {
        assert_eq!(MILLISECONDS_IN_MINUTE, 60_000);
    }
}
