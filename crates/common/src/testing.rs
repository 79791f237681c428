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

use std::{future::Future, time::Duration};

use tokio::time::Instant;

use crate::logging::{LoggingConfig, init_logging};

/// Initializes logging at TRACE level for tests, honoring `ITINERA_LOG` if set.
///
/// # Errors
///
/// Returns an error if the logging configuration is invalid.
pub fn init_logging_for_testing() -> anyhow::Result<()> {
    let config = LoggingConfig {
        level: "TRACE".to_string(),
        ansi: false,
        ..Default::default()
    };
    init_logging(&config)
}

/// Repeatedly evaluates a condition with a delay until it becomes true or a timeout occurs.
///
/// Time is measured with the tokio clock, so the wait also works with a paused runtime.
///
/// # Panics
///
/// This function will panic if the timeout duration is exceeded without the condition being met.
pub async fn wait_until<F>(mut condition: F, timeout: Duration)
where
    F: FnMut() -> bool,
{
    let start_time = Instant::now();

    loop {
        if condition() {
            break;
        }

        assert!(
            start_time.elapsed() <= timeout,
            "Timeout waiting for condition"
        );

        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Repeatedly evaluates an async condition with a delay until it becomes true or a timeout
/// occurs.
///
/// # Panics
///
/// This function will panic if the timeout duration is exceeded without the condition being met.
pub async fn wait_until_async<F, Fut>(mut condition: F, timeout: Duration)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let start_time = Instant::now();

    loop {
        if condition().await {
            break;
        }

        assert!(
            start_time.elapsed() <= timeout,
            "Timeout waiting for condition"
        );

        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_init_logging_for_testing() {
        init_logging_for_testing().unwrap();
        init_logging_for_testing().unwrap();

        assert!(crate::logging::logging_is_initialized());
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_wait_until_polls_until_true() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        wait_until(
            move || counter.fetch_add(1, Ordering::SeqCst) >= 3,
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    #[should_panic(expected = "Timeout waiting for condition")]
    async fn test_wait_until_async_times_out() {
        wait_until_async(|| async { false }, Duration::from_millis(50)).await;
    }
}
