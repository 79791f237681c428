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

//! Periodic agent health monitoring.

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use itinera_common::{
    agent::{AgentRegistry, HealthSummary},
    enums::HealthStatus,
    logging::{log_task_aborted, log_task_started, log_task_stopped},
};
use itinera_core::MUTEX_POISONED;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const TASK_NAME: &str = "health-monitor";

/// Polls the agent registry for a health summary at a fixed interval.
///
/// Each check logs every DEGRADED or UNHEALTHY agent and retains the summary for inspection.
/// The first check runs immediately on start.
#[derive(Debug)]
pub struct HealthMonitor {
    registry: Arc<AgentRegistry>,
    interval: Duration,
    last_summary: Arc<Mutex<Option<HealthSummary>>>,
    check_count: Arc<AtomicU64>,
    cancel: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
}

impl HealthMonitor {
    /// Creates a new [`HealthMonitor`] instance checking the `registry` every `interval`.
    #[must_use]
    pub fn new(registry: Arc<AgentRegistry>, interval: Duration) -> Self {
        Self {
            registry,
            interval,
            last_summary: Arc::new(Mutex::new(None)),
            check_count: Arc::new(AtomicU64::new(0)),
            cancel: CancellationToken::new(),
            task_handle: None,
        }
    }

    /// Returns the interval between checks.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns whether the monitoring task is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Returns the number of checks completed.
    #[must_use]
    pub fn check_count(&self) -> u64 {
        self.check_count.load(Ordering::Acquire)
    }

    /// Returns the summary from the most recent check, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn last_summary(&self) -> Option<HealthSummary> {
        self.last_summary.lock().expect(MUTEX_POISONED).clone()
    }

    /// Starts the monitoring task on the current tokio runtime.
    ///
    /// Starting a monitor which is already running is a no-op.
    pub fn start(&mut self) {
        if self.is_running() {
            tracing::warn!("Health monitor already running");
            return;
        }

        self.cancel = CancellationToken::new();
        let cancel = self.cancel.clone();
        let registry = self.registry.clone();
        let last_summary = self.last_summary.clone();
        let check_count = self.check_count.clone();
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            log_task_started(TASK_NAME);
            let mut timer = tokio::time::interval(interval);

            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    _ = timer.tick() => {
                        let summary = check_health(&registry).await;
                        *last_summary.lock().expect(MUTEX_POISONED) = Some(summary);
                        check_count.fetch_add(1, Ordering::AcqRel);
                    }
                }
            }

            log_task_stopped(TASK_NAME);
        });

        self.task_handle = Some(handle);
    }

    /// Stops the monitoring task and waits for it to finish.
    pub async fn stop(&mut self) {
        let Some(handle) = self.task_handle.take() else {
            return;
        };

        self.cancel.cancel();
        if let Err(e) = handle.await {
            tracing::error!("Error stopping health monitor: {e}");
            log_task_aborted(TASK_NAME);
        }
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.task_handle.take()
            && !handle.is_finished()
        {
            handle.abort();
            log_task_aborted(TASK_NAME);
        }
    }
}

/// Runs a single health check against the `registry`, logging every impaired agent.
pub async fn check_health(registry: &AgentRegistry) -> HealthSummary {
    let summary = registry.get_health_summary().await;

    for report in summary.impaired() {
        let details = &report.health.details;
        match report.health.status {
            HealthStatus::Unhealthy => tracing::error!(
                agent = %report.agent,
                errors = details.errors,
                messages_processed = details.messages_processed,
                "Agent unhealthy",
            ),
            _ => tracing::warn!(
                agent = %report.agent,
                errors = details.errors,
                messages_processed = details.messages_processed,
                "Agent degraded",
            ),
        }
    }

    tracing::debug!(
        "Health check: {}/{} healthy, {} degraded, {} unhealthy, {} starting",
        summary.healthy,
        summary.total,
        summary.degraded,
        summary.unhealthy,
        summary.starting,
    );
    summary
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use itinera_common::{
        agent::{Agent, stubs::StubAgent},
        enums::AgentKind,
        msgbus::MessageBus,
    };
    use rstest::rstest;

    use super::*;

    fn registry_with_agents() -> (Arc<AgentRegistry>, Arc<StubAgent>) {
        let msgbus = MessageBus::default();
        let registry = Arc::new(AgentRegistry::new());
        let booking = Arc::new(StubAgent::new(AgentKind::Booking, msgbus.clone()));
        registry.register(booking.clone()).unwrap();
        registry
            .register(Arc::new(StubAgent::new(AgentKind::Budget, msgbus)))
            .unwrap();
        (registry, booking)
    }

    #[rstest]
    #[tokio::test]
    async fn test_check_health_counts_impaired_agents() {
        let (registry, booking) = registry_with_agents();
        booking.core().record_processed();
        booking.core().record_error();

        let summary = check_health(&registry).await;

        assert_eq!(summary.total, 2);
        assert_eq!(summary.unhealthy, 1);
        assert_eq!(summary.starting, 1);
        assert_eq!(summary.impaired()[0].agent, AgentKind::Booking);
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_monitor_checks_periodically_until_stopped() {
        let (registry, _) = registry_with_agents();
        let mut monitor = HealthMonitor::new(registry, Duration::from_millis(100));
        assert!(!monitor.is_running());
        assert!(monitor.last_summary().is_none());

        monitor.start();
        assert!(monitor.is_running());

        // Immediate first tick plus one per elapsed interval
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(monitor.check_count(), 3);
        assert_eq!(monitor.last_summary().map(|s| s.total), Some(2));

        monitor.stop().await;
        assert!(!monitor.is_running());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(monitor.check_count(), 3);
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_dropping_monitor_ends_task() {
        let (registry, _) = registry_with_agents();
        let mut monitor = HealthMonitor::new(registry.clone(), Duration::from_millis(100));
        monitor.start();
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(Arc::strong_count(&registry), 3);

        drop(monitor);
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(Arc::strong_count(&registry), 1);
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_monitor_can_restart() {
        let (registry, _) = registry_with_agents();
        let mut monitor = HealthMonitor::new(registry, Duration::from_millis(100));

        monitor.start();
        monitor.start();
        tokio::time::sleep(Duration::from_millis(50)).await;
        monitor.stop().await;
        let after_first = monitor.check_count();

        monitor.start();
        tokio::time::sleep(Duration::from_millis(50)).await;
        monitor.stop().await;

        assert_eq!(after_first, 1);
        assert_eq!(monitor.check_count(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn test_stop_without_start_is_noop() {
        let (registry, _) = registry_with_agents();
        let mut monitor = HealthMonitor::new(registry, Duration::from_millis(100));
        monitor.stop().await;
        assert_eq!(monitor.check_count(), 0);
    }
}
