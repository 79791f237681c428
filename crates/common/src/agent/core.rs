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
    fmt::Debug,
    sync::{
        Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use chrono::{DateTime, Utc};
use itinera_core::{MUTEX_POISONED, datetime::millis_since};

use super::{context::AgentContext, health::AgentHealth};
use crate::{
    enums::{AgentKind, HealthStatus},
    msgbus::{MessageBus, SubscriptionHandle},
};

/// The state shared by every [`Agent`](super::Agent) implementation.
///
/// Holds the agent identity, the bus handle, the context supplied on initialization, the
/// bus subscription, the message counters and the last known health status.
pub struct AgentCore {
    kind: AgentKind,
    msgbus: MessageBus,
    context: Mutex<Option<AgentContext>>,
    subscription: Mutex<Option<SubscriptionHandle>>,
    status: Mutex<HealthStatus>,
    messages_processed: AtomicU64,
    errors: AtomicU64,
    created_at: DateTime<Utc>,
}

impl Debug for AgentCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(AgentCore))
            .field("kind", &self.kind)
            .field("status", &self.status())
            .field("messages_processed", &self.messages_processed())
            .field("errors", &self.errors())
            .field("is_subscribed", &self.is_subscribed())
            .finish()
    }
}

impl AgentCore {
    /// Creates a new [`AgentCore`] instance for the `kind` identity on the `msgbus`.
    #[must_use]
    pub fn new(kind: AgentKind, msgbus: MessageBus) -> Self {
        Self {
            kind,
            msgbus,
            context: Mutex::new(None),
            subscription: Mutex::new(None),
            status: Mutex::new(HealthStatus::Starting),
            messages_processed: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            created_at: Utc::now(),
        }
    }

    /// Returns the agent identity.
    #[must_use]
    pub const fn kind(&self) -> AgentKind {
        self.kind
    }

    /// Returns the message bus the agent is connected to.
    #[must_use]
    pub const fn msgbus(&self) -> &MessageBus {
        &self.msgbus
    }

    /// Returns the context supplied on initialization, if initialized.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn context(&self) -> Option<AgentContext> {
        self.context.lock().expect(MUTEX_POISONED).clone()
    }

    pub(crate) fn set_context(&self, context: AgentContext) {
        *self.context.lock().expect(MUTEX_POISONED) = Some(context);
    }

    /// Returns the last known health status.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn status(&self) -> HealthStatus {
        *self.status.lock().expect(MUTEX_POISONED)
    }

    /// Sets the health status.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn set_status(&self, status: HealthStatus) {
        *self.status.lock().expect(MUTEX_POISONED) = status;
    }

    /// Returns the number of messages delivered to the agent.
    #[must_use]
    pub fn messages_processed(&self) -> u64 {
        self.messages_processed.load(Ordering::Relaxed)
    }

    /// Returns the number of messages the agent failed to handle.
    #[must_use]
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Records that a message was delivered to the agent.
    pub fn record_processed(&self) {
        self.messages_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records that the agent failed to handle a message, demoting the status to DEGRADED.
    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        self.set_status(HealthStatus::Degraded);
    }

    /// Returns whether the agent is currently subscribed to the bus.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.subscription
            .lock()
            .expect(MUTEX_POISONED)
            .as_ref()
            .is_some_and(SubscriptionHandle::is_active)
    }

    pub(crate) fn set_subscription(&self, handle: SubscriptionHandle) {
        *self.subscription.lock().expect(MUTEX_POISONED) = Some(handle);
    }

    pub(crate) fn take_subscription(&self) -> Option<SubscriptionHandle> {
        self.subscription.lock().expect(MUTEX_POISONED).take()
    }

    /// Returns when the agent was created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the milliseconds elapsed since the agent was created.
    #[must_use]
    pub fn uptime_ms(&self) -> u64 {
        millis_since(self.created_at)
    }

    /// Computes the health from the current counters and stores the resulting status.
    #[must_use]
    pub fn health(&self) -> AgentHealth {
        let health =
            AgentHealth::from_counters(self.uptime_ms(), self.messages_processed(), self.errors());
        self.set_status(health.status);
        health
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
    fn test_new_core() {
        let core = AgentCore::new(AgentKind::Budget, MessageBus::default());

        assert_eq!(core.kind(), AgentKind::Budget);
        assert_eq!(core.status(), HealthStatus::Starting);
        assert_eq!(core.messages_processed(), 0);
        assert_eq!(core.errors(), 0);
        assert!(core.context().is_none());
        assert!(!core.is_subscribed());
    }

    #[rstest]
    fn test_record_error_demotes_status() {
        let core = AgentCore::new(AgentKind::Budget, MessageBus::default());
        core.set_status(HealthStatus::Healthy);

        core.record_processed();
        core.record_error();

        assert_eq!(core.status(), HealthStatus::Degraded);
        assert_eq!(core.errors(), 1);
    }

    #[rstest]
    #[case(0, 0, HealthStatus::Starting)]
    #[case(20, 0, HealthStatus::Healthy)]
    #[case(20, 3, HealthStatus::Degraded)]
    #[case(20, 11, HealthStatus::Unhealthy)]
    fn test_health_recomputes_status(
        #[case] processed: u64,
        #[case] errors: u64,
        #[case] expected: HealthStatus,
    ) {
        let core = AgentCore::new(AgentKind::Optimization, MessageBus::default());
        for _ in 0..processed {
            core.record_processed();
        }
        for _ in 0..errors {
            core.record_error();
        }

        let health = core.health();

        assert_eq!(health.status, expected);
        assert_eq!(core.status(), expected);
        assert_eq!(health.details.messages_processed, processed);
        assert_eq!(health.details.errors, errors);
    }
}
