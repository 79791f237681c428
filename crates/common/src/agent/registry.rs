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
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use futures::future::join_all;
use indexmap::IndexMap;
use itinera_core::MUTEX_POISONED;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Agent, AgentLifecycle, context::AgentContext, health::AgentHealth};
use crate::enums::{AgentKind, HealthStatus};

/// Errors returned by the [`AgentRegistry`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// An agent with the same identity is already registered.
    #[error("Agent {0} is already registered")]
    AlreadyRegistered(AgentKind),
    /// One or more agents failed to initialize.
    #[error("Failed to initialize agents {agents:?}: {details}")]
    InitializationFailed {
        /// The agents which failed.
        agents: Vec<AgentKind>,
        /// The failure messages, one per failed agent.
        details: String,
    },
}

/// The health of one registered agent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentHealthReport {
    /// The agent identity.
    pub agent: AgentKind,
    /// The agent health.
    pub health: AgentHealth,
}

/// Aggregate health of all registered agents.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSummary {
    /// The number of registered agents.
    pub total: usize,
    /// The number of HEALTHY agents.
    pub healthy: usize,
    /// The number of DEGRADED agents.
    pub degraded: usize,
    /// The number of UNHEALTHY agents.
    pub unhealthy: usize,
    /// The number of STARTING agents.
    pub starting: usize,
    /// Whether every registered agent is HEALTHY.
    pub all_healthy: bool,
    /// Per-agent health in registration order.
    pub agents: Vec<AgentHealthReport>,
}

impl HealthSummary {
    /// Creates a new [`HealthSummary`] by tallying the `agents` reports.
    #[must_use]
    pub fn from_reports(agents: Vec<AgentHealthReport>) -> Self {
        let mut summary = Self {
            total: agents.len(),
            ..Default::default()
        };

        for report in &agents {
            match report.health.status {
                HealthStatus::Healthy => summary.healthy += 1,
                HealthStatus::Degraded => summary.degraded += 1,
                HealthStatus::Unhealthy => summary.unhealthy += 1,
                HealthStatus::Starting => summary.starting += 1,
            }
        }

        summary.all_healthy = summary.healthy == summary.total;
        summary.agents = agents;
        summary
    }

    /// Returns the reports for agents which are DEGRADED or UNHEALTHY.
    #[must_use]
    pub fn impaired(&self) -> Vec<&AgentHealthReport> {
        self.agents
            .iter()
            .filter(|report| {
                matches!(
                    report.health.status,
                    HealthStatus::Degraded | HealthStatus::Unhealthy
                )
            })
            .collect()
    }
}

/// Registry owning the set of live agents, at most one per identity.
///
/// Coordinates bulk initialization, shutdown and health reporting. Bulk operations run on
/// every agent concurrently and wait for all of them to settle.
pub struct AgentRegistry {
    agents: Mutex<IndexMap<AgentKind, Arc<dyn Agent>>>,
    initialized: AtomicBool,
}

impl Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(AgentRegistry))
            .field("agents", &self.kinds())
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentRegistry {
    /// Creates a new empty [`AgentRegistry`] instance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            agents: Mutex::new(IndexMap::new()),
            initialized: AtomicBool::new(false),
        }
    }

    /// Registers the `agent` under its identity.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyRegistered`] if an agent with the same identity exists.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn register(&self, agent: Arc<dyn Agent>) -> Result<(), RegistryError> {
        let kind = agent.kind();
        let mut agents = self.agents.lock().expect(MUTEX_POISONED);
        if agents.contains_key(&kind) {
            return Err(RegistryError::AlreadyRegistered(kind));
        }
        agents.insert(kind, agent);
        tracing::debug!(agent = %kind, "Registered agent");
        Ok(())
    }

    /// Returns the agent registered under `kind`, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn get(&self, kind: AgentKind) -> Option<Arc<dyn Agent>> {
        self.agents.lock().expect(MUTEX_POISONED).get(&kind).cloned()
    }

    /// Checks if an agent with the `kind` identity is registered.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn contains(&self, kind: AgentKind) -> bool {
        self.agents.lock().expect(MUTEX_POISONED).contains_key(&kind)
    }

    /// Returns the registered identities in registration order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn kinds(&self) -> Vec<AgentKind> {
        self.agents.lock().expect(MUTEX_POISONED).keys().copied().collect()
    }

    /// Returns the number of registered agents.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.lock().expect(MUTEX_POISONED).len()
    }

    /// Checks if the registry is empty.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.lock().expect(MUTEX_POISONED).is_empty()
    }

    /// Returns whether [`AgentRegistry::initialize_all`] has completed successfully since the
    /// last shutdown.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    fn snapshot(&self) -> Vec<Arc<dyn Agent>> {
        self.agents
            .lock()
            .expect(MUTEX_POISONED)
            .values()
            .cloned()
            .collect()
    }

    /// Initializes every registered agent concurrently with the `context`.
    ///
    /// Every agent is attempted even if others fail. There is no rollback on failure; the
    /// caller may call [`AgentRegistry::shutdown_all`] to release partially initialized agents.
    /// Calling this again once initialized is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InitializationFailed`] naming every agent which failed,
    /// in which case the registry remains uninitialized.
    pub async fn initialize_all(&self, context: &AgentContext) -> Result<(), RegistryError> {
        if self.is_initialized() {
            tracing::warn!("Agents already initialized");
            return Ok(());
        }

        let agents = self.snapshot();
        tracing::info!("Initializing {} agents", agents.len());

        let results = join_all(agents.iter().map(|agent| async move {
            (agent.kind(), agent.initialize(context.clone()).await)
        }))
        .await;

        let failures: Vec<(AgentKind, anyhow::Error)> = results
            .into_iter()
            .filter_map(|(kind, result)| result.err().map(|e| (kind, e)))
            .collect();

        if failures.is_empty() {
            self.initialized.store(true, Ordering::Release);
            tracing::info!("Initialized all agents");
            return Ok(());
        }

        for (kind, e) in &failures {
            tracing::error!(agent = %kind, "{e:#}");
        }

        Err(RegistryError::InitializationFailed {
            agents: failures.iter().map(|(kind, _)| *kind).collect(),
            details: failures
                .iter()
                .map(|(kind, e)| format!("{kind}: {e:#}"))
                .collect::<Vec<_>>()
                .join("; "),
        })
    }

    /// Shuts down every registered agent concurrently.
    ///
    /// Individual failures are logged and do not prevent the other agents from shutting down.
    /// Clears the initialized flag.
    pub async fn shutdown_all(&self) {
        let agents = self.snapshot();
        tracing::info!("Shutting down {} agents", agents.len());

        let results = join_all(
            agents
                .iter()
                .map(|agent| async move { (agent.kind(), agent.shutdown().await) }),
        )
        .await;

        for (kind, result) in results {
            if let Err(e) = result {
                tracing::error!(agent = %kind, "{e:#}");
            }
        }

        self.initialized.store(false, Ordering::Release);
        tracing::info!("Shut down all agents");
    }

    /// Returns the aggregate health of every registered agent, checked concurrently.
    pub async fn get_health_summary(&self) -> HealthSummary {
        let agents = self.snapshot();
        let reports = join_all(agents.iter().map(|agent| async move {
            AgentHealthReport {
                agent: agent.kind(),
                health: agent.health_check().await,
            }
        }))
        .await;

        HealthSummary::from_reports(reports)
    }
}
