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

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use chrono::{DateTime, Utc};
use itinera_common::{
    agent::{Agent, AgentContext, AgentRegistry, HealthSummary, RegistryError},
    logging::init_logging,
    msgbus::{BusStats, MessageBus},
};
use itinera_core::UUID4;
use itinera_trip::TripPlanner;
use serde::{Deserialize, Serialize};
use ustr::Ustr;

use crate::{config::KernelConfig, monitor::HealthMonitor};

/// A point-in-time report on the whole system.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatus {
    /// The kernel name.
    pub name: Ustr,
    /// The kernel instance ID.
    pub instance_id: UUID4,
    /// Whether every registered agent is initialized.
    pub initialized: bool,
    /// Aggregate agent health.
    pub health: HealthSummary,
    /// Message bus statistics.
    pub bus: BusStats,
}

/// Core Itinera system kernel.
///
/// Owns the message bus and the agent registry, and drives the agent lifecycle. Nothing is
/// global: every agent is constructed against the bus handle returned by
/// [`ItineraKernel::msgbus`].
#[derive(Debug)]
pub struct ItineraKernel {
    /// The kernel name (for logging and identification).
    pub name: Ustr,
    /// The unique instance identifier for this kernel.
    pub instance_id: UUID4,
    /// The kernel configuration.
    pub config: KernelConfig,
    /// When the kernel was created.
    pub created_at: DateTime<Utc>,
    /// When the kernel was last started.
    pub started_at: Option<DateTime<Utc>>,
    /// When the kernel was last stopped.
    pub stopped_at: Option<DateTime<Utc>>,
    msgbus: MessageBus,
    registry: Arc<AgentRegistry>,
    monitor: Option<HealthMonitor>,
}

impl ItineraKernel {
    /// Creates a new [`ItineraKernel`] instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or logging fails to initialize.
    pub fn new(config: KernelConfig) -> anyhow::Result<Self> {
        config.validate()?;
        init_logging(&config.logging)?;

        let name = Ustr::from(&config.name);
        let instance_id = config.instance_id.unwrap_or_default();
        tracing::info!("Building system kernel {name} ({instance_id})");

        let msgbus = MessageBus::new(config.msgbus.clone());
        let registry = Arc::new(AgentRegistry::new());

        Ok(Self {
            name,
            instance_id,
            config,
            created_at: Utc::now(),
            started_at: None,
            stopped_at: None,
            msgbus,
            registry,
            monitor: None,
        })
    }

    /// Returns the message bus agents should be constructed with.
    #[must_use]
    pub const fn msgbus(&self) -> &MessageBus {
        &self.msgbus
    }

    /// Returns the agent registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    /// Returns the health monitor, if running.
    #[must_use]
    pub const fn monitor(&self) -> Option<&HealthMonitor> {
        self.monitor.as_ref()
    }

    /// Returns whether the kernel has been started and not since stopped.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && self.registry.is_initialized()
    }

    /// Registers the `agent`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyRegistered`] if an agent with the same identity exists.
    pub fn register(&self, agent: Arc<dyn Agent>) -> Result<(), RegistryError> {
        self.registry.register(agent)
    }

    /// Creates the trip planner from the kernel configuration and registers it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyRegistered`] if an orchestrator is already registered.
    pub fn register_planner(&self) -> Result<Arc<TripPlanner>, RegistryError> {
        let planner = Arc::new(TripPlanner::new(
            self.msgbus.clone(),
            self.config.planner.clone(),
        ));
        self.register(planner.clone())?;
        Ok(planner)
    }

    /// Starts the kernel, initializing every registered agent with the `context`.
    ///
    /// If any agent fails to initialize, the partially initialized set is shut down again.
    /// Starts the health monitor when a check interval is configured. Starting a kernel which
    /// is already running is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if any agent fails to initialize.
    pub async fn start(&mut self, context: AgentContext) -> anyhow::Result<()> {
        if self.is_running() {
            tracing::warn!("Kernel {} already running", self.name);
            return Ok(());
        }

        tracing::info!("Starting kernel {} with {} agents", self.name, self.registry.len());

        if let Err(e) = self.registry.initialize_all(&context).await {
            tracing::error!("{e}");
            self.registry.shutdown_all().await;
            return Err(e).with_context(|| format!("Failed to start kernel {}", self.name));
        }

        if let Some(interval_ms) = self.config.health_check_interval_ms {
            let mut monitor =
                HealthMonitor::new(self.registry.clone(), Duration::from_millis(interval_ms));
            monitor.start();
            self.monitor = Some(monitor);
        }

        self.started_at = Some(Utc::now());
        self.stopped_at = None;
        tracing::info!("Started kernel {}", self.name);
        Ok(())
    }

    /// Stops the kernel, stopping the health monitor and shutting down every agent.
    ///
    /// Agent shutdown failures are logged. Stopping a kernel which is not running only
    /// shuts down the agents again, which is a no-op for each of them.
    pub async fn stop(&mut self) {
        tracing::info!("Stopping kernel {}", self.name);

        if let Some(mut monitor) = self.monitor.take() {
            monitor.stop().await;
        }
        self.registry.shutdown_all().await;

        self.stopped_at = Some(Utc::now());
        tracing::info!("Stopped kernel {}", self.name);
    }

    /// Returns a report on the current system status.
    pub async fn status(&self) -> SystemStatus {
        SystemStatus {
            name: self.name,
            instance_id: self.instance_id,
            initialized: self.registry.is_initialized(),
            health: self.registry.get_health_summary().await,
            bus: self.msgbus.stats(),
        }
    }
}
