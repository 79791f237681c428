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

//! The agent contract.
//!
//! An agent subscribes to the [`MessageBus`] under one fixed [`AgentKind`] identity, handles the
//! messages addressed to it, and reports its health from message counters.

pub mod context;
pub mod core;
pub mod health;
pub mod registry;

#[cfg(any(test, feature = "stubs"))]
pub mod stubs;


use std::{fmt::Debug, sync::Arc, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use ustr::Ustr;

// Re-exports
pub use crate::agent::{
    context::AgentContext,
    core::AgentCore,
    health::{AgentHealth, HealthDetails},
    registry::{AgentHealthReport, AgentRegistry, HealthSummary, RegistryError},
};
use crate::{
    enums::{AgentKind, HealthStatus, MessagePriority, MessageType},
    messages::{AgentMessage, Payload},
    msgbus::{BusError, MessageBus, MessageHandler, ShareableMessageHandler},
};

/// The agent identity which receives alerts raised through [`Agent::raise_alert`].
pub const ALERT_TARGET: AgentKind = AgentKind::Exception;

/// A specialized participant in trip planning, addressed on the bus by its [`AgentKind`].
///
/// Implementors provide [`Agent::core`] and [`Agent::handle_message`]; the messaging helpers
/// are provided on top of the core's bus handle.
#[async_trait]
pub trait Agent: Send + Sync + Debug {
    /// Returns the shared agent state.
    fn core(&self) -> &AgentCore;

    /// Handles a `message` addressed to this agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the message could not be handled, which counts against the
    /// agent's health.
    async fn handle_message(&self, message: &AgentMessage) -> anyhow::Result<()>;

    /// Called after the agent has subscribed to the bus during initialization.
    ///
    /// # Errors
    ///
    /// Returns an error if the agent fails to initialize.
    async fn on_initialize(&self, _context: &AgentContext) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called after the agent has unsubscribed from the bus during shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the agent fails to shut down cleanly.
    async fn on_shutdown(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Returns the agent identity.
    fn kind(&self) -> AgentKind {
        self.core().kind()
    }

    /// Returns the message bus the agent is connected to.
    fn msgbus(&self) -> &MessageBus {
        self.core().msgbus()
    }

    /// Computes the agent health from its message counters.
    async fn health_check(&self) -> AgentHealth {
        self.core().health()
    }

    /// Publishes a message of `message_type` from this agent to the `to` agent.
    async fn send_message(&self, to: AgentKind, message_type: MessageType, payload: Payload) {
        let message = AgentMessage::new(self.kind(), to, message_type, payload);
        self.msgbus().publish(message).await;
    }

    /// Sends a request from this agent to the `to` agent and waits for the response payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the request times out or is cancelled.
    async fn request_from_agent(
        &self,
        to: AgentKind,
        payload: Payload,
        timeout: Option<Duration>,
    ) -> Result<Payload, BusError> {
        self.msgbus().request(self.kind(), to, payload, timeout).await
    }

    /// Responds to the `original` request from this agent.
    async fn respond_to_message(&self, original: &AgentMessage, payload: Payload) {
        self.msgbus().respond(original, self.kind(), payload).await;
    }

    /// Broadcasts an event from this agent to every subscribed agent identity.
    async fn broadcast_event(&self, payload: Payload) -> usize {
        self.msgbus().broadcast(self.kind(), payload).await
    }

    /// Raises an alert from this agent to the [`ALERT_TARGET`] agent.
    async fn raise_alert(&self, severity: MessagePriority, message: String) {
        let alert = AgentMessage::alert(self.kind(), ALERT_TARGET, severity, message);
        self.msgbus().publish(alert).await;
    }
}

/// Lifecycle operations for a shared agent.
///
/// Implemented for every `Arc<T>` where `T: Agent`, including `Arc<dyn Agent>`, so that the
/// bus subscription can hold a reference to the agent.
#[async_trait]
pub trait AgentLifecycle {
    /// Initializes the agent with the `context`.
    ///
    /// Stores the context, subscribes the agent to the bus under its own identity, sets the
    /// status to HEALTHY and then runs [`Agent::on_initialize`]. Initializing an agent which is
    /// already subscribed is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if [`Agent::on_initialize`] fails (the agent remains subscribed).
    async fn initialize(&self, context: AgentContext) -> anyhow::Result<()>;

    /// Shuts down the agent.
    ///
    /// Unsubscribes the agent from the bus and then runs [`Agent::on_shutdown`]. Shutting down
    /// an agent which is not subscribed is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if [`Agent::on_shutdown`] fails (the agent is already unsubscribed).
    async fn shutdown(&self) -> anyhow::Result<()>;
}

#[async_trait]
impl<T> AgentLifecycle for Arc<T>
where
    T: Agent + ?Sized + 'static,
{
    async fn initialize(&self, context: AgentContext) -> anyhow::Result<()> {
        let core = self.core();
        let kind = core.kind();

        if core.is_subscribed() {
            tracing::warn!(agent = %kind, "Agent already initialized");
            return Ok(());
        }

        core.set_context(context.clone());
        let handler = AgentHandler::new(self.clone());
        let handle = core
            .msgbus()
            .subscribe(kind, ShareableMessageHandler::new(handler));
        core.set_subscription(handle);
        core.set_status(HealthStatus::Healthy);

        self.on_initialize(&context)
            .await
            .with_context(|| format!("Failed to initialize agent {kind}"))?;

        tracing::info!(agent = %kind, "Initialized");
        Ok(())
    }

    async fn shutdown(&self) -> anyhow::Result<()> {
        let core = self.core();
        let kind = core.kind();

        let Some(handle) = core.take_subscription() else {
            tracing::debug!(agent = %kind, "Agent not initialized, nothing to shut down");
            return Ok(());
        };
        handle.unsubscribe();

        self.on_shutdown()
            .await
            .with_context(|| format!("Failed to shut down agent {kind}"))?;

        tracing::info!(agent = %kind, "Shut down");
        Ok(())
    }
}

/// Delivers bus messages to an agent, maintaining its counters.
struct AgentHandler<T: ?Sized> {
    id: Ustr,
    agent: Arc<T>,
}

impl<T: Agent + ?Sized> AgentHandler<T> {
    fn new(agent: Arc<T>) -> Self {
        Self {
            id: Ustr::from(&format!("agent-{}", agent.kind())),
            agent,
        }
    }
}

#[async_trait]
impl<T: Agent + ?Sized> MessageHandler for AgentHandler<T> {
    fn id(&self) -> Ustr {
        self.id
    }

    async fn handle(&self, message: &AgentMessage) -> anyhow::Result<()> {
        let core = self.agent.core();
        core.record_processed();

        if let Err(e) = self.agent.handle_message(message).await {
            core.record_error();
            return Err(e);
        }
        Ok(())
    }
}
