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

//! Message types for agent communication.
//!
//! Every message travelling over the [`MessageBus`](crate::msgbus::MessageBus) is wrapped in
//! an [`AgentMessage`] envelope carrying addressing, correlation and a typed [`Payload`].

pub mod payload;

use std::fmt::Display;

use chrono::{DateTime, Utc};
use itinera_core::UUID4;
use serde::{Deserialize, Serialize};

// Re-exports
pub use crate::messages::payload::{Payload, TripReply, TripRequest};
use crate::enums::{AgentKind, MessagePriority, MessageType};

/// The envelope for every message sent between agents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    /// The unique identifier of this envelope.
    pub message_id: UUID4,
    /// Links a request to its response, absent for events and broadcasts.
    #[serde(default)]
    pub correlation_id: Option<UUID4>,
    /// The sending agent.
    pub from_agent: AgentKind,
    /// The receiving agent.
    pub to_agent: AgentKind,
    /// The message type.
    pub message_type: MessageType,
    /// The message priority.
    #[serde(default)]
    pub priority: MessagePriority,
    /// The message content.
    pub payload: Payload,
    /// When the message was created.
    pub timestamp: DateTime<Utc>,
}

impl AgentMessage {
    /// Creates a new [`AgentMessage`] instance with a fresh message ID and no correlation.
    #[must_use]
    pub fn new(
        from_agent: AgentKind,
        to_agent: AgentKind,
        message_type: MessageType,
        payload: Payload,
    ) -> Self {
        Self {
            message_id: UUID4::new(),
            correlation_id: None,
            from_agent,
            to_agent,
            message_type,
            priority: MessagePriority::default(),
            payload,
            timestamp: Utc::now(),
        }
    }

    /// Creates a new REQUEST message carrying the given `correlation_id`.
    #[must_use]
    pub fn request(
        from_agent: AgentKind,
        to_agent: AgentKind,
        payload: Payload,
        correlation_id: UUID4,
    ) -> Self {
        Self::new(from_agent, to_agent, MessageType::Request, payload)
            .with_correlation_id(Some(correlation_id))
    }

    /// Creates the RESPONSE to `original`, addressed back to its sender.
    ///
    /// The correlation ID is copied from `original` (and is absent if it had none).
    #[must_use]
    pub fn response_to(original: &Self, from_agent: AgentKind, payload: Payload) -> Self {
        Self::new(
            from_agent,
            original.from_agent,
            MessageType::Response,
            payload,
        )
        .with_correlation_id(original.correlation_id)
    }

    /// Creates a new EVENT message.
    #[must_use]
    pub fn event(from_agent: AgentKind, to_agent: AgentKind, payload: Payload) -> Self {
        Self::new(from_agent, to_agent, MessageType::Event, payload)
    }

    /// Creates a new ALERT message, prioritized by the alert `severity`.
    #[must_use]
    pub fn alert<T: Into<String>>(
        from_agent: AgentKind,
        to_agent: AgentKind,
        severity: MessagePriority,
        message: T,
    ) -> Self {
        let payload = Payload::Alert {
            severity,
            message: message.into(),
        };
        Self::new(from_agent, to_agent, MessageType::Alert, payload).with_priority(severity)
    }

    /// Returns the message with the given `correlation_id`.
    #[must_use]
    pub const fn with_correlation_id(mut self, correlation_id: Option<UUID4>) -> Self {
        self.correlation_id = correlation_id;
        self
    }

    /// Returns the message with the given `priority`.
    #[must_use]
    pub const fn with_priority(mut self, priority: MessagePriority) -> Self {
        self.priority = priority;
        self
    }

    /// Returns whether the message is a REQUEST.
    #[must_use]
    pub fn is_request(&self) -> bool {
        self.message_type == MessageType::Request
    }

    /// Returns whether the message is the RESPONSE correlated with `correlation_id`.
    #[must_use]
    pub fn is_response_to(&self, correlation_id: &UUID4) -> bool {
        self.message_type == MessageType::Response
            && self.correlation_id.as_ref() == Some(correlation_id)
    }

    /// Returns whether the message was sent or received by the `agent`.
    #[must_use]
    pub fn involves(&self, agent: AgentKind) -> bool {
        self.from_agent == agent || self.to_agent == agent
    }
}

impl Display for AgentMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({} -> {}, {}, {}, message_id={}",
            stringify!(AgentMessage),
            self.from_agent,
            self.to_agent,
            self.message_type,
            self.payload.kind(),
            self.message_id,
        )?;
        if let Some(correlation_id) = &self.correlation_id {
            write!(f, ", correlation_id={correlation_id}")?;
        }
        write!(f, ")")
    }
}
