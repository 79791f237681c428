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

//! Stub agents for testing.

use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use itinera_core::MUTEX_POISONED;

use super::{Agent, AgentContext, AgentCore};
use crate::{
    enums::AgentKind,
    messages::{AgentMessage, Payload},
    msgbus::MessageBus,
};

/// A configurable agent which records its lifecycle calls and received messages.
#[derive(Debug)]
pub struct StubAgent {
    core: AgentCore,
    /// The number of times `on_initialize` ran.
    pub initialize_calls: AtomicUsize,
    /// The number of times `on_shutdown` ran.
    pub shutdown_calls: AtomicUsize,
    received: Mutex<Vec<AgentMessage>>,
    fail_initialize: bool,
    fail_shutdown: bool,
    fail_messages: bool,
    reply: Option<Payload>,
}

impl StubAgent {
    /// Creates a new [`StubAgent`] instance for the `kind` identity.
    #[must_use]
    pub fn new(kind: AgentKind, msgbus: MessageBus) -> Self {
        Self {
            core: AgentCore::new(kind, msgbus),
            initialize_calls: AtomicUsize::new(0),
            shutdown_calls: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
            fail_initialize: false,
            fail_shutdown: false,
            fail_messages: false,
            reply: None,
        }
    }

    /// Returns the agent configured to fail initialization.
    #[must_use]
    pub const fn with_failing_initialize(mut self) -> Self {
        self.fail_initialize = true;
        self
    }

    /// Returns the agent configured to fail shutdown.
    #[must_use]
    pub const fn with_failing_shutdown(mut self) -> Self {
        self.fail_shutdown = true;
        self
    }

    /// Returns the agent configured to fail every message.
    #[must_use]
    pub const fn with_failing_messages(mut self) -> Self {
        self.fail_messages = true;
        self
    }

    /// Returns the agent configured to answer every REQUEST with `reply`.
    #[must_use]
    pub fn with_reply(mut self, reply: Payload) -> Self {
        self.reply = Some(reply);
        self
    }

    /// Returns the messages received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn received(&self) -> Vec<AgentMessage> {
        self.received.lock().expect(MUTEX_POISONED).clone()
    }
}

#[async_trait]
impl Agent for StubAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    async fn handle_message(&self, message: &AgentMessage) -> anyhow::Result<()> {
        self.received
            .lock()
            .expect(MUTEX_POISONED)
            .push(message.clone());

        if self.fail_messages {
            anyhow::bail!("Stub failed on {}", message.payload.kind());
        }

        match &self.reply {
            Some(reply) if message.is_request() => {
                self.respond_to_message(message, reply.clone()).await;
            }
            _ => {}
        }
        Ok(())
    }

    async fn on_initialize(&self, _context: &AgentContext) -> anyhow::Result<()> {
        self.initialize_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_initialize {
            anyhow::bail!("Stub initialization failure");
        }
        Ok(())
    }

    async fn on_shutdown(&self) -> anyhow::Result<()> {
        self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_shutdown {
            anyhow::bail!("Stub shutdown failure");
        }
        Ok(())
    }
}
