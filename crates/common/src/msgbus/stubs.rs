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

//! Stub message handlers for testing.

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use itinera_core::MUTEX_POISONED;
use ustr::Ustr;

use super::{
    MessageBus,
    handler::{MessageHandler, ShareableMessageHandler},
};
use crate::{
    enums::AgentKind,
    messages::{AgentMessage, Payload},
};

/// A handler which records every message it receives.
#[derive(Debug)]
pub struct MessageSavingHandler {
    id: Ustr,
    messages: Mutex<Vec<AgentMessage>>,
}

impl MessageSavingHandler {
    /// Creates a new [`MessageSavingHandler`] instance.
    #[must_use]
    pub fn new<S: AsRef<str>>(id: S) -> Self {
        Self {
            id: Ustr::from(id.as_ref()),
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Returns the messages received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn messages(&self) -> Vec<AgentMessage> {
        self.messages.lock().expect(MUTEX_POISONED).clone()
    }

    /// Returns the number of messages received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn count(&self) -> usize {
        self.messages.lock().expect(MUTEX_POISONED).len()
    }
}

#[async_trait]
impl MessageHandler for MessageSavingHandler {
    fn id(&self) -> Ustr {
        self.id
    }

    async fn handle(&self, message: &AgentMessage) -> anyhow::Result<()> {
        self.messages
            .lock()
            .expect(MUTEX_POISONED)
            .push(message.clone());
        Ok(())
    }
}

/// A handler which records whether it was called.
#[derive(Debug)]
pub struct CallCheckHandler {
    id: Ustr,
    was_called: AtomicBool,
}

impl CallCheckHandler {
    /// Creates a new [`CallCheckHandler`] instance.
    #[must_use]
    pub fn new<S: AsRef<str>>(id: S) -> Self {
        Self {
            id: Ustr::from(id.as_ref()),
            was_called: AtomicBool::new(false),
        }
    }

    /// Returns whether the handler was called.
    #[must_use]
    pub fn was_called(&self) -> bool {
        self.was_called.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageHandler for CallCheckHandler {
    fn id(&self) -> Ustr {
        self.id
    }

    async fn handle(&self, _message: &AgentMessage) -> anyhow::Result<()> {
        self.was_called.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// A handler which always fails.
#[derive(Debug)]
pub struct FailingHandler {
    id: Ustr,
}

impl FailingHandler {
    /// Creates a new [`FailingHandler`] instance.
    #[must_use]
    pub fn new<S: AsRef<str>>(id: S) -> Self {
        Self {
            id: Ustr::from(id.as_ref()),
        }
    }
}

#[async_trait]
impl MessageHandler for FailingHandler {
    fn id(&self) -> Ustr {
        self.id
    }

    async fn handle(&self, message: &AgentMessage) -> anyhow::Result<()> {
        anyhow::bail!("Failed to handle {}", message.payload.kind())
    }
}

/// A handler which always panics.
#[derive(Debug)]
pub struct PanickingHandler {
    id: Ustr,
}

impl PanickingHandler {
    /// Creates a new [`PanickingHandler`] instance.
    #[must_use]
    pub fn new<S: AsRef<str>>(id: S) -> Self {
        Self {
            id: Ustr::from(id.as_ref()),
        }
    }
}

#[async_trait]
impl MessageHandler for PanickingHandler {
    fn id(&self) -> Ustr {
        self.id
    }

    #[allow(clippy::panic_in_result_fn)]
    async fn handle(&self, message: &AgentMessage) -> anyhow::Result<()> {
        panic!("Handler exploded on {}", message.payload.kind())
    }
}

/// A handler which answers every REQUEST with a fixed payload after an optional delay.
#[derive(Debug)]
pub struct EchoResponder {
    id: Ustr,
    bus: MessageBus,
    agent: AgentKind,
    reply: Payload,
    delay: Option<Duration>,
}

impl EchoResponder {
    /// Creates a new [`EchoResponder`] instance replying as `agent` with `reply`.
    #[must_use]
    pub fn new(bus: MessageBus, agent: AgentKind, reply: Payload, delay: Option<Duration>) -> Self {
        Self {
            id: Ustr::from(&format!("echo-{agent}")),
            bus,
            agent,
            reply,
            delay,
        }
    }
}

#[async_trait]
impl MessageHandler for EchoResponder {
    fn id(&self) -> Ustr {
        self.id
    }

    async fn handle(&self, message: &AgentMessage) -> anyhow::Result<()> {
        if !message.is_request() {
            return Ok(());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.bus
            .respond(message, self.agent, self.reply.clone())
            .await;
        Ok(())
    }
}

/// Returns a shareable [`MessageSavingHandler`] along with a reference for inspection.
#[must_use]
pub fn get_message_saving_handler<S: AsRef<str>>(
    id: S,
) -> (ShareableMessageHandler, Arc<MessageSavingHandler>) {
    let handler = Arc::new(MessageSavingHandler::new(id));
    (ShareableMessageHandler(handler.clone()), handler)
}

/// Returns a shareable [`CallCheckHandler`] along with a reference for inspection.
#[must_use]
pub fn get_call_check_handler<S: AsRef<str>>(
    id: S,
) -> (ShareableMessageHandler, Arc<CallCheckHandler>) {
    let handler = Arc::new(CallCheckHandler::new(id));
    (ShareableMessageHandler(handler.clone()), handler)
}
