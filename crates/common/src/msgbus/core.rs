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
    any::Any,
    collections::VecDeque,
    fmt::Debug,
    panic::AssertUnwindSafe,
    sync::{
        Arc, Mutex, Weak,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use futures::{FutureExt, future::join_all};
use indexmap::IndexMap;
use itinera_core::{MUTEX_POISONED, UUID4, datetime::duration_to_millis};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use ustr::Ustr;

use super::{
    config::MessageBusConfig,
    error::BusError,
    handler::{ResponseHandler, ShareableMessageHandler},
};
use crate::{
    enums::AgentKind,
    logging::{RECV, SEND, message_type_marker},
    messages::{AgentMessage, Payload},
};

/// Represents a subscription of a handler to an agent identity.
///
/// This is an internal type used by the message bus to organize subscribers.
#[derive(Clone, Debug)]
pub struct Subscription {
    /// The unique ID of the subscription.
    pub subscription_id: UUID4,
    /// The agent identity subscribed to.
    pub agent: AgentKind,
    /// The shareable message handler for the subscription.
    pub handler: ShareableMessageHandler,
    /// Store a copy of the handler ID for logging.
    pub handler_id: Ustr,
}

impl Subscription {
    /// Creates a new [`Subscription`] instance.
    #[must_use]
    pub fn new(agent: AgentKind, handler: ShareableMessageHandler) -> Self {
        Self {
            subscription_id: UUID4::new(),
            agent,
            handler_id: handler.id(),
            handler,
        }
    }
}

impl PartialEq for Subscription {
    fn eq(&self, other: &Self) -> bool {
        self.subscription_id == other.subscription_id
    }
}

impl Eq for Subscription {}

/// Removes exactly one subscription from the bus it was created by.
///
/// Calling [`SubscriptionHandle::unsubscribe`] more than once is a no-op. The handle does not
/// keep the bus alive, and dropping it does not unsubscribe.
#[derive(Debug)]
pub struct SubscriptionHandle {
    agent: AgentKind,
    subscription_id: UUID4,
    handler_id: Ustr,
    state: Weak<Mutex<BusState>>,
    is_active: AtomicBool,
}

impl SubscriptionHandle {
    /// Returns the agent identity of the subscription.
    #[must_use]
    pub const fn agent(&self) -> AgentKind {
        self.agent
    }

    /// Returns the ID of the subscribed handler.
    #[must_use]
    pub const fn handler_id(&self) -> Ustr {
        self.handler_id
    }

    /// Returns whether the subscription has not yet been removed through this handle.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active.load(Ordering::Acquire)
    }

    /// Removes the subscription from the bus.
    ///
    /// Returns `true` if the subscription was removed by this call.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn unsubscribe(&self) -> bool {
        if !self.is_active.swap(false, Ordering::AcqRel) {
            return false;
        }

        let Some(state) = self.state.upgrade() else {
            return false;
        };

        let removed = state
            .lock()
            .expect(MUTEX_POISONED)
            .remove_subscription(self.agent, &self.subscription_id);

        if removed {
            tracing::debug!(
                agent = %self.agent,
                handler_id = %self.handler_id,
                "Unsubscribed handler",
            );
        }
        removed
    }
}

/// Summary statistics for a [`MessageBus`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusStats {
    /// The number of envelopes currently retained in the message log.
    pub total_messages: usize,
    /// The total number of subscriptions across all agent identities.
    pub subscriber_count: usize,
    /// The agent identities with at least one subscription.
    pub agent_types: Vec<AgentKind>,
}

#[derive(Debug, Default)]
struct BusState {
    subscriptions: IndexMap<AgentKind, Vec<Subscription>>,
    message_log: VecDeque<AgentMessage>,
}

impl BusState {
    fn record(&mut self, message: AgentMessage, max_log_size: usize) {
        // A zero capacity retains nothing
        if max_log_size == 0 {
            self.message_log.clear();
            return;
        }
        while self.message_log.len() >= max_log_size {
            self.message_log.pop_front();
        }
        self.message_log.push_back(message);
    }

    fn handlers_for(&self, agent: AgentKind) -> Vec<ShareableMessageHandler> {
        self.subscriptions
            .get(&agent)
            .map(|subs| subs.iter().map(|sub| sub.handler.clone()).collect())
            .unwrap_or_default()
    }

    fn subscribed_agents(&self) -> Vec<AgentKind> {
        self.subscriptions
            .iter()
            .filter(|(_, subs)| !subs.is_empty())
            .map(|(agent, _)| *agent)
            .collect()
    }

    fn remove_subscription(&mut self, agent: AgentKind, subscription_id: &UUID4) -> bool {
        let Some(subs) = self.subscriptions.get_mut(&agent) else {
            return false;
        };

        let before = subs.len();
        subs.retain(|sub| &sub.subscription_id != subscription_id);
        let removed = subs.len() < before;

        if subs.is_empty() {
            self.subscriptions.shift_remove(&agent);
        }
        removed
    }
}

/// An in-process asynchronous message bus connecting agents by identity.
///
/// The bus supports three messaging patterns:
///  - Fire-and-forget publish to every subscriber of the target identity.
///  - Request/response correlated by a correlation ID, bounded by a timeout and an optional
///    cancellation token.
///  - Broadcast of an event to every currently subscribed identity.
///
/// Cloning the bus is cheap and clones share the same subscriptions and message log.
/// Handlers are never invoked while the internal lock is held, and each publish delivers to
/// a snapshot of the subscribers taken when the publish began.
#[derive(Clone)]
pub struct MessageBus {
    config: MessageBusConfig,
    state: Arc<Mutex<BusState>>,
}

impl Debug for MessageBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().expect(MUTEX_POISONED);
        f.debug_struct(stringify!(MessageBus))
            .field("config", &self.config)
            .field("agents", &state.subscribed_agents())
            .field("log_len", &state.message_log.len())
            .finish()
    }
}

impl Default for MessageBus {
    /// Creates a new default [`MessageBus`] instance.
    fn default() -> Self {
        Self::new(MessageBusConfig::default())
    }
}

impl MessageBus {
    /// Creates a new [`MessageBus`] instance.
    #[must_use]
    pub fn new(config: MessageBusConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(BusState::default())),
        }
    }

    /// Returns the configuration for the bus.
    #[must_use]
    pub const fn config(&self) -> &MessageBusConfig {
        &self.config
    }

    /// Returns the memory address of the shared bus state as a hexadecimal string.
    #[must_use]
    pub fn mem_address(&self) -> String {
        format!("{:p}", Arc::as_ptr(&self.state))
    }

    /// Subscribes the `handler` to messages addressed to the `agent` identity.
    ///
    /// Multiple handlers may subscribe to the same identity. The returned handle removes exactly
    /// this subscription.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn subscribe(
        &self,
        agent: AgentKind,
        handler: ShareableMessageHandler,
    ) -> SubscriptionHandle {
        let sub = Subscription::new(agent, handler);
        let handle = SubscriptionHandle {
            agent,
            subscription_id: sub.subscription_id,
            handler_id: sub.handler_id,
            state: Arc::downgrade(&self.state),
            is_active: AtomicBool::new(true),
        };

        tracing::debug!(agent = %agent, handler_id = %sub.handler_id, "Subscribed handler");

        self.state
            .lock()
            .expect(MUTEX_POISONED)
            .subscriptions
            .entry(agent)
            .or_default()
            .push(sub);

        handle
    }

    /// Publishes the `message` to every subscriber of its `to_agent` identity.
    ///
    /// The message is appended to the log first. If the target has no subscribers the message
    /// is dropped with a warning. Otherwise all handlers are invoked concurrently and the call
    /// resolves once every handler has settled. A handler error or panic is logged and affects
    /// neither the caller nor the other handlers.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub async fn publish(&self, message: AgentMessage) {
        let handlers = {
            let mut state = self.state.lock().expect(MUTEX_POISONED);
            state.record(message.clone(), self.config.max_log_size);
            state.handlers_for(message.to_agent)
        };

        let marker = message_type_marker(message.message_type);
        tracing::debug!(agent = %message.from_agent, "{SEND}{marker} {message}");

        if handlers.is_empty() {
            tracing::warn!(
                agent = %message.to_agent,
                "No subscribers for {message}, dropping",
            );
            return;
        }

        tracing::trace!(agent = %message.to_agent, "{RECV}{marker} {message}");

        let message = &message;
        let results = join_all(handlers.iter().map(|handler| async move {
            let result = AssertUnwindSafe(handler.0.handle(message))
                .catch_unwind()
                .await;
            (handler.id(), result)
        }))
        .await;

        for (handler_id, result) in results {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!(
                    agent = %message.to_agent,
                    handler_id = %handler_id,
                    "Error handling {message}: {e:#}",
                ),
                Err(panic) => tracing::error!(
                    agent = %message.to_agent,
                    handler_id = %handler_id,
                    "Handler panicked on {message}: {}",
                    panic_message(panic.as_ref()),
                ),
            }
        }
    }

    /// Sends a REQUEST and waits for the correlated RESPONSE payload.
    ///
    /// Uses the configured default timeout when `timeout` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Timeout`] if no correlated response arrives in time.
    pub async fn request(
        &self,
        from: AgentKind,
        to: AgentKind,
        payload: Payload,
        timeout: Option<Duration>,
    ) -> Result<Payload, BusError> {
        self.request_with_cancel(from, to, payload, timeout, CancellationToken::new())
            .await
    }

    /// Sends a REQUEST and waits for the correlated RESPONSE payload, the timeout, or the
    /// `cancel` token, whichever happens first.
    ///
    /// The requester is temporarily subscribed under its own `from` identity to receive the
    /// response, and that subscription is removed on every exit path. The REQUEST is published
    /// on a spawned task so the timeout bounds the whole exchange, including the time spent in
    /// the responder's handler.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No correlated response arrives before the timeout elapses ([`BusError::Timeout`]).
    /// - The `cancel` token is cancelled first ([`BusError::Cancelled`]).
    pub async fn request_with_cancel(
        &self,
        from: AgentKind,
        to: AgentKind,
        payload: Payload,
        timeout: Option<Duration>,
        cancel: CancellationToken,
    ) -> Result<Payload, BusError> {
        let timeout = timeout.unwrap_or_else(|| self.config.default_request_timeout());
        let correlation_id = UUID4::new();
        let request = AgentMessage::request(from, to, payload, correlation_id);

        let (tx, rx) = oneshot::channel();
        let handle = self.subscribe(
            from,
            ShareableMessageHandler::new(ResponseHandler::new(correlation_id, tx)),
        );

        let bus = self.clone();
        tokio::spawn(async move { bus.publish(request).await });

        let result = tokio::select! {
            biased;
            response = rx => response.map_err(|_| BusError::ChannelClosed { from, to }),
            () = cancel.cancelled() => Err(BusError::Cancelled { from, to }),
            () = tokio::time::sleep(timeout) => Err(BusError::Timeout {
                from,
                to,
                timeout_ms: duration_to_millis(timeout),
            }),
        };

        handle.unsubscribe();

        if let Err(e) = &result {
            tracing::warn!(agent = %from, correlation_id = %correlation_id, "{e}");
        }
        result
    }

    /// Publishes a RESPONSE to the sender of `original`, carrying its correlation ID.
    ///
    /// Responding to a message which is not a REQUEST is permitted but logged as a warning,
    /// and a response to an uncorrelated message cannot be matched by a requester.
    pub async fn respond(&self, original: &AgentMessage, from: AgentKind, payload: Payload) {
        if !original.is_request() {
            tracing::warn!(
                agent = %from,
                "Responding to non-request {original}",
            );
        }

        let response = AgentMessage::response_to(original, from, payload);
        self.publish(response).await;
    }

    /// Publishes an EVENT carrying `payload` to every currently subscribed agent identity,
    /// including the sender if it is subscribed.
    ///
    /// Returns the number of identities the event was published to.
    pub async fn broadcast(&self, from: AgentKind, payload: Payload) -> usize {
        let agents = self.subscribed_agents();
        tracing::debug!(agent = %from, "Broadcasting {} to {agents:?}", payload.kind());

        let publishes = agents
            .iter()
            .map(|to| self.publish(AgentMessage::event(from, *to, payload.clone())));
        join_all(publishes).await;

        agents.len()
    }

    /// Returns the most recent logged messages, oldest first, up to `limit` if given.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn message_log(&self, limit: Option<usize>) -> Vec<AgentMessage> {
        let state = self.state.lock().expect(MUTEX_POISONED);
        let skip = limit.map_or(0, |limit| state.message_log.len().saturating_sub(limit));
        state.message_log.iter().skip(skip).cloned().collect()
    }

    /// Returns the most recent logged messages sent or received by the `agent`, oldest first,
    /// up to `limit` if given.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn message_history(&self, agent: AgentKind, limit: Option<usize>) -> Vec<AgentMessage> {
        let state = self.state.lock().expect(MUTEX_POISONED);
        let mut history: Vec<AgentMessage> = state
            .message_log
            .iter()
            .rev()
            .filter(|message| message.involves(agent))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        history.reverse();
        history
    }

    /// Returns summary statistics for the bus.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn stats(&self) -> BusStats {
        let state = self.state.lock().expect(MUTEX_POISONED);
        BusStats {
            total_messages: state.message_log.len(),
            subscriber_count: state.subscriptions.values().map(Vec::len).sum(),
            agent_types: state.subscribed_agents(),
        }
    }

    /// Returns the agent identities with at least one subscription.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn subscribed_agents(&self) -> Vec<AgentKind> {
        self.state.lock().expect(MUTEX_POISONED).subscribed_agents()
    }

    /// Returns the number of subscriptions for the `agent` identity.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn subscriber_count(&self, agent: AgentKind) -> usize {
        self.state
            .lock()
            .expect(MUTEX_POISONED)
            .subscriptions
            .get(&agent)
            .map_or(0, Vec::len)
    }

    /// Returns whether the `agent` identity has any subscriptions.
    #[must_use]
    pub fn has_subscribers(&self, agent: AgentKind) -> bool {
        self.subscriber_count(agent) > 0
    }

    /// Clears the message log.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn clear_log(&self) {
        self.state.lock().expect(MUTEX_POISONED).message_log.clear();
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
