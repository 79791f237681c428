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

//! Message handler functionality for the message bus system.
//!
//! This module provides the asynchronous [`MessageHandler`] trait along with a closure based
//! implementation and a shareable wrapper stored by the bus for each subscription.

use std::{
    fmt::Debug,
    future::Future,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use itinera_core::{MUTEX_POISONED, UUID4};
use tokio::sync::oneshot;
use ustr::Ustr;

use crate::messages::{AgentMessage, Payload};

/// Handles messages delivered by the bus to a subscribed agent identity.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Returns the unique identifier for this handler.
    fn id(&self) -> Ustr;

    /// Handles the `message`.
    ///
    /// # Errors
    ///
    /// Returns an error if the message could not be handled. The bus logs the error and
    /// continues delivering to other subscribers.
    async fn handle(&self, message: &AgentMessage) -> anyhow::Result<()>;
}

/// A [`MessageHandler`] backed by an async closure receiving an owned message.
pub struct TypedMessageHandler<F> {
    id: Ustr,
    callback: F,
}

impl<F, Fut> TypedMessageHandler<F>
where
    F: Fn(AgentMessage) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    /// Creates a new handler with an optional custom ID.
    pub fn new<S: AsRef<str>>(id: Option<S>, callback: F) -> Self {
        let id = id.map_or_else(generate_unique_handler_id, |s| Ustr::from(s.as_ref()));
        Self { id, callback }
    }

    /// Creates a new handler with an auto-generated ID.
    pub fn from(callback: F) -> Self {
        Self::new::<Ustr>(None, callback)
    }
}

impl<F> Debug for TypedMessageHandler<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(TypedMessageHandler))
            .field("id", &self.id)
            .finish()
    }
}

#[async_trait]
impl<F, Fut> MessageHandler for TypedMessageHandler<F>
where
    F: Fn(AgentMessage) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    fn id(&self) -> Ustr {
        self.id
    }

    async fn handle(&self, message: &AgentMessage) -> anyhow::Result<()> {
        (self.callback)(message.clone()).await
    }
}

/// Completes a pending request when the correlated RESPONSE arrives.
///
/// Messages other than the matching RESPONSE are ignored. Only the first match is delivered.
pub(crate) struct ResponseHandler {
    id: Ustr,
    correlation_id: UUID4,
    sender: Mutex<Option<oneshot::Sender<Payload>>>,
}

impl ResponseHandler {
    pub(crate) fn new(correlation_id: UUID4, sender: oneshot::Sender<Payload>) -> Self {
        Self {
            id: Ustr::from(&format!("response-{correlation_id}")),
            correlation_id,
            sender: Mutex::new(Some(sender)),
        }
    }
}

#[async_trait]
impl MessageHandler for ResponseHandler {
    fn id(&self) -> Ustr {
        self.id
    }

    async fn handle(&self, message: &AgentMessage) -> anyhow::Result<()> {
        if !message.is_response_to(&self.correlation_id) {
            return Ok(());
        }

        let sender = self.sender.lock().expect(MUTEX_POISONED).take();
        if let Some(sender) = sender {
            // The requester may already have given up
            let _ = sender.send(message.payload.clone());
        }
        Ok(())
    }
}

fn generate_unique_handler_id() -> Ustr {
    Ustr::from(&UUID4::new().to_string())
}

/// A cheaply cloneable, thread-safe reference to a [`MessageHandler`].
#[derive(Clone)]
#[repr(transparent)]
pub struct ShareableMessageHandler(pub Arc<dyn MessageHandler>);

impl ShareableMessageHandler {
    /// Creates a new [`ShareableMessageHandler`] wrapping the `handler`.
    pub fn new<T: MessageHandler + 'static>(handler: T) -> Self {
        Self(Arc::new(handler))
    }

    /// Returns the ID of the wrapped handler.
    #[must_use]
    pub fn id(&self) -> Ustr {
        self.0.id()
    }
}

impl From<Arc<dyn MessageHandler>> for ShareableMessageHandler {
    fn from(value: Arc<dyn MessageHandler>) -> Self {
        Self(value)
    }
}

impl Debug for ShareableMessageHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(ShareableMessageHandler))
            .field("id", &self.0.id())
            .finish()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rstest::rstest;

    use super::*;
    use crate::enums::AgentKind;

    fn notice() -> AgentMessage {
        AgentMessage::event(AgentKind::Budget, AgentKind::Booking, Payload::notice("x"))
    }

    #[rstest]
    fn test_typed_handler_custom_id() {
        let handler = TypedMessageHandler::new(Some("booking-listener"), |_msg| async { Ok(()) });
        assert_eq!(handler.id(), Ustr::from("booking-listener"));
    }

    #[rstest]
    fn test_typed_handler_generated_ids_are_unique() {
        let a = TypedMessageHandler::from(|_msg| async { Ok(()) });
        let b = TypedMessageHandler::from(|_msg| async { Ok(()) });
        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn test_typed_handler_invokes_callback() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handler = TypedMessageHandler::from(move |_msg| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        handler.handle(&notice()).await.unwrap();
        handler.handle(&notice()).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_typed_handler_propagates_error() {
        let handler = TypedMessageHandler::from(|_msg| async { Err(anyhow::anyhow!("boom")) });
        let err = handler.handle(&notice()).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[tokio::test]
    async fn test_response_handler_ignores_uncorrelated_messages() {
        let correlation_id = UUID4::new();
        let (tx, mut rx) = oneshot::channel();
        let handler = ResponseHandler::new(correlation_id, tx);

        handler.handle(&notice()).await.unwrap();

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_response_handler_completes_on_match() {
        let correlation_id = UUID4::new();
        let (tx, rx) = oneshot::channel();
        let handler = ResponseHandler::new(correlation_id, tx);

        let request = AgentMessage::request(
            AgentKind::Orchestrator,
            AgentKind::Budget,
            Payload::notice("ping"),
            correlation_id,
        );
        let response = AgentMessage::response_to(&request, AgentKind::Budget, Payload::notice("pong"));

        handler.handle(&request).await.unwrap(); // <-- REQUEST is not a match
        handler.handle(&response).await.unwrap();
        handler.handle(&response).await.unwrap(); // <-- Second match is a no-op

        assert_eq!(rx.await.unwrap(), Payload::notice("pong"));
    }

    #[rstest]
    fn test_shareable_handler_debug_shows_id() {
        let handler =
            ShareableMessageHandler::new(TypedMessageHandler::new(Some("h1"), |_msg| async { Ok(()) }));
        assert_eq!(handler.id(), Ustr::from("h1"));
        assert!(format!("{handler:?}").contains("h1"));
    }
}
