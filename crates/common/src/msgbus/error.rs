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

use thiserror::Error;

use crate::enums::AgentKind;

/// Errors returned by request/response exchanges over the message bus.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BusError {
    /// No correlated response arrived before the timeout elapsed.
    #[error("Request from {from} to {to} timed out after {timeout_ms}ms")]
    Timeout {
        /// The requesting agent.
        from: AgentKind,
        /// The target agent.
        to: AgentKind,
        /// The timeout which elapsed (milliseconds).
        timeout_ms: u64,
    },
    /// The request was cancelled by its cancellation token.
    #[error("Request from {from} to {to} was cancelled")]
    Cancelled {
        /// The requesting agent.
        from: AgentKind,
        /// The target agent.
        to: AgentKind,
    },
    /// The pending response channel closed before a response arrived.
    #[error("Response channel for request from {from} to {to} closed")]
    ChannelClosed {
        /// The requesting agent.
        from: AgentKind,
        /// The target agent.
        to: AgentKind,
    },
}

impl BusError {
    /// Returns whether the error is a timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
