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

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::enums::MessagePriority;

/// A request concerning a single trip, with free-form parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    /// The trip the request concerns.
    pub trip_id: String,
    /// Request parameters, interpreted by the receiving agent.
    #[serde(default)]
    pub params: serde_json::Value,
}

impl TripRequest {
    /// Creates a new [`TripRequest`] instance.
    #[must_use]
    pub fn new<T: Into<String>>(trip_id: T, params: serde_json::Value) -> Self {
        Self {
            trip_id: trip_id.into(),
            params,
        }
    }
}

/// A reply concerning a single trip, with free-form result data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TripReply {
    /// The trip the reply concerns.
    pub trip_id: String,
    /// Result data produced by the replying agent.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl TripReply {
    /// Creates a new [`TripReply`] instance.
    #[must_use]
    pub fn new<T: Into<String>>(trip_id: T, data: serde_json::Value) -> Self {
        Self {
            trip_id: trip_id.into(),
            data,
        }
    }
}

/// The content carried by an [`AgentMessage`](super::AgentMessage).
///
/// Serialized with a `type` discriminant so the envelope can be used as a wire schema.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, IntoStaticStr)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Payload {
    /// Asks the budget agent to allocate a budget for a trip.
    AllocateBudget(TripRequest),
    /// The allocated budget for a trip.
    BudgetAllocated(TripReply),
    /// Asks the optimization agent to rank itinerary options.
    RankOptions(TripRequest),
    /// The ranked itinerary options.
    OptionsRanked(TripReply),
    /// Asks the booking agent to execute the reservations.
    ExecuteBooking(TripRequest),
    /// The executed booking confirmation.
    BookingExecuted(TripReply),
    /// Asks for the current lifecycle state of a trip.
    TripStatus {
        /// The trip to report on.
        trip_id: String,
    },
    /// The current lifecycle state of a trip.
    TripStatusReport {
        /// The trip reported on.
        trip_id: String,
        /// The name of the current state.
        state: String,
        /// Whether the state is terminal.
        terminal: bool,
    },
    /// The responder could not perform the request.
    Failure {
        /// A human readable reason.
        reason: String,
    },
    /// An alert raised for attention.
    Alert {
        /// The alert severity.
        severity: MessagePriority,
        /// The alert text.
        message: String,
    },
    /// Free-form notice text.
    Notice {
        /// The notice text.
        message: String,
    },
    /// Extension point for payloads not covered by the other variants.
    Custom {
        /// The application defined kind.
        kind: String,
        /// The application defined content.
        #[serde(default)]
        data: serde_json::Value,
    },
}

impl Payload {
    /// Creates a [`Payload::Failure`] with the given `reason`.
    #[must_use]
    pub fn failure<T: Into<String>>(reason: T) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }

    /// Creates a [`Payload::Notice`] with the given `message`.
    #[must_use]
    pub fn notice<T: Into<String>>(message: T) -> Self {
        Self::Notice {
            message: message.into(),
        }
    }

    /// Returns the discriminant name of the payload, e.g. `ALLOCATE_BUDGET`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// Returns the trip ID the payload concerns, if any.
    #[must_use]
    pub fn trip_id(&self) -> Option<&str> {
        match self {
            Self::AllocateBudget(request)
            | Self::RankOptions(request)
            | Self::ExecuteBooking(request) => Some(&request.trip_id),
            Self::BudgetAllocated(reply)
            | Self::OptionsRanked(reply)
            | Self::BookingExecuted(reply) => Some(&reply.trip_id),
            Self::TripStatus { trip_id } | Self::TripStatusReport { trip_id, .. } => Some(trip_id),
            Self::Failure { .. } | Self::Alert { .. } | Self::Notice { .. } | Self::Custom { .. } => {
                None
            }
        }
    }

    /// Returns whether the payload reports a failure.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}
