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

//! Enumerations for common components.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, FromRepr};

/// The identity of an agent participating in the message bus.
///
/// The set is closed: every message is addressed from one kind to another.
#[repr(C)]
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    AsRefStr,
    FromRepr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentKind {
    /// Coordinates the trip planning flow across the other agents.
    Orchestrator = 1,
    /// Allocates and tracks trip budgets.
    Budget = 2,
    /// Ranks and optimizes candidate itinerary options.
    Optimization = 3,
    /// Executes reservations with third parties.
    Booking = 4,
    /// Observes trips and raises alerts.
    Monitoring = 5,
    /// Handles disruptions and exceptional situations.
    Exception = 6,
}

/// The type of an [`AgentMessage`](crate::messages::AgentMessage).
#[repr(C)]
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    AsRefStr,
    FromRepr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    /// A request which expects a correlated response.
    Request = 1,
    /// A response to a prior request.
    Response = 2,
    /// A fire-and-forget notification.
    Event = 3,
    /// An alert raised for attention.
    Alert = 4,
}

/// The priority of a message.
///
/// Priority is carried on the envelope for observability and does not reorder delivery.
#[repr(C)]
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Display,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    AsRefStr,
    FromRepr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessagePriority {
    /// Low priority.
    Low = 1,
    /// Medium priority (the default).
    #[default]
    Medium = 2,
    /// High priority.
    High = 3,
    /// Critical priority.
    Critical = 4,
}

/// The health status of an agent.
#[repr(C)]
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    AsRefStr,
    FromRepr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    /// The agent has not yet processed any messages.
    Starting = 1,
    /// The agent is operating normally.
    Healthy = 2,
    /// The agent is failing on some messages.
    Degraded = 3,
    /// The agent is failing on most messages.
    Unhealthy = 4,
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    #[rstest]
    #[case(AgentKind::Orchestrator, "ORCHESTRATOR")]
    #[case(AgentKind::Budget, "BUDGET")]
    #[case(AgentKind::Optimization, "OPTIMIZATION")]
    #[case(AgentKind::Booking, "BOOKING")]
    #[case(AgentKind::Monitoring, "MONITORING")]
    #[case(AgentKind::Exception, "EXCEPTION")]
    fn test_agent_kind_display(#[case] kind: AgentKind, #[case] expected: &str) {
        assert_eq!(kind.to_string(), expected);
        assert_eq!(kind.as_ref(), expected);
    }

    #[rstest]
    #[case("budget", AgentKind::Budget)]
    #[case("Booking", AgentKind::Booking)]
    #[case("ORCHESTRATOR", AgentKind::Orchestrator)]
    fn test_agent_kind_from_str_case_insensitive(#[case] input: &str, #[case] expected: AgentKind) {
        assert_eq!(AgentKind::from_str(input).unwrap(), expected);
    }

    #[rstest]
    fn test_agent_kind_from_str_invalid() {
        assert!(AgentKind::from_str("CONCIERGE").is_err());
    }

    #[rstest]
    fn test_agent_kind_set_is_closed() {
        assert_eq!(AgentKind::iter().count(), 6);
    }

    #[rstest]
    fn test_message_priority_default_and_order() {
        assert_eq!(MessagePriority::default(), MessagePriority::Medium);
        assert!(MessagePriority::Low < MessagePriority::Medium);
        assert!(MessagePriority::High < MessagePriority::Critical);
    }

    #[rstest]
    #[case(MessageType::Request, "\"REQUEST\"")]
    #[case(MessageType::Response, "\"RESPONSE\"")]
    #[case(MessageType::Event, "\"EVENT\"")]
    #[case(MessageType::Alert, "\"ALERT\"")]
    fn test_message_type_serde(#[case] message_type: MessageType, #[case] json: &str) {
        assert_eq!(serde_json::to_string(&message_type).unwrap(), json);
        assert_eq!(serde_json::from_str::<MessageType>(json).unwrap(), message_type);
    }

    #[rstest]
    fn test_health_status_from_repr() {
        assert_eq!(HealthStatus::from_repr(1), Some(HealthStatus::Starting));
        assert_eq!(HealthStatus::from_repr(4), Some(HealthStatus::Unhealthy));
        assert_eq!(HealthStatus::from_repr(9), None);
    }
}
