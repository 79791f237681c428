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

//! An auditable state machine for a single trip.
//!
//! The machine only ever moves along the edges of [`TripState::valid_transitions`], and every
//! accepted move is appended to its history.

use std::{fmt::Display, time::Duration};

use chrono::{DateTime, Utc};
use itinera_common::enums::AgentKind;
use itinera_core::datetime::{format_iso8601_millis, millis_since};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::TripState;

/// A single accepted move between two trip states.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    /// The state moved from.
    pub from_state: TripState,
    /// The state moved to.
    pub to_state: TripState,
    /// When the move happened.
    pub timestamp: DateTime<Utc>,
    /// Why the move happened, if given.
    #[serde(default)]
    pub reason: Option<String>,
    /// The agent which caused the move, if any.
    #[serde(default)]
    pub triggered_by: Option<AgentKind>,
}

impl Display for StateTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {} at {}",
            self.from_state,
            self.to_state,
            format_iso8601_millis(self.timestamp),
        )?;
        if let Some(agent) = self.triggered_by {
            write!(f, " by {agent}")?;
        }
        if let Some(reason) = &self.reason {
            write!(f, " ({reason})")?;
        }
        Ok(())
    }
}

/// Error returned when a transition is not in the table of legal transitions.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("Invalid trip state transition: {from} -> {to}")]
pub struct InvalidTransition {
    /// The current state.
    pub from: TripState,
    /// The rejected target state.
    pub to: TripState,
}

/// Tracks the lifecycle state of one trip along with the full history of transitions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripStateMachine {
    current_state: TripState,
    history: Vec<StateTransition>,
    entered_current_state_at: DateTime<Utc>,
}

impl Default for TripStateMachine {
    fn default() -> Self {
        Self::new(TripState::default())
    }
}

impl TripStateMachine {
    /// Creates a new [`TripStateMachine`] in the `initial_state` with an empty history.
    #[must_use]
    pub fn new(initial_state: TripState) -> Self {
        Self {
            current_state: initial_state,
            history: Vec::new(),
            entered_current_state_at: Utc::now(),
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn current_state(&self) -> TripState {
        self.current_state
    }

    /// Returns when the current state was entered.
    #[must_use]
    pub const fn entered_current_state_at(&self) -> DateTime<Utc> {
        self.entered_current_state_at
    }

    /// Returns whether a transition to `target` is legal from the current state.
    #[must_use]
    pub fn can_transition_to(&self, target: TripState) -> bool {
        self.current_state.can_transition_to(target)
    }

    /// Returns the states reachable from the current state.
    #[must_use]
    pub const fn valid_transitions(&self) -> &'static [TripState] {
        self.current_state.valid_transitions()
    }

    /// Moves to `target` if the transition is legal.
    ///
    /// Returns `false` and leaves the machine untouched if the transition is illegal.
    pub fn transition_to(
        &mut self,
        target: TripState,
        reason: Option<&str>,
        triggered_by: Option<AgentKind>,
    ) -> bool {
        match self.try_transition_to(target, reason, triggered_by) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("{e}");
                false
            }
        }
    }

    /// Moves to `target` if the transition is legal.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] if `target` is not reachable from the current state, in
    /// which case the machine is left untouched.
    pub fn try_transition_to(
        &mut self,
        target: TripState,
        reason: Option<&str>,
        triggered_by: Option<AgentKind>,
    ) -> Result<(), InvalidTransition> {
        if !self.can_transition_to(target) {
            return Err(InvalidTransition {
                from: self.current_state,
                to: target,
            });
        }

        let now = Utc::now();
        let transition = StateTransition {
            from_state: self.current_state,
            to_state: target,
            timestamp: now,
            reason: reason.map(str::to_string),
            triggered_by,
        };
        tracing::debug!("Trip transition {transition}");

        self.history.push(transition);
        self.current_state = target;
        self.entered_current_state_at = now;
        Ok(())
    }

    /// Returns whether the current state is terminal.
    #[must_use]
    pub const fn is_terminal_state(&self) -> bool {
        self.current_state.is_terminal()
    }

    /// Returns the time elapsed since the current state was entered.
    #[must_use]
    pub fn time_in_current_state(&self) -> Duration {
        Duration::from_millis(millis_since(self.entered_current_state_at))
    }

    /// Returns every accepted transition, oldest first.
    #[must_use]
    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }

    /// Returns the most recent transition, if any.
    #[must_use]
    pub fn last_transition(&self) -> Option<&StateTransition> {
        self.history.last()
    }

    /// Encodes the machine as a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes a machine from the string form produced by [`TripStateMachine::serialize`].
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input is not valid JSON for a machine.
    /// - The last recorded transition does not end in the current state.
    pub fn deserialize(data: &str) -> anyhow::Result<Self> {
        let machine: Self = serde_json::from_str(data)?;

        if let Some(last) = machine.history.last() {
            anyhow::ensure!(
                last.to_state == machine.current_state,
                "Inconsistent trip history: last transition ends in {}, current state is {}",
                last.to_state,
                machine.current_state,
            );
        }

        Ok(machine)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    #[rstest]
    fn test_new_machine() {
        let machine = TripStateMachine::default();

        assert_eq!(machine.current_state(), TripState::Planning);
        assert!(machine.history().is_empty());
        assert!(machine.last_transition().is_none());
        assert!(!machine.is_terminal_state());
        assert_eq!(
            machine.valid_transitions(),
            &[TripState::Optimizing, TripState::Cancelled]
        );
    }

    #[rstest]
    fn test_legal_transition_is_recorded() {
        let mut machine = TripStateMachine::new(TripState::Planning);

        let accepted = machine.transition_to(
            TripState::Optimizing,
            Some("Budget allocated"),
            Some(AgentKind::Budget),
        );

        assert!(accepted);
        assert_eq!(machine.current_state(), TripState::Optimizing);
        assert_eq!(machine.history().len(), 1);
        let last = machine.last_transition().unwrap();
        assert_eq!(last.from_state, TripState::Planning);
        assert_eq!(last.to_state, TripState::Optimizing);
        assert_eq!(last.reason.as_deref(), Some("Budget allocated"));
        assert_eq!(last.triggered_by, Some(AgentKind::Budget));
        assert_eq!(last.timestamp, machine.entered_current_state_at());
    }

    #[rstest]
    fn test_illegal_transition_is_rejected_without_mutation() {
        let mut machine = TripStateMachine::new(TripState::Planning);
        let before = machine.clone();

        assert!(!machine.transition_to(TripState::Confirmed, None, None));
        assert_eq!(machine, before);
    }

    #[rstest]
    fn test_try_transition_to_error() {
        let mut machine = TripStateMachine::new(TripState::Completed);

        let err = machine
            .try_transition_to(TripState::Planning, None, None)
            .unwrap_err();

        assert_eq!(
            err,
            InvalidTransition {
                from: TripState::Completed,
                to: TripState::Planning,
            }
        );
        assert_eq!(
            err.to_string(),
            "Invalid trip state transition: COMPLETED -> PLANNING"
        );
    }

    #[rstest]
    fn test_full_lifecycle() {
        let mut machine = TripStateMachine::default();
        for target in [
            TripState::Optimizing,
            TripState::Booking,
            TripState::Confirmed,
            TripState::Active,
            TripState::Completed,
        ] {
            assert!(machine.transition_to(target, None, None), "-> {target}");
        }

        assert!(machine.is_terminal_state());
        assert_eq!(machine.history().len(), 5);
        assert!(machine.valid_transitions().is_empty());
    }

    #[rstest]
    fn test_failed_trip_can_be_replanned() {
        let mut machine = TripStateMachine::new(TripState::Booking);

        assert!(machine.transition_to(TripState::Failed, Some("No seats"), None));
        assert!(machine.transition_to(TripState::Planning, Some("Retry"), None));
        assert_eq!(machine.current_state(), TripState::Planning);
    }

    #[rstest]
    fn test_serialize_round_trip_preserves_history() {
        let mut machine = TripStateMachine::default();
        machine.transition_to(TripState::Optimizing, Some("Budget ok"), Some(AgentKind::Budget));
        machine.transition_to(TripState::Booking, None, Some(AgentKind::Optimization));

        let data = machine.serialize().unwrap();
        let restored = TripStateMachine::deserialize(&data).unwrap();

        assert_eq!(restored, machine);
        assert_eq!(restored.history()[0].reason.as_deref(), Some("Budget ok"));
    }

    #[rstest]
    fn test_serialized_form_uses_rfc3339_timestamps() {
        let machine = TripStateMachine::default();
        let value: serde_json::Value = serde_json::from_str(&machine.serialize().unwrap()).unwrap();

        assert_eq!(value["current_state"], "PLANNING");
        assert!(value["history"].as_array().unwrap().is_empty());
        let entered = value["entered_current_state_at"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(entered).is_ok());
    }

    #[rstest]
    #[case("not json")]
    #[case(r#"{"current_state":"UNKNOWN","history":[],"entered_current_state_at":"2025-01-01T00:00:00Z"}"#)]
    #[case(r#"{"current_state":"BOOKING","history":[{"from_state":"PLANNING","to_state":"OPTIMIZING","timestamp":"2025-01-01T00:00:00Z"}],"entered_current_state_at":"2025-01-01T00:00:00Z"}"#)]
    fn test_deserialize_invalid(#[case] data: &str) {
        assert!(TripStateMachine::deserialize(data).is_err());
    }

    #[rstest]
    fn test_deserialize_accepts_missing_optional_fields() {
        let data = r#"{"current_state":"OPTIMIZING","history":[{"from_state":"PLANNING","to_state":"OPTIMIZING","timestamp":"2025-01-01T00:00:00.123Z"}],"entered_current_state_at":"2025-01-01T00:00:00.123Z"}"#;

        let machine = TripStateMachine::deserialize(data).unwrap();

        assert_eq!(machine.current_state(), TripState::Optimizing);
        assert_eq!(machine.history()[0].reason, None);
        assert_eq!(machine.history()[0].triggered_by, None);
        assert_eq!(
            format_iso8601_millis(machine.entered_current_state_at()),
            "2025-01-01T00:00:00.123Z"
        );
    }

    #[rstest]
    fn test_transition_display() {
        let transition = StateTransition {
            from_state: TripState::Booking,
            to_state: TripState::Failed,
            timestamp: DateTime::parse_from_rfc3339("2025-03-01T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            reason: Some("Payment declined".to_string()),
            triggered_by: Some(AgentKind::Booking),
        };

        assert_eq!(
            transition.to_string(),
            "BOOKING -> FAILED at 2025-03-01T12:00:00.000Z by BOOKING (Payment declined)"
        );
    }

    fn arb_state() -> impl Strategy<Value = TripState> {
        prop::sample::select(TripState::iter().collect::<Vec<_>>())
    }

    proptest! {
        #[test]
        fn prop_history_is_a_valid_path(
            targets in prop::collection::vec(arb_state(), 0..50),
        ) {
            let mut machine = TripStateMachine::default();
            let mut accepted = 0;

            for target in targets {
                let before = machine.current_state();
                let legal = before.can_transition_to(target);
                prop_assert_eq!(machine.transition_to(target, None, None), legal);
                if legal {
                    accepted += 1;
                    prop_assert_eq!(machine.current_state(), target);
                } else {
                    prop_assert_eq!(machine.current_state(), before);
                }
            }

            prop_assert_eq!(machine.history().len(), accepted);

            let mut expected_from = TripState::Planning;
            for transition in machine.history() {
                prop_assert_eq!(transition.from_state, expected_from);
                prop_assert!(transition.from_state.can_transition_to(transition.to_state));
                expected_from = transition.to_state;
            }
            prop_assert_eq!(expected_from, machine.current_state());
        }

        #[test]
        fn prop_terminal_states_are_absorbing(target in arb_state()) {
            for terminal in [TripState::Completed, TripState::Cancelled] {
                let mut machine = TripStateMachine::new(terminal);
                prop_assert!(!machine.transition_to(target, None, None));
                prop_assert_eq!(machine.current_state(), terminal);
            }
        }
    }
}
