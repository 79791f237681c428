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

//! The orchestrating agent which drives trips through planning and booking.
//!
//! Planning a trip runs three request/response steps over the bus in order: the budget
//! agent allocates a budget, the optimization agent ranks options within it, and the
//! booking agent executes the chosen option. Each successful step advances the trip's
//! [`TripStateMachine`]; the first failed step stops the run.

use std::{sync::Mutex, time::Duration};

use async_trait::async_trait;
use indexmap::IndexMap;
use itinera_common::{
    agent::{Agent, AgentContext, AgentCore},
    enums::{AgentKind, MessagePriority, MessageType},
    messages::{AgentMessage, Payload, TripReply, TripRequest},
    msgbus::MessageBus,
};
use itinera_core::{MUTEX_POISONED, correctness::check_positive_u64};
use serde::{Deserialize, Serialize};
use serde_json::json;
use strum::Display;

use crate::{machine::TripStateMachine, state::TripState};

/// The default time the planner waits for each agent to reply.
pub const DEFAULT_PLANNER_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Configuration for the [`TripPlanner`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerConfig {
    /// How long to wait for each planning step reply (milliseconds).
    pub request_timeout_ms: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: DEFAULT_PLANNER_REQUEST_TIMEOUT_MS,
        }
    }
}

impl PlannerConfig {
    /// Returns the per-step request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `request_timeout_ms` is zero.
    pub fn validate(&self) -> anyhow::Result<()> {
        check_positive_u64(self.request_timeout_ms, stringify!(request_timeout_ms))
    }
}

/// The result of a [`TripPlanner::plan_trip`] run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanOutcome {
    /// The trip planned.
    pub trip_id: String,
    /// The trip state once the run finished.
    pub final_state: TripState,
    /// The budget agent's reply, if that step succeeded.
    pub budget: Option<TripReply>,
    /// The optimization agent's reply, if that step succeeded.
    pub options: Option<TripReply>,
    /// The booking agent's reply, if that step succeeded.
    pub booking: Option<TripReply>,
    /// Why the run stopped early, if it did.
    pub failure: Option<String>,
}

impl PlanOutcome {
    fn new(trip_id: &str) -> Self {
        Self {
            trip_id: trip_id.to_string(),
            final_state: TripState::Planning,
            budget: None,
            options: None,
            booking: None,
            failure: None,
        }
    }

    /// Returns whether the trip reached CONFIRMED.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.final_state == TripState::Confirmed
    }
}

#[derive(Clone, Copy, Debug, Display)]
#[strum(serialize_all = "snake_case")]
enum PlanStep {
    Budget,
    Optimization,
    Booking,
}

impl PlanStep {
    const ALL: [Self; 3] = [Self::Budget, Self::Optimization, Self::Booking];

    const fn agent(self) -> AgentKind {
        match self {
            Self::Budget => AgentKind::Budget,
            Self::Optimization => AgentKind::Optimization,
            Self::Booking => AgentKind::Booking,
        }
    }

    const fn next_state(self) -> TripState {
        match self {
            Self::Budget => TripState::Optimizing,
            Self::Optimization => TripState::Booking,
            Self::Booking => TripState::Confirmed,
        }
    }

    // Key under which the step's result is passed on to later steps
    const fn data_key(self) -> &'static str {
        match self {
            Self::Budget => "budget",
            Self::Optimization => "options",
            Self::Booking => "booking",
        }
    }

    fn request(self, trip_id: &str, params: serde_json::Value) -> Payload {
        let request = TripRequest::new(trip_id, params);
        match self {
            Self::Budget => Payload::AllocateBudget(request),
            Self::Optimization => Payload::RankOptions(request),
            Self::Booking => Payload::ExecuteBooking(request),
        }
    }

    fn extract(self, payload: Payload) -> Result<TripReply, String> {
        match (self, payload) {
            (Self::Budget, Payload::BudgetAllocated(reply))
            | (Self::Optimization, Payload::OptionsRanked(reply))
            | (Self::Booking, Payload::BookingExecuted(reply)) => Ok(reply),
            (_, Payload::Failure { reason }) => Err(reason),
            (_, other) => Err(format!("Unexpected reply {}", other.kind())),
        }
    }
}

/// The orchestrating agent, owning the state machine of every trip it plans.
#[derive(Debug)]
pub struct TripPlanner {
    core: AgentCore,
    config: PlannerConfig,
    trips: Mutex<IndexMap<String, TripStateMachine>>,
}

impl TripPlanner {
    /// Creates a new [`TripPlanner`] instance on the `msgbus`.
    #[must_use]
    pub fn new(msgbus: MessageBus, config: PlannerConfig) -> Self {
        Self {
            core: AgentCore::new(AgentKind::Orchestrator, msgbus),
            config,
            trips: Mutex::new(IndexMap::new()),
        }
    }

    /// Returns the planner configuration.
    #[must_use]
    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Returns the IDs of every trip known to the planner.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn trip_ids(&self) -> Vec<String> {
        self.trips.lock().expect(MUTEX_POISONED).keys().cloned().collect()
    }

    /// Returns a copy of the state machine for `trip_id`, if known.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn trip(&self, trip_id: &str) -> Option<TripStateMachine> {
        self.trips.lock().expect(MUTEX_POISONED).get(trip_id).cloned()
    }

    /// Returns the current state of `trip_id`, if known.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn trip_state(&self, trip_id: &str) -> Option<TripState> {
        self.trips
            .lock()
            .expect(MUTEX_POISONED)
            .get(trip_id)
            .map(TripStateMachine::current_state)
    }

    /// Returns the string form of the state machine for `trip_id`, for a persistence adapter.
    ///
    /// # Errors
    ///
    /// Returns an error if the trip is unknown or cannot be serialized.
    pub fn export_trip(&self, trip_id: &str) -> anyhow::Result<String> {
        self.with_trip(trip_id, |machine| TripStateMachine::serialize(machine))?
    }

    /// Restores the state machine for `trip_id` from its string form, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is not a valid state machine string.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn restore_trip(&self, trip_id: &str, data: &str) -> anyhow::Result<()> {
        let machine = TripStateMachine::deserialize(data)?;
        tracing::info!(
            agent = %self.kind(),
            trip_id,
            "Restored trip in state {}",
            machine.current_state(),
        );
        self.trips
            .lock()
            .expect(MUTEX_POISONED)
            .insert(trip_id.to_string(), machine);
        Ok(())
    }

    /// Moves `trip_id` to `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the trip is unknown or the transition is illegal.
    pub fn advance_trip(
        &self,
        trip_id: &str,
        target: TripState,
        reason: Option<&str>,
    ) -> anyhow::Result<()> {
        let kind = self.kind();
        self.with_trip(trip_id, |machine| {
            machine.try_transition_to(target, reason, Some(kind))
        })??;
        tracing::info!(agent = %kind, trip_id, "Trip moved to {target}");
        Ok(())
    }

    /// Cancels `trip_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the trip is unknown or already in a terminal state.
    pub fn cancel_trip(&self, trip_id: &str, reason: Option<&str>) -> anyhow::Result<()> {
        self.advance_trip(trip_id, TripState::Cancelled, reason)
    }

    /// Plans `trip_id` with `params` through the budget, optimization and booking agents.
    ///
    /// A new trip starts in PLANNING. A trip which previously failed is moved back to PLANNING,
    /// and a trip left in PLANNING by an earlier budget failure is retried as is.
    ///
    /// A step stops the run when its agent replies with a failure or an unexpected payload,
    /// or when the request itself fails (e.g. times out). The trip is then moved to FAILED
    /// where that is a legal transition, so a budget failure leaves it in PLANNING. An alert
    /// is raised for every failed step.
    ///
    /// # Errors
    ///
    /// Returns an error if the trip exists in a state other than PLANNING or FAILED.
    pub async fn plan_trip(
        &self,
        trip_id: &str,
        params: serde_json::Value,
    ) -> anyhow::Result<PlanOutcome> {
        self.begin_planning(trip_id)?;
        tracing::info!(agent = %self.kind(), trip_id, "Planning trip");

        let mut outcome = PlanOutcome::new(trip_id);
        let mut data = json!({ "params": params });

        for step in PlanStep::ALL {
            let reply = match self.run_step(step, trip_id, data.clone()).await {
                Ok(reply) => reply,
                Err(reason) => {
                    self.fail_step(step, trip_id, &reason).await;
                    outcome.failure = Some(format!("{step} step failed: {reason}"));
                    break;
                }
            };

            let reason = format!("{step} step succeeded");
            let advanced = self.with_trip(trip_id, |machine| {
                machine.try_transition_to(step.next_state(), Some(reason.as_str()), Some(step.agent()))
            })?;
            if let Err(e) = advanced {
                // Moved elsewhere while waiting for the reply (e.g. cancelled)
                tracing::warn!(agent = %self.kind(), trip_id, "{e}");
                outcome.failure = Some(e.to_string());
                break;
            }

            data[step.data_key()] = reply.data.clone();
            match step {
                PlanStep::Budget => outcome.budget = Some(reply),
                PlanStep::Optimization => outcome.options = Some(reply),
                PlanStep::Booking => outcome.booking = Some(reply),
            }
        }

        outcome.final_state = self.with_trip(trip_id, |machine| machine.current_state())?;
        tracing::info!(
            agent = %self.kind(),
            trip_id,
            "Planning finished in state {}",
            outcome.final_state,
        );
        Ok(outcome)
    }

    fn with_trip<R>(
        &self,
        trip_id: &str,
        f: impl FnOnce(&mut TripStateMachine) -> R,
    ) -> anyhow::Result<R> {
        let mut trips = self.trips.lock().expect(MUTEX_POISONED);
        let machine = trips
            .get_mut(trip_id)
            .ok_or_else(|| anyhow::anyhow!("Unknown trip {trip_id}"))?;
        Ok(f(machine))
    }

    fn begin_planning(&self, trip_id: &str) -> anyhow::Result<()> {
        let mut trips = self.trips.lock().expect(MUTEX_POISONED);
        let Some(machine) = trips.get_mut(trip_id) else {
            trips.insert(trip_id.to_string(), TripStateMachine::new(TripState::Planning));
            return Ok(());
        };

        match machine.current_state() {
            TripState::Planning => Ok(()),
            TripState::Failed => {
                machine.try_transition_to(
                    TripState::Planning,
                    Some("Re-planning"),
                    Some(AgentKind::Orchestrator),
                )?;
                Ok(())
            }
            state => anyhow::bail!("Trip {trip_id} cannot be planned from state {state}"),
        }
    }

    async fn run_step(
        &self,
        step: PlanStep,
        trip_id: &str,
        data: serde_json::Value,
    ) -> Result<TripReply, String> {
        let reply = self
            .request_from_agent(
                step.agent(),
                step.request(trip_id, data),
                Some(self.config.request_timeout()),
            )
            .await
            .map_err(|e| e.to_string())?;
        step.extract(reply)
    }

    async fn fail_step(&self, step: PlanStep, trip_id: &str, reason: &str) {
        let moved = self.with_trip(trip_id, |machine| {
            if machine.can_transition_to(TripState::Failed) {
                machine.transition_to(TripState::Failed, Some(reason), Some(step.agent()))
            } else {
                false
            }
        });
        tracing::error!(
            agent = %self.kind(),
            trip_id,
            failed = matches!(moved, Ok(true)),
            "Trip {step} step failed: {reason}",
        );

        self.raise_alert(
            MessagePriority::High,
            format!("Trip {trip_id} {step} step failed: {reason}"),
        )
        .await;
    }
}

#[async_trait]
impl Agent for TripPlanner {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    async fn handle_message(&self, message: &AgentMessage) -> anyhow::Result<()> {
        match message.message_type {
            MessageType::Request => {
                let reply = match &message.payload {
                    Payload::TripStatus { trip_id } => match self.trip(trip_id) {
                        Some(machine) => Payload::TripStatusReport {
                            trip_id: trip_id.clone(),
                            state: machine.current_state().to_string(),
                            terminal: machine.is_terminal_state(),
                        },
                        None => Payload::failure(format!("Unknown trip {trip_id}")),
                    },
                    other => Payload::failure(format!("Unsupported request {}", other.kind())),
                };
                self.respond_to_message(message, reply).await;
            }
            // Correlated replies are consumed by the pending request
            MessageType::Response => {}
            MessageType::Event => {
                tracing::debug!(agent = %self.kind(), "Received {message}");
            }
            MessageType::Alert => {
                tracing::warn!(agent = %self.kind(), "Received {message}");
            }
        }
        Ok(())
    }

    async fn on_initialize(&self, _context: &AgentContext) -> anyhow::Result<()> {
        self.config.validate()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_config_default() {
        let config = PlannerConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[rstest]
    fn test_config_zero_timeout_invalid() {
        let config = PlannerConfig {
            request_timeout_ms: 0,
        };
        assert!(config.validate().is_err());
    }

    #[rstest]
    fn test_config_deserialize_rejects_unknown_fields() {
        let result: Result<PlannerConfig, _> =
            serde_json::from_str(r#"{"request_timeout_ms": 10, "retries": 3}"#);
        assert!(result.is_err());
    }

    #[rstest]
    #[case(PlanStep::Budget, Payload::BudgetAllocated(TripReply::new("T1", json!(1))), true)]
    #[case(PlanStep::Budget, Payload::OptionsRanked(TripReply::new("T1", json!(1))), false)]
    #[case(PlanStep::Optimization, Payload::OptionsRanked(TripReply::new("T1", json!(1))), true)]
    #[case(PlanStep::Booking, Payload::BookingExecuted(TripReply::new("T1", json!(1))), true)]
    #[case(PlanStep::Booking, Payload::failure("sold out"), false)]
    fn test_step_extract(#[case] step: PlanStep, #[case] payload: Payload, #[case] ok: bool) {
        assert_eq!(step.extract(payload).is_ok(), ok);
    }

    #[rstest]
    fn test_step_extract_failure_reason() {
        assert_eq!(
            PlanStep::Booking.extract(Payload::failure("sold out")),
            Err("sold out".to_string())
        );
        assert_eq!(
            PlanStep::Budget.extract(Payload::notice("hi")),
            Err("Unexpected reply NOTICE".to_string())
        );
    }

    #[rstest]
    fn test_restore_and_export_trip() {
        let planner = TripPlanner::new(MessageBus::default(), PlannerConfig::default());
        let mut machine = TripStateMachine::default();
        machine.transition_to(TripState::Optimizing, None, None);

        planner
            .restore_trip("T1", &machine.serialize().unwrap())
            .unwrap();

        assert_eq!(planner.trip_state("T1"), Some(TripState::Optimizing));
        assert_eq!(planner.trip_ids(), vec!["T1".to_string()]);
        let exported = planner.export_trip("T1").unwrap();
        assert_eq!(TripStateMachine::deserialize(&exported).unwrap(), machine);
    }

    #[rstest]
    fn test_export_unknown_trip_fails() {
        let planner = TripPlanner::new(MessageBus::default(), PlannerConfig::default());
        let err = planner.export_trip("missing").unwrap_err();
        assert_eq!(err.to_string(), "Unknown trip missing");
    }

    #[rstest]
    fn test_advance_and_cancel_trip() {
        let planner = TripPlanner::new(MessageBus::default(), PlannerConfig::default());
        let machine = TripStateMachine::new(TripState::Confirmed);
        planner
            .restore_trip("T1", &machine.serialize().unwrap())
            .unwrap();

        planner
            .advance_trip("T1", TripState::Active, Some("Departed"))
            .unwrap();
        assert!(planner.advance_trip("T1", TripState::Booking, None).is_err());
        planner.cancel_trip("T1", Some("Illness")).unwrap();

        let machine = planner.trip("T1").unwrap();
        assert_eq!(machine.current_state(), TripState::Cancelled);
        assert_eq!(machine.last_transition().unwrap().reason.as_deref(), Some("Illness"));
        assert_eq!(
            machine.last_transition().unwrap().triggered_by,
            Some(AgentKind::Orchestrator)
        );
        assert!(planner.cancel_trip("T1", None).is_err());
    }
}
