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

//! Trip lifecycle for the [Itinera](https://github.com/nautechsystems/itinera) agent runtime.
//!
//! The `itinera-trip` crate governs how a trip moves from planning through booking to
//! completion:
//!
//! - [`TripState`] and its static table of legal transitions.
//! - [`TripStateMachine`], an auditable record of every transition a trip has taken, with a
//!   JSON string form for persistence adapters.
//! - [`TripPlanner`], the orchestrating agent which drives a trip through the budget,
//!   optimization and booking agents over the message bus.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod machine;
pub mod planner;
pub mod state;

// Re-exports
pub use crate::{
    machine::{InvalidTransition, StateTransition, TripStateMachine},
    planner::{PlanOutcome, PlannerConfig, TripPlanner},
    state::TripState,
};
