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

//! Trip lifecycle states and the table of legal transitions between them.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, FromRepr};

/// The lifecycle state of a trip.
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
pub enum TripState {
    /// Gathering requirements and allocating a budget.
    #[default]
    Planning = 1,
    /// Ranking candidate itinerary options.
    Optimizing = 2,
    /// Executing reservations.
    Booking = 3,
    /// All reservations confirmed.
    Confirmed = 4,
    /// The trip is underway.
    Active = 5,
    /// The trip has finished.
    Completed = 6,
    /// The trip was cancelled.
    Cancelled = 7,
    /// Planning or booking failed; the trip may be re-planned.
    Failed = 8,
}

impl TripState {
    /// Returns the states reachable from this state in a single transition.
    #[must_use]
    pub const fn valid_transitions(self) -> &'static [Self] {
        match self {
            Self::Planning => &[Self::Optimizing, Self::Cancelled],
            Self::Optimizing => &[Self::Booking, Self::Planning, Self::Failed, Self::Cancelled],
            Self::Booking => &[Self::Confirmed, Self::Failed, Self::Cancelled],
            Self::Confirmed => &[Self::Active, Self::Cancelled],
            Self::Active => &[Self::Completed, Self::Cancelled],
            Self::Failed => &[Self::Planning, Self::Cancelled],
            Self::Completed | Self::Cancelled => &[],
        }
    }

    /// Returns whether a transition from this state to `target` is legal.
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        self.valid_transitions().contains(&target)
    }

    /// Returns whether this state has no legal outgoing transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        self.valid_transitions().is_empty()
    }
}
