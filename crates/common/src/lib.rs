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

//! Common componentry for the [Itinera](https://github.com/itinera-dev/itinera) agent runtime.
//!
//! The `itinera-common` crate provides the machinery shared by every travel planning agent:
//!
//! - The typed enums which identify agents and classify messages.
//! - The [`AgentMessage`](messages::AgentMessage) envelope and its [`Payload`](messages::Payload).
//! - The in-process [`MessageBus`](msgbus::MessageBus) with request/response correlation.
//! - The [`Agent`](agent::Agent) contract, health reporting and the
//!   [`AgentRegistry`](agent::AgentRegistry).
//! - Logging initialization on top of `tracing`.
//!
//! # Feature flags
//!
//! This crate provides feature flags to control source code inclusion during compilation:
//!
//! - `stubs`: Enables stub handlers and agents for use in testing scenarios.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod agent;
pub mod enums;
pub mod logging;
pub mod messages;
pub mod msgbus;
pub mod testing;
