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

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The context supplied to agents on initialization.
///
/// The bus and registry treat the context as opaque; it is only interpreted by agents.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentContext {
    /// The trip the agents are working on, if any.
    pub trip_id: Option<String>,
    /// The session the agents belong to, if any.
    pub session_id: Option<String>,
    /// The user on whose behalf the agents act, if any.
    pub user_id: Option<String>,
    /// Free-form metadata.
    pub metadata: IndexMap<String, serde_json::Value>,
}

impl AgentContext {
    /// Returns the context with the given `trip_id`.
    #[must_use]
    pub fn with_trip_id<T: Into<String>>(mut self, trip_id: T) -> Self {
        self.trip_id = Some(trip_id.into());
        self
    }

    /// Returns the context with the given `session_id`.
    #[must_use]
    pub fn with_session_id<T: Into<String>>(mut self, session_id: T) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Returns the context with the given `user_id`.
    #[must_use]
    pub fn with_user_id<T: Into<String>>(mut self, user_id: T) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Returns the context with `key` set to `value` in the metadata.
    #[must_use]
    pub fn with_metadata<K: Into<String>>(mut self, key: K, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}
