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

//! A `UUID4` Universally Unique Identifier (UUID) version 4 (RFC 4122).

use std::{
    fmt::{Debug, Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Represents a Universally Unique Identifier (UUID)
/// version 4 based on a 128-bit label as specified in RFC 4122.
///
/// Used for message identifiers and request/response correlation.
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct UUID4 {
    value: Uuid,
}

impl UUID4 {
    /// Creates a new random [`UUID4`] instance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            value: Uuid::new_v4(),
        }
    }
}

impl FromStr for UUID4 {
    type Err = uuid::Error;

    /// Attempts to create a [`UUID4`] from a string representation.
    ///
    /// The string may be hyphenated or simple (32 hex digits).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::try_parse(value)?;
        Ok(Self { value: uuid })
    }
}

impl From<&str> for UUID4 {
    /// Creates a [`UUID4`] from a string.
    ///
    /// # Panics
    ///
    /// Panics if the `value` string is not a valid UUID.
    fn from(value: &str) -> Self {
        value
            .parse()
            .unwrap_or_else(|e| panic!("Invalid UUID4 string '{value}': {e}"))
    }
}

impl From<Uuid> for UUID4 {
    fn from(value: Uuid) -> Self {
        Self { value }
    }
}

impl Default for UUID4 {
    /// Creates a new default [`UUID4`] instance.
    ///
    /// The default UUID4 is simply a newly generated UUID version 4.
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for UUID4 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}('{}')", stringify!(UUID4), self)
    }
}

impl Display for UUID4 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value.hyphenated())
    }
}

impl Serialize for UUID4 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for UUID4 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;
    use uuid::Version;

    use super::*;

    #[rstest]
    fn test_new() {
        let uuid = UUID4::new();
        let parsed = Uuid::parse_str(&uuid.to_string()).unwrap();

        assert_eq!(parsed.get_version(), Some(Version::Random));
        assert_eq!(uuid.to_string().len(), 36);
    }

    #[rstest]
    fn test_new_values_are_unique() {
        assert_ne!(UUID4::new(), UUID4::new());
    }

    #[rstest]
    #[case("6ba7b810-9dad-11d1-80b4-00c04fd430c8")]
    #[case("2d89666b-1a1e-4a75-b193-4eb3b454c757")]
    fn test_from_str_and_display(#[case] value: &str) {
        let uuid = UUID4::from(value);
        assert_eq!(uuid.to_string(), value);
        assert_eq!(format!("{uuid:?}"), format!("UUID4('{value}')"));
    }

    #[rstest]
    fn test_from_str_simple_format() {
        let uuid: UUID4 = "6ba7b8109dad11d180b400c04fd430c8".parse().unwrap();
        assert_eq!(uuid.to_string(), "6ba7b810-9dad-11d1-80b4-00c04fd430c8");
    }

    #[rstest]
    #[case("")]
    #[case("not-a-uuid")]
    #[case("6ba7b810-9dad-11d1-80b4-00c04fd430")]
    fn test_from_str_invalid(#[case] value: &str) {
        assert!(value.parse::<UUID4>().is_err());
    }

    #[rstest]
    #[should_panic(expected = "Invalid UUID4 string")]
    fn test_from_invalid_str_panics() {
        let _ = UUID4::from("invalid");
    }

    #[rstest]
    fn test_serde_json_string_form() {
        let uuid = UUID4::from("6ba7b810-9dad-11d1-80b4-00c04fd430c8");

        let json = serde_json::to_string(&uuid).unwrap();
        assert_eq!(json, "\"6ba7b810-9dad-11d1-80b4-00c04fd430c8\"");

        let decoded: UUID4 = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, uuid);
    }

    #[rstest]
    fn test_deserialize_invalid_fails() {
        let result: Result<UUID4, _> = serde_json::from_str("\"nope\"");
        assert!(result.is_err());
    }
}
