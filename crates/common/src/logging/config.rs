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

use std::{env, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

/// The environment variable which overrides the configured logging.
pub const ENV_LOG: &str = "ITINERA_LOG";

/// Configuration for the tracing subscriber installed by [`init_logging`](super::init_logging).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// The maximum level for all targets, e.g. `INFO`.
    pub level: String,
    /// Maximum levels per target (module path), e.g. `itinera_common::msgbus = "DEBUG"`.
    pub component_levels: IndexMap<String, String>,
    /// If ANSI colors are written.
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            component_levels: IndexMap::new(),
            ansi: true,
        }
    }
}

impl LoggingConfig {
    /// Parses a configuration from a `;` separated spec string.
    ///
    /// Recognized entries are `level=<LEVEL>`, `is_colored`, `no_color` and
    /// `<target>=<LEVEL>` for per-component levels, e.g.
    /// `level=INFO;itinera_common::msgbus=DEBUG;no_color`.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry is malformed or a level is invalid.
    pub fn from_spec(spec: &str) -> anyhow::Result<Self> {
        let mut config = Self::default();
        for kv in spec.split(';') {
            let kv = kv.trim();
            if kv.is_empty() {
                continue;
            }

            match kv.to_lowercase().as_str() {
                "is_colored" => config.ansi = true,
                "no_color" => config.ansi = false,
                _ => {
                    let Some((key, value)) = kv.split_once('=') else {
                        anyhow::bail!("Invalid spec pair: {kv}");
                    };
                    let (key, value) = (key.trim(), value.trim());
                    parse_level_filter_str(value)?;

                    if key.eq_ignore_ascii_case("level") || key.eq_ignore_ascii_case("stdout") {
                        config.level = value.to_uppercase();
                    } else {
                        config
                            .component_levels
                            .insert(key.to_string(), value.to_uppercase());
                    }
                }
            }
        }
        Ok(config)
    }

    /// Retrieves the configuration from the `ITINERA_LOG` environment variable, if set.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is not valid unicode or not a valid spec string.
    pub fn from_env() -> anyhow::Result<Option<Self>> {
        match env::var(ENV_LOG) {
            Ok(spec) => Self::from_spec(&spec).map(Some),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Validates all configured levels.
    ///
    /// # Errors
    ///
    /// Returns an error if any level is not a valid level name.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.env_filter_directives().map(|_| ())
    }

    /// Returns the `EnvFilter` directives for this configuration,
    /// e.g. `info,itinera_common::msgbus=debug`.
    ///
    /// # Errors
    ///
    /// Returns an error if any level is not a valid level name.
    pub fn env_filter_directives(&self) -> anyhow::Result<String> {
        let level = parse_level_filter_str(&self.level)?;
        let mut directives = vec![level.to_string().to_lowercase()];
        for (component, level) in &self.component_levels {
            let level = parse_level_filter_str(level)?;
            directives.push(format!("{component}={}", level.to_string().to_lowercase()));
        }
        Ok(directives.join(","))
    }
}

/// Parses a string into a [`LevelFilter`] (case-insensitive, `WARNING` is accepted for `WARN`).
///
/// # Errors
///
/// Returns an error if the string is not a valid level name.
pub fn parse_level_filter_str(s: &str) -> anyhow::Result<LevelFilter> {
    let mut level_str = s.trim().to_uppercase();
    if level_str == "WARNING" {
        level_str = "WARN".to_string();
    }
    LevelFilter::from_str(&level_str)
        .map_err(|_| anyhow::anyhow!("Invalid `LevelFilter` string, was {s}"))
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("TRACE", LevelFilter::TRACE)]
    #[case("debug", LevelFilter::DEBUG)]
    #[case("Info", LevelFilter::INFO)]
    #[case("WARNING", LevelFilter::WARN)]
    #[case("warn", LevelFilter::WARN)]
    #[case("ERROR", LevelFilter::ERROR)]
    #[case("OFF", LevelFilter::OFF)]
    fn test_parse_level_filter_str(#[case] input: &str, #[case] expected: LevelFilter) {
        assert_eq!(parse_level_filter_str(input).unwrap(), expected);
    }

    #[rstest]
    fn test_parse_level_filter_str_invalid() {
        assert!(parse_level_filter_str("LOUD").is_err());
    }

    #[rstest]
    fn test_default_directives() {
        let config = LoggingConfig::default();
        assert_eq!(config.env_filter_directives().unwrap(), "info");
        assert!(config.ansi);
    }

    #[rstest]
    fn test_from_spec() {
        let config =
            LoggingConfig::from_spec("level=WARN;itinera_common::msgbus=debug;no_color").unwrap();

        assert_eq!(config.level, "WARN");
        assert_eq!(
            config.component_levels.get("itinera_common::msgbus"),
            Some(&"DEBUG".to_string())
        );
        assert!(!config.ansi);
        assert_eq!(
            config.env_filter_directives().unwrap(),
            "warn,itinera_common::msgbus=debug"
        );
    }

    #[rstest]
    #[case("level")]
    #[case("level=LOUD")]
    #[case("itinera_trip=sometimes")]
    fn test_from_spec_invalid(#[case] spec: &str) {
        assert!(LoggingConfig::from_spec(spec).is_err());
    }

    #[rstest]
    fn test_validate_invalid_component_level() {
        let mut config = LoggingConfig::default();
        config
            .component_levels
            .insert("itinera_trip".to_string(), "VERBOSE".to_string());
        assert!(config.validate().is_err());
    }
}
