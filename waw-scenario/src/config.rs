//! Load-time configuration

use serde::{Deserialize, Serialize};

use crate::params::ParameterHints;
use crate::{CHUNK_SIZE_CEILING, DEFAULT_MIN_TEXT_RUN};

/// Tunables applied while loading a scenario
///
/// Every field has a default, so a partial TOML table is a valid config:
///
/// ```toml
/// min_text_run = 6
///
/// [parameter_hints.TOBRUK]
/// chunk = 3
/// offset = 412
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Shortest printable run reported as mission text
    pub min_text_run: usize,
    /// Largest chunk size the walker trusts
    pub chunk_size_ceiling: u16,
    /// Known parameter array locations by scenario name
    pub parameter_hints: ParameterHints,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            min_text_run: DEFAULT_MIN_TEXT_RUN,
            chunk_size_ceiling: CHUNK_SIZE_CEILING,
            parameter_hints: ParameterHints::new(),
        }
    }
}

/// Options for [`crate::load_with`]
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Scenario name used to look up a parameter hint (usually the file stem)
    pub scenario_name: Option<String>,
    pub config: CodecConfig,
}

impl LoadOptions {
    pub fn new(config: CodecConfig) -> Self {
        Self {
            scenario_name: None,
            config,
        }
    }

    /// Set the scenario name used for hint lookups
    pub fn with_scenario_name(mut self, name: impl Into<String>) -> Self {
        self.scenario_name = Some(name.into());
        self
    }
}
