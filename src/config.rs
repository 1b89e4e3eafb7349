//! Filter configuration, loadable from TOML or JSON

use serde::{Deserialize, Serialize};

use crate::engine::CombineMode;
use crate::error::ConfigError;

/// Declarative configuration for a [`DecisionEngine`](crate::DecisionEngine).
///
/// ```toml
/// conditions = ["HLT_Mu_v* AND NOT HLT_Iso_v?", "HLT_Jet*/10"]
/// strict = false
/// mode = "any"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Condition strings, one per line of the filter
    pub conditions: Vec<String>,
    /// Fail evaluation when a pattern matches no path in the menu
    #[serde(default)]
    pub strict: bool,
    /// How per-condition verdicts combine
    #[serde(default)]
    pub mode: CombineMode,
    /// Accept only the first of every N otherwise-accepting decisions,
    /// applied after the combine logic on top of per-path prescales.
    /// 1 disables the throttle; 0 is rejected at engine construction.
    #[serde(default = "default_overall_prescale")]
    pub overall_prescale: u32,
}

fn default_overall_prescale() -> u32 {
    1
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            conditions: Vec::new(),
            strict: false,
            mode: CombineMode::default(),
            overall_prescale: 1,
        }
    }
}

impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one condition string
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_mode(mut self, mode: CombineMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_overall_prescale(mut self, factor: u32) -> Self {
        self.overall_prescale = factor;
        self
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Parse a configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}
