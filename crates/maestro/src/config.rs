//! Runner Configuration
//!
//! Knobs for how commands are reported and how long driver waits may take.

use crate::assertion::is_truthy;
use crate::wait::WaitOptions;
use serde::{Deserialize, Serialize};

/// Default cap on the JSON rendering of step parameters in a title
pub const DEFAULT_MAX_PARAM_CHARS: usize = 120;

/// Configuration for a test run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Append a step's JSON parameters to its reported title
    pub report_step_params: bool,
    /// Truncate reported parameters to this many characters
    pub max_param_chars: usize,
    /// Emit a debug event for every executed command
    pub log_commands: bool,
    /// Timeouts forwarded to driver waits
    pub wait: WaitOptions,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            report_step_params: true,
            max_param_chars: DEFAULT_MAX_PARAM_CHARS,
            log_commands: true,
            wait: WaitOptions::default(),
        }
    }
}

impl RunnerConfig {
    /// Create a new builder
    #[must_use]
    pub fn builder() -> RunnerConfigBuilder {
        RunnerConfigBuilder::default()
    }

    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> crate::result::MaestroResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render a step title, optionally suffixed with its parameters
    ///
    /// Falsy params (`null`, `false`, `0`, `""`) leave the title bare.
    #[must_use]
    pub fn step_title(&self, name: &str, params: &serde_json::Value) -> String {
        if !self.report_step_params || !is_truthy(params) {
            return name.to_string();
        }
        let rendered = params.to_string();
        if rendered.chars().count() > self.max_param_chars {
            let clipped: String = rendered.chars().take(self.max_param_chars).collect();
            format!("{name} ({clipped}…)")
        } else {
            format!("{name} ({rendered})")
        }
    }
}

/// Builder for `RunnerConfig`
#[derive(Debug, Clone, Default)]
pub struct RunnerConfigBuilder {
    config: RunnerConfig,
}

impl RunnerConfigBuilder {
    /// Enable/disable parameter reporting in step titles
    #[must_use]
    pub fn report_step_params(mut self, enabled: bool) -> Self {
        self.config.report_step_params = enabled;
        self
    }

    /// Set the parameter truncation length
    #[must_use]
    pub fn max_param_chars(mut self, max: usize) -> Self {
        self.config.max_param_chars = max;
        self
    }

    /// Enable/disable per-command debug events
    #[must_use]
    pub fn log_commands(mut self, enabled: bool) -> Self {
        self.config.log_commands = enabled;
        self
    }

    /// Set driver wait options
    #[must_use]
    pub fn wait(mut self, wait: WaitOptions) -> Self {
        self.config.wait = wait;
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> RunnerConfig {
        self.config
    }
}
