use std::path::Path;

use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::error::ConfigError;
use crate::repeat::RepeatTiming;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Hold time before a held direction or select starts repeating.
    pub repeat_delay_ms: u64,
    pub repeat_interval_ms: u64,
    pub default_layout: String,
    pub shift_layout: String,
    /// Stick deflection that counts as a direction, in (0, 1).
    pub stick_threshold: f32,
    /// Re-check the focused element against the live candidate set before
    /// each action and fall back to the first candidate if it is gone.
    pub revalidate_focus: bool,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            repeat_delay_ms: 300,
            repeat_interval_ms: 100,
            default_layout: "default".into(),
            shift_layout: "shift".into(),
            stick_threshold: 0.5,
            revalidate_focus: true,
        }
    }
}

impl NavConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: NavConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repeat_delay_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "repeat_delay_ms",
                reason: "must be greater than zero".into(),
            });
        }
        if !(1..=1000).contains(&self.repeat_interval_ms) {
            return Err(ConfigError::Invalid {
                field: "repeat_interval_ms",
                reason: format!("{} is outside 1..=1000", self.repeat_interval_ms),
            });
        }
        if !(self.stick_threshold > 0.0 && self.stick_threshold < 1.0) {
            return Err(ConfigError::Invalid {
                field: "stick_threshold",
                reason: format!("{} is outside (0, 1)", self.stick_threshold),
            });
        }
        if self.default_layout == self.shift_layout {
            return Err(ConfigError::Invalid {
                field: "shift_layout",
                reason: "must differ from default_layout".into(),
            });
        }
        Ok(())
    }

    pub fn repeat_timing(&self) -> RepeatTiming {
        RepeatTiming {
            delay: Duration::from_millis(self.repeat_delay_ms),
            interval: Duration::from_millis(self.repeat_interval_ms),
        }
    }

    /// The layout a toggle switches to from `current`.
    pub fn toggled_layout(&self, current: &str) -> &str {
        if current == self.shift_layout {
            &self.default_layout
        } else {
            &self.shift_layout
        }
    }
}
