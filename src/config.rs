//! Controller configuration.
//!
//! Every field has a default, so an empty or missing YAML file yields the
//! stock companion behaviour.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Physical limits and step sizes applied by the transition rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_speed: f32,
    pub speed_increment: f32,
    /// Steering is clamped to `[-max_steering_angle, max_steering_angle]`.
    pub max_steering_angle: f32,
    pub steering_increment: f32,
    pub brake_pulse_position: u8,
    pub emergency_brake_position: u8,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_speed: 240.0,
            speed_increment: 5.0,
            max_steering_angle: 40.0,
            steering_increment: 5.0,
            brake_pulse_position: 50,
            emergency_brake_position: 100,
        }
    }
}

/// How a command's write batch reacts to a failed store write.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Attempt every write and report the failures together.
    #[default]
    BestEffort,
    /// Skip the rest of the batch after the first failure.
    ///
    /// The cache keeps every write up to and including the failed one, so a
    /// failed batch can leave it half-applied (for example Gear=Drive with
    /// Speed still 0) until the live feed or the next command corrects it.
    AbortOnFailure,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub limits: Limits,
    pub write_policy: WritePolicy,
    pub write_timeout_ms: u64,
    pub mailbox_capacity: usize,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            write_policy: WritePolicy::default(),
            write_timeout_ms: 2_000,
            mailbox_capacity: 64,
            log_filter: "vehicle_companion=info".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = if contents.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(contents)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = &self.limits;
        let positive = [
            ("max_speed", limits.max_speed),
            ("speed_increment", limits.speed_increment),
            ("max_steering_angle", limits.max_steering_angle),
            ("steering_increment", limits.steering_increment),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "limits.{name} must be a positive number, got {value}"
                )));
            }
        }
        for (name, value) in [
            ("brake_pulse_position", limits.brake_pulse_position),
            ("emergency_brake_position", limits.emergency_brake_position),
        ] {
            if value > 100 {
                return Err(ConfigError::Invalid(format!(
                    "limits.{name} is a percentage, got {value}"
                )));
            }
        }
        if self.mailbox_capacity == 0 {
            return Err(ConfigError::Invalid(
                "mailbox_capacity must be at least 1".to_string(),
            ));
        }
        if self.write_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "write_timeout_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}
