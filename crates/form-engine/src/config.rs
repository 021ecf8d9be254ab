use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::dates::parse_iso_date;
use crate::error::ConfigError;

/// Source of "today" for relative-date conditions and date bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    /// Current UTC date, read on every evaluation pass.
    #[default]
    System,
    Fixed(Date),
}

impl Clock {
    pub fn today(&self) -> Date {
        match self {
            Clock::System => OffsetDateTime::now_utc().date(),
            Clock::Fixed(date) => *date,
        }
    }
}

/// Engine settings, usually read from a TOML file.
///
/// ```toml
/// today = "2024-05-01"
/// strip_unknown = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Fixed evaluation day; the system clock is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub today: Option<String>,
    /// Drop answers outside the composed schema from validated output.
    #[serde(default = "default_strip_unknown")]
    pub strip_unknown: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            today: None,
            strip_unknown: default_strip_unknown(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(raw)?;
        config.clock()?;
        Ok(config)
    }

    pub fn clock(&self) -> Result<Clock, ConfigError> {
        match &self.today {
            None => Ok(Clock::System),
            Some(value) => parse_iso_date(value)
                .map(Clock::Fixed)
                .ok_or_else(|| ConfigError::InvalidDate {
                    value: value.clone(),
                }),
        }
    }
}

fn default_strip_unknown() -> bool {
    true
}
