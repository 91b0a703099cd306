use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::WeekStart;
use crate::error::ConfigError;
use crate::grid::MAX_MONTHS_VISIBLE;
use crate::locale::default_locale;
use crate::selection::SelectionMode;
use crate::value::TemporalValue;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    pub locale: String,
    /// Month shown first; today's month when unset.
    pub default_calendar_month: Option<NaiveDate>,
    #[serde(rename = "week_start_index")]
    pub week_start: WeekStart,
    #[serde(rename = "type")]
    pub mode: SelectionMode,
    pub months_visible: u32,
    pub default_value: Option<TemporalValue>,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            default_calendar_month: None,
            week_start: WeekStart::default(),
            mode: SelectionMode::default(),
            months_visible: 1,
            default_value: None,
        }
    }
}

impl PickerConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_calendar_month(mut self, month: NaiveDate) -> Self {
        self.default_calendar_month = Some(month);
        self
    }

    pub fn with_week_start(mut self, week_start: WeekStart) -> Self {
        self.week_start = week_start;
        self
    }

    pub fn with_mode(mut self, mode: SelectionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_months_visible(mut self, months_visible: u32) -> Self {
        self.months_visible = months_visible;
        self
    }

    pub fn with_default_value(mut self, value: impl Into<TemporalValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Number of months in the grid, within `1..=MAX_MONTHS_VISIBLE`.
    pub fn visible_months(&self) -> u32 {
        self.months_visible.clamp(1, MAX_MONTHS_VISIBLE)
    }
}

/// Reads a TOML config file. A missing or blank file yields the defaults.
pub fn load_config(path: &Path) -> Result<PickerConfig, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(PickerConfig::default());
        }
        Err(err) => return Err(ConfigError::Io(err)),
    };

    if raw.trim().is_empty() {
        return Ok(PickerConfig::default());
    }

    PickerConfig::from_toml_str(&raw)
}
