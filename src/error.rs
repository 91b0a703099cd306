//! Error types for the picker engine and its configuration boundary.

/// Diagnostics raised while committing a selection.
///
/// Engine operations never return these to the caller; they are logged and
/// the state is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PickerError {
    /// A controlled value was supplied without a change handler to receive
    /// proposed values.
    #[error("a value was provided, but no change handler was configured")]
    MissingChangeHandler,
}

/// Returned when a textual value cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueParseError {
    #[error("unknown dynamic value: {0}")]
    UnknownToken(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("week start index must be within 0..=6, got {0}")]
pub struct InvalidWeekStart(pub u8);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),
}
