//! State and behavior engine for calendar date pickers.
//!
//! A [`Picker`] owns the visible calendar window, the selected value (stored
//! internally or proposed to an external owner), the hover preview and the
//! focused date. Hosts render [`CalendarDay`]s and drive the engine through
//! the prop bundles in [`interaction`].

pub mod calendar;
pub mod config;
pub mod error;
pub mod grid;
pub mod interaction;
pub mod locale;
pub mod navigation;
pub mod picker;
pub mod selection;
pub mod value;

pub use calendar::{CalendarWindow, Clock, FixedClock, SystemClock, WeekStart};
pub use config::{PickerConfig, load_config};
pub use error::{ConfigError, InvalidWeekStart, PickerError, ValueParseError};
pub use grid::{CalendarDay, Days, MonthGrid};
pub use interaction::{CalendarProps, DateProps, InputProps, Key};
pub use locale::{ChronoFormatter, DateUnit, LocaleFormatter, MonthName, WeekdayName, Width, ordinal};
pub use navigation::WindowTarget;
pub use picker::{Calendar, Picker, Tables};
pub use selection::{ChangeHandler, RangeMarks, Selection, SelectionMarks, SelectionMode};
pub use value::{DateRange, DynamicValue, TemporalValue};
