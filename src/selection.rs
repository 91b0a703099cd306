//! Selection state machine.
//!
//! Selection state is a pure projection of the stored value (resolved against
//! the clock on every read) plus the transient preview. Events are applied by
//! [`transition`], which returns what to commit rather than mutating anything;
//! the caller hands the commit to a [`ValueOwner`].

use std::fmt::{Debug, Formatter};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::{end_of_day, start_of_day};
use crate::error::PickerError;
use crate::value::{DateRange, TemporalValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    #[default]
    Single,
    Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Selection {
    #[default]
    Empty,
    Single {
        date: NaiveDateTime,
    },
    RangeStart {
        start: NaiveDateTime,
    },
    RangeComplete {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

impl Selection {
    /// Resolves a stored value for `mode`. Values of the other mode's kind,
    /// and tokens without an entry for this mode, resolve to `Empty`.
    pub fn resolve(mode: SelectionMode, value: Option<&TemporalValue>, now: NaiveDateTime) -> Self {
        let Some(value) = value else {
            return Selection::Empty;
        };

        match (mode, value) {
            (SelectionMode::Single, TemporalValue::Date(date)) => Selection::Single { date: *date },
            (SelectionMode::Single, TemporalValue::Dynamic(token)) => token
                .resolve_date(now)
                .map_or(Selection::Empty, |date| Selection::Single { date }),
            (SelectionMode::Range, TemporalValue::Range(range)) => Selection::from_range(*range),
            (SelectionMode::Range, TemporalValue::Dynamic(token)) => token
                .resolve_range(now)
                .map_or(Selection::Empty, Selection::from_range),
            _ => Selection::Empty,
        }
    }

    fn from_range(range: DateRange) -> Self {
        match (range.start, range.end) {
            (Some(start), Some(end)) => Selection::RangeComplete {
                start: start.min(end),
                end: start.max(end),
            },
            (Some(start), None) => Selection::RangeStart { start },
            _ => Selection::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::Empty)
    }

    pub fn single_date(&self) -> Option<NaiveDateTime> {
        match self {
            Selection::Single { date } => Some(*date),
            _ => None,
        }
    }

    pub fn range(&self) -> DateRange {
        match *self {
            Selection::RangeStart { start } => DateRange {
                start: Some(start),
                end: None,
            },
            Selection::RangeComplete { start, end } => DateRange::new(start, end),
            _ => DateRange::default(),
        }
    }

    pub fn to_value(&self) -> Option<TemporalValue> {
        match self {
            Selection::Empty => None,
            Selection::Single { date } => Some(TemporalValue::Date(*date)),
            Selection::RangeStart { .. } | Selection::RangeComplete { .. } => {
                Some(TemporalValue::Range(self.range()))
            }
        }
    }

    /// Per-day flags for the grid, taken from this selection and `preview`.
    pub fn marks(&self, mode: SelectionMode, preview: &DateRange, date: NaiveDate) -> SelectionMarks {
        match mode {
            SelectionMode::Single => SelectionMarks::Single {
                is_selected: self
                    .single_date()
                    .is_some_and(|selected| selected.date() == date),
            },
            SelectionMode::Range => {
                let range = self.range();
                SelectionMarks::Range(RangeMarks {
                    is_selected_range: range.contains(date),
                    is_selected_range_start: range.starts_on(date),
                    is_selected_range_end: range.ends_on(date),
                    is_previewed_range: preview.contains(date),
                    is_previewed_range_start: preview.starts_on(date),
                    is_previewed_range_end: preview.ends_on(date),
                })
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SelectionMarks {
    Single { is_selected: bool },
    Range(RangeMarks),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RangeMarks {
    pub is_selected_range: bool,
    pub is_selected_range_start: bool,
    pub is_selected_range_end: bool,
    pub is_previewed_range: bool,
    pub is_previewed_range_start: bool,
    pub is_previewed_range_end: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SelectionState {
    pub selection: Selection,
    pub preview: DateRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    Pick(NaiveDate),
    Hover(NaiveDate),
    PointerLeave,
    Clear,
}

/// Outcome of one event: a selection to commit (if any) and the new preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub commit: Option<Selection>,
    pub preview: DateRange,
}

impl Transition {
    fn preview_only(preview: DateRange) -> Self {
        Self {
            commit: None,
            preview,
        }
    }
}

pub fn transition(mode: SelectionMode, state: &SelectionState, event: SelectionEvent) -> Transition {
    match (mode, event) {
        (_, SelectionEvent::Clear) => Transition {
            commit: Some(Selection::Empty),
            preview: DateRange::default(),
        },
        (SelectionMode::Single, SelectionEvent::Pick(date)) => Transition {
            commit: Some(Selection::Single {
                date: start_of_day(date),
            }),
            preview: state.preview,
        },
        (SelectionMode::Range, SelectionEvent::Pick(date)) => Transition {
            commit: Some(pick_range(&state.selection, date)),
            preview: DateRange::default(),
        },
        (SelectionMode::Range, SelectionEvent::Hover(date)) => match state.selection {
            Selection::RangeStart { start } => {
                let hovered = start_of_day(date);
                Transition::preview_only(DateRange::new(hovered.min(start), hovered.max(start)))
            }
            _ => Transition::preview_only(state.preview),
        },
        (SelectionMode::Range, SelectionEvent::PointerLeave) => {
            Transition::preview_only(DateRange::default())
        }
        (SelectionMode::Single, SelectionEvent::Hover(_) | SelectionEvent::PointerLeave) => {
            Transition::preview_only(state.preview)
        }
    }
}

fn pick_range(selection: &Selection, date: NaiveDate) -> Selection {
    let picked = start_of_day(date);
    match *selection {
        Selection::RangeStart { start } if picked <= start => Selection::RangeComplete {
            start: picked,
            end: end_of_day(start.date()),
        },
        Selection::RangeStart { start } => Selection::RangeComplete {
            start,
            end: end_of_day(date),
        },
        _ => Selection::RangeStart { start: picked },
    }
}

pub type ChangeHandler = Box<dyn FnMut(Option<TemporalValue>)>;

/// Where committed values go: stored internally, or proposed to an external
/// owner that feeds the accepted value back through [`ValueOwner::replace`].
pub enum ValueOwner {
    Uncontrolled {
        value: Option<TemporalValue>,
    },
    Controlled {
        value: Option<TemporalValue>,
        on_change: Option<ChangeHandler>,
    },
}

impl ValueOwner {
    pub fn current(&self) -> Option<&TemporalValue> {
        match self {
            ValueOwner::Uncontrolled { value } | ValueOwner::Controlled { value, .. } => value.as_ref(),
        }
    }

    pub fn is_controlled(&self) -> bool {
        matches!(self, ValueOwner::Controlled { .. })
    }

    pub fn commit(&mut self, next: Option<TemporalValue>) -> Result<(), PickerError> {
        match self {
            ValueOwner::Uncontrolled { value } => {
                debug!(value = ?next, "storing selection");
                *value = next;
                Ok(())
            }
            ValueOwner::Controlled {
                on_change: Some(on_change),
                ..
            } => {
                debug!(value = ?next, "proposing selection to owner");
                on_change(next);
                Ok(())
            }
            ValueOwner::Controlled { on_change: None, .. } => Err(PickerError::MissingChangeHandler),
        }
    }

    pub fn replace(&mut self, next: Option<TemporalValue>) {
        match self {
            ValueOwner::Uncontrolled { value } | ValueOwner::Controlled { value, .. } => *value = next,
        }
    }
}

impl Debug for ValueOwner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueOwner::Uncontrolled { value } => {
                f.debug_struct("Uncontrolled").field("value", value).finish()
            }
            ValueOwner::Controlled { value, on_change } => f
                .debug_struct("Controlled")
                .field("value", value)
                .field("has_change_handler", &on_change.is_some())
                .finish(),
        }
    }
}
