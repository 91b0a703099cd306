//! Interaction bundles for day cells, the grid container and the companion
//! input box. Bundles are plain values; each reaction takes the picker it
//! should act on.

use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar::shift_days;
use crate::grid::CalendarDay;
use crate::picker::Picker;
use crate::selection::{SelectionMarks, SelectionMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Shift,
    Alt,
}

impl Key {
    fn is_modifier(self) -> bool {
        matches!(self, Key::Shift | Key::Alt)
    }

    /// Focus movement in days for arrow keys on a day cell.
    pub fn day_delta(self) -> Option<i64> {
        match self {
            Key::ArrowUp => Some(-7),
            Key::ArrowDown => Some(7),
            Key::ArrowLeft => Some(-1),
            Key::ArrowRight => Some(1),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateProps {
    pub key: String,
    pub date: NaiveDate,
    /// `Some(-1)` removes the cell from sequential tab navigation.
    pub tab_index: Option<i8>,
    pub previews_on_hover: bool,
}

impl DateProps {
    pub fn is_tab_stop(&self) -> bool {
        self.tab_index.is_none()
    }

    pub fn on_click(&self, picker: &mut Picker) {
        picker.pick(self.date);
    }

    pub fn on_focus(&self, picker: &mut Picker) {
        if picker.focused_date() != Some(self.date) {
            picker.set_focused(Some(self.date));
        }
    }

    pub fn on_key_down(&self, picker: &mut Picker, key: Key) {
        if let Some(target) = key.day_delta().and_then(|delta| shift_days(self.date, delta)) {
            picker.focus_date(target);
        }
    }

    pub fn on_mouse_enter(&self, picker: &mut Picker) {
        if self.previews_on_hover {
            picker.preview_hover(self.date);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarProps {
    pub clears_preview_on_leave: bool,
}

impl CalendarProps {
    pub fn on_mouse_leave(&self, picker: &mut Picker) {
        if self.clears_preview_on_leave {
            picker.end_preview();
        }
    }
}

/// Read-only display of the selected date plus keyboard shortcuts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputProps {
    pub value: String,
}

impl InputProps {
    /// Free-text edits are not accepted.
    pub fn on_change(&self, _picker: &mut Picker, _text: &str) {}

    pub fn on_key_down(&self, picker: &mut Picker, key: Key) {
        picker.input_key_down(key);
    }

    pub fn on_key_up(&self, picker: &mut Picker, key: Key) {
        picker.input_key_up(key);
    }
}

impl CalendarDay {
    pub fn date_props(&self) -> DateProps {
        DateProps {
            key: self.date.format("%Y-%m-%d").to_string(),
            date: self.date,
            tab_index: if self.is_current_month { None } else { Some(-1) },
            previews_on_hover: matches!(self.marks, SelectionMarks::Range(_)),
        }
    }
}

impl Picker {
    pub fn date_props(&self, date: NaiveDate) -> DateProps {
        DateProps {
            key: date.format("%Y-%m-%d").to_string(),
            date,
            tab_index: if self.window.contains(date) { None } else { Some(-1) },
            previews_on_hover: self.config.mode == SelectionMode::Range,
        }
    }

    pub fn calendar_props(&self) -> CalendarProps {
        CalendarProps {
            clears_preview_on_leave: self.config.mode == SelectionMode::Range,
        }
    }

    pub fn input_props(&self) -> InputProps {
        let value = self
            .selection()
            .single_date()
            .map(|date| self.formatter.format_date(&self.config.locale, date))
            .unwrap_or_default();
        InputProps { value }
    }

    /// Up steps the selected date forward (day, Shift: month, Shift+Alt:
    /// year); Down steps it back. Only modifiers are held in the pressed set.
    pub fn input_key_down(&mut self, key: Key) {
        if key.is_modifier() {
            self.pressed_keys.insert(key);
        }
        let shift = self.pressed_keys.contains(&Key::Shift);
        let alt = self.pressed_keys.contains(&Key::Alt);

        match key {
            Key::ArrowUp if shift && alt => self.select_next_year(),
            Key::ArrowUp if shift => self.select_next_month(),
            Key::ArrowUp => self.select_next_day(),
            Key::ArrowDown if shift && alt => self.select_previous_year(),
            Key::ArrowDown if shift => self.select_previous_month(),
            Key::ArrowDown => self.select_previous_day(),
            _ => {}
        }
    }

    pub fn input_key_up(&mut self, key: Key) {
        self.pressed_keys.remove(&key);
    }

    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.pressed_keys.contains(&key)
    }
}
