//! Calendar window navigation, focus movement and selected-date stepping.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::calendar::{CalendarWindow, shift_days, shift_month, shift_year, with_date};
use crate::picker::Picker;
use crate::selection::{Selection, SelectionEvent, SelectionMode};

/// Target for [`Picker::set_window`]: a date, or a month of the current year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowTarget {
    Date(NaiveDate),
    Month(u32),
}

impl From<NaiveDate> for WindowTarget {
    fn from(date: NaiveDate) -> Self {
        WindowTarget::Date(date)
    }
}

impl From<u32> for WindowTarget {
    fn from(month: u32) -> Self {
        WindowTarget::Month(month)
    }
}

const YEAR_DIGITS: usize = 4;

impl Picker {
    pub fn set_window(&mut self, target: impl Into<WindowTarget>) {
        let window = match target.into() {
            WindowTarget::Date(date) => Some(CalendarWindow::containing(date)),
            WindowTarget::Month(month) => CalendarWindow::new(self.window.year(), month),
        };
        match window {
            Some(window) => self.move_window(window),
            None => warn!(year = self.window.year(), "month index out of range, window unchanged"),
        }
        self.set_focused(None);
    }

    /// Shows `month` (1..=12) of the current year.
    pub fn set_month(&mut self, month: u32) {
        self.set_window(WindowTarget::Month(month));
    }

    pub fn previous_month(&mut self) {
        self.shift_window(-1);
    }

    pub fn next_month(&mut self) {
        self.shift_window(1);
    }

    pub fn set_year(&mut self, year: i32) {
        self.set_year_str(&year.to_string());
    }

    /// Sets the window year from text, keeping only the first four
    /// characters ("20245" is read as 2024).
    pub fn set_year_str(&mut self, raw: &str) {
        let digits = raw.trim().chars().take(YEAR_DIGITS).collect::<String>();
        match digits.parse::<i32>().ok().and_then(|year| self.window.with_year(year)) {
            Some(window) => self.move_window(window),
            None => warn!(input = raw, "unusable year, window unchanged"),
        }
        self.set_focused(None);
    }

    pub fn previous_year(&mut self) {
        self.shift_window(-12);
    }

    pub fn next_year(&mut self) {
        self.shift_window(12);
    }

    /// Shows the current month and focuses today.
    pub fn jump_to_today(&mut self) {
        let today = self.clock.today();
        self.move_window(CalendarWindow::containing(today));
        self.focus_date(today);
    }

    /// Focuses `date`, bringing its month into view. In range mode the
    /// focused date previews like a hover.
    pub fn focus_date(&mut self, date: NaiveDate) {
        self.follow_focus(date);
        if self.config.mode == SelectionMode::Range {
            self.dispatch(SelectionEvent::Hover(date));
        }
    }

    /// Focuses `date` and brings its month into view without previewing.
    pub(crate) fn follow_focus(&mut self, date: NaiveDate) {
        self.set_focused(Some(date));
        if !self.window.contains(date) {
            self.move_window(CalendarWindow::containing(date));
        }
    }

    /// Moves focus by `delta` days from the focused date; no-op without focus.
    pub fn move_focus(&mut self, delta: i64) {
        let Some(focused) = self.focused_date() else {
            return;
        };
        match shift_days(focused, delta) {
            Some(target) => self.focus_date(target),
            None => warn!(%focused, delta, "focus target out of range"),
        }
    }

    pub fn select_previous_day(&mut self) {
        self.step_selected(|date| shift_days(date, -1));
    }

    pub fn select_next_day(&mut self) {
        self.step_selected(|date| shift_days(date, 1));
    }

    pub fn select_previous_month(&mut self) {
        self.step_selected(|date| shift_month(date, -1));
    }

    pub fn select_next_month(&mut self) {
        self.step_selected(|date| shift_month(date, 1));
    }

    pub fn select_previous_year(&mut self) {
        self.step_selected(|date| shift_year(date, -1));
    }

    pub fn select_next_year(&mut self) {
        self.step_selected(|date| shift_year(date, 1));
    }

    // Single mode only, and only with a selected date. Time of day is kept.
    fn step_selected(&mut self, step: impl Fn(NaiveDate) -> Option<NaiveDate>) {
        if self.config.mode != SelectionMode::Single {
            return;
        }
        let Some(current) = self.selection().single_date() else {
            return;
        };
        let Some(next) = step(current.date()).map(|date| with_date(current, date)) else {
            warn!(%current, "selected date step out of range");
            return;
        };
        self.commit_stepped(next);
    }

    fn commit_stepped(&mut self, next: NaiveDateTime) {
        self.commit(Selection::Single { date: next });
        if !self.window.contains(next.date()) {
            self.move_window(CalendarWindow::containing(next.date()));
        }
        self.set_focused(None);
    }

    fn shift_window(&mut self, months: i32) {
        match self.window.shift_months(months) {
            Some(window) => self.move_window(window),
            None => warn!(window = %self.window, months, "window shift out of range"),
        }
        self.set_focused(None);
    }

    fn move_window(&mut self, window: CalendarWindow) {
        if window != self.window {
            debug!(from = %self.window, to = %window, "calendar window moved");
        }
        self.window = window;
    }
}
