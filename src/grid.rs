//! Month grid generation.
//!
//! A grid covers `months_visible` months starting at the window, padded with
//! days of the adjacent months so that it starts on the week start and always
//! ends on a completed week.

use std::iter::FusedIterator;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;

use crate::calendar::{CalendarWindow, WeekStart, is_weekend};
use crate::selection::{SelectionMarks, SelectionMode, SelectionState};

/// Upper bound on the months a single grid spans.
pub const MAX_MONTHS_VISIBLE: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub is_today: bool,
    pub is_current_month: bool,
    pub is_previous_month: bool,
    pub is_next_month: bool,
    pub is_weekday: bool,
    pub is_weekend: bool,
    pub marks: SelectionMarks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthGrid {
    pub window: CalendarWindow,
    pub months_visible: u32,
    pub week_start: WeekStart,
    pub mode: SelectionMode,
}

impl MonthGrid {
    /// A fresh pass over the grid. Each call restarts from the first cell.
    pub fn days(&self, state: SelectionState, today: NaiveDate) -> Days {
        let anchor = self.window.first_day();
        let months = self.months_visible.clamp(1, MAX_MONTHS_VISIBLE) as i32;
        let final_anchor = self
            .window
            .shift_months(months)
            .map_or(NaiveDate::MAX, |window| window.first_day());

        let week_start = self.week_start.weekday();
        let days_back = (anchor.weekday().num_days_from_sunday() + 7
            - week_start.num_days_from_sunday())
            % 7;
        let first = anchor
            .checked_sub_signed(Duration::days(i64::from(days_back)))
            .unwrap_or(anchor);

        Days {
            cursor: Some(first),
            final_anchor,
            window: self.window,
            week_start,
            mode: self.mode,
            state,
            today,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Days {
    cursor: Option<NaiveDate>,
    final_anchor: NaiveDate,
    window: CalendarWindow,
    week_start: Weekday,
    mode: SelectionMode,
    state: SelectionState,
    today: NaiveDate,
}

impl Days {
    /// Groups the remaining days into rows of seven.
    pub fn weeks(self) -> Vec<Vec<CalendarDay>> {
        let days = self.collect::<Vec<_>>();
        days.chunks(7).map(<[CalendarDay]>::to_vec).collect()
    }

    fn day(&self, date: NaiveDate) -> CalendarDay {
        let offset = self.window.month_offset(date);
        let weekend = is_weekend(date);
        CalendarDay {
            date,
            is_today: date == self.today,
            is_current_month: offset == 0,
            is_previous_month: offset == -1,
            is_next_month: offset == 1,
            is_weekday: !weekend,
            is_weekend: weekend,
            marks: self
                .state
                .selection
                .marks(self.mode, &self.state.preview, date),
        }
    }
}

impl Iterator for Days {
    type Item = CalendarDay;

    fn next(&mut self) -> Option<Self::Item> {
        let date = self.cursor?;
        if date >= self.final_anchor && date.weekday() == self.week_start {
            self.cursor = None;
            return None;
        }
        self.cursor = date.succ_opt();
        Some(self.day(date))
    }
}

impl FusedIterator for Days {}
