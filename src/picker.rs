//! The picker engine: one instance owns the calendar window, the value
//! source, the transient preview, the focused date and the pressed keys.

use std::collections::HashSet;
use std::fmt::{Debug, Formatter};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, error};

use crate::calendar::{CalendarWindow, Clock, SystemClock};
use crate::config::PickerConfig;
use crate::grid::{Days, MonthGrid};
use crate::interaction::Key;
use crate::locale::{ChronoFormatter, LocaleFormatter, MonthName, WeekdayName, day_table, month_table};
use crate::selection::{
    ChangeHandler, Selection, SelectionEvent, SelectionMode, SelectionState, ValueOwner, transition,
};
use crate::value::{DateRange, TemporalValue};

pub struct Picker {
    pub(crate) config: PickerConfig,
    pub(crate) window: CalendarWindow,
    owner: ValueOwner,
    preview: DateRange,
    focused: Option<NaiveDate>,
    focus_request: Option<NaiveDate>,
    pub(crate) pressed_keys: HashSet<Key>,
    pub(crate) formatter: Box<dyn LocaleFormatter>,
    pub(crate) clock: Box<dyn Clock>,
}

/// The visible calendar: anchor month and the grid of days.
#[derive(Debug, Clone)]
pub struct Calendar {
    pub month: u32,
    pub year: i32,
    pub dates: Days,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tables {
    pub days: Vec<WeekdayName>,
    pub months: Vec<MonthName>,
}

impl Picker {
    /// An uncontrolled picker: committed values are stored internally,
    /// starting from `config.default_value`.
    pub fn new(config: PickerConfig) -> Self {
        let owner = ValueOwner::Uncontrolled {
            value: config.default_value,
        };
        Self::with_owner(config, owner)
    }

    /// A controlled picker: `value` is the external source of truth and
    /// commits are proposed through `on_change`. The owner feeds accepted
    /// values back with [`Picker::set_value`].
    pub fn controlled(
        config: PickerConfig,
        value: Option<TemporalValue>,
        on_change: Option<ChangeHandler>,
    ) -> Self {
        Self::with_owner(config, ValueOwner::Controlled { value, on_change })
    }

    fn with_owner(config: PickerConfig, owner: ValueOwner) -> Self {
        let clock: Box<dyn Clock> = Box::new(SystemClock);
        let window = initial_window(&config, clock.as_ref());
        Self {
            config,
            window,
            owner,
            preview: DateRange::default(),
            focused: None,
            focus_request: None,
            pressed_keys: HashSet::new(),
            formatter: Box::new(ChronoFormatter),
            clock,
        }
    }

    pub fn with_formatter(mut self, formatter: impl LocaleFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    /// Replaces the clock. Without a configured calendar month the window is
    /// re-anchored on the new clock's today.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self.window = initial_window(&self.config, self.clock.as_ref());
        self
    }

    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    pub fn mode(&self) -> SelectionMode {
        self.config.mode
    }

    pub fn is_controlled(&self) -> bool {
        self.owner.is_controlled()
    }

    /// The stored value, possibly a dynamic token.
    pub fn value(&self) -> Option<&TemporalValue> {
        self.owner.current()
    }

    /// Feeds a new value in: the accepted value in controlled mode, or a
    /// programmatic overwrite otherwise.
    pub fn set_value(&mut self, value: Option<TemporalValue>) {
        self.owner.replace(value);
    }

    /// The stored value resolved against the clock at this instant.
    pub fn selection(&self) -> Selection {
        Selection::resolve(self.config.mode, self.owner.current(), self.clock.now())
    }

    pub fn selection_state(&self) -> SelectionState {
        SelectionState {
            selection: self.selection(),
            preview: self.preview,
        }
    }

    pub fn preview(&self) -> DateRange {
        self.preview
    }

    pub fn window(&self) -> CalendarWindow {
        self.window
    }

    pub fn focused_date(&self) -> Option<NaiveDate> {
        self.focused
    }

    /// Drains the pending "focus this date" request, if any.
    pub fn take_focus_request(&mut self) -> Option<NaiveDate> {
        self.focus_request.take()
    }

    pub fn days(&self) -> Vec<WeekdayName> {
        day_table(self.formatter.as_ref(), &self.config.locale, self.config.week_start)
    }

    pub fn months(&self) -> Vec<MonthName> {
        month_table(self.formatter.as_ref(), &self.config.locale)
    }

    pub fn tables(&self) -> Tables {
        Tables {
            days: self.days(),
            months: self.months(),
        }
    }

    pub fn grid(&self) -> MonthGrid {
        MonthGrid {
            window: self.window,
            months_visible: self.config.visible_months(),
            week_start: self.config.week_start,
            mode: self.config.mode,
        }
    }

    pub fn calendar(&self) -> Calendar {
        Calendar {
            month: self.window.month(),
            year: self.window.year(),
            dates: self.grid().days(self.selection_state(), self.clock.today()),
        }
    }

    pub fn dispatch(&mut self, event: SelectionEvent) {
        let state = self.selection_state();
        let step = transition(self.config.mode, &state, event);
        if step.preview != self.preview {
            debug!(?event, preview = ?step.preview, "preview changed");
            self.preview = step.preview;
        }
        if let Some(selection) = step.commit {
            self.commit(selection);
        }
    }

    /// Picks `date` and moves focus onto it. The preview stays cleared.
    pub fn pick(&mut self, date: NaiveDate) {
        self.dispatch(SelectionEvent::Pick(date));
        self.follow_focus(date);
    }

    pub fn preview_hover(&mut self, date: NaiveDate) {
        self.dispatch(SelectionEvent::Hover(date));
    }

    pub fn end_preview(&mut self) {
        self.dispatch(SelectionEvent::PointerLeave);
    }

    pub fn clear_selected_range(&mut self) {
        self.dispatch(SelectionEvent::Clear);
    }

    pub(crate) fn commit(&mut self, selection: Selection) {
        if let Err(err) = self.owner.commit(selection.to_value()) {
            error!(%err, "selection change ignored");
        }
    }

    pub(crate) fn set_focused(&mut self, date: Option<NaiveDate>) {
        self.focused = date;
        if date.is_some() {
            self.focus_request = date;
        }
    }
}

impl Debug for Picker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Picker")
            .field("config", &self.config)
            .field("window", &self.window)
            .field("owner", &self.owner)
            .field("preview", &self.preview)
            .field("focused", &self.focused)
            .field("pressed_keys", &self.pressed_keys)
            .finish_non_exhaustive()
    }
}

fn initial_window(config: &PickerConfig, clock: &dyn Clock) -> CalendarWindow {
    let month = config.default_calendar_month.unwrap_or_else(|| clock.today());
    CalendarWindow::containing(month)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use chrono::{NaiveDate, NaiveDateTime};

    use super::Picker;
    use crate::calendar::{FixedClock, end_of_day, start_of_day};
    use crate::config::PickerConfig;
    use crate::selection::{Selection, SelectionMarks, SelectionMode};
    use crate::value::{DateRange, DynamicValue, TemporalValue};

    pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    pub(crate) fn noon(year: i32, month: u32, day: u32) -> NaiveDateTime {
        date(year, month, day).and_hms_opt(12, 0, 0).unwrap()
    }

    pub(crate) fn picker(mode: SelectionMode, month: NaiveDate) -> Picker {
        let config = PickerConfig::default()
            .with_locale("en-US")
            .with_mode(mode)
            .with_calendar_month(month);
        Picker::new(config).with_clock(FixedClock(noon(2024, 3, 15)))
    }

    #[test]
    fn window_defaults_to_clock_month() {
        let picker = Picker::new(PickerConfig::default()).with_clock(FixedClock(noon(2024, 7, 19)));
        assert_eq!(picker.window().first_day(), date(2024, 7, 1));
        let calendar = picker.calendar();
        assert_eq!((calendar.year, calendar.month), (2024, 7));
    }

    #[test]
    fn window_uses_configured_month() {
        let picker = picker(SelectionMode::Single, date(2024, 2, 17));
        assert_eq!(picker.window().first_day(), date(2024, 2, 1));
    }

    #[test]
    fn range_scenario_with_swapped_picks() {
        let mut picker = picker(SelectionMode::Range, date(2024, 3, 1));
        picker.pick(date(2024, 3, 10));
        picker.pick(date(2024, 3, 5));
        assert_eq!(
            picker.selection(),
            Selection::RangeComplete {
                start: start_of_day(date(2024, 3, 5)),
                end: end_of_day(date(2024, 3, 10)),
            }
        );
        assert_eq!(
            picker.value().map(ToString::to_string).as_deref(),
            Some("2024-03-05T00:00:00.000/2024-03-10T23:59:59.999")
        );
    }

    #[test]
    fn hover_after_completion_leaves_preview_empty() {
        let mut picker = picker(SelectionMode::Range, date(2024, 3, 1));
        picker.pick(date(2024, 3, 5));
        picker.pick(date(2024, 3, 10));
        picker.preview_hover(date(2024, 3, 20));
        assert!(picker.preview().is_empty());
        let previewed = picker.calendar().dates.any(|day| {
            matches!(day.marks, SelectionMarks::Range(marks) if marks.is_previewed_range)
        });
        assert!(!previewed);
    }

    #[test]
    fn range_picks_never_leave_a_preview() {
        let mut picker = picker(SelectionMode::Range, date(2024, 3, 1));
        for (day, expect_open) in [(5, true), (10, false), (20, true)] {
            picker.pick(date(2024, 3, day));
            assert!(picker.preview().is_empty(), "preview left after picking 3/{day}");
            assert_eq!(
                matches!(picker.selection(), Selection::RangeStart { .. }),
                expect_open
            );
            let previewed = picker
                .calendar()
                .dates
                .filter(|day| matches!(day.marks, SelectionMarks::Range(marks) if marks.is_previewed_range))
                .count();
            assert_eq!(previewed, 0);
        }
        assert_eq!(picker.focused_date(), Some(date(2024, 3, 20)));
    }

    #[test]
    fn hover_while_open_previews_and_leave_clears() {
        let mut picker = picker(SelectionMode::Range, date(2024, 3, 1));
        picker.pick(date(2024, 3, 10));
        picker.preview_hover(date(2024, 3, 7));
        assert_eq!(
            picker.preview(),
            DateRange::new(start_of_day(date(2024, 3, 7)), start_of_day(date(2024, 3, 10)))
        );
        picker.end_preview();
        assert!(picker.preview().is_empty());
    }

    #[test]
    fn clear_resets_value_and_preview() {
        let mut picker = picker(SelectionMode::Range, date(2024, 3, 1));
        picker.pick(date(2024, 3, 10));
        picker.preview_hover(date(2024, 3, 12));
        picker.clear_selected_range();
        assert_eq!(picker.value(), None);
        assert_eq!(picker.selection(), Selection::Empty);
        assert!(picker.preview().is_empty());
    }

    #[test]
    fn single_pick_focuses_and_follows_month() {
        let mut picker = picker(SelectionMode::Single, date(2024, 3, 1));
        picker.pick(date(2024, 4, 2));
        assert_eq!(
            picker.selection(),
            Selection::Single {
                date: start_of_day(date(2024, 4, 2))
            }
        );
        assert_eq!(picker.focused_date(), Some(date(2024, 4, 2)));
        assert_eq!(picker.take_focus_request(), Some(date(2024, 4, 2)));
        assert_eq!(picker.take_focus_request(), None);
        assert_eq!(picker.window().month(), 4);
    }

    #[test]
    fn dynamic_values_resolve_on_each_read() {
        let config = PickerConfig::default()
            .with_mode(SelectionMode::Range)
            .with_default_value(DynamicValue::ThisMonth);
        let picker = Picker::new(config.clone()).with_clock(FixedClock(noon(2024, 3, 15)));
        assert_eq!(
            picker.selection(),
            Selection::RangeComplete {
                start: start_of_day(date(2024, 3, 1)),
                end: noon(2024, 3, 15),
            }
        );

        let later = Picker::new(config).with_clock(FixedClock(noon(2024, 5, 2)));
        assert_eq!(
            later.selection(),
            Selection::RangeComplete {
                start: start_of_day(date(2024, 5, 1)),
                end: noon(2024, 5, 2),
            }
        );
        assert_eq!(
            later.value(),
            Some(&TemporalValue::Dynamic(DynamicValue::ThisMonth))
        );
    }

    #[test]
    fn controlled_mode_proposes_instead_of_storing() {
        let proposals = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&proposals);
        let config = PickerConfig::default()
            .with_mode(SelectionMode::Single)
            .with_calendar_month(date(2024, 3, 1));
        let mut picker = Picker::controlled(
            config,
            None,
            Some(Box::new(move |value| sink.borrow_mut().push(value))),
        )
        .with_clock(FixedClock(noon(2024, 3, 15)));

        picker.pick(date(2024, 3, 9));
        assert_eq!(picker.value(), None);
        let expected = Some(TemporalValue::Date(start_of_day(date(2024, 3, 9))));
        assert_eq!(proposals.borrow().as_slice(), &[expected]);

        picker.set_value(expected);
        assert_eq!(picker.selection().single_date(), Some(start_of_day(date(2024, 3, 9))));
    }

    #[test]
    fn controlled_mode_without_handler_leaves_state_unchanged() {
        let config = PickerConfig::default()
            .with_mode(SelectionMode::Range)
            .with_calendar_month(date(2024, 3, 1));
        let mut picker = Picker::controlled(config, None, None).with_clock(FixedClock(noon(2024, 3, 15)));
        picker.pick(date(2024, 3, 9));
        assert!(picker.is_controlled());
        assert_eq!(picker.value(), None);
        assert_eq!(picker.selection(), Selection::Empty);
    }

    #[test]
    fn grid_flags_match_selection_state() {
        let mut picker = picker(SelectionMode::Single, date(2024, 3, 1));
        picker.pick(date(2024, 3, 9));
        let selected = picker
            .calendar()
            .dates
            .filter(|day| day.marks == SelectionMarks::Single { is_selected: true })
            .map(|day| day.date)
            .collect::<Vec<_>>();
        assert_eq!(selected, [date(2024, 3, 9)]);
        let today = picker.calendar().dates.find(|day| day.is_today).map(|day| day.date);
        assert_eq!(today, Some(date(2024, 3, 15)));
    }

    #[test]
    fn tables_follow_week_start() {
        let config = PickerConfig::default()
            .with_week_start(crate::calendar::WeekStart::MONDAY)
            .with_calendar_month(date(2024, 3, 1));
        let picker = Picker::new(config);
        let tables = picker.tables();
        assert_eq!(tables.days[0].long, "Monday");
        assert_eq!(tables.months[0].long, "January");
        assert_eq!(tables.months.len(), 12);
    }
}
