use std::fmt::{Display, Formatter};

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::InvalidWeekStart;

/// The anchor month shown as the primary calendar page.
///
/// Always normalised to the first day of its month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CalendarWindow {
    first_day: NaiveDate,
}

impl CalendarWindow {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first_day| Self { first_day })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first_day: first_day_of_month(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    pub fn shift_months(&self, delta: i32) -> Option<Self> {
        shift_month(self.first_day, delta).map(|first_day| Self { first_day })
    }

    pub fn with_year(&self, year: i32) -> Option<Self> {
        Self::new(year, self.month())
    }

    /// Signed distance in months from this window to the month of `date`.
    pub fn month_offset(&self, date: NaiveDate) -> i64 {
        month_ordinal(date) - month_ordinal(self.first_day)
    }
}

impl Display for CalendarWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.first_day.format("%Y-%m"))
    }
}

/// Source of the current wall-clock time. Read at call time, never cached.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// First day of the week for grids and day tables; index 0 is Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct WeekStart(Weekday);

impl WeekStart {
    pub const SUNDAY: Self = Self(Weekday::Sun);
    pub const MONDAY: Self = Self(Weekday::Mon);

    pub fn from_index(index: u8) -> Option<Self> {
        let weekday = match index {
            0 => Weekday::Sun,
            1 => Weekday::Mon,
            2 => Weekday::Tue,
            3 => Weekday::Wed,
            4 => Weekday::Thu,
            5 => Weekday::Fri,
            6 => Weekday::Sat,
            _ => return None,
        };
        Some(Self(weekday))
    }

    pub fn index(self) -> u8 {
        self.0.num_days_from_sunday() as u8
    }

    pub fn weekday(self) -> Weekday {
        self.0
    }
}

impl Default for WeekStart {
    fn default() -> Self {
        Self::SUNDAY
    }
}

impl From<Weekday> for WeekStart {
    fn from(weekday: Weekday) -> Self {
        Self(weekday)
    }
}

impl TryFrom<u8> for WeekStart {
    type Error = InvalidWeekStart;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::from_index(index).ok_or(InvalidWeekStart(index))
    }
}

impl From<WeekStart> for u8 {
    fn from(week_start: WeekStart) -> Self {
        week_start.index()
    }
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).expect("midnight must be valid")
}

pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .expect("last millisecond of the day must be valid")
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    Some(first_of_next.pred_opt()?.day())
}

pub fn first_day_of_month(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.day0()))
}

/// Moves `day` by whole calendar months, clamping the day of month to the
/// length of the target month (Jan 31 + 1 month is the last day of February).
pub fn shift_month(day: NaiveDate, delta: i32) -> Option<NaiveDate> {
    let total_months = i64::from(day.year()) * 12 + i64::from(day.month0()) + i64::from(delta);
    let year = i32::try_from(total_months.div_euclid(12)).ok()?;
    let month = total_months.rem_euclid(12) as u32 + 1;
    let max_day = days_in_month(year, month)?;
    NaiveDate::from_ymd_opt(year, month, day.day().min(max_day))
}

pub fn shift_year(day: NaiveDate, delta: i32) -> Option<NaiveDate> {
    shift_month(day, delta.checked_mul(12)?)
}

pub fn shift_days(day: NaiveDate, delta: i64) -> Option<NaiveDate> {
    day.checked_add_signed(Duration::try_days(delta)?)
}

/// Keeps the time of day of `value` while moving its calendar date.
pub fn with_date(value: NaiveDateTime, date: NaiveDate) -> NaiveDateTime {
    date.and_time(value.time())
}

fn month_ordinal(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn snaps_to_day_boundaries() {
        let start = start_of_day(date(2024, 3, 5));
        let end = end_of_day(date(2024, 3, 5));
        assert_eq!(start.time(), NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        assert_eq!(end.hour(), 23);
        assert_eq!(end.minute(), 59);
        assert_eq!(end.second(), 59);
        assert_eq!(end.nanosecond() / 1_000_000, 999);
        assert_eq!(end.date(), date(2024, 3, 5));
    }

    #[test]
    fn shift_month_clamps_to_month_length() {
        assert_eq!(shift_month(date(2024, 1, 31), 1), Some(date(2024, 2, 29)));
        assert_eq!(shift_month(date(2023, 1, 31), 1), Some(date(2023, 2, 28)));
        assert_eq!(shift_month(date(2024, 3, 31), -1), Some(date(2024, 2, 29)));
        assert_eq!(shift_month(date(2024, 12, 15), 1), Some(date(2025, 1, 15)));
        assert_eq!(shift_month(date(2024, 1, 15), -1), Some(date(2023, 12, 15)));
        assert_eq!(shift_month(date(2024, 5, 10), -17), Some(date(2022, 12, 10)));
    }

    #[test]
    fn shift_year_clamps_leap_day() {
        assert_eq!(shift_year(date(2024, 2, 29), 1), Some(date(2025, 2, 28)));
        assert_eq!(shift_year(date(2024, 2, 29), 4), Some(date(2028, 2, 29)));
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2023, 2), Some(28));
        assert_eq!(days_in_month(1900, 2), Some(28));
        assert_eq!(days_in_month(2000, 2), Some(29));
        assert_eq!(days_in_month(2024, 12), Some(31));
    }

    #[test]
    fn window_normalises_to_first_of_month() {
        let window = CalendarWindow::containing(date(2024, 2, 17));
        assert_eq!(window.first_day(), date(2024, 2, 1));
        assert_eq!(window.year(), 2024);
        assert_eq!(window.month(), 2);
        assert_eq!(window.to_string(), "2024-02");
        assert!(CalendarWindow::new(2024, 13).is_none());
    }

    #[test]
    fn window_month_offset_is_year_aware() {
        let window = CalendarWindow::new(2024, 1).unwrap();
        assert_eq!(window.month_offset(date(2023, 12, 31)), -1);
        assert_eq!(window.month_offset(date(2024, 1, 9)), 0);
        assert_eq!(window.month_offset(date(2024, 2, 1)), 1);
        assert_eq!(window.month_offset(date(2025, 1, 1)), 12);
    }

    #[test]
    fn week_start_indices() {
        assert_eq!(WeekStart::from_index(0).unwrap().weekday(), Weekday::Sun);
        assert_eq!(WeekStart::from_index(6).unwrap().weekday(), Weekday::Sat);
        assert!(WeekStart::from_index(7).is_none());
        assert_eq!(WeekStart::try_from(9u8), Err(InvalidWeekStart(9)));
        assert_eq!(WeekStart::MONDAY.index(), 1);
    }

    #[test]
    fn first_day_of_month_keeps_month() {
        let day = date(2024, 2, 29);
        assert_eq!(first_day_of_month(day).day(), 1);
        assert_eq!(first_day_of_month(day).month(), 2);
    }

    #[test]
    fn weekend_detection() {
        assert!(is_weekend(date(2024, 3, 2)));
        assert!(is_weekend(date(2024, 3, 3)));
        assert!(!is_weekend(date(2024, 3, 4)));
    }
}
