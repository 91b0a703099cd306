use std::env;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::calendar::WeekStart;

const FALLBACK_LOCALE: &str = "en-US";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateUnit {
    Weekday,
    Month,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Width {
    Long,
    Short,
    Narrow,
    Numeric,
    #[serde(rename = "2-digit")]
    TwoDigit,
}

/// Locale-aware display strings for calendar units.
///
/// The engine only issues requests and passes the answers through unchanged.
pub trait LocaleFormatter {
    fn format(&self, locale: &str, date: NaiveDate, unit: DateUnit, width: Width) -> String;

    /// Short display form of a selected date, as shown in the input box.
    fn format_date(&self, locale: &str, date: NaiveDateTime) -> String;
}

/// English names from chrono's formatting tables; the locale is not consulted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChronoFormatter;

impl LocaleFormatter for ChronoFormatter {
    fn format(&self, _locale: &str, date: NaiveDate, unit: DateUnit, width: Width) -> String {
        match (unit, width) {
            (DateUnit::Weekday, Width::Long) => date.format("%A").to_string(),
            (DateUnit::Weekday, Width::Short) => date.format("%a").to_string(),
            (DateUnit::Weekday, Width::Narrow) => first_char(&date.format("%A").to_string()),
            (DateUnit::Weekday, Width::Numeric) => date.weekday().number_from_sunday().to_string(),
            (DateUnit::Weekday, Width::TwoDigit) => {
                format!("{:02}", date.weekday().number_from_sunday())
            }
            (DateUnit::Month, Width::Long) => date.format("%B").to_string(),
            (DateUnit::Month, Width::Short) => date.format("%b").to_string(),
            (DateUnit::Month, Width::Narrow) => first_char(&date.format("%B").to_string()),
            (DateUnit::Month, Width::Numeric) => date.format("%-m").to_string(),
            (DateUnit::Month, Width::TwoDigit) => date.format("%m").to_string(),
        }
    }

    fn format_date(&self, _locale: &str, date: NaiveDateTime) -> String {
        date.format("%-m/%-d/%Y").to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekdayName {
    pub index: u8,
    pub long: String,
    pub short: String,
    pub narrow: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthName {
    pub index: u32,
    pub long: String,
    pub short: String,
    pub narrow: String,
    pub numeric: String,
    #[serde(rename = "2-digit")]
    pub two_digit: String,
}

/// Seven weekday names, beginning with `week_start`.
pub fn day_table(
    formatter: &dyn LocaleFormatter,
    locale: &str,
    week_start: WeekStart,
) -> Vec<WeekdayName> {
    // 2000-01-02 fell on a Sunday.
    let Some(reference_sunday) = NaiveDate::from_ymd_opt(2000, 1, 2) else {
        return Vec::new();
    };
    let first = reference_sunday + Duration::days(i64::from(week_start.index()));

    (0..7)
        .map(|offset| {
            let date = first + Duration::days(offset);
            WeekdayName {
                index: date.weekday().num_days_from_sunday() as u8,
                long: formatter.format(locale, date, DateUnit::Weekday, Width::Long),
                short: formatter.format(locale, date, DateUnit::Weekday, Width::Short),
                narrow: formatter.format(locale, date, DateUnit::Weekday, Width::Narrow),
            }
        })
        .collect()
}

/// Twelve month names; `index` is 1-based.
pub fn month_table(formatter: &dyn LocaleFormatter, locale: &str) -> Vec<MonthName> {
    (1..=12)
        .filter_map(|month| NaiveDate::from_ymd_opt(2000, month, 1))
        .map(|date| MonthName {
            index: date.month(),
            long: formatter.format(locale, date, DateUnit::Month, Width::Long),
            short: formatter.format(locale, date, DateUnit::Month, Width::Short),
            narrow: formatter.format(locale, date, DateUnit::Month, Width::Narrow),
            numeric: formatter.format(locale, date, DateUnit::Month, Width::Numeric),
            two_digit: formatter.format(locale, date, DateUnit::Month, Width::TwoDigit),
        })
        .collect()
}

/// Platform locale from the environment, as a BCP 47-ish tag (`en-US`).
pub fn default_locale() -> String {
    ["LC_ALL", "LC_TIME", "LANG"]
        .into_iter()
        .filter_map(|key| env::var(key).ok())
        .find_map(|raw| normalize_locale(&raw))
        .unwrap_or_else(|| FALLBACK_LOCALE.to_string())
}

fn normalize_locale(raw: &str) -> Option<String> {
    let tag = raw.split(['.', '@']).next()?.trim();
    if tag.is_empty() || tag == "C" || tag == "POSIX" {
        return None;
    }
    Some(tag.replace('_', "-"))
}

/// English ordinal form: 1st, 2nd, 3rd, 4th, 11th, 21st.
pub fn ordinal(number: i64) -> String {
    let suffix = match (number.rem_euclid(10), number.rem_euclid(100)) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{number}{suffix}")
}

fn first_char(value: &str) -> String {
    value.chars().take(1).collect()
}
