use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::calendar::{end_of_day, first_day_of_month, shift_month, start_of_day};
use crate::error::ValueParseError;

const RANGE_SEPARATOR: char = '/';
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// True only when both ends are set and the start of `date` lies
    /// between them.
    pub fn contains(&self, date: NaiveDate) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => {
                let moment = start_of_day(date);
                moment >= start && moment <= end
            }
            _ => false,
        }
    }

    pub fn starts_on(&self, date: NaiveDate) -> bool {
        self.start.is_some_and(|start| start.date() == date)
    }

    pub fn ends_on(&self, date: NaiveDate) -> bool {
        self.end.is_some_and(|end| end.date() == date)
    }
}

/// Named values resolved relative to the instant they are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DynamicValue {
    #[serde(rename = "TODAY")]
    Today,
    #[serde(rename = "YESTERDAY")]
    Yesterday,
    #[serde(rename = "TOMORROW")]
    Tomorrow,
    #[serde(rename = "THIS_MONTH")]
    ThisMonth,
    #[serde(rename = "LAST_MONTH")]
    LastMonth,
    #[serde(rename = "LAST_90_DAYS")]
    Last90Days,
    #[serde(rename = "THIS_YEAR")]
    ThisYear,
    #[serde(rename = "LAST_YEAR")]
    LastYear,
}

impl DynamicValue {
    pub const ALL: [DynamicValue; 8] = [
        DynamicValue::Today,
        DynamicValue::Yesterday,
        DynamicValue::Tomorrow,
        DynamicValue::ThisMonth,
        DynamicValue::LastMonth,
        DynamicValue::Last90Days,
        DynamicValue::ThisYear,
        DynamicValue::LastYear,
    ];

    pub fn token(self) -> &'static str {
        match self {
            DynamicValue::Today => "TODAY",
            DynamicValue::Yesterday => "YESTERDAY",
            DynamicValue::Tomorrow => "TOMORROW",
            DynamicValue::ThisMonth => "THIS_MONTH",
            DynamicValue::LastMonth => "LAST_MONTH",
            DynamicValue::Last90Days => "LAST_90_DAYS",
            DynamicValue::ThisYear => "THIS_YEAR",
            DynamicValue::LastYear => "LAST_YEAR",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DynamicValue::Today => "Today",
            DynamicValue::Yesterday => "Yesterday",
            DynamicValue::Tomorrow => "Tomorrow",
            DynamicValue::ThisMonth => "This Month",
            DynamicValue::LastMonth => "Last Month",
            DynamicValue::Last90Days => "Last 90 Days",
            DynamicValue::ThisYear => "This Year",
            DynamicValue::LastYear => "Last Year",
        }
    }

    /// Single-date form of the token, if it has one.
    pub fn resolve_date(self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        let today = now.date();
        match self {
            DynamicValue::Today => Some(now),
            DynamicValue::Yesterday => today.pred_opt().map(start_of_day),
            DynamicValue::Tomorrow => today.succ_opt().map(start_of_day),
            _ => None,
        }
    }

    /// Range form of the token, if it has one.
    pub fn resolve_range(self, now: NaiveDateTime) -> Option<DateRange> {
        let today = now.date();
        let range = match self {
            DynamicValue::Today => DateRange::new(start_of_day(today), now),
            DynamicValue::Yesterday => {
                let yesterday = today.pred_opt()?;
                DateRange::new(start_of_day(yesterday), end_of_day(yesterday))
            }
            DynamicValue::Tomorrow => return None,
            DynamicValue::ThisMonth => DateRange::new(start_of_day(first_day_of_month(today)), now),
            DynamicValue::LastMonth => {
                let this_month = first_day_of_month(today);
                let last_month = shift_month(this_month, -1)?;
                DateRange::new(start_of_day(last_month), end_of_day(this_month.pred_opt()?))
            }
            DynamicValue::Last90Days => {
                let start = today.checked_sub_signed(Duration::days(90))?;
                DateRange::new(start_of_day(start), now)
            }
            DynamicValue::ThisYear => {
                let new_year = NaiveDate::from_ymd_opt(today.year(), 1, 1)?;
                DateRange::new(start_of_day(new_year), now)
            }
            DynamicValue::LastYear => {
                let start = NaiveDate::from_ymd_opt(today.year() - 1, 1, 1)?;
                let end = NaiveDate::from_ymd_opt(today.year() - 1, 12, 31)?;
                DateRange::new(start_of_day(start), end_of_day(end))
            }
        };
        Some(range)
    }
}

impl Display for DynamicValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for DynamicValue {
    type Err = ValueParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        DynamicValue::ALL
            .into_iter()
            .find(|value| value.token().eq_ignore_ascii_case(token))
            .ok_or_else(|| ValueParseError::UnknownToken(token.to_string()))
    }
}

/// A selection value as supplied by configuration or an external owner.
///
/// Text form: `TODAY`, `2024-03-10`, `2024-03-10T09:30:00`,
/// `2024-03-05/2024-03-10` (either side may be empty).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TemporalValue {
    Date(NaiveDateTime),
    Range(DateRange),
    Dynamic(DynamicValue),
}

impl From<NaiveDateTime> for TemporalValue {
    fn from(value: NaiveDateTime) -> Self {
        TemporalValue::Date(value)
    }
}

impl From<NaiveDate> for TemporalValue {
    fn from(value: NaiveDate) -> Self {
        TemporalValue::Date(start_of_day(value))
    }
}

impl From<DateRange> for TemporalValue {
    fn from(value: DateRange) -> Self {
        TemporalValue::Range(value)
    }
}

impl From<DynamicValue> for TemporalValue {
    fn from(value: DynamicValue) -> Self {
        TemporalValue::Dynamic(value)
    }
}

impl Display for TemporalValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TemporalValue::Date(date) => write!(f, "{}", date.format(DATETIME_FORMAT)),
            TemporalValue::Range(range) => {
                if let Some(start) = range.start {
                    write!(f, "{}", start.format(DATETIME_FORMAT))?;
                }
                write!(f, "{RANGE_SEPARATOR}")?;
                if let Some(end) = range.end {
                    write!(f, "{}", end.format(DATETIME_FORMAT))?;
                }
                Ok(())
            }
            TemporalValue::Dynamic(value) => write!(f, "{value}"),
        }
    }
}

impl FromStr for TemporalValue {
    type Err = ValueParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();

        if let Some((start, end)) = raw.split_once(RANGE_SEPARATOR) {
            let range = DateRange {
                start: parse_bound(start, start_of_day)?,
                end: parse_bound(end, end_of_day)?,
            };
            return Ok(TemporalValue::Range(range));
        }

        if raw.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return raw.parse::<DynamicValue>().map(TemporalValue::Dynamic);
        }

        parse_moment(raw, start_of_day).map(TemporalValue::Date)
    }
}

impl TryFrom<String> for TemporalValue {
    type Error = ValueParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TemporalValue> for String {
    fn from(value: TemporalValue) -> Self {
        value.to_string()
    }
}

fn parse_bound(
    raw: &str,
    snap: fn(NaiveDate) -> NaiveDateTime,
) -> Result<Option<NaiveDateTime>, ValueParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    parse_moment(raw, snap).map(Some)
}

// Date-only input is snapped with `snap`; full timestamps are kept as given.
fn parse_moment(
    raw: &str,
    snap: fn(NaiveDate) -> NaiveDateTime,
) -> Result<NaiveDateTime, ValueParseError> {
    if let Ok(moment) = raw.parse::<NaiveDateTime>() {
        return Ok(moment);
    }
    raw.parse::<NaiveDate>()
        .map(snap)
        .map_err(|_| ValueParseError::InvalidDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::{DateRange, DynamicValue, TemporalValue};
    use crate::calendar::{end_of_day, start_of_day};
    use crate::error::ValueParseError;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn now() -> NaiveDateTime {
        date(2024, 3, 15).and_hms_opt(14, 30, 0).unwrap()
    }

    #[test]
    fn resolves_single_date_tokens() {
        assert_eq!(DynamicValue::Today.resolve_date(now()), Some(now()));
        assert_eq!(
            DynamicValue::Yesterday.resolve_date(now()),
            Some(start_of_day(date(2024, 3, 14)))
        );
        assert_eq!(
            DynamicValue::Tomorrow.resolve_date(now()),
            Some(start_of_day(date(2024, 3, 16)))
        );
        assert_eq!(DynamicValue::LastMonth.resolve_date(now()), None);
    }

    #[test]
    fn resolves_range_tokens() {
        let today = DynamicValue::Today.resolve_range(now()).unwrap();
        assert_eq!(today, DateRange::new(start_of_day(date(2024, 3, 15)), now()));

        let yesterday = DynamicValue::Yesterday.resolve_range(now()).unwrap();
        assert_eq!(
            yesterday,
            DateRange::new(start_of_day(date(2024, 3, 14)), end_of_day(date(2024, 3, 14)))
        );

        let this_month = DynamicValue::ThisMonth.resolve_range(now()).unwrap();
        assert_eq!(this_month.start, Some(start_of_day(date(2024, 3, 1))));
        assert_eq!(this_month.end, Some(now()));

        let last_month = DynamicValue::LastMonth.resolve_range(now()).unwrap();
        assert_eq!(
            last_month,
            DateRange::new(start_of_day(date(2024, 2, 1)), end_of_day(date(2024, 2, 29)))
        );

        let last_90 = DynamicValue::Last90Days.resolve_range(now()).unwrap();
        assert_eq!(last_90.start, Some(start_of_day(date(2023, 12, 16))));

        let this_year = DynamicValue::ThisYear.resolve_range(now()).unwrap();
        assert_eq!(this_year.start, Some(start_of_day(date(2024, 1, 1))));

        let last_year = DynamicValue::LastYear.resolve_range(now()).unwrap();
        assert_eq!(
            last_year,
            DateRange::new(start_of_day(date(2023, 1, 1)), end_of_day(date(2023, 12, 31)))
        );

        assert_eq!(DynamicValue::Tomorrow.resolve_range(now()), None);
    }

    #[test]
    fn last_month_in_january_rolls_into_previous_year() {
        let january = date(2025, 1, 10).and_hms_opt(8, 0, 0).unwrap();
        let range = DynamicValue::LastMonth.resolve_range(january).unwrap();
        assert_eq!(
            range,
            DateRange::new(start_of_day(date(2024, 12, 1)), end_of_day(date(2024, 12, 31)))
        );
    }

    #[test]
    fn resolution_follows_the_instant_it_is_given() {
        let later = date(2024, 4, 2).and_hms_opt(9, 0, 0).unwrap();
        let first = DynamicValue::ThisMonth.resolve_range(now()).unwrap();
        let second = DynamicValue::ThisMonth.resolve_range(later).unwrap();
        assert_ne!(first, second);
        assert_eq!(second.start, Some(start_of_day(date(2024, 4, 1))));
    }

    #[test]
    fn parses_text_values() {
        assert_eq!(
            "last_90_days".parse::<TemporalValue>(),
            Ok(TemporalValue::Dynamic(DynamicValue::Last90Days))
        );
        assert_eq!(
            "2024-03-10".parse::<TemporalValue>(),
            Ok(TemporalValue::Date(start_of_day(date(2024, 3, 10))))
        );
        assert_eq!(
            "2024-03-10T09:30:00".parse::<TemporalValue>(),
            Ok(TemporalValue::Date(date(2024, 3, 10).and_hms_opt(9, 30, 0).unwrap()))
        );
        assert_eq!(
            "2024-03-05/2024-03-10".parse::<TemporalValue>(),
            Ok(TemporalValue::Range(DateRange::new(
                start_of_day(date(2024, 3, 5)),
                end_of_day(date(2024, 3, 10)),
            )))
        );
        assert_eq!(
            "2024-03-05/".parse::<TemporalValue>(),
            Ok(TemporalValue::Range(DateRange {
                start: Some(start_of_day(date(2024, 3, 5))),
                end: None,
            }))
        );
    }

    #[test]
    fn rejects_bad_text_values() {
        assert_eq!(
            "NEXT_WEEK".parse::<TemporalValue>(),
            Err(ValueParseError::UnknownToken("NEXT_WEEK".to_string()))
        );
        assert_eq!(
            "2024-02-30".parse::<TemporalValue>(),
            Err(ValueParseError::InvalidDate("2024-02-30".to_string()))
        );
    }

    #[test]
    fn display_is_parseable() {
        let value = TemporalValue::Range(DateRange::new(
            start_of_day(date(2024, 3, 5)),
            end_of_day(date(2024, 3, 10)),
        ));
        assert_eq!(
            value.to_string(),
            "2024-03-05T00:00:00.000/2024-03-10T23:59:59.999"
        );
        assert_eq!(value.to_string().parse::<TemporalValue>(), Ok(value));
    }

    #[test]
    fn serializes_as_text() {
        let value = TemporalValue::Dynamic(DynamicValue::LastYear);
        assert_eq!(serde_json::to_string(&value).unwrap(), "\"LAST_YEAR\"");
        let parsed: TemporalValue = serde_json::from_str("\"2024-01-31\"").unwrap();
        assert_eq!(parsed, TemporalValue::Date(start_of_day(date(2024, 1, 31))));
    }

    #[test]
    fn range_membership_uses_day_start() {
        let range = DateRange::new(start_of_day(date(2024, 3, 5)), end_of_day(date(2024, 3, 10)));
        assert!(range.contains(date(2024, 3, 5)));
        assert!(range.contains(date(2024, 3, 10)));
        assert!(!range.contains(date(2024, 3, 11)));
        assert!(range.starts_on(date(2024, 3, 5)));
        assert!(range.ends_on(date(2024, 3, 10)));
        assert!(!DateRange::default().contains(date(2024, 3, 5)));
    }
}
