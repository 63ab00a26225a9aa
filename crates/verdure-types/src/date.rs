//! Calendar date handling.
//!
//! All date comparisons in Verdure go through [`CalendarDate`], which
//! stores a plain year-month-day value and always formats as `YYYY-MM-DD`.
//! Keeping one canonical form avoids locale and timezone drift between the
//! storage layer and the presentation layer.

use core::fmt;
use std::str::FromStr;

use time::{Date, Month, OffsetDateTime};

use crate::error::ParseError;

/// A plain (year, month, day) value with value equality.
///
/// # Examples
///
/// ```
/// use verdure_types::CalendarDate;
///
/// let date: CalendarDate = "2024-03-01".parse().unwrap();
/// assert_eq!(date.to_string(), "2024-03-01");
/// assert_eq!(date, CalendarDate::new(2024, 3, 1).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarDate(Date);

impl CalendarDate {
    /// Create a date from numeric components.
    ///
    /// Returns [`ParseError::InvalidDate`] if the components do not name a
    /// real calendar day (e.g. `2024-02-30`).
    pub fn new(year: i32, month: u8, day: u8) -> Result<Self, ParseError> {
        let month = Month::try_from(month)
            .map_err(|_| ParseError::InvalidDate(format!("{year:04}-{month:02}-{day:02}")))?;
        Date::from_calendar_date(year, month, day)
            .map(Self)
            .map_err(|_| {
                ParseError::InvalidDate(format!("{year:04}-{:02}-{day:02}", u8::from(month)))
            })
    }

    /// The calendar day of a timestamp, truncated in the timestamp's own
    /// offset. Pass UTC timestamps for the storage-canonical day.
    pub fn from_datetime(datetime: OffsetDateTime) -> Self {
        Self(datetime.date())
    }

    /// Today's date in UTC.
    pub fn today_utc() -> Self {
        Self::from_datetime(OffsetDateTime::now_utc())
    }

    /// The underlying [`time::Date`].
    pub fn date(&self) -> Date {
        self.0
    }
}

impl From<Date> for CalendarDate {
    fn from(date: Date) -> Self {
        Self(date)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day()
        )
    }
}

impl FromStr for CalendarDate {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '-');
        let (year, month, day) = match (parts.next(), parts.next(), parts.next()) {
            (Some(y), Some(m), Some(d)) => (y, m, d),
            _ => return Err(ParseError::InvalidDate(s.to_string())),
        };

        let year: i32 = year
            .parse()
            .map_err(|_| ParseError::InvalidDate(s.to_string()))?;
        let month: u8 = month
            .parse()
            .map_err(|_| ParseError::InvalidDate(s.to_string()))?;
        let day: u8 = day
            .parse()
            .map_err(|_| ParseError::InvalidDate(s.to_string()))?;

        Self::new(year, month, day).map_err(|_| ParseError::InvalidDate(s.to_string()))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for CalendarDate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for CalendarDate {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
