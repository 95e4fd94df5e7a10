use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const WEEK_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid week id '{0}', expected DD/MM/YYYY")]
pub struct InvalidWeekId(pub String);

/// Club week identifier: the Wednesday of the week, rendered `DD/MM/YYYY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekId(NaiveDate);

impl WeekId {
    /// Week id for a calendar day.
    ///
    /// Saturday and Sunday already belong to the following week.
    pub fn containing(date: NaiveDate) -> Self {
        let weekday = date.weekday().num_days_from_monday() as i64;
        let (monday_based, weekday) = if weekday >= 5 {
            (date + Duration::days(7 - weekday), 0)
        } else {
            (date, weekday)
        };
        Self(monday_based + Duration::days(2 - weekday))
    }

    /// Week id for today's local date.
    pub fn current() -> Self {
        Self::containing(chrono::Local::now().date_naive())
    }

    /// Wrap an arbitrary date without snapping it to a Wednesday.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Whole weeks between two ids, regardless of order.
    pub fn weeks_between(&self, other: &WeekId) -> i64 {
        (self.0 - other.0).num_days().abs() / 7
    }
}

impl fmt::Display for WeekId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(WEEK_FORMAT))
    }
}

impl FromStr for WeekId {
    type Err = InvalidWeekId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), WEEK_FORMAT)
            .map(WeekId)
            .map_err(|_| InvalidWeekId(s.to_string()))
    }
}

impl Serialize for WeekId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WeekId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekdays_map_to_same_wednesday() {
        // Monday 13/10/2025 .. Friday 17/10/2025
        for d in 13..=17 {
            assert_eq!(WeekId::containing(day(2025, 10, d)).to_string(), "15/10/2025");
        }
    }

    #[test]
    fn test_weekend_rolls_forward() {
        assert_eq!(WeekId::containing(day(2025, 10, 18)).to_string(), "22/10/2025");
        assert_eq!(WeekId::containing(day(2025, 10, 19)).to_string(), "22/10/2025");
    }

    #[test]
    fn test_parse_normalises() {
        let week: WeekId = " 1/2/2025 ".parse().unwrap();
        assert_eq!(week.to_string(), "01/02/2025");
        assert!("2025-02-01".parse::<WeekId>().is_err());
    }

    #[test]
    fn test_weeks_between() {
        let a: WeekId = "15/10/2025".parse().unwrap();
        let b: WeekId = "01/10/2025".parse().unwrap();
        assert_eq!(a.weeks_between(&b), 2);
        assert_eq!(b.weeks_between(&a), 2);
    }
}
