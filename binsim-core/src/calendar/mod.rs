//! Holiday lookup and the per-trial collection calendar.
//!
//! The [`HolidayCalendar`] trait abstracts over holiday sources so trials can
//! run against the built-in German calendar, a fixed list from configuration,
//! or no holidays at all.

pub mod fixed;
pub mod german;

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use thiserror::Error;

pub use fixed::{FixedHolidays, NoHolidays, WithExtraHolidays};
pub use german::GermanHolidays;

/// Errors from holiday lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("unknown holiday region '{0}'")]
    UnknownRegion(String),

    #[error("year {0} is outside the supported date range")]
    UnsupportedYear(i32),
}

/// Source of public holidays.
pub trait HolidayCalendar: Send + Sync {
    /// Human-readable name of this calendar.
    fn name(&self) -> &str;

    /// All holidays of `year` observed in `region`.
    fn holidays(&self, region: &str, year: i32) -> Result<BTreeSet<NaiveDate>, CalendarError>;
}

/// Holidays that fall on the trial's collection weekday within the horizon.
///
/// Built once at trial start; immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionCalendar {
    start: NaiveDate,
    weekday: Weekday,
    blocked: BTreeSet<NaiveDate>,
}

impl CollectionCalendar {
    /// Collect holidays of every year the horizon touches, keeping only those
    /// inside `[start, end]` that fall on `weekday`.
    pub fn build(
        source: &dyn HolidayCalendar,
        region: &str,
        start: NaiveDate,
        end: NaiveDate,
        weekday: Weekday,
    ) -> Result<Self, CalendarError> {
        let mut blocked = BTreeSet::new();
        for year in start.year()..=end.year() {
            blocked.extend(
                source
                    .holidays(region, year)?
                    .into_iter()
                    .filter(|d| *d >= start && *d <= end && d.weekday() == weekday),
            );
        }
        Ok(Self {
            start,
            weekday,
            blocked,
        })
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    /// Calendar date of simulated day `day`.
    pub fn date_of(&self, day: u32) -> NaiveDate {
        self.start + Duration::days(i64::from(day))
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.blocked.contains(&date)
    }

    pub fn holidays(&self) -> &BTreeSet<NaiveDate> {
        &self.blocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn keeps_only_matching_weekday_inside_horizon() {
        // 2026-01-01 is a Thursday, 2026-01-06 a Tuesday.
        let source = FixedHolidays::new([d(2026, 1, 1), d(2026, 1, 6), d(2025, 12, 25)]);
        let cal =
            CollectionCalendar::build(&source, "any", d(2026, 1, 1), d(2026, 12, 31), Weekday::Thu)
                .unwrap();
        assert!(cal.is_holiday(d(2026, 1, 1)));
        assert!(!cal.is_holiday(d(2026, 1, 6)));
        assert!(!cal.is_holiday(d(2025, 12, 25)));
        assert_eq!(cal.holidays().len(), 1);
    }

    #[test]
    fn spans_multiple_years() {
        let cal = CollectionCalendar::build(
            &GermanHolidays,
            "BY",
            d(2026, 1, 1),
            d(2027, 5, 15),
            Weekday::Fri,
        )
        .unwrap();
        // Good Friday 2026 (Apr 3) and 2027 (Mar 26).
        assert!(cal.is_holiday(d(2026, 4, 3)));
        assert!(cal.is_holiday(d(2027, 3, 26)));
    }

    #[test]
    fn date_of_offsets_from_start() {
        let cal =
            CollectionCalendar::build(&NoHolidays, "", d(2026, 1, 1), d(2026, 3, 1), Weekday::Mon)
                .unwrap();
        assert_eq!(cal.date_of(0), d(2026, 1, 1));
        assert_eq!(cal.date_of(31), d(2026, 2, 1));
    }

    #[test]
    fn region_errors_propagate() {
        let err =
            CollectionCalendar::build(&GermanHolidays, "XX", d(2026, 1, 1), d(2026, 2, 1), Weekday::Mon)
                .unwrap_err();
        assert_eq!(err, CalendarError::UnknownRegion("XX".to_string()));
    }
}
