//! Holiday sources backed by explicit date lists.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};

use super::{CalendarError, HolidayCalendar};

/// A fixed list of holidays, identical for every region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedHolidays {
    dates: BTreeSet<NaiveDate>,
}

impl FixedHolidays {
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }
}

impl HolidayCalendar for FixedHolidays {
    fn name(&self) -> &str {
        "fixed"
    }

    fn holidays(&self, _region: &str, year: i32) -> Result<BTreeSet<NaiveDate>, CalendarError> {
        Ok(self
            .dates
            .iter()
            .filter(|d| d.year() == year)
            .copied()
            .collect())
    }
}

/// No holidays at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoHolidays;

impl HolidayCalendar for NoHolidays {
    fn name(&self) -> &str {
        "none"
    }

    fn holidays(&self, _region: &str, _year: i32) -> Result<BTreeSet<NaiveDate>, CalendarError> {
        Ok(BTreeSet::new())
    }
}

/// A base calendar with extra fixed dates layered on top.
pub struct WithExtraHolidays<C> {
    base: C,
    extra: FixedHolidays,
}

impl<C: HolidayCalendar> WithExtraHolidays<C> {
    pub fn new(base: C, extra: FixedHolidays) -> Self {
        Self { base, extra }
    }
}

impl<C: HolidayCalendar> HolidayCalendar for WithExtraHolidays<C> {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn holidays(&self, region: &str, year: i32) -> Result<BTreeSet<NaiveDate>, CalendarError> {
        let mut dates = self.base.holidays(region, year)?;
        dates.extend(self.extra.holidays(region, year)?);
        Ok(dates)
    }
}
