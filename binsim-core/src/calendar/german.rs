//! German public holidays, nationwide and per federal state.
//!
//! Movable feasts are derived from Easter Sunday (anonymous Gregorian
//! algorithm). Only the current statutory rules are modelled.

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use super::{CalendarError, HolidayCalendar};

/// Statutory holidays of Germany. Region is a state code (`BY`, `NW`, ...)
/// optionally prefixed with `DE-`; `DE` alone means nationwide holidays only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GermanHolidays;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extra {
    Epiphany,
    WomensDay,
    CorpusChristi,
    Assumption,
    ChildrensDay,
    Reformation,
    AllSaints,
    RepentanceDay,
}

fn state_extras(state: &str) -> Option<&'static [Extra]> {
    use Extra::*;
    let extras: &'static [Extra] = match state {
        "DE" => &[],
        "BW" => &[Epiphany, CorpusChristi, AllSaints],
        "BY" => &[Epiphany, CorpusChristi, Assumption, AllSaints],
        "BE" => &[WomensDay],
        "BB" => &[Reformation],
        "HB" | "HH" | "NI" | "SH" => &[Reformation],
        "HE" => &[CorpusChristi],
        "MV" => &[WomensDay, Reformation],
        "NW" | "RP" => &[CorpusChristi, AllSaints],
        "SL" => &[CorpusChristi, Assumption, AllSaints],
        "SN" => &[Reformation, RepentanceDay],
        "ST" => &[Epiphany, Reformation],
        "TH" => &[ChildrensDay, Reformation],
        _ => return None,
    };
    Some(extras)
}

/// Easter Sunday of `year` in the Gregorian calendar.
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

impl HolidayCalendar for GermanHolidays {
    fn name(&self) -> &str {
        "germany"
    }

    fn holidays(&self, region: &str, year: i32) -> Result<BTreeSet<NaiveDate>, CalendarError> {
        let code = region.trim().to_ascii_uppercase();
        let state = code.strip_prefix("DE-").unwrap_or(&code);
        let extras = state_extras(state).ok_or_else(|| CalendarError::UnknownRegion(region.to_string()))?;

        let ymd = |m: u32, d: u32| {
            NaiveDate::from_ymd_opt(year, m, d).ok_or(CalendarError::UnsupportedYear(year))
        };
        let easter = easter_sunday(year).ok_or(CalendarError::UnsupportedYear(year))?;
        let from_easter = |days: i64| easter + Duration::days(days);

        let mut dates = BTreeSet::from([
            ymd(1, 1)?,
            from_easter(-2),
            from_easter(1),
            ymd(5, 1)?,
            from_easter(39),
            from_easter(50),
            ymd(10, 3)?,
            ymd(12, 25)?,
            ymd(12, 26)?,
        ]);

        for extra in extras {
            let date = match extra {
                Extra::Epiphany => ymd(1, 6)?,
                Extra::WomensDay => ymd(3, 8)?,
                Extra::CorpusChristi => from_easter(60),
                Extra::Assumption => ymd(8, 15)?,
                Extra::ChildrensDay => ymd(9, 20)?,
                Extra::Reformation => ymd(10, 31)?,
                Extra::AllSaints => ymd(11, 1)?,
                Extra::RepentanceDay => {
                    // Last Wednesday before November 23.
                    let nov22 = ymd(11, 22)?;
                    let back = (nov22.weekday().num_days_from_monday() + 7
                        - Weekday::Wed.num_days_from_monday())
                        % 7;
                    nov22 - Duration::days(i64::from(back))
                }
            };
            dates.insert(date);
        }

        Ok(dates)
    }
}
