//! Vietnamese lunisolar calendar.
//!
//! Conversion follows Hồ Ngọc Đức's astronomical method: months start on the
//! local day of the new moon, month 11 is the month holding the winter
//! solstice, and in a year with 13 lunations between two such months the
//! first month without a major solar term is the leap month.
//!
//! ```
//! use shared::lunar::{self, SolarDate};
//!
//! let lunar = lunar::solar_to_lunar(SolarDate::new(2024, 9, 17).unwrap()).unwrap();
//! assert_eq!((2024, 8, 15, false), (lunar.year, lunar.month, lunar.day, lunar.is_leap_month));
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod astro;
pub mod vietnamese;

/// Meridian used for Vietnam since 1968.
pub const VIETNAM_TZ: f64 = 7.0;

/// First supported Gregorian year.
pub const MIN_YEAR: i32 = 1900;

/// Last supported Gregorian year.
pub const MAX_YEAR: i32 = 2100;

/// Calendar conversion failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LunarError {
    /// The Gregorian date does not exist.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// The lunar day, month or leap flag does not exist in the target year.
    #[error("invalid lunar date: {0}")]
    InvalidLunarDate(String),

    /// The UTC offset is not a usable time zone.
    #[error("invalid UTC offset: {0} hours")]
    InvalidOffset(String),

    /// The year lies outside the supported 1900..=2100 range.
    #[error("year {0} is outside the supported range 1900..=2100")]
    OutOfRange(i32),
}

/// A Gregorian calendar date.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SolarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl SolarDate {
    /// Build a date, rejecting combinations such as February 30.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, LunarError> {
        let date = Self { year, month, day };
        date.to_naive()?;
        Ok(date)
    }

    /// Today's civil date at the given UTC offset in hours.
    pub fn today(tz_hours: f64) -> Result<Self, LunarError> {
        let offset = tz_hours
            .is_finite()
            .then(|| FixedOffset::east_opt((tz_hours * 3600.0).round() as i32))
            .flatten()
            .ok_or_else(|| LunarError::InvalidOffset(tz_hours.to_string()))?;
        Ok(Utc::now().with_timezone(&offset).date_naive().into())
    }

    pub fn to_naive(self) -> Result<NaiveDate, LunarError> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .ok_or_else(|| LunarError::InvalidDate(self.to_string()))
    }

    /// Whether the date lies inside [1900-01-01, 2100-12-31].
    pub fn in_supported_range(&self) -> bool {
        (MIN_YEAR..=MAX_YEAR).contains(&self.year)
    }

    fn jdn(self) -> i64 {
        astro::jd_from_date(self.year, self.month, self.day)
    }

    fn from_jdn(jdn: i64) -> Self {
        let (year, month, day) = astro::jd_to_date(jdn);
        Self { year, month, day }
    }
}

impl From<NaiveDate> for SolarDate {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

impl fmt::Display for SolarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for SolarDate {
    type Err = LunarError;

    /// Parse `YYYY-MM-DD`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LunarError::InvalidDate(format!("{s:?} is not in YYYY-MM-DD format"));
        let mut parts = s.trim().splitn(3, '-');
        let year = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        let month = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        let day = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        Self::new(year, month, day)
    }
}

/// A date in the Vietnamese lunar calendar.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LunarDate {
    /// Lunar year, counted from the first day of month 1 (Tết).
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub is_leap_month: bool,
}

impl LunarDate {
    pub fn new(year: i32, month: u32, day: u32, is_leap_month: bool) -> Self {
        Self {
            year,
            month,
            day,
            is_leap_month,
        }
    }

    /// Whether this date falls on lunar `day`/`month`.
    ///
    /// `leap` of `None` accepts both the regular and the leap occurrence.
    pub fn matches(&self, day: u32, month: u32, leap: Option<bool>) -> bool {
        self.day == day && self.month == month && leap.map_or(true, |l| l == self.is_leap_month)
    }
}

/// Coarse admission check: day in `1..=30`, month in `1..=12`.
///
/// Does not look at any concrete year.
pub fn is_valid_lunar_date(day: u32, month: u32) -> bool {
    (1..=30).contains(&day) && (1..=12).contains(&month)
}

/// Convert a Gregorian date at the Vietnamese meridian.
pub fn solar_to_lunar(date: SolarDate) -> Result<LunarDate, LunarError> {
    solar_to_lunar_with_offset(date, VIETNAM_TZ)
}

/// Convert a Gregorian date, rounding astronomical instants at `tz_hours`.
pub fn solar_to_lunar_with_offset(date: SolarDate, tz_hours: f64) -> Result<LunarDate, LunarError> {
    if !date.in_supported_range() {
        return Err(LunarError::OutOfRange(date.year));
    }
    date.to_naive()?;

    let jdn = date.jdn();
    let (lunation, month_start) = astro::lunation_containing(jdn, tz_hours);

    let mut sui = Sui::new(date.year, tz_hours);
    if lunation < sui.first_lunation {
        sui = Sui::new(date.year - 1, tz_hours);
    }
    let (year, month, is_leap_month) = sui.month_at((lunation - sui.first_lunation) as u32);

    Ok(LunarDate {
        year,
        month,
        day: (jdn - month_start + 1) as u32,
        is_leap_month,
    })
}

/// Convert a lunar date at the Vietnamese meridian.
pub fn lunar_to_solar(lunar: LunarDate) -> Result<SolarDate, LunarError> {
    lunar_to_solar_with_offset(lunar, VIETNAM_TZ)
}

/// Convert a lunar date, rounding astronomical instants at `tz_hours`.
pub fn lunar_to_solar_with_offset(lunar: LunarDate, tz_hours: f64) -> Result<SolarDate, LunarError> {
    if !is_valid_lunar_date(lunar.day, lunar.month) {
        return Err(LunarError::InvalidLunarDate(format!(
            "day {} of month {} is not a lunar date",
            lunar.day, lunar.month
        )));
    }
    // lunar year 1899 still has months 11 and 12 inside 1900
    if !(MIN_YEAR - 1..=MAX_YEAR).contains(&lunar.year) {
        return Err(LunarError::OutOfRange(lunar.year));
    }

    let (start, length) = month_bounds(lunar.year, lunar.month, lunar.is_leap_month, tz_hours)?;
    if i64::from(lunar.day) > length {
        return Err(LunarError::InvalidLunarDate(format!(
            "month {}{} of {} has only {} days",
            lunar.month,
            if lunar.is_leap_month { " (leap)" } else { "" },
            lunar.year,
            length
        )));
    }

    let solar = SolarDate::from_jdn(start + i64::from(lunar.day) - 1);
    if !solar.in_supported_range() {
        return Err(LunarError::OutOfRange(solar.year));
    }
    Ok(solar)
}

/// Number of days (29 or 30) in the given lunar month.
pub fn month_length(year: i32, month: u32, is_leap_month: bool) -> Result<u32, LunarError> {
    if !(1..=12).contains(&month) {
        return Err(LunarError::InvalidLunarDate(format!("month {month} is not a lunar month")));
    }
    if !(MIN_YEAR - 1..=MAX_YEAR).contains(&year) {
        return Err(LunarError::OutOfRange(year));
    }
    month_bounds(year, month, is_leap_month, VIETNAM_TZ).map(|(_, len)| len as u32)
}

/// The leap month inserted in lunar `year`, if any.
pub fn leap_month(year: i32) -> Result<Option<u32>, LunarError> {
    if !(MIN_YEAR - 1..=MAX_YEAR).contains(&year) {
        return Err(LunarError::OutOfRange(year));
    }
    // months 1..=10 sit in the window opened by the previous year's month 11,
    // months 11 and 12 in the window opened by this year's
    let previous = Sui::new(year - 1, VIETNAM_TZ)
        .leap_month()
        .filter(|&m| m <= 10);
    Ok(previous.or_else(|| Sui::new(year, VIETNAM_TZ).leap_month().filter(|&m| m >= 11)))
}

/// Start day (Julian day number) and length of a lunar month.
fn month_bounds(year: i32, month: u32, is_leap_month: bool, tz_hours: f64) -> Result<(i64, i64), LunarError> {
    let sui = if month >= 11 {
        Sui::new(year, tz_hours)
    } else {
        Sui::new(year - 1, tz_hours)
    };
    let index = sui.index_of(month, is_leap_month).ok_or_else(|| {
        LunarError::InvalidLunarDate(format!("lunar year {year} has no leap month {month}"))
    })?;
    let lunation = sui.first_lunation + i64::from(index);
    let start = astro::new_moon_day(lunation, tz_hours);
    let end = astro::new_moon_day(lunation + 1, tz_hours);
    Ok((start, end - start))
}

/// The run of months from one month 11 up to the next, 12 or 13 lunations long.
#[derive(Debug, Copy, Clone)]
struct Sui {
    /// Gregorian year whose December holds the opening month 11.
    year: i32,
    first_lunation: i64,
    /// Position of the leap month counted from the opening month 11.
    leap_offset: Option<u32>,
}

impl Sui {
    fn new(year: i32, tz_hours: f64) -> Self {
        let (first_lunation, _) = astro::month_eleven(year, tz_hours);
        let (next_lunation, _) = astro::month_eleven(year + 1, tz_hours);
        let leap_offset = (next_lunation - first_lunation > 12)
            .then(|| astro::leap_month_offset(first_lunation, tz_hours) as u32);
        Self {
            year,
            first_lunation,
            leap_offset,
        }
    }

    /// Lunar `(year, month, is_leap)` of the month `index` lunations after the opening month 11.
    fn month_at(&self, index: u32) -> (i32, u32, bool) {
        let (ordinal, leap) = match self.leap_offset {
            Some(l) if index == l => (index - 1, true),
            Some(l) if index > l => (index - 1, false),
            _ => (index, false),
        };
        let month = (ordinal + 10) % 12 + 1;
        let year = if month >= 11 { self.year } else { self.year + 1 };
        (year, month, leap)
    }

    /// Inverse of [`Sui::month_at`] for a month number.
    fn index_of(&self, month: u32, is_leap_month: bool) -> Option<u32> {
        let ordinal = (month + 1) % 12;
        match self.leap_offset {
            Some(l) if is_leap_month => (ordinal + 1 == l).then_some(l),
            Some(l) if ordinal >= l => Some(ordinal + 1),
            None if is_leap_month => None,
            _ => Some(ordinal),
        }
    }

    fn leap_month(&self) -> Option<u32> {
        self.leap_offset.map(|l| self.month_at(l).1)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn solar(y: i32, m: u32, d: u32) -> SolarDate {
        SolarDate::new(y, m, d).unwrap()
    }

    #[test]
    fn test_known_vectors() {
        let dataset = [
            ((2024, 12, 25), (2024, 11, 25, false)),
            ((2024, 9, 17), (2024, 8, 15, false)),
            ((2024, 2, 10), (2024, 1, 1, false)),
            ((2025, 1, 29), (2025, 1, 1, false)),
            ((2000, 1, 1), (1999, 11, 25, false)),
            ((2017, 7, 22), (2017, 6, 29, false)),
            ((2017, 7, 23), (2017, 6, 1, true)),
            ((2023, 3, 22), (2023, 2, 1, true)),
            ((1985, 1, 21), (1985, 1, 1, false)),
        ];
        for ((y, m, d), (ly, lm, ld, leap)) in dataset {
            assert_eq!(
                LunarDate::new(ly, lm, ld, leap),
                solar_to_lunar(solar(y, m, d)).unwrap(),
                "{y}-{m}-{d}"
            );
        }
    }

    #[test]
    fn test_leap_month_two_of_2023() {
        let leap = lunar_to_solar(LunarDate::new(2023, 2, 1, true)).unwrap();
        let regular = lunar_to_solar(LunarDate::new(2023, 2, 1, false)).unwrap();
        assert_eq!(solar(2023, 3, 22), leap);
        assert_eq!(solar(2023, 2, 20), regular);
        assert_ne!(leap, regular);
        assert_eq!(Ok(Some(2)), leap_month(2023));
        assert_eq!(Ok(None), leap_month(2024));
        assert_eq!(Ok(Some(6)), leap_month(2025));
    }

    #[test]
    fn test_rejects_leap_month_the_year_does_not_insert() {
        assert!(matches!(
            lunar_to_solar(LunarDate::new(2023, 3, 1, true)),
            Err(LunarError::InvalidLunarDate(_))
        ));
        assert!(matches!(
            lunar_to_solar(LunarDate::new(2024, 2, 1, true)),
            Err(LunarError::InvalidLunarDate(_))
        ));
    }

    #[test]
    fn test_rejects_day_past_month_end() {
        assert_eq!(Ok(29), month_length(2025, 2, false));
        assert!(matches!(
            lunar_to_solar(LunarDate::new(2025, 2, 30, false)),
            Err(LunarError::InvalidLunarDate(_))
        ));
        assert_eq!(solar(2025, 3, 28), lunar_to_solar(LunarDate::new(2025, 2, 29, false)).unwrap());
    }

    #[test]
    fn test_coarse_validity() {
        assert!(!is_valid_lunar_date(31, 5));
        assert!(!is_valid_lunar_date(0, 5));
        assert!(!is_valid_lunar_date(1, 13));
        assert!(is_valid_lunar_date(30, 2));
    }

    #[test]
    fn test_range_boundaries() {
        let before = SolarDate {
            year: 1899,
            month: 12,
            day: 31,
        };
        let after = SolarDate {
            year: 2101,
            month: 1,
            day: 1,
        };
        assert_eq!(Err(LunarError::OutOfRange(1899)), solar_to_lunar(before));
        assert_eq!(Err(LunarError::OutOfRange(2101)), solar_to_lunar(after));
        assert!(solar_to_lunar(solar(1900, 1, 1)).is_ok());
        assert!(solar_to_lunar(solar(2100, 12, 31)).is_ok());
        assert_eq!(
            Err(LunarError::OutOfRange(2101)),
            lunar_to_solar(LunarDate::new(2101, 1, 1, false))
        );
    }

    #[test]
    fn test_rejects_impossible_solar_dates() {
        let feb30 = SolarDate {
            year: 2024,
            month: 2,
            day: 30,
        };
        assert!(matches!(solar_to_lunar(feb30), Err(LunarError::InvalidDate(_))));
        assert!(SolarDate::new(2023, 2, 29).is_err());
        assert!("2024-13-01".parse::<SolarDate>().is_err());
        assert!("not a date".parse::<SolarDate>().is_err());
        assert_eq!(Ok(solar(2024, 12, 25)), "2024-12-25".parse());
        assert_eq!("2024-01-05", solar(2024, 1, 5).to_string());
    }

    #[test]
    fn test_differs_from_fixed_offset_heuristic() {
        // a ±15 day shift would answer lunar 10/12/2024 here
        let lunar = solar_to_lunar(solar(2024, 12, 25)).unwrap();
        assert_ne!((10, 12), (lunar.day, lunar.month));
    }

    #[test]
    fn test_today_needs_a_real_offset() {
        assert!(SolarDate::today(7.0).unwrap().in_supported_range());
        assert!(SolarDate::today(-9.5).is_ok());
        assert!(matches!(SolarDate::today(25.0), Err(LunarError::InvalidOffset(_))));
        assert!(matches!(SolarDate::today(f64::NAN), Err(LunarError::InvalidOffset(_))));
    }

    #[test]
    fn test_matches_regular_and_leap_occurrences() {
        let leap = LunarDate::new(2023, 2, 1, true);
        assert!(leap.matches(1, 2, None));
        assert!(leap.matches(1, 2, Some(true)));
        assert!(!leap.matches(1, 2, Some(false)));
        assert!(!leap.matches(2, 2, None));
    }

    #[test]
    fn test_round_trip_over_supported_range() {
        let first = astro::jd_from_date(MIN_YEAR, 1, 1);
        let last = astro::jd_from_date(MAX_YEAR, 12, 31);
        let mut leaps: HashMap<i32, u32> = HashMap::new();
        for jdn in first..=last {
            let date = SolarDate::from_jdn(jdn);
            let lunar = solar_to_lunar(date).unwrap();
            assert!(lunar.day >= 1 && lunar.day <= 30, "{date}");
            assert!(
                lunar.day <= month_length(lunar.year, lunar.month, lunar.is_leap_month).unwrap(),
                "{date}"
            );
            assert_eq!(date, lunar_to_solar(lunar).unwrap(), "{date} -> {lunar:?}");
            if lunar.is_leap_month {
                let month = *leaps.entry(lunar.year).or_insert(lunar.month);
                assert_eq!(month, lunar.month, "two leap months in {}", lunar.year);
            }
        }
        for (year, month) in leaps {
            assert_eq!(Ok(Some(month)), leap_month(year));
        }
    }
}
