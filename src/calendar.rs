//! Model-year calendar: hour counts, weekday alignment, leap-year policy.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{DemandError, Result};

pub const HOURS_PER_DAY: usize = 24;
pub const HOURS_PER_WEEK: usize = 168;
pub const HOURS_PER_COMMON_YEAR: usize = 8760;
pub const HOURS_PER_LEAP_YEAR: usize = 8784;

/// Days in each month of a common year.
const MONTH_DAYS: [usize; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// How to handle an 8760-entry shape applied to a leap year.
///
/// The source material leaves leap handling unspecified, so it is an explicit
/// configuration rather than an assumed default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LeapPolicy {
    /// Leap years require an explicit 8784-entry shape.
    #[default]
    RequireExplicit,
    /// Tile the final 24 hours of an 8760-entry shape onto Dec 31 and
    /// renormalize.
    RepeatLastDay,
}

/// Calendar facts for one model year.
///
/// Hour indexing starts at Jan 1, 00:00 local time. Weekday alignment is
/// real-calendar: hour 0 of 2024 falls on a Monday, hour 0 of 2030 on a
/// Tuesday, which matters when weekly shape curves are expanded over a year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelYear {
    year: u16,
    leap: bool,
    /// Weekday of Jan 1, 0 = Monday .. 6 = Sunday.
    jan1_weekday: usize,
    /// Cumulative day count at the start of each month (13 entries).
    month_starts: [usize; 13],
}

impl ModelYear {
    pub fn new(year: u16) -> Result<Self> {
        let jan1 = NaiveDate::from_ymd_opt(i32::from(year), 1, 1).ok_or(
            DemandError::YearOutOfRange {
                year,
                first: 0,
                last: 9999,
            },
        )?;
        let leap = NaiveDate::from_ymd_opt(i32::from(year), 2, 29).is_some();

        let mut month_starts = [0usize; 13];
        for m in 0..12 {
            let mut days = MONTH_DAYS[m];
            if m == 1 && leap {
                days += 1;
            }
            month_starts[m + 1] = month_starts[m] + days;
        }

        Ok(Self {
            year,
            leap,
            jan1_weekday: jan1.weekday().num_days_from_monday() as usize,
            month_starts,
        })
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn is_leap(&self) -> bool {
        self.leap
    }

    pub fn days(&self) -> usize {
        self.month_starts[12]
    }

    /// Number of hours in this year: 8760, or 8784 for leap years.
    pub fn hours(&self) -> usize {
        self.days() * HOURS_PER_DAY
    }

    /// Month of the given hour of the year, 0 = January.
    pub fn month_of_hour(&self, hour: usize) -> usize {
        let day = hour / HOURS_PER_DAY;
        // Twelve buckets; a linear scan is fine at this size.
        (0..12)
            .rev()
            .find(|&m| day >= self.month_starts[m])
            .unwrap_or(0)
    }

    /// Weekday of the given hour of the year, 0 = Monday.
    pub fn weekday_of_hour(&self, hour: usize) -> usize {
        (self.jan1_weekday + hour / HOURS_PER_DAY) % 7
    }

    /// Hour of day for an hour of the year, 0..24.
    pub fn hour_of_day(hour: usize) -> usize {
        hour % HOURS_PER_DAY
    }

    /// Position of the given hour within the 168-hour week, 0 = Monday 00:00.
    pub fn hour_of_week(&self, hour: usize) -> usize {
        self.weekday_of_hour(hour) * HOURS_PER_DAY + Self::hour_of_day(hour)
    }

    /// Timestamp of the given hour, for output formatting.
    pub fn timestamp(&self, hour: usize) -> chrono::NaiveDateTime {
        let date = NaiveDate::from_ymd_opt(i32::from(self.year), 1, 1)
            .unwrap_or_default()
            + chrono::Duration::days((hour / HOURS_PER_DAY) as i64);
        date.and_hms_opt(Self::hour_of_day(hour) as u32, 0, 0)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hours_per_year() {
        assert_eq!(ModelYear::new(2030).unwrap().hours(), 8760);
        assert_eq!(ModelYear::new(2040).unwrap().hours(), 8784, "2040 is a leap year");
    }

    #[test]
    fn test_weekday_alignment() {
        // Jan 1, 2024 was a Monday; Jan 1, 2030 is a Tuesday.
        let y2024 = ModelYear::new(2024).unwrap();
        assert_eq!(y2024.weekday_of_hour(0), 0);
        let y2030 = ModelYear::new(2030).unwrap();
        assert_eq!(y2030.weekday_of_hour(0), 1);
        // 24 hours later the weekday advances by one.
        assert_eq!(y2030.weekday_of_hour(24), 2);
        assert_eq!(y2030.hour_of_week(25), 2 * 24 + 1);
    }

    #[test]
    fn test_month_of_hour() {
        let y = ModelYear::new(2030).unwrap();
        assert_eq!(y.month_of_hour(0), 0);
        assert_eq!(y.month_of_hour(31 * 24), 1, "first hour of February");
        assert_eq!(y.month_of_hour(8759), 11, "last hour of December");

        let leap = ModelYear::new(2040).unwrap();
        assert_eq!(leap.month_of_hour((31 + 29) * 24 - 1), 1, "Feb 29 is February");
        assert_eq!(leap.month_of_hour((31 + 29) * 24), 2);
    }

    #[test]
    fn test_timestamp() {
        let y = ModelYear::new(2030).unwrap();
        assert_eq!(
            y.timestamp(25).format("%Y-%m-%d-%H").to_string(),
            "2030-01-02-01"
        );
    }
}
