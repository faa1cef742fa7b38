use chrono::{DateTime, Datelike, Days, Duration, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::clock::Clock;

/// Attendance days are civil days at this fixed offset from UTC. No DST.
pub const CIVIL_OFFSET_HOURS: i64 = 7;

/// A civil day in the fixed UTC+7 calendar.
///
/// Holds only a calendar date, so it cannot be compared against timestamps
/// taken in some other offset. Serializes as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttendanceDay(NaiveDate);

impl AttendanceDay {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parses `YYYY-MM-DD`.
    pub fn parse(value: &str) -> Option<Self> {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .ok()
            .map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// UTC midnight of this civil day, the instant used as the day boundary.
    pub fn boundary(&self) -> DateTime<Utc> {
        self.0.and_time(NaiveTime::MIN).and_utc()
    }

    pub fn year_month(&self) -> YearMonth {
        YearMonth {
            year: self.0.year(),
            month: self.0.month(),
        }
    }
}

impl fmt::Display for AttendanceDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// A validated `(year, month)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if !(1..=9999).contains(&year) || !(1..=12).contains(&month) {
            return None;
        }
        Some(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    fn first_day(&self) -> NaiveDate {
        // year and month are range-checked in `new`
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }
}

/// Inclusive range of attendance days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub from: AttendanceDay,
    pub to: AttendanceDay,
}

impl DayRange {
    pub fn month(ym: YearMonth) -> Self {
        Self {
            from: month_start(ym),
            to: month_end(ym),
        }
    }

    pub fn single(day: AttendanceDay) -> Self {
        Self { from: day, to: day }
    }

    pub fn contains(&self, day: AttendanceDay) -> bool {
        self.from <= day && day <= self.to
    }
}

/// The civil day an observer at UTC+7 sees at `instant`.
pub fn civil_day_at(instant: DateTime<Utc>) -> AttendanceDay {
    let shifted = instant + Duration::hours(CIVIL_OFFSET_HOURS);
    AttendanceDay(shifted.date_naive())
}

pub fn current_day(clock: &dyn Clock) -> AttendanceDay {
    civil_day_at(clock.now())
}

pub fn month_start(ym: YearMonth) -> AttendanceDay {
    AttendanceDay(ym.first_day())
}

/// Last day of the month: the day before the first of the following month.
pub fn month_end(ym: YearMonth) -> AttendanceDay {
    AttendanceDay(ym.first_day() + Months::new(1) - Days::new(1))
}

pub fn current_year_month(clock: &dyn Clock) -> YearMonth {
    current_day(clock).year_month()
}
