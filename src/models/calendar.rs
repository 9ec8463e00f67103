//! Academic calendar records and queries.
//!
//! Academic years and their sessions control which calendar dates can carry
//! class instances; holidays block instance generation inside a year. All
//! ranges are half-open (`[start, end)`).

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::define_id_type;

define_id_type!(i64, AcademicYearId);
define_id_type!(i64, SessionId);
define_id_type!(i64, HolidayId);

/// Half-open calendar date range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    /// Iterate every date in the range in ascending order.
    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> {
        let mut current = self.start;
        let end = self.end;
        std::iter::from_fn(move || {
            if current < end {
                let d = current;
                current = current + Duration::days(1);
                Some(d)
            } else {
                None
            }
        })
    }
}

/// An academic year, e.g. "2025/26". At most one active year covers any date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicYear {
    pub id: AcademicYearId,
    pub name: String,
    pub range: DateRange,
    pub is_active: bool,
}

/// A session (term/semester) inside an academic year. Sessions partition
/// their year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicSession {
    pub id: SessionId,
    pub year: AcademicYearId,
    pub name: String,
    pub range: DateRange,
}

/// A holiday range inside an academic year; blocks instance generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holiday {
    pub id: HolidayId,
    pub year: AcademicYearId,
    pub name: String,
    pub range: DateRange,
}

/// Snapshot of the whole calendar, with the date queries the materialiser
/// and attendance engine need.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AcademicCalendar {
    pub years: Vec<AcademicYear>,
    pub sessions: Vec<AcademicSession>,
    pub holidays: Vec<Holiday>,
}

impl AcademicCalendar {
    /// The active academic year covering `date`, if any.
    pub fn active_year_for(&self, date: NaiveDate) -> Option<&AcademicYear> {
        self.years
            .iter()
            .find(|y| y.is_active && y.range.contains(date))
    }

    /// The session covering `date` within the active year, if any.
    pub fn session_for(&self, date: NaiveDate) -> Option<&AcademicSession> {
        let year = self.active_year_for(date)?;
        self.sessions
            .iter()
            .find(|s| s.year == year.id && s.range.contains(date))
    }

    /// The holiday covering `date` within the active year, if any.
    pub fn holiday_for(&self, date: NaiveDate) -> Option<&Holiday> {
        let year = self.active_year_for(date)?;
        self.holidays
            .iter()
            .find(|h| h.year == year.id && h.range.contains(date))
    }

    /// Whether `date` can carry class instances: inside an active year and a
    /// session, and not on a holiday.
    pub fn is_teaching_day(&self, date: NaiveDate) -> bool {
        self.session_for(date).is_some() && self.holiday_for(date).is_none()
    }
}
