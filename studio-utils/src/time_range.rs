use std::fmt::{Display, Formatter};

use rust_decimal::Decimal;
use thiserror::*;
use time::{Date, PrimitiveDateTime, Time};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeRangeError {
    #[error("End time {1} must be after start time {0}")]
    TimeOrder(PrimitiveDateTime, PrimitiveDateTime),

    #[error("Range starting at {0} cannot be moved to the next day")]
    DateOutOfRange(PrimitiveDateTime),
}

const SECONDS_PER_HOUR: i64 = 3600;

/// Half open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeRange {
    start: PrimitiveDateTime,
    end: PrimitiveDateTime,
}

impl TimeRange {
    pub fn new(start: PrimitiveDateTime, end: PrimitiveDateTime) -> Result<Self, TimeRangeError> {
        if end <= start {
            return Err(TimeRangeError::TimeOrder(start, end));
        }
        Ok(Self { start, end })
    }

    /// Builds the range of a wall clock slot on `date`.
    ///
    /// An end time before the start time means the slot runs into the next
    /// day, so the end is moved by 24 hours. Identical times describe an
    /// empty slot and are rejected.
    pub fn on_date(date: Date, from: Time, to: Time) -> Result<Self, TimeRangeError> {
        let start = PrimitiveDateTime::new(date, from);
        if to == from {
            return Err(TimeRangeError::TimeOrder(start, start));
        }
        let end_date = if to < from {
            date.next_day().ok_or(TimeRangeError::DateOutOfRange(start))?
        } else {
            date
        };
        Self::new(start, PrimitiveDateTime::new(end_date, to))
    }

    pub fn start(&self) -> PrimitiveDateTime {
        self.start
    }

    pub fn end(&self) -> PrimitiveDateTime {
        self.end
    }

    pub fn is_overnight(&self) -> bool {
        self.end.date() > self.start.date()
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn duration(&self) -> time::Duration {
        self.end - self.start
    }

    /// Length in hours with full precision.
    pub fn hours(&self) -> Decimal {
        Decimal::from_i128_with_scale(self.duration().whole_nanoseconds(), 9)
            / Decimal::from(SECONDS_PER_HOUR)
    }
}

impl Display for TimeRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
