use std::fmt;

use chrono::{Datelike, Duration, Local, NaiveDate};
use rand::Rng;

/// Earliest year accepted by [`YearMonth::new`].
pub const MIN_YEAR: i32 = 1;
/// Latest year accepted by [`YearMonth::new`].
pub const MAX_YEAR: i32 = 9999;

/// A calendar month used to scope order files and order numbers.
///
/// Backed by its first day, so every value maps to real dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first_day: NaiveDate,
}

impl YearMonth {
    /// Build a month, returning `None` when `month` is outside `1..=12` or
    /// `year` is outside `MIN_YEAR..=MAX_YEAR`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, 1).map(|first_day| Self { first_day })
    }

    /// Month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            first_day: date - Duration::days(i64::from(date.day0())),
        }
    }

    /// Month containing today's local date.
    pub fn current() -> Self {
        Self::of(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first_day + Duration::days(self.days_in_month() - 1)
    }

    /// The following calendar month, `None` past the last representable date.
    pub fn next(&self) -> Option<Self> {
        self.last_day().succ_opt().map(Self::of)
    }

    /// Compact `YYYYMM` code used inside order, invoice and BOL numbers.
    pub fn code(&self) -> String {
        format!("{}{:02}", self.year(), self.month())
    }

    /// Inclusive list of months from `start` to `end`; empty when `end < start`.
    pub fn range_inclusive(start: YearMonth, end: YearMonth) -> Vec<YearMonth> {
        let mut months = Vec::new();
        let mut cursor = Some(start);
        while let Some(month) = cursor.filter(|month| *month <= end) {
            months.push(month);
            cursor = month.next();
        }
        months
    }

    fn days_in_month(&self) -> i64 {
        match self.month() {
            2 if NaiveDate::from_ymd_opt(self.year(), 2, 29).is_some() => 29,
            2 => 28,
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year(), self.month())
    }
}

/// Inclusive range of dates orders may be placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Window covering a whole calendar month.
    pub fn month(month: YearMonth) -> Self {
        Self {
            start: month.first_day(),
            end: month.last_day(),
        }
    }

    /// Window of `days` days ending on `end` (inclusive). Zero days yields `end` only.
    pub fn trailing_days(end: NaiveDate, days: u32) -> Self {
        let span = i64::from(days.saturating_sub(1));
        Self {
            start: end - Duration::days(span),
            end,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days covered by the window.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Pick a uniformly random date inside the window.
    pub fn random_date<G: Rng + ?Sized>(&self, rng: &mut G) -> NaiveDate {
        let offset = rng.gen_range(0..self.len_days());
        self.start + Duration::days(offset)
    }
}
