// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Date range resolution.
//!
//! Dates are calendar dates with no time zone attached. Everything here is
//! built from year/month/day components so a date never shifts across a day
//! boundary on its way through the pipeline.

use crate::error::{Error, Result};
use chrono::{Datelike, Days, Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static DATE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));
static MONTH_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}$").expect("valid month regex"));

/// Returns true when `s` is a zero-padded `YYYY-MM-DD` string. Only strings
/// of this shape can be compared lexically as dates.
pub fn is_date_shaped(s: &str) -> bool {
    DATE_SHAPE.is_match(s)
}

/// Parse a `YYYY-MM-DD` string as a local calendar date.
///
/// Returns `None` for anything that is not exactly that shape or that names
/// a day that does not exist (`2023-02-29`).
pub fn parse_local_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if !is_date_shaped(s) {
        return None;
    }
    let y: i32 = s[0..4].parse().ok()?;
    let m: u32 = s[5..7].parse().ok()?;
    let d: u32 = s[8..10].parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

pub fn format_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// A calendar month, displayed as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Years are limited to 1..=9999 so the key always has four digits.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if !(1..=9999).contains(&year) || !(1..=12).contains(&month) {
            return None;
        }
        Some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The month before this one. January rolls back to December of the
    /// previous year; there is nothing before `0001-01`.
    pub fn previous(&self) -> Option<Self> {
        if self.month == 1 {
            Self::new(self.year - 1, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }

    pub fn next(&self) -> Option<Self> {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        let first = self.first_day();
        first
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .unwrap_or(first)
    }

    pub fn days(&self) -> i64 {
        (self.last_day() - self.first_day()).num_days() + 1
    }

    pub fn range(&self) -> DateRange {
        DateRange {
            start_date: self.first_day(),
            end_date: self.last_day(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let t = s.trim();
        if !MONTH_SHAPE.is_match(t) {
            return Err(Error::InvalidMonth(s.to_string()));
        }
        let year: i32 = t[0..4]
            .parse()
            .map_err(|_| Error::InvalidMonth(s.to_string()))?;
        let month: u32 = t[5..7]
            .parse()
            .map_err(|_| Error::InvalidMonth(s.to_string()))?;
        Self::new(year, month).ok_or_else(|| Error::InvalidMonth(s.to_string()))
    }
}

impl TryFrom<String> for MonthKey {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<MonthKey> for String {
    fn from(k: MonthKey) -> String {
        k.to_string()
    }
}

/// Month key of a `YYYY-MM-DD` date string.
pub fn month_key(date: &str) -> Option<MonthKey> {
    parse_local_date(date).map(MonthKey::of)
}

/// String form of [`MonthKey::previous`].
pub fn previous_month_key(key: &str) -> Option<String> {
    key.parse::<MonthKey>()
        .ok()
        .and_then(|k| k.previous())
        .map(|k| k.to_string())
}

/// An inclusive range of calendar dates. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidRange {
                start: format_date(start),
                end: format_date(end),
            });
        }
        Ok(Self {
            start_date: start,
            end_date: end,
        })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let s = parse_local_date(start).ok_or_else(|| Error::InvalidDate(start.to_string()))?;
        let e = parse_local_date(end).ok_or_else(|| Error::InvalidDate(end.to_string()))?;
        Self::new(s, e)
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Self {
            start_date: day,
            end_date: day,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end(&self) -> NaiveDate {
        self.end_date
    }

    pub fn start_key(&self) -> String {
        format_date(self.start_date)
    }

    pub fn end_key(&self) -> String {
        format_date(self.end_date)
    }

    /// Number of days in the range, both ends included.
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }

    /// The month the range starts in.
    pub fn month(&self) -> MonthKey {
        MonthKey::of(self.start_date)
    }

    /// True when the range is exactly the first through last day of the
    /// month containing its start.
    pub fn is_full_month(&self) -> bool {
        self.month().range() == *self
    }

    /// The range of the same length ending the day before this one starts.
    pub fn previous_period(&self) -> Option<Self> {
        let end = self.start_date.pred_opt()?;
        let span = (self.end_date - self.start_date).num_days() as u64;
        let start = end.checked_sub_days(Days::new(span))?;
        Some(Self {
            start_date: start,
            end_date: end,
        })
    }

    /// Smallest range covering both `self` and `other`.
    pub fn span(&self, other: &DateRange) -> Self {
        Self {
            start_date: self.start_date.min(other.start_date),
            end_date: self.end_date.max(other.end_date),
        }
    }

    /// Days elapsed up to and including `today`, with `today` clamped into
    /// the range. Never less than 1 and never more than [`DateRange::days`].
    pub fn days_elapsed(&self, today: NaiveDate) -> i64 {
        let clamped = today.clamp(self.start_date, self.end_date);
        (clamped - self.start_date).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start_key(), self.end_key())
    }
}

/// What the user has navigated to on a dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Month(NaiveDate),
    Week(NaiveDate),
    Day(NaiveDate),
    Custom(DateRange),
}

impl Navigation {
    pub fn resolve(&self) -> DateRange {
        match *self {
            Navigation::Month(anchor) => MonthKey::of(anchor).range(),
            Navigation::Week(anchor) => week_of(anchor),
            Navigation::Day(anchor) => DateRange::single_day(anchor),
            Navigation::Custom(range) => range,
        }
    }

    /// Move `steps` periods forward (or back when negative), the way the
    /// dashboard's previous/next arrows do.
    pub fn shift(&self, steps: i32) -> Navigation {
        if steps == 0 {
            return *self;
        }
        match *self {
            Navigation::Month(anchor) => {
                let first = MonthKey::of(anchor).first_day();
                let months = Months::new(steps.unsigned_abs());
                let moved = if steps > 0 {
                    first.checked_add_months(months)
                } else {
                    first.checked_sub_months(months)
                };
                Navigation::Month(moved.unwrap_or(first))
            }
            Navigation::Week(anchor) => Navigation::Week(shift_days(anchor, i64::from(steps) * 7)),
            Navigation::Day(anchor) => Navigation::Day(shift_days(anchor, i64::from(steps))),
            Navigation::Custom(range) => {
                let by = range.days() * i64::from(steps);
                Navigation::Custom(DateRange {
                    start_date: shift_days(range.start_date, by),
                    end_date: shift_days(range.end_date, by),
                })
            }
        }
    }
}

/// Sunday through Saturday containing `anchor`.
fn week_of(anchor: NaiveDate) -> DateRange {
    let back = u64::from(anchor.weekday().num_days_from_sunday());
    let start = anchor.checked_sub_days(Days::new(back)).unwrap_or(anchor);
    let end = start.checked_add_days(Days::new(6)).unwrap_or(start);
    DateRange {
        start_date: start,
        end_date: end,
    }
}

fn shift_days(d: NaiveDate, by: i64) -> NaiveDate {
    let moved = if by >= 0 {
        d.checked_add_days(Days::new(by as u64))
    } else {
        d.checked_sub_days(Days::new(by.unsigned_abs()))
    };
    moved.unwrap_or(d)
}
