// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{DetailedItem, Expense};
use crate::period::{DateRange, parse_local_date};

/// Anything carrying a `YYYY-MM-DD` date string.
pub trait Dated {
    fn date_str(&self) -> Option<&str>;
}

impl Dated for Expense {
    fn date_str(&self) -> Option<&str> {
        self.date.as_deref()
    }
}

impl Dated for DetailedItem {
    fn date_str(&self) -> Option<&str> {
        self.date.as_deref()
    }
}

impl<T: Dated + ?Sized> Dated for &T {
    fn date_str(&self) -> Option<&str> {
        (**self).date_str()
    }
}

/// Records dated within `range`, both ends included.
///
/// Dates are compared as zero-padded strings. Records with a missing,
/// malformed or impossible date (`2024-02-30`) are left out.
pub fn filter_by_range<'a, T: Dated>(records: &'a [T], range: &DateRange) -> Vec<&'a T> {
    let start = range.start_key();
    let end = range.end_key();
    records
        .iter()
        .filter(|r| in_range(r.date_str(), &start, &end))
        .collect()
}

fn in_range(date: Option<&str>, start: &str, end: &str) -> bool {
    match date.map(str::trim) {
        Some(d) if parse_local_date(d).is_some() => start <= d && d <= end,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::in_range;

    #[test]
    fn bounds_are_inclusive() {
        assert!(in_range(Some("2024-01-01"), "2024-01-01", "2024-01-31"));
        assert!(in_range(Some("2024-01-31"), "2024-01-01", "2024-01-31"));
        assert!(!in_range(Some("2024-02-01"), "2024-01-01", "2024-01-31"));
    }

    #[test]
    fn unpadded_dates_are_skipped() {
        assert!(!in_range(Some("2024-1-5"), "2024-01-01", "2024-01-31"));
        assert!(!in_range(Some(""), "2024-01-01", "2024-01-31"));
        assert!(!in_range(None, "2024-01-01", "2024-01-31"));
    }

    #[test]
    fn impossible_dates_are_skipped() {
        assert!(!in_range(Some("2024-02-30"), "2024-02-01", "2024-03-31"));
        assert!(!in_range(Some("2024-13-01"), "2024-12-01", "2025-01-31"));
    }
}
