// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use spendlens::metrics::{
    BudgetLine, Severity, is_over_budget, percent_used, projected_spend, raw_percent, remaining,
    trend_percent,
};
use spendlens::period::DateRange;

fn dec(n: i64) -> Decimal {
    Decimal::from(n)
}

#[test]
fn percent_used_is_capped_and_zero_safe() {
    assert_eq!(percent_used(dec(50), dec(200)), dec(25));
    assert_eq!(percent_used(dec(300), dec(200)), dec(100));
    assert_eq!(raw_percent(dec(300), dec(200)), dec(150));
    assert_eq!(percent_used(dec(300), Decimal::ZERO), Decimal::ZERO);
    assert_eq!(percent_used(dec(300), dec(-10)), Decimal::ZERO);
}

#[test]
fn overage_sign_matches_uncapped_ratio() {
    for (budget, spent) in [(100, 50), (100, 100), (100, 101), (40, 400), (1, 0)] {
        let (b, s) = (dec(budget), dec(spent));
        assert_eq!(
            remaining(b, s) < Decimal::ZERO,
            raw_percent(s, b) > dec(100),
            "budget {} spent {}",
            budget,
            spent
        );
        assert_eq!(is_over_budget(s, b), remaining(b, s) < Decimal::ZERO);
    }
}

#[test]
fn trend_against_previous_period() {
    assert_eq!(trend_percent(dec(150), dec(100)), dec(50));
    assert_eq!(trend_percent(dec(50), dec(100)), dec(-50));
    assert_eq!(trend_percent(dec(50), Decimal::ZERO), Decimal::ZERO);
}

#[test]
fn severity_thresholds() {
    assert_eq!(Severity::from_percent(dec(79)), Severity::Normal);
    assert_eq!(Severity::from_percent(dec(80)), Severity::Warning);
    assert_eq!(Severity::from_percent(dec(100)), Severity::Critical);
}

#[test]
fn zero_budget_with_spending_is_over() {
    let line = BudgetLine::new("Health", Decimal::ZERO, dec(12));
    assert!(line.over_budget);
    assert_eq!(line.percent_used, Decimal::ZERO);
    assert_eq!(line.remaining, dec(-12));
    assert_eq!(line.severity, Severity::Critical);

    let idle = BudgetLine::new("Health", Decimal::ZERO, Decimal::ZERO);
    assert!(!idle.over_budget);
    assert_eq!(idle.severity, Severity::Normal);
}

#[test]
fn budget_line_reports_overage_beyond_cap() {
    let line = BudgetLine::new("Food", dec(200), dec(260));
    assert_eq!(line.percent_used, dec(100));
    assert_eq!(line.raw_percent, dec(130));
    assert_eq!(line.remaining, dec(-60));
    assert!(line.over_budget);
}

#[test]
fn single_day_projection_equals_actual_spend() {
    let range = DateRange::parse("2024-04-10", "2024-04-10").unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 4, 15).unwrap();
    assert_eq!(projected_spend(dec(42), &range, today), dec(42));
}

#[test]
fn month_projection_extrapolates_linearly() {
    let range = DateRange::parse("2024-04-01", "2024-04-30").unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 4, 10).unwrap();
    assert_eq!(projected_spend(dec(100), &range, today), dec(300));

    // a finished range projects to what was spent
    let later = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
    assert_eq!(projected_spend(dec(100), &range, later), dec(100));
}

#[test]
fn projection_before_range_starts_counts_one_day() {
    let range = DateRange::parse("2024-04-01", "2024-04-30").unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    assert_eq!(projected_spend(dec(10), &range, today), dec(300));
    assert_eq!(projected_spend(Decimal::ZERO, &range, today), Decimal::ZERO);
}
