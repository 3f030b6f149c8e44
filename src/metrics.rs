// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Figures derived from spending and budget totals. Every division here is
//! guarded: a zero denominator gives zero.

use crate::period::DateRange;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Percent used at which a budget is flagged as a warning.
pub const WARNING_PERCENT: i64 = 80;
/// Percent used at which a budget is flagged as critical.
pub const CRITICAL_PERCENT: i64 = 100;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

fn ratio_percent(num: Decimal, den: Decimal) -> Decimal {
    num.checked_div(den)
        .and_then(|r| r.checked_mul(HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

/// Uncapped `spent / budget * 100`. Zero when the budget is not positive.
pub fn raw_percent(spent: Decimal, budget: Decimal) -> Decimal {
    if budget <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    ratio_percent(spent, budget)
}

/// Percent used for display, capped at 100.
pub fn percent_used(spent: Decimal, budget: Decimal) -> Decimal {
    raw_percent(spent, budget).min(HUNDRED)
}

/// Budget left; negative means over budget.
pub fn remaining(budget: Decimal, spent: Decimal) -> Decimal {
    budget - spent
}

pub fn is_over_budget(spent: Decimal, budget: Decimal) -> bool {
    remaining(budget, spent) < Decimal::ZERO
}

/// Change from `previous` to `current` in percent. Zero when there is no
/// previous spending to compare with.
pub fn trend_percent(current: Decimal, previous: Decimal) -> Decimal {
    if previous.is_zero() {
        return Decimal::ZERO;
    }
    ratio_percent(current - previous, previous)
}

/// Linear projection of spending to the end of `range`.
///
/// `today` is clamped into the range, so a past range projects to what was
/// actually spent and a future one extrapolates from its first day.
pub fn projected_spend(spent: Decimal, range: &DateRange, today: NaiveDate) -> Decimal {
    let elapsed = range.days_elapsed(today).max(1);
    if elapsed >= range.days() {
        return spent;
    }
    let elapsed = Decimal::from(elapsed);
    let total = Decimal::from(range.days());
    spent
        .checked_div(elapsed)
        .and_then(|per_day| per_day.checked_mul(total))
        .unwrap_or(spent)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

impl Severity {
    pub fn from_percent(percent: Decimal) -> Self {
        if percent >= Decimal::from(CRITICAL_PERCENT) {
            Severity::Critical
        } else if percent >= Decimal::from(WARNING_PERCENT) {
            Severity::Warning
        } else {
            Severity::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Normal => "normal",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

/// One category's spending against its budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetLine {
    pub category: String,
    pub budget: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    pub percent_used: Decimal,
    pub raw_percent: Decimal,
    pub over_budget: bool,
    pub severity: Severity,
}

impl BudgetLine {
    pub fn new(category: &str, budget: Decimal, spent: Decimal) -> Self {
        let used = percent_used(spent, budget);
        let over_budget = is_over_budget(spent, budget);
        // a zero budget reads 0% used, but any spending still overruns it
        let severity = if over_budget {
            Severity::Critical
        } else {
            Severity::from_percent(used)
        };
        Self {
            category: category.to_string(),
            budget,
            spent,
            remaining: remaining(budget, spent),
            percent_used: used,
            raw_percent: raw_percent(spent, budget),
            over_budget,
            severity,
        }
    }
}
