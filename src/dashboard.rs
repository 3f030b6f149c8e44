// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The one derivation pass every report runs: resolve the range, filter,
//! aggregate, look up the budget, and derive comparison figures.

use crate::aggregate::{CategoryTotals, aggregate, resolved_sum};
use crate::budget::{BudgetStore, ResolvedBudget, resolve_budget};
use crate::categories::CategoryRegistry;
use crate::filter::filter_by_range;
use crate::metrics::{self, BudgetLine};
use crate::models::Expense;
use crate::period::{DateRange, MonthKey, Navigation};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

pub struct DashboardInput<'a> {
    pub expenses: &'a [Expense],
    pub navigation: Navigation,
    pub registry: &'a CategoryRegistry,
    pub today: NaiveDate,
}

/// What the budget comparison is measured over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetBasis {
    /// The range is exactly one calendar month.
    WholeMonth,
    /// Any other range, compared against the budget of the month it starts in.
    RangeOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTrend {
    pub category: String,
    pub current: Decimal,
    pub previous: Decimal,
    pub trend_percent: Decimal,
    /// Share of the range's total spending.
    pub share_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub range: DateRange,
    pub previous_range: Option<DateRange>,
    pub month: MonthKey,
    pub full_month: bool,
    pub budget_basis: BudgetBasis,
    pub expense_count: usize,
    pub total_spending: Decimal,
    pub average_expense: Decimal,
    pub previous_total: Decimal,
    pub trend_percent: Decimal,
    pub days_elapsed: i64,
    pub projected_spend: Decimal,
    pub category_totals: CategoryTotals,
    pub previous_totals: CategoryTotals,
    pub category_trends: Vec<CategoryTrend>,
    pub budget: ResolvedBudget,
    pub budget_lines: Vec<BudgetLine>,
    pub budget_total: BudgetLine,
}

impl Dashboard {
    /// Categories over budget, worst first.
    pub fn over_budget(&self) -> Vec<&BudgetLine> {
        let mut lines: Vec<&BudgetLine> =
            self.budget_lines.iter().filter(|l| l.over_budget).collect();
        lines.sort_by(|a, b| a.remaining.cmp(&b.remaining));
        lines
    }
}

/// The date range that must be loaded for [`build`] to see everything it
/// needs: the selected range plus the period before it.
pub fn required_range(navigation: &Navigation) -> DateRange {
    let range = navigation.resolve();
    match range.previous_period() {
        Some(prev) => range.span(&prev),
        None => range,
    }
}

pub fn build<S>(input: &DashboardInput<'_>, store: &S) -> Dashboard
where
    S: BudgetStore + ?Sized,
{
    let registry = input.registry;
    let range = input.navigation.resolve();
    let previous_range = range.previous_period();

    let current = filter_by_range(input.expenses, &range);
    let previous = match previous_range {
        Some(ref p) => filter_by_range(input.expenses, p),
        None => Vec::new(),
    };

    let category_totals = aggregate(&current, registry);
    let previous_totals = aggregate(&previous, registry);
    let total_spending = resolved_sum(&current);
    let previous_total = resolved_sum(&previous);

    let expense_count = current.len();
    let average_expense = if expense_count == 0 {
        Decimal::ZERO
    } else {
        total_spending / Decimal::from(expense_count)
    };

    let full_month = range.is_full_month();
    let budget_basis = if full_month {
        BudgetBasis::WholeMonth
    } else {
        BudgetBasis::RangeOnly
    };
    let month = range.month();
    let budget = resolve_budget(store, month, registry);

    let category_trends = category_totals
        .entries()
        .iter()
        .map(|t| {
            let prev = previous_totals.get(&t.category);
            CategoryTrend {
                category: t.category.clone(),
                current: t.amount,
                previous: prev,
                trend_percent: metrics::trend_percent(t.amount, prev),
                share_percent: metrics::raw_percent(t.amount, total_spending),
            }
        })
        .collect();

    let budget_lines: Vec<BudgetLine> = budget
        .amounts
        .iter()
        .map(|b| BudgetLine::new(&b.category, b.amount, category_totals.get(&b.category)))
        .collect();
    let budget_total = BudgetLine::new("Total", budget.total(), total_spending);

    tracing::debug!(
        %range,
        expenses = expense_count,
        total = %total_spending,
        budget_source = ?budget.source,
        "dashboard derived"
    );

    Dashboard {
        range,
        previous_range,
        month,
        full_month,
        budget_basis,
        expense_count,
        total_spending,
        average_expense,
        previous_total,
        trend_percent: metrics::trend_percent(total_spending, previous_total),
        days_elapsed: range.days_elapsed(input.today),
        projected_spend: metrics::projected_spend(total_spending, &range, input.today),
        category_totals,
        previous_totals,
        category_trends,
        budget,
        budget_lines,
        budget_total,
    }
}
