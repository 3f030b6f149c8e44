// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;
use spendlens::budget::{BudgetSource, BudgetStore, MemoryBudgetStore};
use spendlens::categories::CategoryRegistry;
use spendlens::dashboard::{BudgetBasis, DashboardInput, build, required_range};
use spendlens::metrics::Severity;
use spendlens::models::Expense;
use spendlens::period::{DateRange, Navigation};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn dec(n: i64) -> Decimal {
    Decimal::from(n)
}

fn sample() -> Vec<Expense> {
    serde_json::from_value(json!([
        {"id": "p1", "date": "2024-02-10", "totalAmount": 100, "category": "Food"},
        {"id": "p2", "date": "2024-02-20", "totalAmount": 40, "category": "Transport"},
        {"id": "c1", "date": "2024-03-02", "totalAmount": 90, "category": "Food"},
        {"id": "c2", "date": "2024-03-05", "totalAmount": 60, "category": "food"},
        {"id": "c3", "date": "2024-03-09", "items": [
            {"category": "Bills", "totalPrice": 120},
            {"category": "Transport", "totalPrice": 30}
        ]},
        {"id": "bad", "date": "March 3", "totalAmount": 999, "category": "Food"}
    ]))
    .unwrap()
}

#[test]
fn month_view_compares_against_previous_month_and_budget() {
    let expenses = sample();
    let registry = CategoryRegistry::basic();
    let mut store = MemoryBudgetStore::new();
    store
        .set(
            "2024-01".parse().unwrap(),
            &serde_json::from_value(json!({"Food": 120, "Bills": 500, "Transport": 100}))
                .unwrap(),
        )
        .unwrap();

    let input = DashboardInput {
        expenses: &expenses,
        navigation: Navigation::Month(d(2024, 3, 1)),
        registry: &registry,
        today: d(2024, 3, 10),
    };
    let dash = build(&input, &store);

    assert_eq!(dash.range.start_key(), "2024-03-01");
    assert!(dash.full_month);
    assert_eq!(dash.budget_basis, BudgetBasis::WholeMonth);
    assert_eq!(dash.expense_count, 3);
    assert_eq!(dash.total_spending, dec(300));
    assert_eq!(dash.average_expense, dec(100));
    assert_eq!(dash.category_totals.get("Food"), dec(150));

    // previous period is the 31 days before March
    let prev = dash.previous_range.unwrap();
    assert_eq!(prev.start_key(), "2024-01-30");
    assert_eq!(prev.end_key(), "2024-02-29");
    assert_eq!(dash.previous_total, dec(140));
    assert_eq!(dash.previous_totals.get("Food"), dec(100));

    let food = dash
        .category_trends
        .iter()
        .find(|t| t.category == "Food")
        .unwrap();
    assert_eq!(food.trend_percent, dec(50));
    assert_eq!(food.share_percent, dec(50));

    assert_eq!(dash.budget.source, BudgetSource::Inherited("2024-01".parse().unwrap()));
    let over: Vec<&str> = dash.over_budget().iter().map(|l| l.category.as_str()).collect();
    assert_eq!(over, vec!["Food"]);
    let bills = dash.budget_lines.iter().find(|l| l.category == "Bills").unwrap();
    assert_eq!(bills.remaining, dec(380));
    assert_eq!(bills.severity, Severity::Normal);
    let transport = dash.budget_lines.iter().find(|l| l.category == "Transport").unwrap();
    assert_eq!(transport.percent_used, dec(30));

    assert_eq!(dash.budget_total.budget, dec(720));
    assert_eq!(dash.budget_total.spent, dec(300));

    assert_eq!(dash.days_elapsed, 10);
    assert_eq!(dash.projected_spend, dec(930));
}

#[test]
fn partial_range_uses_budget_of_start_month() {
    let expenses = sample();
    let registry = CategoryRegistry::basic();
    let store = MemoryBudgetStore::new();
    let input = DashboardInput {
        expenses: &expenses,
        navigation: Navigation::Custom(DateRange::parse("2024-02-15", "2024-03-04").unwrap()),
        registry: &registry,
        today: d(2024, 6, 1),
    };
    let dash = build(&input, &store);
    assert!(!dash.full_month);
    assert_eq!(dash.budget_basis, BudgetBasis::RangeOnly);
    assert_eq!(dash.month.to_string(), "2024-02");
    assert_eq!(dash.budget.source, BudgetSource::Default);
    assert_eq!(dash.total_spending, dec(130));
    assert_eq!(dash.projected_spend, dec(130));
}

#[test]
fn empty_period_has_zero_figures() {
    let registry = CategoryRegistry::extended();
    let store = MemoryBudgetStore::new();
    let input = DashboardInput {
        expenses: &[],
        navigation: Navigation::Day(d(2024, 4, 10)),
        registry: &registry,
        today: d(2024, 4, 15),
    };
    let dash = build(&input, &store);
    assert_eq!(dash.total_spending, Decimal::ZERO);
    assert_eq!(dash.average_expense, Decimal::ZERO);
    assert_eq!(dash.trend_percent, Decimal::ZERO);
    assert_eq!(dash.category_totals.len(), 7);
    assert!(dash.over_budget().is_empty());
}

#[test]
fn required_range_spans_previous_period() {
    let r = required_range(&Navigation::Week(d(2024, 4, 10)));
    assert_eq!(r.start_key(), "2024-03-31");
    assert_eq!(r.end_key(), "2024-04-13");
}

#[test]
fn oversized_amounts_saturate_instead_of_failing() {
    let expenses: Vec<Expense> = serde_json::from_value(json!([
        {"id": "1", "date": "2024-03-02", "totalAmount": "70000000000000000000000000000", "category": "Food"},
        {"id": "2", "date": "2024-03-03", "totalAmount": "70000000000000000000000000000", "category": "Bills"}
    ]))
    .unwrap();
    let registry = CategoryRegistry::basic();
    let input = DashboardInput {
        expenses: &expenses,
        navigation: Navigation::Month(d(2024, 3, 1)),
        registry: &registry,
        today: d(2024, 3, 31),
    };
    let dash = build(&input, &MemoryBudgetStore::new());
    assert_eq!(dash.total_spending, Decimal::MAX);
    assert_eq!(dash.category_totals.total(), Decimal::MAX);
    assert!(dash.budget_total.over_budget);
}
