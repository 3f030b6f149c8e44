// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::budget::{BudgetSource, SqliteBudgetStore};
use crate::commands::source::{ViewContext, view_context};
use crate::dashboard::{BudgetBasis, Dashboard, DashboardInput, build};
use crate::utils::{fmt_money, fmt_percent, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("overview", sub)) => overview(conn, sub)?,
        Some(("categories", sub)) => categories(conn, sub)?,
        Some(("budget", sub)) => budget(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Load the period's expenses and run the dashboard pipeline over them.
pub fn dashboard(conn: &Connection, sub: &clap::ArgMatches) -> Result<(ViewContext, Dashboard)> {
    let ctx = view_context(conn, sub)?;
    let input = DashboardInput {
        expenses: &ctx.expenses,
        navigation: ctx.navigation,
        registry: &ctx.registry,
        today: ctx.today,
    };
    let dash = build(&input, &SqliteBudgetStore::new(conn));
    Ok((ctx, dash))
}

fn overview(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (ctx, dash) = dashboard(conn, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &dash)? {
        return Ok(());
    }
    let ccy = &ctx.settings.currency;
    let previous = match dash.previous_range {
        Some(ref p) => format!("{} ({})", fmt_money(&dash.previous_total, ccy), p),
        None => "-".to_string(),
    };
    let rows = vec![
        vec!["Period".into(), dash.range.to_string()],
        vec!["Expenses".into(), dash.expense_count.to_string()],
        vec!["Total spent".into(), fmt_money(&dash.total_spending, ccy)],
        vec!["Average expense".into(), fmt_money(&dash.average_expense, ccy)],
        vec!["Previous period".into(), previous],
        vec!["Trend".into(), fmt_percent(&dash.trend_percent)],
        vec![
            "Days elapsed".into(),
            format!("{} of {}", dash.days_elapsed, dash.range.days()),
        ],
        vec!["Projected".into(), fmt_money(&dash.projected_spend, ccy)],
        vec![
            "Budget".into(),
            fmt_money(&dash.budget_total.budget, ccy),
        ],
        vec![
            "Budget used".into(),
            fmt_percent(&dash.budget_total.percent_used),
        ],
    ];
    println!("{}", pretty_table(&["", ""], rows));
    for line in dash.over_budget() {
        println!(
            "Over budget: {} by {}",
            line.category,
            fmt_money(&-line.remaining, ccy)
        );
    }
    Ok(())
}

fn categories(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (ctx, dash) = dashboard(conn, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &dash.category_trends)? {
        return Ok(());
    }
    let ccy = &ctx.settings.currency;
    let mut trends = dash.category_trends.clone();
    trends.sort_by(|a, b| b.current.cmp(&a.current));
    let data = trends
        .iter()
        .map(|t| {
            vec![
                ctx.registry.style(&t.category).icon,
                t.category.clone(),
                fmt_money(&t.current, ccy),
                fmt_percent(&t.share_percent),
                fmt_money(&t.previous, ccy),
                fmt_percent(&t.trend_percent),
            ]
        })
        .collect();
    println!("{}", dash.range);
    println!(
        "{}",
        pretty_table(&["", "Category", "Spent", "Share", "Previous", "Trend"], data)
    );
    Ok(())
}

fn budget(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (ctx, dash) = dashboard(conn, sub)?;
    let mut lines = dash.budget_lines.clone();
    lines.push(dash.budget_total.clone());
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &lines)? {
        return Ok(());
    }
    let ccy = &ctx.settings.currency;
    let data = lines
        .iter()
        .map(|l| {
            vec![
                l.category.clone(),
                fmt_money(&l.budget, ccy),
                fmt_money(&l.spent, ccy),
                fmt_money(&l.remaining, ccy),
                fmt_percent(&l.percent_used),
                l.severity.as_str().to_string(),
            ]
        })
        .collect();
    let source = match dash.budget.source {
        BudgetSource::Exact => format!("budget for {}", dash.month),
        BudgetSource::Inherited(from) => format!("budget for {} carried over from {}", dash.month, from),
        BudgetSource::Default => format!("default budget for {}", dash.month),
    };
    let basis = match dash.budget_basis {
        BudgetBasis::WholeMonth => "",
        BudgetBasis::RangeOnly => ", partial month",
    };
    println!("{} ({}{})", dash.range, source, basis);
    println!(
        "{}",
        pretty_table(&["Category", "Budget", "Spent", "Remaining", "Used", "Status"], data)
    );
    Ok(())
}
