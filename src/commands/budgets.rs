// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::budget::{BudgetSource, BudgetStore, JsonBudgetStore, SqliteBudgetStore, resolve_budget};
use crate::commands::categories::active_registry;
use crate::config::Settings;
use crate::period::MonthKey;
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, parse_month, pretty_table};
use anyhow::{Context, Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("import", sub)) => import(conn, sub)?,
        Some(("export", sub)) => export(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = parse_month(sub.get_one::<String>("month").unwrap())?;
    let raw_cat = sub.get_one::<String>("category").unwrap().trim();
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    if amount.is_sign_negative() {
        bail!("Budget amount cannot be negative: {}", amount);
    }
    let settings = Settings::load(conn)?;
    let registry = active_registry(conn, &settings)?;
    let category = registry.normalize(Some(raw_cat));
    if !registry.contains(&category) {
        bail!(
            "Unknown category '{}'; add it first with `spendlens category add --id {}`",
            raw_cat,
            raw_cat
        );
    }
    SqliteBudgetStore::new(conn).set_amount(month, &category, amount)?;
    println!("Budget set for {} / {} = {}", month, category, amount);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = match sub.get_one::<String>("month") {
        Some(m) => Some(parse_month(m)?),
        None => None,
    };
    let rows = SqliteBudgetStore::new(conn).rows(month)?;
    let data = rows.into_iter().map(|(m, c, a)| vec![m, c, a]).collect();
    println!("{}", pretty_table(&["Month", "Category", "Budget"], data));
    Ok(())
}

fn source_label(source: &BudgetSource) -> String {
    match source {
        BudgetSource::Exact => "saved for this month".to_string(),
        BudgetSource::Inherited(from) => format!("carried over from {}", from),
        BudgetSource::Default => "built-in defaults".to_string(),
    }
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = parse_month(sub.get_one::<String>("month").unwrap())?;
    let settings = Settings::load(conn)?;
    let registry = active_registry(conn, &settings)?;
    let resolved = resolve_budget(&SqliteBudgetStore::new(conn), month, &registry);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &resolved)? {
        return Ok(());
    }
    let mut data: Vec<Vec<String>> = resolved
        .amounts
        .iter()
        .map(|a| vec![a.category.clone(), fmt_money(&a.amount, &settings.currency)])
        .collect();
    data.push(vec![
        "Total".into(),
        fmt_money(&resolved.total(), &settings.currency),
    ]);
    println!("Budget for {} ({})", month, source_label(&resolved.source));
    println!("{}", pretty_table(&["Category", "Budget"], data));
    Ok(())
}

fn import(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    let file = JsonBudgetStore::new(path);
    let all = file
        .load()
        .with_context(|| format!("Read budgets from {}", path))?;
    let mut store = SqliteBudgetStore::new(conn);
    let mut imported = 0;
    for (key, record) in all {
        let Ok(month) = key.parse::<MonthKey>() else {
            tracing::warn!(key = %key, "skipping entry with invalid month key");
            continue;
        };
        store.set(month, &record)?;
        imported += 1;
    }
    println!("Imported budgets for {} month(s) from {}", imported, path);
    Ok(())
}

fn export(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    let store = SqliteBudgetStore::new(conn);
    let mut file = JsonBudgetStore::new(path);
    let months = store.months()?;
    for month in &months {
        if let Some(record) = store.get(*month)? {
            file.set(*month, &record)
                .with_context(|| format!("Write budgets to {}", path))?;
        }
    }
    println!("Exported budgets for {} month(s) to {}", months.len(), path);
    Ok(())
}
