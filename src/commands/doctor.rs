// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::budget::SqliteBudgetStore;
use crate::commands::categories::active_registry;
use crate::config::Settings;
use crate::models::parse_amount;
use crate::period::MonthKey;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

/// Problems found in stored settings and budgets, as `(issue, detail)`.
pub fn check(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    let settings = Settings::load(conn)?;
    let registry = active_registry(conn, &settings)?;

    // 1) No expense source configured
    if settings.api_url.is_none() {
        rows.push(vec![
            "no_api_url".into(),
            "views need --input until api_url is set".into(),
        ]);
    }

    // 2) Budget rows the resolver will ignore or zero out
    for (month, category, amount) in SqliteBudgetStore::new(conn).rows(None)? {
        if month.parse::<MonthKey>().is_err() {
            rows.push(vec!["invalid_month".into(), month.clone()]);
        }
        match parse_amount(&amount) {
            None => rows.push(vec![
                "unparseable_budget".into(),
                format!("{} {} = '{}'", month, category, amount),
            ]),
            Some(v) if v.is_sign_negative() && !v.is_zero() => rows.push(vec![
                "negative_budget".into(),
                format!("{} {} = {}", month, category, v),
            ]),
            Some(_) => {}
        }
        if !registry.contains(&registry.normalize(Some(&category))) {
            rows.push(vec![
                "stale_category".into(),
                format!("{} {}", month, category),
            ]);
        }
    }
    Ok(rows)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = check(conn)?;
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
