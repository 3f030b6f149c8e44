// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::reports::dashboard;
use anyhow::{Result, bail};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("totals", sub)) => export_totals(conn, sub),
        _ => Ok(()),
    }
}

fn export_totals(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    let (_, dash) = dashboard(conn, sub)?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "category",
                "amount",
                "previous",
                "trend_percent",
                "share_percent",
                "budget",
            ])?;
            for t in &dash.category_trends {
                wtr.write_record([
                    t.category.clone(),
                    t.current.round_dp(2).to_string(),
                    t.previous.round_dp(2).to_string(),
                    t.trend_percent.round_dp(1).to_string(),
                    t.share_percent.round_dp(1).to_string(),
                    dash.budget.get(&t.category).round_dp(2).to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            let items: Vec<_> = dash
                .category_trends
                .iter()
                .map(|t| {
                    json!({
                        "category": t.category,
                        "amount": t.current,
                        "previous": t.previous,
                        "trendPercent": t.trend_percent,
                        "sharePercent": t.share_percent,
                        "budget": dash.budget.get(&t.category),
                    })
                })
                .collect();
            let doc = json!({
                "startDate": dash.range.start_key(),
                "endDate": dash.range.end_key(),
                "totalSpending": dash.total_spending,
                "categories": items,
            });
            std::fs::write(out, serde_json::to_string_pretty(&doc)?)?;
        }
    }
    println!("Exported category totals for {} to {}", dash.range, out);
    Ok(())
}
