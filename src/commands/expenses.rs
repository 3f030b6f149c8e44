// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::source::{api_client, view_context};
use crate::config::Settings;
use crate::filter::filter_by_range;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let ctx = view_context(conn, sub)?;
            let range = ctx.navigation.resolve();
            let wanted = sub
                .get_one::<String>("category")
                .map(|c| ctx.registry.normalize(Some(c)));
            let mut shown: Vec<_> = filter_by_range(&ctx.expenses, &range)
                .into_iter()
                .filter(|e| match wanted {
                    Some(ref cat) => {
                        ctx.registry.normalize(e.category.as_deref()) == *cat
                            || e.line_items()
                                .iter()
                                .any(|i| ctx.registry.normalize(i.category.as_deref()) == *cat)
                    }
                    None => true,
                })
                .collect();
            shown.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &shown)? {
                return Ok(());
            }
            let ccy = &ctx.settings.currency;
            let data = shown
                .iter()
                .map(|e| {
                    vec![
                        e.date.clone().unwrap_or_default(),
                        e.id.clone(),
                        e.merchant_name.clone().unwrap_or_default(),
                        ctx.registry.normalize(e.category.as_deref()),
                        e.line_items().len().to_string(),
                        fmt_money(&e.resolved_total(), e.currency.as_deref().unwrap_or(ccy.as_str())),
                    ]
                })
                .collect();
            println!("{}", range);
            println!(
                "{}",
                pretty_table(&["Date", "ID", "Merchant", "Category", "Items", "Total"], data)
            );
        }
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap().trim();
            let api = api_client(&Settings::load(conn)?)?;
            match sub.get_one::<usize>("item") {
                Some(&index) => {
                    api.delete_item(id, index)
                        .with_context(|| format!("Delete item {} of expense {}", index, id))?;
                    println!("Deleted item {} of expense {}", index, id);
                }
                None => {
                    api.delete_expense(id)
                        .with_context(|| format!("Delete expense {}", id))?;
                    println!("Deleted expense {}", id);
                }
            }
        }
        _ => {}
    }
    Ok(())
}
