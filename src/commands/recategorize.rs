// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::categories::active_registry;
use crate::commands::source::{api_client, load_expenses, navigation, today};
use crate::config::Settings;
use crate::filter::filter_by_range;
use crate::models::Expense;
use crate::period::DateRange;
use crate::recategorize::{Board, DropOutcome, ItemRef, Slot};
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::{Result, anyhow, bail};
use rusqlite::Connection;

fn in_range(settings: &Settings, sub: &clap::ArgMatches, range: &DateRange) -> Result<Vec<Expense>> {
    let all = load_expenses(settings, sub, range)?;
    Ok(filter_by_range(&all, range).into_iter().cloned().collect())
}

fn find_slot(board: &Board, item: &ItemRef) -> Option<Slot> {
    board.groups().iter().find_map(|g| {
        g.entries
            .iter()
            .position(|e| e.item == *item)
            .map(|i| Slot::new(&g.category, i))
    })
}

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = Settings::load(conn)?;
    let registry = active_registry(conn, &settings)?;
    let range = navigation(sub, today(sub)?)?.resolve();
    let api = api_client(&settings)?;

    let expenses = in_range(&settings, sub, &range)?;
    let mut board = Board::from_expenses(&expenses, registry.clone());

    let item = ItemRef {
        expense_id: sub.get_one::<String>("expense").unwrap().trim().to_string(),
        item_index: sub.get_one::<usize>("item").copied(),
    };
    let from = find_slot(&board, &item).ok_or_else(|| match item.item_index {
        Some(i) => anyhow!("Item {} of expense {} not found in {}", i, item.expense_id, range),
        None => anyhow!("Expense {} not found in {}", item.expense_id, range),
    })?;

    let into = registry.normalize(sub.get_one::<String>("into").map(String::as_str));
    let Some(target) = board.group(&into) else {
        bail!("Unknown category '{}'", into);
    };
    let position = sub
        .get_one::<usize>("position")
        .copied()
        .unwrap_or(target.entries.len());
    let to = Slot::new(&into, position);

    match board.move_item(&api, &from, Some(&to)) {
        DropOutcome::Ignored => println!("Nothing to move"),
        DropOutcome::Reordered => println!("Reordered within {}", into),
        DropOutcome::Pending(_) => {
            if let Some(message) = board.error() {
                bail!("{}", message);
            }
            println!("Moved to {}", into);
        }
    }

    if board.take_refresh_request() {
        let token = board.begin_refresh();
        let fresh = in_range(&settings, sub, &range)?;
        board.apply_refresh(token, &fresh);
    }

    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &board.groups())? {
        return Ok(());
    }
    let ccy = &settings.currency;
    let data = board
        .groups()
        .iter()
        .filter(|g| !g.entries.is_empty())
        .map(|g| {
            let names: Vec<&str> = g.entries.iter().map(|e| e.description.as_str()).collect();
            vec![
                g.category.clone(),
                g.entries.len().to_string(),
                fmt_money(&g.total(), ccy),
                names.join(", "),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Category", "Items", "Total", "Entries"], data)
    );
    Ok(())
}
