// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Reading expenses from files.
//!
//! JSON input may be a bare array of expenses, an object with an
//! `expenses` array, or a saved summary response with `detailedItems`.
//! CSV input has the columns `id,date,merchant,amount,currency,category`
//! and no line items.

use crate::models::{Expense, ExpenseSummary, parse_amount};
use anyhow::{Context, Result, bail};
use csv::ReaderBuilder;
use serde_json::Value;
use std::fs;
use std::io::Read;
use std::path::Path;

pub fn read_expenses_file(path: &str) -> Result<Vec<Expense>> {
    let is_csv = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        let file = fs::File::open(path).with_context(|| format!("Open CSV {}", path))?;
        read_expenses_csv(file)
    } else {
        let text = fs::read_to_string(path).with_context(|| format!("Open JSON {}", path))?;
        read_expenses_json(&text)
    }
}

pub fn read_expenses_json(text: &str) -> Result<Vec<Expense>> {
    let v: Value = serde_json::from_str(text).context("Expenses file is not valid JSON")?;
    if v.is_array() {
        return Ok(serde_json::from_value(v)?);
    }
    if let Some(list) = v.get("expenses").filter(|l| l.is_array()) {
        return Ok(serde_json::from_value(list.clone())?);
    }
    if v.get("detailedItems").is_some() {
        let summary: ExpenseSummary = serde_json::from_value(v)?;
        return Ok(summary.into_expenses());
    }
    bail!("Expected an array of expenses, an {{\"expenses\": [...]}} object or a summary")
}

/// Malformed dates and amounts are kept as they are; the pipeline skips
/// them later instead of failing the whole import.
pub fn read_expenses_csv<R: Read>(input: R) -> Result<Vec<Expense>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let mut out = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let rec = result.with_context(|| format!("CSV record {}", line + 1))?;
        let field = |i: usize| {
            rec.get(i)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let id = field(0).unwrap_or_else(|| format!("row-{}", line + 1));
        let amount_raw = field(3);
        let total_amount = amount_raw.as_deref().and_then(parse_amount);
        if amount_raw.is_some() && total_amount.is_none() {
            tracing::debug!(%id, amount = ?amount_raw, "unreadable amount in CSV row");
        }
        out.push(Expense {
            id,
            date: field(1),
            merchant_name: field(2),
            total_amount,
            currency: field(4),
            category: field(5),
            items: None,
        });
    }
    Ok(out)
}
