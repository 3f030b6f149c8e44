// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monthly budgets: where they are stored and how the effective budget for
//! a month is found.

use crate::categories::CategoryRegistry;
use crate::error::Result;
use crate::models::{coerce_amount, sum_amounts};
use crate::period::MonthKey;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// How far back [`resolve_budget`] looks for an earlier month's budget.
pub const LOOKBACK_MONTHS: u32 = 24;

/// Built-in monthly limits used when nothing has been saved nearby.
pub const DEFAULT_BUDGETS: [(&str, i64); 7] = [
    ("Food", 500),
    ("Transport", 200),
    ("Shopping", 300),
    ("Bills", 800),
    ("Entertainment", 150),
    ("Health", 100),
    ("Other", 200),
];

/// A month's budget as persisted: category id to amount. Values may have
/// been saved as numbers or as strings.
pub type BudgetRecord = BTreeMap<String, Value>;

/// Storage for per-month budget records.
pub trait BudgetStore {
    fn get(&self, month: MonthKey) -> Result<Option<BudgetRecord>>;
    fn set(&mut self, month: MonthKey, record: &BudgetRecord) -> Result<()>;
    /// Months with a saved record, oldest first.
    fn months(&self) -> Result<Vec<MonthKey>>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBudgetStore {
    records: BTreeMap<MonthKey, BudgetRecord>,
}

impl MemoryBudgetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BudgetStore for MemoryBudgetStore {
    fn get(&self, month: MonthKey) -> Result<Option<BudgetRecord>> {
        Ok(self.records.get(&month).cloned())
    }

    fn set(&mut self, month: MonthKey, record: &BudgetRecord) -> Result<()> {
        self.records.insert(month, record.clone());
        Ok(())
    }

    fn months(&self) -> Result<Vec<MonthKey>> {
        Ok(self.records.keys().copied().collect())
    }
}

/// Budgets in the `budgets` table, one row per month and category.
pub struct SqliteBudgetStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteBudgetStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert or replace a single category's amount for a month.
    pub fn set_amount(&self, month: MonthKey, category: &str, amount: Decimal) -> Result<()> {
        self.conn.execute(
            "INSERT INTO budgets(month, category, amount) VALUES (?1,?2,?3)
             ON CONFLICT(month, category) DO UPDATE SET amount=excluded.amount",
            params![month.to_string(), category, amount.to_string()],
        )?;
        Ok(())
    }

    /// Every stored row as `(month, category, raw amount)`, newest month first.
    pub fn rows(&self, month: Option<MonthKey>) -> Result<Vec<(String, String, String)>> {
        let mut sql =
            String::from("SELECT month, category, amount FROM budgets");
        let filter = month.map(|m| m.to_string());
        if filter.is_some() {
            sql.push_str(" WHERE month=?1");
        }
        sql.push_str(" ORDER BY month DESC, category");
        let mut stmt = self.conn.prepare(&sql)?;
        let map = |r: &rusqlite::Row<'_>| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
            ))
        };
        let rows = match filter {
            Some(ref m) => stmt.query_map(params![m], map)?.collect::<rusqlite::Result<Vec<_>>>()?,
            None => stmt.query_map([], map)?.collect::<rusqlite::Result<Vec<_>>>()?,
        };
        Ok(rows)
    }
}

impl BudgetStore for SqliteBudgetStore<'_> {
    fn get(&self, month: MonthKey) -> Result<Option<BudgetRecord>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT category, amount FROM budgets WHERE month=?1")?;
        let mut rows = stmt.query(params![month.to_string()])?;
        let mut record = BudgetRecord::new();
        let mut found = false;
        while let Some(r) = rows.next()? {
            found = true;
            let category: String = r.get(0)?;
            let amount: String = r.get(1)?;
            record.insert(category, Value::String(amount));
        }
        Ok(found.then_some(record))
    }

    fn set(&mut self, month: MonthKey, record: &BudgetRecord) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM budgets WHERE month=?1",
            params![month.to_string()],
        )?;
        for (category, value) in record {
            let amount = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            tx.execute(
                "INSERT INTO budgets(month, category, amount) VALUES (?1,?2,?3)",
                params![month.to_string(), category, amount],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn months(&self) -> Result<Vec<MonthKey>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT month FROM budgets ORDER BY month")?;
        let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            if let Ok(m) = row?.parse::<MonthKey>() {
                out.push(m);
            }
        }
        Ok(out)
    }
}

/// Budgets in a JSON file laid out like the browser's `monthlyBudgets`
/// entry: `{ "2024-01": { "Food": 400, "Bills": "900" } }`.
///
/// The file is re-read on every call. A missing file is an empty store; a
/// file that does not parse is an error.
pub struct JsonBudgetStore {
    path: PathBuf,
}

impl JsonBudgetStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<BTreeMap<String, BudgetRecord>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let text = fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&text)?)
    }
}

impl BudgetStore for JsonBudgetStore {
    fn get(&self, month: MonthKey) -> Result<Option<BudgetRecord>> {
        Ok(self.load()?.remove(&month.to_string()))
    }

    fn set(&mut self, month: MonthKey, record: &BudgetRecord) -> Result<()> {
        let mut all = self.load()?;
        all.insert(month.to_string(), record.clone());
        fs::write(&self.path, serde_json::to_string_pretty(&all)?)?;
        Ok(())
    }

    fn months(&self) -> Result<Vec<MonthKey>> {
        let mut out: Vec<MonthKey> = self
            .load()?
            .keys()
            .filter_map(|k| k.parse().ok())
            .collect();
        out.sort();
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "month", rename_all = "snake_case")]
pub enum BudgetSource {
    /// A record saved for the month itself.
    Exact,
    /// Carried forward from the nearest earlier month with a record.
    Inherited(MonthKey),
    /// Built-in defaults.
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetAmount {
    pub category: String,
    pub amount: Decimal,
}

/// The effective budget for a month. Holds exactly one amount per category
/// of the registry it was resolved against, in registry order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedBudget {
    pub month: MonthKey,
    pub source: BudgetSource,
    pub amounts: Vec<BudgetAmount>,
}

impl ResolvedBudget {
    pub fn get(&self, category: &str) -> Decimal {
        self.amounts
            .iter()
            .find(|a| a.category == category)
            .map(|a| a.amount)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn total(&self) -> Decimal {
        sum_amounts(self.amounts.iter().map(|a| a.amount))
    }
}

/// A persisted value as a budget amount: parsed if it is a string, zero if
/// it cannot be read, and never negative.
pub fn coerce_budget_value(v: &Value) -> Decimal {
    match coerce_amount(v) {
        Some(d) if d > Decimal::ZERO => d,
        Some(_) => Decimal::ZERO,
        None => {
            tracing::debug!(value = %v, "unparseable budget value, using 0");
            Decimal::ZERO
        }
    }
}

pub fn default_budget_for(category: &str) -> Decimal {
    DEFAULT_BUDGETS
        .iter()
        .find(|(id, _)| *id == category)
        .map(|(_, amount)| Decimal::from(*amount))
        .unwrap_or(Decimal::ZERO)
}

/// Find the budget in effect for `month`.
///
/// Uses the month's own record when there is one, otherwise the nearest of
/// the previous [`LOOKBACK_MONTHS`] months that has one, otherwise the
/// built-in defaults. A store that fails to read is treated as empty. The
/// store is never written to.
pub fn resolve_budget<S>(store: &S, month: MonthKey, registry: &CategoryRegistry) -> ResolvedBudget
where
    S: BudgetStore + ?Sized,
{
    match find_record(store, month) {
        Ok(Some((found, record))) => {
            let source = if found == month {
                BudgetSource::Exact
            } else {
                BudgetSource::Inherited(found)
            };
            from_record(month, source, &record, registry)
        }
        Ok(None) => defaults(month, registry),
        Err(err) => {
            tracing::warn!(%month, error = %err, "could not read stored budgets, using defaults");
            defaults(month, registry)
        }
    }
}

fn find_record<S>(store: &S, month: MonthKey) -> Result<Option<(MonthKey, BudgetRecord)>>
where
    S: BudgetStore + ?Sized,
{
    let mut current = Some(month);
    for _ in 0..=LOOKBACK_MONTHS {
        let Some(m) = current else { break };
        if let Some(record) = store.get(m)? {
            return Ok(Some((m, record)));
        }
        current = m.previous();
    }
    Ok(None)
}

fn from_record(
    month: MonthKey,
    source: BudgetSource,
    record: &BudgetRecord,
    registry: &CategoryRegistry,
) -> ResolvedBudget {
    // id -> (amount, keyed by the exact id)
    let mut by_id: BTreeMap<String, (Decimal, bool)> = BTreeMap::new();
    for (key, value) in record {
        let id = registry.normalize(Some(key));
        if !registry.contains(&id) {
            tracing::debug!(%month, category = %key, "dropping budget for inactive category");
            continue;
        }
        let exact = key.trim() == id;
        match by_id.get(&id) {
            Some(&(_, true)) if !exact => {
                tracing::debug!(%month, category = %key, %id, "duplicate budget key, keeping exact id");
                continue;
            }
            Some(_) => {
                tracing::debug!(%month, category = %key, %id, "duplicate budget key, replacing");
            }
            None => {}
        }
        by_id.insert(id, (coerce_budget_value(value), exact));
    }
    let amounts = registry
        .ids()
        .map(|id| BudgetAmount {
            category: id.to_string(),
            amount: by_id.get(id).map(|&(a, _)| a).unwrap_or(Decimal::ZERO),
        })
        .collect();
    ResolvedBudget {
        month,
        source,
        amounts,
    }
}

fn defaults(month: MonthKey, registry: &CategoryRegistry) -> ResolvedBudget {
    ResolvedBudget {
        month,
        source: BudgetSource::Default,
        amounts: registry
            .ids()
            .map(|id| BudgetAmount {
                category: id.to_string(),
                amount: default_budget_for(id),
            })
            .collect(),
    }
}
