// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use spendlens::budget::{
    BudgetRecord, BudgetSource, BudgetStore, JsonBudgetStore, MemoryBudgetStore,
    SqliteBudgetStore, resolve_budget,
};
use spendlens::categories::CategoryRegistry;
use spendlens::period::MonthKey;
use spendlens::{Error, db};
use tempfile::tempdir;

fn month(s: &str) -> MonthKey {
    s.parse().unwrap()
}

fn record(v: Value) -> BudgetRecord {
    serde_json::from_value(v).unwrap()
}

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

struct BrokenStore;

impl BudgetStore for BrokenStore {
    fn get(&self, _month: MonthKey) -> spendlens::Result<Option<BudgetRecord>> {
        Err(Error::NotFound("budgets".into()))
    }
    fn set(&mut self, _month: MonthKey, _record: &BudgetRecord) -> spendlens::Result<()> {
        Err(Error::NotFound("budgets".into()))
    }
    fn months(&self) -> spendlens::Result<Vec<MonthKey>> {
        Ok(Vec::new())
    }
}

#[test]
fn nearest_earlier_month_is_inherited() {
    let mut store = MemoryBudgetStore::new();
    store
        .set(month("2022-05"), &record(json!({"Food": 100})))
        .unwrap();
    store
        .set(month("2023-11"), &record(json!({"Food": 450, "Bills": 900})))
        .unwrap();

    let registry = CategoryRegistry::basic();
    let b = resolve_budget(&store, month("2024-03"), &registry);
    assert_eq!(b.source, BudgetSource::Inherited(month("2023-11")));
    assert_eq!(b.get("Food"), Decimal::from(450));
    assert_eq!(b.get("Bills"), Decimal::from(900));
    // present in the registry, missing from the record
    assert_eq!(b.get("Transport"), Decimal::ZERO);
    assert_eq!(b.amounts.len(), 5);
}

#[test]
fn exact_month_wins() {
    let mut store = MemoryBudgetStore::new();
    store.set(month("2024-02"), &record(json!({"Food": 1}))).unwrap();
    store.set(month("2024-03"), &record(json!({"Food": 2}))).unwrap();
    let b = resolve_budget(&store, month("2024-03"), &CategoryRegistry::basic());
    assert_eq!(b.source, BudgetSource::Exact);
    assert_eq!(b.get("Food"), Decimal::from(2));
}

#[test]
fn records_older_than_lookback_are_ignored() {
    let mut store = MemoryBudgetStore::new();
    store.set(month("2021-12"), &record(json!({"Food": 1}))).unwrap();
    let b = resolve_budget(&store, month("2024-01"), &CategoryRegistry::extended());
    assert_eq!(b.source, BudgetSource::Default);
    assert_eq!(b.get("Food"), Decimal::from(500));
    assert_eq!(b.get("Health"), Decimal::from(100));

    // exactly 24 months back is still found
    let b = resolve_budget(&store, month("2023-12"), &CategoryRegistry::extended());
    assert_eq!(b.source, BudgetSource::Inherited(month("2021-12")));
}

#[test]
fn values_are_coerced_and_stale_keys_dropped() {
    let mut store = MemoryBudgetStore::new();
    store
        .set(
            month("2024-03"),
            &record(json!({
                "food": "120.50",
                "Bills": "lots",
                "Shopping": -40,
                "Entertainment": 75
            })),
        )
        .unwrap();
    let b = resolve_budget(&store, month("2024-03"), &CategoryRegistry::basic());
    assert_eq!(b.get("Food"), Decimal::new(12050, 2));
    assert_eq!(b.get("Bills"), Decimal::ZERO);
    assert_eq!(b.get("Shopping"), Decimal::ZERO);
    assert!(b.amounts.iter().all(|a| a.category != "Entertainment"));
}

#[test]
fn exact_id_key_wins_over_case_variants() {
    let mut store = MemoryBudgetStore::new();
    store
        .set(
            month("2024-03"),
            &record(json!({
                "FOOD": 1,
                "Food": 2,
                "food": 3,
                "bills": 7,
                "BILLS": 8
            })),
        )
        .unwrap();
    let b = resolve_budget(&store, month("2024-03"), &CategoryRegistry::basic());
    assert_eq!(b.get("Food"), Decimal::from(2));
    // no exact key: the last variant in key order is kept
    assert_eq!(b.get("Bills"), Decimal::from(7));
    assert_eq!(b.amounts.len(), 5);
}

#[test]
fn resolving_twice_gives_the_same_result_and_writes_nothing() {
    let mut store = MemoryBudgetStore::new();
    store.set(month("2023-11"), &record(json!({"Food": 9}))).unwrap();
    let registry = CategoryRegistry::basic();
    let first = resolve_budget(&store, month("2024-03"), &registry);
    let second = resolve_budget(&store, month("2024-03"), &registry);
    assert_eq!(first, second);
    assert_eq!(store.months().unwrap(), vec![month("2023-11")]);
}

#[test]
fn failing_store_falls_back_to_defaults() {
    let b = resolve_budget(&BrokenStore, month("2024-03"), &CategoryRegistry::basic());
    assert_eq!(b.source, BudgetSource::Default);
    assert_eq!(b.get("Bills"), Decimal::from(800));
    assert_eq!(b.total(), Decimal::from(2000));
}

#[test]
fn sqlite_store_round_trips_months() {
    let conn = setup();
    let mut store = SqliteBudgetStore::new(&conn);
    store
        .set_amount(month("2023-11"), "Food", Decimal::from(300))
        .unwrap();
    store
        .set_amount(month("2023-11"), "Food", Decimal::from(350))
        .unwrap();
    store
        .set(month("2024-01"), &record(json!({"Bills": 700, "Other": "15"})))
        .unwrap();

    assert_eq!(
        store.months().unwrap(),
        vec![month("2023-11"), month("2024-01")]
    );
    let rows = store.rows(Some(month("2023-11"))).unwrap();
    assert_eq!(
        rows,
        vec![("2023-11".to_string(), "Food".to_string(), "350".to_string())]
    );

    let b = resolve_budget(&store, month("2023-12"), &CategoryRegistry::basic());
    assert_eq!(b.source, BudgetSource::Inherited(month("2023-11")));
    assert_eq!(b.get("Food"), Decimal::from(350));

    let b = resolve_budget(&store, month("2024-02"), &CategoryRegistry::basic());
    assert_eq!(b.get("Other"), Decimal::from(15));
    assert_eq!(b.get("Food"), Decimal::ZERO);
}

#[test]
fn json_store_reads_monthly_budgets_layout() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("budgets.json");
    std::fs::write(
        &path,
        r#"{"2023-11": {"Food": 410, "Transport": "95.5"}, "junk": {}}"#,
    )
    .unwrap();

    let mut store = JsonBudgetStore::new(&path);
    assert_eq!(store.months().unwrap(), vec![month("2023-11")]);
    let b = resolve_budget(&store, month("2024-03"), &CategoryRegistry::basic());
    assert_eq!(b.get("Transport"), Decimal::new(955, 1));

    store
        .set(month("2024-03"), &record(json!({"Food": 1})))
        .unwrap();
    let b = resolve_budget(&store, month("2024-03"), &CategoryRegistry::basic());
    assert_eq!(b.source, BudgetSource::Exact);
    assert_eq!(b.get("Food"), Decimal::ONE);
}

#[test]
fn missing_json_file_is_empty_and_corrupt_file_falls_back() {
    let dir = tempdir().unwrap();
    let missing = JsonBudgetStore::new(dir.path().join("none.json"));
    assert!(missing.load().unwrap().is_empty());

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "{not json").unwrap();
    let store = JsonBudgetStore::new(&bad);
    assert!(store.load().is_err());
    let b = resolve_budget(&store, month("2024-03"), &CategoryRegistry::basic());
    assert_eq!(b.source, BudgetSource::Default);
}
