// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde_json::json;
use spendlens::api::ExpenseApi;
use spendlens::categories::CategoryRegistry;
use spendlens::models::{Expense, ExpenseSummary};
use spendlens::period::DateRange;
use spendlens::recategorize::{Board, BoardState, DropOutcome, Slot};
use spendlens::{Error, Result};
use std::cell::RefCell;

#[derive(Default)]
struct FakeApi {
    reject: bool,
    calls: RefCell<Vec<String>>,
}

impl ExpenseApi for FakeApi {
    fn fetch_summary(&self, _range: &DateRange) -> Result<ExpenseSummary> {
        Ok(ExpenseSummary::default())
    }

    fn update_expense_category(&self, expense_id: &str, category: &str) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(format!("{} -> {}", expense_id, category));
        if self.reject {
            return Err(Error::Api {
                status: 500,
                message: "server unavailable".into(),
            });
        }
        Ok(())
    }

    fn update_item_category(&self, expense_id: &str, item_index: usize, category: &str) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(format!("{}#{} -> {}", expense_id, item_index, category));
        if self.reject {
            return Err(Error::Api {
                status: 500,
                message: "server unavailable".into(),
            });
        }
        Ok(())
    }
}

fn expenses() -> Vec<Expense> {
    serde_json::from_value(json!([
        {"id": "a", "date": "2024-01-05", "merchantName": "Cafe", "totalAmount": 12, "category": "Food"},
        {"id": "b", "date": "2024-01-06", "merchantName": "Deli", "totalAmount": 8, "category": "Food"},
        {"id": "c", "date": "2024-01-07", "merchantName": "Mart", "items": [
            {"description": "Soap", "category": "Shopping", "totalPrice": 4},
            {"description": "Bread", "category": "Food", "totalPrice": 3}
        ]}
    ]))
    .unwrap()
}

fn ids(board: &Board, category: &str) -> Vec<String> {
    board
        .group(category)
        .unwrap()
        .entries
        .iter()
        .map(|e| match e.item.item_index {
            Some(i) => format!("{}#{}", e.item.expense_id, i),
            None => e.item.expense_id.clone(),
        })
        .collect()
}

#[test]
fn groups_follow_registry_order_with_empty_columns() {
    let board = Board::from_expenses(&expenses(), CategoryRegistry::basic());
    let cats: Vec<&str> = board.groups().iter().map(|g| g.category.as_str()).collect();
    assert_eq!(cats, vec!["Food", "Transport", "Shopping", "Bills", "Other"]);
    assert_eq!(ids(&board, "Food"), vec!["a", "b", "c#1"]);
    assert_eq!(ids(&board, "Shopping"), vec!["c#0"]);
    assert_eq!(board.group("Food").unwrap().total(), Decimal::from(23));
}

#[test]
fn accepted_move_stays_and_asks_for_refresh() {
    let api = FakeApi::default();
    let mut board = Board::from_expenses(&expenses(), CategoryRegistry::basic());
    let outcome = board.move_item(&api, &Slot::new("Food", 0), Some(&Slot::new("Bills", 0)));
    assert!(matches!(outcome, DropOutcome::Pending(_)));
    assert_eq!(api.calls.borrow().as_slice(), ["a -> Bills"]);
    assert_eq!(ids(&board, "Bills"), vec!["a"]);
    assert!(board.error().is_none());
    assert_eq!(board.state(), BoardState::Idle);
    assert!(board.take_refresh_request());
    assert!(!board.take_refresh_request());
}

#[test]
fn rejected_move_rolls_back_completely() {
    let api = FakeApi {
        reject: true,
        ..FakeApi::default()
    };
    let mut board = Board::from_expenses(&expenses(), CategoryRegistry::basic());
    let before = board.groups().to_vec();

    board.move_item(&api, &Slot::new("Food", 2), Some(&Slot::new("Other", 0)));
    assert_eq!(api.calls.borrow().as_slice(), ["c#1 -> Other"]);
    assert_eq!(board.groups(), before.as_slice());
    let message = board.error().unwrap();
    assert!(message.contains("Other"));
    assert!(message.contains("server unavailable"));
}

#[test]
fn drops_without_a_real_move_do_not_call_the_server() {
    let api = FakeApi::default();
    let mut board = Board::from_expenses(&expenses(), CategoryRegistry::basic());
    let before = board.groups().to_vec();

    let from = Slot::new("Food", 1);
    assert_eq!(board.move_item(&api, &from, None), DropOutcome::Ignored);
    assert_eq!(board.move_item(&api, &from, Some(&from.clone())), DropOutcome::Ignored);
    assert_eq!(
        board.move_item(&api, &Slot::new("Food", 9), Some(&Slot::new("Bills", 0))),
        DropOutcome::Ignored
    );
    assert_eq!(board.groups(), before.as_slice());

    assert_eq!(
        board.move_item(&api, &from, Some(&Slot::new("Food", 0))),
        DropOutcome::Reordered
    );
    assert_eq!(ids(&board, "Food"), vec!["b", "a", "c#1"]);
    assert!(api.calls.borrow().is_empty());
    assert!(!board.take_refresh_request());
}

#[test]
fn resync_waits_for_moves_in_flight() {
    let mut board = Board::from_expenses(&expenses(), CategoryRegistry::basic());
    let DropOutcome::Pending(pending) =
        board.begin_move(&Slot::new("Food", 0), Some(&Slot::new("Transport", 0)))
    else {
        panic!("expected a pending move");
    };
    assert_eq!(board.state(), BoardState::Applying { in_flight: 1 });

    // a reload that still has the old category must not undo the move
    assert!(!board.resync(&expenses()));
    assert_eq!(ids(&board, "Transport"), vec!["a"]);

    board.finish_move(pending, Ok(()));
    assert!(board.resync(&expenses()));
    assert_eq!(ids(&board, "Food"), vec!["a", "b", "c#1"]);
}

#[test]
fn superseded_refresh_is_discarded() {
    let mut board = Board::from_expenses(&expenses(), CategoryRegistry::basic());
    let old = board.begin_refresh();
    let new = board.begin_refresh();

    assert!(!board.apply_refresh(old, &[]));
    assert_eq!(ids(&board, "Food").len(), 3);

    assert!(board.apply_refresh(new, &[]));
    assert!(board.group("Food").unwrap().entries.is_empty());
}

#[test]
fn rollback_does_not_let_later_moves_restore_stale_state() {
    let mut board = Board::from_expenses(&expenses(), CategoryRegistry::basic());
    let DropOutcome::Pending(first) =
        board.begin_move(&Slot::new("Food", 0), Some(&Slot::new("Bills", 0)))
    else {
        panic!("expected a pending move");
    };
    let DropOutcome::Pending(second) =
        board.begin_move(&Slot::new("Food", 0), Some(&Slot::new("Other", 0)))
    else {
        panic!("expected a pending move");
    };

    board.finish_move(first, Err("conflict".into()));
    assert_eq!(ids(&board, "Food"), vec!["a", "b", "c#1"]);
    assert!(board.is_pending());

    board.finish_move(second, Err("conflict".into()));
    assert_eq!(ids(&board, "Food"), vec!["a", "b", "c#1"]);
    assert!(ids(&board, "Other").is_empty());
    assert!(!board.is_pending());
}
