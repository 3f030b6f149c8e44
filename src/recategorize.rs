// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Drag-and-drop recategorization with optimistic updates.
//!
//! A move is applied to the board at once and a snapshot of the previous
//! grouping is kept until the server answers. While any move is in flight
//! the board refuses to regroup from source expenses, so a stale reload
//! cannot overwrite the optimistic state. A failed move restores its
//! snapshot and leaves an error message on the board.

use crate::api::ExpenseApi;
use crate::categories::CategoryRegistry;
use crate::models::{Expense, sum_amounts};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Identifies a whole expense (`item_index == None`) or one of its line
/// items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ItemRef {
    pub expense_id: String,
    pub item_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardEntry {
    pub item: ItemRef,
    pub description: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub category: String,
    pub entries: Vec<BoardEntry>,
}

impl Group {
    pub fn total(&self) -> Decimal {
        sum_amounts(self.entries.iter().map(|e| e.amount))
    }
}

/// A position on the board: a category column and an index within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub category: String,
    pub index: usize,
}

impl Slot {
    pub fn new(category: &str, index: usize) -> Self {
        Self {
            category: category.to_string(),
            index,
        }
    }
}

/// A move applied locally and waiting for the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMove {
    id: u64,
    pub item: ItemRef,
    pub from_category: String,
    pub to_category: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Dropped outside a target, on its own position, or from a slot that
    /// does not exist.
    Ignored,
    /// Reordered inside its own category; nothing to tell the server.
    Reordered,
    Pending(PendingMove),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardState {
    Idle,
    Applying { in_flight: usize },
}

/// Handed out by [`Board::begin_refresh`]. Only the newest token may apply
/// its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshToken(u64);

pub struct Board {
    registry: CategoryRegistry,
    groups: Vec<Group>,
    snapshots: BTreeMap<u64, Option<Vec<Group>>>,
    next_move: u64,
    generation: u64,
    error: Option<String>,
    refresh_wanted: bool,
}

impl Board {
    pub fn new(registry: CategoryRegistry) -> Self {
        let groups = group_expenses(&[], &registry);
        Self {
            registry,
            groups,
            snapshots: BTreeMap::new(),
            next_move: 0,
            generation: 0,
            error: None,
            refresh_wanted: false,
        }
    }

    pub fn from_expenses(expenses: &[Expense], registry: CategoryRegistry) -> Self {
        let mut board = Self::new(registry);
        board.groups = group_expenses(expenses, &board.registry);
        board
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, category: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.category == category)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn state(&self) -> BoardState {
        if self.snapshots.is_empty() {
            BoardState::Idle
        } else {
            BoardState::Applying {
                in_flight: self.snapshots.len(),
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.snapshots.is_empty()
    }

    /// True once after a move settles, telling the caller to reload from
    /// the server.
    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.refresh_wanted)
    }

    fn position(&self, category: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.category == category)
    }

    /// Apply a drop locally.
    ///
    /// A move into another category returns a [`PendingMove`] that must be
    /// passed to [`Board::finish_move`] once the server has answered.
    pub fn begin_move(&mut self, from: &Slot, to: Option<&Slot>) -> DropOutcome {
        let Some(to) = to else {
            return DropOutcome::Ignored;
        };
        if from == to {
            return DropOutcome::Ignored;
        }
        let (Some(src), Some(dst)) = (self.position(&from.category), self.position(&to.category))
        else {
            return DropOutcome::Ignored;
        };
        if from.index >= self.groups[src].entries.len() {
            return DropOutcome::Ignored;
        }

        let snapshot = self.groups.clone();
        let entry = self.groups[src].entries.remove(from.index);
        let insert_at = to.index.min(self.groups[dst].entries.len());
        let item = entry.item.clone();
        self.groups[dst].entries.insert(insert_at, entry);

        if src == dst {
            return DropOutcome::Reordered;
        }

        self.error = None;
        let id = self.next_move;
        self.next_move += 1;
        self.snapshots.insert(id, Some(snapshot));
        DropOutcome::Pending(PendingMove {
            id,
            item,
            from_category: from.category.clone(),
            to_category: to.category.clone(),
        })
    }

    /// Settle a pending move with the server's answer.
    pub fn finish_move(&mut self, pending: PendingMove, result: Result<(), String>) {
        let snapshot = self.snapshots.remove(&pending.id).flatten();
        match result {
            Ok(()) => {
                tracing::debug!(expense = %pending.item.expense_id, to = %pending.to_category, "move confirmed");
            }
            Err(message) => {
                tracing::warn!(
                    expense = %pending.item.expense_id,
                    to = %pending.to_category,
                    error = %message,
                    "move rejected, rolling back"
                );
                if let Some(groups) = snapshot {
                    self.groups = groups;
                }
                // later moves were computed from the state just rolled back
                for (_, later) in self.snapshots.range_mut(pending.id + 1..) {
                    *later = None;
                }
                self.error = Some(format!(
                    "Could not move item to {}: {}",
                    pending.to_category, message
                ));
            }
        }
        self.refresh_wanted = true;
    }

    /// Drop an item and push the change to the server in one go.
    pub fn move_item<A>(&mut self, api: &A, from: &Slot, to: Option<&Slot>) -> DropOutcome
    where
        A: ExpenseApi + ?Sized,
    {
        let outcome = self.begin_move(from, to);
        if let DropOutcome::Pending(ref pending) = outcome {
            let result = match pending.item.item_index {
                Some(index) => {
                    api.update_item_category(&pending.item.expense_id, index, &pending.to_category)
                }
                None => api.update_expense_category(&pending.item.expense_id, &pending.to_category),
            };
            self.finish_move(pending.clone(), result.map_err(|e| e.to_string()));
        }
        outcome
    }

    /// Regroup from source expenses unless a move is in flight. Returns
    /// whether the board changed.
    pub fn resync(&mut self, expenses: &[Expense]) -> bool {
        if self.is_pending() {
            tracing::debug!("move in flight, keeping optimistic grouping");
            return false;
        }
        self.groups = group_expenses(expenses, &self.registry);
        true
    }

    /// Start a reload. Any earlier token is invalidated.
    pub fn begin_refresh(&mut self) -> RefreshToken {
        self.generation += 1;
        RefreshToken(self.generation)
    }

    /// Apply the result of a reload started with `token`. Results of
    /// superseded reloads are discarded.
    pub fn apply_refresh(&mut self, token: RefreshToken, expenses: &[Expense]) -> bool {
        if token.0 != self.generation {
            tracing::debug!(token = token.0, current = self.generation, "discarding superseded refresh");
            return false;
        }
        let applied = self.resync(expenses);
        if applied {
            self.refresh_wanted = false;
        }
        applied
    }
}

/// Build the board columns: one per registry category (empty ones included
/// so they can be dropped onto), then ad-hoc categories by name.
pub fn group_expenses(expenses: &[Expense], registry: &CategoryRegistry) -> Vec<Group> {
    let mut groups: Vec<Group> = registry
        .ids()
        .map(|id| Group {
            category: id.to_string(),
            entries: Vec::new(),
        })
        .collect();
    let mut ad_hoc: BTreeMap<String, Vec<BoardEntry>> = BTreeMap::new();

    let mut push = |category: String, entry: BoardEntry| {
        match groups.iter_mut().find(|g| g.category == category) {
            Some(g) => g.entries.push(entry),
            None => ad_hoc.entry(category).or_default().push(entry),
        }
    };

    for expense in expenses {
        let merchant = expense.merchant_name.clone().unwrap_or_default();
        if expense.has_line_items() {
            for (i, item) in expense.line_items().iter().enumerate() {
                push(
                    registry.normalize(item.category.as_deref()),
                    BoardEntry {
                        item: ItemRef {
                            expense_id: expense.id.clone(),
                            item_index: Some(i),
                        },
                        description: item.description.clone().unwrap_or_else(|| merchant.clone()),
                        amount: item.resolved_amount(),
                    },
                );
            }
        } else {
            push(
                registry.normalize(expense.category.as_deref()),
                BoardEntry {
                    item: ItemRef {
                        expense_id: expense.id.clone(),
                        item_index: None,
                    },
                    description: merchant,
                    amount: expense.resolved_total(),
                },
            );
        }
    }

    groups.extend(
        ad_hoc
            .into_iter()
            .map(|(category, entries)| Group { category, entries }),
    );
    groups
}
