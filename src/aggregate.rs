// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::categories::CategoryRegistry;
use crate::models::{DetailedItem, Expense, add_amount, sum_amounts};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Something that attributes money to one or more raw categories.
pub trait Spending {
    fn allocations(&self) -> Vec<(Option<&str>, Decimal)>;
}

impl Spending for Expense {
    /// Line items carry their own categories; the expense-level category
    /// only applies when there are none.
    fn allocations(&self) -> Vec<(Option<&str>, Decimal)> {
        if self.has_line_items() {
            self.line_items()
                .iter()
                .map(|i| (i.category.as_deref(), i.resolved_amount()))
                .collect()
        } else {
            vec![(self.category.as_deref(), self.resolved_total())]
        }
    }
}

impl Spending for DetailedItem {
    fn allocations(&self) -> Vec<(Option<&str>, Decimal)> {
        vec![(self.category.as_deref(), self.resolved_amount())]
    }
}

impl<T: Spending + ?Sized> Spending for &T {
    fn allocations(&self) -> Vec<(Option<&str>, Decimal)> {
        (**self).allocations()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Decimal,
}

/// Per-category totals. Registry categories come first in registry order,
/// ad-hoc categories follow sorted by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CategoryTotals {
    entries: Vec<CategoryTotal>,
}

impl CategoryTotals {
    pub fn get(&self, category: &str) -> Decimal {
        self.entries
            .iter()
            .find(|e| e.category == category)
            .map(|e| e.amount)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn total(&self) -> Decimal {
        sum_amounts(self.entries.iter().map(|e| e.amount))
    }

    pub fn entries(&self) -> &[CategoryTotal] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Largest first; ties keep their original order.
    pub fn sorted_desc(&self) -> Vec<CategoryTotal> {
        let mut v = self.entries.clone();
        v.sort_by(|a, b| b.amount.cmp(&a.amount));
        v
    }

    pub fn to_map(&self) -> BTreeMap<String, Decimal> {
        self.entries
            .iter()
            .map(|e| (e.category.clone(), e.amount))
            .collect()
    }
}

/// Reduce spending records into per-category totals.
///
/// Every registry category is present (zero when nothing was spent).
/// Unknown categories are kept under their trimmed name. Amounts that are
/// not positive contribute nothing.
pub fn aggregate<'a, T, I>(records: I, registry: &CategoryRegistry) -> CategoryTotals
where
    T: Spending + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut known: Vec<CategoryTotal> = registry
        .ids()
        .map(|id| CategoryTotal {
            category: id.to_string(),
            amount: Decimal::ZERO,
        })
        .collect();
    let mut ad_hoc: BTreeMap<String, Decimal> = BTreeMap::new();

    for record in records {
        for (raw, amount) in record.allocations() {
            let id = registry.normalize(raw);
            let add = if amount > Decimal::ZERO {
                amount
            } else {
                Decimal::ZERO
            };
            match known.iter_mut().find(|e| e.category == id) {
                Some(entry) => entry.amount = add_amount(entry.amount, add),
                None => {
                    let slot = ad_hoc.entry(id).or_insert(Decimal::ZERO);
                    *slot = add_amount(*slot, add);
                }
            }
        }
    }

    known.extend(
        ad_hoc
            .into_iter()
            .map(|(category, amount)| CategoryTotal { category, amount }),
    );
    CategoryTotals { entries: known }
}

/// Sum of resolved amounts across records, ignoring categories.
pub fn resolved_sum<'a, T, I>(records: I) -> Decimal
where
    T: Spending + 'a,
    I: IntoIterator<Item = &'a T>,
{
    sum_amounts(
        records
            .into_iter()
            .flat_map(|r| r.allocations().into_iter().map(|(_, a)| a))
            .filter(|a| *a > Decimal::ZERO),
    )
}
