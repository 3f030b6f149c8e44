// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Coerce a loosely typed JSON amount into a decimal.
///
/// Numbers and numeric strings are accepted. Anything else (null, booleans,
/// `"NaN"`, `"abc"`, out-of-range exponents) yields `None`.
pub fn coerce_amount(v: &Value) -> Option<Decimal> {
    match v {
        Value::Number(n) => parse_amount(&n.to_string()),
        Value::String(s) => parse_amount(s),
        _ => None,
    }
}

pub fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(s).ok())
}

/// Sum of amounts, saturating at [`Decimal::MAX`] instead of overflowing.
pub fn sum_amounts<I: IntoIterator<Item = Decimal>>(amounts: I) -> Decimal {
    amounts.into_iter().fold(Decimal::ZERO, add_amount)
}

/// `total + amount`, saturating at the bounds of [`Decimal`].
pub fn add_amount(total: Decimal, amount: Decimal) -> Decimal {
    total.checked_add(amount).unwrap_or_else(|| {
        tracing::debug!(%total, %amount, "amount sum overflowed, saturating");
        total.saturating_add(amount)
    })
}

fn lenient_amount<'de, D>(d: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.as_ref().and_then(coerce_amount))
}

fn lenient_id<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

/// One product or charge within an expense.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub quantity: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub unit_price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total_price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total_amount: Option<Decimal>,
    #[serde(default)]
    pub category: Option<String>,
}

impl LineItem {
    /// First positive value among `totalPrice`, `totalAmount` and
    /// `quantity * unitPrice`, else zero.
    pub fn resolved_amount(&self) -> Decimal {
        let product = match (self.quantity, self.unit_price) {
            (Some(q), Some(p)) => q.checked_mul(p),
            _ => None,
        };
        [self.total_price, self.total_amount, product]
            .into_iter()
            .flatten()
            .find(|v| *v > Decimal::ZERO)
            .unwrap_or(Decimal::ZERO)
    }
}

/// One purchase event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(default, alias = "_id", deserialize_with = "lenient_id")]
    pub id: String,
    /// `YYYY-MM-DD`, kept as the raw string so malformed values can be
    /// skipped instead of rejected.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub merchant_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total_amount: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<LineItem>>,
}

impl Expense {
    pub fn line_items(&self) -> &[LineItem] {
        self.items.as_deref().unwrap_or(&[])
    }

    pub fn has_line_items(&self) -> bool {
        !self.line_items().is_empty()
    }

    /// Total of the expense. When line items exist the expense-level
    /// `totalAmount` is ignored.
    pub fn resolved_total(&self) -> Decimal {
        if self.has_line_items() {
            return sum_amounts(self.line_items().iter().map(LineItem::resolved_amount));
        }
        self.total_amount
            .filter(|v| *v > Decimal::ZERO)
            .unwrap_or(Decimal::ZERO)
    }
}

/// A line-item level record as returned in `detailedItems` by the summary
/// endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedItem {
    #[serde(default, deserialize_with = "lenient_id")]
    pub expense_id: String,
    #[serde(default)]
    pub item_index: Option<usize>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub merchant_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "totalPrice", deserialize_with = "lenient_amount")]
    pub amount: Option<Decimal>,
}

impl DetailedItem {
    pub fn resolved_amount(&self) -> Decimal {
        self.amount
            .filter(|v| *v > Decimal::ZERO)
            .unwrap_or(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRange {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Response body of `GET /api/expenses/summary`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummary {
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total_spending: Option<Decimal>,
    #[serde(default)]
    pub expense_count: u64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub average_expense: Option<Decimal>,
    #[serde(default)]
    pub item_category_totals: BTreeMap<String, Value>,
    #[serde(default)]
    pub detailed_items: Vec<DetailedItem>,
    #[serde(default)]
    pub date_range: Option<SummaryRange>,
}

impl ExpenseSummary {
    /// Regroup the flat item list into expenses, one per `expenseId`, in the
    /// order each expense is first seen. Items keep their `itemIndex` order.
    pub fn into_expenses(self) -> Vec<Expense> {
        let mut order: Vec<String> = Vec::new();
        let mut grouped: BTreeMap<String, Vec<DetailedItem>> = BTreeMap::new();
        for item in self.detailed_items {
            let key = item.expense_id.clone();
            if !grouped.contains_key(&key) {
                order.push(key.clone());
            }
            grouped.entry(key).or_default().push(item);
        }

        let mut out = Vec::with_capacity(order.len());
        for id in order {
            let Some(mut items) = grouped.remove(&id) else {
                continue;
            };
            items.sort_by_key(|i| i.item_index.unwrap_or(usize::MAX));
            let date = items.iter().find_map(|i| i.date.clone());
            let merchant_name = items.iter().find_map(|i| i.merchant_name.clone());
            let line_items = items
                .into_iter()
                .map(|i| LineItem {
                    description: i.description,
                    total_price: i.amount,
                    category: i.category,
                    ..LineItem::default()
                })
                .collect();
            out.push(Expense {
                id,
                date,
                merchant_name,
                items: Some(line_items),
                ..Expense::default()
            });
        }
        out
    }
}

/// A user-visible spending bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
}

impl Category {
    pub fn new(id: &str, name: &str, icon: &str, color: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            color: color.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerce_amount_rejects_junk() {
        assert_eq!(coerce_amount(&json!("12.50")), Some(Decimal::new(1250, 2)));
        assert_eq!(coerce_amount(&json!(40)), Some(Decimal::from(40)));
        assert_eq!(coerce_amount(&json!("NaN")), None);
        assert_eq!(coerce_amount(&json!("abc")), None);
        assert_eq!(coerce_amount(&json!(null)), None);
        assert_eq!(coerce_amount(&json!(true)), None);
    }

    #[test]
    fn numeric_ids_become_strings() {
        let e: Expense = serde_json::from_value(json!({"id": 17, "date": "2024-01-01"})).unwrap();
        assert_eq!(e.id, "17");
    }
}
