use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Category, Transaction};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStat {
    pub category: Category,
    pub name: &'static str,
    pub amount: i64,
    pub color: &'static str,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingSummary {
    pub total: i64,
    pub categories: Vec<CategoryStat>,
}

/// Aggregates transactions into a total and per-category breakdown.
///
/// Categories are ordered by descending amount, ties by category order.
/// Percentages are 0 when the total is 0. Sums saturate at the `i64` bounds.
pub fn summarize(transactions: &[Transaction]) -> SpendingSummary {
    let mut totals: BTreeMap<Category, i64> = BTreeMap::new();
    for tx in transactions {
        let entry = totals.entry(tx.category).or_insert(0);
        *entry = entry.saturating_add(tx.amount);
    }

    let total = totals.values().fold(0i64, |acc, amount| acc.saturating_add(*amount));

    let mut categories: Vec<CategoryStat> = totals
        .into_iter()
        .map(|(category, amount)| CategoryStat {
            category,
            name: category.label(),
            amount,
            color: category.color(),
            percentage: if total != 0 {
                amount as f64 / total as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect();
    // Stable sort keeps the BTreeMap category order for equal amounts.
    categories.sort_by(|a, b| b.amount.cmp(&a.amount));

    SpendingSummary { total, categories }
}
