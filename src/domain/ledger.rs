use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{Cents, Expense};

/// Sum and row count for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Cents,
    pub count: usize,
}

/// Sum of all expense amounts. Zero for an empty list.
pub fn total_all(expenses: &[Expense]) -> Cents {
    clamp_to_cents(expenses.iter().map(|e| i128::from(e.amount_cents)).sum())
}

/// Sum of the amounts whose category equals `category` exactly (case-sensitive).
pub fn total_by_category(category: &str, expenses: &[Expense]) -> Cents {
    clamp_to_cents(
        expenses
            .iter()
            .filter(|e| e.category == category)
            .map(|e| i128::from(e.amount_cents))
            .sum(),
    )
}

/// Sums are exact in `i128` and clamped to the `Cents` range once, at the end.
fn clamp_to_cents(sum: i128) -> Cents {
    sum.clamp(i128::from(Cents::MIN), i128::from(Cents::MAX)) as Cents
}

/// Distinct categories in the order they first appear.
pub fn distinct_categories(expenses: &[Expense]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    expenses
        .iter()
        .filter(|e| seen.insert(e.category.as_str()))
        .map(|e| e.category.clone())
        .collect()
}

/// Per-category totals in first-occurrence order, computed in a single pass.
pub fn category_totals(expenses: &[Expense]) -> Vec<CategoryTotal> {
    let mut totals: Vec<(CategoryTotal, i128)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for expense in expenses {
        let slot = *index.entry(expense.category.as_str()).or_insert_with(|| {
            totals.push((
                CategoryTotal {
                    category: expense.category.clone(),
                    total: 0,
                    count: 0,
                },
                0,
            ));
            totals.len() - 1
        });
        let (entry, sum) = &mut totals[slot];
        *sum += i128::from(expense.amount_cents);
        entry.count += 1;
    }

    totals
        .into_iter()
        .map(|(mut entry, sum)| {
            entry.total = clamp_to_cents(sum);
            entry
        })
        .collect()
}
