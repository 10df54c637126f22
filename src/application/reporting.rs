use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CategoryTotal, Cents, Draft, Expense};

use super::Mode;

/// Everything a view needs to render the ledger at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub generated_at: DateTime<Utc>,
    pub mode: Mode,
    pub draft: Draft,
    pub expenses: Vec<Expense>,
    pub total: Cents,
    pub categories: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryReport {
    pub generated_at: DateTime<Utc>,
    pub total: Cents,
    pub categories: Vec<CategorySummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub total: Cents,
    pub count: usize,
    pub percentage: f64,
}

impl CategorySummary {
    pub(crate) fn from_total(total: CategoryTotal, grand_total: Cents) -> Self {
        let percentage = if grand_total == 0 {
            0.0
        } else {
            (total.total as f64 / grand_total as f64) * 100.0
        };

        Self {
            category: total.category,
            total: total.total,
            count: total.count,
            percentage,
        }
    }
}
