use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, format_cents};

pub type ExpenseId = Uuid;

/// A single recorded expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub name: String,
    pub amount_cents: Cents,
    pub category: String,
}

impl Expense {
    /// Create an expense with a freshly allocated id.
    pub fn new(name: String, amount_cents: Cents, category: String) -> Self {
        Self::with_id(Uuid::new_v4(), name, amount_cents, category)
    }

    /// Create an expense that takes over an existing id, used when an edit
    /// replaces a record in place.
    pub fn with_id(id: ExpenseId, name: String, amount_cents: Cents, category: String) -> Self {
        Self {
            id,
            name,
            amount_cents,
            category,
        }
    }

    pub fn short_id(&self) -> String {
        short_id(self.id)
    }
}

/// First eight characters of an id, enough to tell rows apart on screen.
pub fn short_id(id: ExpenseId) -> String {
    id.simple().to_string()[..8].to_string()
}

/// The pending-entry form: raw text exactly as the user typed it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub name: String,
    pub amount: String,
    pub category: String,
}

impl Draft {
    pub fn new(
        name: impl Into<String>,
        amount: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            amount: amount.into(),
            category: category.into(),
        }
    }

    /// Load an existing expense back into the form for editing.
    pub fn from_expense(expense: &Expense) -> Self {
        Self {
            name: expense.name.clone(),
            amount: format_cents(expense.amount_cents),
            category: expense.category.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.amount.is_empty() && self.category.is_empty()
    }
}
