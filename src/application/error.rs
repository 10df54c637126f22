use thiserror::Error;

use crate::domain::ParseCentsError;

/// Reasons a draft is rejected on commit. A rejected commit leaves the ledger untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Expense name must not be empty")]
    EmptyName,

    #[error("Amount must not be empty")]
    EmptyAmount,

    #[error("Invalid amount '{input}': {reason}")]
    InvalidAmount {
        input: String,
        reason: ParseCentsError,
    },

    #[error("Category must not be empty")]
    EmptyCategory,
}
