// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use ledgerline::application::{CommitOutcome, ExpenseLedger, StaleEditPolicy};
use ledgerline::domain::{Draft, ExpenseId};

/// Fill the draft and commit it, expecting a new expense to be added.
pub fn add(ledger: &mut ExpenseLedger, name: &str, amount: &str, category: &str) -> ExpenseId {
    ledger.set_draft(Draft::new(name, amount, category));
    match ledger.commit() {
        Ok(CommitOutcome::Added(id)) => id,
        other => panic!("expected an added expense, got {:?}", other),
    }
}

/// Test fixture: a ledger with a few expenses across categories
pub struct StandardLedger;

impl StandardLedger {
    /// Coffee (Food, 4.50), Bus (Transport, 2.50), Lunch (Food, 12.00)
    pub fn create() -> (ExpenseLedger, Vec<ExpenseId>) {
        Self::create_with_policy(StaleEditPolicy::Drop)
    }

    pub fn create_with_policy(policy: StaleEditPolicy) -> (ExpenseLedger, Vec<ExpenseId>) {
        let mut ledger = ExpenseLedger::with_policy(policy);
        let ids = vec![
            add(&mut ledger, "Coffee", "4.50", "Food"),
            add(&mut ledger, "Bus", "2.50", "Transport"),
            add(&mut ledger, "Lunch", "12", "Food"),
        ];
        (ledger, ids)
    }
}
