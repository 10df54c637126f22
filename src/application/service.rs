use std::fmt;

use chrono::Utc;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{
    CategoryTotal, Cents, Draft, Expense, ExpenseId, category_totals, distinct_categories,
    format_cents, parse_cents, total_all, total_by_category,
};

use super::{CategoryReport, CategorySummary, LedgerSnapshot, ValidationError};

/// Whether the ledger is collecting a new expense or staging a replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "target", rename_all = "lowercase")]
pub enum Mode {
    Adding,
    Editing(ExpenseId),
}

impl Mode {
    /// Label for the view's submit button.
    pub fn submit_label(&self) -> &'static str {
        match self {
            Mode::Adding => "Add Expense",
            Mode::Editing(_) => "Update Expense",
        }
    }
}

/// What to do with an edit whose target was deleted before the commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum StaleEditPolicy {
    /// Deleting leaves the edit target in place; committing against a
    /// missing target discards the draft without recording anything.
    #[default]
    Drop,
    /// Deleting the record being edited clears the edit target, and a
    /// commit that finds its target missing is recorded as a new expense.
    #[value(name = "add", alias = "add-as-new")]
    AddAsNew,
}

impl StaleEditPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaleEditPolicy::Drop => "drop",
            StaleEditPolicy::AddAsNew => "add",
        }
    }
}

impl fmt::Display for StaleEditPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A new expense was appended.
    Added(ExpenseId),
    /// The expense with this id was replaced in place.
    Updated(ExpenseId),
    /// The edit target no longer existed; nothing was recorded.
    Dropped(ExpenseId),
}

impl CommitOutcome {
    pub fn id(&self) -> ExpenseId {
        match self {
            CommitOutcome::Added(id) | CommitOutcome::Updated(id) | CommitOutcome::Dropped(id) => {
                *id
            }
        }
    }
}

/// Validated draft fields, ready to become an [`Expense`].
struct ValidEntry {
    name: String,
    amount_cents: Cents,
    category: String,
}

/// The expense ledger: recorded expenses plus the form and edit state the
/// view layer drives. This is the primary interface for any client.
#[derive(Debug, Default)]
pub struct ExpenseLedger {
    expenses: Vec<Expense>,
    editing: Option<ExpenseId>,
    draft: Draft,
    policy: StaleEditPolicy,
}

impl ExpenseLedger {
    /// Create an empty ledger with the default stale edit policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty ledger with the given stale edit policy.
    pub fn with_policy(policy: StaleEditPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    // ========================
    // Commands
    // ========================

    /// Validate the draft and record it.
    ///
    /// In adding mode the draft becomes a new expense at the end of the list.
    /// In editing mode it replaces the target in place, keeping its id and
    /// position. On success the draft is cleared and the ledger returns to
    /// adding mode. On error nothing changes.
    pub fn commit(&mut self) -> Result<CommitOutcome, ValidationError> {
        let entry = match validate_draft(&self.draft) {
            Ok(entry) => entry,
            Err(err) => {
                debug!(error = %err, "rejected draft");
                return Err(err);
            }
        };

        let outcome = match self.editing.take() {
            None => self.append(entry),
            Some(id) => match self.expenses.iter().position(|e| e.id == id) {
                Some(index) => {
                    self.expenses[index] =
                        Expense::with_id(id, entry.name, entry.amount_cents, entry.category);
                    debug!(%id, "updated expense");
                    CommitOutcome::Updated(id)
                }
                None => match self.policy {
                    StaleEditPolicy::Drop => {
                        warn!(%id, "edit target no longer exists, draft discarded");
                        CommitOutcome::Dropped(id)
                    }
                    StaleEditPolicy::AddAsNew => self.append(entry),
                },
            },
        };

        self.draft = Draft::default();
        Ok(outcome)
    }

    /// Load an expense into the draft and make it the edit target.
    ///
    /// Any edit already in progress is discarded. Returns `false` and leaves
    /// the ledger untouched when no expense has this id.
    pub fn begin_edit(&mut self, id: ExpenseId) -> bool {
        let Some(expense) = self.expense(id) else {
            debug!(%id, "edit requested for unknown expense");
            return false;
        };

        let draft = Draft::from_expense(expense);
        self.draft = draft;
        self.editing = Some(id);
        debug!(%id, "editing expense");
        true
    }

    /// Leave editing mode and clear the draft. Returns whether an edit was active.
    ///
    /// The draft is cleared in adding mode too.
    pub fn cancel_edit(&mut self) -> bool {
        self.draft = Draft::default();
        self.editing.take().is_some()
    }

    /// Remove an expense by id, returning it. Deleting an unknown id is a no-op.
    pub fn delete_expense(&mut self, id: ExpenseId) -> Option<Expense> {
        let index = self.expenses.iter().position(|e| e.id == id)?;
        let removed = self.expenses.remove(index);

        if self.policy == StaleEditPolicy::AddAsNew && self.editing == Some(id) {
            self.editing = None;
        }

        debug!(%id, "deleted expense");
        Some(removed)
    }

    // ========================
    // Draft
    // ========================

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
    }

    pub fn set_amount(&mut self, amount: impl Into<String>) {
        self.draft.amount = amount.into();
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.draft.category = category.into();
    }

    pub fn set_draft(&mut self, draft: Draft) {
        self.draft = draft;
    }

    /// Clear the form fields. The edit target, if any, is kept.
    pub fn clear_draft(&mut self) {
        self.draft = Draft::default();
    }

    // ========================
    // Queries
    // ========================

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn expense(&self, id: ExpenseId) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == id)
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn editing_target(&self) -> Option<ExpenseId> {
        self.editing
    }

    pub fn mode(&self) -> Mode {
        match self.editing {
            Some(id) => Mode::Editing(id),
            None => Mode::Adding,
        }
    }

    pub fn policy(&self) -> StaleEditPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    pub fn total_all(&self) -> Cents {
        total_all(&self.expenses)
    }

    pub fn total_by_category(&self, category: &str) -> Cents {
        total_by_category(category, &self.expenses)
    }

    pub fn distinct_categories(&self) -> Vec<String> {
        distinct_categories(&self.expenses)
    }

    pub fn category_totals(&self) -> Vec<CategoryTotal> {
        category_totals(&self.expenses)
    }

    /// Capture the full view state.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            generated_at: Utc::now(),
            mode: self.mode(),
            draft: self.draft.clone(),
            expenses: self.expenses.clone(),
            total: self.total_all(),
            categories: self.category_totals(),
        }
    }

    /// Per-category breakdown with each category's share of the total.
    pub fn category_report(&self) -> CategoryReport {
        let total = self.total_all();
        let categories = self
            .category_totals()
            .into_iter()
            .map(|t| CategorySummary::from_total(t, total))
            .collect();

        CategoryReport {
            generated_at: Utc::now(),
            total,
            categories,
        }
    }

    fn append(&mut self, entry: ValidEntry) -> CommitOutcome {
        let expense = Expense::new(entry.name, entry.amount_cents, entry.category);
        let id = expense.id;
        debug!(
            %id,
            name = %expense.name,
            amount = %format_cents(expense.amount_cents),
            category = %expense.category,
            "added expense"
        );
        self.expenses.push(expense);
        CommitOutcome::Added(id)
    }
}

/// Name and category are kept exactly as typed; only the amount is trimmed
/// before parsing.
fn validate_draft(draft: &Draft) -> Result<ValidEntry, ValidationError> {
    if draft.name.is_empty() {
        return Err(ValidationError::EmptyName);
    }

    let amount = draft.amount.trim();
    if amount.is_empty() {
        return Err(ValidationError::EmptyAmount);
    }
    let amount_cents = parse_cents(amount).map_err(|reason| ValidationError::InvalidAmount {
        input: draft.amount.clone(),
        reason,
    })?;

    if draft.category.is_empty() {
        return Err(ValidationError::EmptyCategory);
    }

    Ok(ValidEntry {
        name: draft.name.clone(),
        amount_cents,
        category: draft.category.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_edit_policy_roundtrip() {
        for policy in StaleEditPolicy::value_variants() {
            let parsed = StaleEditPolicy::from_str(policy.as_str(), true).unwrap();
            assert_eq!(*policy, parsed);
        }
        assert_eq!(
            StaleEditPolicy::from_str("add-as-new", true),
            Ok(StaleEditPolicy::AddAsNew)
        );
        assert!(StaleEditPolicy::from_str("keep", true).is_err());
    }

    #[test]
    fn test_stale_edit_policy_value_names() {
        let names: Vec<String> = StaleEditPolicy::value_variants()
            .iter()
            .filter_map(|v| v.to_possible_value())
            .map(|v| v.get_name().to_string())
            .collect();
        assert_eq!(names, ["drop", "add"]);
    }

    #[test]
    fn test_submit_label_follows_mode() {
        assert_eq!(Mode::Adding.submit_label(), "Add Expense");
        assert_eq!(
            Mode::Editing(uuid::Uuid::new_v4()).submit_label(),
            "Update Expense"
        );
    }

    #[test]
    fn test_validate_draft_keeps_fields_as_typed() {
        let entry = validate_draft(&Draft::new("  Coffee ", " 4.50 ", " Food ")).unwrap();
        assert_eq!(entry.name, "  Coffee ");
        assert_eq!(entry.amount_cents, 450);
        assert_eq!(entry.category, " Food ");
    }

    #[test]
    fn test_validate_draft_accepts_whitespace_name_and_category() {
        let entry = validate_draft(&Draft::new(" ", "4.50", "\t")).unwrap();
        assert_eq!(entry.name, " ");
        assert_eq!(entry.category, "\t");
    }

    #[test]
    fn test_validate_draft_reports_first_failing_field() {
        assert_eq!(
            validate_draft(&Draft::new("", "", "")).err(),
            Some(ValidationError::EmptyName)
        );
        assert_eq!(
            validate_draft(&Draft::new("Coffee", "  ", "")).err(),
            Some(ValidationError::EmptyAmount)
        );
        assert_eq!(
            validate_draft(&Draft::new("Coffee", "4.50", "")).err(),
            Some(ValidationError::EmptyCategory)
        );
        assert!(matches!(
            validate_draft(&Draft::new("Coffee", "four", "Food")),
            Err(ValidationError::InvalidAmount { .. })
        ));
    }
}
