use std::collections::HashSet;

use tracker_domain::Expense;

use crate::CoreError;

/// Persistence collaborator holding the full expense list as one blob.
///
/// `save` always receives the complete list; implementations rewrite the blob
/// in full rather than applying deltas.
pub trait ExpenseStorage: Send + Sync {
    fn load(&self) -> Result<Vec<Expense>, CoreError>;
    fn save(&self, expenses: &[Expense]) -> Result<(), CoreError>;
}

/// Detects records in a loaded blob that violate the record invariants.
pub fn expense_warnings(expenses: &[Expense]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut warnings = Vec::new();

    for expense in expenses {
        if !seen.insert(expense.id) {
            warnings.push(format!("expense {} appears more than once", expense.id));
        }
        if !expense.amount.is_finite() || expense.amount <= 0.0 {
            warnings.push(format!(
                "expense {} has non-positive amount {}",
                expense.id, expense.amount
            ));
        }
        if expense.description.trim().is_empty() {
            warnings.push(format!("expense {} has an empty description", expense.id));
        }
    }
    warnings
}
