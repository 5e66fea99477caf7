//! The authoritative, exclusively owned expense list.

use std::mem;

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use tracker_domain::{Expense, ExpenseDraft};
use uuid::Uuid;

use crate::{
    filter::{filter, FilterSpec},
    storage::{expense_warnings, ExpenseStorage},
    summary_service::{Summary, SummaryService},
    time::Clock,
    CoreError,
};

/// Owns the record list and funnels every mutation through validation and persistence.
///
/// Each successful mutation rewrites the full list through the storage
/// collaborator. A failed write rolls the in-memory change back.
pub struct ExpenseStore {
    expenses: Vec<Expense>,
    storage: Option<Box<dyn ExpenseStorage>>,
}

impl ExpenseStore {
    /// Loads the full list once from `storage`.
    pub fn open(storage: Box<dyn ExpenseStorage>) -> Result<Self, CoreError> {
        let expenses = storage.load()?;
        for warning in expense_warnings(&expenses) {
            warn!(%warning, "loaded expense data is inconsistent");
        }
        info!(count = expenses.len(), "expense store opened");
        Ok(Self {
            expenses,
            storage: Some(storage),
        })
    }

    /// A store with no persistence collaborator.
    pub fn in_memory() -> Self {
        Self {
            expenses: Vec::new(),
            storage: None,
        }
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Expense> {
        self.expenses.iter().find(|expense| expense.id == id)
    }

    pub fn filtered(&self, spec: &FilterSpec) -> Vec<&Expense> {
        filter(&self.expenses, spec)
    }

    pub fn summary(&self, today: NaiveDate) -> Summary {
        SummaryService::summarize(&self.expenses, today)
    }

    /// Validates `draft`, assigns id and creation time, appends and persists.
    pub fn add(&mut self, draft: ExpenseDraft, clock: &dyn Clock) -> Result<Expense, CoreError> {
        let valid = draft.validate()?;
        let expense = Expense::from_valid(valid, clock.now());
        self.expenses.push(expense.clone());
        if let Err(err) = self.persist() {
            self.expenses.pop();
            return Err(err);
        }
        debug!(id = %expense.id, "expense added");
        Ok(expense)
    }

    /// Replaces every field of `id` except its identity and creation time.
    pub fn update(&mut self, id: Uuid, draft: ExpenseDraft) -> Result<Expense, CoreError> {
        let index = self.index_of(id)?;
        let valid = draft.validate()?;
        let updated = self.expenses[index].replaced_with(valid);
        let previous = mem::replace(&mut self.expenses[index], updated.clone());
        if let Err(err) = self.persist() {
            self.expenses[index] = previous;
            return Err(err);
        }
        debug!(%id, "expense updated");
        Ok(updated)
    }

    /// Removes `id`, returning the deleted record.
    pub fn delete(&mut self, id: Uuid) -> Result<Expense, CoreError> {
        let index = self.index_of(id)?;
        let removed = self.expenses.remove(index);
        if let Err(err) = self.persist() {
            self.expenses.insert(index, removed);
            return Err(err);
        }
        debug!(%id, "expense deleted");
        Ok(removed)
    }

    fn index_of(&self, id: Uuid) -> Result<usize, CoreError> {
        self.expenses
            .iter()
            .position(|expense| expense.id == id)
            .ok_or(CoreError::ExpenseNotFound(id))
    }

    fn persist(&self) -> Result<(), CoreError> {
        match &self.storage {
            Some(storage) => storage.save(&self.expenses),
            None => Ok(()),
        }
    }
}
