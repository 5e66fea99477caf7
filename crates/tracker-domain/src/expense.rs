//! Expense records and the drafts they are created from.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    category::Category,
    common::Amounted,
    validation::{Field, ValidationErrors},
};

/// ISO calendar date format used for parsing and display.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Largest accepted amount. Keeps totals over any realistic list finite.
pub const MAX_AMOUNT: f64 = 1_000_000_000_000.0;

/// A single recorded expense. Values are replaced wholesale on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    pub date: NaiveDate,
    pub amount: f64,
    pub category: Category,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Builds a record from an already validated draft.
    pub fn from_valid(draft: ValidDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: draft.date,
            amount: draft.amount,
            category: draft.category,
            description: draft.description,
            created_at,
        }
    }

    /// Returns a copy carrying the draft's fields but this record's id and creation time.
    pub fn replaced_with(&self, draft: ValidDraft) -> Self {
        Self {
            id: self.id,
            date: draft.date,
            amount: draft.amount,
            category: draft.category,
            description: draft.description,
            created_at: self.created_at,
        }
    }

    pub fn date_label(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

impl Amounted for Expense {
    fn amount(&self) -> f64 {
        self.amount
    }
}

/// User-supplied expense fields prior to validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub date: Option<NaiveDate>,
    pub amount: f64,
    pub category: Category,
    pub description: String,
}

impl ExpenseDraft {
    pub fn new(
        date: NaiveDate,
        amount: f64,
        category: Category,
        description: impl Into<String>,
    ) -> Self {
        Self {
            date: Some(date),
            amount,
            category,
            description: description.into(),
        }
    }

    /// Parses raw text fields, reporting every unparseable or invalid field at once.
    pub fn parse(
        date: &str,
        amount: &str,
        category: &str,
        description: &str,
    ) -> Result<ValidDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let date = date.trim();
        let parsed_date = if date.is_empty() {
            errors.add(Field::Date, "date is required");
            None
        } else {
            match NaiveDate::parse_from_str(date, DATE_FORMAT) {
                Ok(value) => Some(value),
                Err(_) => {
                    errors.add(Field::Date, format!("`{date}` is not a YYYY-MM-DD date"));
                    None
                }
            }
        };

        let parsed_amount = match amount.trim().parse::<f64>() {
            Ok(value) => value,
            Err(_) => {
                errors.add(
                    Field::Amount,
                    format!("`{}` is not a number", amount.trim()),
                );
                f64::NAN
            }
        };

        let parsed_category = match category.parse::<Category>() {
            Ok(value) => Some(value),
            Err(err) => {
                errors.add(Field::Category, err.to_string());
                None
            }
        };

        let draft = ExpenseDraft {
            date: parsed_date,
            amount: parsed_amount,
            category: parsed_category.unwrap_or(Category::Other),
            description: description.to_string(),
        };
        match draft.validate() {
            Ok(valid) if errors.is_empty() => Ok(valid),
            Ok(_) => Err(errors),
            Err(more) => {
                for (field, message) in more.iter() {
                    errors.add(field, message);
                }
                Err(errors)
            }
        }
    }

    /// Checks the record invariants and returns a normalised draft.
    pub fn validate(&self) -> Result<ValidDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.date.is_none() {
            errors.add(Field::Date, "date is required");
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            errors.add(Field::Amount, "amount must be greater than zero");
        } else if self.amount > MAX_AMOUNT {
            errors.add(Field::Amount, "amount must not exceed 1000000000000");
        }
        let description = self.description.trim();
        if description.is_empty() {
            errors.add(Field::Description, "description must not be empty");
        }

        match self.date {
            Some(date) if errors.is_empty() => Ok(ValidDraft {
                date,
                amount: self.amount,
                category: self.category,
                description: description.to_string(),
            }),
            _ => Err(errors),
        }
    }
}

/// Draft that passed validation. Only obtainable through [`ExpenseDraft::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidDraft {
    date: NaiveDate,
    amount: f64,
    category: Category,
    description: String,
}

impl ValidDraft {
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl From<ValidDraft> for ExpenseDraft {
    fn from(valid: ValidDraft) -> Self {
        ExpenseDraft::new(valid.date, valid.amount, valid.category, valid.description)
    }
}
