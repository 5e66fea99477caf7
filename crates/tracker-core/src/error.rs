use std::{fmt, io};

use thiserror::Error;
use tracker_domain::ValidationErrors;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("Expense not found: {0}")]
    ExpenseNotFound(Uuid),
    #[error("Nothing to export: no expenses match the current selection")]
    EmptyExport,
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for CoreError {
    fn from(err: csv::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

impl From<fmt::Error> for CoreError {
    fn from(err: fmt::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}
