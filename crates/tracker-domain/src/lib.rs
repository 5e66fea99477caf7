//! tracker-domain
//!
//! Pure domain models for the expense tracker (Expense, Category, drafts and
//! their validation). No I/O, no CLI, no storage.

pub mod category;
pub mod common;
pub mod expense;
pub mod validation;

pub use category::*;
pub use common::*;
pub use expense::*;
pub use validation::*;
