//! tracker-core
//!
//! Business logic for the expense tracker: the record store, filtering,
//! summaries and export serializers. Depends on tracker-domain. No CLI, no
//! terminal I/O, no direct filesystem access.

pub mod error;
pub mod export;
pub mod filter;
pub mod format;
pub mod storage;
pub mod store;
pub mod summary_service;
pub mod time;

pub use error::CoreError;
pub use export::{ExportArtifact, ExportFormat, ExportOptions, ExportScope};
pub use filter::{filter, CategoryFilter, FilterSpec, SearchMode};
pub use storage::ExpenseStorage;
pub use store::ExpenseStore;
pub use summary_service::{CategoryBreakdown, Summary, SummaryService, TopCategory};
pub use time::{Clock, FixedClock, SystemClock};
