//! Export serializers and the metadata handed to the file-write collaborator.
//!
//! Serializers are pure: they take an already scoped record list and build the
//! whole document in memory. Writing the result anywhere is the caller's job.

mod csv_export;
mod html_export;
mod json_export;

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};
use tracker_domain::{Category, Expense};

use crate::{filter::date_in_range, time::Clock, CoreError};

pub use csv_export::CSV_HEADER;
pub use json_export::{parse_json_export, JsonExportDocument};

/// Largest list serialized in a single pass before a warning is logged.
/// Callers exporting more should split the list themselves.
pub const MAX_SINGLE_PASS_RECORDS: usize = 100_000;

const DEFAULT_BASE_NAME: &str = "expenses";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Json,
    Html,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Csv, ExportFormat::Json, ExportFormat::Html];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Html => "html",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
            ExportFormat::Html => "text/html",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "html" | "htm" => Ok(ExportFormat::Html),
            other => Err(format!(
                "unknown export format `{other}` (expected csv, json or html)"
            )),
        }
    }
}

/// Presentation knobs shared by all formats.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub base_name: String,
    pub title: String,
    pub currency: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            base_name: DEFAULT_BASE_NAME.into(),
            title: "Expense Report".into(),
            currency: "USD".into(),
        }
    }
}

impl ExportOptions {
    /// `{base}_{YYYY-MM-DD}.{ext}`, with the base reduced to `[A-Za-z0-9_-]`.
    pub fn file_name(&self, format: ExportFormat, date: NaiveDate) -> String {
        format!(
            "{}_{}.{}",
            sanitize_base_name(&self.base_name),
            date.format("%Y-%m-%d"),
            format.extension()
        )
    }
}

/// Serialized export ready for the download/file-write collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub content: String,
    pub record_count: usize,
}

/// Date range and category set applied before exporting.
/// Uses the same predicate semantics as [`crate::FilterSpec`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExportScope {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Empty means every category.
    pub categories: Vec<Category>,
}

impl ExportScope {
    pub fn matches(&self, expense: &Expense) -> bool {
        (self.categories.is_empty() || self.categories.contains(&expense.category))
            && date_in_range(expense.date, self.start_date, self.end_date)
    }

    pub fn apply<'a, I>(&self, records: I) -> Vec<&'a Expense>
    where
        I: IntoIterator<Item = &'a Expense>,
    {
        records
            .into_iter()
            .filter(|expense| self.matches(expense))
            .collect()
    }
}

/// Serializes `records` and packages the result with its file name and MIME type.
pub fn export(
    records: &[&Expense],
    format: ExportFormat,
    options: &ExportOptions,
    clock: &dyn Clock,
) -> Result<ExportArtifact, CoreError> {
    let exported_at = clock.now();
    let content = serialize(records, format, options, exported_at)?;
    let artifact = ExportArtifact {
        file_name: options.file_name(format, exported_at.date_naive()),
        mime_type: format.mime_type(),
        content,
        record_count: records.len(),
    };
    debug!(
        file = %artifact.file_name,
        records = artifact.record_count,
        bytes = artifact.content.len(),
        "export prepared"
    );
    Ok(artifact)
}

/// Builds the textual representation of `records` in `format`.
pub fn serialize(
    records: &[&Expense],
    format: ExportFormat,
    options: &ExportOptions,
    exported_at: DateTime<Utc>,
) -> Result<String, CoreError> {
    if records.is_empty() {
        return Err(CoreError::EmptyExport);
    }
    if records.len() > MAX_SINGLE_PASS_RECORDS {
        warn!(
            records = records.len(),
            limit = MAX_SINGLE_PASS_RECORDS,
            "export exceeds single-pass size; consider splitting the list"
        );
    }
    match format {
        ExportFormat::Csv => csv_export::to_csv(records),
        ExportFormat::Json => json_export::to_json(records, exported_at),
        ExportFormat::Html => html_export::to_html(records, options, exported_at),
    }
}

fn sanitize_base_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        DEFAULT_BASE_NAME.into()
    } else {
        sanitized
    }
}
