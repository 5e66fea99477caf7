use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracker_domain::{sum_amounts, Expense};

use crate::CoreError;

/// Parsed form of a JSON export. Keys serialize in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonExportDocument {
    pub export_date: DateTime<Utc>,
    pub total_records: usize,
    pub total_amount: f64,
    pub expenses: Vec<Expense>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonExportRef<'a> {
    export_date: DateTime<Utc>,
    total_records: usize,
    total_amount: f64,
    expenses: &'a [&'a Expense],
}

pub(super) fn to_json(records: &[&Expense], exported_at: DateTime<Utc>) -> Result<String, CoreError> {
    let document = JsonExportRef {
        export_date: exported_at,
        total_records: records.len(),
        total_amount: sum_amounts(records.iter().copied()),
        expenses: records,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Reads back a document produced by the JSON export.
pub fn parse_json_export(text: &str) -> Result<JsonExportDocument, CoreError> {
    Ok(serde_json::from_str(text)?)
}
