use csv::{QuoteStyle, Terminator, WriterBuilder};
use tracker_domain::Expense;

use crate::{format::plain_amount, CoreError};

/// Fixed column order of the CSV export.
pub const CSV_HEADER: &str = "Date,Category,Description,Amount";

/// Header line bare, then one line per record with every field quoted.
/// Lines are separated by `\n` with no trailing newline.
pub(super) fn to_csv(records: &[&Expense]) -> Result<String, CoreError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for expense in records {
        writer.write_record([
            expense.date_label(),
            expense.category.name().to_string(),
            expense.description.clone(),
            plain_amount(expense.amount),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| CoreError::Serialization(err.to_string()))?;
    let rows = String::from_utf8(bytes).map_err(|err| CoreError::Serialization(err.to_string()))?;

    let mut text = String::with_capacity(CSV_HEADER.len() + 1 + rows.len());
    text.push_str(CSV_HEADER);
    text.push('\n');
    text.push_str(rows.trim_end_matches('\n'));
    Ok(text)
}
