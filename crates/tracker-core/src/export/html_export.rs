use std::fmt::Write;

use chrono::{DateTime, Utc};
use tracker_domain::{sum_amounts, Expense};

use super::ExportOptions;
use crate::{
    format::{CodeCurrencyFormatter, CurrencyFormatter},
    CoreError,
};

const STYLE: &str = "\
body { font-family: -apple-system, 'Segoe UI', Helvetica, Arial, sans-serif; margin: 2rem; color: #1f2933; }
h1 { font-size: 1.5rem; margin-bottom: 0.25rem; }
p.meta { color: #616e7c; margin-top: 0; }
table { border-collapse: collapse; width: 100%; }
th, td { border-bottom: 1px solid #e4e7eb; padding: 0.5rem 0.75rem; text-align: left; }
th { background: #f5f7fa; }
td.amount, th.amount { text-align: right; font-variant-numeric: tabular-nums; }
tr.total td { font-weight: bold; border-top: 2px solid #323f4b; }";

/// Standalone HTML document with one table row per record plus a total row.
/// Every interpolated value goes through [`escape_html`].
pub(super) fn to_html(
    records: &[&Expense],
    options: &ExportOptions,
    exported_at: DateTime<Utc>,
) -> Result<String, CoreError> {
    let formatter = CodeCurrencyFormatter;
    let title = escape_html(&options.title);
    let total = sum_amounts(records.iter().copied());

    let mut html = String::with_capacity(1024 + records.len() * 160);
    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html lang=\"en\">")?;
    writeln!(html, "<head>")?;
    writeln!(html, "<meta charset=\"utf-8\">")?;
    writeln!(html, "<title>{title}</title>")?;
    writeln!(html, "<style>\n{STYLE}\n</style>")?;
    writeln!(html, "</head>")?;
    writeln!(html, "<body>")?;
    writeln!(html, "<h1>{title}</h1>")?;
    writeln!(
        html,
        "<p class=\"meta\">Exported {} &middot; {} record{}</p>",
        exported_at.format("%Y-%m-%d %H:%M UTC"),
        records.len(),
        if records.len() == 1 { "" } else { "s" }
    )?;
    writeln!(html, "<table>")?;
    writeln!(
        html,
        "<thead><tr><th>Date</th><th>Category</th><th>Description</th><th class=\"amount\">Amount</th></tr></thead>"
    )?;
    writeln!(html, "<tbody>")?;
    for expense in records {
        writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"amount\">{}</td></tr>",
            escape_html(&expense.date_label()),
            escape_html(expense.category.name()),
            escape_html(&expense.description),
            escape_html(&formatter.format_amount(expense.amount, &options.currency)),
        )?;
    }
    writeln!(html, "</tbody>")?;
    writeln!(
        html,
        "<tfoot><tr class=\"total\"><td colspan=\"3\">Total</td><td class=\"amount\">{}</td></tr></tfoot>",
        escape_html(&formatter.format_amount(total, &options.currency))
    )?;
    writeln!(html, "</table>")?;
    writeln!(html, "</body>")?;
    write!(html, "</html>")?;
    Ok(html)
}

/// Escapes the five HTML-significant characters.
pub(crate) fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
