/// Formats currency amounts for presentation.
pub trait CurrencyFormatter: Send + Sync {
    fn format_amount(&self, amount: f64, currency: &str) -> String;
}

/// Renders `USD 1,234.50`: ISO code, grouped thousands, two decimals.
#[derive(Debug, Default, Clone, Copy)]
pub struct CodeCurrencyFormatter;

impl CurrencyFormatter for CodeCurrencyFormatter {
    fn format_amount(&self, amount: f64, currency: &str) -> String {
        let fixed = format!("{:.2}", amount.abs());
        let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
        let sign = if amount < 0.0 { "-" } else { "" };
        let code = currency.trim();
        if code.is_empty() {
            format!("{sign}{}.{fraction}", group_thousands(whole))
        } else {
            format!("{code} {sign}{}.{fraction}", group_thousands(whole))
        }
    }
}

/// Plain decimal used in machine-readable exports: shortest exact form, no grouping.
pub fn plain_amount(amount: f64) -> String {
    amount.to_string()
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
