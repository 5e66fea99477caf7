use tracker_core::{
    format::{CodeCurrencyFormatter, CurrencyFormatter},
    CategoryFilter, FilterSpec, SearchMode,
};
use tracker_domain::{sum_amounts, Category};

use super::{expense::short_id, parse_category, ParsedArgs};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};

const DESCRIPTION_WIDTH: usize = 40;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "list",
            "List expenses, optionally filtered",
            "list [--category C] [--from YYYY-MM-DD] [--to YYYY-MM-DD] [--search TEXT] [--override]",
            cmd_list,
        ),
        CommandEntry::new(
            "summary",
            "Show totals, this month's spending and the category breakdown",
            "summary",
            cmd_summary,
        ),
        CommandEntry::new(
            "categories",
            "List the available categories",
            "categories",
            cmd_categories,
        ),
    ]
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["category", "from", "to", "search"], &["override"])?;
    if !parsed.positionals.is_empty() {
        return Err(CommandError::InvalidArguments(format!(
            "unexpected argument `{}`",
            parsed.positionals[0]
        )));
    }
    let spec = filter_spec(context, &parsed)?;

    let all = context.store.expenses();
    if all.is_empty() {
        io::print_info("No expenses recorded yet. Use `add` to record one.");
        return Ok(());
    }

    let formatter = CodeCurrencyFormatter;
    let currency = context.config.currency.as_str();
    let mut table = Table::new(vec![
        TableColumn::right("#"),
        TableColumn::left("ID"),
        TableColumn::left("Date"),
        TableColumn::left("Category"),
        TableColumn::left("Description").max_width(DESCRIPTION_WIDTH),
        TableColumn::right("Amount"),
    ]);
    let mut visible = Vec::new();
    for (idx, expense) in all.iter().enumerate() {
        if !spec.matches(expense) {
            continue;
        }
        table.push(vec![
            (idx + 1).to_string(),
            short_id(expense),
            expense.date_label(),
            expense.category.to_string(),
            expense.description.clone(),
            formatter.format_amount(expense.amount, currency),
        ]);
        visible.push(expense);
    }

    if visible.is_empty() {
        io::print_info("No expenses match the current filter.");
        return Ok(());
    }

    io::print_info(table.render());
    io::print_info(format!(
        "Showing {} of {} expense(s), total {}",
        visible.len(),
        all.len(),
        formatter.format_amount(sum_amounts(visible), currency)
    ));
    Ok(())
}

fn filter_spec(context: &ShellContext, parsed: &ParsedArgs<'_>) -> Result<FilterSpec, CommandError> {
    let mode = if parsed.has("override") {
        SearchMode::Override
    } else {
        context.config.search_mode
    };
    let category = match parsed.value("category") {
        Some(raw) => CategoryFilter::Only(parse_category(raw)?),
        None => CategoryFilter::All,
    };
    let spec = FilterSpec {
        category,
        ..FilterSpec::default()
    };
    Ok(spec
        .between(parsed.date("from")?, parsed.date("to")?)
        .with_search(parsed.value("search").unwrap_or_default())
        .with_search_mode(mode))
}

fn cmd_summary(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let summary = context.store.summary(context.clock.today());
    let formatter = CodeCurrencyFormatter;
    let currency = context.config.currency.as_str();

    output_section("Summary");
    io::print_info(format!(
        "  Total spending : {}",
        formatter.format_amount(summary.total_spending, currency)
    ));
    io::print_info(format!(
        "  This month     : {} ({} to {})",
        formatter.format_amount(summary.current_month_spending, currency),
        summary.month_start,
        summary.month_end
    ));
    io::print_info(format!("  Expenses       : {}", summary.expense_count));
    match &summary.top_category {
        Some(top) => io::print_info(format!(
            "  Top category   : {} ({})",
            top.category,
            formatter.format_amount(top.amount, currency)
        )),
        None => io::print_info("  Top category   : none"),
    }

    if summary.breakdown.is_empty() {
        return Ok(());
    }
    let mut table = Table::new(vec![
        TableColumn::left("Category"),
        TableColumn::right("Count"),
        TableColumn::right("Amount"),
        TableColumn::right("Share"),
    ]);
    for row in &summary.breakdown {
        table.push(vec![
            row.category.to_string(),
            row.count.to_string(),
            formatter.format_amount(row.amount, currency),
            format!("{:.1}%", row.percentage),
        ]);
    }
    output_section("By category");
    io::print_info(table.render());
    Ok(())
}

fn cmd_categories(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output_section("Categories");
    for category in Category::ALL {
        io::print_info(format!("  {}", category));
    }
    Ok(())
}
