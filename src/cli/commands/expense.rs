use tracker_core::format::{CodeCurrencyFormatter, CurrencyFormatter};
use tracker_domain::{Expense, ExpenseDraft};

use super::ParsedArgs;
use crate::cli::core::{CliMode, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::CommandEntry;

const ADD_USAGE: &str = "add <date> <amount> <category> <description...>";
const EDIT_USAGE: &str = "edit <id|#position> <date> <amount> <category> <description...>";
const DELETE_USAGE: &str = "delete <id|#position> [--yes]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("add", "Record a new expense", ADD_USAGE, cmd_add),
        CommandEntry::new("edit", "Replace an expense's fields", EDIT_USAGE, cmd_edit),
        CommandEntry::new("delete", "Remove an expense", DELETE_USAGE, cmd_delete),
    ]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[], &[])?;
    let draft = draft_from(&parsed.positionals, ADD_USAGE)?;
    let expense = context.store.add(draft, context.clock.as_ref())?;
    io::print_success(format!(
        "Added #{} {}",
        context.store.len(),
        describe(&expense, &context.config.currency)
    ));
    Ok(())
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[], &[])?;
    let Some((reference, fields)) = parsed.positionals.split_first() else {
        return Err(usage(EDIT_USAGE));
    };
    let id = context.resolve_expense(reference)?.id;
    let draft = draft_from(fields, EDIT_USAGE)?;
    let expense = context.store.update(id, draft)?;
    io::print_success(format!(
        "Updated {}",
        describe(&expense, &context.config.currency)
    ));
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[], &["yes"])?;
    let [reference] = parsed.positionals.as_slice() else {
        return Err(usage(DELETE_USAGE));
    };
    let target = context.resolve_expense(reference)?;
    let (id, label) = (target.id, describe(target, &context.config.currency));

    if !parsed.has("yes") {
        if context.mode == CliMode::Script {
            return Err(CommandError::InvalidArguments(format!(
                "Deleting {label} needs confirmation; rerun with --yes."
            )));
        }
        let prompt = format!("Delete {label}?");
        if !io::confirm_action(&context.theme, &prompt, false)? {
            io::print_info("Deletion cancelled.");
            return Ok(());
        }
    }

    context.store.delete(id)?;
    io::print_success(format!("Deleted {label}"));
    Ok(())
}

/// Builds a draft from `<date> <amount> <category> <description...>`.
fn draft_from(fields: &[&str], usage_line: &str) -> Result<ExpenseDraft, CommandError> {
    let [date, amount, category, description @ ..] = fields else {
        return Err(usage(usage_line));
    };
    if description.is_empty() {
        return Err(usage(usage_line));
    }
    let valid = ExpenseDraft::parse(date, amount, category, &description.join(" "))?;
    Ok(valid.into())
}

pub(crate) fn short_id(expense: &Expense) -> String {
    expense.id.to_string().chars().take(8).collect()
}

fn describe(expense: &Expense, currency: &str) -> String {
    format!(
        "[{}] {} {} {} \"{}\"",
        short_id(expense),
        expense.date_label(),
        expense.category,
        CodeCurrencyFormatter.format_amount(expense.amount, currency),
        expense.description
    )
}

fn usage(line: &str) -> CommandError {
    CommandError::InvalidArguments(format!("usage: {line}"))
}
