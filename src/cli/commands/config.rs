use tracker_config::Config;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "View and change preferences",
        "config [show|set <key> <value>]",
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first().map(|action| action.to_lowercase()).as_deref() {
        None | Some("show") => show(context),
        Some("set") => {
            let [key, value @ ..] = &args[1..] else {
                return Err(set_usage());
            };
            if value.is_empty() {
                return Err(set_usage());
            }
            let key = key.to_lowercase();
            let value = value.join(" ");
            context.config.set(&key, &value)?;
            context.persist_config()?;
            io::print_success(format!(
                "{key} = {}",
                context.config.get(&key)?
            ));
            if key == "backup_retention" {
                io::print_hint("Retention applies from the next start.");
            }
            Ok(())
        }
        Some(other) => Err(CommandError::InvalidArguments(format!(
            "unknown config action `{other}` (expected show or set)"
        ))),
    }
}

fn show(context: &ShellContext) -> CommandResult {
    output_section("Configuration");
    for key in Config::KEYS {
        io::print_info(format!("  {:<18} {}", key, context.config.get(key)?));
    }
    io::print_info(format!(
        "  {:<18} {}",
        "file",
        context.config_manager.config_path().display()
    ));
    io::print_info(format!(
        "  {:<18} {}",
        "data home",
        context.data_home.display()
    ));
    Ok(())
}

fn set_usage() -> CommandError {
    CommandError::InvalidArguments(format!(
        "usage: config set <key> <value>; keys: {}",
        Config::KEYS.join(", ")
    ))
}
