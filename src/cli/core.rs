//! Shell context, dispatch and error reporting.

use std::{fs, io, path::PathBuf};

use dialoguer::theme::ColorfulTheme;
use rustyline::error::ReadlineError;
use strsim::levenshtein;
use thiserror::Error;
use tracing::{debug, info};
use tracker_config::{resolve_data_home, Config, ConfigError, ConfigManager};
use tracker_core::{Clock, CoreError, ExpenseStore, SystemClock};
use tracker_domain::{Expense, ValidationErrors};
use tracker_storage_json::JsonExpenseStorage;
use uuid::Uuid;

use super::commands;
use super::io as cli_io;
use super::output::{self, OutputPreferences};
use super::registry::{CommandEntry, CommandRegistry};
use super::words::tokenize;

/// Directory under the data home holding `expenses.json` and its backups.
pub const DATA_DIR_NAME: &str = "data";

/// Shortest id prefix accepted in place of a full UUID.
const MIN_ID_PREFIX: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

/// Failure of a single command. Reported, after which the shell keeps running.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<ValidationErrors> for CommandError {
    fn from(errors: ValidationErrors) -> Self {
        CommandError::Core(CoreError::Validation(errors))
    }
}

/// Failure that ends the shell.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<ReadlineError> for CliError {
    fn from(err: ReadlineError) -> Self {
        CliError::Input(err.to_string())
    }
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    pub store: ExpenseStore,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub data_home: PathBuf,
    pub clock: Box<dyn Clock>,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_home(mode, resolve_data_home())
    }

    /// Opens config and expense data under `home`.
    pub fn with_home(mode: CliMode, home: PathBuf) -> Result<Self, CliError> {
        fs::create_dir_all(&home)?;
        let config_manager = ConfigManager::with_base_dir(home.clone())?;
        let config = config_manager.load()?;
        apply_output_preferences(&config);

        let storage =
            JsonExpenseStorage::with_retention(home.join(DATA_DIR_NAME), config.backup_retention)?;
        let store = ExpenseStore::open(Box::new(storage))?;

        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        info!(home = %home.display(), records = store.len(), ?mode, "shell context ready");
        Ok(Self {
            mode,
            registry,
            theme: ColorfulTheme::default(),
            store,
            config_manager,
            config,
            data_home: home,
            clock: Box::new(SystemClock),
            last_command: None,
            running: true,
        })
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn prompt(&self) -> String {
        format!("expenses [{}]> ", self.store.len())
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            debug!(command, args = args.len(), "dispatching command");
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    /// Tokenizes and runs one command line. Blank lines and `#` comment lines are no-ops.
    pub(crate) fn execute_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(LoopControl::Continue);
        }

        let tokens = match tokenize(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                self.print_warning(&err.to_string());
                return Ok(LoopControl::Continue);
            }
        };
        let Some((raw, rest)) = tokens.split_first() else {
            return Ok(LoopControl::Continue);
        };

        self.last_command = Some(line.to_string());
        let args: Vec<&str> = rest.iter().map(String::as_str).collect();
        let control = self.dispatch(&raw.to_lowercase(), raw, &args)?;
        if control == LoopControl::Exit {
            self.running = false;
        }
        Ok(control)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &needle), name))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, name)) = best {
            if distance <= 3 {
                cli_io::print_info(format!("Suggestion: `{}`?", name));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(cli_io::confirm_action(&self.theme, "Exit shell?", true)?)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                self.print_error(&message);
                cli_io::print_hint("Use `help <command>` for usage details.");
            }
            CommandError::Core(CoreError::Validation(errors)) => {
                self.print_error("The expense was not saved:");
                for (field, message) in errors.iter() {
                    cli_io::print_info(format!("  {field}: {message}"));
                }
            }
            CommandError::Core(CoreError::EmptyExport) => {
                self.print_warning("Nothing to export: no expenses match the selection.");
            }
            other => self.print_error(&other.to_string()),
        }
        Ok(())
    }

    pub(crate) fn print_error(&self, message: &str) {
        cli_io::print_error(message);
    }

    pub(crate) fn print_warning(&self, message: &str) {
        cli_io::print_warning(message);
    }

    pub(crate) fn persist_config(&self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        apply_output_preferences(&self.config);
        Ok(())
    }

    /// Resolves `#n` (1-based list position), a full UUID, or a unique id prefix.
    pub(crate) fn resolve_expense(&self, reference: &str) -> Result<&Expense, CommandError> {
        let reference = reference.trim();
        let expenses = self.store.expenses();

        if let Some(position) = reference.strip_prefix('#') {
            let index: usize = position.parse().map_err(|_| {
                CommandError::InvalidArguments(format!("`{reference}` is not a list position"))
            })?;
            return index
                .checked_sub(1)
                .and_then(|idx| expenses.get(idx))
                .ok_or_else(|| {
                    CommandError::InvalidArguments(format!(
                        "No expense at position {index} (there are {}).",
                        expenses.len()
                    ))
                });
        }

        if let Ok(id) = Uuid::parse_str(reference) {
            return self
                .store
                .get(id)
                .ok_or(CommandError::Core(CoreError::ExpenseNotFound(id)));
        }

        if reference.len() < MIN_ID_PREFIX {
            return Err(CommandError::InvalidArguments(format!(
                "`{reference}` is too short; use `#<position>` or at least {MIN_ID_PREFIX} id characters"
            )));
        }
        let needle = reference.to_ascii_lowercase();
        let mut matches = expenses
            .iter()
            .filter(|expense| expense.id.to_string().starts_with(&needle));
        match (matches.next(), matches.next()) {
            (Some(expense), None) => Ok(expense),
            (None, _) => Err(CommandError::InvalidArguments(format!(
                "No expense id starts with `{reference}`."
            ))),
            (Some(_), Some(_)) => Err(CommandError::InvalidArguments(format!(
                "`{reference}` matches several expenses; use more characters."
            ))),
        }
    }
}

fn apply_output_preferences(config: &Config) {
    output::set_preferences(OutputPreferences {
        color_enabled: config.ui_color_enabled,
    });
}

#[cfg(test)]
pub(crate) fn process_script(
    home: &std::path::Path,
    lines: &[&str],
) -> Result<ShellContext, CliError> {
    let mut app = ShellContext::with_home(CliMode::Script, home.to_path_buf())?;
    for line in lines {
        match app.execute_line(line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => app.report_error(err)?,
        }
    }
    Ok(app)
}
