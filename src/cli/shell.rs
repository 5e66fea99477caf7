//! Read-eval loop shared by the interactive prompt and script mode.

use std::{
    env,
    io::{self, BufRead, Lines, StdinLock},
};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    history::DefaultHistory,
    Cmd, Context, Editor, KeyEvent,
};
use tracker_domain::Category;

use crate::cli::core::{CliError, CliMode, ShellContext};
use crate::cli::io::print_info;

/// When set, commands are read line by line from stdin instead of a prompt.
pub const SCRIPT_ENV_VAR: &str = "EXPENSE_TRACKER_CLI_SCRIPT";

pub fn run_cli() -> Result<(), CliError> {
    let mode = if env::var_os(SCRIPT_ENV_VAR).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };
    let mut context = ShellContext::new(mode)?;

    let mut source: Box<dyn LineSource> = match mode {
        CliMode::Interactive => {
            print_info("Type `help` to list commands, `exit` to quit.");
            Box::new(PromptSource::new(&context)?)
        }
        CliMode::Script => Box::new(StdinSource::new()),
    };
    drive(&mut context, source.as_mut())
}

/// What a line source produced on one read.
enum Input {
    Line(String),
    Interrupted,
    Closed,
}

/// Where command lines come from.
trait LineSource {
    fn read(&mut self, prompt: &str) -> Result<Input, CliError>;

    /// Called with each non-empty line before it runs.
    fn remember(&mut self, _line: &str) {}
}

fn drive(context: &mut ShellContext, source: &mut dyn LineSource) -> Result<(), CliError> {
    while context.running {
        let line = match source.read(&context.prompt())? {
            Input::Line(line) => line,
            Input::Interrupted if context.confirm_exit()? => break,
            Input::Interrupted => continue,
            Input::Closed => break,
        };
        if !line.trim().is_empty() {
            source.remember(line.trim());
        }
        if let Err(err) = context.execute_line(&line) {
            context.report_error(err)?;
        }
    }
    Ok(())
}

/// rustyline prompt with history and tab completion (`?` also completes).
struct PromptSource {
    editor: Editor<ShellHelper, DefaultHistory>,
}

impl PromptSource {
    fn new(context: &ShellContext) -> Result<Self, CliError> {
        let mut editor = Editor::new()?;
        editor.set_helper(Some(ShellHelper {
            completer: WordCompleter::new(context.command_names()),
        }));
        editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
        Ok(Self { editor })
    }
}

impl LineSource for PromptSource {
    fn read(&mut self, prompt: &str) -> Result<Input, CliError> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Input::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
            Err(ReadlineError::Eof) => {
                print_info("Exiting shell.");
                Ok(Input::Closed)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn remember(&mut self, line: &str) {
        // History is best effort.
        let _ = self.editor.add_history_entry(line);
    }
}

/// Newline-separated commands on stdin.
struct StdinSource {
    lines: Lines<StdinLock<'static>>,
}

impl StdinSource {
    fn new() -> Self {
        Self {
            lines: io::stdin().lock().lines(),
        }
    }
}

impl LineSource for StdinSource {
    fn read(&mut self, _prompt: &str) -> Result<Input, CliError> {
        match self.lines.next() {
            Some(line) => Ok(Input::Line(line?)),
            None => Ok(Input::Closed),
        }
    }
}

#[derive(
    rustyline::Helper,
    rustyline::Completer,
    rustyline::Hinter,
    rustyline::Highlighter,
    rustyline::Validator,
)]
struct ShellHelper {
    #[rustyline(Completer)]
    completer: WordCompleter,
}

/// Completes command names in first position and category names afterwards.
struct WordCompleter {
    commands: Vec<String>,
    categories: Vec<String>,
}

impl WordCompleter {
    fn new(names: Vec<&'static str>) -> Self {
        let mut commands: Vec<String> = names.into_iter().map(str::to_ascii_lowercase).collect();
        commands.sort();
        commands.dedup();
        Self {
            commands,
            categories: Category::ALL
                .iter()
                .map(|category| category.name().to_ascii_lowercase())
                .collect(),
        }
    }

    fn candidates(&self, before_cursor: &str) -> (usize, Vec<&str>) {
        let start = before_cursor
            .rfind(char::is_whitespace)
            .map_or(0, |idx| idx + 1);
        let pool = if before_cursor[..start].trim().is_empty() {
            &self.commands
        } else {
            &self.categories
        };
        let partial = before_cursor[start..].to_ascii_lowercase();
        let matches = pool
            .iter()
            .map(String::as_str)
            .filter(|word| word.starts_with(&partial))
            .collect();
        (start, matches)
    }
}

impl Completer for WordCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, words) = self.candidates(&line[..pos]);
        let pairs = words
            .into_iter()
            .map(|word| Pair {
                display: word.to_string(),
                replacement: word.to_string(),
            })
            .collect();
        Ok((start, pairs))
    }
}
