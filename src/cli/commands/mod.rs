//! Shell command handlers and their shared argument helpers.

pub mod config;
pub mod expense;
pub mod export;
pub mod report;
pub mod system;

use chrono::NaiveDate;
use tracker_domain::{Category, DATE_FORMAT};

use crate::cli::core::CommandError;
use crate::cli::registry::CommandRegistry;

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    for entry in expense::definitions()
        .into_iter()
        .chain(report::definitions())
        .chain(export::definitions())
        .chain(config::definitions())
        .chain(system::definitions())
    {
        registry.register(entry);
    }
}

/// Positional arguments plus `--flag value` / `--flag=value` options.
/// A bare `--` ends option parsing.
#[derive(Debug, Default)]
pub(crate) struct ParsedArgs<'a> {
    pub positionals: Vec<&'a str>,
    options: Vec<(&'a str, Option<&'a str>)>,
}

impl<'a> ParsedArgs<'a> {
    /// `value_flags` take a value; `switches` don't. Flags are given without dashes.
    pub fn parse(
        args: &[&'a str],
        value_flags: &[&str],
        switches: &[&str],
    ) -> Result<Self, CommandError> {
        let mut parsed = ParsedArgs::default();
        let mut iter = args.iter().copied();
        while let Some(arg) = iter.next() {
            if arg == "--" {
                parsed.positionals.extend(iter.by_ref());
                break;
            }
            let Some(flag) = arg.strip_prefix("--") else {
                parsed.positionals.push(arg);
                continue;
            };
            let (name, inline) = match flag.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (flag, None),
            };
            if switches.contains(&name) && inline.is_none() {
                parsed.options.push((name, None));
            } else if value_flags.contains(&name) {
                let value = match inline {
                    Some(value) => value,
                    None => iter.next().ok_or_else(|| {
                        CommandError::InvalidArguments(format!("`--{name}` needs a value"))
                    })?,
                };
                parsed.options.push((name, Some(value)));
            } else {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown option `{arg}`"
                )));
            }
        }
        Ok(parsed)
    }

    pub fn has(&self, name: &str) -> bool {
        self.options.iter().any(|(flag, _)| *flag == name)
    }

    /// Last value given for `name`.
    pub fn value(&self, name: &str) -> Option<&'a str> {
        self.values(name).pop()
    }

    pub fn values(&self, name: &str) -> Vec<&'a str> {
        self.options
            .iter()
            .filter(|(flag, _)| *flag == name)
            .filter_map(|(_, value)| *value)
            .collect()
    }

    pub fn date(&self, name: &str) -> Result<Option<NaiveDate>, CommandError> {
        self.value(name).map(|raw| parse_date(name, raw)).transpose()
    }

    pub fn categories(&self, name: &str) -> Result<Vec<Category>, CommandError> {
        self.values(name)
            .into_iter()
            .map(parse_category)
            .collect()
    }
}

pub(crate) fn parse_date(flag: &str, raw: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        CommandError::InvalidArguments(format!("`--{flag}` expects YYYY-MM-DD, got `{raw}`"))
    })
}

pub(crate) fn parse_category(raw: &str) -> Result<Category, CommandError> {
    raw.parse::<Category>()
        .map_err(|err| CommandError::InvalidArguments(err.to_string()))
}
