use std::{fs, path::PathBuf};

use tracing::info;
use tracker_core::export::{self, ExportFormat, ExportScope};

use super::ParsedArgs;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::CommandEntry;

const USAGE: &str = "export <csv|json|html> [--dir PATH] [--name BASE] [--title TEXT] \
[--from YYYY-MM-DD] [--to YYYY-MM-DD] [--category C]...";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "export",
        "Write expenses to a CSV, JSON or HTML file",
        USAGE,
        cmd_export,
    )]
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(
        args,
        &["dir", "name", "title", "from", "to", "category"],
        &[],
    )?;
    let [format] = parsed.positionals.as_slice() else {
        return Err(CommandError::InvalidArguments(format!("usage: {USAGE}")));
    };
    let format: ExportFormat = format.parse().map_err(CommandError::InvalidArguments)?;

    let scope = ExportScope {
        start_date: parsed.date("from")?,
        end_date: parsed.date("to")?,
        categories: parsed.categories("category")?,
    };
    let mut options = context.config.export_options();
    if let Some(name) = parsed.value("name") {
        options.base_name = name.to_string();
    }
    if let Some(title) = parsed.value("title") {
        options.title = title.to_string();
    }

    let records = scope.apply(context.store.expenses());
    let artifact = export::export(&records, format, &options, context.clock.as_ref())?;

    let dir = parsed
        .value("dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| context.config.resolve_export_dir());
    fs::create_dir_all(&dir)?;
    let path = dir.join(&artifact.file_name);
    fs::write(&path, artifact.content.as_bytes())?;

    info!(path = %path.display(), records = artifact.record_count, %format, "export written");
    io::print_success(format!(
        "Exported {} record(s) to {} ({})",
        artifact.record_count,
        path.display(),
        artifact.mime_type
    ));
    Ok(())
}
