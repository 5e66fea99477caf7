use std::{
    cmp::Reverse,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::{NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tracker_core::{storage::ExpenseStorage, CoreError};
use tracker_domain::Expense;

pub const SCHEMA_VERSION: u32 = 1;
pub const DATA_FILE_NAME: &str = "expenses.json";
pub const BACKUP_DIR_NAME: &str = "backups";

const DATA_STEM: &str = "expenses";
const EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// Filesystem-backed JSON persistence for the expense list and its backups.
#[derive(Debug, Clone)]
pub struct JsonExpenseStorage {
    data_path: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeRef<'a> {
    schema_version: u32,
    expenses: &'a [Expense],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredBlob {
    #[serde(rename_all = "camelCase")]
    Envelope {
        schema_version: u32,
        expenses: Vec<Expense>,
    },
    Legacy(Vec<Expense>),
}

/// One backup file under `<data_dir>/backups`.
#[derive(Debug)]
struct BackupFile {
    path: PathBuf,
    stamp: Option<BackupStamp>,
}

/// Creation time of a backup plus a sequence number separating backups
/// written within the same millisecond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct BackupStamp {
    taken_at: NaiveDateTime,
    sequence: u32,
}

impl JsonExpenseStorage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, CoreError> {
        Self::with_retention(data_dir, DEFAULT_RETENTION)
    }

    pub fn with_retention(data_dir: impl Into<PathBuf>, retention: usize) -> Result<Self, CoreError> {
        let data_dir = data_dir.into();
        let backups_dir = data_dir.join(BACKUP_DIR_NAME);
        fs::create_dir_all(&data_dir)?;
        fs::create_dir_all(&backups_dir)?;
        Ok(Self {
            data_path: data_dir.join(DATA_FILE_NAME),
            backups_dir,
            retention: retention.max(1),
        })
    }

    /// Backups ordered newest first; files with unreadable names sort last.
    fn backups(&self) -> Result<Vec<BackupFile>, CoreError> {
        let mut backups = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION)
            {
                continue;
            }
            let stamp = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(parse_backup_name);
            backups.push(BackupFile { path, stamp });
        }
        backups.sort_by(|a, b| {
            Reverse(a.stamp)
                .cmp(&Reverse(b.stamp))
                .then_with(|| b.path.cmp(&a.path))
        });
        Ok(backups)
    }

    fn backup_existing_file(&self) -> Result<(), CoreError> {
        if !self.data_path.exists() {
            return Ok(());
        }
        fs::create_dir_all(&self.backups_dir)?;
        let backup_path = self.next_backup_path(Utc::now().naive_utc());
        fs::copy(&self.data_path, &backup_path)?;
        debug!(path = %backup_path.display(), "backup written");
        self.prune_backups()
    }

    /// First unused backup name for `now`.
    fn next_backup_path(&self, now: NaiveDateTime) -> PathBuf {
        let millis = (now.nanosecond() / 1_000_000).min(999);
        let stamp = format!("{}_{millis:03}", now.format(BACKUP_TIMESTAMP_FORMAT));
        let mut sequence = 0u32;
        loop {
            let path = self.backups_dir.join(backup_file_name(&stamp, sequence));
            if !path.exists() {
                return path;
            }
            sequence += 1;
        }
    }

    fn prune_backups(&self) -> Result<(), CoreError> {
        for backup in self.backups()?.into_iter().skip(self.retention) {
            if fs::remove_file(&backup.path).is_ok() {
                debug!(path = %backup.path.display(), "old backup pruned");
            }
        }
        Ok(())
    }
}

impl ExpenseStorage for JsonExpenseStorage {
    fn load(&self) -> Result<Vec<Expense>, CoreError> {
        match load_expenses_from_path(&self.data_path) {
            Err(CoreError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.data_path.display(), "no expense file yet");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    fn save(&self, expenses: &[Expense]) -> Result<(), CoreError> {
        self.backup_existing_file()?;
        save_expenses_to_path(expenses, &self.data_path)?;
        debug!(count = expenses.len(), path = %self.data_path.display(), "expenses saved");
        Ok(())
    }
}

/// Writes `expenses` to `path` using a temp file and rename.
fn save_expenses_to_path(expenses: &[Expense], path: &Path) -> Result<(), CoreError> {
    let tmp = tmp_path(path);
    write_atomic(&tmp, &serialize_expenses(expenses)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Reads an enveloped or legacy bare-array blob from `path`.
fn load_expenses_from_path(path: &Path) -> Result<Vec<Expense>, CoreError> {
    let data = fs::read_to_string(path)?;
    parse_blob(&data)
}

fn parse_blob(data: &str) -> Result<Vec<Expense>, CoreError> {
    match serde_json::from_str::<StoredBlob>(data)? {
        StoredBlob::Envelope {
            schema_version,
            expenses,
        } => {
            if schema_version > SCHEMA_VERSION {
                return Err(CoreError::Storage(format!(
                    "unsupported schema version {schema_version} (newest known is {SCHEMA_VERSION})"
                )));
            }
            Ok(expenses)
        }
        StoredBlob::Legacy(expenses) => {
            info!(count = expenses.len(), "loaded legacy expense array");
            Ok(expenses)
        }
    }
}

fn serialize_expenses(expenses: &[Expense]) -> Result<String, CoreError> {
    let envelope = EnvelopeRef {
        schema_version: SCHEMA_VERSION,
        expenses,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// `expenses_<stamp>.json`, with `-<n>` appended to the stamp for n > 0.
fn backup_file_name(stamp: &str, sequence: u32) -> String {
    if sequence == 0 {
        format!("{DATA_STEM}_{stamp}.{EXTENSION}")
    } else {
        format!("{DATA_STEM}_{stamp}-{sequence}.{EXTENSION}")
    }
}

fn parse_backup_name(file_name: &str) -> Option<BackupStamp> {
    let stem = file_name.strip_suffix(&format!(".{EXTENSION}"))?;
    let raw = stem.strip_prefix(&format!("{DATA_STEM}_"))?;
    let (stamp, sequence) = match raw.split_once('-') {
        Some((stamp, sequence)) => (stamp, sequence.parse().ok()?),
        None => (raw, 0),
    };
    let (seconds, millis) = stamp.rsplit_once('_')?;
    let millis: u32 = millis.parse().ok().filter(|millis| *millis < 1000)?;
    let taken_at = NaiveDateTime::parse_from_str(seconds, BACKUP_TIMESTAMP_FORMAT)
        .ok()?
        .with_nanosecond(millis * 1_000_000)?;
    Some(BackupStamp { taken_at, sequence })
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_names_parse_to_stamps() {
        let parsed = parse_backup_name("expenses_20240309_141503_042.json").unwrap();
        assert_eq!(
            parsed.taken_at.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            "2024-03-09 14:15:03.042"
        );
        assert_eq!(parsed.sequence, 0);
        assert_eq!(
            parse_backup_name("expenses_20240309_141503_042-2.json").map(|stamp| stamp.sequence),
            Some(2)
        );
        assert!(parse_backup_name("expenses_garbage.json").is_none());
        assert!(parse_backup_name("notes_20240309_141503_042.json").is_none());
    }

    #[test]
    fn same_millisecond_backups_get_distinct_names() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonExpenseStorage::new(dir.path()).unwrap();
        let now = chrono::NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|day| day.and_hms_milli_opt(14, 15, 3, 42))
            .unwrap();

        let first = storage.next_backup_path(now);
        fs::write(&first, "[]").unwrap();
        let second = storage.next_backup_path(now);
        assert_ne!(first, second);
        assert!(second.ends_with("expenses_20240309_141503_042-1.json"));

        fs::write(&second, "[]").unwrap();
        let order: Vec<PathBuf> = storage.backups().unwrap().into_iter().map(|b| b.path).collect();
        assert_eq!(order, [second, first]);
    }

    #[test]
    fn tmp_path_appends_suffix() {
        let path = Path::new("/data/expenses.json");
        assert_eq!(tmp_path(path), PathBuf::from("/data/expenses.json.tmp"));
    }

    #[test]
    fn newer_schema_versions_are_rejected() {
        let err = parse_blob(r#"{"schemaVersion": 9, "expenses": []}"#).unwrap_err();
        assert!(matches!(err, CoreError::Storage(_)));
    }
}
