use std::{fs, path::Path};

use chrono::{NaiveDate, TimeZone, Utc};
use tempfile::tempdir;
use tracker_core::{storage::ExpenseStorage, ExpenseStore, FixedClock};
use tracker_domain::{Category, Expense, ExpenseDraft};
use tracker_storage_json::{JsonExpenseStorage, BACKUP_DIR_NAME, DATA_FILE_NAME};

fn sample(description: &str, amount: f64) -> Expense {
    let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
    let valid = ExpenseDraft::new(date, amount, Category::Food, description)
        .validate()
        .expect("valid draft");
    Expense::from_valid(valid, Utc.with_ymd_and_hms(2024, 1, 5, 9, 30, 0).unwrap())
}

/// Backup file names, newest first.
fn backup_names(data_dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(data_dir.join(BACKUP_DIR_NAME))
        .expect("read backups")
        .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names.reverse();
    names
}

#[test]
fn missing_file_loads_as_empty_list() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonExpenseStorage::new(dir.path()).expect("create storage");
    assert!(storage.load().expect("load").is_empty());
    assert!(!dir.path().join(DATA_FILE_NAME).exists());
}

#[test]
fn save_and_load_round_trip() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonExpenseStorage::new(dir.path()).expect("create storage");
    let expenses = vec![sample("Lunch", 12.5), sample("Dinner", 30.25)];

    storage.save(&expenses).expect("save");
    assert_eq!(storage.load().expect("load"), expenses);

    let raw = fs::read_to_string(dir.path().join(DATA_FILE_NAME)).expect("read blob");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(value["schemaVersion"], 1);
    assert_eq!(value["expenses"][0]["description"], "Lunch");
    assert_eq!(value["expenses"][0]["createdAt"], "2024-01-05T09:30:00Z");
    assert!(!dir.path().join("expenses.json.tmp").exists());
}

#[test]
fn overwrites_leave_a_backup_of_the_previous_blob() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonExpenseStorage::new(dir.path()).expect("create storage");
    let first = vec![sample("Lunch", 12.5)];

    storage.save(&first).expect("first save");
    assert!(backup_names(dir.path()).is_empty());

    storage
        .save(&[sample("Lunch", 12.5), sample("Taxi", 18.0)])
        .expect("second save");
    let backups = backup_names(dir.path());
    assert_eq!(backups.len(), 1);
    assert!(backups[0].starts_with("expenses_"));

    let previous = JsonExpenseStorage::new(dir.path().join("restored")).expect("create storage");
    fs::copy(
        dir.path().join(BACKUP_DIR_NAME).join(&backups[0]),
        dir.path().join("restored").join(DATA_FILE_NAME),
    )
    .expect("copy backup");
    assert_eq!(previous.load().expect("load backup"), first);
}

#[test]
fn rapid_saves_keep_one_backup_per_overwrite() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonExpenseStorage::new(dir.path()).expect("create storage");
    for count in 1..=4 {
        let expenses: Vec<Expense> = (0..count).map(|n| sample("Snack", 1.0 + n as f64)).collect();
        storage.save(&expenses).expect("save");
    }
    assert_eq!(backup_names(dir.path()).len(), 3);
}

#[test]
fn backups_are_pruned_to_retention() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonExpenseStorage::with_retention(dir.path(), 3).expect("create storage");
    storage.save(&[sample("Lunch", 12.5)]).expect("seed");

    for day in 1..=6 {
        let name = format!("expenses_202001{day:02}_120000_000.json");
        fs::write(dir.path().join(BACKUP_DIR_NAME).join(name), "[]").expect("write stale backup");
    }
    storage.save(&[sample("Taxi", 18.0)]).expect("save");

    let ids = backup_names(dir.path());
    assert_eq!(ids.len(), 3, "kept {ids:?}");
    assert!(!ids[0].starts_with("expenses_2020"));
    assert_eq!(
        &ids[1..],
        ["expenses_20200106_120000_000.json", "expenses_20200105_120000_000.json"]
    );
}

#[test]
fn legacy_bare_arrays_still_load() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonExpenseStorage::new(dir.path()).expect("create storage");
    let expenses = vec![sample("Groceries", 54.3)];
    fs::write(
        dir.path().join(DATA_FILE_NAME),
        serde_json::to_string(&expenses).expect("serialize"),
    )
    .expect("write legacy blob");

    assert_eq!(storage.load().expect("load"), expenses);
}

#[test]
fn corrupt_blob_is_reported() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonExpenseStorage::new(dir.path()).expect("create storage");
    fs::write(dir.path().join(DATA_FILE_NAME), "{ not json").expect("write");
    assert!(storage.load().is_err());
}

#[test]
fn store_persists_through_json_storage() {
    let dir = tempdir().expect("tempdir");
    let clock = FixedClock::on(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    let draft = ExpenseDraft::new(
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        9.99,
        Category::Entertainment,
        "Streaming",
    );

    let added = {
        let storage = JsonExpenseStorage::new(dir.path()).expect("create storage");
        let mut store = ExpenseStore::open(Box::new(storage)).expect("open");
        store.add(draft, &clock).expect("add")
    };

    let reopened = ExpenseStore::open(Box::new(
        JsonExpenseStorage::new(dir.path()).expect("create storage"),
    ))
    .expect("reopen");
    assert_eq!(reopened.expenses(), &[added]);
}
