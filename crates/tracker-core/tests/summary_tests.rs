use chrono::NaiveDate;
use tracker_core::{filter, CoreError, ExpenseStore, FilterSpec, FixedClock, SearchMode, SummaryService};
use tracker_domain::{Category, ExpenseDraft, Field, MAX_AMOUNT};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn populated_store() -> ExpenseStore {
    let clock = FixedClock::on(date(2024, 3, 20));
    let mut store = ExpenseStore::in_memory();
    let rows = [
        (date(2024, 3, 1), 9.99, Category::Food, "Groceries"),
        (date(2024, 3, 2), 120.0, Category::Bills, "Electricity"),
        (date(2024, 2, 28), 15.25, Category::Transportation, "Bus pass"),
        (date(2024, 3, 31), 33.3, Category::Entertainment, "Concert"),
        (date(2024, 1, 3), 7.0, Category::Food, "Coffee beans"),
        (date(2024, 3, 15), 64.1, Category::Shopping, "Shoes"),
    ];
    for (on, amount, category, description) in rows {
        store
            .add(ExpenseDraft::new(on, amount, category, description), &clock)
            .unwrap();
    }
    store
}

#[test]
fn breakdown_percentages_cover_the_total() {
    let store = populated_store();
    let summary = SummaryService::summarize(store.expenses(), date(2024, 3, 20));

    let percent: f64 = summary.breakdown.iter().map(|row| row.percentage).sum();
    assert!((percent - 100.0).abs() < 1e-6, "got {percent}");
    let amounts: f64 = summary.breakdown.iter().map(|row| row.amount).sum();
    assert!((amounts - summary.total_spending).abs() < 1e-9);
    assert!(summary
        .breakdown
        .windows(2)
        .all(|pair| pair[0].amount >= pair[1].amount));
    assert_eq!(
        summary.top_category.map(|top| top.category),
        Some(Category::Bills)
    );
}

#[test]
fn oversized_amounts_never_reach_the_summary() {
    let clock = FixedClock::on(date(2024, 3, 20));
    let mut store = ExpenseStore::in_memory();
    for _ in 0..2 {
        let err = store
            .add(
                ExpenseDraft::new(date(2024, 3, 1), f64::MAX, Category::Bills, "Typo"),
                &clock,
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(ref errors) if errors.contains(Field::Amount)));
        store
            .add(
                ExpenseDraft::new(date(2024, 3, 2), MAX_AMOUNT, Category::Bills, "Mortgage"),
                &clock,
            )
            .unwrap();
    }
    store
        .add(
            ExpenseDraft::new(date(2024, 3, 3), MAX_AMOUNT, Category::Shopping, "Yacht"),
            &clock,
        )
        .unwrap();

    let summary = store.summary(date(2024, 3, 20));
    assert!(summary.total_spending.is_finite());
    let percent: f64 = summary.breakdown.iter().map(|row| row.percentage).sum();
    assert!((percent - 100.0).abs() < 1e-6, "got {percent}");
    assert_eq!(summary.breakdown[0].category, Category::Bills);
}

#[test]
fn current_month_includes_both_month_edges() {
    let store = populated_store();
    let summary = store.summary(date(2024, 3, 20));
    let expected = 9.99 + 120.0 + 33.3 + 64.1;
    assert!((summary.current_month_spending - expected).abs() < 1e-9);
    assert_eq!(summary.month_start, date(2024, 3, 1));
    assert_eq!(summary.month_end, date(2024, 3, 31));
}

#[test]
fn summary_ignores_the_active_filter() {
    let store = populated_store();
    let spec = FilterSpec::default()
        .with_category(Category::Food)
        .with_search("coffee");
    let visible = filter(store.expenses(), &spec);
    assert_eq!(visible.len(), 1);

    let summary = store.summary(date(2024, 3, 20));
    assert_eq!(summary.expense_count, store.len());
}

#[test]
fn override_mode_lets_search_escape_other_criteria() {
    let store = populated_store();
    let spec = FilterSpec::default()
        .with_category(Category::Bills)
        .with_search("shoes")
        .with_search_mode(SearchMode::Override);
    let visible = filter(store.expenses(), &spec);
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].category, Category::Shopping);
}
