//! Visible-subset selection over the expense list.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracker_domain::{Category, Expense};

/// Category clause of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(selected) => selected == category,
        }
    }
}

/// How a search query composes with the other clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Search is one more AND clause.
    #[default]
    Narrow,
    /// A present query alone decides inclusion; category and date clauses are skipped.
    Override,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SearchMode::Narrow => "narrow",
            SearchMode::Override => "override",
        })
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "narrow" => Ok(SearchMode::Narrow),
            "override" => Ok(SearchMode::Override),
            other => Err(format!(
                "unknown search mode `{other}` (expected narrow or override)"
            )),
        }
    }
}

/// Active filter criteria. The default passes every record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterSpec {
    pub category: CategoryFilter,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub search: String,
    pub search_mode: SearchMode,
}

impl FilterSpec {
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = CategoryFilter::Only(category);
        self
    }

    pub fn between(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search = query.into();
        self
    }

    pub fn with_search_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = mode;
        self
    }

    /// Returns the trimmed query, or `None` when it is blank.
    pub fn query(&self) -> Option<&str> {
        let trimmed = self.search.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    pub fn is_default(&self) -> bool {
        self.category == CategoryFilter::All
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.query().is_none()
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        let search = self.query().map(|query| search_matches(expense, query));
        if let (Some(found), SearchMode::Override) = (search, self.search_mode) {
            return found;
        }
        self.category.matches(expense.category)
            && date_in_range(expense.date, self.start_date, self.end_date)
            && search.unwrap_or(true)
    }
}

/// Returns the records passing `spec`, in input order.
pub fn filter<'a>(records: &'a [Expense], spec: &FilterSpec) -> Vec<&'a Expense> {
    records.iter().filter(|expense| spec.matches(expense)).collect()
}

/// Inclusive date bounds; an absent bound always passes.
pub(crate) fn date_in_range(
    date: NaiveDate,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> bool {
    start.map_or(true, |start| date >= start) && end.map_or(true, |end| date <= end)
}

fn search_matches(expense: &Expense, query: &str) -> bool {
    let needle = query.to_lowercase();
    expense.description.to_lowercase().contains(&needle)
        || expense.category.name().to_lowercase().contains(&needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tracker_domain::ExpenseDraft;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(on: NaiveDate, amount: f64, category: Category, description: &str) -> Expense {
        let draft = ExpenseDraft::new(on, amount, category, description);
        Expense::from_valid(draft.validate().unwrap(), Utc::now())
    }

    fn sample() -> Vec<Expense> {
        vec![
            expense(date(2024, 1, 5), 12.5, Category::Food, "Lunch with Sam"),
            expense(date(2024, 1, 20), 60.0, Category::Shopping, "Shoes"),
            expense(date(2024, 2, 10), 40.0, Category::Bills, "Internet"),
            expense(date(2024, 3, 1), 9.0, Category::Food, "Coffee beans"),
        ]
    }

    fn descriptions(records: &[&Expense]) -> Vec<String> {
        records.iter().map(|e| e.description.clone()).collect()
    }

    #[test]
    fn default_spec_returns_everything_in_order() {
        let records = sample();
        let visible = filter(&records, &FilterSpec::default());
        assert_eq!(visible.len(), records.len());
        assert!(visible.iter().zip(&records).all(|(a, b)| *a == b));
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let records = sample();
        let spec = FilterSpec::default().between(Some(date(2024, 1, 20)), Some(date(2024, 2, 10)));
        assert_eq!(
            descriptions(&filter(&records, &spec)),
            vec!["Shoes", "Internet"]
        );
    }

    #[test]
    fn category_clause_is_exact() {
        let records = sample();
        let spec = FilterSpec::default().with_category(Category::Food);
        assert_eq!(
            descriptions(&filter(&records, &spec)),
            vec!["Lunch with Sam", "Coffee beans"]
        );
    }

    #[test]
    fn search_matches_description_or_category_ignoring_case() {
        let records = sample();
        let by_description = FilterSpec::default().with_search("INTERNET");
        assert_eq!(
            descriptions(&filter(&records, &by_description)),
            vec!["Internet"]
        );
        let by_category = FilterSpec::default().with_search("shop");
        assert_eq!(descriptions(&filter(&records, &by_category)), vec!["Shoes"]);
    }

    #[test]
    fn blank_search_is_ignored() {
        let records = sample();
        let spec = FilterSpec::default().with_search("   ");
        assert!(spec.is_default());
        assert_eq!(filter(&records, &spec).len(), 4);
    }

    #[test]
    fn narrow_mode_ands_search_with_other_clauses() {
        let records = sample();
        let spec = FilterSpec::default()
            .with_category(Category::Bills)
            .with_search("coffee");
        assert!(filter(&records, &spec).is_empty());
    }

    #[test]
    fn override_mode_lets_search_bypass_category_and_dates() {
        let records = sample();
        let spec = FilterSpec::default()
            .with_category(Category::Bills)
            .between(Some(date(2024, 2, 1)), Some(date(2024, 2, 28)))
            .with_search("coffee")
            .with_search_mode(SearchMode::Override);
        assert_eq!(
            descriptions(&filter(&records, &spec)),
            vec!["Coffee beans"]
        );
    }

    #[test]
    fn override_mode_without_query_applies_other_clauses() {
        let records = sample();
        let spec = FilterSpec::default()
            .with_category(Category::Bills)
            .with_search_mode(SearchMode::Override);
        assert_eq!(descriptions(&filter(&records, &spec)), vec!["Internet"]);
    }

    #[test]
    fn filtering_is_idempotent_in_both_modes() {
        let records = sample();
        for mode in [SearchMode::Narrow, SearchMode::Override] {
            let spec = FilterSpec::default()
                .with_category(Category::Food)
                .with_search("o")
                .with_search_mode(mode);
            let once: Vec<Expense> = filter(&records, &spec).into_iter().cloned().collect();
            let twice: Vec<Expense> = filter(&once, &spec).into_iter().cloned().collect();
            assert_eq!(once, twice, "mode {mode}");
        }
    }

    #[test]
    fn search_mode_parses_from_text() {
        assert_eq!("Override".parse::<SearchMode>(), Ok(SearchMode::Override));
        assert!("both".parse::<SearchMode>().is_err());
    }
}
