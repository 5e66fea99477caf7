//! Aggregate statistics over the full expense list.

use chrono::NaiveDate;
use tracker_domain::{month_bounds, sum_amounts, Category, Expense};

use crate::time::Clock;

/// Spending attributed to one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBreakdown {
    pub category: Category,
    pub amount: f64,
    pub percentage: f64,
    pub count: usize,
}

/// The category with the highest spending.
#[derive(Debug, Clone, PartialEq)]
pub struct TopCategory {
    pub category: Category,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_spending: f64,
    pub current_month_spending: f64,
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
    pub expense_count: usize,
    /// Sorted by amount, descending; equal amounts keep first-seen order.
    pub breakdown: Vec<CategoryBreakdown>,
    pub top_category: Option<TopCategory>,
}

pub struct SummaryService;

impl SummaryService {
    /// Recomputes the summary from scratch relative to `today`.
    pub fn summarize(records: &[Expense], today: NaiveDate) -> Summary {
        let total_spending = sum_amounts(records);
        let (month_start, month_end) = month_bounds(today);
        let current_month_spending = sum_amounts(
            records
                .iter()
                .filter(|expense| expense.date >= month_start && expense.date <= month_end),
        );

        let mut breakdown: Vec<CategoryBreakdown> = Vec::new();
        for expense in records {
            match breakdown
                .iter_mut()
                .find(|entry| entry.category == expense.category)
            {
                Some(entry) => {
                    entry.amount += expense.amount;
                    entry.count += 1;
                }
                None => breakdown.push(CategoryBreakdown {
                    category: expense.category,
                    amount: expense.amount,
                    percentage: 0.0,
                    count: 1,
                }),
            }
        }
        for entry in &mut breakdown {
            entry.percentage = if total_spending > 0.0 {
                100.0 * entry.amount / total_spending
            } else {
                0.0
            };
        }
        breakdown.sort_by(|a, b| b.amount.total_cmp(&a.amount));

        let top_category = breakdown.first().map(|entry| TopCategory {
            category: entry.category,
            amount: entry.amount,
        });

        Summary {
            total_spending,
            current_month_spending,
            month_start,
            month_end,
            expense_count: records.len(),
            breakdown,
            top_category,
        }
    }

    pub fn summarize_with_clock(records: &[Expense], clock: &dyn Clock) -> Summary {
        Self::summarize(records, clock.today())
    }
}
