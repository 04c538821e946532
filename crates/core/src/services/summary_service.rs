use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::format::format_long_date;
use crate::models::report::{DashboardSummary, DepositDateOption};
use crate::models::transaction::Transaction;
use crate::models::user::UserSavings;

/// Dashboard cards, the recent list, and withdrawal date options.
pub struct SummaryService;

impl SummaryService {
    pub fn new() -> Self {
        Self
    }

    /// Figures for the summary cards. `savings` is `None` before the first
    /// successful load, in which case category figures are zero.
    pub fn summary(&self, savings: Option<&UserSavings>, transactions: &[Transaction]) -> DashboardSummary {
        let categories = savings.map(|s| s.categories.as_slice()).unwrap_or_default();

        DashboardSummary {
            total_goal_amount: categories.iter().map(|c| c.goal()).sum(),
            total_deposited: savings
                .and_then(|s| s.deposited_amount_subtotal)
                .filter(|v| v.is_finite())
                .unwrap_or(0.0),
            total_withdrawn: transactions
                .iter()
                .filter(|tx| !tx.is_deposit())
                .map(Transaction::value)
                .sum(),
            category_count: categories.len(),
        }
    }

    /// The first `limit` entries, in the order the server returned them.
    pub fn recent<'a>(&self, transactions: &'a [Transaction], limit: usize) -> &'a [Transaction] {
        &transactions[..limit.min(transactions.len())]
    }

    /// Dates a withdrawal from `category_id` can draw on: every day with a
    /// timestamped deposit into that category, with the day's deposited
    /// total, oldest first.
    ///
    /// An empty result means the category has no deposits to withdraw from.
    pub fn deposit_dates(&self, transactions: &[Transaction], category_id: i64) -> Vec<DepositDateOption> {
        let mut by_date: BTreeMap<&str, f64> = BTreeMap::new();

        for tx in transactions {
            if !tx.is_deposit() || tx.category_id != Some(category_id) {
                continue;
            }
            if let Some(day) = tx.date_key() {
                *by_date.entry(day).or_insert(0.0) += tx.value();
            }
        }

        by_date
            .into_iter()
            .map(|(date, total)| DepositDateOption {
                label: NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .map(format_long_date)
                    .unwrap_or_else(|_| date.to_string()),
                date: date.to_string(),
                total,
            })
            .collect()
    }
}

impl Default for SummaryService {
    fn default() -> Self {
        Self::new()
    }
}
