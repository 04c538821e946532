use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::report::TrendPoint;
use crate::models::transaction::Transaction;

/// Builds the month-by-month deposit/withdrawal series for the trend chart.
pub struct TrendService;

impl TrendService {
    pub fn new() -> Self {
        Self
    }

    /// Bucket transactions by the `"YYYY-MM"` prefix of their timestamp.
    ///
    /// - entries without a timestamp are left out of the series entirely
    /// - deposits add `amount`, everything else adds `withdrawal_amount`,
    ///   absent amounts count as 0
    /// - one point per month present in the input, ascending by key
    ///
    /// Empty input gives an empty series; the caller shows its empty state.
    pub fn monthly_trend(&self, transactions: &[Transaction]) -> Vec<TrendPoint> {
        // The key is fixed-width and zero-padded, so BTreeMap order is
        // chronological order.
        let mut buckets: BTreeMap<String, (f64, f64)> = BTreeMap::new();

        for tx in transactions {
            let Some(key) = tx.month_key() else {
                continue;
            };
            let bucket = buckets.entry(key).or_insert((0.0, 0.0));
            if tx.is_deposit() {
                bucket.0 += tx.value();
            } else {
                bucket.1 += tx.value();
            }
        }

        buckets
            .into_iter()
            .map(|(month_key, (deposits_total, withdrawals_total))| TrendPoint {
                label: month_label(&month_key),
                month_key,
                deposits_total,
                withdrawals_total,
            })
            .collect()
    }
}

impl Default for TrendService {
    fn default() -> Self {
        Self::new()
    }
}

/// `"2024-01"` → `"Jan 24"`. Keys that are not a valid year-month are shown
/// as-is.
pub fn month_label(month_key: &str) -> String {
    NaiveDate::parse_from_str(&format!("{month_key}-01"), "%Y-%m-%d")
        .map(|d| d.format("%b %y").to_string())
        .unwrap_or_else(|_| month_key.to_string())
}
