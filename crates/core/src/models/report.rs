use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One calendar month of the savings trend chart.
///
/// The core generates these; the frontend just renders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// `"YYYY-MM"`, the sort and join key
    pub month_key: String,

    /// Display-only label such as `"Jan 24"`
    pub label: String,

    pub deposits_total: f64,

    pub withdrawals_total: f64,
}

/// A segment of the "by category" breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSlice {
    pub name: String,
    pub value: f64,
}

/// How far a category is towards its goal.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GoalProgress {
    /// 0..=100, clamped
    pub percent: f64,

    pub reached: bool,

    /// Never negative
    pub remaining: f64,
}

/// Coarse progress bucket used to colour progress bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressBand {
    /// Below 50%
    Started,
    /// 50% or more, not reached
    Halfway,
    Reached,
}

/// Where "now" sits relative to a category's goal deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeadlineStatus {
    Upcoming { deadline: NaiveDate, days_left: i64 },
    DueToday { deadline: NaiveDate },
    Passed { deadline: NaiveDate },
}

/// A selectable deposit date for a withdrawal, with the total deposited
/// into the category on that day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositDateOption {
    /// Raw `"YYYY-MM-DD"` key, sent back to the server as the withdrawal date
    pub date: String,

    pub total: f64,

    /// e.g. `"January 05, 2024"`; falls back to `date` when unparseable
    pub label: String,
}

/// Figures shown on the dashboard summary cards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Sum of every category's goal amount
    pub total_goal_amount: f64,

    /// Server-reported deposited subtotal
    pub total_deposited: f64,

    /// Sum of withdrawal amounts in the history
    pub total_withdrawn: f64,

    pub category_count: usize,
}
