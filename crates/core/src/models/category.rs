use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::lenient;

/// A savings goal bucket owned by one user.
///
/// `amount` is the goal target and `savings_current_amount` the accumulated
/// balance. The server keeps the balance in line with the ledger; the client
/// only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "lenient::i64_id")]
    pub category_id: i64,

    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub name: String,

    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub amount: Option<f64>,

    #[serde(
        rename = "savingsCurrentAmount",
        default,
        deserialize_with = "lenient::f64_opt"
    )]
    pub savings_current_amount: Option<f64>,

    /// Taxonomy id (see [`super::session::CategoryType`]).
    #[serde(rename = "type", default, deserialize_with = "lenient::string_opt")]
    pub category_type: Option<String>,

    #[serde(rename = "goalDeadline", default, deserialize_with = "lenient::date_opt")]
    pub goal_deadline: Option<NaiveDate>,
}

impl Category {
    pub fn new(category_id: i64, name: impl Into<String>, goal: f64, saved: f64) -> Self {
        Self {
            category_id,
            name: name.into(),
            amount: Some(goal),
            savings_current_amount: Some(saved),
            category_type: None,
            goal_deadline: None,
        }
    }

    pub fn with_type(mut self, category_type: impl Into<String>) -> Self {
        self.category_type = Some(category_type.into());
        self
    }

    pub fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.goal_deadline = Some(deadline);
        self
    }

    /// Goal target; absent reads as 0.
    pub fn goal(&self) -> f64 {
        self.amount.filter(|v| v.is_finite()).unwrap_or(0.0)
    }

    /// Accumulated balance; absent reads as 0.
    pub fn saved(&self) -> f64 {
        self.savings_current_amount
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }
}
