use serde::{Deserialize, Serialize};

use super::lenient;

/// Direction of a ledger entry.
///
/// The backend sends `"DEPOSIT"` / `"WITHDRAWAL"`; anything that is not a
/// deposit is read as a withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
}

impl TransactionType {
    /// What a record with a missing type counts as.
    pub fn unknown() -> Self {
        TransactionType::Withdrawal
    }

    /// Lower-case word used by text search ("deposit" / "withdrawal").
    pub fn search_word(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdrawal => "withdrawal",
        }
    }

    /// Wire value (`"DEPOSIT"` / `"WITHDRAWAL"`).
    pub fn as_wire(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Withdrawal => "WITHDRAWAL",
        }
    }
}

impl From<String> for TransactionType {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("DEPOSIT") {
            TransactionType::Deposit
        } else {
            TransactionType::Withdrawal
        }
    }
}

impl From<TransactionType> for String {
    fn from(value: TransactionType) -> Self {
        value.as_wire().to_string()
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Deposit => write!(f, "Deposit"),
            TransactionType::Withdrawal => write!(f, "Withdrawal"),
        }
    }
}

/// One deposit or withdrawal as returned by the transaction history endpoint.
///
/// Read-only snapshot: a new deposit or withdrawal creates a new record on
/// the server and shows up on the next refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default, deserialize_with = "lenient::i64_opt")]
    pub id: Option<i64>,

    #[serde(default = "TransactionType::unknown", deserialize_with = "lenient::transaction_type")]
    pub transaction_type: TransactionType,

    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub category_name: Option<String>,

    #[serde(default, deserialize_with = "lenient::i64_opt")]
    pub category_id: Option<i64>,

    /// Set on deposits.
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub amount: Option<f64>,

    /// Set on withdrawals.
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub withdrawal_amount: Option<f64>,

    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub note: Option<String>,

    /// ISO-8601 timestamp, kept verbatim. The month key and date key are
    /// taken from its leading characters.
    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub date_time: Option<String>,
}

impl Transaction {
    pub fn deposit(category_name: impl Into<String>, amount: f64, date_time: impl Into<String>) -> Self {
        Self {
            id: None,
            transaction_type: TransactionType::Deposit,
            category_name: Some(category_name.into()),
            category_id: None,
            amount: Some(amount),
            withdrawal_amount: None,
            note: None,
            date_time: Some(date_time.into()),
        }
    }

    pub fn withdrawal(
        category_name: impl Into<String>,
        withdrawal_amount: f64,
        date_time: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            transaction_type: TransactionType::Withdrawal,
            category_name: Some(category_name.into()),
            category_id: None,
            amount: None,
            withdrawal_amount: Some(withdrawal_amount),
            note: None,
            date_time: Some(date_time.into()),
        }
    }

    pub fn with_category_id(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn is_deposit(&self) -> bool {
        self.transaction_type == TransactionType::Deposit
    }

    /// The amount that applies to this entry's type: `amount` for deposits,
    /// `withdrawal_amount` otherwise. Absent or non-finite values read as 0.
    pub fn value(&self) -> f64 {
        let raw = if self.is_deposit() {
            self.amount
        } else {
            self.withdrawal_amount
        };
        raw.filter(|v| v.is_finite()).unwrap_or(0.0)
    }

    /// Non-empty timestamp, if any.
    pub fn timestamp(&self) -> Option<&str> {
        self.date_time.as_deref().filter(|s| !s.is_empty())
    }

    /// `"YYYY-MM"` bucket key: the first 7 characters of the timestamp.
    pub fn month_key(&self) -> Option<String> {
        self.timestamp().map(|ts| ts.chars().take(7).collect())
    }

    /// `"YYYY-MM-DD"` key: everything before the `T` separator.
    pub fn date_key(&self) -> Option<&str> {
        self.timestamp().map(|ts| ts.split('T').next().unwrap_or(ts))
    }
}
