use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::format::{format_amount, DisplayFormat};
use crate::models::transaction::{Transaction, TransactionType};

/// Type selector of the history view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TypeFilter {
    #[default]
    All,
    Only(TransactionType),
}

/// Category selector of the history view; matches `category_name` exactly.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

/// Every control of the history view in one value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransactionFilter {
    pub kind: TypeFilter,
    pub category: CategoryFilter,
    pub query: String,
}

impl TransactionFilter {
    pub fn with_kind(mut self, kind: TransactionType) -> Self {
        self.kind = TypeFilter::Only(kind);
        self
    }

    pub fn with_category(mut self, name: impl Into<String>) -> Self {
        self.category = CategoryFilter::Named(name.into());
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }
}

/// Filters and searches the transaction history.
pub struct FilterService;

impl FilterService {
    pub fn new() -> Self {
        Self
    }

    /// Transactions passing every active filter, in their original order.
    pub fn filter<'a>(
        &self,
        transactions: &'a [Transaction],
        filter: &TransactionFilter,
        format: &DisplayFormat,
    ) -> Vec<&'a Transaction> {
        let blank = filter.query.trim().is_empty();
        let query = filter.query.to_lowercase();
        transactions
            .iter()
            .filter(|tx| match filter.kind {
                TypeFilter::All => true,
                TypeFilter::Only(kind) => tx.transaction_type == kind,
            })
            .filter(|tx| match &filter.category {
                CategoryFilter::All => true,
                CategoryFilter::Named(name) => tx.category_name.as_deref() == Some(name.as_str()),
            })
            .filter(|tx| blank || self.matches_query(tx, &query, format))
            .collect()
    }

    /// Case-insensitive substring search over what the user sees: the type
    /// word, category name, formatted amount, note, and display date-time.
    /// `query` must already be lower-cased; surrounding spaces are significant.
    pub fn matches_query(&self, tx: &Transaction, query: &str, format: &DisplayFormat) -> bool {
        tx.transaction_type.search_word().contains(query)
            || tx
                .category_name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(query))
            || format_amount(tx.value()).contains(query)
            || tx
                .note
                .as_deref()
                .is_some_and(|note| note.to_lowercase().contains(query))
            || format
                .date_time(tx.date_time.as_deref())
                .to_lowercase()
                .contains(query)
    }

    /// Distinct non-empty category names seen in the history, first-seen
    /// order. Categories without transactions are not offered.
    pub fn category_options(&self, transactions: &[Transaction]) -> Vec<String> {
        let mut seen = HashSet::new();
        transactions
            .iter()
            .filter_map(|tx| tx.category_name.as_deref())
            .filter(|name| !name.is_empty() && seen.insert(*name))
            .map(str::to_string)
            .collect()
    }
}

impl Default for FilterService {
    fn default() -> Self {
        Self::new()
    }
}
