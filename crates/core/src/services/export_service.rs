use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::format::{format_amount, format_signed, DisplayFormat};
use crate::models::category::Category;
use crate::models::transaction::Transaction;
use crate::services::goal_service::GoalService;

/// UTF-8 byte-order mark; spreadsheet apps need it to pick the encoding.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// How a transaction is matched to its category for the goal columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CategoryJoin {
    /// By display name. Two categories sharing a name are conflated; this is
    /// what existing exports contain.
    #[default]
    ByName,
    /// By `category_id`; transactions without one get zero goal columns.
    ById,
}

/// Writes the filtered history as a CSV file.
pub struct ExportService {
    goal_service: GoalService,
}

impl ExportService {
    pub fn new() -> Self {
        Self {
            goal_service: GoalService::new(),
        }
    }

    /// Column titles, currency columns suffixed with the configured symbol.
    pub fn headers(&self, format: &DisplayFormat) -> Vec<String> {
        let cur = &format.currency_symbol;
        vec![
            "Type".to_string(),
            "Category".to_string(),
            format!("Amount ({cur})"),
            "Note".to_string(),
            "Date & Time".to_string(),
            format!("Goal ({cur})"),
            format!("Saved ({cur})"),
            format!("Remaining ({cur})"),
            "Progress (%)".to_string(),
            "Goal Reached".to_string(),
        ]
    }

    /// One CSV row for a transaction. Goal columns read 0 when no category
    /// matches.
    pub fn row(
        &self,
        tx: &Transaction,
        categories: &[Category],
        format: &DisplayFormat,
        join: CategoryJoin,
    ) -> [String; 10] {
        let category = match join {
            CategoryJoin::ByName => tx
                .category_name
                .as_deref()
                .and_then(|name| categories.iter().find(|c| c.name == name)),
            CategoryJoin::ById => tx
                .category_id
                .and_then(|id| categories.iter().find(|c| c.category_id == id)),
        };

        let (goal, saved) = category.map_or((0.0, 0.0), |c| (c.goal(), c.saved()));
        let progress = category
            .map(|c| self.goal_service.progress(c))
            .unwrap_or_default();

        [
            tx.transaction_type.to_string(),
            tx.category_name.clone().unwrap_or_default(),
            format_signed(tx.value(), tx.is_deposit()),
            tx.note.clone().unwrap_or_default(),
            format.date_time(tx.date_time.as_deref()),
            format_amount(goal),
            format_amount(saved),
            format_amount(progress.remaining),
            format!("{}", progress.percent.round() as i64),
            if progress.reached { "Yes" } else { "No" }.to_string(),
        ]
    }

    /// The export file: BOM, bare header line, then one fully quoted row per
    /// transaction, `\n`-separated with no trailing newline.
    ///
    /// Returns `Ok(None)` when there is nothing to export.
    pub fn to_csv(
        &self,
        transactions: &[&Transaction],
        categories: &[Category],
        format: &DisplayFormat,
        join: CategoryJoin,
    ) -> Result<Option<Vec<u8>>, CoreError> {
        if transactions.is_empty() {
            return Ok(None);
        }

        let mut buf = UTF8_BOM.to_vec();
        buf.extend_from_slice(self.headers(format).join(",").as_bytes());
        buf.push(b'\n');

        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(buf);
        for tx in transactions {
            writer.write_record(self.row(tx, categories, format, join))?;
        }
        let mut bytes = writer
            .into_inner()
            .map_err(|e| CoreError::Serialization(format!("CSV: {}", e.error())))?;

        if bytes.last() == Some(&b'\n') {
            bytes.pop();
        }
        Ok(Some(bytes))
    }
}

impl Default for ExportService {
    fn default() -> Self {
        Self::new()
    }
}

/// `"transaction-history-2024-02-01.csv"`
pub fn export_file_name(today: NaiveDate) -> String {
    format!("transaction-history-{}.csv", today.format("%Y-%m-%d"))
}
