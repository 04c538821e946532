//! Display formatting shared by search, export, and the UI.
//!
//! Search matches against these rendered strings, not raw values, so the
//! exact output here is part of the search contract.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Placeholder for a missing timestamp.
pub const MISSING: &str = "—";

const DISPLAY_DATE_TIME: &str = "%B %d, %Y at %-I:%M %p";
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Timezone and currency used when rendering values for people.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayFormat {
    pub timezone: Tz,
    pub currency_symbol: String,
}

impl Default for DisplayFormat {
    fn default() -> Self {
        Self::new(chrono_tz::Asia::Manila, "₱")
    }
}

impl DisplayFormat {
    pub fn new(timezone: Tz, currency_symbol: impl Into<String>) -> Self {
        Self {
            timezone,
            currency_symbol: currency_symbol.into(),
        }
    }

    /// `"₱1,234.50"`
    pub fn currency(&self, value: f64) -> String {
        format!("{}{}", self.currency_symbol, format_amount(value))
    }

    /// Render an API timestamp as `"January 05, 2024 at 10:00 AM"`.
    ///
    /// - offset timestamps are converted into the display timezone
    /// - naive timestamps are taken as already local to it
    /// - bare dates are UTC midnight, converted
    /// - anything unparseable is returned verbatim, and a missing value
    ///   renders as [`MISSING`]
    pub fn date_time(&self, raw: Option<&str>) -> String {
        let raw = match raw.map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => return MISSING.to_string(),
        };

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return dt
                .with_timezone(&self.timezone)
                .format(DISPLAY_DATE_TIME)
                .to_string();
        }

        for fmt in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
                return naive.format(DISPLAY_DATE_TIME).to_string();
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                return Utc
                    .from_utc_datetime(&midnight)
                    .with_timezone(&self.timezone)
                    .format(DISPLAY_DATE_TIME)
                    .to_string();
            }
        }

        raw.to_string()
    }
}

/// Two decimals with thousands separators: `1234.5` → `"1,234.50"`.
/// Non-finite input renders as zero.
pub fn format_amount(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{}.{frac_part}", group_thousands(int_part))
}

/// `"+1,234.50"` for deposits, `"-1,234.50"` for withdrawals.
pub fn format_signed(value: f64, is_deposit: bool) -> String {
    let sign = if is_deposit { '+' } else { '-' };
    format!("{sign}{}", format_amount(value))
}

/// `"January 05, 2024"`
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

/// `"Mar 5, 2025"`
pub fn format_short_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// `"Mar 2025"`
pub fn format_month_year(date: NaiveDate) -> String {
    date.format("%b %Y").to_string()
}

/// Insert `,` every three digits from the right. Expects ASCII digits only.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Clean an amount typed into an input field: keep digits and the first
/// `.`, drop everything else.
fn sanitize_amount_input(input: &str) -> String {
    let mut seen_dot = false;
    input
        .chars()
        .filter(|c| {
            if *c == '.' {
                let keep = !seen_dot;
                seen_dot = true;
                keep
            } else {
                c.is_ascii_digit()
            }
        })
        .collect()
}

/// Live-format an amount field: `"1234.5"` → `"1,234.5"`. The fractional
/// part is kept as typed.
pub fn group_amount_input(input: &str) -> String {
    let cleaned = sanitize_amount_input(input);
    match cleaned.split_once('.') {
        Some((int_part, frac_part)) => format!("{}.{frac_part}", group_thousands(int_part)),
        None => group_thousands(&cleaned),
    }
}

/// Parse a (possibly grouped) amount field: `"1,234.50"` → `Some(1234.5)`.
pub fn parse_amount_input(input: &str) -> Option<f64> {
    let cleaned = sanitize_amount_input(input);
    if cleaned.is_empty() || cleaned == "." {
        return None;
    }
    cleaned.parse::<f64>().ok()
}
