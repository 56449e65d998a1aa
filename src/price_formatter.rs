// price_formatter.rs
// Purpose: Render model output (units of $100,000) as a currency string

use serde::{Deserialize, Serialize};

/// Model targets are expressed in hundreds of thousands of dollars
pub const PRICE_UNIT: f64 = 100_000.0;

pub const DEFAULT_CURRENCY_SYMBOL: &str = "$";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceFormatter {
    pub currency_symbol: String,
    pub unit: f64,
}

impl Default for PriceFormatter {
    fn default() -> Self {
        Self {
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            unit: PRICE_UNIT,
        }
    }
}

impl PriceFormatter {
    pub fn new(currency_symbol: impl Into<String>, unit: f64) -> Self {
        Self {
            currency_symbol: currency_symbol.into(),
            unit,
        }
    }

    /// Dollar amount for a raw model output
    pub fn amount(&self, scalar: f64) -> f64 {
        scalar * self.unit
    }

    /// `1.0` -> `"$100,000.00"`; negatives render as `"-$1,234.50"`
    pub fn format(&self, scalar: f64) -> String {
        let amount = self.amount(scalar);
        if !amount.is_finite() {
            return "n/a".to_string();
        }
        let fixed = format!("{:.2}", amount.abs());
        let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
        let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
        format!(
            "{sign}{}{}.{cents}",
            self.currency_symbol,
            group_thousands(whole)
        )
    }
}

/// Shorthand using the default `$` and 100,000 unit
pub fn format_price(scalar: f64) -> String {
    PriceFormatter::default().format(scalar)
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
