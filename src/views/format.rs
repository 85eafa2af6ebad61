use std::fmt::Write;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::settings::Currency;

/// Date format used by the command line, e.g. `Oct 16, 2026`.
pub const SHORT_DATE_FORMAT: &str = "%b %-d, %Y";
const FALLBACK_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Debug)]
pub struct DisplayFormat {
    currency: Currency,
    date_format: String,
}

impl DisplayFormat {
    pub fn new(currency: Currency, date_format: String) -> Self {
        Self {
            currency,
            date_format,
        }
    }

    /// Rounds and groups an amount: `1234.5` becomes `1,234.50`.
    pub fn amount(&self, amount: Decimal) -> String {
        let decimals = self.currency.decimals;
        let rounded = amount.round_dp(decimals);
        let digits = format!("{:.*}", decimals as usize, rounded.abs());
        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (digits.as_str(), None),
        };

        let mut grouped = String::new();
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push_str(&self.currency.thousands_separator);
            }
            grouped.push(digit);
        }
        if let Some(fraction) = fraction {
            grouped.push_str(&self.currency.decimal_separator);
            grouped.push_str(fraction);
        }

        if rounded.is_sign_negative() && !rounded.is_zero() {
            format!("-{}", grouped)
        } else {
            grouped
        }
    }

    /// Formatted amount with the currency symbol on the configured side.
    pub fn currency(&self, amount: Decimal) -> String {
        let formatted = self.amount(amount);
        let (sign, digits) = match formatted.strip_prefix('-') {
            Some(digits) => ("-", digits),
            None => ("", formatted.as_str()),
        };

        if self.currency.position == "after" {
            format!("{}{}{}", sign, digits, self.currency.symbol)
        } else {
            format!("{}{}{}", sign, self.currency.symbol, digits)
        }
    }

    pub fn date(&self, date: NaiveDateTime) -> String {
        format_date(date, &self.date_format)
    }
}

/// Formats with a strftime pattern, falling back to ISO dates when the
/// pattern is invalid.
pub fn format_date(date: NaiveDateTime, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(pattern)).is_ok() {
        return out;
    }

    log::warn!("Invalid date format {:?}, using {}.", pattern, FALLBACK_DATE_FORMAT);
    date.format(FALLBACK_DATE_FORMAT).to_string()
}
