use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CurrencyError;

/// Currencies an account can be held in. Also used as the display currency
/// of a rollup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Vnd,
    #[default]
    Usd,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Vnd => "VND",
            Currency::Usd => "USD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "VND" => Ok(Currency::Vnd),
            "USD" => Ok(Currency::Usd),
            other => Err(format!("unsupported currency `{}`", other)),
        }
    }
}

/// Supplies conversion rates between currencies.
///
/// Implementations must behave as pure functions for a given pair: the
/// rollup calls `rate` once per account and expects the same answer each time.
pub trait RateSource {
    /// Multiplier turning an amount in `from` into an amount in `to`.
    fn rate(&self, from: Currency, to: Currency) -> Result<f64, CurrencyError>;
}

/// Directed rate table.
///
/// Only explicitly inserted directions are served unless `derive_inverse` is
/// enabled, in which case a missing `to -> from` lookup falls back to
/// `1 / rate(from -> to)`.
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    rates: HashMap<(Currency, Currency), f64>,
    derive_inverse: bool,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(
        mut self,
        from: Currency,
        to: Currency,
        rate: f64,
    ) -> Result<Self, CurrencyError> {
        self.add_rate(from, to, rate)?;
        Ok(self)
    }

    pub fn derive_inverse(mut self, enabled: bool) -> Self {
        self.derive_inverse = enabled;
        self
    }

    pub fn add_rate(
        &mut self,
        from: Currency,
        to: Currency,
        rate: f64,
    ) -> Result<(), CurrencyError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(CurrencyError::InvalidRate { from, to, rate });
        }
        self.rates.insert((from, to), rate);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl RateSource for RateTable {
    fn rate(&self, from: Currency, to: Currency) -> Result<f64, CurrencyError> {
        if from == to {
            return Ok(1.0);
        }
        if let Some(rate) = self.rates.get(&(from, to)) {
            return Ok(*rate);
        }
        if self.derive_inverse {
            if let Some(rate) = self.rates.get(&(to, from)) {
                return Ok(1.0 / rate);
            }
        }
        Err(CurrencyError::RateNotFound { from, to })
    }
}

/// Converts `amount` held in `from` into `to`.
pub fn convert(
    amount: f64,
    from: Currency,
    to: Currency,
    rates: &impl RateSource,
) -> Result<f64, CurrencyError> {
    if from == to {
        return Ok(amount);
    }
    Ok(amount * rates.rate(from, to)?)
}

/// Separators used when rendering amounts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocaleConfig {
    pub decimal_separator: char,
    pub grouping_separator: char,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            decimal_separator: '.',
            grouping_separator: ',',
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum NegativeStyle {
    #[default]
    Sign,
    Parentheses,
}

pub fn symbol_for(currency: Currency) -> &'static str {
    match currency {
        Currency::Usd => "$",
        Currency::Vnd => "₫",
    }
}

pub fn minor_units_for(currency: Currency) -> u8 {
    match currency {
        Currency::Vnd => 0,
        Currency::Usd => 2,
    }
}

pub fn format_number(locale: &LocaleConfig, value: f64, precision: u8) -> String {
    let rendered = format!("{:.*}", precision as usize, value.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (rendered.as_str(), None),
    };
    let mut body = group_digits(int_part, locale.grouping_separator);
    if let Some(frac) = frac_part {
        body.push(locale.decimal_separator);
        body.push_str(frac);
    }
    if value < 0.0 && body.chars().any(|ch| ch.is_ascii_digit() && ch != '0') {
        body.insert(0, '-');
    }
    body
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx != 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}

/// Renders `amount` with the currency symbol, e.g. `$1,234.50` or `(₫25,000)`.
pub fn format_currency_value(
    amount: f64,
    currency: Currency,
    locale: &LocaleConfig,
    negative_style: NegativeStyle,
) -> String {
    let body = format_number(locale, amount.abs(), minor_units_for(currency));
    let symbol = symbol_for(currency);
    let negative = amount < 0.0 && body.chars().any(|ch| ch.is_ascii_digit() && ch != '0');
    match (negative, negative_style) {
        (false, _) => format!("{}{}", symbol, body),
        (true, NegativeStyle::Sign) => format!("-{}{}", symbol, body),
        (true, NegativeStyle::Parentheses) => format!("({}{})", symbol, body),
    }
}
