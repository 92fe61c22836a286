use serde::{Deserialize, Serialize};

use crate::currency::{Currency, LocaleConfig, NegativeStyle, RateTable};
use crate::errors::CurrencyError;

/// One directed conversion rate: `1 from = rate to`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RateEntry {
    pub from: Currency,
    pub to: Currency,
    pub rate: f64,
}

/// Stores user-configurable preferences for rollups and their rendering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub display_currency: Currency,
    #[serde(default)]
    pub locale: LocaleConfig,
    #[serde(default)]
    pub negative_style: NegativeStyle,
    #[serde(default = "Config::default_rates")]
    pub rates: Vec<RateEntry>,
    /// Serve `to -> from` lookups as `1 / rate` when only `from -> to` is set.
    #[serde(default)]
    pub derive_inverse_rates: bool,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display_currency: Currency::default(),
            locale: LocaleConfig::default(),
            negative_style: NegativeStyle::default(),
            rates: Self::default_rates(),
            derive_inverse_rates: false,
            ui_color_enabled: Self::default_ui_color_enabled(),
        }
    }
}

impl Config {
    /// Both directions are listed explicitly so the default table does not
    /// depend on inverse derivation.
    pub fn default_rates() -> Vec<RateEntry> {
        vec![
            RateEntry {
                from: Currency::Vnd,
                to: Currency::Usd,
                rate: 0.00004,
            },
            RateEntry {
                from: Currency::Usd,
                to: Currency::Vnd,
                rate: 25_000.0,
            },
        ]
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    /// Builds the rate table described by this configuration.
    pub fn rate_table(&self) -> Result<RateTable, CurrencyError> {
        let mut table = RateTable::new().derive_inverse(self.derive_inverse_rates);
        for entry in &self.rates {
            table.add_rate(entry.from, entry.to, entry.rate)?;
        }
        Ok(table)
    }
}
