//! # Configuration State
//!
//! Till configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`SOMTAM_*`)
//! 2. Defaults (this file)
//!
//! Read-only after startup, so no lock.

use std::path::PathBuf;

use serde::Serialize;
use somtam_core::{Money, DEFAULT_DENOMINATIONS};
use tracing::warn;

/// Till configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Store name (displayed on receipts)
    pub store_name: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Number of decimal places for currency
    pub currency_decimals: u8,

    /// Note and coin buttons on the cash screen, largest first
    pub denominations: Vec<Money>,

    /// Spice level for items that have no menu default and none chosen
    pub fallback_spice_level: Option<String>,

    /// Database file; `None` means the platform data directory
    #[serde(skip)]
    pub database_path: Option<PathBuf>,

    /// JSON menu file; `None` means an empty catalog
    #[serde(skip)]
    pub menu_path: Option<PathBuf>,
}

impl Default for ConfigState {
    /// Defaults for a Thai street-food till: baht, standard notes.
    fn default() -> Self {
        ConfigState {
            store_name: "Somtam POS".to_string(),
            currency_symbol: "฿".to_string(),
            currency_decimals: 2,
            denominations: DEFAULT_DENOMINATIONS.to_vec(),
            fallback_spice_level: None,
            database_path: None,
            menu_path: None,
        }
    }
}

impl ConfigState {
    /// Creates a ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `SOMTAM_DB_PATH`: database file
    /// - `SOMTAM_MENU_PATH`: JSON menu file
    /// - `SOMTAM_STORE_NAME`: store name
    /// - `SOMTAM_CURRENCY_SYMBOL`: display symbol
    /// - `SOMTAM_DENOMINATIONS`: comma-separated whole-unit values, e.g. `1000,500,100`
    /// - `SOMTAM_FALLBACK_SPICE`: spice level for items without a default
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = ConfigState::default();

        if let Some(path) = lookup("SOMTAM_DB_PATH").filter(|p| !p.trim().is_empty()) {
            config.database_path = Some(PathBuf::from(path));
        }

        if let Some(path) = lookup("SOMTAM_MENU_PATH").filter(|p| !p.trim().is_empty()) {
            config.menu_path = Some(PathBuf::from(path));
        }

        if let Some(store_name) = lookup("SOMTAM_STORE_NAME") {
            config.store_name = store_name;
        }

        if let Some(symbol) = lookup("SOMTAM_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Some(level) = lookup("SOMTAM_FALLBACK_SPICE") {
            let level = level.trim();
            config.fallback_spice_level = (!level.is_empty()).then(|| level.to_string());
        }

        if let Some(raw) = lookup("SOMTAM_DENOMINATIONS") {
            match parse_denominations(&raw) {
                Some(denominations) => config.denominations = denominations,
                None => warn!(value = %raw, "Ignoring SOMTAM_DENOMINATIONS"),
            }
        }

        config
    }

    /// Formats a cent amount as a currency string.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(23750), "฿237.50");
    /// ```
    pub fn format_currency(&self, cents: i64) -> String {
        let divisor = 10_i64.pow(u32::from(self.currency_decimals));
        let whole = cents / divisor;
        let frac = (cents % divisor).abs();

        format!(
            "{}{}{}",
            if cents < 0 { "-" } else { "" },
            self.currency_symbol,
            if self.currency_decimals > 0 {
                format!(
                    "{}.{:0width$}",
                    whole.abs(),
                    frac,
                    width = usize::from(self.currency_decimals)
                )
            } else {
                whole.abs().to_string()
            }
        )
    }
}

/// Parses `"1000, 500,100"` into positive whole-unit values, largest first.
/// Returns `None` if any entry is unusable or the list is empty.
fn parse_denominations(raw: &str) -> Option<Vec<Money>> {
    let mut values = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i64>().ok().filter(|v| *v > 0).map(Money::from_major))
        .collect::<Option<Vec<Money>>>()?;

    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| b.cmp(a));
    values.dedup();
    Some(values)
}
