//! Dashboard configuration.
//!
//! Read from a JSON file whose sections are all optional; a section that
//! is present only needs the fields it changes. Sections load
//! independently, so one malformed section falls back to its defaults
//! without discarding the others:
//!
//! ```json
//! {
//!   "display": { "max_tickers_per_row": 3 },
//!   "currency": { "default": "EUR", "symbol": "€" },
//!   "crypto": { "ids": { "PEPE": "pepe" } },
//!   "watch": { "interval_secs": 60 }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tickerboard_core::AssetRegistry;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub colors: ColorConfig,
    pub display: DisplayConfig,
    pub symbols: SymbolConfig,
    pub currency: CurrencyConfig,
    pub crypto: CryptoConfig,
    pub watch: WatchConfig,
}

/// `#RRGGBB` colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub positive: String,
    pub negative: String,
    pub neutral: String,
    pub ticker: String,
    pub price: String,
    pub background: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            positive: String::from("#00FF00"),
            negative: String::from("#FF0000"),
            neutral: String::from("#FFFFFF"),
            ticker: String::from("#00FFFF"),
            price: String::from("#FFFFFF"),
            background: String::from("#000000"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub max_tickers_per_row: usize,
    pub max_tickers: usize,
    pub chart_height: usize,
    pub chart_width: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_tickers_per_row: 4,
            max_tickers: 12,
            chart_height: 8,
            chart_width: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolConfig {
    pub up: String,
    pub down: String,
}

impl Default for SymbolConfig {
    fn default() -> Self {
        Self {
            up: String::from("▲"),
            down: String::from("▼"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyConfig {
    /// Quote currency requested from the crypto provider.
    pub default: String,
    /// Prefix used when formatting prices.
    pub symbol: String,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            default: String::from("USD"),
            symbol: String::from("$"),
        }
    }
}

impl CurrencyConfig {
    /// Price prefix for quotes in `code`. The configured symbol belongs to
    /// the configured default; other codes use their usual sign, or the code
    /// itself when they have none.
    pub fn symbol_for(&self, code: &str) -> String {
        if code.eq_ignore_ascii_case(&self.default) {
            return self.symbol.clone();
        }

        let sign = match code.to_ascii_uppercase().as_str() {
            "USD" | "AUD" | "CAD" | "NZD" | "HKD" | "SGD" => "$",
            "EUR" => "€",
            "GBP" => "£",
            "JPY" | "CNY" => "¥",
            "INR" => "₹",
            "KRW" => "₩",
            "BTC" => "₿",
            _ => return format!("{} ", code.to_ascii_uppercase()),
        };
        sign.to_owned()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// Extra or overriding ticker -> CoinGecko id entries.
    pub ids: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub interval_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { interval_secs: 30 }
    }
}

impl Config {
    /// Loads `path`, falling back to defaults when the file is missing,
    /// unreadable or not a JSON object, and per section when one section
    /// does not match its schema.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Self::default();
        }

        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(path = %path.display(), %error, "failed to read config, using defaults");
                return Self::default();
            }
        };

        let root = match serde_json::from_str::<Map<String, Value>>(&raw) {
            Ok(root) => root,
            Err(error) => {
                warn!(path = %path.display(), %error, "failed to parse config, using defaults");
                return Self::default();
            }
        };

        Self {
            colors: section(&root, "colors", path),
            display: section(&root, "display", path),
            symbols: section(&root, "symbols", path),
            currency: section(&root, "currency", path),
            crypto: section(&root, "crypto", path),
            watch: section(&root, "watch", path),
        }
    }

    /// Default crypto table extended with `crypto.ids`. Invalid entries are
    /// skipped with a warning.
    pub fn registry(&self) -> AssetRegistry {
        let mut registry = AssetRegistry::default();
        for (ticker, id) in &self.crypto.ids {
            if let Err(error) = registry.extend([(ticker.as_str(), id.as_str())]) {
                warn!(%ticker, %error, "ignoring crypto id entry");
            }
        }
        registry
    }
}

fn section<T>(root: &Map<String, Value>, name: &str, path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    let Some(value) = root.get(name) else {
        return T::default();
    };

    T::deserialize(value).unwrap_or_else(|error| {
        warn!(
            path = %path.display(),
            section = name,
            %error,
            "invalid config section, using its defaults"
        );
        T::default()
    })
}
