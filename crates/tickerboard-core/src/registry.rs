//! Ticker classification table.
//!
//! Crypto tickers are recognised by an explicit lookup table mapping the
//! exchange ticker to the crypto provider's coin id. Anything not in the
//! table is treated as a stock.

use std::collections::BTreeMap;

use crate::{InstrumentKind, Symbol, ValidationError};

const DEFAULT_CRYPTO_IDS: [(&str, &str); 13] = [
    ("BTC", "bitcoin"),
    ("ETH", "ethereum"),
    ("ADA", "cardano"),
    ("DOT", "polkadot"),
    ("LINK", "chainlink"),
    ("LTC", "litecoin"),
    ("XRP", "ripple"),
    ("DOGE", "dogecoin"),
    ("SHIB", "shiba-inu"),
    ("MATIC", "matic-network"),
    ("AVAX", "avalanche-2"),
    ("SOL", "solana"),
    ("HBAR", "hedera-hashgraph"),
];

/// Ticker -> crypto provider id table, owned by whoever drives the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRegistry {
    crypto_ids: BTreeMap<String, String>,
}

impl Default for AssetRegistry {
    fn default() -> Self {
        let crypto_ids = DEFAULT_CRYPTO_IDS
            .iter()
            .map(|(ticker, id)| ((*ticker).to_owned(), (*id).to_owned()))
            .collect();
        Self { crypto_ids }
    }
}

impl AssetRegistry {
    /// Registry without any crypto entries; every ticker is a stock.
    pub fn empty() -> Self {
        Self {
            crypto_ids: BTreeMap::new(),
        }
    }

    /// Adds or replaces a crypto entry.
    pub fn with_entry(
        mut self,
        ticker: &str,
        provider_id: &str,
    ) -> Result<Self, ValidationError> {
        self.insert(ticker, provider_id)?;
        Ok(self)
    }

    /// Adds or replaces several crypto entries.
    pub fn extend<'a, I>(&mut self, entries: I) -> Result<(), ValidationError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (ticker, provider_id) in entries {
            self.insert(ticker, provider_id)?;
        }
        Ok(())
    }

    pub fn classify(&self, symbol: &Symbol) -> InstrumentKind {
        if self.crypto_ids.contains_key(symbol.as_str()) {
            InstrumentKind::Crypto
        } else {
            InstrumentKind::Stock
        }
    }

    /// Provider id for a crypto ticker; unknown tickers fall back to the
    /// lowercased symbol, which is what most coin ids look like.
    pub fn provider_id(&self, symbol: &Symbol) -> String {
        self.crypto_ids
            .get(symbol.as_str())
            .cloned()
            .unwrap_or_else(|| symbol.as_str().to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.crypto_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crypto_ids.is_empty()
    }

    fn insert(&mut self, ticker: &str, provider_id: &str) -> Result<(), ValidationError> {
        let symbol = Symbol::parse(ticker)?;
        let provider_id = provider_id.trim();
        if provider_id.is_empty() {
            return Err(ValidationError::EmptyProviderId {
                symbol: symbol.to_string(),
            });
        }

        self.crypto_ids
            .insert(symbol.into(), provider_id.to_ascii_lowercase());
        Ok(())
    }
}
