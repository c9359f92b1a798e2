use alloy::primitives::Address;
use std::str::FromStr;

use crate::ParkingError;

/// Receipt polling period while waiting for a purchase to be mined.
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 4_000;

/// How overlapping quote results are applied to the display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuoteOrdering {
    /// Whichever query resolves last is displayed, even if it was issued
    /// for inputs that have since changed.
    #[default]
    LastResolved,
    /// Only the most recently issued query may update the display; older
    /// results are dropped.
    LatestIssued,
}

impl FromStr for QuoteOrdering {
    type Err = ParkingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "last-resolved" => Ok(QuoteOrdering::LastResolved),
            "latest-issued" => Ok(QuoteOrdering::LatestIssued),
            other => Err(ParkingError::ConfigError(format!(
                "unknown quote ordering '{other}' (expected last-resolved or latest-issued)"
            ))),
        }
    }
}

/// Runtime configuration of the parking page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParkingConfig {
    pub contract_address: Address,
    pub quote_ordering: QuoteOrdering,
    pub confirmation_poll_interval_ms: u32,
    /// Block explorer base URL, without trailing slash.
    pub explorer_base: Option<String>,
}

/// Raw, unvalidated settings as read from the environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigSource<'a> {
    pub contract_address: Option<&'a str>,
    pub quote_ordering: Option<&'a str>,
    pub poll_interval_ms: Option<&'a str>,
    pub explorer_base: Option<&'a str>,
}

impl ParkingConfig {
    pub fn new(contract_address: Address) -> Self {
        Self {
            contract_address,
            quote_ordering: QuoteOrdering::default(),
            confirmation_poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            explorer_base: None,
        }
    }

    /// Parse a contract address. The zero address is rejected since it can
    /// only mean the address was never configured.
    pub fn from_address(address: &str) -> Result<Self, ParkingError> {
        let address = address.trim();
        let parsed = Address::from_str(address).map_err(|e| {
            ParkingError::ConfigError(format!("invalid contract address '{address}': {e}"))
        })?;
        if parsed == Address::ZERO {
            return Err(ParkingError::ConfigError(
                "contract address is the zero address".to_string(),
            ));
        }
        Ok(Self::new(parsed))
    }

    /// Build a config from raw settings. Only the contract address is required.
    pub fn from_source(source: &ConfigSource<'_>) -> Result<Self, ParkingError> {
        let address = source.contract_address.ok_or_else(|| {
            ParkingError::ConfigError("contract address not configured".to_string())
        })?;
        let mut config = Self::from_address(address)?;

        if let Some(ordering) = source.quote_ordering {
            config.quote_ordering = ordering.parse()?;
        }

        if let Some(raw) = source.poll_interval_ms {
            let ms: u32 = raw.trim().parse().map_err(|e| {
                ParkingError::ConfigError(format!("invalid poll interval '{raw}': {e}"))
            })?;
            if ms == 0 {
                return Err(ParkingError::ConfigError(
                    "poll interval must be greater than zero".to_string(),
                ));
            }
            config.confirmation_poll_interval_ms = ms;
        }

        if let Some(base) = source.explorer_base.filter(|b| !b.trim().is_empty()) {
            config = config.with_explorer_base(base);
        }

        Ok(config)
    }

    pub fn with_quote_ordering(mut self, ordering: QuoteOrdering) -> Self {
        self.quote_ordering = ordering;
        self
    }

    pub fn with_explorer_base(mut self, base: &str) -> Self {
        self.explorer_base = Some(base.trim().trim_end_matches('/').to_string());
        self
    }

    /// Explorer page for a transaction, when an explorer is configured.
    pub fn explorer_tx_url(&self, tx_hash: &str) -> Option<String> {
        self.explorer_base
            .as_ref()
            .map(|base| format!("{base}/tx/{tx_hash}"))
    }
}
