//! Form input text and its conversion to contract argument types.

use alloy::primitives::U256;
use std::str::FromStr;
use thiserror::Error;

/// Why an input field could not be used as a contract argument.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("{field} is not an unsigned integer: '{value}'")]
    NotANumber { field: &'static str, value: String },

    #[error("{field} {value} is larger than {max}")]
    OutOfRange {
        field: &'static str,
        value: String,
        max: u64,
    },
}

/// Raw text of the location and duration inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteInputs {
    pub location: String,
    pub duration: String,
}

impl QuoteInputs {
    pub fn new(location: impl Into<String>, duration: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            duration: duration.into(),
        }
    }

    /// Both fields hold text. Whitespace counts as text; it fails later as a
    /// malformed argument.
    pub fn is_complete(&self) -> bool {
        !self.location.is_empty() && !self.duration.is_empty()
    }
}

/// Raw text of the whole purchase form at submit time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurchaseForm {
    pub location: String,
    pub license_plate: String,
    pub duration: String,
}

impl PurchaseForm {
    pub fn new(
        location: impl Into<String>,
        license_plate: impl Into<String>,
        duration: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            license_plate: license_plate.into(),
            duration: duration.into(),
        }
    }

    pub fn quote_inputs(&self) -> QuoteInputs {
        QuoteInputs::new(self.location.clone(), self.duration.clone())
    }
}

/// Parse a `uint256` argument. Accepts decimal digits or `0x`-prefixed hex
/// digits only; digit separators and other radix prefixes are rejected.
pub fn parse_uint(field: &'static str, raw: &str) -> Result<U256, InputError> {
    let not_a_number = || InputError::NotANumber {
        field,
        value: raw.to_string(),
    };
    let well_formed = match raw.strip_prefix("0x") {
        Some(hex) => !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()),
    };
    if !well_formed {
        return Err(not_a_number());
    }
    U256::from_str(raw).map_err(|_| not_a_number())
}

/// Parse the `uint16` duration taken by `park`.
pub fn parse_minutes(field: &'static str, raw: &str) -> Result<u16, InputError> {
    let value = parse_uint(field, raw)?;
    value.try_into().map_err(|_| InputError::OutOfRange {
        field,
        value: raw.to_string(),
        max: u64::from(u16::MAX),
    })
}
