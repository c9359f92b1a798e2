//! EIP-1193 request parameters and response parsing.
//!
//! Pure JSON in and out so it can be tested off the browser.

use alloy::primitives::{hex, Address, Bytes, U256};
use parking_meter::{PaymentTransaction, ProviderError};
use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;

/// Encode a quantity as a `0x`-prefixed hex string without leading zeros.
pub fn quantity(value: U256) -> String {
    format!("0x{:x}", value)
}

/// Params for `eth_call` against the latest block.
pub fn call_params(to: Address, data: &Bytes) -> Value {
    json!([
        {
            "to": to.to_string(),
            "data": hex::encode_prefixed(data),
        },
        "latest"
    ])
}

/// Params for `eth_sendTransaction`. Gas is left to the wallet.
pub fn send_params(tx: &PaymentTransaction) -> Value {
    json!([{
        "from": tx.from.to_string(),
        "to": tx.to.to_string(),
        "value": quantity(tx.value),
        "data": hex::encode_prefixed(&tx.data),
    }])
}

pub fn receipt_params(tx_hash: &str) -> Value {
    json!([tx_hash])
}

/// Subset of a transaction receipt needed to judge confirmation.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptSummary {
    pub transaction_hash: String,
    #[serde(default)]
    pub block_number: Option<String>,
    /// `0x1` success, `0x0` reverted. Absent on pre-Byzantium chains.
    #[serde(default)]
    pub status: Option<String>,
}

impl ReceiptSummary {
    pub fn succeeded(&self) -> bool {
        self.status.as_deref().map(|s| s == "0x1").unwrap_or(true)
    }
}

fn expect_str<'a>(value: &'a Value, what: &str) -> Result<&'a str, ProviderError> {
    value
        .as_str()
        .ok_or_else(|| ProviderError::Decode(format!("expected {what} string, got {value}")))
}

pub fn parse_accounts(value: &Value) -> Result<Vec<Address>, ProviderError> {
    let list = value
        .as_array()
        .ok_or_else(|| ProviderError::Decode(format!("expected account list, got {value}")))?;
    list.iter()
        .map(|v| {
            let raw = expect_str(v, "account")?;
            Address::from_str(raw)
                .map_err(|e| ProviderError::Decode(format!("invalid account '{raw}': {e}")))
        })
        .collect()
}

pub fn parse_call_result(value: &Value) -> Result<Bytes, ProviderError> {
    let raw = expect_str(value, "call result")?;
    Bytes::from_str(raw).map_err(|e| ProviderError::Decode(format!("invalid call result: {e}")))
}

pub fn parse_tx_hash(value: &Value) -> Result<String, ProviderError> {
    expect_str(value, "transaction hash").map(str::to_string)
}

/// `null` means the transaction is not mined yet.
pub fn parse_receipt(value: &Value) -> Result<Option<ReceiptSummary>, ProviderError> {
    if value.is_null() {
        return Ok(None);
    }
    serde_json::from_value(value.clone())
        .map(Some)
        .map_err(|e| ProviderError::Decode(format!("invalid receipt: {e}")))
}

/// Where a transaction stands after one receipt poll.
#[derive(Clone, Debug)]
pub enum Confirmation {
    /// Not mined yet; poll again after the interval.
    Pending,
    Mined(ReceiptSummary),
}

/// Judge one `eth_getTransactionReceipt` response. A reverted receipt is
/// an error, so the poll loop only ever sleeps or returns.
pub fn confirmation(tx_hash: &str, value: &Value) -> Result<Confirmation, ProviderError> {
    match parse_receipt(value)? {
        None => Ok(Confirmation::Pending),
        Some(receipt) if receipt.succeeded() => Ok(Confirmation::Mined(receipt)),
        Some(_) => Err(ProviderError::Reverted(tx_hash.to_string())),
    }
}

/// Map an EIP-1193 error object to a provider error.
pub fn provider_error(code: Option<i64>, message: String) -> ProviderError {
    match code {
        Some(code) => ProviderError::Rejected { code, message },
        None => ProviderError::Rpc(message),
    }
}
