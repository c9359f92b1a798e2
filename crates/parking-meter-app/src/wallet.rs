//! Browser wallet (MetaMask, etc.) over the EIP-1193 `window.ethereum` API.

#![allow(deprecated)]

use alloy::primitives::{Address, Bytes};
use gloo_timers::future::TimeoutFuture;
use parking_meter::{
    PaymentTransaction, ProviderError, QueryChannel, SigningChannel, WalletProvider,
};
use serde_json::Value;
use wasm_bindgen::prelude::*;

use crate::rpc::{self, Confirmation};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = window, js_name = ethereum)]
    static ETHEREUM: JsValue;

    #[wasm_bindgen(catch, js_namespace = ["window", "ethereum"], js_name = request)]
    async fn ethereum_request(args: &JsValue) -> Result<JsValue, JsValue>;
}

fn ethereum_present() -> bool {
    !(ETHEREUM.is_undefined() || ETHEREUM.is_null())
}

/// Send one EIP-1193 request and return its result as JSON.
async fn request(method: &str, params: Option<Value>) -> Result<Value, ProviderError> {
    let args = js_sys::Object::new();
    js_sys::Reflect::set(&args, &"method".into(), &method.into())
        .map_err(|e| ProviderError::Rpc(format!("Failed to build request: {:?}", e)))?;

    if let Some(params) = params {
        let params = js_sys::JSON::parse(&params.to_string())
            .map_err(|e| ProviderError::Rpc(format!("Failed to encode params: {:?}", e)))?;
        js_sys::Reflect::set(&args, &"params".into(), &params)
            .map_err(|e| ProviderError::Rpc(format!("Failed to set params: {:?}", e)))?;
    }

    let response = ethereum_request(&args).await.map_err(js_error)?;
    to_json(&response)
}

fn to_json(value: &JsValue) -> Result<Value, ProviderError> {
    if value.is_undefined() || value.is_null() {
        return Ok(Value::Null);
    }
    let text: String = js_sys::JSON::stringify(value)
        .map_err(|e| ProviderError::Decode(format!("Failed to stringify response: {:?}", e)))?
        .into();
    serde_json::from_str(&text)
        .map_err(|e| ProviderError::Decode(format!("Failed to parse response: {}", e)))
}

/// Pull `code` and `message` out of a rejected request.
fn js_error(err: JsValue) -> ProviderError {
    let code = js_sys::Reflect::get(&err, &"code".into())
        .ok()
        .and_then(|c| c.as_f64())
        .map(|c| c as i64);
    let message = js_sys::Reflect::get(&err, &"message".into())
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("{:?}", err));
    rpc::provider_error(code, message)
}

/// The injected `window.ethereum` provider.
#[derive(Clone, Copy, Debug)]
pub struct BrowserWallet {
    poll_interval_ms: u32,
}

impl BrowserWallet {
    pub fn new(poll_interval_ms: u32) -> Self {
        Self { poll_interval_ms }
    }
}

/// Read-only calls through the wallet's node connection.
#[derive(Clone, Copy, Debug, Default)]
pub struct EthereumQuery;

/// `eth_sendTransaction` from one authorized account.
#[derive(Clone, Copy, Debug)]
pub struct EthereumSigner {
    account: Address,
    poll_interval_ms: u32,
}

impl WalletProvider for BrowserWallet {
    type Query = EthereumQuery;
    type Signer = EthereumSigner;

    fn is_available(&self) -> bool {
        ethereum_present()
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let accounts = request("eth_requestAccounts", None).await?;
        rpc::parse_accounts(&accounts)
    }

    fn query_channel(&self) -> EthereumQuery {
        EthereumQuery
    }

    fn signing_channel(&self, account: Address) -> EthereumSigner {
        EthereumSigner {
            account,
            poll_interval_ms: self.poll_interval_ms,
        }
    }
}

impl QueryChannel for EthereumQuery {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ProviderError> {
        let result = request("eth_call", Some(rpc::call_params(to, &data))).await?;
        rpc::parse_call_result(&result)
    }
}

impl SigningChannel for EthereumSigner {
    fn account(&self) -> Address {
        self.account
    }

    async fn send_transaction(&self, tx: PaymentTransaction) -> Result<String, ProviderError> {
        let hash = request("eth_sendTransaction", Some(rpc::send_params(&tx))).await?;
        rpc::parse_tx_hash(&hash)
    }

    async fn wait_for_confirmation(&self, tx_hash: &str) -> Result<(), ProviderError> {
        loop {
            let receipt = request(
                "eth_getTransactionReceipt",
                Some(rpc::receipt_params(tx_hash)),
            )
            .await?;

            match rpc::confirmation(tx_hash, &receipt)? {
                Confirmation::Mined(receipt) => {
                    log::debug!(
                        "Receipt for {} in block {}",
                        receipt.transaction_hash,
                        receipt.block_number.as_deref().unwrap_or("?")
                    );
                    return Ok(());
                }
                Confirmation::Pending => TimeoutFuture::new(self.poll_interval_ms).await,
            }
        }
    }
}
