//! Seams between the parking flow and a wallet provider.
//!
//! A provider hands out two channels once an account is authorized: a
//! read-only [`QueryChannel`] for `eth_call` style requests and a
//! [`SigningChannel`] bound to the account for value-carrying transactions.
//! Both are single-threaded; futures are not required to be `Send`.

#![allow(async_fn_in_trait)]

use alloy::primitives::{Address, Bytes, U256};

use crate::ProviderError;

/// A contract call carrying an attached payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentTransaction {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

/// An installed wallet extension.
pub trait WalletProvider {
    type Query: QueryChannel + Clone;
    type Signer: SigningChannel + Clone;

    /// Whether a provider is present in the environment at all.
    fn is_available(&self) -> bool;

    /// Ask the user to authorize account access. May open a wallet prompt.
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    fn query_channel(&self) -> Self::Query;

    fn signing_channel(&self, account: Address) -> Self::Signer;
}

/// Read-only access to a node.
pub trait QueryChannel {
    /// Execute a call against `to` without creating a transaction.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ProviderError>;
}

/// Transaction signing and broadcast for one authorized account.
pub trait SigningChannel {
    fn account(&self) -> Address;

    /// Sign and broadcast. Resolves with the transaction hash once the
    /// transaction is accepted into the pending pool.
    async fn send_transaction(&self, tx: PaymentTransaction) -> Result<String, ProviderError>;

    /// Resolve once the transaction is mined successfully. A reverted
    /// receipt is an error.
    async fn wait_for_confirmation(&self, tx_hash: &str) -> Result<(), ProviderError>;
}

/// Channels for an authorized account.
///
/// Created once per successful connect; a later connect replaces it.
#[derive(Debug, Clone)]
pub struct ConnectionHandle<Q, S> {
    account: Address,
    query: Q,
    signer: S,
}

impl<Q, S> ConnectionHandle<Q, S> {
    pub fn new(account: Address, query: Q, signer: S) -> Self {
        Self {
            account,
            query,
            signer,
        }
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    pub fn signer(&self) -> &S {
        &self.signer
    }
}
