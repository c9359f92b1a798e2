//! Price quotes for the current location and duration inputs.
//!
//! A quote is planned synchronously by the session, fetched without holding
//! the session, and applied back to it. Several fetches may be in flight at
//! once; nothing cancels them. How late results are applied is governed by
//! [`QuoteOrdering`](crate::QuoteOrdering).

use alloy::primitives::{Address, U256};
use std::fmt;

use crate::inputs::{self, QuoteInputs};
use crate::wallet::QueryChannel;
use crate::{contract, ParkingError};

/// Shown while the inputs cannot be priced yet.
pub const PROMPT_TEXT: &str = "Enter location and time to see the price.";

/// Shown when the last pricing query failed.
pub const QUOTE_ERROR_TEXT: &str = "Error calculating cost";

/// What the amount line currently shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuoteDisplay {
    #[default]
    Prompt,
    Quoted(U256),
    Failed,
}

impl QuoteDisplay {
    /// The quoted amount in wei, if a quote is displayed.
    pub fn amount(&self) -> Option<U256> {
        match self {
            QuoteDisplay::Quoted(amount) => Some(*amount),
            _ => None,
        }
    }

    /// The purchase action is enabled exactly while a quote is displayed.
    pub fn allows_purchase(&self) -> bool {
        self.amount().is_some()
    }
}

impl fmt::Display for QuoteDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuoteDisplay::Prompt => f.write_str(PROMPT_TEXT),
            QuoteDisplay::Quoted(amount) => write!(f, "{amount} WEI"),
            QuoteDisplay::Failed => f.write_str(QUOTE_ERROR_TEXT),
        }
    }
}

/// Sequence number of a quote plan. Later plans compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuoteTicket(pub(crate) u64);

impl QuoteTicket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Result of planning a quote for new inputs.
#[derive(Debug)]
pub enum QuotePlan<Q> {
    /// The display was reset to the prompt; nothing to fetch.
    Settled,
    /// A contract query must be made.
    Fetch(QuoteRequest<Q>),
}

/// A pending `getCostToPark` query, detached from the session.
#[derive(Debug, Clone)]
pub struct QuoteRequest<Q> {
    ticket: QuoteTicket,
    contract: Address,
    query: Q,
    inputs: QuoteInputs,
}

/// A finished query, ready to be applied to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteOutcome {
    pub ticket: QuoteTicket,
    pub result: Result<U256, ParkingError>,
}

impl<Q> QuoteRequest<Q> {
    pub(crate) fn new(ticket: QuoteTicket, contract: Address, query: Q, inputs: QuoteInputs) -> Self {
        Self {
            ticket,
            contract,
            query,
            inputs,
        }
    }

    pub fn ticket(&self) -> QuoteTicket {
        self.ticket
    }

    pub fn inputs(&self) -> &QuoteInputs {
        &self.inputs
    }
}

impl<Q: QueryChannel> QuoteRequest<Q> {
    /// Run the query. Never panics; every failure lands in the outcome.
    pub async fn execute(self) -> QuoteOutcome {
        let result = self.fetch().await;
        QuoteOutcome {
            ticket: self.ticket,
            result,
        }
    }

    async fn fetch(&self) -> Result<U256, ParkingError> {
        let duration = inputs::parse_uint("time in minutes", &self.inputs.duration)
            .map_err(|e| ParkingError::QuoteFailed(e.to_string()))?;
        let location = inputs::parse_uint("location id", &self.inputs.location)
            .map_err(|e| ParkingError::QuoteFailed(e.to_string()))?;

        tracing::debug!(
            ticket = self.ticket.0,
            %location,
            %duration,
            "calling getCostToPark"
        );

        contract::cost_to_park(&self.query, self.contract, duration, location)
            .await
            .map_err(|e| ParkingError::QuoteFailed(e.to_string()))
    }
}
