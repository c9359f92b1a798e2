//! State behind the parking page.
//!
//! [`ParkingSession`] owns the connection and everything the page renders:
//! connect label, form visibility, amount line, purchase button state and
//! status line. Event handlers call a `plan_*` method, await the returned
//! request outside the session, then hand the outcome to an `apply_*`
//! method. Between those two steps other events may run.

use alloy::primitives::Address;
use std::fmt;

use crate::config::{ParkingConfig, QuoteOrdering};
use crate::inputs::{PurchaseForm, QuoteInputs};
use crate::quoter::{QuoteDisplay, QuoteOutcome, QuotePlan, QuoteRequest, QuoteTicket};
use crate::submitter::{PurchaseIntent, PurchaseRequest};
use crate::wallet::ConnectionHandle;
use crate::ParkingError;

pub const CONNECT_LABEL: &str = "Connect Wallet";
pub const CONNECTED_LABEL: &str = "Connected";

/// The status line under the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StatusLine {
    #[default]
    Idle,
    WalletMissing,
    ConnectFailed,
    Sent(String),
    Confirmed(String),
    Failed,
}

impl StatusLine {
    /// Hash of the transaction the status refers to.
    pub fn tx_hash(&self) -> Option<&str> {
        match self {
            StatusLine::Sent(hash) | StatusLine::Confirmed(hash) => Some(hash),
            _ => None,
        }
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusLine::Idle => Ok(()),
            StatusLine::WalletMissing => f.write_str("MetaMask is not installed."),
            StatusLine::ConnectFailed => f.write_str("Failed to connect to MetaMask."),
            StatusLine::Sent(hash) => write!(f, "Transaction sent: {hash}"),
            StatusLine::Confirmed(hash) => write!(f, "Transaction confirmed: {hash}"),
            StatusLine::Failed => f.write_str("Transaction failed."),
        }
    }
}

/// Shorten an address to `0x1234...abcd`.
pub fn short_address(address: &Address) -> String {
    let full = address.to_string();
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// UI state of one page load.
#[derive(Debug)]
pub struct ParkingSession<Q, S> {
    config: ParkingConfig,
    connection: Option<ConnectionHandle<Q, S>>,
    quote: QuoteDisplay,
    status: StatusLine,
    next_ticket: u64,
}

impl<Q, S> ParkingSession<Q, S> {
    pub fn new(config: ParkingConfig) -> Self {
        Self {
            config,
            connection: None,
            quote: QuoteDisplay::Prompt,
            status: StatusLine::Idle,
            next_ticket: 0,
        }
    }

    pub fn config(&self) -> &ParkingConfig {
        &self.config
    }

    pub fn connection(&self) -> Option<&ConnectionHandle<Q, S>> {
        self.connection.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn connect_label(&self) -> &'static str {
        if self.is_connected() {
            CONNECTED_LABEL
        } else {
            CONNECT_LABEL
        }
    }

    pub fn account_label(&self) -> Option<String> {
        self.connection.as_ref().map(|c| short_address(&c.account()))
    }

    /// The purchase form is revealed once a wallet is connected.
    pub fn form_visible(&self) -> bool {
        self.is_connected()
    }

    pub fn quote(&self) -> QuoteDisplay {
        self.quote
    }

    pub fn amount_text(&self) -> String {
        self.quote.to_string()
    }

    pub fn purchase_enabled(&self) -> bool {
        self.quote.allows_purchase()
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn status_text(&self) -> String {
        self.status.to_string()
    }

    /// Explorer page for the transaction named in the status line.
    pub fn explorer_link(&self) -> Option<String> {
        self.status
            .tx_hash()
            .and_then(|hash| self.config.explorer_tx_url(hash))
    }

    /// Record the result of a connect attempt. A success replaces any
    /// previous connection; a failure leaves the current one in place.
    pub fn apply_connection(&mut self, result: Result<ConnectionHandle<Q, S>, ParkingError>) {
        match result {
            Ok(connection) => {
                if self.connection.is_some() {
                    tracing::debug!("replacing existing wallet connection");
                }
                self.connection = Some(connection);
            }
            Err(ParkingError::WalletUnavailable) => {
                self.status = StatusLine::WalletMissing;
            }
            Err(e) => {
                tracing::error!(error = %e, "wallet connection failed");
                self.status = StatusLine::ConnectFailed;
            }
        }
    }

    fn issue_ticket(&mut self) -> QuoteTicket {
        self.next_ticket += 1;
        QuoteTicket(self.next_ticket)
    }

    fn latest_ticket(&self) -> QuoteTicket {
        QuoteTicket(self.next_ticket)
    }

    /// Apply a finished quote. Returns false when the outcome was dropped as
    /// stale under [`QuoteOrdering::LatestIssued`].
    ///
    /// Under the default [`QuoteOrdering::LastResolved`] every outcome is
    /// applied in the order it arrives, so a slow query for old inputs can
    /// overwrite a newer quote. The purchase then pays that displayed amount.
    pub fn apply_quote(&mut self, outcome: QuoteOutcome) -> bool {
        if self.config.quote_ordering == QuoteOrdering::LatestIssued
            && outcome.ticket != self.latest_ticket()
        {
            tracing::debug!(
                ticket = outcome.ticket.value(),
                latest = self.next_ticket,
                "dropping stale quote"
            );
            return false;
        }

        match outcome.result {
            Ok(amount) => {
                tracing::info!(%amount, "cost received");
                self.quote = QuoteDisplay::Quoted(amount);
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch parking cost");
                self.quote = QuoteDisplay::Failed;
            }
        }
        true
    }

    /// Record a purchase failure at any stage. Inputs are left as they are.
    pub fn apply_purchase_failure(&mut self, error: &ParkingError) {
        tracing::error!(%error, "transaction failed");
        self.status = StatusLine::Failed;
    }

    pub fn apply_sent(&mut self, tx_hash: &str) {
        self.status = StatusLine::Sent(tx_hash.to_string());
    }

    pub fn apply_confirmed(&mut self, tx_hash: &str) {
        self.status = StatusLine::Confirmed(tx_hash.to_string());
    }
}

impl<Q: Clone, S> ParkingSession<Q, S> {
    /// React to a change of the location or duration input.
    ///
    /// Incomplete inputs, or a missing connection, reset the amount line to
    /// the prompt and disable purchase without any query. Otherwise the
    /// current display is kept until the returned request is applied.
    pub fn plan_quote(&mut self, inputs: &QuoteInputs) -> QuotePlan<Q> {
        // Every plan takes a ticket so that under LatestIssued a reset to the
        // prompt also outdates queries still in flight.
        let ticket = self.issue_ticket();

        if !inputs.is_complete() {
            self.quote = QuoteDisplay::Prompt;
            return QuotePlan::Settled;
        }

        let Some(connection) = self.connection.as_ref() else {
            tracing::debug!("waiting for valid input or provider not initialized");
            self.quote = QuoteDisplay::Prompt;
            return QuotePlan::Settled;
        };

        tracing::info!(
            location = %inputs.location,
            duration = %inputs.duration,
            "fetching cost"
        );
        QuotePlan::Fetch(QuoteRequest::new(
            ticket,
            self.config.contract_address,
            connection.query().clone(),
            inputs.clone(),
        ))
    }
}

impl<Q, S: Clone> ParkingSession<Q, S> {
    /// React to form submission. On error the status line already reads
    /// "Transaction failed." when this returns.
    pub fn plan_purchase(&mut self, form: &PurchaseForm) -> Result<PurchaseRequest<S>, ParkingError> {
        let result = self.build_purchase(form);
        if let Err(e) = &result {
            self.apply_purchase_failure(e);
        }
        result
    }

    fn build_purchase(&self, form: &PurchaseForm) -> Result<PurchaseRequest<S>, ParkingError> {
        let connection = self.connection.as_ref().ok_or_else(|| {
            ParkingError::SubmissionFailed("wallet not connected".to_string())
        })?;
        let intent = PurchaseIntent::from_form(form, self.quote.amount())?;
        Ok(PurchaseRequest::new(
            intent,
            self.config.contract_address,
            connection.signer().clone(),
        ))
    }
}
