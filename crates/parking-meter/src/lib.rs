//! Parking meter client core.
//!
//! Drives the three user actions of the parking page against a wallet
//! provider and the parking meter contract.
//!
//! # Flow
//!
//! - **Connect** ([`connector::connect`]): requests account access and yields a [`ConnectionHandle`]
//! - **Quote** ([`ParkingSession::plan_quote`]): prices a (location, duration) pair via `getCostToPark`
//! - **Purchase** ([`ParkingSession::plan_purchase`]): sends a payable `park` transaction and
//!   follows it to confirmation
//!
//! The crate has no browser dependencies. The wallet is reached through the
//! traits in [`wallet`], so the web app plugs in `window.ethereum` while tests
//! plug in in-memory channels.
//!
//! # Quick example
//!
//! ```no_run
//! # async fn run<P: parking_meter::WalletProvider>(provider: P) {
//! use parking_meter::{connector, ParkingConfig, ParkingSession, QuoteInputs, QuotePlan};
//!
//! let config = ParkingConfig::from_address("0x5FbDB2315678afecb367f032d93F642f64180aa3").unwrap();
//! let mut session = ParkingSession::new(config);
//!
//! session.apply_connection(connector::connect(&provider).await);
//!
//! if let QuotePlan::Fetch(request) = session.plan_quote(&QuoteInputs::new("3", "60")) {
//!     let outcome = request.execute().await;
//!     session.apply_quote(outcome);
//! }
//! println!("{}", session.amount_text());
//! # }
//! ```

pub mod config;
pub mod connector;
pub mod contract;
pub mod error;
pub mod inputs;
pub mod quoter;
pub mod session;
pub mod submitter;
pub mod wallet;

use alloy::sol;

// Parking meter contract interface. Argument order and types must match the
// deployed contract: the quote takes the duration first, `park` takes the
// location first and a 16-bit duration.
sol! {
    interface ParkingMeter {
        function park(uint256 locationId, string licensePlate, uint16 timeInMinutes) external payable;
        function getCostToPark(uint256 timeInMinutes, uint256 locationId) external view returns (uint256);
    }
}

// Re-exports
pub use config::{ConfigSource, ParkingConfig, QuoteOrdering};
pub use error::{ParkingError, ProviderError};
pub use inputs::{PurchaseForm, QuoteInputs};
pub use quoter::{QuoteDisplay, QuoteOutcome, QuotePlan, QuoteRequest, QuoteTicket};
pub use session::{ParkingSession, StatusLine};
pub use submitter::{PendingPurchase, PurchaseIntent, PurchaseRequest};
pub use wallet::{ConnectionHandle, PaymentTransaction, QueryChannel, SigningChannel, WalletProvider};
