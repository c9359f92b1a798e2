//! End-to-end parking flow against in-memory wallet channels.
//!
//! Covers connect, quoting (including out-of-order results) and the
//! purchase lifecycle from submit to confirmation.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::{SolCall, SolValue};
use parking_meter::{
    connector, ParkingConfig, ParkingError, ParkingMeter, ParkingSession, PaymentTransaction,
    ProviderError, PurchaseForm, QueryChannel, QuoteInputs, QuoteOrdering, QuotePlan,
    SigningChannel, WalletProvider,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::str::FromStr;

const CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
const ACCOUNT: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
const PROMPT: &str = "Enter location and time to see the price.";

/// Prices keyed by (location, duration). Unknown pairs revert.
#[derive(Clone, Default)]
struct MockQuery {
    prices: Rc<RefCell<HashMap<(U256, U256), U256>>>,
    calls: Rc<RefCell<Vec<Address>>>,
}

impl MockQuery {
    fn set_price(&self, location: u64, duration: u64, price: u64) {
        self.prices
            .borrow_mut()
            .insert((U256::from(location), U256::from(duration)), U256::from(price));
    }
}

impl QueryChannel for MockQuery {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ProviderError> {
        self.calls.borrow_mut().push(to);
        let call = ParkingMeter::getCostToParkCall::abi_decode(&data)
            .map_err(|e| ProviderError::Rpc(format!("bad calldata: {e}")))?;
        let price = self
            .prices
            .borrow()
            .get(&(call.locationId, call.timeInMinutes))
            .copied()
            .ok_or_else(|| ProviderError::Rpc("execution reverted".to_string()))?;
        Ok(price.abi_encode().into())
    }
}

#[derive(Clone)]
struct MockSigner {
    account: Address,
    tx_hash: String,
    send_error: Option<ProviderError>,
    confirm_error: Option<ProviderError>,
    sent: Rc<RefCell<Vec<PaymentTransaction>>>,
}

impl SigningChannel for MockSigner {
    fn account(&self) -> Address {
        self.account
    }

    async fn send_transaction(&self, tx: PaymentTransaction) -> Result<String, ProviderError> {
        if let Some(e) = &self.send_error {
            return Err(e.clone());
        }
        self.sent.borrow_mut().push(tx);
        Ok(self.tx_hash.clone())
    }

    async fn wait_for_confirmation(&self, tx_hash: &str) -> Result<(), ProviderError> {
        assert_eq!(tx_hash, self.tx_hash);
        match &self.confirm_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

struct MockWallet {
    available: bool,
    accounts: Result<Vec<Address>, ProviderError>,
    query: MockQuery,
    signer: MockSigner,
}

impl MockWallet {
    fn new() -> Self {
        let account = Address::from_str(ACCOUNT).unwrap();
        Self {
            available: true,
            accounts: Ok(vec![account]),
            query: MockQuery::default(),
            signer: MockSigner {
                account,
                tx_hash: "0xabc".to_string(),
                send_error: None,
                confirm_error: None,
                sent: Rc::default(),
            },
        }
    }
}

impl WalletProvider for MockWallet {
    type Query = MockQuery;
    type Signer = MockSigner;

    fn is_available(&self) -> bool {
        self.available
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.accounts.clone()
    }

    fn query_channel(&self) -> MockQuery {
        self.query.clone()
    }

    fn signing_channel(&self, account: Address) -> MockSigner {
        assert_eq!(account, self.signer.account);
        self.signer.clone()
    }
}

type Session = ParkingSession<MockQuery, MockSigner>;

fn config() -> ParkingConfig {
    ParkingConfig::from_address(CONTRACT).unwrap()
}

async fn connected_session(wallet: &MockWallet, config: ParkingConfig) -> Session {
    let mut session = Session::new(config);
    session.apply_connection(connector::connect(wallet).await);
    assert!(session.is_connected());
    session
}

/// Plan and run a quote to completion, as an input handler would.
async fn refresh(session: &mut Session, location: &str, duration: &str) {
    if let QuotePlan::Fetch(request) = session.plan_quote(&QuoteInputs::new(location, duration)) {
        let outcome = request.execute().await;
        session.apply_quote(outcome);
    }
}

/// Run a submit to completion. Returns the error, if any.
async fn submit(session: &mut Session, form: &PurchaseForm) -> Option<ParkingError> {
    let request = match session.plan_purchase(form) {
        Ok(request) => request,
        Err(e) => return Some(e),
    };
    let pending = match request.send().await {
        Ok(pending) => pending,
        Err(e) => {
            session.apply_purchase_failure(&e);
            return Some(e);
        }
    };
    session.apply_sent(pending.tx_hash());
    match pending.confirm().await {
        Ok(hash) => {
            session.apply_confirmed(&hash);
            None
        }
        Err(e) => {
            session.apply_purchase_failure(&e);
            Some(e)
        }
    }
}

#[tokio::test]
async fn test_connect_without_wallet() {
    let mut wallet = MockWallet::new();
    wallet.available = false;

    let mut session = Session::new(config());
    let result = connector::connect(&wallet).await;
    assert!(matches!(result, Err(ParkingError::WalletUnavailable)));

    session.apply_connection(result);
    assert_eq!(session.status_text(), "MetaMask is not installed.");
    assert_eq!(session.connect_label(), "Connect Wallet");
    assert!(!session.form_visible());
}

#[tokio::test]
async fn test_connect_rejected_by_user() {
    let mut wallet = MockWallet::new();
    wallet.accounts = Err(ProviderError::Rejected {
        code: 4001,
        message: "User rejected the request.".to_string(),
    });

    let mut session = Session::new(config());
    let result = connector::connect(&wallet).await;
    assert!(matches!(result, Err(ParkingError::AuthorizationDenied(_))));

    session.apply_connection(result);
    assert_eq!(session.status_text(), "Failed to connect to MetaMask.");
    assert!(!session.is_connected());
}

#[tokio::test]
async fn test_connect_with_no_accounts() {
    let mut wallet = MockWallet::new();
    wallet.accounts = Ok(Vec::new());

    let result = connector::connect(&wallet).await;
    assert!(matches!(result, Err(ParkingError::AuthorizationDenied(_))));
}

#[tokio::test]
async fn test_partial_inputs_show_prompt() {
    let wallet = MockWallet::new();
    let mut session = connected_session(&wallet, config()).await;

    for (location, duration) in [("", ""), ("3", ""), ("", "60")] {
        assert!(matches!(
            session.plan_quote(&QuoteInputs::new(location, duration)),
            QuotePlan::Settled
        ));
        assert_eq!(session.amount_text(), PROMPT);
        assert!(!session.purchase_enabled());
    }
    assert!(wallet.query.calls.borrow().is_empty());
}

#[tokio::test]
async fn test_complete_inputs_without_connection_show_prompt() {
    let mut session = Session::new(config());
    assert!(matches!(
        session.plan_quote(&QuoteInputs::new("3", "60")),
        QuotePlan::Settled
    ));
    assert_eq!(session.amount_text(), PROMPT);
    assert!(!session.purchase_enabled());
}

#[tokio::test]
async fn test_quote_success_enables_purchase() {
    let wallet = MockWallet::new();
    wallet.query.set_price(3, 60, 1_000_000_000_000_000);
    let mut session = connected_session(&wallet, config()).await;

    refresh(&mut session, "3", "60").await;

    assert_eq!(session.amount_text(), "1000000000000000 WEI");
    assert!(session.purchase_enabled());
    assert_eq!(
        wallet.query.calls.borrow().as_slice(),
        &[Address::from_str(CONTRACT).unwrap()]
    );
}

#[tokio::test]
async fn test_quote_failure_disables_purchase() {
    let wallet = MockWallet::new();
    wallet.query.set_price(3, 60, 500);
    let mut session = connected_session(&wallet, config()).await;

    refresh(&mut session, "3", "60").await;
    assert!(session.purchase_enabled());

    // No price for location 4: the contract reverts.
    refresh(&mut session, "4", "60").await;
    assert_eq!(session.amount_text(), "Error calculating cost");
    assert!(!session.purchase_enabled());
}

#[tokio::test]
async fn test_malformed_input_fails_quote_without_call() {
    let wallet = MockWallet::new();
    let mut session = connected_session(&wallet, config()).await;

    refresh(&mut session, "3", "sixty").await;

    assert_eq!(session.amount_text(), "Error calculating cost");
    assert!(!session.purchase_enabled());
    assert!(wallet.query.calls.borrow().is_empty());
}

#[tokio::test]
async fn test_purchase_end_to_end() {
    let wallet = MockWallet::new();
    wallet.query.set_price(3, 60, 1_000_000_000_000_000);
    let mut session = connected_session(&wallet, config()).await;

    refresh(&mut session, "3", "60").await;
    assert_eq!(session.amount_text(), "1000000000000000 WEI");

    let form = PurchaseForm::new("3", "ABC-123", "60");
    let request = session.plan_purchase(&form).unwrap();
    assert_eq!(request.intent().amount, U256::from(1_000_000_000_000_000u64));

    let pending = request.send().await.unwrap();
    session.apply_sent(pending.tx_hash());
    assert_eq!(session.status_text(), "Transaction sent: 0xabc");

    let hash = pending.confirm().await.unwrap();
    session.apply_confirmed(&hash);
    assert_eq!(session.status_text(), "Transaction confirmed: 0xabc");

    let sent = wallet.signer.sent.borrow();
    assert_eq!(sent.len(), 1);
    let tx = &sent[0];
    assert_eq!(tx.from, Address::from_str(ACCOUNT).unwrap());
    assert_eq!(tx.to, Address::from_str(CONTRACT).unwrap());
    assert_eq!(tx.value, U256::from(1_000_000_000_000_000u64));

    let call = ParkingMeter::parkCall::abi_decode(&tx.data).unwrap();
    assert_eq!(call.locationId, U256::from(3));
    assert_eq!(call.licensePlate, "ABC-123");
    assert_eq!(call.timeInMinutes, 60);

    // Inputs and quote survive the purchase.
    assert_eq!(session.amount_text(), "1000000000000000 WEI");
}

#[tokio::test]
async fn test_submit_while_prompt_displayed_fails() {
    let wallet = MockWallet::new();
    let mut session = connected_session(&wallet, config()).await;
    assert_eq!(session.amount_text(), PROMPT);

    let err = submit(&mut session, &PurchaseForm::new("3", "ABC-123", "60")).await;

    assert!(matches!(err, Some(ParkingError::SubmissionFailed(_))));
    assert_eq!(session.status_text(), "Transaction failed.");
    assert!(wallet.signer.sent.borrow().is_empty());
}

#[tokio::test]
async fn test_submit_after_quote_error_fails() {
    let wallet = MockWallet::new();
    let mut session = connected_session(&wallet, config()).await;

    refresh(&mut session, "9", "60").await;
    assert_eq!(session.amount_text(), "Error calculating cost");

    let err = submit(&mut session, &PurchaseForm::new("9", "ABC-123", "60")).await;
    assert!(err.is_some());
    assert_eq!(session.status_text(), "Transaction failed.");
}

#[tokio::test]
async fn test_send_rejected_reports_failure() {
    let mut wallet = MockWallet::new();
    wallet.signer.send_error = Some(ProviderError::Rejected {
        code: 4001,
        message: "User denied transaction signature.".to_string(),
    });
    wallet.query.set_price(3, 60, 1000);
    let mut session = connected_session(&wallet, config()).await;
    refresh(&mut session, "3", "60").await;

    let err = submit(&mut session, &PurchaseForm::new("3", "ABC-123", "60")).await;

    assert!(matches!(err, Some(ParkingError::SubmissionFailed(_))));
    assert_eq!(session.status_text(), "Transaction failed.");
}

#[tokio::test]
async fn test_reverted_confirmation_reports_failure() {
    let mut wallet = MockWallet::new();
    wallet.signer.confirm_error = Some(ProviderError::Reverted("0xabc".to_string()));
    wallet.query.set_price(3, 60, 1000);
    let mut session = connected_session(&wallet, config()).await;
    refresh(&mut session, "3", "60").await;

    let err = submit(&mut session, &PurchaseForm::new("3", "ABC-123", "60")).await;

    assert!(err.unwrap().to_string().contains("reverted"));
    assert_eq!(session.status_text(), "Transaction failed.");
    // The transaction did go out before the receipt showed the revert.
    assert_eq!(wallet.signer.sent.borrow().len(), 1);
}

#[tokio::test]
async fn test_out_of_order_quotes_last_resolved_wins() {
    let wallet = MockWallet::new();
    wallet.query.set_price(3, 60, 1000);
    wallet.query.set_price(3, 120, 2000);
    let mut session = connected_session(&wallet, config()).await;

    let QuotePlan::Fetch(first) = session.plan_quote(&QuoteInputs::new("3", "60")) else {
        panic!("expected a fetch");
    };
    let QuotePlan::Fetch(second) = session.plan_quote(&QuoteInputs::new("3", "120")) else {
        panic!("expected a fetch");
    };
    assert_eq!(first.inputs(), &QuoteInputs::new("3", "60"));
    assert_eq!(second.inputs(), &QuoteInputs::new("3", "120"));

    // The newer query resolves first, the older one last.
    let second = second.execute().await;
    let first = first.execute().await;
    assert!(session.apply_quote(second));
    assert!(session.apply_quote(first));

    // The display shows the stale price for 60 minutes while the inputs say 120.
    assert_eq!(session.amount_text(), "1000 WEI");

    let request = session
        .plan_purchase(&PurchaseForm::new("3", "ABC-123", "120"))
        .unwrap();
    assert_eq!(request.intent().amount, U256::from(1000));
    assert_eq!(request.intent().duration_minutes, 120);
}

#[tokio::test]
async fn test_out_of_order_quotes_latest_issued_wins() {
    let wallet = MockWallet::new();
    wallet.query.set_price(3, 60, 1000);
    wallet.query.set_price(3, 120, 2000);
    let config = config().with_quote_ordering(QuoteOrdering::LatestIssued);
    let mut session = connected_session(&wallet, config).await;

    let QuotePlan::Fetch(first) = session.plan_quote(&QuoteInputs::new("3", "60")) else {
        panic!("expected a fetch");
    };
    let QuotePlan::Fetch(second) = session.plan_quote(&QuoteInputs::new("3", "120")) else {
        panic!("expected a fetch");
    };
    assert!(second.ticket() > first.ticket());

    let second = second.execute().await;
    let first = first.execute().await;
    assert!(session.apply_quote(second));
    assert!(!session.apply_quote(first));

    assert_eq!(session.amount_text(), "2000 WEI");
}

#[tokio::test]
async fn test_latest_issued_drops_quote_after_reset() {
    let wallet = MockWallet::new();
    wallet.query.set_price(3, 60, 1000);
    let config = config().with_quote_ordering(QuoteOrdering::LatestIssued);
    let mut session = connected_session(&wallet, config).await;

    let QuotePlan::Fetch(pending) = session.plan_quote(&QuoteInputs::new("3", "60")) else {
        panic!("expected a fetch");
    };
    // The user clears the duration before the query returns.
    session.plan_quote(&QuoteInputs::new("3", ""));

    let outcome = pending.execute().await;
    assert!(!session.apply_quote(outcome));
    assert_eq!(session.amount_text(), PROMPT);
    assert!(!session.purchase_enabled());
}

#[tokio::test]
async fn test_reconnect_replaces_connection() {
    let wallet = MockWallet::new();
    let mut session = connected_session(&wallet, config()).await;

    let mut other = MockWallet::new();
    let account = Address::repeat_byte(0x42);
    other.accounts = Ok(vec![account]);
    other.signer.account = account;

    session.apply_connection(connector::connect(&other).await);
    assert_eq!(session.connection().unwrap().account(), account);
}
