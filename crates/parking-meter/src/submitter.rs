use alloy::primitives::{Address, U256};

use crate::inputs::{self, PurchaseForm};
use crate::wallet::{PaymentTransaction, SigningChannel};
use crate::{contract, ParkingError};

/// Everything needed to buy one parking session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseIntent {
    pub location_id: U256,
    pub license_plate: String,
    pub duration_minutes: u16,
    /// Payment attached to the call, taken from the displayed quote.
    pub amount: U256,
}

impl PurchaseIntent {
    /// Assemble an intent from the form and the displayed quote. The amount is
    /// not re-quoted; without a displayed quote the purchase cannot proceed.
    pub fn from_form(form: &PurchaseForm, quoted: Option<U256>) -> Result<Self, ParkingError> {
        let amount = quoted.ok_or_else(|| {
            ParkingError::SubmissionFailed("no price quote is displayed".to_string())
        })?;
        let location_id = inputs::parse_uint("location id", &form.location)
            .map_err(|e| ParkingError::SubmissionFailed(e.to_string()))?;
        let duration_minutes = inputs::parse_minutes("time in minutes", &form.duration)
            .map_err(|e| ParkingError::SubmissionFailed(e.to_string()))?;

        Ok(Self {
            location_id,
            license_plate: form.license_plate.clone(),
            duration_minutes,
            amount,
        })
    }

    pub fn transaction(&self, from: Address, contract: Address) -> PaymentTransaction {
        contract::park_transaction(
            from,
            contract,
            self.location_id,
            &self.license_plate,
            self.duration_minutes,
            self.amount,
        )
    }
}

/// A purchase ready to be signed and broadcast.
#[derive(Debug, Clone)]
pub struct PurchaseRequest<S> {
    intent: PurchaseIntent,
    contract: Address,
    signer: S,
}

/// A broadcast purchase awaiting confirmation.
#[derive(Debug, Clone)]
pub struct PendingPurchase<S> {
    tx_hash: String,
    signer: S,
}

impl<S> PurchaseRequest<S> {
    pub(crate) fn new(intent: PurchaseIntent, contract: Address, signer: S) -> Self {
        Self {
            intent,
            contract,
            signer,
        }
    }

    pub fn intent(&self) -> &PurchaseIntent {
        &self.intent
    }
}

impl<S: SigningChannel> PurchaseRequest<S> {
    /// Hand the transaction to the wallet for signing and broadcast.
    pub async fn send(self) -> Result<PendingPurchase<S>, ParkingError> {
        let tx = self.intent.transaction(self.signer.account(), self.contract);
        tracing::info!(
            location = %self.intent.location_id,
            minutes = self.intent.duration_minutes,
            value = %tx.value,
            "sending park transaction"
        );

        let tx_hash = self
            .signer
            .send_transaction(tx)
            .await
            .map_err(|e| ParkingError::SubmissionFailed(e.to_string()))?;

        tracing::info!(%tx_hash, "transaction sent");
        Ok(PendingPurchase {
            tx_hash,
            signer: self.signer,
        })
    }
}

impl<S> PendingPurchase<S> {
    pub fn tx_hash(&self) -> &str {
        &self.tx_hash
    }
}

impl<S: SigningChannel> PendingPurchase<S> {
    /// Wait until the transaction is mined. Returns the hash. No timeout.
    pub async fn confirm(self) -> Result<String, ParkingError> {
        self.signer
            .wait_for_confirmation(&self.tx_hash)
            .await
            .map_err(|e| ParkingError::SubmissionFailed(e.to_string()))?;

        tracing::info!(tx_hash = %self.tx_hash, "transaction confirmed");
        Ok(self.tx_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_from_form() {
        let form = PurchaseForm::new("3", "ABC-123", "60");
        let intent = PurchaseIntent::from_form(&form, Some(U256::from(1000))).unwrap();
        assert_eq!(intent.location_id, U256::from(3));
        assert_eq!(intent.license_plate, "ABC-123");
        assert_eq!(intent.duration_minutes, 60);
        assert_eq!(intent.amount, U256::from(1000));
    }

    #[test]
    fn test_intent_requires_quote() {
        let form = PurchaseForm::new("3", "ABC-123", "60");
        let err = PurchaseIntent::from_form(&form, None).unwrap_err();
        assert!(matches!(err, ParkingError::SubmissionFailed(_)));
    }

    #[test]
    fn test_intent_rejects_duration_beyond_uint16() {
        // The quote takes a uint256 duration but park only accepts uint16.
        let form = PurchaseForm::new("3", "ABC-123", "70000");
        let err = PurchaseIntent::from_form(&form, Some(U256::from(1))).unwrap_err();
        assert!(err.to_string().contains("larger than 65535"));
    }

    #[test]
    fn test_empty_plate_is_allowed() {
        let form = PurchaseForm::new("3", "", "60");
        let intent = PurchaseIntent::from_form(&form, Some(U256::from(1))).unwrap();
        assert!(intent.license_plate.is_empty());
    }
}
