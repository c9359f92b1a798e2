use crate::wallet::{ConnectionHandle, WalletProvider};
use crate::ParkingError;

/// Handle type produced by connecting through `P`.
pub type ProviderConnection<P> =
    ConnectionHandle<<P as WalletProvider>::Query, <P as WalletProvider>::Signer>;

/// Request account access from the wallet and bind channels to the first
/// authorized account. No retry on failure.
pub async fn connect<P: WalletProvider>(
    provider: &P,
) -> Result<ProviderConnection<P>, ParkingError> {
    if !provider.is_available() {
        tracing::error!("wallet provider not detected");
        return Err(ParkingError::WalletUnavailable);
    }

    tracing::info!("requesting account access");
    let accounts = provider.request_accounts().await.map_err(|e| {
        if e.is_user_rejection() {
            tracing::warn!(error = %e, "user denied account access");
        } else {
            tracing::error!(error = %e, "account access request failed");
        }
        ParkingError::AuthorizationDenied(e.to_string())
    })?;

    let account = accounts.first().copied().ok_or_else(|| {
        tracing::error!("wallet returned no accounts");
        ParkingError::AuthorizationDenied("no accounts returned".to_string())
    })?;

    tracing::info!(%account, "connected to account");
    Ok(ConnectionHandle::new(
        account,
        provider.query_channel(),
        provider.signing_channel(account),
    ))
}
