use thiserror::Error;

/// EIP-1193 error code for a request the user rejected in the wallet.
pub const USER_REJECTED_CODE: i64 = 4001;

/// Errors returned by parking page actions.
///
/// Each variant is terminal for the action that raised it only. The session
/// logs it and turns it into status or amount text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParkingError {
    #[error("no wallet provider detected")]
    WalletUnavailable,

    #[error("account authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("quote failed: {0}")]
    QuoteFailed(String),

    #[error("submission failed: {0}")]
    SubmissionFailed(String),

    #[error("config error: {0}")]
    ConfigError(String),
}

/// Failures reported by a wallet provider channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("request rejected ({code}): {message}")]
    Rejected { code: i64, message: String },

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("transaction {0} reverted")]
    Reverted(String),
}

impl ProviderError {
    /// True when the user dismissed the wallet prompt.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, ProviderError::Rejected { code, .. } if *code == USER_REJECTED_CODE)
    }
}
