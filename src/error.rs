//! Error taxonomy for the wallet core.
//!
//! Provider traits speak `anyhow::Result`; everything that crosses back into
//! the dashboard is converted into one of these variants first.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WalletError {
    /// Empty or non-positive amount, empty or malformed recipient.
    /// Blocks submission locally; the provider is never called.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Selected symbol has no entry in the token registry.
    #[error("Token not supported: {0}")]
    UnsupportedAsset(String),

    /// The submission or refresh provider rejected the call or raised.
    #[error("{0}")]
    ProviderFailure(String),

    /// The network switch provider rejected the call.
    #[error("Network switch failed: {0}")]
    NetworkSwitchFailure(String),

    #[error("Transaction timed out after {}s without a result", .0.as_secs())]
    Timeout(Duration),
}

impl WalletError {
    /// Wrap a provider-originated error, keeping only its message.
    pub fn provider(err: impl std::fmt::Display) -> Self {
        WalletError::ProviderFailure(err.to_string())
    }

    /// Message shown to the user for a failed transfer.
    pub fn user_message(&self) -> String {
        match self {
            WalletError::ProviderFailure(msg) if msg.trim().is_empty() => {
                crate::transfer::GENERIC_FAILURE_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }
}
