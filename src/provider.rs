//! Provider seams the core calls into.
//!
//! Key management, signing and RPC live behind these traits. Implementations
//! own the wallet snapshot; the core only reads it and mutates it through
//! `refresh_balance`, `switch_network` and the send operations.

use crate::config::NetworkProfile;
use crate::types::{SendOutcome, TokenInfo, WalletSnapshot};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Source of address, balances, history and network status.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn snapshot(&self) -> Result<WalletSnapshot>;

    /// Reload balances and history for `address`. May fail.
    async fn refresh_balance(&self, address: &str) -> Result<()>;

    /// Move to `target`. Either fully applied or not at all.
    async fn switch_network(&self, target: NetworkProfile) -> Result<()>;
}

/// Submission side: native and token transfers plus the token registry.
#[async_trait]
pub trait TransferProvider: Send + Sync {
    async fn send_native(&self, recipient: &str, amount: &str) -> Result<SendOutcome>;

    async fn send_token(
        &self,
        token_address: &str,
        recipient: &str,
        amount: &str,
        decimals: u8,
    ) -> Result<SendOutcome>;

    fn token_registry(&self) -> HashMap<String, TokenInfo>;
}
