use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::types::TokenInfo;

/// The two Scroll environments the dashboard can point at.
/// Exactly one is active at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkProfile {
    Mainnet,
    Testnet,
}

impl NetworkProfile {
    pub const ALL: [NetworkProfile; 2] = [NetworkProfile::Mainnet, NetworkProfile::Testnet];

    pub fn label(&self) -> &'static str {
        match self {
            NetworkProfile::Mainnet => "Scroll Mainnet",
            NetworkProfile::Testnet => "Scroll Sepolia",
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            NetworkProfile::Mainnet => 534352,
            NetworkProfile::Testnet => 534351,
        }
    }

    /// Block explorer base URL for transaction/address lookups
    pub fn explorer_base_url(&self) -> &'static str {
        match self {
            NetworkProfile::Mainnet => "https://scrollscan.com",
            NetworkProfile::Testnet => "https://sepolia.scrollscan.com",
        }
    }

    /// Symbol of the network's native asset
    pub fn native_token(&self) -> &'static str {
        "ETH"
    }

    /// The profile a switch from this one lands on
    pub fn other(&self) -> NetworkProfile {
        match self {
            NetworkProfile::Mainnet => NetworkProfile::Testnet,
            NetworkProfile::Testnet => NetworkProfile::Mainnet,
        }
    }

    pub fn is_testnet(&self) -> bool {
        matches!(self, NetworkProfile::Testnet)
    }

    /// Identifier used by the switch-network provider call.
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkProfile::Mainnet => "mainnet",
            NetworkProfile::Testnet => "testnet",
        }
    }
}

impl fmt::Display for NetworkProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}


/// Get the full URL to view a transaction on the block explorer
pub fn tx_explorer_url(profile: NetworkProfile, tx_hash: &str) -> Option<String> {
    explorer_join(profile, &format!("tx/{}", tx_hash.trim()))
}

/// Get the full URL to view an address on the block explorer
pub fn address_explorer_url(profile: NetworkProfile, address: &str) -> Option<String> {
    explorer_join(profile, &format!("address/{}", address.trim()))
}

fn explorer_join(profile: NetworkProfile, path: &str) -> Option<String> {
    let base = Url::parse(profile.explorer_base_url()).ok()?;
    base.join(path).ok().map(|u| u.to_string())
}

/// ERC-20 tokens deployed on `profile`, keyed by symbol.
pub fn default_token_registry(profile: NetworkProfile) -> HashMap<String, TokenInfo> {
    let tokens: [(&str, &str, u8); 3] = match profile {
        NetworkProfile::Mainnet => [
            ("USDC", "0x06eFdBFf2a14a7c8E15944D1F4A48F9F95F663A4", 6),
            ("USDT", "0xf55BEC9cafDbE8730f096Aa55dad6D22d44099Df", 6),
            ("SCR", "0xd29687c813D741E2F938F4aC377128810E217b1b", 18),
        ],
        NetworkProfile::Testnet => [
            ("USDC", "0x2C9678042D52B97D27f2bD2947F7111d93F3dD0D", 6),
            ("USDT", "0x551197e6350936976DfFB66B2c3bb15DDB723250", 6),
            ("SCR", "0x7B9F6C0b5a9B2b6F7A7A1d6c5d5b8E3D7B0F6c1A", 18),
        ],
    };
    tokens
        .into_iter()
        .filter_map(|(symbol, address, decimals)| {
            let address = address.parse().ok()?;
            Some((symbol.to_string(), TokenInfo { address, decimals }))
        })
        .collect()
}

/// Runtime tuning for the dashboard core.
#[derive(Clone, Debug)]
pub struct Config {
    /// USD price of one native unit
    pub native_price_usd: f64,
    pub poll_interval: Duration,
    /// Minimum time the manual refresh indicator stays busy
    pub min_refresh_duration: Duration,
    /// Simulated latency of the gas estimator
    pub gas_latency: Duration,
    pub native_base_fee: f64,
    pub token_base_fee: f64,
    pub gas_eta_label: String,
    pub submission_timeout: Duration,
    /// Pin the gas jitter instead of drawing from [0.9, 1.1]
    pub fixed_gas_jitter: Option<f64>,
}

impl Config {
    /// Defaults overlaid with `ETH_PRICE_USD`, `BALANCE_POLL_SECS` and
    /// `SUBMISSION_TIMEOUT_SECS` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(price) = env::var("ETH_PRICE_USD")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|p| p.is_finite() && *p >= 0.0)
        {
            config.native_price_usd = price;
        }
        if let Some(secs) = env::var("BALANCE_POLL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|s| *s > 0)
        {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = env::var("SUBMISSION_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|s| *s > 0)
        {
            config.submission_timeout = Duration::from_secs(secs);
        }
        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            native_price_usd: 2593.3,
            poll_interval: Duration::from_secs(30),
            min_refresh_duration: Duration::from_secs(1),
            gas_latency: Duration::from_millis(500),
            native_base_fee: 0.0002,
            token_base_fee: 0.0005,
            gas_eta_label: "~30 seconds".to_string(),
            submission_timeout: Duration::from_secs(120),
            fixed_gas_jitter: None,
        }
    }
}

/// Precision of the native asset on both profiles
pub const NATIVE_DECIMALS: u8 = 18;

/// Both profiles use ETH as the native asset.
pub fn is_native_symbol(symbol: &str) -> bool {
    symbol.eq_ignore_ascii_case("ETH")
}
