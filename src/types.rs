//! Common types shared across modules.

use crate::config::NetworkProfile;
use ethers::types::Address;
use serde::{Deserialize, Serialize};

/// Point-in-time view of the wallet as reported by the wallet data provider.
///
/// The core never mutates these fields; a new snapshot replaces the old one
/// after each successful refresh or network switch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletSnapshot {
    pub address: Option<String>,
    /// Native balance as a decimal string, e.g. "1.25"
    pub native_balance: Option<String>,
    pub assets: Vec<AssetBalance>,
    pub transactions: Vec<TransactionRecord>,
    pub network: NetworkProfile,
    pub network_status: NetworkStatus,
}

impl WalletSnapshot {
    /// Empty snapshot for a profile, used before the first provider read
    pub fn empty(network: NetworkProfile) -> Self {
        Self {
            address: None,
            native_balance: None,
            assets: Vec::new(),
            transactions: Vec::new(),
            network,
            network_status: NetworkStatus::default(),
        }
    }

    /// Address with empty strings treated as absent
    pub fn loaded_address(&self) -> Option<&str> {
        self.address.as_deref().filter(|a| !a.trim().is_empty())
    }

    pub fn asset(&self, symbol: &str) -> Option<&AssetBalance> {
        self.assets.iter().find(|a| a.symbol == symbol)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStatus {
    pub connected: bool,
    pub latency_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetBalance {
    pub symbol: String,
    pub display_name: String,
    /// Decimal string, never negative
    pub raw_amount: String,
    pub fiat_value: String,
    pub fiat_change: String,
    pub fiat_change_percent: String,
    pub icon_key: String,
}

impl AssetBalance {
    /// Zero-balance placeholder row
    pub fn placeholder(symbol: &str, display_name: &str, icon_key: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            display_name: display_name.to_string(),
            raw_amount: "0".to_string(),
            fiat_value: "$0.00".to_string(),
            fiat_change: "$0.00".to_string(),
            fiat_change_percent: "0.00%".to_string(),
            icon_key: icon_key.to_string(),
        }
    }

    /// Parsed amount, 0 when the provider sent something unreadable.
    pub fn amount(&self) -> f64 {
        crate::utils::parse_decimal(&self.raw_amount)
            .filter(|v| *v >= 0.0)
            .unwrap_or(0.0)
    }

    pub fn display_amount(&self) -> String {
        format!("{} {}", self.raw_amount, self.symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Send,
    Receive,
}

impl TxKind {
    pub fn label(&self) -> &'static str {
        match self {
            TxKind::Send => "Sent",
            TxKind::Receive => "Received",
        }
    }
}

/// One history entry. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub kind: TxKind,
    pub counterparty_address: String,
    pub raw_amount: String,
    pub icon_key: String,
    pub timestamp_millis: i64,
    pub tx_hash: Option<String>,
}

impl TransactionRecord {
    pub fn formatted_time(&self) -> String {
        chrono::DateTime::from_timestamp_millis(self.timestamp_millis)
            .map(|t| t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default()
    }
}

/// Token registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: Address,
    pub decimals: u8,
}

/// Result reported by the submission provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendOutcome {
    pub success: bool,
    pub hash: Option<String>,
    pub error: Option<String>,
}

impl SendOutcome {
    pub fn succeeded(hash: impl Into<String>) -> Self {
        Self {
            success: true,
            hash: Some(hash.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            hash: None,
            error: Some(error.into()),
        }
    }
}
