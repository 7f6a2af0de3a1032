//! Outgoing transfer workflow.
//!
//! One [`TransferWorkflow`] backs one opening of the send form:
//!
//! ```text
//! Editing -> Pending -> Success
//!                    -> Failed -> Editing (retry)
//! any     -> Closed
//! ```
//!
//! At most one submission is in flight per instance. Results are tagged with
//! the instance id, so nothing computed for a closed form can land in a new one.

use crate::config::{is_native_symbol, NATIVE_DECIMALS};
use crate::error::WalletError;
use crate::gas::{GasEstimate, GasEstimator, GasTracker};
use crate::jobs::{next_instance_id, AsyncJob, Ticket};
use crate::provider::TransferProvider;
use crate::types::{AssetBalance, SendOutcome, TokenInfo};
use crate::utils::{
    format_amount, from_base_units, parse_decimal, parse_positive_amount, parse_recipient,
    to_base_units, truncate_decimals,
};
use ethers::types::Address;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const GENERIC_FAILURE_MESSAGE: &str = "Transaction failed";

/// How a transfer reaches the chain, resolved once at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    Native,
    Token { address: Address, decimals: u8 },
}

impl TransferKind {
    /// Native for the network asset, otherwise look the symbol up in the
    /// token registry.
    pub fn resolve(symbol: &str, registry: &HashMap<String, TokenInfo>) -> Result<Self, WalletError> {
        if is_native_symbol(symbol) {
            return Ok(TransferKind::Native);
        }
        registry
            .get(symbol)
            .map(|t| TransferKind::Token {
                address: t.address,
                decimals: t.decimals,
            })
            .ok_or_else(|| WalletError::UnsupportedAsset(symbol.to_string()))
    }

    pub fn decimals(&self) -> u8 {
        match self {
            TransferKind::Native => NATIVE_DECIMALS,
            TransferKind::Token { decimals, .. } => *decimals,
        }
    }

    pub async fn submit(
        &self,
        provider: &dyn TransferProvider,
        recipient: &str,
        amount: &str,
    ) -> anyhow::Result<SendOutcome> {
        match self {
            TransferKind::Native => provider.send_native(recipient, amount).await,
            TransferKind::Token { address, decimals } => {
                provider
                    .send_token(&format!("{:?}", address), recipient, amount, *decimals)
                    .await
            }
        }
    }
}

/// Form fields of one send attempt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferRequest {
    pub recipient: String,
    pub amount: String,
    pub asset_symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferStatus {
    Editing,
    Pending,
    Success { hash: Option<String> },
    Failed { message: String },
    Closed,
}

impl TransferStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransferStatus::Success { .. } | TransferStatus::Failed { .. } | TransferStatus::Closed
        )
    }
}

type SubmissionResult = (Ticket, Result<SendOutcome, WalletError>);

pub struct TransferWorkflow {
    instance: u64,
    default_symbol: String,
    request: TransferRequest,
    status: TransferStatus,
    outcome: Option<SendOutcome>,
    gas: GasTracker,
    provider: Arc<dyn TransferProvider>,
    submission: Option<AsyncJob<SubmissionResult>>,
    submissions: u64,
    timeout: Duration,
}

impl TransferWorkflow {
    pub fn new(
        provider: Arc<dyn TransferProvider>,
        estimator: GasEstimator,
        timeout: Duration,
        default_symbol: impl Into<String>,
    ) -> Self {
        let instance = next_instance_id();
        let default_symbol = default_symbol.into();
        Self {
            instance,
            request: TransferRequest {
                asset_symbol: default_symbol.clone(),
                ..TransferRequest::default()
            },
            default_symbol,
            status: TransferStatus::Editing,
            outcome: None,
            gas: GasTracker::new(estimator, instance),
            provider,
            submission: None,
            submissions: 0,
            timeout,
        }
    }

    pub fn instance(&self) -> u64 {
        self.instance
    }

    pub fn request(&self) -> &TransferRequest {
        &self.request
    }

    pub fn status(&self) -> &TransferStatus {
        &self.status
    }

    pub fn outcome(&self) -> Option<&SendOutcome> {
        self.outcome.as_ref()
    }

    pub fn gas_estimate(&self) -> Option<&GasEstimate> {
        self.gas.estimate()
    }

    pub fn is_estimating(&self) -> bool {
        self.gas.is_estimating()
    }

    pub fn is_pending(&self) -> bool {
        self.status == TransferStatus::Pending
    }

    // ---- editing ----

    pub fn set_recipient(&mut self, recipient: impl Into<String>) {
        if self.status != TransferStatus::Editing {
            return;
        }
        self.request.recipient = recipient.into();
        self.refresh_gas();
    }

    pub fn set_amount(&mut self, amount: impl Into<String>) {
        if self.status != TransferStatus::Editing {
            return;
        }
        self.request.amount = amount.into();
        self.refresh_gas();
    }

    pub fn select_asset(&mut self, symbol: impl Into<String>) {
        if self.status != TransferStatus::Editing {
            return;
        }
        self.request.asset_symbol = symbol.into();
        self.refresh_gas();
    }

    fn refresh_gas(&mut self) {
        let TransferRequest {
            recipient,
            amount,
            asset_symbol,
        } = &self.request;
        self.gas.invalidate(asset_symbol, recipient, amount);
    }

    /// Details of the selected asset among `assets`
    pub fn asset_details<'a>(&self, assets: &'a [AssetBalance]) -> Option<&'a AssetBalance> {
        assets.iter().find(|a| a.symbol == self.request.asset_symbol)
    }

    /// Fill the amount with the full available balance of the selected asset.
    /// Tokens get the balance exactly as reported. For the native asset the
    /// fee is held back (the current estimate when there is one, otherwise
    /// the highest fee an estimate could report) and the rest is floored to
    /// six decimals so the amount never exceeds what is spendable.
    pub fn use_maximum(&mut self, assets: &[AssetBalance]) -> Option<String> {
        if self.status != TransferStatus::Editing {
            return None;
        }
        let asset = self.asset_details(assets)?;
        let symbol = self.request.asset_symbol.as_str();
        let amount = if is_native_symbol(symbol) {
            let fee = match self.gas.estimate() {
                Some(est) => est.fee,
                None => self.gas.estimator().worst_case_fee(symbol),
            };
            let available = to_base_units(&asset.raw_amount, NATIVE_DECIMALS).unwrap_or_default();
            let fee = to_base_units(&format!("{:.18}", fee.max(0.0)), NATIVE_DECIMALS)
                .unwrap_or_default();
            let spendable = available.saturating_sub(fee);
            truncate_decimals(&from_base_units(spendable, NATIVE_DECIMALS), 6)
        } else {
            match parse_decimal(&asset.raw_amount) {
                Some(v) if v >= 0.0 => asset.raw_amount.trim().to_string(),
                _ => format_amount(0.0),
            }
        };
        self.set_amount(amount.clone());
        Some(amount)
    }

    /// Whether the send action should be enabled
    pub fn can_submit(&self) -> bool {
        self.status == TransferStatus::Editing && self.validate().is_ok()
    }

    /// Field checks shared by the send button and `submit`. An amount with
    /// more fraction digits than the asset carries is rejected here. Unknown
    /// assets pass and are refused by `submit`.
    fn validate(&self) -> Result<(), WalletError> {
        parse_recipient(&self.request.recipient)?;
        parse_positive_amount(&self.request.amount)?;
        let registry = self.provider.token_registry();
        if let Ok(kind) = TransferKind::resolve(&self.request.asset_symbol, &registry) {
            to_base_units(&self.request.amount, kind.decimals())?;
        }
        Ok(())
    }

    // ---- submission ----

    /// Start submitting the form. Returns `Ok(false)` when the call was
    /// ignored because a submission is already running or the form has
    /// reached an outcome.
    pub fn submit(&mut self) -> Result<bool, WalletError> {
        if self.status != TransferStatus::Editing {
            return Ok(false);
        }
        self.validate()?;

        let symbol = self.request.asset_symbol.clone();
        let registry = self.provider.token_registry();
        let kind = match TransferKind::resolve(&symbol, &registry) {
            Ok(kind) => kind,
            Err(e) => {
                warn!("Refusing transfer of {}: {}", symbol, e);
                self.fail(e.user_message());
                return Err(e);
            }
        };

        self.submissions += 1;
        let ticket = Ticket {
            instance: self.instance,
            generation: self.submissions,
        };
        let provider = Arc::clone(&self.provider);
        let recipient = self.request.recipient.trim().to_string();
        let amount = self.request.amount.trim().to_string();
        let timeout = self.timeout;

        info!(
            "Submitting {} {} to {} ({:?})",
            amount, symbol, recipient, kind
        );
        self.status = TransferStatus::Pending;
        self.outcome = None;
        self.submission = Some(AsyncJob::spawn(async move {
            let result = match tokio::time::timeout(
                timeout,
                kind.submit(provider.as_ref(), &recipient, &amount),
            )
            .await
            {
                Ok(Ok(outcome)) => Ok(outcome),
                Ok(Err(e)) => Err(WalletError::provider(e)),
                Err(_) => Err(WalletError::Timeout(timeout)),
            };
            Ok((ticket, result))
        }));
        Ok(true)
    }

    /// Drive background work. Returns true when anything visible changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = self.gas.poll();
        if let Some(job) = self.submission.as_mut() {
            if let Some(res) = job.poll() {
                self.submission = None;
                changed |= match res {
                    Ok((ticket, result)) => self.settle(ticket, result),
                    Err(e) => self.settle(
                        self.current_ticket(),
                        Err(WalletError::provider(e)),
                    ),
                };
            }
        }
        changed
    }

    fn current_ticket(&self) -> Ticket {
        Ticket {
            instance: self.instance,
            generation: self.submissions,
        }
    }

    /// Apply a submission result if it belongs to this instance's latest
    /// submission. Never leaves the workflow in `Pending`.
    pub fn settle(&mut self, ticket: Ticket, result: Result<SendOutcome, WalletError>) -> bool {
        if ticket != self.current_ticket() || self.status != TransferStatus::Pending {
            warn!(
                "Ignoring submission result for instance {} (current {})",
                ticket.instance, self.instance
            );
            return false;
        }
        match result {
            Ok(outcome) if outcome.success => {
                info!("Transfer succeeded: {:?}", outcome.hash);
                self.status = TransferStatus::Success {
                    hash: outcome.hash.clone(),
                };
                self.outcome = Some(outcome);
            }
            Ok(outcome) => {
                let message = outcome
                    .error
                    .clone()
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
                warn!("Transfer rejected by provider: {}", message);
                self.outcome = Some(outcome);
                self.status = TransferStatus::Failed { message };
            }
            Err(e) => {
                warn!("Transfer failed: {}", e);
                self.fail(e.user_message());
            }
        }
        true
    }

    fn fail(&mut self, message: String) {
        self.outcome = Some(SendOutcome::failed(message.clone()));
        self.status = TransferStatus::Failed { message };
    }

    /// Back to editing after a failure, keeping what the user typed.
    pub fn retry(&mut self) -> bool {
        if !matches!(self.status, TransferStatus::Failed { .. }) {
            return false;
        }
        self.status = TransferStatus::Editing;
        self.outcome = None;
        self.refresh_gas();
        true
    }

    /// Clear every field, the status, the result and the estimate.
    pub fn reset(&mut self) {
        self.request = TransferRequest {
            asset_symbol: self.default_symbol.clone(),
            ..TransferRequest::default()
        };
        self.status = TransferStatus::Editing;
        self.outcome = None;
        self.gas.clear();
        // A submission already handed to the provider keeps running; only
        // its effect on this form is dropped.
        self.submission = None;
        self.submissions += 1;
    }

    pub fn close(&mut self) {
        self.reset();
        self.status = TransferStatus::Closed;
    }

    // ---- presentation helpers ----

    pub fn title(&self, network_label: &str) -> String {
        format!("Send {} on {}", self.request.asset_symbol, network_label)
    }

    /// Amount plus fee for native sends, the amount alone for tokens.
    pub fn total_cost_label(&self) -> Option<String> {
        let estimate = self.gas.estimate()?;
        let amount = parse_decimal(&self.request.amount)?;
        let total = if is_native_symbol(&self.request.asset_symbol) {
            format_amount(amount + estimate.fee)
        } else {
            self.request.amount.trim().to_string()
        };
        Some(format!("{} {}", total, self.request.asset_symbol))
    }

    pub fn fee_label(&self) -> Option<String> {
        self.gas
            .estimate()
            .map(|e| format!("{} ETH ({})", format_amount(e.fee), e.eta_label))
    }
}
