//! Gas fee estimation for a pending transfer.
//!
//! The fee is a base fee per asset class scaled by a congestion jitter in
//! [0.9, 1.1]. Every input change supersedes the previous estimate; results
//! are tagged with a [`Ticket`] so a late completion can never overwrite a
//! newer one.

use crate::config::{is_native_symbol, Config};
use crate::jobs::{AsyncJob, Ticket};
use crate::utils::parse_decimal;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, warn};

pub const JITTER_MIN: f64 = 0.9;
pub const JITTER_MAX: f64 = 1.1;

#[derive(Debug, Clone, PartialEq)]
pub struct GasEstimate {
    /// Fee in native units
    pub fee: f64,
    pub eta_label: String,
}

#[derive(Debug, Clone)]
pub struct GasEstimator {
    native_base_fee: f64,
    token_base_fee: f64,
    latency: Duration,
    eta_label: String,
    fixed_jitter: Option<f64>,
}

impl GasEstimator {
    pub fn from_config(config: &Config) -> Self {
        Self {
            native_base_fee: config.native_base_fee,
            token_base_fee: config.token_base_fee,
            latency: config.gas_latency,
            eta_label: config.gas_eta_label.clone(),
            fixed_jitter: config.fixed_gas_jitter,
        }
    }

    /// An estimate is only meaningful with a recipient and a positive amount.
    pub fn wants_estimate(recipient: &str, amount: &str) -> bool {
        !recipient.trim().is_empty() && parse_decimal(amount).map(|a| a > 0.0).unwrap_or(false)
    }

    pub fn base_fee(&self, symbol: &str) -> f64 {
        if is_native_symbol(symbol) {
            self.native_base_fee
        } else {
            self.token_base_fee
        }
    }

    /// Highest fee an estimate for `symbol` can come back with
    pub fn worst_case_fee(&self, symbol: &str) -> f64 {
        self.base_fee(symbol) * JITTER_MAX
    }

    fn draw_jitter(&self) -> f64 {
        match self.fixed_jitter {
            Some(j) => j.clamp(JITTER_MIN, JITTER_MAX),
            None => rand::thread_rng().gen_range(JITTER_MIN..=JITTER_MAX),
        }
    }

    /// Estimate the fee for sending `amount` of `symbol` to `recipient`.
    /// Returns `None` immediately when the inputs cannot be estimated.
    pub async fn estimate(&self, symbol: &str, recipient: &str, amount: &str) -> Option<GasEstimate> {
        if !Self::wants_estimate(recipient, amount) {
            return None;
        }
        let fee = self.base_fee(symbol) * self.draw_jitter();
        tokio::time::sleep(self.latency).await;
        Some(GasEstimate {
            fee,
            eta_label: self.eta_label.clone(),
        })
    }
}

/// Holds the estimate shown for one transfer form and the job computing the
/// next one.
pub struct GasTracker {
    estimator: GasEstimator,
    instance: u64,
    generation: u64,
    current: Option<GasEstimate>,
    job: Option<AsyncJob<(Ticket, Option<GasEstimate>)>>,
}

impl GasTracker {
    pub fn new(estimator: GasEstimator, instance: u64) -> Self {
        Self {
            estimator,
            instance,
            generation: 0,
            current: None,
            job: None,
        }
    }

    pub fn ticket(&self) -> Ticket {
        Ticket {
            instance: self.instance,
            generation: self.generation,
        }
    }

    pub fn estimator(&self) -> &GasEstimator {
        &self.estimator
    }

    /// Inputs changed: drop whatever was shown or in flight and, when the
    /// inputs allow it, start a fresh estimate.
    pub fn invalidate(&mut self, symbol: &str, recipient: &str, amount: &str) {
        self.clear();
        if !GasEstimator::wants_estimate(recipient, amount) {
            return;
        }
        let ticket = self.ticket();
        let estimator = self.estimator.clone();
        let (symbol, recipient, amount) = (symbol.to_string(), recipient.to_string(), amount.to_string());
        self.job = Some(AsyncJob::spawn(async move {
            let estimate = estimator.estimate(&symbol, &recipient, &amount).await;
            Ok((ticket, estimate))
        }));
    }

    /// Poll the in-flight job. Returns true when the shown estimate changed.
    pub fn poll(&mut self) -> bool {
        let Some(job) = self.job.as_mut() else {
            return false;
        };
        match job.poll() {
            None => false,
            Some(Ok((ticket, estimate))) => {
                self.job = None;
                self.accept(ticket, estimate)
            }
            Some(Err(e)) => {
                self.job = None;
                warn!("Gas estimation failed: {}", e);
                false
            }
        }
    }

    /// Apply a completed estimate if it was computed for the current inputs.
    pub fn accept(&mut self, ticket: Ticket, estimate: Option<GasEstimate>) -> bool {
        if ticket != self.ticket() {
            debug!(
                "Discarding stale gas estimate (generation {} != {})",
                ticket.generation, self.generation
            );
            return false;
        }
        self.current = estimate;
        true
    }

    pub fn estimate(&self) -> Option<&GasEstimate> {
        self.current.as_ref()
    }

    pub fn is_estimating(&self) -> bool {
        self.job.as_ref().map(|j| j.is_running()).unwrap_or(false)
    }

    /// Forget the shown estimate and abandon any job in flight.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.current = None;
        if let Some(mut job) = self.job.take() {
            job.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECIPIENT: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";

    fn pinned_estimator() -> GasEstimator {
        let config = Config {
            fixed_gas_jitter: Some(1.0),
            ..Config::default()
        };
        GasEstimator::from_config(&config)
    }

    async fn settle(tracker: &mut GasTracker) {
        tokio::time::sleep(Duration::from_millis(600)).await;
        for _ in 0..10 {
            if tracker.poll() || !tracker.is_estimating() {
                return;
            }
            tokio::task::yield_now().await;
        }
    }

    // ==================== GasEstimator tests ====================

    #[test]
    fn test_wants_estimate() {
        assert!(GasEstimator::wants_estimate(RECIPIENT, "1"));
        assert!(!GasEstimator::wants_estimate("", "1"));
        assert!(!GasEstimator::wants_estimate(RECIPIENT, ""));
        assert!(!GasEstimator::wants_estimate(RECIPIENT, "0"));
        assert!(!GasEstimator::wants_estimate(RECIPIENT, "-2"));
        assert!(!GasEstimator::wants_estimate(RECIPIENT, "abc"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_estimate_fee_within_jitter_bounds() {
        let estimator = GasEstimator::from_config(&Config::default());
        for _ in 0..20 {
            let est = estimator.estimate("ETH", RECIPIENT, "1").await.unwrap();
            assert!(est.fee >= 0.0002 * JITTER_MIN - 1e-12);
            assert!(est.fee <= 0.0002 * JITTER_MAX + 1e-12);
            assert_eq!(est.eta_label, "~30 seconds");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_estimate_token_base_fee() {
        let est = pinned_estimator().estimate("USDC", RECIPIENT, "5").await.unwrap();
        assert_eq!(est.fee, 0.0005);
    }

    #[tokio::test(start_paused = true)]
    async fn test_estimate_skips_invalid_inputs() {
        let est = pinned_estimator().estimate("ETH", "", "1").await;
        assert!(est.is_none());
    }

    #[test]
    fn test_worst_case_fee() {
        let estimator = pinned_estimator();
        assert!((estimator.worst_case_fee("ETH") - 0.00022).abs() < 1e-12);
    }

    // ==================== GasTracker tests ====================

    #[tokio::test(start_paused = true)]
    async fn test_tracker_produces_estimate() {
        let mut tracker = GasTracker::new(pinned_estimator(), 1);
        tracker.invalidate("ETH", RECIPIENT, "1");
        assert!(tracker.estimate().is_none());
        assert!(tracker.is_estimating());
        settle(&mut tracker).await;
        assert_eq!(tracker.estimate().unwrap().fee, 0.0002);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tracker_latest_inputs_win() {
        let mut tracker = GasTracker::new(pinned_estimator(), 1);
        tracker.invalidate("ETH", RECIPIENT, "1");
        tokio::time::sleep(Duration::from_millis(200)).await;
        tracker.invalidate("USDC", RECIPIENT, "1");
        settle(&mut tracker).await;
        assert_eq!(tracker.estimate().unwrap().fee, 0.0005);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tracker_discards_out_of_order_completion() {
        let mut tracker = GasTracker::new(pinned_estimator(), 1);
        let stale = tracker.ticket();
        tracker.invalidate("USDC", RECIPIENT, "2");
        let fresh = tracker.ticket();
        let newer = GasEstimate { fee: 0.0005, eta_label: "~30 seconds".into() };
        let older = GasEstimate { fee: 0.0002, eta_label: "~30 seconds".into() };

        assert!(tracker.accept(fresh, Some(newer.clone())));
        assert!(!tracker.accept(stale, Some(older)));
        assert_eq!(tracker.estimate(), Some(&newer));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tracker_rejects_other_instance() {
        let mut tracker = GasTracker::new(pinned_estimator(), 1);
        let foreign = Ticket { instance: 2, generation: tracker.ticket().generation };
        let est = GasEstimate { fee: 1.0, eta_label: String::new() };
        assert!(!tracker.accept(foreign, Some(est)));
        assert!(tracker.estimate().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tracker_clears_on_invalid_inputs() {
        let mut tracker = GasTracker::new(pinned_estimator(), 1);
        tracker.invalidate("ETH", RECIPIENT, "1");
        settle(&mut tracker).await;
        assert!(tracker.estimate().is_some());

        tracker.invalidate("ETH", RECIPIENT, "");
        assert!(tracker.estimate().is_none());
        assert!(!tracker.is_estimating());
    }
}
