//! Periodic and on-demand balance refresh.
//!
//! Manual refreshes keep the busy indicator up for at least
//! `min_busy` and ignore further manual triggers meanwhile. Interval
//! refreshes fire every `interval` while the poller is active and only do
//! work when an address is loaded. Only one provider refresh runs at a time;
//! a trigger arriving while one is in flight joins it.
//!
//! While a network switch runs the poller is suspended: the refresh in
//! flight is cancelled and triggers are ignored until it resumes. A result
//! computed for another network than the active one is never published.

use crate::error::WalletError;
use crate::jobs::AsyncJob;
use crate::store::WalletStore;
use crate::types::WalletSnapshot;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    OnDemand,
    Interval,
}

/// Owns the interval timer task; dropping it stops the timer.
pub struct PollingGuard {
    handle: JoinHandle<()>,
}

impl Drop for PollingGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Result of a completed refresh, as seen by the caller of `poll`.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshReport {
    pub trigger: RefreshTrigger,
    pub result: Result<(), WalletError>,
}

type RefreshJob = AsyncJob<Result<WalletSnapshot, WalletError>>;

pub struct BalancePoller {
    interval: Duration,
    min_busy: Duration,
    timer: Option<PollingGuard>,
    ticks: Option<mpsc::UnboundedReceiver<()>>,
    job: Option<RefreshJob>,
    trigger: RefreshTrigger,
    busy_until: Option<Instant>,
    suspended: bool,
}

impl BalancePoller {
    pub fn new(interval: Duration, min_busy: Duration) -> Self {
        Self {
            interval,
            min_busy,
            timer: None,
            ticks: None,
            job: None,
            trigger: RefreshTrigger::Interval,
            busy_until: None,
            suspended: false,
        }
    }

    /// Start the interval timer. Idempotent.
    pub fn activate(&mut self) {
        if self.timer.is_some() {
            return;
        }
        let (tx, rx) = mpsc::unbounded_channel();
        let period = self.interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                if tx.send(()).is_err() {
                    break;
                }
            }
        });
        self.timer = Some(PollingGuard { handle });
        self.ticks = Some(rx);
        info!("Balance polling started every {}s", period.as_secs());
    }

    /// Stop the interval timer. A refresh already in flight still completes.
    pub fn deactivate(&mut self) {
        if self.timer.take().is_some() {
            info!("Balance polling stopped");
        }
        self.ticks = None;
    }

    pub fn is_active(&self) -> bool {
        self.timer.is_some()
    }

    /// Cancel any refresh in flight and ignore triggers until `resume`.
    pub fn suspend(&mut self) {
        if let Some(mut job) = self.job.take() {
            job.cancel();
            debug!("Refresh in flight cancelled");
        }
        self.busy_until = None;
        self.suspended = true;
    }

    pub fn resume(&mut self) {
        self.suspended = false;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn is_in_flight(&self) -> bool {
        self.job.as_ref().map(|j| j.is_running()).unwrap_or(false)
    }

    /// Whether the manual refresh indicator should show as busy
    pub fn is_refreshing(&self, now: Instant) -> bool {
        let manual_in_flight = self.is_in_flight() && self.trigger == RefreshTrigger::OnDemand;
        manual_in_flight || self.busy_until.map(|t| now < t).unwrap_or(false)
    }

    /// Manual refresh. Returns false when ignored: the poller is suspended,
    /// a manual refresh is still busy or no address is loaded.
    pub fn request_refresh(&mut self, store: &WalletStore, now: Instant) -> bool {
        if self.suspended {
            debug!("Manual refresh ignored while suspended");
            return false;
        }
        if self.is_refreshing(now) {
            debug!("Manual refresh ignored, previous one still busy");
            return false;
        }
        let Some(address) = store.address() else {
            return false;
        };
        self.busy_until = Some(now + self.min_busy);
        self.trigger = RefreshTrigger::OnDemand;
        if self.is_in_flight() {
            debug!("Manual refresh joined the interval refresh in flight");
            return true;
        }
        self.start(store, address);
        true
    }

    fn on_tick(&mut self, store: &WalletStore) {
        if self.suspended {
            debug!("Interval refresh skipped while suspended");
            return;
        }
        let Some(address) = store.address() else {
            debug!("Interval refresh skipped, no address loaded");
            return;
        };
        if self.is_in_flight() {
            debug!("Interval refresh skipped, refresh already in flight");
            return;
        }
        self.trigger = RefreshTrigger::Interval;
        self.start(store, address);
    }

    fn start(&mut self, store: &WalletStore, address: String) {
        debug!("Refreshing balance for {} ({:?})", address, self.trigger);
        let task = store.refresh_task(address);
        self.job = Some(AsyncJob::spawn(async move { Ok(task.await) }));
    }

    /// Drain timer ticks and collect a finished refresh. A successful
    /// refresh publishes the new snapshot; a failed one leaves the store
    /// untouched. A snapshot for a network that is no longer active is
    /// dropped without a report.
    pub fn poll(&mut self, store: &WalletStore) -> Option<RefreshReport> {
        let mut ticked = false;
        if let Some(rx) = self.ticks.as_mut() {
            while rx.try_recv().is_ok() {
                ticked = true;
            }
        }
        if ticked {
            self.on_tick(store);
        }

        let res = self.job.as_mut()?.poll()?;
        self.job = None;
        let result = match res {
            Ok(Ok(snapshot)) if snapshot.network != store.active_network() => {
                debug!(
                    "Dropping refresh for {}, active network is {}",
                    snapshot.network,
                    store.active_network()
                );
                return None;
            }
            Ok(Ok(snapshot)) => {
                store.publish(snapshot);
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(e) => Err(WalletError::provider(e)),
        };
        if let Err(e) = &result {
            warn!("Balance refresh failed, keeping previous snapshot: {}", e);
        }
        Some(RefreshReport {
            trigger: self.trigger,
            result,
        })
    }
}
