//! Active network profile transitions.

use crate::config::NetworkProfile;
use crate::error::WalletError;
use crate::jobs::AsyncJob;
use crate::store::WalletStore;
use crate::types::WalletSnapshot;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchReport {
    pub target: NetworkProfile,
    pub result: Result<(), WalletError>,
}

/// Runs at most one switch at a time. While it runs the dashboard is in its
/// global loading state.
#[derive(Default)]
pub struct NetworkSwitcher {
    job: Option<AsyncJob<Result<WalletSnapshot, WalletError>>>,
    target: Option<NetworkProfile>,
}

impl NetworkSwitcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_switching(&self) -> bool {
        self.job.as_ref().map(|j| j.is_running()).unwrap_or(false)
    }

    pub fn target(&self) -> Option<NetworkProfile> {
        self.target.filter(|_| self.is_switching())
    }

    /// Begin switching to `target`. Ignored while another switch runs or
    /// when `target` is already active.
    pub fn switch(&mut self, store: &WalletStore, target: NetworkProfile) -> bool {
        if self.is_switching() {
            warn!("Switch to {} ignored, another switch is in progress", target);
            return false;
        }
        if store.active_network() == target {
            return false;
        }
        info!("Switching network {} -> {}", store.active_network(), target);
        let task = store.switch_task(target);
        self.target = Some(target);
        self.job = Some(AsyncJob::spawn(async move { Ok(task.await) }));
        true
    }

    /// Collect a finished switch. On success the new snapshot is published;
    /// on failure the store keeps the previous profile and balances.
    pub fn poll(&mut self, store: &WalletStore) -> Option<SwitchReport> {
        let res = self.job.as_mut()?.poll()?;
        self.job = None;
        let target = self.target.take()?;
        let result = match res {
            Ok(Ok(snapshot)) => {
                store.publish(snapshot);
                info!("Now on {}", target);
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(e) => Err(WalletError::NetworkSwitchFailure(e.to_string())),
        };
        if let Err(e) = &result {
            warn!("Staying on {}: {}", store.active_network(), e);
        }
        Some(SwitchReport { target, result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulated::SimulatedWallet;
    use std::sync::Arc;
    use std::time::Duration;

    async fn pump(switcher: &mut NetworkSwitcher, store: &WalletStore) -> Option<SwitchReport> {
        for _ in 0..10 {
            tokio::task::yield_now().await;
            if let Some(r) = switcher.poll(store) {
                return Some(r);
            }
        }
        None
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_success() {
        let store = WalletStore::load(Arc::new(SimulatedWallet::demo())).await.unwrap();
        let mut switcher = NetworkSwitcher::new();
        assert!(switcher.switch(&store, NetworkProfile::Mainnet));
        assert!(switcher.is_switching());
        assert_eq!(switcher.target(), Some(NetworkProfile::Mainnet));

        tokio::time::sleep(Duration::from_secs(1)).await;
        let report = pump(&mut switcher, &store).await.unwrap();
        assert!(report.result.is_ok());
        assert!(!switcher.is_switching());
        assert_eq!(store.active_network(), NetworkProfile::Mainnet);
        assert_eq!(store.current().native_balance.as_deref(), Some("1.25"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_failure_leaves_everything() {
        let wallet = Arc::new(SimulatedWallet::demo());
        wallet.fail_next_switch("wallet rejected chain change");
        let store = WalletStore::load(wallet).await.unwrap();
        let before = store.current();
        let mut switcher = NetworkSwitcher::new();
        switcher.switch(&store, NetworkProfile::Mainnet);

        tokio::time::sleep(Duration::from_secs(1)).await;
        let report = pump(&mut switcher, &store).await.unwrap();
        assert!(matches!(report.result, Err(WalletError::NetworkSwitchFailure(_))));
        assert!(!switcher.is_switching());
        assert_eq!(store.active_network(), NetworkProfile::Testnet);
        assert_eq!(store.current(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_switch_ignored_while_running() {
        let wallet = Arc::new(SimulatedWallet::demo());
        let store = WalletStore::load(wallet.clone()).await.unwrap();
        let mut switcher = NetworkSwitcher::new();
        assert!(switcher.switch(&store, NetworkProfile::Mainnet));
        assert!(!switcher.switch(&store, NetworkProfile::Mainnet));
        tokio::time::sleep(Duration::from_secs(1)).await;
        pump(&mut switcher, &store).await;
        assert_eq!(wallet.switch_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_lasts_until_provider_settles() {
        let wallet = Arc::new(SimulatedWallet::demo());
        wallet.set_switch_latency(Duration::from_secs(3));
        let store = WalletStore::load(wallet).await.unwrap();
        let mut switcher = NetworkSwitcher::new();
        switcher.switch(&store, NetworkProfile::Mainnet);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(pump(&mut switcher, &store).await.is_none());
        assert!(switcher.is_switching());
        assert_eq!(store.active_network(), NetworkProfile::Testnet);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(pump(&mut switcher, &store).await.is_some());
        assert!(!switcher.is_switching());
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_to_active_is_noop() {
        let wallet = Arc::new(SimulatedWallet::demo());
        let store = WalletStore::load(wallet.clone()).await.unwrap();
        let mut switcher = NetworkSwitcher::new();
        assert!(!switcher.switch(&store, NetworkProfile::Testnet));
        assert_eq!(wallet.switch_calls(), 0);
    }
}
