//! Owned wallet state container.
//!
//! The store republishes provider snapshots to any number of subscribers via
//! a `watch` channel. It never edits a snapshot: new ones only come from the
//! provider after a successful refresh or network switch.

use crate::config::NetworkProfile;
use crate::error::WalletError;
use crate::provider::WalletProvider;
use crate::types::WalletSnapshot;
use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

pub type SnapshotReceiver = watch::Receiver<Arc<WalletSnapshot>>;

pub struct WalletStore {
    provider: Arc<dyn WalletProvider>,
    sender: watch::Sender<Arc<WalletSnapshot>>,
}

impl WalletStore {
    pub fn new(provider: Arc<dyn WalletProvider>, initial: WalletSnapshot) -> Self {
        let (sender, _) = watch::channel(Arc::new(initial));
        Self { provider, sender }
    }

    /// Build a store seeded with the provider's current snapshot
    pub async fn load(provider: Arc<dyn WalletProvider>) -> Result<Self> {
        let initial = provider.snapshot().await?;
        info!(
            "Loaded wallet snapshot on {} (address loaded: {})",
            initial.network,
            initial.loaded_address().is_some()
        );
        Ok(Self::new(provider, initial))
    }

    pub fn subscribe(&self) -> SnapshotReceiver {
        self.sender.subscribe()
    }

    pub fn current(&self) -> Arc<WalletSnapshot> {
        self.sender.borrow().clone()
    }

    pub fn active_network(&self) -> NetworkProfile {
        self.sender.borrow().network
    }

    pub fn address(&self) -> Option<String> {
        self.sender.borrow().loaded_address().map(str::to_string)
    }

    /// Refresh through the provider and read back the new snapshot.
    /// Nothing is published until the caller hands the result to `publish`.
    pub fn refresh_task(
        &self,
        address: String,
    ) -> impl Future<Output = Result<WalletSnapshot, WalletError>> + Send + 'static {
        let provider = Arc::clone(&self.provider);
        async move {
            provider
                .refresh_balance(&address)
                .await
                .map_err(WalletError::provider)?;
            provider.snapshot().await.map_err(WalletError::provider)
        }
    }

    /// Switch through the provider. Succeeds only if the provider reports the
    /// target profile afterwards.
    pub fn switch_task(
        &self,
        target: NetworkProfile,
    ) -> impl Future<Output = Result<WalletSnapshot, WalletError>> + Send + 'static {
        let provider = Arc::clone(&self.provider);
        async move {
            provider
                .switch_network(target)
                .await
                .map_err(|e| WalletError::NetworkSwitchFailure(e.to_string()))?;
            let snapshot = provider
                .snapshot()
                .await
                .map_err(|e| WalletError::NetworkSwitchFailure(e.to_string()))?;
            if snapshot.network != target {
                return Err(WalletError::NetworkSwitchFailure(format!(
                    "provider is on {} after switching to {}",
                    snapshot.network, target
                )));
            }
            Ok(snapshot)
        }
    }

    /// Replace the current snapshot with one read from the provider.
    pub(crate) fn publish(&self, snapshot: WalletSnapshot) {
        self.sender.send_replace(Arc::new(snapshot));
    }
}
