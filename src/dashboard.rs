//! Wallet dashboard view-model.
//!
//! `Dashboard` owns every piece of coordination state and is driven by
//! `tick()` from a single logical thread, the same way a GUI frame loop
//! polls its jobs. Background work (refresh, switch, gas, submission) runs on
//! the tokio runtime and is only ever applied from `tick()`.

use crate::config::{address_explorer_url, tx_explorer_url, Config, NetworkProfile};
use crate::error::WalletError;
use crate::gas::GasEstimator;
use crate::network_switch::NetworkSwitcher;
use crate::notifications::Notifications;
use crate::operation_log::OperationLog;
use crate::poller::{BalancePoller, RefreshTrigger};
use crate::provider::{TransferProvider, WalletProvider};
use crate::store::{SnapshotReceiver, WalletStore};
use crate::transfer::{TransferStatus, TransferWorkflow};
use crate::types::{TransactionRecord, WalletSnapshot};
use crate::user_settings::UserSettings;
use crate::utils::shorten_address;
use crate::valuation::{Observation, Portfolio};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{info, warn};

pub struct Dashboard {
    config: Config,
    settings: UserSettings,
    settings_path: Option<PathBuf>,
    store: WalletStore,
    snapshots: SnapshotReceiver,
    transfers: Arc<dyn TransferProvider>,
    poller: BalancePoller,
    switcher: NetworkSwitcher,
    portfolio: Portfolio,
    send: Option<TransferWorkflow>,
    notifications: Notifications,
    operation_log: Option<OperationLog>,
}

impl Dashboard {
    /// Settings override the matching `config` fields.
    pub fn new(
        mut config: Config,
        settings: UserSettings,
        store: WalletStore,
        transfers: Arc<dyn TransferProvider>,
    ) -> Self {
        settings.apply_to(&mut config);
        let snapshots = store.subscribe();
        let mut portfolio = Portfolio::new(config.native_price_usd);
        {
            let current = store.current();
            portfolio.apply(current.native_balance.as_deref(), &current.assets);
        }
        Self {
            poller: BalancePoller::new(config.poll_interval, config.min_refresh_duration),
            config,
            settings,
            settings_path: None,
            store,
            snapshots,
            transfers,
            switcher: NetworkSwitcher::new(),
            portfolio,
            send: None,
            notifications: Notifications::new(),
            operation_log: None,
        }
    }

    /// Read the initial snapshot from `wallet` and build the dashboard.
    pub async fn load(
        config: Config,
        settings: UserSettings,
        wallet: Arc<dyn WalletProvider>,
        transfers: Arc<dyn TransferProvider>,
    ) -> Result<Self> {
        let store = WalletStore::load(wallet).await?;
        Ok(Self::new(config, settings, store, transfers))
    }

    /// Persist preference changes to `path`
    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    pub fn with_operation_log(mut self, log: OperationLog) -> Self {
        self.operation_log = Some(log);
        self
    }

    // ---- lifecycle ----

    /// The view became visible: start interval polling.
    pub fn activate(&mut self) {
        self.poller.activate();
    }

    /// The view went away: stop interval polling.
    pub fn deactivate(&mut self) {
        self.poller.deactivate();
    }

    pub fn is_active(&self) -> bool {
        self.poller.is_active()
    }

    /// Apply every finished background job. Returns true when anything
    /// visible changed.
    pub fn tick(&mut self) -> bool {
        let mut changed = false;

        if let Some(report) = self.switcher.poll(&self.store) {
            changed = true;
            self.poller.resume();
            match report.result {
                Ok(()) => {
                    self.notifications
                        .info(format!("Switched to {}", report.target.label()));
                    self.settings.selected_network = report.target;
                    self.persist_settings();
                    self.log_operation(
                        "network_switch",
                        format!("target={}", report.target.as_str()),
                    );
                }
                Err(e) => {
                    self.notifications.error(format!(
                        "Could not switch to {}: {}",
                        report.target.label(),
                        e.user_message()
                    ));
                }
            }
        }

        if let Some(report) = self.poller.poll(&self.store) {
            changed = true;
            if let Err(e) = report.result {
                // Interval failures only go to the log
                if report.trigger == RefreshTrigger::OnDemand {
                    self.notifications
                        .error(format!("Balance refresh failed: {}", e.user_message()));
                }
            }
        }

        if let Some(before) = self.send.as_ref().map(|w| w.status().clone()) {
            if let Some(workflow) = self.send.as_mut() {
                changed |= workflow.poll();
            }
            self.note_transfer_transition(&before);
        }

        if self.snapshots.has_changed().unwrap_or(false) {
            let snapshot = self.snapshots.borrow_and_update().clone();
            self.portfolio
                .apply(snapshot.native_balance.as_deref(), &snapshot.assets);
            changed = true;
        }

        changed
    }

    // ---- global loading ----

    /// A network switch is running; balance, transfer and switch controls
    /// are locked.
    pub fn is_loading(&self) -> bool {
        self.switcher.is_switching()
    }

    pub fn switching_to(&self) -> Option<NetworkProfile> {
        self.switcher.target()
    }

    // ---- balance ----

    pub fn request_refresh(&mut self) -> bool {
        if self.is_loading() {
            return false;
        }
        self.poller.request_refresh(&self.store, Instant::now())
    }

    pub fn is_refreshing(&self) -> bool {
        self.poller.is_refreshing(Instant::now())
    }

    pub fn snapshot(&self) -> Arc<WalletSnapshot> {
        self.store.current()
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn observation(&self) -> &Observation {
        self.portfolio.observation()
    }

    pub fn total_display(&self) -> String {
        self.portfolio.display_total(self.settings.hide_balance)
    }

    pub fn is_balance_hidden(&self) -> bool {
        self.settings.hide_balance
    }

    pub fn toggle_hide_balance(&mut self) -> bool {
        self.settings.hide_balance = !self.settings.hide_balance;
        self.persist_settings();
        self.settings.hide_balance
    }

    // ---- network ----

    pub fn active_network(&self) -> NetworkProfile {
        self.store.active_network()
    }

    /// Start a switch. Balance refreshes stay suspended until it settles.
    pub fn switch_network(&mut self, target: NetworkProfile) -> bool {
        if self.is_loading() {
            return false;
        }
        let started = self.switcher.switch(&self.store, target);
        if started {
            self.poller.suspend();
        }
        started
    }

    /// "Scroll Sepolia (42ms)" or "Connecting to Scroll Sepolia..."
    pub fn network_status_line(&self) -> String {
        let snapshot = self.store.current();
        let label = snapshot.network.label();
        if snapshot.network_status.connected {
            format!("{} ({}ms)", label, snapshot.network_status.latency_ms)
        } else {
            format!("Connecting to {}...", label)
        }
    }

    pub fn receive_hint(&self) -> String {
        let network = self.active_network();
        let mut hint = format!(
            "Only send assets on {} to this address. Assets sent from other networks may be lost.",
            network.label()
        );
        if network.is_testnet() {
            hint.push_str(" Testnet assets have no real value.");
        }
        hint
    }

    // ---- address and explorer links ----

    pub fn short_address(&self) -> Option<String> {
        self.store.address().map(|a| shorten_address(&a))
    }

    pub fn address_link(&self) -> Option<String> {
        let address = self.store.address()?;
        address_explorer_url(self.active_network(), &address)
    }

    /// Link for a history entry, against the profile active right now.
    pub fn explorer_link(&self, tx: &TransactionRecord) -> Option<String> {
        let hash = tx.tx_hash.as_deref()?;
        tx_explorer_url(self.active_network(), hash)
    }

    /// Link for the hash of a successful transfer in the send form
    pub fn transfer_explorer_link(&self) -> Option<String> {
        match self.send.as_ref()?.status() {
            TransferStatus::Success { hash: Some(hash) } => {
                tx_explorer_url(self.active_network(), hash)
            }
            _ => None,
        }
    }

    // ---- send form ----

    /// Open a fresh send form. Ignored while loading or when one is
    /// already open.
    pub fn open_send(&mut self) -> bool {
        if self.is_loading() || self.send.is_some() {
            return false;
        }
        self.send = Some(TransferWorkflow::new(
            Arc::clone(&self.transfers),
            GasEstimator::from_config(&self.config),
            self.config.submission_timeout,
            self.active_network().native_token(),
        ));
        true
    }

    /// Close the form. Results still in flight for it are dropped.
    pub fn close_send(&mut self) {
        if let Some(mut workflow) = self.send.take() {
            workflow.close();
        }
    }

    pub fn send(&self) -> Option<&TransferWorkflow> {
        self.send.as_ref()
    }

    pub fn send_mut(&mut self) -> Option<&mut TransferWorkflow> {
        self.send.as_mut()
    }

    pub fn send_title(&self) -> Option<String> {
        let label = self.active_network().label();
        self.send.as_ref().map(|w| w.title(label))
    }

    /// Fill the amount from the displayed balance of the selected asset
    pub fn use_maximum(&mut self) -> Option<String> {
        let assets = self.portfolio.assets();
        self.send.as_mut()?.use_maximum(assets)
    }

    /// Submit the open form. `Ok(false)` when there is nothing to submit
    /// or the dashboard is locked.
    pub fn submit_send(&mut self) -> Result<bool, WalletError> {
        if self.is_loading() {
            return Ok(false);
        }
        let Some(workflow) = self.send.as_mut() else {
            return Ok(false);
        };
        let before = workflow.status().clone();
        let result = workflow.submit();
        self.note_transfer_transition(&before);
        result
    }

    /// Failed form back to editing, inputs kept
    pub fn retry_send(&mut self) -> bool {
        self.send.as_mut().map(|w| w.retry()).unwrap_or(false)
    }

    fn note_transfer_transition(&mut self, before: &TransferStatus) {
        let Some(workflow) = self.send.as_ref() else {
            return;
        };
        let status = workflow.status().clone();
        if &status == before {
            return;
        }
        let request = workflow.request().clone();
        let details = format!(
            "asset={}\namount={}\nrecipient={}",
            request.asset_symbol,
            request.amount.trim(),
            request.recipient.trim()
        );
        match status {
            TransferStatus::Success { hash } => {
                let hash = hash.unwrap_or_default();
                self.notifications.success(format!(
                    "Sent {} {} ({})",
                    request.amount.trim(),
                    request.asset_symbol,
                    shorten_address(&hash)
                ));
                self.log_operation("transfer", format!("{}\nstatus=success\nhash={}", details, hash));
            }
            TransferStatus::Failed { message } => {
                self.notifications
                    .error(format!("Transfer failed: {}", message));
                self.log_operation(
                    "transfer",
                    format!("{}\nstatus=failed\nerror={}", details, message),
                );
            }
            _ => {}
        }
    }

    // ---- notifications / persistence ----

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    pub fn settings(&self) -> &UserSettings {
        &self.settings
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn persist_settings(&self) {
        let Some(path) = self.settings_path.as_deref() else {
            return;
        };
        if let Err(e) = self.settings.save_to(path) {
            warn!("Failed to save settings: {}", e);
        }
    }

    fn log_operation(&self, operation: &str, details: String) {
        let Some(log) = self.operation_log.as_ref() else {
            return;
        };
        match log.append(operation, self.active_network(), &details) {
            Ok(()) => info!("Logged {} to {:?}", operation, log.path()),
            Err(e) => warn!("Failed to write operation log: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulated::SimulatedWallet;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    const RECIPIENT: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";

    fn pinned_config() -> Config {
        Config {
            fixed_gas_jitter: Some(1.0),
            ..Config::default()
        }
    }

    async fn setup() -> (Arc<SimulatedWallet>, Dashboard) {
        let wallet = Arc::new(SimulatedWallet::demo());
        let dashboard = Dashboard::load(
            pinned_config(),
            UserSettings::default(),
            wallet.clone(),
            wallet.clone(),
        )
        .await
        .unwrap();
        (wallet, dashboard)
    }

    async fn settle(dashboard: &mut Dashboard, wait: Duration) {
        tokio::time::sleep(wait).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
            dashboard.tick();
        }
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "scroll-wallet-dashboard-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    // ==================== valuation tests ====================

    #[tokio::test(start_paused = true)]
    async fn test_initial_total_has_no_change() {
        let (_wallet, dashboard) = setup().await;
        let obs = dashboard.observation();
        assert_eq!(obs.total_label(), "$1296.65");
        assert_eq!(obs.change_label(), "$0.00");
        assert_eq!(obs.percent_label(), "0.00%");
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_reports_change_against_baseline() {
        let (wallet, mut dashboard) = setup().await;
        wallet.queue_deposit(NetworkProfile::Testnet, "ETH", "0.5");
        assert!(dashboard.request_refresh());
        settle(&mut dashboard, Duration::from_millis(400)).await;

        let obs = dashboard.observation();
        assert_eq!(obs.total_label(), "$2593.30");
        assert_eq!(obs.change_label(), "+$1296.65");
        assert_eq!(obs.percent_label(), "+100.00%");
        assert_eq!(dashboard.portfolio().baseline(), 2593.3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hidden_balance_masks_total() {
        let (_wallet, mut dashboard) = setup().await;
        assert!(dashboard.toggle_hide_balance());
        assert!(dashboard.is_balance_hidden());
        assert_eq!(dashboard.total_display(), "••••••");
        assert!(!dashboard.toggle_hide_balance());
        assert_eq!(dashboard.total_display(), "$1296.65");
    }

    #[tokio::test(start_paused = true)]
    async fn test_hide_balance_is_persisted() {
        let (_wallet, dashboard) = setup().await;
        let path = temp_dir("settings").join("settings.json");
        let mut dashboard = dashboard.with_settings_path(&path);
        dashboard.toggle_hide_balance();
        assert!(UserSettings::load_from(&path).hide_balance);
    }

    // ==================== refresh tests ====================

    #[tokio::test(start_paused = true)]
    async fn test_failed_manual_refresh_keeps_display_and_notifies() {
        let (wallet, mut dashboard) = setup().await;
        wallet.queue_deposit(NetworkProfile::Testnet, "ETH", "0.5");
        wallet.fail_next_refresh("gateway timeout");
        dashboard.request_refresh();
        settle(&mut dashboard, Duration::from_millis(400)).await;

        assert_eq!(dashboard.total_display(), "$1296.65");
        assert_eq!(dashboard.snapshot().native_balance.as_deref(), Some("0.5"));
        let latest = dashboard.notifications().latest().unwrap();
        assert!(latest.message.contains("gateway timeout"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_polling_follows_activation() {
        let (wallet, mut dashboard) = setup().await;
        dashboard.activate();
        settle(&mut dashboard, Duration::from_secs(30)).await;
        settle(&mut dashboard, Duration::from_secs(1)).await;
        assert_eq!(wallet.refresh_calls(), 1);

        dashboard.deactivate();
        settle(&mut dashboard, Duration::from_secs(90)).await;
        assert_eq!(wallet.refresh_calls(), 1);
    }

    // ==================== network switch tests ====================

    #[tokio::test(start_paused = true)]
    async fn test_switch_locks_controls_until_done() {
        let (wallet, mut dashboard) = setup().await;
        assert!(dashboard.switch_network(NetworkProfile::Mainnet));
        assert!(dashboard.is_loading());
        assert_eq!(dashboard.switching_to(), Some(NetworkProfile::Mainnet));
        assert!(!dashboard.request_refresh());
        assert!(!dashboard.open_send());
        assert!(!dashboard.switch_network(NetworkProfile::Testnet));

        settle(&mut dashboard, Duration::from_secs(1)).await;
        assert!(!dashboard.is_loading());
        assert_eq!(dashboard.active_network(), NetworkProfile::Mainnet);
        assert_eq!(dashboard.settings().selected_network, NetworkProfile::Mainnet);
        assert_eq!(wallet.switch_calls(), 1);
        assert_eq!(dashboard.snapshot().native_balance.as_deref(), Some("1.25"));
        assert!(dashboard.portfolio().baseline() > 3000.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_in_flight_does_not_undo_switch() {
        let (wallet, mut dashboard) = setup().await;
        wallet.queue_deposit(NetworkProfile::Testnet, "ETH", "0.5");
        assert!(dashboard.request_refresh());
        assert!(dashboard.switch_network(NetworkProfile::Mainnet));
        assert!(!dashboard.is_refreshing());

        settle(&mut dashboard, Duration::from_secs(1)).await;
        settle(&mut dashboard, Duration::from_secs(1)).await;
        assert_eq!(dashboard.active_network(), NetworkProfile::Mainnet);
        assert_eq!(dashboard.settings().selected_network, NetworkProfile::Mainnet);
        assert_eq!(dashboard.snapshot().network, NetworkProfile::Mainnet);
        assert_eq!(dashboard.snapshot().native_balance.as_deref(), Some("1.25"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_refresh_waits_for_slow_switch() {
        let (wallet, mut dashboard) = setup().await;
        wallet.set_switch_latency(Duration::from_secs(5));
        dashboard.activate();
        settle(&mut dashboard, Duration::from_secs(28)).await;
        assert!(dashboard.switch_network(NetworkProfile::Mainnet));

        // The 30s tick lands mid-switch
        settle(&mut dashboard, Duration::from_secs(4)).await;
        assert!(dashboard.is_loading());
        assert_eq!(wallet.refresh_calls(), 0);

        settle(&mut dashboard, Duration::from_secs(2)).await;
        assert!(!dashboard.is_loading());
        assert_eq!(wallet.refresh_calls(), 0);

        settle(&mut dashboard, Duration::from_secs(27)).await;
        settle(&mut dashboard, Duration::from_secs(1)).await;
        assert_eq!(wallet.refresh_calls(), 1);
        assert_eq!(dashboard.active_network(), NetworkProfile::Mainnet);
        assert_eq!(dashboard.snapshot().native_balance.as_deref(), Some("1.25"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_switch_leaves_profile_and_balances() {
        let (wallet, mut dashboard) = setup().await;
        wallet.fail_next_switch("user rejected");
        let before_total = dashboard.total_display();
        let before_snapshot = dashboard.snapshot();

        dashboard.switch_network(NetworkProfile::Mainnet);
        settle(&mut dashboard, Duration::from_secs(1)).await;

        assert!(!dashboard.is_loading());
        assert_eq!(dashboard.active_network(), NetworkProfile::Testnet);
        assert_eq!(dashboard.total_display(), before_total);
        assert_eq!(dashboard.snapshot(), before_snapshot);
        assert!(dashboard
            .notifications()
            .latest()
            .unwrap()
            .message
            .contains("Could not switch to Scroll Mainnet"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_explorer_link_uses_active_profile() {
        let (_wallet, mut dashboard) = setup().await;
        let tx = TransactionRecord {
            kind: crate::types::TxKind::Send,
            counterparty_address: RECIPIENT.into(),
            raw_amount: "0.1 ETH".into(),
            icon_key: "eth".into(),
            timestamp_millis: 0,
            tx_hash: Some("0xabc".into()),
        };
        assert_eq!(
            dashboard.explorer_link(&tx).as_deref(),
            Some("https://sepolia.scrollscan.com/tx/0xabc")
        );
        dashboard.switch_network(NetworkProfile::Mainnet);
        settle(&mut dashboard, Duration::from_secs(1)).await;
        assert_eq!(
            dashboard.explorer_link(&tx).as_deref(),
            Some("https://scrollscan.com/tx/0xabc")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_line_and_hints() {
        let (_wallet, dashboard) = setup().await;
        let line = dashboard.network_status_line();
        assert!(line.starts_with("Scroll Sepolia ("));
        assert!(line.ends_with("ms)"));
        assert!(dashboard.receive_hint().contains("Scroll Sepolia"));
        assert!(dashboard.receive_hint().ends_with("no real value."));
        assert_eq!(dashboard.short_address().as_deref(), Some("0x5aAeb6....Ef1BeAed"));
        assert_eq!(
            dashboard.address_link().as_deref(),
            Some("https://sepolia.scrollscan.com/address/0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed")
        );
    }

    // ==================== send form tests ====================

    #[tokio::test(start_paused = true)]
    async fn test_close_and_reopen_resets_form() {
        let (_wallet, mut dashboard) = setup().await;
        assert!(dashboard.open_send());
        let first = dashboard.send().unwrap().instance();
        {
            let form = dashboard.send_mut().unwrap();
            form.set_recipient(RECIPIENT);
            form.set_amount("0.1");
        }
        settle(&mut dashboard, Duration::from_millis(600)).await;
        assert!(dashboard.send().unwrap().gas_estimate().is_some());

        dashboard.close_send();
        assert!(dashboard.send().is_none());
        assert!(dashboard.open_send());
        let form = dashboard.send().unwrap();
        assert_ne!(form.instance(), first);
        assert_eq!(form.request().recipient, "");
        assert_eq!(form.request().amount, "");
        assert_eq!(form.request().asset_symbol, "ETH");
        assert_eq!(form.status(), &TransferStatus::Editing);
        assert!(form.gas_estimate().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_success_notifies_and_logs() {
        let (wallet, dashboard) = setup().await;
        let log = OperationLog::at(temp_dir("send").join("operation_log.txt"));
        let mut dashboard = dashboard.with_operation_log(log.clone());
        dashboard.open_send();
        {
            let form = dashboard.send_mut().unwrap();
            form.set_recipient(RECIPIENT);
            form.set_amount("0.1");
        }
        assert_eq!(dashboard.send_title().as_deref(), Some("Send ETH on Scroll Sepolia"));
        assert_ok!(dashboard.submit_send());
        settle(&mut dashboard, Duration::from_secs(2)).await;

        assert!(matches!(
            dashboard.send().unwrap().status(),
            TransferStatus::Success { hash: Some(_) }
        ));
        assert_eq!(wallet.native_sends(), 1);
        let link = dashboard.transfer_explorer_link().unwrap();
        assert!(link.starts_with("https://sepolia.scrollscan.com/tx/0x"));
        assert!(dashboard
            .notifications()
            .latest()
            .unwrap()
            .message
            .starts_with("Sent 0.1 ETH"));
        let content = log.read().unwrap();
        assert!(content.contains("operation=transfer"));
        assert!(content.contains("status=success"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsupported_asset_is_reported() {
        let (wallet, mut dashboard) = setup().await;
        dashboard.open_send();
        {
            let form = dashboard.send_mut().unwrap();
            form.select_asset("DOGE");
            form.set_recipient(RECIPIENT);
            form.set_amount("5");
        }
        let err = assert_err!(dashboard.submit_send());
        assert!(matches!(err, WalletError::UnsupportedAsset(_)));
        assert!(matches!(
            dashboard.send().unwrap().status(),
            TransferStatus::Failed { .. }
        ));
        assert_eq!(wallet.send_calls(), 0);
        assert!(dashboard
            .notifications()
            .latest()
            .unwrap()
            .message
            .starts_with("Transfer failed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_use_maximum_from_displayed_balance() {
        let (_wallet, mut dashboard) = setup().await;
        dashboard.open_send();
        {
            let form = dashboard.send_mut().unwrap();
            form.set_recipient(RECIPIENT);
            form.set_amount("0.1");
        }
        settle(&mut dashboard, Duration::from_millis(600)).await;
        assert_eq!(dashboard.use_maximum().as_deref(), Some("0.499800"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_failure_then_retry_keeps_inputs() {
        let (wallet, mut dashboard) = setup().await;
        wallet.fail_next_send("nonce too low");
        dashboard.open_send();
        {
            let form = dashboard.send_mut().unwrap();
            form.set_recipient(RECIPIENT);
            form.set_amount("0.1");
        }
        assert_ok!(dashboard.submit_send());
        settle(&mut dashboard, Duration::from_secs(2)).await;
        assert_eq!(
            dashboard.send().unwrap().status(),
            &TransferStatus::Failed {
                message: "nonce too low".into()
            }
        );

        assert!(dashboard.retry_send());
        let form = dashboard.send().unwrap();
        assert_eq!(form.status(), &TransferStatus::Editing);
        assert_eq!(form.request().amount, "0.1");
        assert_eq!(form.request().recipient, RECIPIENT);
    }
}
