//! In-memory wallet provider.
//!
//! Keeps a balance book per network profile, simulates provider latency and
//! lets callers script failures. The console runner uses it as its backend
//! and the tests use it as their fake.

use crate::config::{default_token_registry, NetworkProfile, NATIVE_DECIMALS};
use crate::provider::{TransferProvider, WalletProvider};
use crate::types::{
    AssetBalance, NetworkStatus, SendOutcome, TokenInfo, TransactionRecord, TxKind, WalletSnapshot,
};
use crate::utils::{format_ether, from_base_units, to_base_units};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use ethers::types::U256;
use rand::Rng;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};

pub const DEMO_ADDRESS: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

/// Balances and history of one network profile
#[derive(Debug, Clone, Default)]
struct Book {
    native_wei: U256,
    /// symbol -> base units
    tokens: BTreeMap<String, U256>,
    transactions: Vec<TransactionRecord>,
    /// Applied on the next refresh
    incoming: Vec<(String, U256)>,
}

#[derive(Debug)]
struct State {
    network: NetworkProfile,
    address: Option<String>,
    books: HashMap<NetworkProfile, Book>,
    /// Balances as last published by a refresh or switch
    published: HashMap<NetworkProfile, Book>,
}

#[derive(Debug, Default)]
struct Script {
    send_outcome: Option<SendOutcome>,
    send_error: Option<String>,
    refresh_error: Option<String>,
    switch_error: Option<String>,
}

#[derive(Debug)]
struct Latency {
    refresh: Duration,
    switch: Duration,
    send: Duration,
}

pub struct SimulatedWallet {
    state: Mutex<State>,
    script: Mutex<Script>,
    latency: Mutex<Latency>,
    /// Token contracts per network profile
    registries: HashMap<NetworkProfile, HashMap<String, TokenInfo>>,
    native_price_usd: f64,
    refresh_calls: AtomicUsize,
    switch_calls: AtomicUsize,
    native_sends: AtomicUsize,
    token_sends: AtomicUsize,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn trim_decimal(s: String) -> String {
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.');
        trimmed.to_string()
    } else {
        s
    }
}

fn random_hash() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    format!("0x{}", hex::encode(bytes))
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl SimulatedWallet {
    /// Empty wallet on `network` with no address loaded
    pub fn new(network: NetworkProfile, native_price_usd: f64) -> Self {
        let books: HashMap<_, _> = NetworkProfile::ALL
            .iter()
            .map(|p| (*p, Book::default()))
            .collect();
        Self {
            state: Mutex::new(State {
                network,
                address: None,
                published: books.clone(),
                books,
            }),
            script: Mutex::new(Script::default()),
            latency: Mutex::new(Latency {
                refresh: Duration::from_millis(300),
                switch: Duration::from_millis(800),
                send: Duration::from_millis(1500),
            }),
            registries: NetworkProfile::ALL
                .iter()
                .map(|p| (*p, default_token_registry(*p)))
                .collect(),
            native_price_usd,
            refresh_calls: AtomicUsize::new(0),
            switch_calls: AtomicUsize::new(0),
            native_sends: AtomicUsize::new(0),
            token_sends: AtomicUsize::new(0),
        }
    }

    /// Funded wallet on Scroll Sepolia
    pub fn demo() -> Self {
        let wallet = Self::new(NetworkProfile::Testnet, 2593.3);
        wallet.load_address(DEMO_ADDRESS);
        wallet.fund(NetworkProfile::Testnet, "ETH", "0.5");
        wallet.fund(NetworkProfile::Testnet, "USDC", "100");
        wallet.fund(NetworkProfile::Mainnet, "ETH", "1.25");
        wallet.fund(NetworkProfile::Mainnet, "USDC", "250.5");
        wallet.fund(NetworkProfile::Mainnet, "SCR", "40");
        wallet.publish_all();
        wallet
    }

    pub fn load_address(&self, address: &str) {
        lock(&self.state).address = Some(address.to_string());
    }

    pub fn unload_address(&self) {
        lock(&self.state).address = None;
    }

    /// Set a balance directly. Visible immediately, without a refresh.
    pub fn fund(&self, network: NetworkProfile, symbol: &str, amount: &str) {
        let decimals = self.decimals(network, symbol);
        let Ok(value) = to_base_units(amount, decimals) else {
            return;
        };
        let mut guard = lock(&self.state);
        let state = &mut *guard;
        for books in [&mut state.books, &mut state.published] {
            if let Some(book) = books.get_mut(&network) {
                if symbol == "ETH" {
                    book.native_wei = value;
                } else {
                    book.tokens.insert(symbol.to_string(), value);
                }
            }
        }
    }

    /// Queue an incoming transfer that shows up on the next refresh.
    pub fn queue_deposit(&self, network: NetworkProfile, symbol: &str, amount: &str) {
        let Ok(value) = to_base_units(amount, self.decimals(network, symbol)) else {
            return;
        };
        if let Some(book) = lock(&self.state).books.get_mut(&network) {
            book.incoming.push((symbol.to_string(), value));
        }
    }

    fn publish_all(&self) {
        let mut state = lock(&self.state);
        state.published = state.books.clone();
    }

    fn registry(&self, network: NetworkProfile) -> Option<&HashMap<String, TokenInfo>> {
        self.registries.get(&network)
    }

    fn decimals(&self, network: NetworkProfile, symbol: &str) -> u8 {
        self.registry(network)
            .and_then(|r| r.get(symbol))
            .map(|t| t.decimals)
            .unwrap_or(NATIVE_DECIMALS)
    }

    // ---- scripting ----

    pub fn script_send_outcome(&self, outcome: SendOutcome) {
        lock(&self.script).send_outcome = Some(outcome);
    }

    pub fn fail_next_send(&self, message: &str) {
        lock(&self.script).send_error = Some(message.to_string());
    }

    pub fn fail_next_refresh(&self, message: &str) {
        lock(&self.script).refresh_error = Some(message.to_string());
    }

    pub fn fail_next_switch(&self, message: &str) {
        lock(&self.script).switch_error = Some(message.to_string());
    }

    pub fn set_refresh_latency(&self, latency: Duration) {
        lock(&self.latency).refresh = latency;
    }

    pub fn set_switch_latency(&self, latency: Duration) {
        lock(&self.latency).switch = latency;
    }

    pub fn set_send_latency(&self, latency: Duration) {
        lock(&self.latency).send = latency;
    }

    // ---- counters ----

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn switch_calls(&self) -> usize {
        self.switch_calls.load(Ordering::SeqCst)
    }

    pub fn native_sends(&self) -> usize {
        self.native_sends.load(Ordering::SeqCst)
    }

    pub fn token_sends(&self) -> usize {
        self.token_sends.load(Ordering::SeqCst)
    }

    pub fn send_calls(&self) -> usize {
        self.native_sends() + self.token_sends()
    }

    pub fn active_network(&self) -> NetworkProfile {
        lock(&self.state).network
    }

    fn build_snapshot(&self, state: &State) -> WalletSnapshot {
        let book = state.published.get(&state.network).cloned().unwrap_or_default();
        let native = trim_decimal(format_ether(book.native_wei));
        let native_value = native.parse::<f64>().unwrap_or(0.0) * self.native_price_usd;

        let mut eth = AssetBalance::placeholder("ETH", "Ethereum", "ethereum");
        eth.raw_amount = native.clone();
        eth.fiat_value = format!("${:.2}", native_value);
        let mut assets = vec![eth];
        for (symbol, value) in &book.tokens {
            let amount = trim_decimal(from_base_units(*value, self.decimals(state.network, symbol)));
            let (name, icon, unit_price) = match symbol.as_str() {
                "USDC" => ("USD Coin", "usdc", 1.0),
                "USDT" => ("Tether USD", "usdt", 1.0),
                "SCR" => ("Scroll Token", "scroll", 0.0),
                _ => (symbol.as_str(), "unknown", 0.0),
            };
            let mut asset = AssetBalance::placeholder(symbol, name, icon);
            asset.fiat_value = format!("${:.2}", amount.parse::<f64>().unwrap_or(0.0) * unit_price);
            asset.raw_amount = amount;
            assets.push(asset);
        }

        WalletSnapshot {
            address: state.address.clone(),
            native_balance: state.address.as_ref().map(|_| native),
            assets,
            transactions: book.transactions.clone(),
            network: state.network,
            network_status: NetworkStatus {
                connected: true,
                latency_ms: rand::thread_rng().gen_range(35..90),
            },
        }
    }

    fn record_send(&self, symbol: &str, recipient: &str, amount: &str, value: U256) -> SendOutcome {
        let mut state = lock(&self.state);
        let network = state.network;
        let Some(book) = state.books.get_mut(&network) else {
            return SendOutcome::failed("network unavailable");
        };
        let balance = if symbol == "ETH" {
            book.native_wei
        } else {
            book.tokens.get(symbol).copied().unwrap_or_default()
        };
        if value > balance {
            return SendOutcome::failed("insufficient funds");
        }
        if symbol == "ETH" {
            book.native_wei = balance - value;
        } else {
            book.tokens.insert(symbol.to_string(), balance - value);
        }
        let hash = random_hash();
        book.transactions.insert(
            0,
            TransactionRecord {
                kind: TxKind::Send,
                counterparty_address: recipient.to_string(),
                raw_amount: format!("{} {}", amount, symbol),
                icon_key: symbol.to_ascii_lowercase(),
                timestamp_millis: now_millis(),
                tx_hash: Some(hash.clone()),
            },
        );
        info!("Simulated {} transfer of {} to {}: {}", symbol, amount, recipient, hash);
        SendOutcome::succeeded(hash)
    }

    /// Scripted failure or outcome for the next send, if any
    fn take_send_script(&self) -> Result<Option<SendOutcome>> {
        let mut script = lock(&self.script);
        if let Some(err) = script.send_error.take() {
            return Err(anyhow!(err));
        }
        Ok(script.send_outcome.take())
    }
}

#[async_trait]
impl WalletProvider for SimulatedWallet {
    async fn snapshot(&self) -> Result<WalletSnapshot> {
        let state = lock(&self.state);
        Ok(self.build_snapshot(&state))
    }

    async fn refresh_balance(&self, address: &str) -> Result<()> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        let latency = lock(&self.latency).refresh;
        tokio::time::sleep(latency).await;

        if let Some(err) = lock(&self.script).refresh_error.take() {
            return Err(anyhow!(err));
        }
        let mut state = lock(&self.state);
        if state.address.as_deref() != Some(address) {
            return Err(anyhow!("address {} is not loaded", address));
        }
        let network = state.network;
        if let Some(book) = state.books.get_mut(&network) {
            for (symbol, value) in std::mem::take(&mut book.incoming) {
                let decimals = self.decimals(network, &symbol);
                if symbol == "ETH" {
                    book.native_wei += value;
                } else {
                    *book.tokens.entry(symbol.clone()).or_default() += value;
                }
                book.transactions.insert(
                    0,
                    TransactionRecord {
                        kind: TxKind::Receive,
                        counterparty_address: "0x0000000000000000000000000000000000000000".into(),
                        raw_amount: format!("{} {}", trim_decimal(from_base_units(value, decimals)), symbol),
                        icon_key: symbol.to_ascii_lowercase(),
                        timestamp_millis: now_millis(),
                        tx_hash: Some(random_hash()),
                    },
                );
            }
        }
        let book = state.books.get(&network).cloned().unwrap_or_default();
        state.published.insert(network, book);
        debug!("Simulated refresh for {} on {}", address, network);
        Ok(())
    }

    async fn switch_network(&self, target: NetworkProfile) -> Result<()> {
        self.switch_calls.fetch_add(1, Ordering::SeqCst);
        let latency = lock(&self.latency).switch;
        tokio::time::sleep(latency).await;

        if let Some(err) = lock(&self.script).switch_error.take() {
            return Err(anyhow!(err));
        }
        let mut state = lock(&self.state);
        state.network = target;
        let book = state.books.get(&target).cloned().unwrap_or_default();
        state.published.insert(target, book);
        info!("Simulated wallet switched to {}", target);
        Ok(())
    }
}

#[async_trait]
impl TransferProvider for SimulatedWallet {
    async fn send_native(&self, recipient: &str, amount: &str) -> Result<SendOutcome> {
        self.native_sends.fetch_add(1, Ordering::SeqCst);
        let latency = lock(&self.latency).send;
        tokio::time::sleep(latency).await;

        if let Some(outcome) = self.take_send_script()? {
            return Ok(outcome);
        }
        let value = to_base_units(amount, NATIVE_DECIMALS)?;
        Ok(self.record_send("ETH", recipient, amount, value))
    }

    async fn send_token(
        &self,
        token_address: &str,
        recipient: &str,
        amount: &str,
        decimals: u8,
    ) -> Result<SendOutcome> {
        self.token_sends.fetch_add(1, Ordering::SeqCst);
        let latency = lock(&self.latency).send;
        tokio::time::sleep(latency).await;

        if let Some(outcome) = self.take_send_script()? {
            return Ok(outcome);
        }
        let network = self.active_network();
        let symbol = self
            .registry(network)
            .into_iter()
            .flatten()
            .find(|(_, t)| format!("{:?}", t.address).eq_ignore_ascii_case(token_address))
            .map(|(s, _)| s.clone())
            .ok_or_else(|| anyhow!("unknown token contract {} on {}", token_address, network))?;
        let value = to_base_units(amount, decimals)?;
        Ok(self.record_send(&symbol, recipient, amount, value))
    }

    /// Contracts of the profile active at the time of the call
    fn token_registry(&self) -> HashMap<String, TokenInfo> {
        self.registry(self.active_network())
            .cloned()
            .unwrap_or_default()
    }
}
