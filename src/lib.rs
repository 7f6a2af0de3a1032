pub mod config;
pub mod dashboard;
pub mod error;
pub mod gas;
pub mod jobs;
pub mod network_switch;
pub mod notifications;
pub mod operation_log;
pub mod poller;
pub mod provider;
pub mod simulated;
pub mod store;
pub mod transfer;
pub mod types;
pub mod user_settings;
pub mod utils;
pub mod valuation;
