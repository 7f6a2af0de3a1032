use anyhow::Result;
use scroll_wallet::{
    config::Config,
    dashboard::Dashboard,
    operation_log::OperationLog,
    simulated::SimulatedWallet,
    transfer::TransferStatus,
    user_settings::UserSettings,
};
use std::sync::Arc;
use std::time::Duration;

/// Frame period of the console loop
const FRAME: Duration = Duration::from_millis(50);

/// Tick until `done` holds or `limit` elapses, printing notifications as
/// they arrive.
async fn run_frames(dashboard: &mut Dashboard, limit: Duration, done: impl Fn(&Dashboard) -> bool) {
    let deadline = tokio::time::Instant::now() + limit;
    let mut frames = tokio::time::interval(FRAME);
    while tokio::time::Instant::now() < deadline {
        frames.tick().await;
        if dashboard.tick() {
            for entry in dashboard.notifications_mut().drain() {
                println!("{} {} ({})", entry.marker(), entry.message, entry.time_ago());
            }
        }
        if done(dashboard) {
            break;
        }
    }
}

fn print_header(dashboard: &Dashboard) {
    let obs = dashboard.observation();
    println!("== {} ==", dashboard.network_status_line());
    if let Some(address) = dashboard.short_address() {
        println!("Address: {}", address);
    }
    println!(
        "Total: {}  {} ({})",
        dashboard.total_display(),
        obs.change_label(),
        obs.percent_label()
    );
    for asset in dashboard.portfolio().assets() {
        println!(
            "  {:<5} {:>14}  {}",
            asset.symbol,
            asset.display_amount(),
            asset.fiat_value
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let settings = UserSettings::load();
    let config = Config::from_env();
    let wallet = Arc::new(SimulatedWallet::new(settings.selected_network, config.native_price_usd));
    wallet.load_address(scroll_wallet::simulated::DEMO_ADDRESS);
    wallet.fund(settings.selected_network, "ETH", "0.5");
    wallet.fund(settings.selected_network, "USDC", "100");

    let mut dashboard = Dashboard::load(config, settings, wallet.clone(), wallet.clone())
        .await?
        .with_settings_path(UserSettings::settings_path())
        .with_operation_log(OperationLog::default());
    dashboard.activate();
    print_header(&dashboard);

    wallet.queue_deposit(dashboard.active_network(), "ETH", "0.25");
    dashboard.request_refresh();
    run_frames(&mut dashboard, Duration::from_secs(3), |d| !d.is_refreshing()).await;
    print_header(&dashboard);

    dashboard.open_send();
    if let Some(form) = dashboard.send_mut() {
        form.set_recipient("0x742d35Cc6634C0532925a3b844Bc454e4438f44e");
        form.set_amount("0.1");
    }
    run_frames(&mut dashboard, Duration::from_secs(2), |d| {
        d.send().map(|w| w.gas_estimate().is_some()).unwrap_or(true)
    })
    .await;
    if let (Some(title), Some(form)) = (dashboard.send_title(), dashboard.send()) {
        println!("{}", title);
        println!("  fee:   {}", form.fee_label().unwrap_or_else(|| "-".into()));
        println!("  total: {}", form.total_cost_label().unwrap_or_else(|| "-".into()));
    }
    if let Err(e) = dashboard.submit_send() {
        println!("[!!] {}", e);
    }
    run_frames(&mut dashboard, Duration::from_secs(10), |d| {
        d.send().map(|w| w.status().is_terminal()).unwrap_or(true)
    })
    .await;
    if let Some(TransferStatus::Success { .. }) = dashboard.send().map(|w| w.status()) {
        if let Some(link) = dashboard.transfer_explorer_link() {
            println!("View on explorer: {}", link);
        }
    }
    dashboard.close_send();

    let target = dashboard.active_network().other();
    if dashboard.switch_network(target) {
        println!("Switching to {}...", target.label());
        run_frames(&mut dashboard, Duration::from_secs(5), |d| !d.is_loading()).await;
    }
    print_header(&dashboard);
    println!("{}", dashboard.receive_hint());

    dashboard.deactivate();
    Ok(())
}
