use anyhow::Context;
use arena_clock::SystemClock;
use arena_runner::{ArenaConfig, Collaborators, Orchestrator};
use arena_sim::{
    LogNotifier, MarketFeedConfig, PaperLedger, RuleBasedOracle, SimulatedMarketFeed,
    SimulatedVenue, VenueConfig,
};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => ArenaConfig::from_file(&path)
            .with_context(|| format!("loading config from {}", path))?,
        None => ArenaConfig::default(),
    }
    .with_env_overrides(|key| std::env::var(key).ok())?;

    log::info!("Starting arena...");

    let clock = Arc::new(SystemClock);
    let ledger = PaperLedger::new(config.paper_funding);
    let services = Collaborators {
        wallets: Arc::new(ledger.clone()),
        oracle: Arc::new(RuleBasedOracle::new()),
        venue: Arc::new(SimulatedVenue::new(VenueConfig::default()).settling_into(ledger)),
        market: Some(Arc::new(SimulatedMarketFeed::new(
            MarketFeedConfig::default(),
            clock.clone(),
        ))),
        notifier: Arc::new(LogNotifier::new()),
    };

    let arena = Orchestrator::new(config, services, clock)?;
    let mut events = arena.subscribe();
    arena.start().await?;

    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(line) => println!("{}", line),
                    Err(e) => log::warn!("Unprintable event: {}", e),
                },
                Err(RecvError::Lagged(missed)) => log::warn!("Event printer lagged, {} missed", missed),
                Err(RecvError::Closed) => break,
            }
        }
    });

    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;

    log::info!("Shutting down...");
    arena.stop().await;
    printer.abort();

    for status in arena.statuses() {
        log::info!(
            "[{}] {} | balance {} | trades {} | survived {}",
            status.id,
            if status.is_alive { "alive" } else { "dead" },
            status.balance,
            status.total_trades,
            status.survival_time_formatted
        );
    }
    Ok(())
}
