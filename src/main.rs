//! # restaurant-sim
//!
//! Runs one shift of the simulation and prints the shift history.
//!
//! ```text
//! restaurant-sim --waiters 3 --cooks 2 --duration-secs 60 \
//!     --pause-at-secs 20 --pause-for-secs 5 --manual-order "Guest:dessert"
//! ```

use clap::Parser;
use restaurant_sim::config::SimConfig;
use restaurant_sim::history::InMemoryHistory;
use restaurant_sim::lifecycle::tracing::setup_tracing;
use restaurant_sim::lifecycle::Restaurant;
use restaurant_sim::model::DishCategory;
use restaurant_sim::observer::TracingObserver;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Instrument};

#[derive(Parser)]
#[command(name = "restaurant-sim", about = "Restaurant order-fulfillment simulation")]
struct Cli {
    /// TOML file with simulation settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of waiters (overrides the config file).
    #[arg(long)]
    waiters: Option<usize>,

    /// Number of cooks (overrides the config file).
    #[arg(long)]
    cooks: Option<usize>,

    /// Length of the shift in seconds.
    #[arg(long, default_value = "30")]
    duration_secs: u64,

    /// Pause the shift this many seconds in.
    #[arg(long)]
    pause_at_secs: Option<u64>,

    /// How long the pause lasts.
    #[arg(long, default_value = "5")]
    pause_for_secs: u64,

    /// Extra order placed at start, as `client:category`. Repeatable.
    #[arg(long = "manual-order", value_parser = parse_manual_order)]
    manual_orders: Vec<(String, DishCategory)>,
}

fn parse_manual_order(raw: &str) -> Result<(String, DishCategory), String> {
    let (client, category) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected client:category, got {}", raw))?;
    Ok((client.trim().to_string(), category.parse()?))
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SimConfig::from_file(path).map_err(|e| e.to_string())?,
        None => SimConfig::default(),
    };
    let waiters = cli.waiters.unwrap_or(config.staff.waiters);
    let cooks = cli.cooks.unwrap_or(config.staff.cooks);

    let history = Arc::new(InMemoryHistory::new());
    let restaurant = Restaurant::new(config, history, Arc::new(TracingObserver))
        .map_err(|e| e.to_string())?;

    restaurant
        .start(waiters, cooks)
        .await
        .map_err(|e| e.to_string())?;

    let span = tracing::info_span!("manual_orders");
    async {
        for (client, category) in &cli.manual_orders {
            match restaurant.submit_order(client, "", *category).await {
                Ok(id) => info!(order = %id, client = %client, "Manual order placed"),
                Err(e) => warn!(client = %client, error = %e, "Manual order refused"),
            }
        }
    }
    .instrument(span)
    .await;

    let duration = Duration::from_secs(cli.duration_secs);
    match cli.pause_at_secs {
        Some(at) if at < cli.duration_secs => {
            let pause_at = Duration::from_secs(at);
            tokio::time::sleep(pause_at).await;
            restaurant.pause().await.map_err(|e| e.to_string())?;
            tokio::time::sleep(Duration::from_secs(cli.pause_for_secs)).await;
            restaurant.resume().await.map_err(|e| e.to_string())?;
            tokio::time::sleep(duration - pause_at).await;
        }
        _ => tokio::time::sleep(duration).await,
    }

    if let Ok(stats) = restaurant.stats().await {
        info!(
            total = stats.total_orders,
            delivered = stats.delivered,
            kitchen = stats.kitchen_len,
            mode = %stats.load_mode,
            "Closing time"
        );
    }

    restaurant.stop().await.map_err(|e| e.to_string())?;

    for record in restaurant.history() {
        println!("{}", record);
    }
    Ok(())
}
