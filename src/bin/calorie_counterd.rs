//! calorie-counterd: calorie counter daemon.
//!
//! Builds the application on the in-memory repository, keeps the intake
//! cache swept, and logs cache statistics until interrupted.

use std::path::PathBuf;

use clap::Parser;
use tokio::time::MissedTickBehavior;
use tracing::info;

use calorie_counter::CalorieCounter;
use calorie_counter::server::Config;

/// Calorie counter daemon.
#[derive(Parser)]
#[command(name = "calorie-counterd")]
#[command(version = calorie_counter::PKG_VERSION)]
#[command(about = "Calorie counter daemon with a TTL intake cache")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter, overriding RUST_LOG and the config file.
    #[arg(long, env = "CALORIE_LOG")]
    log: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load(args.config.as_deref())?;

    let filter = match args.log {
        Some(directive) => tracing_subscriber::EnvFilter::new(directive),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.filter)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cache_config = config.cache_config()?;
    info!(
        version = %calorie_counter::version_string(),
        built = %calorie_counter::version::build_time()
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "unknown".to_string()),
        sweep_interval_secs = cache_config.sweep_interval.as_secs(),
        "calorie-counterd starting"
    );

    let app = CalorieCounter::builder().cache_config(cache_config).build()?;

    match config.stats_interval() {
        Some(period) => {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let stats = app.cache().stats();
                        info!(
                            intakes_by_date = stats.intakes_by_date,
                            intakes_by_user = stats.intakes_by_user,
                            nutrition_by_date = stats.nutrition_by_date,
                            nutrition_by_intake = stats.nutrition_by_intake,
                            cached_users = app.cache().cached_users(),
                            "cache stats"
                        );
                    }
                    signal = tokio::signal::ctrl_c() => {
                        signal?;
                        break;
                    }
                }
            }
        }
        None => tokio::signal::ctrl_c().await?,
    }

    info!("calorie-counterd stopping");
    app.shutdown().await;
    Ok(())
}
