use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use homework_tracker::api::router;
use homework_tracker::canvas::CanvasHttpClient;
use homework_tracker::config::AppConfig;
use homework_tracker::delivery;
use homework_tracker::error::AppError;
use homework_tracker::services::{NotificationService, SyncRunner, SyncScheduler, SyncService};
use homework_tracker::state::AppState;
use homework_tracker::store::Store;

#[derive(Parser)]
#[command(name = "homework-tracker", version, about = "Personal homework deadline tracker")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the local web UI (default)
    Serve,
    /// Sync with Canvas once and exit
    Sync,
    /// Send today's reminders once and exit
    Notify {
        /// Date to check instead of today (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Sync, then send reminders; meant for a daily scheduled run
    Check {
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "homework_tracker=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = AppConfig::new_from_env()?;
    let store = Arc::new(Store::new(&config.data_file));

    let sync = match &config.canvas {
        Some(canvas) => {
            let client = Arc::new(CanvasHttpClient::new(canvas.clone())?);
            Some(Arc::new(SyncRunner::new(SyncService::new(store.clone(), client))))
        }
        None => {
            warn!("CANVAS_URL / CANVAS_TOKEN not set, Canvas sync disabled");
            None
        }
    };

    let channels = delivery::channels_from_config(&config)?;
    let notifications = Arc::new(NotificationService::new(
        store.clone(),
        channels,
        config.notify_completed,
    ));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let state = AppState {
                store,
                sync: sync.clone(),
            };
            let app = router(state);

            let scheduler = SyncScheduler::new(sync, notifications, config.sync_interval_secs);
            tokio::spawn(scheduler.start());

            info!("listening on http://{}", config.listen_addr);
            let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
            axum::serve(listener, app).await?;
        }
        Command::Sync => {
            let runner = sync.ok_or_else(|| {
                AppError::Config("set CANVAS_URL and CANVAS_TOKEN to sync".to_string())
            })?;
            let stats = runner.run_exclusive(Local::now().date_naive()).await?;
            println!(
                "Sync complete: {} added, {} updated, {} removed, {} auto-completed across {} courses.",
                stats.added, stats.updated, stats.removed, stats.auto_completed, stats.courses_seen
            );
        }
        Command::Notify { today } => {
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            let report = notifications.run(today).await?;
            println!(
                "{} reminders announced ({} deliveries, {} failed).",
                report.announced, report.delivered, report.failed
            );
        }
        Command::Check { today } => {
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            SyncScheduler::new(sync, notifications, 0).tick(today).await;
        }
    }

    Ok(())
}
