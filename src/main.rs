use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use storefront_watcher::{
    config::{LoggingConfig, MetricsConfig},
    core::price::format_cents,
    storage,
    web::{create_router, AppState},
    AddItemRequest, AppConfig, ItemManager, RefreshScheduler,
};

#[derive(Parser)]
#[command(name = "storefront-watcher")]
#[command(about = "Tracks storefront product prices and emails on new lows")]
#[command(version)]
struct Cli {
    /// Directory holding default/<RUN_MODE>/local config files
    #[arg(long, default_value = "config")]
    config_dir: String,

    /// Keep items in memory instead of the configured database
    #[arg(long)]
    memory: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API (and the scheduler, if enabled)
    Serve,
    /// Run one refresh cycle and print the results
    Refresh,
    /// Start tracking a product URL
    Add {
        url: String,
    },
    /// List tracked items
    List,
    /// Stop tracking an item
    Remove {
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(&cli.config_dir).context("Failed to load configuration")?;
    if cli.memory {
        config.database.url = "memory://".to_string();
    }

    let _log_guard = init_tracing(&config.logging)?;
    info!("Starting Storefront Watcher v{}", env!("CARGO_PKG_VERSION"));

    let store = storage::open(&config.database).await?;
    let items = Arc::new(ItemManager::from_config(&config, store)?);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config, items).await?,
        Commands::Refresh => {
            let summary = items.run_refresh_cycle().await?;
            for outcome in &summary.results {
                match (&outcome.new_price, &outcome.error) {
                    (Some(price), _) => println!("{}  ok      {}", outcome.item_id, format_cents(*price)),
                    (None, Some(error)) => println!("{}  failed  {}", outcome.item_id, error),
                    (None, None) => println!("{}  failed", outcome.item_id),
                }
            }
            println!(
                "{} drop(s) detected, {} notification(s) sent",
                summary.drops_detected, summary.notifications_sent
            );
        }
        Commands::Add { url } => {
            let item = items.add_item(AddItemRequest { url }).await?;
            println!(
                "{}  {}  {}",
                item.id,
                item.display_title(),
                item.current_price.map(format_cents).unwrap_or_default()
            );
        }
        Commands::List => {
            for item in items.list_items().await? {
                println!(
                    "{}  {:<40}  {:>10}  (was {})",
                    item.id,
                    item.display_title(),
                    item.current_price.map(format_cents).unwrap_or_default(),
                    item.original_price.map(format_cents).unwrap_or_default()
                );
            }
        }
        Commands::Remove { id } => {
            items.delete_item(&id).await?;
            println!("Removed {}", id);
        }
    }

    Ok(())
}

async fn serve(config: AppConfig, items: Arc<ItemManager>) -> Result<()> {
    init_metrics(&config.metrics)?;

    let mut scheduler = if config.scheduler.enabled {
        let mut scheduler = RefreshScheduler::new(items.clone(), config.scheduler.clone()).await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        None
    };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    if config.security.cron_secret.is_none() {
        tracing::warn!("No cron secret configured; GET /api/refresh will reject every call");
    }

    let app = create_router(AppState::new(items, config));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down...");
        })
        .await?;

    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.shutdown().await?;
    }
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("Invalid log level")?;

    let (file_layer, guard) = match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "storefront-watcher.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    Ok(guard)
}

fn init_metrics(metrics: &MetricsConfig) -> Result<()> {
    if !metrics.enabled {
        return Ok(());
    }
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], metrics.port))
        .install()
        .context("Failed to start metrics exporter")?;
    info!("Prometheus metrics on port {}", metrics.port);
    Ok(())
}
