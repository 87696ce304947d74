use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pokedex::api::{self, Services};
use pokedex::catalog::http::HttpCatalog;
use pokedex::catalog::CatalogClient;
use pokedex::config::Config;
use pokedex::items::ItemStore;
use pokedex::pager::Pager;
use pokedex_core::LoadOutcome;

/// Headless catalog browser and item list service
#[derive(Parser, Debug)]
#[command(name = "pokedex")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Bind address
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// Port number
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Base URL of the remote catalog API
    #[arg(long, value_name = "URL")]
    api_base: Option<String>,

    /// Entries per catalog page
    #[arg(long, value_name = "N")]
    page_size: Option<u32>,

    /// Do not load the first catalog page at startup
    #[arg(long)]
    no_preload: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,hyper=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = Config::load(
        args.config.as_ref(),
        args.bind.as_deref(),
        args.port,
        args.api_base.as_deref(),
        args.page_size,
    )?;

    info!(
        "Configuration loaded: bind={}:{} api={} page_size={}",
        config.bind, config.port, config.catalog.api_base, config.catalog.page_size
    );

    let source = Arc::new(HttpCatalog::new(
        config.catalog.api_base.clone(),
        config.catalog.timeout(),
    )?);
    let client = CatalogClient::new(source, config.catalog.sprite_base.clone());
    let pager = Arc::new(Pager::new(
        client,
        config.catalog.toggles,
        config.catalog.page_size,
    ));

    let items = if config.items.seed {
        ItemStore::seeded()
    } else {
        ItemStore::new()
    };

    if !args.no_preload {
        let pager = Arc::clone(&pager);
        tokio::spawn(async move {
            if pager.refresh().await == LoadOutcome::Failed {
                warn!("Initial catalog load failed; retry with POST /api/v1/catalog/refresh");
            }
        });
    }

    let services = Services {
        pager,
        items: Arc::new(items),
    };

    api::run(config, services).await
}
