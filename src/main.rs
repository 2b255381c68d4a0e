mod cli;
mod commands;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use estate_market::api::{ApiClient, ApiError, ReqwestTransport};
use estate_market::config::{normalize_base_url, EstateConfig};
use estate_market::store::{AppStore, FileTokenStore, NoticeLevel};
use estate_market::SessionContext;

use cli::Cli;
use commands::App;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("estate error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = EstateConfig::load_with_dotenv().context("Failed to load configuration")?;
    if let Some(url) = &cli.api_url {
        config.api.base_url = normalize_base_url(url)?;
    }
    init_tracing(&config.log.filter, cli.verbose)?;

    let token_file = match &config.storage.token_file {
        Some(path) => path.clone(),
        None => FileTokenStore::default_path()?,
    };
    debug!(token_file = %token_file.display(), base_url = %config.api.base_url, "Starting estate");

    let transport = ReqwestTransport::new(
        &config.api.base_url,
        config.api.timeout(),
        &config.api.user_agent,
    )?;
    let store = Arc::new(AppStore::new());
    let api = ApiClient::new(
        Arc::new(transport),
        Arc::new(FileTokenStore::new(token_file)),
        store.clone(),
    );
    let app = App {
        session: SessionContext::new(api),
        store,
        json: cli.json,
    };

    let result = commands::dispatch(cli.command, &app).await;

    if let Err(error) = &result {
        if error
            .downcast_ref::<ApiError>()
            .is_some_and(ApiError::is_session_expired)
        {
            info!("Session expired, local credentials were cleared");
            app.session.expire();
        }
    }
    print_notices(&app.store);
    result
}

fn init_tracing(filter: &str, verbose: bool) -> anyhow::Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(filter))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("Failed to initialize tracing: {error}"))?;

    Ok(())
}

fn print_notices(store: &AppStore) {
    for notice in store.take_notices() {
        match notice.level {
            NoticeLevel::Error => eprintln!("✗ {}", notice.message),
            NoticeLevel::Success => eprintln!("✓ {}", notice.message),
            NoticeLevel::Info => eprintln!("• {}", notice.message),
        }
    }
}
