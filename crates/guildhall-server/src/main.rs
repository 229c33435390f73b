// ============================================================================
// guildhall-server - HTTP backend for the Guildhall browser game
// ============================================================================
// Serves /auth, /shop, /shop/inventory and /health as JSON. Settings come from
// GUILDHALL_* environment variables (optionally via .env); flags override.
// ============================================================================

use anyhow::Result;
use clap::Parser;
use guildhall_core::{ApiServer, ServerConfig, ShopApi, Store};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "guildhall-server", version, about = "Guildhall auth and shop backend")]
struct Args {
    /// Address to listen on (default: GUILDHALL_BIND or 127.0.0.1:8080)
    #[arg(long)]
    bind: Option<String>,

    /// Path to the database file (default: ~/.guildhall/guildhall.redb)
    #[arg(long)]
    db_path: Option<String>,

    /// Bearer token lifetime in seconds
    #[arg(long)]
    token_ttl: Option<i64>,

    /// Reject purchases that carry no bearer token
    #[arg(long)]
    require_token: bool,

    /// Refuse a second purchase of a non-stackable item
    #[arg(long)]
    dedupe_unique: bool,

    /// Seed the catalog at startup instead of on first listing
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Could not load .env file: {}", e);
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("guildhall_server=debug".parse()?)
                .add_directive("guildhall_core=debug".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = apply_args(ServerConfig::default(), &args);
    if config.token_ttl_secs <= 0 {
        anyhow::bail!("Token lifetime must be positive, got {}", config.token_ttl_secs);
    }

    let store = Arc::new(Store::open(config.db_path.as_deref())?);
    if args.seed {
        store.seed_catalog()?;
    }

    let api = Arc::new(ShopApi::new(store, &config));
    let pruned = api.auth().prune_expired_tokens()?;
    if pruned > 0 {
        info!("Removed {} expired tokens at startup", pruned);
    }

    let server = ApiServer::bind(&config.bind, api)?;
    let shutdown = server.shutdown_handle();
    let mut serving = tokio::spawn(server.run());

    info!(
        "Guildhall server started (require_token={}, dedupe_unique={})",
        config.require_token, config.dedupe_unique_items
    );

    tokio::select! {
        result = &mut serving => {
            result??;
            warn!("HTTP server exited unexpectedly");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown requested");
            shutdown.shutdown();
            serving.await??;
        }
    }

    Ok(())
}

fn apply_args(mut config: ServerConfig, args: &Args) -> ServerConfig {
    if let Some(bind) = &args.bind {
        config.bind = bind.clone();
    }
    if let Some(path) = &args.db_path {
        config.db_path = Some(path.clone());
    }
    if let Some(ttl) = args.token_ttl {
        config.token_ttl_secs = ttl;
    }
    config.require_token |= args.require_token;
    config.dedupe_unique_items |= args.dedupe_unique;
    config
}
