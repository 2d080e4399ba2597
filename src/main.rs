//! Songs library - a CRUD service for songs with filtered listing and verse lookup

mod api;
mod config;
mod core;
mod db;
mod error;
mod models;
mod plugins;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::core::SongLib;
use crate::db::{run_migrations, DbEngine, SqliteSongStore};
use crate::plugins::HttpSongInfo;

/// Songs library service
#[derive(Parser, Debug)]
#[command(name = "songs-library")]
#[command(version)]
#[command(about = "CRUD service for a songs library")]
struct Args {
    /// Path to a config file (defaults to ./songs.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Host address to bind to, overrides the config
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on, overrides the config
    #[arg(long)]
    port: Option<u16>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let log_level = if args.debug {
        "debug"
    } else {
        config.log_level.as_str()
    };

    // sqlx logs every statement at info; keep it quiet unless asked for
    let filter = tracing_subscriber::EnvFilter::try_new(format!("{},sqlx=warn", log_level))
        .context("Invalid log level")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    info!("Songs library v{} starting...", env!("CARGO_PKG_VERSION"));

    serve(config).await
}

async fn serve(config: AppConfig) -> Result<()> {
    info!("Connecting to the database...");
    let engine = DbEngine::connect(&config.database).await?;

    run_migrations(engine.pool()).await?;
    info!("Migrations completed successfully");

    let info_source =
        HttpSongInfo::new(&config.enrichment).context("Failed to build song info client")?;
    let lib = SongLib::new(
        Arc::new(SqliteSongStore::new(engine.clone())),
        Arc::new(info_source),
    );

    let addr = config.bind_addr();
    info!("Server listening on http://{}", addr);

    use actix_cors::Cors;
    use actix_web::{middleware, web, App, HttpServer};

    let data = web::Data::new(lib);
    let mut server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .app_data(data.clone())
            .configure(api::configure)
    });

    if let Some(workers) = config.server.workers {
        server = server.workers(workers);
    }

    server.bind(&addr)?.run().await?;

    engine.close().await;
    info!("Service stopped");
    Ok(())
}
