use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use clap::Parser;
use std::io;
use std::sync::Arc;
use tracing::info;

mod auth;
mod cli;
mod commands;
mod config;
mod db;
mod error;
mod handlers;
mod logging;
mod mappers;
mod middleware;
mod models;
mod routes;
mod types;

#[cfg(test)]
mod test_support;

use auth::TokenService;
use cli::{Cli, Commands};
use config::{load_config_from_file, AppConfig};
use db::DocumentStore;

async fn serve(cfg: AppConfig, store: Arc<dyn DocumentStore>) -> anyhow::Result<()> {
    let tokens = TokenService::from_config(&cfg.security)?;

    info!(
        "Server: {}:{} ({})",
        cfg.server.host, cfg.server.port, cfg.server.name
    );
    info!("Store: {} ({})", store.backend(), cfg.store.sled_path);
    info!("Token TTL: {}s", tokens.ttl_seconds());
    info!("Logging: level={}", cfg.logging.level);
    if cfg.cors_origins.is_empty() {
        info!("CORS: no origins configured (cross-origin requests blocked)");
    } else {
        info!("CORS: {}", cfg.cors_origins.join(", "));
    }

    let bind_address = format!("{}:{}", cfg.server.host, cfg.server.port);
    logging::log_server_startup(&cfg.server.host, cfg.server.port);

    let store_data: web::Data<dyn DocumentStore> = web::Data::from(store);
    let tokens_data = web::Data::new(tokens);
    let cfg_data = web::Data::new(cfg.clone());
    let cors_origins = cfg.cors_origins.clone();

    HttpServer::new(move || {
        let origins = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _req| {
                let origin_str = origin.to_str().unwrap_or("");
                config::is_origin_allowed(&origins, origin_str)
            })
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(store_data.clone())
            .app_data(tokens_data.clone())
            .app_data(cfg_data.clone())
            .wrap(middleware::SecurityHeaders)
            .wrap(cors)
            .wrap(Logger::default())
            .configure(routes::configure)
    })
    .bind(&bind_address)
    .with_context(|| format!("failed to bind {}", bind_address))?
    .run()
    .await?;

    Ok(())
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose)?;
    logging::print_build_info();

    let mut cfg = load_config_from_file(&cli.config)?;
    cli.apply_overrides(&mut cfg);

    let store = db::open(&cfg.store)
        .with_context(|| format!("failed to open {} store", cfg.store.backend.as_str()))?;

    let mut out = io::stdout();
    match &cli.command {
        None | Some(Commands::Serve) => serve(cfg, store).await,
        Some(Commands::User { action }) => commands::run_user_command(store.as_ref(), action, &mut out),
        Some(Commands::Token(args)) => {
            let tokens = TokenService::from_config(&cfg.security)?;
            commands::run_token_command(store.as_ref(), &tokens, &args.email, &mut out)
        }
        Some(Commands::Db { action }) => commands::run_db_command(store.as_ref(), action, &mut out),
    }
}
