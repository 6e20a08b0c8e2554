use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use std::time::Instant;

mod auth;
mod config;
mod controllers;
mod db;
mod mcp;
mod models;
mod tools;

#[cfg(test)]
mod test_support;

use auth::TokenVerifier;
use config::Config;
use db::Database;
use tools::ToolRegistry;

pub struct AppState {
    pub db: Arc<Database>,
    pub config: Config,
    pub verifier: Arc<TokenVerifier>,
    pub tool_registry: Arc<ToolRegistry>,
    pub started_at: Instant,
}

/// Any origin may call us with credentials; browsers also need to read the
/// `WWW-Authenticate` challenge on a 401.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .expose_headers(vec![header::WWW_AUTHENTICATE])
        .max_age(3600)
}

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(controllers::health::config_routes)
        .configure(controllers::well_known::config)
        .configure(mcp::config);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("Opening database at {}", config.database_url);
    let db = Database::new(&config.database_url, config.db_pool_size)
        .map(Arc::new)
        .map_err(|e| std::io::Error::other(format!("Failed to open database: {}", e)))?;

    log::info!(
        "Verifying tokens from {} (audience {})",
        config.auth.issuer,
        config.auth.audience
    );
    let verifier = Arc::new(TokenVerifier::new(config.auth.clone(), config.jwks_cache_ttl));

    let tool_registry = Arc::new(tools::create_default_registry());
    log::info!(
        "Registered {} tools",
        tool_registry.list_definitions().len()
    );

    let bind_addr = (config.host.clone(), config.port);
    let state = web::Data::new(AppState {
        db: Arc::clone(&db),
        config,
        verifier,
        tool_registry,
        started_at: Instant::now(),
    });

    log::info!("Starting Kino notes server on {}:{}", bind_addr.0, bind_addr.1);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .wrap(cors())
            .configure(config_routes)
    })
    .bind(bind_addr)?
    .run();

    server.await?;

    let (connections, idle) = db.pool_status();
    log::info!(
        "Server stopped, closing database ({} connections, {} idle)",
        connections,
        idle
    );
    drop(db);

    Ok(())
}
