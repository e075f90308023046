use std::env;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use config::Config;
use dotenvy::dotenv;
use pushkind_common::db::establish_connection_pool;
use tokio_util::sync::CancellationToken;

use pushkind_catalog::models::config::ServerConfig;
use pushkind_catalog::repository::DieselRepository;
use pushkind_catalog::routes::{AppState, configure};
use pushkind_catalog::services::clock::SystemClock;
use pushkind_catalog::services::sync::SyncLocks;
use pushkind_catalog::source::shopify::ShopifyAdapter;

fn load_config() -> Result<ServerConfig, config::ConfigError> {
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    Config::builder()
        .add_source(config::File::with_name("config/default"))
        .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .try_deserialize()
}

fn cors(origins: &[String]) -> Cors {
    origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let server_config = match load_config() {
        Ok(server_config) => server_config,
        Err(e) => {
            log::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let adapter_config = match server_config.shopify.clone().validated() {
        Ok(adapter_config) => Arc::new(adapter_config),
        Err(e) => {
            log::error!("Invalid shopify adapter configuration: {e}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let cancel = CancellationToken::new();
    let source = match ShopifyAdapter::with_reqwest(adapter_config, cancel.clone()) {
        Ok(source) => source,
        Err(e) => {
            log::error!("Failed to build the storefront client: {e}");
            std::process::exit(1);
        }
    };

    let state = web::Data::new(AppState {
        repo: DieselRepository::new(pool),
        source,
        locks: SyncLocks::new(),
        clock: SystemClock,
    });

    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!(
        "Starting catalog service on {}:{}",
        bind_address.0,
        bind_address.1
    );

    let shutdown = cancel.clone();
    actix_web::rt::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Shutdown requested, interrupting running syncs");
            shutdown.cancel();
        }
    });

    let cors_origins = server_config.cors_origins.clone();
    let result = HttpServer::new(move || {
        App::new()
            .wrap(cors(&cors_origins))
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(bind_address)?
    .run()
    .await;

    cancel.cancel();
    result
}
