mod catalog;
mod config;
mod db;
mod entities;
mod error;
mod models;
mod pipeline;
mod reconcile;
mod repository;
mod routes;
mod scheduler;
mod session;
mod shows;
mod store;

use std::{sync::Arc, time::Duration};

use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{catalog::CatalogClient, config::Config, repository::ShowRepository};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub repository: ShowRepository,
    pub catalog: Arc<CatalogClient>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,showsync=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let http = reqwest::Client::builder()
        .user_agent("showsync/0.1")
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()?;

    let catalog = Arc::new(CatalogClient::new(http, config.catalog_base_url.clone())?);

    let db = db::connect_and_migrate(&config.database_url).await?;
    let repository = ShowRepository::new(db);

    if let Some(every) = config.sync_interval {
        scheduler::spawn(catalog.clone(), Arc::new(repository.clone()), every);
    }

    let state = Arc::new(AppState { config: config.clone(), repository, catalog });

    let app = routes::router(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
