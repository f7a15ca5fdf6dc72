use std::{net::SocketAddr, sync::Arc};

use crate::{config::Config, state::AppState};

mod backend;
mod batch;
mod config;
mod dispatch;
mod envelope;
mod error;
mod json_api;
mod payment;
mod request;
mod signer;
mod state;
mod translator;
mod transport;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::init().expect("Failed to load config");
    tracing::info!("{config:#?}");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let chain = config.chain;

    let ctx = Arc::new(AppState::init(config).expect("Failed to initialize app state"));

    tracing::info!("Starting server on {addr} for {chain:?}");

    let routes = json_api::routes(ctx);
    if let Err(err) = axum::Server::bind(&addr)
        .serve(routes.into_make_service())
        .await
    {
        tracing::error!("JSON API critical error: {err:?}");
    }
}
