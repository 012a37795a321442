mod agent;
mod config;
mod config_manager;
mod conversations;
mod error;
mod handlers;
mod logging;
mod page;
mod routes;
mod server;
mod state;
mod tools;
mod ui;

use anyhow::Result;
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use config::Settings;
use server::Server;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load()?;
    logging::init(&settings.logging.name, &settings.logging.level)?;

    // Fails before binding when credentials are missing or tools do not register.
    let server = Server::new(&settings.logging.name, &settings.llm.tag)?;

    let addr = settings.server.socket_addr()?;
    let app_state = AppState::new(server);

    // Build application
    let app = Router::new()
        .merge(routes::create_routes())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
