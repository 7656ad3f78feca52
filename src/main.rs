mod config;
mod error;
mod gateway;
mod model;
mod session;
mod web;

use std::sync::Arc;

use actix_web::{web::Data, App, HttpServer};
use anyhow::Context;
use dotenv::dotenv;
use log::{error, info};

use config::Settings;
use gateway::GatewayHandler;
use model::AzureOpenAiClient;
use session::Session;
use web::routes;

// App state structure
pub struct AppState {
    pub gateway: GatewayHandler,
}

fn build_gateway(settings: &Settings) -> anyhow::Result<GatewayHandler> {
    let client = AzureOpenAiClient::new(
        &settings.endpoint,
        settings.credential.clone(),
        settings.api_version.clone(),
    );
    let session = Session::new(settings.session_config(), Arc::new(client))
        .context("failed to create chat session")?;
    Ok(GatewayHandler::new(session))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting Foundry agent gateway v{}", env!("CARGO_PKG_VERSION"));

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    info!("Endpoint: {}", settings.endpoint);
    info!("Model: {}", settings.deployment_name);

    let gateway = match build_gateway(&settings) {
        Ok(gateway) => gateway,
        Err(e) => {
            error!("Failed to initialize agent: {:#}", e);
            std::process::exit(1);
        }
    };
    info!("Agent initialized successfully");

    let app_state = Data::new(AppState { gateway });

    info!("Listening on {}:{}", settings.host, settings.port);
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(routes::configure)
    })
    .bind((settings.host.as_str(), settings.port))?
    .run()
    .await
}
