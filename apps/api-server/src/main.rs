//! # LexLeaks API Server
//!
//! The main entry point for the Actix-web HTTP server.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use lexleaks_core::ports::{PasswordService, RateLimiter, TokenService};
use lexleaks_infra::{Argon2PasswordService, InMemoryRateLimiter, JwtTokenService};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod notifications;
mod observability;
mod state;
mod telemetry;

use config::AppConfig;
use observability::RequestIdMiddleware;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting LexLeaks API Server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(&config).await?;

    let token_service: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
    let password_service: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::from_env());
    let auth_limiter: Arc<dyn RateLimiter> =
        Arc::new(InMemoryRateLimiter::new(config.auth_rate_limit.clone()));

    if let Some(admin) = &config.admin {
        if let Err(e) = state.ensure_admin(admin, password_service.as_ref()).await {
            tracing::error!(error = %e, "Admin bootstrap failed");
        }
    }

    if let Err(e) =
        notifications::start_dispatcher(state.pubsub.as_ref(), state.dispatcher.clone()).await
    {
        tracing::error!(error = %e, "Notification dispatcher not started");
    }

    HttpServer::new(move || {
        let auth_limiter = auth_limiter.clone();
        App::new()
            .wrap(TracingLogger::default())
            .wrap(RequestIdMiddleware)
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(token_service.clone()))
            .app_data(web::Data::new(password_service.clone()))
            .configure(move |cfg| handlers::configure_routes(cfg, auth_limiter))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
