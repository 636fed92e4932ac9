//! # Agora API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

#[cfg(feature = "scheduler")]
mod background;
mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;

use config::AppConfig;
use observability::RequestIdMiddleware;
use state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    telemetry::init_telemetry(&config.telemetry);

    tracing::info!(
        host = %config.host,
        port = config.port,
        "Starting Agora API Server"
    );

    let state = AppState::new(&config).await;

    #[cfg(feature = "scheduler")]
    let mut scheduler = start_scheduler(&config, &state).await;

    let app_state = state.clone();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(app_state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await;

    #[cfg(feature = "scheduler")]
    {
        if let Some(scheduler) = scheduler.as_mut() {
            if let Err(e) = scheduler.shutdown().await {
                tracing::warn!(error = %e, "Scheduler did not shut down cleanly");
            }
        }
    }

    server
}

/// Catch up on anything that came due while the server was down, then
/// register the periodic sweep and cache purge. Failures leave the server
/// running without them.
#[cfg(feature = "scheduler")]
async fn start_scheduler(config: &AppConfig, state: &AppState) -> Option<background::Scheduler> {
    if !config.scheduler.enabled {
        tracing::info!("Scheduler disabled; pending posts will not auto-publish");
        return None;
    }

    background::run_publish_sweep(&state.posts).await;

    let scheduler = match background::Scheduler::new(config.scheduler.clone()).await {
        Ok(scheduler) => scheduler,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create scheduler");
            return None;
        }
    };

    if let Err(e) = background::register_publish_sweep(&scheduler, state.posts.clone()).await {
        tracing::error!(error = %e, "Failed to register publish sweep");
        return None;
    }
    if let Err(e) = background::register_cache_purge(&scheduler, state.verification.clone()).await {
        tracing::warn!(error = %e, "Failed to register cache purge; expired codes are dropped on access only");
    }
    if let Err(e) = scheduler.start().await {
        tracing::error!(error = %e, "Failed to start scheduler");
        return None;
    }

    Some(scheduler)
}
