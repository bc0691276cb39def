//! Voro server entry point.
//!
//! Loads configuration, builds the shared state (token codec, mailer, rate
//! limiter), then starts the Axum HTTP server with graceful shutdown.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use voro_core::mail::{MailTransport, SmtpTransport};
use voro_server::config::ServerConfig;
use voro_server::routes::build_router;
use voro_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal in production.
    let _ = dotenvy::dotenv();

    let config = ServerConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(brand = %config.brand, "Voro starting");

    let state = Arc::new(build_app_state(&config)?);
    let app = build_router(state);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "Voro server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Voro server stopped");
    Ok(())
}

/// Build the shared application state.
///
/// Missing secrets are reported here but do not stop the server; requests
/// that need them fail until the deployment is fixed.
fn build_app_state(config: &ServerConfig) -> anyhow::Result<AppState> {
    if config.token_secret.is_none() {
        warn!("TOKEN_SECRET is not set; inquiries will fail");
    }

    let transport: Option<Arc<dyn MailTransport>> = match &config.smtp {
        Some(settings) => {
            let smtp = SmtpTransport::new(settings).context("failed to configure SMTP transport")?;
            info!(host = %settings.host, port = settings.port, "SMTP transport configured");
            Some(Arc::new(smtp))
        }
        None => {
            warn!("SMTP credentials are not set; mail dispatch will fail");
            None
        }
    };

    if config.mail_from.is_none() {
        warn!("no sender address configured; set MAIL_FROM or GMAIL_USER");
    }
    if config.mail_to.is_none() {
        warn!("no owner address configured; set MAIL_TO or GMAIL_USER");
    }

    Ok(AppState::from_config(config, transport))
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
}
