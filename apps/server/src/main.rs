use actix_web::{middleware, web, App, HttpServer};

use bttn_relay::config;
use bttn_relay::routes;
use bttn_relay::services::HipChatClient;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Load configuration
    let config = config::Config::from_env().map_err(|e| {
        log::error!("Configuration error: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    // Credentials are checked per request so a missing one only disables its channel
    if config.hipchat.api_token.is_none() {
        log::warn!("HIPCHAT_API_TOKEN not set, hipchat presses will be rejected");
    }
    if config.twilio.account_sid.is_none() || config.twilio.auth_token.is_none() {
        log::warn!("Twilio credentials not set, sms presses will be rejected");
    }

    let hipchat = HipChatClient::new(&config.hipchat).map_err(|e| {
        log::error!("HTTP client error: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    log::info!(
        "Starting bttn relay on {}:{} (HipChat API at {})",
        config.host,
        config.port,
        config.hipchat.api_root
    );

    // Clone values for the closure
    let host = config.host.clone();
    let port = config.port;

    let server = HttpServer::new(move || {
        App::new()
            // Share config and the pooled HipChat client with all handlers
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(hipchat.clone()))
            .wrap(middleware::Logger::default())
            .configure(routes::health::configure)
            .configure(routes::bttn::configure)
    })
    .bind((host.as_str(), port))?
    .shutdown_timeout(30)
    .run();

    // Spawn graceful shutdown handler
    let server_handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        log::info!("Shutdown signal received, stopping server...");
        server_handle.stop(true).await;
    });

    server.await
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                log::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
