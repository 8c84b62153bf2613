//! Fetchproxy - Entry Point
//!
//! Loads the proxy list, picks one proxy and performs a single request through it.

use tokio::time::timeout;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fetchproxy::config::{LogConfig, LogFormat};
use fetchproxy::{Config, FetchError, FetchRequest, HttpClient, ProxyPool, Result};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.log);

    info!("Starting fetchproxy");

    // A missing or empty list is fatal; there is nothing to route through.
    let pool = ProxyPool::load(&config.proxy.file)?;
    info!(
        "Loaded {} proxies from {} ({} selection)",
        pool.len(),
        config.proxy.file.display(),
        pool.strategy_name()
    );

    let credential = pool.pick_random()?;
    info!(proxy = %serde_json::to_string(&credential)?, "Using proxy");

    let auth = HttpClient::build_auth(
        &credential.username,
        &credential.password,
        config.request.auth_encoding,
    );
    let request = FetchRequest::new(
        &config.request.target_url,
        config.request.method,
        config.request.mode,
    )
    .proxy(credential.endpoint.clone())
    .proxy_auth(auth);

    let client = HttpClient::new();
    let outcome = match config.request_timeout() {
        Some(limit) => timeout(limit, client.fetch(request))
            .await
            .unwrap_or_else(|_| {
                warn!("Request timed out after {}s", limit.as_secs());
                Err(FetchError::Timeout(limit))
            }),
        None => client.fetch(request).await,
    };

    // Request failures were already logged by the client.
    match outcome {
        Ok(body) => println!("{}", serde_json::to_string_pretty(&body.into_json())?),
        Err(_) => println!("null"),
    }

    info!(
        "Done ({} sessions opened, {} closed)",
        client.sessions_opened(),
        client.sessions_closed()
    );
    Ok(())
}

fn init_tracing(log: &LogConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("fetchproxy={}", log.level).into());
    let registry = tracing_subscriber::registry().with(filter);

    match log.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}
