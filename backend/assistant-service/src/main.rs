use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use assistant_service::completion::{CompletionClient, OpenAiClient};
use assistant_service::{handlers, Config};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    if config.openai.api_key.is_empty() {
        warn!("OPENAI_API_KEY is not set; completion requests will be rejected upstream");
    }

    let client: Arc<dyn CompletionClient> = Arc::new(
        OpenAiClient::new(config.openai.clone()).context("Failed to build completion client")?,
    );
    let client = web::Data::new(client);

    info!(
        model = %config.openai.model,
        "Starting assistant-service on {}:{}",
        config.host,
        config.port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(client.clone())
            .wrap(handlers::cors())
            .wrap(TracingLogger::default())
            .configure(handlers::configure)
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?
    .run()
    .await
    .context("HTTP server error")?;

    Ok(())
}
