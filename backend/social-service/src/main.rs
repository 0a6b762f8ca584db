use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use anyhow::{Context, Result};
use s3_utils::S3Client;
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use social_service::handlers;
use social_service::session::{HostedAuthClient, SessionProvider};
use social_service::storage::{ObjectStorage, S3ObjectStorage};
use social_service::{AppState, Config, Repositories};

async fn health(pool: web::Data<PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").execute(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(json!({ "status": "ok" })),
        Err(e) => {
            error!("health check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(json!({ "status": "unavailable" }))
        }
    }
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        env = %config.app.env,
        "Starting social-service on {}:{}",
        config.app.host,
        config.app.http_port
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations applied");

    let s3 = S3Client::new()
        .await
        .context("Failed to initialize object storage")?;
    match s3.health_check().await {
        Ok(()) => info!(bucket = %s3.config().bucket, "Object storage reachable"),
        Err(e) => warn!(bucket = %s3.config().bucket, "Object storage check failed: {}", e),
    }
    let storage: Arc<dyn ObjectStorage> = Arc::new(S3ObjectStorage::new(&s3));

    let auth = HostedAuthClient::new(config.auth.url.clone(), config.auth.anon_key.clone())
        .context("Failed to initialize auth client")?;
    let session = web::Data::new(SessionProvider::new(Arc::new(auth)));

    let state = web::Data::new(AppState::new(
        Repositories::postgres(pool.clone()),
        storage,
        &config.feed,
        &config.engagement,
    ));
    let pool_data = web::Data::new(pool);
    let allowed_origins = config.cors.allowed_origins.clone();

    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(state.clone())
            .app_data(session.clone())
            .app_data(pool_data.clone())
            .wrap(cors)
            .wrap(TracingLogger::default())
            .route("/health", web::get().to(health))
            .configure(handlers::configure)
    })
    .bind((config.app.host.as_str(), config.app.http_port))
    .with_context(|| format!("Failed to bind {}:{}", config.app.host, config.app.http_port))?
    .run()
    .await
    .context("HTTP server error")?;

    info!("social-service shut down");
    Ok(())
}
