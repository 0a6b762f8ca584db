use crate::completion::CompletionClient;
use crate::error::{AssistantError, Result};
use actix_cors::Cors;
use actix_web::{error::JsonPayloadError, http::Method, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub response: String,
}

/// POST /search-web
pub async fn search_web(
    client: web::Data<Arc<dyn CompletionClient>>,
    req: web::Json<SearchRequest>,
) -> Result<HttpResponse> {
    let response = client.complete(&req.query).await?;
    Ok(HttpResponse::Ok().json(SearchResponse { response }))
}

/// Bare OPTIONS requests without CORS pre-flight headers
pub async fn preflight() -> HttpResponse {
    HttpResponse::Ok().finish()
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AssistantError::InvalidRequest(err.to_string()).into()
}

/// Open CORS policy; pre-flight requests are answered by the middleware
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec!["authorization", "x-client-info", "apikey", "content-type"])
        .max_age(3600)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .route("/search-web", web::post().to(search_web))
        .route("/search-web", web::method(Method::OPTIONS).to(preflight))
        .route("/health", web::get().to(health));
}
