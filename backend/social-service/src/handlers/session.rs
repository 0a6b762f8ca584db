use crate::error::Result;
use crate::middleware::{bearer_token, MaybeUser};
use crate::session::SessionProvider;
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

/// Current user, or `null` when signed out
pub async fn get_session(user: MaybeUser) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({ "user": user.0 })))
}

/// Revoke the session; always answers with the redirect target
pub async fn sign_out(req: HttpRequest, session: web::Data<SessionProvider>) -> HttpResponse {
    let outcome = session.sign_out(bearer_token(&req).as_deref()).await;
    HttpResponse::Ok().json(outcome)
}
