/// HTTP request extractors for social-service
///
/// The bearer token is resolved against the hosted auth service on every
/// request through the shared `SessionProvider`.
use crate::error::AppError;
use crate::session::{CurrentUser, SessionProvider};
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

/// Bearer token of the request, if any
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

async fn resolve(req: HttpRequest) -> Result<Option<CurrentUser>, AppError> {
    let provider = req
        .app_data::<web::Data<SessionProvider>>()
        .cloned()
        .ok_or_else(|| AppError::Internal("session provider not configured".to_string()))?;

    provider.current_user(bearer_token(&req).as_deref()).await
}

/// Caller identity; rejects the request with 401 when absent
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub CurrentUser);

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            resolve(req)
                .await?
                .map(AuthenticatedUser)
                .ok_or_else(|| AppError::Unauthorized("Please sign in to continue".to_string()))
        })
    }
}

/// Optional caller identity for reads that work anonymously
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentUser>);

impl MaybeUser {
    pub fn id(&self) -> Option<uuid::Uuid> {
        self.0.as_ref().map(|u| u.id)
    }
}

impl FromRequest for MaybeUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { Ok(MaybeUser(resolve(req).await?)) })
    }
}
