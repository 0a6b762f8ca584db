//! Session provider
//!
//! Resolves the authenticated identity from an access token through the
//! hosted auth API and implements sign-out. The identity is read-only for
//! the rest of the service.
use crate::error::{AppError, Result};
use crate::notify::{Notice, NoticeLevel};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Where the client is sent after sign-out
pub const SIGN_IN_PATH: &str = "/auth";

/// Authenticated user identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Failure reported by the auth API
#[derive(Debug, Clone, thiserror::Error)]
#[error("auth request failed (status {status:?}): {message}")]
pub struct AuthFailure {
    pub status: Option<u16>,
    pub message: String,
}

impl From<AuthFailure> for AppError {
    fn from(err: AuthFailure) -> Self {
        AppError::Auth(err.to_string())
    }
}

/// Contract of the hosted auth service
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Identity for a token, or None when the token is not accepted
    async fn get_user(&self, access_token: &str) -> std::result::Result<Option<CurrentUser>, AuthFailure>;

    /// Revoke the session behind the token
    async fn sign_out(&self, access_token: &str) -> std::result::Result<(), AuthFailure>;
}

/// reqwest client for the hosted auth REST API
#[derive(Clone)]
pub struct HostedAuthClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl HostedAuthClient {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build auth client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        })
    }

    fn transport_failure(err: reqwest::Error) -> AuthFailure {
        AuthFailure {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl AuthService for HostedAuthClient {
    async fn get_user(&self, access_token: &str) -> std::result::Result<Option<CurrentUser>, AuthFailure> {
        let response = self
            .http
            .get(format!("{}/user", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(Self::transport_failure)?;

        match response.status() {
            status if status.is_success() => response
                .json::<CurrentUser>()
                .await
                .map(Some)
                .map_err(Self::transport_failure),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Ok(None),
            status => Err(AuthFailure {
                status: Some(status.as_u16()),
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn sign_out(&self, access_token: &str) -> std::result::Result<(), AuthFailure> {
        let response = self
            .http
            .post(format!("{}/logout", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(Self::transport_failure)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        Err(AuthFailure {
            status: Some(status.as_u16()),
            message: response.text().await.unwrap_or_default(),
        })
    }
}

/// Fixed token table, for tests and local development
#[derive(Default)]
pub struct StaticAuthService {
    tokens: Mutex<HashMap<String, CurrentUser>>,
    sign_out_failure: Mutex<Option<AuthFailure>>,
}

impl StaticAuthService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_token(&self, token: &str, user_id: Uuid) {
        self.tokens
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(token.to_string(), CurrentUser { id: user_id, email: None });
    }

    /// Make the next sign-out calls fail with the given failure
    pub fn fail_sign_out(&self, failure: AuthFailure) {
        *self.sign_out_failure.lock().unwrap_or_else(|p| p.into_inner()) = Some(failure);
    }
}

#[async_trait]
impl AuthService for StaticAuthService {
    async fn get_user(&self, access_token: &str) -> std::result::Result<Option<CurrentUser>, AuthFailure> {
        Ok(self
            .tokens
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(access_token)
            .cloned())
    }

    async fn sign_out(&self, access_token: &str) -> std::result::Result<(), AuthFailure> {
        if let Some(failure) = self
            .sign_out_failure
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
        {
            return Err(failure);
        }
        self.tokens
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .remove(access_token);
        Ok(())
    }
}

/// Result of a sign-out; the local session is always cleared
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignOutOutcome {
    pub redirect_to: String,
    pub notice: Notice,
}

impl SignOutOutcome {
    fn signed_out() -> Self {
        Self {
            redirect_to: SIGN_IN_PATH.to_string(),
            notice: Notice::success("Logged out successfully"),
        }
    }

    fn cleared_with_warning() -> Self {
        Self {
            redirect_to: SIGN_IN_PATH.to_string(),
            notice: Notice::error(
                "There was an issue logging out, but you've been redirected to the login page",
            ),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.notice.level == NoticeLevel::Success
    }
}

#[derive(Clone)]
pub struct SessionProvider {
    auth: Arc<dyn AuthService>,
}

impl SessionProvider {
    pub fn new(auth: Arc<dyn AuthService>) -> Self {
        Self { auth }
    }

    /// Current user for a bearer token; None when absent or rejected
    pub async fn current_user(&self, access_token: Option<&str>) -> Result<Option<CurrentUser>> {
        match access_token {
            Some(token) if !token.is_empty() => Ok(self.auth.get_user(token).await?),
            _ => Ok(None),
        }
    }

    /// Sign out; never fails. A session the auth service no longer knows
    /// about counts as signed out.
    pub async fn sign_out(&self, access_token: Option<&str>) -> SignOutOutcome {
        let Some(token) = access_token else {
            return SignOutOutcome::signed_out();
        };

        match self.auth.sign_out(token).await {
            Ok(()) => {
                info!("Logout successful");
                SignOutOutcome::signed_out()
            }
            Err(failure)
                if failure.message.contains("user_not_found") || failure.status == Some(403) =>
            {
                warn!(error = %failure, "user already logged out or not found, proceeding with redirect");
                SignOutOutcome::signed_out()
            }
            Err(failure) => {
                error!(error = %failure, "logout failed, clearing session anyway");
                SignOutOutcome::cleared_with_warning()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> (Arc<StaticAuthService>, SessionProvider) {
        let auth = Arc::new(StaticAuthService::new());
        let provider = SessionProvider::new(auth.clone());
        (auth, provider)
    }

    #[tokio::test]
    async fn test_current_user_resolves_known_token() {
        let (auth, provider) = provider();
        let id = Uuid::new_v4();
        auth.insert_token("t-1", id);

        let user = provider.current_user(Some("t-1")).await.unwrap();
        assert_eq!(user.map(|u| u.id), Some(id));
        assert_eq!(provider.current_user(Some("other")).await.unwrap(), None);
        assert_eq!(provider.current_user(None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sign_out_treats_user_not_found_as_success() {
        let (auth, provider) = provider();
        auth.fail_sign_out(AuthFailure {
            status: Some(400),
            message: r#"{"error_code":"user_not_found"}"#.to_string(),
        });

        let outcome = provider.sign_out(Some("t-1")).await;
        assert!(outcome.is_clean());
        assert_eq!(outcome.redirect_to, "/auth");
    }

    #[tokio::test]
    async fn test_sign_out_treats_forbidden_as_success() {
        let (auth, provider) = provider();
        auth.fail_sign_out(AuthFailure {
            status: Some(403),
            message: "session expired".to_string(),
        });

        assert!(provider.sign_out(Some("t-1")).await.is_clean());
    }

    #[tokio::test]
    async fn test_sign_out_other_failures_still_redirect() {
        let (auth, provider) = provider();
        auth.fail_sign_out(AuthFailure {
            status: None,
            message: "connection refused".to_string(),
        });

        let outcome = provider.sign_out(Some("t-1")).await;
        assert!(!outcome.is_clean());
        assert_eq!(outcome.redirect_to, SIGN_IN_PATH);
    }

    #[tokio::test]
    async fn test_sign_out_revokes_token() {
        let (auth, provider) = provider();
        auth.insert_token("t-1", Uuid::new_v4());

        assert!(provider.sign_out(Some("t-1")).await.is_clean());
        assert_eq!(provider.current_user(Some("t-1")).await.unwrap(), None);
    }
}
