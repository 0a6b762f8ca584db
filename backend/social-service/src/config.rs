/// Configuration management for Social Service
///
/// Loads configuration from environment variables.
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Hosted auth configuration
    pub auth: AuthConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Feed and query cache settings
    pub feed: FeedConfig,
    /// Engagement action settings
    pub engagement: EngagementConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// HTTP port
    pub http_port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Min connections in pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Hosted auth endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Base URL of the auth REST API (e.g. https://<project>/auth/v1)
    pub url: String,
    /// Public API key sent as the `apikey` header
    pub anon_key: String,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins, `*` for any
    pub allowed_origins: String,
}

/// Feed settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Optional cap on posts returned per feed read; unset reads all posts
    pub page_size: Option<i64>,
    /// Seconds a cached query result stays fresh
    pub cache_ttl_secs: u64,
    /// Trailing window of the analytics view, in days
    pub analytics_window_days: i64,
}

/// Engagement settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementConfig {
    /// When false, like/bookmark/repost are accepted but not persisted
    pub toggles_enabled: bool,
}

// Default values
fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: None,
            cache_ttl_secs: 30,
            analytics_window_days: 7,
        }
    }
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            toggles_enabled: true,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env_parse("PORT").unwrap_or(8006),
        };

        let database = DatabaseConfig {
            url: std::env::var("DATABASE_URL")
                .context("DATABASE_URL environment variable not set")?,
            max_connections: env_parse("DB_MAX_CONNECTIONS")
                .unwrap_or_else(default_max_connections),
            min_connections: env_parse("DB_MIN_CONNECTIONS")
                .unwrap_or_else(default_min_connections),
        };

        let auth = AuthConfig {
            url: std::env::var("AUTH_URL")
                .context("AUTH_URL environment variable not set")?
                .trim_end_matches('/')
                .to_string(),
            anon_key: std::env::var("AUTH_ANON_KEY").unwrap_or_default(),
        };

        let cors = CorsConfig {
            allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),
        };

        let defaults = FeedConfig::default();
        let feed = FeedConfig {
            page_size: env_parse::<i64>("FEED_PAGE_SIZE")
                .filter(|n| *n > 0)
                .or(defaults.page_size),
            cache_ttl_secs: env_parse("QUERY_CACHE_TTL_SECS").unwrap_or(defaults.cache_ttl_secs),
            analytics_window_days: env_parse("ANALYTICS_WINDOW_DAYS")
                .unwrap_or(defaults.analytics_window_days),
        };

        let engagement = EngagementConfig {
            toggles_enabled: std::env::var("ENGAGEMENT_TOGGLES_ENABLED")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(true),
        };

        Ok(Config {
            app,
            database,
            auth,
            cors,
            feed,
            engagement,
        })
    }
}
