use std::sync::Arc;

use anyhow::Result;
use sea_orm::Database;

use crate::cache::build_cache;
use crate::media::MediaStore;
use crate::schemas::AppState;
use crate::services::sms::LogCredentialNotifier;

const DEFAULT_ACCESS_TTL_SECS: i64 = 60 * 60;
const DEFAULT_REFRESH_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Token signing configuration shared by issuance and the auth extractor.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("SOUK_JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("SOUK_JWT_SECRET is not set; falling back to a development-only secret");
            "souk-development-secret".to_string()
        });

        Self {
            jwt_secret,
            access_ttl_secs: DEFAULT_ACCESS_TTL_SECS,
            refresh_ttl_secs: DEFAULT_REFRESH_TTL_SECS,
        }
    }
}

/// Initialize application configuration and state
pub async fn initialize_app_state() -> Result<AppState> {
    // Load configuration
    dotenvy::dotenv().ok();
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://souk.db".to_string());

    initialize_app_state_with_url(&database_url).await
}

/// Initialize application state against a specific database URL
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    tracing::info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    let media_root =
        std::env::var("SOUK_MEDIA_ROOT").unwrap_or_else(|_| "media".to_string());

    Ok(AppState {
        db,
        cache: build_cache(),
        auth: AuthConfig::from_env(),
        media: MediaStore::new(media_root),
        notifier: Arc::new(LogCredentialNotifier),
    })
}

/// Get bind address from environment or use default
pub fn get_bind_address() -> String {
    std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
}
