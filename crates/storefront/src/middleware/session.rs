//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. The session
//! only carries the cart; authentication is bearer-token based and never
//! touches the session. The cookie is signed with a key derived from the
//! configured session secret, so a tampered session id is rejected before
//! the store is consulted.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer, cookie::Key};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "craftloom_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with `PostgreSQL` store and a signed cookie.
///
/// # Arguments
///
/// * `pool` - `PostgreSQL` connection pool
/// * `config` - Storefront configuration (signing secret, cookie security flag)
///
/// # Panics
///
/// `Key::derive_from` panics on fewer than 32 bytes of secret; config
/// loading enforces the minimum length, so a `StorefrontConfig` built
/// through `from_env` never trips this.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore, SignedCookie> {
    // The sessions table must be created via migration
    let store = PostgresStore::new(pool.clone());

    let signing_key = Key::derive_from(config.session_secret.expose_secret().as_bytes());

    // Determine if we're in production (HTTPS)
    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(signing_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IdentityConfig, RateLimitConfig};
    use craftloom_core::Price;
    use secrecy::SecretString;

    fn config(session_secret: &str) -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/craftloom_test"),
            host: "127.0.0.1".parse().expect("ip"),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from(session_secret),
            identity: IdentityConfig {
                base_url: "https://id.craftloom.test".to_string(),
                api_key: SecretString::from("api_key"),
            },
            shipping_flat_fee: Price::from_rupees(100),
            sentry_dsn: None,
            rate_limit: RateLimitConfig::default(),
        }
    }

    #[tokio::test]
    async fn test_layer_builds_with_minimum_length_secret() {
        // Key derivation must accept exactly the configured minimum.
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/craftloom_test")
            .expect("lazy pool");
        let secret = "k".repeat(32);
        let _ = create_session_layer(&pool, &config(&secret));
    }
}
