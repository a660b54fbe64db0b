//! Opaque refresh token primitives and their cookie transport
//!
//! The raw token is 32 random bytes, hex encoded. Only its SHA-256 hex digest
//! is ever persisted.

use crate::{config::AppConfig, error::AppError};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

/// Cookie carrying the raw refresh token
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Cookie path, scoped to the auth endpoints
pub const REFRESH_COOKIE_PATH: &str = "/api/auth";

const RAW_TOKEN_BYTES: usize = 32;

/// Generate a new raw refresh token (64 hex chars)
pub fn generate_raw_token() -> Result<String, AppError> {
    let mut bytes = [0u8; RAW_TOKEN_BYTES];
    OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
        tracing::error!("Entropy source failed: {}", e);
        AppError::internal_error("failed to generate refresh token")
    })?;

    Ok(hex::encode(bytes))
}

/// SHA-256 hex digest of a raw token, the form stored at rest
pub fn hash_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

/// How the refresh token cookie is written
#[derive(Debug, Clone, Copy)]
pub struct RefreshCookiePolicy {
    pub secure: bool,
    pub max_age_days: i64,
}

impl RefreshCookiePolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            secure: config.is_production(),
            max_age_days: config.security.refresh_token_exp_days,
        }
    }

    /// Cookie that hands a freshly issued token to the client
    pub fn build(&self, raw_token: &str) -> Cookie<'static> {
        self.cookie(raw_token.to_string(), time::Duration::days(self.max_age_days))
    }

    /// Expired cookie that makes the client drop its token
    pub fn clear(&self) -> Cookie<'static> {
        self.cookie(String::new(), time::Duration::ZERO)
    }

    fn cookie(&self, value: String, max_age: time::Duration) -> Cookie<'static> {
        Cookie::build((REFRESH_COOKIE, value))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path(REFRESH_COOKIE_PATH)
            .max_age(max_age)
            .build()
    }
}

/// Read the presented refresh token; blank values count as absent
pub fn extract_refresh_token(jar: &CookieJar) -> Option<String> {
    jar.get(REFRESH_COOKIE)
        .map(|c| c.value().trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
