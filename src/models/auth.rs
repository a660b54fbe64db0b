//! Authentication-related models

use super::user::UserResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Register / login request. Missing fields become empty strings and fail validation.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Change password request
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

/// Body returned by register / login / refresh / change-password
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub access_token: String,
    pub user: UserResponse,
}

/// Persisted refresh token row. Only the SHA-256 of the raw token is stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshToken {
    pub id: i64,
    pub user_id: i64,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    /// Usable iff not revoked and not yet expired.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

/// Outcome of a successful rotation: the owner and the single successor token.
#[derive(Debug, Clone)]
pub struct Rotation {
    pub user_id: i64,
    pub raw_token: String,
}
