//! Access token issuance and verification (HS256 JWT)
//!
//! Access tokens are stateless and never stored. The header is pinned to
//! HS256 on verification; tokens announcing any other algorithm are rejected
//! before the signature is looked at.

use crate::{config::AppConfig, error::AppError, models::user::User};
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: i64,

    /// Username
    pub username: String,

    /// Role at issue time ("user" | "admin")
    pub role: String,

    /// Issued at (epoch seconds)
    #[serde(default)]
    pub iat: i64,

    /// Expiration (epoch seconds)
    pub exp: i64,
}

/// Signs and verifies access tokens with the server secret
pub struct AccessTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl AccessTokenCodec {
    /// Create codec from config
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(
            config.security.jwt_secret.expose_secret(),
            config.security.access_token_exp_minutes,
        )
    }

    pub fn new(secret: &str, ttl_minutes: i64) -> Result<Self, AppError> {
        // Ensure secret is at least 32 bytes for HS256
        if secret.len() < 32 {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // exp is enforced below with an inclusive boundary and no leeway
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs: ttl_minutes * 60,
        })
    }

    /// Issue an access token for a user, valid for the configured lifetime
    pub fn issue_for(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now().timestamp();

        self.issue(&Claims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role.clone(),
            iat: now,
            exp: now + self.ttl_secs,
        })
    }

    /// Sign the given claims as-is
    pub fn issue(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode access token: {:?}", e);
            AppError::Internal(format!("failed to encode access token: {}", e))
        })
    }

    /// Verify signature, payload shape and expiry
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(AppError::invalid_token("invalid token format"));
        }

        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {:?}", e);
                AppError::invalid_token(reject_reason(e.kind()))
            })?
            .claims;

        if claims.exp <= Utc::now().timestamp() {
            return Err(AppError::invalid_token("token expired"));
        }

        Ok(claims)
    }
}

fn reject_reason(kind: &ErrorKind) -> &'static str {
    match kind {
        ErrorKind::InvalidSignature => "token signature mismatch",
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            "token algorithm not accepted"
        }
        ErrorKind::Base64(_) | ErrorKind::Utf8(_) => "token payload decode failed",
        ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => {
            "token payload missing required fields"
        }
        _ => "invalid token format",
    }
}
