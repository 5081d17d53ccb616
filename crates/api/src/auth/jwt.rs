//! HS256 access tokens carrying a barcode.
//!
//! Verification pins the algorithm to HS256: a token whose header names any
//! other algorithm (including `none`) is rejected before its signature is
//! looked at. Expiry is checked with zero leeway.

use complaints_core::types::Barcode;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Default token lifetime in hours.
pub const DEFAULT_EXPIRY_HOURS: i64 = 24;

/// Longest accepted token lifetime (one year).
pub const MAX_EXPIRY_HOURS: i64 = 24 * 365;

/// Verified token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The owner identifier the token was issued for.
    pub barcode: Barcode,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret shared with the identity provider that mints
    /// end-user tokens.
    pub secret: String,
    pub expiry_hours: i64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expiry_hours: DEFAULT_EXPIRY_HOURS,
        }
    }

    /// Token lifetime in seconds, as reported to clients. Saturates rather
    /// than overflowing for a hand-built config.
    pub fn expires_in_secs(&self) -> i64 {
        self.expiry_hours.saturating_mul(60 * 60)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token could not be issued: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("invalid or expired token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp"]);
    validation
}

/// Issue an HS256 token for `barcode`, valid for `config.expiry_hours`.
pub fn issue_token(barcode: Barcode, config: &JwtConfig) -> Result<String, TokenError> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        barcode,
        exp: now.saturating_add(config.expires_in_secs()),
        iat: now,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(TokenError::Encode)
}

/// Verify signature, algorithm, structure, and expiry; return the claims.
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<Claims, TokenError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation(),
    )
    .map(|data| data.claims)
    .map_err(TokenError::Invalid)
}
