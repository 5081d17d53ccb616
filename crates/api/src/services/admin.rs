//! Admin lookup, login, and startup seeding.

use std::sync::Arc;

use complaints_core::error::CoreError;
use complaints_core::roles::ROLE_ADMIN;
use complaints_core::types::Barcode;
use complaints_db::models::admin::{Admin, CreateAdmin};
use complaints_db::store::AdminStore;
use serde::Serialize;

use crate::auth::jwt::{issue_token, JwtConfig};
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_ADMIN_PASSWORD_LEN,
};
use crate::config::AdminBootstrap;

/// Same message for unknown barcode and wrong password.
const INVALID_CREDENTIALS: &str = "Invalid barcode or password";

/// A freshly issued access token.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    /// Lifetime in seconds.
    pub expires_in: i64,
}

pub struct AdminService {
    admins: Arc<dyn AdminStore>,
    jwt: JwtConfig,
}

impl AdminService {
    pub fn new(admins: Arc<dyn AdminStore>, jwt: JwtConfig) -> Self {
        Self { admins, jwt }
    }

    /// The admin row for `barcode`, or `Forbidden` if there is none or it
    /// lacks the admin role.
    pub async fn require_admin(&self, barcode: Barcode) -> Result<Admin, CoreError> {
        match self.admins.find_by_barcode(barcode).await? {
            Some(admin) if admin.is_admin() => Ok(admin),
            _ => {
                tracing::warn!(barcode, "Admin route denied");
                Err(CoreError::Forbidden("Admin role required".into()))
            }
        }
    }

    /// Verify the password and issue a token for the admin's barcode.
    pub async fn login(&self, barcode: Barcode, password: &str) -> Result<IssuedToken, CoreError> {
        let admin = self
            .admins
            .find_by_barcode(barcode)
            .await?
            .filter(Admin::is_admin)
            .ok_or_else(|| CoreError::Unauthorized(INVALID_CREDENTIALS.into()))?;

        let verified = verify_password(password, &admin.password_hash).map_err(|e| {
            CoreError::Internal(format!("stored password hash for admin {barcode} is unusable: {e}"))
        })?;
        if !verified {
            tracing::info!(barcode, "Admin login failed");
            return Err(CoreError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        let token = issue_token(admin.barcode, &self.jwt)
            .map_err(|e| CoreError::Internal(e.to_string()))?;
        tracing::info!(barcode, "Admin logged in");

        Ok(IssuedToken {
            token,
            expires_in: self.jwt.expires_in_secs(),
        })
    }

    /// Seed the configured admin if no admin with that barcode exists.
    /// Returns `true` if a row was inserted.
    pub async fn bootstrap(&self, seed: &AdminBootstrap) -> Result<bool, CoreError> {
        validate_password_strength(&seed.password, MIN_ADMIN_PASSWORD_LEN)
            .map_err(CoreError::InvalidInput)?;
        let password_hash =
            hash_password(&seed.password).map_err(|e| CoreError::Internal(e.to_string()))?;

        let inserted = self
            .admins
            .create_if_absent(&CreateAdmin {
                barcode: seed.barcode,
                password_hash,
                role: ROLE_ADMIN.to_string(),
            })
            .await?;
        if inserted {
            tracing::info!(barcode = seed.barcode, "Bootstrap admin created");
        } else {
            tracing::debug!(barcode = seed.barcode, "Bootstrap admin already present");
        }
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::auth::jwt::verify_token;
    use crate::test_support::TestHarness;

    fn seed() -> AdminBootstrap {
        AdminBootstrap {
            barcode: 900,
            password: "front-desk-2026".into(),
        }
    }

    #[tokio::test]
    async fn bootstrap_then_login() {
        let h = TestHarness::new();
        let admins = &h.state.admins;

        assert!(admins.bootstrap(&seed()).await.unwrap());
        assert!(!admins.bootstrap(&seed()).await.unwrap());

        let issued = admins.login(900, "front-desk-2026").await.unwrap();
        assert_eq!(issued.expires_in, 24 * 60 * 60);
        let claims = verify_token(&issued.token, &h.state.config.jwt).unwrap();
        assert_eq!(claims.barcode, 900);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_barcode_look_the_same() {
        let h = TestHarness::new();
        h.state.admins.bootstrap(&seed()).await.unwrap();

        let wrong = h.state.admins.login(900, "guess").await.unwrap_err();
        let unknown = h.state.admins.login(901, "front-desk-2026").await.unwrap_err();
        assert_matches!(&wrong, CoreError::Unauthorized(_));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn require_admin_checks_role() {
        let h = TestHarness::new();
        h.state.admins.bootstrap(&seed()).await.unwrap();
        h.store
            .create_if_absent(&CreateAdmin {
                barcode: 77,
                password_hash: hash_password("irrelevant-pass").unwrap(),
                role: "viewer".into(),
            })
            .await
            .unwrap();

        assert_eq!(h.state.admins.require_admin(900).await.unwrap().barcode, 900);
        assert_matches!(
            h.state.admins.require_admin(77).await,
            Err(CoreError::Forbidden(_))
        );
        assert_matches!(
            h.state.admins.require_admin(1001).await,
            Err(CoreError::Forbidden(_))
        );
    }

    #[tokio::test]
    async fn weak_bootstrap_password_is_rejected() {
        let h = TestHarness::new();
        let weak = AdminBootstrap {
            barcode: 900,
            password: "short".into(),
        };
        assert_matches!(
            h.state.admins.bootstrap(&weak).await,
            Err(CoreError::InvalidInput(_))
        );
    }
}
