//! Authentication service for user accounts and JWT handling
//!
//! Provides:
//! - User registration with field validation
//! - Password hashing with bcrypt
//! - Login and JWT issuance
//! - Token verification for the admin guard

use anyhow::anyhow;
use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::db::{Database, UserNode, UserRole};
use crate::error::{ApiError, ApiResult};
use crate::services::validation::{validate_login, validate_registration};

// ============================================================================
// JWT Claims
// ============================================================================

/// Claims carried by issued tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "FirstName")]
    pub first_name: String,
    #[serde(rename = "LastName")]
    pub last_name: String,
    #[serde(rename = "TypeOfUser")]
    pub type_of_user: String,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

impl TokenClaims {
    pub fn is_admin(&self) -> bool {
        self.type_of_user == UserRole::Admin.as_str()
    }
}

// ============================================================================
// Auth Types
// ============================================================================

/// Registration input
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterInput {
    #[serde(alias = "FirstName")]
    pub first_name: String,
    #[serde(alias = "LastName")]
    pub last_name: String,
    #[serde(alias = "Email")]
    pub email: String,
    #[serde(alias = "Password")]
    pub password: String,
    #[serde(alias = "TypeOfUser")]
    pub type_of_user: String,
}

// ============================================================================
// Configuration
// ============================================================================

/// Auth service configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT signing secret
    pub jwt_secret: String,
    /// Token lifetime in seconds (default: 12 hours)
    pub token_lifetime: i64,
    /// Bcrypt cost factor
    pub bcrypt_cost: u32,
    /// Suffix every email must end with
    pub email_domain: String,
}

impl From<&Config> for AuthConfig {
    fn from(config: &Config) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            token_lifetime: config.token_lifetime_hours.saturating_mul(60 * 60),
            bcrypt_cost: config.bcrypt_cost,
            email_domain: config.email_domain.clone(),
        }
    }
}

// ============================================================================
// Auth Service
// ============================================================================

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: Database,
    config: AuthConfig,
}

impl AuthService {
    /// Create a new auth service
    pub fn new(db: Database, config: AuthConfig) -> Self {
        Self { db, config }
    }

    /// Register a new user
    ///
    /// Emails are not checked for uniqueness.
    pub async fn register(&self, input: RegisterInput) -> ApiResult<()> {
        let role = validate_registration(
            &input.first_name,
            &input.last_name,
            &input.email,
            &input.password,
            &input.type_of_user,
            &self.config.email_domain,
        )?;

        let password_hash = self.hash_password(&input.password)?;

        self.db
            .graph()
            .create_user(&UserNode {
                first_name: input.first_name,
                last_name: input.last_name,
                email: input.email.clone(),
                password_hash,
                type_of_user: role.as_str().to_string(),
            })
            .await?;

        tracing::info!(email = %input.email, role = role.as_str(), "User registered");
        Ok(())
    }

    /// Login with email and password, returning a signed token
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<String> {
        validate_login(email, password, &self.config.email_domain)?;

        let user = self
            .db
            .graph()
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| ApiError::not_found("User does not exist"))?;

        if !self.verify_password(password, &user.password_hash)? {
            tracing::info!(email = %email, "Login rejected: wrong password");
            return Err(ApiError::unauthorized("Wrong password"));
        }

        let token = self.issue_token(&user)?;
        tracing::info!(email = %email, "User logged in");
        Ok(token)
    }

    /// Decode and validate a token issued by [AuthService::login]
    pub fn verify_token(&self, token: &str) -> ApiResult<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS512);
        validation.validate_exp = true;

        let token_data = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| ApiError::unauthorized(format!("Invalid token: {e}")))?;

        Ok(token_data.claims)
    }

    // ========================================================================
    // Helper Methods
    // ========================================================================

    /// Hash a password with bcrypt
    fn hash_password(&self, password: &str) -> ApiResult<String> {
        hash(password, self.config.bcrypt_cost)
            .map_err(|e| anyhow!("Failed to hash password: {e}").into())
    }

    /// Verify a password against a hash
    fn verify_password(&self, password: &str, hash: &str) -> ApiResult<bool> {
        verify(password, hash).map_err(|e| anyhow!("Failed to verify password: {e}").into())
    }

    /// Sign a token carrying the user's profile
    fn issue_token(&self, user: &UserNode) -> ApiResult<String> {
        let now = Utc::now();
        let exp = Duration::try_seconds(self.config.token_lifetime)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| anyhow!("Token lifetime out of range: {}s", self.config.token_lifetime))?;
        let claims = TokenClaims {
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            type_of_user: user.type_of_user.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| anyhow!("Failed to create token: {e}").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn service() -> AuthService {
        AuthService::new(
            Database::in_memory(),
            AuthConfig {
                jwt_secret: "test-secret".to_string(),
                token_lifetime: 12 * 60 * 60,
                bcrypt_cost: 4,
                email_domain: "@gmail.com".to_string(),
            },
        )
    }

    fn ana() -> RegisterInput {
        RegisterInput {
            first_name: "Ana".to_string(),
            last_name: "Petrovic".to_string(),
            email: "ana@gmail.com".to_string(),
            password: "correct-horse".to_string(),
            type_of_user: "admin".to_string(),
        }
    }

    #[tokio::test]
    async fn test_token_claims_match_profile() {
        let auth = service();
        auth.register(ana()).await.unwrap();

        let token = auth.login("ana@gmail.com", "correct-horse").await.unwrap();
        let claims = auth.verify_token(&token).unwrap();

        assert_eq!(claims.email, "ana@gmail.com");
        assert_eq!(claims.first_name, "Ana");
        assert_eq!(claims.last_name, "Petrovic");
        assert_eq!(claims.type_of_user, "admin");
        assert!(claims.is_admin());
        assert_eq!(claims.exp - claims.iat, 12 * 60 * 60);
    }

    #[tokio::test]
    async fn test_login_failures() {
        let auth = service();
        auth.register(ana()).await.unwrap();

        assert_matches!(
            auth.login("bob@gmail.com", "correct-horse").await,
            Err(ApiError::NotFound(_))
        );
        assert_matches!(
            auth.login("ana@gmail.com", "wrong-horse").await,
            Err(ApiError::Unauthorized(_))
        );
        assert_matches!(
            auth.login("ana@outlook.com", "correct-horse").await,
            Err(ApiError::Validation(_))
        );
    }

    #[tokio::test]
    async fn test_password_is_stored_hashed() {
        let db = Database::in_memory();
        let auth = AuthService::new(db.clone(), service().config);
        auth.register(ana()).await.unwrap();

        let stored = db.graph().find_user_by_email("ana@gmail.com").await.unwrap().unwrap();
        assert!(stored.password_hash != "correct-horse");
        assert!(verify("correct-horse", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_out_of_range_lifetime_fails_login() {
        let auth = AuthService::new(
            Database::in_memory(),
            AuthConfig {
                token_lifetime: i64::MAX,
                ..service().config
            },
        );
        auth.register(ana()).await.unwrap();

        assert_matches!(
            auth.login("ana@gmail.com", "correct-horse").await,
            Err(ApiError::Internal(_))
        );
    }

    #[test]
    fn test_lifetime_from_config_saturates() {
        let config = Config {
            token_lifetime_hours: i64::MAX,
            ..Config::default()
        };
        assert_eq!(AuthConfig::from(&config).token_lifetime, i64::MAX);
        assert_eq!(AuthConfig::from(&Config::default()).token_lifetime, 12 * 60 * 60);
    }

    #[test]
    fn test_foreign_tokens_are_rejected() {
        let auth = service();
        let other = AuthService::new(
            Database::in_memory(),
            AuthConfig {
                jwt_secret: "other-secret".to_string(),
                ..service().config
            },
        );
        let user = UserNode {
            first_name: "Ana".to_string(),
            last_name: "Petrovic".to_string(),
            email: "ana@gmail.com".to_string(),
            password_hash: String::new(),
            type_of_user: "user".to_string(),
        };

        let token = other.issue_token(&user).unwrap();
        assert_matches!(auth.verify_token(&token), Err(ApiError::Unauthorized(_)));
        assert_matches!(auth.verify_token("not-a-token"), Err(ApiError::Unauthorized(_)));
    }
}
