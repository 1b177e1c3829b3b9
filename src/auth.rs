use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    error::ApiError,
    models::{AdminView, Administrator, LoginRequest, LoginResponse, normalize_email},
    repository::AdminRepositoryState,
};

/// Cost factor for stored password hashes.
pub const BCRYPT_COST: u32 = 10;

const MISSING_TOKEN: &str = "No token, authorization denied";
const INVALID_TOKEN: &str = "Token is not valid";

/// Claims
///
/// Payload signed into every bearer token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Administrator id.
    pub sub: Uuid,
    pub role: String,
    pub iat: usize,
    pub exp: usize,
}

/// AuthUser
///
/// The principal resolved from a valid bearer token. Verification is stateless: the
/// token's signature and expiry are the whole check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: String,
}

/// AuthService
///
/// Credential checks against the admin store plus token issue and verification.
#[derive(Clone)]
pub struct AuthService {
    admins: AdminRepositoryState,
    secret: String,
    ttl: Duration,
}

impl AuthService {
    pub fn new(admins: AdminRepositoryState, config: &AppConfig) -> Self {
        Self {
            admins,
            secret: config.jwt_secret.clone(),
            // Out-of-range lifetimes saturate; `issue_token` then refuses to sign.
            ttl: Duration::try_hours(config.jwt_ttl_hours).unwrap_or(Duration::MAX),
        }
    }

    /// login
    ///
    /// Unknown email and wrong password fail identically so callers cannot probe which
    /// accounts exist.
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, ApiError> {
        let email = normalize_email(&req.email);
        let Some(admin) = self.admins.find_by_email(&email).await? else {
            tracing::warn!("login attempt for unknown account");
            return Err(ApiError::InvalidCredentials);
        };

        if !verify_password(req.password, admin.password_hash.clone()).await? {
            tracing::warn!(admin_id = %admin.id, "login attempt with wrong password");
            return Err(ApiError::InvalidCredentials);
        }

        let token = self.issue_token(&admin)?;
        tracing::info!(admin_id = %admin.id, "administrator logged in");
        Ok(LoginResponse {
            token,
            user: admin.into(),
        })
    }

    /// The administrator named by an authenticated principal.
    pub async fn current(&self, user: &AuthUser) -> Result<AdminView, ApiError> {
        self.admins
            .find_by_id(user.id)
            .await?
            .map(AdminView::from)
            .ok_or(ApiError::NotFound("User"))
    }

    pub fn issue_token(&self, admin: &Administrator) -> Result<String, ApiError> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| ApiError::internal("token lifetime out of range"))?;
        let claims = Claims {
            sub: admin.id,
            role: admin.role.clone(),
            iat: now.timestamp() as usize,
            exp: expires.timestamp() as usize,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::internal(format!("token signing failed: {e}")))
    }

    pub fn verify_token(&self, token: &str) -> Result<AuthUser, ApiError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("expired token rejected"),
                other => tracing::debug!(reason = ?other, "invalid token rejected"),
            }
            ApiError::Unauthorized(INVALID_TOKEN)
        })?;

        Ok(AuthUser {
            id: data.claims.sub,
            role: data.claims.role,
        })
    }
}

/// AuthUser Extractor
///
/// Reads `Authorization: Bearer <token>` and verifies it. Used by the authentication
/// middleware, which then hands the principal to handlers through request extensions.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AuthService: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthService::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::Unauthorized(MISSING_TOKEN))?;

        auth.verify_token(token)
    }
}

/// Hashes on the blocking pool; bcrypt is deliberately slow.
pub async fn hash_password(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .map_err(|e| ApiError::internal(format!("hashing task failed: {e}")))?
        .map_err(|e| ApiError::internal(format!("password hashing failed: {e}")))
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| ApiError::internal(format!("verification task failed: {e}")))?
        .map_err(|e| ApiError::internal(format!("password verification failed: {e}")))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::repository::{AdminRepository, RepoError};

    struct NoAdmins;

    #[async_trait]
    impl AdminRepository for NoAdmins {
        async fn find_by_email(&self, _email: &str) -> Result<Option<Administrator>, RepoError> {
            Ok(None)
        }
        async fn find_by_id(&self, _id: Uuid) -> Result<Option<Administrator>, RepoError> {
            Ok(None)
        }
        async fn insert(&self, admin: &Administrator) -> Result<Administrator, RepoError> {
            Ok(admin.clone())
        }
    }

    fn service(secret: &str) -> AuthService {
        let config = AppConfig {
            jwt_secret: secret.to_string(),
            ..AppConfig::default()
        };
        AuthService::new(Arc::new(NoAdmins), &config)
    }

    fn admin() -> Administrator {
        Administrator::new("admin", "admin@example.com", "hash".to_string(), Utc::now())
    }

    #[test]
    fn issued_token_verifies_to_the_same_principal() {
        let auth = service("secret");
        let admin = admin();
        let token = auth.issue_token(&admin).unwrap();

        let user = auth.verify_token(&token).unwrap();
        assert_eq!(user.id, admin.id);
        assert_eq!(user.role, "admin");
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = service("one").issue_token(&admin()).unwrap();
        let err = service("two").verify_token(&token).unwrap_err();
        assert_eq!(err.to_string(), INVALID_TOKEN);
    }

    #[test]
    fn expired_token_is_rejected() {
        let auth = service("secret");
        let past = (Utc::now() - Duration::hours(2)).timestamp() as usize;
        let claims = Claims {
            sub: Uuid::new_v4(),
            role: "admin".to_string(),
            iat: past,
            exp: past + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        assert!(auth.verify_token(&token).is_err());
    }

    #[test]
    fn oversized_lifetime_fails_without_panicking() {
        let config = AppConfig {
            jwt_ttl_hours: 10_000_000_000,
            ..AppConfig::default()
        };
        let auth = AuthService::new(Arc::new(NoAdmins), &config);

        let err = auth.issue_token(&admin()).unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));

        let config = AppConfig {
            jwt_ttl_hours: i64::MAX,
            ..AppConfig::default()
        };
        let auth = AuthService::new(Arc::new(NoAdmins), &config);
        assert!(auth.issue_token(&admin()).is_err());
    }

    #[tokio::test]
    async fn password_hash_round_trip() {
        let hash = hash_password("admin123".to_string()).await.unwrap();
        assert!(hash.starts_with("$2"));
        assert!(verify_password("admin123".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password("wrong".to_string(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn unknown_email_is_invalid_credentials() {
        let err = service("secret")
            .login(LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "x".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredentials));
    }
}
