use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

/// The only role the credential store knows about.
pub const ADMIN_ROLE: &str = "admin";

/// Administrator
///
/// A row of the credential store. The password is only ever held as a bcrypt hash and
/// this type is deliberately not `Serialize`: use `AdminView` for responses.
#[derive(Debug, Clone, FromRow)]
pub struct Administrator {
    pub id: Uuid,
    pub username: String,
    // Unique, stored lowercase.
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Administrator {
    pub fn new(username: &str, email: &str, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.trim().to_string(),
            email: normalize_email(email),
            password_hash,
            role: ADMIN_ROLE.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// AdminView
///
/// Public projection of an administrator returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AdminView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
}

impl From<Administrator> for AdminView {
    fn from(admin: Administrator) -> Self {
        Self {
            id: admin.id,
            username: admin.username,
            email: admin.email,
            role: admin.role,
        }
    }
}

/// LoginRequest
///
/// Credentials posted to `/api/auth/login`. The identifier is the admin email.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// LoginResponse
///
/// Payload of a successful login: the bearer token plus the administrator it names.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
    pub user: AdminView,
}
