use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Document, ValidationError, admin::normalize_email, lenient, require, trimmed};
use crate::repository::SortSpec;

/// Message
///
/// A contact-form submission. Everything except `read` is frozen once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Message {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub read: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// ContactRequest
///
/// Visitor-submitted payload for the public `POST /api/contact`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(default)]
#[ts(export)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// MessagePatch
///
/// The only mutation a stored message accepts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct MessagePatch {
    #[serde(deserialize_with = "lenient::opt_bool")]
    pub read: Option<bool>,
}

impl MessagePatch {
    pub fn mark_read() -> Self {
        Self { read: Some(true) }
    }
}

impl Document for Message {
    type Create = ContactRequest;
    type Patch = MessagePatch;

    const KIND: &'static str = "Message";

    fn id(&self) -> Uuid {
        self.id
    }

    fn build(id: Uuid, now: DateTime<Utc>, req: ContactRequest) -> Result<Self, ValidationError> {
        let message = Self {
            id,
            name: trimmed(req.name),
            email: normalize_email(&req.email),
            subject: trimmed(req.subject),
            message: req.message,
            read: false,
            created_at: now,
            updated_at: now,
        };
        message.validate()?;
        Ok(message)
    }

    fn apply(&mut self, patch: MessagePatch) -> Result<(), ValidationError> {
        if let Some(read) = patch.read {
            self.read = read;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("email", &self.email)?;
        require("subject", &self.subject)?;
        require("message", &self.message)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn default_sort() -> SortSpec {
        SortSpec::desc("created_at")
    }
}
