use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{ValidationError, admin::normalize_email, clean, lenient, require, trimmed};

/// SocialLinks
///
/// Optional outbound profile links. Stored as flattened columns, rendered as a nested
/// `social` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(default)]
#[ts(export)]
pub struct SocialLinks {
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
}

impl SocialLinks {
    fn cleaned(self) -> Self {
        Self {
            github: clean(self.github),
            linkedin: clean(self.linkedin),
            twitter: clean(self.twitter),
            facebook: clean(self.facebook),
            instagram: clean(self.instagram),
        }
    }
}

/// Profile
///
/// The site owner's profile. A singleton: at most one row exists, guarded in the
/// database by a unique `singleton` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Profile {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub title: String,
    pub bio: String,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    // Relative `/uploads/...` paths, empty when unset.
    pub avatar: String,
    pub resume: String,
    #[sqlx(flatten)]
    pub social: SocialLinks,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Placeholder document served when no profile has been written yet.
    pub fn placeholder(id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: "Your Name".to_string(),
            title: "Full Stack Developer".to_string(),
            bio: "Add your bio here".to_string(),
            email: "your@email.com".to_string(),
            phone: None,
            location: None,
            avatar: String::new(),
            resume: String::new(),
            social: SocialLinks::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: ProfilePatch) {
        if let Some(name) = patch.name {
            self.name = trimmed(name);
        }
        if let Some(title) = patch.title {
            self.title = trimmed(title);
        }
        if let Some(bio) = patch.bio {
            self.bio = bio;
        }
        if let Some(email) = patch.email {
            self.email = normalize_email(&email);
        }
        if let Some(phone) = patch.phone {
            self.phone = clean(phone);
        }
        if let Some(location) = patch.location {
            self.location = clean(location);
        }
        if let Some(avatar) = patch.avatar {
            self.avatar = avatar;
        }
        if let Some(resume) = patch.resume {
            self.resume = resume;
        }
        // A supplied social object replaces the links wholesale.
        if let Some(social) = patch.social {
            self.social = social.cleaned();
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("title", &self.title)?;
        require("bio", &self.bio)?;
        require("email", &self.email)
    }
}

/// ProfilePatch
///
/// Body of `PUT /api/profile`, JSON or multipart. `social` may arrive as an object or
/// as a JSON-encoded string; uploaded `avatar`/`resume` files are resolved to paths
/// before the patch is applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient::nullable")]
    #[schema(value_type = Option<String>)]
    pub phone: Option<Option<String>>,
    #[serde(deserialize_with = "lenient::nullable")]
    #[schema(value_type = Option<String>)]
    pub location: Option<Option<String>>,
    pub avatar: Option<String>,
    pub resume: Option<String>,
    #[serde(deserialize_with = "lenient::opt_json")]
    pub social: Option<SocialLinks>,
}
