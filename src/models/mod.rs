use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::repository::SortSpec;

mod admin;
mod message;
mod profile;
mod project;
mod skill;
mod timeline;

pub use admin::{
    ADMIN_ROLE, AdminView, Administrator, LoginRequest, LoginResponse, normalize_email,
};
pub use message::{ContactRequest, Message, MessagePatch};
pub use profile::{Profile, ProfilePatch, SocialLinks};
pub use project::{CreateProjectRequest, Project, ProjectPatch};
pub use skill::{CreateSkillRequest, Skill, SkillCategory, SkillPatch, UnknownCategory};
pub use timeline::{
    CreateEducationRequest, CreateExperienceRequest, Education, EducationPatch, Experience,
    ExperiencePatch,
};

/// ValidationError
///
/// A payload or merged document that breaks a schema rule. Surfaces to clients as a
/// 400 envelope carrying `message`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    pub fn required(field: &'static str) -> Self {
        Self::new(field, format!("{field} is required"))
    }
}

/// Document
///
/// The schema contract shared by every content entity kind. The service layer builds
/// documents from typed create payloads, merges typed patches onto stored documents
/// and validates the result before anything reaches a repository.
pub trait Document: Clone + Send + Sync + Unpin + 'static {
    /// Payload accepted by `create`.
    type Create: Send + 'static;
    /// Partial payload accepted by `update_by_id`; absent fields keep their value.
    type Patch: Send + 'static;

    /// Human readable kind, used in envelope messages ("Skill not found").
    const KIND: &'static str;

    fn id(&self) -> Uuid;

    fn build(id: Uuid, now: DateTime<Utc>, payload: Self::Create) -> Result<Self, ValidationError>;

    fn apply(&mut self, patch: Self::Patch) -> Result<(), ValidationError>;

    fn validate(&self) -> Result<(), ValidationError>;

    /// Stamps `updated_at`.
    fn touch(&mut self, now: DateTime<Utc>);

    /// Order used by `list_all` on the public endpoints.
    fn default_sort() -> SortSpec;
}

// --- Field helpers shared by the entity modules ---

pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

/// Trims an optional string, dropping it entirely when nothing is left.
pub(crate) fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn trimmed(value: String) -> String {
    value.trim().to_string()
}

pub(crate) fn to_order(field: &'static str, value: i64) -> Result<i32, ValidationError> {
    i32::try_from(value).map_err(|_| ValidationError::new(field, format!("{field} is out of range")))
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp, keeping only the calendar date.
pub(crate) fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .ok_or_else(|| ValidationError::new(field, format!("{field} must be a valid date")))
}

pub(crate) fn parse_optional_date(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<NaiveDate>, ValidationError> {
    clean(value).map(|v| parse_date(field, &v)).transpose()
}

/// Serde adapters for values that arrive as text from multipart forms.
///
/// Browsers send every form part as a string, and the dashboard encodes arrays and
/// objects as JSON inside those strings. These adapters accept either the native JSON
/// shape or its textual form.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer, de::DeserializeOwned, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrText {
        Int(i64),
        Float(f64),
        Text(String),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrText {
        Bool(bool),
        Text(String),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrText {
        List(Vec<String>),
        Text(String),
    }

    pub fn opt_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<IntOrText>::deserialize(deserializer)? {
            None => Ok(None),
            Some(IntOrText::Int(n)) => Ok(Some(n)),
            Some(IntOrText::Float(f)) if f.fract() == 0.0 => Ok(Some(f as i64)),
            Some(IntOrText::Float(f)) => Err(D::Error::custom(format!("{f} is not an integer"))),
            Some(IntOrText::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(IntOrText::Text(s)) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("'{s}' is not an integer"))),
        }
    }

    pub fn opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<BoolOrText>::deserialize(deserializer)? {
            None => Ok(None),
            Some(BoolOrText::Bool(b)) => Ok(Some(b)),
            Some(BoolOrText::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "" => Ok(None),
                "true" | "on" | "1" | "yes" => Ok(Some(true)),
                "false" | "off" | "0" | "no" => Ok(Some(false)),
                other => Err(D::Error::custom(format!("'{other}' is not a boolean"))),
            },
        }
    }

    /// A list given natively, as a JSON-encoded string, or as comma separated text.
    pub fn opt_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items = match Option::<ListOrText>::deserialize(deserializer)? {
            None => return Ok(None),
            Some(ListOrText::List(items)) => items,
            Some(ListOrText::Text(s)) if s.trim().starts_with('[') => {
                serde_json::from_str::<Vec<String>>(&s).map_err(D::Error::custom)?
            }
            Some(ListOrText::Text(s)) => s.split(',').map(str::to_string).collect(),
        };
        Ok(Some(
            items
                .into_iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
        ))
    }

    pub fn list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        opt_list(deserializer).map(Option::unwrap_or_default)
    }

    /// A structured value given natively or as a JSON-encoded string.
    pub fn opt_json<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        match Option::<serde_json::Value>::deserialize(deserializer)? {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(serde_json::Value::String(s)) => {
                serde_json::from_str(&s).map(Some).map_err(D::Error::custom)
            }
            Some(value) => serde_json::from_value(value).map(Some).map_err(D::Error::custom),
        }
    }

    /// Distinguishes an explicit `null` (clear the field) from an absent key.
    pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
