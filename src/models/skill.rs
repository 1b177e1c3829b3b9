use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Document, ValidationError, lenient, require, to_order, trimmed};
use crate::repository::SortSpec;

pub const MIN_LEVEL: i64 = 0;
pub const MAX_LEVEL: i64 = 100;
const DEFAULT_LEVEL: i32 = 50;

/// SkillCategory
///
/// Closed set of groups the public site renders skills under. Stored as text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub enum SkillCategory {
    Frontend,
    Backend,
    Database,
    Tools,
    #[default]
    Other,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 5] = [
        SkillCategory::Frontend,
        SkillCategory::Backend,
        SkillCategory::Database,
        SkillCategory::Tools,
        SkillCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SkillCategory::Frontend => "Frontend",
            SkillCategory::Backend => "Backend",
            SkillCategory::Database => "Database",
            SkillCategory::Tools => "Tools",
            SkillCategory::Other => "Other",
        }
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown skill category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for SkillCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

// Row decoding goes through `#[sqlx(try_from = "String")]`.
impl TryFrom<String> for SkillCategory {
    type Error = UnknownCategory;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

fn parse_category(value: &str) -> Result<SkillCategory, ValidationError> {
    value.parse().map_err(|_| {
        ValidationError::new(
            "category",
            "category must be one of Frontend, Backend, Database, Tools, Other",
        )
    })
}

fn check_level(value: i64) -> Result<i32, ValidationError> {
    if !(MIN_LEVEL..=MAX_LEVEL).contains(&value) {
        return Err(ValidationError::new(
            "level",
            format!("level must be between {MIN_LEVEL} and {MAX_LEVEL}"),
        ));
    }
    // In range, so the narrowing cannot truncate.
    Ok(value as i32)
}

/// Skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Skill {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub category: SkillCategory,
    /// Proficiency percentage, 0 to 100 inclusive.
    pub level: i32,
    pub icon: String,
    #[sqlx(rename = "sort_order")]
    pub order: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateSkillRequest {
    pub name: String,
    pub category: Option<String>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub level: Option<i64>,
    pub icon: Option<String>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub level: Option<i64>,
    pub icon: Option<String>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub order: Option<i64>,
}

impl Document for Skill {
    type Create = CreateSkillRequest;
    type Patch = SkillPatch;

    const KIND: &'static str = "Skill";

    fn id(&self) -> Uuid {
        self.id
    }

    fn build(id: Uuid, now: DateTime<Utc>, req: CreateSkillRequest) -> Result<Self, ValidationError> {
        let category = match req.category.as_deref().map(str::trim) {
            None | Some("") => SkillCategory::default(),
            Some(c) => parse_category(c)?,
        };
        let level = match req.level {
            Some(level) => check_level(level)?,
            None => DEFAULT_LEVEL,
        };

        let skill = Self {
            id,
            name: trimmed(req.name),
            category,
            level,
            icon: req.icon.unwrap_or_default(),
            order: to_order("order", req.order.unwrap_or(0))?,
            created_at: now,
            updated_at: now,
        };
        skill.validate()?;
        Ok(skill)
    }

    fn apply(&mut self, patch: SkillPatch) -> Result<(), ValidationError> {
        if let Some(name) = patch.name {
            self.name = trimmed(name);
        }
        if let Some(category) = patch.category {
            self.category = parse_category(&category)?;
        }
        if let Some(level) = patch.level {
            self.level = check_level(level)?;
        }
        if let Some(icon) = patch.icon {
            self.icon = icon;
        }
        if let Some(order) = patch.order {
            self.order = to_order("order", order)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        check_level(i64::from(self.level))?;
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn default_sort() -> SortSpec {
        SortSpec::asc("category")
            .then_asc("sort_order")
            .then_desc("created_at")
    }
}
