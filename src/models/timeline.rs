//! Dated entries rendered on the career timeline: work experience and education.
//!
//! Both kinds share one rule: when `current` is set the entry is ongoing and display
//! logic ignores `endDate`, which is kept as stored rather than forced to null.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{
    Document, ValidationError, clean, lenient, parse_date, parse_optional_date, require,
    to_order, trimmed,
};
use crate::repository::SortSpec;

fn timeline_sort() -> SortSpec {
    SortSpec::desc("start_date")
        .then_asc("sort_order")
        .then_desc("created_at")
}

fn required_date(field: &'static str, value: Option<String>) -> Result<NaiveDate, ValidationError> {
    parse_optional_date(field, value)?.ok_or_else(|| ValidationError::required(field))
}

/// `Some(None)` or an empty string clears the end date.
fn patch_end_date(value: Option<String>) -> Result<Option<NaiveDate>, ValidationError> {
    parse_optional_date("endDate", value)
}

// --- Experience ---

/// Experience
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Experience {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub company: String,
    pub position: String,
    pub location: Option<String>,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub current: bool,
    #[sqlx(rename = "sort_order")]
    pub order: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateExperienceRequest {
    pub company: String,
    pub position: String,
    pub location: Option<String>,
    pub description: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(deserialize_with = "lenient::opt_bool")]
    pub current: Option<bool>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperiencePatch {
    pub company: Option<String>,
    pub position: Option<String>,
    #[serde(deserialize_with = "lenient::nullable")]
    #[schema(value_type = Option<String>)]
    pub location: Option<Option<String>>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    #[serde(deserialize_with = "lenient::nullable")]
    #[schema(value_type = Option<String>)]
    pub end_date: Option<Option<String>>,
    #[serde(deserialize_with = "lenient::opt_bool")]
    pub current: Option<bool>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub order: Option<i64>,
}

impl Document for Experience {
    type Create = CreateExperienceRequest;
    type Patch = ExperiencePatch;

    const KIND: &'static str = "Experience";

    fn id(&self) -> Uuid {
        self.id
    }

    fn build(
        id: Uuid,
        now: DateTime<Utc>,
        req: CreateExperienceRequest,
    ) -> Result<Self, ValidationError> {
        let experience = Self {
            id,
            company: trimmed(req.company),
            position: trimmed(req.position),
            location: clean(req.location),
            description: req.description,
            start_date: required_date("startDate", req.start_date)?,
            end_date: parse_optional_date("endDate", req.end_date)?,
            current: req.current.unwrap_or(false),
            order: to_order("order", req.order.unwrap_or(0))?,
            created_at: now,
            updated_at: now,
        };
        experience.validate()?;
        Ok(experience)
    }

    fn apply(&mut self, patch: ExperiencePatch) -> Result<(), ValidationError> {
        if let Some(company) = patch.company {
            self.company = trimmed(company);
        }
        if let Some(position) = patch.position {
            self.position = trimmed(position);
        }
        if let Some(location) = patch.location {
            self.location = clean(location);
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(start) = patch.start_date {
            self.start_date = parse_date("startDate", &start)?;
        }
        if let Some(end) = patch.end_date {
            self.end_date = patch_end_date(end)?;
        }
        if let Some(current) = patch.current {
            self.current = current;
        }
        if let Some(order) = patch.order {
            self.order = to_order("order", order)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("company", &self.company)?;
        require("position", &self.position)?;
        require("description", &self.description)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn default_sort() -> SortSpec {
        timeline_sort()
    }
}

// --- Education ---

/// Education
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Education {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub current: bool,
    pub grade: Option<String>,
    pub description: Option<String>,
    #[sqlx(rename = "sort_order")]
    pub order: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateEducationRequest {
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(deserialize_with = "lenient::opt_bool")]
    pub current: Option<bool>,
    pub grade: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationPatch {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub start_date: Option<String>,
    #[serde(deserialize_with = "lenient::nullable")]
    #[schema(value_type = Option<String>)]
    pub end_date: Option<Option<String>>,
    #[serde(deserialize_with = "lenient::opt_bool")]
    pub current: Option<bool>,
    #[serde(deserialize_with = "lenient::nullable")]
    #[schema(value_type = Option<String>)]
    pub grade: Option<Option<String>>,
    #[serde(deserialize_with = "lenient::nullable")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub order: Option<i64>,
}

impl Document for Education {
    type Create = CreateEducationRequest;
    type Patch = EducationPatch;

    const KIND: &'static str = "Education";

    fn id(&self) -> Uuid {
        self.id
    }

    fn build(
        id: Uuid,
        now: DateTime<Utc>,
        req: CreateEducationRequest,
    ) -> Result<Self, ValidationError> {
        let education = Self {
            id,
            institution: trimmed(req.institution),
            degree: trimmed(req.degree),
            field_of_study: trimmed(req.field_of_study),
            start_date: required_date("startDate", req.start_date)?,
            end_date: parse_optional_date("endDate", req.end_date)?,
            current: req.current.unwrap_or(false),
            grade: clean(req.grade),
            description: req.description.filter(|d| !d.trim().is_empty()),
            order: to_order("order", req.order.unwrap_or(0))?,
            created_at: now,
            updated_at: now,
        };
        education.validate()?;
        Ok(education)
    }

    fn apply(&mut self, patch: EducationPatch) -> Result<(), ValidationError> {
        if let Some(institution) = patch.institution {
            self.institution = trimmed(institution);
        }
        if let Some(degree) = patch.degree {
            self.degree = trimmed(degree);
        }
        if let Some(field) = patch.field_of_study {
            self.field_of_study = trimmed(field);
        }
        if let Some(start) = patch.start_date {
            self.start_date = parse_date("startDate", &start)?;
        }
        if let Some(end) = patch.end_date {
            self.end_date = patch_end_date(end)?;
        }
        if let Some(current) = patch.current {
            self.current = current;
        }
        if let Some(grade) = patch.grade {
            self.grade = clean(grade);
        }
        if let Some(description) = patch.description {
            self.description = description.filter(|d| !d.trim().is_empty());
        }
        if let Some(order) = patch.order {
            self.order = to_order("order", order)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("institution", &self.institution)?;
        require("degree", &self.degree)?;
        require("fieldOfStudy", &self.field_of_study)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn default_sort() -> SortSpec {
        timeline_sort()
    }
}
