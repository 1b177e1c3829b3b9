use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Document, ValidationError, clean, lenient, require, to_order, trimmed};
use crate::repository::SortSpec;

/// Project
///
/// A portfolio project card. `order` is the display sort key; ties fall back to the
/// newest project first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub technologies: Vec<String>,
    // Relative `/uploads/...` path of the cover image, empty when unset.
    pub image: String,
    pub images: Vec<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub featured: bool,
    pub details: String,
    /// `order` is reserved in SQL, so the column is `sort_order`.
    #[sqlx(rename = "sort_order")]
    pub order: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// CreateProjectRequest
///
/// Input for `POST /api/projects`, either as JSON or as multipart form text. Uploaded
/// `image`/`images` files are resolved to paths before this payload is built.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateProjectRequest {
    pub title: String,
    pub description: String,
    #[serde(deserialize_with = "lenient::list")]
    pub technologies: Vec<String>,
    pub image: Option<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub images: Vec<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    #[serde(deserialize_with = "lenient::opt_bool")]
    pub featured: Option<bool>,
    pub details: Option<String>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub order: Option<i64>,
}

/// ProjectPatch
///
/// Partial update for `PUT /api/projects/{id}`. Absent fields are left untouched; an
/// empty `liveUrl`/`githubUrl` clears the link.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient::opt_list")]
    pub technologies: Option<Vec<String>>,
    pub image: Option<String>,
    #[serde(deserialize_with = "lenient::opt_list")]
    pub images: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::nullable")]
    #[schema(value_type = Option<String>)]
    pub live_url: Option<Option<String>>,
    #[serde(deserialize_with = "lenient::nullable")]
    #[schema(value_type = Option<String>)]
    pub github_url: Option<Option<String>>,
    #[serde(deserialize_with = "lenient::opt_bool")]
    pub featured: Option<bool>,
    pub details: Option<String>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub order: Option<i64>,
}

impl Document for Project {
    type Create = CreateProjectRequest;
    type Patch = ProjectPatch;

    const KIND: &'static str = "Project";

    fn id(&self) -> Uuid {
        self.id
    }

    fn build(id: Uuid, now: DateTime<Utc>, req: CreateProjectRequest) -> Result<Self, ValidationError> {
        let project = Self {
            id,
            title: trimmed(req.title),
            description: req.description,
            technologies: req.technologies,
            image: req.image.unwrap_or_default(),
            images: req.images,
            live_url: clean(req.live_url),
            github_url: clean(req.github_url),
            featured: req.featured.unwrap_or(false),
            details: req.details.unwrap_or_default(),
            order: to_order("order", req.order.unwrap_or(0))?,
            created_at: now,
            updated_at: now,
        };
        project.validate()?;
        Ok(project)
    }

    fn apply(&mut self, patch: ProjectPatch) -> Result<(), ValidationError> {
        if let Some(title) = patch.title {
            self.title = trimmed(title);
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(technologies) = patch.technologies {
            self.technologies = technologies;
        }
        if let Some(image) = patch.image {
            self.image = image;
        }
        if let Some(images) = patch.images {
            self.images = images;
        }
        if let Some(live_url) = patch.live_url {
            self.live_url = clean(live_url);
        }
        if let Some(github_url) = patch.github_url {
            self.github_url = clean(github_url);
        }
        if let Some(featured) = patch.featured {
            self.featured = featured;
        }
        if let Some(details) = patch.details {
            self.details = details;
        }
        if let Some(order) = patch.order {
            self.order = to_order("order", order)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title)?;
        require("description", &self.description)?;
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn default_sort() -> SortSpec {
        SortSpec::asc("sort_order").then_desc("created_at")
    }
}
