use axum::extract::State;
use uuid::Uuid;

use super::{IdPath, JsonBody};
use crate::{
    AppState,
    error::ApiError,
    models::{CreateSkillRequest, Skill, SkillPatch},
    response::{ApiResponse, Created},
};

/// get_skills
///
/// [Public Route] Lists skills grouped by category, then by `order`.
#[utoipa::path(
    get,
    path = "/api/skills",
    tag = "skills",
    responses((status = 200, description = "All skills", body = [Skill]))
)]
pub async fn get_skills(State(state): State<AppState>) -> Result<ApiResponse<Vec<Skill>>, ApiError> {
    Ok(ApiResponse::list(state.skills.list_all().await?))
}

/// create_skill
///
/// [Authenticated Route] `level` must lie in 0..=100; `category` defaults to `Other`.
#[utoipa::path(
    post,
    path = "/api/skills",
    tag = "skills",
    request_body = CreateSkillRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Skill created successfully", body = Skill),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_skill(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateSkillRequest>,
) -> Result<Created<Skill>, ApiError> {
    let skill = state.skills.create(req).await?;
    Ok(Created(
        ApiResponse::data(skill).with_message("Skill created successfully"),
    ))
}

/// update_skill
///
/// [Authenticated Route] Only the supplied fields change.
#[utoipa::path(
    put,
    path = "/api/skills/{id}",
    tag = "skills",
    params(("id" = Uuid, Path, description = "Skill ID")),
    request_body = SkillPatch,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Skill updated successfully", body = Skill),
        (status = 404, description = "Skill not found")
    )
)]
pub async fn update_skill(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
    JsonBody(patch): JsonBody<SkillPatch>,
) -> Result<ApiResponse<Skill>, ApiError> {
    let skill = state.skills.update_by_id(id, patch).await?;
    Ok(ApiResponse::data(skill).with_message("Skill updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/api/skills/{id}",
    tag = "skills",
    params(("id" = Uuid, Path, description = "Skill ID")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Skill deleted successfully"),
        (status = 404, description = "Skill not found")
    )
)]
pub async fn delete_skill(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
) -> Result<ApiResponse<()>, ApiError> {
    state.skills.delete_by_id(id).await?;
    Ok(ApiResponse::message("Skill deleted successfully"))
}
