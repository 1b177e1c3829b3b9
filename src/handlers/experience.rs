use axum::extract::State;
use uuid::Uuid;

use super::{IdPath, JsonBody};
use crate::{
    AppState,
    error::ApiError,
    models::{CreateExperienceRequest, Experience, ExperiencePatch},
    response::{ApiResponse, Created},
};

/// get_experience
///
/// [Public Route] Work history, most recent start date first.
#[utoipa::path(
    get,
    path = "/api/experience",
    tag = "experience",
    responses((status = 200, description = "All experience entries", body = [Experience]))
)]
pub async fn get_experience(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Experience>>, ApiError> {
    Ok(ApiResponse::list(state.experience.list_all().await?))
}

#[utoipa::path(
    post,
    path = "/api/experience",
    tag = "experience",
    request_body = CreateExperienceRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Experience created successfully", body = Experience),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_experience(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateExperienceRequest>,
) -> Result<Created<Experience>, ApiError> {
    let experience = state.experience.create(req).await?;
    Ok(Created(
        ApiResponse::data(experience).with_message("Experience created successfully"),
    ))
}

/// update_experience
///
/// [Authenticated Route] Partial update; `"endDate": null` clears the end date.
#[utoipa::path(
    put,
    path = "/api/experience/{id}",
    tag = "experience",
    params(("id" = Uuid, Path, description = "Experience ID")),
    request_body = ExperiencePatch,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Experience updated successfully", body = Experience),
        (status = 404, description = "Experience not found")
    )
)]
pub async fn update_experience(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
    JsonBody(patch): JsonBody<ExperiencePatch>,
) -> Result<ApiResponse<Experience>, ApiError> {
    let experience = state.experience.update_by_id(id, patch).await?;
    Ok(ApiResponse::data(experience).with_message("Experience updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/api/experience/{id}",
    tag = "experience",
    params(("id" = Uuid, Path, description = "Experience ID")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Experience deleted successfully"),
        (status = 404, description = "Experience not found")
    )
)]
pub async fn delete_experience(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
) -> Result<ApiResponse<()>, ApiError> {
    state.experience.delete_by_id(id).await?;
    Ok(ApiResponse::message("Experience deleted successfully"))
}
