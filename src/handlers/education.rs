use axum::extract::State;
use uuid::Uuid;

use super::{IdPath, JsonBody};
use crate::{
    AppState,
    error::ApiError,
    models::{CreateEducationRequest, Education, EducationPatch},
    response::{ApiResponse, Created},
};

#[utoipa::path(
    get,
    path = "/api/education",
    tag = "education",
    responses((status = 200, description = "All education entries", body = [Education]))
)]
pub async fn get_education(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Education>>, ApiError> {
    Ok(ApiResponse::list(state.education.list_all().await?))
}

#[utoipa::path(
    post,
    path = "/api/education",
    tag = "education",
    request_body = CreateEducationRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Education created successfully", body = Education),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_education(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateEducationRequest>,
) -> Result<Created<Education>, ApiError> {
    let education = state.education.create(req).await?;
    Ok(Created(
        ApiResponse::data(education).with_message("Education created successfully"),
    ))
}

#[utoipa::path(
    put,
    path = "/api/education/{id}",
    tag = "education",
    params(("id" = Uuid, Path, description = "Education ID")),
    request_body = EducationPatch,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Education updated successfully", body = Education),
        (status = 404, description = "Education not found")
    )
)]
pub async fn update_education(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
    JsonBody(patch): JsonBody<EducationPatch>,
) -> Result<ApiResponse<Education>, ApiError> {
    let education = state.education.update_by_id(id, patch).await?;
    Ok(ApiResponse::data(education).with_message("Education updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/api/education/{id}",
    tag = "education",
    params(("id" = Uuid, Path, description = "Education ID")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Education deleted successfully"),
        (status = 404, description = "Education not found")
    )
)]
pub async fn delete_education(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
) -> Result<ApiResponse<()>, ApiError> {
    state.education.delete_by_id(id).await?;
    Ok(ApiResponse::message("Education deleted successfully"))
}
