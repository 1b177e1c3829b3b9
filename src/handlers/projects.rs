use axum::{Extension, extract::State};
use uuid::Uuid;

use super::{
    IdPath,
    upload::{FormPayload, ProjectFiles},
};
use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    models::{CreateProjectRequest, Project, ProjectPatch},
    response::{ApiResponse, Created},
};

const KEEP_EXISTING_IMAGES: &str = "keepExistingImages";

/// get_projects
///
/// [Public Route] Lists every project, lowest `order` first and newest first within a tie.
#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "projects",
    responses((status = 200, description = "All projects", body = [Project]))
)]
pub async fn get_projects(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Project>>, ApiError> {
    let projects = state.projects.list_all().await?;
    Ok(ApiResponse::list(projects))
}

/// get_project
///
/// [Public Route] A single project by id.
#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    tag = "projects",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Found", body = Project),
        (status = 404, description = "Project not found")
    )
)]
pub async fn get_project(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
) -> Result<ApiResponse<Project>, ApiError> {
    let project = state.projects.get_by_id(id).await?;
    Ok(ApiResponse::data(project))
}

/// create_project
///
/// [Authenticated Route] Accepts JSON or multipart. Uploaded `image` (one) and `images`
/// (up to ten) files take precedence over any path sent as text.
#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "projects",
    request_body = CreateProjectRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Project created successfully", body = Project),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn create_project(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    mut form: FormPayload<ProjectFiles>,
) -> Result<Created<Project>, ApiError> {
    if let Some(image) = form.take_file("image") {
        form.set("image", image);
    }
    let images = form.take_files("images");
    if !images.is_empty() {
        form.set("images", images);
    }

    let project = state
        .projects
        .create(form.parse::<CreateProjectRequest>()?)
        .await?;
    tracing::info!(admin_id = %user.id, project_id = %project.id, "project created");
    Ok(Created(
        ApiResponse::data(project).with_message("Project created successfully"),
    ))
}

/// update_project
///
/// [Authenticated Route] Partial update. Newly uploaded `images` replace the stored list
/// unless `keepExistingImages=true`, in which case they are appended to it.
#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    tag = "projects",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = ProjectPatch,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Project updated successfully", body = Project),
        (status = 404, description = "Project not found")
    )
)]
pub async fn update_project(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
    mut form: FormPayload<ProjectFiles>,
) -> Result<ApiResponse<Project>, ApiError> {
    if let Some(image) = form.take_file("image") {
        form.set("image", image);
    }

    let uploaded = form.take_files("images");
    if !uploaded.is_empty() {
        let images = if form.flag(KEEP_EXISTING_IMAGES) {
            let mut existing = state.projects.get_by_id(id).await?.images;
            existing.extend(uploaded);
            existing
        } else {
            uploaded
        };
        form.set("images", images);
    }

    let project = state
        .projects
        .update_by_id(id, form.parse::<ProjectPatch>()?)
        .await?;
    Ok(ApiResponse::data(project).with_message("Project updated successfully"))
}

/// delete_project
///
/// [Authenticated Route] Removes the project. Its uploaded files stay on disk.
#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    tag = "projects",
    params(("id" = Uuid, Path, description = "Project ID")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Project deleted successfully"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn delete_project(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
) -> Result<ApiResponse<()>, ApiError> {
    state.projects.delete_by_id(id).await?;
    Ok(ApiResponse::message("Project deleted successfully"))
}
