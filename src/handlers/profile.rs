use axum::extract::State;

use super::upload::{FormPayload, ProfileFiles};
use crate::{
    AppState,
    error::ApiError,
    models::{Profile, ProfilePatch},
    response::ApiResponse,
};

/// get_profile
///
/// [Public Route] The site owner's profile. The first read on an empty store creates a
/// placeholder profile, and every later read returns that same document.
#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "profile",
    responses((status = 200, description = "Profile", body = Profile))
)]
pub async fn get_profile(State(state): State<AppState>) -> Result<ApiResponse<Profile>, ApiError> {
    Ok(ApiResponse::data(state.profile.get().await?))
}

/// update_profile
///
/// [Authenticated Route] Creates or updates the singleton. Accepts JSON or multipart
/// with optional `avatar` and `resume` files; `social` may be a JSON-encoded string.
#[utoipa::path(
    put,
    path = "/api/profile",
    tag = "profile",
    request_body = ProfilePatch,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Profile updated successfully", body = Profile),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    mut form: FormPayload<ProfileFiles>,
) -> Result<ApiResponse<Profile>, ApiError> {
    for field in ["avatar", "resume"] {
        if let Some(path) = form.take_file(field) {
            form.set(field, path);
        }
    }

    let profile = state.profile.upsert(form.parse::<ProfilePatch>()?).await?;
    Ok(ApiResponse::data(profile).with_message("Profile updated successfully"))
}
