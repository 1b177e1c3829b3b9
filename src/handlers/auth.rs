use axum::{Extension, extract::State};

use super::JsonBody;
use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    models::{AdminView, LoginRequest, LoginResponse},
    response::ApiResponse,
};

/// login
///
/// [Public Route] Exchanges admin credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<ApiResponse<LoginResponse>, ApiError> {
    let session = state.auth.login(req).await?;
    Ok(ApiResponse::data(session).with_message("Login successful"))
}

/// get_me
///
/// [Authenticated Route] The administrator the presented token belongs to.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current administrator", body = AdminView),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn get_me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<ApiResponse<AdminView>, ApiError> {
    Ok(ApiResponse::data(state.auth.current(&user).await?))
}
