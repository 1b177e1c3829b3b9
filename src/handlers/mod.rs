//! HTTP handlers, one module per endpoint group. Every handler answers with the
//! `ApiResponse` envelope or an `ApiError`.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::ApiError, response::ApiResponse};

pub mod auth;
pub mod contact;
pub mod education;
pub mod experience;
pub mod profile;
pub mod projects;
pub mod skills;
pub mod upload;

/// IdPath
///
/// `axum::extract::Path` whose rejection is rendered as a 400 envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct IdPath<T>(pub T);

/// JsonBody
///
/// `axum::Json` whose rejection (bad syntax, wrong content type, wrong shape) is
/// rendered as a 400 envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// HealthResponse
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// health
///
/// [Public Route] Liveness probe. Never touches the database.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses((status = 200, description = "Server is running", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "Server is running",
    })
}

/// Fallback for every unmatched path.
pub async fn route_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, ApiResponse::failure("Route not found"))
}
