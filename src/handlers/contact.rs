use axum::extract::State;
use uuid::Uuid;

use super::{IdPath, JsonBody};
use crate::{
    AppState,
    error::ApiError,
    models::{ContactRequest, Message, MessagePatch},
    response::{ApiResponse, Created},
};

/// submit_message
///
/// [Public Route] Contact form submission from a site visitor. The stored message is
/// not echoed back.
#[utoipa::path(
    post,
    path = "/api/contact",
    tag = "contact",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Message sent successfully"),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn submit_message(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<ContactRequest>,
) -> Result<Created<()>, ApiError> {
    let message = state.messages.create(req).await?;
    tracing::info!(message_id = %message.id, "contact message received");
    Ok(Created(ApiResponse::message("Message sent successfully")))
}

/// get_messages
///
/// [Authenticated Route] The inbox, newest first.
#[utoipa::path(
    get,
    path = "/api/contact",
    tag = "contact",
    security(("bearer" = [])),
    responses((status = 200, description = "All messages", body = [Message]))
)]
pub async fn get_messages(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Message>>, ApiError> {
    Ok(ApiResponse::list(state.messages.list_all().await?))
}

/// mark_message_read
///
/// [Authenticated Route] Sets `read: true`. Repeating the call changes nothing.
#[utoipa::path(
    put,
    path = "/api/contact/{id}/read",
    tag = "contact",
    params(("id" = Uuid, Path, description = "Message ID")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Message marked as read", body = Message),
        (status = 404, description = "Message not found")
    )
)]
pub async fn mark_message_read(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
) -> Result<ApiResponse<Message>, ApiError> {
    let message = state
        .messages
        .update_by_id(id, MessagePatch::mark_read())
        .await?;
    Ok(ApiResponse::data(message).with_message("Message marked as read"))
}

#[utoipa::path(
    delete,
    path = "/api/contact/{id}",
    tag = "contact",
    params(("id" = Uuid, Path, description = "Message ID")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Message deleted successfully"),
        (status = 404, description = "Message not found")
    )
)]
pub async fn delete_message(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
) -> Result<ApiResponse<()>, ApiError> {
    state.messages.delete_by_id(id).await?;
    Ok(ApiResponse::message("Message deleted successfully"))
}
