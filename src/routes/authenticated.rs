use crate::{
    AppState,
    handlers::{auth, contact, education, experience, profile, projects, skills},
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    handler::Handler,
    routing::{delete, get, post, put},
};

/// Authenticated Router Module
///
/// Every route here sits behind the auth middleware, which resolves the bearer token
/// into an `AuthUser` request extension before any handler runs. Routes that take file
/// uploads accept bodies up to `upload_limit` bytes; the rest keep axum's default.
pub fn authenticated_routes(upload_limit: usize) -> Router<AppState> {
    let uploads = || DefaultBodyLimit::max(upload_limit);

    Router::<AppState>::new()
        // GET /auth/me
        .route("/auth/me", get(auth::get_me))
        // PUT /profile
        // Create-or-update of the singleton profile, JSON or multipart.
        .route(
            "/profile",
            put(profile::update_profile.layer(uploads())),
        )
        // --- Projects ---
        .route(
            "/projects",
            post(projects::create_project.layer(uploads())),
        )
        .route(
            "/projects/{id}",
            put(projects::update_project.layer(uploads())).delete(projects::delete_project),
        )
        // --- Skills ---
        .route("/skills", post(skills::create_skill))
        .route(
            "/skills/{id}",
            put(skills::update_skill).delete(skills::delete_skill),
        )
        // --- Timeline ---
        .route("/experience", post(experience::create_experience))
        .route(
            "/experience/{id}",
            put(experience::update_experience).delete(experience::delete_experience),
        )
        .route("/education", post(education::create_education))
        .route(
            "/education/{id}",
            put(education::update_education).delete(education::delete_education),
        )
        // --- Inbox ---
        // POST /contact stays public; reading and managing messages does not.
        .route("/contact", get(contact::get_messages))
        .route("/contact/{id}/read", put(contact::mark_message_read))
        .route("/contact/{id}", delete(contact::delete_message))
}
