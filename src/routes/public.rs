use crate::{
    AppState,
    handlers::{auth, contact, education, experience, health, profile, projects, skills},
};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints any client may call without a token: content reads, login, the contact
/// form and the health probe.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for monitors and load balancers.
        .route("/health", get(health))
        // POST /auth/login
        .route("/auth/login", post(auth::login))
        // GET /profile
        // Auto-creates the placeholder profile on an empty store.
        .route("/profile", get(profile::get_profile))
        .route("/projects", get(projects::get_projects))
        .route("/projects/{id}", get(projects::get_project))
        .route("/skills", get(skills::get_skills))
        .route("/experience", get(experience::get_experience))
        .route("/education", get(education::get_education))
        // POST /contact
        // The only public write: visitors submitting the contact form.
        .route("/contact", post(contact::submit_message))
}
