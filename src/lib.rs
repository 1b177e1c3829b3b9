use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

// --- Module Structure ---

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod response;
pub mod service;
pub mod storage;

// Routing segregated by access level (public, authenticated).
pub mod routes;

use auth::{AuthService, AuthUser};
use error::ErrorDetail;
use models::{Education, Experience, Message, Project, Skill};
use response::ApiResponse;
use routes::{authenticated, public};
use service::{ContentService, ProfileService};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use repository::{
    AdminRepositoryState, PgAdminRepository, PgProfileRepository, PgRepository,
    ProfileRepositoryState, RepositoryState,
};
pub use storage::{LocalDiskStorage, MockStorageService, StorageState};

/// ApiDoc
///
/// Aggregates every `#[utoipa::path]` handler and schema into the OpenAPI document
/// served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::auth::login, handlers::auth::get_me,
        handlers::profile::get_profile, handlers::profile::update_profile,
        handlers::projects::get_projects, handlers::projects::get_project,
        handlers::projects::create_project, handlers::projects::update_project,
        handlers::projects::delete_project,
        handlers::skills::get_skills, handlers::skills::create_skill,
        handlers::skills::update_skill, handlers::skills::delete_skill,
        handlers::experience::get_experience, handlers::experience::create_experience,
        handlers::experience::update_experience, handlers::experience::delete_experience,
        handlers::education::get_education, handlers::education::create_education,
        handlers::education::update_education, handlers::education::delete_education,
        handlers::contact::submit_message, handlers::contact::get_messages,
        handlers::contact::mark_message_read, handlers::contact::delete_message,
    ),
    components(
        schemas(
            handlers::HealthResponse,
            models::AdminView, models::LoginRequest, models::LoginResponse,
            models::Profile, models::ProfilePatch, models::SocialLinks,
            models::Project, models::CreateProjectRequest, models::ProjectPatch,
            models::Skill, models::SkillCategory, models::CreateSkillRequest, models::SkillPatch,
            models::Experience, models::CreateExperienceRequest, models::ExperiencePatch,
            models::Education, models::CreateEducationRequest, models::EducationPatch,
            models::Message, models::ContactRequest,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "portfolio", description = "Portfolio content API")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` security scheme referenced by the authenticated paths.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// AppState
///
/// The single immutable container shared by every request: configuration plus one
/// service per endpoint group. All members are cheap `Arc`-backed clones.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub auth: AuthService,
    pub storage: StorageState,
    pub profile: ProfileService,
    pub projects: ContentService<Project>,
    pub skills: ContentService<Skill>,
    pub experience: ContentService<Experience>,
    pub education: ContentService<Education>,
    pub messages: ContentService<Message>,
}

/// Repositories
///
/// The persistence seams `AppState` is assembled from. `main` fills it with Postgres
/// implementations, tests with in-memory ones.
pub struct Repositories {
    pub admins: AdminRepositoryState,
    pub profile: ProfileRepositoryState,
    pub projects: RepositoryState<Project>,
    pub skills: RepositoryState<Skill>,
    pub experience: RepositoryState<Experience>,
    pub education: RepositoryState<Education>,
    pub messages: RepositoryState<Message>,
}

impl AppState {
    pub fn new(config: AppConfig, repos: Repositories, storage: StorageState) -> Self {
        Self {
            auth: AuthService::new(repos.admins, &config),
            config,
            storage,
            profile: ProfileService::new(repos.profile),
            projects: ContentService::new(repos.projects),
            skills: ContentService::new(repos.skills),
            experience: ContentService::new(repos.experience),
            education: ContentService::new(repos.education),
            messages: ContentService::new(repos.messages),
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for AuthService {
    fn from_ref(app_state: &AppState) -> AuthService {
        app_state.auth.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

/// auth_middleware
///
/// Guards the authenticated router. `AuthUser` rejects with a 401 envelope when the
/// token is missing or invalid; otherwise the principal is handed to the handler as a
/// request extension.
async fn auth_middleware(auth_user: AuthUser, mut request: Request, next: Next) -> Response {
    tracing::debug!(admin_id = %auth_user.id, "request authenticated");
    request.extensions_mut().insert(auth_user);
    next.run(request).await
}

/// expose_error_detail
///
/// Development mode only: re-renders 5xx envelopes with the internal detail that
/// `ApiError` left on the response extensions.
async fn expose_error_detail(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let detail = response
        .extensions()
        .get::<ErrorDetail>()
        .map(|ErrorDetail(detail)| detail.clone());

    match detail {
        Some(detail) => (
            response.status(),
            ApiResponse::failure("Server error").with_error(detail),
        )
            .into_response(),
        None => response,
    }
}

/// create_router
///
/// Assembles the full application: `/api` routes, static uploads, Swagger UI, the
/// fallback envelope and the observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let protected = authenticated::authenticated_routes(state.config.max_upload_bytes)
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let api = Router::new()
        .merge(public::public_routes())
        .merge(protected);

    let uploads = ServeDir::new(&state.config.upload_dir);
    let development = state.config.is_development();

    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api)
        .nest_service("/uploads", uploads)
        .fallback(handlers::route_not_found)
        .with_state(state);

    let router = if development {
        router.layer(middleware::from_fn(expose_error_detail))
    } else {
        router
    };

    router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for one request, correlated by the `x-request-id` header.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
