use std::sync::Arc;

use portfolio_api::{
    AppState, LocalDiskStorage, PgAdminRepository, PgProfileRepository, PgRepository,
    Repositories, StorageState, bootstrap,
    config::{AppConfig, Env},
    create_router,
    models::{Education, Experience, Message, Project, Skill},
    storage::StorageService,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, initialises logging, connects and migrates the database, seeds
/// the administrator, prepares the upload directory and serves the router.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production secrets)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: pretty locally, JSON in production.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "portfolio_api=debug,tower_http=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Database: connection and schema are both required to start.
    let pool = match bootstrap::connect(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "failed to connect to Postgres, check DATABASE_URL");
            std::process::exit(1);
        }
    };
    tracing::info!("database connected");

    if let Err(e) = bootstrap::migrate(&pool).await {
        tracing::error!(error = %e, "failed to run database migrations");
        std::process::exit(1);
    }

    let repos = Repositories {
        admins: Arc::new(PgAdminRepository::new(pool.clone())),
        profile: Arc::new(PgProfileRepository::new(pool.clone())),
        projects: Arc::new(PgRepository::<Project>::new(pool.clone())),
        skills: Arc::new(PgRepository::<Skill>::new(pool.clone())),
        experience: Arc::new(PgRepository::<Experience>::new(pool.clone())),
        education: Arc::new(PgRepository::<Education>::new(pool.clone())),
        messages: Arc::new(PgRepository::<Message>::new(pool)),
    };

    // 4. Admin seed: a failure is logged and the server still starts.
    if let Err(e) = bootstrap::seed_admin(repos.admins.as_ref(), &config).await {
        tracing::error!(error = %e, "failed to seed administrator account");
    }

    // 5. Upload directory
    let disk = LocalDiskStorage::new(config.upload_dir.clone());
    if let Err(e) = disk.ensure_ready().await {
        tracing::error!(error = %e, dir = %disk.root().display(), "upload directory unavailable");
        std::process::exit(1);
    }
    let storage = Arc::new(disk) as StorageState;

    // 6. Router and server
    let port = config.port;
    let app = create_router(AppState::new(config, repos, storage));

    let listener = match TcpListener::bind(("0.0.0.0", port)).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, port, "failed to bind listener");
            std::process::exit(1);
        }
    };

    tracing::info!("Listening on 0.0.0.0:{port}");
    tracing::info!("API documentation available at http://localhost:{port}/swagger-ui");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server terminated");
        std::process::exit(1);
    }
}
