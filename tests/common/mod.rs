#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use chrono::Utc;
use portfolio_api::{
    AppConfig, AppState, MockStorageService, Repositories, StorageState, create_router,
    models::{Administrator, Document, Education, Experience, Message, Profile, Project, Skill},
    repository::{AdminRepository, ProfileRepository, RepoError, Repository, SortSpec},
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin123";

fn unavailable() -> RepoError {
    RepoError::Database(sqlx::Error::PoolTimedOut)
}

// --- In-memory repositories ---

/// Stores documents in insertion order and records the sort each listing asked for.
pub struct MockRepository<T> {
    items: Mutex<Vec<T>>,
    last_sort: Mutex<Option<SortSpec>>,
    failing: AtomicBool,
}

impl<T> Default for MockRepository<T> {
    fn default() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            last_sort: Mutex::new(None),
            failing: AtomicBool::new(false),
        }
    }
}

impl<T: Document> MockRepository<T> {
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn last_sort(&self) -> Option<SortSpec> {
        self.last_sort.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), RepoError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl<T: Document> Repository<T> for MockRepository<T> {
    async fn list_all(&self, sort: &SortSpec) -> Result<Vec<T>, RepoError> {
        self.check()?;
        *self.last_sort.lock().unwrap() = Some(sort.clone());
        Ok(self.items.lock().unwrap().clone())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        self.check()?;
        Ok(self.items.lock().unwrap().iter().find(|d| d.id() == id).cloned())
    }

    async fn insert(&self, doc: &T) -> Result<T, RepoError> {
        self.check()?;
        self.items.lock().unwrap().push(doc.clone());
        Ok(doc.clone())
    }

    async fn update(&self, doc: &T) -> Result<Option<T>, RepoError> {
        self.check()?;
        let mut items = self.items.lock().unwrap();
        Ok(items.iter_mut().find(|d| d.id() == doc.id()).map(|slot| {
            *slot = doc.clone();
            doc.clone()
        }))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, RepoError> {
        self.check()?;
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|d| d.id() != id);
        Ok(items.len() < before)
    }
}

#[derive(Default)]
pub struct MockProfileRepository {
    profile: Mutex<Option<Profile>>,
}

impl MockProfileRepository {
    pub fn stored(&self) -> Option<Profile> {
        self.profile.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProfileRepository for MockProfileRepository {
    async fn get_or_create(&self, placeholder: &Profile) -> Result<Profile, RepoError> {
        let mut slot = self.profile.lock().unwrap();
        Ok(slot.get_or_insert_with(|| placeholder.clone()).clone())
    }

    async fn save(&self, profile: &Profile) -> Result<Profile, RepoError> {
        *self.profile.lock().unwrap() = Some(profile.clone());
        Ok(profile.clone())
    }
}

#[derive(Default)]
pub struct MockAdminRepository {
    admins: Mutex<Vec<Administrator>>,
    failing: AtomicBool,
}

impl MockAdminRepository {
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn all(&self) -> Vec<Administrator> {
        self.admins.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), RepoError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AdminRepository for MockAdminRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Administrator>, RepoError> {
        self.check()?;
        Ok(self.admins.lock().unwrap().iter().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Administrator>, RepoError> {
        self.check()?;
        Ok(self.admins.lock().unwrap().iter().find(|a| a.id == id).cloned())
    }

    async fn insert(&self, admin: &Administrator) -> Result<Administrator, RepoError> {
        self.check()?;
        self.admins.lock().unwrap().push(admin.clone());
        Ok(admin.clone())
    }
}

// --- Application harness ---

pub struct TestApp {
    pub state: AppState,
    pub admin: Administrator,
    pub admins: Arc<MockAdminRepository>,
    pub profile: Arc<MockProfileRepository>,
    pub projects: Arc<MockRepository<Project>>,
    pub skills: Arc<MockRepository<Skill>>,
    pub experience: Arc<MockRepository<Experience>>,
    pub education: Arc<MockRepository<Education>>,
    pub messages: Arc<MockRepository<Message>>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(AppConfig::default(), Arc::new(MockStorageService::new()))
    }

    pub fn with(config: AppConfig, storage: StorageState) -> Self {
        // Low cost keeps the suite fast; verification reads the cost from the hash.
        let hash = bcrypt::hash(ADMIN_PASSWORD, 4).unwrap();
        let admin = Administrator::new("admin", ADMIN_EMAIL, hash, Utc::now());

        let admins = Arc::new(MockAdminRepository::default());
        admins.admins.lock().unwrap().push(admin.clone());

        let profile = Arc::new(MockProfileRepository::default());
        let projects = Arc::new(MockRepository::default());
        let skills = Arc::new(MockRepository::default());
        let experience = Arc::new(MockRepository::default());
        let education = Arc::new(MockRepository::default());
        let messages = Arc::new(MockRepository::default());

        let repos = Repositories {
            admins: admins.clone(),
            profile: profile.clone(),
            projects: projects.clone(),
            skills: skills.clone(),
            experience: experience.clone(),
            education: education.clone(),
            messages: messages.clone(),
        };

        Self {
            state: AppState::new(config, repos, storage),
            admin,
            admins,
            profile,
            projects,
            skills,
            experience,
            education,
            messages,
        }
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    pub fn token(&self) -> String {
        self.state.auth.issue_token(&self.admin).unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    /// JSON request, optionally authenticated.
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, None, None).await
    }

    /// Authenticated call with the seeded administrator's token.
    pub async fn admin_call(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let token = self.token();
        self.call(method, uri, Some(&token), body).await
    }
}

// --- Multipart ---

pub const BOUNDARY: &str = "portfolio-test-boundary";

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File(name, file_name, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_request(method: Method, uri: &str, token: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}
