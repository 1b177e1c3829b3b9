mod common;

use std::sync::Arc;

use axum::{
    body::{Body, Bytes, to_bytes},
    http::{Method, Request, StatusCode},
};
use common::{Part, TestApp, multipart_request};
use portfolio_api::{
    AppConfig, LocalDiskStorage, MockStorageService,
    handlers::upload::MAX_FILES_PER_FIELD,
    storage::StorageService,
};
use serde_json::json;
use tempfile::TempDir;
use tower::ServiceExt;

fn disk_app(dir: &TempDir) -> TestApp {
    let config = AppConfig {
        upload_dir: dir.path().to_path_buf(),
        ..AppConfig::default()
    };
    TestApp::with(config, Arc::new(LocalDiskStorage::new(dir.path())))
}

// --- LocalDiskStorage ---

#[tokio::test]
async fn ensure_ready_creates_nested_directories() {
    let dir = TempDir::new().unwrap();
    let storage = LocalDiskStorage::new(dir.path().join("content").join("uploads"));

    storage.ensure_ready().await.unwrap();
    assert!(storage.root().is_dir());
}

#[tokio::test]
async fn saved_file_lands_under_a_generated_name() {
    let dir = TempDir::new().unwrap();
    let storage = LocalDiskStorage::new(dir.path());

    let first = storage
        .save(Some("Avatar.PNG"), Bytes::from_static(b"png-bytes"))
        .await
        .unwrap();
    let second = storage
        .save(Some("Avatar.PNG"), Bytes::from_static(b"png-bytes"))
        .await
        .unwrap();

    assert!(first.starts_with("/uploads/"));
    assert!(first.ends_with(".png"));
    assert_ne!(first, second);

    let name = first.trim_start_matches("/uploads/");
    let written = std::fs::read(dir.path().join(name)).unwrap();
    assert_eq!(written, b"png-bytes");
}

#[tokio::test]
async fn traversal_in_client_name_is_ignored() {
    let dir = TempDir::new().unwrap();
    let storage = LocalDiskStorage::new(dir.path());

    let path = storage
        .save(Some("../../etc/passwd"), Bytes::from_static(b"x"))
        .await
        .unwrap();

    assert!(!path.contains(".."));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn write_into_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    let storage = LocalDiskStorage::new(dir.path().join("never-created"));

    let result = storage.save(Some("a.txt"), Bytes::from_static(b"x")).await;
    assert!(result.is_err());
}

// --- Multipart uploads through the router ---

#[tokio::test]
async fn project_upload_stores_and_serves_images() {
    let dir = TempDir::new().unwrap();
    let app = disk_app(&dir);
    let token = app.token();

    let request = multipart_request(
        Method::POST,
        "/api/projects",
        &token,
        &[
            Part::Text("title", "Gallery"),
            Part::Text("description", "Uploaded from the dashboard"),
            Part::Text("technologies", "[\"Rust\",\"SQL\"]"),
            Part::Text("featured", "true"),
            Part::Text("order", "3"),
            Part::File("image", "cover.jpg", b"cover"),
            Part::File("images", "one.png", b"one"),
            Part::File("images", "two.png", b"two"),
        ],
    );
    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::CREATED);
    let data = &body["data"];
    assert_eq!(data["technologies"], json!(["Rust", "SQL"]));
    assert_eq!(data["featured"], true);
    assert_eq!(data["order"], 3);
    let cover = data["image"].as_str().unwrap().to_string();
    assert!(cover.starts_with("/uploads/") && cover.ends_with(".jpg"));
    assert_eq!(data["images"].as_array().unwrap().len(), 2);

    let response = app
        .router()
        .oneshot(Request::builder().uri(&cover).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"cover");
}

#[tokio::test]
async fn update_replaces_or_appends_images() {
    let app = TestApp::new();
    let token = app.token();

    let (_, created) = app
        .send(multipart_request(
            Method::POST,
            "/api/projects",
            &token,
            &[
                Part::Text("title", "Gallery"),
                Part::Text("description", "d"),
                Part::File("images", "a.png", b"a"),
            ],
        ))
        .await;
    let id = created["data"]["_id"].as_str().unwrap().to_string();
    let original = created["data"]["images"][0].clone();
    let uri = format!("/api/projects/{id}");

    let (status, appended) = app
        .send(multipart_request(
            Method::PUT,
            &uri,
            &token,
            &[
                Part::Text("keepExistingImages", "true"),
                Part::File("images", "b.png", b"b"),
            ],
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let images = appended["data"]["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0], original);

    let (_, replaced) = app
        .send(multipart_request(
            Method::PUT,
            &uri,
            &token,
            &[Part::File("images", "c.png", b"c")],
        ))
        .await;
    let images = replaced["data"]["images"].as_array().unwrap();
    assert_eq!(images.len(), 1);
    assert_ne!(images[0], original);
    assert_eq!(replaced["data"]["title"], "Gallery");
}

#[tokio::test]
async fn empty_file_inputs_are_skipped() {
    let app = TestApp::new();
    let token = app.token();

    let (status, body) = app
        .send(multipart_request(
            Method::POST,
            "/api/projects",
            &token,
            &[
                Part::Text("title", "No files"),
                Part::Text("description", "d"),
                Part::File("image", "", b""),
            ],
        ))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["image"], "");
}

#[tokio::test]
async fn too_many_images_are_rejected() {
    let app = TestApp::new();
    let token = app.token();

    let mut parts = vec![Part::Text("title", "Many"), Part::Text("description", "d")];
    for _ in 0..=MAX_FILES_PER_FIELD {
        parts.push(Part::File("images", "x.png", b"x"));
    }

    let (status, body) = app
        .send(multipart_request(Method::POST, "/api/projects", &token, &parts))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(app.projects.len(), 0);
}

#[tokio::test]
async fn images_larger_than_the_framework_default_are_accepted() {
    let dir = TempDir::new().unwrap();
    let app = disk_app(&dir);
    let token = app.token();
    let cover = vec![7u8; 3 * 1024 * 1024];

    let (status, body) = app
        .send(multipart_request(
            Method::POST,
            "/api/projects",
            &token,
            &[
                Part::Text("title", "Large cover"),
                Part::Text("description", "Full resolution photo"),
                Part::File("image", "cover.jpg", &cover),
            ],
        ))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    let name = body["data"]["image"]
        .as_str()
        .unwrap()
        .trim_start_matches("/uploads/")
        .to_string();
    let stored = std::fs::metadata(dir.path().join(name)).unwrap();
    assert_eq!(stored.len(), cover.len() as u64);
}

#[tokio::test]
async fn body_over_the_upload_limit_is_payload_too_large() {
    let dir = TempDir::new().unwrap();
    let config = AppConfig {
        upload_dir: dir.path().to_path_buf(),
        max_upload_bytes: 1024 * 1024,
        ..AppConfig::default()
    };
    let app = TestApp::with(config, Arc::new(LocalDiskStorage::new(dir.path())));
    let token = app.token();
    let avatar = vec![1u8; 2 * 1024 * 1024];

    let (status, body) = app
        .send(multipart_request(
            Method::PUT,
            "/api/profile",
            &token,
            &[Part::File("avatar", "me.png", &avatar)],
        ))
        .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["success"], false);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    assert!(app.profile.stored().is_none());
}

#[tokio::test]
async fn undeclared_or_repeated_file_fields_store_nothing() {
    let dir = TempDir::new().unwrap();
    let app = disk_app(&dir);
    let token = app.token();

    let (status, body) = app
        .send(multipart_request(
            Method::POST,
            "/api/projects",
            &token,
            &[
                Part::Text("title", "Extra parts"),
                Part::Text("description", "d"),
                Part::File("image", "a.jpg", b"a"),
                Part::File("image", "b.jpg", b"b"),
            ],
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = app
        .send(multipart_request(
            Method::POST,
            "/api/projects",
            &token,
            &[
                Part::Text("title", "Extra parts"),
                Part::Text("description", "d"),
                Part::File("image", "a.jpg", b"a"),
                Part::File("bogus", "c.bin", b"c"),
            ],
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Unexpected file field 'bogus'");

    let (status, _) = app
        .send(multipart_request(
            Method::PUT,
            "/api/profile",
            &token,
            &[Part::File("image", "a.jpg", b"a")],
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    assert_eq!(app.projects.len(), 0);
}

#[tokio::test]
async fn profile_upload_sets_avatar_and_resume() {
    let dir = TempDir::new().unwrap();
    let app = disk_app(&dir);
    let token = app.token();

    let (status, body) = app
        .send(multipart_request(
            Method::PUT,
            "/api/profile",
            &token,
            &[
                Part::Text("name", "Grace Hopper"),
                Part::Text("social", "{\"linkedin\":\"https://linkedin.com/in/grace\"}"),
                Part::File("avatar", "me.webp", b"avatar"),
                Part::File("resume", "cv.pdf", b"%PDF"),
            ],
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["name"], "Grace Hopper");
    assert_eq!(data["social"]["linkedin"], "https://linkedin.com/in/grace");
    assert!(data["avatar"].as_str().unwrap().ends_with(".webp"));
    assert!(data["resume"].as_str().unwrap().ends_with(".pdf"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[tokio::test]
async fn failing_storage_is_a_server_error() {
    let app = TestApp::with(
        AppConfig::default(),
        Arc::new(MockStorageService::new_failing()),
    );
    let token = app.token();

    let (status, body) = app
        .send(multipart_request(
            Method::PUT,
            "/api/profile",
            &token,
            &[Part::File("avatar", "me.png", b"x")],
        ))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Server error");
    assert!(app.profile.stored().is_none());
}
