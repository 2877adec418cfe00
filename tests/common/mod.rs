use std::sync::Arc;

use aradan_api::{
    config::AppConfig,
    db,
    services::ProductService,
    storage::{FilesystemImageStore, ImageStore},
    AppState,
};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Boundary used by the hand-rolled multipart bodies below.
pub const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

/// Helper harness spinning up the application router against a fresh SQLite
/// database and a temp-dir image store.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _db_dir: TempDir,
    _upload_dir: TempDir,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let db_dir = tempfile::tempdir().expect("failed to create db dir");
        let db_path = db_dir.path().join("aradan_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");
        let db = Arc::new(pool);

        let upload_dir = tempfile::tempdir().expect("failed to create upload dir");
        cfg.upload_dir = upload_dir.path().display().to_string();

        let images: Arc<dyn ImageStore> = Arc::new(
            FilesystemImageStore::new(upload_dir.path(), cfg.max_upload_bytes)
                .await
                .expect("failed to create image store"),
        );
        let products = Arc::new(ProductService::new(db.clone(), images.clone()));

        let state = AppState {
            db,
            config: cfg,
            products,
            images,
        };
        let router = aradan_api::app(state.clone());

        Self {
            router,
            state,
            _db_dir: db_dir,
            _upload_dir: upload_dir,
        }
    }

    /// Send a request through the in-process router and decode the JSON body.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        content_type: Option<&str>,
        body: Vec<u8>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(ct) = content_type {
            builder = builder.header("content-type", ct);
        }
        let request = builder.body(Body::from(body)).expect("invalid request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to read body")
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request("GET", uri, None, Vec::new()).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request("DELETE", uri, None, Vec::new()).await
    }

    /// POST or PUT a multipart product form.
    pub async fn send_form(
        &self,
        method: &str,
        uri: &str,
        fields: &[(&str, &str)],
        image: Option<(&str, &[u8])>,
    ) -> (StatusCode, Value) {
        let (content_type, body) = multipart_body(fields, image);
        self.request(method, uri, Some(&content_type), body).await
    }
}

/// Build a multipart/form-data body from text fields plus an optional file
/// part named "image".
pub fn multipart_body(
    fields: &[(&str, &str)],
    image: Option<(&str, &[u8])>,
) -> (String, Vec<u8>) {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((filename, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    (
        format!("multipart/form-data; boundary={BOUNDARY}"),
        body,
    )
}

/// The standard set of text fields for a valid product form.
pub fn shirt_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "Shirt"),
        ("price", "100"),
        ("stock", "10"),
        ("discount", "0"),
        ("status", "active"),
        ("slug", "shirt"),
        ("description", "cotton"),
    ]
}
