//! Shared helpers for integration tests. Each test binary uses a subset.
#![allow(dead_code)]

use std::io::Cursor;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use chrono::Utc;
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, DatabaseConnection};
use serde_json::Value;
use tower::ServiceExt;

use tabletop_api::auth::jwt;
use tabletop_api::config::{Config, Environment};
use tabletop_api::entities::user;
use tabletop_api::sessions::PeerRegistry;
use tabletop_api::state::AppState;

pub const JWT_SECRET: &str = "test-secret-key-for-testing-only-32chars";

const BOUNDARY: &str = "tabletop-test-boundary";

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        server_host: std::net::IpAddr::from([127, 0, 0, 1]),
        server_port: 0,
        environment: Environment::Development,
        log_level: "warn".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        jwt_expiration_secs: 3600,
        google_client_id: String::new(),
        google_client_secret: String::new(),
        google_redirect_uri: String::new(),
        facebook_client_id: String::new(),
        facebook_client_secret: String::new(),
        facebook_redirect_uri: String::new(),
        frontend_url: "http://localhost:3001".to_string(),
        max_upload_bytes: 1 << 20,
        require_tilemap_in_batch: false,
    }
}

/// A migrated in-memory database.
pub async fn test_db() -> DatabaseConnection {
    let db = tabletop_api::db::connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    Migrator::up(&db, None).await.expect("migrations");
    db
}

pub async fn test_state_with(config: Config) -> AppState {
    AppState {
        db: test_db().await,
        config,
        peers: PeerRegistry::new(),
    }
}

pub async fn test_state() -> AppState {
    test_state_with(test_config()).await
}

/// The full router over `state`.
pub fn app_for(state: &AppState) -> Router {
    tabletop_api::routes::router(&state.config).with_state(state.clone())
}

pub async fn test_app() -> (Router, AppState) {
    let state = test_state().await;
    (app_for(&state), state)
}

/// Insert a user directly and mint an access token for it.
pub async fn create_user(state: &AppState, email: &str) -> (i32, String) {
    let model = user::ActiveModel {
        email: Set(email.to_string()),
        display_name: Set(Some(email.split('@').next().unwrap_or(email).to_string())),
        created_at: Set(Utc::now().fixed_offset()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .expect("insert user");
    let token = jwt::generate_access_token(model.id, &state.config).expect("mint token");
    (model.id, token)
}

/// Insert a user with a fixed id.
pub async fn create_user_with_id(db: &DatabaseConnection, id: i32, email: &str) {
    user::ActiveModel {
        id: Set(id),
        email: Set(email.to_string()),
        display_name: Set(None),
        avatar_url: Set(None),
        created_at: Set(Utc::now().fixed_offset()),
        last_login_at: Set(None),
    }
    .insert(db)
    .await
    .expect("insert user");
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap_or_default();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .into_body()
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .unwrap_or_default();
    TestResponse {
        status,
        headers,
        body: body.to_vec(),
    }
}

fn builder(method: &str, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

/// Test helper: send a GET request to the app and return (status, body).
pub async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = get_with_auth(app, uri, None).await;
    (response.status, response.text())
}

pub async fn get_with_auth(app: &Router, uri: &str, token: Option<&str>) -> TestResponse {
    let request = builder("GET", uri, token)
        .body(Body::empty())
        .unwrap_or_default();
    send(app, request).await
}

pub async fn json_request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: &Value,
) -> TestResponse {
    let request = builder(method, uri, token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap_or_default();
    send(app, request).await
}

pub async fn delete(app: &Router, uri: &str, token: Option<&str>) -> TestResponse {
    let request = builder("DELETE", uri, token)
        .body(Body::empty())
        .unwrap_or_default();
    send(app, request).await
}

/// One part of a `multipart/form-data` body.
pub enum Part<'a> {
    File {
        name: &'a str,
        filename: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File {
                name,
                filename,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    parts: &[Part<'_>],
) -> TestResponse {
    let request = builder("POST", uri, token)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap_or_default();
    send(app, request).await
}

/// A blank RGBA PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image::RgbaImage::new(width, height)
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}

/// A small JPEG.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image::RgbImage::new(width, height)
        .write_to(&mut out, image::ImageFormat::Jpeg)
        .expect("encode jpeg");
    out.into_inner()
}

pub fn png_part<'a>(filename: &'a str, data: &'a [u8]) -> Part<'a> {
    Part::File {
        name: "files[]",
        filename,
        content_type: "image/png",
        data,
    }
}

pub fn json_part<'a>(filename: &'a str, data: &'a [u8]) -> Part<'a> {
    Part::File {
        name: "files[]",
        filename,
        content_type: "application/json",
        data,
    }
}
