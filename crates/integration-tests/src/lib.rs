//! Shared fixtures for the end-to-end HTTP tests.
//!
//! Every test gets its own in-memory database, a throwaway media root and the
//! real argon2/JWT auth plugin, wired exactly as the binary wires them.

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use image::{ImageBuffer, ImageFormat, Rgb};
use rr_api::{configure_routes, middleware, ApiOptions, AppState};
use rr_auth_simple::{SimpleAuthProvider, TokenTtls};
use rr_core::models::{NewUser, Role};
use rr_db_sqlite::SqliteRepo;
use rr_storage_local::LocalMediaStore;
use serde_json::{json, Value};
use std::io::Cursor;
use tempfile::TempDir;

pub const SECRET: &[u8] = b"integration-secret-integration-secret";
pub const PASSWORD: &str = "password123";

pub struct TestEnv {
    pub state: web::Data<AppState>,
    /// Dropping this removes uploaded files
    pub media: TempDir,
}

pub async fn test_env() -> TestEnv {
    test_env_with(ApiOptions { secure_cookies: false, ..ApiOptions::default() }).await
}

pub async fn test_env_with(options: ApiOptions) -> TestEnv {
    let repo = SqliteRepo::new("sqlite::memory:").await.expect("Failed to init SQLite");
    let media = tempfile::tempdir().expect("Failed to create media root");
    let store = LocalMediaStore::new(media.path().to_path_buf(), "/media".into());
    let auth = SimpleAuthProvider::new(SECRET, TokenTtls::default());

    let state = web::Data::new(AppState {
        repo: Box::new(repo),
        store: Box::new(store),
        auth: Box::new(auth),
        options,
    });
    TestEnv { state, media }
}

pub async fn spawn_app(
    env: &TestEnv,
) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(env.state.clone())
            .wrap(middleware::security_headers())
            .configure(configure_routes),
    )
    .await
}

/// Sends a request and decodes the JSON body (`Null` when empty).
pub async fn send<S>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = if body.is_empty() { Value::Null } else { serde_json::from_slice(&body).unwrap_or(Value::Null) };
    (status, json)
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

/// A registered and logged-in account.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: i64,
    pub username: String,
    pub access: String,
    pub refresh: String,
}

impl TestUser {
    pub fn auth(&self) -> (header::HeaderName, String) {
        bearer(&self.access)
    }
}

pub async fn login<S>(app: &S, username: &str) -> TestUser
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({ "username": username, "password": PASSWORD }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    TestUser {
        id: body["user"]["id"].as_i64().expect("user id"),
        username: username.to_string(),
        access: body["access"].as_str().expect("access token").to_string(),
        refresh: body["refresh"].as_str().expect("refresh token").to_string(),
    }
}

pub async fn signup<S>(app: &S, username: &str) -> TestUser
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": PASSWORD,
        }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    login(app, username).await
}

/// Creates an admin directly in storage; registration never grants the role.
pub async fn seed_admin(env: &TestEnv, username: &str) {
    let password_hash = env.state.auth.hash_password(PASSWORD).expect("hash");
    env.state
        .repo
        .create_user(NewUser {
            username: username.into(),
            email: format!("{username}@example.com"),
            password_hash,
            role: Role::Admin,
        })
        .await
        .expect("seed admin");
}

pub async fn create_subreddit<S>(app: &S, owner: &TestUser, name: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/subreddit")
        .insert_header(owner.auth())
        .set_json(json!({ "name": name, "description": format!("All about {name}") }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "create subreddit failed: {body}");
    body
}

pub async fn create_post<S>(app: &S, owner: &TestUser, subreddit: i64, title: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/post")
        .insert_header(owner.auth())
        .set_json(json!({ "title": title, "content": format!("{title} content"), "subreddit": subreddit }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "create post failed: {body}");
    body
}

pub fn png_bytes() -> Vec<u8> {
    let img = ImageBuffer::from_pixel(8, 8, Rgb([20u8, 120, 200]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).expect("encode png");
    out.into_inner()
}

/// Builds a single-file `multipart/form-data` body; returns (content type, body).
pub fn multipart(field: &str, filename: &str, content_type: &str, data: &[u8]) -> (String, Vec<u8>) {
    let boundary = "rr-test-boundary-7MA4YWxkTrZu0gW";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}
