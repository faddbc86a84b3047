//! Registration, token issuance, the caller's profile and the user directory.

use actix_web::{web, HttpRequest, HttpResponse};
use rr_core::listing::USER_LIST;
use rr_core::models::{Role, User};
use rr_core::services::{self, ProfileUpdate, Registration};
use rr_core::validation;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::AppState;
use crate::error::{ApiError, ApiResult};
use crate::extract::AuthUser;
use crate::pagination::paginate;

/// Public view of an account returned by register and login.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self { id: user.id, username: user.username.clone(), email: user.email.clone(), role: user.role }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshPayload {
    pub refresh: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    access: String,
    refresh: String,
    user: UserSummary,
}

/// POST /api/register
pub async fn register(
    data: web::Data<AppState>,
    body: web::Json<RegisterPayload>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    let input = Registration { username: body.username, email: body.email, password: body.password };
    let user = services::register(&*data.repo, &*data.auth, input).await?;
    Ok(HttpResponse::Created().json(UserSummary::from(&user)))
}

/// POST /api/login
pub async fn login(
    data: web::Data<AppState>,
    body: web::Json<LoginPayload>,
) -> ApiResult<HttpResponse> {
    let username = validation::required("username", body.username.as_deref(), None)?;
    // Passwords are compared verbatim, never trimmed.
    let password = body
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("password: This field is required."))?;

    let user = services::authenticate(&*data.repo, &*data.auth, &username, password).await?;
    let tokens = data.auth.issue_tokens(&user)?;
    tracing::info!(user = user.id, "api login");

    Ok(HttpResponse::Ok().json(LoginResponse {
        access: tokens.access,
        refresh: tokens.refresh,
        user: UserSummary::from(&user),
    }))
}

/// POST /api/refresh
pub async fn refresh(
    data: web::Data<AppState>,
    body: web::Json<RefreshPayload>,
) -> ApiResult<HttpResponse> {
    let token = validation::required("refresh", body.refresh.as_deref(), None)?;
    let access = data.auth.refresh_access(&token)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "access": access })))
}

/// GET /api/profile
pub async fn get_profile(AuthUser(user): AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(user)
}

/// PUT|PATCH /api/profile
pub async fn update_profile(
    data: web::Data<AppState>,
    AuthUser(user): AuthUser,
    body: web::Json<RegisterPayload>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    let input = ProfileUpdate { username: body.username, email: body.email, password: body.password };
    let updated = services::update_profile(&*data.repo, &*data.auth, &user, input).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /api/profile
pub async fn delete_profile(
    data: web::Data<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<HttpResponse> {
    data.repo.delete_user(user.id).await?;
    tracing::info!(user = user.id, "account deleted");
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/users
pub async fn list_users(
    req: HttpRequest,
    data: web::Data<AppState>,
    _caller: AuthUser,
    params: web::Query<HashMap<String, String>>,
) -> ApiResult<HttpResponse> {
    let query = data.list_query(&USER_LIST, &params)?;
    let page = data.repo.list_users(&query).await?;
    Ok(HttpResponse::Ok().json(paginate(&req, &query, page)?))
}
