//! Server-rendered account pages: login, logout, registration and home.
//!
//! Login state lives in an HTTP-only `session` cookie holding a session
//! token. Notices survive one redirect in a `flash` cookie holding a code.

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, HttpResponseBuilder};
use askama::Template;
use rr_core::error::AppError;
use rr_core::listing::{ListQuery, COMMUNITY_LIST};
use rr_core::services::{self, Registration};
use rr_ui::{HomeTemplate, LoginTemplate, Notice, RegisterTemplate};
use serde::Deserialize;

use super::AppState;
use crate::error::{ApiError, ApiResult};
use crate::extract::{SessionUser, SESSION_COOKIE};

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

fn removal(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build(name, "").path("/").finish();
    cookie.make_removal();
    cookie
}

fn flash(notice: Notice) -> Cookie<'static> {
    Cookie::build(FLASH_COOKIE, notice.code())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

fn redirect(location: &str) -> HttpResponseBuilder {
    let mut builder = HttpResponse::SeeOther();
    builder.insert_header((header::LOCATION, location));
    builder
}

/// Renders a page, consuming any pending flash notice.
fn render_page(req: &HttpRequest, template: impl Template) -> ApiResult<HttpResponse> {
    let body = template
        .render()
        .map_err(|e| ApiError(AppError::Internal(format!("template rendering failed: {e}"))))?;
    let mut builder = HttpResponse::Ok();
    builder.content_type("text/html; charset=utf-8");
    if req.cookie(FLASH_COOKIE).is_some() {
        builder.cookie(removal(FLASH_COOKIE));
    }
    Ok(builder.body(body))
}

fn pending_notice(req: &HttpRequest) -> Option<Notice> {
    req.cookie(FLASH_COOKIE).and_then(|c| Notice::from_code(c.value()))
}

/// GET /
pub async fn home(
    req: HttpRequest,
    data: web::Data<AppState>,
    SessionUser(user): SessionUser,
) -> ApiResult<HttpResponse> {
    let query = ListQuery::first_page(&COMMUNITY_LIST, data.options.page_size);
    let communities = data.repo.list_communities(&query).await?.items;
    render_page(
        &req,
        HomeTemplate {
            title: "Home",
            notice: pending_notice(&req),
            user: user.as_ref(),
            communities: &communities,
        },
    )
}

/// GET /login
pub async fn login_form(req: HttpRequest) -> ApiResult<HttpResponse> {
    render_page(&req, LoginTemplate { title: "Log in", notice: pending_notice(&req), username: "" })
}

/// POST /login
pub async fn login_submit(
    data: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> ApiResult<HttpResponse> {
    let username = form.username.as_deref().unwrap_or_default();
    let password = form.password.as_deref().unwrap_or_default();

    let user = match services::authenticate(&*data.repo, &*data.auth, username, password).await {
        Ok(user) => user,
        Err(AppError::Unauthorized(_)) => {
            return Ok(redirect("/login").cookie(flash(Notice::LoginFailed)).finish());
        }
        Err(other) => return Err(other.into()),
    };

    let token = data.auth.issue_session(&user)?;
    let session = Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(data.options.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(data.options.session_ttl_secs))
        .finish();
    tracing::info!(user = user.id, "form login");

    Ok(redirect("/").cookie(session).cookie(flash(Notice::LoggedIn)).finish())
}

/// GET|POST /logout
pub async fn logout(SessionUser(user): SessionUser) -> HttpResponse {
    if let Some(user) = user {
        tracing::info!(user = user.id, "form logout");
    }
    redirect("/login").cookie(removal(SESSION_COOKIE)).cookie(flash(Notice::LoggedOut)).finish()
}

/// GET /register
pub async fn register_form(req: HttpRequest) -> ApiResult<HttpResponse> {
    render_page(
        &req,
        RegisterTemplate {
            title: "Register",
            notice: pending_notice(&req),
            error: None,
            username: "",
            email: "",
        },
    )
}

/// POST /register
pub async fn register_submit(
    req: HttpRequest,
    data: web::Data<AppState>,
    form: web::Form<RegisterForm>,
) -> ApiResult<HttpResponse> {
    let form = form.into_inner();
    let input = Registration {
        username: form.username.clone(),
        email: form.email.clone(),
        password: form.password,
    };

    match services::register(&*data.repo, &*data.auth, input).await {
        Ok(_) => Ok(redirect("/login").cookie(flash(Notice::Registered)).finish()),
        Err(AppError::ValidationError(message) | AppError::Conflict(message)) => render_page(
            &req,
            RegisterTemplate {
                title: "Register",
                notice: None,
                error: Some(&message),
                username: form.username.as_deref().unwrap_or_default(),
                email: form.email.as_deref().unwrap_or_default(),
            },
        ),
        Err(other) => Err(other.into()),
    }
}
