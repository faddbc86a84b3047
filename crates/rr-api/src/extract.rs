//! Request extractors resolving the calling user.
//!
//! API requests authenticate with `Authorization: Bearer <access token>`.
//! Form views use the `session` cookie set by `POST /login`.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use rr_core::error::AppError;
use rr_core::models::{TokenKind, User};
use rr_core::permissions::NOT_AUTHENTICATED;

use crate::error::ApiError;
use crate::handlers::AppState;

pub const SESSION_COOKIE: &str = "session";

const MALFORMED_HEADER: &str = "Authorization header must be 'Bearer <token>'";
const UNKNOWN_USER: &str = "User not found";

/// The caller, if a bearer token was sent. A token that is present but
/// invalid still rejects the request.
pub struct MaybeUser(pub Option<User>);

/// An authenticated caller; anonymous requests get a 401.
pub struct AuthUser(pub User);

/// The form-login user. Bad or expired cookies count as anonymous.
pub struct SessionUser(pub Option<User>);

fn app_state(req: &HttpRequest) -> Result<web::Data<AppState>, ApiError> {
    req.app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| ApiError(AppError::Internal("application state is not registered".into())))
}

fn bearer_token(req: &HttpRequest) -> Result<Option<String>, ApiError> {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let malformed = || ApiError(AppError::Unauthorized(MALFORMED_HEADER.into()));
    let token = value
        .to_str()
        .map_err(|_| malformed())?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(malformed)?;
    Ok(Some(token.to_string()))
}

async fn resolve(state: &AppState, token: &str, kind: TokenKind) -> Result<User, ApiError> {
    let claims = state.auth.validate(token, kind)?;
    let user_id = claims.user_id()?;
    state
        .repo
        .get_user(user_id)
        .await?
        .ok_or_else(|| ApiError(AppError::Unauthorized(UNKNOWN_USER.into())))
}

impl FromRequest for MaybeUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let state = app_state(req);
        let token = bearer_token(req);
        Box::pin(async move {
            let Some(token) = token? else {
                return Ok(MaybeUser(None));
            };
            let user = resolve(&*state?, &token, TokenKind::Access).await?;
            Ok(MaybeUser(Some(user)))
        })
    }
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let maybe = MaybeUser::from_request(req, payload);
        Box::pin(async move {
            let MaybeUser(user) = maybe.await?;
            user.map(AuthUser)
                .ok_or_else(|| ApiError(AppError::Unauthorized(NOT_AUTHENTICATED.into())))
        })
    }
}

impl FromRequest for SessionUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let state = app_state(req);
        let token = req.cookie(SESSION_COOKIE).map(|c| c.value().to_string());
        Box::pin(async move {
            let Some(token) = token else {
                return Ok(SessionUser(None));
            };
            match resolve(&*state?, &token, TokenKind::Session).await {
                Ok(user) => Ok(SessionUser(Some(user))),
                Err(ApiError(AppError::Unauthorized(reason))) => {
                    tracing::debug!(%reason, "ignoring stale session cookie");
                    Ok(SessionUser(None))
                }
                Err(other) => Err(other),
            }
        })
    }
}
