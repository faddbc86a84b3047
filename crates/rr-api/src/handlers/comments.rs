use actix_web::{web, HttpRequest, HttpResponse};
use rr_core::listing::COMMENT_LIST;
use rr_core::models::{Comment, NewComment, User};
use rr_core::permissions::{owner_or_read_only, Access};
use rr_core::validation;
use serde::Deserialize;
use std::collections::HashMap;

use super::{found, AppState};
use crate::error::{ApiError, ApiResult};
use crate::extract::{AuthUser, MaybeUser};
use crate::pagination::paginate;

#[derive(Debug, Deserialize)]
pub struct CommentPayload {
    pub content: Option<String>,
    pub post: Option<i64>,
}

async fn load(data: &AppState, id: i64, actor: Option<&User>, access: Access) -> ApiResult<Comment> {
    let comment = found(data.repo.get_comment(id).await?, "Comment", id)?;
    owner_or_read_only(actor, comment.owner, access)?;
    Ok(comment)
}

/// GET /api/comment
pub async fn list(
    req: HttpRequest,
    data: web::Data<AppState>,
    _caller: MaybeUser,
    params: web::Query<HashMap<String, String>>,
) -> ApiResult<HttpResponse> {
    let query = data.list_query(&COMMENT_LIST, &params)?;
    let page = data.repo.list_comments(&query).await?;
    Ok(HttpResponse::Ok().json(paginate(&req, &query, page)?))
}

/// POST /api/comment
pub async fn create(
    data: web::Data<AppState>,
    AuthUser(user): AuthUser,
    body: web::Json<CommentPayload>,
) -> ApiResult<HttpResponse> {
    let content = validation::required("content", body.content.as_deref(), None)?;
    let post = body.post.ok_or_else(|| ApiError::bad_request("post: This field is required."))?;
    if data.repo.get_post(post).await?.is_none() {
        return Err(ApiError::bad_request(format!(
            "post: Invalid pk \"{post}\" - object does not exist."
        )));
    }

    let comment = data.repo.create_comment(NewComment { content, owner: user.id, post }).await?;
    tracing::debug!(comment = comment.id, post, owner = user.id, "comment created");
    Ok(HttpResponse::Created().json(comment))
}

/// GET /api/comment/{id}
pub async fn retrieve(
    data: web::Data<AppState>,
    MaybeUser(user): MaybeUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let comment = load(&data, path.into_inner(), user.as_ref(), Access::Read).await?;
    Ok(HttpResponse::Ok().json(comment))
}

/// PUT|PATCH /api/comment/{id}
///
/// `content` is the only writable field, so a PATCH without it is a no-op.
pub async fn update(
    req: HttpRequest,
    data: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
    body: web::Json<CommentPayload>,
) -> ApiResult<HttpResponse> {
    let comment = load(&data, path.into_inner(), Some(&user), Access::Write).await?;
    if req.method() == actix_web::http::Method::PATCH && body.content.is_none() {
        return Ok(HttpResponse::Ok().json(comment));
    }
    let content = validation::required("content", body.content.as_deref(), None)?;
    let updated = data.repo.update_comment(comment.id, content).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /api/comment/{id}
pub async fn destroy(
    data: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let comment = load(&data, path.into_inner(), Some(&user), Access::Write).await?;
    data.repo.delete_comment(comment.id).await?;
    Ok(HttpResponse::NoContent().finish())
}
