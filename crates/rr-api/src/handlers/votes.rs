//! Up/down votes. Storage enforces one vote per user and target.

use actix_web::{web, HttpResponse};
use rr_core::error::AppError;
use serde::Deserialize;

use super::{found, AppState};
use crate::error::{ApiError, ApiResult};
use crate::extract::AuthUser;

#[derive(Debug, Deserialize)]
pub struct VotePayload {
    pub vote: Option<bool>,
}

fn required_vote(body: &VotePayload) -> ApiResult<bool> {
    body.vote.ok_or_else(|| ApiError::bad_request("vote: This field is required."))
}

/// POST /api/post/{id}/vote
pub async fn vote_post(
    data: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
    body: web::Json<VotePayload>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    let post = found(data.repo.get_post(id).await?, "Post", id)?;
    let vote = data.repo.cast_post_vote(post.id, user.id, required_vote(&body)?).await?;
    Ok(HttpResponse::Created().json(vote))
}

/// DELETE /api/post/{id}/vote
pub async fn unvote_post(
    data: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    if !data.repo.retract_post_vote(id, user.id).await? {
        return Err(AppError::not_found("PostVote", id).into());
    }
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/comment/{id}/vote
pub async fn vote_comment(
    data: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
    body: web::Json<VotePayload>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    let comment = found(data.repo.get_comment(id).await?, "Comment", id)?;
    let vote = data.repo.cast_comment_vote(comment.id, user.id, required_vote(&body)?).await?;
    Ok(HttpResponse::Created().json(vote))
}

/// DELETE /api/comment/{id}/vote
pub async fn unvote_comment(
    data: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    if !data.repo.retract_comment_vote(id, user.id).await? {
        return Err(AppError::not_found("CommentVote", id).into());
    }
    Ok(HttpResponse::NoContent().finish())
}
