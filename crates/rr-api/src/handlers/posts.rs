use actix_web::{web, HttpRequest, HttpResponse};
use rr_core::listing::POST_LIST;
use rr_core::models::{NewPost, Post, PostChanges, User};
use rr_core::permissions::{owner_or_read_only, Access};
use rr_core::validation;
use serde::Deserialize;
use std::collections::HashMap;

use super::{found, AppState};
use crate::error::{ApiError, ApiResult};
use crate::extract::{AuthUser, MaybeUser};
use crate::pagination::paginate;

const TITLE_MAX: usize = 100;
const TYPE_MAX: usize = 50;

#[derive(Debug, Default, Deserialize)]
pub struct PostPayload {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub subreddit: Option<i64>,
}

async fn load(data: &AppState, id: i64, actor: Option<&User>, access: Access) -> ApiResult<Post> {
    let post = found(data.repo.get_post(id).await?, "Post", id)?;
    owner_or_read_only(actor, post.creator, access)?;
    Ok(post)
}

/// GET /api/post
pub async fn list(
    req: HttpRequest,
    data: web::Data<AppState>,
    _caller: MaybeUser,
    params: web::Query<HashMap<String, String>>,
) -> ApiResult<HttpResponse> {
    let query = data.list_query(&POST_LIST, &params)?;
    let page = data.repo.list_posts(&query).await?;
    Ok(HttpResponse::Ok().json(paginate(&req, &query, page)?))
}

/// POST /api/post
pub async fn create(
    data: web::Data<AppState>,
    AuthUser(user): AuthUser,
    body: web::Json<PostPayload>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    let title = validation::required("title", body.title.as_deref(), Some(TITLE_MAX))?;
    let content = validation::required("content", body.content.as_deref(), None)?;
    let kind = validation::optional("type", body.kind.as_deref(), TYPE_MAX)?;
    let subreddit =
        body.subreddit.ok_or_else(|| ApiError::bad_request("subreddit: This field is required."))?;
    if data.repo.get_community(subreddit).await?.is_none() {
        return Err(ApiError::bad_request(format!(
            "subreddit: Invalid pk \"{subreddit}\" - object does not exist."
        )));
    }

    let post = data
        .repo
        .create_post(NewPost { title, content, kind, creator: user.id, subreddit })
        .await?;
    tracing::info!(post = post.id, subreddit, creator = user.id, "post created");
    Ok(HttpResponse::Created().json(post))
}

/// GET /api/post/{id}
pub async fn retrieve(
    data: web::Data<AppState>,
    MaybeUser(user): MaybeUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let post = load(&data, path.into_inner(), user.as_ref(), Access::Read).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// PUT /api/post/{id}
pub async fn update(
    data: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
    body: web::Json<PostPayload>,
) -> ApiResult<HttpResponse> {
    apply_update(&data, &user, path.into_inner(), body.into_inner(), false).await
}

/// PATCH /api/post/{id}
pub async fn partial_update(
    data: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
    body: web::Json<PostPayload>,
) -> ApiResult<HttpResponse> {
    apply_update(&data, &user, path.into_inner(), body.into_inner(), true).await
}

async fn apply_update(
    data: &AppState,
    user: &User,
    id: i64,
    payload: PostPayload,
    partial: bool,
) -> ApiResult<HttpResponse> {
    let post = load(data, id, Some(user), Access::Write).await?;

    let mut changes = PostChanges::default();
    if !partial || payload.kind.is_some() {
        changes.kind = Some(validation::optional("type", payload.kind.as_deref(), TYPE_MAX)?);
    }
    if !partial || payload.title.is_some() {
        changes.title = Some(validation::required("title", payload.title.as_deref(), Some(TITLE_MAX))?);
    }
    if !partial || payload.content.is_some() {
        changes.content = Some(validation::required("content", payload.content.as_deref(), None)?);
    }

    let updated = data.repo.update_post(post.id, changes).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /api/post/{id}
pub async fn destroy(
    data: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let post = load(&data, path.into_inner(), Some(&user), Access::Write).await?;
    data.repo.delete_post(post.id).await?;
    Ok(HttpResponse::NoContent().finish())
}
