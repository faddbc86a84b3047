//! Subreddit catalog: CRUD, image upload, subscriptions and moderators.

use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use rr_core::error::AppError;
use rr_core::listing::{Page, COMMUNITY_LIST};
use rr_core::models::{Community, CommunityChanges, NewCommunity, User};
use rr_core::permissions::{owner_or_read_only, Access};
use rr_core::validation;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{found, AppState};
use crate::error::{ApiError, ApiResult};
use crate::extract::{AuthUser, MaybeUser};
use crate::pagination::paginate;

const NAME_MAX: usize = 100;
const TYPE_MAX: usize = 50;

#[derive(Debug, Default, Deserialize)]
pub struct CommunityPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ModeratorPayload {
    pub user: Option<i64>,
}

/// A community as rendered by the API, with its members and a public image URL.
#[derive(Debug, Serialize)]
pub struct CommunityResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub creator: i64,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub image: Option<String>,
    pub subscribers: Vec<i64>,
    pub moderators: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

async fn render(data: &AppState, community: Community) -> ApiResult<CommunityResponse> {
    let members = data.repo.members(community.id).await?;
    Ok(CommunityResponse {
        id: community.id,
        name: community.name,
        description: community.description,
        creator: community.creator,
        kind: community.kind,
        image: community.image.as_deref().map(|id| data.store.get_url(id)),
        subscribers: members.subscribers,
        moderators: members.moderators,
        created_at: community.created_at,
        updated_at: community.updated_at,
    })
}

async fn load(data: &AppState, id: i64, actor: Option<&User>, access: Access) -> ApiResult<Community> {
    let community = found(data.repo.get_community(id).await?, "Subreddit", id)?;
    owner_or_read_only(actor, community.creator, access)?;
    Ok(community)
}

/// PUT needs every required field; PATCH validates only what was sent.
fn changes(payload: CommunityPayload, partial: bool) -> ApiResult<CommunityChanges> {
    let field = |name: &str, value: Option<String>, max: Option<usize>| -> ApiResult<Option<String>> {
        if partial && value.is_none() {
            return Ok(None);
        }
        Ok(Some(validation::required(name, value.as_deref(), max)?))
    };
    Ok(CommunityChanges {
        name: field("name", payload.name, Some(NAME_MAX))?,
        description: field("description", payload.description, None)?,
        kind: match payload.kind {
            None if partial => None,
            kind => Some(validation::optional("type", kind.as_deref(), TYPE_MAX)?),
        },
    })
}

/// GET /api/subreddit
pub async fn list(
    req: HttpRequest,
    data: web::Data<AppState>,
    _caller: MaybeUser,
    params: web::Query<HashMap<String, String>>,
) -> ApiResult<HttpResponse> {
    let query = data.list_query(&COMMUNITY_LIST, &params)?;
    let page = data.repo.list_communities(&query).await?;
    let mut results = Vec::with_capacity(page.items.len());
    for community in page.items {
        results.push(render(&data, community).await?);
    }
    let page = Page { items: results, total: page.total };
    Ok(HttpResponse::Ok().json(paginate(&req, &query, page)?))
}

/// POST /api/subreddit
pub async fn create(
    data: web::Data<AppState>,
    AuthUser(user): AuthUser,
    body: web::Json<CommunityPayload>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    let community = data
        .repo
        .create_community(NewCommunity {
            name: validation::required("name", body.name.as_deref(), Some(NAME_MAX))?,
            description: validation::required("description", body.description.as_deref(), None)?,
            kind: validation::optional("type", body.kind.as_deref(), TYPE_MAX)?,
            creator: user.id,
        })
        .await?;
    tracing::info!(community = community.id, creator = user.id, name = %community.name, "subreddit created");
    Ok(HttpResponse::Created().json(render(&data, community).await?))
}

/// GET /api/subreddit/{id}
pub async fn retrieve(
    data: web::Data<AppState>,
    MaybeUser(user): MaybeUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let community = load(&data, path.into_inner(), user.as_ref(), Access::Read).await?;
    Ok(HttpResponse::Ok().json(render(&data, community).await?))
}

/// PUT /api/subreddit/{id}
pub async fn update(
    data: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
    body: web::Json<CommunityPayload>,
) -> ApiResult<HttpResponse> {
    apply_update(&data, &user, path.into_inner(), body.into_inner(), false).await
}

/// PATCH /api/subreddit/{id}
pub async fn partial_update(
    data: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
    body: web::Json<CommunityPayload>,
) -> ApiResult<HttpResponse> {
    apply_update(&data, &user, path.into_inner(), body.into_inner(), true).await
}

async fn apply_update(
    data: &AppState,
    user: &User,
    id: i64,
    payload: CommunityPayload,
    partial: bool,
) -> ApiResult<HttpResponse> {
    let community = load(data, id, Some(user), Access::Write).await?;
    let updated = data.repo.update_community(community.id, changes(payload, partial)?).await?;
    Ok(HttpResponse::Ok().json(render(data, updated).await?))
}

/// DELETE /api/subreddit/{id}
pub async fn destroy(
    data: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let community = load(&data, path.into_inner(), Some(&user), Access::Write).await?;
    data.repo.delete_community(community.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

fn bad_multipart(err: actix_multipart::MultipartError) -> ApiError {
    ApiError::bad_request(format!("image: {err}"))
}

/// PUT /api/subreddit/{id}/image (multipart field `image`)
pub async fn upload_image(
    data: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
    mut payload: Multipart,
) -> ApiResult<HttpResponse> {
    let community = load(&data, path.into_inner(), Some(&user), Access::Write).await?;
    let max = data.options.max_image_bytes;

    let mut upload: Option<(Vec<u8>, String)> = None;
    while let Some(mut field) = payload.try_next().await.map_err(bad_multipart)? {
        if field.name() != Some("image") {
            while field.try_next().await.map_err(bad_multipart)?.is_some() {}
            continue;
        }
        let content_type = field.content_type().map(|m| m.to_string()).unwrap_or_default();
        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(bad_multipart)? {
            if bytes.len() + chunk.len() > max {
                return Err(ApiError::bad_request(format!(
                    "image: File too large. The limit is {max} bytes."
                )));
            }
            bytes.extend_from_slice(&chunk);
        }
        upload = Some((bytes, content_type));
    }

    let (bytes, content_type) =
        upload.ok_or_else(|| ApiError::bad_request("image: No file was submitted."))?;
    if bytes.is_empty() {
        return Err(ApiError::bad_request("image: The submitted file is empty."));
    }

    let media_id = data.store.save_upload(bytes, &content_type).await?;
    let updated = data.repo.set_community_image(community.id, &media_id).await?;
    tracing::info!(community = community.id, media_id = %media_id, "subreddit image updated");
    Ok(HttpResponse::Ok().json(render(&data, updated).await?))
}

/// POST /api/subreddit/{id}/subscribe
pub async fn subscribe(
    data: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let community = load(&data, path.into_inner(), Some(&user), Access::Read).await?;
    let subscription = data.repo.subscribe(community.id, user.id).await?;
    Ok(HttpResponse::Created().json(subscription))
}

/// DELETE /api/subreddit/{id}/subscribe
pub async fn unsubscribe(
    data: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let community = load(&data, path.into_inner(), Some(&user), Access::Read).await?;
    if !data.repo.unsubscribe(community.id, user.id).await? {
        return Err(AppError::not_found("Subscription", community.id).into());
    }
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/subreddit/{id}/moderators
pub async fn add_moderator(
    data: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
    body: web::Json<ModeratorPayload>,
) -> ApiResult<HttpResponse> {
    let community = load(&data, path.into_inner(), Some(&user), Access::Write).await?;
    let target = body.user.ok_or_else(|| ApiError::bad_request("user: This field is required."))?;
    if data.repo.get_user(target).await?.is_none() {
        return Err(ApiError::bad_request(format!(
            "user: Invalid pk \"{target}\" - object does not exist."
        )));
    }
    let moderator = data.repo.add_moderator(community.id, target).await?;
    Ok(HttpResponse::Created().json(moderator))
}

/// DELETE /api/subreddit/{id}/moderators/{user_id}
pub async fn remove_moderator(
    data: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<(i64, i64)>,
) -> ApiResult<HttpResponse> {
    let (id, target) = path.into_inner();
    let community = load(&data, id, Some(&user), Access::Write).await?;
    if !data.repo.remove_moderator(community.id, target).await? {
        return Err(AppError::not_found("Moderator", target).into());
    }
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_requires_name_and_description() {
        let err = changes(CommunityPayload { name: Some("rust".into()), ..Default::default() }, false)
            .unwrap_err();
        assert_eq!(err.message(), "description: This field is required.");
    }

    #[test]
    fn patch_only_touches_sent_fields() {
        let c = changes(CommunityPayload { description: Some(" new ".into()), ..Default::default() }, true)
            .unwrap();
        assert_eq!(c, CommunityChanges { description: Some("new".into()), ..Default::default() });
    }

    #[test]
    fn put_without_type_clears_it() {
        let payload = CommunityPayload {
            name: Some("rust".into()),
            description: Some("d".into()),
            kind: None,
        };
        assert_eq!(changes(payload, false).unwrap().kind, Some(None));
    }

    #[test]
    fn long_names_are_rejected() {
        let payload = CommunityPayload {
            name: Some("x".repeat(NAME_MAX + 1)),
            description: Some("d".into()),
            kind: None,
        };
        assert!(changes(payload, false).is_err());
    }
}
