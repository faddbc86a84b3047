use actix_web::{web, HttpRequest, HttpResponse};
use rr_core::listing::RULE_LIST;
use rr_core::models::{NewRule, Rule, RuleChanges, User};
use rr_core::permissions::{owner_or_read_only, Access};
use rr_core::validation;
use serde::Deserialize;
use std::collections::HashMap;

use super::{found, AppState};
use crate::error::{ApiError, ApiResult};
use crate::extract::{AuthUser, MaybeUser};
use crate::pagination::paginate;


#[derive(Debug, Default, Deserialize)]
pub struct RulePayload {
    pub subreddit: Option<i64>,
    pub rule: Option<String>,
    pub order: Option<i64>,
}

async fn load(data: &AppState, id: i64, actor: Option<&User>, access: Access) -> ApiResult<Rule> {
    let rule = found(data.repo.get_rule(id).await?, "Rule", id)?;
    owner_or_read_only(actor, rule.creator, access)?;
    Ok(rule)
}

/// GET /api/rules
pub async fn list(
    req: HttpRequest,
    data: web::Data<AppState>,
    _caller: MaybeUser,
    params: web::Query<HashMap<String, String>>,
) -> ApiResult<HttpResponse> {
    let query = data.list_query(&RULE_LIST, &params)?;
    let page = data.repo.list_rules(&query).await?;
    Ok(HttpResponse::Ok().json(paginate(&req, &query, page)?))
}

/// POST /api/rules
pub async fn create(
    data: web::Data<AppState>,
    AuthUser(user): AuthUser,
    body: web::Json<RulePayload>,
) -> ApiResult<HttpResponse> {
    let rule = validation::required("rule", body.rule.as_deref(), None)?;
    let order = body.order.ok_or_else(|| ApiError::bad_request("order: This field is required."))?;
    let subreddit =
        body.subreddit.ok_or_else(|| ApiError::bad_request("subreddit: This field is required."))?;
    if data.repo.get_community(subreddit).await?.is_none() {
        return Err(ApiError::bad_request(format!(
            "subreddit: Invalid pk \"{subreddit}\" - object does not exist."
        )));
    }

    let rule = data
        .repo
        .create_rule(NewRule { subreddit, rule, order, creator: user.id })
        .await?;
    Ok(HttpResponse::Created().json(rule))
}

/// GET /api/rules/{id}
pub async fn retrieve(
    data: web::Data<AppState>,
    MaybeUser(user): MaybeUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let rule = load(&data, path.into_inner(), user.as_ref(), Access::Read).await?;
    Ok(HttpResponse::Ok().json(rule))
}

/// PUT /api/rules/{id}
pub async fn update(
    data: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
    body: web::Json<RulePayload>,
) -> ApiResult<HttpResponse> {
    apply_update(&data, &user, path.into_inner(), body.into_inner(), false).await
}

/// PATCH /api/rules/{id}
pub async fn partial_update(
    data: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
    body: web::Json<RulePayload>,
) -> ApiResult<HttpResponse> {
    apply_update(&data, &user, path.into_inner(), body.into_inner(), true).await
}

async fn apply_update(
    data: &AppState,
    user: &User,
    id: i64,
    payload: RulePayload,
    partial: bool,
) -> ApiResult<HttpResponse> {
    let rule = load(data, id, Some(user), Access::Write).await?;

    let mut changes = RuleChanges::default();
    if !partial || payload.rule.is_some() {
        changes.rule = Some(validation::required("rule", payload.rule.as_deref(), None)?);
    }
    match payload.order {
        Some(order) => changes.order = Some(order),
        None if !partial => return Err(ApiError::bad_request("order: This field is required.")),
        None => {}
    }

    let updated = data.repo.update_rule(rule.id, changes).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /api/rules/{id}
pub async fn destroy(
    data: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let rule = load(&data, path.into_inner(), Some(&user), Access::Write).await?;
    data.repo.delete_rule(rule.id).await?;
    Ok(HttpResponse::NoContent().finish())
}
