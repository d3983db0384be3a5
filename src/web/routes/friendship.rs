use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::FriendshipStatus;
use crate::services::access_service::{self, ensure};
use crate::services::friendship_service;
use crate::services::pagination::{PageRequest, PageView};
use crate::services::projection::{FriendshipView, UserPublicView};
use crate::services::validation;
use crate::state::AppState;
use crate::web::middleware::auth::AuthenticatedUser;

#[derive(Debug, Default, Deserialize)]
pub struct FriendListQuery {
    /// Comma separated, e.g. `waiting,invitation`. Empty means every status.
    pub status: Option<String>,
    pub page: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FriendSearchQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteBody {
    pub friend_id: String,
}

fn parse_statuses(raw: Option<&str>) -> AppResult<Vec<FriendshipStatus>> {
    raw.unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<FriendshipStatus>().map_err(AppError::InvalidArgument))
        .collect()
}

pub async fn list_friends_handler(
    actor: Option<Extension<AuthenticatedUser>>,
    Path(user_id): Path<String>,
    Query(query): Query<FriendListQuery>,
    State(state): State<AppState>,
) -> AppResult<Json<PageView<FriendshipView>>> {
    ensure(access_service::owner_only(actor.as_deref(), &user_id)?)?;
    let statuses = parse_statuses(query.status.as_deref())?;
    let page = PageRequest::new(query.page)?;

    Ok(Json(friendship_service::find_all_by_owner(&state.pool, &user_id, &statuses, page).await?))
}

pub async fn invite_friend_handler(
    actor: Option<Extension<AuthenticatedUser>>,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<InviteBody>,
) -> AppResult<Json<FriendshipView>> {
    ensure(access_service::owner_only(actor.as_deref(), &user_id)?)?;
    let friend_id = validation::user_id(&body.friend_id, "friendId")?;

    Ok(Json(friendship_service::invite(&state.pool, &state.locks, &user_id, &friend_id).await?))
}

pub async fn search_friends_handler(
    actor: Option<Extension<AuthenticatedUser>>,
    Path(user_id): Path<String>,
    Query(query): Query<FriendSearchQuery>,
    State(state): State<AppState>,
) -> AppResult<Json<PageView<UserPublicView>>> {
    ensure(access_service::owner_only(actor.as_deref(), &user_id)?)?;
    let page = PageRequest::new(query.page)?;

    Ok(Json(
        friendship_service::search_new(&state.pool, &user_id, query.search.as_deref(), page)
            .await?,
    ))
}

pub async fn accept_friend_handler(
    actor: Option<Extension<AuthenticatedUser>>,
    Path(friendship_id): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<FriendshipView>> {
    ensure(access_service::friendship_owner(&state.pool, actor.as_deref(), &friendship_id).await?)?;
    Ok(Json(friendship_service::accept(&state.pool, &state.locks, &friendship_id).await?))
}

pub async fn remove_friend_handler(
    actor: Option<Extension<AuthenticatedUser>>,
    Path(friendship_id): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<FriendshipView>> {
    ensure(access_service::friendship_owner(&state.pool, actor.as_deref(), &friendship_id).await?)?;
    Ok(Json(friendship_service::remove(&state.pool, &state.locks, &friendship_id).await?))
}
