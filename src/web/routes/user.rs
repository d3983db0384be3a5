use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::services::access_service::{self, ensure};
use crate::services::pagination::{PageRequest, PageView};
use crate::services::projection::{FeedPostView, TravelView, UserView};
use crate::services::travel_service::{self, CreateTravel};
use crate::services::user_service::{self, CreateUser, UpdateUser, UserProfileView, UserStats};
use crate::state::AppState;
use crate::web::middleware::auth::AuthenticatedUser;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
}

/// Registration. Runs without a session; the password arrives already hashed
/// by the credential service.
pub async fn create_user_handler(
    State(state): State<AppState>,
    Json(body): Json<CreateUser>,
) -> AppResult<Json<UserView>> {
    Ok(Json(user_service::create_user(&state.pool, body).await?))
}

pub async fn get_user_handler(
    actor: Option<Extension<AuthenticatedUser>>,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<UserProfileView>> {
    let actor = actor.as_deref();
    ensure(access_service::owner_or_friend(&state.pool, actor, &user_id).await?)?;

    let actor_id = actor.map(|a| a.id.as_str()).unwrap_or_default();
    Ok(Json(user_service::get_user(&state.pool, actor_id, &user_id).await?))
}

pub async fn update_user_handler(
    actor: Option<Extension<AuthenticatedUser>>,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<UpdateUser>,
) -> AppResult<Json<UserView>> {
    ensure(access_service::owner_only(actor.as_deref(), &user_id)?)?;
    Ok(Json(user_service::update_user(&state.pool, &user_id, body).await?))
}

pub async fn delete_user_handler(
    actor: Option<Extension<AuthenticatedUser>>,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<UserView>> {
    ensure(access_service::owner_only(actor.as_deref(), &user_id)?)?;
    Ok(Json(user_service::delete_user(&state.pool, &user_id).await?))
}

pub async fn user_stats_handler(
    actor: Option<Extension<AuthenticatedUser>>,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<UserStats>> {
    ensure(access_service::owner_only(actor.as_deref(), &user_id)?)?;
    Ok(Json(user_service::stats(&state.pool, &user_id).await?))
}

pub async fn user_feed_handler(
    actor: Option<Extension<AuthenticatedUser>>,
    Path(user_id): Path<String>,
    Query(query): Query<PageQuery>,
    State(state): State<AppState>,
) -> AppResult<Json<PageView<FeedPostView>>> {
    ensure(access_service::owner_only(actor.as_deref(), &user_id)?)?;
    let page = PageRequest::new(query.page)?;
    Ok(Json(user_service::feed(&state.pool, &user_id, page).await?))
}

pub async fn list_travels_handler(
    actor: Option<Extension<AuthenticatedUser>>,
    Path(user_id): Path<String>,
    Query(query): Query<PageQuery>,
    State(state): State<AppState>,
) -> AppResult<Json<PageView<TravelView>>> {
    ensure(access_service::owner_or_friend(&state.pool, actor.as_deref(), &user_id).await?)?;
    let page = PageRequest::new(query.page)?;
    Ok(Json(travel_service::list_by_user(&state.pool, &user_id, page).await?))
}

pub async fn create_travel_handler(
    actor: Option<Extension<AuthenticatedUser>>,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<CreateTravel>,
) -> AppResult<Json<TravelView>> {
    ensure(access_service::owner_only(actor.as_deref(), &user_id)?)?;
    Ok(Json(travel_service::create(&state.pool, &user_id, body).await?))
}
