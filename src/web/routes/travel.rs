use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};

use crate::error::AppResult;
use crate::services::access_service::{self, ensure};
use crate::services::pagination::{PageRequest, PageView};
use crate::services::post_service::{self, CreatePost};
use crate::services::projection::{PostView, TravelView};
use crate::services::travel_service::{self, UpdateTravel};
use crate::state::AppState;
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::user::PageQuery;

pub async fn get_travel_handler(
    actor: Option<Extension<AuthenticatedUser>>,
    Path(travel_id): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<TravelView>> {
    ensure(
        access_service::travel_owner_or_friend(&state.pool, actor.as_deref(), &travel_id).await?,
    )?;
    Ok(Json(travel_service::get(&state.pool, &travel_id).await?))
}

pub async fn update_travel_handler(
    actor: Option<Extension<AuthenticatedUser>>,
    Path(travel_id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<UpdateTravel>,
) -> AppResult<Json<TravelView>> {
    ensure(access_service::travel_owner(&state.pool, actor.as_deref(), &travel_id).await?)?;
    Ok(Json(travel_service::update(&state.pool, &travel_id, body).await?))
}

pub async fn delete_travel_handler(
    actor: Option<Extension<AuthenticatedUser>>,
    Path(travel_id): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<TravelView>> {
    ensure(access_service::travel_owner(&state.pool, actor.as_deref(), &travel_id).await?)?;
    Ok(Json(travel_service::delete(&state.pool, &travel_id).await?))
}

pub async fn list_posts_handler(
    actor: Option<Extension<AuthenticatedUser>>,
    Path(travel_id): Path<String>,
    Query(query): Query<PageQuery>,
    State(state): State<AppState>,
) -> AppResult<Json<PageView<PostView>>> {
    ensure(
        access_service::travel_owner_or_friend(&state.pool, actor.as_deref(), &travel_id).await?,
    )?;
    let page = PageRequest::new(query.page)?;
    Ok(Json(post_service::list_by_travel(&state.pool, &travel_id, page).await?))
}

pub async fn create_post_handler(
    actor: Option<Extension<AuthenticatedUser>>,
    Path(travel_id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<CreatePost>,
) -> AppResult<Json<PostView>> {
    ensure(access_service::travel_owner(&state.pool, actor.as_deref(), &travel_id).await?)?;
    Ok(Json(post_service::create(&state.pool, &travel_id, body).await?))
}
