use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::error::AppResult;
use crate::services::access_service::{self, ensure};
use crate::services::post_service::{self, UpdatePost};
use crate::services::projection::PostView;
use crate::state::AppState;
use crate::web::middleware::auth::AuthenticatedUser;

pub async fn get_post_handler(
    actor: Option<Extension<AuthenticatedUser>>,
    Path(post_id): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<PostView>> {
    ensure(access_service::post_owner_or_friend(&state.pool, actor.as_deref(), &post_id).await?)?;
    Ok(Json(post_service::get(&state.pool, &post_id).await?))
}

pub async fn update_post_handler(
    actor: Option<Extension<AuthenticatedUser>>,
    Path(post_id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<UpdatePost>,
) -> AppResult<Json<PostView>> {
    ensure(access_service::post_owner(&state.pool, actor.as_deref(), &post_id).await?)?;
    Ok(Json(post_service::update(&state.pool, &post_id, body).await?))
}

pub async fn delete_post_handler(
    actor: Option<Extension<AuthenticatedUser>>,
    Path(post_id): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<PostView>> {
    ensure(access_service::post_owner(&state.pool, actor.as_deref(), &post_id).await?)?;
    Ok(Json(post_service::delete(&state.pool, &post_id).await?))
}
