//! Who may touch what.
//!
//! Every predicate answers `Ok(true)` / `Ok(false)`; route handlers turn a
//! `false` into 403 with [`ensure`]. A missing actor, an empty route id and a
//! missing resource are errors rather than denials.

use sqlx::SqlitePool;

use crate::database::{friendship_repo, post_repo, travel_repo};
use crate::error::{AppError, AppResult};
use crate::models::FriendshipStatus;
use crate::web::middleware::auth::AuthenticatedUser;

pub fn ensure(allowed: bool) -> AppResult<()> {
    if allowed {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

fn actor_of(actor: Option<&AuthenticatedUser>) -> AppResult<&AuthenticatedUser> {
    actor.ok_or(AppError::Unauthorized)
}

fn route_id(id: &str) -> AppResult<&str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(AppError::invalid("missing id in path"));
    }
    Ok(id)
}

async fn is_owner_or_friend(
    pool: &SqlitePool,
    actor_id: &str,
    owner_id: &str,
) -> AppResult<bool> {
    if actor_id == owner_id {
        return Ok(true);
    }
    // The owner's own record decides.
    let accepted =
        friendship_repo::find_with_status(pool, owner_id, actor_id, FriendshipStatus::Accepted)
            .await?;
    Ok(accepted.is_some())
}

async fn travel_owner_id(pool: &SqlitePool, travel_id: &str) -> AppResult<String> {
    travel_repo::find_travel_owner_id(pool, travel_id)
        .await?
        .ok_or(AppError::NotFound)
}

async fn post_owner_id(pool: &SqlitePool, post_id: &str) -> AppResult<String> {
    post_repo::find_post_owner_id(pool, post_id)
        .await?
        .ok_or(AppError::NotFound)
}

pub fn owner_only(actor: Option<&AuthenticatedUser>, owner_id: &str) -> AppResult<bool> {
    let actor = actor_of(actor)?;
    let owner_id = route_id(owner_id)?;
    Ok(actor.id == owner_id)
}

pub async fn owner_or_friend(
    pool: &SqlitePool,
    actor: Option<&AuthenticatedUser>,
    owner_id: &str,
) -> AppResult<bool> {
    let actor = actor_of(actor)?;
    let owner_id = route_id(owner_id)?;
    is_owner_or_friend(pool, &actor.id, owner_id).await
}

pub async fn travel_owner(
    pool: &SqlitePool,
    actor: Option<&AuthenticatedUser>,
    travel_id: &str,
) -> AppResult<bool> {
    let actor = actor_of(actor)?;
    let owner_id = travel_owner_id(pool, route_id(travel_id)?).await?;
    Ok(actor.id == owner_id)
}

pub async fn travel_owner_or_friend(
    pool: &SqlitePool,
    actor: Option<&AuthenticatedUser>,
    travel_id: &str,
) -> AppResult<bool> {
    let actor = actor_of(actor)?;
    let owner_id = travel_owner_id(pool, route_id(travel_id)?).await?;
    is_owner_or_friend(pool, &actor.id, &owner_id).await
}

pub async fn post_owner(
    pool: &SqlitePool,
    actor: Option<&AuthenticatedUser>,
    post_id: &str,
) -> AppResult<bool> {
    let actor = actor_of(actor)?;
    let owner_id = post_owner_id(pool, route_id(post_id)?).await?;
    Ok(actor.id == owner_id)
}

pub async fn post_owner_or_friend(
    pool: &SqlitePool,
    actor: Option<&AuthenticatedUser>,
    post_id: &str,
) -> AppResult<bool> {
    let actor = actor_of(actor)?;
    let owner_id = post_owner_id(pool, route_id(post_id)?).await?;
    is_owner_or_friend(pool, &actor.id, &owner_id).await
}

/// Allows the owner of the friendship record `record_id`.
pub async fn friendship_owner(
    pool: &SqlitePool,
    actor: Option<&AuthenticatedUser>,
    record_id: &str,
) -> AppResult<bool> {
    let actor = actor_of(actor)?;
    let record = friendship_repo::find_by_id(pool, route_id(record_id)?)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(record.owner_id == actor.id)
}
