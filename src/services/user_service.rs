use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::database::{self, post_repo, travel_repo, user_repo};
use crate::error::{AppError, AppResult};
use crate::services::pagination::{PageRequest, PageView};
use crate::services::projection::{self, FeedPostView, UserPublicView, UserView};
use crate::services::validation::{self, MAX_DESCRIPTION_LEN, MAX_NAME_LEN, MIN_NAME_LEN};

/// A user as shown to whoever asked: the owner gets contact fields, friends
/// get the public view.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UserProfileView {
    Own(UserView),
    Public(UserPublicView),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    /// Already hashed by the credential service.
    pub hash_pwd: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub travels_count: i64,
    pub posts_count: i64,
}

pub async fn get_user(
    pool: &SqlitePool,
    actor_id: &str,
    user_id: &str,
) -> AppResult<UserProfileView> {
    let user = user_repo::find_user_by_id(pool, user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if user.id == actor_id {
        Ok(UserProfileView::Own(projection::user_self(&user)))
    } else {
        Ok(UserProfileView::Public(projection::user_public(&user)))
    }
}

pub async fn create_user(pool: &SqlitePool, input: CreateUser) -> AppResult<UserView> {
    let first_name = validation::text(&input.first_name, "firstName", MIN_NAME_LEN, MAX_NAME_LEN)?;
    let last_name = validation::text(&input.last_name, "lastName", MIN_NAME_LEN, MAX_NAME_LEN)?;
    let username = validation::text(&input.username, "username", MIN_NAME_LEN, MAX_NAME_LEN)?;
    let email = input.email.trim().to_lowercase();
    if !email.contains('@') || email.chars().count() > MAX_NAME_LEN * 2 {
        return Err(AppError::invalid("email is not valid"));
    }
    if input.hash_pwd.is_empty() {
        return Err(AppError::invalid("password hash is empty"));
    }

    let mut tx = database::begin_write(pool).await?;
    for (column, value) in [
        (user_repo::UniqueColumn::Email, email.as_str()),
        (user_repo::UniqueColumn::Username, username.as_str()),
    ] {
        if !user_repo::is_field_unique(&mut *tx, column, value).await? {
            return Err(AppError::Conflict(format!("{} already in use", column.as_str())));
        }
    }

    let id = Uuid::new_v4().to_string();
    user_repo::insert_user(
        &mut *tx,
        user_repo::NewUser {
            id: &id,
            first_name: &first_name,
            last_name: &last_name,
            username: &username,
            email: &email,
            hash_pwd: &input.hash_pwd,
        },
    )
    .await?;
    let user = user_repo::find_user_by_id(&mut *tx, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    tx.commit().await?;

    info!(user_id = %id, "user created");
    Ok(projection::user_self(&user))
}

pub async fn update_user(
    pool: &SqlitePool,
    user_id: &str,
    input: UpdateUser,
) -> AppResult<UserView> {
    let first_name = input
        .first_name
        .as_deref()
        .map(|v| validation::text(v, "firstName", MIN_NAME_LEN, MAX_NAME_LEN))
        .transpose()?;
    let last_name = input
        .last_name
        .as_deref()
        .map(|v| validation::text(v, "lastName", MIN_NAME_LEN, MAX_NAME_LEN))
        .transpose()?;
    let bio = input
        .bio
        .as_deref()
        .map(|v| validation::text(v, "bio", 0, MAX_DESCRIPTION_LEN))
        .transpose()?;

    let updated = user_repo::update_user(
        pool,
        user_id,
        user_repo::UserPatch {
            first_name: first_name.as_deref(),
            last_name: last_name.as_deref(),
            bio: bio.as_deref(),
        },
    )
    .await?;
    if updated == 0 {
        return Err(AppError::NotFound);
    }

    let user = user_repo::find_user_by_id(pool, user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(projection::user_self(&user))
}

/// Deletes the account and returns what it looked like to its owner.
pub async fn delete_user(pool: &SqlitePool, user_id: &str) -> AppResult<UserView> {
    let mut tx = database::begin_write(pool).await?;
    let user = user_repo::find_user_by_id(&mut *tx, user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    user_repo::delete_user(&mut *tx, &user.id).await?;
    tx.commit().await?;

    info!(user_id, "user deleted");
    Ok(projection::user_self(&user))
}

pub async fn stats(pool: &SqlitePool, user_id: &str) -> AppResult<UserStats> {
    if !user_repo::user_exists(pool, user_id).await? {
        return Err(AppError::NotFound);
    }
    Ok(UserStats {
        travels_count: travel_repo::count_travels_by_user(pool, user_id).await?,
        posts_count: post_repo::count_posts_by_user(pool, user_id).await?,
    })
}

/// The user's own posts and those of accepted friends, newest first.
pub async fn feed(
    pool: &SqlitePool,
    user_id: &str,
    page: PageRequest,
) -> AppResult<PageView<FeedPostView>> {
    let rows = post_repo::list_feed(pool, user_id, page.limit(), page.offset()).await?;
    let total = post_repo::count_feed(pool, user_id).await?;

    let posts = rows.iter().map(projection::feed_post).collect();
    Ok(PageView::new(posts, total, &page))
}

/// Ends the current session: the stored token id no longer resolves.
pub async fn end_session(pool: &SqlitePool, user_id: &str) -> AppResult<()> {
    user_repo::set_jwt_id(pool, user_id, None).await?;
    info!(user_id, "session ended");
    Ok(())
}
