use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::database::{post_repo, travel_repo};
use crate::error::{AppError, AppResult};
use crate::services::pagination::{PageRequest, PageView};
use crate::services::projection::{self, PostView};
use crate::services::validation::{self, MAX_DESCRIPTION_LEN, MAX_TITLE_LEN};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePost {
    pub title: String,
    pub destination: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePost {
    pub title: Option<String>,
    pub destination: Option<String>,
    pub description: Option<String>,
}

pub async fn create(pool: &SqlitePool, travel_id: &str, input: CreatePost) -> AppResult<PostView> {
    let title = validation::text(&input.title, "title", 1, MAX_TITLE_LEN)?;
    let destination = validation::text(&input.destination, "destination", 1, MAX_TITLE_LEN)?;
    let description = validation::text(&input.description, "description", 0, MAX_DESCRIPTION_LEN)?;

    if travel_repo::find_travel_owner_id(pool, travel_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound);
    }

    let id = Uuid::new_v4().to_string();
    post_repo::insert_post(
        pool,
        post_repo::NewPost {
            id: &id,
            travel_id,
            title: &title,
            destination: &destination,
            description: &description,
        },
    )
    .await?;

    info!(travel_id, post_id = %id, "post created");
    get(pool, &id).await
}

pub async fn get(pool: &SqlitePool, post_id: &str) -> AppResult<PostView> {
    let post = post_repo::find_post(pool, post_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(projection::post(&post))
}

pub async fn list_by_travel(
    pool: &SqlitePool,
    travel_id: &str,
    page: PageRequest,
) -> AppResult<PageView<PostView>> {
    let rows =
        post_repo::list_posts_by_travel(pool, travel_id, page.limit(), page.offset()).await?;
    let total = post_repo::count_posts_by_travel(pool, travel_id).await?;

    let posts = rows.iter().map(projection::post).collect();
    Ok(PageView::new(posts, total, &page))
}

pub async fn update(pool: &SqlitePool, post_id: &str, input: UpdatePost) -> AppResult<PostView> {
    let mut post = post_repo::find_post(pool, post_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(title) = input.title.as_deref() {
        post.title = validation::text(title, "title", 1, MAX_TITLE_LEN)?;
    }
    if let Some(destination) = input.destination.as_deref() {
        post.destination = validation::text(destination, "destination", 1, MAX_TITLE_LEN)?;
    }
    if let Some(description) = input.description.as_deref() {
        post.description = validation::text(description, "description", 0, MAX_DESCRIPTION_LEN)?;
    }

    if post_repo::update_post(pool, &post).await? == 0 {
        return Err(AppError::NotFound);
    }
    Ok(projection::post(&post))
}

pub async fn delete(pool: &SqlitePool, post_id: &str) -> AppResult<PostView> {
    let post = post_repo::find_post(pool, post_id)
        .await?
        .ok_or(AppError::NotFound)?;
    post_repo::delete_post(pool, post_id).await?;

    info!(post_id, travel_id = %post.travel_id, "post deleted");
    Ok(projection::post(&post))
}
