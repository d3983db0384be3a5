use sqlx::SqliteExecutor;

use crate::models::{FeedPostRow, PostRow};

pub struct NewPost<'a> {
    pub id: &'a str,
    pub travel_id: &'a str,
    pub title: &'a str,
    pub destination: &'a str,
    pub description: &'a str,
}

const SQL_POST_COLUMNS: &str = r#"
SELECT
    p.id,
    p.travel_id,
    p.title,
    p.destination,
    p.description,
    p.created_at,
    t.user_id
FROM posts p
JOIN travels t ON t.id = p.travel_id
"#;

const SQL_FIND_POST_OWNER: &str = r#"
SELECT t.user_id
FROM posts p
JOIN travels t ON t.id = p.travel_id
WHERE p.id = ?1
LIMIT 1
"#;

const SQL_COUNT_BY_TRAVEL: &str = r#"
SELECT COUNT(*) FROM posts WHERE travel_id = ?1
"#;

const SQL_COUNT_BY_USER: &str = r#"
SELECT COUNT(*)
FROM posts p
JOIN travels t ON t.id = p.travel_id
WHERE t.user_id = ?1
"#;

const SQL_INSERT_POST: &str = r#"
INSERT INTO posts (
  id,
  travel_id,
  title,
  destination,
  description,
  created_at
) VALUES (?1, ?2, ?3, ?4, ?5, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
"#;

const SQL_UPDATE_POST: &str = r#"
UPDATE posts
SET title = ?2,
    destination = ?3,
    description = ?4
WHERE id = ?1
"#;

const SQL_DELETE_POST: &str = r#"
DELETE FROM posts WHERE id = ?1
"#;

/// Posts written by the user or by anyone the user holds an accepted record
/// toward, newest first.
const SQL_FEED_BASE: &str = r#"
FROM posts p
JOIN travels t ON t.id = p.travel_id
JOIN users u ON u.id = t.user_id
WHERE t.user_id = ?1
   OR t.user_id IN (
        SELECT target_id
        FROM friendships
        WHERE owner_id = ?1
          AND status = 'accepted'
   )
"#;

pub async fn find_post<'e, E>(executor: E, post_id: &str) -> sqlx::Result<Option<PostRow>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("{SQL_POST_COLUMNS} WHERE p.id = ?1 LIMIT 1");
    sqlx::query_as::<_, PostRow>(&sql)
        .bind(post_id)
        .fetch_optional(executor)
        .await
}

/// Resolves post -> travel -> owner in one query.
pub async fn find_post_owner_id<'e, E>(
    executor: E,
    post_id: &str,
) -> sqlx::Result<Option<String>>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar(SQL_FIND_POST_OWNER)
        .bind(post_id)
        .fetch_optional(executor)
        .await
}

pub async fn list_posts_by_travel<'e, E>(
    executor: E,
    travel_id: &str,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<PostRow>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!(
        "{SQL_POST_COLUMNS} WHERE p.travel_id = ?1 ORDER BY p.created_at DESC LIMIT ?2 OFFSET ?3"
    );
    sqlx::query_as::<_, PostRow>(&sql)
        .bind(travel_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await
}

pub async fn count_posts_by_travel<'e, E>(executor: E, travel_id: &str) -> sqlx::Result<i64>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar(SQL_COUNT_BY_TRAVEL)
        .bind(travel_id)
        .fetch_one(executor)
        .await
}

pub async fn count_posts_by_user<'e, E>(executor: E, user_id: &str) -> sqlx::Result<i64>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar(SQL_COUNT_BY_USER)
        .bind(user_id)
        .fetch_one(executor)
        .await
}

pub async fn list_feed<'e, E>(
    executor: E,
    user_id: &str,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<FeedPostRow>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!(
        r#"
SELECT
    p.id,
    p.travel_id,
    p.title,
    p.destination,
    p.description,
    p.created_at,
    t.title AS travel_title,
    t.description AS travel_description,
    t.destination AS travel_destination,
    t.comrades_count AS travel_comrades_count,
    t.start_at AS travel_start_at,
    t.end_at AS travel_end_at,
    u.id AS author_id,
    u.first_name AS author_first_name,
    u.last_name AS author_last_name,
    u.username AS author_username
{SQL_FEED_BASE}
ORDER BY p.created_at DESC
LIMIT ?2 OFFSET ?3
"#
    );
    sqlx::query_as::<_, FeedPostRow>(&sql)
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await
}

pub async fn count_feed<'e, E>(executor: E, user_id: &str) -> sqlx::Result<i64>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT COUNT(*) {SQL_FEED_BASE}");
    sqlx::query_scalar(&sql)
        .bind(user_id)
        .fetch_one(executor)
        .await
}

pub async fn insert_post<'e, E>(executor: E, post: NewPost<'_>) -> sqlx::Result<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(SQL_INSERT_POST)
        .bind(post.id)
        .bind(post.travel_id)
        .bind(post.title)
        .bind(post.destination)
        .bind(post.description)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn update_post<'e, E>(executor: E, post: &PostRow) -> sqlx::Result<u64>
where
    E: SqliteExecutor<'e>,
{
    let res = sqlx::query(SQL_UPDATE_POST)
        .bind(&post.id)
        .bind(&post.title)
        .bind(&post.destination)
        .bind(&post.description)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

pub async fn delete_post<'e, E>(executor: E, post_id: &str) -> sqlx::Result<u64>
where
    E: SqliteExecutor<'e>,
{
    let res = sqlx::query(SQL_DELETE_POST)
        .bind(post_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}
