use sqlx::SqliteExecutor;

use crate::models::TravelRow;

pub struct NewTravel<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub destination: &'a str,
    pub comrades_count: i64,
    pub start_at: &'a str,
    pub end_at: &'a str,
}

const SQL_FIND_TRAVEL: &str = r#"
SELECT id, user_id, title, description, destination, comrades_count, start_at, end_at
FROM travels
WHERE id = ?1
LIMIT 1
"#;

const SQL_FIND_TRAVEL_OWNER: &str = r#"
SELECT user_id
FROM travels
WHERE id = ?1
LIMIT 1
"#;

const SQL_LIST_BY_USER: &str = r#"
SELECT id, user_id, title, description, destination, comrades_count, start_at, end_at
FROM travels
WHERE user_id = ?1
ORDER BY start_at DESC
LIMIT ?2 OFFSET ?3
"#;

const SQL_COUNT_BY_USER: &str = r#"
SELECT COUNT(*) FROM travels WHERE user_id = ?1
"#;

const SQL_INSERT_TRAVEL: &str = r#"
INSERT INTO travels (
  id,
  user_id,
  title,
  description,
  destination,
  comrades_count,
  start_at,
  end_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
"#;

const SQL_UPDATE_TRAVEL: &str = r#"
UPDATE travels
SET title = ?2,
    description = ?3,
    destination = ?4,
    comrades_count = ?5,
    start_at = ?6,
    end_at = ?7
WHERE id = ?1
"#;

const SQL_DELETE_TRAVEL: &str = r#"
DELETE FROM travels WHERE id = ?1
"#;

pub async fn find_travel<'e, E>(executor: E, travel_id: &str) -> sqlx::Result<Option<TravelRow>>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, TravelRow>(SQL_FIND_TRAVEL)
        .bind(travel_id)
        .fetch_optional(executor)
        .await
}

pub async fn find_travel_owner_id<'e, E>(
    executor: E,
    travel_id: &str,
) -> sqlx::Result<Option<String>>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar(SQL_FIND_TRAVEL_OWNER)
        .bind(travel_id)
        .fetch_optional(executor)
        .await
}

pub async fn list_travels_by_user<'e, E>(
    executor: E,
    user_id: &str,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<TravelRow>>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, TravelRow>(SQL_LIST_BY_USER)
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await
}

pub async fn count_travels_by_user<'e, E>(executor: E, user_id: &str) -> sqlx::Result<i64>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar(SQL_COUNT_BY_USER)
        .bind(user_id)
        .fetch_one(executor)
        .await
}

pub async fn insert_travel<'e, E>(executor: E, travel: NewTravel<'_>) -> sqlx::Result<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(SQL_INSERT_TRAVEL)
        .bind(travel.id)
        .bind(travel.user_id)
        .bind(travel.title)
        .bind(travel.description)
        .bind(travel.destination)
        .bind(travel.comrades_count)
        .bind(travel.start_at)
        .bind(travel.end_at)
        .execute(executor)
        .await?;
    Ok(())
}

/// Overwrites every editable column with the values in `travel`.
pub async fn update_travel<'e, E>(executor: E, travel: &TravelRow) -> sqlx::Result<u64>
where
    E: SqliteExecutor<'e>,
{
    let res = sqlx::query(SQL_UPDATE_TRAVEL)
        .bind(&travel.id)
        .bind(&travel.title)
        .bind(&travel.description)
        .bind(&travel.destination)
        .bind(travel.comrades_count)
        .bind(&travel.start_at)
        .bind(&travel.end_at)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

pub async fn delete_travel<'e, E>(executor: E, travel_id: &str) -> sqlx::Result<u64>
where
    E: SqliteExecutor<'e>,
{
    let res = sqlx::query(SQL_DELETE_TRAVEL)
        .bind(travel_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}
