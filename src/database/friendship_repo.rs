//! Single-record persistence for directed friendship records.
//!
//! Nothing here knows about pairs. Keeping both halves of a friendship in step
//! is the job of `services::friendship_service`, which runs these primitives on
//! one connection inside a transaction.

use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};

use crate::models::{FriendshipRow, FriendshipStatus, FriendshipWithFriendRow};

pub struct NewFriendship<'a> {
    pub id: &'a str,
    pub owner_id: &'a str,
    pub target_id: &'a str,
    pub status: FriendshipStatus,
}

const SQL_FIND_BY_ID: &str = r#"
SELECT id, owner_id, target_id, status
FROM friendships
WHERE id = ?1
LIMIT 1
"#;

const SQL_FIND_BY_PAIR: &str = r#"
SELECT id, owner_id, target_id, status
FROM friendships
WHERE owner_id = ?1
  AND target_id = ?2
LIMIT 1
"#;

const SQL_FIND_WITH_STATUS: &str = r#"
SELECT id, owner_id, target_id, status
FROM friendships
WHERE owner_id = ?1
  AND target_id = ?2
  AND status = ?3
LIMIT 1
"#;

const SQL_INSERT_FRIENDSHIP: &str = r#"
INSERT INTO friendships (
  id,
  owner_id,
  target_id,
  status
) VALUES (?1, ?2, ?3, ?4)
"#;

const SQL_UPDATE_STATUS: &str = r#"
UPDATE friendships
SET status = ?2
WHERE id = ?1
"#;

const SQL_DELETE_FRIENDSHIP: &str = r#"
DELETE FROM friendships
WHERE id = ?1
"#;

const SQL_LIST_ORPHANS: &str = r#"
SELECT f.id, f.owner_id, f.target_id, f.status
FROM friendships f
LEFT JOIN friendships r ON (
  r.owner_id = f.target_id
  AND r.target_id = f.owner_id
)
WHERE r.id IS NULL
ORDER BY f.owner_id, f.target_id
"#;

pub async fn find_by_id<'e, E>(executor: E, id: &str) -> sqlx::Result<Option<FriendshipRow>>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, FriendshipRow>(SQL_FIND_BY_ID)
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn find_by_pair<'e, E>(
    executor: E,
    owner_id: &str,
    target_id: &str,
) -> sqlx::Result<Option<FriendshipRow>>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, FriendshipRow>(SQL_FIND_BY_PAIR)
        .bind(owner_id)
        .bind(target_id)
        .fetch_optional(executor)
        .await
}

/// The record owned by `owner_id` targeting `target_id`, only if it has `status`.
pub async fn find_with_status<'e, E>(
    executor: E,
    owner_id: &str,
    target_id: &str,
    status: FriendshipStatus,
) -> sqlx::Result<Option<FriendshipRow>>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, FriendshipRow>(SQL_FIND_WITH_STATUS)
        .bind(owner_id)
        .bind(target_id)
        .bind(status)
        .fetch_optional(executor)
        .await
}

pub async fn insert<'e, E>(executor: E, record: NewFriendship<'_>) -> sqlx::Result<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(SQL_INSERT_FRIENDSHIP)
        .bind(record.id)
        .bind(record.owner_id)
        .bind(record.target_id)
        .bind(record.status)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn update_status<'e, E>(
    executor: E,
    id: &str,
    status: FriendshipStatus,
) -> sqlx::Result<u64>
where
    E: SqliteExecutor<'e>,
{
    let res = sqlx::query(SQL_UPDATE_STATUS)
        .bind(id)
        .bind(status)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

pub async fn delete<'e, E>(executor: E, id: &str) -> sqlx::Result<u64>
where
    E: SqliteExecutor<'e>,
{
    let res = sqlx::query(SQL_DELETE_FRIENDSHIP)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

fn push_owner_filter<'a>(
    qb: &mut QueryBuilder<'a, Sqlite>,
    owner_id: &'a str,
    statuses: &'a [FriendshipStatus],
) {
    qb.push(" WHERE f.owner_id = ").push_bind(owner_id);
    qb.push(" AND f.status IN (");
    let mut separated = qb.separated(", ");
    for status in statuses {
        separated.push_bind(*status);
    }
    separated.push_unseparated(")");
}

/// Owner-side records in any of `statuses`, joined with the target's public fields.
///
/// `statuses` must not be empty.
pub async fn list_by_owner<'e, E>(
    executor: E,
    owner_id: &str,
    statuses: &[FriendshipStatus],
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<FriendshipWithFriendRow>>
where
    E: SqliteExecutor<'e>,
{
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        r#"
SELECT
    f.id,
    f.owner_id,
    f.target_id,
    f.status,
    u.first_name AS friend_first_name,
    u.last_name AS friend_last_name,
    u.username AS friend_username
FROM friendships f
JOIN users u ON u.id = f.target_id"#,
    );
    push_owner_filter(&mut qb, owner_id, statuses);
    qb.push(" ORDER BY u.username LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    qb.build_query_as::<FriendshipWithFriendRow>()
        .fetch_all(executor)
        .await
}

pub async fn count_by_owner<'e, E>(
    executor: E,
    owner_id: &str,
    statuses: &[FriendshipStatus],
) -> sqlx::Result<i64>
where
    E: SqliteExecutor<'e>,
{
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT COUNT(*) FROM friendships f JOIN users u ON u.id = f.target_id",
    );
    push_owner_filter(&mut qb, owner_id, statuses);

    qb.build_query_scalar::<i64>().fetch_one(executor).await
}

/// Records whose reverse half does not exist.
pub async fn list_orphans<'e, E>(executor: E) -> sqlx::Result<Vec<FriendshipRow>>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, FriendshipRow>(SQL_LIST_ORPHANS)
        .fetch_all(executor)
        .await
}
