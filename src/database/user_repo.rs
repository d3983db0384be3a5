use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};

use crate::models::UsersRow;

pub struct NewUser<'a> {
    pub id: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub hash_pwd: &'a str,
}

pub struct UserPatch<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub bio: Option<&'a str>,
}

const SQL_USER_COLUMNS: &str = r#"
SELECT
    id,
    first_name,
    last_name,
    username,
    email,
    bio,
    hash_pwd,
    jwt_id
FROM users
"#;

const SQL_INSERT_USER: &str = r#"
INSERT INTO users (
  id,
  first_name,
  last_name,
  username,
  email,
  hash_pwd
) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

const SQL_UPDATE_USER: &str = r#"
UPDATE users
SET first_name = COALESCE(?2, first_name),
    last_name  = COALESCE(?3, last_name),
    bio        = COALESCE(?4, bio)
WHERE id = ?1
"#;

const SQL_SET_JWT_ID: &str = r#"
UPDATE users SET jwt_id = ?2 WHERE id = ?1
"#;

const SQL_DELETE_USER: &str = r#"
DELETE FROM users WHERE id = ?1
"#;

const SQL_USER_EXISTS: &str = r#"
SELECT COUNT(*) FROM users WHERE id = ?1
"#;

/// Shared `WHERE` for the new-friend search: substring match on the handle and
/// names, never the actor, never anyone already related to the actor.
const SQL_SEARCH_FILTER: &str = r#"
WHERE (
    instr(lower(u.username), lower(?1)) > 0
    OR instr(lower(u.first_name), lower(?1)) > 0
    OR instr(lower(u.last_name), lower(?1)) > 0
)
  AND u.id <> ?2
  AND u.id NOT IN (SELECT target_id FROM friendships WHERE owner_id = ?2)
  AND u.id NOT IN (SELECT owner_id FROM friendships WHERE target_id = ?2)
"#;

pub async fn find_user_by_id<'e, E>(executor: E, user_id: &str) -> sqlx::Result<Option<UsersRow>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("{SQL_USER_COLUMNS} WHERE id = ?1 LIMIT 1");
    sqlx::query_as::<_, UsersRow>(&sql)
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

pub async fn find_user_by_jwt_id<'e, E>(
    executor: E,
    jwt_id: &str,
) -> sqlx::Result<Option<UsersRow>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("{SQL_USER_COLUMNS} WHERE jwt_id = ?1 LIMIT 1");
    sqlx::query_as::<_, UsersRow>(&sql)
        .bind(jwt_id)
        .fetch_optional(executor)
        .await
}

pub async fn user_exists<'e, E>(executor: E, user_id: &str) -> sqlx::Result<bool>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar(SQL_USER_EXISTS)
        .bind(user_id)
        .fetch_one(executor)
        .await?;
    Ok(count > 0)
}

/// Returns true when no user has `value` in `column`.
pub async fn is_field_unique<'e, E>(
    executor: E,
    column: UniqueColumn,
    value: &str,
) -> sqlx::Result<bool>
where
    E: SqliteExecutor<'e>,
{
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM users WHERE ");
    qb.push(column.as_str()).push(" = ").push_bind(value);
    let count = qb.build_query_scalar::<i64>().fetch_one(executor).await?;
    Ok(count == 0)
}

#[derive(Debug, Clone, Copy)]
pub enum UniqueColumn {
    Email,
    Username,
}

impl UniqueColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            UniqueColumn::Email => "email",
            UniqueColumn::Username => "username",
        }
    }
}

pub async fn insert_user<'e, E>(executor: E, user: NewUser<'_>) -> sqlx::Result<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(SQL_INSERT_USER)
        .bind(user.id)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.username)
        .bind(user.email)
        .bind(user.hash_pwd)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn update_user<'e, E>(
    executor: E,
    user_id: &str,
    patch: UserPatch<'_>,
) -> sqlx::Result<u64>
where
    E: SqliteExecutor<'e>,
{
    let res = sqlx::query(SQL_UPDATE_USER)
        .bind(user_id)
        .bind(patch.first_name)
        .bind(patch.last_name)
        .bind(patch.bio)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

pub async fn search_unrelated_users<'e, E>(
    executor: E,
    term: &str,
    actor_id: &str,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<UsersRow>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!(
        r#"
SELECT u.id, u.first_name, u.last_name, u.username, u.email, u.bio, u.hash_pwd, u.jwt_id
FROM users u
{SQL_SEARCH_FILTER}
ORDER BY u.username
LIMIT ?3 OFFSET ?4
"#
    );
    sqlx::query_as::<_, UsersRow>(&sql)
        .bind(term)
        .bind(actor_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await
}

pub async fn count_unrelated_users<'e, E>(
    executor: E,
    term: &str,
    actor_id: &str,
) -> sqlx::Result<i64>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT COUNT(*) FROM users u {SQL_SEARCH_FILTER}");
    sqlx::query_scalar(&sql)
        .bind(term)
        .bind(actor_id)
        .fetch_one(executor)
        .await
}

/// Binds the session token id the auth middleware resolves users by.
/// `None` ends the session.
pub async fn set_jwt_id<'e, E>(
    executor: E,
    user_id: &str,
    jwt_id: Option<&str>,
) -> sqlx::Result<u64>
where
    E: SqliteExecutor<'e>,
{
    let res = sqlx::query(SQL_SET_JWT_ID)
        .bind(user_id)
        .bind(jwt_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

/// Deletes the user. Friendships in both directions, travels and their posts
/// go with it through `ON DELETE CASCADE`.
pub async fn delete_user<'e, E>(executor: E, user_id: &str) -> sqlx::Result<u64>
where
    E: SqliteExecutor<'e>,
{
    let res = sqlx::query(SQL_DELETE_USER)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}
