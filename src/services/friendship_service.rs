//! The friendship state machine.
//!
//! A friendship between U and V is stored as two directed records, (U -> V)
//! and (V -> U). Every operation that writes them goes through this module:
//! it takes the pair lock, opens a transaction, resolves both halves with the
//! two-sided lookup and writes both before committing.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::database::{self, friendship_repo, user_repo};
use crate::error::{AppError, AppResult};
use crate::models::{FriendshipRow, FriendshipStatus};
use crate::services::pagination::{PageRequest, PageView};
use crate::services::pair_locks::PairLocks;
use crate::services::projection::{self, FriendshipView, UserPublicView};

pub const MIN_SEARCH_LEN: usize = 2;
pub const MAX_SEARCH_LEN: usize = 64;

/// Both halves of one friendship. `forward` is the half that was asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendshipPair {
    pub forward: FriendshipRow,
    pub reverse: FriendshipRow,
}

/// Looks up (owner -> target) and (target -> owner).
///
/// Both present is a friendship, neither present is no friendship, and exactly
/// one present is a corrupt pair reported as `InconsistentState`.
pub async fn two_sided_by_ids(
    conn: &mut SqliteConnection,
    owner_id: &str,
    target_id: &str,
) -> AppResult<Option<FriendshipPair>> {
    let forward = friendship_repo::find_by_pair(&mut *conn, owner_id, target_id).await?;
    let reverse = friendship_repo::find_by_pair(&mut *conn, target_id, owner_id).await?;

    match (forward, reverse) {
        (Some(forward), Some(reverse)) => Ok(Some(FriendshipPair { forward, reverse })),
        (None, None) => Ok(None),
        (forward, reverse) => {
            let forward_id = forward.map(|r| r.id);
            let reverse_id = reverse.map(|r| r.id);
            error!(
                owner_id,
                target_id,
                forward_id = ?forward_id,
                reverse_id = ?reverse_id,
                "data integrity alarm: incomplete friendship"
            );
            Err(AppError::InconsistentState {
                forward_id,
                reverse_id,
            })
        }
    }
}

/// Resolves the record with `record_id` and its counterpart.
///
/// `Ok(None)` when the record itself does not exist.
pub async fn two_sided_by_id(
    conn: &mut SqliteConnection,
    record_id: &str,
) -> AppResult<Option<FriendshipPair>> {
    let Some(record) = friendship_repo::find_by_id(&mut *conn, record_id).await? else {
        return Ok(None);
    };
    two_sided_by_ids(conn, &record.owner_id, &record.target_id).await
}

fn require_id<'a>(value: &'a str, name: &str) -> AppResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::invalid(format!("{name} is empty")));
    }
    Ok(value)
}

fn conflict_on_unique(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict("friendship already exists".to_string())
        }
        _ => AppError::Database(e),
    }
}

/// `owner_id` invites `target_id`.
///
/// Inserts the owner half as `Waiting` and the target half as `Invitation` and
/// returns the owner half.
pub async fn invite(
    pool: &SqlitePool,
    locks: &PairLocks,
    owner_id: &str,
    target_id: &str,
) -> AppResult<FriendshipView> {
    let owner_id = require_id(owner_id, "owner id")?;
    let target_id = require_id(target_id, "target id")?;
    if owner_id == target_id {
        return Err(AppError::invalid("cannot invite yourself"));
    }

    let _pair = locks.lock(owner_id, target_id).await;
    let mut tx = database::begin_write(pool).await?;

    if two_sided_by_ids(&mut tx, owner_id, target_id).await?.is_some() {
        return Err(AppError::Conflict("friendship already exists".to_string()));
    }

    let owner_exists = user_repo::user_exists(&mut *tx, owner_id).await?;
    let Some(target) = user_repo::find_user_by_id(&mut *tx, target_id).await? else {
        return Err(AppError::NotFound);
    };
    if !owner_exists {
        return Err(AppError::NotFound);
    }

    let forward = FriendshipRow {
        id: Uuid::new_v4().to_string(),
        owner_id: owner_id.to_string(),
        target_id: target_id.to_string(),
        status: FriendshipStatus::Waiting,
    };
    let reverse_id = Uuid::new_v4().to_string();

    friendship_repo::insert(
        &mut *tx,
        friendship_repo::NewFriendship {
            id: &forward.id,
            owner_id,
            target_id,
            status: FriendshipStatus::Waiting,
        },
    )
    .await
    .map_err(conflict_on_unique)?;
    friendship_repo::insert(
        &mut *tx,
        friendship_repo::NewFriendship {
            id: &reverse_id,
            owner_id: target_id,
            target_id: owner_id,
            status: FriendshipStatus::Invitation,
        },
    )
    .await
    .map_err(conflict_on_unique)?;

    tx.commit().await?;
    info!(owner_id, target_id, friendship_id = %forward.id, "friendship invitation created");

    Ok(projection::friendship(&forward, &target))
}

/// Accepts the invitation held in record `record_id`.
///
/// Only the invited side may accept: the record must be in `Invitation`.
pub async fn accept(
    pool: &SqlitePool,
    locks: &PairLocks,
    record_id: &str,
) -> AppResult<FriendshipView> {
    let record_id = require_id(record_id, "friendship id")?;

    // Only picks the lock key; the record is resolved again under the lock.
    let record = friendship_repo::find_by_id(pool, record_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let _pair = locks.lock(&record.owner_id, &record.target_id).await;
    let mut tx = database::begin_write(pool).await?;

    let Some(FriendshipPair { forward, reverse }) = two_sided_by_id(&mut tx, record_id).await?
    else {
        return Err(AppError::NotFound);
    };

    if forward.status != FriendshipStatus::Invitation {
        warn!(
            friendship_id = %forward.id,
            status = %forward.status,
            "accept rejected: record does not hold an invitation"
        );
        return Err(AppError::Forbidden);
    }

    let friend = user_repo::find_user_by_id(&mut *tx, &forward.target_id)
        .await?
        .ok_or(AppError::NotFound)?;

    friendship_repo::update_status(&mut *tx, &forward.id, FriendshipStatus::Accepted).await?;
    friendship_repo::update_status(&mut *tx, &reverse.id, FriendshipStatus::Accepted).await?;
    tx.commit().await?;

    info!(
        owner_id = %forward.owner_id,
        target_id = %forward.target_id,
        "friendship accepted"
    );

    let accepted = FriendshipRow {
        status: FriendshipStatus::Accepted,
        ..forward
    };
    Ok(projection::friendship(&accepted, &friend))
}

/// Deletes both halves of the friendship containing record `record_id`.
///
/// A missing counterpart is reported but does not stop the delete, so this is
/// also how an incomplete pair gets cleaned up.
pub async fn remove(
    pool: &SqlitePool,
    locks: &PairLocks,
    record_id: &str,
) -> AppResult<FriendshipView> {
    let record_id = require_id(record_id, "friendship id")?;

    // Only picks the lock key; the record is resolved again under the lock.
    let record = friendship_repo::find_by_id(pool, record_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let _pair = locks.lock(&record.owner_id, &record.target_id).await;
    let mut tx = database::begin_write(pool).await?;

    let primary = friendship_repo::find_by_id(&mut *tx, record_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let counterpart =
        friendship_repo::find_by_pair(&mut *tx, &primary.target_id, &primary.owner_id).await?;
    if counterpart.is_none() {
        error!(
            friendship_id = %primary.id,
            owner_id = %primary.owner_id,
            target_id = %primary.target_id,
            "data integrity alarm: removing incomplete friendship"
        );
    }

    let friend = user_repo::find_user_by_id(&mut *tx, &primary.target_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let view = projection::friendship(&primary, &friend);

    friendship_repo::delete(&mut *tx, &primary.id).await?;
    if let Some(counterpart) = &counterpart {
        friendship_repo::delete(&mut *tx, &counterpart.id).await?;
    }
    tx.commit().await?;

    info!(
        owner_id = %primary.owner_id,
        target_id = %primary.target_id,
        "friendship removed"
    );
    Ok(view)
}

/// True when a friendship exists between the two users in either direction.
pub async fn check_exists(pool: &SqlitePool, owner_id: &str, target_id: &str) -> AppResult<bool> {
    let owner_id = require_id(owner_id, "owner id")?;
    let target_id = require_id(target_id, "target id")?;

    let mut conn = pool.acquire().await?;
    Ok(two_sided_by_ids(&mut conn, owner_id, target_id)
        .await?
        .is_some())
}

/// Users matching `term` that `actor_id` has no relationship with yet.
///
/// Terms shorter than two characters give an empty page without touching the
/// database.
pub async fn search_new(
    pool: &SqlitePool,
    actor_id: &str,
    term: Option<&str>,
    page: PageRequest,
) -> AppResult<PageView<UserPublicView>> {
    let actor_id = require_id(actor_id, "user id")?;

    let term = term.unwrap_or("").trim();
    if term.chars().count() < MIN_SEARCH_LEN {
        return Ok(PageView::empty());
    }
    if term.chars().count() > MAX_SEARCH_LEN {
        return Err(AppError::invalid(format!(
            "search must be at most {MAX_SEARCH_LEN} characters"
        )));
    }

    let rows =
        user_repo::search_unrelated_users(pool, term, actor_id, page.limit(), page.offset())
            .await?;
    let total = user_repo::count_unrelated_users(pool, term, actor_id).await?;

    let users = rows.iter().map(projection::user_public).collect();
    Ok(PageView::new(users, total, &page))
}

/// The owner's own halves whose status is in `statuses` (all statuses when
/// empty), with the counterpart embedded.
pub async fn find_all_by_owner(
    pool: &SqlitePool,
    owner_id: &str,
    statuses: &[FriendshipStatus],
    page: PageRequest,
) -> AppResult<PageView<FriendshipView>> {
    let owner_id = require_id(owner_id, "user id")?;
    let all = FriendshipStatus::ALL;
    let statuses = if statuses.is_empty() { &all[..] } else { statuses };

    let rows =
        friendship_repo::list_by_owner(pool, owner_id, statuses, page.limit(), page.offset())
            .await?;
    let total = friendship_repo::count_by_owner(pool, owner_id, statuses).await?;

    let friends = rows.iter().map(projection::friendship_listed).collect();
    Ok(PageView::new(friends, total, &page))
}

#[derive(Debug, Default)]
pub struct FriendshipAuditReport {
    pub incomplete: usize,
    pub removed: usize,
    pub failed: usize,
}

/// Records whose counterpart is missing.
pub async fn find_incomplete(pool: &SqlitePool) -> AppResult<Vec<FriendshipRow>> {
    Ok(friendship_repo::list_orphans(pool).await?)
}

/// Scans for incomplete pairs and, when `repair` is set, removes them.
pub async fn audit(
    pool: &SqlitePool,
    locks: &PairLocks,
    repair: bool,
) -> AppResult<FriendshipAuditReport> {
    let orphans = find_incomplete(pool).await?;
    let mut report = FriendshipAuditReport {
        incomplete: orphans.len(),
        ..Default::default()
    };

    for orphan in orphans {
        warn!(
            friendship_id = %orphan.id,
            owner_id = %orphan.owner_id,
            target_id = %orphan.target_id,
            status = %orphan.status,
            "incomplete friendship"
        );
        if !repair {
            continue;
        }
        match remove(pool, locks, &orphan.id).await {
            Ok(_) => report.removed += 1,
            Err(e) => {
                warn!(friendship_id = %orphan.id, "failed to remove incomplete friendship: {}", e);
                report.failed += 1;
            }
        }
    }

    Ok(report)
}
