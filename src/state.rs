use sqlx::SqlitePool;

use crate::services::pair_locks::PairLocks;

/// Shared by every handler; cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub locks: PairLocks,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            locks: PairLocks::new(),
        }
    }
}
