use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type PairKey = (String, String);

/// Async mutexes keyed by an unordered pair of user ids.
///
/// `lock("a", "b")` and `lock("b", "a")` contend for the same mutex, so every
/// write touching a friendship pair runs one at a time. Entries are dropped as
/// soon as nobody holds or waits for them.
#[derive(Clone, Default)]
pub struct PairLocks {
    inner: Arc<Mutex<HashMap<PairKey, Arc<AsyncMutex<()>>>>>,
}

pub struct PairGuard {
    key: PairKey,
    locks: PairLocks,
    _guard: OwnedMutexGuard<()>,
}

impl PairLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, a: &str, b: &str) -> PairGuard {
        let key = pair_key(a, b);
        let mutex = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            map.entry(key.clone()).or_default().clone()
        };

        let guard = mutex.lock_owned().await;
        PairGuard {
            key,
            locks: self.clone(),
            _guard: guard,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Drop for PairGuard {
    fn drop(&mut self) {
        let mut map = self
            .locks
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one held by this guard: nobody is waiting.
        if map
            .get(&self.key)
            .is_some_and(|mutex| Arc::strong_count(mutex) <= 2)
        {
            map.remove(&self.key);
        }
    }
}

fn pair_key(a: &str, b: &str) -> PairKey {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}
