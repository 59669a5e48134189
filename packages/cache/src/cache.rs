//! Process-wide keyed query cache.
//!
//! Entries are immutable snapshots replaced wholesale by the next
//! successful fetch for the same key. Concurrent readers of a missing
//! key share one in-flight request. Stale entries are served immediately
//! while a background refresh runs (stale-while-revalidate).

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt as _, Shared};
use tokio::time::Instant;

use crate::QueryKey;

/// Default freshness window.
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(30);

/// Default time an unread entry is retained before [`QueryCache::gc`]
/// drops it.
pub const DEFAULT_CACHE_TIME: Duration = Duration::from_secs(5 * 60);

/// Outcome of a query: shared data or a shared error.
pub type QueryResult<T, E> = Result<Arc<T>, Arc<E>>;

type SharedFetch<T, E> = Shared<BoxFuture<'static, QueryResult<T, E>>>;

struct Entry<T, E> {
    data: Option<Arc<T>>,
    error: Option<Arc<E>>,
    updated_at: Option<Instant>,
    invalidated: bool,
    /// Last read or dispatch, whichever came later.
    last_read: Instant,
    /// Generation of the newest request started for this key.
    generation: u64,
    in_flight: Option<(u64, SharedFetch<T, E>)>,
}

impl<T, E> Entry<T, E> {
    fn new(now: Instant) -> Self {
        Self {
            data: None,
            error: None,
            updated_at: None,
            invalidated: false,
            last_read: now,
            generation: 0,
            in_flight: None,
        }
    }

    fn is_fresh(&self, now: Instant, stale_time: Duration) -> bool {
        !self.invalidated
            && self
                .updated_at
                .is_some_and(|at| now.saturating_duration_since(at) < stale_time)
    }
}

type Entries<T, E> = BTreeMap<QueryKey, Entry<T, E>>;

/// Read-only view of one cache entry.
#[derive(Debug)]
pub struct CachedEntry<T, E> {
    /// Last successfully fetched value.
    pub data: Option<Arc<T>>,
    /// Error from the last request, if it failed.
    pub error: Option<Arc<E>>,
    /// Whether `data` is within the freshness window.
    pub is_fresh: bool,
    /// Whether a request for this key is in flight.
    pub is_fetching: bool,
}

/// Keyed cache for one resource type.
///
/// Cloning yields another handle to the same entries.
pub struct QueryCache<T, E> {
    entries: Arc<Mutex<Entries<T, E>>>,
    stale_time: Duration,
}

impl<T, E> Clone for QueryCache<T, E> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            stale_time: self.stale_time,
        }
    }
}

impl<T, E> Default for QueryCache<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_STALE_TIME)
    }
}

enum Lookup<T, E> {
    Ready(Arc<T>),
    Wait(SharedFetch<T, E>),
}

impl<T, E> QueryCache<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Creates an empty cache whose entries stay fresh for `stale_time`.
    #[must_use]
    pub fn new(stale_time: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(BTreeMap::new())),
            stale_time,
        }
    }

    /// Returns the freshness window.
    #[must_use]
    pub const fn stale_time(&self) -> Duration {
        self.stale_time
    }

    fn lock(&self) -> MutexGuard<'_, Entries<T, E>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reads `key`, calling `fetcher` only when needed.
    ///
    /// - fresh value: returned without a request;
    /// - stale value: returned immediately, and a background refresh is
    ///   spawned unless one is already running;
    /// - no value: joins the in-flight request for `key`, or starts one.
    ///
    /// The lookup happens when this method is called, not when the
    /// returned future is first polled. Must be called within a Tokio
    /// runtime when a stale refresh may be spawned.
    pub fn fetch<F, Fut>(&self, key: &QueryKey, fetcher: F) -> BoxFuture<'static, QueryResult<T, E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let now = Instant::now();
        let lookup = {
            let mut entries = self.lock();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| Entry::new(now));
            entry.last_read = now;

            match entry.data.clone() {
                Some(data) if entry.is_fresh(now, self.stale_time) => {
                    log::trace!("Cache hit (fresh): {key}");
                    Lookup::Ready(data)
                }
                Some(data) => {
                    if entry.in_flight.is_none() {
                        log::debug!("Cache hit (stale), refreshing in background: {key}");
                        let shared = self.start(entry, key, fetcher());
                        tokio::spawn(shared);
                    }
                    Lookup::Ready(data)
                }
                None => match &entry.in_flight {
                    Some((_, shared)) => {
                        log::trace!("Joining in-flight request: {key}");
                        Lookup::Wait(shared.clone())
                    }
                    None => {
                        log::debug!("Cache miss, fetching: {key}");
                        Lookup::Wait(self.start(entry, key, fetcher()))
                    }
                },
            }
        };

        match lookup {
            Lookup::Ready(data) => futures::future::ready(Ok(data)).boxed(),
            Lookup::Wait(shared) => shared.boxed(),
        }
    }

    /// Starts a new request for `key` even if one is in flight.
    ///
    /// The older request's result will be discarded when it lands, so
    /// the entry always reflects the most recently started request.
    pub fn refetch<F, Fut>(&self, key: &QueryKey, fetcher: F) -> BoxFuture<'static, QueryResult<T, E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let now = Instant::now();
        let mut entries = self.lock();
        let entry = entries
            .entry(key.clone())
            .or_insert_with(|| Entry::new(now));
        entry.last_read = now;
        log::debug!("Forced refetch: {key}");
        self.start(entry, key, fetcher()).boxed()
    }

    /// Registers a new request on `entry` and returns its shared handle.
    fn start<Fut>(&self, entry: &mut Entry<T, E>, key: &QueryKey, request: Fut) -> SharedFetch<T, E>
    where
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        entry.generation += 1;
        let generation = entry.generation;
        let entries = Arc::clone(&self.entries);
        let key = key.clone();

        let shared = async move {
            let result = request.await.map(Arc::new).map_err(Arc::new);
            settle(&entries, &key, generation, &result);
            result
        }
        .boxed()
        .shared();

        entry.in_flight = Some((generation, shared.clone()));
        shared
    }

    /// Returns the in-flight request for `key`, if any, so callers can
    /// wait for a background refresh to land.
    #[must_use]
    pub fn pending(&self, key: &QueryKey) -> Option<BoxFuture<'static, QueryResult<T, E>>> {
        self.lock()
            .get(key)
            .and_then(|entry| entry.in_flight.as_ref())
            .map(|(_, shared)| shared.clone().boxed())
    }

    /// Returns a snapshot of the entry for `key` without touching it.
    #[must_use]
    pub fn peek(&self, key: &QueryKey) -> Option<CachedEntry<T, E>> {
        let now = Instant::now();
        self.lock().get(key).map(|entry| CachedEntry {
            data: entry.data.clone(),
            error: entry.error.clone(),
            is_fresh: entry.data.is_some() && entry.is_fresh(now, self.stale_time),
            is_fetching: entry.in_flight.is_some(),
        })
    }

    /// Returns the cached value for `key`, fresh or stale.
    #[must_use]
    pub fn get(&self, key: &QueryKey) -> Option<Arc<T>> {
        self.lock().get(key).and_then(|entry| entry.data.clone())
    }

    /// Returns `true` if a request for `key` is in flight.
    #[must_use]
    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.lock()
            .get(key)
            .is_some_and(|entry| entry.in_flight.is_some())
    }

    /// Marks `key` stale so the next read refreshes it.
    pub fn invalidate(&self, key: &QueryKey) {
        if let Some(entry) = self.lock().get_mut(key) {
            entry.invalidated = true;
        }
    }

    /// Marks every entry stale.
    pub fn invalidate_all(&self) {
        for entry in self.lock().values_mut() {
            entry.invalidated = true;
        }
    }

    /// Drops the entry for `key`. A request still in flight for it will
    /// find no entry and be discarded.
    pub fn remove(&self, key: &QueryKey) {
        self.lock().remove(key);
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Drops entries neither read nor dispatched within `cache_time`.
    /// Returns how many were removed.
    ///
    /// An in-flight request does not keep its entry alive on its own, so
    /// requests that were dropped before being polled cannot pin entries
    /// forever. A request that lands after its entry was collected is
    /// discarded.
    pub fn gc(&self, cache_time: Duration) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| now.saturating_duration_since(entry.last_read) < cache_time);
        let removed = before - entries.len();
        if removed > 0 {
            log::debug!("Cache gc removed {removed} idle entries");
        }
        removed
    }

    /// Number of entries, including ones without data yet.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if the cache has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Records a finished request, unless a newer request for the same key
/// has been started since.
fn settle<T, E>(
    entries: &Mutex<Entries<T, E>>,
    key: &QueryKey,
    generation: u64,
    result: &QueryResult<T, E>,
) {
    let mut entries = entries.lock().unwrap_or_else(PoisonError::into_inner);
    let Some(entry) = entries.get_mut(key) else {
        log::trace!("Discarding result for removed entry: {key}");
        return;
    };

    if entry.generation != generation {
        log::debug!(
            "Discarding superseded result for {key} (generation {generation}, newest {})",
            entry.generation
        );
        return;
    }

    entry.in_flight = None;
    match result {
        Ok(data) => {
            entry.data = Some(Arc::clone(data));
            entry.error = None;
            entry.updated_at = Some(Instant::now());
            entry.invalidated = false;
        }
        Err(error) => {
            log::debug!("Request failed for {key}; keeping previous data");
            entry.error = Some(Arc::clone(error));
        }
    }
}
