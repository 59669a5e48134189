//! Per-widget view of a [`QueryCache`].
//!
//! A subscription tracks the key its widget currently wants and the
//! state it should display. Requests are tagged with the key and ticket
//! active when they were dispatched; a result that arrives after the key
//! changed, or after a newer request was dispatched, is dropped without
//! touching the displayed state.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt as _};

use crate::{QueryCache, QueryKey, QueryResult};

/// What a widget should render for its query.
pub enum QueryState<T, E> {
    /// Disabled: the key is missing a required id.
    Idle,
    /// First load for the current key, nothing to show yet.
    Loading,
    /// Data for the current key.
    Success {
        /// The value.
        data: Arc<T>,
        /// Whether a refresh for this key is running in the background.
        is_refetching: bool,
    },
    /// The last request for the current key failed.
    Error {
        /// The failure.
        error: Arc<E>,
        /// Data previously held for this key, still displayable.
        stale_data: Option<Arc<T>>,
    },
}

impl<T, E> Clone for QueryState<T, E> {
    fn clone(&self) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::Loading => Self::Loading,
            Self::Success {
                data,
                is_refetching,
            } => Self::Success {
                data: Arc::clone(data),
                is_refetching: *is_refetching,
            },
            Self::Error { error, stale_data } => Self::Error {
                error: Arc::clone(error),
                stale_data: stale_data.clone(),
            },
        }
    }
}

impl<T, E> fmt::Debug for QueryState<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("Idle"),
            Self::Loading => f.write_str("Loading"),
            Self::Success { is_refetching, .. } => f
                .debug_struct("Success")
                .field("is_refetching", is_refetching)
                .finish_non_exhaustive(),
            Self::Error { stale_data, .. } => f
                .debug_struct("Error")
                .field("has_stale_data", &stale_data.is_some())
                .finish_non_exhaustive(),
        }
    }
}

impl<T, E> QueryState<T, E> {
    /// The displayable data, including stale data behind an error.
    #[must_use]
    pub const fn data(&self) -> Option<&Arc<T>> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Error { stale_data, .. } => stale_data.as_ref(),
            Self::Idle | Self::Loading => None,
        }
    }

    /// The error, if the last request failed.
    #[must_use]
    pub const fn error(&self) -> Option<&Arc<E>> {
        match self {
            Self::Error { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Returns `true` while the first load is pending.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns `true` while data is shown and a refresh is running.
    #[must_use]
    pub const fn is_refetching(&self) -> bool {
        matches!(
            self,
            Self::Success {
                is_refetching: true,
                ..
            }
        )
    }

    /// Returns `true` if the query is disabled.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

struct Inner<T, E> {
    key: Option<QueryKey>,
    ticket: u64,
    state: QueryState<T, E>,
}

/// A widget's subscription to one resource.
///
/// Cloning yields another handle to the same subscription.
pub struct QuerySubscription<T, E> {
    cache: QueryCache<T, E>,
    inner: Arc<Mutex<Inner<T, E>>>,
}

impl<T, E> Clone for QuerySubscription<T, E> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E> QuerySubscription<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Creates a disabled subscription backed by `cache`.
    #[must_use]
    pub fn new(cache: QueryCache<T, E>) -> Self {
        Self {
            cache,
            inner: Arc::new(Mutex::new(Inner {
                key: None,
                ticket: 0,
                state: QueryState::Idle,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T, E>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The cache this subscription reads from.
    #[must_use]
    pub const fn cache(&self) -> &QueryCache<T, E> {
        &self.cache
    }

    /// The key currently subscribed to, or `None` while disabled.
    #[must_use]
    pub fn key(&self) -> Option<QueryKey> {
        self.lock().key.clone()
    }

    /// The state to display.
    #[must_use]
    pub fn state(&self) -> QueryState<T, E> {
        self.lock().state.clone()
    }

    /// Returns `true` when a key is set.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.lock().key.is_some()
    }

    /// Switches to `key`. `None` disables the subscription.
    ///
    /// A different key abandons every request dispatched so far. The
    /// state resets to the cached value for the new key if there is one,
    /// otherwise to `Loading` (or `Idle` when disabled). Returns `true`
    /// if the key changed.
    pub fn set_key(&self, key: Option<QueryKey>) -> bool {
        let mut inner = self.lock();
        if inner.key == key {
            return false;
        }

        inner.ticket += 1;
        inner.state = match &key {
            None => QueryState::Idle,
            Some(key) => self.cache.get(key).map_or(QueryState::Loading, |data| {
                QueryState::Success {
                    data,
                    is_refetching: false,
                }
            }),
        };
        if let Some(key) = &key {
            log::trace!("Subscription switched to {key}");
        }
        inner.key = key;
        true
    }

    /// Dispatches a read of the current key through the cache.
    ///
    /// The cache decides whether `fetcher` is actually invoked. The
    /// returned future resolves to the state after the result has been
    /// applied, or to the unchanged current state if the result was
    /// stale by the time it arrived. On a stale hit the stale value is
    /// displayed right away and the future resolves once the background
    /// refresh has landed. While disabled, nothing is dispatched and
    /// `fetcher` is never called.
    pub fn request<F, Fut>(&self, fetcher: F) -> BoxFuture<'static, QueryState<T, E>>
    where
        F: FnOnce(&QueryKey) -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let dispatch = {
            let mut inner = self.lock();
            inner.key.clone().map(|key| {
                inner.ticket += 1;
                let ticket = inner.ticket;

                let previous = inner.state.data().cloned();
                inner.state = previous.map_or(QueryState::Loading, |data| QueryState::Success {
                    data,
                    is_refetching: true,
                });

                let request = self.cache.fetch(&key, || fetcher(&key));
                (key, ticket, request)
            })
        };

        let inner = Arc::clone(&self.inner);
        let cache = self.cache.clone();

        async move {
            let Some((key, ticket, request)) = dispatch else {
                return QueryState::Idle;
            };

            let Some(state) = apply(&inner, &cache, &key, ticket, request.await) else {
                return current(&inner);
            };
            if !state.is_refetching() {
                return state;
            }

            // A stale hit resolves at once; the background refresh lands later.
            let Some(refresh) = cache.pending(&key) else {
                return state;
            };
            apply(&inner, &cache, &key, ticket, refresh.await).unwrap_or_else(|| current(&inner))
        }
        .boxed()
    }
}

fn current<T, E>(inner: &Mutex<Inner<T, E>>) -> QueryState<T, E> {
    inner
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .state
        .clone()
}

/// Writes `result` into the displayed state if the request that produced
/// it is still the latest one for the current key. Returns `None` when
/// the result was dropped.
fn apply<T, E>(
    inner: &Mutex<Inner<T, E>>,
    cache: &QueryCache<T, E>,
    key: &QueryKey,
    ticket: u64,
    result: QueryResult<T, E>,
) -> Option<QueryState<T, E>>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    let mut guard = inner.lock().unwrap_or_else(PoisonError::into_inner);
    if guard.ticket != ticket || guard.key.as_ref() != Some(key) {
        log::debug!("Discarding result for abandoned request: {key}");
        return None;
    }

    guard.state = match result {
        Ok(data) => QueryState::Success {
            data,
            is_refetching: cache.is_fetching(key),
        },
        Err(error) => QueryState::Error {
            error,
            stale_data: cache.get(key),
        },
    };
    Some(guard.state.clone())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use chrono::{DateTime, Utc};
    use nabeeh_query::{FilterSelection, QueryParams, TimeRange};
    use tokio::sync::oneshot;

    use super::*;
    use crate::Resource;

    #[derive(Debug, thiserror::Error)]
    #[error("unavailable")]
    struct Unavailable;

    fn key(range: TimeRange) -> QueryKey {
        let now = DateTime::parse_from_rfc3339("2024-01-02T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        QueryKey::new(
            Resource::Ports,
            Arc::new(QueryParams::new(range.resolve(&now), FilterSelection::default())),
        )
    }

    #[tokio::test]
    async fn disabled_subscription_never_fetches() {
        let sub = QuerySubscription::<String, Unavailable>::new(QueryCache::default());
        let calls = Arc::new(AtomicUsize::new(0));

        let counted = Arc::clone(&calls);
        let state = sub
            .request(move |_| {
                counted.fetch_add(1, Ordering::SeqCst);
                futures::future::ready(Ok("x".to_string()))
            })
            .await;

        assert!(state.is_idle());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(sub.cache().is_empty());
    }

    #[tokio::test]
    async fn late_result_for_abandoned_key_is_discarded() {
        let sub = QuerySubscription::<String, Unavailable>::new(QueryCache::default());
        let k1 = key(TimeRange::Last24Hours);
        let k2 = key(TimeRange::Last7Days);
        let (tx1, rx1) = oneshot::channel::<String>();
        let (tx2, rx2) = oneshot::channel::<String>();

        sub.set_key(Some(k1.clone()));
        let first = sub.request(move |_| async move { rx1.await.map_err(|_| Unavailable) });
        assert!(sub.state().is_loading());

        sub.set_key(Some(k2.clone()));
        let second = sub.request(move |_| async move { rx2.await.map_err(|_| Unavailable) });

        tx2.send("k2".to_string()).unwrap();
        let state = second.await;
        assert_eq!(state.data().unwrap().as_str(), "k2");

        tx1.send("k1".to_string()).unwrap();
        let state = first.await;
        assert_eq!(state.data().unwrap().as_str(), "k2");
        assert_eq!(sub.state().data().unwrap().as_str(), "k2");

        // The abandoned result still lands under its own key.
        assert_eq!(sub.cache().get(&k1).unwrap().as_str(), "k1");
    }

    #[tokio::test]
    async fn switching_back_shows_cached_data_immediately() {
        let sub = QuerySubscription::<String, Unavailable>::new(QueryCache::default());
        let k1 = key(TimeRange::Last24Hours);
        let k2 = key(TimeRange::Last30Days);

        sub.set_key(Some(k1.clone()));
        sub.request(|_| futures::future::ready(Ok("day".to_string())))
            .await;
        sub.set_key(Some(k2));
        assert!(sub.state().is_loading());

        sub.set_key(Some(k1));
        assert_eq!(sub.state().data().unwrap().as_str(), "day");
    }

    #[tokio::test]
    async fn error_is_local_and_keeps_stale_data() {
        let sub = QuerySubscription::<String, Unavailable>::new(QueryCache::default());
        let k = key(TimeRange::Last24Hours);

        sub.set_key(Some(k.clone()));
        sub.request(|_| futures::future::ready(Ok("ok".to_string())))
            .await;
        sub.cache().invalidate(&k);

        // Stale read serves the old value and refreshes in the background.
        let state = sub
            .request(|_| futures::future::ready(Err(Unavailable)))
            .await;
        assert!(state.error().is_some());
        assert_eq!(state.data().unwrap().as_str(), "ok");
        assert!(sub.state().error().is_some());

        let entry = sub.cache().peek(&k).unwrap();
        assert!(entry.error.is_some());
        assert_eq!(entry.data.unwrap().as_str(), "ok");
    }

    #[tokio::test(start_paused = true)]
    async fn background_refresh_reaches_the_widget() {
        let sub =
            QuerySubscription::<String, Unavailable>::new(QueryCache::new(Duration::from_secs(30)));
        let k = key(TimeRange::Last24Hours);

        sub.set_key(Some(k.clone()));
        sub.request(|_| futures::future::ready(Ok("old".to_string())))
            .await;
        tokio::time::advance(Duration::from_secs(31)).await;

        let (tx, rx) = oneshot::channel::<String>();
        let refresh = sub.request(move |_| async move { rx.await.map_err(|_| Unavailable) });
        let shown = sub.state();
        assert!(shown.is_refetching());
        assert_eq!(shown.data().unwrap().as_str(), "old");

        tx.send("new".to_string()).unwrap();
        let state = refresh.await;

        assert_eq!(state.data().unwrap().as_str(), "new");
        assert!(!state.is_refetching());
        assert_eq!(sub.state().data().unwrap().as_str(), "new");
        assert!(!sub.state().is_refetching());
    }

    #[tokio::test(start_paused = true)]
    async fn background_refresh_for_abandoned_key_is_not_shown() {
        let sub =
            QuerySubscription::<String, Unavailable>::new(QueryCache::new(Duration::from_secs(30)));
        let k1 = key(TimeRange::Last24Hours);
        let k2 = key(TimeRange::Last7Days);

        sub.set_key(Some(k1.clone()));
        sub.request(|_| futures::future::ready(Ok("old".to_string())))
            .await;
        tokio::time::advance(Duration::from_secs(31)).await;

        let (tx, rx) = oneshot::channel::<String>();
        let refresh = sub.request(move |_| async move { rx.await.map_err(|_| Unavailable) });
        sub.set_key(Some(k2));

        tx.send("new".to_string()).unwrap();
        let state = refresh.await;

        assert!(state.is_loading());
        assert!(sub.state().is_loading());

        if let Some(pending) = sub.cache().pending(&k1) {
            pending.await.unwrap();
        }
        assert_eq!(sub.cache().get(&k1).unwrap().as_str(), "new");
    }

    #[tokio::test]
    async fn disabling_resets_to_idle() {
        let sub = QuerySubscription::<String, Unavailable>::new(QueryCache::default());
        sub.set_key(Some(key(TimeRange::Last24Hours)));
        assert!(sub.is_enabled());
        assert!(sub.set_key(None));
        assert!(sub.state().is_idle());
        assert!(!sub.set_key(None));
    }
}
