//! Read-through query cache with an explicit invalidation key space.
//!
//! Entries are only ever populated by reads. Mutations never patch an entry;
//! they hand an [`Invalidation`] to [`QueryCache::invalidate`] and the next
//! read goes back to the remote authority.

use std::{
    collections::HashMap,
    fmt,
    future::Future,
    time::{Duration, Instant},
};

use {
    serde_json::Value,
    tokio::sync::RwLock,
    tracing::{debug, trace},
};

/// `(collection, operation, params)` where `params` is the compact JSON text
/// of the query parameters. Object keys are rendered sorted, so equal
/// parameters always give equal keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    collection: &'static str,
    operation: &'static str,
    params: String,
}

impl QueryKey {
    pub fn new(collection: &'static str, operation: &'static str, params: Value) -> Self {
        Self {
            collection,
            operation,
            params: params.to_string(),
        }
    }

    pub fn collection(&self) -> &'static str {
        self.collection
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn params(&self) -> &str {
        &self.params
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.collection, self.operation, self.params)
    }
}

/// What a mutation asks the cache to forget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    /// Every key of a resource collection.
    Collection(&'static str),
    /// A single parameterized query.
    Key(QueryKey),
}

impl Invalidation {
    pub fn collection(collection: &'static str) -> Self {
        Self::Collection(collection)
    }

    fn scope(&self) -> &'static str {
        match self {
            Self::Collection(c) => c,
            Self::Key(k) => k.collection,
        }
    }

    fn matches(&self, key: &QueryKey) -> bool {
        match self {
            Self::Collection(c) => key.collection == *c,
            Self::Key(k) => k == key,
        }
    }
}

struct Entry<V> {
    value: V,
    fetched_at: Instant,
}

struct CacheState<V> {
    entries: HashMap<QueryKey, Entry<V>>,
    /// Bumped on every invalidation touching the collection.
    generations: HashMap<&'static str, u64>,
}

impl<V> CacheState<V> {
    fn generation(&self, collection: &str) -> u64 {
        self.generations.get(collection).copied().unwrap_or(0)
    }
}

pub struct QueryCache<V> {
    state: RwLock<CacheState<V>>,
    stale_after: Option<Duration>,
}

impl<V: Clone> Default for QueryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> QueryCache<V> {
    /// Entries stay valid until invalidated.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(CacheState {
                entries: HashMap::new(),
                generations: HashMap::new(),
            }),
            stale_after: None,
        }
    }

    /// Entries older than `stale_after` are re-read on next access.
    pub fn with_stale_after(stale_after: Duration) -> Self {
        Self {
            stale_after: Some(stale_after),
            ..Self::new()
        }
    }

    /// Cached value for `key`, if present and fresh.
    pub async fn get(&self, key: &QueryKey) -> Option<V> {
        let state = self.state.read().await;
        let entry = state.entries.get(key)?;
        if self.is_stale(entry) {
            return None;
        }
        Some(entry.value.clone())
    }

    /// Serve `key` from the cache, or run `fetch` and remember its result.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: QueryKey, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            debug!(%key, "query cache hit");
            return Ok(value);
        }
        debug!(%key, "query cache miss");
        self.refetch(key, fetch).await
    }

    /// Run `fetch` regardless of what is cached and store the result.
    ///
    /// The lock is not held across `fetch`. If the collection was invalidated
    /// while the fetch was in flight the result is returned to the caller but
    /// not stored.
    pub async fn refetch<F, Fut, E>(&self, key: QueryKey, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let observed = self.state.read().await.generation(key.collection);
        let value = fetch().await?;

        let mut state = self.state.write().await;
        if state.generation(key.collection) == observed {
            state.entries.insert(key, Entry {
                value: value.clone(),
                fetched_at: Instant::now(),
            });
        } else {
            trace!(%key, "discarding read that raced an invalidation");
        }
        Ok(value)
    }

    /// Drop every entry matched by `invalidation`. Returns how many were dropped.
    pub async fn invalidate(&self, invalidation: &Invalidation) -> usize {
        let mut state = self.state.write().await;
        *state.generations.entry(invalidation.scope()).or_insert(0) += 1;
        let before = state.entries.len();
        state.entries.retain(|key, _| !invalidation.matches(key));
        let dropped = before - state.entries.len();
        trace!(?invalidation, dropped, "query cache invalidated");
        dropped
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn is_stale(&self, entry: &Entry<V>) -> bool {
        self.stale_after
            .is_some_and(|limit| entry.fetched_at.elapsed() >= limit)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;

    fn list_key() -> QueryKey {
        QueryKey::new("instance-groups", "fetchInstanceGroups", Value::Null)
    }

    fn item_key(id: &str) -> QueryKey {
        QueryKey::new("instance-groups", "fetchInstanceGroup", json!({ "groupId": id }))
    }

    #[test]
    fn key_encoding_is_deterministic() {
        assert_eq!(item_key("a"), item_key("a"));
        assert_ne!(item_key("a"), item_key("b"));
        assert_eq!(item_key("a").params(), r#"{"groupId":"a"}"#);
        assert_eq!(
            list_key().to_string(),
            "[instance-groups, fetchInstanceGroups, null]"
        );
    }

    #[test]
    fn distinct_params_never_share_a_key() {
        let scoped = |bot: &str| {
            QueryKey::new("sessions", "fetchSessions", json!({
                "instanceName": "inst-a",
                "botId": bot,
            }))
        };
        assert_ne!(scoped("bot-1"), scoped("bot-2"));
        assert_ne!(scoped("bot-1").params(), "");
        assert_ne!(
            QueryKey::new("sessions", "fetchSessions", Value::Null),
            QueryKey::new("sessions", "fetchSessions", json!({}))
        );
        // Key order in the literal does not matter.
        assert_eq!(
            scoped("bot-1"),
            QueryKey::new("sessions", "fetchSessions", json!({
                "botId": "bot-1",
                "instanceName": "inst-a",
            }))
        );
    }

    #[tokio::test]
    async fn second_read_is_served_from_cache() {
        let cache = QueryCache::<u32>::new();
        let calls = AtomicUsize::new(0);
        for _ in 0..2 {
            let v = cache
                .get_or_fetch(list_key(), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>(7)
                })
                .await
                .unwrap();
            assert_eq!(v, 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_fetch_is_not_cached() {
        let cache = QueryCache::<u32>::new();
        let err = cache
            .get_or_fetch(list_key(), || async { Err::<u32, _>("down") })
            .await;
        assert_eq!(err, Err("down"));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn collection_invalidation_drops_every_key() {
        let cache = QueryCache::<u32>::new();
        cache.refetch(list_key(), || async { Ok::<_, ()>(1) }).await.unwrap();
        cache.refetch(item_key("a"), || async { Ok::<_, ()>(2) }).await.unwrap();
        cache
            .refetch(QueryKey::new("sessions", "fetchSessions", Value::Null), || async {
                Ok::<_, ()>(3)
            })
            .await
            .unwrap();

        let dropped = cache
            .invalidate(&Invalidation::collection("instance-groups"))
            .await;
        assert_eq!(dropped, 2);
        assert_eq!(cache.len().await, 1);
        assert!(cache.get(&list_key()).await.is_none());
    }

    #[tokio::test]
    async fn key_invalidation_is_targeted() {
        let cache = QueryCache::<u32>::new();
        cache.refetch(item_key("a"), || async { Ok::<_, ()>(1) }).await.unwrap();
        cache.refetch(item_key("b"), || async { Ok::<_, ()>(2) }).await.unwrap();

        cache.invalidate(&Invalidation::Key(item_key("a"))).await;
        assert!(cache.get(&item_key("a")).await.is_none());
        assert_eq!(cache.get(&item_key("b")).await, Some(2));
    }

    #[tokio::test]
    async fn read_racing_an_invalidation_is_not_stored() {
        let cache = QueryCache::<u32>::new();
        let value = cache
            .get_or_fetch(list_key(), || async {
                cache
                    .invalidate(&Invalidation::collection("instance-groups"))
                    .await;
                Ok::<_, ()>(9)
            })
            .await
            .unwrap();
        assert_eq!(value, 9);
        assert!(cache.get(&list_key()).await.is_none());
    }

    #[tokio::test]
    async fn stale_entries_are_refetched() {
        let cache = QueryCache::<u32>::with_stale_after(Duration::ZERO);
        let calls = AtomicUsize::new(0);
        for _ in 0..2 {
            cache
                .get_or_fetch(list_key(), || async {
                    Ok::<_, ()>(calls.fetch_add(1, Ordering::SeqCst) as u32)
                })
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
