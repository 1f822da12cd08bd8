// ── Query cache ──
//
// Keyed store of query results with tag-based invalidation. One fetch per
// key at a time; entries without subscribers are evicted after a grace
// period. Owned by the `Backend` and passed to clients explicitly.

mod state;
mod subscription;
mod tag;

use std::any::Any;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use dashmap::DashMap;
use futures_util::future::BoxFuture;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;

pub(crate) use state::{ErasedState, Payload};
pub use state::{QueryState, QueryStatus};
pub use subscription::{QueryStream, QuerySubscription};
pub use tag::{QueryKey, Tag};

/// Grace period before an unsubscribed entry is dropped.
pub const DEFAULT_KEEP_UNUSED: Duration = Duration::from_secs(60);

type Fetcher = Arc<dyn Fn() -> BoxFuture<'static, Result<Payload, CoreError>> + Send + Sync>;

#[derive(Debug, Default)]
struct EntryMeta {
    subscribers: usize,
    /// Bumped on every fetch request; a fetch whose captured generation is
    /// behind when it completes is followed by one more fetch.
    generation: u64,
    in_flight: bool,
    /// Invalidated while nobody was subscribed.
    stale: bool,
    /// Bumped whenever the subscriber count changes to or from zero, so a
    /// scheduled eviction can tell it was overtaken.
    release_epoch: u64,
}

pub(crate) struct CacheEntry {
    key: QueryKey,
    tags: Vec<Tag>,
    fetcher: Fetcher,
    state: watch::Sender<ErasedState>,
    meta: Mutex<EntryMeta>,
}

impl CacheEntry {
    fn new(key: QueryKey, tags: Vec<Tag>, fetcher: Fetcher) -> Self {
        let (state, _) = watch::channel(QueryState::Idle);
        Self {
            key,
            tags,
            fetcher,
            state,
            meta: Mutex::new(EntryMeta::default()),
        }
    }

    fn meta(&self) -> MutexGuard<'_, EntryMeta> {
        self.meta.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn carries(&self, tag: &Tag) -> bool {
        self.tags.iter().any(|carried| tag.invalidates(carried))
    }

    pub(crate) fn key(&self) -> &QueryKey {
        &self.key
    }

    pub(crate) fn receiver(&self) -> watch::Receiver<ErasedState> {
        self.state.subscribe()
    }

    /// Refetch now when observed, otherwise on next subscribe.
    fn invalidate(self: &Arc<Self>) {
        let observed = {
            let mut meta = self.meta();
            if meta.subscribers == 0 {
                meta.stale = true;
            }
            meta.subscribers > 0
        };
        if observed {
            self.request_fetch();
        }
    }

    /// Start a fetch, or mark the in-flight one as superseded.
    pub(crate) fn request_fetch(self: &Arc<Self>) {
        {
            let mut meta = self.meta();
            meta.generation += 1;
            meta.stale = false;
            if meta.in_flight {
                debug!(key = %self.key, "fetch already in flight; coalesced");
                return;
            }
            meta.in_flight = true;
            self.state.send_modify(|state| *state = state.begin_fetch());
        }
        tokio::spawn(Self::run_fetch(Arc::clone(self)));
    }

    async fn run_fetch(self: Arc<Self>) {
        loop {
            let generation = self.meta().generation;
            debug!(key = %self.key, generation, "fetching");
            let outcome = (self.fetcher)().await;
            if !self.complete(generation, outcome) {
                break;
            }
        }
    }

    /// Publish a fetch outcome. Returns `true` when another fetch must run.
    ///
    /// The new state is published before `in_flight` is released, both under
    /// the meta lock, so a concurrent `request_fetch` can never have its
    /// `Refetching` overwritten by this older result.
    fn complete(&self, generation: u64, outcome: Result<Payload, CoreError>) -> bool {
        let mut meta = self.meta();

        if meta.subscribers == 0 {
            self.state.send_modify(|state| *state = state.abandon());
            meta.in_flight = false;
            meta.stale = true;
            debug!(key = %self.key, "no subscribers left; fetch result discarded");
            return false;
        }

        let superseded = meta.generation != generation;
        let previous = self.state.borrow().data();
        let next = match outcome {
            Ok(value) if superseded => QueryState::Refetching(value),
            Ok(value) => QueryState::Resolved(value),
            Err(_) if superseded => previous.map_or(QueryState::Pending, QueryState::Refetching),
            Err(error) => {
                warn!(key = %self.key, error = %error, "query failed");
                QueryState::Errored { error, previous }
            }
        };
        self.state.send_replace(next);
        if !superseded {
            meta.in_flight = false;
        }
        superseded
    }
}

struct CacheInner {
    entries: DashMap<QueryKey, Arc<CacheEntry>>,
    keep_unused: Duration,
    shutdown: CancellationToken,
}

impl CacheInner {
    fn schedule_eviction(self: &Arc<Self>, entry: Arc<CacheEntry>, epoch: u64) {
        if self.keep_unused.is_zero() || self.shutdown.is_cancelled() {
            self.evict(&entry, epoch);
            return;
        }
        let Ok(runtime) = Handle::try_current() else {
            self.evict(&entry, epoch);
            return;
        };
        let inner = Arc::clone(self);
        runtime.spawn(async move {
            tokio::select! {
                () = inner.shutdown.cancelled() => {}
                () = tokio::time::sleep(inner.keep_unused) => inner.evict(&entry, epoch),
            }
        });
    }

    fn evict(&self, entry: &Arc<CacheEntry>, epoch: u64) {
        let removed = self.entries.remove_if(&entry.key, |_, current| {
            if !Arc::ptr_eq(current, entry) {
                return false;
            }
            let meta = current.meta();
            meta.subscribers == 0 && meta.release_epoch == epoch
        });
        if removed.is_some() {
            debug!(key = %entry.key, "evicted unused query");
        }
    }

    /// Drop one subscriber from `entry`.
    fn release(self: &Arc<Self>, entry: &Arc<CacheEntry>) {
        let epoch = {
            let mut meta = entry.meta();
            meta.subscribers = meta.subscribers.saturating_sub(1);
            if meta.subscribers > 0 {
                return;
            }
            meta.release_epoch += 1;
            meta.release_epoch
        };
        self.schedule_eviction(Arc::clone(entry), epoch);
    }
}

/// Shared query cache.
///
/// Cheap to clone; clones share the same entries. Fetches run on the
/// ambient Tokio runtime, so subscribing and invalidating must happen
/// inside one.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

impl QueryCache {
    pub fn new(keep_unused: Duration) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: DashMap::new(),
                keep_unused,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn keep_unused(&self) -> Duration {
        self.inner.keep_unused
    }

    /// Subscribe to `key`, creating the entry on first use.
    ///
    /// A fetch starts when the entry has no value yet, holds an error, or
    /// was invalidated while unobserved. Otherwise the cached value is
    /// served and `fetch` is not called. The first subscriber's `tags` and
    /// `fetch` win for the lifetime of the entry.
    pub fn subscribe<T, F, Fut>(&self, key: QueryKey, tags: Vec<Tag>, fetch: F) -> QuerySubscription<T>
    where
        T: Any + Send + Sync,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        let fetcher: Fetcher = Arc::new(move || {
            let pending = fetch();
            Box::pin(async move { pending.await.map(|value| Arc::new(value) as Payload) })
        });

        let (entry, needs_fetch) = {
            let slot = self
                .inner
                .entries
                .entry(key.clone())
                .or_insert_with(|| Arc::new(CacheEntry::new(key, tags, fetcher)));
            let entry = Arc::clone(slot.value());
            let needs_fetch = {
                let mut meta = entry.meta();
                meta.subscribers += 1;
                meta.release_epoch += 1;
                let unsettled = matches!(
                    *entry.state.borrow(),
                    QueryState::Idle | QueryState::Errored { .. }
                );
                !meta.in_flight && (meta.stale || unsettled)
            };
            drop(slot);
            (entry, needs_fetch)
        };

        if needs_fetch {
            entry.request_fetch();
        }
        QuerySubscription::new(Arc::clone(&self.inner), entry)
    }

    /// Invalidate every entry carrying a tag hit by `tags`.
    ///
    /// Observed entries refetch immediately; unobserved ones refetch on
    /// their next subscribe. Returns the number of entries hit.
    pub fn invalidate(&self, tags: &[Tag]) -> usize {
        if tags.is_empty() {
            return 0;
        }
        let hits: Vec<Arc<CacheEntry>> = self
            .inner
            .entries
            .iter()
            .filter(|slot| tags.iter().any(|tag| slot.value().carries(tag)))
            .map(|slot| Arc::clone(slot.value()))
            .collect();
        for entry in &hits {
            entry.invalidate();
        }
        debug!(
            tags = %tags.iter().map(ToString::to_string).collect::<Vec<_>>().join(","),
            hits = hits.len(),
            "invalidated"
        );
        hits.len()
    }

    /// Force a refetch of one key.
    pub fn refetch(&self, key: &QueryKey) {
        let entry = self.inner.entries.get(key).map(|slot| Arc::clone(slot.value()));
        if let Some(entry) = entry {
            entry.invalidate();
        }
    }

    pub fn status(&self, key: &QueryKey) -> Option<QueryStatus> {
        self.inner
            .entries
            .get(key)
            .map(|slot| slot.value().state.borrow().status())
    }

    pub fn subscriber_count(&self, key: &QueryKey) -> usize {
        self.inner
            .entries
            .get(key)
            .map_or(0, |slot| slot.value().meta().subscribers)
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.inner.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Drop every entry. Live subscriptions keep their detached state.
    pub fn clear(&self) {
        self.inner.entries.clear();
    }

    /// Cancel pending evictions and drop every entry.
    pub fn teardown(&self) {
        self.inner.shutdown.cancel();
        self.inner.entries.clear();
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_KEEP_UNUSED)
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.inner.entries.len())
            .field("keep_unused", &self.inner.keep_unused)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;
    use tokio_test::assert_pending;

    use super::*;

    fn counting_fetch(
        calls: &Arc<AtomicUsize>,
    ) -> impl Fn() -> BoxFuture<'static, Result<usize, CoreError>> + Send + Sync + 'static {
        let calls = Arc::clone(calls);
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Box::pin(async move { Ok(n) })
        }
    }

    fn key(name: &str) -> QueryKey {
        QueryKey::new(name, "")
    }

    #[tokio::test]
    async fn second_subscriber_reuses_cached_value() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut first = cache.subscribe(key("trip.list"), vec![Tag::new("Trip")], counting_fetch(&calls));
        let a = first.settled().await.unwrap();

        let mut second = cache.subscribe(key("trip.list"), vec![Tag::new("Trip")], counting_fetch(&calls));
        let b = second.settled().await.unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.subscriber_count(&key("trip.list")), 2);
    }

    #[tokio::test]
    async fn invalidations_in_one_pending_window_coalesce() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut sub = cache.subscribe(key("trip.list"), vec![Tag::new("Trip")], counting_fetch(&calls));
        sub.settled().await.unwrap();

        cache.invalidate(&[Tag::new("Trip")]);
        cache.invalidate(&[Tag::new("Trip")]);
        assert_eq!(sub.status(), QueryStatus::Refetching);

        assert_eq!(*sub.settled().await.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn settled_after_invalidate_never_sees_older_data() {
        let cache = QueryCache::default();
        let version = Arc::new(AtomicUsize::new(0));
        let source = Arc::clone(&version);
        let mut sub = cache.subscribe(key("trip.list"), vec![Tag::new("Trip")], move || {
            let source = Arc::clone(&source);
            Box::pin(async move {
                tokio::task::yield_now().await;
                Ok(source.load(Ordering::SeqCst))
            }) as BoxFuture<'static, Result<usize, CoreError>>
        });
        sub.settled().await.unwrap();

        let noise = {
            let cache = cache.clone();
            tokio::spawn(async move {
                for _ in 0..2_000 {
                    cache.refetch(&key("trip.list"));
                    tokio::task::yield_now().await;
                }
            })
        };

        for _ in 0..2_000 {
            let expected = version.fetch_add(1, Ordering::SeqCst) + 1;
            cache.invalidate(&[Tag::new("Trip")]);
            let seen = *sub.settled().await.unwrap();
            assert!(seen >= expected, "read version {seen} after writing {expected}");
        }
        noise.await.unwrap();
    }

    #[tokio::test]
    async fn invalidation_skips_untagged_entries() {
        let cache = QueryCache::default();
        let trips = Arc::new(AtomicUsize::new(0));
        let events = Arc::new(AtomicUsize::new(0));

        let mut t = cache.subscribe(key("trip.list"), vec![Tag::new("Trip")], counting_fetch(&trips));
        let mut e = cache.subscribe(key("event.list"), vec![Tag::new("Event")], counting_fetch(&events));
        t.settled().await.unwrap();
        e.settled().await.unwrap();

        assert_eq!(cache.invalidate(&[Tag::with_id("Trip", "t1")]), 0);
        assert_eq!(cache.invalidate(&[Tag::new("Trip")]), 1);
        t.settled().await.unwrap();

        assert_eq!(trips.load(Ordering::SeqCst), 2);
        assert_eq!(events.load(Ordering::SeqCst), 1);
        assert_eq!(e.status(), QueryStatus::Resolved);
    }

    #[tokio::test]
    async fn unobserved_entry_refetches_on_next_subscribe() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut sub = cache.subscribe(key("user.list"), vec![Tag::new("User")], counting_fetch(&calls));
        sub.settled().await.unwrap();
        drop(sub);

        cache.invalidate(&[Tag::new("User")]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let mut again = cache.subscribe(key("user.list"), vec![Tag::new("User")], counting_fetch(&calls));
        assert_eq!(*again.settled().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn errors_keep_previous_value() {
        let cache = QueryCache::default();
        let fail = Arc::new(AtomicUsize::new(0));
        let flag = Arc::clone(&fail);
        let mut sub = cache.subscribe(key("survey.list"), vec![Tag::new("Survey")], move || {
            let attempt = flag.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                if attempt == 0 {
                    Ok(7_u32)
                } else {
                    Err(CoreError::Internal("boom".into()))
                }
            }) as BoxFuture<'static, Result<u32, CoreError>>
        });
        assert_eq!(*sub.settled().await.unwrap(), 7);

        cache.invalidate(&[Tag::new("Survey")]);
        assert!(sub.settled().await.is_err());
        assert_eq!(sub.status(), QueryStatus::Errored);
        assert_eq!(*sub.data().unwrap(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn unused_entry_is_evicted_after_grace_period() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut sub = cache.subscribe(key("reward.list"), vec![Tag::new("Reward")], counting_fetch(&calls));
        sub.settled().await.unwrap();
        drop(sub);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(cache.contains(&key("reward.list")));

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(!cache.contains(&key("reward.list")));
    }

    #[tokio::test(start_paused = true)]
    async fn resubscribe_cancels_pending_eviction() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut sub = cache.subscribe(key("admin.list"), vec![Tag::new("Admin")], counting_fetch(&calls));
        sub.settled().await.unwrap();
        drop(sub);
        tokio::time::sleep(Duration::from_secs(59)).await;

        let mut back = cache.subscribe(key("admin.list"), vec![Tag::new("Admin")], counting_fetch(&calls));
        tokio::time::sleep(Duration::from_secs(120)).await;

        assert!(cache.contains(&key("admin.list")));
        back.settled().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn result_discarded_when_last_subscriber_leaves() {
        let cache = QueryCache::default();
        let (release, gate) = tokio::sync::oneshot::channel::<()>();
        let gate = Arc::new(tokio::sync::Mutex::new(Some(gate)));

        let sub = cache.subscribe(key("post.list"), vec![Tag::new("Post")], move || {
            let gate = Arc::clone(&gate);
            Box::pin(async move {
                if let Some(rx) = gate.lock().await.take() {
                    let _ = rx.await;
                }
                Ok(1_u8)
            }) as BoxFuture<'static, Result<u8, CoreError>>
        });
        assert_eq!(sub.status(), QueryStatus::Pending);
        drop(sub);

        release.send(()).unwrap();
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(cache.status(&key("post.list")), Some(QueryStatus::Idle));
    }

    #[tokio::test]
    async fn changed_waits_for_next_transition() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut sub = cache.subscribe(key("event.list"), vec![Tag::new("Event")], counting_fetch(&calls));
        sub.settled().await.unwrap();

        let mut changed = tokio_test::task::spawn(sub.changed());
        assert_pending!(changed.poll());
    }

    #[tokio::test]
    async fn teardown_empties_cache() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut sub = cache.subscribe(key("trip.list"), vec![Tag::new("Trip")], counting_fetch(&calls));
        sub.settled().await.unwrap();

        cache.teardown();
        assert!(cache.is_empty());
    }
}
