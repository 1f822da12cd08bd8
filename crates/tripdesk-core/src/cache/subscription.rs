use std::any::Any;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::watch;
use tokio_stream::Stream;
use tokio_stream::wrappers::WatchStream;

use super::state::{ErasedState, downcast};
use super::{CacheEntry, CacheInner, QueryKey, QueryState, QueryStatus};
use crate::error::CoreError;

/// Keeps one subscriber counted on an entry until dropped.
struct Lease {
    cache: Arc<CacheInner>,
    entry: Arc<CacheEntry>,
}

impl Drop for Lease {
    fn drop(&mut self) {
        self.cache.release(&self.entry);
    }
}

/// Live view of one cached query.
///
/// Dropping the last subscription for a key starts its eviction timer.
pub struct QuerySubscription<T> {
    receiver: watch::Receiver<ErasedState>,
    lease: Lease,
    _type: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> QuerySubscription<T> {
    pub(super) fn new(cache: Arc<CacheInner>, entry: Arc<CacheEntry>) -> Self {
        Self {
            receiver: entry.receiver(),
            lease: Lease { cache, entry },
            _type: PhantomData,
        }
    }

    pub fn key(&self) -> &QueryKey {
        self.lease.entry.key()
    }

    /// Current state snapshot.
    pub fn state(&self) -> QueryState<T> {
        downcast(&self.receiver.borrow())
    }

    pub fn status(&self) -> QueryStatus {
        self.receiver.borrow().status()
    }

    pub fn data(&self) -> Option<Arc<T>> {
        self.state().data()
    }

    /// Wait for the next state transition. `None` once the entry is gone.
    pub async fn changed(&mut self) -> Option<QueryState<T>> {
        self.receiver.changed().await.ok()?;
        Some(downcast(&self.receiver.borrow_and_update()))
    }

    /// Wait until the query is `Resolved` or `Errored`.
    pub async fn settled(&mut self) -> Result<Arc<T>, CoreError> {
        loop {
            match downcast::<T>(&self.receiver.borrow_and_update()) {
                QueryState::Resolved(value) => return Ok(value),
                QueryState::Errored { error, .. } => return Err(error),
                QueryState::Idle | QueryState::Pending | QueryState::Refetching(_) => {}
            }
            if self.receiver.changed().await.is_err() {
                return Err(CoreError::Internal(format!("cache entry {} was dropped", self.key())));
            }
        }
    }

    /// Refetch regardless of freshness.
    pub fn refetch(&self) {
        self.lease.entry.request_fetch();
    }

    /// Convert into a stream of states, starting with the current one.
    pub fn into_stream(self) -> QueryStream<T> {
        QueryStream {
            inner: WatchStream::new(self.receiver),
            _lease: self.lease,
            _type: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for QuerySubscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuerySubscription")
            .field("key", self.lease.entry.key())
            .field("status", &self.receiver.borrow().status())
            .finish()
    }
}

/// Stream form of a [`QuerySubscription`].
pub struct QueryStream<T> {
    inner: WatchStream<ErasedState>,
    _lease: Lease,
    _type: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> Stream for QueryStream<T> {
    type Item = QueryState<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner)
            .poll_next(cx)
            .map(|state| state.map(|state| downcast(&state)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use tokio_stream::StreamExt;

    use super::super::{QueryCache, Tag};
    use super::*;

    #[tokio::test]
    async fn stream_yields_pending_then_resolved() {
        let cache = QueryCache::new(Duration::ZERO);
        let sub = cache.subscribe(QueryKey::new("trip.list", ""), vec![Tag::new("Trip")], || async {
            Ok::<_, CoreError>(vec![1_u8, 2])
        });

        let mut stream = sub.into_stream();
        assert_eq!(stream.next().await.unwrap().status(), QueryStatus::Pending);
        let resolved = stream.next().await.unwrap();
        assert_eq!(*resolved.data().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn zero_grace_period_evicts_on_drop() {
        let cache = QueryCache::new(Duration::ZERO);
        let key = QueryKey::new("event.list", "");
        let mut sub = cache.subscribe(key.clone(), vec![Tag::new("Event")], || async { Ok::<_, CoreError>(1_u8) });
        sub.settled().await.unwrap();
        drop(sub);
        assert!(!cache.contains(&key));
    }
}
