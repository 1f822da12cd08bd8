use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::CoreError;

/// Type-erased cached value.
pub(crate) type Payload = Arc<dyn Any + Send + Sync>;

pub(crate) type ErasedState = QueryState<dyn Any + Send + Sync>;

/// Discriminant of [`QueryState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum QueryStatus {
    Idle,
    Pending,
    Resolved,
    Refetching,
    Errored,
}

/// Lifecycle of one cached query.
///
/// `Refetching` keeps the previous value visible while a fresh fetch is in
/// flight; `Errored` keeps it too when there was one.
pub enum QueryState<T: ?Sized> {
    Idle,
    Pending,
    Resolved(Arc<T>),
    Refetching(Arc<T>),
    Errored {
        error: CoreError,
        previous: Option<Arc<T>>,
    },
}

impl<T: ?Sized> QueryState<T> {
    pub fn status(&self) -> QueryStatus {
        match self {
            Self::Idle => QueryStatus::Idle,
            Self::Pending => QueryStatus::Pending,
            Self::Resolved(_) => QueryStatus::Resolved,
            Self::Refetching(_) => QueryStatus::Refetching,
            Self::Errored { .. } => QueryStatus::Errored,
        }
    }

    /// Most recent value, if any.
    pub fn data(&self) -> Option<Arc<T>> {
        match self {
            Self::Resolved(v) | Self::Refetching(v) => Some(Arc::clone(v)),
            Self::Errored { previous, .. } => previous.clone(),
            Self::Idle | Self::Pending => None,
        }
    }

    pub fn error(&self) -> Option<&CoreError> {
        match self {
            Self::Errored { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Pending | Self::Refetching(_))
    }

    /// State shown while a fetch is in flight.
    pub(crate) fn begin_fetch(&self) -> Self {
        self.data().map_or(Self::Pending, Self::Refetching)
    }

    /// State left behind when a fetch result is discarded.
    pub(crate) fn abandon(&self) -> Self {
        match self {
            Self::Pending => Self::Idle,
            Self::Refetching(v) => Self::Resolved(Arc::clone(v)),
            other => other.clone(),
        }
    }
}

impl<T: ?Sized> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::Pending => Self::Pending,
            Self::Resolved(v) => Self::Resolved(Arc::clone(v)),
            Self::Refetching(v) => Self::Refetching(Arc::clone(v)),
            Self::Errored { error, previous } => Self::Errored {
                error: error.clone(),
                previous: previous.clone(),
            },
        }
    }
}

impl<T: ?Sized> fmt::Debug for QueryState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Errored { error, previous } => f
                .debug_struct("Errored")
                .field("error", error)
                .field("has_previous", &previous.is_some())
                .finish(),
            other => write!(f, "{}", other.status()),
        }
    }
}

/// Recover the concrete type of an erased state.
///
/// A key is always fetched by the same operation, so a mismatch means two
/// operations share a key; it surfaces as an `Internal` error.
pub(crate) fn downcast<T: Any + Send + Sync>(state: &ErasedState) -> QueryState<T> {
    fn cast<T: Any + Send + Sync>(payload: &Payload) -> Option<Arc<T>> {
        Arc::clone(payload).downcast::<T>().ok()
    }
    let mismatch = || QueryState::Errored {
        error: CoreError::Internal("cached value has an unexpected type".into()),
        previous: None,
    };

    match state {
        QueryState::Idle => QueryState::Idle,
        QueryState::Pending => QueryState::Pending,
        QueryState::Resolved(p) => cast::<T>(p).map_or_else(mismatch, QueryState::Resolved),
        QueryState::Refetching(p) => cast::<T>(p).map_or_else(mismatch, QueryState::Refetching),
        QueryState::Errored { error, previous } => QueryState::Errored {
            error: error.clone(),
            previous: previous.as_ref().and_then(cast::<T>),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn begin_fetch_keeps_previous_value() {
        let resolved: QueryState<u32> = QueryState::Resolved(Arc::new(3));
        let next = resolved.begin_fetch();
        assert_eq!(next.status(), QueryStatus::Refetching);
        assert_eq!(*next.data().unwrap(), 3);

        let idle: QueryState<u32> = QueryState::Idle;
        assert_eq!(idle.begin_fetch().status(), QueryStatus::Pending);
    }

    #[test]
    fn abandon_restores_settled_state() {
        let pending: QueryState<u32> = QueryState::Pending;
        assert_eq!(pending.abandon().status(), QueryStatus::Idle);

        let refetching: QueryState<u32> = QueryState::Refetching(Arc::new(1));
        assert_eq!(refetching.abandon().status(), QueryStatus::Resolved);
    }

    #[test]
    fn downcast_mismatch_is_internal_error() {
        let erased: ErasedState = QueryState::Resolved(Arc::new(5_u32) as Payload);
        assert_eq!(*downcast::<u32>(&erased).data().unwrap(), 5);

        let wrong = downcast::<String>(&erased);
        assert!(matches!(wrong.error(), Some(CoreError::Internal(_))));
    }
}
