// ── Four-state resource ──
//
// Every long-running operation publishes its progress through a
// `ResourceCell`, a `watch` channel holding a `Resource<T>`. Consumers
// subscribe and render whatever state is current.

use serde::Serialize;
use tokio::sync::watch;

/// State of an asynchronously produced value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum Resource<T> {
    Success(T),
    /// Failure, optionally with the last good value.
    Error {
        message: String,
        data: Option<T>,
    },
    Loading,
    Empty,
}

impl<T> Resource<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            data: None,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            Self::Error { data, .. } => data.as_ref(),
            Self::Loading | Self::Empty => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// `Success` or `Error`.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Error { .. })
    }
}

/// Observable holder of a [`Resource`].
///
/// Transitions: `Empty`/`Loading` → `Loading` via [`start`](Self::start);
/// `Loading` → `Success`/`Error`; settled → `Loading` only via
/// [`refetch`](Self::refetch); any state → `Empty` via [`clear`](Self::clear).
#[derive(Debug)]
pub struct ResourceCell<T> {
    tx: watch::Sender<Resource<T>>,
}

impl<T: Clone> Default for ResourceCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> ResourceCell<T> {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Resource::Empty);
        Self { tx }
    }

    /// Current state (cloned).
    pub fn get(&self) -> Resource<T> {
        self.tx.borrow().clone()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<Resource<T>> {
        self.tx.subscribe()
    }

    /// Move to `Loading`. Returns `false` and leaves the value untouched
    /// when the cell already holds a result.
    pub fn start(&self) -> bool {
        self.tx.send_if_modified(|state| {
            if state.is_settled() {
                false
            } else {
                *state = Resource::Loading;
                true
            }
        });
        self.tx.borrow().is_loading()
    }

    /// Discard any result and move to `Loading`.
    pub fn refetch(&self) {
        self.tx.send_replace(Resource::Loading);
    }

    pub fn succeed(&self, data: T) {
        self.tx.send_replace(Resource::Success(data));
    }

    /// Record a failure, keeping the last good value if there was one.
    pub fn fail(&self, message: impl Into<String>) {
        let message = message.into();
        self.tx.send_modify(|state| {
            let data = state.data().cloned();
            *state = Resource::Error { message, data };
        });
    }

    pub fn clear(&self) {
        self.tx.send_replace(Resource::Empty);
    }
}
