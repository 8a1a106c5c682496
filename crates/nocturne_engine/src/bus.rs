//! Publish/subscribe event bus with failure-isolated fan-out.
//!
//! The bus is an explicit context object: construct one, share it by `Arc`.
//! Dispatch clones the current subscriber set, starts every handler future
//! with identical arguments, and awaits them all together. A handler error is
//! logged and excluded; it never fails the dispatch or disturbs sibling
//! handlers.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use tracing::error;

use nocturne_foundation::{Result, Value};

use crate::args::Args;

static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(0);

/// Stable identity of one subscribed handler.
///
/// Ids are process-unique, so re-subscribing the same handler is idempotent
/// while two handlers wrapping the same closure stay distinct.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandlerId(u64);

impl HandlerId {
    fn next() -> Self {
        Self(NEXT_HANDLER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandlerId({})", self.0)
    }
}

type HandlerFn = Arc<dyn Fn(Args) -> BoxFuture<'static, Result<Option<Value>>> + Send + Sync>;

/// An async event handler with a stable identity.
///
/// `Some(value)` is a real result; `None` is an explicit "no value", distinct
/// from any `Value` the handler could return.
#[derive(Clone)]
pub struct EventHandler {
    id: HandlerId,
    func: HandlerFn,
}

impl EventHandler {
    /// Wraps an async function as a handler, minting a fresh id.
    pub fn new<F, Fut>(func: F) -> Self
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Value>>> + Send + 'static,
    {
        Self {
            id: HandlerId::next(),
            func: Arc::new(move |args| func(args).boxed()),
        }
    }

    /// Returns this handler's stable identity.
    #[must_use]
    pub fn id(&self) -> HandlerId {
        self.id
    }

    fn call(&self, args: Args) -> BoxFuture<'static, Result<Option<Value>>> {
        (self.func)(args)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler").field("id", &self.id).finish()
    }
}

/// Publish/subscribe event bus.
#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<HashMap<String, BTreeMap<HandlerId, EventHandler>>>,
}

impl EventBus {
    /// Creates a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a handler to an event. Idempotent by handler id.
    pub fn set_handler(&self, event: &str, handler: EventHandler) {
        let mut subscribers = self.subscribers.lock().expect("bus lock poisoned");
        subscribers
            .entry(event.to_owned())
            .or_default()
            .entry(handler.id)
            .or_insert(handler);
    }

    /// Unsubscribes a handler from an event.
    ///
    /// Returns true if the handler was subscribed. The event's entry is
    /// pruned when its last subscriber leaves.
    pub fn remove_handler(&self, event: &str, id: HandlerId) -> bool {
        let mut subscribers = self.subscribers.lock().expect("bus lock poisoned");
        let Some(handlers) = subscribers.get_mut(event) else {
            return false;
        };
        let removed = handlers.remove(&id).is_some();
        if handlers.is_empty() {
            subscribers.remove(event);
        }
        removed
    }

    /// Publishes an event to every subscribed handler.
    ///
    /// All handler futures are created before any is polled, each with its
    /// own clone of `args`. Results arrive in subscription-id order; a
    /// handler error is logged and excluded from the list. Never fails; with
    /// zero subscribers the list is empty.
    pub async fn dispatch(&self, event: &str, args: Args) -> Vec<Option<Value>> {
        let handlers: Vec<EventHandler> = {
            let subscribers = self.subscribers.lock().expect("bus lock poisoned");
            subscribers
                .get(event)
                .map(|handlers| handlers.values().cloned().collect())
                .unwrap_or_default()
        };

        let futures: Vec<_> = handlers
            .iter()
            .map(|handler| handler.call(args.clone()))
            .collect();

        let mut results = Vec::with_capacity(handlers.len());
        for (handler, outcome) in handlers.iter().zip(join_all(futures).await) {
            match outcome {
                Ok(value) => results.push(value),
                Err(err) => {
                    error!(%event, handler = ?handler.id(), %err, "handler failed; excluding its result");
                }
            }
        }
        results
    }

    /// Returns the number of handlers subscribed to an event.
    #[must_use]
    pub fn handler_count(&self, event: &str) -> usize {
        self.subscribers
            .lock()
            .expect("bus lock poisoned")
            .get(event)
            .map_or(0, BTreeMap::len)
    }

    /// Returns the number of events with at least one subscriber.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.subscribers.lock().expect("bus lock poisoned").len()
    }

    /// Removes every subscription.
    pub fn clear(&self) {
        self.subscribers.lock().expect("bus lock poisoned").clear();
    }
}
