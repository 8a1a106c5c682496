//! The processor bridge.
//!
//! A processor is a world-aware async function with a stable identity. The
//! [`Runtime`] binds processors to bus events through exactly one wrapper
//! handler per processor, so a processor bound to several events can later be
//! unbound from all of them at once.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use futures::future::BoxFuture;

use nocturne_foundation::{Result, Value};
use nocturne_storage::World;

use crate::args::Args;
use crate::bus::{EventBus, EventHandler};

static NEXT_PROCESSOR_ID: AtomicU64 = AtomicU64::new(0);

/// Stable identity of one processor.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessorId(u64);

impl ProcessorId {
    fn next() -> Self {
        Self(NEXT_PROCESSOR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for ProcessorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProcessorId({})", self.0)
    }
}

type ProcessorFn =
    Arc<dyn Fn(Arc<World>, Args) -> BoxFuture<'static, Result<Option<Value>>> + Send + Sync>;

/// A named, world-aware async function with a stable identity.
#[derive(Clone)]
pub struct Processor {
    id: ProcessorId,
    name: Arc<str>,
    func: ProcessorFn,
}

impl Processor {
    /// Wraps an async function as a processor, minting a fresh id.
    pub fn new<F, Fut>(name: impl Into<Arc<str>>, func: F) -> Self
    where
        F: Fn(Arc<World>, Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Value>>> + Send + 'static,
    {
        Self {
            id: ProcessorId::next(),
            name: name.into(),
            func: Arc::new(move |world, args| func(world, args).boxed()),
        }
    }

    /// Returns this processor's stable identity.
    #[must_use]
    pub fn id(&self) -> ProcessorId {
        self.id
    }

    /// Returns this processor's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the wrapped function.
    ///
    /// # Errors
    ///
    /// Propagates the wrapped function's error unchanged.
    pub async fn call(&self, world: Arc<World>, args: Args) -> Result<Option<Value>> {
        (self.func)(world, args).await
    }
}

impl fmt::Debug for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Processor")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

struct Binding {
    handler: EventHandler,
    events: HashSet<String>,
}

/// Binds a world and a bus, routing bus events into processors.
pub struct Runtime {
    world: Arc<World>,
    bus: Arc<EventBus>,
    bindings: Mutex<HashMap<ProcessorId, Binding>>,
}

impl Runtime {
    /// Creates a runtime over the given world and bus.
    #[must_use]
    pub fn new(world: Arc<World>, bus: Arc<EventBus>) -> Self {
        Self {
            world,
            bus,
            bindings: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the bound world.
    #[must_use]
    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    /// Returns the bound bus.
    #[must_use]
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Subscribes a processor to each named event.
    ///
    /// The same wrapper handler is reused across calls, so repeat
    /// registrations extend the processor's recorded event set instead of
    /// stacking duplicate subscriptions.
    pub fn register_processor_events<I, S>(&self, processor: &Processor, events: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut bindings = self.bindings.lock().expect("runtime lock poisoned");
        let binding = bindings.entry(processor.id()).or_insert_with(|| {
            let world = Arc::clone(&self.world);
            let processor = processor.clone();
            Binding {
                handler: EventHandler::new(move |args| {
                    let world = Arc::clone(&world);
                    let processor = processor.clone();
                    async move { processor.call(world, args).await }
                }),
                events: HashSet::new(),
            }
        });

        for event in events {
            let event = event.into();
            self.bus.set_handler(&event, binding.handler.clone());
            binding.events.insert(event);
        }
    }

    /// Unsubscribes a processor from every event it was registered for.
    ///
    /// A no-op for an unknown processor.
    pub fn unregister_processor_events(&self, processor: &Processor) {
        let binding = {
            let mut bindings = self.bindings.lock().expect("runtime lock poisoned");
            bindings.remove(&processor.id())
        };
        if let Some(binding) = binding {
            for event in &binding.events {
                self.bus.remove_handler(event, binding.handler.id());
            }
        }
    }

    /// Invokes a processor directly, bypassing the bus.
    ///
    /// # Errors
    ///
    /// Propagates the processor's error to the caller; nothing is logged or
    /// swallowed on this path.
    pub async fn run_processor(&self, processor: &Processor, args: Args) -> Result<Option<Value>> {
        processor.call(Arc::clone(&self.world), args).await
    }
}
