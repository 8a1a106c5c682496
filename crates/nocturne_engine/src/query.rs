//! Query combinators: adapters from per-entity handlers to processors.
//!
//! Each constructor wraps a handler function into a [`Processor`] that runs a
//! world query and feeds the handler from it. The loop variants fix their
//! visit plan (matching ids, ascending, plus any component snapshots) before
//! calling the handler, so mid-loop world mutations never change what the
//! remaining iterations see.
//!
//! Per-iteration handlers steer the loop through [`Flow`]: `Continue(value)`
//! appends to the accumulator, `Stop(payload)` optionally appends and halts.
//! With an aggregator the combinator returns `Some(aggregator(accumulated))`;
//! without one it returns `None`, the explicit "no value".

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use nocturne_foundation::{EntityId, Error, Result, Value};
use nocturne_storage::{ComponentKind, World};

use crate::args::{Arg, Args};
use crate::processor::Processor;

/// Reserved argument key. The world reaches handlers as a typed parameter,
/// never through the argument map, so no injection may shadow this name.
pub const WORLD_KEY: &str = "world";

/// Per-iteration steering decision.
#[derive(Clone, Debug, PartialEq)]
pub enum Flow {
    /// Append the value and keep iterating.
    Continue(Value),
    /// Halt immediately; an optional final payload is appended first.
    Stop(Option<Value>),
}

/// Folds the accumulated per-iteration values into one result.
pub type Aggregator = Arc<dyn Fn(Vec<Value>) -> Value + Send + Sync>;

type LoopFn = Arc<dyn Fn(Arc<World>, Args) -> BoxFuture<'static, Result<Flow>> + Send + Sync>;

fn validated_key(key: &str) -> Result<String> {
    if key.is_empty() || key.chars().any(char::is_whitespace) {
        return Err(Error::invalid_parameter(format!(
            "result key {key:?} must be non-empty and contain no whitespace"
        )));
    }
    if key == WORLD_KEY {
        return Err(Error::invalid_parameter(format!(
            "result key {WORLD_KEY:?} is reserved"
        )));
    }
    Ok(key.to_owned())
}

/// Wraps a handler that wants the whole matching id set at once.
///
/// The processor runs `world.query(kinds)`, injects the id set under `key`,
/// calls `f` exactly once, and returns its result unchanged.
///
/// # Errors
///
/// Fails at wrap time with `InvalidParameter` when the key is empty, contains
/// whitespace, or is the reserved [`WORLD_KEY`].
pub fn query<F, Fut>(
    name: &str,
    key: &str,
    kinds: Vec<ComponentKind>,
    f: F,
) -> Result<Processor>
where
    F: Fn(Arc<World>, Args) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<Value>>> + Send + 'static,
{
    let key = validated_key(key)?;
    let kinds: Arc<[ComponentKind]> = kinds.into();
    let f = Arc::new(f);
    Ok(Processor::new(name, move |world: Arc<World>, args: Args| {
        let key = key.clone();
        let kinds = Arc::clone(&kinds);
        let f = Arc::clone(&f);
        async move {
            let ids = world.query(&kinds);
            let args = args.with(key, Arg::Ids(ids));
            f(world, args).await
        }
    }))
}

/// Wraps a handler called once per matching entity with that entity's
/// component subset (the queried kinds only), snapshotted at loop start.
///
/// # Errors
///
/// Fails at wrap time with `InvalidParameter` on a bad result key.
pub fn query_component_loop<F, Fut>(
    name: &str,
    key: &str,
    aggregator: Option<Aggregator>,
    kinds: Vec<ComponentKind>,
    f: F,
) -> Result<Processor>
where
    F: Fn(Arc<World>, Args) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Flow>> + Send + 'static,
{
    let key = validated_key(key)?;
    let f: LoopFn = Arc::new(move |world, args| f(world, args).boxed());
    Ok(loop_processor(
        name,
        key,
        aggregator,
        kinds.into(),
        f,
        |world, id, kinds| world.components(id, kinds).map(Arg::Components),
    ))
}

/// Wraps a handler called once per matching entity with the bare entity id.
///
/// # Errors
///
/// Fails at wrap time with `InvalidParameter` on a bad result key.
pub fn query_entity_loop<F, Fut>(
    name: &str,
    key: &str,
    aggregator: Option<Aggregator>,
    kinds: Vec<ComponentKind>,
    f: F,
) -> Result<Processor>
where
    F: Fn(Arc<World>, Args) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Flow>> + Send + 'static,
{
    let key = validated_key(key)?;
    let f: LoopFn = Arc::new(move |world, args| f(world, args).boxed());
    Ok(loop_processor(
        name,
        key,
        aggregator,
        kinds.into(),
        f,
        |_world, id, _kinds| Some(Arg::Entity(id)),
    ))
}

/// Wraps a handler called once per matching entity with the id and the
/// entity's full component map, snapshotted at loop start.
///
/// # Errors
///
/// Fails at wrap time with `InvalidParameter` on a bad result key.
pub fn query_entity_component_loop<F, Fut>(
    name: &str,
    key: &str,
    aggregator: Option<Aggregator>,
    kinds: Vec<ComponentKind>,
    f: F,
) -> Result<Processor>
where
    F: Fn(Arc<World>, Args) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Flow>> + Send + 'static,
{
    let key = validated_key(key)?;
    let f: LoopFn = Arc::new(move |world, args| f(world, args).boxed());
    Ok(loop_processor(
        name,
        key,
        aggregator,
        kinds.into(),
        f,
        |world, id, _kinds| {
            world
                .components(id, &[])
                .map(|components| Arg::EntityComponents(id, components))
        },
    ))
}

/// Shared loop body for the three per-entity combinators.
///
/// `snapshot` builds the injected argument for one id; an id whose entity
/// vanished between the query and the snapshot is skipped.
fn loop_processor(
    name: &str,
    key: String,
    aggregator: Option<Aggregator>,
    kinds: Arc<[ComponentKind]>,
    f: LoopFn,
    snapshot: fn(&World, EntityId, &[ComponentKind]) -> Option<Arg>,
) -> Processor {
    Processor::new(name, move |world: Arc<World>, args: Args| {
        let key = key.clone();
        let kinds = Arc::clone(&kinds);
        let f = Arc::clone(&f);
        let aggregator = aggregator.clone();
        async move {
            // The visit plan is fixed before the first handler call: matching
            // ids in ascending order, each with its injected snapshot.
            let plan: Vec<Arg> = world
                .query(&kinds)
                .into_iter()
                .filter_map(|id| snapshot(&world, id, &kinds))
                .collect();

            let mut accumulated = Vec::new();
            for arg in plan {
                let call_args = args.clone().with(key.clone(), arg);
                match f(Arc::clone(&world), call_args).await? {
                    Flow::Continue(value) => accumulated.push(value),
                    Flow::Stop(payload) => {
                        if let Some(value) = payload {
                            accumulated.push(value);
                        }
                        break;
                    }
                }
            }
            Ok(aggregator.as_ref().map(|aggregate| aggregate(accumulated)))
        }
    })
}
