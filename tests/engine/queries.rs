//! Integration tests for the query combinators.
//!
//! Tests key validation, early exit, aggregation, and snapshot behavior.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use nocturne_engine::{
    Aggregator, Args, Flow, WORLD_KEY, query, query_component_loop, query_entity_component_loop,
    query_entity_loop,
};
use nocturne_foundation::{ErrorKind, Value};
use nocturne_storage::testing::{Health, Name};
use nocturne_storage::{ComponentRegistry, ComponentType, MemoryStore, World, erase};

fn fresh_world() -> Arc<World> {
    let registry = Arc::new(ComponentRegistry::new());
    registry.register::<Health>();
    registry.register::<Name>();
    Arc::new(World::new(registry, Arc::new(MemoryStore::new())))
}

fn sum() -> Aggregator {
    Arc::new(|values: Vec<Value>| Value::Int(values.iter().filter_map(Value::as_int).sum()))
}

// =============================================================================
// Wrap-Time Validation
// =============================================================================

#[test]
fn unusable_result_keys_fail_before_registration() {
    for key in ["", " ", "two words", WORLD_KEY] {
        let err = query("probe", key, vec![], |_world, _args| async { Ok(None) })
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidParameter(_)));
    }
}

// =============================================================================
// Single-Shot Query
// =============================================================================

#[tokio::test]
async fn query_hands_the_handler_the_full_id_set() {
    let world = fresh_world();
    for hp in [1_i64, 2, 3] {
        world
            .add_components(None, vec![erase(Health::new(hp))])
            .await
            .unwrap();
    }

    let processor = query(
        "census",
        "matched",
        vec![Health::KIND],
        |world: Arc<World>, args: Args| async move {
            let matched = args.ids("matched").unwrap();
            let total: i64 = matched
                .iter()
                .filter_map(|id| world.get::<Health>(*id))
                .map(|h| h.current())
                .sum();
            Ok(Some(Value::Int(total)))
        },
    )
    .unwrap();

    let result = processor.call(world, Args::new()).await.unwrap();
    assert_eq!(result, Some(Value::Int(6)));
}

// =============================================================================
// Early Exit and Aggregation
// =============================================================================

#[tokio::test]
async fn stop_payload_counts_toward_the_aggregate() {
    let world = fresh_world();
    for _ in 0..10 {
        world
            .add_components(None, vec![erase(Health::new(1))])
            .await
            .unwrap();
    }

    let calls = Arc::new(AtomicUsize::new(0));
    let counted = Arc::clone(&calls);
    let processor = query_entity_component_loop(
        "partial-sum",
        "subject",
        Some(sum()),
        vec![Health::KIND],
        move |_world, _args| {
            let counted = Arc::clone(&counted);
            async move {
                let nth = counted.fetch_add(1, Ordering::Relaxed) + 1;
                if nth == 4 {
                    Ok(Flow::Stop(Some(Value::Int(1))))
                } else {
                    Ok(Flow::Continue(Value::Int(1)))
                }
            }
        },
    )
    .unwrap();

    // Ten entities match, but the loop halts after the fourth visit.
    let result = processor.call(world, Args::new()).await.unwrap();
    assert_eq!(result, Some(Value::Int(4)));
    assert_eq!(calls.load(Ordering::Relaxed), 4);
}

#[tokio::test]
async fn loops_without_an_aggregator_return_no_value() {
    let world = fresh_world();
    world
        .add_components(None, vec![erase(Health::new(1))])
        .await
        .unwrap();

    let processor = query_entity_loop(
        "visit",
        "subject",
        None,
        vec![Health::KIND],
        |_world, _args| async { Ok(Flow::Continue(Value::Int(1))) },
    )
    .unwrap();

    assert_eq!(processor.call(world, Args::new()).await.unwrap(), None);
}

// =============================================================================
// Snapshots
// =============================================================================

#[tokio::test]
async fn component_loops_see_the_loop_start_snapshot() {
    let world = fresh_world();
    for hp in [10_i64, 20] {
        world
            .add_components(None, vec![erase(Health::new(hp)), erase(Name::new("n"))])
            .await
            .unwrap();
    }

    let processor = query_component_loop(
        "observe",
        "subject",
        Some(sum()),
        vec![Health::KIND],
        |world: Arc<World>, args: Args| async move {
            let subset = args.components("subject").unwrap();
            // Only the queried kind is injected.
            assert!(!subset.contains_key(&Name::KIND));
            let hp = subset[&Health::KIND].downcast_ref::<Health>().unwrap().current();

            // Mutations during the loop do not reach later snapshots.
            for id in world.query(&[Health::KIND]) {
                world.add_components(Some(id), vec![erase(Health::new(0))]).await?;
            }
            Ok(Flow::Continue(Value::Int(hp)))
        },
    )
    .unwrap();

    let result = processor.call(Arc::clone(&world), Args::new()).await.unwrap();
    assert_eq!(result, Some(Value::Int(30)));
}

// =============================================================================
// Dispatch Integration
// =============================================================================

#[tokio::test]
async fn combinator_errors_are_isolated_at_the_bus() {
    use nocturne_engine::{EventBus, Runtime};
    use nocturne_foundation::Error;

    let world = fresh_world();
    world
        .add_components(None, vec![erase(Health::new(1))])
        .await
        .unwrap();
    let runtime = Runtime::new(Arc::clone(&world), Arc::new(EventBus::new()));

    let fragile = query_entity_loop(
        "fragile",
        "subject",
        Some(sum()),
        vec![Health::KIND],
        |_world, _args| async { Err(Error::internal("mid-loop failure")) },
    )
    .unwrap();
    let steady = query_entity_loop(
        "steady",
        "subject",
        Some(sum()),
        vec![Health::KIND],
        |_world, _args| async { Ok(Flow::Continue(Value::Int(1))) },
    )
    .unwrap();

    runtime.register_processor_events(&fragile, ["tick"]);
    runtime.register_processor_events(&steady, ["tick"]);

    let results = runtime.bus().dispatch("tick", Args::new()).await;
    assert_eq!(results, vec![Some(Value::Int(1))]);
}
