//! Integration tests for the processor bridge.
//!
//! Tests event binding, unbinding, and direct invocation.

use std::sync::Arc;

use nocturne_engine::{Args, EventBus, Processor, Runtime};
use nocturne_foundation::{Error, Value};
use nocturne_storage::testing::Health;
use nocturne_storage::{ComponentRegistry, ComponentType, MemoryStore, World, erase};

fn runtime() -> Runtime {
    let registry = Arc::new(ComponentRegistry::new());
    registry.register::<Health>();
    let world = Arc::new(World::new(registry, Arc::new(MemoryStore::new())));
    Runtime::new(world, Arc::new(EventBus::new()))
}

// =============================================================================
// Binding
// =============================================================================

#[tokio::test]
async fn one_processor_can_serve_many_events() {
    let runtime = runtime();
    let processor = Processor::new("greeter", |_world, _args| async {
        Ok(Some(Value::from("hello")))
    });
    runtime.register_processor_events(&processor, ["joined", "returned"]);

    for event in ["joined", "returned"] {
        let results = runtime.bus().dispatch(event, Args::new()).await;
        assert_eq!(results, vec![Some(Value::from("hello"))]);
    }
}

#[tokio::test]
async fn rebinding_extends_instead_of_stacking() {
    let runtime = runtime();
    let processor = Processor::new("echo", |_world, _args| async { Ok(None) });
    runtime.register_processor_events(&processor, ["a"]);
    runtime.register_processor_events(&processor, ["a", "b"]);

    assert_eq!(runtime.bus().handler_count("a"), 1);
    assert_eq!(runtime.bus().handler_count("b"), 1);
}

#[tokio::test]
async fn unregister_removes_the_processor_from_every_event() {
    let runtime = runtime();
    let leaving = Processor::new("leaving", |_world, _args| async {
        Ok(Some(Value::Int(1)))
    });
    let staying = Processor::new("staying", |_world, _args| async {
        Ok(Some(Value::Int(2)))
    });
    runtime.register_processor_events(&leaving, ["x", "y", "z"]);
    runtime.register_processor_events(&staying, ["y"]);

    runtime.unregister_processor_events(&leaving);

    assert_eq!(runtime.bus().handler_count("x"), 0);
    assert_eq!(runtime.bus().handler_count("z"), 0);
    assert_eq!(
        runtime.bus().dispatch("y", Args::new()).await,
        vec![Some(Value::Int(2))]
    );
}

// =============================================================================
// Invocation
// =============================================================================

#[tokio::test]
async fn processors_act_on_the_shared_world() {
    let runtime = runtime();
    let spawn = Processor::new("spawn", |world: Arc<World>, args: Args| async move {
        let hp = args.value("hp").and_then(Value::as_int).unwrap_or(1);
        let id = world.add_components(None, vec![erase(Health::new(hp))]).await?;
        Ok(Some(Value::Id(id)))
    });
    runtime.register_processor_events(&spawn, ["spawn"]);

    let results = runtime
        .bus()
        .dispatch("spawn", Args::new().with_value("hp", 30_i64))
        .await;
    let id = results[0].as_ref().unwrap().as_id().unwrap();

    assert_eq!(runtime.world().get::<Health>(id).unwrap().current(), 30);
    assert_eq!(runtime.world().query(&[Health::KIND]).len(), 1);
}

#[tokio::test]
async fn run_processor_surfaces_errors_the_bus_would_swallow() {
    let runtime = runtime();
    let broken = Processor::new("broken", |_world, _args| async {
        Err(Error::internal("bad wiring"))
    });

    // Direct invocation propagates.
    assert!(runtime.run_processor(&broken, Args::new()).await.is_err());

    // Bus dispatch isolates.
    runtime.register_processor_events(&broken, ["tick"]);
    assert!(runtime.bus().dispatch("tick", Args::new()).await.is_empty());
}
