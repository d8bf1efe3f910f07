mod common;

use common::{drain, Fixture};
use maphost::prelude::*;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[tokio::test]
async fn test_pipeline_stages_run_in_order() {
    let fx = Fixture::new();
    fx.provide_platform();
    let host = fx
        .builder()
        .zoom(8)
        .center(LatLng::new(0.0, 0.0))
        .attr("mapTypeId", "roadmap")
        .build()
        .unwrap();

    let pipeline = host.spawn();
    drain().await;
    assert_eq!(host.stage(), Stage::AwaitingCanvas);

    // The canvas only counts once the render pass settles.
    host.register_canvas(Canvas::new("X"), false);
    drain().await;
    assert_eq!(host.stage(), Stage::AwaitingCanvas);
    fx.checkpoint.settle();
    drain().await;

    assert_eq!(host.stage(), Stage::AwaitingIdle);
    assert!(host.map().is_none());
    let map = fx.platform.last_map().unwrap();
    assert_eq!(map.canvas(), &Canvas::new("X"));
    assert_eq!(
        Value::Object(map.initial_options().clone()),
        json!({ "center": { "lat": 0.0, "lng": 0.0 }, "zoom": 8, "mapTypeId": "roadmap" })
    );

    fx.paint().await;
    assert_eq!(host.stage(), Stage::Ready);
    assert!(host.map().is_some());
    assert_eq!(map.listener_count("idle"), 0);
    assert_eq!(fx.journal.entries(), vec!["load with map"]);
    assert!(!host.components_initialized());

    fx.checkpoint.settle();
    let outcome = pipeline.await.unwrap().unwrap();
    assert_eq!(outcome, PipelineOutcome::Completed);
    assert_eq!(host.stage(), Stage::AwaitingChildren);
    assert!(host.components_initialized());
    assert_eq!(fx.journal.entries(), vec!["load with map", "components"]);
}

#[tokio::test]
async fn test_waits_for_platform() {
    let fx = Fixture::new();
    let host = fx.builder().build().unwrap();
    let pipeline = host.spawn();

    fx.mount(&host, "canvas").await;
    assert_eq!(host.stage(), Stage::AwaitingPlatform);
    assert!(fx.platform.maps().is_empty());

    fx.provide_platform();
    drain().await;
    assert_eq!(host.stage(), Stage::AwaitingIdle);
    assert_eq!(fx.platform.maps().len(), 1);

    fx.paint().await;
    fx.checkpoint.settle();
    assert_eq!(pipeline.await.unwrap().unwrap(), PipelineOutcome::Completed);
}

#[tokio::test]
async fn test_hosts_share_platform_readiness() {
    let fx = Fixture::new();
    let first = fx.builder().build().unwrap();
    let second = fx.builder().build().unwrap();
    let pipelines = (first.spawn(), second.spawn());

    fx.mount(&first, "first").await;
    fx.mount(&second, "second").await;
    fx.provide_platform();
    drain().await;

    let maps = fx.platform.maps();
    assert_eq!(maps.len(), 2);
    for map in &maps {
        map.emit("idle", &[]);
    }
    drain().await;
    fx.checkpoint.settle();

    assert_eq!(pipelines.0.await.unwrap().unwrap(), PipelineOutcome::Completed);
    assert_eq!(pipelines.1.await.unwrap().unwrap(), PipelineOutcome::Completed);
    assert_ne!(first.id(), second.id());
}

#[tokio::test]
async fn test_canvas_resolves_once() {
    let fx = Fixture::new();
    fx.provide_platform();
    let host = fx.builder().build().unwrap();
    let pipeline = host.spawn();

    host.register_canvas(Canvas::new("a"), false);
    host.register_canvas(Canvas::new("b"), true);
    assert_eq!(fx.checkpoint.pending(), 1);
    fx.checkpoint.settle();
    drain().await;
    assert_eq!(fx.platform.last_map().unwrap().canvas(), &Canvas::new("b"));
    assert!(host.has_custom_canvas());

    host.register_canvas(Canvas::new("c"), false);
    assert_eq!(fx.checkpoint.pending(), 0);
    assert_eq!(host.canvas(), Some(Canvas::new("b")));
    assert!(host.has_custom_canvas());
    fx.checkpoint.settle();
    drain().await;
    assert_eq!(fx.platform.maps().len(), 1);
    assert_eq!(fx.platform.last_map().unwrap().canvas(), &Canvas::new("b"));

    fx.paint().await;
    fx.checkpoint.settle();
    assert_eq!(pipeline.await.unwrap().unwrap(), PipelineOutcome::Completed);
}

#[tokio::test]
async fn test_components_barrier_ignores_late_registrations() {
    let fx = Fixture::new();
    fx.provide_platform();
    let host = fx.builder().build().unwrap();
    let pipeline = host.spawn();

    let first = ChildHandle::labeled("first");
    let second = ChildHandle::labeled("second");
    host.register_component("markers", first.clone());
    host.register_component("markers", second.clone());

    fx.mount(&host, "canvas").await;
    fx.paint().await;
    fx.checkpoint.settle();
    drain().await;
    assert_eq!(host.stage(), Stage::AwaitingChildren);

    let late = ChildHandle::labeled("late");
    host.register_component(ComponentKind::Markers, late.clone());
    assert_eq!(host.components().count(&ComponentKind::Markers), 3);

    first.mark_initialized();
    drain().await;
    assert!(!host.components_initialized());

    second.mark_initialized();
    assert_eq!(pipeline.await.unwrap().unwrap(), PipelineOutcome::Completed);
    assert!(host.components_initialized());
    assert!(!late.is_initialized());
    assert_eq!(fx.journal.entries(), vec!["load with map", "components"]);
}

#[tokio::test]
async fn test_unregistered_child_is_not_awaited() {
    let fx = Fixture::new();
    fx.provide_platform();
    let host = fx.builder().build().unwrap();
    let pipeline = host.spawn();

    let kept = ChildHandle::new();
    let removed = ChildHandle::new();
    host.register_component("polygons", kept.clone());
    let id = host.register_component("polygons", removed);
    assert!(host.unregister_component("polygons", id).is_some());
    assert!(host.unregister_component("polygons", id).is_none());

    fx.mount(&host, "canvas").await;
    fx.paint().await;
    kept.mark_initialized();
    fx.checkpoint.settle();
    assert_eq!(pipeline.await.unwrap().unwrap(), PipelineOutcome::Completed);
}

#[tokio::test]
async fn test_event_bindings_survive_rejection() {
    let fx = Fixture::with_platform(HeadlessPlatform::new().reject_event("teleport"));
    fx.provide_platform();

    let clicks = Arc::new(AtomicUsize::new(0));
    let payloads = Arc::new(Mutex::new(Vec::new()));
    let host = fx
        .builder()
        .on("click", {
            let clicks = clicks.clone();
            let payloads = payloads.clone();
            move |payload: &EventPayload, args: &[Value]| {
                clicks.fetch_add(1, Ordering::SeqCst);
                payloads.lock().unwrap().push((
                    payload.event_name.clone(),
                    payload.public_api.id().to_string(),
                    args.to_vec(),
                ));
            }
        })
        .on("teleport", |_, _| {})
        .on("onZoomChanged", |_, _| {})
        .build()
        .unwrap();
    let pipeline = host.spawn();

    fx.mount(&host, "canvas").await;
    let map = fx.paint().await;
    assert_eq!(host.bound_events(), vec!["click", "zoom_changed"]);
    assert_eq!(map.listener_count("teleport"), 0);

    assert!(host.trigger("click", &[json!("pixel")]));
    assert_eq!(clicks.load(Ordering::SeqCst), 1);
    let payloads = payloads.lock().unwrap().clone();
    assert_eq!(
        payloads,
        vec![("click".to_string(), host.id().to_string(), vec![json!("pixel")])]
    );
    assert_eq!(map.triggered().len(), 1);

    fx.checkpoint.settle();
    assert_eq!(pipeline.await.unwrap().unwrap(), PipelineOutcome::Completed);
}

#[tokio::test]
async fn test_attribute_updates_reach_the_map() {
    let fx = Fixture::new();
    fx.provide_platform();
    let host = fx.builder().attr("mapTypeId", "roadmap").build().unwrap();
    let pipeline = host.spawn();

    // Before construction updates are dropped, but the new state is kept.
    assert!(!host.update_attrs(Attrs::new().with("mapTypeId", "terrain")));
    assert!(!host.set_zoom(5));

    fx.mount(&host, "canvas").await;
    let map = fx.paint().await;
    assert_eq!(map.initial_options()["mapTypeId"], json!("terrain"));
    assert_eq!(map.initial_options()["zoom"], json!(5));
    assert!(map.updates().is_empty());

    let updated = host.update_attrs(
        Attrs::new()
            .with("mapTypeId", "satellite")
            .with("lat", 48.85)
            .with("lng", 2.35),
    );
    assert!(updated);
    let last = map.updates().pop().unwrap();
    assert_eq!(last["mapTypeId"], json!("satellite"));
    assert_eq!(last["center"], json!({ "lat": 48.85, "lng": 2.35 }));
    assert_eq!(last["zoom"], json!(5));
    assert!(!last.contains_key("lat"));

    fx.checkpoint.settle();
    assert_eq!(pipeline.await.unwrap().unwrap(), PipelineOutcome::Completed);
}

#[tokio::test]
async fn test_public_api_actions_in_load_callback() {
    let fx = Fixture::new();
    fx.provide_platform();
    let host = fx
        .builder()
        .on_load(|api| {
            let mut options = MapOptions::new();
            options.insert("clickableIcons".into(), json!(false));
            assert!(api.update(options));
            assert!(api.trigger("resize", &[]));
            assert_eq!(api.components().total(), 1);
        })
        .build()
        .unwrap();
    host.register_component("infoWindows", ChildHandle::new());
    let pipeline = host.spawn();

    fx.mount(&host, "canvas").await;
    let map = fx.paint().await;
    assert_eq!(map.options()["clickableIcons"], json!(false));
    assert_eq!(map.triggered()[0].0, "resize");

    host.components().get(&ComponentKind::InfoWindows)[0].mark_initialized();
    fx.checkpoint.settle();
    assert_eq!(pipeline.await.unwrap().unwrap(), PipelineOutcome::Completed);
}

#[tokio::test]
async fn test_construction_failure_propagates() {
    let fx = Fixture::with_platform(HeadlessPlatform::new().fail_construction());
    fx.provide_platform();
    let host = fx.builder().build().unwrap();
    let pipeline = host.spawn();

    fx.mount(&host, "canvas").await;
    let result = pipeline.await.unwrap();
    assert!(matches!(result, Err(MapError::Construction(_))));
    assert_eq!(host.stage(), Stage::ConstructingMap);
    assert!(fx.journal.entries().is_empty());
}
