use maphost::prelude::*;
use serde_json::json;
use std::time::Duration;

/// Plays the part of the UI layer: mounts a canvas, lets the platform paint,
/// and mounts a few markers that initialize one after another.
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let platform = Arc::new(HeadlessPlatform::new().reject_event("teleport"));
    let loader = PlatformLoader::new();
    let checkpoint = RenderCheckpoint::new();

    let host = MapHost::builder()
        .platform(loader.clone())
        .checkpoint(checkpoint.clone())
        .zoom(11)
        .attr("lat", 37.7749)
        .attr("lng", -122.4194)
        .attr("mapTypeId", "roadmap")
        .attr("disableDefaultUI", true)
        .on("click", |payload, args| {
            log::info!("{} on {}: {:?}", payload.event_name, payload.public_api.id(), args);
        })
        .on("teleport", |_, _| {})
        .on_load(|api| {
            log::info!("map loaded for {}", api.id());
            let mut options = MapOptions::new();
            options.insert("clickableIcons".into(), json!(false));
            api.update(options);
        })
        .on_components_load(|api| {
            log::info!(
                "{} children ready for {}",
                api.components().total(),
                api.id()
            );
        })
        .build()?;

    let pipeline = host.spawn();

    let markers: Vec<ChildHandle> = (0..3)
        .map(|i| ChildHandle::labeled(format!("marker-{}", i)))
        .collect();
    for marker in &markers {
        host.register_component(ComponentKind::Markers, marker.clone());
    }

    host.register_canvas(Canvas::new("#map"), false);
    checkpoint.settle();

    let platform_handle: Arc<dyn MapsPlatform> = platform.clone();
    loader.provide(platform_handle);

    let map = loop {
        match platform.last_map() {
            Some(map) if map.listener_count("idle") > 0 => break map,
            _ => tokio::time::sleep(Duration::from_millis(5)).await,
        }
    };
    log::info!("constructed with {}", serde_json::Value::Object(map.initial_options().clone()));
    map.emit("idle", &[]);

    while host.map().is_none() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    host.trigger("click", &[json!({ "lat": 37.77, "lng": -122.41 })]);
    checkpoint.settle();

    for marker in &markers {
        tokio::time::sleep(Duration::from_millis(20)).await;
        marker.mark_initialized();
    }

    let outcome = pipeline.await??;
    log::info!("pipeline finished: {:?}", outcome);

    host.destroy();
    Ok(())
}
