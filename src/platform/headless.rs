//! In-memory platform used for headless hosts, the demo and tests.
//!
//! Maps record what the coordinator asked of them and let callers emit events
//! by hand, including the first-paint `idle` signal.

use serde_json::Value;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::{
    platform::{Canvas, Listener, ListenerId, MapOptions, MapsPlatform, PlatformMap},
    runtime::lock,
    MapError, Result,
};

#[derive(Default)]
pub struct HeadlessPlatform {
    maps: Mutex<Vec<Arc<HeadlessMap>>>,
    rejected_events: HashSet<String>,
    fail_construction: bool,
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps created by this platform will refuse subscriptions to `event`.
    pub fn reject_event(mut self, event: impl Into<String>) -> Self {
        self.rejected_events.insert(event.into());
        self
    }

    /// Every `create_map` call fails.
    pub fn fail_construction(mut self) -> Self {
        self.fail_construction = true;
        self
    }

    pub fn maps(&self) -> Vec<Arc<HeadlessMap>> {
        lock(&self.maps).clone()
    }

    pub fn last_map(&self) -> Option<Arc<HeadlessMap>> {
        lock(&self.maps).last().cloned()
    }
}

impl MapsPlatform for HeadlessPlatform {
    fn name(&self) -> &str {
        "headless"
    }

    fn create_map(&self, canvas: &Canvas, options: MapOptions) -> Result<Arc<dyn PlatformMap>> {
        if self.fail_construction {
            return Err(MapError::Construction(format!(
                "canvas `{}` is not attached",
                canvas.element
            )));
        }

        let map = Arc::new(HeadlessMap {
            canvas: canvas.clone(),
            initial_options: options.clone(),
            options: Mutex::new(options),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(1),
            rejected_events: self.rejected_events.clone(),
            updates: Mutex::new(Vec::new()),
            triggered: Mutex::new(Vec::new()),
        });
        lock(&self.maps).push(map.clone());
        Ok(map)
    }
}

pub struct HeadlessMap {
    canvas: Canvas,
    initial_options: MapOptions,
    options: Mutex<MapOptions>,
    listeners: Mutex<Vec<(ListenerId, String, Listener)>>,
    next_listener: AtomicU64,
    rejected_events: HashSet<String>,
    updates: Mutex<Vec<MapOptions>>,
    triggered: Mutex<Vec<(String, Vec<Value>)>>,
}

impl HeadlessMap {
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Options the map was constructed with.
    pub fn initial_options(&self) -> &MapOptions {
        &self.initial_options
    }

    /// Options after every update has been merged.
    pub fn options(&self) -> MapOptions {
        lock(&self.options).clone()
    }

    /// Every `set_options` call, in order.
    pub fn updates(&self) -> Vec<MapOptions> {
        lock(&self.updates).clone()
    }

    pub fn triggered(&self) -> Vec<(String, Vec<Value>)> {
        lock(&self.triggered).clone()
    }

    pub fn listener_count(&self, event: &str) -> usize {
        lock(&self.listeners)
            .iter()
            .filter(|(_, name, _)| name == event)
            .count()
    }

    pub fn total_listeners(&self) -> usize {
        lock(&self.listeners).len()
    }

    /// Delivers `event` to every current listener. Returns how many were called.
    pub fn emit(&self, event: &str, args: &[Value]) -> usize {
        let targets: Vec<Listener> = lock(&self.listeners)
            .iter()
            .filter(|(_, name, _)| name == event)
            .map(|(_, _, listener)| listener.clone())
            .collect();

        for listener in &targets {
            listener(args);
        }
        targets.len()
    }
}

impl PlatformMap for HeadlessMap {
    fn add_listener(&self, event: &str, listener: Listener) -> Result<ListenerId> {
        if self.rejected_events.contains(event) {
            return Err(MapError::SubscriptionRejected {
                event: event.to_string(),
                reason: "unsupported event".to_string(),
            });
        }
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        lock(&self.listeners).push((id, event.to_string(), listener));
        Ok(id)
    }

    fn remove_listener(&self, id: ListenerId) {
        lock(&self.listeners).retain(|(existing, _, _)| *existing != id);
    }

    fn set_options(&self, options: MapOptions) {
        lock(&self.updates).push(options.clone());
        let mut current = lock(&self.options);
        for (key, value) in options {
            current.insert(key, value);
        }
    }

    fn trigger(&self, event: &str, args: &[Value]) {
        lock(&self.triggered).push((event.to_string(), args.to_vec()));
        self.emit(event, args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn map(platform: &HeadlessPlatform) -> Arc<dyn PlatformMap> {
        platform
            .create_map(&Canvas::new("canvas"), MapOptions::new())
            .unwrap()
    }

    #[test]
    fn test_listeners_receive_events() {
        let platform = HeadlessPlatform::new();
        let live = map(&platform);
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let id = live
            .add_listener(
                "click",
                Arc::new(move |_: &[Value]| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();

        let headless = platform.last_map().unwrap();
        assert_eq!(headless.emit("click", &[]), 1);
        live.remove_listener(id);
        assert_eq!(headless.emit("click", &[]), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_rejected_event() {
        let platform = HeadlessPlatform::new().reject_event("teleport");
        let live = map(&platform);
        let err = live.add_listener("teleport", Arc::new(|_: &[Value]| {})).unwrap_err();
        assert!(matches!(err, MapError::SubscriptionRejected { .. }));
    }

    #[test]
    fn test_set_options_merges() {
        let platform = HeadlessPlatform::new();
        let live = map(&platform);
        let mut update = MapOptions::new();
        update.insert("zoom".into(), json!(3));
        live.set_options(update);

        let headless = platform.last_map().unwrap();
        assert_eq!(headless.options()["zoom"], json!(3));
        assert_eq!(headless.updates().len(), 1);
    }

    #[test]
    fn test_construction_failure() {
        let platform = HeadlessPlatform::new().fail_construction();
        let result = platform.create_map(&Canvas::new("missing"), MapOptions::new());
        assert!(matches!(result, Err(MapError::Construction(_))));
        assert!(platform.maps().is_empty());
    }
}
