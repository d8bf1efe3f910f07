#![allow(dead_code)]

use maphost::prelude::*;
use std::sync::Mutex;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Lets every runnable task on the current-thread runtime make progress.
pub async fn drain() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

/// Records lifecycle callbacks in firing order.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

pub struct Fixture {
    pub platform: Arc<HeadlessPlatform>,
    pub loader: PlatformLoader,
    pub checkpoint: RenderCheckpoint,
    pub journal: Journal,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_platform(HeadlessPlatform::new())
    }

    pub fn with_platform(platform: HeadlessPlatform) -> Self {
        init_logger();
        Self {
            platform: Arc::new(platform),
            loader: PlatformLoader::new(),
            checkpoint: RenderCheckpoint::new(),
            journal: Journal::default(),
        }
    }

    pub fn provide_platform(&self) {
        let platform: Arc<dyn MapsPlatform> = self.platform.clone();
        self.loader.provide(platform);
    }

    /// Builder wired to this fixture, journaling both callbacks.
    pub fn builder(&self) -> MapHostBuilder {
        let on_load = self.journal.clone();
        let on_components = self.journal.clone();
        MapHost::builder()
            .platform(self.loader.clone())
            .checkpoint(self.checkpoint.clone())
            .on_load(move |api| {
                let state = if api.map().is_some() { "with map" } else { "without map" };
                on_load.push(format!("load {}", state));
            })
            .on_components_load(move |_| on_components.push("components"))
    }

    /// Mounts the canvas and settles the render pass.
    pub async fn mount(&self, host: &MapHost, element: &str) {
        host.register_canvas(Canvas::new(element), false);
        self.checkpoint.settle();
        drain().await;
    }

    /// Emits the first-paint signal on the most recent map.
    pub async fn paint(&self) -> Arc<HeadlessMap> {
        let map = self.platform.last_map().expect("map constructed");
        map.emit("idle", &[]);
        drain().await;
        map
    }
}
