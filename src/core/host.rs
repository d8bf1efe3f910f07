//! The map host: waits for its dependencies, builds the map and tells
//! callbacks and children when everything is ready.
//!
//! The initialization pipeline runs strictly in order:
//!
//! ```text
//! AwaitingPlatform → AwaitingCanvas → ConstructingMap → AwaitingIdle → Ready → AwaitingChildren
//! ```
//!
//! Teardown is cooperative. [`MapHost::destroy`] cancels the host; the pipeline
//! notices at its next suspension point and every side effect is guarded by a
//! liveness check, so nothing is constructed or called back after destroy.

use futures::channel::oneshot;
use serde_json::Value;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    attrs::{extract, Attrs, OptionsAndEvents},
    components::{ChildHandle, ComponentId, ComponentKind, ComponentRegistry, ComponentsView},
    core::{
        api::PublicApi,
        builder::MapHostBuilder,
        config::HostConfig,
        constants::{IDLE_EVENT, LAT_ATTR, LNG_ATTR},
        geo::LatLng,
    },
    events::{Disposer, EventBridge, EventPayload},
    platform::{Canvas, ListenerId, MapOptions, PlatformLoader, PlatformMap},
    prelude::HashMap,
    runtime::{self, lock, Deferred, RenderCheckpoint},
    MapError, Result,
};

static NEXT_HOST: AtomicU64 = AtomicU64::new(1);

/// Lifecycle hook receiving the host's facade.
pub type LifecycleCallback = Box<dyn Fn(&PublicApi) + Send + Sync>;

/// Pipeline stages. `AwaitingChildren` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    AwaitingPlatform,
    AwaitingCanvas,
    ConstructingMap,
    AwaitingIdle,
    Ready,
    AwaitingChildren,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::AwaitingPlatform => write!(f, "awaiting platform"),
            Stage::AwaitingCanvas => write!(f, "awaiting canvas"),
            Stage::ConstructingMap => write!(f, "constructing map"),
            Stage::AwaitingIdle => write!(f, "awaiting idle"),
            Stage::Ready => write!(f, "ready"),
            Stage::AwaitingChildren => write!(f, "awaiting children"),
        }
    }
}

/// How a pipeline run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Every stage ran and both callbacks fired.
    Completed,
    /// The host was destroyed while the pipeline was at the given stage.
    Abandoned(Stage),
}

pub(crate) struct Callbacks {
    pub(crate) on_load: Option<LifecycleCallback>,
    pub(crate) on_components_load: Option<LifecycleCallback>,
}

struct HostState {
    stage: Stage,
    started: bool,
    zoom: u8,
    center: LatLng,
    attrs: Attrs,
    parsed: OptionsAndEvents,
    canvas: Option<Canvas>,
    has_custom_canvas: bool,
    map: Option<Arc<dyn PlatformMap>>,
    components_initialized: bool,
    event_listeners: HashMap<String, Disposer>,
}

pub(crate) struct HostInner {
    id: String,
    config: HostConfig,
    platform: PlatformLoader,
    checkpoint: RenderCheckpoint,
    canvas_ready: Deferred<Canvas>,
    cancel: CancellationToken,
    state: Mutex<HostState>,
    registry: Mutex<ComponentRegistry>,
    callbacks: Callbacks,
    public_api: PublicApi,
}

/// Coordinates one embedded map. Cheap to clone; clones share the host.
#[derive(Clone)]
pub struct MapHost {
    inner: Arc<HostInner>,
}

impl MapHost {
    pub fn builder() -> MapHostBuilder {
        MapHostBuilder::new()
    }

    pub(crate) fn assemble(
        config: HostConfig,
        attrs: Attrs,
        platform: PlatformLoader,
        checkpoint: RenderCheckpoint,
        callbacks: Callbacks,
    ) -> Self {
        let id = format!(
            "{}-{}",
            config.id_prefix,
            NEXT_HOST.fetch_add(1, Ordering::Relaxed)
        );
        let parsed = parse(&attrs, &config);
        let center = center_from_attrs(&attrs).unwrap_or(config.center);

        let inner = Arc::new_cyclic(|weak: &Weak<HostInner>| HostInner {
            public_api: PublicApi::new(&id, weak.clone()),
            state: Mutex::new(HostState {
                stage: Stage::AwaitingPlatform,
                started: false,
                zoom: config.zoom,
                center,
                attrs,
                parsed,
                canvas: None,
                has_custom_canvas: false,
                map: None,
                components_initialized: false,
                event_listeners: HashMap::default(),
            }),
            id,
            config,
            platform,
            checkpoint,
            canvas_ready: Deferred::new(),
            cancel: CancellationToken::new(),
            registry: Mutex::new(ComponentRegistry::new()),
            callbacks,
        });
        log::debug!("host {} created", inner.id);
        Self { inner }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn public_api(&self) -> PublicApi {
        self.inner.public_api.clone()
    }

    pub fn checkpoint(&self) -> &RenderCheckpoint {
        &self.inner.checkpoint
    }

    pub fn stage(&self) -> Stage {
        lock(&self.inner.state).stage
    }

    pub fn map(&self) -> Option<Arc<dyn PlatformMap>> {
        self.inner.map()
    }

    pub fn zoom(&self) -> u8 {
        lock(&self.inner.state).zoom
    }

    pub fn center(&self) -> LatLng {
        lock(&self.inner.state).center
    }

    pub fn canvas(&self) -> Option<Canvas> {
        lock(&self.inner.state).canvas.clone()
    }

    pub fn has_custom_canvas(&self) -> bool {
        lock(&self.inner.state).has_custom_canvas
    }

    /// Whether the host should render its own canvas.
    pub fn needs_canvas(&self) -> bool {
        !self.has_custom_canvas()
    }

    pub fn components_initialized(&self) -> bool {
        lock(&self.inner.state).components_initialized
    }

    pub fn components(&self) -> ComponentsView {
        self.inner.components()
    }

    /// Names of the live event bindings.
    pub fn bound_events(&self) -> Vec<String> {
        let mut names: Vec<_> = lock(&self.inner.state)
            .event_listeners
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn options_and_events(&self) -> OptionsAndEvents {
        lock(&self.inner.state).parsed.clone()
    }

    /// Options the map is built or updated with: `{...options, center, zoom}`.
    pub fn create_options(&self) -> MapOptions {
        self.inner.create_options()
    }

    pub fn is_destroyed(&self) -> bool {
        !self.inner.is_live()
    }

    /// Records the mounted canvas and resolves the canvas signal at the next
    /// render settle. Only the first resolution counts; later records are
    /// ignored.
    pub fn register_canvas(&self, canvas: Canvas, is_custom: bool) {
        if !self.inner.is_live() {
            return;
        }
        if self.inner.canvas_ready.is_resolved() {
            log::trace!(
                "host {}: canvas `{}` ignored, already rendered",
                self.inner.id,
                canvas.element
            );
            return;
        }
        {
            let mut state = lock(&self.inner.state);
            state.canvas = Some(canvas);
            state.has_custom_canvas = is_custom;
        }

        let host = Arc::downgrade(&self.inner);
        self.inner
            .checkpoint
            .schedule_once(format!("{}:canvas", self.inner.id), move || {
                if let Some(host) = host.upgrade() {
                    host.notify_canvas_rendered();
                }
            });
    }

    pub fn register_component(
        &self,
        kind: impl Into<ComponentKind>,
        handle: ChildHandle,
    ) -> ComponentId {
        let kind = kind.into();
        log::trace!("host {}: registering {}", self.inner.id, kind);
        lock(&self.inner.registry).register(kind, handle)
    }

    pub fn unregister_component(
        &self,
        kind: impl Into<ComponentKind>,
        id: ComponentId,
    ) -> Option<ChildHandle> {
        let removed = lock(&self.inner.registry).unregister(kind, id);
        if removed.is_none() {
            log::trace!("host {}: stale unregister ignored", self.inner.id);
        }
        removed
    }

    pub fn unregister_handle(&self, kind: impl Into<ComponentKind>, handle: &ChildHandle) -> bool {
        lock(&self.inner.registry).unregister_handle(kind, handle)
    }

    /// Replaces the attribute bag and pushes the new options to the map, if
    /// there is one.
    pub fn update_attrs(&self, attrs: Attrs) -> bool {
        {
            let mut state = lock(&self.inner.state);
            state.parsed = parse(&attrs, &self.inner.config);
            if let Some(center) = center_from_attrs(&attrs) {
                state.center = center;
            }
            state.attrs = attrs;
        }
        self.refresh()
    }

    pub fn set_zoom(&self, zoom: u8) -> bool {
        lock(&self.inner.state).zoom = zoom;
        self.refresh()
    }

    pub fn set_center(&self, center: LatLng) -> bool {
        lock(&self.inner.state).center = center;
        self.refresh()
    }

    /// Current attribute bag.
    pub fn attrs(&self) -> Attrs {
        lock(&self.inner.state).attrs.clone()
    }

    fn refresh(&self) -> bool {
        if self.inner.map().is_none() {
            return false;
        }
        let options = self.inner.create_options();
        self.inner.update_map(options)
    }

    /// Applies options to the map. Dropped if the map does not exist yet.
    pub fn update_map(&self, options: MapOptions) -> bool {
        self.inner.update_map(options)
    }

    pub fn trigger(&self, event: &str, args: &[Value]) -> bool {
        self.inner.trigger(event, args)
    }

    /// The initialization pipeline. Runs once per host.
    pub fn run(&self) -> impl Future<Output = Result<PipelineOutcome>> + Send + 'static {
        let inner = self.inner.clone();
        async move { inner.run_pipeline().await }
    }

    /// Spawns [`MapHost::run`] on the ambient tokio runtime.
    pub fn spawn(&self) -> JoinHandle<Result<PipelineOutcome>> {
        runtime::spawn(self.run())
    }

    /// Tears the host down: stops the pipeline and removes every event listener.
    pub fn destroy(&self) {
        if self.inner.cancel.is_cancelled() {
            return;
        }
        self.inner.cancel.cancel();

        let listeners = std::mem::take(&mut lock(&self.inner.state).event_listeners);
        let count = listeners.len();
        for disposer in listeners.into_values() {
            disposer.dispose();
        }
        log::debug!("host {} destroyed, {} listeners removed", self.inner.id, count);
    }
}

impl std::fmt::Debug for MapHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapHost")
            .field("id", &self.inner.id)
            .field("stage", &self.stage())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

impl HostInner {
    fn is_live(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    pub(crate) fn map(&self) -> Option<Arc<dyn PlatformMap>> {
        lock(&self.state).map.clone()
    }

    pub(crate) fn components(&self) -> ComponentsView {
        lock(&self.registry).snapshot()
    }

    fn create_options(&self) -> MapOptions {
        let state = lock(&self.state);
        let mut options = state.parsed.options.clone();
        options.insert("center".to_string(), state.center.into());
        options.insert("zoom".to_string(), Value::from(state.zoom));
        options
    }

    pub(crate) fn update_map(&self, options: MapOptions) -> bool {
        match self.map() {
            Some(map) => {
                map.set_options(options);
                true
            }
            None => {
                log::trace!("host {}: update before map construction dropped", self.id);
                false
            }
        }
    }

    pub(crate) fn trigger(&self, event: &str, args: &[Value]) -> bool {
        match self.map() {
            Some(map) => {
                map.trigger(event, args);
                true
            }
            None => {
                log::trace!("host {}: trigger `{}` before map construction dropped", self.id, event);
                false
            }
        }
    }

    fn notify_canvas_rendered(&self) {
        if !self.is_live() {
            return;
        }
        let canvas = lock(&self.state).canvas.clone();
        if let Some(canvas) = canvas {
            if self.canvas_ready.resolve(canvas) {
                log::debug!("host {}: canvas rendered", self.id);
            }
        }
    }

    fn enter(&self, stage: Stage) {
        lock(&self.state).stage = stage;
        log::debug!("host {}: {}", self.id, stage);
    }

    fn abandon(&self) -> PipelineOutcome {
        let stage = lock(&self.state).stage;
        log::debug!("host {}: torn down while {}", self.id, stage);
        PipelineOutcome::Abandoned(stage)
    }

    async fn until_cancelled<F: Future>(&self, future: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            output = future => Some(output),
        }
    }

    async fn run_pipeline(self: Arc<Self>) -> Result<PipelineOutcome> {
        {
            let mut state = lock(&self.state);
            if state.started {
                return Err(MapError::PipelineStarted(self.id.clone()));
            }
            state.started = true;
        }

        self.enter(Stage::AwaitingPlatform);
        let Some(platform) = self.until_cancelled(self.platform.ready()).await else {
            return Ok(self.abandon());
        };

        self.enter(Stage::AwaitingCanvas);
        let Some(canvas) = self.until_cancelled(self.canvas_ready.wait()).await else {
            return Ok(self.abandon());
        };

        if !self.is_live() {
            return Ok(self.abandon());
        }
        self.enter(Stage::ConstructingMap);
        let map = platform.create_map(&canvas, self.create_options())?;

        self.enter(Stage::AwaitingIdle);
        let idle = subscribe_once(&map, IDLE_EVENT)?;
        if self.until_cancelled(idle).await.is_none() {
            return Ok(self.abandon());
        }

        if !self.is_live() {
            return Ok(self.abandon());
        }
        let settled = self.publish(map);

        if self.until_cancelled(settled).await.is_none() || !self.is_live() {
            return Ok(self.abandon());
        }
        self.enter(Stage::AwaitingChildren);
        let ready = lock(&self.registry).all_ready();
        if self.until_cancelled(ready).await.is_none() || !self.is_live() {
            return Ok(self.abandon());
        }

        lock(&self.state).components_initialized = true;
        log::info!("host {}: components loaded", self.id);
        if let Some(callback) = &self.callbacks.on_components_load {
            callback(&self.public_api);
        }
        Ok(PipelineOutcome::Completed)
    }

    /// Makes the map visible, binds events and fires the load callback.
    ///
    /// Returns the wait for the next render settle. It is registered before the
    /// map becomes visible, so a settle observed by anyone who sees the map
    /// also releases the pipeline.
    fn publish(&self, map: Arc<dyn PlatformMap>) -> impl Future<Output = ()> + Send + 'static {
        let settled = self.checkpoint.next_settle();
        self.enter(Stage::Ready);
        let events = {
            let mut state = lock(&self.state);
            state.map = Some(map.clone());
            state.parsed.events.clone()
        };

        let payload = EventPayload::new(map.clone(), self.public_api.clone());
        let outcome = EventBridge::attach(&map, &events, &payload);
        if !outcome.is_complete() {
            log::warn!(
                "host {}: {} event binding(s) rejected",
                self.id,
                outcome.rejected.len()
            );
        }
        // `destroy` cancels before it drains the listener table.
        let orphaned = {
            let mut state = lock(&self.state);
            if self.is_live() {
                for subscription in outcome.subscriptions {
                    state
                        .event_listeners
                        .insert(subscription.name, subscription.disposer);
                }
                Vec::new()
            } else {
                outcome.subscriptions
            }
        };
        if !orphaned.is_empty() {
            log::debug!(
                "host {}: torn down while binding, {} listeners removed",
                self.id,
                orphaned.len()
            );
            for subscription in orphaned {
                subscription.disposer.dispose();
            }
        }
        if !self.is_live() {
            return settled;
        }
        log::info!("host {}: map ready", self.id);

        if let Some(callback) = &self.callbacks.on_load {
            callback(&self.public_api);
        }
        settled
    }
}

fn parse(attrs: &Attrs, config: &HostConfig) -> OptionsAndEvents {
    extract(attrs, &config.ignored_attrs).require(&config.required_options)
}

fn center_from_attrs(attrs: &Attrs) -> Option<LatLng> {
    LatLng::from_values(attrs.value(LAT_ATTR)?, attrs.value(LNG_ATTR)?)
}

/// Removes its listener when dropped.
struct ListenerGuard {
    map: Arc<dyn PlatformMap>,
    id: ListenerId,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.map.remove_listener(self.id);
    }
}

/// Subscribes to `event` and resolves the first time it fires, then
/// unsubscribes. Dropping the future also unsubscribes.
fn subscribe_once(
    map: &Arc<dyn PlatformMap>,
    event: &str,
) -> Result<impl Future<Output = ()> + Send + 'static> {
    let (tx, rx) = oneshot::channel::<()>();
    let tx = Mutex::new(Some(tx));
    let id = map.add_listener(
        event,
        Arc::new(move |_: &[Value]| {
            if let Some(tx) = lock(&tx).take() {
                let _ = tx.send(());
            }
        }),
    )?;
    let guard = ListenerGuard {
        map: map.clone(),
        id,
    };

    Ok(async move {
        if rx.await.is_err() {
            futures::future::pending::<()>().await;
        }
        drop(guard);
    })
}
