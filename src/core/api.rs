//! The facade handed to user callbacks and event handlers.

use serde_json::Value;
use std::sync::{Arc, Weak};

use crate::{
    components::ComponentsView,
    core::host::HostInner,
    platform::{MapOptions, PlatformMap},
};

/// Stable view of a host: its id, current map, children, and two actions.
///
/// Created once per host. It does not keep the host alive; once the host is
/// dropped `map` returns `None` and the actions do nothing.
#[derive(Clone)]
pub struct PublicApi {
    id: Arc<str>,
    host: Weak<HostInner>,
}

impl PublicApi {
    pub(crate) fn new(id: &str, host: Weak<HostInner>) -> Self {
        Self {
            id: Arc::from(id),
            host,
        }
    }

    /// A facade not attached to any host.
    #[cfg(test)]
    pub(crate) fn detached(id: &str) -> Self {
        Self::new(id, Weak::new())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Snapshot of the map instance, once published.
    pub fn map(&self) -> Option<Arc<dyn PlatformMap>> {
        self.host.upgrade().and_then(|host| host.map())
    }

    pub fn components(&self) -> ComponentsView {
        self.host
            .upgrade()
            .map(|host| host.components())
            .unwrap_or_default()
    }

    /// Pushes options to the map. Returns `false` if there is no map yet.
    pub fn update(&self, options: MapOptions) -> bool {
        self.host
            .upgrade()
            .map_or(false, |host| host.update_map(options))
    }

    /// Fires `event` on the map. Returns `false` if there is no map yet.
    pub fn trigger(&self, event: &str, args: &[Value]) -> bool {
        self.host
            .upgrade()
            .map_or(false, |host| host.trigger(event, args))
    }
}

impl std::fmt::Debug for PublicApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicApi")
            .field("id", &self.id)
            .field("attached", &(self.host.strong_count() > 0))
            .finish()
    }
}
