use serde_json::Value;
use std::sync::Arc;

use crate::{core::api::PublicApi, platform::PlatformMap};

/// User handler bound to a platform event.
///
/// Receives the payload followed by the raw event arguments.
pub type EventHandler = Arc<dyn Fn(&EventPayload, &[Value]) + Send + Sync>;

/// Context handed to every event handler.
#[derive(Clone)]
pub struct EventPayload {
    /// Platform event name (`bounds_changed`).
    pub event_name: String,
    pub map: Arc<dyn PlatformMap>,
    pub public_api: PublicApi,
}

impl EventPayload {
    pub fn new(map: Arc<dyn PlatformMap>, public_api: PublicApi) -> Self {
        Self {
            event_name: String::new(),
            map,
            public_api,
        }
    }

    pub(crate) fn for_event(&self, event_name: &str) -> Self {
        Self {
            event_name: event_name.to_string(),
            ..self.clone()
        }
    }
}

impl std::fmt::Debug for EventPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventPayload")
            .field("event_name", &self.event_name)
            .field("host", &self.public_api.id())
            .finish()
    }
}
