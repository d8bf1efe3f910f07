//! Binds declarative event handlers to a live platform map.
//!
//! Each binding is subscribed on its own. A binding the platform refuses is
//! reported in [`AttachOutcome::rejected`] and its siblings still subscribe.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::{
    attrs::event_name,
    events::{EventHandler, EventPayload},
    platform::{ListenerId, PlatformMap},
    prelude::HashSet,
    runtime::lock,
    MapError,
};

/// Removes one platform listener. Safe to call any number of times.
#[derive(Clone)]
pub struct Disposer {
    slot: Arc<Mutex<Option<(Arc<dyn PlatformMap>, ListenerId)>>>,
}

impl Disposer {
    pub fn new(map: Arc<dyn PlatformMap>, id: ListenerId) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some((map, id)))),
        }
    }

    /// Returns `true` if this call removed the listener.
    pub fn dispose(&self) -> bool {
        let taken = lock(&self.slot).take();
        match taken {
            Some((map, id)) => {
                map.remove_listener(id);
                true
            }
            None => false,
        }
    }

    pub fn is_disposed(&self) -> bool {
        lock(&self.slot).is_none()
    }
}

impl std::fmt::Debug for Disposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Disposer")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// A live subscription created by [`EventBridge::attach`].
#[derive(Debug, Clone)]
pub struct Subscription {
    /// Platform event name.
    pub name: String,
    pub disposer: Disposer,
}

#[derive(Debug, Default)]
pub struct AttachOutcome {
    pub subscriptions: Vec<Subscription>,
    /// One entry per binding the platform refused.
    pub rejected: Vec<MapError>,
}

impl AttachOutcome {
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }
}

pub struct EventBridge;

impl EventBridge {
    /// Subscribes every handler in `events` (keyed by attribute name) to `map`.
    pub fn attach(
        map: &Arc<dyn PlatformMap>,
        events: &BTreeMap<String, EventHandler>,
        payload: &EventPayload,
    ) -> AttachOutcome {
        let mut outcome = AttachOutcome::default();
        let mut bound: HashSet<String> = HashSet::default();

        for (attr, handler) in events {
            let Some(name) = event_name(attr) else {
                outcome.rejected.push(MapError::SubscriptionRejected {
                    event: attr.clone(),
                    reason: "not an event attribute".to_string(),
                });
                continue;
            };
            if !bound.insert(name.clone()) {
                log::warn!("`{}` already bound to `{}`, skipping", attr, name);
                continue;
            }

            let handler = handler.clone();
            let payload = payload.for_event(&name);
            let listener = Arc::new(move |args: &[serde_json::Value]| handler(&payload, args));

            match map.add_listener(&name, listener) {
                Ok(id) => {
                    log::trace!("bound `{}`", name);
                    outcome.subscriptions.push(Subscription {
                        disposer: Disposer::new(map.clone(), id),
                        name,
                    });
                }
                Err(err) => {
                    log::warn!("event binding `{}` rejected: {}", name, err);
                    outcome.rejected.push(err);
                }
            }
        }
        outcome
    }
}
