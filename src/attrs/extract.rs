//! Splits an attribute bag into platform options and event bindings.

use std::collections::BTreeMap;

use crate::{
    attrs::{AttrValue, Attrs},
    core::constants::EVENT_PREFIX,
    events::EventHandler,
    platform::MapOptions,
    prelude::HashSet,
};
use serde_json::Value;

/// Options and event bindings derived from an attribute bag.
///
/// A projection: recomputed whenever the source attributes change.
#[derive(Clone, Default)]
pub struct OptionsAndEvents {
    pub options: MapOptions,
    /// Handlers keyed by attribute name (`onClick`).
    pub events: BTreeMap<String, EventHandler>,
}

impl OptionsAndEvents {
    /// Makes sure each of `names` is present in the options, as `null` if unset.
    pub fn require<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        for name in names {
            self.options
                .entry(name.as_ref().to_string())
                .or_insert(Value::Null);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty() && self.events.is_empty()
    }
}

impl std::fmt::Debug for OptionsAndEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionsAndEvents")
            .field("options", &self.options)
            .field("events", &self.events.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Partitions `attrs` into options and events, dropping every key in `ignored`.
///
/// Handlers under an event-style name become event bindings; everything else
/// becomes an option. Never fails.
pub fn extract<I, S>(attrs: &Attrs, ignored: I) -> OptionsAndEvents
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let ignored: HashSet<String> = ignored
        .into_iter()
        .map(|key| key.as_ref().to_string())
        .collect();

    let mut result = OptionsAndEvents::default();
    for (name, value) in attrs.iter() {
        if ignored.contains(name) {
            continue;
        }
        match value {
            AttrValue::Handler(handler) if is_event_attr(name) => {
                result.events.insert(name.to_string(), handler.clone());
            }
            AttrValue::Handler(_) => {
                // `Attrs::on` only stores handlers under event-style names.
                log::debug!("handler under non-event attribute `{}` dropped", name);
            }
            AttrValue::Value(value) => {
                result.options.insert(name.to_string(), value.clone());
            }
        }
    }
    result
}

/// `onClick` and `onBoundsChanged` are event attributes; `online` is not.
pub fn is_event_attr(name: &str) -> bool {
    name.strip_prefix(EVENT_PREFIX)
        .and_then(|rest| rest.chars().next())
        .map_or(false, |c| c.is_ascii_uppercase())
}

/// Platform event name for an event attribute: `onBoundsChanged` → `bounds_changed`.
pub fn event_name(attr: &str) -> Option<String> {
    if !is_event_attr(attr) {
        return None;
    }
    let rest = &attr[EVENT_PREFIX.len()..];
    let mut name = String::with_capacity(rest.len() + 4);
    for (i, c) in rest.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                name.push('_');
            }
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }
    Some(name)
}

/// Attribute name for a platform event: `bounds_changed` → `onBoundsChanged`.
pub fn attr_name(event: &str) -> String {
    let mut name = String::from(EVENT_PREFIX);
    for part in event.split('_').filter(|p| !p.is_empty()) {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            name.push(first.to_ascii_uppercase());
            name.extend(chars);
        }
    }
    name
}
