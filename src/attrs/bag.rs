use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{
    attrs::extract::{attr_name, is_event_attr},
    events::{EventHandler, EventPayload},
};

/// A single attribute: plain data or an event handler.
#[derive(Clone)]
pub enum AttrValue {
    Value(Value),
    Handler(EventHandler),
}

impl AttrValue {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            AttrValue::Value(value) => Some(value),
            AttrValue::Handler(_) => None,
        }
    }

    pub fn is_handler(&self) -> bool {
        matches!(self, AttrValue::Handler(_))
    }
}

impl std::fmt::Debug for AttrValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrValue::Value(value) => write!(f, "{}", value),
            AttrValue::Handler(_) => f.write_str("<handler>"),
        }
    }
}

/// The attribute bag a host or child component is rendered with.
///
/// Ordered by name so extraction is deterministic.
#[derive(Clone, Debug, Default)]
pub struct Attrs {
    entries: BTreeMap<String, AttrValue>,
}

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Attrs::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Builder form of [`Attrs::on`].
    pub fn with_handler<F>(mut self, event: &str, handler: F) -> Self
    where
        F: Fn(&EventPayload, &[Value]) + Send + Sync + 'static,
    {
        self.on(event, handler);
        self
    }

    /// Sets a plain attribute. A plain value stored under an event-style name
    /// is kept as an option, since there is nothing to bind.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.entries
            .insert(name.into(), AttrValue::Value(value.into()));
    }

    /// Binds `handler` to `event`.
    ///
    /// `event` may be the attribute form (`onBoundsChanged`) or the platform
    /// form (`bounds_changed`); both are stored under the attribute form.
    /// Names that yield no event attribute (`""`, `1x`) are refused and
    /// `false` is returned.
    pub fn on<F>(&mut self, event: &str, handler: F) -> bool
    where
        F: Fn(&EventPayload, &[Value]) + Send + Sync + 'static,
    {
        let name = if is_event_attr(event) {
            event.to_string()
        } else {
            attr_name(event)
        };
        if !is_event_attr(&name) {
            log::warn!("handler for `{}` refused: not an event name", event);
            return false;
        }
        self.entries
            .insert(name, AttrValue::Handler(Arc::new(handler)));
        true
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries.get(name)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(AttrValue::as_value)
    }

    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        self.entries.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::extract::extract;
    use serde_json::json;

    #[test]
    fn test_on_normalizes_name() {
        let attrs = Attrs::new()
            .with_handler("bounds_changed", |_, _| {})
            .with_handler("onClick", |_, _| {});
        assert!(attrs.contains("onBoundsChanged"));
        assert!(attrs.contains("onClick"));
        assert!(attrs.get("onClick").unwrap().is_handler());
    }

    #[test]
    fn test_on_refuses_non_event_names() {
        let mut attrs = Attrs::new();
        assert!(!attrs.on("", |_, _| {}));
        assert!(!attrs.on("1x", |_, _| {}));
        assert!(!attrs.on("__", |_, _| {}));
        assert!(attrs.is_empty());

        assert!(attrs.on("click", |_, _| {}));
        let parsed = extract(&attrs, Vec::<String>::new());
        assert_eq!(parsed.events.len(), attrs.len());
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut attrs = Attrs::new().with("mapTypeId", "roadmap");
        attrs.insert("disableDefaultUI", true);
        assert_eq!(attrs.value("mapTypeId"), Some(&json!("roadmap")));
        assert_eq!(attrs.len(), 2);
        assert!(attrs.remove("mapTypeId").is_some());
        assert_eq!(attrs.keys().collect::<Vec<_>>(), vec!["disableDefaultUI"]);
    }
}
