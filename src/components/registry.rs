//! Registry of the child components mounted under a host.
//!
//! Children are grouped by [`ComponentKind`], in registration order. Every
//! registration gets its own [`ComponentId`] from a slot arena, so removing one
//! entry never disturbs another registration of the same handle.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use std::future::Future;

use crate::{components::ChildHandle, prelude::HashMap};

new_key_type! {
    /// Identity of a single registration.
    pub struct ComponentId;
}

/// Kinds of child components a map can host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentKind {
    Markers,
    Circles,
    Polylines,
    Polygons,
    Rectangles,
    Overlays,
    InfoWindows,
    Controls,
    Autocompletes,
    Directions,
    Routes,
    Custom(String),
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComponentKind::Markers => write!(f, "markers"),
            ComponentKind::Circles => write!(f, "circles"),
            ComponentKind::Polylines => write!(f, "polylines"),
            ComponentKind::Polygons => write!(f, "polygons"),
            ComponentKind::Rectangles => write!(f, "rectangles"),
            ComponentKind::Overlays => write!(f, "overlays"),
            ComponentKind::InfoWindows => write!(f, "infoWindows"),
            ComponentKind::Controls => write!(f, "controls"),
            ComponentKind::Autocompletes => write!(f, "autocompletes"),
            ComponentKind::Directions => write!(f, "directions"),
            ComponentKind::Routes => write!(f, "routes"),
            ComponentKind::Custom(name) => write!(f, "{}", name),
        }
    }
}

impl From<&str> for ComponentKind {
    fn from(name: &str) -> Self {
        match name {
            "markers" => ComponentKind::Markers,
            "circles" => ComponentKind::Circles,
            "polylines" => ComponentKind::Polylines,
            "polygons" => ComponentKind::Polygons,
            "rectangles" => ComponentKind::Rectangles,
            "overlays" => ComponentKind::Overlays,
            "infoWindows" => ComponentKind::InfoWindows,
            "controls" => ComponentKind::Controls,
            "autocompletes" => ComponentKind::Autocompletes,
            "directions" => ComponentKind::Directions,
            "routes" => ComponentKind::Routes,
            other => ComponentKind::Custom(other.to_string()),
        }
    }
}

#[derive(Default)]
pub struct ComponentRegistry {
    handles: SlotMap<ComponentId, ChildHandle>,
    buckets: HashMap<ComponentKind, Vec<ComponentId>>,
    /// Kinds in first-registration order.
    kinds: Vec<ComponentKind>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `handle` to the bucket for `kind`.
    pub fn register(&mut self, kind: impl Into<ComponentKind>, handle: ChildHandle) -> ComponentId {
        let kind = kind.into();
        let id = self.handles.insert(handle);
        if !self.buckets.contains_key(&kind) {
            self.kinds.push(kind.clone());
        }
        self.buckets.entry(kind).or_default().push(id);
        id
    }

    /// Removes the registration `id` from the bucket for `kind`.
    ///
    /// Unknown ids, or ids registered under another kind, are ignored.
    pub fn unregister(&mut self, kind: impl Into<ComponentKind>, id: ComponentId) -> Option<ChildHandle> {
        let kind = kind.into();
        let bucket = self.buckets.get_mut(&kind)?;
        let position = bucket.iter().position(|existing| *existing == id)?;
        bucket.remove(position);
        self.handles.remove(id)
    }

    /// Removes the first registration of `handle` under `kind`.
    pub fn unregister_handle(&mut self, kind: impl Into<ComponentKind>, handle: &ChildHandle) -> bool {
        let kind = kind.into();
        let found = self.buckets.get(&kind).and_then(|bucket| {
            bucket
                .iter()
                .copied()
                .find(|id| self.handles.get(*id).map_or(false, |h| h.same(handle)))
        });
        match found {
            Some(id) => self.unregister(kind, id).is_some(),
            None => false,
        }
    }

    pub fn get(&self, id: ComponentId) -> Option<&ChildHandle> {
        self.handles.get(id)
    }

    /// Handles registered under `kind`, in registration order.
    pub fn handles(&self, kind: &ComponentKind) -> Vec<ChildHandle> {
        self.buckets
            .get(kind)
            .map(|ids| ids.iter().filter_map(|id| self.handles.get(*id).cloned()).collect())
            .unwrap_or_default()
    }

    pub fn kinds(&self) -> &[ComponentKind] {
        &self.kinds
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Resolves once every handle registered at the time of the call has
    /// initialized. Later registrations are not waited on.
    pub fn all_ready(&self) -> impl Future<Output = ()> + Send + 'static {
        let pending: Vec<_> = self
            .kinds
            .iter()
            .flat_map(|kind| self.handles(kind))
            .map(|handle| handle.initialized())
            .collect();
        async move {
            join_all(pending).await;
        }
    }

    /// Read-only copy of the current buckets.
    pub fn snapshot(&self) -> ComponentsView {
        ComponentsView {
            buckets: self
                .kinds
                .iter()
                .map(|kind| (kind.clone(), self.handles(kind)))
                .collect(),
        }
    }
}

/// Snapshot of a host's children, as exposed through the public API.
#[derive(Clone, Debug, Default)]
pub struct ComponentsView {
    buckets: Vec<(ComponentKind, Vec<ChildHandle>)>,
}

impl ComponentsView {
    pub fn kinds(&self) -> impl Iterator<Item = &ComponentKind> {
        self.buckets.iter().map(|(kind, _)| kind)
    }

    pub fn get(&self, kind: &ComponentKind) -> &[ChildHandle] {
        self.buckets
            .iter()
            .find(|(k, _)| k == kind)
            .map(|(_, handles)| handles.as_slice())
            .unwrap_or(&[])
    }

    pub fn count(&self, kind: &ComponentKind) -> usize {
        self.get(kind).len()
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(|(_, handles)| handles.len()).sum()
    }
}
