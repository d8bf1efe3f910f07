//! Child components (markers, shapes, layers) that depend on the host's map.

pub mod handle;
pub mod registry;

pub use handle::ChildHandle;
pub use registry::{ComponentId, ComponentKind, ComponentRegistry, ComponentsView};
