//! Contract with the external mapping platform.
//!
//! The platform is opaque: hosts only construct maps against a mounted canvas,
//! subscribe to named events, push option updates and trigger events.

pub mod headless;
pub mod loader;

pub use headless::{HeadlessMap, HeadlessPlatform};
pub use loader::{PlatformLoader, PlatformSource};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::Result;

/// Options object handed to the platform on construction and update.
pub type MapOptions = serde_json::Map<String, Value>;

/// Native listener registered with a platform map.
pub type Listener = Arc<dyn Fn(&[Value]) + Send + Sync>;

/// Platform-issued token for a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// The mounted surface a map renders into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Canvas {
    pub element: String,
}

impl Canvas {
    pub fn new(element: impl Into<String>) -> Self {
        Self {
            element: element.into(),
        }
    }
}

/// A loaded mapping client library.
pub trait MapsPlatform: Send + Sync {
    fn name(&self) -> &str;

    /// Instantiates a map against `canvas`.
    fn create_map(&self, canvas: &Canvas, options: MapOptions) -> Result<Arc<dyn PlatformMap>>;
}

/// A live map instance owned by the platform.
pub trait PlatformMap: Send + Sync {
    /// Subscribes `listener` to the named event stream.
    fn add_listener(&self, event: &str, listener: Listener) -> Result<ListenerId>;

    /// Removes a listener. Unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);

    /// Merges `options` into the live map.
    fn set_options(&self, options: MapOptions);

    /// Fires `event` on the map as if the platform had emitted it.
    fn trigger(&self, event: &str, args: &[Value]);
}

impl std::fmt::Debug for dyn PlatformMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PlatformMap")
    }
}

impl std::fmt::Debug for dyn MapsPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MapsPlatform({})", self.name())
    }
}
