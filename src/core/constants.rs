//! Host-wide defaults taken from the map component's public behaviour.
//! Keeping them in a single place makes it easier to tweak them together.

/// Zoom level used when none is configured.
pub const DEFAULT_ZOOM: u8 = 8;

/// Highest zoom level accepted by the platform contract.
pub const MAX_ZOOM: u8 = 22;

/// Prefix that marks an attribute as an event binding (`onClick`, `onIdle`).
pub const EVENT_PREFIX: &str = "on";

/// Prefix for generated host identifiers.
pub const DEFAULT_ID_PREFIX: &str = "map-host";

/// Platform event fired once the first render has settled.
pub const IDLE_EVENT: &str = "idle";

/// Attributes that are never treated as map options or event bindings.
pub const DEFAULT_IGNORED_ATTRS: &[&str] = &["map", "_internalAPI", "gMap", "lat", "lng", "events"];

/// Attribute names the center is derived from.
pub const LAT_ATTR: &str = "lat";
pub const LNG_ATTR: &str = "lng";
