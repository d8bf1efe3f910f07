//! # maphost
//!
//! Lifecycle coordination for an embedded interactive map.
//!
//! A [`MapHost`] waits for the mapping platform to load and for its canvas to
//! mount, constructs the map, binds declarative event handlers, and signals
//! readiness to user callbacks and to the child components (markers, shapes,
//! layers) registered against it.

pub mod attrs;
pub mod components;
pub mod core;
pub mod events;
pub mod platform;
pub mod prelude;
pub mod runtime;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    api::PublicApi,
    builder::MapHostBuilder,
    config::HostConfig,
    geo::LatLng,
    host::{MapHost, PipelineOutcome, Stage},
};

pub use attrs::{extract, AttrValue, Attrs, OptionsAndEvents};

pub use components::{ChildHandle, ComponentId, ComponentKind, ComponentRegistry, ComponentsView};

pub use events::{AttachOutcome, Disposer, EventBridge, EventHandler, EventPayload, Subscription};

pub use platform::{
    Canvas, HeadlessMap, HeadlessPlatform, MapOptions, MapsPlatform, PlatformLoader, PlatformMap,
    PlatformSource,
};

pub use runtime::{Deferred, RenderCheckpoint};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Map construction failed: {0}")]
    Construction(String),

    #[error("Subscription to `{event}` rejected: {reason}")]
    SubscriptionRejected { event: String, reason: String },

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Pipeline already started for host {0}")]
    PipelineStarted(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error type alias for convenience
pub type Error = MapError;
