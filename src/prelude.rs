//! Prelude module for common maphost types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use maphost::prelude::*;`

pub use crate::core::{
    api::PublicApi,
    builder::MapHostBuilder,
    config::HostConfig,
    geo::LatLng,
    host::{LifecycleCallback, MapHost, PipelineOutcome, Stage},
};

pub use crate::attrs::{AttrValue, Attrs, OptionsAndEvents};

pub use crate::components::{ChildHandle, ComponentId, ComponentKind, ComponentsView};

pub use crate::events::{EventHandler, EventPayload};

pub use crate::platform::{
    Canvas, HeadlessMap, HeadlessPlatform, MapOptions, MapsPlatform, PlatformLoader, PlatformMap,
    PlatformSource,
};

pub use crate::runtime::RenderCheckpoint;

pub use crate::{Error as MapError, Result};

pub use std::sync::Arc;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
