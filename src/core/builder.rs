//! Map host builder for fluent API configuration
//!
//! This module provides a MapHostBuilder that collects the host configuration,
//! the initial attribute bag and the lifecycle callbacks before a host exists.

use serde_json::Value;

use crate::{
    attrs::Attrs,
    core::{
        api::PublicApi,
        config::HostConfig,
        geo::LatLng,
        host::{Callbacks, LifecycleCallback, MapHost},
    },
    events::EventPayload,
    platform::PlatformLoader,
    runtime::RenderCheckpoint,
    Result,
};

/// Builder for creating and configuring MapHost instances
#[derive(Default)]
pub struct MapHostBuilder {
    config: HostConfig,
    attrs: Attrs,
    platform: Option<PlatformLoader>,
    checkpoint: Option<RenderCheckpoint>,
    on_load: Option<LifecycleCallback>,
    on_components_load: Option<LifecycleCallback>,
}

impl MapHostBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: HostConfig) -> Self {
        self.config = config;
        self
    }

    pub fn zoom(mut self, zoom: u8) -> Self {
        self.config.zoom = zoom;
        self
    }

    pub fn center(mut self, center: LatLng) -> Self {
        self.config.center = center;
        self
    }

    pub fn id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.id_prefix = prefix.into();
        self
    }

    /// Never treat `attr` as an option or event
    pub fn ignore(mut self, attr: impl Into<String>) -> Self {
        self.config = self.config.ignore(attr);
        self
    }

    /// Always pass `option` to the platform, as `null` when unset
    pub fn require_option(mut self, option: impl Into<String>) -> Self {
        self.config.required_options.push(option.into());
        self
    }

    /// Replace the attribute bag
    pub fn attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(name, value);
        self
    }

    /// Bind a handler to a platform event (`click`, `bounds_changed` or `onClick`)
    pub fn on<F>(mut self, event: &str, handler: F) -> Self
    where
        F: Fn(&EventPayload, &[Value]) + Send + Sync + 'static,
    {
        self.attrs.on(event, handler);
        self
    }

    /// Platform loader to wait on. Defaults to [`PlatformLoader::global`].
    pub fn platform(mut self, platform: PlatformLoader) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Render checkpoint the mounting layer settles. Defaults to a fresh one.
    pub fn checkpoint(mut self, checkpoint: RenderCheckpoint) -> Self {
        self.checkpoint = Some(checkpoint);
        self
    }

    /// Called once the map has been published
    pub fn on_load<F>(mut self, callback: F) -> Self
    where
        F: Fn(&PublicApi) + Send + Sync + 'static,
    {
        self.on_load = Some(Box::new(callback));
        self
    }

    /// Called once every child registered by the first render settle is ready
    pub fn on_components_load<F>(mut self, callback: F) -> Self
    where
        F: Fn(&PublicApi) + Send + Sync + 'static,
    {
        self.on_components_load = Some(Box::new(callback));
        self
    }

    /// Validate the configuration and create the host
    pub fn build(self) -> Result<MapHost> {
        self.config.validate()?;
        Ok(MapHost::assemble(
            self.config,
            self.attrs,
            self.platform
                .unwrap_or_else(|| PlatformLoader::global().clone()),
            self.checkpoint.unwrap_or_default(),
            Callbacks {
                on_load: self.on_load,
                on_components_load: self.on_components_load,
            },
        ))
    }
}
