//! Host configuration.
//!
//! A [`HostConfig`] carries everything a host needs before any attribute is
//! read: starting viewport, the attribute ignore list and the id prefix. It can
//! be built in code or deserialized from JSON, where missing fields fall back
//! to the defaults.

use serde::{Deserialize, Serialize};

use crate::{
    core::{
        constants::{DEFAULT_ID_PREFIX, DEFAULT_IGNORED_ATTRS, DEFAULT_ZOOM, MAX_ZOOM},
        geo::LatLng,
    },
    MapError, Result,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub zoom: u8,
    pub center: LatLng,
    /// Attribute names dropped before options and events are extracted.
    pub ignored_attrs: Vec<String>,
    /// Option names always present in the options object, `null` when unset.
    pub required_options: Vec<String>,
    pub id_prefix: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            center: LatLng::default(),
            ignored_attrs: DEFAULT_IGNORED_ATTRS.iter().map(|s| s.to_string()).collect(),
            required_options: Vec::new(),
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
        }
    }
}

impl HostConfig {
    pub fn from_json(source: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.zoom > MAX_ZOOM {
            return Err(MapError::InvalidOption(format!(
                "zoom {} exceeds {}",
                self.zoom, MAX_ZOOM
            )));
        }
        if !self.center.is_valid() {
            return Err(MapError::InvalidOption(format!(
                "center {} is out of range",
                self.center
            )));
        }
        if self.id_prefix.is_empty() {
            return Err(MapError::InvalidOption("id prefix is empty".into()));
        }
        Ok(())
    }

    /// Adds to the ignore list without dropping the defaults.
    pub fn ignore(mut self, attr: impl Into<String>) -> Self {
        let attr = attr.into();
        if !self.ignored_attrs.contains(&attr) {
            self.ignored_attrs.push(attr);
        }
        self
    }
}
