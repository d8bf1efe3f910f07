use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat >= -90.0 && self.lat <= 90.0 && self.lng >= -180.0 && self.lng <= 180.0
    }

    /// Builds a coordinate from loosely typed `lat`/`lng` attribute values.
    ///
    /// Both must be numbers, or numeric strings.
    pub fn from_values(lat: &Value, lng: &Value) -> Option<Self> {
        fn number(value: &Value) -> Option<f64> {
            match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            }
        }
        Some(Self::new(number(lat)?, number(lng)?))
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl From<LatLng> for Value {
    fn from(position: LatLng) -> Self {
        json!({ "lat": position.lat, "lng": position.lng })
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lat, self.lng)
    }
}
