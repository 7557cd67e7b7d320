//! Coordinate and pin models

use serde::{Deserialize, Serialize};

use crate::{DeerGuideError, Result};

/// A point on the map in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting values outside the valid ranges
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(DeerGuideError::validation(format!(
                "Latitude must be between -90 and 90, got: {lat}"
            )));
        }

        if !(-180.0..=180.0).contains(&lon) {
            return Err(DeerGuideError::validation(format!(
                "Longitude must be between -180 and 180, got: {lon}"
            )));
        }

        Ok(Self { lat, lon })
    }

    /// Format as a coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lon)
    }

    /// Pin placed at a fixed degree offset from this coordinate
    #[must_use]
    pub fn pin_at_offset(&self, d_lat: f64, d_lon: f64, note: &str) -> Pin {
        Pin {
            lat: self.lat + d_lat,
            lon: self.lon + d_lon,
            note: note.to_string(),
        }
    }
}

/// A single map-anchored recommendation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Pin {
    pub lat: f64,
    pub lon: f64,
    /// Short human-readable label, not a key
    pub note: String,
}
