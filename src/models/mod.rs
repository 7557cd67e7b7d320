//! Data models for the deer guide
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic coordinates and map pins
//! - Weather: Current conditions snapshot and display helpers
//! - Analysis: Per-run results and the state published to presentation

pub mod analysis;
pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use analysis::{
    AnalysisResult, AnalysisState, MapView, RunOutcome, RunPhase, StatusReadout,
};
pub use location::{Coordinate, Pin};
pub use weather::{Elevation, WeatherSnapshot};
