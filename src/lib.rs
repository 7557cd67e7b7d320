//! Deer Guide - whitetail hunting recommendations from live conditions
//!
//! This library resolves a place to coordinates, fetches current weather and
//! terrain elevation for it, and turns them into guidance text and stand pins.
//! The analysis is re-run on a timer so recommendations track the weather.

pub mod config;
pub mod environment;
pub mod error;
pub mod heuristic;
pub mod http;
pub mod location_resolver;
pub mod logging;
pub mod models;
pub mod orchestrator;

// Re-export core types for public API
pub use config::DeerGuideConfig;
pub use environment::{EnvironmentDataClient, HttpEnvironmentClient};
pub use error::{DeerGuideError, FALLBACK_MESSAGE, Upstream};
pub use heuristic::Guidance;
pub use location_resolver::{GeocodeResolver, LocationInput, LocationParser, NominatimResolver};
pub use models::{
    AnalysisResult, AnalysisState, Coordinate, Elevation, MapView, Pin, RunOutcome, RunPhase,
    StatusReadout, WeatherSnapshot,
};
pub use orchestrator::{AnalysisOrchestrator, AnalysisRequest, OrchestratorSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, DeerGuideError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
