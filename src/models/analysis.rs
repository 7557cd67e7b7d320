//! Analysis results and the state handed to the presentation layer

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Coordinate, Elevation, Pin, WeatherSnapshot};

/// Output of one successful run
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AnalysisResult {
    pub coords: Coordinate,
    /// Bucket pins first, wind-aware access pin last
    pub pins: Vec<Pin>,
    pub guidance_text: String,
    pub weather: WeatherSnapshot,
    pub elevation: Elevation,
}

/// Whether a run is in flight. Every run returns to `Idle` once published.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Running,
}

/// How the most recent finished run ended
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded,
    Failed,
}

/// Value published to subscribers after every run
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AnalysisState {
    /// Map center: default coordinate until the first success
    pub center: Coordinate,
    /// Last successful result, kept across failed runs
    pub latest: Option<AnalysisResult>,
    /// Latest guidance, or the fallback message after a failure
    pub guidance_text: String,
    pub phase: RunPhase,
    /// `None` until the first run finishes
    pub last_outcome: Option<RunOutcome>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AnalysisState {
    #[must_use]
    pub fn initial(center: Coordinate) -> Self {
        Self {
            center,
            latest: None,
            guidance_text: String::new(),
            phase: RunPhase::Idle,
            last_outcome: None,
            updated_at: None,
        }
    }

    /// What the map renderer needs
    #[must_use]
    pub fn map_view(&self) -> MapView {
        MapView {
            center: self.center,
            pins: self
                .latest
                .as_ref()
                .map(|result| result.pins.clone())
                .unwrap_or_default(),
        }
    }

    /// What the status panel needs
    #[must_use]
    pub fn status_readout(&self) -> StatusReadout {
        let weather = self
            .latest
            .as_ref()
            .map(|result| result.weather)
            .unwrap_or_default();

        StatusReadout {
            guidance_text: self.guidance_text.clone(),
            elevation: self.latest.as_ref().and_then(|result| result.elevation),
            wind_speed: weather.wind_speed_kmh,
            wind_direction: weather.wind_direction_deg,
            temperature: weather.temperature_c,
            weather_code: weather.weather_code,
        }
    }
}

/// Map center and pins for rendering
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MapView {
    pub center: Coordinate,
    pub pins: Vec<Pin>,
}

impl fmt::Display for MapView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Center: {}", self.center.format_coordinates())?;
        for pin in &self.pins {
            writeln!(f, "   📍 {:.4}, {:.4}  {}", pin.lat, pin.lon, pin.note)?;
        }
        Ok(())
    }
}

/// Guidance text plus the raw readings behind it
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StatusReadout {
    pub guidance_text: String,
    /// Metres
    pub elevation: Elevation,
    /// km/h
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    /// Celsius
    pub temperature: Option<f64>,
    pub weather_code: Option<i32>,
}

fn or_dash<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "—".to_string(), |v| v.to_string())
}

impl fmt::Display for StatusReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Suggested Focus: {}", self.guidance_text)?;

        let wind_cardinal = self
            .wind_direction
            .map(super::weather::wind_direction_to_cardinal);
        let code = self.weather_code.map(|code| {
            format!(
                "{code} ({})",
                super::weather::weather_code_to_description(code)
            )
        });

        write!(
            f,
            "Elevation: {} m · Temp: {}°C · Wind: {} km/h {} · Code: {}",
            or_dash(self.elevation.map(|e| format!("{e:.0}"))),
            or_dash(self.temperature.map(|t| format!("{t:.1}"))),
            or_dash(self.wind_speed.map(|w| format!("{w:.1}"))),
            or_dash(wind_cardinal),
            or_dash(code),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            coords: Coordinate {
                lat: 35.9557,
                lon: -80.0053,
            },
            pins: vec![Pin {
                lat: 35.9657,
                lon: -80.0153,
                note: "Creek edge stand (transition)".to_string(),
            }],
            guidance_text: "Clear/calm".to_string(),
            weather: WeatherSnapshot {
                temperature_c: Some(10.0),
                wind_speed_kmh: Some(5.0),
                wind_direction_deg: Some(180.0),
                weather_code: Some(1),
            },
            elevation: Some(400.0),
        }
    }

    #[test]
    fn test_initial_state_has_no_pins() {
        let state = AnalysisState::initial(Coordinate { lat: 1.0, lon: 2.0 });
        let view = state.map_view();
        assert!(view.pins.is_empty());
        assert_eq!(view.center, Coordinate { lat: 1.0, lon: 2.0 });
        assert_eq!(state.phase, RunPhase::Idle);
        assert_eq!(state.last_outcome, None);
    }

    #[test]
    fn test_status_readout_formats_known_values() {
        let result = sample_result();
        let state = AnalysisState {
            center: result.coords,
            guidance_text: result.guidance_text.clone(),
            latest: Some(result),
            phase: RunPhase::Idle,
            last_outcome: Some(RunOutcome::Succeeded),
            updated_at: None,
        };

        let line = state.status_readout().to_string();
        assert!(line.contains("Suggested Focus: Clear/calm"));
        assert!(line.contains("Elevation: 400 m"));
        assert!(line.contains("Temp: 10.0°C"));
        assert!(line.contains("Wind: 5.0 km/h S"));
        assert!(line.contains("Code: 1 (Mainly clear)"));
    }

    #[test]
    fn test_status_readout_dashes_unknown_values() {
        let state = AnalysisState::initial(Coordinate { lat: 0.0, lon: 0.0 });
        let line = state.status_readout().to_string();
        assert!(line.contains("Elevation: — m"));
        assert!(line.contains("Code: —"));
    }

    #[test]
    fn test_map_view_lists_pins() {
        let result = sample_result();
        let state = AnalysisState {
            center: result.coords,
            guidance_text: String::new(),
            latest: Some(result),
            phase: RunPhase::Idle,
            last_outcome: Some(RunOutcome::Succeeded),
            updated_at: None,
        };
        let rendered = state.map_view().to_string();
        assert!(rendered.contains("Center: 35.9557, -80.0053"));
        assert!(rendered.contains("Creek edge stand (transition)"));
    }
}
