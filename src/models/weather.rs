//! Current-conditions snapshot and display helpers

use serde::{Deserialize, Serialize};

/// Terrain elevation in metres; `None` when the lookup had no data
pub type Elevation = Option<f64>;

/// Current weather at a point. Every field may be missing upstream.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct WeatherSnapshot {
    /// Temperature in Celsius
    pub temperature_c: Option<f64>,
    /// Wind speed in km/h
    pub wind_speed_kmh: Option<f64>,
    /// Direction the wind blows from, degrees (0-360, 0/360 is North)
    pub wind_direction_deg: Option<f64>,
    /// WMO weather interpretation code
    pub weather_code: Option<i32>,
}

impl WeatherSnapshot {
    /// Human-readable description of the weather code, if known
    #[must_use]
    pub fn description(&self) -> Option<&'static str> {
        self.weather_code.map(weather_code_to_description)
    }

    /// Cardinal name of the wind direction, if known
    #[must_use]
    pub fn wind_cardinal(&self) -> Option<&'static str> {
        self.wind_direction_deg.map(wind_direction_to_cardinal)
    }
}

/// Convert a WMO weather code to a human-readable description
#[must_use]
pub fn weather_code_to_description(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Nearest of the 16 compass points, each covering a 22.5° sector
#[must_use]
pub fn wind_direction_to_cardinal(degrees: f64) -> &'static str {
    if !degrees.is_finite() {
        return "Unknown";
    }
    let sector = (degrees.rem_euclid(360.0) / 22.5).round() as usize;
    COMPASS_POINTS[sector % COMPASS_POINTS.len()]
}
