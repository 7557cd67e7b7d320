//! Hunting Guidance Heuristic
//!
//! A fixed rule table mapping current conditions at a point to guidance text
//! and a handful of stand pins. Pure and deterministic: identical inputs give
//! identical output, and missing inputs fall back to defaults instead of
//! failing.

use serde::{Deserialize, Serialize};

use crate::models::{Coordinate, Elevation, Pin, WeatherSnapshot};

/// Weather code assumed when upstream omits it ("mainly clear")
pub const DEFAULT_WEATHER_CODE: i32 = 1;
/// Wind origin assumed when upstream omits it (from the south)
pub const DEFAULT_WIND_DIRECTION_DEG: f64 = 180.0;
/// Above this many metres the highland clause applies
pub const HIGHLAND_THRESHOLD_M: f64 = 350.0;
/// Base pin offset, roughly 1 km
const PIN_OFFSET_DEG: f64 = 0.01;
/// Distance of the access pin from the analysed point
pub const WIND_PIN_RADIUS_DEG: f64 = 0.012;

pub const WIND_PIN_NOTE: &str = "Wind-safe access pin";

/// Weather classes driving the base guidance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherBucket {
    /// code < 2
    ClearCalm,
    /// 2..=45
    OvercastLight,
    /// code > 45
    HeavyPrecipitation,
}

impl WeatherBucket {
    #[must_use]
    pub fn classify(weather_code: i32) -> Self {
        match weather_code {
            code if code < 2 => WeatherBucket::ClearCalm,
            2..=45 => WeatherBucket::OvercastLight,
            _ => WeatherBucket::HeavyPrecipitation,
        }
    }

    #[must_use]
    pub fn guidance(self) -> &'static str {
        match self {
            WeatherBucket::ClearCalm => {
                "Clear/calm: hunt transition zones, creek edges, and leeward ridges."
            }
            WeatherBucket::OvercastLight => {
                "Overcast/light rain: better daytime movement; focus on food edges and saddles."
            }
            WeatherBucket::HeavyPrecipitation => {
                "Heavy precip: deer hold tight; hunt thickets and sheltered hollows."
            }
        }
    }

    /// Offsets in units of `PIN_OFFSET_DEG` as (lat, lon, note)
    fn pin_pattern(self) -> &'static [(f64, f64, &'static str)] {
        match self {
            WeatherBucket::ClearCalm => &[
                (1.0, -1.0, "Creek edge stand (transition)"),
                (-1.0, 1.0, "Leeward ridge oak flat"),
            ],
            WeatherBucket::OvercastLight => &[
                (1.5, 0.0, "Ridge saddle stand"),
                (-1.2, -0.8, "Field/oak edge"),
            ],
            WeatherBucket::HeavyPrecipitation => &[(0.7, 1.2, "Pine thicket")],
        }
    }
}

/// Terrain classes for the optional elevation clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElevationBand {
    Highland,
    Lowland,
}

impl ElevationBand {
    /// `None` when the elevation is unknown
    #[must_use]
    pub fn classify(elevation: Elevation) -> Option<Self> {
        elevation.map(|meters| {
            if meters > HIGHLAND_THRESHOLD_M {
                ElevationBand::Highland
            } else {
                ElevationBand::Lowland
            }
        })
    }

    #[must_use]
    pub fn clause(self) -> &'static str {
        match self {
            ElevationBand::Highland => {
                " Higher elevation: prioritize south-facing slopes and mast sources."
            }
            ElevationBand::Lowland => " Lowlands: focus on creek crossings and brushy edges.",
        }
    }
}

/// Guidance for one point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guidance {
    pub pins: Vec<Pin>,
    pub text: String,
}

/// Derive guidance text and pins for a point
#[must_use]
pub fn compute(coords: Coordinate, weather: &WeatherSnapshot, elevation: Elevation) -> Guidance {
    let weather_code = weather.weather_code.unwrap_or(DEFAULT_WEATHER_CODE);
    let wind_direction = weather
        .wind_direction_deg
        .filter(|deg| deg.is_finite())
        .unwrap_or(DEFAULT_WIND_DIRECTION_DEG);

    let bucket = WeatherBucket::classify(weather_code);
    let mut text = bucket.guidance().to_string();
    let mut pins: Vec<Pin> = bucket
        .pin_pattern()
        .iter()
        .map(|&(d_lat, d_lon, note)| {
            coords.pin_at_offset(d_lat * PIN_OFFSET_DEG, d_lon * PIN_OFFSET_DEG, note)
        })
        .collect();

    if let Some(band) = ElevationBand::classify(elevation) {
        text.push_str(band.clause());
    }

    pins.push(wind_access_pin(coords, wind_direction));

    Guidance { pins, text }
}

/// Access pin on the downwind side: bearing is the wind origin plus 180°
#[must_use]
pub fn wind_access_pin(coords: Coordinate, wind_direction_deg: f64) -> Pin {
    let angle = (wind_direction_deg + 180.0).to_radians();
    coords.pin_at_offset(
        WIND_PIN_RADIUS_DEG * angle.cos(),
        WIND_PIN_RADIUS_DEG * angle.sin(),
        WIND_PIN_NOTE,
    )
}
