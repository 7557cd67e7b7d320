//! Open-Meteo forecast client

use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::config::WeatherConfig;
use crate::error::Upstream;
use crate::http::fetch_body;
use crate::models::{Coordinate, WeatherSnapshot};
use crate::{DeerGuideError, Result};

/// Hourly fields requested alongside current conditions. Not consumed yet.
const HOURLY_FIELDS: &str = "pressure_msl,temperature_2m,windspeed_10m,winddirection_10m";

pub struct OpenMeteoClient {
    client: ClientWithMiddleware,
    base_url: String,
}

/// Forecast response; only `current_weather` is read
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub current_weather: Option<CurrentWeather>,
}

#[derive(Debug, Deserialize)]
pub struct CurrentWeather {
    pub temperature: Option<f64>,
    pub windspeed: Option<f64>,
    pub winddirection: Option<f64>,
    pub weathercode: Option<i32>,
}

impl From<ForecastResponse> for WeatherSnapshot {
    fn from(response: ForecastResponse) -> Self {
        response
            .current_weather
            .map(|current| WeatherSnapshot {
                temperature_c: current.temperature,
                wind_speed_kmh: current.windspeed,
                wind_direction_deg: current.winddirection,
                weather_code: current.weathercode,
            })
            .unwrap_or_default()
    }
}

impl OpenMeteoClient {
    pub fn new(client: ClientWithMiddleware, config: &WeatherConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn forecast_url(&self, coords: Coordinate) -> String {
        format!(
            "{}/forecast?latitude={}&longitude={}&current_weather=true&hourly={}",
            self.base_url, coords.lat, coords.lon, HOURLY_FIELDS
        )
    }

    /// Current conditions at a point
    #[instrument(skip(self), fields(lat = coords.lat, lon = coords.lon))]
    pub async fn current_weather(&self, coords: Coordinate) -> Result<WeatherSnapshot> {
        let url = self.forecast_url(coords);
        debug!("OpenMeteo API request URL: {}", url);

        let body = fetch_body(self.client.get(&url), Upstream::Weather).await?;
        let snapshot = parse_forecast_response(&body)?;

        info!(
            temperature = ?snapshot.temperature_c,
            wind_speed = ?snapshot.wind_speed_kmh,
            weather_code = ?snapshot.weather_code,
            "Retrieved current weather"
        );
        Ok(snapshot)
    }
}

pub fn parse_forecast_response(body: &str) -> Result<WeatherSnapshot> {
    let response: ForecastResponse = serde_json::from_str(body).map_err(|e| {
        DeerGuideError::malformed(
            Upstream::Weather,
            format!("Failed to parse OpenMeteo forecast response: {e}"),
        )
    })?;
    Ok(response.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;

    #[test]
    fn test_forecast_url() {
        let client = crate::http::build_client(&HttpConfig::default()).unwrap();
        let meteo = OpenMeteoClient::new(client, &WeatherConfig::default());
        let url = meteo.forecast_url(Coordinate { lat: 35.9557, lon: -80.0053 });
        assert_eq!(
            url,
            "https://api.open-meteo.com/v1/forecast?latitude=35.9557&longitude=-80.0053&current_weather=true&hourly=pressure_msl,temperature_2m,windspeed_10m,winddirection_10m"
        );
    }

    #[test]
    fn test_parse_full_current_weather() {
        let body = r#"{
            "latitude": 35.96,
            "longitude": -80.0,
            "current_weather": {
                "temperature": 12.4,
                "windspeed": 9.7,
                "winddirection": 225,
                "weathercode": 3,
                "time": "2026-10-18T14:00"
            },
            "hourly": {
                "time": ["2026-10-18T00:00"],
                "pressure_msl": [1016.2],
                "temperature_2m": [null]
            }
        }"#;

        let snapshot = parse_forecast_response(body).unwrap();
        assert_eq!(snapshot.temperature_c, Some(12.4));
        assert_eq!(snapshot.wind_speed_kmh, Some(9.7));
        assert_eq!(snapshot.wind_direction_deg, Some(225.0));
        assert_eq!(snapshot.weather_code, Some(3));
    }

    #[test]
    fn test_parse_missing_fields_map_to_none() {
        let snapshot =
            parse_forecast_response(r#"{"current_weather": {"temperature": 4.0}}"#).unwrap();
        assert_eq!(snapshot.temperature_c, Some(4.0));
        assert_eq!(snapshot.wind_direction_deg, None);
        assert_eq!(snapshot.weather_code, None);

        let snapshot = parse_forecast_response("{}").unwrap();
        assert_eq!(snapshot, WeatherSnapshot::default());
    }

    #[test]
    fn test_parse_unparsable_body() {
        let err = parse_forecast_response("not json").unwrap_err();
        assert!(matches!(
            err,
            DeerGuideError::MalformedResponse {
                upstream: Upstream::Weather,
                ..
            }
        ));
    }
}
