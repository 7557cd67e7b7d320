//! Environmental data for a coordinate: current weather and terrain elevation.
//!
//! The two lookups are independent so the orchestrator can issue them
//! concurrently. A logically empty answer is `Ok(None)`, never an error.

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;

use crate::Result;
use crate::config::DeerGuideConfig;
use crate::models::{Coordinate, Elevation, WeatherSnapshot};

pub mod open_meteo;
pub mod open_topo_data;

pub use open_meteo::OpenMeteoClient;
pub use open_topo_data::OpenTopoDataClient;

#[async_trait]
pub trait EnvironmentDataClient: Send + Sync {
    async fn fetch_weather(&self, coords: Coordinate) -> Result<WeatherSnapshot>;
    async fn fetch_elevation(&self, coords: Coordinate) -> Result<Elevation>;
}

/// Open-Meteo for weather, OpenTopoData for elevation
pub struct HttpEnvironmentClient {
    weather: OpenMeteoClient,
    elevation: OpenTopoDataClient,
}

impl HttpEnvironmentClient {
    pub fn new(client: ClientWithMiddleware, config: &DeerGuideConfig) -> Self {
        Self {
            weather: OpenMeteoClient::new(client.clone(), &config.weather),
            elevation: OpenTopoDataClient::new(client, &config.elevation),
        }
    }
}

#[async_trait]
impl EnvironmentDataClient for HttpEnvironmentClient {
    async fn fetch_weather(&self, coords: Coordinate) -> Result<WeatherSnapshot> {
        self.weather.current_weather(coords).await
    }

    async fn fetch_elevation(&self, coords: Coordinate) -> Result<Elevation> {
        self.elevation.elevation(coords).await
    }
}
