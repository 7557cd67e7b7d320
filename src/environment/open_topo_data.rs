//! OpenTopoData point-elevation client

use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::config::ElevationConfig;
use crate::error::Upstream;
use crate::http::fetch_body;
use crate::models::{Coordinate, Elevation};
use crate::{DeerGuideError, Result};

pub struct OpenTopoDataClient {
    client: ClientWithMiddleware,
    base_url: String,
    dataset: String,
}

#[derive(Debug, Deserialize)]
pub struct ElevationResponse {
    pub results: Option<Vec<ElevationResult>>,
}

#[derive(Debug, Deserialize)]
pub struct ElevationResult {
    pub elevation: Option<f64>,
}

impl OpenTopoDataClient {
    pub fn new(client: ClientWithMiddleware, config: &ElevationConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            dataset: config.dataset.clone(),
        }
    }

    fn lookup_url(&self, coords: Coordinate) -> String {
        format!(
            "{}/{}?locations={},{}",
            self.base_url, self.dataset, coords.lat, coords.lon
        )
    }

    /// Elevation in metres, `None` when the dataset has no value for the point
    #[instrument(skip(self), fields(lat = coords.lat, lon = coords.lon))]
    pub async fn elevation(&self, coords: Coordinate) -> Result<Elevation> {
        let url = self.lookup_url(coords);
        debug!("OpenTopoData request URL: {}", url);

        let body = fetch_body(self.client.get(&url), Upstream::Elevation).await?;
        let elevation = parse_elevation_response(&body)?;

        info!(elevation = ?elevation, "Retrieved elevation");
        Ok(elevation)
    }
}

pub fn parse_elevation_response(body: &str) -> Result<Elevation> {
    let response: ElevationResponse = serde_json::from_str(body).map_err(|e| {
        DeerGuideError::malformed(
            Upstream::Elevation,
            format!("Failed to parse OpenTopoData response: {e}"),
        )
    })?;

    Ok(response
        .results
        .and_then(|results| results.into_iter().next())
        .and_then(|first| first.elevation))
}
