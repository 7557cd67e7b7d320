//! Location Resolution Module
//!
//! Turns free-text place queries into coordinates. Text that already looks
//! like `lat,lon` is parsed locally; anything else goes to Nominatim.

use async_trait::async_trait;
use reqwest::header::ACCEPT_LANGUAGE;
use reqwest_middleware::ClientWithMiddleware;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::GeocodingConfig;
use crate::error::Upstream;
use crate::http::fetch_body;
use crate::models::Coordinate;
use crate::{DeerGuideError, Result};

/// Converts a place query into a coordinate
#[async_trait]
pub trait GeocodeResolver: Send + Sync {
    async fn resolve(&self, query: &str) -> Result<Coordinate>;
}

/// Nominatim place search, single best match
pub struct NominatimResolver {
    client: ClientWithMiddleware,
    base_url: String,
    region_qualifier: String,
}

impl NominatimResolver {
    pub fn new(client: ClientWithMiddleware, config: &GeocodingConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            region_qualifier: config.region_qualifier.clone(),
        }
    }

    /// Query text as sent upstream, with the regional qualifier appended
    #[must_use]
    pub fn qualified_query(&self, query: &str) -> String {
        if self.region_qualifier.is_empty() {
            query.to_string()
        } else {
            format!("{query}, {}", self.region_qualifier)
        }
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search?format=json&q={}&limit=1",
            self.base_url,
            urlencoding::encode(&self.qualified_query(query))
        )
    }
}

#[async_trait]
impl GeocodeResolver for NominatimResolver {
    #[instrument(skip(self))]
    async fn resolve(&self, query: &str) -> Result<Coordinate> {
        let url = self.search_url(query);
        debug!("Nominatim request URL: {}", url);

        let request = self.client.get(&url).header(ACCEPT_LANGUAGE, "en");
        let body = fetch_body(request, Upstream::Geocoding).await?;
        let coordinate = parse_search_response(&body, query)?;

        info!(
            "Resolved '{}' to ({})",
            query,
            coordinate.format_coordinates()
        );
        Ok(coordinate)
    }
}

/// Extract the first match from a Nominatim search body
pub fn parse_search_response(body: &str, query: &str) -> Result<Coordinate> {
    let payload: Value = serde_json::from_str(body)
        .map_err(|e| DeerGuideError::malformed(Upstream::Geocoding, e.to_string()))?;

    let Some(first) = payload.as_array().and_then(|results| results.first()) else {
        warn!("No results found for location '{}'", query);
        return Err(DeerGuideError::no_match(query));
    };

    let lat = coordinate_field(first, "lat");
    let lon = coordinate_field(first, "lon");
    match (lat, lon) {
        (Some(lat), Some(lon)) => Coordinate::new(lat, lon).map_err(|e| {
            warn!("Geocoding result for '{}' out of range: {}", query, e);
            DeerGuideError::no_match(query)
        }),
        _ => {
            warn!("Geocoding result for '{}' lacks usable lat/lon", query);
            Err(DeerGuideError::no_match(query))
        }
    }
}

// Nominatim sends numbers as strings; accept plain numbers too.
fn coordinate_field(result: &Value, key: &str) -> Option<f64> {
    match result.get(key)? {
        Value::String(text) => text.trim().parse::<f64>().ok(),
        Value::Number(number) => number.as_f64(),
        _ => None,
    }
    .filter(|value| value.is_finite())
}

/// Types of location input
#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput {
    Coordinates(Coordinate),
    /// Place name to geocode
    Name(String),
}

/// Location parsing utilities
pub struct LocationParser;

impl LocationParser {
    /// Parse location input: coordinates if they look valid, otherwise a name
    pub fn parse(input: &str) -> Result<LocationInput> {
        let input = input.trim();
        if input.is_empty() {
            return Err(DeerGuideError::validation("Location cannot be empty"));
        }

        if let Some(coordinate) = Self::parse_coordinates(input) {
            return Ok(LocationInput::Coordinates(coordinate));
        }

        Ok(LocationInput::Name(input.to_string()))
    }

    /// Parse coordinates from a string like "35.9557,-80.0053" or "35.9557 -80.0053"
    fn parse_coordinates(input: &str) -> Option<Coordinate> {
        let parts: Vec<&str> = input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();

        let [lat, lon] = parts.as_slice() else {
            return None;
        };

        let lat = lat.parse::<f64>().ok()?;
        let lon = lon.parse::<f64>().ok()?;
        Coordinate::new(lat, lon).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use rstest::rstest;

    fn resolver(region_qualifier: &str) -> NominatimResolver {
        let client = crate::http::build_client(&HttpConfig::default()).unwrap();
        NominatimResolver::new(
            client,
            &GeocodingConfig {
                base_url: "https://nominatim.example.org/".to_string(),
                region_qualifier: region_qualifier.to_string(),
            },
        )
    }

    #[test]
    fn test_search_url_appends_region_and_limit() {
        let url = resolver("North Carolina").search_url("Uwharrie National Forest");
        assert_eq!(
            url,
            "https://nominatim.example.org/search?format=json&q=Uwharrie%20National%20Forest%2C%20North%20Carolina&limit=1"
        );
    }

    #[test]
    fn test_qualified_query_without_region() {
        assert_eq!(resolver("").qualified_query("Asheboro"), "Asheboro");
    }

    #[test]
    fn test_parse_first_result_only() {
        let body = r#"[
            {"lat": "35.7079", "lon": "-79.8136", "display_name": "Asheboro"},
            {"lat": "1.0", "lon": "2.0"}
        ]"#;
        let coordinate = parse_search_response(body, "Asheboro").unwrap();
        assert_eq!(coordinate, Coordinate { lat: 35.7079, lon: -79.8136 });
    }

    #[test]
    fn test_parse_numeric_fields() {
        let coordinate = parse_search_response(r#"[{"lat": 35.5, "lon": -80.25}]"#, "x").unwrap();
        assert_eq!(coordinate, Coordinate { lat: 35.5, lon: -80.25 });
    }

    #[rstest]
    #[case::empty_array("[]")]
    #[case::not_an_array(r#"{"error": "Unable to geocode"}"#)]
    #[case::missing_lat(r#"[{"lon": "-80.0"}]"#)]
    #[case::invalid_lon(r#"[{"lat": "35.0", "lon": "west"}]"#)]
    #[case::null_lat(r#"[{"lat": null, "lon": "-80.0"}]"#)]
    #[case::out_of_range(r#"[{"lat": "95.0", "lon": "-80.0"}]"#)]
    fn test_parse_no_match(#[case] body: &str) {
        let err = parse_search_response(body, "Nowhere").unwrap_err();
        assert!(matches!(err, DeerGuideError::NoMatch { ref query } if query == "Nowhere"));
    }

    #[test]
    fn test_parse_non_json_is_malformed() {
        let err = parse_search_response("<html>busy</html>", "x").unwrap_err();
        assert!(matches!(
            err,
            DeerGuideError::MalformedResponse {
                upstream: Upstream::Geocoding,
                ..
            }
        ));
    }

    #[test]
    fn test_location_parser_coordinates() {
        assert_eq!(
            LocationParser::parse("35.9557,-80.0053").unwrap(),
            LocationInput::Coordinates(Coordinate { lat: 35.9557, lon: -80.0053 })
        );
        assert_eq!(
            LocationParser::parse(" 35.9557 -80.0053 ").unwrap(),
            LocationInput::Coordinates(Coordinate { lat: 35.9557, lon: -80.0053 })
        );
    }

    #[rstest]
    #[case("91.0,8.0")]
    #[case("46.0,-181.0")]
    #[case("46.0")]
    #[case("46.0,8.0,0.0")]
    #[case("Uwharrie National Forest")]
    fn test_location_parser_names(#[case] input: &str) {
        assert!(matches!(
            LocationParser::parse(input).unwrap(),
            LocationInput::Name(_)
        ));
    }

    #[test]
    fn test_location_parser_rejects_empty() {
        let err = LocationParser::parse("   ").unwrap_err();
        assert!(err.to_string().contains("Location cannot be empty"));
    }
}
