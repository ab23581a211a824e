//! Google Geocoding API reverse-lookup client.
//!
//! Requests are localized to Ukrainian (`language=uk`, `region=UA`). The
//! API answers with several candidate results ordered from most to least
//! specific; [`select_address`] picks the fields to store.
//!
//! See <https://developers.google.com/maps/documentation/geocoding/requests-reverse-geocoding>

use async_trait::async_trait;
use serde::Deserialize;
use services_map_location_models::LatLng;

use crate::{AddressResolution, AddressResolver, GeocodeError, GeocodingProvider, non_empty};

/// Public Geocoding API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Result types that carry a street-level address.
const STREET_LEVEL_TYPES: &[&str] = &["street_address", "route", "intersection"];

/// Top-level Geocoding API response.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResponse {
    /// `"OK"`, `"ZERO_RESULTS"`, `"OVER_QUERY_LIMIT"`, `"REQUEST_DENIED"`, ...
    pub status: String,
    /// Candidate results, most specific first.
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    /// Human-readable error detail for non-OK statuses.
    #[serde(default)]
    pub error_message: Option<String>,
}

/// One candidate result.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResult {
    /// One-line address.
    pub formatted_address: String,
    /// Result types (e.g. `"street_address"`, `"locality"`).
    #[serde(default)]
    pub types: Vec<String>,
    /// Structured address parts.
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
}

impl GeocodeResult {
    fn has_type(&self, wanted: &str) -> bool {
        self.types.iter().any(|t| t == wanted)
    }
}

/// A structured part of an address.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressComponent {
    /// Full name (e.g. `"Khreshchatyk Street"`).
    pub long_name: String,
    /// Component types (e.g. `"route"`, `"locality"`).
    #[serde(default)]
    pub types: Vec<String>,
}

impl AddressComponent {
    fn has_type(&self, wanted: &str) -> bool {
        self.types.iter().any(|t| t == wanted)
    }
}

/// Picks the address fields to store from the candidate results.
///
/// The formatted address comes from the first street-level result, or the
/// first result when none is street-level. City, country and street always
/// come from the first result: city is its `locality`, falling back to
/// `administrative_area_level_2`. With no results only the coordinates are
/// known.
#[must_use]
pub fn select_address(point: LatLng, results: &[GeocodeResult]) -> AddressResolution {
    let Some(best) = results.first() else {
        return AddressResolution::coordinates_only(point);
    };

    let formatted_address = results
        .iter()
        .find(|result| STREET_LEVEL_TYPES.iter().any(|t| result.has_type(t)))
        .unwrap_or(best)
        .formatted_address
        .clone();

    let mut city: Option<String> = None;
    let mut country: Option<String> = None;
    let mut street: Option<String> = None;

    for component in &best.address_components {
        if component.has_type("locality") {
            city = non_empty(Some(&component.long_name));
        } else if component.has_type("administrative_area_level_2") && city.is_none() {
            city = non_empty(Some(&component.long_name));
        } else if component.has_type("country") {
            country = non_empty(Some(&component.long_name));
        }

        if component.has_type("route") {
            street = non_empty(Some(&component.long_name));
        }
    }

    AddressResolution {
        formatted_address,
        city,
        country,
        street,
    }
}

/// Reverse geocoder backed by the Google Geocoding API.
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GoogleGeocoder {
    /// Creates a client for the public endpoint.
    #[must_use]
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Creates a client from `GOOGLE_MAPS_API_KEY`, if set and non-empty.
    #[must_use]
    pub fn from_env(client: reqwest::Client) -> Option<Self> {
        let api_key = std::env::var("GOOGLE_MAPS_API_KEY").ok()?;
        if api_key.is_empty() {
            return None;
        }
        Some(Self::new(client, api_key))
    }

    /// Points the client at a different endpoint (e.g. a proxy).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl AddressResolver for GoogleGeocoder {
    fn provider(&self) -> GeocodingProvider {
        GeocodingProvider::Google
    }

    async fn resolve_address(&self, point: LatLng) -> Result<AddressResolution, GeocodeError> {
        let latlng = format!("{},{}", point.lat, point.lng);

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latlng", latlng.as_str()),
                ("language", "uk"),
                ("region", "UA"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        let body: serde_json::Value = resp.json().await?;
        parse_response(point, body)
    }
}

/// Interprets a Geocoding API response body.
fn parse_response(
    point: LatLng,
    body: serde_json::Value,
) -> Result<AddressResolution, GeocodeError> {
    let response: GeocodeResponse =
        serde_json::from_value(body).map_err(|e| GeocodeError::Parse {
            message: format!("Invalid Geocoding API response: {e}"),
        })?;

    match response.status.as_str() {
        "OK" | "ZERO_RESULTS" => {
            log::debug!(
                "Google returned {} results for {point}",
                response.results.len()
            );
            Ok(select_address(point, &response.results))
        }
        "OVER_QUERY_LIMIT" => Err(GeocodeError::RateLimited),
        _ => Err(GeocodeError::Denied {
            status: response.status,
            message: response.error_message,
        }),
    }
}
