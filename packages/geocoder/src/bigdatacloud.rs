//! `BigDataCloud` free client-side reverse geocoder.
//!
//! No API key is needed, but only locality-level fields come back, so the
//! formatted address is assembled from city and country.
//!
//! See <https://www.bigdatacloud.com/free-api/free-reverse-geocode-to-city-api>

use async_trait::async_trait;
use serde::Deserialize;
use services_map_location_models::LatLng;

use crate::{AddressResolution, AddressResolver, GeocodeError, GeocodingProvider, non_empty};

/// Public reverse-geocode-client endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.bigdatacloud.net/data/reverse-geocode-client";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReverseGeocodeResponse {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    locality: Option<String>,
    #[serde(default)]
    country_name: Option<String>,
}

/// Reverse geocoder backed by `BigDataCloud`.
#[derive(Debug, Clone)]
pub struct BigDataCloudGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl BigDataCloudGeocoder {
    /// Creates a client for the public endpoint.
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Points the client at a different endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl AddressResolver for BigDataCloudGeocoder {
    fn provider(&self) -> GeocodingProvider {
        GeocodingProvider::BigDataCloud
    }

    async fn resolve_address(&self, point: LatLng) -> Result<AddressResolution, GeocodeError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", point.lat.to_string()),
                ("longitude", point.lng.to_string()),
                ("localityLanguage", "uk".to_string()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }
        if !status.is_success() {
            return Err(GeocodeError::Denied {
                status: status.as_u16().to_string(),
                message: status.canonical_reason().map(str::to_string),
            });
        }

        let body: serde_json::Value = resp.json().await?;
        parse_response(point, body)
    }
}

/// Maps a reverse-geocode-client body onto address fields.
///
/// City is `city`, falling back to `locality`. The formatted address joins
/// city and country, or is the coordinates when both are missing.
fn parse_response(
    point: LatLng,
    body: serde_json::Value,
) -> Result<AddressResolution, GeocodeError> {
    let response: ReverseGeocodeResponse =
        serde_json::from_value(body).map_err(|e| GeocodeError::Parse {
            message: format!("Invalid BigDataCloud response: {e}"),
        })?;

    let city = non_empty(response.city.as_deref()).or_else(|| non_empty(response.locality.as_deref()));
    let country = non_empty(response.country_name.as_deref());

    let formatted_address = match (&city, &country) {
        (Some(city), Some(country)) => format!("{city}, {country}"),
        (Some(part), None) | (None, Some(part)) => part.clone(),
        (None, None) => {
            log::debug!("BigDataCloud had no locality for {point}");
            return Ok(AddressResolution::coordinates_only(point));
        }
    };

    Ok(AddressResolution {
        formatted_address,
        city,
        country,
        street: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const POINT: LatLng = LatLng::new(49.8397, 24.0297);

    #[test]
    fn uses_city_and_country() {
        let resolution = parse_response(
            POINT,
            serde_json::json!({
                "city": "Львів",
                "locality": "Галицький район",
                "countryName": "Україна",
            }),
        )
        .unwrap();

        assert_eq!(resolution.formatted_address, "Львів, Україна");
        assert_eq!(resolution.city.as_deref(), Some("Львів"));
        assert_eq!(resolution.country.as_deref(), Some("Україна"));
        assert!(resolution.street.is_none());
    }

    #[test]
    fn empty_city_falls_back_to_locality() {
        let resolution = parse_response(
            POINT,
            serde_json::json!({ "city": "", "locality": "Винники", "countryName": "Україна" }),
        )
        .unwrap();

        assert_eq!(resolution.city.as_deref(), Some("Винники"));
        assert_eq!(resolution.formatted_address, "Винники, Україна");
    }

    #[test]
    fn country_only() {
        let resolution =
            parse_response(POINT, serde_json::json!({ "countryName": "Україна" })).unwrap();
        assert_eq!(resolution.formatted_address, "Україна");
        assert!(resolution.city.is_none());
    }

    #[test]
    fn nothing_known_uses_coordinates() {
        let resolution = parse_response(POINT, serde_json::json!({ "city": "  " })).unwrap();
        assert_eq!(resolution.formatted_address, "49.839700, 24.029700");
    }

    #[test]
    fn rejects_non_object() {
        let result = parse_response(POINT, serde_json::json!("nope"));
        assert!(matches!(result, Err(GeocodeError::Parse { .. })));
    }
}
