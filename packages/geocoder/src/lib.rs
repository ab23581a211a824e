#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reverse geocoding for the services map.
//!
//! Turns a clicked or detected coordinate into the address fields stored
//! on an area (formatted address, city, country, street). Two providers
//! are supported behind the [`AddressResolver`] trait:
//!
//! 1. **Google Geocoding API** ([`google`]): requires an API key, gives the
//!    richest results, including street names.
//! 2. **`BigDataCloud`** ([`bigdatacloud`]): free client-side endpoint,
//!    no key; city and country only.
//!
//! Resolution never blocks the map: [`resolve_or_coordinates`] degrades
//! any failure to an address made of the raw coordinates.

pub mod bigdatacloud;
pub mod google;

use async_trait::async_trait;
use services_map_location_models::LatLng;
use strum_macros::{AsRefStr, Display};
use thiserror::Error;

/// Address fields resolved for a coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressResolution {
    /// One-line address; the coordinates themselves when nothing better
    /// is known.
    pub formatted_address: String,
    /// City (locality, or the district when no locality is known).
    pub city: Option<String>,
    /// Country name.
    pub country: Option<String>,
    /// Street (route) name.
    pub street: Option<String>,
}

impl AddressResolution {
    /// A resolution carrying only the coordinates, formatted as
    /// `"{lat:.6}, {lng:.6}"`.
    #[must_use]
    pub fn coordinates_only(point: LatLng) -> Self {
        Self {
            formatted_address: point.to_string(),
            city: None,
            country: None,
            street: None,
        }
    }
}

/// Which provider resolved an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum GeocodingProvider {
    /// Google Geocoding API.
    Google,
    /// `BigDataCloud` client reverse-geocode endpoint.
    BigDataCloud,
}

/// Errors from reverse geocoding.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The provider refused the request (bad key, quota, disabled API).
    #[error("Request denied with status {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Denied {
        /// Provider status code.
        status: String,
        /// Provider error message, if any.
        message: Option<String>,
    },
}

/// Coordinates-to-address lookup.
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Which provider this resolver talks to.
    fn provider(&self) -> GeocodingProvider;

    /// Resolves the address at `point`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request or response parsing fails.
    async fn resolve_address(&self, point: LatLng) -> Result<AddressResolution, GeocodeError>;
}

/// Resolves `point`, falling back to [`AddressResolution::coordinates_only`]
/// on any error.
pub async fn resolve_or_coordinates<R: AddressResolver + ?Sized>(
    resolver: &R,
    point: LatLng,
) -> AddressResolution {
    match resolver.resolve_address(point).await {
        Ok(resolution) => resolution,
        Err(e) => {
            log::warn!(
                "Reverse geocoding {point} via {} failed: {e}",
                resolver.provider()
            );
            AddressResolution::coordinates_only(point)
        }
    }
}

/// Treats empty and whitespace-only strings as missing.
fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
