#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Service, area and point-location types for the services map.
//!
//! [`ServiceRecord`] and [`AreaRecord`] mirror the marketplace API payloads
//! and are read-only here. [`PointLocation`] and the geometry types are
//! derived by the location and cluster crates on every dataset change.

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A marketplace service as returned by the services API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecord {
    /// Service ID.
    pub id: i64,
    /// Display title.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Category the service is listed under.
    #[serde(default)]
    pub category: Option<CategoryRef>,
    /// Thumbnail image reference.
    #[serde(default)]
    pub thumb: Option<String>,
    /// Typical duration in minutes.
    #[serde(default)]
    pub time: Option<u32>,
    /// Areas (physical locations) the service is offered at.
    #[serde(default, deserialize_with = "null_as_default")]
    pub areas: Vec<AreaRecord>,
}

/// Reference to a service category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    /// Category ID.
    pub id: i64,
    /// Category name.
    pub name: String,
}

/// An area (address + coordinates) attached to a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaRecord {
    /// Area ID.
    pub id: i64,
    /// Raw latitude; may be missing, textual, or garbage.
    #[serde(default)]
    pub latitude: Option<RawCoordinate>,
    /// Raw longitude; may be missing, textual, or garbage.
    #[serde(default)]
    pub longitude: Option<RawCoordinate>,
    /// Full address from the geocoder.
    #[serde(default)]
    pub formatted_address: Option<String>,
    /// City name.
    #[serde(default)]
    pub city: Option<String>,
    /// Country name.
    #[serde(default)]
    pub country: Option<String>,
    /// Street name.
    #[serde(default)]
    pub street: Option<String>,
    /// Free-form area name.
    #[serde(default)]
    pub name: Option<String>,
}

/// A coordinate field exactly as the API sent it.
///
/// Areas created through different clients store coordinates either as
/// JSON numbers or as strings, including the literal `"undefined"`. Any
/// other JSON shape lands in [`RawCoordinate::Other`] so one broken area
/// never fails the whole payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCoordinate {
    /// A JSON number.
    Number(f64),
    /// A JSON string.
    Text(String),
    /// Anything else (booleans, objects, arrays); never a usable coordinate.
    Other(serde_json::Value),
}

impl From<f64> for RawCoordinate {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RawCoordinate {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl LatLng {
    /// Creates a coordinate.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both components are finite and inside WGS84 ranges.
    #[must_use]
    pub fn is_within_range(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// Visible map bounds as reported by the map provider.
///
/// A `west` edge greater than the `east` edge means the bounds cross the
/// antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapBounds {
    /// South-west corner.
    pub south_west: LatLng,
    /// North-east corner.
    pub north_east: LatLng,
}

impl MapBounds {
    /// Creates bounds from its four edges.
    #[must_use]
    pub const fn from_edges(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south_west: LatLng::new(south, west),
            north_east: LatLng::new(north, east),
        }
    }

    /// Whether the longitude span wraps past 180°.
    #[must_use]
    pub fn crosses_antimeridian(&self) -> bool {
        self.south_west.lng > self.north_east.lng
    }

    /// Edge-inclusive containment test.
    #[must_use]
    pub fn contains(&self, point: LatLng) -> bool {
        if point.lat < self.south_west.lat || point.lat > self.north_east.lat {
            return false;
        }

        if self.crosses_antimeridian() {
            point.lng >= self.south_west.lng || point.lng <= self.north_east.lng
        } else {
            point.lng >= self.south_west.lng && point.lng <= self.north_east.lng
        }
    }
}

/// Initial map center and zoom for a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Map center.
    pub center: LatLng,
    /// Zoom level.
    pub zoom: u8,
}

/// Identity of a [`PointLocation`] within one flatten pass.
///
/// `occurrence` distinguishes a service that lists the same area more than
/// once; it is 0 for the first (and usually only) occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationKey {
    /// Owning service ID.
    pub service_id: i64,
    /// Area ID.
    pub area_id: i64,
    /// Repeat counter for duplicated areas.
    pub occurrence: u32,
}

impl LocationKey {
    /// Key for the first occurrence of a (service, area) pair.
    #[must_use]
    pub const fn new(service_id: i64, area_id: i64) -> Self {
        Self {
            service_id,
            area_id,
            occurrence: 0,
        }
    }
}

impl std::fmt::Display for LocationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.occurrence == 0 {
            write!(f, "{}-{}", self.service_id, self.area_id)
        } else {
            write!(
                f,
                "{}-{}-{}",
                self.service_id, self.area_id, self.occurrence
            )
        }
    }
}

/// A single renderable marker: one service at one of its areas.
#[derive(Debug, Clone, PartialEq)]
pub struct PointLocation {
    /// The owning service, shared by all of its locations.
    pub service: Arc<ServiceRecord>,
    /// The area this marker stands for.
    pub area: AreaRecord,
    /// Parsed latitude.
    pub lat: f64,
    /// Parsed longitude.
    pub lng: f64,
    /// Selection identity.
    pub key: LocationKey,
}

impl PointLocation {
    /// The marker position.
    #[must_use]
    pub const fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// Whether clusters are currently merged or split into single markers.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DisclosureMode {
    /// Zoom at or below the cluster threshold; popups follow clicks.
    #[default]
    Collapsed,
    /// Zoom above the cluster threshold; popups follow the visible bounds.
    Exploded,
}

/// What dismissing a popup does while clusters are exploded.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DismissPolicy {
    /// Dismissal is ignored; the popup stays open.
    Ignore,
    /// Closed now, reopened by the next bounds or zoom recompute.
    #[default]
    UntilNextRecompute,
    /// Kept closed across bounds recomputes until the zoom level changes.
    UntilZoomChange,
}
