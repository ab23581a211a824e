#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Turns fetched service records into map-ready point-locations.
//!
//! 1. [`coordinate`] validates the loosely typed latitude/longitude fields.
//! 2. [`flatten`] expands every service × area pair with usable
//!    coordinates into a [`PointLocation`](services_map_location_models::PointLocation).
//! 3. [`viewport`] picks the initial map center and zoom for the result.
//!
//! [`marker`] derives the text shown on markers and in their popups.
//!
//! Everything here is pure; callers decide when to recompute (typically
//! whenever the fetched service list is replaced).

pub mod coordinate;
pub mod flatten;
pub mod marker;
pub mod viewport;

pub use coordinate::{is_valid_coordinate, parse_coordinate};
pub use flatten::{count_locations, flatten};
pub use viewport::{estimate_viewport, estimate_viewport_with_fallback};
