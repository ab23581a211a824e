#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Marker clustering for the services map.
//!
//! Locations are projected to Web-Mercator world pixels at the current zoom
//! and bucketed into square grid cells; every non-empty cell becomes one
//! [`Cluster`]. Above [`ClusterOptions::max_zoom`] clustering is disabled
//! and every location is its own cluster.
//!
//! [`LocationIndex`] answers the complementary question of which locations
//! fall inside the visible map bounds.

pub mod grid;
pub mod index;
pub mod projection;

pub use grid::{Cluster, cluster_locations};
pub use index::LocationIndex;

/// Default grid cell edge in screen pixels.
pub const DEFAULT_GRID_SIZE: u32 = 60;
/// Default zoom above which clusters are fully split.
pub const DEFAULT_MAX_ZOOM: u8 = 15;
/// Default member count from which a cell renders as a grouped marker.
pub const DEFAULT_MINIMUM_CLUSTER_SIZE: usize = 2;

/// Parameters handed to the clustering pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterOptions {
    /// Grid cell edge in screen pixels.
    pub grid_size: u32,
    /// Zoom above which clustering is disabled.
    pub max_zoom: u8,
    /// Cells with fewer members render as individual markers.
    pub minimum_cluster_size: usize,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            max_zoom: DEFAULT_MAX_ZOOM,
            minimum_cluster_size: DEFAULT_MINIMUM_CLUSTER_SIZE,
        }
    }
}

impl ClusterOptions {
    /// Whether `zoom` is past the clustering threshold.
    #[must_use]
    pub const fn is_exploded(&self, zoom: u8) -> bool {
        zoom > self.max_zoom
    }
}
