//! Initial map center and zoom for a set of locations.
//!
//! This is a coarse heuristic, not a bounding-box fit: the center is the
//! unweighted mean of all coordinates and the zoom depends only on how many
//! locations there are. The map provider owns all pan/zoom state after
//! the first render.

use services_map_location_models::{LatLng, PointLocation, Viewport};

/// Kyiv city center, used when there is nothing to show.
pub const DEFAULT_CENTER: LatLng = LatLng::new(50.4501, 30.5234);

/// Zoom when there are no locations.
pub const EMPTY_ZOOM: u8 = 12;
/// Zoom when centering on a single location.
pub const SINGLE_ZOOM: u8 = 14;
/// Zoom for small sets (2 up to [`DENSE_THRESHOLD`] locations).
pub const SPARSE_ZOOM: u8 = 12;
/// Zoom for sets larger than [`DENSE_THRESHOLD`].
pub const DENSE_ZOOM: u8 = 11;
/// Location count above which [`DENSE_ZOOM`] is used.
pub const DENSE_THRESHOLD: usize = 10;

/// Estimates the viewport, falling back to [`DEFAULT_CENTER`].
#[must_use]
pub fn estimate_viewport(points: &[PointLocation]) -> Viewport {
    estimate_viewport_with_fallback(points, DEFAULT_CENTER)
}

/// Estimates the viewport with an explicit fallback center for empty sets.
#[must_use]
pub fn estimate_viewport_with_fallback(points: &[PointLocation], fallback: LatLng) -> Viewport {
    match points {
        [] => Viewport {
            center: fallback,
            zoom: EMPTY_ZOOM,
        },
        [only] => Viewport {
            center: only.position(),
            zoom: SINGLE_ZOOM,
        },
        _ => {
            #[allow(clippy::cast_precision_loss)]
            let count = points.len() as f64;
            let (lat_sum, lng_sum) = points
                .iter()
                .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));

            Viewport {
                center: LatLng::new(lat_sum / count, lng_sum / count),
                zoom: if points.len() > DENSE_THRESHOLD {
                    DENSE_ZOOM
                } else {
                    SPARSE_ZOOM
                },
            }
        }
    }
}
