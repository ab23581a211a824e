//! Web-Mercator projection between WGS84 and world pixel coordinates.

use std::f64::consts::PI;

use geo::Coord;
use services_map_location_models::LatLng;

/// Edge of one map tile in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the square Web-Mercator world.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

/// Width (and height) of the whole world in pixels at `zoom`.
#[must_use]
pub fn world_size(zoom: u8) -> f64 {
    TILE_SIZE * 2f64.powi(i32::from(zoom))
}

/// Projects a coordinate to world pixels; `y` grows southwards.
#[must_use]
pub fn project(point: LatLng, zoom: u8) -> Coord<f64> {
    let scale = world_size(zoom);
    let sin_lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians().sin();

    Coord {
        x: (point.lng + 180.0) / 360.0 * scale,
        y: (0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * PI)) * scale,
    }
}

/// Inverse of [`project`].
#[must_use]
pub fn unproject(pixel: Coord<f64>, zoom: u8) -> LatLng {
    let scale = world_size(zoom);
    let n = PI - 2.0 * PI * pixel.y / scale;

    LatLng::new(n.sinh().atan().to_degrees(), pixel.x / scale * 360.0 - 180.0)
}
