//! Pixel-grid bucketing of locations into clusters.

use std::collections::HashMap;

use geo::{BoundingRect, Centroid, Coord, MultiPoint, Point};
use services_map_location_models::{LatLng, MapBounds, PointLocation};

use crate::ClusterOptions;
use crate::projection::{project, unproject};

/// A group of locations sharing one grid cell at some zoom.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Indices into the clustered slice, ascending.
    pub members: Vec<usize>,
    /// Mean member position (averaged in pixel space).
    pub centroid: LatLng,
    /// Smallest bounds containing every member.
    pub bounds: MapBounds,
}

impl Cluster {
    /// Number of member locations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always `false`; clusters are never built empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether the cluster renders as a grouped marker rather than as its
    /// members' individual markers.
    ///
    /// With a minimum size of 1 even lone markers render as clusters.
    #[must_use]
    pub fn is_group(&self, options: &ClusterOptions) -> bool {
        self.members.len() >= options.minimum_cluster_size
    }

    /// Whether the location at `index` belongs to this cluster.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.members.binary_search(&index).is_ok()
    }
}

/// Groups locations by grid cell at `zoom`.
///
/// Clusters are ordered by their first member's index, so the output is
/// deterministic for a given input order. Above the clustering threshold
/// each location becomes a single-member cluster.
#[must_use]
pub fn cluster_locations(
    points: &[PointLocation],
    zoom: u8,
    options: &ClusterOptions,
) -> Vec<Cluster> {
    if options.is_exploded(zoom) {
        log::debug!(
            "Zoom {zoom} above max cluster zoom {}, {} single markers",
            options.max_zoom,
            points.len()
        );
        return points
            .iter()
            .enumerate()
            .map(|(index, point)| single(index, point.position()))
            .collect();
    }

    let grid = f64::from(options.grid_size.max(1));
    let mut cells: HashMap<(i64, i64), usize> = HashMap::new();
    let mut buckets: Vec<(Vec<usize>, Vec<Coord<f64>>)> = Vec::new();

    for (index, point) in points.iter().enumerate() {
        let pixel = project(point.position(), zoom);
        let slot = *cells.entry(cell_of(pixel, grid)).or_insert_with(|| {
            buckets.push((Vec::new(), Vec::new()));
            buckets.len() - 1
        });
        let (members, pixels) = &mut buckets[slot];
        members.push(index);
        pixels.push(pixel);
    }

    log::debug!(
        "Clustered {} locations into {} cells at zoom {zoom}",
        points.len(),
        buckets.len()
    );

    buckets
        .into_iter()
        .map(|(members, pixels)| {
            if let [index] = members[..] {
                return single(index, points[index].position());
            }

            let positions: MultiPoint<f64> = members
                .iter()
                .map(|&i| Point::new(points[i].lng, points[i].lat))
                .collect();
            let pixels = MultiPoint::from(pixels);

            let centroid = pixels
                .centroid()
                .map_or_else(|| points[members[0]].position(), |c| unproject(c.0, zoom));
            let bounds = positions.bounding_rect().map_or_else(
                || point_bounds(points[members[0]].position()),
                |rect| MapBounds::from_edges(rect.min().y, rect.min().x, rect.max().y, rect.max().x),
            );

            Cluster {
                members,
                centroid,
                bounds,
            }
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation)]
fn cell_of(pixel: Coord<f64>, grid: f64) -> (i64, i64) {
    ((pixel.x / grid).floor() as i64, (pixel.y / grid).floor() as i64)
}

fn single(index: usize, position: LatLng) -> Cluster {
    Cluster {
        members: vec![index],
        centroid: position,
        bounds: point_bounds(position),
    }
}

const fn point_bounds(position: LatLng) -> MapBounds {
    MapBounds {
        south_west: position,
        north_east: position,
    }
}
