//! R-tree over point-locations for visible-bounds queries.

use rstar::primitives::GeomWithData;
use rstar::{AABB, RTree};
use services_map_location_models::{MapBounds, PointLocation};

/// `[lng, lat]` tagged with the location's index in the flattened slice.
type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// Spatial index built once per flattened dataset.
#[derive(Debug, Default)]
pub struct LocationIndex {
    tree: RTree<IndexedPoint>,
}

impl LocationIndex {
    /// Bulk-loads every location.
    #[must_use]
    pub fn build(points: &[PointLocation]) -> Self {
        let entries = points
            .iter()
            .enumerate()
            .map(|(index, point)| GeomWithData::new([point.lng, point.lat], index))
            .collect();

        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Number of indexed locations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether the index holds no locations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Indices of the locations inside `bounds` (edges inclusive), ascending.
    ///
    /// Bounds crossing the antimeridian are split into an eastern and a
    /// western envelope.
    #[must_use]
    pub fn within(&self, bounds: &MapBounds) -> Vec<usize> {
        let south = bounds.south_west.lat;
        let north = bounds.north_east.lat;
        let west = bounds.south_west.lng;
        let east = bounds.north_east.lng;

        let envelopes = if bounds.crosses_antimeridian() {
            vec![
                AABB::from_corners([west, south], [180.0, north]),
                AABB::from_corners([-180.0, south], [east, north]),
            ]
        } else {
            vec![AABB::from_corners([west, south], [east, north])]
        };

        let mut hits: Vec<usize> = envelopes
            .iter()
            .flat_map(|envelope| self.tree.locate_in_envelope(envelope).map(|entry| entry.data))
            .collect();
        hits.sort_unstable();
        hits.dedup();
        hits
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use services_map_location_models::{AreaRecord, LocationKey, ServiceRecord};

    use super::*;

    fn point(id: i64, lat: f64, lng: f64) -> PointLocation {
        PointLocation {
            service: Arc::new(ServiceRecord {
                id,
                title: format!("Service {id}"),
                category: None,
                thumb: None,
                time: None,
                areas: vec![],
            }),
            area: AreaRecord {
                id,
                latitude: Some(lat.into()),
                longitude: Some(lng.into()),
                formatted_address: None,
                city: None,
                country: None,
                street: None,
                name: None,
            },
            lat,
            lng,
            key: LocationKey::new(id, id),
        }
    }

    #[test]
    fn empty_index() {
        let index = LocationIndex::default();
        assert!(index.is_empty());
        assert!(index.within(&MapBounds::from_edges(-90.0, -180.0, 90.0, 180.0)).is_empty());
    }

    #[test]
    fn returns_points_inside_bounds_in_order() {
        let points = [
            point(1, 50.45, 30.52),
            point(2, 49.84, 24.03),
            point(3, 50.40, 30.60),
            point(4, 50.50, 30.50),
        ];
        let index = LocationIndex::build(&points);
        assert_eq!(index.len(), 4);

        let kyiv = MapBounds::from_edges(50.3, 30.4, 50.5, 30.7);
        assert_eq!(index.within(&kyiv), vec![0, 2, 3]);
    }

    #[test]
    fn agrees_with_bounds_contains() {
        let points: Vec<_> = (0..40)
            .map(|i| point(i, -60.0 + 3.0 * f64::from(i as u8), -170.0 + 8.5 * f64::from(i as u8)))
            .collect();
        let index = LocationIndex::build(&points);
        let bounds = MapBounds::from_edges(-20.0, -60.0, 30.0, 100.0);

        let expected: Vec<usize> = points
            .iter()
            .enumerate()
            .filter(|(_, p)| bounds.contains(p.position()))
            .map(|(i, _)| i)
            .collect();
        assert!(!expected.is_empty());
        assert_eq!(index.within(&bounds), expected);
    }

    #[test]
    fn handles_antimeridian_bounds() {
        let points = [point(1, 0.0, 179.5), point(2, 0.0, -179.5), point(3, 0.0, 0.0)];
        let index = LocationIndex::build(&points);

        let pacific = MapBounds::from_edges(-5.0, 170.0, 5.0, -170.0);
        assert_eq!(index.within(&pacific), vec![0, 1]);
    }
}
