//! Expansion of services into one point-location per usable area.

use std::collections::BTreeMap;
use std::sync::Arc;

use services_map_location_models::{AreaRecord, LocationKey, PointLocation, ServiceRecord};

use crate::coordinate::parse_coordinate;

/// Flattens services into point-locations.
///
/// Output order is service order, then area order within each service.
/// Areas whose latitude or longitude is unusable are skipped. A service
/// listing the same area twice yields two locations whose keys differ only
/// in [`LocationKey::occurrence`].
#[must_use]
pub fn flatten(services: &[Arc<ServiceRecord>]) -> Vec<PointLocation> {
    let mut locations = Vec::new();

    for service in services {
        let mut seen: BTreeMap<i64, u32> = BTreeMap::new();

        for area in &service.areas {
            let Some((lat, lng)) = area_position(area) else {
                log::trace!(
                    "Skipping area {} of service {}: unusable coordinates",
                    area.id,
                    service.id
                );
                continue;
            };

            let occurrence = seen.entry(area.id).or_insert(0);
            let key = LocationKey {
                service_id: service.id,
                area_id: area.id,
                occurrence: *occurrence,
            };
            *occurrence += 1;

            log::trace!(
                "Location {} ({}): {lat}, {lng} {}",
                locations.len() + 1,
                key,
                area.formatted_address.as_deref().unwrap_or("")
            );

            locations.push(PointLocation {
                service: Arc::clone(service),
                area: area.clone(),
                lat,
                lng,
                key,
            });
        }
    }

    log::debug!(
        "Flattened {} services into {} locations",
        services.len(),
        locations.len()
    );

    locations
}

/// Counts the locations [`flatten`] would produce without building them.
#[must_use]
pub fn count_locations(services: &[Arc<ServiceRecord>]) -> usize {
    services
        .iter()
        .flat_map(|service| &service.areas)
        .filter(|area| area_position(area).is_some())
        .count()
}

fn area_position(area: &AreaRecord) -> Option<(f64, f64)> {
    let lat = parse_coordinate(area.latitude.as_ref())?;
    let lng = parse_coordinate(area.longitude.as_ref())?;
    Some((lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn services(value: serde_json::Value) -> Vec<Arc<ServiceRecord>> {
        let records: Vec<ServiceRecord> = serde_json::from_value(value).unwrap();
        records.into_iter().map(Arc::new).collect()
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(flatten(&[]).is_empty());
        assert_eq!(count_locations(&[]), 0);
    }

    #[test]
    fn services_without_valid_areas_yield_nothing() {
        let input = services(serde_json::json!([
            { "id": 1, "title": "No areas", "areas": [] },
            { "id": 2, "title": "Null areas", "areas": null },
            { "id": 3, "title": "Bad areas", "areas": [
                { "id": 7, "latitude": "undefined", "longitude": "30.0" },
                { "id": 8, "latitude": "50.0" },
                { "id": 9, "latitude": "north", "longitude": "east" },
            ]},
        ]));

        assert!(flatten(&input).is_empty());
        assert_eq!(count_locations(&input), 0);
    }

    #[test]
    fn skips_invalid_area_and_keeps_valid_one() {
        let input = services(serde_json::json!([
            { "id": 1, "title": "Plumbing", "areas": [
                { "id": 1, "latitude": "50.45", "longitude": "30.52" },
            ]},
            { "id": 2, "title": "Tutoring", "areas": [
                { "id": 2, "latitude": "undefined", "longitude": "30.0" },
            ]},
        ]));

        let locations = flatten(&input);
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].service.id, 1);
        assert!((locations[0].lat - 50.45).abs() < 1e-9);
        assert!((locations[0].lng - 30.52).abs() < 1e-9);
        assert_eq!(locations[0].key, LocationKey::new(1, 1));
    }

    #[test]
    fn malformed_coordinates_only_drop_their_area() {
        let input = services(serde_json::json!([
            { "id": 1, "title": null, "areas": [
                { "id": 1, "latitude": true, "longitude": 30.52 },
                { "id": 2, "latitude": [50.0], "longitude": { "v": 1 } },
            ]},
            { "id": 2, "title": "Sibling", "areas": [
                { "id": 3, "latitude": "50.45", "longitude": "30.52" },
            ]},
        ]));

        let locations = flatten(&input);
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].key, LocationKey::new(2, 3));
        assert_eq!(count_locations(&input), 1);
    }

    #[test]
    fn preserves_service_then_area_order() {
        let input = services(serde_json::json!([
            { "id": 10, "title": "A", "areas": [
                { "id": 1, "latitude": 1.0, "longitude": 1.0 },
                { "id": 2, "latitude": "bad", "longitude": 2.0 },
                { "id": 3, "latitude": 3.0, "longitude": "3.0" },
            ]},
            { "id": 20, "title": "B", "areas": [
                { "id": 4, "latitude": "4", "longitude": "4" },
            ]},
        ]));

        let keys: Vec<_> = flatten(&input).iter().map(|l| l.key).collect();
        assert_eq!(
            keys,
            vec![
                LocationKey::new(10, 1),
                LocationKey::new(10, 3),
                LocationKey::new(20, 4),
            ]
        );
        assert_eq!(count_locations(&input), 3);
    }

    #[test]
    fn duplicated_areas_are_kept_with_distinct_keys() {
        let input = services(serde_json::json!([
            { "id": 5, "title": "Two shops", "areas": [
                { "id": 9, "latitude": 50.0, "longitude": 30.0 },
                { "id": 9, "latitude": 50.0, "longitude": 30.0 },
            ]},
        ]));

        let locations = flatten(&input);
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].key.occurrence, 0);
        assert_eq!(locations[1].key.occurrence, 1);
        assert_ne!(locations[0].key, locations[1].key);
    }

    #[test]
    fn locations_share_the_service_record() {
        let input = services(serde_json::json!([
            { "id": 1, "title": "Shared", "areas": [
                { "id": 1, "latitude": 1.0, "longitude": 1.0 },
                { "id": 2, "latitude": 2.0, "longitude": 2.0 },
            ]},
        ]));

        let locations = flatten(&input);
        assert!(Arc::ptr_eq(&locations[0].service, &locations[1].service));
        assert!(Arc::ptr_eq(&locations[0].service, &input[0]));
    }
}
