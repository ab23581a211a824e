//! Text shown on map markers and in their info popups.

use services_map_location_models::{PointLocation, ServiceRecord};

/// Hover title for a marker: `"{title} - {address}"`.
///
/// The address is the area's formatted address, else its city. With
/// neither available the title is used alone.
#[must_use]
pub fn marker_title(location: &PointLocation) -> String {
    let place = non_empty(location.area.formatted_address.as_deref())
        .or_else(|| non_empty(location.area.city.as_deref()));

    match place {
        Some(place) => format!("{} - {place}", location.service.title),
        None => location.service.title.clone(),
    }
}

/// Summary rendered inside a marker's info popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerInfo {
    /// Service ID, used to link to the service page.
    pub service_id: i64,
    /// Service title.
    pub title: String,
    /// Thumbnail reference.
    pub thumb: Option<String>,
    /// Category name.
    pub category: Option<String>,
    /// Typical duration in minutes.
    pub time_minutes: Option<u32>,
    /// City (or name) of the service's first area.
    pub place: Option<String>,
}

impl MarkerInfo {
    /// Builds the popup summary for a service.
    #[must_use]
    pub fn from_service(service: &ServiceRecord) -> Self {
        let place = service.areas.first().and_then(|area| {
            non_empty(area.city.as_deref())
                .or_else(|| non_empty(area.name.as_deref()))
                .map(str::to_string)
        });

        Self {
            service_id: service.id,
            title: service.title.clone(),
            thumb: service.thumb.clone().filter(|t| !t.is_empty()),
            category: service.category.as_ref().map(|c| c.name.clone()),
            time_minutes: service.time,
            place,
        }
    }
}

/// Header line counting the locations on the map, e.g. `"Знайдено: 3 локації"`.
///
/// Exactly one location takes the singular form, fewer than five the
/// paucal form, anything else the plural.
#[must_use]
pub fn location_count_label(count: usize) -> String {
    let noun = match count {
        1 => "локація",
        0..5 => "локації",
        _ => "локацій",
    };
    format!("Знайдено: {count} {noun}")
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::flatten::flatten;

    fn locations(value: serde_json::Value) -> Vec<PointLocation> {
        let records: Vec<ServiceRecord> = serde_json::from_value(value).unwrap();
        let records: Vec<_> = records.into_iter().map(Arc::new).collect();
        flatten(&records)
    }

    #[test]
    fn title_prefers_formatted_address() {
        let locs = locations(serde_json::json!([
            { "id": 1, "title": "Haircut", "areas": [
                { "id": 1, "latitude": 1, "longitude": 1,
                  "formattedAddress": "1 Main St, Lviv", "city": "Lviv" },
                { "id": 2, "latitude": 2, "longitude": 2, "city": "Odesa" },
                { "id": 3, "latitude": 3, "longitude": 3, "formattedAddress": "" },
            ]},
        ]));

        assert_eq!(marker_title(&locs[0]), "Haircut - 1 Main St, Lviv");
        assert_eq!(marker_title(&locs[1]), "Haircut - Odesa");
        assert_eq!(marker_title(&locs[2]), "Haircut");
    }

    #[test]
    fn info_uses_first_area_city_or_name() {
        let service: ServiceRecord = serde_json::from_value(serde_json::json!({
            "id": 42,
            "title": "Guitar lessons",
            "thumb": "https://img.example/42.jpg",
            "category": { "id": 3, "name": "Education" },
            "time": 60,
            "areas": [{ "id": 1, "name": "Podil" }, { "id": 2, "city": "Kyiv" }],
        }))
        .unwrap();

        let info = MarkerInfo::from_service(&service);
        assert_eq!(info.service_id, 42);
        assert_eq!(info.category.as_deref(), Some("Education"));
        assert_eq!(info.time_minutes, Some(60));
        assert_eq!(info.place.as_deref(), Some("Podil"));
    }

    #[test]
    fn count_label_forms() {
        assert_eq!(location_count_label(0), "Знайдено: 0 локації");
        assert_eq!(location_count_label(1), "Знайдено: 1 локація");
        assert_eq!(location_count_label(3), "Знайдено: 3 локації");
        assert_eq!(location_count_label(5), "Знайдено: 5 локацій");
        assert_eq!(location_count_label(21), "Знайдено: 21 локацій");
    }

    #[test]
    fn info_without_optional_fields() {
        let service: ServiceRecord =
            serde_json::from_value(serde_json::json!({ "id": 1, "title": "Bare", "thumb": "" }))
                .unwrap();

        let info = MarkerInfo::from_service(&service);
        assert!(info.thumb.is_none());
        assert!(info.category.is_none());
        assert!(info.place.is_none());
    }
}
