//! Where services come from.
//!
//! [`HttpServiceSource`] reads the marketplace `GET /services` endpoint.
//! Tests and the CLI's `--file` mode use other [`ServiceSource`]
//! implementations or feed [`parse_services_json`] directly.

use async_trait::async_trait;
use services_map_location_models::ServiceRecord;

use crate::MapError;

/// Query filters for a service listing. Unset and zero-valued filters are
/// left out of the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceFilters {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Page size.
    pub limit: Option<u32>,
    /// Category filter.
    pub category_id: Option<i64>,
    /// Area filter.
    pub area_id: Option<i64>,
    /// Item filter.
    pub item_id: Option<i64>,
}

impl ServiceFilters {
    /// Query parameters for the set filters, in API (camelCase) naming.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(page) = self.page.filter(|v| *v != 0) {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit.filter(|v| *v != 0) {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(id) = self.category_id.filter(|v| *v != 0) {
            pairs.push(("categoryId", id.to_string()));
        }
        if let Some(id) = self.area_id.filter(|v| *v != 0) {
            pairs.push(("areaId", id.to_string()));
        }
        if let Some(id) = self.item_id.filter(|v| *v != 0) {
            pairs.push(("itemId", id.to_string()));
        }

        pairs
    }
}

/// One page of services.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServicePage {
    /// Total number of services matching the filters, across all pages.
    pub total: u64,
    /// Services on this page.
    pub services: Vec<ServiceRecord>,
}

/// A provider of service listings.
#[async_trait]
pub trait ServiceSource: Send + Sync {
    /// Fetches one page of services.
    ///
    /// # Errors
    ///
    /// Returns [`MapError`] if the request or response parsing fails.
    async fn fetch_services(&self, filters: &ServiceFilters) -> Result<ServicePage, MapError>;
}

/// Marketplace API client.
#[derive(Debug, Clone)]
pub struct HttpServiceSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpServiceSource {
    /// Creates a client for the API rooted at `base_url`
    /// (e.g. `"https://api.example.com/api"`).
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ServiceSource for HttpServiceSource {
    async fn fetch_services(&self, filters: &ServiceFilters) -> Result<ServicePage, MapError> {
        let url = format!("{}/services", self.base_url);
        let query = filters.query_pairs();

        log::debug!("Fetching {url} with {query:?}");

        let resp = self.client.get(&url).query(&query).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MapError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body: serde_json::Value = resp.json().await?;
        parse_services_envelope(body)
    }
}

/// Reads the API envelope `{ "data": { "total": n, "services": [...] } }`.
///
/// A missing or null `services` list is an empty page; a missing `total`
/// falls back to the number of services returned.
///
/// # Errors
///
/// Returns [`MapError::Source`] if there is no `data` object and
/// [`MapError::Json`] if a service record is malformed.
pub fn parse_services_envelope(body: serde_json::Value) -> Result<ServicePage, MapError> {
    let serde_json::Value::Object(mut envelope) = body else {
        return Err(MapError::Source {
            message: "response is not a JSON object".to_string(),
        });
    };

    let Some(serde_json::Value::Object(mut data)) = envelope.remove("data") else {
        return Err(MapError::Source {
            message: "response has no 'data' object".to_string(),
        });
    };

    let services: Vec<ServiceRecord> = match data.remove("services") {
        None | Some(serde_json::Value::Null) => Vec::new(),
        Some(value) => serde_json::from_value(value)?,
    };

    let total = data
        .get("total")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(services.len() as u64);

    Ok(ServicePage { total, services })
}

/// Reads either a bare JSON array of services or the API envelope.
///
/// # Errors
///
/// Returns [`MapError`] if the document is neither.
pub fn parse_services_json(body: serde_json::Value) -> Result<ServicePage, MapError> {
    if body.is_array() {
        let services: Vec<ServiceRecord> = serde_json::from_value(body)?;
        return Ok(ServicePage {
            total: services.len() as u64,
            services,
        });
    }

    parse_services_envelope(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_set_filters_become_query_params() {
        let filters = ServiceFilters {
            page: Some(2),
            limit: Some(0),
            category_id: Some(7),
            ..ServiceFilters::default()
        };

        assert_eq!(
            filters.query_pairs(),
            vec![("page", "2".to_string()), ("categoryId", "7".to_string())]
        );
        assert!(ServiceFilters::default().query_pairs().is_empty());
    }

    #[test]
    fn parses_envelope() {
        let page = parse_services_envelope(serde_json::json!({
            "data": {
                "total": 42,
                "services": [
                    { "id": 1, "title": "Cleaning", "areas": [
                        { "id": 10, "latitude": "50.45", "longitude": "30.52" },
                    ]},
                    { "id": 2, "title": "Repair", "areas": null },
                ],
            },
        }))
        .unwrap();

        assert_eq!(page.total, 42);
        assert_eq!(page.services.len(), 2);
        assert_eq!(page.services[0].areas.len(), 1);
        assert!(page.services[1].areas.is_empty());
    }

    #[test]
    fn malformed_area_fields_keep_the_page() {
        let page = parse_services_envelope(serde_json::json!({
            "data": {
                "total": 2,
                "services": [
                    { "id": 1, "title": "Cleaning", "areas": [
                        { "id": 10, "latitude": "50.45", "longitude": "30.52" },
                    ]},
                    { "id": 2, "title": null, "areas": [
                        { "id": 11, "latitude": true, "longitude": "30.0" },
                    ]},
                ],
            },
        }))
        .unwrap();

        assert_eq!(page.services.len(), 2);
        assert!(page.services[1].title.is_empty());
    }

    #[test]
    fn envelope_without_services_is_empty() {
        let page = parse_services_envelope(serde_json::json!({ "data": { "total": 0 } })).unwrap();
        assert_eq!(page, ServicePage::default());
    }

    #[test]
    fn envelope_without_data_is_an_error() {
        assert!(matches!(
            parse_services_envelope(serde_json::json!({ "services": [] })),
            Err(MapError::Source { .. })
        ));
        assert!(matches!(
            parse_services_envelope(serde_json::json!("oops")),
            Err(MapError::Source { .. })
        ));
    }

    #[test]
    fn malformed_service_is_a_json_error() {
        let result = parse_services_envelope(serde_json::json!({
            "data": { "services": [{ "title": "No id" }] },
        }));
        assert!(matches!(result, Err(MapError::Json(_))));
    }

    #[test]
    fn accepts_bare_array() {
        let page = parse_services_json(serde_json::json!([
            { "id": 5, "title": "Tutoring" },
        ]))
        .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.services[0].id, 5);
    }
}
