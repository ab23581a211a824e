//! Stateful services map: dataset, derived locations and popup state.

use std::sync::Arc;

use services_map_cluster::{Cluster, LocationIndex, cluster_locations};
use services_map_disclosure::{DisclosureController, MapHandle};
use services_map_location::{estimate_viewport_with_fallback, flatten};
use services_map_location_models::{
    DisclosureMode, LocationKey, PointLocation, ServiceRecord, Viewport,
};

use crate::{MapConfig, MapError, ServiceFilters, ServicePage, ServiceSource};

/// Handle for one in-flight fetch. Only the most recent ticket may apply
/// its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

/// Outcome of handing a fetch result to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetUpdate {
    /// The dataset was replaced.
    Applied {
        /// Point-locations derived from the new dataset.
        locations: usize,
    },
    /// A newer fetch or a direct replacement superseded this one; the
    /// result was discarded.
    Stale,
}

/// Load state of the map provider (tiles, marker library).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProviderStatus {
    /// Still loading; nothing is drawn.
    #[default]
    Loading,
    /// Loaded; clusters and popups are live.
    Ready,
    /// Failed to load, with the provider's reason.
    Failed(String),
}

/// One services map view.
#[derive(Debug)]
pub struct ServicesMapSession {
    config: MapConfig,
    services: Vec<Arc<ServiceRecord>>,
    total: u64,
    locations: Arc<[PointLocation]>,
    index: LocationIndex,
    viewport: Viewport,
    disclosure: DisclosureController,
    provider: ProviderStatus,
    generation: u64,
}

impl ServicesMapSession {
    /// Creates an empty session waiting for the map provider.
    #[must_use]
    pub fn new(config: MapConfig) -> Self {
        Self {
            services: Vec::new(),
            total: 0,
            locations: Arc::from(Vec::new()),
            index: LocationIndex::default(),
            viewport: estimate_viewport_with_fallback(&[], config.viewport.fallback_center),
            disclosure: DisclosureController::new(
                config.cluster.max_zoom,
                config.disclosure.dismiss_policy,
            ),
            provider: ProviderStatus::Loading,
            generation: 0,
            config,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Starts a fetch, superseding any fetch still in flight.
    pub const fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        FetchTicket {
            generation: self.generation,
        }
    }

    /// Hands the result of the fetch started with `ticket` to the session.
    ///
    /// Superseded results are discarded, errors included. A failed current
    /// fetch leaves the previous dataset in place.
    ///
    /// # Errors
    ///
    /// Returns the fetch error when `ticket` is still current.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<ServicePage, MapError>,
    ) -> Result<DatasetUpdate, MapError> {
        if ticket.generation != self.generation {
            log::debug!(
                "Discarding fetch #{} (current is #{})",
                ticket.generation,
                self.generation
            );
            return Ok(DatasetUpdate::Stale);
        }

        let page = result?;
        let locations = self.apply(page.services, page.total);
        Ok(DatasetUpdate::Applied { locations })
    }

    /// Fetches from `source` and applies the result.
    ///
    /// # Errors
    ///
    /// Returns [`MapError`] if the fetch fails.
    pub async fn fetch_with<S: ServiceSource + ?Sized>(
        &mut self,
        source: &S,
        filters: &ServiceFilters,
    ) -> Result<DatasetUpdate, MapError> {
        let ticket = self.begin_fetch();
        let result = source.fetch_services(filters).await;
        self.complete_fetch(ticket, result)
    }

    /// Replaces the dataset directly. In-flight fetches become stale.
    ///
    /// Returns the number of point-locations derived.
    pub fn set_services(&mut self, services: Vec<ServiceRecord>) -> usize {
        self.generation += 1;
        let total = services.len() as u64;
        self.apply(services, total)
    }

    fn apply(&mut self, services: Vec<ServiceRecord>, total: u64) -> usize {
        self.services = services.into_iter().map(Arc::new).collect();
        self.total = total;
        self.locations = Arc::from(flatten(&self.services));
        self.index = LocationIndex::build(&self.locations);
        self.viewport =
            estimate_viewport_with_fallback(&self.locations, self.config.viewport.fallback_center);
        self.disclosure.reset();

        log::info!(
            "Applied {} services ({} total) with {} locations, center {} zoom {}",
            self.services.len(),
            self.total,
            self.locations.len(),
            self.viewport.center,
            self.viewport.zoom
        );

        self.locations.len()
    }

    /// The map provider finished loading.
    pub fn provider_loaded(&mut self) {
        log::debug!("Map provider ready");
        self.provider = ProviderStatus::Ready;
    }

    /// The map provider failed to load.
    pub fn provider_failed(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        log::warn!("Map provider failed to load: {reason}");
        self.provider = ProviderStatus::Failed(reason);
    }

    /// Current provider load state.
    #[must_use]
    pub const fn provider_status(&self) -> &ProviderStatus {
        &self.provider
    }

    fn is_ready(&self) -> bool {
        self.provider == ProviderStatus::Ready
    }

    /// Services in the current dataset.
    #[must_use]
    pub fn services(&self) -> &[Arc<ServiceRecord>] {
        &self.services
    }

    /// Point-locations derived from the current dataset.
    #[must_use]
    pub fn locations(&self) -> &[PointLocation] {
        &self.locations
    }

    /// Total matching services reported by the source (may exceed the
    /// number loaded).
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Initial viewport for the current dataset.
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Spatial index over [`Self::locations`].
    #[must_use]
    pub const fn location_index(&self) -> &LocationIndex {
        &self.index
    }

    /// Clusters to draw at `zoom`. Empty until the provider is ready.
    #[must_use]
    pub fn clusters(&self, zoom: u8) -> Vec<Cluster> {
        if !self.is_ready() {
            return Vec::new();
        }
        cluster_locations(&self.locations, zoom, &self.config.cluster_options())
    }

    /// Marker clicked. Returns whether the open popups changed.
    pub fn on_marker_click(&mut self, key: LocationKey) -> bool {
        self.disclosure.toggle(key)
    }

    /// Popup closed by the user. Returns whether the open popups changed.
    pub fn on_disclosure_close(&mut self, key: LocationKey) -> bool {
        self.disclosure.dismiss(key)
    }

    /// Bounds or zoom changed. Returns whether the open popups changed.
    pub fn on_view_changed<M: MapHandle + ?Sized>(&mut self, map: &M) -> bool {
        if !self.is_ready() {
            log::debug!("Map provider not ready, ignoring view change");
            return false;
        }
        self.disclosure
            .on_view_changed(map, &self.locations, &self.index)
    }

    /// The provider finished a clustering pass.
    pub fn on_clustering_end<M: MapHandle + ?Sized>(&mut self, map: &M) -> bool {
        self.on_view_changed(map)
    }

    /// Keys of the open popups, in opening order.
    #[must_use]
    pub fn selection(&self) -> &[LocationKey] {
        self.disclosure.selection()
    }

    /// Locations whose popups are open.
    #[must_use]
    pub fn selected_locations(&self) -> Vec<&PointLocation> {
        self.disclosure.selected(&self.locations)
    }

    /// Whether clusters are currently collapsed or exploded.
    #[must_use]
    pub const fn disclosure_mode(&self) -> DisclosureMode {
        self.disclosure.mode()
    }
}
