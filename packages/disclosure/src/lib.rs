#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Which marker popups (disclosures) are open.
//!
//! The controller is a two-state machine keyed on the map zoom:
//!
//! - **Collapsed** (zoom ≤ max cluster zoom): popups open and close on
//!   marker clicks, several may be open at once.
//! - **Exploded** (zoom > max cluster zoom): every bounds or zoom change
//!   replaces the open set with exactly the locations inside the visible
//!   bounds. Clicks are ignored.
//!
//! Leaving the exploded state closes everything. The map itself is owned by
//! the caller and only borrowed through [`MapHandle`] for each event.

use std::collections::{BTreeSet, HashMap};

use services_map_cluster::LocationIndex;
use services_map_location_models::{
    DisclosureMode, DismissPolicy, LocationKey, MapBounds, PointLocation,
};

/// Read access to the live map, borrowed for the duration of one event.
pub trait MapHandle {
    /// Current zoom, or `None` while the map is not ready.
    fn zoom(&self) -> Option<u8>;

    /// Current visible bounds, or `None` while the map is not ready.
    fn bounds(&self) -> Option<MapBounds>;
}

/// Tracks the open popups.
#[derive(Debug, Clone)]
pub struct DisclosureController {
    max_cluster_zoom: u8,
    dismiss_policy: DismissPolicy,
    mode: DisclosureMode,
    selection: Vec<LocationKey>,
    /// Dismissed while exploded; kept out of bulk recomputes.
    suppressed: BTreeSet<LocationKey>,
    last_zoom: Option<u8>,
    revision: u64,
}

impl DisclosureController {
    /// Creates a collapsed controller with nothing open.
    #[must_use]
    pub const fn new(max_cluster_zoom: u8, dismiss_policy: DismissPolicy) -> Self {
        Self {
            max_cluster_zoom,
            dismiss_policy,
            mode: DisclosureMode::Collapsed,
            selection: Vec::new(),
            suppressed: BTreeSet::new(),
            last_zoom: None,
            revision: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn mode(&self) -> DisclosureMode {
        self.mode
    }

    /// Open popups, in the order they were opened (or flatten order after a
    /// bulk recompute).
    #[must_use]
    pub fn selection(&self) -> &[LocationKey] {
        &self.selection
    }

    /// Bumped on every change to [`Self::selection`].
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether the popup for `key` is open.
    #[must_use]
    pub fn is_open(&self, key: LocationKey) -> bool {
        self.selection.contains(&key)
    }

    /// Resolves the open keys against the current locations.
    #[must_use]
    pub fn selected<'a>(&self, locations: &'a [PointLocation]) -> Vec<&'a PointLocation> {
        let by_key: HashMap<LocationKey, &PointLocation> =
            locations.iter().map(|location| (location.key, location)).collect();

        self.selection
            .iter()
            .filter_map(|key| by_key.get(key).copied())
            .collect()
    }

    /// Marker click. Opens the popup if closed, closes it if open.
    ///
    /// Ignored while exploded. Returns whether the selection changed.
    pub fn toggle(&mut self, key: LocationKey) -> bool {
        if self.mode == DisclosureMode::Exploded {
            log::debug!("Ignoring click on {key} while clusters are exploded");
            return false;
        }

        let mut next = self.selection.clone();
        if let Some(position) = next.iter().position(|open| *open == key) {
            next.remove(position);
        } else {
            next.push(key);
        }
        self.replace_selection(next)
    }

    /// User closed one popup.
    ///
    /// While collapsed this closes exactly that popup. While exploded the
    /// outcome depends on the [`DismissPolicy`]. Returns whether the
    /// selection changed.
    pub fn dismiss(&mut self, key: LocationKey) -> bool {
        if self.mode == DisclosureMode::Exploded {
            match self.dismiss_policy {
                DismissPolicy::Ignore => return false,
                DismissPolicy::UntilNextRecompute => {}
                DismissPolicy::UntilZoomChange => {
                    self.suppressed.insert(key);
                }
            }
        }

        let next = self
            .selection
            .iter()
            .copied()
            .filter(|open| *open != key)
            .collect();
        self.replace_selection(next)
    }

    /// Bounds changed, zoom changed, or the clustering pass finished.
    ///
    /// `index` must have been built from `locations`. The event is skipped,
    /// keeping the current state, when the map cannot report its zoom, or
    /// its bounds while above the cluster threshold. Returns whether the
    /// selection changed.
    pub fn on_view_changed<M: MapHandle + ?Sized>(
        &mut self,
        map: &M,
        locations: &[PointLocation],
        index: &LocationIndex,
    ) -> bool {
        let Some(zoom) = map.zoom() else {
            log::debug!("Map zoom unavailable, keeping current popups");
            return false;
        };

        if zoom <= self.max_cluster_zoom {
            self.last_zoom = Some(zoom);
            if self.mode == DisclosureMode::Collapsed {
                return false;
            }

            log::debug!("Zoom {zoom} collapsed clusters, closing all popups");
            self.mode = DisclosureMode::Collapsed;
            self.suppressed.clear();
            return self.replace_selection(Vec::new());
        }

        let Some(bounds) = map.bounds() else {
            log::debug!("Map bounds unavailable, keeping current popups");
            return false;
        };

        if self.mode == DisclosureMode::Collapsed {
            log::debug!("Zoom {zoom} exploded clusters");
            self.mode = DisclosureMode::Exploded;
            self.suppressed.clear();
        } else if self.last_zoom != Some(zoom) {
            self.suppressed.clear();
        }
        self.last_zoom = Some(zoom);

        let next: Vec<LocationKey> = index
            .within(&bounds)
            .into_iter()
            .filter_map(|i| locations.get(i))
            .map(|location| location.key)
            .filter(|key| !self.suppressed.contains(key))
            .collect();

        log::debug!("{} locations visible at zoom {zoom}", next.len());
        self.replace_selection(next)
    }

    /// Dataset replaced: close everything and return to collapsed.
    pub fn reset(&mut self) {
        self.mode = DisclosureMode::Collapsed;
        self.suppressed.clear();
        self.last_zoom = None;
        self.replace_selection(Vec::new());
    }

    fn replace_selection(&mut self, next: Vec<LocationKey>) -> bool {
        if next == self.selection {
            return false;
        }
        self.selection = next;
        self.revision += 1;
        true
    }
}
