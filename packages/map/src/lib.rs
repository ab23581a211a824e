#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The services map as a single stateful session.
//!
//! [`ServicesMapSession`] owns the fetched services and everything derived
//! from them (point-locations, spatial index, initial viewport) plus the
//! popup state. Callers feed it fetch results and map events; it hands back
//! clusters to draw and the popups to show.
//!
//! Services come from a [`ServiceSource`]; [`HttpServiceSource`] talks to
//! the marketplace API. Tuning lives in [`MapConfig`].

pub mod config;
pub mod session;
pub mod source;

pub use config::MapConfig;
pub use services_map_disclosure::MapHandle;
pub use session::{DatasetUpdate, FetchTicket, ProviderStatus, ServicesMapSession};
pub use source::{HttpServiceSource, ServiceFilters, ServicePage, ServiceSource};

/// Errors from the services map session and its data sources.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// Invalid configuration value.
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong with the configuration.
        message: String,
    },

    /// Configuration TOML could not be parsed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The services API answered with a non-success status.
    #[error("Unexpected HTTP status {status}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
    },

    /// The services API answered with an unexpected payload.
    #[error("Service source error: {message}")]
    Source {
        /// Description of what went wrong.
        message: String,
    },
}
