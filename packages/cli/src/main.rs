#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line inspector for the services map.
//!
//! ```text
//! services_map summary  --file services.json
//! services_map clusters --api-url https://api.example.com/api --zoom 11
//! services_map visible  --file services.json --zoom 17 \
//!     --south 50.40 --west 30.45 --north 50.50 --east 30.60
//! services_map reverse  --lat 50.4501 --lng 30.5234 [--provider big-data-cloud]
//! ```
//!
//! Services are read from `--file` (a JSON array of services or the API
//! envelope) or fetched from `--api-url` / `SERVICES_API_URL`. Map tuning
//! comes from the embedded configuration plus `SERVICES_MAP_*` overrides.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use services_map::source::parse_services_json;
use services_map::{
    HttpServiceSource, MapConfig, MapHandle, ServiceFilters, ServicesMapSession,
};
use services_map_geocoder::bigdatacloud::BigDataCloudGeocoder;
use services_map_geocoder::google::GoogleGeocoder;
use services_map_geocoder::{AddressResolver, resolve_or_coordinates};
use services_map_location::marker::{location_count_label, marker_title};
use services_map_location_models::{LatLng, MapBounds};

#[derive(Parser)]
#[command(name = "services_map", about = "Inspect the services map offline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count locations and show the initial viewport
    Summary {
        #[command(flatten)]
        input: InputArgs,
    },
    /// List clusters at a zoom level
    Clusters {
        #[command(flatten)]
        input: InputArgs,
        /// Map zoom level
        #[arg(long)]
        zoom: u8,
    },
    /// Show which popups are open for a zoom and visible bounds
    Visible {
        #[command(flatten)]
        input: InputArgs,
        /// Map zoom level
        #[arg(long)]
        zoom: u8,
        /// Southern edge latitude
        #[arg(long, allow_hyphen_values = true)]
        south: f64,
        /// Western edge longitude
        #[arg(long, allow_hyphen_values = true)]
        west: f64,
        /// Northern edge latitude
        #[arg(long, allow_hyphen_values = true)]
        north: f64,
        /// Eastern edge longitude
        #[arg(long, allow_hyphen_values = true)]
        east: f64,
    },
    /// Reverse-geocode a coordinate
    Reverse {
        /// Latitude
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Geocoding provider (defaults to Google when `GOOGLE_MAPS_API_KEY`
        /// is set)
        #[arg(long, value_enum)]
        provider: Option<ProviderArg>,
    },
}

#[derive(Args)]
struct InputArgs {
    /// JSON file with services (array or API envelope); wins over `--api-url`
    #[arg(long)]
    file: Option<PathBuf>,
    /// Services API base URL
    #[arg(long, env = "SERVICES_API_URL")]
    api_url: Option<String>,
    /// Page number
    #[arg(long)]
    page: Option<u32>,
    /// Page size
    #[arg(long)]
    limit: Option<u32>,
    /// Category filter
    #[arg(long)]
    category_id: Option<i64>,
    /// Area filter
    #[arg(long)]
    area_id: Option<i64>,
    /// Item filter
    #[arg(long)]
    item_id: Option<i64>,
}

impl InputArgs {
    const fn filters(&self) -> ServiceFilters {
        ServiceFilters {
            page: self.page,
            limit: self.limit,
            category_id: self.category_id,
            area_id: self.area_id,
            item_id: self.item_id,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ProviderArg {
    Google,
    BigDataCloud,
}

/// A map frozen at one zoom and viewport.
struct StaticMap {
    zoom: u8,
    bounds: MapBounds,
}

impl MapHandle for StaticMap {
    fn zoom(&self) -> Option<u8> {
        Some(self.zoom)
    }

    fn bounds(&self) -> Option<MapBounds> {
        Some(self.bounds)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    match cli.command {
        Commands::Summary { input } => {
            let session = load_session(&input).await?;
            let viewport = session.viewport();

            println!(
                "Services: {} loaded, {} total",
                session.services().len(),
                session.total()
            );
            println!("{}", location_count_label(session.locations().len()));
            println!("Center:   {}", viewport.center);
            println!("Zoom:     {}", viewport.zoom);
        }
        Commands::Clusters { input, zoom } => {
            let session = load_session(&input).await?;
            let options = session.config().cluster_options();
            let locations = session.locations();
            let clusters = session.clusters(zoom);

            for cluster in &clusters {
                if cluster.is_group(&options) {
                    println!(
                        "[{}] cluster at {} (SW {} / NE {})",
                        cluster.len(),
                        cluster.centroid,
                        cluster.bounds.south_west,
                        cluster.bounds.north_east
                    );
                    for &i in &cluster.members {
                        println!("    {}", marker_title(&locations[i]));
                    }
                } else {
                    for &i in &cluster.members {
                        let location = &locations[i];
                        println!("{} at {}", marker_title(location), location.position());
                    }
                }
            }

            println!("\n{} cluster(s) at zoom {zoom}", clusters.len());
        }
        Commands::Visible {
            input,
            zoom,
            south,
            west,
            north,
            east,
        } => {
            let mut session = load_session(&input).await?;
            session.on_view_changed(&StaticMap {
                zoom,
                bounds: MapBounds::from_edges(south, west, north, east),
            });

            println!("Mode: {}", session.disclosure_mode());
            let selected = session.selected_locations();
            if selected.is_empty() {
                println!("No popups open.");
                return Ok(());
            }

            for location in &selected {
                println!(
                    "{:<12} {} at {}",
                    location.key.to_string(),
                    marker_title(location),
                    location.position()
                );
            }
            println!("\n{} popup(s) open", selected.len());
        }
        Commands::Reverse { lat, lng, provider } => {
            let point = LatLng::new(lat, lng);
            if !point.is_within_range() {
                return Err(format!("Coordinate {point} is outside WGS84 ranges").into());
            }

            let resolver = build_resolver(provider)?;
            log::info!("Reverse geocoding {point} via {}", resolver.provider());

            let resolution = resolve_or_coordinates(&*resolver, point).await;
            println!("Address: {}", resolution.formatted_address);
            println!("City:    {}", resolution.city.as_deref().unwrap_or("-"));
            println!("Country: {}", resolution.country.as_deref().unwrap_or("-"));
            println!("Street:  {}", resolution.street.as_deref().unwrap_or("-"));
        }
    }

    Ok(())
}

async fn load_session(input: &InputArgs) -> Result<ServicesMapSession, Box<dyn std::error::Error>> {
    let mut session = ServicesMapSession::new(MapConfig::load()?);
    session.provider_loaded();

    if let Some(path) = &input.file {
        let ticket = session.begin_fetch();
        let contents = std::fs::read_to_string(path)?;
        let page = serde_json::from_str::<serde_json::Value>(&contents)
            .map_err(services_map::MapError::from)
            .and_then(parse_services_json);
        session.complete_fetch(ticket, page)?;
    } else if let Some(api_url) = &input.api_url {
        let source = HttpServiceSource::new(reqwest::Client::new(), api_url.as_str());
        session.fetch_with(&source, &input.filters()).await?;
    } else {
        return Err("Either --file or --api-url (SERVICES_API_URL) is required".into());
    }

    Ok(session)
}

fn build_resolver(
    provider: Option<ProviderArg>,
) -> Result<Box<dyn AddressResolver>, Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let google = GoogleGeocoder::from_env(client.clone());

    Ok(match (provider, google) {
        (Some(ProviderArg::Google) | None, Some(google)) => Box::new(google),
        (Some(ProviderArg::Google), None) => {
            return Err("GOOGLE_MAPS_API_KEY is required for the Google provider".into());
        }
        (Some(ProviderArg::BigDataCloud), _) | (None, None) => {
            Box::new(BigDataCloudGeocoder::new(client))
        }
    })
}
