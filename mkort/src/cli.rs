//! Définition et implémentation des commandes CLI
//!
//! - `render` (défaut) : liste de matrikler → document de carte JSON
//! - `project` : conversion d'une coordonnée EPSG:25832 ↔ lon/lat

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use geo::Coord;
use matrikel::Reprojector;
use tracing::info;

use mkort::config::{parse_center, parse_zoom, MapConfig};
use mkort::{run_overlay, GsearchClient, MapDocument, OverlayOptions, ParcelResolver};

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve parcels and write the map document
    Render(RenderArgs),

    /// Convert one coordinate between EPSG:25832 and lon/lat (EPSG:4326)
    Project {
        /// Easting (or longitude with --inverse)
        #[arg(long, allow_negative_numbers = true)]
        x: f64,

        /// Northing (or latitude with --inverse)
        #[arg(long, allow_negative_numbers = true)]
        y: f64,

        /// Convert lon/lat to EPSG:25832
        #[arg(long)]
        inverse: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct RenderArgs {
    /// Parcel list "ejerlavkode:matrikelnummer;..." (défaut : env MKORT_MATR)
    #[arg(long)]
    pub matr: Option<String>,

    /// Initial center "lon,lat" (défaut : env MKORT_CENTER / 12.5536,55.6604)
    #[arg(long, value_parser = parse_center, allow_hyphen_values = true)]
    pub center: Option<[f64; 2]>,

    /// Initial zoom level (défaut : env MKORT_ZOOM / 10)
    #[arg(long, value_parser = parse_zoom)]
    pub zoom: Option<u8>,

    /// JSON config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output file for the map document (défaut : stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the resolution report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Dataforsyningen token (défaut : env DATAFORSYNINGEN_TOKEN)
    #[arg(long)]
    pub token: Option<String>,

    /// Search service endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Maximum number of concurrent requests
    #[arg(long, alias = "jobs")]
    pub concurrency: Option<usize>,
}

impl RenderArgs {
    /// Configuration finale : défauts, fichier, environnement puis arguments
    pub fn resolve_config(&self) -> Result<MapConfig> {
        let mut config = match &self.config {
            Some(path) => MapConfig::load(path)?,
            None => MapConfig::default(),
        };
        config.apply_env().context("Invalid environment configuration")?;

        if let Some(matr) = &self.matr {
            config.parcels = matr.clone();
        }
        if let Some(center) = self.center {
            config.center = center;
        }
        if let Some(zoom) = self.zoom {
            config.zoom = zoom;
        }
        if let Some(token) = self.token.as_ref().filter(|t| !t.is_empty()) {
            config.token = Some(token.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

/// Exécute la commande render
pub async fn cmd_render(args: &RenderArgs) -> Result<()> {
    let config = args.resolve_config()?;
    info!(
        zoom = config.zoom,
        center = ?config.center,
        endpoint = %config.endpoint,
        "Render"
    );

    let client = GsearchClient::from_config(&config)?;
    let resolver = ParcelResolver::new(client, Reprojector::utm32_to_lonlat());
    let mut document = MapDocument::new(&config)?;

    let outcome = run_overlay(
        &config.parcels,
        &resolver,
        &mut document,
        OverlayOptions::from(&config),
    )
    .await?;

    match &args.output {
        Some(path) => {
            document.save_to_file(path)?;
            info!(output = %path.display(), parcels = outcome.parcels.len(), "Map document written");
            outcome.report.display();
        }
        None => println!("{}", document.to_json()?),
    }

    if let Some(path) = &args.report {
        outcome
            .report
            .save_to_file(path)
            .context(format!("Failed to write report: {}", path.display()))?;
        info!(report = %path.display(), "Report saved");
    }

    Ok(())
}

/// Exécute la commande project
pub fn cmd_project(x: f64, y: f64, inverse: bool) -> Result<()> {
    let reprojector = if inverse {
        Reprojector::utm32_to_lonlat().inverse()
    } else {
        Reprojector::utm32_to_lonlat()
    };

    let c = reprojector
        .transform_coord(Coord { x, y })
        .context("Coordinate conversion failed")?;

    if inverse {
        println!("{:.3} {:.3}", c.x, c.y);
    } else {
        println!("{:.8} {:.8}", c.x, c.y);
    }
    Ok(())
}
