//! # mkort
//!
//! Superposition de matrikler danois sur une carte.
//!
//! ## Features
//!
//! - Résolution des parcelles via le service gsearch de Dataforsyningen
//! - Reprojection EPSG:25832 → lon/lat
//! - Cadrage de la caméra sur l'emprise des parcelles
//! - Document de carte JSON (vue, fond WMS, couche de parcelles)
//!
//! ## Usage CLI
//!
//! ```bash
//! # Résoudre deux parcelles et écrire le document de carte
//! mkort --matr "2000174:1695i;2000174:1441b" --output carte.json
//!
//! # Convertir une coordonnée EPSG:25832 en lon/lat
//! mkort project --x 724352 --y 6175804
//! ```

pub mod config;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod resolver;

pub use config::{ConfigError, MapConfig, WmsLayerConfig};
pub use pipeline::{run_overlay, OverlayOptions, OverlayOutcome};
pub use render::{MapDocument, MapRenderer};
pub use report::{ResolutionReport, ResolutionStatus};
pub use resolver::{GsearchClient, ParcelResolver, ParcelSource};
