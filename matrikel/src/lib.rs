//! # matrikel
//!
//! Briques de résolution des matrikler (parcelles cadastrales danoises),
//! sans I/O réseau.
//!
//! ## Features
//!
//! - Parsing des listes d'identifiants `ejerlavkode:matrikelnummer;...`
//! - Extraction de la géométrie des réponses du service de recherche
//! - Reprojection UTM ↔ lon/lat en Rust pur (EPSG:25832 → EPSG:4326)
//! - Emprise englobante et couche GeoJSON stylée
//!
//! ## Usage
//!
//! ```rust,ignore
//! use matrikel::{parse_identifier_list, parse_search_response, Reprojector};
//!
//! let list = parse_identifier_list("2000174:1695i;2000174:1441b");
//! let reproj = Reprojector::utm32_to_lonlat();
//!
//! for id in &list.identifiers {
//!     if let Some(mp) = parse_search_response(&body, id)? {
//!         let lonlat = reproj.transform_multi_polygon(&mp)?;
//!     }
//! }
//! ```

pub mod error;
pub mod extent;
pub mod feature;
pub mod identifier;
pub mod reproject;
pub mod response;
pub mod types;

pub use error::MatrikelError;
pub use extent::{extent_of, Extent, ExtentAccumulator};
pub use feature::{build_feature_collection, LayerStyle, OverlayLayer};
pub use identifier::{join_identifiers, parse_identifier_list, IdentifierList, ParcelIdentifier};
pub use reproject::{Crs, Reprojector};
pub use response::parse_search_response;
pub use types::ResolvedParcel;

/// Résout une réponse brute en parcelle reprojetée.
///
/// Retourne `Ok(None)` quand le service n'a trouvé aucune correspondance.
pub fn resolve_response(
    body: &str,
    identifier: &ParcelIdentifier,
    reprojector: &Reprojector,
) -> Result<Option<ResolvedParcel>, MatrikelError> {
    let Some(source_geometry) = parse_search_response(body, identifier)? else {
        return Ok(None);
    };

    let geometry = reprojector
        .transform_multi_polygon(&source_geometry)
        .map_err(|e| MatrikelError::parcel_data(identifier, e.to_string()))?;

    Ok(Some(ResolvedParcel::new(identifier.clone(), geometry)))
}
