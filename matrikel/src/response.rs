//! Extraction de la géométrie depuis une réponse du service de recherche
//!
//! La réponse est un tableau JSON de correspondances. Seule la première est
//! utilisée (pas de désambiguïsation) ; un tableau vide signifie "aucune
//! correspondance" et n'est pas une erreur.

use geo::{Coord, LineString, MultiPolygon, Polygon};
use geojson::{PolygonType, Position};
use serde::Deserialize;
use serde_json::Value;

use crate::{MatrikelError, ParcelIdentifier};

/// Champ `geometri` d'une correspondance
#[derive(Debug, Deserialize)]
struct Geometri {
    #[serde(rename = "type")]
    kind: Option<String>,
    coordinates: Value,
}

/// Parse le corps d'une réponse et retourne la multi-polygone de la première
/// correspondance, dans le système de coordonnées source.
pub fn parse_search_response(
    body: &str,
    identifier: &ParcelIdentifier,
) -> Result<Option<MultiPolygon>, MatrikelError> {
    let matches: Vec<Value> = serde_json::from_str(body)
        .map_err(|e| MatrikelError::parcel_data(identifier, format!("invalid JSON: {}", e)))?;

    let Some(first) = matches.into_iter().next() else {
        return Ok(None);
    };

    let geometri = first
        .get("geometri")
        .filter(|g| !g.is_null())
        .ok_or_else(|| MatrikelError::parcel_data(identifier, "missing 'geometri' field"))?;

    let geometri: Geometri = serde_json::from_value(geometri.clone()).map_err(|e| {
        MatrikelError::parcel_data(identifier, format!("invalid 'geometri' field: {}", e))
    })?;

    let polygons: Vec<PolygonType> = match geometri.kind.as_deref() {
        None | Some("MultiPolygon") => serde_json::from_value(geometri.coordinates),
        Some("Polygon") => serde_json::from_value(geometri.coordinates).map(|p| vec![p]),
        Some(other) => {
            return Err(MatrikelError::parcel_data(
                identifier,
                format!("unsupported geometry type '{}'", other),
            ))
        }
    }
    .map_err(|e| {
        MatrikelError::parcel_data(identifier, format!("invalid coordinates: {}", e))
    })?;

    if polygons.is_empty() {
        return Err(MatrikelError::parcel_data(identifier, "geometry has no polygon"));
    }

    let polygons = polygons
        .iter()
        .map(|rings| build_polygon(rings, identifier))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        identifier = %identifier,
        polygons = polygons.len(),
        "Parcel geometry extracted"
    );

    Ok(Some(MultiPolygon::new(polygons)))
}

/// Construit un polygone : premier anneau extérieur, les suivants sont des trous
fn build_polygon(
    rings: &PolygonType,
    identifier: &ParcelIdentifier,
) -> Result<Polygon, MatrikelError> {
    let mut rings = rings.iter().map(|ring| build_ring(ring, identifier));

    let exterior = rings
        .next()
        .ok_or_else(|| MatrikelError::parcel_data(identifier, "polygon has no ring"))??;
    let interiors = rings.collect::<Result<Vec<_>, _>>()?;

    Ok(Polygon::new(exterior, interiors))
}

fn build_ring(
    positions: &[Position],
    identifier: &ParcelIdentifier,
) -> Result<LineString, MatrikelError> {
    let coords = positions
        .iter()
        .map(|pos| match pos.as_slice() {
            // Une éventuelle altitude est ignorée
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => Err(MatrikelError::parcel_data(
                identifier,
                format!("position with {} ordinate(s)", pos.len()),
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(LineString::new(coords))
}
