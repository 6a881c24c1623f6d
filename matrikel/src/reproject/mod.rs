//! Reprojection légère en Rust pur (sans dépendances externes)
//!
//! Supporte les projections utilisées par les matrikler :
//! - ETRS89 / UTM 32N (EPSG:25832) et les autres zones UTM ETRS89/WGS84
//! - WGS84 géographique (EPSG:4326), en degrés
//!
//! Les deux ellipsoïdes sont traités sans décalage de datum (écart < 1m).

mod crs;
mod ellipsoid;
mod utm;

pub use crs::Crs;
pub use ellipsoid::Ellipsoid;
pub use utm::UtmZone;

use geo::{Coord, Geometry, MapCoords, MultiPolygon};

use crate::MatrikelError;

/// Point en coordonnées géographiques (radians)
#[derive(Debug, Clone, Copy)]
pub struct Geographic {
    /// Longitude en radians
    pub lon: f64,
    /// Latitude en radians
    pub lat: f64,
}

impl Geographic {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Convertit en degrés
    pub fn to_degrees(self) -> (f64, f64) {
        (self.lon.to_degrees(), self.lat.to_degrees())
    }

    /// Crée depuis des degrés
    pub fn from_degrees(lon_deg: f64, lat_deg: f64) -> Self {
        Self {
            lon: lon_deg.to_radians(),
            lat: lat_deg.to_radians(),
        }
    }
}

/// Reprojection entre deux systèmes de coordonnées explicites
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reprojector {
    source: Crs,
    target: Crs,
}

impl Reprojector {
    /// Crée un nouveau reprojector
    pub fn new(source: Crs, target: Crs) -> Self {
        Self { source, target }
    }

    /// EPSG:25832 → EPSG:4326, le cas des géométries matrikel
    pub fn utm32_to_lonlat() -> Self {
        Self::new(Crs::etrs89_utm32(), Crs::Geographic)
    }

    /// Reprojector dans le sens opposé
    pub fn inverse(&self) -> Self {
        Self::new(self.target, self.source)
    }

    /// Pas de reprojection (source == cible)
    pub fn is_identity(&self) -> bool {
        self.source == self.target
    }

    /// Transforme une coordonnée de la source vers la cible
    pub fn transform_coord(&self, coord: Coord) -> Result<Coord, MatrikelError> {
        if self.is_identity() {
            return Ok(coord);
        }

        // Étape 1: Source → Géographique
        let geo = match self.source {
            Crs::Geographic => Geographic::from_degrees(coord.x, coord.y),
            Crs::Utm(zone) => zone.unproject(coord.x, coord.y),
        };

        // Étape 2: Géographique → Cible
        let (x, y) = match self.target {
            Crs::Geographic => geo.to_degrees(),
            Crs::Utm(zone) => zone.project(geo),
        };

        if !x.is_finite() || !y.is_finite() {
            return Err(MatrikelError::reprojection(format!(
                "({}, {}) has no finite image from {} to {}",
                coord.x, coord.y, self.source, self.target
            )));
        }

        Ok(Coord { x, y })
    }

    /// Transforme une multi-polygone, en conservant anneaux et ordre des sommets
    pub fn transform_multi_polygon(
        &self,
        mp: &MultiPolygon,
    ) -> Result<MultiPolygon, MatrikelError> {
        mp.try_map_coords(|c| self.transform_coord(c))
    }

    /// Transforme une géométrie
    pub fn transform_geometry(&self, geom: &Geometry) -> Result<Geometry, MatrikelError> {
        match geom {
            Geometry::Point(_)
            | Geometry::LineString(_)
            | Geometry::Polygon(_)
            | Geometry::MultiPoint(_)
            | Geometry::MultiLineString(_)
            | Geometry::MultiPolygon(_) => geom.try_map_coords(|c| self.transform_coord(c)),
            _ => Err(MatrikelError::reprojection("unsupported geometry type")),
        }
    }
}
