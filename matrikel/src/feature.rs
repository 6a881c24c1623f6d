//! Construction de la couche GeoJSON des parcelles

use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde::Serialize;

use crate::ResolvedParcel;

/// Couleur RGBA, sérialisée au format CSS `rgba(r,g,b,a)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl std::fmt::Display for Rgba {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

impl Serialize for Rgba {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Contour
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f32,
}

/// Remplissage
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fill {
    pub color: Rgba,
}

/// Style unique appliqué à toutes les parcelles
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayerStyle {
    pub stroke: Stroke,
    pub fill: Fill,
}

impl Default for LayerStyle {
    /// Contour rouge plein, remplissage jaune semi-transparent
    fn default() -> Self {
        Self {
            stroke: Stroke {
                color: Rgba::new(255, 0, 0, 1.0),
                width: 1.5,
            },
            fill: Fill {
                color: Rgba::new(255, 255, 0, 0.5),
            },
        }
    }
}

/// Couche de superposition remise au moteur de rendu
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayLayer {
    pub style: LayerStyle,
    pub features: FeatureCollection,
}

impl OverlayLayer {
    /// Couche stylée par défaut pour les parcelles données
    pub fn from_parcels(parcels: &[ResolvedParcel]) -> Self {
        Self {
            style: LayerStyle::default(),
            features: build_feature_collection(parcels),
        }
    }

    pub fn len(&self) -> usize {
        self.features.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.features.is_empty()
    }
}

/// Une feature par parcelle, géométrie seule, ordre d'entrée conservé
pub fn build_feature_collection(parcels: &[ResolvedParcel]) -> FeatureCollection {
    let features = parcels
        .iter()
        .map(|parcel| Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::from(&parcel.geometry))),
            id: None,
            properties: None,
            foreign_members: None,
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
