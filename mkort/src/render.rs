//! Interface avec le moteur de rendu cartographique
//!
//! Le moteur reçoit une emprise à cadrer et une couche de parcelles.
//! `MapDocument` en est l'implémentation fournie : il sérialise la vue, la
//! couche de fond et les superpositions en JSON pour un client web.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use geo::Coord;
use matrikel::{Crs, Extent, OverlayLayer, Reprojector};
use serde::Serialize;

use crate::config::{MapConfig, WmsLayerConfig};

/// Collaborateur de rendu
pub trait MapRenderer {
    /// Cadre la caméra sur l'emprise, avec une animation de la durée donnée
    fn fit(&mut self, extent: Extent, duration: Duration) -> Result<()>;

    /// Ajoute une couche de superposition
    fn add_layer(&mut self, layer: OverlayLayer) -> Result<()>;
}

/// Demande de cadrage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitRequest {
    /// `[min_lon, min_lat, max_lon, max_lat]`
    pub extent: [f64; 4],
    pub duration_ms: u64,
}

/// État initial de la vue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    /// Projection de la vue côté client
    pub projection: String,
    /// Centre en lon/lat
    pub center: [f64; 2],
    /// Centre dans la projection de la vue
    pub center_projected: [f64; 2],
    pub zoom: u8,
    pub fit: Option<FitRequest>,
}

/// Document de carte prêt à être servi au client web
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapDocument {
    pub view: ViewState,
    pub base_layer: WmsLayerConfig,
    pub overlays: Vec<OverlayLayer>,
}

impl MapDocument {
    /// Vue initiale en EPSG:25832, centre donné en lon/lat
    pub fn new(config: &MapConfig) -> Result<Self> {
        Self::with_projection(config, Crs::etrs89_utm32())
    }

    pub fn with_projection(config: &MapConfig, projection: Crs) -> Result<Self> {
        let [lon, lat] = config.center;
        let projected = Reprojector::new(Crs::Geographic, projection)
            .transform_coord(Coord { x: lon, y: lat })
            .context("Failed to project the map center")?;

        Ok(Self {
            view: ViewState {
                projection: projection.to_string(),
                center: config.center,
                center_projected: [projected.x, projected.y],
                zoom: config.zoom,
                fit: None,
            },
            base_layer: config.base_layer.clone(),
            overlays: Vec::new(),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize map document")
    }

    /// Sauvegarde le document en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)
            .context(format!("Failed to write map document: {}", path.display()))
    }
}

impl MapRenderer for MapDocument {
    fn fit(&mut self, extent: Extent, duration: Duration) -> Result<()> {
        self.view.fit = Some(FitRequest {
            extent: extent.as_array(),
            duration_ms: duration.as_millis() as u64,
        });
        Ok(())
    }

    fn add_layer(&mut self, layer: OverlayLayer) -> Result<()> {
        self.overlays.push(layer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document() {
        let doc = MapDocument::new(&MapConfig::default()).unwrap();
        assert_eq!(doc.view.projection, "EPSG:25832");
        assert_eq!(doc.view.zoom, 10);
        assert!(doc.view.fit.is_none());
        assert!(doc.overlays.is_empty());

        // København en EPSG:25832
        let [x, y] = doc.view.center_projected;
        assert!((x - 723517.66).abs() < 1.0, "x={}", x);
        assert!((y - 6174010.50).abs() < 1.0, "y={}", y);
    }

    #[test]
    fn test_fit_and_layer() {
        let mut doc = MapDocument::new(&MapConfig::default()).unwrap();
        let extent = Extent {
            min_x: 12.0,
            min_y: 55.0,
            max_x: 12.5,
            max_y: 55.5,
        };
        doc.fit(extent, Duration::from_millis(2500)).unwrap();
        doc.add_layer(OverlayLayer::from_parcels(&[])).unwrap();

        let json: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(json["view"]["fit"]["extent"], serde_json::json!([12.0, 55.0, 12.5, 55.5]));
        assert_eq!(json["view"]["fit"]["duration_ms"], 2500);
        assert_eq!(json["overlays"][0]["features"]["type"], "FeatureCollection");
        assert_eq!(json["base_layer"]["layers"][0], "Kommunikation_basis");
    }
}
