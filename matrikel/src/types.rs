//! Types de données pour le crate matrikel

use geo::MultiPolygon;

use crate::ParcelIdentifier;

/// Une parcelle résolue, géométrie déjà reprojetée dans le système d'affichage
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParcel {
    /// Identifiant à l'origine de la requête
    pub identifier: ParcelIdentifier,

    /// Géométrie (lon/lat)
    pub geometry: MultiPolygon,
}

impl ResolvedParcel {
    pub fn new(identifier: ParcelIdentifier, geometry: MultiPolygon) -> Self {
        Self {
            identifier,
            geometry,
        }
    }

    /// Nombre total de sommets, tous anneaux confondus
    pub fn vertex_count(&self) -> usize {
        self.geometry
            .iter()
            .map(|p| {
                p.exterior().0.len() + p.interiors().iter().map(|r| r.0.len()).sum::<usize>()
            })
            .sum()
    }
}
