//! Emprise englobante des parcelles résolues

use geo::{BoundingRect, Coord, MultiPoint, MultiPolygon, Point, Rect};
use serde::Serialize;

use crate::{MatrikelError, ResolvedParcel};

/// Rectangle englobant `[min_x, min_y, max_x, max_y]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    pub fn as_array(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }

    pub fn center(&self) -> Coord {
        Coord {
            x: (self.min_x + self.max_x) / 2.0,
            y: (self.min_y + self.max_y) / 2.0,
        }
    }
}

impl From<Rect> for Extent {
    fn from(rect: Rect) -> Self {
        Self {
            min_x: rect.min().x,
            min_y: rect.min().y,
            max_x: rect.max().x,
            max_y: rect.max().y,
        }
    }
}

/// Accumulateur de coordonnées pour le cadrage final.
///
/// Seul l'anneau extérieur du premier polygone de chaque parcelle est retenu,
/// dans l'ordre de résolution. Les doublons sont conservés.
#[derive(Debug, Default, Clone)]
pub struct ExtentAccumulator {
    coords: Vec<Coord>,
}

impl ExtentAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ajoute les sommets de l'anneau extérieur du premier polygone
    pub fn push_parcel(&mut self, geometry: &MultiPolygon) {
        if let Some(first) = geometry.0.first() {
            self.coords.extend(first.exterior().coords().copied());
        }
    }

    pub fn coords(&self) -> &[Coord] {
        &self.coords
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Calcule le rectangle englobant ; échoue sans coordonnée
    pub fn extent(&self) -> Result<Extent, MatrikelError> {
        MultiPoint::new(self.coords.iter().copied().map(Point::from).collect())
            .bounding_rect()
            .map(Extent::from)
            .ok_or(MatrikelError::EmptyExtent)
    }
}

/// Emprise d'une liste de parcelles résolues, dans l'ordre donné
pub fn extent_of(parcels: &[ResolvedParcel]) -> Result<Extent, MatrikelError> {
    let mut acc = ExtentAccumulator::new();
    for parcel in parcels {
        acc.push_parcel(&parcel.geometry);
    }
    acc.extent()
}
