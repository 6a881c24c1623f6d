//! Définitions des ellipsoïdes

/// Ellipsoïde de référence, défini par son demi-grand axe et son aplatissement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Demi-grand axe (rayon équatorial) en mètres
    pub a: f64,
    /// Aplatissement
    pub f: f64,
}

impl Ellipsoid {
    /// GRS80, utilisé par ETRS89 (EPSG:258xx)
    pub const GRS80: Self = Self {
        a: 6378137.0,
        f: 1.0 / 298.257222101,
    };

    /// WGS84 (EPSG:326xx / 327xx)
    /// Note: Quasi identique à GRS80, différence < 0.1mm sur le demi-petit axe
    pub const WGS84: Self = Self {
        a: 6378137.0,
        f: 1.0 / 298.257223563,
    };

    /// Première excentricité au carré
    pub fn e2(&self) -> f64 {
        2.0 * self.f - self.f * self.f
    }

    /// Deuxième excentricité au carré
    pub fn ep2(&self) -> f64 {
        let e2 = self.e2();
        e2 / (1.0 - e2)
    }

    /// Nom du paramètre `+ellps` proj4
    pub fn name(&self) -> &'static str {
        if *self == Self::GRS80 {
            "GRS80"
        } else if *self == Self::WGS84 {
            "WGS84"
        } else {
            "custom"
        }
    }

    /// Ellipsoïde depuis un nom `+ellps`
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "GRS80" => Some(Self::GRS80),
            "WGS84" => Some(Self::WGS84),
            _ => None,
        }
    }
}
