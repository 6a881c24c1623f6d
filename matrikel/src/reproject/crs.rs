//! Définitions explicites des systèmes de coordonnées
//!
//! Pas de registre global : chaque `Reprojector` reçoit ses deux définitions.

use std::fmt;

use super::ellipsoid::Ellipsoid;
use super::utm::UtmZone;
use crate::MatrikelError;

/// Système de coordonnées supporté
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Crs {
    /// Longitude/latitude en degrés (EPSG:4326)
    Geographic,
    /// Projection UTM métrique
    Utm(UtmZone),
}

impl Crs {
    /// ETRS89 / UTM zone 32N (EPSG:25832), système de la géométrie matrikel
    pub fn etrs89_utm32() -> Self {
        Self::utm(32, false, Ellipsoid::GRS80)
    }

    /// Construit une zone UTM
    pub fn utm(zone: u8, south: bool, ellipsoid: Ellipsoid) -> Self {
        Self::Utm(UtmZone {
            zone,
            south,
            ellipsoid,
        })
    }

    /// Crée depuis un code EPSG
    pub fn from_epsg(epsg: u32) -> Result<Self, MatrikelError> {
        match epsg {
            4326 => Ok(Self::Geographic),
            25828..=25838 => Ok(Self::utm((epsg - 25800) as u8, false, Ellipsoid::GRS80)),
            32601..=32660 => Ok(Self::utm((epsg - 32600) as u8, false, Ellipsoid::WGS84)),
            32701..=32760 => Ok(Self::utm((epsg - 32700) as u8, true, Ellipsoid::WGS84)),
            _ => Err(MatrikelError::UnsupportedCrs(format!("EPSG:{}", epsg))),
        }
    }

    /// Parse une définition proj4, ex: `+proj=utm +zone=32 +ellps=GRS80 +units=m +no_defs`
    pub fn from_proj4(definition: &str) -> Result<Self, MatrikelError> {
        let unsupported = || MatrikelError::UnsupportedCrs(definition.to_string());

        let mut proj = None;
        let mut zone = None;
        let mut south = false;
        let mut ellipsoid = Ellipsoid::WGS84;

        for param in definition.split_whitespace() {
            let param = param.trim_start_matches('+');
            let (key, value) = match param.split_once('=') {
                Some((k, v)) => (k, Some(v)),
                None => (param, None),
            };
            match (key, value) {
                ("proj", Some(v)) => proj = Some(v),
                ("zone", Some(v)) => zone = Some(v.parse::<u8>().map_err(|_| unsupported())?),
                ("south", None) => south = true,
                ("ellps", Some(v)) | ("datum", Some(v)) => {
                    ellipsoid = match v.to_ascii_uppercase().as_str() {
                        "ETRS89" => Ellipsoid::GRS80,
                        _ => Ellipsoid::from_name(v).ok_or_else(unsupported)?,
                    };
                }
                ("units", Some(v)) if v != "m" => return Err(unsupported()),
                // Paramètres sans effet sur la transformation
                _ => {}
            }
        }

        match proj {
            Some("longlat") | Some("latlong") => Ok(Self::Geographic),
            Some("utm") => match zone {
                Some(z @ 1..=60) => Ok(Self::utm(z, south, ellipsoid)),
                _ => Err(unsupported()),
            },
            _ => Err(unsupported()),
        }
    }

    /// Code EPSG équivalent, si connu
    pub fn epsg(&self) -> Option<u32> {
        match self {
            Self::Geographic => Some(4326),
            Self::Utm(z) if z.ellipsoid == Ellipsoid::GRS80 && !z.south => {
                Some(25800 + z.zone as u32)
            }
            Self::Utm(z) if z.ellipsoid == Ellipsoid::WGS84 => {
                Some((if z.south { 32700 } else { 32600 }) + z.zone as u32)
            }
            Self::Utm(_) => None,
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.epsg() {
            Some(code) => write!(f, "EPSG:{}", code),
            None => match self {
                Self::Utm(z) => write!(
                    f,
                    "+proj=utm +zone={}{} +ellps={}",
                    z.zone,
                    if z.south { " +south" } else { "" },
                    z.ellipsoid.name()
                ),
                Self::Geographic => write!(f, "+proj=longlat"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_epsg() {
        assert_eq!(Crs::from_epsg(25832).unwrap(), Crs::etrs89_utm32());
        assert_eq!(Crs::from_epsg(4326).unwrap(), Crs::Geographic);
        assert!(matches!(
            Crs::from_epsg(32740).unwrap(),
            Crs::Utm(UtmZone { zone: 40, south: true, .. })
        ));
        assert!(Crs::from_epsg(2154).is_err());
    }

    #[test]
    fn test_from_proj4() {
        let crs = Crs::from_proj4("+proj=utm +zone=32 +ellps=GRS80 +units=m +no_defs").unwrap();
        assert_eq!(crs, Crs::etrs89_utm32());
        assert_eq!(crs.to_string(), "EPSG:25832");

        let crs = Crs::from_proj4("+proj=longlat +datum=WGS84 +no_defs").unwrap();
        assert_eq!(crs, Crs::Geographic);
    }

    #[test]
    fn test_from_proj4_rejects() {
        assert!(Crs::from_proj4("+proj=lcc +lat_1=49").is_err());
        assert!(Crs::from_proj4("+proj=utm +ellps=GRS80").is_err());
        assert!(Crs::from_proj4("+proj=utm +zone=32 +units=ft").is_err());
        assert!(Crs::from_proj4("+proj=utm +zone=32 +ellps=intl").is_err());
    }
}
