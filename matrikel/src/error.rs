//! Types d'erreurs pour le crate matrikel

use thiserror::Error;

/// Erreurs pouvant survenir lors de la résolution d'une matrikel
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrikelError {
    /// Identifiant mal formé dans la liste (séparateur manquant, code vide)
    #[error("Malformed parcel identifier '{token}': {reason}")]
    MalformedIdentifier { token: String, reason: String },

    /// Échec de la requête distante (statut non-2xx, réseau, timeout)
    #[error("Remote query failed for {identifier}: {reason}")]
    RemoteQuery {
        identifier: String,
        status: Option<u16>,
        reason: String,
    },

    /// Réponse illisible ou géométrie absente
    #[error("Invalid parcel data for {identifier}: {reason}")]
    ParcelData { identifier: String, reason: String },

    /// Aucune coordonnée pour calculer une emprise
    #[error("Cannot compute an extent from zero coordinates")]
    EmptyExtent,

    /// Système de coordonnées non reconnu
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),

    /// Transformation produisant des valeurs non finies
    #[error("Reprojection failed: {reason}")]
    Reprojection { reason: String },
}

impl MatrikelError {
    /// Crée une erreur d'identifiant mal formé
    pub fn malformed(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedIdentifier {
            token: token.into(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur de requête distante
    pub fn remote(identifier: impl ToString, status: Option<u16>, reason: impl Into<String>) -> Self {
        Self::RemoteQuery {
            identifier: identifier.to_string(),
            status,
            reason: reason.into(),
        }
    }

    /// Crée une erreur de données de parcelle
    pub fn parcel_data(identifier: impl ToString, reason: impl Into<String>) -> Self {
        Self::ParcelData {
            identifier: identifier.to_string(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur de reprojection
    pub fn reprojection(reason: impl Into<String>) -> Self {
        Self::Reprojection {
            reason: reason.into(),
        }
    }

    /// Nom court de la catégorie, utilisé dans les logs et le rapport
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedIdentifier { .. } => "malformed_identifier",
            Self::RemoteQuery { .. } => "remote_query",
            Self::ParcelData { .. } => "parcel_data",
            Self::EmptyExtent => "empty_extent",
            Self::UnsupportedCrs(_) => "unsupported_crs",
            Self::Reprojection { .. } => "reprojection",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = MatrikelError::remote("2000174:1695i", Some(500), "HTTP 500");
        assert_eq!(
            err.to_string(),
            "Remote query failed for 2000174:1695i: HTTP 500"
        );
        assert_eq!(err.kind(), "remote_query");
    }
}
