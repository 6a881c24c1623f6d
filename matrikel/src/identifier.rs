//! Parsing de la liste d'identifiants `ejerlavkode:matrikelnummer;...`

use std::fmt;

use crate::MatrikelError;

/// Séparateur entre deux identifiants
pub const LIST_SEPARATOR: char = ';';

/// Séparateur entre le code d'ejerlav et le numéro de matrikel
pub const CODE_SEPARATOR: char = ':';

/// Identifiant d'une parcelle cadastrale
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParcelIdentifier {
    region_code: String,
    parcel_code: String,
}

impl ParcelIdentifier {
    /// Crée un identifiant, les deux codes doivent être non vides
    pub fn new(
        region_code: impl Into<String>,
        parcel_code: impl Into<String>,
    ) -> Result<Self, MatrikelError> {
        let region_code = region_code.into();
        let parcel_code = parcel_code.into();
        let token = format!("{}{}{}", region_code, CODE_SEPARATOR, parcel_code);
        validate_codes(&token, &region_code, &parcel_code)?;
        Ok(Self {
            region_code,
            parcel_code,
        })
    }

    /// Parse un token `regionCode:parcelCode`
    pub fn parse(token: &str) -> Result<Self, MatrikelError> {
        let mut parts = token.split(CODE_SEPARATOR);
        let (region, parcel) = match (parts.next(), parts.next(), parts.next()) {
            (Some(region), Some(parcel), None) => (region.trim(), parcel.trim()),
            (_, None, _) => {
                return Err(MatrikelError::malformed(
                    token,
                    format!("missing '{}' separator", CODE_SEPARATOR),
                ))
            }
            _ => {
                return Err(MatrikelError::malformed(
                    token,
                    format!("more than one '{}' separator", CODE_SEPARATOR),
                ))
            }
        };

        validate_codes(token, region, parcel)?;

        Ok(Self {
            region_code: region.to_string(),
            parcel_code: parcel.to_string(),
        })
    }

    /// Code d'ejerlav (zone cadastrale)
    pub fn region_code(&self) -> &str {
        &self.region_code
    }

    /// Numéro de matrikel
    pub fn parcel_code(&self) -> &str {
        &self.parcel_code
    }

    /// Filtre d'égalité exacte sur l'ejerlav pour le service de recherche
    pub fn region_filter(&self) -> String {
        format!("ejerlavskode='{}'", self.region_code)
    }
}

/// L'ejerlavskode est numérique : elle est interpolée telle quelle dans le
/// filtre d'égalité envoyé au service de recherche.
fn validate_codes(token: &str, region: &str, parcel: &str) -> Result<(), MatrikelError> {
    if region.is_empty() {
        return Err(MatrikelError::malformed(token, "empty region code"));
    }
    if !region.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MatrikelError::malformed(token, "region code must be numeric"));
    }
    if parcel.is_empty() {
        return Err(MatrikelError::malformed(token, "empty parcel code"));
    }
    Ok(())
}

impl fmt::Display for ParcelIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.region_code, CODE_SEPARATOR, self.parcel_code)
    }
}

impl std::str::FromStr for ParcelIdentifier {
    type Err = MatrikelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Résultat du parsing d'une liste d'identifiants
#[derive(Debug, Default)]
pub struct IdentifierList {
    /// Identifiants valides, dans l'ordre d'apparition
    pub identifiers: Vec<ParcelIdentifier>,

    /// Tokens rejetés (non fatals)
    pub errors: Vec<MatrikelError>,
}

impl IdentifierList {
    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }
}

/// Parse une liste `a:b;c:d`.
///
/// Une entrée vide signifie qu'aucune superposition n'est demandée. Les
/// segments vides (ex: `;` final) sont ignorés, les tokens mal formés sont
/// collectés dans `errors` sans interrompre le parsing.
pub fn parse_identifier_list(input: &str) -> IdentifierList {
    let mut list = IdentifierList::default();

    for token in input.split(LIST_SEPARATOR) {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        match ParcelIdentifier::parse(token) {
            Ok(id) => list.identifiers.push(id),
            Err(e) => {
                tracing::warn!(token = token, error = %e, "Skipping malformed identifier");
                list.errors.push(e);
            }
        }
    }

    list
}

/// Reconstruit la liste textuelle depuis des identifiants
pub fn join_identifiers(identifiers: &[ParcelIdentifier]) -> String {
    identifiers
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(&LIST_SEPARATOR.to_string())
}
