//! Configuration de la carte et de la résolution
//!
//! Précédence (du plus faible au plus fort) : valeurs par défaut, fichier
//! JSON, variables d'environnement, arguments CLI.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Endpoint gsearch pour les matrikler
pub const DEFAULT_ENDPOINT: &str = "https://api.dataforsyningen.dk/rest/gsearch/v1.0/matrikel";

/// Zoom maximal accepté
pub const MAX_ZOOM: u8 = 28;

/// Erreurs de validation de la configuration
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid zoom '{0}': expected an integer between 0 and 28")]
    InvalidZoom(String),

    #[error("Invalid center '{0}': expected 'lon,lat' in degrees")]
    InvalidCenter(String),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

/// Couche de fond WMS
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WmsLayerConfig {
    /// URL du service WMS (le token est ajouté par le client de rendu)
    pub url: String,

    /// Couches WMS demandées
    pub layers: Vec<String>,

    /// Fond transparent
    pub transparent: bool,
}

impl Default for WmsLayerConfig {
    fn default() -> Self {
        Self {
            url: "https://api.dataforsyningen.dk/kommunikation".into(),
            layers: vec![
                "Kommunikation_basis".into(),
                "Vejnavne_stoerre".into(),
                "Vejnavne_mindre".into(),
            ],
            transparent: true,
        }
    }
}

/// Configuration principale
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MapConfig {
    /// Niveau de zoom initial
    pub zoom: u8,

    /// Centre initial `[lon, lat]` en degrés
    pub center: [f64; 2],

    /// Liste `ejerlavkode:matrikelnummer;...`, vide = pas de superposition
    pub parcels: String,

    /// Token Dataforsyningen
    #[serde(skip_serializing)]
    pub token: Option<String>,

    /// Endpoint du service de recherche
    pub endpoint: String,

    /// Timeout par requête (secondes)
    pub timeout_secs: u64,

    /// Nombre de requêtes simultanées (1 = séquentiel)
    pub concurrency: usize,

    /// Durée de l'animation de cadrage (ms)
    pub fit_duration_ms: u64,

    /// Couche de fond
    pub base_layer: WmsLayerConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom: 10,
            center: [12.5536, 55.6604],
            parcels: String::new(),
            token: None,
            endpoint: DEFAULT_ENDPOINT.into(),
            timeout_secs: 10,
            concurrency: 1,
            fit_duration_ms: 2500,
            base_layer: WmsLayerConfig::default(),
        }
    }
}

impl MapConfig {
    /// Charge une configuration depuis un fichier JSON
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Self = serde_json::from_str(&content).context("Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Applique les variables d'environnement
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Applique des variables depuis une source quelconque
    pub fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(zoom) = var("MKORT_ZOOM") {
            self.zoom = parse_zoom(&zoom)?;
        }
        if let Some(center) = var("MKORT_CENTER") {
            self.center = parse_center(&center)?;
        }
        if let Some(parcels) = var("MKORT_MATR") {
            self.parcels = parcels;
        }
        if let Some(token) = var("DATAFORSYNINGEN_TOKEN").filter(|t| !t.is_empty()) {
            self.token = Some(token);
        }
        if let Some(endpoint) = var("MKORT_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(timeout) = var("MKORT_TIMEOUT_SECS") {
            self.timeout_secs = parse_number("MKORT_TIMEOUT_SECS", &timeout)?;
        }
        if let Some(concurrency) = var("MKORT_CONCURRENCY") {
            self.concurrency = parse_number("MKORT_CONCURRENCY", &concurrency)?;
        }
        self.validate()
    }

    /// Vérifie la cohérence des valeurs
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.zoom > MAX_ZOOM {
            return Err(ConfigError::InvalidZoom(self.zoom.to_string()));
        }
        let [lon, lat] = self.center;
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return Err(ConfigError::InvalidCenter(format!("{},{}", lon, lat)));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                key: "concurrency".into(),
                value: "0".into(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timeout_secs".into(),
                value: "0".into(),
            });
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn fit_duration(&self) -> Duration {
        Duration::from_millis(self.fit_duration_ms)
    }
}

/// Parse un niveau de zoom entier
pub fn parse_zoom(value: &str) -> Result<u8, ConfigError> {
    value
        .trim()
        .parse::<u8>()
        .ok()
        .filter(|z| *z <= MAX_ZOOM)
        .ok_or_else(|| ConfigError::InvalidZoom(value.to_string()))
}

/// Parse un centre `lon,lat`
pub fn parse_center(value: &str) -> Result<[f64; 2], ConfigError> {
    let invalid = || ConfigError::InvalidCenter(value.to_string());

    let (lon, lat) = value.split_once(',').ok_or_else(invalid)?;
    let lon: f64 = lon.trim().parse().map_err(|_| invalid())?;
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;

    if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
        return Err(invalid());
    }
    Ok([lon, lat])
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
