//! Rapport de résolution avec graceful degradation
//!
//! Chaque identifiant demandé y figure avec son issue ; les échecs ne
//! bloquent jamais les identifiants suivants.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use matrikel::{MatrikelError, ParcelIdentifier};
use serde::Serialize;

/// Statut global de la résolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResolutionStatus {
    /// Toutes les parcelles demandées ont été résolues
    Success,
    /// Au moins une parcelle résolue, d'autres absentes ou en erreur
    PartialSuccess,
    /// Aucune parcelle demandée
    Empty,
    /// Parcelles demandées mais aucune résolue
    Failed,
}

/// Niveau de sévérité
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorLevel {
    /// Identifiant ignoré avant toute requête
    Warning,
    /// Requête ou réponse en échec
    Error,
}

/// Issue de la résolution d'un identifiant
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Resolved { vertices: usize },
    NoMatch,
    Failed { kind: String, message: String },
}

/// Ligne du rapport
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParcelOutcome {
    pub identifier: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Erreur non fatale avec contexte
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionError {
    pub level: ErrorLevel,
    /// Identifiant ou token d'origine
    pub identifier: String,
    /// Catégorie (`malformed_identifier`, `remote_query`, ...)
    pub kind: String,
    pub message: String,
    /// Statut HTTP, pour les erreurs distantes
    pub status: Option<u16>,
}

/// Rapport complet
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionReport {
    /// Liste d'identifiants reçue
    pub input: String,
    pub duration_secs: f64,
    pub status: ResolutionStatus,

    /// Identifiants valides interrogés
    pub requested: usize,
    pub resolved: usize,
    pub no_match: usize,
    pub failed: usize,
    /// Tokens rejetés au parsing
    pub rejected: usize,

    /// Issues, dans l'ordre de la liste
    pub outcomes: Vec<ParcelOutcome>,
    pub errors: Vec<ResolutionError>,
}

impl ResolutionReport {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
            duration_secs: 0.0,
            status: ResolutionStatus::Empty,
            requested: 0,
            resolved: 0,
            no_match: 0,
            failed: 0,
            rejected: 0,
            outcomes: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Enregistre un token rejeté au parsing
    pub fn record_rejected(&mut self, error: &MatrikelError) {
        self.rejected += 1;
        let identifier = match error {
            MatrikelError::MalformedIdentifier { token, .. } => token.clone(),
            _ => String::new(),
        };
        self.errors.push(ResolutionError {
            level: ErrorLevel::Warning,
            identifier,
            kind: error.kind().to_string(),
            message: error.to_string(),
            status: None,
        });
    }

    /// Enregistre une parcelle résolue
    pub fn record_resolved(&mut self, identifier: &ParcelIdentifier, vertices: usize) {
        self.requested += 1;
        self.resolved += 1;
        self.outcomes.push(ParcelOutcome {
            identifier: identifier.to_string(),
            outcome: Outcome::Resolved { vertices },
        });
    }

    /// Enregistre une absence de correspondance
    pub fn record_no_match(&mut self, identifier: &ParcelIdentifier) {
        self.requested += 1;
        self.no_match += 1;
        self.outcomes.push(ParcelOutcome {
            identifier: identifier.to_string(),
            outcome: Outcome::NoMatch,
        });
    }

    /// Enregistre un échec de requête ou de données
    pub fn record_failure(&mut self, identifier: &ParcelIdentifier, error: &MatrikelError) {
        self.requested += 1;
        self.failed += 1;
        let status = match error {
            MatrikelError::RemoteQuery { status, .. } => *status,
            _ => None,
        };
        self.outcomes.push(ParcelOutcome {
            identifier: identifier.to_string(),
            outcome: Outcome::Failed {
                kind: error.kind().to_string(),
                message: error.to_string(),
            },
        });
        self.errors.push(ResolutionError {
            level: ErrorLevel::Error,
            identifier: identifier.to_string(),
            kind: error.kind().to_string(),
            message: error.to_string(),
            status,
        });
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        let attempted = self.requested + self.rejected;
        self.status = if attempted == 0 {
            ResolutionStatus::Empty
        } else if self.resolved == attempted {
            ResolutionStatus::Success
        } else if self.resolved > 0 {
            ResolutionStatus::PartialSuccess
        } else {
            ResolutionStatus::Failed
        };
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("RESOLUTION REPORT");
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);

        println!("\n--- SUMMARY ---");
        println!(
            "Parcels: {} requested, {} resolved, {} no match, {} failed, {} rejected",
            self.requested, self.resolved, self.no_match, self.failed, self.rejected
        );

        if !self.outcomes.is_empty() {
            println!("\n--- PARCELS ---");
            for o in &self.outcomes {
                match &o.outcome {
                    Outcome::Resolved { vertices } => {
                        println!("  {}: resolved ({} vertices)", o.identifier, vertices)
                    }
                    Outcome::NoMatch => println!("  {}: no match", o.identifier),
                    Outcome::Failed { kind, .. } => println!("  {}: failed ({})", o.identifier, kind),
                }
            }
        }

        if !self.errors.is_empty() {
            println!("\n--- ERRORS ({}) ---", self.errors.len());
            for e in self.errors.iter().take(20) {
                println!("  {:?} [{}] {}", e.level, e.identifier, e.message);
            }
            if self.errors.len() > 20 {
                println!("  ... and {} more", self.errors.len() - 20);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{:?}: {} resolved, {} no match, {} failed, {} rejected",
            self.status, self.resolved, self.no_match, self.failed, self.rejected
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ParcelIdentifier {
        ParcelIdentifier::parse(s).unwrap()
    }

    #[test]
    fn test_empty_report() {
        let mut report = ResolutionReport::new("");
        report.finalize();
        assert_eq!(report.status, ResolutionStatus::Empty);
        assert!(report.outcomes.is_empty());
    }

    #[test]
    fn test_finalize_success() {
        let mut report = ResolutionReport::new("2000174:1695i");
        report.record_resolved(&id("2000174:1695i"), 12);
        report.finalize();
        assert_eq!(report.status, ResolutionStatus::Success);
    }

    #[test]
    fn test_finalize_partial_success() {
        let mut report = ResolutionReport::new("2000174:1695i;2000174:1441b");
        report.record_resolved(&id("2000174:1695i"), 12);
        report.record_no_match(&id("2000174:1441b"));
        report.finalize();

        assert_eq!(report.status, ResolutionStatus::PartialSuccess);
        assert_eq!(report.requested, 2);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_finalize_failed() {
        let mut report = ResolutionReport::new("BAD;2000174:1695i");
        report.record_rejected(&MatrikelError::malformed("BAD", "missing ':' separator"));
        let err = MatrikelError::remote("2000174:1695i", Some(500), "HTTP 500");
        report.record_failure(&id("2000174:1695i"), &err);
        report.finalize();

        assert_eq!(report.status, ResolutionStatus::Failed);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.errors[0].level, ErrorLevel::Warning);
        assert_eq!(report.errors[0].identifier, "BAD");
        assert_eq!(report.errors[1].status, Some(500));
    }

    #[test]
    fn test_serialized_outcomes() {
        let mut report = ResolutionReport::new("2000174:1441b");
        report.record_no_match(&id("2000174:1441b"));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcomes"][0]["identifier"], "2000174:1441b");
        assert_eq!(json["outcomes"][0]["outcome"], "no_match");
    }

    #[test]
    fn test_summary() {
        let mut report = ResolutionReport::new("2000174:1695i");
        report.record_resolved(&id("2000174:1695i"), 5);
        report.finalize();
        assert!(report.summary().contains("1 resolved"));
    }
}
