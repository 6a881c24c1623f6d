//! Orchestration : liste d'identifiants → parcelles → emprise → rendu

use std::pin::pin;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use matrikel::{parse_identifier_list, Extent, ExtentAccumulator, OverlayLayer, ResolvedParcel};
use tracing::{debug, info, warn};

use crate::config::MapConfig;
use crate::render::MapRenderer;
use crate::report::ResolutionReport;
use crate::resolver::{ParcelResolver, ParcelSource};

/// Options d'exécution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayOptions {
    /// Requêtes simultanées (1 = séquentiel)
    pub concurrency: usize,
    pub fit_duration: Duration,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            fit_duration: Duration::from_millis(2500),
        }
    }
}

impl From<&MapConfig> for OverlayOptions {
    fn from(config: &MapConfig) -> Self {
        Self {
            concurrency: config.concurrency,
            fit_duration: config.fit_duration(),
        }
    }
}

/// Résultat d'une exécution
#[derive(Debug, Clone)]
pub struct OverlayOutcome {
    /// Parcelles résolues, dans l'ordre de la liste
    pub parcels: Vec<ResolvedParcel>,
    /// `None` quand aucune parcelle n'a été résolue
    pub extent: Option<Extent>,
    pub report: ResolutionReport,
}

/// Résout la liste d'identifiants et alimente le moteur de rendu.
///
/// Les identifiants invalides, les erreurs distantes et les réponses
/// inexploitables sont consignés dans le rapport sans interrompre la
/// résolution. Seules les erreurs du moteur de rendu sont remontées.
pub async fn run_overlay<S, R>(
    input: &str,
    resolver: &ParcelResolver<S>,
    renderer: &mut R,
    options: OverlayOptions,
) -> Result<OverlayOutcome>
where
    S: ParcelSource,
    R: MapRenderer,
{
    let start = Instant::now();
    let mut report = ResolutionReport::new(input);

    let list = parse_identifier_list(input);
    for error in &list.errors {
        report.record_rejected(error);
    }
    info!(
        valid = list.identifiers.len(),
        rejected = list.errors.len(),
        concurrency = options.concurrency,
        "Resolving parcels"
    );

    // buffered() rend les résultats dans l'ordre de soumission
    let results = stream::iter(list.identifiers.iter())
        .map(|identifier| async move { (identifier, resolver.resolve(identifier).await) })
        .buffered(options.concurrency.max(1));
    let mut results = pin!(results);

    let mut accumulator = ExtentAccumulator::new();
    let mut parcels = Vec::with_capacity(list.identifiers.len());

    while let Some((identifier, result)) = results.next().await {
        match result {
            Ok(Some(parcel)) => {
                let vertices = parcel.vertex_count();
                debug!(identifier = %identifier, vertices, "Parcel resolved");
                accumulator.push_parcel(&parcel.geometry);
                report.record_resolved(identifier, vertices);
                parcels.push(parcel);
            }
            Ok(None) => {
                info!(identifier = %identifier, "No parcel found");
                report.record_no_match(identifier);
            }
            Err(e) => {
                warn!(identifier = %identifier, kind = e.kind(), error = %e, "Parcel skipped");
                report.record_failure(identifier, &e);
            }
        }
    }

    let extent = match accumulator.extent() {
        Ok(extent) => {
            debug!(extent = ?extent.as_array(), "Fitting camera");
            renderer
                .fit(extent, options.fit_duration)
                .context("Renderer failed to fit extent")?;
            Some(extent)
        }
        Err(e) => {
            info!(reason = %e, "Camera fit skipped");
            None
        }
    };

    let layer = OverlayLayer::from_parcels(&parcels);
    renderer
        .add_layer(layer)
        .context("Renderer failed to add overlay layer")?;

    report.set_duration(start.elapsed());
    report.finalize();
    info!(summary = %report.summary(), "Overlay done");

    Ok(OverlayOutcome {
        parcels,
        extent,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ResolutionStatus;
    use matrikel::{MatrikelError, ParcelIdentifier, Reprojector};
    use std::collections::HashMap;

    /// Source en mémoire, avec un délai par identifiant
    #[derive(Default)]
    struct StubSource {
        bodies: HashMap<String, (Result<String, MatrikelError>, u64)>,
    }

    impl StubSource {
        fn with(mut self, id: &str, body: Result<&str, MatrikelError>, delay_ms: u64) -> Self {
            self.bodies
                .insert(id.to_string(), (body.map(String::from), delay_ms));
            self
        }
    }

    impl ParcelSource for StubSource {
        async fn fetch(&self, identifier: &ParcelIdentifier) -> Result<String, MatrikelError> {
            match self.bodies.get(&identifier.to_string()) {
                Some((body, delay_ms)) => {
                    tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                    body.clone()
                }
                None => Ok("[]".to_string()),
            }
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        fits: Vec<(Extent, Duration)>,
        layers: Vec<OverlayLayer>,
    }

    impl MapRenderer for RecordingRenderer {
        fn fit(&mut self, extent: Extent, duration: Duration) -> Result<()> {
            self.fits.push((extent, duration));
            Ok(())
        }

        fn add_layer(&mut self, layer: OverlayLayer) -> Result<()> {
            self.layers.push(layer);
            Ok(())
        }
    }

    /// Carré lon/lat, pour une reprojection identité
    fn square(x: f64, y: f64) -> String {
        format!(
            r#"[{{"geometri": {{"type": "MultiPolygon", "coordinates":
            [[[[{x}, {y}], [{x}, {y1}], [{x1}, {y1}], [{x1}, {y}], [{x}, {y}]]]]}}}}]"#,
            x = x,
            y = y,
            x1 = x + 0.5,
            y1 = y + 0.5
        )
    }

    fn resolver(source: StubSource) -> ParcelResolver<StubSource> {
        let identity = Reprojector::new(matrikel::Crs::Geographic, matrikel::Crs::Geographic);
        ParcelResolver::new(source, identity)
    }

    fn ids(parcels: &[ResolvedParcel]) -> Vec<String> {
        parcels.iter().map(|p| p.identifier.to_string()).collect()
    }

    #[tokio::test]
    async fn test_single_parcel() {
        let a = square(12.0, 55.0);
        let source = StubSource::default().with("1:a", Ok(a.as_str()), 0);
        let mut renderer = RecordingRenderer::default();

        let outcome = run_overlay("1:a", &resolver(source), &mut renderer, OverlayOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome.parcels.len(), 1);
        let extent = outcome.extent.unwrap();
        assert_eq!(extent.as_array(), [12.0, 55.0, 12.5, 55.5]);
        assert_eq!(renderer.fits.len(), 1);
        assert_eq!(renderer.fits[0].1, Duration::from_millis(2500));
        assert_eq!(renderer.layers.len(), 1);
        assert_eq!(renderer.layers[0].len(), 1);
        assert_eq!(outcome.report.status, ResolutionStatus::Success);
    }

    #[tokio::test]
    async fn test_empty_input_skips_fit() {
        let mut renderer = RecordingRenderer::default();

        let outcome = run_overlay("", &resolver(StubSource::default()), &mut renderer, OverlayOptions::default())
            .await
            .unwrap();

        assert!(outcome.parcels.is_empty());
        assert!(outcome.extent.is_none());
        assert!(renderer.fits.is_empty());
        assert_eq!(renderer.layers.len(), 1);
        assert!(renderer.layers[0].is_empty());
        assert_eq!(outcome.report.status, ResolutionStatus::Empty);
    }

    #[tokio::test]
    async fn test_degraded_entries_are_skipped() {
        let a = square(12.0, 55.0);
        let c = square(13.0, 56.0);
        let source = StubSource::default()
            .with("1:a", Ok(a.as_str()), 0)
            .with("1:b", Err(MatrikelError::remote("1:b", Some(500), "HTTP 500")), 0)
            .with("1:c", Ok(c.as_str()), 0)
            .with("1:d", Ok("{\"unexpected\": true}"), 0);
        let mut renderer = RecordingRenderer::default();

        let outcome = run_overlay(
            "1:a;BAD;1:b;1:c;1:d;1:e",
            &resolver(source),
            &mut renderer,
            OverlayOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(ids(&outcome.parcels), ["1:a", "1:c"]);
        assert_eq!(outcome.extent.unwrap().as_array(), [12.0, 55.0, 13.5, 56.5]);

        let report = &outcome.report;
        assert_eq!(report.status, ResolutionStatus::PartialSuccess);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.resolved, 2);
        assert_eq!(report.failed, 2);
        assert_eq!(report.no_match, 1);
        assert_eq!(renderer.layers[0].len(), 2);
    }

    #[tokio::test]
    async fn test_order_preserved_with_concurrency() {
        // Les premières requêtes répondent le plus tard
        let source = (0..5).fold(StubSource::default(), |s, i| {
            let body = square(12.0 + i as f64, 55.0);
            s.with(&format!("1:{}", i), Ok(body.as_str()), (5 - i) * 20)
        });
        let mut renderer = RecordingRenderer::default();
        let options = OverlayOptions {
            concurrency: 4,
            ..Default::default()
        };

        let outcome = run_overlay("1:0;1:1;1:2;1:3;1:4", &resolver(source), &mut renderer, options)
            .await
            .unwrap();

        assert_eq!(ids(&outcome.parcels), ["1:0", "1:1", "1:2", "1:3", "1:4"]);
        let order: Vec<_> = outcome
            .report
            .outcomes
            .iter()
            .map(|o| o.identifier.as_str())
            .collect();
        assert_eq!(order, ["1:0", "1:1", "1:2", "1:3", "1:4"]);
    }

    #[test]
    fn test_options_from_config() {
        let config = MapConfig {
            concurrency: 3,
            fit_duration_ms: 1000,
            ..Default::default()
        };
        let options = OverlayOptions::from(&config);
        assert_eq!(options.concurrency, 3);
        assert_eq!(options.fit_duration, Duration::from_secs(1));
    }
}
