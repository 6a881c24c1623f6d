//! Résolution des matrikler via le service gsearch de Dataforsyningen

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use matrikel::{resolve_response, MatrikelError, ParcelIdentifier, Reprojector, ResolvedParcel};
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::MapConfig;

/// Source des réponses brutes du service de recherche
pub trait ParcelSource: Send + Sync {
    /// Retourne le corps JSON de la réponse pour un identifiant
    fn fetch(
        &self,
        identifier: &ParcelIdentifier,
    ) -> impl Future<Output = Result<String, MatrikelError>> + Send;
}

/// Client HTTP du service gsearch
#[derive(Debug, Clone)]
pub struct GsearchClient {
    client: Client,
    endpoint: String,
    token: Option<String>,
    timeout: Duration,
}

impl GsearchClient {
    pub fn new(endpoint: impl Into<String>, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("mkort/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        if token.is_none() {
            warn!("No Dataforsyningen token configured, requests will be sent without it");
        }

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token,
            timeout,
        })
    }

    pub fn from_config(config: &MapConfig) -> Result<Self> {
        Self::new(config.endpoint.clone(), config.token.clone(), config.timeout())
    }
}

impl ParcelSource for GsearchClient {
    async fn fetch(&self, identifier: &ParcelIdentifier) -> Result<String, MatrikelError> {
        let filter = identifier.region_filter();
        let mut request = self
            .client
            .get(&self.endpoint)
            .query(&[("q", identifier.parcel_code()), ("filter", filter.as_str())])
            .timeout(self.timeout);

        if let Some(token) = &self.token {
            request = request.header("token", token);
        }

        debug!(identifier = %identifier, endpoint = %self.endpoint, "Fetching parcel");

        let response = request.send().await.map_err(|e| {
            let reason = if e.is_timeout() {
                format!("timed out after {:?}", self.timeout)
            } else {
                e.to_string()
            };
            MatrikelError::remote(identifier, None, reason)
        })?;

        let status = response.status();
        debug!(identifier = %identifier, status = status.as_u16(), "Response received");

        if !status.is_success() {
            return Err(MatrikelError::remote(
                identifier,
                Some(status.as_u16()),
                format!("HTTP {}", status),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| MatrikelError::remote(identifier, Some(status.as_u16()), e.to_string()))
    }
}

/// Source + reprojection : une requête donne zéro ou une parcelle en lon/lat
pub struct ParcelResolver<S> {
    source: S,
    reprojector: Reprojector,
}

impl<S: ParcelSource> ParcelResolver<S> {
    pub fn new(source: S, reprojector: Reprojector) -> Self {
        Self {
            source,
            reprojector,
        }
    }

    /// Résout un identifiant. `Ok(None)` si aucune correspondance.
    pub async fn resolve(
        &self,
        identifier: &ParcelIdentifier,
    ) -> Result<Option<ResolvedParcel>, MatrikelError> {
        let body = self.source.fetch(identifier).await?;
        resolve_response(&body, identifier, &self.reprojector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const BODY: &str = r#"[{"matrikelnummer": "1695i", "geometri": {"type": "MultiPolygon",
        "coordinates": [[[[724000, 6175000], [724000, 6175100], [724100, 6175100], [724000, 6175000]]]]}}]"#;

    fn id() -> ParcelIdentifier {
        ParcelIdentifier::parse("2000174:1695i").unwrap()
    }

    fn client(server: &MockServer, token: Option<&str>) -> GsearchClient {
        GsearchClient::new(
            server.url("/matrikel"),
            token.map(String::from),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_query_parameters_and_token() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/matrikel")
                    .query_param("q", "1695i")
                    .query_param("filter", "ejerlavskode='2000174'")
                    .header("token", "secret");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .body(BODY);
            })
            .await;

        let body = client(&server, Some("secret")).fetch(&id()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(body, BODY);
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/matrikel");
                then.status(500);
            })
            .await;

        let err = client(&server, None).fetch(&id()).await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(
            err,
            MatrikelError::RemoteQuery {
                status: Some(500),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_timeout_is_remote_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/matrikel");
                then.status(200)
                    .delay(Duration::from_millis(500))
                    .body("[]");
            })
            .await;

        let client = GsearchClient::new(server.url("/matrikel"), None, Duration::from_millis(50))
            .unwrap();
        let err = client.fetch(&id()).await.unwrap_err();

        assert!(matches!(err, MatrikelError::RemoteQuery { status: None, .. }));
    }

    #[tokio::test]
    async fn test_resolver_reprojects() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/matrikel");
                then.status(200).body(BODY);
            })
            .await;

        let resolver = ParcelResolver::new(client(&server, None), Reprojector::utm32_to_lonlat());
        let parcel = resolver.resolve(&id()).await.unwrap().unwrap();

        let c = parcel.geometry.0[0].exterior().0[0];
        assert!((c.x - 12.56).abs() < 0.05, "lon={}", c.x);
        assert!((c.y - 55.67).abs() < 0.05, "lat={}", c.y);
    }

    #[tokio::test]
    async fn test_resolver_empty_and_malformed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).query_param("q", "1441b");
                then.status(200).body("[]");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).query_param("q", "1695i");
                then.status(200).body("not json");
            })
            .await;

        let resolver = ParcelResolver::new(client(&server, None), Reprojector::utm32_to_lonlat());

        let empty = ParcelIdentifier::parse("2000174:1441b").unwrap();
        assert_eq!(resolver.resolve(&empty).await.unwrap(), None);

        let err = resolver.resolve(&id()).await.unwrap_err();
        assert!(matches!(err, MatrikelError::ParcelData { .. }));
    }
}
