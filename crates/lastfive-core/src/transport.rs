use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::Failure;
use crate::report::{AnalysisRequest, Report};

/// Anything that can turn a product query into a report.
///
/// The session only depends on this seam, so tests can drive it with a scripted
/// service instead of a live backend.
#[async_trait]
pub trait ReasoningService: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Report, Failure>;
}

/// Response of `GET /api/health`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub langchain_enabled: bool,
    #[serde(default)]
    pub llm_provider: Option<String>,
}

/// HTTP client for the reasoning service
#[derive(Clone)]
pub struct TransportClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl TransportClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.service_url(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue exactly one analysis request.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<Report, Failure> {
        let url = format!("{}/api/analyze", self.base_url);
        debug!(%url, product = %request.product_name, "sending analysis request");

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            return Err(Failure::Service {
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        let report: Report =
            serde_json::from_str(&body).map_err(|e| Failure::Malformed(e.to_string()))?;

        debug!(product = %report.product_name, score = report.risk_score, "analysis received");
        Ok(report)
    }

    /// Probe `GET /api/health`. Informational only; never gates analysis.
    pub async fn health(&self) -> Result<ServiceHealth, Failure> {
        let url = format!("{}/api/health", self.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            return Err(Failure::Service {
                status: response.status().as_u16(),
            });
        }

        response
            .json::<ServiceHealth>()
            .await
            .map_err(|e| Failure::Malformed(e.to_string()))
    }

    fn classify(&self, err: reqwest::Error) -> Failure {
        if err.is_timeout() {
            Failure::Timeout(self.timeout)
        } else if err.is_decode() {
            Failure::Malformed(err.to_string())
        } else {
            Failure::Network(err.to_string())
        }
    }
}

#[async_trait]
impl ReasoningService for TransportClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Report, Failure> {
        TransportClient::analyze(self, request).await
    }
}
