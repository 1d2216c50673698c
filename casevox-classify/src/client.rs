use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use casevox_common::Error;

use crate::types::{
    BatchClassifyRequest, Classification, ClassifierExplanation, ClassifyRequest,
};

/// Configuration for the external classification service.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Base URL for API requests
    pub base_url: String,

    /// Per-request timeout; the model can take a while on cold start.
    pub timeout: Duration,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Seam for the classifier so services can be exercised without the real
/// model behind them.
#[async_trait]
pub trait Classify: Send + Sync {
    async fn classify(&self, complaint_text: &str) -> Result<Classification, Error>;
}

/// HTTP client for the hosted text-classification service.
pub struct ClassifierClient {
    http: reqwest::Client,
    base_url: String,
}

impl ClassifierClient {
    pub fn new(config: ClassifierConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Ask the service why a complaint was classified the way it was.
    pub async fn explain(&self, complaint_text: &str) -> Result<ClassifierExplanation, Error> {
        let resp = self
            .http
            .post(format!("{}/explain", self.base_url))
            .json(&ClassifyRequest { complaint: complaint_text })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::Classifier(format!(
                "explain returned status {}",
                resp.status()
            )));
        }
        Ok(resp.json().await?)
    }

    /// Classify a batch of complaints in one round trip. The service returns
    /// a manual-review placeholder for entries its model choked on, so the
    /// result always lines up with the input by index.
    pub async fn classify_batch(
        &self,
        complaints: &[String],
    ) -> Result<Vec<Classification>, Error> {
        let resp = self
            .http
            .post(format!("{}/classify/batch", self.base_url))
            .json(&BatchClassifyRequest { complaints })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::Classifier(format!(
                "batch classify returned status {}",
                resp.status()
            )));
        }
        Ok(resp.json().await?)
    }

    /// Liveness probe against the service's /health endpoint.
    pub async fn health(&self) -> bool {
        match self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!("classifier health check failed: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl Classify for ClassifierClient {
    async fn classify(&self, complaint_text: &str) -> Result<Classification, Error> {
        let resp = self
            .http
            .post(format!("{}/classify", self.base_url))
            .json(&ClassifyRequest { complaint: complaint_text })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::Classifier(format!(
                "classify returned status {}",
                resp.status()
            )));
        }

        let classification: Classification = resp.json().await?;
        debug!(
            severity = %classification.severity,
            route_to = %classification.route_to,
            "classified complaint"
        );
        Ok(classification)
    }
}
