use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use crate::i18n::Language;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: StatusCode },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("request task panicked")]
    TaskPanicked,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    pub lang: Language,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub reply: Option<String>,
}

impl ChatReply {
    /// Text to show in the log. A reply without the field renders as an ellipsis.
    pub fn text(self) -> String {
        self.reply.unwrap_or_else(|| "…".to_string())
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct OperatingConditions {
    #[serde(rename = "T_K")]
    pub t_k: Option<f64>,
    #[serde(rename = "P_bar")]
    pub p_bar: Option<f64>,
    pub humidity_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Constraints {
    pub selectivity_min: Option<f64>,
    pub uptake_min_mmol_g: Option<f64>,
    pub operating_conditions: OperatingConditions,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ForwardRequest {
    pub application: String,
    pub constraints: Constraints,
    pub lang: Language,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Material {
    pub name: String,
    pub cif_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InverseRequest {
    pub material: Material,
    pub lang: Language,
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `GET /health`. Any 2xx counts as reachable.
    pub async fn health(&self) -> Result<(), ApiError> {
        let url = format!("{}/health", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| ApiError::Network { url: url.clone(), source })?;

        if !response.status().is_success() {
            return Err(ApiError::Status { url, status: response.status() });
        }
        Ok(())
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        self.post("chat", request).await
    }

    pub async fn forward(&self, request: &ForwardRequest) -> Result<Value, ApiError> {
        self.post("forward", request).await
    }

    pub async fn inverse(&self, request: &InverseRequest) -> Result<Value, ApiError> {
        self.post("inverse", request).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| ApiError::Network { url: url.clone(), source })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "non-success status");
            return Err(ApiError::Status { url, status });
        }

        let text = response
            .text()
            .await
            .map_err(|source| ApiError::Network { url: url.clone(), source })?;

        serde_json::from_str(&text).map_err(|source| ApiError::Decode { url, source })
    }
}
