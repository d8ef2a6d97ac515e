use crate::config::EngineConfig;
use crate::shared::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

use super::{EngineRejection, PolicyEngine, UploadOutcome};

#[derive(Debug, Deserialize)]
struct EngineErrorLocation {
    row: Option<u32>,
    col: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct EngineErrorDetail {
    message: String,
    location: Option<EngineErrorLocation>,
}

#[derive(Debug, Deserialize)]
struct EngineErrorBody {
    message: Option<String>,
    #[serde(default)]
    errors: Vec<EngineErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct EvaluateBody {
    result: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct PolicyListItem {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PolicyListBody {
    #[serde(default)]
    result: Vec<PolicyListItem>,
}

/// REST client for an OPA-style engine: modules under `/v1/policies/<id>`,
/// decisions under `/v1/data/<path>`.
pub struct HttpPolicyEngine {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPolicyEngine {
    pub fn new(config: &EngineConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("engine client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    fn transport_err(e: reqwest::Error) -> AppError {
        if e.is_timeout() {
            AppError::BackendUnavailable("engine timeout".to_string())
        } else {
            AppError::BackendUnavailable(format!("engine: {}", e))
        }
    }

    async fn parse_rejection(response: reqwest::Response) -> EngineRejection {
        match response.json::<EngineErrorBody>().await {
            Ok(body) => {
                if let Some(detail) = body.errors.into_iter().next() {
                    let (row, col) = detail
                        .location
                        .map(|loc| (loc.row, loc.col))
                        .unwrap_or((None, None));
                    EngineRejection {
                        message: detail.message,
                        row,
                        col,
                    }
                } else {
                    EngineRejection {
                        message: body.message.unwrap_or_else(|| "module rejected".to_string()),
                        row: None,
                        col: None,
                    }
                }
            }
            Err(_) => EngineRejection {
                message: "module rejected".to_string(),
                row: None,
                col: None,
            },
        }
    }
}

#[async_trait]
impl PolicyEngine for HttpPolicyEngine {
    async fn put_policy(&self, id: &str, content: &str) -> AppResult<UploadOutcome> {
        let response = self
            .client
            .put(format!("{}/v1/policies/{}", self.base_url, id))
            .header("Content-Type", "text/plain")
            .body(content.to_string())
            .send()
            .await
            .map_err(Self::transport_err)?;

        match response.status() {
            StatusCode::OK => Ok(Ok(())),
            StatusCode::BAD_REQUEST => Ok(Err(Self::parse_rejection(response).await)),
            status => Err(AppError::BackendUnavailable(format!(
                "engine returned {}",
                status
            ))),
        }
    }

    async fn delete_policy(&self, id: &str) -> AppResult<()> {
        let response = self
            .client
            .delete(format!("{}/v1/policies/{}", self.base_url, id))
            .send()
            .await
            .map_err(Self::transport_err)?;

        match response.status() {
            StatusCode::OK | StatusCode::NOT_FOUND => Ok(()),
            status => Err(AppError::BackendUnavailable(format!(
                "engine returned {}",
                status
            ))),
        }
    }

    async fn list_policies(&self) -> AppResult<Vec<String>> {
        // Idempotent read, so transient failures get the bounded backoff.
        crate::infrastructure::retry::read_with_backoff("engine.list_policies", || async {
            let response = self
                .client
                .get(format!("{}/v1/policies", self.base_url))
                .send()
                .await
                .map_err(Self::transport_err)?;

            if response.status() != StatusCode::OK {
                return Err(AppError::BackendUnavailable(format!(
                    "engine returned {}",
                    response.status()
                )));
            }
            let body: PolicyListBody = response.json().await.map_err(Self::transport_err)?;
            Ok(body.result.into_iter().map(|p| p.id).collect())
        })
        .await
    }

    async fn evaluate(
        &self,
        path: &str,
        input: &serde_json::Value,
    ) -> AppResult<serde_json::Value> {
        let path = path.replace('.', "/");
        let response = self
            .client
            .post(format!("{}/v1/data/{}", self.base_url, path))
            .json(&serde_json::json!({"input": input}))
            .send()
            .await
            .map_err(Self::transport_err)?;

        if response.status() != StatusCode::OK {
            return Err(AppError::BackendUnavailable(format!(
                "engine returned {}",
                response.status()
            )));
        }
        let body: EvaluateBody = response.json().await.map_err(Self::transport_err)?;
        // An undefined decision document means no policy matched.
        Ok(body.result.unwrap_or(serde_json::Value::Null))
    }
}
