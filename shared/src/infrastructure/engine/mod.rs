pub mod client;

pub use client::HttpPolicyEngine;

use crate::shared::AppResult;
use async_trait::async_trait;

/// A module upload rejection, with parser location when the engine gives one.
#[derive(Debug, Clone)]
pub struct EngineRejection {
    pub message: String,
    pub row: Option<u32>,
    pub col: Option<u32>,
}

impl std::fmt::Display for EngineRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.row, self.col) {
            (Some(row), Some(col)) => write!(f, "{} (row {}, col {})", self.message, row, col),
            _ => write!(f, "{}", self.message),
        }
    }
}

/// Outcome of uploading a module: accepted, or rejected with diagnostics.
/// Transport failures surface as errors instead.
pub type UploadOutcome = Result<(), EngineRejection>;

/// Operations the core needs from the external policy engine. Evaluation
/// carries the configured timeout; callers treat any error as deny.
#[async_trait]
pub trait PolicyEngine: Send + Sync {
    /// Upload or replace a named policy module.
    async fn put_policy(&self, id: &str, content: &str) -> AppResult<UploadOutcome>;
    async fn delete_policy(&self, id: &str) -> AppResult<()>;
    async fn list_policies(&self) -> AppResult<Vec<String>>;
    /// Evaluate a decision path with a structured input, returning the raw
    /// result document.
    async fn evaluate(&self, path: &str, input: &serde_json::Value)
        -> AppResult<serde_json::Value>;
}
