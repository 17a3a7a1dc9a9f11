use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shown when the service processed the upload but reported `success: false`.
pub const ANALYSIS_FAILED_MESSAGE: &str = "Analysis failed. Please try again.";
/// Shown when the request did not complete and the service supplied no error text.
pub const TRANSPORT_FAILED_MESSAGE: &str = "An error occurred while analyzing the image";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Logical,
    Transport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct AnalysisFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl AnalysisFailure {
    pub fn logical() -> Self {
        Self {
            kind: FailureKind::Logical,
            message: ANALYSIS_FAILED_MESSAGE.to_string(),
        }
    }

    /// Prefers the service-supplied error text; blank text counts as absent.
    pub fn transport(service_error: Option<String>) -> Self {
        let message = service_error
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| TRANSPORT_FAILED_MESSAGE.to_string());
        Self {
            kind: FailureKind::Transport,
            message,
        }
    }
}
