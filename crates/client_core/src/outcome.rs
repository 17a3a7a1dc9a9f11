use serde::Serialize;
use shared::{
    domain::DiagramId,
    error::{AnalysisFailure, FailureKind},
    protocol::UploadImageResponse,
};

use crate::service::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Success {
        analysis_text: String,
        diagram_id: DiagramId,
    },
    Failure {
        kind: FailureKind,
        message: String,
    },
}

impl AnalysisOutcome {
    pub fn from_service_result(result: Result<UploadImageResponse, ServiceError>) -> Self {
        match result {
            Ok(response) => Self::from_response(response),
            Err(err) => Self::from(AnalysisFailure::transport(
                err.service_message().map(str::to_string),
            )),
        }
    }

    fn from_response(response: UploadImageResponse) -> Self {
        if !response.success {
            return Self::from(AnalysisFailure::logical());
        }
        match response
            .circuit_diagram
            .as_deref()
            .filter(|id| !id.trim().is_empty())
        {
            Some(diagram_id) => Self::Success {
                analysis_text: response.display_text(),
                diagram_id: DiagramId::from(diagram_id),
            },
            // A success without a diagram is a malformed body.
            None => Self::from(AnalysisFailure::transport(response.error.clone())),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn diagram_id(&self) -> Option<&DiagramId> {
        match self {
            Self::Success { diagram_id, .. } => Some(diagram_id),
            Self::Failure { .. } => None,
        }
    }

    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Failure { message, .. } => Some(message),
            Self::Success { .. } => None,
        }
    }
}

impl From<AnalysisFailure> for AnalysisOutcome {
    fn from(failure: AnalysisFailure) -> Self {
        Self::Failure {
            kind: failure.kind,
            message: failure.message,
        }
    }
}
