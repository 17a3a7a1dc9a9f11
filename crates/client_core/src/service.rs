use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use mime_guess::Mime;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::DiagramId,
    protocol::{ErrorResponse, HealthResponse, UploadImageResponse},
};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

const UPLOAD_FIELD: &str = "file";
const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid analysis service url `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("request to analysis service failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("analysis service responded with status {status}")]
    Status {
        status: u16,
        body: Option<ErrorResponse>,
    },
    #[error("malformed response from analysis service: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Error text supplied by the service itself, if any reached us.
    pub fn service_message(&self) -> Option<&str> {
        match self {
            Self::Status {
                body: Some(body), ..
            } => body.error.as_deref(),
            _ => None,
        }
    }
}

/// Base address of the analysis service plus the resource paths hanging off it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    base: Url,
}

impl ServiceEndpoint {
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        let trimmed = raw.trim();
        let invalid = |reason: String| ServiceError::InvalidBaseUrl {
            url: trimmed.to_string(),
            reason,
        };
        let base = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme `{}`", base.scheme())));
        }
        if base.query().is_some() || base.fragment().is_some() {
            return Err(invalid("query and fragment are not allowed".to_string()));
        }
        Ok(Self { base })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    pub fn health_url(&self) -> Url {
        self.join(&[])
    }

    pub fn upload_url(&self) -> Url {
        self.join(&["upload-image"])
    }

    /// `<base>/diagrams/<id>`, with the id encoded as a single path segment.
    pub fn diagram_url(&self, diagram_id: &DiagramId) -> Url {
        self.join(&["diagrams", diagram_id.as_str()])
    }

    fn join(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments);
            if segments.is_empty() {
                path.push("");
            }
        }
        url
    }
}

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Arc<[u8]>,
}

#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn upload_image(&self, upload: ImageUpload)
        -> Result<UploadImageResponse, ServiceError>;
}

pub struct HttpAnalysisService {
    http: Client,
    endpoint: ServiceEndpoint,
}

impl HttpAnalysisService {
    pub fn new(endpoint: ServiceEndpoint) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_timeout(endpoint: ServiceEndpoint, timeout: Duration) -> Result<Self, ServiceError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, endpoint))
    }

    pub fn with_client(http: Client, endpoint: ServiceEndpoint) -> Self {
        Self { http, endpoint }
    }

    pub fn endpoint(&self) -> &ServiceEndpoint {
        &self.endpoint
    }

    pub async fn health(&self) -> Result<HealthResponse, ServiceError> {
        let response = self.http.get(self.endpoint.health_url()).send().await?;
        decode_json(response).await
    }

    /// Downloads a generated schematic. The workflow itself only hands out the
    /// locator; this exists for exporters that want the bytes.
    pub async fn fetch_diagram(&self, diagram_id: &DiagramId) -> Result<Vec<u8>, ServiceError> {
        let url = self.endpoint.diagram_url(diagram_id);
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body: serde_json::from_slice(&body).ok(),
            });
        }
        Ok(body.to_vec())
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisService {
    async fn upload_image(
        &self,
        upload: ImageUpload,
    ) -> Result<UploadImageResponse, ServiceError> {
        let media_type = if upload.media_type.parse::<Mime>().is_ok() {
            upload.media_type.as_str()
        } else {
            OCTET_STREAM
        };
        let size = upload.bytes.len();
        let part = Part::bytes(upload.bytes.to_vec())
            .file_name(upload.file_name.clone())
            .mime_str(media_type)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        debug!(file_name = %upload.file_name, size, "uploading image for analysis");
        let response = self
            .http
            .post(self.endpoint.upload_url())
            .multipart(form)
            .send()
            .await?;
        decode_json(response).await
    }
}

async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ServiceError> {
    let status = response.status();
    let body = response.bytes().await?;
    if !status.is_success() {
        let parsed = serde_json::from_slice::<ErrorResponse>(&body).ok();
        warn!(status = status.as_u16(), "analysis service returned an error status");
        return Err(ServiceError::Status {
            status: status.as_u16(),
            body: parsed,
        });
    }
    serde_json::from_slice(&body).map_err(|e| ServiceError::Decode(e.to_string()))
}
