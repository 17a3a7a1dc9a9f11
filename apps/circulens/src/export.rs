use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use async_trait::async_trait;
use client_core::{DiagramOpener, DiagramReference, HttpAnalysisService};
use tracing::info;

/// Saves the generated schematic to a file instead of opening a viewer.
pub struct FileDiagramExporter {
    service: Arc<HttpAnalysisService>,
    destination: PathBuf,
}

impl FileDiagramExporter {
    pub fn new(service: Arc<HttpAnalysisService>, destination: PathBuf) -> Self {
        Self {
            service,
            destination,
        }
    }
}

#[async_trait]
impl DiagramOpener for FileDiagramExporter {
    async fn open(&self, diagram: &DiagramReference) -> anyhow::Result<()> {
        let bytes = self
            .service
            .fetch_diagram(&diagram.diagram_id)
            .await
            .with_context(|| format!("failed to download diagram from {}", diagram.url))?;
        if let Some(parent) = self.destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("failed to create directory '{}'", parent.display())
            })?;
        }
        tokio::fs::write(&self.destination, &bytes)
            .await
            .with_context(|| format!("failed to write '{}'", self.destination.display()))?;
        info!(
            diagram = %diagram.diagram_id,
            path = %self.destination.display(),
            size = bytes.len(),
            "diagram saved"
        );
        Ok(())
    }
}
