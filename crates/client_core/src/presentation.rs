use async_trait::async_trait;
use pulldown_cmark::{html, Options, Parser};
use serde::Serialize;
use shared::domain::{DiagramId, View};
use url::Url;

use crate::{outcome::AnalysisOutcome, service::ServiceEndpoint, state::WorkflowState};

/// Locator of a generated schematic. Always derived from an outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagramReference {
    pub diagram_id: DiagramId,
    pub url: Url,
}

impl DiagramReference {
    pub fn resolve(endpoint: &ServiceEndpoint, diagram_id: &DiagramId) -> Self {
        Self {
            diagram_id: diagram_id.clone(),
            url: endpoint.diagram_url(diagram_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    pub markdown: String,
    pub html: String,
    pub diagram: DiagramReference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "panel", rename_all = "snake_case")]
pub enum ResultsPanel {
    Placeholder,
    Progress,
    Report(AnalysisReport),
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Presentation {
    pub view: View,
    pub preview: Option<String>,
    pub can_analyze: bool,
    pub panel: ResultsPanel,
}

impl Presentation {
    pub fn project(state: &WorkflowState, endpoint: &ServiceEndpoint) -> Self {
        let panel = if state.in_flight() {
            ResultsPanel::Progress
        } else {
            match state.outcome() {
                None => ResultsPanel::Placeholder,
                Some(AnalysisOutcome::Success {
                    analysis_text,
                    diagram_id,
                }) => ResultsPanel::Report(AnalysisReport {
                    markdown: analysis_text.clone(),
                    html: render_markdown(analysis_text),
                    diagram: DiagramReference::resolve(endpoint, diagram_id),
                }),
                Some(AnalysisOutcome::Failure { message, .. }) => ResultsPanel::Error {
                    message: message.clone(),
                },
            }
        };

        Self {
            view: state.view(),
            preview: state.selected().map(|image| image.preview().to_string()),
            can_analyze: state.selected().is_some() && !state.in_flight(),
            panel,
        }
    }

    pub fn diagram(&self) -> Option<&DiagramReference> {
        match &self.panel {
            ResultsPanel::Report(report) => Some(&report.diagram),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.panel {
            ResultsPanel::Error { message } => Some(message),
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.panel == ResultsPanel::Progress
    }
}

pub fn render_markdown(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(source, options);
    let mut out = String::with_capacity(source.len() + source.len() / 2);
    html::push_html(&mut out, parser);
    out
}

/// Where an exported diagram ends up: a browser tab, a file on disk, ...
#[async_trait]
pub trait DiagramOpener: Send + Sync {
    async fn open(&self, diagram: &DiagramReference) -> anyhow::Result<()>;
}
