pub mod controller;
pub mod events;
pub mod intake;
pub mod navigation;
pub mod outcome;
pub mod presentation;
pub mod service;
pub mod state;

pub use controller::{AnalyzeDisposition, WorkflowController};
pub use events::WorkflowEvent;
pub use intake::{
    IgnoreReason, ImageBlob, IntakeDisposition, IntakeError, PreviewData, PreviewLocator,
    SelectedImage,
};
pub use navigation::{NavigationAction, NavigationError};
pub use outcome::AnalysisOutcome;
pub use presentation::{
    render_markdown, AnalysisReport, DiagramOpener, DiagramReference, Presentation, ResultsPanel,
};
pub use service::{
    AnalysisService, HttpAnalysisService, ImageUpload, ServiceEndpoint, ServiceError,
};
pub use state::{PendingRequest, WorkflowState};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
