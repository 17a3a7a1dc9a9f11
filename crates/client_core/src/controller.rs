use std::{path::Path, sync::Arc, time::Instant};

use shared::{
    domain::{ImageId, IntakeSource, RequestId, View},
    error::AnalysisFailure,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    events::WorkflowEvent,
    intake::{
        screen, ImageBlob, IntakeDisposition, IntakeError, PreviewData, PreviewLocator,
        PreviewRegistry, SelectedImage,
    },
    navigation::{next_view, NavigationAction, NavigationError},
    outcome::AnalysisOutcome,
    presentation::{DiagramOpener, Presentation},
    service::{AnalysisService, ServiceEndpoint},
    state::{PendingRequest, WorkflowState},
};

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyzeDisposition {
    NoImage,
    AlreadyInFlight,
    Completed(AnalysisOutcome),
    /// The selection changed while the request ran; its response was dropped.
    Superseded,
}

struct WorkflowInner {
    state: WorkflowState,
    previews: PreviewRegistry,
}

pub struct WorkflowController {
    service: Arc<dyn AnalysisService>,
    endpoint: ServiceEndpoint,
    inner: Mutex<WorkflowInner>,
    events: broadcast::Sender<WorkflowEvent>,
}

impl WorkflowController {
    pub fn new(service: Arc<dyn AnalysisService>, endpoint: ServiceEndpoint) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Arc::new(Self {
            service,
            endpoint,
            inner: Mutex::new(WorkflowInner {
                state: WorkflowState::default(),
                previews: PreviewRegistry::default(),
            }),
            events,
        })
    }

    pub fn endpoint(&self) -> &ServiceEndpoint {
        &self.endpoint
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> WorkflowState {
        self.inner.lock().await.state.clone()
    }

    pub async fn presentation(&self) -> Presentation {
        let inner = self.inner.lock().await;
        Presentation::project(&inner.state, &self.endpoint)
    }

    pub async fn resolve_preview(&self, locator: &PreviewLocator) -> Option<PreviewData> {
        self.inner.lock().await.previews.resolve(locator)
    }

    pub async fn live_previews(&self) -> usize {
        self.inner.lock().await.previews.live_count()
    }

    /// Takes a new image. Rejected input leaves the state untouched; accepted
    /// input replaces the previous image and forgets any result for it.
    pub async fn select_image(
        &self,
        blob: Option<ImageBlob>,
        source: IntakeSource,
    ) -> IntakeDisposition {
        let blob = match screen(blob, source) {
            Ok(blob) => blob,
            Err(reason) => {
                debug!(?reason, ?source, "ignoring image selection");
                self.emit(WorkflowEvent::SelectionIgnored(reason));
                return IntakeDisposition::Ignored(reason);
            }
        };

        let mut inner = self.inner.lock().await;
        let WorkflowInner { state, previews } = &mut *inner;

        let image = SelectedImage::new(blob, previews);
        let image_id = image.id();
        let preview = image.preview();
        if let Some(previous) = state.selected.replace(image) {
            previews.release(&previous.preview());
        }
        state.outcome = None;
        if let Some(request_id) = state.cancel_pending() {
            debug!(%request_id, "selection changed while a request is outstanding");
        }

        info!(%image_id, source = ?source, "image selected");
        self.emit(WorkflowEvent::ImageSelected { image_id, preview });
        IntakeDisposition::Selected(image_id)
    }

    pub async fn select_image_file(&self, path: &Path) -> Result<IntakeDisposition, IntakeError> {
        let blob = ImageBlob::from_path(path).await?;
        Ok(self.select_image(Some(blob), IntakeSource::Picker).await)
    }

    /// Uploads the current image and records the outcome. The request runs on
    /// its own task, so dropping the returned future does not strand
    /// `in_flight`; the outcome is still recorded when the response arrives.
    pub async fn analyze(self: &Arc<Self>) -> AnalyzeDisposition {
        let (request_id, image_id, upload) = {
            let mut inner = self.inner.lock().await;
            let state = &mut inner.state;
            let Some(image) = state.selected.as_ref() else {
                debug!("analyze requested without a selected image");
                return AnalyzeDisposition::NoImage;
            };
            if state.in_flight {
                debug!("analyze requested while a request is outstanding");
                return AnalyzeDisposition::AlreadyInFlight;
            }

            let request_id = RequestId::new();
            let image_id = image.id();
            let upload = image.to_upload();
            state.in_flight = true;
            state.outcome = None;
            state.pending = Some(PendingRequest {
                request_id,
                image_id,
                cancelled: false,
            });
            self.emit(WorkflowEvent::AnalysisStarted {
                request_id,
                image_id,
            });
            (request_id, image_id, upload)
        };

        info!(%request_id, %image_id, size = upload.bytes.len(), "analysis started");
        let task = tokio::spawn({
            let controller = Arc::clone(self);
            async move {
                let started = Instant::now();
                let result = controller.service.upload_image(upload).await;
                let elapsed_ms = started.elapsed().as_millis() as u64;
                if let Err(err) = &result {
                    warn!(%request_id, elapsed_ms, "analysis request failed: {err}");
                }
                let outcome = AnalysisOutcome::from_service_result(result);
                controller
                    .finish_request(request_id, image_id, outcome, elapsed_ms)
                    .await
            }
        });

        match task.await {
            Ok(disposition) => disposition,
            Err(err) => {
                warn!(%request_id, "analysis task ended abnormally: {err}");
                let outcome = AnalysisOutcome::from(AnalysisFailure::transport(None));
                self.finish_request(request_id, image_id, outcome, 0).await
            }
        }
    }

    async fn finish_request(
        &self,
        request_id: RequestId,
        image_id: ImageId,
        outcome: AnalysisOutcome,
        elapsed_ms: u64,
    ) -> AnalyzeDisposition {
        let mut inner = self.inner.lock().await;
        let state = &mut inner.state;
        if !state.finish_pending(request_id) {
            debug!(%request_id, %image_id, "discarding response for a superseded image");
            self.emit(WorkflowEvent::AnalysisDiscarded {
                request_id,
                image_id,
            });
            return AnalyzeDisposition::Superseded;
        }

        state.outcome = Some(outcome.clone());
        if outcome.is_success() {
            let previous = state.view;
            if let Ok(view) = next_view(previous, NavigationAction::AnalysisSucceeded) {
                state.view = view;
                if view != previous {
                    self.emit(WorkflowEvent::ViewChanged(view));
                }
            }
        }
        info!(
            %request_id,
            elapsed_ms,
            success = outcome.is_success(),
            "analysis finished"
        );
        self.emit(WorkflowEvent::AnalysisCompleted {
            request_id,
            outcome: outcome.clone(),
        });
        AnalyzeDisposition::Completed(outcome)
    }

    pub async fn go_back(&self) -> Result<View, NavigationError> {
        let mut inner = self.inner.lock().await;
        let view = next_view(inner.state.view, NavigationAction::GoBack)?;
        inner.state.view = view;
        self.emit(WorkflowEvent::ViewChanged(view));
        Ok(view)
    }

    pub async fn upload_new_image(&self) -> Result<View, NavigationError> {
        let mut inner = self.inner.lock().await;
        let WorkflowInner { state, previews } = &mut *inner;
        let view = next_view(state.view, NavigationAction::UploadNewImage)?;

        if let Some(previous) = state.selected.take() {
            previews.release(&previous.preview());
        }
        state.outcome = None;
        state.cancel_pending();
        state.view = view;

        self.emit(WorkflowEvent::SelectionCleared);
        self.emit(WorkflowEvent::ViewChanged(view));
        Ok(view)
    }

    /// Hands the current diagram locator to `opener`. Returns false when there
    /// is no diagram to export.
    pub async fn export_diagram(&self, opener: &dyn DiagramOpener) -> anyhow::Result<bool> {
        let presentation = self.presentation().await;
        let Some(diagram) = presentation.diagram() else {
            return Ok(false);
        };
        opener.open(diagram).await?;
        Ok(true)
    }

    fn emit(&self, event: WorkflowEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
