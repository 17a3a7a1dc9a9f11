use shared::domain::{ImageId, RequestId, View};

use crate::{intake::SelectedImage, outcome::AnalysisOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRequest {
    pub request_id: RequestId,
    pub image_id: ImageId,
    pub cancelled: bool,
}

/// Everything the workflow controller owns. Observers only ever see clones.
#[derive(Debug, Clone, Default)]
pub struct WorkflowState {
    pub(crate) selected: Option<SelectedImage>,
    pub(crate) in_flight: bool,
    pub(crate) outcome: Option<AnalysisOutcome>,
    pub(crate) view: View,
    pub(crate) pending: Option<PendingRequest>,
}

impl WorkflowState {
    pub fn selected(&self) -> Option<&SelectedImage> {
        self.selected.as_ref()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn outcome(&self) -> Option<&AnalysisOutcome> {
        self.outcome.as_ref()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn pending(&self) -> Option<&PendingRequest> {
        self.pending.as_ref()
    }

    pub(crate) fn cancel_pending(&mut self) -> Option<RequestId> {
        let pending = self.pending.as_mut().filter(|pending| !pending.cancelled)?;
        pending.cancelled = true;
        Some(pending.request_id)
    }

    /// Claims the pending request if it is still the live one for the current
    /// selection. Clears `in_flight` either way.
    pub(crate) fn finish_pending(&mut self, request_id: RequestId) -> bool {
        self.in_flight = false;
        let Some(pending) = self.pending.take() else {
            return false;
        };
        let still_selected = self.selected.as_ref().map(SelectedImage::id) == Some(pending.image_id);
        pending.request_id == request_id && !pending.cancelled && still_selected
    }
}
