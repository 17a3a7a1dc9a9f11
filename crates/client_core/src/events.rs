use shared::domain::{ImageId, RequestId, View};

use crate::{
    intake::{IgnoreReason, PreviewLocator},
    outcome::AnalysisOutcome,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    ImageSelected {
        image_id: ImageId,
        preview: PreviewLocator,
    },
    SelectionIgnored(IgnoreReason),
    SelectionCleared,
    AnalysisStarted {
        request_id: RequestId,
        image_id: ImageId,
    },
    AnalysisCompleted {
        request_id: RequestId,
        outcome: AnalysisOutcome,
    },
    /// A response arrived for an image that is no longer selected.
    AnalysisDiscarded {
        request_id: RequestId,
        image_id: ImageId,
    },
    ViewChanged(View),
}
