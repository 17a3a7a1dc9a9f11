use std::fmt;

use shared::domain::View;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationAction {
    AnalysisSucceeded,
    GoBack,
    UploadNewImage,
}

impl fmt::Display for NavigationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AnalysisSucceeded => "show analysis results",
            Self::GoBack => "go back",
            Self::UploadNewImage => "upload a new image",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("cannot {action} from the {from:?} view")]
    InvalidTransition { from: View, action: NavigationAction },
}

/// The complete transition table. A successful analysis always lands on the
/// results view; leaving it is only possible from there.
pub fn next_view(from: View, action: NavigationAction) -> Result<View, NavigationError> {
    match (from, action) {
        (_, NavigationAction::AnalysisSucceeded) => Ok(View::Results),
        (View::Results, NavigationAction::GoBack | NavigationAction::UploadNewImage) => {
            Ok(View::Intake)
        }
        (View::Intake, action) => Err(NavigationError::InvalidTransition { from, action }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_view_is_left_by_back_or_reset() {
        assert_eq!(
            next_view(View::Results, NavigationAction::GoBack),
            Ok(View::Intake)
        );
        assert_eq!(
            next_view(View::Results, NavigationAction::UploadNewImage),
            Ok(View::Intake)
        );
    }

    #[test]
    fn success_enters_results() {
        assert_eq!(
            next_view(View::Intake, NavigationAction::AnalysisSucceeded),
            Ok(View::Results)
        );
        assert_eq!(
            next_view(View::Results, NavigationAction::AnalysisSucceeded),
            Ok(View::Results)
        );
    }

    #[test]
    fn intake_cannot_navigate_to_itself() {
        let err = next_view(View::Intake, NavigationAction::GoBack).expect_err("invalid");
        assert_eq!(err.to_string(), "cannot go back from the Intake view");
        assert!(next_view(View::Intake, NavigationAction::UploadNewImage).is_err());
    }
}
