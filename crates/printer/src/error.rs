use html::DomError;
use page_handler::WindowId;
use thiserror::Error;

/// Failures of a single print call.
///
/// Setup errors abort the call before anything is left attached to a
/// document. `NativePrintUnavailable` and `RootElementNotFound` are recovered
/// internally and only ever show up in logs.
#[derive(Debug, Error)]
pub enum PrintError {
    #[error("content is not printable: {reason}")]
    InvalidContentKind { reason: String },
    #[error("print window could not be opened (blocked by the host?)")]
    WindowOpenFailed,
    #[error("document-level print command unavailable on {window}, falling back to window print")]
    NativePrintUnavailable { window: WindowId },
    #[error("no element matches root selector `{selector}`")]
    RootElementNotFound { selector: String },
    #[error("a current-window print session is already active")]
    SessionAlreadyActive,
    #[error("{window} has no document (closed?)")]
    WindowClosed { window: WindowId },
    #[error("printing needs a running tokio runtime to schedule the print dialog")]
    RuntimeUnavailable,
    #[error(transparent)]
    Dom(#[from] DomError),
}

impl PrintError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidContentKind {
            reason: reason.into(),
        }
    }
}

/// Failures reported by a [`crate::ContentMaterializer`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MaterializeError {
    #[error("unknown template `{0}`")]
    UnknownTemplate(String),
    #[error("unknown component `{0}`")]
    UnknownComponent(String),
    #[error("`{0}` rendered no nodes")]
    Empty(String),
}

impl From<MaterializeError> for PrintError {
    fn from(err: MaterializeError) -> Self {
        Self::invalid(err.to_string())
    }
}
