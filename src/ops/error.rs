use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpsError {
    #[error("Invalid manifest: {0}")]
    Validation(String),

    #[error("Manifest lists no files to remove")]
    EmptyJob,

    #[error("{count} file(s) listed in the manifest could not be found")]
    MissingFiles { count: usize, sample: Vec<String> },

    #[error("Invalid session state: {0}")]
    InvalidState(String),

    #[error("Review cycle finished; export or discard before continuing")]
    ExportPending,

    #[error("No trash strategies configured")]
    NoStrategies,

    #[error("Invalid settings: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type OpsResult<T> = Result<T, OpsError>;

/// What the UI shows in its blocking modal.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorMessage {
    pub title: String,
    pub message: String,
    pub suggestion: Option<String>,
    pub recoverable: bool,
}

impl OpsError {
    pub fn code(&self) -> &'static str {
        match self {
            OpsError::Validation(_) => "ERR_VALIDATION",
            OpsError::EmptyJob => "ERR_EMPTY_JOB",
            OpsError::MissingFiles { .. } => "ERR_MISSING_FILES",
            OpsError::InvalidState(_) => "ERR_STATE",
            OpsError::ExportPending => "ERR_EXPORT_PENDING",
            OpsError::NoStrategies => "ERR_NO_STRATEGIES",
            OpsError::Config(_) => "ERR_CONFIG",
            OpsError::Io(_) | OpsError::Json(_) | OpsError::Other(_) => "ERR_INTERNAL",
        }
    }

    pub fn to_user_message(&self) -> ErrorMessage {
        match self {
            OpsError::Validation(msg) => ErrorMessage {
                title: "Invalid Manifest".to_string(),
                message: format!("The selected manifest could not be used: {}", msg),
                suggestion: Some(
                    "Pick a manifest exported by this application.".to_string(),
                ),
                recoverable: true,
            },
            OpsError::EmptyJob => ErrorMessage {
                title: "Nothing To Do".to_string(),
                message: "The manifest does not list any files to remove.".to_string(),
                suggestion: None,
                recoverable: true,
            },
            OpsError::MissingFiles { count, sample } => {
                let mut message = format!(
                    "{} file(s) from the manifest no longer exist. No files were deleted.",
                    count
                );
                for path in sample {
                    message.push_str("\n  ");
                    message.push_str(path);
                }
                if *count > sample.len() {
                    message.push_str(&format!("\n  ... and {} more", count - sample.len()));
                }
                ErrorMessage {
                    title: "Missing Files".to_string(),
                    message,
                    suggestion: Some(
                        "The files may have been moved or deleted. Export a fresh manifest and try again."
                            .to_string(),
                    ),
                    recoverable: false,
                }
            }
            OpsError::InvalidState(msg) => ErrorMessage {
                title: "Not Available".to_string(),
                message: msg.clone(),
                suggestion: Some("Open a folder first.".to_string()),
                recoverable: true,
            },
            OpsError::ExportPending => ErrorMessage {
                title: "Review Finished".to_string(),
                message: "You have gone through every file in this folder.".to_string(),
                suggestion: Some(
                    "Export the marked files, discard the session, or keep reviewing."
                        .to_string(),
                ),
                recoverable: true,
            },
            OpsError::NoStrategies => ErrorMessage {
                title: "Delete Unavailable".to_string(),
                message: "No deletion method is configured.".to_string(),
                suggestion: Some("Try restarting the application.".to_string()),
                recoverable: false,
            },
            OpsError::Config(msg) => ErrorMessage {
                title: "Invalid Settings".to_string(),
                message: msg.clone(),
                suggestion: Some("Check the value and try again.".to_string()),
                recoverable: true,
            },
            OpsError::Io(err) => ErrorMessage {
                title: "File System Error".to_string(),
                message: format!("A file operation failed: {}", err),
                suggestion: Some("Check file permissions and try again.".to_string()),
                recoverable: true,
            },
            OpsError::Json(err) => ErrorMessage {
                title: "Unreadable Data".to_string(),
                message: format!("The data could not be read: {}", err),
                suggestion: None,
                recoverable: true,
            },
            OpsError::Other(err) => ErrorMessage {
                title: "Unexpected Error".to_string(),
                message: format!("{:#}", err),
                suggestion: Some("Try again or restart the application.".to_string()),
                recoverable: true,
            },
        }
    }
}

impl From<OpsError> for ErrorMessage {
    fn from(err: OpsError) -> Self {
        err.to_user_message()
    }
}

pub fn validation_error(msg: &str) -> OpsError {
    OpsError::Validation(msg.to_string())
}

pub fn invalid_state(msg: &str) -> OpsError {
    OpsError::InvalidState(msg.to_string())
}
