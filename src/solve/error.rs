use std::fmt;

/// Recoverable failures of a solve round trip. None of these touch session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    /// The request could not be sent or the response could not be read.
    Network(String),
    /// The service answered with a non-success status.
    Service { status: u16, message: String },
    /// The response body is not the expected result list.
    MalformedResponse(String),
    /// Solve was triggered on a surface with no drawn content.
    EmptyCanvas,
    /// The surface could not be encoded for upload.
    Snapshot(String),
    /// No usable service endpoint is configured.
    Config(String),
}

impl SolveError {
    /// Short text suitable for a user-facing notice.
    pub fn user_message(&self) -> String {
        match self {
            SolveError::Network(_) => "Could not reach the solver. Check your connection and try again.".into(),
            SolveError::Service { status, .. } => format!("The solver reported an error (status {status})."),
            SolveError::MalformedResponse(_) => "The solver sent a response that could not be read.".into(),
            SolveError::EmptyCanvas => "Draw something before solving.".into(),
            SolveError::Snapshot(_) => "The drawing could not be captured.".into(),
            SolveError::Config(_) => "No solver endpoint is configured.".into(),
        }
    }
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::Network(detail) => write!(f, "network error: {detail}"),
            SolveError::Service { status, message } => {
                write!(f, "service error (status {status}): {message}")
            }
            SolveError::MalformedResponse(detail) => write!(f, "malformed response: {detail}"),
            SolveError::EmptyCanvas => write!(f, "canvas is empty"),
            SolveError::Snapshot(detail) => write!(f, "snapshot failed: {detail}"),
            SolveError::Config(detail) => write!(f, "configuration error: {detail}"),
        }
    }
}

impl std::error::Error for SolveError {}
