use grader_common::types::Language;
use thiserror::Error;

/// Rejection raised while rendering a harness for one test case
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HarnessError {
    #[error("Test input must be an object, got {0}")]
    InputNotObject(String),
    #[error("Test input is missing argument '{0}'")]
    MissingArgument(String),
    #[error("Argument '{name}' must be {expected}, got {found}")]
    InvalidArgument {
        name: String,
        expected: &'static str,
        found: String,
    },
    #[error("Argument '{name}' value {value} does not fit a 32-bit int")]
    IntOutOfRange { name: String, value: String },
}

/// Infrastructure failure talking to the remote execution service
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Judge0 API not configured: set JUDGE0_API_KEY (and JUDGE0_HOST) or point JUDGE0_URL at a self-hosted instance")]
    MissingCredentials,
    #[error("Judge0 request failed: {0}")]
    Connection(#[from] reqwest::Error),
    #[error("Judge0 API request failed ({status}): {body}")]
    Status { status: u16, body: String },
    #[error("Judge0 response could not be decoded: {0}")]
    Decode(String),
}

/// Request-level failure: no grading report is produced
#[derive(Debug, Error)]
pub enum GradeError {
    #[error("Language {0} not supported")]
    UnsupportedLanguage(String),
    #[error("Could not determine which solution entry point to call: {0}")]
    UnresolvedSignature(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl GradeError {
    pub fn unsupported(language: Language) -> Self {
        GradeError::UnsupportedLanguage(language.to_string())
    }
}
