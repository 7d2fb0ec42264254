/// Execution Dispatcher - Remote Code Execution
///
/// **Core Responsibility:**
/// Submit one harness program to the Judge0 service and classify the reply.
///
/// **Critical Architectural Boundary:**
/// - Dispatcher knows HOW to reach the service (URL, headers, encoding)
/// - Dispatcher does NOT know what the program prints or what is expected
/// - Infrastructure failures surface as `TransportError`, never as an outcome
///
/// **Status Mapping (Judge0 status ids):**
/// - 3 → Accepted(stdout)
/// - 5 → TimeExceeded
/// - 6 → CompileError(compile_output)
/// - 11, 12 → RuntimeError(stderr or message)
/// - anything else → OtherFailure(description)

use crate::config::LanguageTable;
use crate::error::{GradeError, TransportError};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use grader_common::config::JudgeConfig;
use grader_common::types::{ExecutionOutcome, Language, RunOutput};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

pub const STATUS_ACCEPTED: u32 = 3;
pub const STATUS_TIME_LIMIT_EXCEEDED: u32 = 5;
pub const STATUS_COMPILATION_ERROR: u32 = 6;
pub const STATUS_RUNTIME_ERROR_NZEC: u32 = 11;
pub const STATUS_RUNTIME_ERROR_OTHER: u32 = 12;

/// Seam between the aggregator and whatever actually runs the code
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Whether a remote identifier is configured for the language
    fn supports(&self, language: Language) -> bool;

    /// Checked once per request, before any test case is processed
    fn ensure_configured(&self) -> Result<(), GradeError> {
        Ok(())
    }

    async fn dispatch(
        &self,
        program: &str,
        language: Language,
    ) -> Result<ExecutionOutcome, GradeError>;
}

#[derive(Debug, Serialize)]
struct SubmissionRequest<'a> {
    language_id: u32,
    source_code: String,
    stdin: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionStatus {
    pub id: u32,
    #[serde(default)]
    pub description: String,
}

/// Completed submission as returned by `wait=true`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionResult {
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub compile_output: Option<String>,
    pub message: Option<String>,
    pub status: SubmissionStatus,
    pub time: Option<String>,
    pub memory: Option<u64>,
}

impl SubmissionResult {
    /// Decode the text fields of a `base64_encoded=true` reply in place
    fn decode_base64(&mut self) -> Result<(), TransportError> {
        for field in [
            &mut self.stdout,
            &mut self.stderr,
            &mut self.compile_output,
            &mut self.message,
        ] {
            if let Some(encoded) = field.take() {
                *field = Some(decode_field(&encoded)?);
            }
        }
        Ok(())
    }
}

fn decode_field(encoded: &str) -> Result<String, TransportError> {
    // Judge0 wraps encoded output at 60 columns
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| TransportError::Decode(format!("invalid base64 field: {}", e)))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn non_empty(text: &Option<String>) -> Option<&str> {
    text.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Map a completed submission onto exactly one outcome
pub fn classify(result: SubmissionResult) -> ExecutionOutcome {
    match result.status.id {
        STATUS_ACCEPTED => ExecutionOutcome::Accepted(RunOutput {
            stdout: result.stdout.unwrap_or_default(),
            time: result.time,
            memory: result.memory,
        }),
        STATUS_COMPILATION_ERROR => ExecutionOutcome::CompileError(
            non_empty(&result.compile_output)
                .or_else(|| non_empty(&result.stderr))
                .unwrap_or("Unknown compilation error")
                .to_string(),
        ),
        STATUS_TIME_LIMIT_EXCEEDED => ExecutionOutcome::TimeExceeded,
        STATUS_RUNTIME_ERROR_NZEC | STATUS_RUNTIME_ERROR_OTHER => ExecutionOutcome::RuntimeError(
            non_empty(&result.stderr)
                .or_else(|| non_empty(&result.message))
                .unwrap_or("Unknown runtime error")
                .to_string(),
        ),
        _ => {
            let description = if result.status.description.trim().is_empty() {
                format!("status {}", result.status.id)
            } else {
                result.status.description.clone()
            };
            ExecutionOutcome::OtherFailure(description)
        }
    }
}

/// HTTP client for a Judge0 instance using the synchronous `wait=true` mode
#[derive(Debug, Clone)]
pub struct Judge0Client {
    http: reqwest::Client,
    config: JudgeConfig,
    languages: LanguageTable,
}

impl Judge0Client {
    pub fn new(config: JudgeConfig, languages: LanguageTable) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            http,
            config,
            languages,
        })
    }

    fn check_credentials(&self) -> Result<(), TransportError> {
        if self.config.requires_api_key() && self.config.api_key.is_none() {
            return Err(TransportError::MissingCredentials);
        }
        Ok(())
    }

    fn submissions_url(&self) -> String {
        format!(
            "{}/submissions?base64_encoded={}&wait=true",
            self.config.base_url, self.config.base64_encoded
        )
    }

    async fn submit(
        &self,
        program: &str,
        language_id: u32,
    ) -> Result<SubmissionResult, TransportError> {
        self.check_credentials()?;

        let source_code = if self.config.base64_encoded {
            general_purpose::STANDARD.encode(program)
        } else {
            program.to_string()
        };
        let body = SubmissionRequest {
            language_id,
            source_code,
            stdin: "",
        };

        let mut request = self.http.post(self.submissions_url()).json(&body);
        if let Some(key) = &self.config.api_key {
            request = if self.config.requires_api_key() {
                request
                    .header("X-RapidAPI-Key", key)
                    .header("X-RapidAPI-Host", self.config.rapidapi_host())
            } else {
                request.header("X-Auth-Token", key)
            };
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let mut result: SubmissionResult =
            serde_json::from_str(&text).map_err(|e| TransportError::Decode(e.to_string()))?;
        if self.config.base64_encoded {
            result.decode_base64()?;
        }
        Ok(result)
    }
}

#[async_trait]
impl ExecutionBackend for Judge0Client {
    fn supports(&self, language: Language) -> bool {
        self.languages.is_enabled(language)
    }

    fn ensure_configured(&self) -> Result<(), GradeError> {
        self.check_credentials().map_err(|e| {
            error!(error = %e, "Judge0 is not configured");
            e.into()
        })
    }

    #[tracing::instrument(skip(self, program), fields(language = %language, program_bytes = program.len()))]
    async fn dispatch(
        &self,
        program: &str,
        language: Language,
    ) -> Result<ExecutionOutcome, GradeError> {
        let language_id = self
            .languages
            .language_id(language)
            .ok_or_else(|| GradeError::unsupported(language))?;

        debug!(language_id, "Submitting harness to Judge0");
        let result = self.submit(program, language_id).await.map_err(|e| {
            error!(error = %e, "Judge0 transport failure");
            e
        })?;

        info!(
            status_id = result.status.id,
            status = %result.status.description,
            time = result.time.as_deref().unwrap_or(""),
            "Judge0 submission completed"
        );
        Ok(classify(result))
    }
}
