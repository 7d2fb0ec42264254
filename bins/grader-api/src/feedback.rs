// Coaching feedback via an OpenAI-compatible chat completion endpoint

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

pub const FALLBACK_FEEDBACK: &str =
    "Unable to generate feedback at this time. Review your failing test cases and try again.";

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[async_trait]
pub trait FeedbackProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;
}

#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            api_base: DEFAULT_API_BASE.to_string(),
            model,
        }
    }

    pub fn with_api_base(mut self, api_base: String) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    /// `None` when `OPENAI_API_KEY` is unset or blank
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())?;
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let provider = Self::new(api_key, model);
        Some(match std::env::var("OPENAI_API_BASE") {
            Ok(base) if !base.trim().is_empty() => provider.with_api_base(base),
            _ => provider,
        })
    }
}

#[async_trait]
impl FeedbackProvider for OpenAiProvider {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let url = format!("{}/chat/completions", self.api_base);
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": "You are a concise, encouraging programming coach."},
                {"role": "user", "content": prompt}
            ],
            "max_tokens": 500,
            "temperature": 0.7
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Feedback request failed")?;

        let status = response.status();
        let text = response.text().await.context("Failed to read feedback response")?;
        debug!(%status, "Feedback provider responded");

        if !status.is_success() {
            return Err(anyhow!("Feedback API returned {}: {}", status, text));
        }

        let parsed: Value = serde_json::from_str(&text).context("Feedback response is not JSON")?;
        parsed["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("Feedback response had no content"))
    }
}

#[derive(Debug, Deserialize)]
pub struct TestOutcome {
    #[serde(default)]
    pub passed: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub test_results: Vec<TestOutcome>,
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl FeedbackRequest {
    pub fn passed(&self) -> usize {
        self.test_results.iter().filter(|r| r.passed).count()
    }

    pub fn total(&self) -> usize {
        self.test_results.len()
    }
}

pub fn build_prompt(request: &FeedbackRequest) -> String {
    let mut prompt = format!(
        "A student submitted the following {} solution. It passed {}/{} test cases.\n\n```{}\n{}\n```\n\n",
        request.language,
        request.passed(),
        request.total(),
        request.language,
        request.code
    );
    if !request.patterns.is_empty() {
        prompt.push_str(&format!(
            "The intended solution patterns are: {}.\n",
            request.patterns.join(", ")
        ));
    }
    prompt.push_str(
        "Give brief feedback on correctness, time complexity and code style. \
         Point toward the fix without writing the full solution.",
    );
    prompt
}

pub fn canned_feedback(passed: usize, total: usize) -> String {
    if total == 0 {
        return "No test results were provided, so there is nothing to review yet.".to_string();
    }
    if passed == total {
        format!(
            "All {}/{} test cases passed. Consider whether the time and space complexity can be improved.",
            passed, total
        )
    } else {
        format!(
            "{}/{} test cases passed. Compare the expected and actual output of the failing cases \
             and check edge cases such as empty inputs and boundary values.",
            passed, total
        )
    }
}

/// Ask the provider when one is configured; fall back to a canned summary otherwise
pub async fn generate(provider: Option<&dyn FeedbackProvider>, request: &FeedbackRequest) -> String {
    let Some(provider) = provider else {
        return canned_feedback(request.passed(), request.total());
    };

    match provider.complete(&build_prompt(request)).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Feedback provider failed, using canned summary");
            canned_feedback(request.passed(), request.total())
        }
    }
}
