mod feedback;
mod handlers;
mod routes;

use anyhow::Context;
use axum::Router;
use feedback::{FeedbackProvider, OpenAiProvider};
use grader_common::config::JudgeConfig;
use grader_engine::{Grader, GraderOptions, Judge0Client, LanguageTable};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

pub struct AppState {
    pub grader: Grader,
    pub feedback: Option<Arc<dyn FeedbackProvider>>,
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new().merge(routes::routes()).with_state(state)
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    info!("Grader API booting...");

    let judge_config = JudgeConfig::from_env().context("Invalid Judge0 configuration")?;
    if judge_config.requires_api_key() && judge_config.api_key.is_none() {
        warn!("JUDGE0_API_KEY is not set; /execute will answer 500 until it is configured");
    }
    info!(url = %judge_config.base_url, base64 = judge_config.base64_encoded, "Judge0 endpoint");

    let languages = LanguageTable::load_default().context("Failed to load language table")?;
    info!("Enabled languages: {:?}", languages.list_languages());

    let concurrency = std::env::var("GRADER_CONCURRENCY")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(1);

    let backend = Judge0Client::new(judge_config, languages).context("Failed to build HTTP client")?;
    let grader = Grader::with_options(Arc::new(backend), GraderOptions { concurrency });

    let feedback = OpenAiProvider::from_env().map(|p| Arc::new(p) as Arc<dyn FeedbackProvider>);
    if feedback.is_none() {
        info!("OPENAI_API_KEY not set; feedback falls back to canned summaries");
    }

    let state = Arc::new(AppState { grader, feedback });

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app(state)).await.context("Server error")?;
    Ok(())
}
