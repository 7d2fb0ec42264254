mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "grader-cli")]
#[command(about = "Grader CLI - Grade submissions and inspect generated harnesses", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a source file against a JSON list of test cases
    Grade {
        /// Path to the solution source file
        #[arg(short, long)]
        file: PathBuf,

        /// Language tag (javascript, python, java)
        #[arg(short, long)]
        language: String,

        /// Path to the test cases JSON
        #[arg(short, long)]
        tests: PathBuf,

        /// Problem signature (e.g., two-sum); inferred when omitted
        #[arg(short, long)]
        signature: Option<String>,

        /// Test cases dispatched in parallel
        #[arg(short, long, default_value = "1")]
        concurrency: usize,
    },

    /// Print the harness program generated for one test case
    Harness {
        /// Path to the solution source file
        #[arg(short, long)]
        file: PathBuf,

        /// Language tag (javascript, python, java)
        #[arg(short, long)]
        language: String,

        /// Path to the test cases JSON
        #[arg(short, long)]
        tests: PathBuf,

        /// Zero-based test case index
        #[arg(short, long, default_value = "0")]
        index: usize,

        /// Problem signature (e.g., two-sum); inferred when omitted
        #[arg(short, long)]
        signature: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Grade {
            file,
            language,
            tests,
            signature,
            concurrency,
        } => {
            let all_passed =
                commands::grade(&file, &language, &tests, signature.as_deref(), concurrency).await?;
            if !all_passed {
                std::process::exit(1);
            }
        }
        Commands::Harness {
            file,
            language,
            tests,
            index,
            signature,
        } => {
            commands::print_harness(&file, &language, &tests, index, signature.as_deref())?;
        }
    }

    Ok(())
}
