// CLI commands for grading submissions locally
use anyhow::{bail, Context, Result};
use grader_common::config::JudgeConfig;
use grader_common::types::{Language, ProblemSignature, TestCase};
use grader_engine::{harness, signature, Grader, GraderOptions, Judge0Client, LanguageTable};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Accepts either a bare array or the `/execute` request shape
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TestFile {
    Cases(Vec<TestCase>),
    #[serde(rename_all = "camelCase")]
    Request { test_cases: Vec<TestCase> },
}

fn load_test_cases(path: &Path) -> Result<Vec<TestCase>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_test_cases(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn parse_test_cases(content: &str) -> Result<Vec<TestCase>> {
    let file: TestFile = serde_json::from_str(content)?;
    Ok(match file {
        TestFile::Cases(cases) => cases,
        TestFile::Request { test_cases } => test_cases,
    })
}

fn parse_signature(signature: Option<&str>) -> Result<Option<ProblemSignature>> {
    Ok(signature.map(str::parse::<ProblemSignature>).transpose()?)
}

/// Grade a submission through Judge0; returns whether every case passed
pub async fn grade(
    file: &Path,
    language: &str,
    tests: &Path,
    signature: Option<&str>,
    concurrency: usize,
) -> Result<bool> {
    let language: Language = language.parse()?;
    let signature = parse_signature(signature)?;
    let source = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let test_cases = load_test_cases(tests)?;

    let config = JudgeConfig::from_env().context("Invalid Judge0 configuration")?;
    let languages = LanguageTable::load_default()?;
    let backend = Judge0Client::new(config, languages)?;
    let grader = Grader::with_options(Arc::new(backend), GraderOptions { concurrency });

    eprintln!("🚀 Grading {} ({} test cases)...", file.display(), test_cases.len());
    let report = grader.run(&source, language, signature, &test_cases).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    if report.all_passed() {
        eprintln!("✅ {}/{} passed", report.passed, report.total);
    } else {
        eprintln!("❌ {}/{} passed", report.passed, report.total);
    }
    Ok(report.all_passed())
}

/// Print the program that would be submitted for one test case
pub fn print_harness(
    file: &Path,
    language: &str,
    tests: &Path,
    index: usize,
    signature: Option<&str>,
) -> Result<()> {
    let language: Language = language.parse()?;
    let source = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let test_cases = load_test_cases(tests)?;
    let Some(test_case) = test_cases.get(index) else {
        bail!("Test case {} out of range ({} available)", index, test_cases.len());
    };

    let signature = signature::resolve(parse_signature(signature)?, &source, &test_cases)?;
    let program = harness::generate(&source, language, signature, &test_case.input)?;
    println!("{}", program);
    Ok(())
}
