/// Result Aggregator - Per-Submission Orchestration
///
/// **Responsibility:**
/// Drive harness generation, dispatch and evaluation over every test case of
/// one submission and assemble the ordered grading report.
///
/// **Architecture:**
/// 1. Generate a harness for the test case (harness/)
/// 2. Dispatch it to the execution backend (engine.rs)
/// 3. Normalize and compare the output (normalizer.rs, evaluator.rs)
///
/// A harness rejection fails only its own test case. A transport failure
/// aborts the whole request: no partial report is returned.

use crate::engine::ExecutionBackend;
use crate::error::GradeError;
use crate::evaluator::{evaluate_test, harness_failure};
use crate::harness;
use crate::signature;
use futures_util::stream::{self, StreamExt, TryStreamExt};
use grader_common::types::{
    GradingReport, Language, ProblemSignature, TestCase, TestResult, TestStatus,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraderOptions {
    /// Test cases dispatched at once; 1 keeps dispatch strictly sequential
    pub concurrency: usize,
}

impl Default for GraderOptions {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

#[derive(Clone)]
pub struct Grader {
    backend: Arc<dyn ExecutionBackend>,
    options: GraderOptions,
}

impl Grader {
    pub fn new(backend: Arc<dyn ExecutionBackend>) -> Self {
        Self::with_options(backend, GraderOptions::default())
    }

    pub fn with_options(backend: Arc<dyn ExecutionBackend>, options: GraderOptions) -> Self {
        Self { backend, options }
    }

    pub fn supports(&self, language: Language) -> bool {
        self.backend.supports(language)
    }

    /// Grade a submission against every test case, in order
    ///
    /// ## Returns
    /// A report with exactly one result per test case, where
    /// `results[i].test_case == i + 1`
    pub async fn run(
        &self,
        source_code: &str,
        language: Language,
        signature: Option<ProblemSignature>,
        test_cases: &[TestCase],
    ) -> Result<GradingReport, GradeError> {
        if !self.backend.supports(language) {
            return Err(GradeError::unsupported(language));
        }
        self.backend.ensure_configured()?;
        if test_cases.is_empty() {
            return Ok(GradingReport::default());
        }
        let signature = signature::resolve(signature, source_code, test_cases)?;

        let submission_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "grade",
            submission_id = %submission_id,
            language = %language,
            signature = %signature,
        );

        async {
            let start = Instant::now();
            info!(test_cases = test_cases.len(), "Grading submission");

            // `buffered` yields in submission order regardless of completion order
            let cases: Vec<_> = test_cases
                .iter()
                .enumerate()
                .map(|(index, test_case)| {
                    self.grade_case(index + 1, source_code, language, signature, test_case)
                })
                .collect();
            let results: Vec<TestResult> = stream::iter(cases)
                .buffered(self.options.concurrency.max(1))
                .try_collect()
                .await?;

            let report = GradingReport::new(results);
            info!(
                passed = report.passed,
                total = report.total,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Grading completed"
            );
            Ok::<_, GradeError>(report)
        }
        .instrument(span)
        .await
    }

    async fn grade_case(
        &self,
        test_number: usize,
        source_code: &str,
        language: Language,
        signature: ProblemSignature,
        test_case: &TestCase,
    ) -> Result<TestResult, GradeError> {
        let program = match harness::generate(source_code, language, signature, &test_case.input) {
            Ok(program) => program,
            Err(e) => {
                warn!(test_case = test_number, error = %e, "Harness generation failed");
                return Ok(harness_failure(test_number, test_case, &e));
            }
        };

        let outcome = self.backend.dispatch(&program, language).await?;
        let result = evaluate_test(test_number, test_case, outcome);

        if result.status == TestStatus::Passed {
            debug!(test_case = test_number, "Test passed");
        } else {
            debug!(
                test_case = test_number,
                status = ?result.status,
                expected = %result.expected,
                actual = %result.actual,
                "Test failed"
            );
        }
        Ok(result)
    }
}
