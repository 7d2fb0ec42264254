/// Test Evaluator - Language-Agnostic Judging Logic
///
/// **Core Responsibility:**
/// Turn one execution outcome into one test result.
///
/// **Critical Properties:**
/// - Knows nothing about HTTP or the remote service
/// - Knows nothing about harness generation
/// - Pure function: (outcome, expected value) → test result
///
/// **Comparison Rules:**
/// - Deep structural equality on normalized values
/// - Sequences: order-sensitive, equal length
/// - Mappings: equal key sets, values compared per key
/// - Numbers compare by numeric value (`1` equals `1.0`)
/// - No other coercion: `"1"` never equals `1`

use crate::error::HarnessError;
use crate::harness::HARNESS_ERROR_KEY;
use crate::normalizer::normalize;
use grader_common::types::{ExecutionOutcome, TestCase, TestResult, TestStatus};
use serde_json::{Number, Value};

/// Deep structural equality between an actual and an expected value
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => false,
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    match (x.is_f64(), y.is_f64()) {
        (false, false) => match (x.as_i64(), y.as_i64()) {
            (Some(a), Some(b)) => a == b,
            _ => x.as_u64().is_some_and(|a| y.as_u64() == Some(a)),
        },
        (true, true) => x.as_f64() == y.as_f64(),
        (true, false) => x.as_f64().is_some_and(|f| float_equals_integer(f, y)),
        (false, true) => y.as_f64().is_some_and(|f| float_equals_integer(f, x)),
    }
}

/// Exact comparison; no rounding of the integer side through f64
fn float_equals_integer(f: f64, n: &Number) -> bool {
    // 2^63 and 2^64, both exact in f64
    const I64_END: f64 = 9_223_372_036_854_775_808.0;
    const U64_END: f64 = 18_446_744_073_709_551_616.0;

    if !f.is_finite() || f.fract() != 0.0 {
        return false;
    }
    if let Some(i) = n.as_i64() {
        f >= -I64_END && f < I64_END && f as i64 == i
    } else if let Some(u) = n.as_u64() {
        f >= 0.0 && f < U64_END && f as u64 == u
    } else {
        false
    }
}

/// Message carried by the in-band error object a function-style harness prints
fn harness_error(actual: &Value) -> Option<String> {
    let map = actual.as_object()?;
    if map.len() != 1 {
        return None;
    }
    map.get(HARNESS_ERROR_KEY).map(|message| match message {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

/// Prefer the `{"error": ...}` line a method-style harness writes to stderr
fn runtime_message(diagnostic: &str) -> String {
    diagnostic
        .lines()
        .rev()
        .find_map(|line| {
            serde_json::from_str::<Value>(line.trim())
                .ok()?
                .get("error")?
                .as_str()
                .map(str::to_string)
        })
        .unwrap_or_else(|| diagnostic.to_string())
}

fn failed(test_number: usize, test_case: &TestCase, status: TestStatus, diagnostic: String) -> TestResult {
    TestResult {
        passed: false,
        expected: test_case.output.clone(),
        actual: Value::String(diagnostic),
        test_case: test_number,
        status,
        time: None,
        memory: None,
    }
}

/// Evaluate a single test case execution outcome
///
/// ## Arguments
/// * `test_number` - 1-based position of the test case in the request
/// * `test_case` - Expected test case definition
/// * `outcome` - Classified outcome from the dispatcher
pub fn evaluate_test(test_number: usize, test_case: &TestCase, outcome: ExecutionOutcome) -> TestResult {
    match outcome {
        ExecutionOutcome::Accepted(run) => {
            let actual = normalize(&run.stdout);
            if let Some(message) = harness_error(&actual) {
                return evaluate_test(test_number, test_case, ExecutionOutcome::RuntimeError(message));
            }
            let passed = values_equal(&actual, &test_case.output);
            TestResult {
                passed,
                expected: test_case.output.clone(),
                actual,
                test_case: test_number,
                status: if passed {
                    TestStatus::Passed
                } else {
                    TestStatus::WrongAnswer
                },
                time: run.time,
                memory: run.memory,
            }
        }
        ExecutionOutcome::CompileError(diagnostic) => failed(
            test_number,
            test_case,
            TestStatus::CompileError,
            format!("Compilation error: {}", diagnostic),
        ),
        ExecutionOutcome::RuntimeError(diagnostic) => failed(
            test_number,
            test_case,
            TestStatus::RuntimeError,
            format!("Runtime error: {}", runtime_message(&diagnostic)),
        ),
        ExecutionOutcome::TimeExceeded => failed(
            test_number,
            test_case,
            TestStatus::TimeLimitExceeded,
            "Time Limit Exceeded".to_string(),
        ),
        ExecutionOutcome::OtherFailure(description) => failed(
            test_number,
            test_case,
            TestStatus::OtherFailure,
            format!("Error: {}", description),
        ),
    }
}

/// Failed result for a test case whose harness could not be generated
pub fn harness_failure(test_number: usize, test_case: &TestCase, error: &HarnessError) -> TestResult {
    failed(
        test_number,
        test_case,
        TestStatus::HarnessError,
        format!("Error: {}", error),
    )
}
