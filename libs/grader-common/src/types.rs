use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Target languages a submission can be graded in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    Python,
    Java,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::JavaScript, Language::Python, Language::Java];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Java => "java",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Language {0} not supported")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "javascript" => Ok(Language::JavaScript),
            "python" => Ok(Language::Python),
            "java" => Ok(Language::Java),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}

/// Solution entry point a problem expects the candidate to implement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProblemSignature {
    TwoSum,
    ValidParentheses,
    ContainsDuplicate,
    MaximumSubarray,
    LongestSubstring,
    ReverseLinkedList,
    MergeTwoSortedLists,
    MaximumDepthOfBinaryTree,
}

impl ProblemSignature {
    pub const ALL: [ProblemSignature; 8] = [
        ProblemSignature::TwoSum,
        ProblemSignature::ValidParentheses,
        ProblemSignature::ContainsDuplicate,
        ProblemSignature::MaximumSubarray,
        ProblemSignature::LongestSubstring,
        ProblemSignature::ReverseLinkedList,
        ProblemSignature::MergeTwoSortedLists,
        ProblemSignature::MaximumDepthOfBinaryTree,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ProblemSignature::TwoSum => "two-sum",
            ProblemSignature::ValidParentheses => "valid-parentheses",
            ProblemSignature::ContainsDuplicate => "contains-duplicate",
            ProblemSignature::MaximumSubarray => "maximum-subarray",
            ProblemSignature::LongestSubstring => "longest-substring",
            ProblemSignature::ReverseLinkedList => "reverse-linked-list",
            ProblemSignature::MergeTwoSortedLists => "merge-two-sorted-lists",
            ProblemSignature::MaximumDepthOfBinaryTree => "maximum-depth-of-binary-tree",
        }
    }
}

impl fmt::Display for ProblemSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown problem signature: {0}")]
pub struct UnknownSignature(pub String);

impl FromStr for ProblemSignature {
    type Err = UnknownSignature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProblemSignature::ALL
            .into_iter()
            .find(|sig| sig.id() == s.trim())
            .ok_or_else(|| UnknownSignature(s.to_string()))
    }
}

/// One input/output pair declared by the problem catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: Value,
    pub output: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Terminal outcome of one harness submission to the remote service
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Accepted(RunOutput),
    CompileError(String),
    RuntimeError(String),
    TimeExceeded,
    OtherFailure(String),
}

/// Console output and resource figures of a completed run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOutput {
    pub stdout: String,
    pub time: Option<String>,
    pub memory: Option<u64>,
}

impl RunOutput {
    pub fn from_stdout(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Passed,
    WrongAnswer,
    CompileError,
    RuntimeError,
    TimeLimitExceeded,
    HarnessError,
    OtherFailure,
}

/// Result of one test case, `test_case` is the 1-based position in the request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub passed: bool,
    pub expected: Value,
    pub actual: Value,
    pub test_case: usize,
    pub status: TestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradingReport {
    pub passed: usize,
    pub total: usize,
    pub results: Vec<TestResult>,
}

impl GradingReport {
    pub fn new(results: Vec<TestResult>) -> Self {
        Self {
            passed: results.iter().filter(|r| r.passed).count(),
            total: results.len(),
            results,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}
