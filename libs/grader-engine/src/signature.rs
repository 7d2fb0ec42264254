/// Problem Signature Registry
///
/// Maps each known problem to the entry point the candidate implements and the
/// typed shape of its arguments and result. Harness adapters read this table
/// instead of probing the submission for whichever function happens to exist.

use crate::error::GradeError;
use grader_common::types::{ProblemSignature, TestCase};
use serde_json::Value;

/// Wire shape of an argument or a return value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Int,
    IntArray,
    Str,
    Bool,
    /// Singly-linked list, encoded as a sequence of ints
    LinkedList,
    /// Level-order sequence with `null` holes
    BinaryTree,
}

impl ValueKind {
    pub fn describe(&self) -> &'static str {
        match self {
            ValueKind::Int => "an integer",
            ValueKind::IntArray => "an integer array",
            ValueKind::Str => "a string",
            ValueKind::Bool => "a boolean",
            ValueKind::LinkedList => "a linked list (integer array)",
            ValueKind::BinaryTree => "a binary tree (level-order array)",
        }
    }

    /// Sequence-shaped kinds render an empty literal when the input field is absent
    pub fn is_sequence(&self) -> bool {
        matches!(
            self,
            ValueKind::IntArray | ValueKind::LinkedList | ValueKind::BinaryTree
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub kind: ValueKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureSpec {
    pub signature: ProblemSignature,
    pub entry_point: &'static str,
    pub params: &'static [Param],
    pub returns: ValueKind,
}

const fn param(name: &'static str, kind: ValueKind) -> Param {
    Param { name, kind }
}

static REGISTRY: [SignatureSpec; 8] = [
    SignatureSpec {
        signature: ProblemSignature::TwoSum,
        entry_point: "twoSum",
        params: &[param("nums", ValueKind::IntArray), param("target", ValueKind::Int)],
        returns: ValueKind::IntArray,
    },
    SignatureSpec {
        signature: ProblemSignature::ValidParentheses,
        entry_point: "isValid",
        params: &[param("s", ValueKind::Str)],
        returns: ValueKind::Bool,
    },
    SignatureSpec {
        signature: ProblemSignature::ContainsDuplicate,
        entry_point: "containsDuplicate",
        params: &[param("nums", ValueKind::IntArray)],
        returns: ValueKind::Bool,
    },
    SignatureSpec {
        signature: ProblemSignature::MaximumSubarray,
        entry_point: "maxSubArray",
        params: &[param("nums", ValueKind::IntArray)],
        returns: ValueKind::Int,
    },
    SignatureSpec {
        signature: ProblemSignature::LongestSubstring,
        entry_point: "lengthOfLongestSubstring",
        params: &[param("s", ValueKind::Str)],
        returns: ValueKind::Int,
    },
    SignatureSpec {
        signature: ProblemSignature::ReverseLinkedList,
        entry_point: "reverseList",
        params: &[param("head", ValueKind::LinkedList)],
        returns: ValueKind::LinkedList,
    },
    SignatureSpec {
        signature: ProblemSignature::MergeTwoSortedLists,
        entry_point: "mergeTwoLists",
        params: &[
            param("list1", ValueKind::LinkedList),
            param("list2", ValueKind::LinkedList),
        ],
        returns: ValueKind::LinkedList,
    },
    SignatureSpec {
        signature: ProblemSignature::MaximumDepthOfBinaryTree,
        entry_point: "maxDepth",
        params: &[param("root", ValueKind::BinaryTree)],
        returns: ValueKind::Int,
    },
];

pub fn spec(signature: ProblemSignature) -> &'static SignatureSpec {
    let index = match signature {
        ProblemSignature::TwoSum => 0,
        ProblemSignature::ValidParentheses => 1,
        ProblemSignature::ContainsDuplicate => 2,
        ProblemSignature::MaximumSubarray => 3,
        ProblemSignature::LongestSubstring => 4,
        ProblemSignature::ReverseLinkedList => 5,
        ProblemSignature::MergeTwoSortedLists => 6,
        ProblemSignature::MaximumDepthOfBinaryTree => 7,
    };
    &REGISTRY[index]
}

impl SignatureSpec {
    pub fn uses_list_nodes(&self) -> bool {
        self.returns == ValueKind::LinkedList
            || self.params.iter().any(|p| p.kind == ValueKind::LinkedList)
    }

    pub fn uses_tree_nodes(&self) -> bool {
        self.returns == ValueKind::BinaryTree
            || self.params.iter().any(|p| p.kind == ValueKind::BinaryTree)
    }

    fn matches_keys(&self, input: &Value) -> bool {
        let Some(map) = input.as_object() else {
            return false;
        };
        map.len() == self.params.len() && self.params.iter().all(|p| map.contains_key(p.name))
    }
}

/// Pick the signature for a request that did not name one
///
/// Candidates are the signatures whose parameter set equals the first test
/// input's key set. Ties are broken by which entry point the source declares.
pub fn resolve(
    explicit: Option<ProblemSignature>,
    source_code: &str,
    test_cases: &[TestCase],
) -> Result<ProblemSignature, GradeError> {
    if let Some(signature) = explicit {
        return Ok(signature);
    }

    let first = test_cases
        .first()
        .ok_or_else(|| GradeError::UnresolvedSignature("no test cases supplied".to_string()))?;

    let candidates: Vec<&SignatureSpec> =
        REGISTRY.iter().filter(|s| s.matches_keys(&first.input)).collect();

    let declared: Vec<&SignatureSpec> = candidates
        .iter()
        .copied()
        .filter(|s| source_code.contains(s.entry_point))
        .collect();

    match (candidates.as_slice(), declared.as_slice()) {
        ([only], _) => Ok(only.signature),
        (_, [only]) => Ok(only.signature),
        ([], _) => Err(GradeError::UnresolvedSignature(format!(
            "no known problem takes input {}",
            first.input
        ))),
        _ => Err(GradeError::UnresolvedSignature(format!(
            "input matches {} problems; pass an explicit signature",
            candidates.len()
        ))),
    }
}
