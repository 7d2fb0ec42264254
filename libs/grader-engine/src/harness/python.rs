// Method-style harness for Python submissions

use super::literal::python_string;
use super::{declares_type, input_object, Bound, CommentSyntax, MAX_LIST_NODES};
use crate::signature::{SignatureSpec, ValueKind};

const LIST_NODE: &str = r#"class ListNode:
    def __init__(self, val=0, next=None):
        self.val = val
        self.next = next

"#;

const TREE_NODE: &str = r#"class TreeNode:
    def __init__(self, val=0, left=None, right=None):
        self.val = val
        self.left = left
        self.right = right

"#;

const LIST_HELPERS: &str = r#"
def _harness_to_list(values):
    head = None
    for value in reversed(values):
        head = ListNode(value, head)
    return head


def _harness_from_list(node):
    if isinstance(node, list):
        return node
    out = []
    while node is not None:
        if len(out) > _HARNESS_MAX_NODES:
            raise RuntimeError("linked list result contains a cycle")
        out.append(node.val)
        node = node.next
    return out

"#;

const TREE_HELPERS: &str = r#"
def _harness_to_tree(values):
    if not values or values[0] is None:
        return None
    root = TreeNode(values[0])
    queue = [root]
    i = 1
    while queue and i < len(values):
        node = queue.pop(0)
        if i < len(values) and values[i] is not None:
            node.left = TreeNode(values[i])
            queue.append(node.left)
        i += 1
        if i < len(values) and values[i] is not None:
            node.right = TreeNode(values[i])
            queue.append(node.right)
        i += 1
    return root

"#;

pub(super) fn render(source_code: &str, spec: &SignatureSpec, args: &[Bound]) -> String {
    // `from __future__` imports must stay the first statements of the module
    let (future, body): (Vec<&str>, Vec<&str>) = source_code
        .lines()
        .partition(|line| line.trim_start().starts_with("from __future__"));

    let mut program = String::new();
    for line in &future {
        program.push_str(line);
        program.push('\n');
    }
    if !source_code.contains("from typing import") {
        program.push_str("from typing import List, Optional\n");
    }
    program.push_str("import json\nimport sys\n\n");

    // Node classes precede the submission so its annotations resolve at definition time
    if spec.uses_list_nodes()
        && !declares_type(source_code, CommentSyntax::Hash, &["class"], "ListNode")
    {
        program.push_str(LIST_NODE);
    }
    if spec.uses_tree_nodes()
        && !declares_type(source_code, CommentSyntax::Hash, &["class"], "TreeNode")
    {
        program.push_str(TREE_NODE);
    }

    program.push_str(body.join("\n").trim_end());
    program.push_str("\n\n\n# Test execution\n");

    if spec.uses_list_nodes() {
        program.push_str(&format!("_HARNESS_MAX_NODES = {}\n", MAX_LIST_NODES));
        program.push_str(LIST_HELPERS);
    }
    if spec.uses_tree_nodes() {
        program.push_str(TREE_HELPERS);
    }

    let input_json = input_object(args).to_string();
    program.push_str(&format!(
        "_harness_input = json.loads({})\n\n",
        python_string(&input_json)
    ));

    let call_args: Vec<String> = args
        .iter()
        .map(|bound| {
            let access = format!("_harness_input[\"{}\"]", bound.param.name);
            match bound.param.kind {
                ValueKind::LinkedList => format!("_harness_to_list({})", access),
                ValueKind::BinaryTree => format!("_harness_to_tree({})", access),
                _ => access,
            }
        })
        .collect();

    let output = match spec.returns {
        ValueKind::LinkedList => "_harness_from_list(_harness_result)",
        _ => "_harness_result",
    };

    let entry = spec.entry_point;
    program.push_str("try:\n");
    program.push_str("    _harness_solution = Solution()\n");
    program.push_str(&format!(
        "    _harness_method = getattr(_harness_solution, \"{}\", None)\n",
        entry
    ));
    program.push_str("    if _harness_method is None:\n");
    program.push_str(&format!(
        "        raise AttributeError(\"Solution has no method '{}'\")\n",
        entry
    ));
    program.push_str(&format!(
        "    _harness_result = _harness_method({})\n",
        call_args.join(", ")
    ));
    program.push_str(&format!(
        "    print(json.dumps({}, separators=(\",\", \":\")))\n",
        output
    ));
    program.push_str("except Exception as error:\n");
    program.push_str(
        "    print(json.dumps({\"error\": type(error).__name__ + \": \" + str(error)}), file=sys.stderr)\n",
    );
    program.push_str("    sys.exit(1)\n");
    program
}
