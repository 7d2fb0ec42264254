// Typed-compiled harness for Java submissions
//
// Java has no existence probe, so the call is emitted with concrete types and
// literal arguments derived from the signature's declared kinds.

use super::literal::java_string;
use super::{declares_type, Arg, Bound, CommentSyntax, MAX_LIST_NODES};
use crate::error::HarnessError;
use crate::signature::{SignatureSpec, ValueKind};

const LIST_NODE: &str = r#"
class ListNode {
    int val;
    ListNode next;
    ListNode() {}
    ListNode(int val) { this.val = val; }
    ListNode(int val, ListNode next) { this.val = val; this.next = next; }
}
"#;

const TREE_NODE: &str = r#"
class TreeNode {
    int val;
    TreeNode left;
    TreeNode right;
    TreeNode() {}
    TreeNode(int val) { this.val = val; }
    TreeNode(int val, TreeNode left, TreeNode right) { this.val = val; this.left = left; this.right = right; }
}
"#;

const FORMAT_INT_ARRAY: &str = r#"
    static String formatIntArray(int[] values) {
        if (values == null) {
            return "null";
        }
        StringBuilder out = new StringBuilder("[");
        for (int i = 0; i < values.length; i++) {
            if (i > 0) {
                out.append(',');
            }
            out.append(values[i]);
        }
        return out.append(']').toString();
    }
"#;

const LIST_HELPERS: &str = r#"
    static ListNode toList(int[] values) {
        ListNode head = null;
        for (int i = values.length - 1; i >= 0; i--) {
            head = new ListNode(values[i], head);
        }
        return head;
    }

    static String formatList(ListNode node) {
        StringBuilder out = new StringBuilder("[");
        int count = 0;
        while (node != null) {
            if (++count > MAX_NODES) {
                throw new IllegalStateException("linked list result contains a cycle");
            }
            if (count > 1) {
                out.append(',');
            }
            out.append(node.val);
            node = node.next;
        }
        return out.append(']').toString();
    }
"#;

const TREE_HELPERS: &str = r#"
    static TreeNode toTree(Integer[] values) {
        if (values.length == 0 || values[0] == null) {
            return null;
        }
        TreeNode root = new TreeNode(values[0]);
        Deque<TreeNode> queue = new ArrayDeque<>();
        queue.add(root);
        int i = 1;
        while (!queue.isEmpty() && i < values.length) {
            TreeNode node = queue.poll();
            if (i < values.length && values[i] != null) {
                node.left = new TreeNode(values[i]);
                queue.add(node.left);
            }
            i++;
            if (i < values.length && values[i] != null) {
                node.right = new TreeNode(values[i]);
                queue.add(node.right);
            }
            i++;
        }
        return root;
    }
"#;

fn int_literal(name: &str, value: i64) -> Result<String, HarnessError> {
    i32::try_from(value)
        .map(|v| v.to_string())
        .map_err(|_| HarnessError::IntOutOfRange {
            name: name.to_string(),
            value: value.to_string(),
        })
}

fn int_array_literal(name: &str, values: &[i64]) -> Result<String, HarnessError> {
    let items = values
        .iter()
        .map(|v| int_literal(name, *v))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("new int[]{{{}}}", items.join(", ")))
}

fn tree_literal(name: &str, values: &[Option<i64>]) -> Result<String, HarnessError> {
    let items = values
        .iter()
        .map(|v| match v {
            Some(v) => int_literal(name, *v),
            None => Ok("null".to_string()),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("new Integer[]{{{}}}", items.join(", ")))
}

/// Declaration statement binding one argument as a typed local
fn declaration(bound: &Bound) -> Result<String, HarnessError> {
    let name = bound.param.name;
    let statement = match (&bound.param.kind, &bound.arg) {
        (ValueKind::Int, Arg::Int(v)) => format!("int {} = {};", name, int_literal(name, *v)?),
        (ValueKind::Bool, Arg::Bool(v)) => format!("boolean {} = {};", name, v),
        (ValueKind::Str, Arg::Str(s)) => format!("String {} = {};", name, java_string(s)),
        (ValueKind::IntArray, Arg::Ints(values)) => {
            format!("int[] {} = {};", name, int_array_literal(name, values)?)
        }
        (ValueKind::LinkedList, Arg::Ints(values)) => format!(
            "ListNode {} = toList({});",
            name,
            int_array_literal(name, values)?
        ),
        (ValueKind::BinaryTree, Arg::Tree(values)) => {
            format!("TreeNode {} = toTree({});", name, tree_literal(name, values)?)
        }
        (kind, arg) => {
            return Err(HarnessError::InvalidArgument {
                name: name.to_string(),
                expected: kind.describe(),
                found: format!("{:?}", arg),
            })
        }
    };
    Ok(statement)
}

fn result_type(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Int => "int",
        ValueKind::Bool => "boolean",
        ValueKind::Str => "String",
        ValueKind::IntArray => "int[]",
        ValueKind::LinkedList => "ListNode",
        ValueKind::BinaryTree => "TreeNode",
    }
}

fn result_format(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::IntArray => "formatIntArray(result)",
        ValueKind::LinkedList => "formatList(result)",
        _ => "String.valueOf(result)",
    }
}

pub(super) fn render(
    source_code: &str,
    spec: &SignatureSpec,
    args: &[Bound],
) -> Result<String, HarnessError> {
    let declarations = args.iter().map(declaration).collect::<Result<Vec<_>, _>>()?;

    let mut program = String::from("import java.util.*;\n\n");
    // The service compiles Main.java, which may hold only one public class
    program.push_str(source_code.replace("public class Solution", "class Solution").trim());
    program.push('\n');

    if spec.uses_list_nodes()
        && !declares_type(source_code, CommentSyntax::CLike, &["class"], "ListNode")
    {
        program.push_str(LIST_NODE);
    }
    if spec.uses_tree_nodes()
        && !declares_type(source_code, CommentSyntax::CLike, &["class"], "TreeNode")
    {
        program.push_str(TREE_NODE);
    }

    program.push_str("\npublic class Main {\n");
    if spec.uses_list_nodes() {
        program.push_str(&format!("    static final int MAX_NODES = {};\n", MAX_LIST_NODES));
    }
    program.push_str("\n    public static void main(String[] args) {\n");
    program.push_str("        Solution solution = new Solution();\n");
    for statement in &declarations {
        program.push_str(&format!("        {}\n", statement));
    }
    let names: Vec<&str> = args.iter().map(|b| b.param.name).collect();
    program.push_str(&format!(
        "        {} result = solution.{}({});\n",
        result_type(spec.returns),
        spec.entry_point,
        names.join(", ")
    ));
    program.push_str(&format!(
        "        System.out.println({});\n",
        result_format(spec.returns)
    ));
    program.push_str("    }\n");

    if spec.returns == ValueKind::IntArray {
        program.push_str(FORMAT_INT_ARRAY);
    }
    if spec.uses_list_nodes() {
        program.push_str(LIST_HELPERS);
    }
    if spec.uses_tree_nodes() {
        program.push_str(TREE_HELPERS);
    }
    program.push_str("}\n");
    Ok(program)
}
