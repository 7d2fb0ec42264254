// Function-style harness for Node.js submissions

use super::{declares_type, input_object, Bound, CommentSyntax, MAX_LIST_NODES};
use crate::signature::{SignatureSpec, ValueKind};

/// Key of the object the harness prints when the solution throws
pub const HARNESS_ERROR_KEY: &str = "__harness_error__";

const LIST_NODE: &str = r#"
function ListNode(val, next) {
    this.val = (val === undefined ? 0 : val);
    this.next = (next === undefined ? null : next);
}
"#;

const TREE_NODE: &str = r#"
function TreeNode(val, left, right) {
    this.val = (val === undefined ? 0 : val);
    this.left = (left === undefined ? null : left);
    this.right = (right === undefined ? null : right);
}
"#;

const LIST_HELPERS: &str = r#"
function __toList(values) {
    let head = null;
    for (let i = values.length - 1; i >= 0; i--) {
        head = new ListNode(values[i], head);
    }
    return head;
}

function __fromList(node) {
    if (Array.isArray(node)) {
        return node;
    }
    const out = [];
    while (node !== null && node !== undefined) {
        if (out.length > __MAX_NODES) {
            throw new Error("linked list result contains a cycle");
        }
        out.push(node.val);
        node = node.next;
    }
    return out;
}
"#;

const TREE_HELPERS: &str = r#"
function __toTree(values) {
    if (values.length === 0 || values[0] === null) {
        return null;
    }
    const root = new TreeNode(values[0]);
    const queue = [root];
    let i = 1;
    while (queue.length > 0 && i < values.length) {
        const node = queue.shift();
        if (i < values.length && values[i] !== null) {
            node.left = new TreeNode(values[i]);
            queue.push(node.left);
        }
        i++;
        if (i < values.length && values[i] !== null) {
            node.right = new TreeNode(values[i]);
            queue.push(node.right);
        }
        i++;
    }
    return root;
}
"#;

fn declares(source_code: &str, name: &str) -> bool {
    declares_type(source_code, CommentSyntax::CLike, &["function", "class"], name)
}

pub(super) fn render(source_code: &str, spec: &SignatureSpec, args: &[Bound]) -> String {
    let mut program = String::new();
    program.push_str(source_code.trim_end());
    program.push_str("\n\n// Test execution\n");

    if spec.uses_list_nodes() {
        if !declares(source_code, "ListNode") {
            program.push_str(LIST_NODE);
        }
        program.push_str(&LIST_HELPERS.replace("__MAX_NODES", &MAX_LIST_NODES.to_string()));
    }
    if spec.uses_tree_nodes() {
        if !declares(source_code, "TreeNode") {
            program.push_str(TREE_NODE);
        }
        program.push_str(TREE_HELPERS);
    }

    // JSON text is a valid JavaScript expression
    program.push_str(&format!("\nconst __input = {};\n", input_object(args)));

    let call_args: Vec<String> = args
        .iter()
        .map(|bound| {
            let access = format!("__input[\"{}\"]", bound.param.name);
            match bound.param.kind {
                ValueKind::LinkedList => format!("__toList({})", access),
                ValueKind::BinaryTree => format!("__toTree({})", access),
                _ => access,
            }
        })
        .collect();

    let output = match spec.returns {
        ValueKind::LinkedList => "__fromList(__result)",
        _ => "(__result === undefined ? null : __result)",
    };

    program.push_str("\ntry {\n");
    program.push_str(&format!(
        "    const __result = {}({});\n",
        spec.entry_point,
        call_args.join(", ")
    ));
    program.push_str(&format!("    console.log(JSON.stringify({}));\n", output));
    program.push_str("} catch (error) {\n");
    program.push_str(&format!(
        "    console.log(JSON.stringify({{ \"{}\": String(error && error.message !== undefined ? error.message : error) }}));\n",
        HARNESS_ERROR_KEY
    ));
    program.push_str("}\n");
    program
}
