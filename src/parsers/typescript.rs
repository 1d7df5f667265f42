//! TypeScript/JavaScript import extraction using Tree-sitter
//!
//! Extracts the raw imports of a parsed file:
//! - ES module imports (`import x from './x'`, `import type { T } from './t'`)
//! - CommonJS requires (`require('./x')`, and TypeScript's `import x = require('./x')`)
//! - Dynamic imports (`import('./x')`)
//!
//! Only string-literal specifiers are extracted. Computed specifiers such as
//! `require(name)` or template strings are skipped silently.
//!
//! The same walk works for the JavaScript, TypeScript and TSX grammars since
//! they share node kinds and field names for all three shapes.

use tree_sitter::{Node, Tree};

use crate::models::{ImportKind, ImportStatement};

/// Walk the tree in pre-order and collect imports in document order
pub fn extract_imports(tree: &Tree, source: &str) -> Vec<ImportStatement> {
    let mut imports = Vec::new();
    let mut stack = vec![tree.root_node()];

    while let Some(node) = stack.pop() {
        if let Some(import) = import_at(node, source) {
            imports.push(import);
        }

        // Children pushed in reverse so the leftmost child is visited next
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }

    imports
}

/// Recognize one of the import shapes at this node
fn import_at(node: Node, source: &str) -> Option<ImportStatement> {
    match node.kind() {
        "import_statement" => {
            let source_node = node.child_by_field_name("source")?;
            string_literal(source_node, source)
                .map(|path| ImportStatement::new(path, line_of(&node), ImportKind::Import))
        }
        // TypeScript: import fs = require('fs')
        "import_require_clause" => {
            let source_node = node.child_by_field_name("source")?;
            string_literal(source_node, source)
                .map(|path| ImportStatement::new(path, line_of(&node), ImportKind::Require))
        }
        "call_expression" => {
            let function = node.child_by_field_name("function")?;
            let kind = match function.utf8_text(source.as_bytes()).ok()? {
                "require" => ImportKind::Require,
                "import" => ImportKind::Dynamic,
                _ => return None,
            };

            let arguments = node.child_by_field_name("arguments")?;
            let first_arg = first_argument(arguments)?;
            string_literal(first_arg, source)
                .map(|path| ImportStatement::new(path, line_of(&node), kind))
        }
        _ => None,
    }
}

/// First named argument, ignoring comments
fn first_argument(arguments: Node) -> Option<Node> {
    let mut cursor = arguments.walk();
    let first = arguments
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment");
    first
}

/// Contents of a `string` node with the surrounding quotes removed
fn string_literal(node: Node, source: &str) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }

    let text = node.utf8_text(source.as_bytes()).ok()?;
    Some(text.trim_matches(|c| c == '\'' || c == '"').to_string())
}

/// 1-indexed start line of a node
fn line_of(node: &Node) -> usize {
    node.start_position().row + 1
}
