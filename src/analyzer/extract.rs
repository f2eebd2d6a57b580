use std::collections::HashMap;

use tree_sitter::Node;

use super::comment::{Comment, CommentKind, Context, RawComment};
use super::config::AnalyzerConfig;
use super::parser::ParsedSource;

/// One doc comment extracted from a source file, parsed against the
/// file's name-resolution context.
#[derive(Debug, Clone)]
pub struct ExtractedComment {
    /// 1-based line the comment starts on.
    pub line: usize,
    /// Kind of the declaration the comment documents.
    pub kind: CommentKind,
    pub comment: Comment,
}

/// Find every `/** ... */` comment in the file, attach each to the
/// declaration that follows it, and parse it into a `Comment` model.
pub fn extract_comments(parsed: &ParsedSource, config: &AnalyzerConfig) -> Vec<ExtractedComment> {
    let context = collect_context(parsed);
    let mut extracted = Vec::new();

    walk_node(parsed.tree.root_node(), &mut |node| {
        if node.kind() != "comment" {
            return;
        }
        let Some(text) = node_text(node, parsed) else {
            return;
        };
        if !text.starts_with("/**") {
            return;
        }

        let Some(kind) = attached_declaration_kind(node) else {
            return;
        };
        let line = node.start_position().row + 1;
        let raw = RawComment::new(&text, line, kind);
        extracted.push(ExtractedComment {
            line,
            kind,
            comment: Comment::from_raw(&raw, &context, config),
        });
    });

    extracted
}

/// Build the name-resolution context for a file: its namespace plus the
/// aliases introduced by `use` declarations (including `as` clauses).
pub fn collect_context(parsed: &ParsedSource) -> Context {
    let mut context = Context::new();
    if let Some(namespace) = collect_namespace(parsed) {
        context = context.with_namespace(namespace);
    }
    for (alias, target) in collect_use_aliases(parsed) {
        context.add_use(alias, target);
    }
    context
}

/// Map the declaration following a doc comment to a comment kind.
/// Comments with no following declaration document nothing and are
/// skipped.
fn attached_declaration_kind(comment: Node<'_>) -> Option<CommentKind> {
    let mut sibling = comment.next_named_sibling();
    while let Some(node) = sibling {
        if node.kind() != "comment" {
            return Some(kind_for_node(node));
        }
        sibling = node.next_named_sibling();
    }
    None
}

fn kind_for_node(node: Node<'_>) -> CommentKind {
    match node.kind() {
        "class_declaration" | "interface_declaration" | "trait_declaration"
        | "enum_declaration" => CommentKind::Class,
        "method_declaration" => CommentKind::Method,
        "function_definition" => CommentKind::Function,
        "property_declaration" => CommentKind::Property,
        "const_declaration" | "class_const_declaration" => CommentKind::Const,
        _ => {
            if contains_closure(node) {
                CommentKind::Closure
            } else {
                CommentKind::Variable
            }
        }
    }
}

fn contains_closure(node: Node<'_>) -> bool {
    let mut found = false;
    walk_node(node, &mut |child| {
        if matches!(
            child.kind(),
            "anonymous_function_creation_expression" | "arrow_function"
        ) {
            found = true;
        }
    });
    found
}

fn collect_namespace(parsed: &ParsedSource) -> Option<String> {
    let mut namespace = None;

    walk_node(parsed.tree.root_node(), &mut |node| {
        if namespace.is_some() {
            return;
        }

        if node.kind() == "namespace_definition" {
            if let Some(name_node) = child_by_kind(node, "namespace_name") {
                if let Some(name) = node_text(name_node, parsed) {
                    namespace = Some(name);
                }
            }
        }
    });

    namespace
}

fn collect_use_aliases(parsed: &ParsedSource) -> HashMap<String, String> {
    let mut uses = HashMap::new();

    walk_node(parsed.tree.root_node(), &mut |node| {
        if node.kind() != "namespace_use_declaration" {
            return;
        }

        for idx in 0..node.named_child_count() {
            let Some(clause) = node.named_child(idx) else {
                continue;
            };
            if clause.kind() != "namespace_use_clause" {
                continue;
            }

            let Some(qualified) = child_by_kind(clause, "qualified_name")
                .or_else(|| child_by_kind(clause, "name"))
            else {
                continue;
            };
            let Some(target) = node_text(qualified, parsed) else {
                continue;
            };

            let alias = alias_for_clause(clause, parsed)
                .unwrap_or_else(|| last_segment(&target).to_string());
            uses.insert(alias, target.trim_start_matches('\\').to_string());
        }
    });

    uses
}

fn alias_for_clause(clause: Node<'_>, parsed: &ParsedSource) -> Option<String> {
    let alias_clause = child_by_kind(clause, "namespace_aliasing_clause")?;
    let alias_name = child_by_kind(alias_clause, "name")?;
    node_text(alias_name, parsed)
}

fn last_segment(qualified: &str) -> &str {
    qualified.rsplit('\\').next().unwrap_or(qualified)
}

fn walk_node<'a, F>(node: Node<'a>, callback: &mut F)
where
    F: FnMut(Node<'a>),
{
    callback(node);
    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            walk_node(cursor.node(), callback);
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }
}

fn child_by_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    for idx in 0..node.named_child_count() {
        if let Some(child) = node.named_child(idx) {
            if child.kind() == kind {
                return Some(child);
            }
        }
    }

    None
}

fn node_text(node: Node<'_>, parsed: &ParsedSource) -> Option<String> {
    node.utf8_text(parsed.source.as_bytes())
        .ok()
        .map(|text| text.trim().to_owned())
}
