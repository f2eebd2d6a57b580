use std::fs;

use anyhow::{Context, Result};
use tree_sitter::Parser;

use phpdoc_checker::analyzer::comment::tokenizer::tag_lines;

/// Debugging tool: prints every `/** ... */` comment node in a PHP file
/// together with the tag lines the tokenizer recognizes inside it.
fn main() -> Result<()> {
    let path = std::env::args().nth(1).context("path argument missing")?;
    let source = fs::read_to_string(&path).with_context(|| format!("read {}", path))?;

    let mut parser = Parser::new();
    parser
        .set_language(tree_sitter_php::language())
        .context("load tree-sitter-php language")?;

    let tree = parser
        .parse(source.as_str(), None)
        .context("parse PHP source")?;

    print_docblocks(tree.root_node(), &source);
    Ok(())
}

fn print_docblocks(node: tree_sitter::Node, source: &str) {
    if node.kind() == "comment" {
        if let Ok(text) = node.utf8_text(source.as_bytes()) {
            if text.starts_with("/**") {
                let line = node.start_position().row + 1;
                println!("docblock at line {line}:");
                for tag in tag_lines(text, line) {
                    println!("  line {}: @{} {}", tag.line, tag.name, tag.body);
                }
            }
        }
    }

    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            print_docblocks(cursor.node(), source);
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }
}
