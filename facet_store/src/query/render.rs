//! Backend-neutral clause rendering
//!
//! Renders a predicate tree into the flat textual clause grammar:
//! `field:"value"` leaves, `field_operator:"operand"` for operator maps,
//! and explicitly parenthesized AND/OR/NOT groups. The grammar is
//! precedence-free; nesting is always explicit.

use serde_json::Value;

use crate::query::filter::{WhereNode, WhereTree};

/// Render a predicate tree to its clause string
pub fn render_predicate(tree: &WhereTree) -> String {
    tree.entries()
        .map(|(field, node)| render_node(field, node))
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn render_node(field: &str, node: &WhereNode) -> String {
    match node {
        WhereNode::Value(value) => format!("{}:\"{}\"", field, render_operand(value)),
        WhereNode::Ops(ops) => ops
            .iter()
            .map(|(operator, operand)| {
                format!("{}_{}:\"{}\"", field, operator, render_operand(operand))
            })
            .collect::<Vec<_>>()
            .join(" AND "),
        WhereNode::All(children) => render_group(children, " AND "),
        WhereNode::Any(children) => render_group(children, " OR "),
        WhereNode::Not(child) => format!("NOT ({})", render_predicate(child)),
    }
}

fn render_group(children: &[WhereTree], joiner: &str) -> String {
    children
        .iter()
        .map(|child| format!("({})", render_predicate(child)))
        .collect::<Vec<_>>()
        .join(joiner)
}

fn render_operand(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
