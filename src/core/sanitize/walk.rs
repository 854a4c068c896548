//! Context-threaded walk over the document tree.
//!
//! The walk visits every node depth-first, deriving a child context per the
//! environment/macro classification rules, and records span rewrites for
//! text that may be escaped. It never mutates the source itself.

use super::context::{
    is_math_environment, is_tabular_environment, is_verbatim_environment, is_verbatim_macro,
    TraversalContext, WalkState,
};
use super::engine::Node;
use super::escape::escape_special_chars;

/// One span rewrite: replace bytes `[start, end)` with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Walk the tree and collect every rewrite the context rules allow.
///
/// Edits come back in source order; the caller applies them in descending
/// start order so earlier offsets stay valid.
pub fn collect_edits(source: &str, nodes: &[Node], state: &mut WalkState) -> Vec<Edit> {
    let mut edits = Vec::new();
    walk_nodes(source, nodes, TraversalContext::default(), state, &mut edits);
    edits
}

fn walk_nodes(
    source: &str,
    nodes: &[Node],
    ctx: TraversalContext,
    state: &mut WalkState,
    edits: &mut Vec<Edit>,
) {
    for node in nodes {
        walk_node(source, node, ctx, state, edits);
    }
}

fn walk_node(
    source: &str,
    node: &Node,
    ctx: TraversalContext,
    state: &mut WalkState,
    edits: &mut Vec<Edit>,
) {
    match node {
        Node::Text(span) | Node::Specials(span) => {
            if ctx.is_guarded() {
                return;
            }
            let original = span.text(source);
            let escaped = escape_special_chars(original);
            if escaped != original {
                edits.push(Edit {
                    start: span.start,
                    end: span.end,
                    text: escaped,
                });
            }
        }
        Node::Comment(span) => {
            if !ctx.in_document {
                return;
            }
            // Only trailing comments: the line must carry content before `%`.
            let line_start = source[..span.start].rfind('\n').map(|i| i + 1).unwrap_or(0);
            let prefix = &source[line_start..span.start];
            if prefix.trim().is_empty() {
                return;
            }
            let segment = span.text(source);
            let mut text = String::with_capacity(segment.len() + 1);
            text.push_str("\\%");
            text.push_str(&segment[1..]);
            edits.push(Edit {
                start: span.start,
                end: span.end,
                text,
            });
        }
        Node::Group { children, .. } => walk_nodes(source, children, ctx, state, edits),
        Node::Environment { name, children, .. } => {
            let mut ctx = ctx;
            if name == "document" {
                state.document_environment_seen = true;
                ctx = ctx.with_document();
            }
            if is_verbatim_environment(name) || is_tabular_environment(name) {
                return;
            }
            if is_math_environment(name) {
                ctx = ctx.with_math();
            }
            walk_nodes(source, children, ctx, state, edits);
        }
        Node::Math { children, .. } => {
            walk_nodes(source, children, ctx.with_math(), state, edits);
        }
        Node::Macro { name, args, .. } => {
            if name == "documentclass" {
                state.documentclass_seen = true;
            }
            if is_verbatim_macro(name) {
                return;
            }
            // The first href argument is the URL and must survive verbatim.
            let skip_first = name == "href";
            for (index, arg) in args.iter().enumerate() {
                if skip_first && index == 0 {
                    continue;
                }
                walk_nodes(source, &arg.children, ctx, state, edits);
            }
        }
    }
}
