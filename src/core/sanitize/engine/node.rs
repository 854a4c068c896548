//! Structural node definitions for the LaTeX document tree.
//!
//! Nodes carry byte spans into the original source rather than owned copies
//! of their text, so span rewrites can be applied to the source string
//! without re-serializing the tree.

/// A half-open byte range `[start, end)` into the source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Slice the source text covered by this span.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    /// True if `other` lies entirely within this span.
    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// One macro argument, either required `{...}` or optional `[...]`.
///
/// The span includes the surrounding braces or brackets.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroArg {
    pub span: Span,
    pub optional: bool,
    pub children: Vec<Node>,
}

/// A node in the structural document tree.
///
/// The parser produces exactly these variants; child spans are always
/// contained within their parent's span, and sibling spans never overlap.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A run of ordinary text with no structural markers.
    Text(Span),

    /// A comment from `%` to the end of the line (newline excluded).
    Comment(Span),

    /// A braced group `{...}`; the span includes both braces.
    Group { span: Span, children: Vec<Node> },

    /// A `\begin{name}...\end{name}` environment, span inclusive of both
    /// delimiters. Verbatim-family bodies are scanned raw and appear as a
    /// single Text child.
    Environment {
        span: Span,
        name: String,
        children: Vec<Node>,
    },

    /// A control sequence plus any arguments attached by the signature
    /// table. The name excludes the backslash; control symbols such as
    /// `\&` appear here with a single-character name.
    Macro {
        span: Span,
        name: String,
        args: Vec<MacroArg>,
    },

    /// A math span: `$...$`, `$$...$$`, `\(...\)` or `\[...\]`, delimiters
    /// included.
    Math { span: Span, children: Vec<Node> },

    /// A single special character (`&`, `~`, `#`, `_`, `^`) occurring
    /// outside any guarded region.
    Specials(Span),
}

impl Node {
    /// The source span covered by this node.
    pub fn span(&self) -> Span {
        match self {
            Node::Text(span) => *span,
            Node::Comment(span) => *span,
            Node::Group { span, .. } => *span,
            Node::Environment { span, .. } => *span,
            Node::Macro { span, .. } => *span,
            Node::Math { span, .. } => *span,
            Node::Specials(span) => *span,
        }
    }

    /// Child nodes, if this node kind has any.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Group { children, .. }
            | Node::Environment { children, .. }
            | Node::Math { children, .. } => children,
            _ => &[],
        }
    }

    pub fn is_environment(&self, env_name: &str) -> bool {
        matches!(self, Node::Environment { name, .. } if name == env_name)
    }

    pub fn is_macro(&self, macro_name: &str) -> bool {
        matches!(self, Node::Macro { name, .. } if name == macro_name)
    }
}
