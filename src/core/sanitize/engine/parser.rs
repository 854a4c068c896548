//! Recursive-descent parser for LaTeX source.
//!
//! Builds the structural node tree the sanitizer walks. The parser follows
//! standard TeX surface syntax:
//! - Control sequence recognition (multi-letter names vs single symbols)
//! - Comment handling to end of line
//! - Brace groups and bracket-delimited optional arguments
//! - Math shifts (`$`, `$$`, `\(`, `\[`)
//! - Environments with `\begin`/`\end` name matching
//! - Raw scanning of verbatim bodies, which may contain unbalanced braces
//!
//! Anything the parser cannot make sense of surfaces as a `ParseError`
//! with line/column; the caller decides how to degrade.

use fxhash::FxHashMap;
use lazy_static::lazy_static;

use super::node::{MacroArg, Node, Span};
use crate::core::sanitize::context::is_verbatim_environment;
use crate::utils::error::{DocumentError, DocumentResult};

lazy_static! {
    /// Argument signatures for macros whose arguments the walker must see
    /// individually. Signature characters: `*` swallows an optional star,
    /// `[` an optional bracket argument, `{` a required group argument,
    /// `!` a required group scanned raw (no comment/math interpretation,
    /// for URL-like arguments).
    static ref MACRO_SIGNATURES: FxHashMap<&'static str, &'static str> = {
        let mut signatures = FxHashMap::default();
        signatures.insert("href", "{{");
        signatures.insert("url", "!");
        signatures.insert("path", "!");
        signatures.insert("documentclass", "[{");
        signatures.insert("usepackage", "[{");
        signatures.insert("section", "*[{");
        signatures.insert("subsection", "*[{");
        signatures.insert("subsubsection", "*[{");
        signatures.insert("paragraph", "*[{");
        signatures.insert("subparagraph", "*[{");
        signatures.insert("cvsection", "{");
        signatures.insert("cvsubsection", "{");
        signatures.insert("textbf", "{");
        signatures.insert("textit", "{");
        signatures.insert("texttt", "{");
        signatures.insert("textsc", "{");
        signatures.insert("textrm", "{");
        signatures.insert("emph", "{");
        signatures.insert("underline", "{");
        signatures.insert("mbox", "{");
        signatures.insert("label", "{");
        signatures.insert("ref", "{");
        signatures.insert("cite", "[{");
        signatures.insert("item", "[");
        signatures.insert("includegraphics", "[{");
        signatures.insert("newcommand", "*{[[{");
        signatures.insert("renewcommand", "*{[[{");
        signatures.insert("providecommand", "*{[[{");
        signatures
    };
}

/// What ends the node sequence currently being parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Until {
    /// End of input.
    Eof,
    /// A closing `}`.
    GroupEnd,
    /// A closing `]` (optional argument).
    OptionEnd,
    /// A closing `$`.
    MathDollar,
    /// A closing `$$`.
    MathDollars,
    /// A closing `\)`.
    MathParen,
    /// A closing `\]`.
    MathBracket,
    /// `\end{name}` for the named environment.
    Environment(String),
}

impl Until {
    fn describe(&self) -> String {
        match self {
            Until::Eof => "end of input".to_string(),
            Until::GroupEnd => "'}'".to_string(),
            Until::OptionEnd => "']'".to_string(),
            Until::MathDollar => "closing '$'".to_string(),
            Until::MathDollars => "closing '$$'".to_string(),
            Until::MathParen => "'\\)'".to_string(),
            Until::MathBracket => "'\\]'".to_string(),
            Until::Environment(name) => format!("\\end{{{}}}", name),
        }
    }
}

/// Outcome of parsing one control sequence.
enum Parsed {
    /// An ordinary node.
    Node(Node),
    /// The control sequence closed the current `Until` scope.
    Closed,
}

/// The parser, consuming the source as an indexed character stream.
pub struct Parser<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Parser {
            source,
            chars: source.char_indices().peekable(),
        }
    }

    /// Parse the whole input into a top-level node sequence.
    pub fn parse_all(mut self) -> DocumentResult<Vec<Node>> {
        self.parse_nodes(Until::Eof)
    }

    /// Peek at the next character and its byte offset without consuming.
    fn peek(&mut self) -> Option<(usize, char)> {
        self.chars.peek().copied()
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    /// Consume and return the next character with its byte offset.
    fn bump(&mut self) -> Option<(usize, char)> {
        self.chars.next()
    }

    /// Byte offset of the next unconsumed character (input length at EOF).
    fn pos(&mut self) -> usize {
        self.chars.peek().map(|(i, _)| *i).unwrap_or(self.source.len())
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_ascii_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    /// Build a parse error carrying the line/column of `offset`.
    fn error_at(&self, offset: usize, message: impl Into<String>) -> DocumentError {
        let prefix = &self.source[..offset.min(self.source.len())];
        let line = prefix.matches('\n').count() + 1;
        let line_start = prefix.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = prefix[line_start..].chars().count() + 1;
        DocumentError::parse_at(message, line, column)
    }

    /// Parse nodes until the terminator named by `until`, consuming the
    /// terminator itself. The caller reads the end position afterwards.
    fn parse_nodes(&mut self, until: Until) -> DocumentResult<Vec<Node>> {
        let mut nodes = Vec::new();
        loop {
            let Some((start, c)) = self.peek() else {
                if until == Until::Eof {
                    return Ok(nodes);
                }
                return Err(self.error_at(
                    self.source.len(),
                    format!("unexpected end of input, expected {}", until.describe()),
                ));
            };

            match c {
                '}' => {
                    if until == Until::GroupEnd {
                        self.bump();
                        return Ok(nodes);
                    }
                    return Err(self.error_at(start, "unexpected '}'"));
                }
                ']' if until == Until::OptionEnd => {
                    self.bump();
                    return Ok(nodes);
                }
                '$' => match until {
                    Until::MathDollar => {
                        self.bump();
                        return Ok(nodes);
                    }
                    Until::MathDollars => {
                        self.bump();
                        if self.peek_char() == Some('$') {
                            self.bump();
                            return Ok(nodes);
                        }
                        return Err(
                            self.error_at(start, "display math must close with '$$'")
                        );
                    }
                    _ => nodes.push(self.parse_math_dollar(start)?),
                },
                '{' => nodes.push(self.parse_group(start)?),
                '%' => nodes.push(self.parse_comment(start)),
                '\\' => match self.parse_control(start, &until)? {
                    Parsed::Node(node) => nodes.push(node),
                    Parsed::Closed => return Ok(nodes),
                },
                '&' | '~' | '#' | '_' | '^' => {
                    self.bump();
                    nodes.push(Node::Specials(Span::new(start, self.pos())));
                }
                _ => nodes.push(self.parse_text(start, &until)),
            }
        }
    }

    /// A run of ordinary characters up to the next structural marker.
    fn parse_text(&mut self, start: usize, until: &Until) -> Node {
        let stop_at_bracket = *until == Until::OptionEnd;
        while let Some(c) = self.peek_char() {
            match c {
                '\\' | '{' | '}' | '$' | '%' | '&' | '~' | '#' | '_' | '^' => break,
                ']' if stop_at_bracket => break,
                _ => {
                    self.bump();
                }
            }
        }
        Node::Text(Span::new(start, self.pos()))
    }

    /// A comment from `%` to end of line; the newline stays outside the span.
    fn parse_comment(&mut self, start: usize) -> Node {
        self.bump();
        while let Some(c) = self.peek_char() {
            if c == '\n' || c == '\r' {
                break;
            }
            self.bump();
        }
        Node::Comment(Span::new(start, self.pos()))
    }

    fn parse_group(&mut self, start: usize) -> DocumentResult<Node> {
        self.bump();
        let children = self.parse_nodes(Until::GroupEnd)?;
        Ok(Node::Group {
            span: Span::new(start, self.pos()),
            children,
        })
    }

    fn parse_math_dollar(&mut self, start: usize) -> DocumentResult<Node> {
        self.bump();
        let until = if self.peek_char() == Some('$') {
            self.bump();
            Until::MathDollars
        } else {
            Until::MathDollar
        };
        let children = self.parse_nodes(until)?;
        Ok(Node::Math {
            span: Span::new(start, self.pos()),
            children,
        })
    }

    /// Dispatch on a control sequence: math delimiters, environment
    /// delimiters, verb forms, then ordinary macros.
    fn parse_control(&mut self, start: usize, until: &Until) -> DocumentResult<Parsed> {
        self.bump();
        let name = self.read_control_name();
        if name.is_empty() {
            // Lone backslash at end of input
            return Ok(Parsed::Node(Node::Text(Span::new(start, self.pos()))));
        }

        match name.as_str() {
            "(" => {
                let children = self.parse_nodes(Until::MathParen)?;
                Ok(Parsed::Node(Node::Math {
                    span: Span::new(start, self.pos()),
                    children,
                }))
            }
            "[" => {
                let children = self.parse_nodes(Until::MathBracket)?;
                Ok(Parsed::Node(Node::Math {
                    span: Span::new(start, self.pos()),
                    children,
                }))
            }
            ")" => {
                if *until == Until::MathParen {
                    Ok(Parsed::Closed)
                } else {
                    Err(self.error_at(start, "unexpected '\\)' outside math"))
                }
            }
            "]" => {
                if *until == Until::MathBracket {
                    Ok(Parsed::Closed)
                } else {
                    Err(self.error_at(start, "unexpected '\\]' outside math"))
                }
            }
            "begin" => self.parse_environment(start).map(Parsed::Node),
            "end" => {
                let env_name = self.read_env_name(start, "\\end")?;
                match until {
                    Until::Environment(expected) if *expected == env_name => Ok(Parsed::Closed),
                    Until::Environment(expected) => Err(self.error_at(
                        start,
                        format!(
                            "\\end{{{}}} does not match \\begin{{{}}}",
                            env_name, expected
                        ),
                    )),
                    _ => Err(self.error_at(
                        start,
                        format!("\\end{{{}}} without matching \\begin", env_name),
                    )),
                }
            }
            "verb" | "Verb" => self.parse_verb(start, name).map(Parsed::Node),
            _ => self.parse_macro(start, name).map(Parsed::Node),
        }
    }

    /// Read a control sequence name: letters only, or a single non-letter.
    fn read_control_name(&mut self) -> String {
        let mut name = String::new();
        if let Some(c) = self.peek_char() {
            if c.is_ascii_alphabetic() {
                while let Some(c) = self.peek_char() {
                    if c.is_ascii_alphabetic() {
                        name.push(c);
                        self.bump();
                    } else {
                        break;
                    }
                }
            } else {
                name.push(c);
                self.bump();
            }
        }
        name
    }

    /// Read the `{name}` after `\begin` or `\end`.
    fn read_env_name(&mut self, at: usize, opener: &str) -> DocumentResult<String> {
        self.skip_whitespace();
        match self.peek() {
            Some((_, '{')) => {
                self.bump();
                let mut name = String::new();
                loop {
                    match self.bump() {
                        Some((_, '}')) => return Ok(name),
                        Some((i, '\\')) | Some((i, '{')) => {
                            return Err(
                                self.error_at(i, format!("invalid environment name after {}", opener))
                            );
                        }
                        Some((_, c)) => name.push(c),
                        None => {
                            return Err(self.error_at(
                                self.source.len(),
                                format!("unterminated environment name after {}", opener),
                            ));
                        }
                    }
                }
            }
            Some((i, _)) => Err(self.error_at(i, format!("expected '{{' after {}", opener))),
            None => Err(self.error_at(
                self.source.len(),
                format!("expected '{{' after {}", opener),
            )),
        }
    }

    fn parse_environment(&mut self, start: usize) -> DocumentResult<Node> {
        let name = self.read_env_name(start, "\\begin")?;
        if is_verbatim_environment(&name) {
            return self.parse_raw_environment(start, name);
        }
        let children = self.parse_nodes(Until::Environment(name.clone()))?;
        Ok(Node::Environment {
            span: Span::new(start, self.pos()),
            name,
            children,
        })
    }

    /// Scan a verbatim-family environment body without interpretation,
    /// up to its literal `\end{name}`.
    fn parse_raw_environment(&mut self, start: usize, name: String) -> DocumentResult<Node> {
        let body_start = self.pos();
        let closer = format!("\\end{{{}}}", name);
        let Some(rel) = self.source[body_start..].find(&closer) else {
            return Err(self.error_at(start, format!("unterminated {} environment", name)));
        };
        let body_end = body_start + rel;
        let end = body_end + closer.len();
        while self.pos() < end {
            self.bump();
        }
        let children = if body_end > body_start {
            vec![Node::Text(Span::new(body_start, body_end))]
        } else {
            Vec::new()
        };
        Ok(Node::Environment {
            span: Span::new(start, end),
            name,
            children,
        })
    }

    /// `\verb?body?` and `\Verb?body?`: the character after the (optionally
    /// starred) name delimits the body, which may not span lines.
    fn parse_verb(&mut self, start: usize, name: String) -> DocumentResult<Node> {
        if self.peek_char() == Some('*') {
            self.bump();
        }
        let delim = match self.bump() {
            Some((_, c)) if c != '\n' && c != '\r' => c,
            _ => {
                return Err(self.error_at(
                    start,
                    format!("missing delimiter after \\{}", name),
                ));
            }
        };
        loop {
            match self.bump() {
                Some((_, c)) if c == delim => break,
                Some((_, '\n')) | Some((_, '\r')) | None => {
                    return Err(self.error_at(start, format!("unterminated \\{}", name)));
                }
                Some(_) => {}
            }
        }
        Ok(Node::Macro {
            span: Span::new(start, self.pos()),
            name,
            args: Vec::new(),
        })
    }

    /// An ordinary macro; attach arguments only when the signature table
    /// knows the macro, and stop early if an expected required argument is
    /// not present.
    fn parse_macro(&mut self, start: usize, name: String) -> DocumentResult<Node> {
        let mut args = Vec::new();
        if let Some(signature) = MACRO_SIGNATURES.get(name.as_str()) {
            for marker in signature.chars() {
                match marker {
                    '*' => {
                        self.skip_whitespace();
                        if self.peek_char() == Some('*') {
                            self.bump();
                        }
                    }
                    '[' => {
                        self.skip_whitespace();
                        if self.peek_char() == Some('[') {
                            args.push(self.parse_optional_arg()?);
                        }
                    }
                    '{' => {
                        self.skip_whitespace();
                        if self.peek_char() == Some('{') {
                            args.push(self.parse_required_arg()?);
                        } else {
                            break;
                        }
                    }
                    '!' => {
                        self.skip_whitespace();
                        if self.peek_char() == Some('{') {
                            args.push(self.parse_raw_arg()?);
                        } else {
                            break;
                        }
                    }
                    _ => break,
                }
            }
        }
        Ok(Node::Macro {
            span: Span::new(start, self.pos()),
            name,
            args,
        })
    }

    fn parse_optional_arg(&mut self) -> DocumentResult<MacroArg> {
        let start = self.pos();
        self.bump();
        let children = self.parse_nodes(Until::OptionEnd)?;
        Ok(MacroArg {
            span: Span::new(start, self.pos()),
            optional: true,
            children,
        })
    }

    fn parse_required_arg(&mut self) -> DocumentResult<MacroArg> {
        let start = self.pos();
        self.bump();
        let children = self.parse_nodes(Until::GroupEnd)?;
        Ok(MacroArg {
            span: Span::new(start, self.pos()),
            optional: false,
            children,
        })
    }

    /// A required group scanned raw: brace-depth counting only, so URLs
    /// containing `%`, `#` or `&` survive structural parsing.
    fn parse_raw_arg(&mut self) -> DocumentResult<MacroArg> {
        let start = self.pos();
        self.bump();
        let body_start = self.pos();
        let mut depth = 1usize;
        loop {
            match self.bump() {
                Some((_, '{')) => {
                    depth += 1;
                }
                Some((i, '}')) => {
                    depth -= 1;
                    if depth == 0 {
                        let children = if i > body_start {
                            vec![Node::Text(Span::new(body_start, i))]
                        } else {
                            Vec::new()
                        };
                        return Ok(MacroArg {
                            span: Span::new(start, self.pos()),
                            optional: false,
                            children,
                        });
                    }
                }
                Some(_) => {}
                None => {
                    return Err(self.error_at(
                        self.source.len(),
                        "unexpected end of input, expected '}'",
                    ));
                }
            }
        }
    }
}

/// Parse a complete document into its top-level node sequence.
pub fn parse_document(source: &str) -> DocumentResult<Vec<Node>> {
    Parser::new(source).parse_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans_of(source: &str) -> Vec<Node> {
        parse_document(source).expect("parse failed")
    }

    #[test]
    fn test_plain_text_single_node() {
        let nodes = spans_of("hello world");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].span().text("hello world"), "hello world");
    }

    #[test]
    fn test_specials_split_text() {
        let source = "a & b";
        let nodes = spans_of(source);
        assert_eq!(nodes.len(), 3);
        assert!(matches!(nodes[1], Node::Specials(_)));
        assert_eq!(nodes[1].span().text(source), "&");
    }

    #[test]
    fn test_comment_excludes_newline() {
        let source = "a %note\nb";
        let nodes = spans_of(source);
        let comment = nodes
            .iter()
            .find(|n| matches!(n, Node::Comment(_)))
            .expect("no comment node");
        assert_eq!(comment.span().text(source), "%note");
    }

    #[test]
    fn test_macro_with_arguments() {
        let source = "\\textbf{bold}";
        let nodes = spans_of(source);
        match &nodes[0] {
            Node::Macro { name, args, span } => {
                assert_eq!(name, "textbf");
                assert_eq!(args.len(), 1);
                assert_eq!(span.text(source), source);
            }
            other => panic!("expected macro, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_macro_takes_no_arguments() {
        let source = "\\fancybox{x}";
        let nodes = spans_of(source);
        match &nodes[0] {
            Node::Macro { name, args, .. } => {
                assert_eq!(name, "fancybox");
                assert!(args.is_empty());
            }
            other => panic!("expected macro, got {:?}", other),
        }
        assert!(matches!(nodes[1], Node::Group { .. }));
    }

    #[test]
    fn test_control_symbol() {
        let source = "\\& and \\%";
        let nodes = spans_of(source);
        assert!(nodes[0].is_macro("&"));
        assert!(nodes[2].is_macro("%"));
    }

    #[test]
    fn test_starred_section() {
        let source = "\\section*{Skills}";
        let nodes = spans_of(source);
        match &nodes[0] {
            Node::Macro { name, args, span } => {
                assert_eq!(name, "section");
                assert_eq!(args.len(), 1);
                assert_eq!(span.text(source), source);
            }
            other => panic!("expected macro, got {:?}", other),
        }
    }

    #[test]
    fn test_href_two_arguments() {
        let source = "\\href{https://example.com}{home}";
        let nodes = spans_of(source);
        match &nodes[0] {
            Node::Macro { name, args, .. } => {
                assert_eq!(name, "href");
                assert_eq!(args.len(), 2);
                assert_eq!(args[0].span.text(source), "{https://example.com}");
                assert_eq!(args[1].span.text(source), "{home}");
            }
            other => panic!("expected macro, got {:?}", other),
        }
    }

    #[test]
    fn test_url_raw_argument_tolerates_percent() {
        let source = "\\url{http://example.com/%20dir#frag}";
        let nodes = spans_of(source);
        match &nodes[0] {
            Node::Macro { name, args, .. } => {
                assert_eq!(name, "url");
                assert_eq!(args.len(), 1);
            }
            other => panic!("expected macro, got {:?}", other),
        }
    }

    #[test]
    fn test_environment_matching() {
        let source = "\\begin{itemize}\\item a\\end{itemize}";
        let nodes = spans_of(source);
        match &nodes[0] {
            Node::Environment { name, span, .. } => {
                assert_eq!(name, "itemize");
                assert_eq!(span.text(source), source);
            }
            other => panic!("expected environment, got {:?}", other),
        }
    }

    #[test]
    fn test_environment_mismatch_is_error() {
        let result = parse_document("\\begin{itemize}\\end{enumerate}");
        assert!(result.is_err());
    }

    #[test]
    fn test_verbatim_environment_scanned_raw() {
        let source = "\\begin{verbatim}a & b { unbalanced\\end{verbatim}";
        let nodes = spans_of(source);
        match &nodes[0] {
            Node::Environment { name, children, .. } => {
                assert_eq!(name, "verbatim");
                assert_eq!(children.len(), 1);
                assert_eq!(
                    children[0].span().text(source),
                    "a & b { unbalanced"
                );
            }
            other => panic!("expected environment, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_verbatim_is_error() {
        assert!(parse_document("\\begin{verbatim}stuck").is_err());
    }

    #[test]
    fn test_verb_delimiter_scan() {
        let source = "\\verb|a&b_c| after";
        let nodes = spans_of(source);
        match &nodes[0] {
            Node::Macro { name, span, args } => {
                assert_eq!(name, "verb");
                assert!(args.is_empty());
                assert_eq!(span.text(source), "\\verb|a&b_c|");
            }
            other => panic!("expected macro, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_verb_is_error() {
        assert!(parse_document("\\verb|open").is_err());
        assert!(parse_document("\\verb|across\nlines|").is_err());
    }

    #[test]
    fn test_inline_math_children() {
        let source = "$a_i + b$";
        let nodes = spans_of(source);
        match &nodes[0] {
            Node::Math { span, children } => {
                assert_eq!(span.text(source), source);
                assert!(children.iter().any(|n| matches!(n, Node::Specials(_))));
            }
            other => panic!("expected math, got {:?}", other),
        }
    }

    #[test]
    fn test_display_math_bracket_form() {
        let source = "\\[x^2\\]";
        let nodes = spans_of(source);
        match &nodes[0] {
            Node::Math { span, .. } => assert_eq!(span.text(source), source),
            other => panic!("expected math, got {:?}", other),
        }
    }

    #[test]
    fn test_double_backslash_is_not_display_math() {
        let source = "a\\\\[2em]b";
        let nodes = spans_of(source);
        assert!(nodes[1].is_macro("\\"));
        assert_eq!(nodes[2].span().text(source), "[2em]b");
    }

    #[test]
    fn test_unclosed_group_reports_position() {
        let result = parse_document("line one\n{unclosed");
        match result {
            Err(DocumentError::ParseError { line, .. }) => assert_eq!(line, Some(2)),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_comment_swallowing_end_tag_is_error() {
        // The %-comment runs to end of line and takes \end{document} with it.
        let source = "\\begin{document}100% accurate\\end{document}";
        assert!(parse_document(source).is_err());
    }

    #[test]
    fn test_child_spans_contained_in_parent() {
        let source = "\\begin{center}text $m$\\end{center}";
        let nodes = spans_of(source);
        let parent = nodes[0].span();
        for child in nodes[0].children() {
            assert!(parent.contains(child.span()));
        }
    }
}
