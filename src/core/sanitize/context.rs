//! Traversal context and environment classification for the sanitizer.
//!
//! The walk threads an immutable `TraversalContext` downward and a single
//! mutable `WalkState` through the whole pass. Environment and macro name
//! classification lives here so the parser and the walker agree on what
//! counts as verbatim.

use phf::phf_set;

/// Environments whose bodies are scanned raw and never rewritten.
/// Matched on the lowercased name, so fancyvrb's `Verbatim` is covered.
static VERBATIM_ENVIRONMENTS: phf::Set<&'static str> = phf_set! {
    "verbatim",
    "lstlisting",
    "minted",
};

/// Macros whose arguments must never be rewritten.
static VERBATIM_MACROS: phf::Set<&'static str> = phf_set! {
    "verb",
    "Verb",
    "url",
    "path",
};

/// Environment-name prefixes treated as tables; alignment `&` stays raw
/// inside them. Prefix matching covers starred and width-parameterized
/// variants such as `tabular*` and `tabularx`.
static TABULAR_ENVIRONMENT_PREFIXES: &[&str] = &["tabular", "array", "longtable", "tabu"];

/// Environments whose bodies are math.
static MATH_ENVIRONMENTS: phf::Set<&'static str> = phf_set! {
    "math",
    "displaymath",
    "equation",
    "equation*",
    "align",
    "align*",
    "gather",
    "gather*",
    "multline",
    "multline*",
    "split",
    "cases",
};

pub fn is_verbatim_environment(name: &str) -> bool {
    VERBATIM_ENVIRONMENTS.contains(name.to_ascii_lowercase().as_str())
}

pub fn is_verbatim_macro(name: &str) -> bool {
    VERBATIM_MACROS.contains(name)
}

pub fn is_tabular_environment(name: &str) -> bool {
    TABULAR_ENVIRONMENT_PREFIXES
        .iter()
        .any(|prefix| name.starts_with(prefix))
}

pub fn is_math_environment(name: &str) -> bool {
    MATH_ENVIRONMENTS.contains(name) || name.ends_with("matrix") || name.ends_with("matrix*")
}

/// Immutable per-subtree traversal flags.
///
/// Deriving a context only ever sets a flag, so content nested inside a
/// guarded region can never lose that guard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalContext {
    /// Inside a table-family environment.
    pub in_tabular: bool,
    /// Inside math delimiters or a math environment.
    pub in_math: bool,
    /// Inside verbatim content.
    pub in_verbatim: bool,
    /// Inside the `document` environment body.
    pub in_document: bool,
}

impl TraversalContext {
    pub fn with_tabular(self) -> Self {
        Self {
            in_tabular: true,
            ..self
        }
    }

    pub fn with_math(self) -> Self {
        Self {
            in_math: true,
            ..self
        }
    }

    pub fn with_verbatim(self) -> Self {
        Self {
            in_verbatim: true,
            ..self
        }
    }

    pub fn with_document(self) -> Self {
        Self {
            in_document: true,
            ..self
        }
    }

    /// True when text in the current region must not be rewritten.
    pub fn is_guarded(&self) -> bool {
        self.in_verbatim || self.in_math || self.in_tabular
    }
}

/// Mutable bookkeeping for one walk, consulted only after the walk
/// completes (missing-structure diagnostics).
#[derive(Debug, Default)]
pub struct WalkState {
    /// A `\documentclass` macro was seen anywhere.
    pub documentclass_seen: bool,
    /// A `document` environment was seen anywhere.
    pub document_environment_seen: bool,
}
