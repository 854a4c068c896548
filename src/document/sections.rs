//! Section outline extraction.
//!
//! Sectioning commands are scanned with regexes rather than the structural
//! parser: the outline is needed even for sources the parser rejects, and
//! titles live in flat `{...}` arguments anyway.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    /// Title-bearing sectioning commands, scanned in this order.
    static ref SECTION_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\\section\*?\{([^}]+)\}").expect("section pattern"),
        Regex::new(r"(?i)\\subsection\*?\{([^}]+)\}").expect("subsection pattern"),
        Regex::new(r"(?i)\\cvsection\{([^}]+)\}").expect("cvsection pattern"),
        Regex::new(r"(?i)\\cvsubsection\{([^}]+)\}").expect("cvsubsection pattern"),
    ];
}

/// Outline used when a source has no recognizable sectioning commands.
pub const DEFAULT_SECTIONS: &[&str] = &["Education", "Experience", "Skills"];

/// One entry of a document's outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: String,
    pub content: String,
}

impl Section {
    fn placeholder(title: String) -> Self {
        Section {
            content: format!("Content for {}", title),
            title,
        }
    }
}

/// Extract the section outline of a document.
///
/// Duplicate titles collapse to their first occurrence, preserving the
/// order in which titles were first seen.
pub fn extract_sections(content: &str) -> Vec<Section> {
    let mut seen: IndexMap<String, Section> = IndexMap::new();
    for pattern in SECTION_PATTERNS.iter() {
        for caps in pattern.captures_iter(content) {
            let title = caps[1].trim().to_string();
            if title.is_empty() {
                continue;
            }
            seen.entry(title.clone())
                .or_insert_with(|| Section::placeholder(title));
        }
    }
    if seen.is_empty() {
        return DEFAULT_SECTIONS
            .iter()
            .map(|title| Section::placeholder(title.to_string()))
            .collect();
    }
    seen.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_section_titles() {
        let source = "\\section{Experience}\\section{Education}";
        let titles: Vec<_> = extract_sections(source)
            .into_iter()
            .map(|section| section.title)
            .collect();
        assert_eq!(titles, vec!["Experience", "Education"]);
    }

    #[test]
    fn test_starred_and_cv_variants() {
        let source = "\\section*{Skills}\\cvsection{Projects}\\cvsubsection{Open Source}";
        let titles: Vec<_> = extract_sections(source)
            .into_iter()
            .map(|section| section.title)
            .collect();
        assert!(titles.contains(&"Skills".to_string()));
        assert!(titles.contains(&"Projects".to_string()));
        assert!(titles.contains(&"Open Source".to_string()));
    }

    #[test]
    fn test_duplicates_collapse_to_first() {
        let source = "\\section{Skills}\\section{Experience}\\section{Skills}";
        let titles: Vec<_> = extract_sections(source)
            .into_iter()
            .map(|section| section.title)
            .collect();
        assert_eq!(titles, vec!["Skills", "Experience"]);
    }

    #[test]
    fn test_case_insensitive_commands() {
        let source = "\\Section{Awards}";
        let titles: Vec<_> = extract_sections(source)
            .into_iter()
            .map(|section| section.title)
            .collect();
        assert_eq!(titles, vec!["Awards"]);
    }

    #[test]
    fn test_default_outline_when_empty() {
        let sections = extract_sections("plain text, no commands");
        let titles: Vec<_> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, DEFAULT_SECTIONS);
        assert_eq!(sections[0].content, "Content for Education");
    }

    #[test]
    fn test_titles_are_trimmed() {
        let sections = extract_sections("\\section{  Education }");
        assert_eq!(sections[0].title, "Education");
    }
}
