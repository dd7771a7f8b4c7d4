//! Line-level recognition of the LaTeX directives the flattener cares about.
//!
//! Recognition is regex based and works one line at a time. A `%` anywhere before a
//! directive disables it (even an escaped `\%`), directives split over several lines
//! are not seen, and verbatim environments get no special treatment.

use crate::error::{FlatexError, Result};
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Comment marker of the markup language
pub const COMMENT_MARKER: char = '%';

static INCLUSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^%]*?\\(?:input|include)\{([^}]*)\}").expect("valid inclusion regex")
});

static GRAPHICS_LINE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^%]*includegraphics").expect("valid graphics regex"));

static GRAPHICS_ARG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^%]*?includegraphics\*?(?:\[(?:[^\]{}]|\{[^}]*\})*\])?\s*\{([^}]*)\}")
        .expect("valid graphics argument regex")
});

static PACKAGE_LINE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^%]*usepackage").expect("valid package regex"));

static PACKAGE_ARG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^%]*?usepackage[^{]*\{([^}]*)").expect("valid package argument regex")
});

/// Whether the line holds an uncommented `\input{..}` or `\include{..}`
#[must_use]
pub fn is_inclusion(line: &str) -> bool {
    INCLUSION_PATTERN.is_match(line)
}

/// Whether the line holds an uncommented `includegraphics`
#[must_use]
pub fn is_graphics(line: &str) -> bool {
    GRAPHICS_LINE_PATTERN.is_match(line)
}

/// Whether the line holds an uncommented `usepackage`
#[must_use]
pub fn is_package(line: &str) -> bool {
    PACKAGE_LINE_PATTERN.is_match(line)
}

/// Whether the line pulls in the bibliography (`\bibliographystyle` does not count)
#[must_use]
pub fn is_bibliography(line: &str) -> bool {
    line.starts_with("\\bibliography") && !line.starts_with("\\bibliographystyle")
}

/// Whether the line is nothing but a comment
#[must_use]
pub fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with(COMMENT_MARKER)
}

fn first_group(pattern: &Regex, line: &str) -> Result<String> {
    pattern
        .captures(line)
        .and_then(|captures| captures.get(1))
        .map(|group| group.as_str().to_string())
        .ok_or_else(|| FlatexError::MalformedDirective {
            line: line.to_string(),
        })
}

/// Extracts the file argument of the first inclusion directive on the line
///
/// # Errors
///
/// Returns `FlatexError::MalformedDirective` if the line holds no inclusion directive.
pub fn extract_inclusion_target(line: &str) -> Result<String> {
    first_group(&INCLUSION_PATTERN, line)
}

/// Extracts the path argument of a graphics directive, skipping any `[..]` options
///
/// # Errors
///
/// Returns `FlatexError::MalformedDirective` if no brace group follows the keyword.
pub fn extract_graphics_path(line: &str) -> Result<PathBuf> {
    first_group(&GRAPHICS_ARG_PATTERN, line).map(PathBuf::from)
}

/// Extracts the raw argument of a package directive (may be a comma separated list)
///
/// # Errors
///
/// Returns `FlatexError::MalformedDirective` if no brace group follows the keyword.
pub fn extract_package_name(line: &str) -> Result<String> {
    first_group(&PACKAGE_ARG_PATTERN, line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inclusion_basic() {
        assert!(is_inclusion("\\input{sec1}\n"));
        assert!(is_inclusion("\\include{chapters/intro}"));
        assert!(is_inclusion("  some text \\input{a.tex} more"));
        assert!(!is_inclusion("Plain text line\n"));
        assert!(!is_inclusion("\\includegraphics{fig}"));
        assert!(!is_inclusion("\\input{unterminated"));
    }

    #[test]
    fn test_inclusion_comment_before_directive() {
        assert!(!is_inclusion("% \\input{secret}\n"));
        assert!(!is_inclusion("text % \\include{secret}"));
        assert!(!is_inclusion("%\\input{secret}"));
    }

    #[test]
    fn test_inclusion_comment_after_directive() {
        assert!(is_inclusion("\\input{sec1} % keep this\n"));
        assert_eq!(
            extract_inclusion_target("\\input{sec1} % {other}").unwrap(),
            "sec1"
        );
    }

    #[test]
    fn test_extract_inclusion_target() {
        assert_eq!(extract_inclusion_target("\\input{sec1}").unwrap(), "sec1");
        assert_eq!(
            extract_inclusion_target("\\section{Intro} \\input{parts/a.tex}").unwrap(),
            "parts/a.tex"
        );
        assert_eq!(
            extract_inclusion_target("\\include{x}\\include{y}").unwrap(),
            "x"
        );
        assert!(matches!(
            extract_inclusion_target("no directive"),
            Err(FlatexError::MalformedDirective { .. })
        ));
    }

    #[test]
    fn test_graphics() {
        assert!(is_graphics("\\includegraphics{diagrams/fig1}"));
        assert!(is_graphics("  \\includegraphics[width=0.5\\textwidth]{fig.png}"));
        assert!(!is_graphics("% \\includegraphics{fig}"));

        assert_eq!(
            extract_graphics_path("\\includegraphics{diagrams/fig1}").unwrap(),
            PathBuf::from("diagrams/fig1")
        );
        assert_eq!(
            extract_graphics_path("\\includegraphics[width=3cm]{img/plot.pdf}").unwrap(),
            PathBuf::from("img/plot.pdf")
        );
    }

    #[test]
    fn test_graphics_options_with_braces() {
        assert_eq!(
            extract_graphics_path("\\includegraphics[trim={0 0 1cm 0},clip]{fig}").unwrap(),
            PathBuf::from("fig")
        );
        assert_eq!(
            extract_graphics_path("\\includegraphics*[width=2cm, angle=90] {img/rot}").unwrap(),
            PathBuf::from("img/rot")
        );
    }

    #[test]
    fn test_graphics_without_brace_group_is_malformed() {
        let line = "see includegraphics docs\n";
        assert!(is_graphics(line));
        assert!(matches!(
            extract_graphics_path(line),
            Err(FlatexError::MalformedDirective { .. })
        ));
    }

    #[test]
    fn test_package() {
        assert!(is_package("\\usepackage{mystyle}"));
        assert!(is_package("\\usepackage[utf8]{inputenc}"));
        assert!(!is_package("%\\usepackage{mystyle}"));

        assert_eq!(extract_package_name("\\usepackage{mystyle}").unwrap(), "mystyle");
        assert_eq!(
            extract_package_name("\\usepackage[utf8]{inputenc}").unwrap(),
            "inputenc"
        );
        assert_eq!(
            extract_package_name("\\usepackage{amsmath,amssymb}").unwrap(),
            "amsmath,amssymb"
        );
    }

    #[test]
    fn test_bibliography() {
        assert!(is_bibliography("\\bibliography{refs}\n"));
        assert!(!is_bibliography("\\bibliographystyle{plain}\n"));
        assert!(!is_bibliography("  \\bibliography{refs}"));
    }

    #[test]
    fn test_comment() {
        assert!(is_comment("% comment\n"));
        assert!(is_comment("    %indented"));
        assert!(!is_comment("text % trailing"));
        assert!(!is_comment("\n"));
    }
}
