//! Language-agnostic parsing and extraction trait.
//!
//! `LanguageExtractor` is the extension point for adding new languages.
//! Implement it to teach the loader how to parse a language with
//! Tree-sitter and how to pull packages, imports and declarations out of
//! the resulting tree.

use std::path::PathBuf;
use tree_sitter::{Node, Tree};

use arch_conform_core::FileFacts;

/// A source file with its syntax tree.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    /// Path relative to the analysis root.
    pub path: PathBuf,
    /// Source text the tree was parsed from.
    pub source: String,
    /// Complete syntax tree (no error nodes).
    pub tree: Tree,
}

/// Why a file could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// Human-readable message.
    pub message: String,
}

impl ParseFailure {
    /// Failure not tied to a position.
    #[must_use]
    pub fn at_start(message: impl Into<String>) -> Self {
        Self {
            line: 1,
            column: 1,
            message: message.into(),
        }
    }
}

/// Trait for language-specific Tree-sitter parsing and extraction.
///
/// Implementations must be stateless so the loader can call them from
/// several threads at once.
pub trait LanguageExtractor: Send + Sync {
    /// Language identifier (e.g., `"go"`).
    fn language_id(&self) -> &'static str;

    /// File extensions this extractor handles (e.g., `&[".go"]`).
    fn extensions(&self) -> &'static [&'static str];

    /// Parses source text into a complete syntax tree.
    ///
    /// # Errors
    ///
    /// Returns the first syntax error if the tree contains error or missing
    /// nodes.
    fn parse(&self, source: &str) -> Result<Tree, ParseFailure>;

    /// Extracts package, imports and top-level declarations in one pass.
    fn extract(&self, file: &ParsedFile) -> FileFacts;
}

/// 1-indexed line and character column of a node's start.
///
/// Tree-sitter reports byte columns; they are converted so that
/// positions after non-ASCII text match what editors show.
#[must_use]
pub fn position(node: &Node<'_>, src: &[u8]) -> (usize, usize) {
    let point = node.start_position();
    let end = node.start_byte().min(src.len());
    let line_start = end.saturating_sub(point.column);
    let column = String::from_utf8_lossy(&src[line_start..end]).chars().count();
    (point.row + 1, column + 1)
}

/// Finds the first error or missing node in document order.
#[must_use]
pub fn first_syntax_error(tree: &Tree, src: &[u8]) -> Option<ParseFailure> {
    let root = tree.root_node();
    if !root.has_error() {
        return None;
    }

    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(describe(&node, src));
        }
        // Only descend into subtrees that contain the error.
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return Some(ParseFailure::at_start("syntax error"));
            }
        }
    }
}

fn describe(node: &Node<'_>, src: &[u8]) -> ParseFailure {
    let (line, column) = position(node, src);
    let message = if node.is_missing() {
        format!("syntax error: missing `{}`", node.kind())
    } else {
        let snippet: String = node
            .utf8_text(src)
            .unwrap_or("")
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(40)
            .collect();
        if snippet.trim().is_empty() {
            "syntax error".to_string()
        } else {
            format!("syntax error near `{}`", snippet.trim())
        }
    };
    ParseFailure {
        line,
        column,
        message,
    }
}
