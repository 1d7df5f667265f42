//! Tree-sitter parsers for extracting imports from source code
//!
//! This module wraps the JavaScript and TypeScript grammars behind a small
//! adapter: pick a [`Grammar`] from the file name, produce a syntax tree, and
//! hand the tree to [`typescript::extract_imports`].
//!
//! The graph builder only depends on the [`ImportParser`] trait so that tests
//! can swap in a parser that fails or returns canned imports.

pub mod typescript;

use anyhow::{Context, Result};
use tree_sitter::{Parser, Tree};

use crate::models::ImportStatement;

/// Concrete Tree-sitter grammar used for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// tree-sitter-javascript (handles JSX)
    JavaScript,
    /// tree-sitter-typescript, plain TypeScript dialect
    TypeScript,
    /// tree-sitter-typescript, TSX dialect
    Tsx,
}

impl Grammar {
    /// Select the grammar for a file name or path
    pub fn for_path(path: &str) -> Option<Self> {
        let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
        let (_, ext) = file_name.rsplit_once('.')?;
        match ext {
            "js" | "jsx" => Some(Grammar::JavaScript),
            "ts" => Some(Grammar::TypeScript),
            "tsx" => Some(Grammar::Tsx),
            _ => None,
        }
    }

    fn ts_language(self) -> tree_sitter::Language {
        match self {
            Grammar::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Grammar::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Grammar::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// Whether a file name is an analyzable JS/TS source (`.js .jsx .ts .tsx`)
pub fn is_eligible(file_name: &str) -> bool {
    Grammar::for_path(file_name).is_some()
}

/// Source of raw imports for a single file
pub trait ImportParser {
    /// Extract the raw imports of `source`, which was read from `path`
    ///
    /// Ineligible paths yield an empty list, not an error.
    fn parse_imports(&self, path: &str, source: &str) -> Result<Vec<ImportStatement>>;
}

/// Tree-sitter backed parser for JavaScript and TypeScript
///
/// Holds no parser state; a fresh `tree_sitter::Parser` is created per call so
/// the adapter can be shared across worker threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceParser;

impl SourceParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse source text into a syntax tree with the given grammar
    pub fn parse(&self, source: &str, grammar: Grammar) -> Result<Tree> {
        let mut parser = Parser::new();
        parser
            .set_language(&grammar.ts_language())
            .with_context(|| format!("Failed to set {:?} language", grammar))?;

        parser
            .parse(source, None)
            .with_context(|| format!("Failed to parse {:?} source", grammar))
    }
}

impl ImportParser for SourceParser {
    fn parse_imports(&self, path: &str, source: &str) -> Result<Vec<ImportStatement>> {
        let Some(grammar) = Grammar::for_path(path) else {
            log::debug!("Skipping imports of non JS/TS file: {}", path);
            return Ok(Vec::new());
        };

        let tree = self.parse(source, grammar)?;
        Ok(typescript::extract_imports(&tree, source))
    }
}
