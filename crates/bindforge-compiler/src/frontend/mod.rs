//! Language front-ends for parsing interface descriptions into the model.
//!
//! Each front-end is responsible for:
//! 1. Parsing source text in its dialect into a syntax tree
//! 2. Lowering the tree into the unified [`File`] model
//!
//! Lowering is shared, so every dialect yields the same model shapes and the
//! same diagnostics for the same semantic mistakes.

pub mod cpp;
pub mod delphi;
mod lower;

pub use lower::lower;

use crate::diagnostic::CompilerError;
use crate::model::File;

/// Per-parse options.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Name recorded on the [`File`] and used in diagnostics.
    pub source_name: String,
    /// Record syntax errors and keep going instead of failing.
    pub continue_on_errors: bool,
}

impl ParseOptions {
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            continue_on_errors: false,
        }
    }
}

/// Trait for language front-ends.
pub trait FrontEndParser {
    /// Returns the language key (e.g., "cpp", "delphi").
    fn language(&self) -> &str;

    /// Returns file extensions this front-end handles (e.g., ["h", "hpp"]).
    fn extensions(&self) -> &[&str];

    /// Parses one source file into the model.
    fn parse(&self, content: &str, options: &ParseOptions) -> Result<File, CompilerError>;
}
