//! Compiler error types.
#![allow(unused_assignments)]

use std::path::PathBuf;
use miette::Diagnostic;
use thiserror::Error;

use crate::attribute::AttributeError;

/// Coarse error categories, used by drivers to pick exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Syntax,
    Semantic,
    Attribute,
    Modeling,
    Template,
    Plugin,
}

/// Errors that can occur during compilation.
#[allow(unused_assignments)]
#[derive(Error, Diagnostic, Debug)]
pub enum CompilerError {
    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("Failed to access '{}': {message}", path.display())]
    #[diagnostic(code(bindforge::io::access_failed))]
    IoError {
        path: PathBuf,
        message: String,
    },

    #[error("Invalid configuration '{}': {message}", path.display())]
    #[diagnostic(code(bindforge::io::invalid_config))]
    InvalidConfig {
        path: PathBuf,
        message: String,
    },

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("Syntax error at {file}:{line}:{column}: {message}")]
    #[diagnostic(
        code(bindforge::parse::syntax_error),
        help("Pass --continue-on-errors to parse the rest of the file on a best-effort basis")
    )]
    SyntaxError {
        message: String,
        file: String,
        line: usize,
        column: usize,
    },

    // =========================================================================
    // Semantic Errors
    // =========================================================================
    #[error("{file}:{line}:{column}: {message}")]
    #[diagnostic(code(bindforge::semantic::invalid_declaration))]
    SemanticError {
        message: String,
        file: String,
        line: usize,
        column: usize,
    },

    #[error("{file}:{line}:{column}: unsupported {construct} declaration '{name}'")]
    #[diagnostic(
        code(bindforge::semantic::unsupported_construct),
        help("Type declarations must be an alias, an opaque pointer alias, an enumeration or an interface")
    )]
    UnsupportedConstruct {
        construct: String,
        name: String,
        file: String,
        line: usize,
        column: usize,
    },

    // =========================================================================
    // Attribute Errors
    // =========================================================================
    #[error("{file}:{line}:{column}: {source}")]
    #[diagnostic(code(bindforge::attribute::invalid_arguments))]
    Attribute {
        source: AttributeError,
        file: String,
        line: usize,
        column: usize,
    },

    // =========================================================================
    // Modeling Errors
    // =========================================================================
    #[error("Interface '{interface}' has more than one factory tagged '{tag}'")]
    #[diagnostic(
        code(bindforge::model::duplicate_factory_tag),
        help("Factory tags become enumeration options and must be unique per interface")
    )]
    DuplicateFactoryTag {
        interface: String,
        tag: String,
    },

    // =========================================================================
    // Template Errors
    // =========================================================================
    #[error("Template not found: {name}")]
    #[diagnostic(code(bindforge::template::not_found))]
    TemplateNotFound {
        name: String,
        searched: Vec<PathBuf>,
    },

    #[error("Failed to render template '{name}': {message}")]
    #[diagnostic(code(bindforge::template::render_failed))]
    TemplateRender {
        name: String,
        message: String,
    },

    // =========================================================================
    // Plugin Errors
    // =========================================================================
    #[error("Unsupported language: {language}")]
    #[diagnostic(
        code(bindforge::plugin::unsupported_language),
        help("Known front-ends: cpp, delphi")
    )]
    UnsupportedLanguage {
        language: String,
    },
}

impl CompilerError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::IoError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::IoError { .. } | Self::InvalidConfig { .. } => ErrorKind::Io,
            Self::SyntaxError { .. } => ErrorKind::Syntax,
            Self::SemanticError { .. } | Self::UnsupportedConstruct { .. } => ErrorKind::Semantic,
            Self::Attribute { .. } => ErrorKind::Attribute,
            Self::DuplicateFactoryTag { .. } => ErrorKind::Modeling,
            Self::TemplateNotFound { .. } | Self::TemplateRender { .. } => ErrorKind::Template,
            Self::UnsupportedLanguage { .. } => ErrorKind::Plugin,
        }
    }

    /// Returns the source position for errors that carry one.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            Self::SyntaxError { line, column, .. }
            | Self::SemanticError { line, column, .. }
            | Self::UnsupportedConstruct { line, column, .. }
            | Self::Attribute { line, column, .. } => Some((*line, *column)),
            _ => None,
        }
    }
}
