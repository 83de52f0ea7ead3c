//! Grammar engine shared by the dialect front-ends.
//!
//! ```text
//! source ──► lexer ──► TokenStream ──► dialect grammar ──► SyntaxTree
//! ```
//!
//! Each dialect supplies its own recursive-descent grammar over a shared
//! token stream and produces the same concrete tree. Grammars always
//! recover; syntax errors are collected on the tree and it is up to the
//! front-end whether they are fatal.

mod lexer;
mod stream;
mod tree;

pub use lexer::{tokenize, Dialect, Token, TokenKind};
pub use stream::TokenStream;
pub use tree::{
    ArgDecl, ArgDirection, EnumMember, InterfaceBody, Item, MethodDecl, PropertyDecl, SyntaxTree,
    TypeBody, TypeDecl, TypeExpr,
};

use crate::diagnostic::SourcePos;

/// A documentation comment with its markers stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocComment {
    pub text: String,
    /// Position of the comment's first line.
    pub pos: SourcePos,
}

/// A recoverable syntax error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxDiagnostic {
    pub message: String,
    pub pos: SourcePos,
}

impl SyntaxDiagnostic {
    pub fn new(message: impl Into<String>, pos: SourcePos) -> Self {
        Self {
            message: message.into(),
            pos,
        }
    }
}
