//! Diagnostic types for error reporting.

mod error;
mod span;

pub use error::{CompilerError, ErrorKind};
pub use span::SourcePos;
