//! Writing generated files.
//!
//! Content is written to a temporary file next to its destination and renamed
//! into place once complete, so a failure never leaves a truncated file.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::codegen::GeneratedCode;
use crate::diagnostic::CompilerError;

/// Atomically replaces `path` with `content`.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), CompilerError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|e| CompilerError::io(&dir, e.to_string()))?;

    let mut temp =
        NamedTempFile::new_in(&dir).map_err(|e| CompilerError::io(&dir, e.to_string()))?;
    if let Err(e) = temp.write_all(content.as_bytes()) {
        return Err(CompilerError::io(temp.path(), e.to_string()));
    }
    temp.persist(path)
        .map_err(|e| CompilerError::io(path, e.error.to_string()))?;

    debug!(path = %path.display(), bytes = content.len(), "wrote output");
    Ok(())
}

/// Writes every generated file under `out_dir`, returning the paths written.
pub fn write_generated(
    out_dir: &Path,
    generated: &GeneratedCode,
) -> Result<Vec<PathBuf>, CompilerError> {
    let mut written = Vec::with_capacity(generated.files.len());
    for (filename, content) in &generated.files {
        let path = out_dir.join(filename);
        write_atomic(&path, content)?;
        written.push(path);
    }
    Ok(written)
}
