//! Resolution of language keys to front-ends and generators.
//!
//! The set of plugins is fixed at build time; a key either names one of the
//! built-in implementations or nothing.

use std::path::Path;

use tracing::warn;

use crate::codegen::{CSharpGenerator, CppGenerator, FallbackGenerator, Generator};
use crate::diagnostic::CompilerError;
use crate::frontend::cpp::CppParser;
use crate::frontend::delphi::DelphiParser;
use crate::frontend::FrontEndParser;

/// Front-end keys and the extensions each one claims.
const PARSER_EXTENSIONS: &[(&str, &[&str])] = &[
    ("cpp", &["h", "hpp", "idl"]),
    ("delphi", &["pas", "dpr"]),
];

/// Returns the front-end registered under `key`.
pub fn resolve_parser(key: &str) -> Option<Box<dyn FrontEndParser>> {
    match key {
        "cpp" | "c++" => Some(Box::new(CppParser)),
        "delphi" | "pascal" => Some(Box::new(DelphiParser)),
        _ => None,
    }
}

/// Like [`resolve_parser`], but an unknown key is an error.
pub fn require_parser(key: &str) -> Result<Box<dyn FrontEndParser>, CompilerError> {
    resolve_parser(key).ok_or_else(|| CompilerError::UnsupportedLanguage {
        language: key.to_string(),
    })
}

/// Returns the built-in generator registered under `key`.
pub fn resolve_generator(key: &str) -> Option<Box<dyn Generator>> {
    match key {
        "cpp" | "c++" => Some(Box::new(CppGenerator)),
        "csharp" | "cs" | "c#" => Some(Box::new(CSharpGenerator)),
        _ => None,
    }
}

/// Resolves `key`, falling back to the structural generator for unknown
/// targets.
pub fn generator_or_fallback(key: &str) -> Box<dyn Generator> {
    resolve_generator(key).unwrap_or_else(|| {
        warn!(
            target_language = key,
            "no generator registered, rendering with the fallback generator"
        );
        Box::new(FallbackGenerator::new(key))
    })
}

/// Picks a front-end key from the file extension.
pub fn language_for_path(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    PARSER_EXTENSIONS
        .iter()
        .find(|(_, extensions)| extensions.contains(&extension.as_str()))
        .map(|(key, _)| *key)
}

/// Every extension some front-end claims.
pub fn known_extensions() -> impl Iterator<Item = &'static str> {
    PARSER_EXTENSIONS
        .iter()
        .flat_map(|(_, extensions)| extensions.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::ErrorKind;

    #[test]
    fn test_resolve_parser() {
        assert_eq!(resolve_parser("cpp").unwrap().language(), "cpp");
        assert_eq!(resolve_parser("delphi").unwrap().language(), "delphi");
        assert!(resolve_parser("cobol").is_none());
    }

    #[test]
    fn test_require_parser_unknown_is_plugin_error() {
        let err = require_parser("cobol").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Plugin);
        assert!(err.to_string().contains("cobol"));
    }

    #[test]
    fn test_resolve_generator() {
        assert_eq!(resolve_generator("cpp").unwrap().language(), "cpp");
        assert_eq!(resolve_generator("csharp").unwrap().language(), "csharp");
        assert!(resolve_generator("python").is_none());
    }

    #[test]
    fn test_unknown_generator_falls_back() {
        let generator = generator_or_fallback("python");
        assert_eq!(generator.language(), "python");
        assert!(!generator.remaps_types());
    }

    #[test]
    fn test_language_for_path() {
        assert_eq!(language_for_path(Path::new("a/b/media.h")), Some("cpp"));
        assert_eq!(language_for_path(Path::new("x.IDL")), Some("cpp"));
        assert_eq!(language_for_path(Path::new("Unit1.pas")), Some("delphi"));
        assert_eq!(language_for_path(Path::new("README.md")), None);
        assert_eq!(language_for_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_extensions_match_parsers() {
        for (key, extensions) in PARSER_EXTENSIONS {
            let parser = resolve_parser(key).unwrap();
            assert_eq!(parser.extensions(), *extensions);
        }
        assert!(known_extensions().any(|e| e == "dpr"));
    }
}
