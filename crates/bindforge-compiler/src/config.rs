//! Compiler configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::codegen::GenerationMode;
use crate::diagnostic::CompilerError;

/// Configuration for the bindforge compiler.
///
/// Loadable from a JSON file; command line flags are applied on top.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct CompilerConfig {
    /// Generator key (default: "cpp").
    pub target: String,

    /// Front-end key. When unset, it is picked per file from the extension.
    pub language: Option<String>,

    /// Directory searched for templates before the built-in set.
    pub templates: Option<PathBuf>,

    /// Record syntax errors and keep parsing.
    pub continue_on_errors: bool,

    /// Names treated as core types in every file.
    pub core_types: Vec<String>,

    /// Explicit type spellings; these win over the generator's own.
    pub type_mappings: BTreeMap<String, String>,

    /// Directory to write generated files.
    pub output_dir: PathBuf,

    pub mode: GenerationMode,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            target: "cpp".to_string(),
            language: None,
            templates: None,
            continue_on_errors: false,
            core_types: Vec::new(),
            type_mappings: BTreeMap::new(),
            output_dir: PathBuf::from("."),
            mode: GenerationMode::Bindings,
        }
    }
}

impl CompilerConfig {
    /// Reads a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, CompilerError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CompilerError::io(path, e.to_string()))?;
        Self::from_json(&content).map_err(|message| CompilerError::InvalidConfig {
            path: path.to_path_buf(),
            message,
        })
    }

    fn from_json(content: &str) -> Result<Self, String> {
        serde_json::from_str(content).map_err(|e| e.to_string())
    }

    /// Parses and records one `Name=Spelling` mapping.
    pub fn add_mapping(&mut self, spec: &str) -> Result<(), String> {
        match spec.split_once('=') {
            Some((name, spelling)) if !name.trim().is_empty() && !spelling.trim().is_empty() => {
                self.type_mappings
                    .insert(name.trim().to_string(), spelling.trim().to_string());
                Ok(())
            }
            _ => Err(format!("expected Name=Spelling, found '{spec}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::ErrorKind;

    #[test]
    fn test_defaults() {
        let config = CompilerConfig::default();
        assert_eq!(config.target, "cpp");
        assert!(config.language.is_none());
        assert_eq!(config.mode, GenerationMode::Bindings);
    }

    #[test]
    fn test_from_json_partial() {
        let config = CompilerConfig::from_json(
            r#"{
                "target": "csharp",
                "continueOnErrors": true,
                "coreTypes": ["IUnknown"],
                "typeMappings": { "HRESULT": "uint" },
                "mode": "config"
            }"#,
        )
        .unwrap();
        assert_eq!(config.target, "csharp");
        assert!(config.continue_on_errors);
        assert_eq!(config.core_types, vec!["IUnknown"]);
        assert_eq!(config.type_mappings["HRESULT"], "uint");
        assert_eq!(config.mode, GenerationMode::Config);
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = CompilerConfig::from_json(r#"{ "tagret": "cpp" }"#).unwrap_err();
        assert!(err.contains("tagret"));
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bindforge.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = CompilerConfig::load(&path).unwrap_err();
        assert!(matches!(err, CompilerError::InvalidConfig { .. }));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_load_missing_file() {
        let err = CompilerConfig::load(Path::new("/nonexistent/bindforge.json")).unwrap_err();
        assert!(matches!(err, CompilerError::IoError { .. }));
    }

    #[test]
    fn test_add_mapping() {
        let mut config = CompilerConfig::default();
        config.add_mapping("int32_t = Int32").unwrap();
        assert_eq!(config.type_mappings["int32_t"], "Int32");
        assert!(config.add_mapping("int32_t").is_err());
        assert!(config.add_mapping("=x").is_err());
    }
}
