//! # bindforge Compiler
//!
//! This crate compiles interface description files into binding code for
//! several target languages. Every front-end produces the same language
//! neutral model, and every generator renders from that model.
//!
//! ## Supported Languages
//!
//! - Front-ends: annotated C++ headers (`cpp`), Delphi units (`delphi`)
//! - Generators: C++ (`cpp`), C# COM interop (`csharp`), plus a structural
//!   fallback for any other key
//!
//! ## Architecture
//!
//! ```text
//! Source Code (.h, .pas, ...)
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Frontend   │  Grammar + lowering, doc-comment attributes
//! │ (src → File) │
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │  Specialize  │  Generic instantiations, factory constructors,
//! │ (File → Exp) │  UUID v5 identities
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Codegen    │  Type remapping + template rendering
//! │ (view → txt) │
//! └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bindforge_compiler::{Compiler, CompilerConfig};
//!
//! let config = CompilerConfig {
//!     target: "csharp".to_string(),
//!     output_dir: "generated".into(),
//!     ..CompilerConfig::default()
//! };
//!
//! let compiler = Compiler::new(config);
//! let result = compiler.compile(&["idl".into()])?;
//! ```

pub mod attribute;
pub mod codegen;
pub mod config;
pub mod diagnostic;
pub mod docs;
pub mod frontend;
pub mod model;
pub mod output;
pub mod plugins;
pub mod specialize;
pub mod syntax;
pub mod types;

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use codegen::{FallbackGenerator, GeneratedCode, TemplateSet};
use frontend::ParseOptions;
use model::File;

pub use config::CompilerConfig;
pub use diagnostic::{CompilerError, ErrorKind};

/// The main compiler struct that orchestrates the compilation pipeline.
pub struct Compiler {
    config: CompilerConfig,
    templates: TemplateSet,
}

impl Compiler {
    /// Creates a new compiler with the given configuration.
    pub fn new(config: CompilerConfig) -> Self {
        let templates = match &config.templates {
            Some(dir) => TemplateSet::with_directory(dir.clone()),
            None => TemplateSet::builtin(),
        };
        Self { config, templates }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compiles every input; directories are searched for files some
    /// front-end recognizes.
    ///
    /// Files are processed one at a time and the first failure stops the
    /// run. Outputs already written stay in place.
    pub fn compile(&self, inputs: &[PathBuf]) -> Result<CompileResult, CompilerError> {
        let files = self.discover(inputs)?;
        info!(files = files.len(), target = %self.config.target, "compiling");

        let mut result = CompileResult::default();
        for path in &files {
            let outcome = self.compile_file(path)?;
            result.files += 1;
            result.interfaces += outcome.interfaces;
            result.specializations += outcome.specializations;
            result.syntax_errors += outcome.syntax_errors;
            result.outputs.extend(outcome.outputs);
        }
        Ok(result)
    }

    /// Runs the full pipeline for one file:
    /// 1. Pick the front-end and parse into the model
    /// 2. Apply configured core types and type mappings
    /// 3. Expand generics and factories
    /// 4. Render through the target generator
    /// 5. Write output atomically
    pub fn compile_file(&self, path: &Path) -> Result<FileOutcome, CompilerError> {
        let mut file = self.parse_file(path)?;
        let (generated, specializations) = self.expand_and_render(&mut file)?;
        let outputs = output::write_generated(&self.config.output_dir, &generated)?;

        Ok(FileOutcome {
            source: path.to_path_buf(),
            interfaces: file.interfaces.len(),
            specializations,
            syntax_errors: file.syntax_errors,
            outputs,
        })
    }

    /// Reads and parses one file with the configured or inferred front-end.
    pub fn parse_file(&self, path: &Path) -> Result<File, CompilerError> {
        let language = self.language_for(path)?;
        let content =
            std::fs::read_to_string(path).map_err(|e| CompilerError::io(path, e.to_string()))?;
        self.parse_source(&content, &path.to_string_lossy(), &language)
    }

    /// Parses source text with the front-end registered under `language`.
    pub fn parse_source(
        &self,
        content: &str,
        source_name: &str,
        language: &str,
    ) -> Result<File, CompilerError> {
        let parser = plugins::require_parser(language)?;
        let options = ParseOptions {
            source_name: source_name.to_string(),
            continue_on_errors: self.config.continue_on_errors,
        };
        debug!(file = source_name, language, "parsing");
        let mut file = parser.parse(content, &options)?;
        if file.syntax_errors > 0 {
            warn!(
                file = source_name,
                errors = file.syntax_errors,
                "continuing past syntax errors"
            );
        }

        for name in &self.config.core_types {
            file.attributes.mark_core(name.clone());
        }
        for (name, spelling) in &self.config.type_mappings {
            file.attributes.map_type(name.clone(), spelling.clone());
        }
        Ok(file)
    }

    /// Expands `file` and renders it through the configured target.
    pub fn render(&self, file: &mut File) -> Result<GeneratedCode, CompilerError> {
        self.expand_and_render(file).map(|(generated, _)| generated)
    }

    fn expand_and_render(&self, file: &mut File) -> Result<(GeneratedCode, usize), CompilerError> {
        let expansion = specialize::expand(file)?;
        let generator = plugins::generator_or_fallback(&self.config.target);
        let generated = codegen::generate(
            file,
            &expansion,
            generator.as_ref(),
            self.config.mode,
            &self.templates,
        )?;
        Ok((generated, expansion.specializations.len()))
    }

    /// JSON dump of the expanded model, spelled without any remapping.
    pub fn inspect(&self, path: &Path) -> Result<String, CompilerError> {
        let mut file = self.parse_file(path)?;
        let expansion = specialize::expand(&mut file)?;
        let generator = FallbackGenerator::new("model");
        let view = codegen::bindings::build(&file, &expansion, &generator, self.config.mode);
        serde_json::to_string_pretty(&view).map_err(|e| CompilerError::TemplateRender {
            name: "model".to_string(),
            message: e.to_string(),
        })
    }

    fn language_for(&self, path: &Path) -> Result<String, CompilerError> {
        if let Some(language) = &self.config.language {
            return Ok(language.clone());
        }
        plugins::language_for_path(path)
            .map(str::to_string)
            .ok_or_else(|| CompilerError::UnsupportedLanguage {
                language: path
                    .extension()
                    .map(|ext| ext.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
            })
    }

    /// Expands directories into the recognized files beneath them, sorted.
    /// Explicit file arguments are kept as given.
    pub fn discover(&self, inputs: &[PathBuf]) -> Result<Vec<PathBuf>, CompilerError> {
        let mut files = Vec::new();
        for input in inputs {
            if !input.exists() {
                return Err(CompilerError::io(input, "no such file or directory"));
            }
            if !input.is_dir() {
                files.push(input.clone());
                continue;
            }

            let mut found = Vec::new();
            for entry in WalkDir::new(input)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if path.is_file() && self.recognizes(path) {
                    found.push(path.to_path_buf());
                }
            }
            found.sort();
            debug!(dir = %input.display(), files = found.len(), "discovered inputs");
            files.extend(found);
        }
        Ok(files)
    }

    fn recognizes(&self, path: &Path) -> bool {
        match &self.config.language {
            Some(language) => plugins::resolve_parser(language).is_some_and(|parser| {
                path.extension()
                    .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
                    .is_some_and(|ext| parser.extensions().contains(&ext.as_str()))
            }),
            None => plugins::language_for_path(path).is_some(),
        }
    }
}

/// Result of compiling one file.
#[derive(Debug)]
pub struct FileOutcome {
    pub source: PathBuf,
    pub interfaces: usize,
    pub specializations: usize,
    pub syntax_errors: usize,
    pub outputs: Vec<PathBuf>,
}

/// Result of a successful compilation.
#[derive(Debug, Default)]
pub struct CompileResult {
    /// Number of input files compiled.
    pub files: usize,
    /// Interfaces declared across all files.
    pub interfaces: usize,
    /// Generic instantiations generated.
    pub specializations: usize,
    /// Syntax errors tolerated in continue-on-errors mode.
    pub syntax_errors: usize,
    /// Every file written.
    pub outputs: Vec<PathBuf>,
}
