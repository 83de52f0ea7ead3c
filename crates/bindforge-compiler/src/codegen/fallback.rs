//! Structural backend for targets without a dedicated generator.

use std::collections::BTreeMap;

use crate::model::{Argument, File};

use super::{source_stem, GenerationMode, Generator};

/// Renders the model as-is for any target key: declared names, no remapping.
pub struct FallbackGenerator {
    language: String,
    /// The key as it may appear in an output file name.
    file_tag: String,
}

impl FallbackGenerator {
    pub fn new(language: impl Into<String>) -> Self {
        let language = language.into();
        let file_tag = file_tag(&language);
        Self { language, file_tag }
    }
}

/// Anything but ASCII letters, digits, `-`, `_` and `+` becomes `_`, so the
/// key can never add a path component.
fn file_tag(language: &str) -> String {
    let tag: String = language
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '+' => c,
            _ => '_',
        })
        .collect();
    if tag.is_empty() {
        "fallback".to_string()
    } else {
        tag
    }
}

impl Generator for FallbackGenerator {
    fn language(&self) -> &str {
        &self.language
    }

    fn register_type_mappings(&self, _mappings: &mut BTreeMap<String, String>) {}

    fn template_name(&self, mode: GenerationMode) -> &str {
        match mode {
            GenerationMode::Bindings => "fallback/bindings.txt.j2",
            GenerationMode::Config => "fallback/config.json.j2",
        }
    }

    fn output_file_name(&self, file: &File, mode: GenerationMode) -> String {
        let stem = source_stem(file);
        match mode {
            GenerationMode::Bindings => format!("{}.{}.txt", stem, self.file_tag),
            GenerationMode::Config => format!("{}.{}.json", stem, self.file_tag),
        }
    }

    fn namespace_separator(&self) -> &str {
        "."
    }

    fn spell_modifiers(&self, base: &str, modifiers: &str) -> String {
        format!("{base}{modifiers}")
    }

    fn escape_identifier(&self, name: &str) -> String {
        name.to_string()
    }

    fn format_argument(&self, argument: &Argument, type_name: &str) -> String {
        let mut text = String::new();
        if argument.is_out {
            text.push_str("out ");
        } else if argument.is_out_pointer {
            text.push_str("inout ");
        }
        text.push_str(&argument.name);
        text.push_str(": ");
        text.push_str(type_name);
        text
    }

    fn remaps_types(&self) -> bool {
        false
    }
}
