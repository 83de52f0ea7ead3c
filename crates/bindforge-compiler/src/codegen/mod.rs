//! Template-driven binding generation from the unified model.
//!
//! A [`Generator`] contributes target-specific knowledge only:
//! - Type spellings registered into the file's type mappings
//! - Template names and output file naming
//! - Modifier, identifier and argument spelling
//!
//! Everything else is shared: the model is turned into a serializable
//! binding view (see [`bindings`]) and rendered with a [`TemplateSet`].

pub mod bindings;
mod cpp;
mod csharp;
mod fallback;
mod naming;
mod spelling;
mod templates;

pub use cpp::CppGenerator;
pub use csharp::CSharpGenerator;
pub use fallback::FallbackGenerator;
pub use naming::{to_pascal_case, to_snake_case};
pub use spelling::TypeSpeller;
pub use templates::TemplateSet;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::diagnostic::CompilerError;
use crate::model::{Argument, File};
use crate::specialize::Expansion;

/// What a generator run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Full binding code.
    #[default]
    Bindings,
    /// Metadata manifest.
    Config,
}

/// A target-language backend.
pub trait Generator {
    /// Target key (e.g., "cpp", "csharp").
    fn language(&self) -> &str;

    /// Adds this target's spellings for source type names.
    fn register_type_mappings(&self, mappings: &mut BTreeMap<String, String>);

    fn template_name(&self, mode: GenerationMode) -> &str;

    fn output_file_name(&self, file: &File, mode: GenerationMode) -> String;

    fn namespace_separator(&self) -> &str;

    /// Applies usage modifiers (`*`, `&`, `[]`) to a spelled base type.
    fn spell_modifiers(&self, base: &str, modifiers: &str) -> String;

    /// Makes `name` safe to use as an identifier in the target language.
    fn escape_identifier(&self, name: &str) -> String;

    /// One entry of a parameter list.
    fn format_argument(&self, argument: &Argument, type_name: &str) -> String;

    /// Whether type names go through core-type and override lookup.
    fn remaps_types(&self) -> bool {
        true
    }
}

/// Generated output files.
pub struct GeneratedCode {
    /// Map of filename to content.
    pub files: Vec<(String, String)>,
}

/// Renders one file through `generator`.
///
/// The generator's type mappings are registered into the file first; an
/// override already present (from configuration) is left as is.
pub fn generate(
    file: &mut File,
    expansion: &Expansion,
    generator: &dyn Generator,
    mode: GenerationMode,
    templates: &TemplateSet,
) -> Result<GeneratedCode, CompilerError> {
    let mut registered = BTreeMap::new();
    generator.register_type_mappings(&mut registered);
    let mappings = file.attributes.type_mappings_mut();
    for (name, spelling) in registered {
        mappings.entry(name).or_insert(spelling);
    }

    let view = bindings::build(file, expansion, generator, mode);
    let template = generator.template_name(mode);
    debug!(
        file = %file.source_name,
        language = generator.language(),
        template,
        "rendering bindings"
    );
    let content = templates.render(template, &view)?;

    Ok(GeneratedCode {
        files: vec![(generator.output_file_name(file, mode), content)],
    })
}

/// Stem of the source file name, used to derive output names.
pub(crate) fn source_stem(file: &File) -> &str {
    let name = file
        .source_name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(&file.source_name);
    match name.find('.') {
        Some(0) | None => name,
        Some(dot) => &name[..dot],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::cpp::CppParser;
    use crate::frontend::{FrontEndParser, ParseOptions};
    use crate::specialize::expand;

    const HEADER: &str = r#"
        /// @coreType(IUnknown)
        namespace Acme::Media {
        /// Plays things.
        interface IPlayer : IUnknown {
            HRESULT Play(int32_t track);
            /// @ignore(cpp)
            void Hidden();
        };
        /// @propertyClass(none)
        interface IInternal : IUnknown {
            void Poke();
        };
        }
    "#;

    fn parse(source: &str, name: &str) -> File {
        CppParser.parse(source, &ParseOptions::new(name)).unwrap()
    }

    #[test]
    fn test_source_stem() {
        let file = File::new("include/acme/media.player.h");
        assert_eq!(source_stem(&file), "media");
        let file = File::new(r"C:\src\Widgets.pas");
        assert_eq!(source_stem(&file), "Widgets");
    }

    #[test]
    fn test_generate_cpp_bindings() {
        let mut file = parse(HEADER, "media.h");
        let expansion = expand(&mut file).unwrap();
        let code = generate(
            &mut file,
            &expansion,
            &CppGenerator,
            GenerationMode::Bindings,
            &TemplateSet::builtin(),
        )
        .unwrap();

        let (name, content) = &code.files[0];
        assert_eq!(name, "media_bindings.h");
        assert!(content.contains("namespace Acme {"));
        assert!(content.contains("namespace Media {"));
        assert!(content.contains("struct IPlayer : public Core::IUnknown"));
        assert!(content.contains("Play(int32_t track)"));
        assert!(!content.contains("Hidden"));
        assert!(!content.contains("IInternal"));
    }

    #[test]
    fn test_configured_override_wins() {
        let mut file = parse(HEADER, "media.h");
        file.attributes.map_type("int32_t", "Int32Alias");
        let expansion = expand(&mut file).unwrap();
        let code = generate(
            &mut file,
            &expansion,
            &CSharpGenerator,
            GenerationMode::Bindings,
            &TemplateSet::builtin(),
        )
        .unwrap();
        let content = &code.files[0].1;
        assert!(content.contains("Int32Alias track"));
        assert!(content.contains("Hidden"));
        assert_eq!(file.attributes.type_mappings()["HRESULT"], "int");
    }

    #[test]
    fn test_config_mode_manifest_is_json() {
        let mut file = parse(HEADER, "media.h");
        let expansion = expand(&mut file).unwrap();
        let code = generate(
            &mut file,
            &expansion,
            &CppGenerator,
            GenerationMode::Config,
            &TemplateSet::builtin(),
        )
        .unwrap();
        let (name, content) = &code.files[0];
        assert_eq!(name, "media_config.json");
        let manifest: serde_json::Value = serde_json::from_str(content).unwrap();
        assert_eq!(manifest["namespace"], "Acme::Media");
        assert_eq!(manifest["interfaces"][0]["name"], "IPlayer");
        assert_eq!(manifest["interfaces"].as_array().unwrap().len(), 1);
    }
}
