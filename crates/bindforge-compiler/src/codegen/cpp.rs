//! C++ header backend.

use std::collections::BTreeMap;

use crate::model::{Argument, File};

use super::{source_stem, to_snake_case, GenerationMode, Generator};

const KEYWORDS: &[&str] = &[
    "alignas", "alignof", "and", "asm", "auto", "bool", "break", "case", "catch", "char",
    "class", "const", "constexpr", "continue", "default", "delete", "do", "double", "else",
    "enum", "explicit", "export", "extern", "false", "float", "for", "friend", "goto", "if",
    "inline", "int", "long", "mutable", "namespace", "new", "noexcept", "not", "nullptr",
    "operator", "or", "private", "protected", "public", "register", "return", "short",
    "signed", "sizeof", "static", "struct", "switch", "template", "this", "throw", "true",
    "try", "typedef", "typename", "union", "unsigned", "using", "virtual", "void", "volatile",
    "while", "xor",
];

/// Delphi spellings that C++ names differently.
const TYPE_MAPPINGS: &[(&str, &str)] = &[
    ("Boolean", "bool"),
    ("LongBool", "int32_t"),
    ("ShortInt", "int8_t"),
    ("SmallInt", "int16_t"),
    ("Integer", "int32_t"),
    ("LongInt", "int32_t"),
    ("Int64", "int64_t"),
    ("Byte", "uint8_t"),
    ("Word", "uint16_t"),
    ("Cardinal", "uint32_t"),
    ("LongWord", "uint32_t"),
    ("UInt64", "uint64_t"),
    ("Single", "float"),
    ("Double", "double"),
    ("AnsiChar", "char"),
    ("WideChar", "wchar_t"),
    ("WideString", "BSTR"),
    ("UnicodeString", "BSTR"),
    ("string", "BSTR"),
    ("Pointer", "void*"),
    ("NativeUInt", "size_t"),
    ("HResult", "HRESULT"),
];

pub struct CppGenerator;

impl Generator for CppGenerator {
    fn language(&self) -> &str {
        "cpp"
    }

    fn register_type_mappings(&self, mappings: &mut BTreeMap<String, String>) {
        for (name, spelling) in TYPE_MAPPINGS {
            mappings.insert(name.to_string(), spelling.to_string());
        }
    }

    fn template_name(&self, mode: GenerationMode) -> &str {
        match mode {
            GenerationMode::Bindings => "cpp/bindings.h.j2",
            GenerationMode::Config => "cpp/config.json.j2",
        }
    }

    fn output_file_name(&self, file: &File, mode: GenerationMode) -> String {
        let stem = to_snake_case(source_stem(file));
        match mode {
            GenerationMode::Bindings => format!("{stem}_bindings.h"),
            GenerationMode::Config => format!("{stem}_config.json"),
        }
    }

    fn namespace_separator(&self) -> &str {
        "::"
    }

    /// Arrays decay to pointers.
    fn spell_modifiers(&self, base: &str, modifiers: &str) -> String {
        format!("{}{}", base, modifiers.replace("[]", "*"))
    }

    fn escape_identifier(&self, name: &str) -> String {
        if KEYWORDS.contains(&name) {
            format!("{name}_")
        } else {
            name.to_string()
        }
    }

    fn format_argument(&self, argument: &Argument, type_name: &str) -> String {
        let mut text = String::new();
        if argument.is_const {
            text.push_str("const ");
        }
        text.push_str(type_name);
        text.push(' ');
        text.push_str(&self.escape_identifier(&argument.name));
        if let Some(default) = &argument.default_value {
            text.push_str(" = ");
            text.push_str(default);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TypeRef, TypeRegistry};

    fn argument(name: &str) -> Argument {
        let mut registry = TypeRegistry::new();
        Argument::new(name, TypeRef::new(registry.resolve("int")))
    }

    #[test]
    fn test_spell_modifiers() {
        assert_eq!(CppGenerator.spell_modifiers("IFoo", "*"), "IFoo*");
        assert_eq!(CppGenerator.spell_modifiers("int", "[]"), "int*");
        assert_eq!(CppGenerator.spell_modifiers("Widget", "&"), "Widget&");
    }

    #[test]
    fn test_format_argument() {
        let mut arg = argument("class");
        arg.is_const = true;
        arg.default_value = Some("0".to_string());
        assert_eq!(CppGenerator.format_argument(&arg, "int"), "const int class_ = 0");
    }

    #[test]
    fn test_output_names() {
        let file = File::new("MediaPlayer.pas");
        assert_eq!(
            CppGenerator.output_file_name(&file, GenerationMode::Bindings),
            "media_player_bindings.h"
        );
        assert_eq!(
            CppGenerator.output_file_name(&file, GenerationMode::Config),
            "media_player_config.json"
        );
    }
}
