//! C# COM interop backend.

use std::collections::BTreeMap;

use crate::model::{Argument, File};

use super::{source_stem, to_pascal_case, GenerationMode, Generator};

const KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// C++ and Delphi spellings of the builtin types.
const TYPE_MAPPINGS: &[(&str, &str)] = &[
    ("bool", "bool"),
    ("char", "byte"),
    ("wchar_t", "char"),
    ("char16_t", "char"),
    ("int8_t", "sbyte"),
    ("int16_t", "short"),
    ("short", "short"),
    ("int", "int"),
    ("int32_t", "int"),
    ("long", "int"),
    ("int64_t", "long"),
    ("long long", "long"),
    ("__int64", "long"),
    ("uint8_t", "byte"),
    ("unsigned char", "byte"),
    ("uint16_t", "ushort"),
    ("unsigned short", "ushort"),
    ("uint32_t", "uint"),
    ("unsigned", "uint"),
    ("unsigned int", "uint"),
    ("unsigned long", "uint"),
    ("uint64_t", "ulong"),
    ("unsigned long long", "ulong"),
    ("float", "float"),
    ("double", "double"),
    ("size_t", "UIntPtr"),
    ("HRESULT", "int"),
    ("BSTR", "string"),
    ("Boolean", "bool"),
    ("LongBool", "bool"),
    ("ShortInt", "sbyte"),
    ("SmallInt", "short"),
    ("Integer", "int"),
    ("LongInt", "int"),
    ("Int64", "long"),
    ("Byte", "byte"),
    ("Word", "ushort"),
    ("Cardinal", "uint"),
    ("LongWord", "uint"),
    ("UInt64", "ulong"),
    ("Single", "float"),
    ("Double", "double"),
    ("AnsiChar", "byte"),
    ("WideChar", "char"),
    ("WideString", "string"),
    ("UnicodeString", "string"),
    ("string", "string"),
    ("Pointer", "IntPtr"),
    ("NativeUInt", "UIntPtr"),
    ("HResult", "int"),
];

pub struct CSharpGenerator;

impl Generator for CSharpGenerator {
    fn language(&self) -> &str {
        "csharp"
    }

    fn register_type_mappings(&self, mappings: &mut BTreeMap<String, String>) {
        for (name, spelling) in TYPE_MAPPINGS {
            mappings.insert(name.to_string(), spelling.to_string());
        }
    }

    fn template_name(&self, mode: GenerationMode) -> &str {
        match mode {
            GenerationMode::Bindings => "csharp/bindings.cs.j2",
            GenerationMode::Config => "csharp/config.json.j2",
        }
    }

    fn output_file_name(&self, file: &File, mode: GenerationMode) -> String {
        let stem = to_pascal_case(source_stem(file));
        match mode {
            GenerationMode::Bindings => format!("{stem}.g.cs"),
            GenerationMode::Config => format!("{stem}.config.json"),
        }
    }

    fn namespace_separator(&self) -> &str {
        "."
    }

    /// Interface pointers and references are implicit in managed code; raw
    /// `void*` becomes `IntPtr`.
    fn spell_modifiers(&self, base: &str, modifiers: &str) -> String {
        if base == "void" && modifiers.contains('*') {
            return "IntPtr".to_string();
        }
        let arrays = modifiers.matches("[]").count();
        format!("{}{}", base, "[]".repeat(arrays))
    }

    fn escape_identifier(&self, name: &str) -> String {
        if KEYWORDS.contains(&name) {
            format!("@{name}")
        } else {
            name.to_string()
        }
    }

    fn format_argument(&self, argument: &Argument, type_name: &str) -> String {
        let direction = if argument.is_out {
            "out "
        } else if argument.is_out_pointer {
            "ref "
        } else {
            ""
        };
        let mut text = format!(
            "{}{} {}",
            direction,
            type_name,
            self.escape_identifier(&argument.name)
        );
        if let (Some(default), "") = (&argument.default_value, direction) {
            text.push_str(" = ");
            text.push_str(default);
        }
        text
    }
}
