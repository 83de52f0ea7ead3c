//! Builtin scalar types of both source dialects.

use serde::Serialize;

/// Language-neutral classification of builtin type spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    Void,
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Char,
    WideChar,
    String,
    Pointer,
    Size,
    ResultCode,
}

impl Primitive {
    /// Classifies a C++ or Delphi builtin spelling. Delphi names are matched
    /// case-insensitively.
    pub fn classify(name: &str) -> Option<Self> {
        let primitive = match name {
            "void" => Self::Void,
            "bool" => Self::Bool,
            "int8_t" | "signed char" => Self::Int8,
            "int16_t" | "short" | "short int" => Self::Int16,
            "int" | "int32_t" | "long" | "signed" | "signed int" => Self::Int32,
            "int64_t" | "long long" | "__int64" => Self::Int64,
            "uint8_t" | "unsigned char" => Self::UInt8,
            "uint16_t" | "unsigned short" => Self::UInt16,
            "uint32_t" | "unsigned" | "unsigned int" | "unsigned long" => Self::UInt32,
            "uint64_t" | "unsigned long long" => Self::UInt64,
            "float" => Self::Float32,
            "double" => Self::Float64,
            "char" => Self::Char,
            "wchar_t" | "char16_t" => Self::WideChar,
            "size_t" => Self::Size,
            "HRESULT" => Self::ResultCode,
            _ => return Self::classify_pascal(name),
        };
        Some(primitive)
    }

    fn classify_pascal(name: &str) -> Option<Self> {
        let primitive = match name.to_ascii_lowercase().as_str() {
            "boolean" | "longbool" => Self::Bool,
            "shortint" => Self::Int8,
            "smallint" => Self::Int16,
            "integer" | "longint" => Self::Int32,
            "int64" => Self::Int64,
            "byte" => Self::UInt8,
            "word" => Self::UInt16,
            "cardinal" | "longword" => Self::UInt32,
            "uint64" => Self::UInt64,
            "single" => Self::Float32,
            "double" => Self::Float64,
            "ansichar" => Self::Char,
            "widechar" => Self::WideChar,
            "string" | "widestring" | "unicodestring" => Self::String,
            "pointer" => Self::Pointer,
            "nativeuint" => Self::Size,
            "hresult" => Self::ResultCode,
            _ => return None,
        };
        Some(primitive)
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::UInt8
                | Self::UInt16
                | Self::UInt32
                | Self::UInt64
                | Self::Size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_dialects_classify() {
        assert_eq!(Primitive::classify("int"), Some(Primitive::Int32));
        assert_eq!(Primitive::classify("Integer"), Some(Primitive::Int32));
        assert_eq!(Primitive::classify("CARDINAL"), Some(Primitive::UInt32));
        assert_eq!(Primitive::classify("unsigned long long"), Some(Primitive::UInt64));
        assert_eq!(Primitive::classify("IFoo"), None);
        assert!(Primitive::Int32.is_integer());
        assert!(!Primitive::Float64.is_integer());
    }
}
