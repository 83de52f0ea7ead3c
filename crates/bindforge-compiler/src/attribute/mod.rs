//! Attribute directives embedded in doc comments.
//!
//! A directive looks like `@property(Volume, get, default = true)`. Arguments
//! are positional or named; positional ones bind to the attribute kind's
//! parameter list in order, and once a named argument appears every later
//! argument must be named too. [`parse_arguments`] implements that rule once
//! for every [`AttributeModel`].

mod kinds;
mod metadata;

pub use kinds::{
    ArrayAttr, CoreTypeAttr, EventAttr, FactoryAttr, IgnoreAttr, PolymorphicAttr, PropertyAttr,
    PropertyClassAttr, ReturnSelfAttr, StealRefAttr, ValueTypeAttr,
};
pub use metadata::{
    DeclarationKind, FunctionMetadata, MethodMetadata, PendingMetadata, SignatureMetadata,
    TypeMetadata, UnitMetadata,
};

use thiserror::Error;

/// Directive names handled by the attribute parser; every other `@name` is a
/// documentation tag.
pub const ATTRIBUTE_NAMES: &[&str] = &[
    kinds::PropertyAttr::NAME,
    kinds::PropertyClassAttr::NAME,
    kinds::EventAttr::NAME,
    kinds::FactoryAttr::NAME,
    kinds::IgnoreAttr::NAME,
    kinds::ReturnSelfAttr::NAME,
    kinds::PolymorphicAttr::NAME,
    kinds::StealRefAttr::NAME,
    kinds::ArrayAttr::NAME,
    kinds::CoreTypeAttr::NAME,
    kinds::ValueTypeAttr::NAME,
];

pub fn is_attribute_name(name: &str) -> bool {
    ATTRIBUTE_NAMES.contains(&name)
}

/// Errors raised while interpreting attribute arguments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttributeError {
    #[error("attribute '{attribute}': positional argument #{index} follows a named argument")]
    PositionalAfterNamed { attribute: String, index: usize },

    #[error("attribute '{attribute}' takes at most {expected} positional argument(s)")]
    TooManyArguments { attribute: String, expected: usize },

    #[error("attribute '{attribute}' has no parameter named '{parameter}'")]
    UnknownParameter { attribute: String, parameter: String },

    #[error("attribute '{attribute}': '{value}' is not a boolean (parameter '{parameter}')")]
    InvalidBool {
        attribute: String,
        parameter: String,
        value: String,
    },

    #[error("attribute '{attribute}': '{value}' is not valid for parameter '{parameter}'")]
    InvalidValue {
        attribute: String,
        parameter: String,
        value: String,
    },

    #[error("attribute '{attribute}' requires parameter '{parameter}'")]
    MissingParameter { attribute: String, parameter: String },

    #[error("attribute '{attribute}' cannot be applied to {declaration}")]
    NotApplicable { attribute: String, declaration: String },

    #[error("malformed attribute '{attribute}': {message}")]
    Malformed { attribute: String, message: String },
}

/// One argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Ident(String),
    Str(String),
    Number(String),
}

impl AttrValue {
    pub fn text(&self) -> &str {
        match self {
            Self::Ident(s) | Self::Str(s) | Self::Number(s) => s,
        }
    }

    pub fn to_bool(&self, attribute: &str, parameter: &str) -> Result<bool, AttributeError> {
        match self.text().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" => Ok(false),
            _ => Err(AttributeError::InvalidBool {
                attribute: attribute.to_string(),
                parameter: parameter.to_string(),
                value: self.text().to_string(),
            }),
        }
    }
}

/// A positional (`name == None`) or named argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrArg {
    pub name: Option<String>,
    pub value: AttrValue,
}

impl AttrArg {
    pub fn positional(value: AttrValue) -> Self {
        Self { name: None, value }
    }

    pub fn named(name: impl Into<String>, value: AttrValue) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }
}

/// An attribute directive as found in a doc comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttribute {
    pub name: String,
    pub args: Vec<AttrArg>,
    /// Zero-based line offset inside the doc comment.
    pub line: usize,
}

/// A typed metadata model filled from attribute arguments.
pub trait AttributeModel: Default + Sized {
    /// Directive name (`property`).
    const NAME: &'static str;
    /// Parameter names positional arguments bind to, in order.
    const PARAMETERS: &'static [&'static str];

    /// Stores one argument; unknown parameter names are an error.
    fn set(&mut self, parameter: &str, value: &AttrValue) -> Result<(), AttributeError>;

    /// Validates the model once every argument has been stored.
    fn finish(self) -> Result<Self, AttributeError> {
        Ok(self)
    }

    fn unknown(parameter: &str) -> AttributeError {
        AttributeError::UnknownParameter {
            attribute: Self::NAME.to_string(),
            parameter: parameter.to_string(),
        }
    }

    fn invalid(parameter: &str, value: &AttrValue) -> AttributeError {
        AttributeError::InvalidValue {
            attribute: Self::NAME.to_string(),
            parameter: parameter.to_string(),
            value: value.text().to_string(),
        }
    }

    fn missing(parameter: &str) -> AttributeError {
        AttributeError::MissingParameter {
            attribute: Self::NAME.to_string(),
            parameter: parameter.to_string(),
        }
    }
}

/// Binds `args` onto a fresh `M`.
pub fn parse_arguments<M: AttributeModel>(args: &[AttrArg]) -> Result<M, AttributeError> {
    let mut model = M::default();
    let mut seen_named = false;

    for (index, arg) in args.iter().enumerate() {
        let parameter = match &arg.name {
            Some(name) => {
                seen_named = true;
                name.as_str()
            }
            None if seen_named => {
                return Err(AttributeError::PositionalAfterNamed {
                    attribute: M::NAME.to_string(),
                    index,
                });
            }
            None => *M::PARAMETERS
                .get(index)
                .ok_or_else(|| AttributeError::TooManyArguments {
                    attribute: M::NAME.to_string(),
                    expected: M::PARAMETERS.len(),
                })?,
        };
        model.set(parameter, &arg.value)?;
    }

    model.finish()
}

/// Splits the text between an attribute's parentheses into arguments.
pub fn parse_invocation(attribute: &str, text: &str) -> Result<Vec<AttrArg>, AttributeError> {
    let malformed = |message: &str| AttributeError::Malformed {
        attribute: attribute.to_string(),
        message: message.to_string(),
    };

    let mut args = Vec::new();
    let mut chars = text.chars().peekable();

    loop {
        skip_spaces(&mut chars);
        if chars.peek().is_none() {
            if !args.is_empty() {
                return Err(malformed("trailing comma"));
            }
            break;
        }

        let first = read_value(&mut chars).map_err(|m| malformed(&m))?;
        skip_spaces(&mut chars);
        let arg = if chars.peek() == Some(&'=') {
            chars.next();
            let AttrValue::Ident(name) = first else {
                return Err(malformed("argument names must be identifiers"));
            };
            skip_spaces(&mut chars);
            let value = read_value(&mut chars).map_err(|m| malformed(&m))?;
            AttrArg::named(name, value)
        } else {
            AttrArg::positional(first)
        };
        args.push(arg);

        skip_spaces(&mut chars);
        match chars.next() {
            None => break,
            Some(',') => continue,
            Some(other) => return Err(malformed(&format!("unexpected '{other}'"))),
        }
    }

    Ok(args)
}

fn skip_spaces(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
}

fn read_value(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<AttrValue, String> {
    match chars.peek().copied() {
        Some(quote @ ('"' | '\'')) => {
            chars.next();
            let mut value = String::new();
            loop {
                match chars.next() {
                    Some('\\') => {
                        if let Some(escaped) = chars.next() {
                            value.push(escaped);
                        }
                    }
                    Some(c) if c == quote => return Ok(AttrValue::Str(value)),
                    Some(c) => value.push(c),
                    None => return Err("unterminated string".to_string()),
                }
            }
        }
        Some(_) => {
            let mut value = String::new();
            while let Some(&c) = chars.peek() {
                if c == ',' || c == '=' || c.is_whitespace() {
                    break;
                }
                value.push(c);
                chars.next();
            }
            if value.is_empty() {
                return Err("expected a value".to_string());
            }
            let numeric = value
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '+');
            Ok(if numeric {
                AttrValue::Number(value)
            } else {
                AttrValue::Ident(value)
            })
        }
        None => Err("expected a value".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(s: &str) -> AttrValue {
        AttrValue::Ident(s.to_string())
    }

    #[test]
    fn test_positional_after_named_fails() {
        let args = vec![
            AttrArg::positional(ident("a")),
            AttrArg::positional(ident("b")),
            AttrArg::named("length", ident("c")),
            AttrArg::positional(ident("d")),
        ];
        let err = parse_arguments::<ArrayAttr>(&args).unwrap_err();
        assert_eq!(
            err,
            AttributeError::PositionalAfterNamed {
                attribute: "array".to_string(),
                index: 3,
            }
        );
    }

    #[test]
    fn test_positional_binds_in_order() {
        let args = vec![AttrArg::positional(ident("a")), AttrArg::positional(ident("b"))];
        let attr = parse_arguments::<ArrayAttr>(&args).unwrap();
        assert_eq!(attr.arg, "a");
        assert_eq!(attr.length.as_deref(), Some("b"));
    }

    #[test]
    fn test_too_many_positional() {
        let args = vec![
            AttrArg::positional(ident("a")),
            AttrArg::positional(ident("b")),
            AttrArg::positional(ident("c")),
        ];
        assert!(matches!(
            parse_arguments::<ArrayAttr>(&args),
            Err(AttributeError::TooManyArguments { expected: 2, .. })
        ));
    }

    #[test]
    fn test_unknown_parameter_is_named() {
        let args = vec![AttrArg::named("size", ident("n"))];
        let err = parse_arguments::<ArrayAttr>(&args).unwrap_err();
        assert_eq!(err.to_string(), "attribute 'array' has no parameter named 'size'");
    }

    #[test]
    fn test_bad_boolean() {
        let args = vec![
            AttrArg::positional(ident("Volume")),
            AttrArg::named("default", ident("maybe")),
        ];
        let err = parse_arguments::<PropertyAttr>(&args).unwrap_err();
        assert!(matches!(err, AttributeError::InvalidBool { value, .. } if value == "maybe"));
    }

    #[test]
    fn test_parse_invocation() {
        let args = parse_invocation("factory", r#"IFoo, tag = "With Value""#).unwrap();
        assert_eq!(
            args,
            vec![
                AttrArg::positional(ident("IFoo")),
                AttrArg::named("tag", AttrValue::Str("With Value".to_string())),
            ]
        );
        assert!(parse_invocation("factory", "").unwrap().is_empty());
        assert!(parse_invocation("factory", "a,").is_err());
        assert!(parse_invocation("factory", "\"open").is_err());
    }
}
