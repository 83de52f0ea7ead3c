//! Concrete attribute kinds.

use crate::model::{Accessor, PropertyClassKind};

use super::{AttrValue, AttributeError, AttributeModel};

/// `@property(name, accessor, default = false)`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyAttr {
    pub name: Option<String>,
    pub accessor: Option<Accessor>,
    pub is_default: bool,
}

impl AttributeModel for PropertyAttr {
    const NAME: &'static str = "property";
    const PARAMETERS: &'static [&'static str] = &["name", "accessor"];

    fn set(&mut self, parameter: &str, value: &AttrValue) -> Result<(), AttributeError> {
        match parameter {
            "name" => self.name = Some(value.text().to_string()),
            "accessor" => {
                self.accessor = Some(match value.text().to_ascii_lowercase().as_str() {
                    "get" | "read" | "getter" => Accessor::Get,
                    "set" | "write" | "setter" => Accessor::Set,
                    _ => return Err(Self::invalid(parameter, value)),
                })
            }
            "default" => self.is_default = value.to_bool(Self::NAME, parameter)?,
            _ => return Err(Self::unknown(parameter)),
        }
        Ok(())
    }
}

/// `@propertyClass(kind, category = "...", hidden = false)`
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyClassAttr {
    pub kind: PropertyClassKind,
    pub category: Option<String>,
    pub hidden: bool,
}

impl Default for PropertyClassAttr {
    fn default() -> Self {
        Self {
            kind: PropertyClassKind::Object,
            category: None,
            hidden: false,
        }
    }
}

impl AttributeModel for PropertyClassAttr {
    const NAME: &'static str = "propertyClass";
    const PARAMETERS: &'static [&'static str] = &["kind"];

    fn set(&mut self, parameter: &str, value: &AttrValue) -> Result<(), AttributeError> {
        match parameter {
            "kind" => {
                self.kind = match value.text().to_ascii_lowercase().as_str() {
                    "none" => PropertyClassKind::None,
                    "object" => PropertyClassKind::Object,
                    "control" => PropertyClassKind::Control,
                    "value" => PropertyClassKind::Value,
                    _ => return Err(Self::invalid(parameter, value)),
                }
            }
            "category" => self.category = Some(value.text().to_string()),
            "hidden" => self.hidden = value.to_bool(Self::NAME, parameter)?,
            _ => return Err(Self::unknown(parameter)),
        }
        Ok(())
    }
}

/// `@event(name, sink = IHandler)`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventAttr {
    pub name: Option<String>,
    pub sink: Option<String>,
}

impl AttributeModel for EventAttr {
    const NAME: &'static str = "event";
    const PARAMETERS: &'static [&'static str] = &["name"];

    fn set(&mut self, parameter: &str, value: &AttrValue) -> Result<(), AttributeError> {
        match parameter {
            "name" => self.name = Some(value.text().to_string()),
            "sink" => self.sink = Some(value.text().to_string()),
            _ => return Err(Self::unknown(parameter)),
        }
        Ok(())
    }
}

/// `@factory(interface, tag)`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactoryAttr {
    pub interface: String,
    pub tag: Option<String>,
}

impl AttributeModel for FactoryAttr {
    const NAME: &'static str = "factory";
    const PARAMETERS: &'static [&'static str] = &["interface", "tag"];

    fn set(&mut self, parameter: &str, value: &AttrValue) -> Result<(), AttributeError> {
        match parameter {
            "interface" => self.interface = value.text().to_string(),
            "tag" => self.tag = Some(value.text().to_string()),
            _ => return Err(Self::unknown(parameter)),
        }
        Ok(())
    }

    fn finish(self) -> Result<Self, AttributeError> {
        if self.interface.is_empty() {
            return Err(Self::missing("interface"));
        }
        Ok(self)
    }
}

/// `@ignore` or `@ignore(generator)`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IgnoreAttr {
    pub generator: Option<String>,
}

impl AttributeModel for IgnoreAttr {
    const NAME: &'static str = "ignore";
    const PARAMETERS: &'static [&'static str] = &["generator"];

    fn set(&mut self, parameter: &str, value: &AttrValue) -> Result<(), AttributeError> {
        match parameter {
            "generator" => self.generator = Some(value.text().to_string()),
            _ => return Err(Self::unknown(parameter)),
        }
        Ok(())
    }
}

/// `@returnSelf`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReturnSelfAttr;

impl AttributeModel for ReturnSelfAttr {
    const NAME: &'static str = "returnSelf";
    const PARAMETERS: &'static [&'static str] = &[];

    fn set(&mut self, parameter: &str, _value: &AttrValue) -> Result<(), AttributeError> {
        Err(Self::unknown(parameter))
    }
}

/// `@polymorphic` (return value) or `@polymorphic(arg)`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolymorphicAttr {
    pub arg: Option<String>,
}

impl AttributeModel for PolymorphicAttr {
    const NAME: &'static str = "polymorphic";
    const PARAMETERS: &'static [&'static str] = &["arg"];

    fn set(&mut self, parameter: &str, value: &AttrValue) -> Result<(), AttributeError> {
        match parameter {
            "arg" => self.arg = Some(value.text().to_string()),
            _ => return Err(Self::unknown(parameter)),
        }
        Ok(())
    }
}

/// `@stealRef(arg)`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StealRefAttr {
    pub arg: String,
}

impl AttributeModel for StealRefAttr {
    const NAME: &'static str = "stealRef";
    const PARAMETERS: &'static [&'static str] = &["arg"];

    fn set(&mut self, parameter: &str, value: &AttrValue) -> Result<(), AttributeError> {
        match parameter {
            "arg" => self.arg = value.text().to_string(),
            _ => return Err(Self::unknown(parameter)),
        }
        Ok(())
    }

    fn finish(self) -> Result<Self, AttributeError> {
        if self.arg.is_empty() {
            return Err(Self::missing("arg"));
        }
        Ok(self)
    }
}

/// `@array(arg, length)`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrayAttr {
    pub arg: String,
    pub length: Option<String>,
}

impl AttributeModel for ArrayAttr {
    const NAME: &'static str = "array";
    const PARAMETERS: &'static [&'static str] = &["arg", "length"];

    fn set(&mut self, parameter: &str, value: &AttrValue) -> Result<(), AttributeError> {
        match parameter {
            "arg" => self.arg = value.text().to_string(),
            "length" => self.length = Some(value.text().to_string()),
            _ => return Err(Self::unknown(parameter)),
        }
        Ok(())
    }

    fn finish(self) -> Result<Self, AttributeError> {
        if self.arg.is_empty() {
            return Err(Self::missing("arg"));
        }
        Ok(self)
    }
}

/// `@coreType` on a declaration, or `@coreType(Name)` on a unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreTypeAttr {
    pub name: Option<String>,
}

impl AttributeModel for CoreTypeAttr {
    const NAME: &'static str = "coreType";
    const PARAMETERS: &'static [&'static str] = &["name"];

    fn set(&mut self, parameter: &str, value: &AttrValue) -> Result<(), AttributeError> {
        match parameter {
            "name" => self.name = Some(value.text().to_string()),
            _ => return Err(Self::unknown(parameter)),
        }
        Ok(())
    }
}

/// `@valueType` on a declaration, or `@valueType(Name)` on a unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueTypeAttr {
    pub name: Option<String>,
}

impl AttributeModel for ValueTypeAttr {
    const NAME: &'static str = "valueType";
    const PARAMETERS: &'static [&'static str] = &["name"];

    fn set(&mut self, parameter: &str, value: &AttrValue) -> Result<(), AttributeError> {
        match parameter {
            "name" => self.name = Some(value.text().to_string()),
            _ => return Err(Self::unknown(parameter)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{parse_arguments, AttrArg};

    #[test]
    fn test_property_class_kinds() {
        let args = vec![AttrArg::positional(AttrValue::Ident("None".to_string()))];
        let attr = parse_arguments::<PropertyClassAttr>(&args).unwrap();
        assert_eq!(attr.kind, PropertyClassKind::None);

        let args = vec![AttrArg::positional(AttrValue::Ident("widget".to_string()))];
        assert!(matches!(
            parse_arguments::<PropertyClassAttr>(&args),
            Err(AttributeError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_factory_requires_interface() {
        assert!(matches!(
            parse_arguments::<FactoryAttr>(&[]),
            Err(AttributeError::MissingParameter { .. })
        ));
    }

    #[test]
    fn test_return_self_takes_no_arguments() {
        assert!(parse_arguments::<ReturnSelfAttr>(&[]).is_ok());
        let args = vec![AttrArg::positional(AttrValue::Ident("x".to_string()))];
        assert!(matches!(
            parse_arguments::<ReturnSelfAttr>(&args),
            Err(AttributeError::TooManyArguments { expected: 0, .. })
        ));
    }
}
