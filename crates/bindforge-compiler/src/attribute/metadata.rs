//! Pending metadata collected for one declaration.
//!
//! Each declaration kind accepts a different subset of attributes, so the
//! metadata is a tagged variant built fresh for every declaration.

use std::fmt;

use crate::model::{Accessor, EventInfo, IgnoreScope, Overload, PropertyClass, PropertyInfo};

use super::kinds::{
    ArrayAttr, CoreTypeAttr, EventAttr, FactoryAttr, IgnoreAttr, PolymorphicAttr, PropertyAttr,
    PropertyClassAttr, ReturnSelfAttr, StealRefAttr, ValueTypeAttr,
};
use super::{parse_arguments, AttributeError, AttributeModel, RawAttribute};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Unit,
    Type,
    Method,
    Function,
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unit => "a unit",
            Self::Type => "a type declaration",
            Self::Method => "a method",
            Self::Function => "a global function",
        })
    }
}

/// `@coreType(Name)` / `@valueType(Name)` on a unit or namespace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitMetadata {
    pub core_types: Vec<String>,
    pub value_types: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeMetadata {
    pub property_class: Option<PropertyClass>,
    pub ignore: IgnoreScope,
    pub core_type: bool,
    pub value_type: bool,
}

/// Attributes that refine an overload's arguments.
///
/// Entries naming an argument keep the line offset of their attribute inside
/// the doc comment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignatureMetadata {
    pub polymorphic_return: bool,
    pub polymorphic_args: Vec<(usize, String)>,
    pub steal_refs: Vec<(usize, String)>,
    pub arrays: Vec<(usize, ArrayAttr)>,
}

impl SignatureMetadata {
    /// Applies the flags to `overload`; naming an argument it lacks is an
    /// error at the offending attribute's line.
    pub fn apply(&self, overload: &mut Overload) -> Result<(), (usize, AttributeError)> {
        overload.polymorphic_return |= self.polymorphic_return;
        for (line, name) in &self.polymorphic_args {
            argument(overload, PolymorphicAttr::NAME, name)
                .map_err(|e| (*line, e))?
                .polymorphic = true;
        }
        for (line, name) in &self.steal_refs {
            argument(overload, StealRefAttr::NAME, name)
                .map_err(|e| (*line, e))?
                .steal_reference = true;
        }
        for (line, array) in &self.arrays {
            if let Some(length) = &array.length {
                if overload.argument(length).is_none() {
                    return Err((
                        *line,
                        AttributeError::InvalidValue {
                            attribute: ArrayAttr::NAME.to_string(),
                            parameter: "length".to_string(),
                            value: length.clone(),
                        },
                    ));
                }
            }
            argument(overload, ArrayAttr::NAME, &array.arg)
                .map_err(|e| (*line, e))?
                .array_length = array.length.clone();
        }
        Ok(())
    }
}

fn argument<'a>(
    overload: &'a mut Overload,
    attribute: &str,
    name: &str,
) -> Result<&'a mut crate::model::Argument, AttributeError> {
    overload
        .argument_mut(name)
        .ok_or_else(|| AttributeError::InvalidValue {
            attribute: attribute.to_string(),
            parameter: "arg".to_string(),
            value: name.to_string(),
        })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodMetadata {
    pub property: Option<PropertyAttr>,
    pub event: Option<EventAttr>,
    pub ignore: IgnoreScope,
    pub return_self: bool,
    pub signature: SignatureMetadata,
}

impl MethodMetadata {
    /// Property binding with the name and accessor inferred from a
    /// `Get`/`Set`/`Is` method prefix when not given.
    pub fn property_info(&self, method: &str) -> Option<PropertyInfo> {
        let attr = self.property.as_ref()?;
        let (prefix_accessor, stem) = split_accessor_prefix(method);
        Some(PropertyInfo {
            name: attr.name.clone().unwrap_or_else(|| stem.to_string()),
            accessor: attr.accessor.or(prefix_accessor).unwrap_or(Accessor::Get),
            is_default: attr.is_default,
        })
    }

    /// Event binding; the name defaults to the method name without `Add`.
    pub fn event_info(&self, method: &str) -> Option<EventInfo> {
        let attr = self.event.as_ref()?;
        let name = attr.name.clone().unwrap_or_else(|| {
            strip_camel_prefix(method, "Add").unwrap_or(method).to_string()
        });
        Some(EventInfo {
            name,
            sink: attr.sink.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionMetadata {
    pub factory: Option<FactoryAttr>,
    pub ignore: IgnoreScope,
    pub signature: SignatureMetadata,
}

/// Metadata for the declaration currently being lowered.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingMetadata {
    Unit(UnitMetadata),
    Type(TypeMetadata),
    Method(MethodMetadata),
    Function(FunctionMetadata),
}

impl PendingMetadata {
    pub fn new(kind: DeclarationKind) -> Self {
        match kind {
            DeclarationKind::Unit => Self::Unit(UnitMetadata::default()),
            DeclarationKind::Type => Self::Type(TypeMetadata::default()),
            DeclarationKind::Method => Self::Method(MethodMetadata::default()),
            DeclarationKind::Function => Self::Function(FunctionMetadata::default()),
        }
    }

    pub fn kind(&self) -> DeclarationKind {
        match self {
            Self::Unit(_) => DeclarationKind::Unit,
            Self::Type(_) => DeclarationKind::Type,
            Self::Method(_) => DeclarationKind::Method,
            Self::Function(_) => DeclarationKind::Function,
        }
    }

    /// Builds the metadata for a `kind` declaration from its attributes.
    ///
    /// Errors carry the attribute's line offset inside the doc comment.
    pub fn collect(
        kind: DeclarationKind,
        attributes: &[RawAttribute],
    ) -> Result<Self, (usize, AttributeError)> {
        let mut pending = Self::new(kind);
        for attribute in attributes {
            pending.apply(attribute).map_err(|e| (attribute.line, e))?;
        }
        Ok(pending)
    }

    fn apply(&mut self, raw: &RawAttribute) -> Result<(), AttributeError> {
        let args = &raw.args;
        match (self, raw.name.as_str()) {
            (Self::Unit(unit), CoreTypeAttr::NAME) => {
                let attr: CoreTypeAttr = parse_arguments(args)?;
                unit.core_types.push(attr.name.ok_or_else(|| CoreTypeAttr::missing("name"))?);
            }
            (Self::Unit(unit), ValueTypeAttr::NAME) => {
                let attr: ValueTypeAttr = parse_arguments(args)?;
                unit.value_types.push(attr.name.ok_or_else(|| ValueTypeAttr::missing("name"))?);
            }

            (Self::Type(ty), PropertyClassAttr::NAME) => {
                let attr: PropertyClassAttr = parse_arguments(args)?;
                ty.property_class = Some(PropertyClass {
                    kind: attr.kind,
                    category: attr.category,
                    hidden: attr.hidden,
                });
            }
            (Self::Type(ty), CoreTypeAttr::NAME) => {
                parse_arguments::<CoreTypeAttr>(args)?;
                ty.core_type = true;
            }
            (Self::Type(ty), ValueTypeAttr::NAME) => {
                parse_arguments::<ValueTypeAttr>(args)?;
                ty.value_type = true;
            }
            (Self::Type(ty), IgnoreAttr::NAME) => {
                let attr: IgnoreAttr = parse_arguments(args)?;
                ty.ignore.add(attr.generator.as_deref());
            }

            (Self::Method(method), PropertyAttr::NAME) => {
                method.property = Some(parse_arguments(args)?);
            }
            (Self::Method(method), EventAttr::NAME) => {
                method.event = Some(parse_arguments(args)?);
            }
            (Self::Method(method), ReturnSelfAttr::NAME) => {
                parse_arguments::<ReturnSelfAttr>(args)?;
                method.return_self = true;
            }
            (Self::Method(method), IgnoreAttr::NAME) => {
                let attr: IgnoreAttr = parse_arguments(args)?;
                method.ignore.add(attr.generator.as_deref());
            }
            (Self::Method(method), name) if is_signature_attribute(name) => {
                signature_attribute(&mut method.signature, raw)?;
            }

            (Self::Function(function), FactoryAttr::NAME) => {
                function.factory = Some(parse_arguments(args)?);
            }
            (Self::Function(function), IgnoreAttr::NAME) => {
                let attr: IgnoreAttr = parse_arguments(args)?;
                function.ignore.add(attr.generator.as_deref());
            }
            (Self::Function(function), name) if is_signature_attribute(name) => {
                signature_attribute(&mut function.signature, raw)?;
            }

            (pending, name) => {
                return Err(AttributeError::NotApplicable {
                    attribute: name.to_string(),
                    declaration: pending.kind().to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn into_unit(self) -> UnitMetadata {
        match self {
            Self::Unit(metadata) => metadata,
            _ => UnitMetadata::default(),
        }
    }

    pub fn into_type(self) -> TypeMetadata {
        match self {
            Self::Type(metadata) => metadata,
            _ => TypeMetadata::default(),
        }
    }

    pub fn into_method(self) -> MethodMetadata {
        match self {
            Self::Method(metadata) => metadata,
            _ => MethodMetadata::default(),
        }
    }

    pub fn into_function(self) -> FunctionMetadata {
        match self {
            Self::Function(metadata) => metadata,
            _ => FunctionMetadata::default(),
        }
    }
}

fn is_signature_attribute(name: &str) -> bool {
    name == PolymorphicAttr::NAME || name == StealRefAttr::NAME || name == ArrayAttr::NAME
}

fn signature_attribute(
    signature: &mut SignatureMetadata,
    raw: &RawAttribute,
) -> Result<(), AttributeError> {
    match raw.name.as_str() {
        PolymorphicAttr::NAME => {
            let attr: PolymorphicAttr = parse_arguments(&raw.args)?;
            match attr.arg {
                Some(arg) => signature.polymorphic_args.push((raw.line, arg)),
                None => signature.polymorphic_return = true,
            }
        }
        StealRefAttr::NAME => {
            let attr: StealRefAttr = parse_arguments(&raw.args)?;
            signature.steal_refs.push((raw.line, attr.arg));
        }
        _ => signature.arrays.push((raw.line, parse_arguments(&raw.args)?)),
    }
    Ok(())
}

fn split_accessor_prefix(method: &str) -> (Option<Accessor>, &str) {
    for (prefix, accessor) in [("Get", Accessor::Get), ("Set", Accessor::Set), ("Is", Accessor::Get)] {
        if let Some(stem) = strip_camel_prefix(method, prefix) {
            return (Some(accessor), stem);
        }
    }
    (None, method)
}

/// `GetVolume` minus `Get` is `Volume`; `Getter` keeps its prefix.
fn strip_camel_prefix<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    name.strip_prefix(prefix)
        .filter(|rest| rest.chars().next().is_some_and(|c| c.is_ascii_uppercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{AttrArg, AttrValue};
    use crate::model::{Argument, PropertyClassKind};
    use crate::types::{TypeId, TypeRegistry, TypeRef};

    fn raw(name: &str, args: &[&str]) -> RawAttribute {
        RawAttribute {
            name: name.to_string(),
            args: args
                .iter()
                .map(|a| AttrArg::positional(AttrValue::Ident(a.to_string())))
                .collect(),
            line: 0,
        }
    }

    fn int_type() -> TypeId {
        TypeRegistry::new().resolve("int")
    }

    #[test]
    fn test_wrong_declaration_kind() {
        let err = PendingMetadata::collect(DeclarationKind::Function, &[raw("property", &[])])
            .unwrap_err();
        assert_eq!(
            err.1,
            AttributeError::NotApplicable {
                attribute: "property".to_string(),
                declaration: "a global function".to_string(),
            }
        );
    }

    #[test]
    fn test_type_metadata() {
        let attrs = [raw("propertyClass", &["control"]), raw("ignore", &["csharp"])];
        let ty = PendingMetadata::collect(DeclarationKind::Type, &attrs)
            .unwrap()
            .into_type();
        assert_eq!(ty.property_class.unwrap().kind, PropertyClassKind::Control);
        assert!(ty.ignore.is_ignored_for("csharp"));
    }

    #[test]
    fn test_unit_core_type_requires_name() {
        let err = PendingMetadata::collect(DeclarationKind::Unit, &[raw("coreType", &[])])
            .unwrap_err();
        assert!(matches!(err.1, AttributeError::MissingParameter { .. }));

        let unit = PendingMetadata::collect(DeclarationKind::Unit, &[raw("coreType", &["IUnknown"])])
            .unwrap()
            .into_unit();
        assert_eq!(unit.core_types, vec!["IUnknown"]);
    }

    #[test]
    fn test_property_info_inferred_from_prefix() {
        let method = PendingMetadata::collect(DeclarationKind::Method, &[raw("property", &[])])
            .unwrap()
            .into_method();
        let info = method.property_info("SetVolume").unwrap();
        assert_eq!(info.name, "Volume");
        assert_eq!(info.accessor, Accessor::Set);

        let explicit = PendingMetadata::collect(
            DeclarationKind::Method,
            &[raw("property", &["Level", "get"])],
        )
        .unwrap()
        .into_method();
        assert_eq!(explicit.property_info("Fetch").unwrap().name, "Level");
    }

    #[test]
    fn test_signature_metadata_applies_to_arguments() {
        let attrs = [raw("array", &["items", "count"]), raw("stealRef", &["items"])];
        let function = PendingMetadata::collect(DeclarationKind::Function, &attrs)
            .unwrap()
            .into_function();

        let int = int_type();
        let mut overload = Overload::default();
        overload.arguments.push(Argument::new("items", TypeRef::new(int)));
        overload.arguments.push(Argument::new("count", TypeRef::new(int)));
        function.signature.apply(&mut overload).unwrap();

        let items = overload.argument("items").unwrap();
        assert_eq!(items.array_length.as_deref(), Some("count"));
        assert!(items.steal_reference);
        assert!(overload.has_array_argument());
    }

    #[test]
    fn test_signature_metadata_unknown_argument() {
        let function = PendingMetadata::collect(DeclarationKind::Function, &[raw("polymorphic", &["x"])])
            .unwrap()
            .into_function();
        let mut overload = Overload::default();
        assert!(matches!(
            function.signature.apply(&mut overload),
            Err((0, AttributeError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_signature_error_carries_attribute_line() {
        let mut steal = raw("stealRef", &["missing"]);
        steal.line = 3;
        let attrs = [raw("array", &["items"]), steal];
        let function = PendingMetadata::collect(DeclarationKind::Function, &attrs)
            .unwrap()
            .into_function();

        let mut overload = Overload::default();
        overload.arguments.push(Argument::new("items", TypeRef::new(int_type())));
        let (line, error) = function.signature.apply(&mut overload).unwrap_err();
        assert_eq!(line, 3);
        assert!(matches!(error, AttributeError::InvalidValue { .. }));
    }
}
