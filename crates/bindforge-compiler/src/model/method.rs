//! Methods, overloads and arguments.

use serde::Serialize;

use crate::docs::Documentation;
use crate::types::TypeRef;

use super::IgnoreScope;

/// A named method grouping every overload that shares the name.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub overloads: Vec<Overload>,
    pub property: Option<PropertyInfo>,
    pub event: Option<EventInfo>,
    pub ignore: IgnoreScope,
    /// The return value is the receiver itself (fluent chaining).
    pub returns_self: bool,
    pub documentation: Documentation,
}

impl Method {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            overloads: Vec::new(),
            property: None,
            event: None,
            ignore: IgnoreScope::default(),
            returns_self: false,
            documentation: Documentation::default(),
        }
    }
}

/// One callable signature.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Overload {
    /// `None` for `void` functions and Pascal procedures.
    pub return_type: Option<TypeRef>,
    pub calling_convention: Option<String>,
    pub arguments: Vec<Argument>,
    /// The returned object may be of a derived type.
    pub polymorphic_return: bool,
}

impl Overload {
    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|arg| arg.name == name)
    }

    pub fn argument_mut(&mut self, name: &str) -> Option<&mut Argument> {
        self.arguments.iter_mut().find(|arg| arg.name == name)
    }

    pub fn has_array_argument(&self) -> bool {
        self.arguments
            .iter()
            .any(|arg| arg.ty.is_array() || arg.array_length.is_some())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: String,
    pub ty: TypeRef,
    pub is_const: bool,
    pub is_out: bool,
    /// Passed by reference for in/out use (`var`, `[in, out]`).
    pub is_out_pointer: bool,
    /// Name of the sibling argument carrying this array's length.
    pub array_length: Option<String>,
    pub default_value: Option<String>,
    pub polymorphic: bool,
    /// Ownership of the reference moves to the callee.
    pub steal_reference: bool,
}

impl Argument {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            is_const: false,
            is_out: false,
            is_out_pointer: false,
            array_length: None,
            default_value: None,
            polymorphic: false,
            steal_reference: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Accessor {
    Get,
    Set,
}

/// Binds a method to one side of a property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyInfo {
    pub name: String,
    pub accessor: Accessor,
    pub is_default: bool,
}

/// Marks a method as the registration point of an event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventInfo {
    pub name: String,
    pub sink: Option<String>,
}
