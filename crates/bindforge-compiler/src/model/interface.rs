//! Interfaces, enumerations and global functions.

use serde::Serialize;
use uuid::Uuid;

use crate::diagnostic::SourcePos;
use crate::docs::Documentation;
use crate::types::{TypeId, TypeRef, TypeRegistry};

use super::{Factory, IgnoreScope, Method, Overload};

/// An interface declaration with single inheritance.
#[derive(Debug, Clone, PartialEq)]
pub struct Interface {
    pub name: String,
    pub ty: TypeId,
    pub base: Option<TypeRef>,
    pub methods: Vec<Method>,
    pub events: Vec<Event>,
    pub factories: Vec<Factory>,
    pub property_class: Option<PropertyClass>,
    pub ignore: IgnoreScope,
    pub documentation: Documentation,
    /// The identity came from an explicit literal in the source.
    pub explicit_identity: bool,
    pub pos: SourcePos,
}

impl Interface {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
            base: None,
            methods: Vec::new(),
            events: Vec::new(),
            factories: Vec::new(),
            property_class: None,
            ignore: IgnoreScope::default(),
            documentation: Documentation::default(),
            explicit_identity: false,
            pos: SourcePos::default(),
        }
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|method| method.name == name)
    }

    pub fn method_mut(&mut self, name: &str) -> Option<&mut Method> {
        self.methods.iter_mut().find(|method| method.name == name)
    }

    pub fn identity(&self, registry: &TypeRegistry) -> Option<Uuid> {
        registry.get(self.ty).identity
    }

    pub fn is_generic(&self, registry: &TypeRegistry) -> bool {
        registry.contains_unresolved(self.ty)
    }

    /// `propertyClass(kind = none)` hides the declaration from every generator.
    pub fn is_hidden(&self) -> bool {
        self.property_class
            .as_ref()
            .is_some_and(|class| class.kind == PropertyClassKind::None)
    }

    pub fn is_ui_control(&self) -> bool {
        self.property_class
            .as_ref()
            .is_some_and(|class| class.kind == PropertyClassKind::Control)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub name: String,
    /// The method that registers a handler for the event.
    pub method: String,
    pub sink: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyClassKind {
    None,
    Object,
    Control,
    Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyClass {
    pub kind: PropertyClassKind,
    pub category: Option<String>,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enumeration {
    pub name: String,
    pub ty: TypeId,
    pub options: Vec<EnumOption>,
    pub ignore: IgnoreScope,
    pub documentation: Documentation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumOption {
    pub name: String,
    pub value: Option<String>,
    pub documentation: Documentation,
}

impl EnumOption {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            documentation: Documentation::default(),
        }
    }
}

/// A free function declared at file scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub overload: Overload,
    pub ignore: IgnoreScope,
    pub documentation: Documentation,
    pub pos: SourcePos,
}
