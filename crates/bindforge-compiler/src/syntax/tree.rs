//! Concrete syntax tree shared by both dialect grammars.

use crate::diagnostic::SourcePos;

use super::{DocComment, SyntaxDiagnostic};

/// Output of a dialect grammar: the items it could parse plus every syntax
/// error it recovered from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyntaxTree {
    pub items: Vec<Item>,
    pub errors: Vec<SyntaxDiagnostic>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// A unit or namespace declaration. An empty name carries only the
    /// file-level doc comment.
    Unit {
        name: String,
        doc: Option<DocComment>,
        pos: SourcePos,
    },
    /// `#include "x.h"` or one name of a `uses` clause.
    Include { path: String, pos: SourcePos },
    Type(TypeDecl),
    Function(MethodDecl),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub name: String,
    pub generic_params: Vec<String>,
    /// Explicit identity literal, without braces.
    pub uuid: Option<String>,
    pub doc: Option<DocComment>,
    pub pos: SourcePos,
    pub body: TypeBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeBody {
    Alias(TypeExpr),
    /// Pointer to an undisclosed type (`struct X*`, `^X`, `Pointer`).
    OpaquePointer(Option<String>),
    Enum(Vec<EnumMember>),
    Interface(InterfaceBody),
    /// Declaration without a body (`interface IFoo;`, `IFoo = interface;`).
    Forward,
    /// A shape the model cannot express (`struct`, `record`, `class` bodies).
    Other { construct: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterfaceBody {
    pub base: Option<TypeExpr>,
    pub methods: Vec<MethodDecl>,
    pub properties: Vec<PropertyDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: String,
    pub value: Option<String>,
    pub doc: Option<DocComment>,
    pub pos: SourcePos,
}

/// A method or free function signature.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    /// `None` for `void` and Pascal procedures.
    pub return_type: Option<TypeExpr>,
    pub arguments: Vec<ArgDecl>,
    pub calling_convention: Option<String>,
    pub doc: Option<DocComment>,
    pub pos: SourcePos,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArgDirection {
    #[default]
    In,
    Out,
    InOut,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArgDecl {
    pub name: String,
    pub ty: TypeExpr,
    pub is_const: bool,
    pub direction: ArgDirection,
    pub default_value: Option<String>,
    pub pos: SourcePos,
}

/// A type as written: possibly qualified name, generic arguments, modifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeExpr {
    pub name: String,
    pub args: Vec<TypeExpr>,
    pub modifiers: String,
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            modifiers: String::new(),
        }
    }

    pub fn is_void(&self) -> bool {
        self.name == "void" && self.modifiers.is_empty() && self.args.is_empty()
    }
}

/// Pascal `property Name: T read Getter write Setter; default;`
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    pub name: String,
    pub ty: TypeExpr,
    pub read: Option<String>,
    pub write: Option<String>,
    pub is_default: bool,
    pub doc: Option<DocComment>,
    pub pos: SourcePos,
}
