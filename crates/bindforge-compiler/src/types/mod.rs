//! Type system shared by every front-end and generator.
//!
//! Types are owned by a per-file [`TypeRegistry`] arena and referenced through
//! [`TypeId`] handles. Canonical entries are deduplicated by name; anything
//! derived from them (specializations, substituted signatures) gets a fresh
//! entry so the canonical instance is never rewritten behind a shared handle.

mod attribute_info;
mod primitive;
mod registry;

pub use attribute_info::{AttributeInfo, TypeLookup, CORE_MODULE};
pub use primitive::Primitive;
pub use registry::TypeRegistry;

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

/// Handle to a type owned by a [`TypeRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(u32);

impl TypeId {
    /// Raw arena index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A structured namespace path such as `Acme.Media`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Namespace {
    components: Vec<String>,
}

impl Namespace {
    pub fn new(components: Vec<String>) -> Self {
        Self { components }
    }

    /// Parses either the dotted (`A.B`) or the scoped (`A::B`) form.
    pub fn parse(text: &str) -> Self {
        let components = text
            .split("::")
            .flat_map(|part| part.split('.'))
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect();
        Self { components }
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn dotted(&self) -> String {
        self.components.join(".")
    }

    pub fn scoped(&self) -> String {
        self.components.join("::")
    }

    pub fn joined(&self, separator: &str) -> String {
        self.components.join(separator)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

/// A type descriptor stored in the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeName {
    pub namespace: Namespace,
    pub name: String,
    pub generic_args: Vec<TypeId>,
    /// Pointer/reference/array indicators (`*`, `&`, `[]`).
    pub modifiers: String,
    pub identity: Option<Uuid>,
    /// Set while at least one generic argument is still an unresolved parameter.
    pub has_generic_arguments: bool,
    /// Set on the placeholder for a generic parameter such as `T`.
    pub is_generic_parameter: bool,
    /// The generic declaration this entry instantiates (`IList` for `IList<Int32>`).
    pub generic_base: Option<TypeId>,
    /// Set on an entry that differs from its canonical type only in
    /// modifiers, as when `char*` appears as a generic argument.
    pub variant_of: Option<TypeId>,
    pub primitive: Option<Primitive>,
}

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let primitive = Primitive::classify(&name);
        let modifiers = if is_interface_name(&name) {
            "*".to_string()
        } else {
            String::new()
        };
        Self {
            namespace: Namespace::default(),
            name,
            generic_args: Vec::new(),
            modifiers,
            identity: None,
            has_generic_arguments: false,
            is_generic_parameter: false,
            generic_base: None,
            variant_of: None,
            primitive,
        }
    }

    /// Whether this type follows the interface naming convention.
    pub fn is_interface(&self) -> bool {
        is_interface_name(&self.name)
    }
}

/// A type as used at a particular site (argument, return value, alias target).
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    pub id: TypeId,
    /// Usage-site modifiers; empty means "use the canonical modifiers".
    pub modifiers: String,
}

impl TypeRef {
    pub fn new(id: TypeId) -> Self {
        Self {
            id,
            modifiers: String::new(),
        }
    }

    pub fn with_modifiers(id: TypeId, modifiers: impl Into<String>) -> Self {
        Self {
            id,
            modifiers: modifiers.into(),
        }
    }

    /// Modifiers in effect for this usage.
    pub fn effective_modifiers<'a>(&'a self, registry: &'a TypeRegistry) -> &'a str {
        if self.modifiers.is_empty() {
            &registry.get(self.id).modifiers
        } else {
            &self.modifiers
        }
    }

    pub fn is_array(&self) -> bool {
        self.modifiers.contains("[]")
    }
}

/// Interface names start with `I` followed by an uppercase letter (`IFoo`, not `Int`).
pub fn is_interface_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some('I'), Some(second)) if second.is_ascii_uppercase()
    )
}

/// Adds a pointer indicator to interface modifiers that carry none.
pub(crate) fn interface_modifiers(name: &str, modifiers: &str) -> String {
    if is_interface_name(name) && !modifiers.contains('*') && !modifiers.contains('&') {
        format!("*{modifiers}")
    } else {
        modifiers.to_string()
    }
}
