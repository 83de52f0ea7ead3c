//! Language-neutral model of one interface description file.
//!
//! Every front-end produces a [`File`] and every generator consumes one. A
//! file is built during a single forward parse and is read-only afterwards,
//! apart from the type mappings a generator registers before rendering.

mod factory;
mod interface;
mod method;

pub use factory::{Constructor, Factory, FactoryDispatch};
pub use interface::{
    EnumOption, Enumeration, Event, Function, Interface, PropertyClass, PropertyClassKind,
};
pub use method::{Accessor, Argument, EventInfo, Method, Overload, PropertyInfo};

use std::collections::{BTreeMap, HashSet};
use std::ops::BitOr;

use crate::docs::Documentation;
use crate::types::{AttributeInfo, Namespace, TypeId, TypeRef, TypeRegistry};

/// Generators a declaration is hidden from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreScope {
    all: bool,
    generators: Vec<String>,
}

impl IgnoreScope {
    /// `None` ignores the declaration for every generator.
    pub fn add(&mut self, generator: Option<&str>) {
        match generator {
            None => self.all = true,
            Some(name) => {
                if !self.generators.iter().any(|g| g.eq_ignore_ascii_case(name)) {
                    self.generators.push(name.to_string());
                }
            }
        }
    }

    pub fn is_ignored_for(&self, generator: &str) -> bool {
        self.all || self.generators.iter().any(|g| g.eq_ignore_ascii_case(generator))
    }

    pub fn is_empty(&self) -> bool {
        !self.all && self.generators.is_empty()
    }

    pub fn merge(&mut self, other: &IgnoreScope) {
        if other.all {
            self.all = true;
        }
        for generator in &other.generators {
            self.add(Some(generator));
        }
    }
}

/// Post-parse summary of what a file uses, so templates can skip sections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Features(u8);

impl Features {
    pub const EVENTS: Features = Features(1 << 0);
    pub const UI_CONTROLS: Features = Features(1 << 1);
    pub const ARRAYS: Features = Features(1 << 2);

    pub fn empty() -> Self {
        Self(0)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: Features) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Features) {
        self.0 |= other.0;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Walks the already-built model once.
    pub fn scan(file: &File) -> Features {
        let mut features = Features::empty();
        for interface in &file.interfaces {
            if !interface.events.is_empty() {
                features.insert(Features::EVENTS);
            }
            if interface.is_ui_control() {
                features.insert(Features::UI_CONTROLS);
            }
            let arrays = interface
                .methods
                .iter()
                .flat_map(|method| method.overloads.iter())
                .any(Overload::has_array_argument);
            if arrays {
                features.insert(Features::ARRAYS);
            }
        }
        if file.functions.iter().any(|f| f.overload.has_array_argument()) {
            features.insert(Features::ARRAYS);
        }
        features
    }
}

impl BitOr for Features {
    type Output = Features;

    fn bitor(self, rhs: Features) -> Features {
        Features(self.0 | rhs.0)
    }
}

/// A named alias for another type.
#[derive(Debug, Clone, PartialEq)]
pub struct Alias {
    pub name: String,
    pub target: TypeRef,
    /// `typedef struct X* H;`, `H = ^X;`, `H = Pointer;`
    pub opaque: bool,
    pub documentation: Documentation,
}

/// One parsed interface description file.
#[derive(Debug, Clone)]
pub struct File {
    pub source_name: String,
    /// The unit or namespace the file declares, if any.
    pub namespace: Namespace,
    pub interfaces: Vec<Interface>,
    pub functions: Vec<Function>,
    pub enumerations: Vec<Enumeration>,
    pub aliases: BTreeMap<String, Alias>,
    /// Include and `uses` references, in order of first appearance.
    pub includes: Vec<String>,
    pub registry: TypeRegistry,
    pub attributes: AttributeInfo,
    pub features: Features,
    /// Syntax errors tolerated in continue-on-errors mode.
    pub syntax_errors: usize,
    pub documentation: Documentation,
}

impl File {
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            namespace: Namespace::default(),
            interfaces: Vec::new(),
            functions: Vec::new(),
            enumerations: Vec::new(),
            aliases: BTreeMap::new(),
            includes: Vec::new(),
            registry: TypeRegistry::new(),
            attributes: AttributeInfo::new(),
            features: Features::empty(),
            syntax_errors: 0,
            documentation: Documentation::default(),
        }
    }

    pub fn add_include(&mut self, include: impl Into<String>) {
        let include = include.into();
        if !self.includes.contains(&include) {
            self.includes.push(include);
        }
    }

    pub fn interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces.iter().find(|iface| iface.name == name)
    }

    pub fn enumeration(&self, name: &str) -> Option<&Enumeration> {
        self.enumerations.iter().find(|e| e.name == name)
    }

    /// Follows alias chains to the underlying type.
    pub fn resolve_alias(&self, id: TypeId) -> TypeId {
        let mut current = id;
        let mut seen = HashSet::new();
        while seen.insert(current) {
            let name = &self.registry.get(current).name;
            match self.aliases.get(name) {
                Some(alias) if !alias.opaque => current = alias.target.id,
                _ => break,
            }
        }
        current
    }
}
