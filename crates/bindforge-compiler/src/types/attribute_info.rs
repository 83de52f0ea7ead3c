//! Per-file classification of identifiers and target spelling overrides.

use std::collections::{BTreeMap, BTreeSet};

/// Module name of the foundational library that owns every core type.
pub const CORE_MODULE: &str = "Core";

/// Result of looking an identifier up in [`AttributeInfo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeLookup<'a> {
    /// Defined by the foundational library; never renamed.
    Core(&'static str),
    /// Explicit spelling override.
    Override(&'a str),
    /// Use the declared name.
    Declared,
}

/// Identifier classification for one file.
#[derive(Debug, Clone, Default)]
pub struct AttributeInfo {
    core_types: BTreeSet<String>,
    value_types: BTreeSet<String>,
    type_mappings: BTreeMap<String, String>,
}

impl AttributeInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_core(&mut self, name: impl Into<String>) {
        self.core_types.insert(name.into());
    }

    pub fn mark_value_type(&mut self, name: impl Into<String>) {
        self.value_types.insert(name.into());
    }

    pub fn is_core(&self, name: &str) -> bool {
        self.core_types.contains(name)
    }

    pub fn is_value_type(&self, name: &str) -> bool {
        self.value_types.contains(name)
    }

    pub fn core_types(&self) -> impl Iterator<Item = &str> {
        self.core_types.iter().map(String::as_str)
    }

    /// Sets an explicit target spelling for `name`.
    pub fn map_type(&mut self, name: impl Into<String>, spelling: impl Into<String>) {
        self.type_mappings.insert(name.into(), spelling.into());
    }

    pub fn type_mappings(&self) -> &BTreeMap<String, String> {
        &self.type_mappings
    }

    pub fn type_mappings_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.type_mappings
    }

    /// Core classification takes precedence over any override.
    pub fn lookup(&self, name: &str) -> TypeLookup<'_> {
        if self.is_core(name) {
            return TypeLookup::Core(CORE_MODULE);
        }
        match self.type_mappings.get(name) {
            Some(spelling) => TypeLookup::Override(spelling),
            None => TypeLookup::Declared,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_type_wins_over_override() {
        let mut info = AttributeInfo::new();
        info.map_type("IUnknown", "IInspectable");
        info.mark_core("IUnknown");
        assert_eq!(info.lookup("IUnknown"), TypeLookup::Core(CORE_MODULE));
    }

    #[test]
    fn test_override_and_declared() {
        let mut info = AttributeInfo::new();
        info.map_type("int32_t", "int");
        assert_eq!(info.lookup("int32_t"), TypeLookup::Override("int"));
        assert_eq!(info.lookup("Widget"), TypeLookup::Declared);
    }
}
