//! Target spelling of registry types.

use crate::types::{AttributeInfo, TypeId, TypeLookup, TypeRef, TypeRegistry};

use super::Generator;

/// Spells types for one generator.
///
/// Core types are spelled `Core<sep>Name` regardless of any override;
/// otherwise an explicit mapping wins over the declared name. Generic
/// arguments are spelled recursively.
pub struct TypeSpeller<'a> {
    registry: &'a TypeRegistry,
    attributes: &'a AttributeInfo,
    generator: &'a dyn Generator,
}

impl<'a> TypeSpeller<'a> {
    pub fn new(
        registry: &'a TypeRegistry,
        attributes: &'a AttributeInfo,
        generator: &'a dyn Generator,
    ) -> Self {
        Self {
            registry,
            attributes,
            generator,
        }
    }

    /// Spelling without usage modifiers.
    pub fn spell(&self, id: TypeId) -> String {
        let ty = self.registry.get(id);
        let base = self.base_name(&ty.name);
        if ty.generic_args.is_empty() {
            return base;
        }
        let args: Vec<String> = ty
            .generic_args
            .iter()
            .map(|arg| {
                let modifiers = &self.registry.get(*arg).modifiers;
                self.generator.spell_modifiers(&self.spell(*arg), modifiers)
            })
            .collect();
        format!("{}<{}>", base, args.join(", "))
    }

    /// Spelling of a usage, with its effective modifiers applied.
    pub fn spell_ref(&self, ty: &TypeRef) -> String {
        let modifiers = ty.effective_modifiers(self.registry);
        self.generator.spell_modifiers(&self.spell(ty.id), modifiers)
    }

    fn base_name(&self, name: &str) -> String {
        if !self.generator.remaps_types() {
            return name.to_string();
        }
        match self.attributes.lookup(name) {
            TypeLookup::Core(module) => {
                format!("{}{}{}", module, self.generator.namespace_separator(), name)
            }
            TypeLookup::Override(spelling) => spelling.to_string(),
            TypeLookup::Declared => name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{CSharpGenerator, CppGenerator, FallbackGenerator};
    use crate::types::Namespace;

    fn setup() -> (TypeRegistry, AttributeInfo) {
        let mut registry = TypeRegistry::new();
        let list = registry.bind(Namespace::parse("Acme"), "IList", "");
        let t = registry.declare_generic_parameter("T");
        registry.set_generic_parameters(list, vec![t]);
        registry.resolve("IUnknown");
        registry.resolve("int32_t");
        registry.resolve("IPlayer");

        let mut attributes = AttributeInfo::new();
        attributes.mark_core("IUnknown");
        attributes.map_type("IUnknown", "Ignored");
        attributes.map_type("int32_t", "int");
        (registry, attributes)
    }

    #[test]
    fn test_core_type_uses_separator() {
        let (mut registry, attributes) = setup();
        let unknown = registry.resolve("IUnknown");
        let cpp = TypeSpeller::new(&registry, &attributes, &CppGenerator);
        assert_eq!(cpp.spell(unknown), "Core::IUnknown");
        assert_eq!(cpp.spell_ref(&TypeRef::new(unknown)), "Core::IUnknown*");

        let csharp = TypeSpeller::new(&registry, &attributes, &CSharpGenerator);
        assert_eq!(csharp.spell_ref(&TypeRef::new(unknown)), "Core.IUnknown");
    }

    #[test]
    fn test_generic_arguments_spelled_recursively() {
        let (mut registry, attributes) = setup();
        let list = registry.resolve("IList");
        let int = registry.resolve("int32_t");
        let player = registry.resolve("IPlayer");
        let ints = registry.instantiate(list, vec![int]);
        let players = registry.instantiate(list, vec![player]);

        let cpp = TypeSpeller::new(&registry, &attributes, &CppGenerator);
        assert_eq!(cpp.spell(ints), "IList<int>");
        assert_eq!(cpp.spell(players), "IList<IPlayer*>");
        assert_eq!(cpp.spell_ref(&TypeRef::with_modifiers(ints, "*")), "IList<int>*");
    }

    #[test]
    fn test_generic_argument_keeps_its_modifiers() {
        let (mut registry, attributes) = setup();
        let list = registry.resolve("IList");
        let char_ = registry.resolve("char");
        let char_ptr = registry.with_modifiers(char_, "*");
        let strings = registry.instantiate(list, vec![char_ptr]);
        let chars = registry.instantiate(list, vec![char_]);

        let cpp = TypeSpeller::new(&registry, &attributes, &CppGenerator);
        assert_eq!(cpp.spell(strings), "IList<char*>");
        assert_eq!(cpp.spell(chars), "IList<char>");
    }

    #[test]
    fn test_fallback_keeps_declared_names() {
        let (mut registry, attributes) = setup();
        let unknown = registry.resolve("IUnknown");
        let int = registry.resolve("int32_t");
        let fallback = FallbackGenerator::new("rust");
        let speller = TypeSpeller::new(&registry, &attributes, &fallback);
        assert_eq!(speller.spell(unknown), "IUnknown");
        assert_eq!(speller.spell(int), "int32_t");
    }
}
