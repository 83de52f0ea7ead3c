//! Per-file arena of canonical types.

use std::collections::HashMap;

use uuid::Uuid;

use super::{interface_modifiers, Namespace, TypeId, TypeName};

/// Owns every [`TypeName`] of one file.
///
/// Names resolve to one canonical entry each, created on first reference, so
/// a type may be used before the statement declaring it has been reached.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: Vec<TypeName>,
    by_name: HashMap<String, TypeId>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the canonical type for `name`, registering it on first use.
    ///
    /// Qualified spellings (`Acme::IFoo`, `Acme.IFoo`) resolve to the bare name;
    /// the qualifier is recorded only when the entry is created.
    pub fn resolve(&mut self, name: &str) -> TypeId {
        let (namespace, bare) = split_qualified(name);
        if let Some(&id) = self.by_name.get(bare) {
            return id;
        }
        let mut ty = TypeName::new(bare);
        ty.namespace = namespace;
        self.insert(bare.to_string(), ty)
    }

    /// Resolves `name` and records where it is declared.
    pub fn bind(&mut self, namespace: Namespace, name: &str, modifiers: &str) -> TypeId {
        let id = self.resolve(name);
        let ty = &mut self.types[id.index()];
        ty.namespace = namespace;
        ty.modifiers = interface_modifiers(&ty.name, modifiers);
        id
    }

    /// Marks `name` as a generic parameter placeholder.
    pub fn declare_generic_parameter(&mut self, name: &str) -> TypeId {
        let id = self.resolve(name);
        let ty = &mut self.types[id.index()];
        ty.is_generic_parameter = true;
        ty.modifiers.clear();
        id
    }

    /// Attaches generic parameter slots to a generic declaration.
    pub fn set_generic_parameters(&mut self, owner: TypeId, params: Vec<TypeId>) {
        let ty = &mut self.types[owner.index()];
        ty.has_generic_arguments = !params.is_empty();
        ty.generic_args = params;
    }

    /// Returns the canonical entry for `base<args…>`, creating it on first use.
    pub fn instantiate(&mut self, base: TypeId, args: Vec<TypeId>) -> TypeId {
        if args.is_empty() {
            return base;
        }
        let base = self.get(base).generic_base.unwrap_or(base);
        let key = self.instance_key(base, &args);
        if let Some(&id) = self.by_name.get(&key) {
            return id;
        }
        let unresolved = args.iter().any(|arg| self.contains_unresolved(*arg));
        let mut ty = self.get(base).clone();
        ty.generic_args = args;
        ty.has_generic_arguments = unresolved;
        ty.is_generic_parameter = false;
        ty.generic_base = Some(base);
        ty.identity = None;
        self.insert(key, ty)
    }

    /// Returns the entry for `id` spelled with `modifiers`.
    ///
    /// Canonical modifiers (or none) give back `id` itself; anything else gets
    /// its own entry so that `IList<char*>` and `IList<char>` stay distinct.
    pub fn with_modifiers(&mut self, id: TypeId, modifiers: &str) -> TypeId {
        let id = self.get(id).variant_of.unwrap_or(id);
        if modifiers.is_empty() || self.get(id).modifiers == modifiers {
            return id;
        }
        let key = format!("{}{}", self.display(id), modifiers);
        if let Some(&existing) = self.by_name.get(&key) {
            return existing;
        }
        let mut ty = self.get(id).clone();
        ty.modifiers = modifiers.to_string();
        ty.variant_of = Some(id);
        ty.identity = None;
        self.insert(key, ty)
    }

    /// Allocates an entry that is not reachable by name.
    pub fn alloc(&mut self, ty: TypeName) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    /// Rewrites `id` through `substitutions`, instantiating new entries for
    /// generic types whose arguments change.
    pub fn substitute(&mut self, id: TypeId, substitutions: &HashMap<TypeId, TypeId>) -> TypeId {
        if let Some(&concrete) = substitutions.get(&id) {
            return concrete;
        }
        if let Some(canonical) = self.get(id).variant_of {
            let substituted = self.substitute(canonical, substitutions);
            if substituted == canonical {
                return id;
            }
            let modifiers = self.get(id).modifiers.clone();
            return self.with_modifiers(substituted, &modifiers);
        }
        if !self.contains_unresolved(id) || self.get(id).generic_args.is_empty() {
            return id;
        }
        let args = self.get(id).generic_args.clone();
        let substituted: Vec<TypeId> = args
            .iter()
            .map(|arg| self.substitute(*arg, substitutions))
            .collect();
        if substituted == args {
            return id;
        }
        self.instantiate(id, substituted)
    }

    pub fn get(&self, id: TypeId) -> &TypeName {
        &self.types[id.index()]
    }

    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    pub fn set_identity(&mut self, id: TypeId, identity: Uuid) {
        self.types[id.index()].identity = Some(identity);
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &TypeName)> {
        self.types
            .iter()
            .enumerate()
            .map(|(index, ty)| (TypeId(index as u32), ty))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// True for placeholders and for types that still mention one.
    pub fn contains_unresolved(&self, id: TypeId) -> bool {
        let ty = self.get(id);
        ty.is_generic_parameter || ty.has_generic_arguments
    }

    /// Namespace of a type; instantiations report their declaration's namespace.
    pub fn namespace_of(&self, id: TypeId) -> &Namespace {
        let ty = self.get(id);
        if let Some(canonical) = ty.variant_of {
            return self.namespace_of(canonical);
        }
        match ty.generic_base {
            Some(base) => &self.get(base).namespace,
            None => &ty.namespace,
        }
    }

    /// `IList<Int32>`, `IList<char*>`
    pub fn display(&self, id: TypeId) -> String {
        let ty = self.get(id);
        let mut name = ty.name.clone();
        if !ty.generic_args.is_empty() {
            let args: Vec<String> = ty.generic_args.iter().map(|arg| self.display(*arg)).collect();
            name = format!("{}<{}>", name, args.join(","));
        }
        if ty.variant_of.is_some() {
            name.push_str(&ty.modifiers);
        }
        name
    }

    /// `Acme.Collections.IList<Acme.Media.IPlayer>`
    pub fn qualified_name(&self, id: TypeId) -> String {
        let ty = self.get(id);
        let mut name = String::new();
        let namespace = self.namespace_of(id);
        for component in namespace.components() {
            name.push_str(component);
            name.push('.');
        }
        name.push_str(&ty.name);
        if !ty.generic_args.is_empty() {
            let args: Vec<String> = ty
                .generic_args
                .iter()
                .map(|arg| self.qualified_name(*arg))
                .collect();
            name.push('<');
            name.push_str(&args.join(","));
            name.push('>');
        }
        if ty.variant_of.is_some() {
            name.push_str(&ty.modifiers);
        }
        name
    }

    /// The name fed to the identity generator for this type.
    pub fn identity_name(&self, id: TypeId, suffix: Option<&str>) -> String {
        let mut name = self.qualified_name(id);
        if let Some(suffix) = suffix {
            name.push_str(suffix);
        }
        name
    }

    fn instance_key(&self, base: TypeId, args: &[TypeId]) -> String {
        let args: Vec<String> = args.iter().map(|arg| self.display(*arg)).collect();
        format!("{}<{}>", self.get(base).name, args.join(","))
    }

    fn insert(&mut self, key: String, ty: TypeName) -> TypeId {
        let id = self.alloc(ty);
        self.by_name.insert(key, id);
        id
    }
}

fn split_qualified(name: &str) -> (Namespace, &str) {
    let split_at = match (name.rfind("::"), name.rfind('.')) {
        (Some(scope), _) => Some((scope, 2)),
        (None, Some(dot)) => Some((dot, 1)),
        (None, None) => None,
    };
    match split_at {
        Some((index, width)) => (Namespace::parse(&name[..index]), &name[index + width..]),
        None => (Namespace::default(), name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_is_canonical() {
        let mut registry = TypeRegistry::new();
        let first = registry.resolve("Widget");
        let second = registry.resolve("Widget");
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_forward_reference_then_bind() {
        let mut registry = TypeRegistry::new();
        let used = registry.resolve("IFoo");
        assert_eq!(registry.get(used).modifiers, "*");

        let declared = registry.bind(Namespace::parse("Acme"), "IFoo", "");
        assert_eq!(used, declared);
        assert_eq!(registry.get(declared).namespace.dotted(), "Acme");
        assert_eq!(registry.get(declared).modifiers, "*");
    }

    #[test]
    fn test_bind_value_type_keeps_modifiers() {
        let mut registry = TypeRegistry::new();
        let id = registry.bind(Namespace::default(), "Handle", "");
        assert_eq!(registry.get(id).modifiers, "");
    }

    #[test]
    fn test_qualified_resolution_uses_bare_name() {
        let mut registry = TypeRegistry::new();
        let id = registry.resolve("Acme::Core::IBase");
        assert_eq!(registry.get(id).name, "IBase");
        assert_eq!(registry.get(id).namespace.dotted(), "Acme.Core");
        assert_eq!(registry.lookup("IBase"), Some(id));
    }

    #[test]
    fn test_instantiate_and_substitute() {
        let mut registry = TypeRegistry::new();
        let list = registry.bind(Namespace::parse("Acme"), "IList", "");
        let t = registry.declare_generic_parameter("T");
        registry.set_generic_parameters(list, vec![t]);
        let int = registry.resolve("int");

        let open = registry.instantiate(list, vec![t]);
        assert!(registry.contains_unresolved(open));

        let mut map = HashMap::new();
        map.insert(t, int);
        let closed = registry.substitute(open, &map);
        assert!(!registry.contains_unresolved(closed));
        assert_eq!(registry.display(closed), "IList<int>");
        assert_eq!(registry.qualified_name(closed), "Acme.IList<int>");
        assert_eq!(registry.instantiate(list, vec![int]), closed);
        assert_eq!(registry.get(list).generic_args, vec![t]);
    }

    #[test]
    fn test_argument_modifiers_give_distinct_instances() {
        let mut registry = TypeRegistry::new();
        let list = registry.bind(Namespace::parse("Acme"), "IList", "");
        let t = registry.declare_generic_parameter("T");
        registry.set_generic_parameters(list, vec![t]);
        let char_ = registry.resolve("char");
        let char_ptr = registry.with_modifiers(char_, "*");
        assert_ne!(char_, char_ptr);
        assert_eq!(registry.with_modifiers(char_, "*"), char_ptr);
        assert_eq!(registry.with_modifiers(char_, ""), char_);
        assert_eq!(registry.get(char_ptr).modifiers, "*");

        let chars = registry.instantiate(list, vec![char_]);
        let strings = registry.instantiate(list, vec![char_ptr]);
        assert_ne!(chars, strings);
        assert_eq!(registry.display(strings), "IList<char*>");
        assert_eq!(registry.qualified_name(strings), "Acme.IList<char*>");
        assert_eq!(registry.qualified_name(chars), "Acme.IList<char>");
    }

    #[test]
    fn test_canonical_interface_modifiers_reuse_entry() {
        let mut registry = TypeRegistry::new();
        let player = registry.bind(Namespace::parse("Acme"), "IPlayer", "");
        assert_eq!(registry.with_modifiers(player, "*"), player);
        let reference = registry.with_modifiers(player, "*&");
        assert_ne!(reference, player);
        assert_eq!(registry.namespace_of(reference).dotted(), "Acme");
    }

    #[test]
    fn test_substitute_through_modified_parameter() {
        let mut registry = TypeRegistry::new();
        let list = registry.bind(Namespace::default(), "IList", "");
        let t = registry.declare_generic_parameter("T");
        registry.set_generic_parameters(list, vec![t]);
        let t_ptr = registry.with_modifiers(t, "*");
        let open = registry.instantiate(list, vec![t_ptr]);
        assert!(registry.contains_unresolved(open));

        let int = registry.resolve("int");
        let mut map = HashMap::new();
        map.insert(t, int);
        let closed = registry.substitute(open, &map);
        assert_eq!(registry.display(closed), "IList<int*>");
        assert!(!registry.contains_unresolved(closed));
    }
}
