//! Specialization engine.
//!
//! Generic interfaces are instantiated on demand: every concrete usage found
//! in a file's registry yields one specialized [`Interface`] with its own
//! type entry and identity. Factories are folded into constructors here as
//! well, so generators only ever see the expanded model.

mod factory;
mod identity;

pub use factory::synthesize_constructor;
pub use identity::{identity, identity_in, IDENTITY_NAMESPACE};

use std::collections::HashMap;

use tracing::debug;

use crate::diagnostic::CompilerError;
use crate::model::{Constructor, File, Interface, Overload};
use crate::types::{TypeId, TypeRef, TypeRegistry};

/// Everything derived from a file by [`expand`].
#[derive(Debug, Clone, Default)]
pub struct Expansion {
    pub specializations: Vec<Interface>,
    pub constructors: Vec<Constructor>,
}

impl Expansion {
    pub fn constructor(&self, interface: &str) -> Option<&Constructor> {
        self.constructors.iter().find(|c| c.interface == interface)
    }
}

/// Binds `concrete_args` to the unresolved generic parameters of `interface`.
pub fn specialize(
    registry: &mut TypeRegistry,
    interface: &Interface,
    concrete_args: &[TypeId],
) -> Interface {
    specialize_with_suffix(registry, interface, concrete_args, None)
}

/// Like [`specialize`], appending `suffix` to the name the identity is
/// derived from.
///
/// Parameters are bound positionally. Slots without a matching argument stay
/// unresolved, and so does the result.
pub fn specialize_with_suffix(
    registry: &mut TypeRegistry,
    interface: &Interface,
    concrete_args: &[TypeId],
    suffix: Option<&str>,
) -> Interface {
    if !interface.is_generic(registry) {
        return interface.clone();
    }

    let params = registry.get(interface.ty).generic_args.clone();
    let substitutions: HashMap<TypeId, TypeId> = params
        .iter()
        .copied()
        .filter(|param| registry.get(*param).is_generic_parameter)
        .zip(concrete_args.iter().copied())
        .collect();

    let mut specialized = interface.clone();
    let args: Vec<TypeId> = params
        .iter()
        .map(|param| substitutions.get(param).copied().unwrap_or(*param))
        .collect();
    specialized.ty = registry.instantiate(interface.ty, args);
    specialized.explicit_identity = false;

    specialized.base = interface
        .base
        .as_ref()
        .map(|base| substitute_ref(registry, base, &substitutions));
    for method in &mut specialized.methods {
        for overload in &mut method.overloads {
            substitute_overload(registry, overload, &substitutions);
        }
    }
    for factory in &mut specialized.factories {
        substitute_overload(registry, &mut factory.overload, &substitutions);
    }

    let name = registry.identity_name(specialized.ty, suffix);
    registry.set_identity(specialized.ty, identity(&name));
    debug!(interface = %interface.name, instance = %name, "specialized generic interface");
    specialized
}

fn substitute_ref(
    registry: &mut TypeRegistry,
    ty: &TypeRef,
    substitutions: &HashMap<TypeId, TypeId>,
) -> TypeRef {
    TypeRef {
        id: registry.substitute(ty.id, substitutions),
        modifiers: ty.modifiers.clone(),
    }
}

fn substitute_overload(
    registry: &mut TypeRegistry,
    overload: &mut Overload,
    substitutions: &HashMap<TypeId, TypeId>,
) {
    if let Some(ret) = &overload.return_type {
        overload.return_type = Some(substitute_ref(registry, ret, substitutions));
    }
    for argument in &mut overload.arguments {
        argument.ty = substitute_ref(registry, &argument.ty, substitutions);
    }
}

/// Specializes every generic interface of `file` once per concrete usage.
pub fn instantiations(file: &mut File) -> Vec<Interface> {
    let usages: Vec<(TypeId, Vec<TypeId>)> = file
        .registry
        .iter()
        .filter_map(|(id, ty)| {
            let base = ty.generic_base?;
            if ty.variant_of.is_some() || file.registry.contains_unresolved(id) {
                return None;
            }
            Some((base, ty.generic_args.clone()))
        })
        .collect();

    let mut specializations = Vec::new();
    for (base, args) in usages {
        let Some(generic) = file.interfaces.iter().find(|i| i.ty == base) else {
            continue;
        };
        specializations.push(specialize(&mut file.registry, generic, &args));
    }
    specializations
}

/// Runs instantiation and constructor synthesis over a whole file.
pub fn expand(file: &mut File) -> Result<Expansion, CompilerError> {
    let specializations = instantiations(file);

    let mut constructors = Vec::new();
    for interface in &file.interfaces {
        if let Some(constructor) = synthesize_constructor(&mut file.registry, interface)? {
            constructors.push(constructor);
        }
    }

    debug!(
        file = %file.source_name,
        specializations = specializations.len(),
        constructors = constructors.len(),
        "expanded file"
    );
    Ok(Expansion {
        specializations,
        constructors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::cpp::CppParser;
    use crate::frontend::{FrontEndParser, ParseOptions};

    const LIST: &str = r#"
        namespace Acme {
        template <typename T>
        interface IList : IUnknown {
            T Get(int index);
            void Add(T item);
        };
        interface IPlayer : IUnknown {
            IList<int>* Tracks();
            IList<IPlayer>* Peers();
        };
        }
    "#;

    fn parse(source: &str) -> File {
        CppParser.parse(source, &ParseOptions::new("list.h")).unwrap()
    }

    #[test]
    fn test_concrete_interface_is_unchanged() {
        let mut file = parse(LIST);
        let player = file.interface("IPlayer").unwrap().clone();
        let int = file.registry.lookup("int").unwrap();
        let same = specialize(&mut file.registry, &player, &[int]);
        assert_eq!(same, player);
    }

    #[test]
    fn test_specialize_substitutes_signatures() {
        let mut file = parse(LIST);
        let list = file.interface("IList").unwrap().clone();
        let int = file.registry.lookup("int").unwrap();

        let specialized = specialize(&mut file.registry, &list, &[int]);
        assert!(!specialized.is_generic(&file.registry));
        assert_ne!(specialized.ty, list.ty);
        assert_eq!(file.registry.qualified_name(specialized.ty), "Acme.IList<int>");

        let get = &specialized.method("Get").unwrap().overloads[0];
        assert_eq!(get.return_type.as_ref().unwrap().id, int);
        let add = &specialized.method("Add").unwrap().overloads[0];
        assert_eq!(add.arguments[0].ty.id, int);

        // The generic declaration is untouched.
        assert!(list.is_generic(&file.registry));
        let open = &file.interface("IList").unwrap().method("Get").unwrap().overloads[0];
        assert!(file.registry.get(open.return_type.as_ref().unwrap().id).is_generic_parameter);
    }

    #[test]
    fn test_identity_depends_on_arguments() {
        let mut file = parse(LIST);
        let list = file.interface("IList").unwrap().clone();
        let int = file.registry.lookup("int").unwrap();
        let player = file.registry.lookup("IPlayer").unwrap();

        let a = specialize(&mut file.registry, &list, &[int]);
        let b = specialize(&mut file.registry, &list, &[player]);
        let a_id = a.identity(&file.registry).unwrap();
        let b_id = b.identity(&file.registry).unwrap();
        assert_ne!(a_id, b_id);
        assert_eq!(a_id, identity("Acme.IList<int>"));
        assert_eq!(b_id, identity("Acme.IList<Acme.IPlayer>"));
    }

    #[test]
    fn test_suffix_changes_identity() {
        let mut file = parse(LIST);
        let list = file.interface("IList").unwrap().clone();
        let int = file.registry.lookup("int").unwrap();
        let events = specialize_with_suffix(&mut file.registry, &list, &[int], Some("Events"));
        assert_eq!(
            events.identity(&file.registry),
            Some(identity("Acme.IList<int>Events"))
        );
    }

    #[test]
    fn test_missing_arguments_stay_unresolved() {
        let source = "template <typename K, typename V> interface IMap : IUnknown { V Get(K key); };";
        let mut file = parse(source);
        let map = file.interface("IMap").unwrap().clone();
        let int = file.registry.resolve("int");

        let partial = specialize(&mut file.registry, &map, &[int]);
        assert!(partial.is_generic(&file.registry));
        let get = &partial.method("Get").unwrap().overloads[0];
        assert_eq!(get.arguments[0].ty.id, int);
        assert!(file.registry.get(get.return_type.as_ref().unwrap().id).is_generic_parameter);
    }

    #[test]
    fn test_instantiations_cover_each_usage_once() {
        let mut file = parse(LIST);
        let specializations = instantiations(&mut file);
        let mut names: Vec<String> = specializations
            .iter()
            .map(|s| file.registry.qualified_name(s.ty))
            .collect();
        names.sort();
        assert_eq!(names, vec!["Acme.IList<Acme.IPlayer>", "Acme.IList<int>"]);
    }

    #[test]
    fn test_argument_modifiers_are_separate_specializations() {
        let source = r#"
            namespace Acme {
            template <typename T>
            interface IList : IUnknown { T Get(int index); };
            interface IHolder : IUnknown {
                IList<char*>* Strings();
                IList<char>* Chars();
            };
            }
        "#;
        let mut file = parse(source);
        let specializations = instantiations(&mut file);
        assert_eq!(specializations.len(), 2);

        let mut names: Vec<String> = specializations
            .iter()
            .map(|s| file.registry.qualified_name(s.ty))
            .collect();
        names.sort();
        assert_eq!(names, vec!["Acme.IList<char*>", "Acme.IList<char>"]);
        assert_ne!(
            specializations[0].identity(&file.registry),
            specializations[1].identity(&file.registry)
        );

        let strings = specializations
            .iter()
            .find(|s| file.registry.display(s.ty) == "IList<char*>")
            .unwrap();
        let get = strings.method("Get").unwrap().overloads[0].return_type.clone().unwrap();
        assert_eq!(file.registry.get(get.id).name, "char");
        assert_eq!(file.registry.get(get.id).modifiers, "*");
    }

    #[test]
    fn test_expand_builds_constructors() {
        let source = r#"
            interface IWidget : IUnknown { void Show(); };
            /// @factory(IWidget, tag = Default)
            IWidget* CreateWidget();
            /// @factory(IWidget, tag = WithValue)
            IWidget* CreateWidgetWithValue(int value);
        "#;
        let mut file = parse(source);
        let expansion = expand(&mut file).unwrap();
        assert!(expansion.specializations.is_empty());
        let ctor = expansion.constructor("IWidget").unwrap();
        assert!(ctor.is_tagged());
        assert_eq!(ctor.overload.arguments.len(), 1);
        assert!(ctor.to_wrapped_overload().arguments.is_empty());
    }
}
