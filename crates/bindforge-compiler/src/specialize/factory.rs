//! Constructor synthesis from `@factory` functions.

use std::collections::HashSet;

use tracing::debug;

use crate::diagnostic::CompilerError;
use crate::docs::Documentation;
use crate::model::{
    Argument, Constructor, EnumOption, Enumeration, FactoryDispatch, IgnoreScope, Interface,
};
use crate::types::{is_interface_name, TypeRef, TypeRegistry};

/// Builds the constructor standing for every factory of `interface`.
///
/// A single factory is wrapped as is. Several factories get a tag
/// enumeration, `<Stem>FactoryTag`, passed as the leading `tag` argument; the
/// remaining arguments are those of the first factory.
pub fn synthesize_constructor(
    registry: &mut TypeRegistry,
    interface: &Interface,
) -> Result<Option<Constructor>, CompilerError> {
    let Some(first) = interface.factories.first() else {
        return Ok(None);
    };

    let dispatch: Vec<FactoryDispatch> = interface
        .factories
        .iter()
        .map(|factory| FactoryDispatch {
            function: factory.function.clone(),
            tag: factory.tag.clone(),
        })
        .collect();

    if interface.factories.len() == 1 {
        return Ok(Some(Constructor {
            interface: interface.name.clone(),
            tag_enum: None,
            overload: first.overload.clone(),
            dispatch,
        }));
    }

    let mut seen = HashSet::new();
    for factory in &interface.factories {
        if !seen.insert(factory.tag.as_str()) {
            return Err(CompilerError::DuplicateFactoryTag {
                interface: interface.name.clone(),
                tag: factory.tag.clone(),
            });
        }
    }

    let enum_name = format!("{}FactoryTag", stem(&interface.name));
    let namespace = registry.namespace_of(interface.ty).clone();
    let enum_ty = registry.bind(namespace, &enum_name, "");
    let tag_enum = Enumeration {
        name: enum_name,
        ty: enum_ty,
        options: interface
            .factories
            .iter()
            .map(|factory| {
                let mut option = EnumOption::new(factory.tag.clone());
                option.documentation = factory.documentation.clone();
                option
            })
            .collect(),
        ignore: IgnoreScope::default(),
        documentation: Documentation::default(),
    };

    let mut overload = first.overload.clone();
    overload
        .arguments
        .insert(0, Argument::new("tag", TypeRef::new(enum_ty)));

    debug!(
        interface = %interface.name,
        factories = dispatch.len(),
        "synthesized tagged constructor"
    );
    Ok(Some(Constructor {
        interface: interface.name.clone(),
        tag_enum: Some(tag_enum),
        overload,
        dispatch,
    }))
}

/// `IPlayer` -> `Player`; names without the interface prefix are kept.
fn stem(name: &str) -> &str {
    if is_interface_name(name) {
        &name[1..]
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Factory, Overload};
    use crate::types::Namespace;

    fn factory(function: &str, tag: &str, args: &[&str], registry: &mut TypeRegistry) -> Factory {
        let mut overload = Overload::default();
        for name in args {
            let ty = registry.resolve("int");
            overload.arguments.push(Argument::new(*name, TypeRef::new(ty)));
        }
        Factory {
            interface: "IWidget".to_string(),
            tag: tag.to_string(),
            function: function.to_string(),
            overload,
            documentation: Documentation::default(),
        }
    }

    fn widget(registry: &mut TypeRegistry) -> Interface {
        let ty = registry.bind(Namespace::parse("Acme"), "IWidget", "");
        Interface::new("IWidget", ty)
    }

    #[test]
    fn test_no_factories() {
        let mut registry = TypeRegistry::new();
        let iface = widget(&mut registry);
        assert!(synthesize_constructor(&mut registry, &iface).unwrap().is_none());
    }

    #[test]
    fn test_single_factory_is_untagged() {
        let mut registry = TypeRegistry::new();
        let mut iface = widget(&mut registry);
        iface.factories.push(factory("CreateWidget", "CreateWidget", &["size"], &mut registry));

        let ctor = synthesize_constructor(&mut registry, &iface).unwrap().unwrap();
        assert!(!ctor.is_tagged());
        assert_eq!(ctor.overload.arguments.len(), 1);
        assert_eq!(ctor.to_wrapped_overload(), ctor.overload);
    }

    #[test]
    fn test_tagged_constructor() {
        let mut registry = TypeRegistry::new();
        let mut iface = widget(&mut registry);
        iface.factories.push(factory("CreateWidget", "Default", &[], &mut registry));
        iface.factories.push(factory("CreateWidgetWith", "WithValue", &["value"], &mut registry));

        let ctor = synthesize_constructor(&mut registry, &iface).unwrap().unwrap();
        let tag_enum = ctor.tag_enum.as_ref().unwrap();
        assert_eq!(tag_enum.name, "WidgetFactoryTag");
        let options: Vec<&str> = tag_enum.options.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(options, vec!["Default", "WithValue"]);
        assert_eq!(registry.get(tag_enum.ty).namespace.dotted(), "Acme");

        assert_eq!(ctor.overload.arguments[0].name, "tag");
        assert_eq!(ctor.overload.arguments[0].ty.id, tag_enum.ty);
        assert_eq!(ctor.to_wrapped_overload(), iface.factories[0].overload);

        let dispatch: Vec<(&str, &str)> = ctor
            .dispatch
            .iter()
            .map(|d| (d.function.as_str(), d.tag.as_str()))
            .collect();
        assert_eq!(
            dispatch,
            vec![("CreateWidget", "Default"), ("CreateWidgetWith", "WithValue")]
        );
    }

    #[test]
    fn test_duplicate_tags_fail() {
        let mut registry = TypeRegistry::new();
        let mut iface = widget(&mut registry);
        iface.factories.push(factory("A", "Same", &[], &mut registry));
        iface.factories.push(factory("B", "Same", &[], &mut registry));

        let err = synthesize_constructor(&mut registry, &iface).unwrap_err();
        assert!(matches!(
            err,
            CompilerError::DuplicateFactoryTag { ref interface, ref tag }
                if interface == "IWidget" && tag == "Same"
        ));
    }
}
