//! Front-end for the annotated C++ header dialect.

pub mod grammar;

use crate::diagnostic::CompilerError;
use crate::model::File;

use super::{lower, FrontEndParser, ParseOptions};

pub struct CppParser;

impl FrontEndParser for CppParser {
    fn language(&self) -> &str {
        "cpp"
    }

    fn extensions(&self) -> &[&str] {
        &["h", "hpp", "idl"]
    }

    fn parse(&self, content: &str, options: &ParseOptions) -> Result<File, CompilerError> {
        lower(grammar::parse(content), options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::ErrorKind;
    use crate::docs::DocTag;
    use crate::model::{Accessor, Features, PropertyClassKind};
    use crate::specialize::identity;
    use crate::types::{Primitive, TypeLookup};

    fn parse(source: &str) -> Result<File, CompilerError> {
        CppParser.parse(source, &ParseOptions::new("test.h"))
    }

    #[test]
    fn test_end_to_end_interface() {
        let file = parse("interface IFoo : IBase { void DoThing(int x); };").unwrap();
        assert_eq!(file.interfaces.len(), 1);
        let iface = &file.interfaces[0];
        assert_eq!(iface.name, "IFoo");
        let base = iface.base.as_ref().unwrap();
        assert_eq!(file.registry.get(base.id).name, "IBase");

        let method = iface.method("DoThing").unwrap();
        let overload = &method.overloads[0];
        assert!(overload.return_type.is_none());
        assert_eq!(overload.arguments[0].name, "x");
        let ty = file.registry.get(overload.arguments[0].ty.id);
        assert_eq!(ty.name, "int");
        assert_eq!(ty.primitive, Some(Primitive::Int32));

        assert_eq!(iface.identity(&file.registry), Some(identity("IFoo")));
        assert!(!iface.explicit_identity);
    }

    #[test]
    fn test_explicit_identity_is_kept() {
        let source = r#"[uuid("8f2e3c6a-0b1d-4c52-9d7e-1a2b3c4d5e6f")] interface IEmpty {};"#;
        let file = parse(source).unwrap();
        let iface = &file.interfaces[0];
        assert!(iface.methods.is_empty());
        assert!(iface.explicit_identity);
        assert_eq!(
            iface.identity(&file.registry).unwrap().to_string(),
            "8f2e3c6a-0b1d-4c52-9d7e-1a2b3c4d5e6f"
        );
    }

    #[test]
    fn test_namespace_qualifies_identity() {
        let file = parse("namespace Acme::Media { interface IPlayer : IUnknown { void Play(); }; }").unwrap();
        assert_eq!(file.namespace.dotted(), "Acme.Media");
        let iface = &file.interfaces[0];
        assert_eq!(iface.identity(&file.registry), Some(identity("Acme.Media.IPlayer")));
    }

    #[test]
    fn test_members_without_base_is_semantic_error() {
        let err = parse("interface IFoo { void Run(); };").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
        assert_eq!(err.position(), Some((1, 1)));
    }

    #[test]
    fn test_conflicting_namespaces() {
        let source = "namespace A { interface IA; } namespace B { interface IB; }";
        let err = parse(source).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
    }

    #[test]
    fn test_struct_is_unsupported() {
        let err = parse("struct Point { int x; };").unwrap_err();
        assert!(matches!(
            err,
            CompilerError::UnsupportedConstruct { ref construct, ref name, .. }
                if construct == "struct" && name == "Point"
        ));
    }

    #[test]
    fn test_syntax_errors_fail_unless_tolerated() {
        let source = "interface IFoo : IBase { void Ok(); ??? ; };";
        let err = parse(source).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);

        let mut options = ParseOptions::new("test.h");
        options.continue_on_errors = true;
        let file = CppParser.parse(source, &options).unwrap();
        assert_eq!(file.syntax_errors, 1);
        assert!(file.interfaces[0].method("Ok").is_some());
    }

    #[test]
    fn test_doc_attributes_drive_metadata() {
        let source = r#"
            /// @coreType(IUnknown)
            namespace Acme {
            /// Player control.
            /// @propertyClass(control, category = "Media")
            interface IPlayer : IUnknown {
                /// Current volume.
                /// @param[out] value receives the level
                /// @property(Volume)
                HRESULT GetVolume(float* value);
                /// @event(Stopped, sink = IStopHandler)
                HRESULT AddStopped(IStopHandler* handler);
                /// @ignore(csharp)
                void Debug();
            };
            /// @factory(IPlayer)
            IPlayer* CreatePlayer();
            }
        "#;
        let file = parse(source).unwrap();
        assert_eq!(file.attributes.lookup("IUnknown"), TypeLookup::Core("Core"));

        let iface = &file.interfaces[0];
        let class = iface.property_class.as_ref().unwrap();
        assert_eq!(class.kind, PropertyClassKind::Control);
        assert_eq!(class.category.as_deref(), Some("Media"));
        assert_eq!(iface.documentation.brief_text(), "Player control.");

        let get = iface.method("GetVolume").unwrap();
        let property = get.property.as_ref().unwrap();
        assert_eq!(property.name, "Volume");
        assert_eq!(property.accessor, Accessor::Get);
        assert!(get.overloads[0].arguments[0].is_out);
        assert!(matches!(get.documentation.param("value"), Some(DocTag::Param { is_out: true, .. })));

        assert_eq!(iface.events.len(), 1);
        assert_eq!(iface.events[0].name, "Stopped");
        assert_eq!(iface.events[0].sink.as_deref(), Some("IStopHandler"));
        assert!(iface.method("Debug").unwrap().ignore.is_ignored_for("csharp"));

        assert_eq!(iface.factories.len(), 1);
        assert_eq!(iface.factories[0].tag, "CreatePlayer");
        assert!(file.features.contains(Features::EVENTS | Features::UI_CONTROLS));
    }

    #[test]
    fn test_attribute_error_position() {
        let source = "/// Brief.\n/// @property(Volume, sideways)\n/// ok\ninterface IFoo;";
        let err = parse(source).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Attribute);
        assert_eq!(err.position(), Some((2, 1)));
    }

    #[test]
    fn test_signature_error_reports_attribute_line() {
        let source = "/// Takes ownership.\n/// @polymorphic\n/// @stealRef(missing)\nvoid Take(int x);";
        let err = parse(source).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Attribute);
        assert_eq!(err.position(), Some((3, 1)));
    }

    #[test]
    fn test_reopened_namespace_is_one_unit() {
        let source = "namespace A { interface IA : IUnknown { void F(); }; }\nnamespace A { interface IB : IUnknown { void G(); }; }";
        let file = parse(source).unwrap();
        assert_eq!(file.namespace.dotted(), "A");
        assert_eq!(file.interfaces.len(), 2);
    }

    #[test]
    fn test_later_overload_bindings_are_kept() {
        let source = r#"
            interface IPlayer : IUnknown {
                HRESULT Seek(int position);
                /// @property(Position, set)
                /// @returnSelf
                HRESULT Seek(double seconds);
                HRESULT AddStopped(IHandler* handler);
                /// @event(Stopped)
                HRESULT AddStopped(IHandler* handler, int flags);
            };
        "#;
        let file = parse(source).unwrap();
        let iface = &file.interfaces[0];

        let seek = iface.method("Seek").unwrap();
        assert_eq!(seek.overloads.len(), 2);
        assert_eq!(seek.property.as_ref().unwrap().name, "Position");
        assert_eq!(seek.property.as_ref().unwrap().accessor, Accessor::Set);
        assert!(seek.returns_self);

        let added = iface.method("AddStopped").unwrap();
        assert_eq!(added.event.as_ref().unwrap().name, "Stopped");
        assert_eq!(iface.events.len(), 1);
        assert_eq!(iface.events[0].method, "AddStopped");
    }

    #[test]
    fn test_conflicting_overload_bindings() {
        let source = r#"
            interface IPlayer : IUnknown {
                /// @property(Volume)
                HRESULT GetVolume(float* value);
                /// @property(Level)
                HRESULT GetVolume(int* value);
            };
        "#;
        let err = parse(source).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
    }

    #[test]
    fn test_factory_for_unknown_interface() {
        let err = parse("/// @factory(IMissing)\nIMissing* Make();").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
    }

    #[test]
    fn test_generic_parameters_are_shared() {
        let source = "template <typename T> interface IList : IUnknown { T Get(int i); void Set(int i, T v); };";
        let file = parse(source).unwrap();
        let iface = &file.interfaces[0];
        assert!(iface.is_generic(&file.registry));
        let get = iface.method("Get").unwrap().overloads[0].return_type.as_ref().unwrap().id;
        let set = iface.method("Set").unwrap().overloads[0].arguments[1].ty.id;
        assert_eq!(get, set);
        assert!(file.registry.get(get).is_generic_parameter);
    }

    #[test]
    fn test_aliases_and_includes() {
        let source = r#"
            #include "b.h"
            #include <a.h>
            #include "b.h"
            typedef int32_t Millis;
            typedef struct Surface_* Surface;
        "#;
        let file = parse(source).unwrap();
        assert_eq!(file.includes, vec!["b.h", "a.h"]);
        assert!(!file.aliases["Millis"].opaque);
        assert!(file.aliases["Surface"].opaque);
        let millis = file.registry.lookup("Millis").unwrap();
        let int = file.registry.lookup("int32_t").unwrap();
        assert_eq!(file.resolve_alias(millis), int);
    }
}
