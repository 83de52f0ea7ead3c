//! Serializable binding views handed to templates.
//!
//! Views are fully spelled for one generator: templates never see a
//! [`TypeId`](crate::types::TypeId), only target-language text plus the flags
//! needed to decorate it. Declarations hidden from the generator are dropped
//! here, so templates can iterate without filtering.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::docs::{DocTag, Documentation};
use crate::model::{
    Accessor, Constructor, Enumeration, Features, File, Function, Interface, Method, Overload,
    PropertyClassKind,
};
use crate::specialize::Expansion;
use crate::types::{Primitive, TypeRef, CORE_MODULE};

use super::{source_stem, GenerationMode, Generator, TypeSpeller};

#[derive(Debug, Clone, Serialize)]
pub struct FileView {
    pub source_name: String,
    /// Source file name without directory or extension.
    pub stem: String,
    pub language: String,
    pub mode: GenerationMode,
    /// Namespace joined with the generator's separator; empty when undeclared.
    pub namespace: String,
    pub namespace_components: Vec<String>,
    pub includes: Vec<String>,
    pub core_module: &'static str,
    pub core_types: Vec<String>,
    pub features: FeaturesView,
    pub documentation: DocView,
    pub aliases: Vec<AliasView>,
    pub enumerations: Vec<EnumView>,
    pub interfaces: Vec<InterfaceView>,
    pub specializations: Vec<InterfaceView>,
    pub functions: Vec<FunctionView>,
    pub constructors: Vec<ConstructorView>,
    pub syntax_errors: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeaturesView {
    pub events: bool,
    pub ui_controls: bool,
    pub arrays: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterfaceView {
    /// Identifier-safe name; specializations get a flattened one.
    pub name: String,
    pub type_name: String,
    pub identity: Option<String>,
    pub explicit_identity: bool,
    pub base: Option<String>,
    pub is_generic: bool,
    pub generic_parameters: Vec<String>,
    pub methods: Vec<MethodView>,
    pub properties: Vec<PropertyView>,
    pub events: Vec<EventView>,
    pub property_class: Option<PropertyClassView>,
    pub documentation: DocView,
}

#[derive(Debug, Clone, Serialize)]
pub struct MethodView {
    pub name: String,
    pub overloads: Vec<OverloadView>,
    pub property: Option<PropertyBindingView>,
    pub event: Option<EventView>,
    pub returns_self: bool,
    pub documentation: DocView,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverloadView {
    /// Spelled return type; `void` when the overload returns nothing.
    pub return_type: String,
    pub is_void: bool,
    pub calling_convention: Option<String>,
    pub arguments: Vec<ArgumentView>,
    /// The formatted parameter list.
    pub parameters: String,
    pub polymorphic_return: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArgumentView {
    pub name: String,
    pub type_name: String,
    pub declaration: String,
    pub is_const: bool,
    pub is_out: bool,
    pub is_out_pointer: bool,
    pub is_array: bool,
    pub array_length: Option<String>,
    pub default_value: Option<String>,
    pub polymorphic: bool,
    pub steal_reference: bool,
}

/// Accessor binding of a single method.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyBindingView {
    pub name: String,
    pub accessor: &'static str,
    pub is_default: bool,
}

/// A property assembled from its accessor methods.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyView {
    pub name: String,
    pub type_name: Option<String>,
    pub getter: Option<String>,
    pub setter: Option<String>,
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventView {
    pub name: String,
    pub method: String,
    pub sink: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyClassView {
    pub kind: PropertyClassKind,
    pub category: Option<String>,
    pub hidden: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnumView {
    pub name: String,
    pub options: Vec<EnumOptionView>,
    pub documentation: DocView,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnumOptionView {
    pub name: String,
    pub value: Option<String>,
    pub documentation: DocView,
}

#[derive(Debug, Clone, Serialize)]
pub struct AliasView {
    pub name: String,
    pub target: String,
    pub opaque: bool,
    pub documentation: DocView,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionView {
    pub name: String,
    pub overload: OverloadView,
    /// Interface this function is a factory of.
    pub factory_for: Option<String>,
    pub documentation: DocView,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConstructorView {
    pub interface: String,
    pub type_name: String,
    pub tag_enum: Option<EnumView>,
    pub overload: OverloadView,
    /// The signature without the tag argument.
    pub wrapped: OverloadView,
    pub dispatch: Vec<DispatchView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchView {
    pub function: String,
    pub tag: String,
    /// One entry per argument of the factory; `name` is absent when the
    /// constructor has no argument of that name to forward.
    pub call_arguments: Vec<CallArgumentView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CallArgumentView {
    pub name: Option<String>,
    pub is_out: bool,
    pub is_out_pointer: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DocView {
    pub brief: String,
    pub description: String,
    pub params: Vec<ParamDocView>,
    pub returns: Vec<NamedDocView>,
    pub throws: Vec<NamedDocView>,
    pub unknown: Vec<String>,
    pub is_private: bool,
    pub is_empty: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParamDocView {
    pub name: String,
    pub is_out: bool,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NamedDocView {
    pub name: String,
    pub text: String,
}

/// Builds the view of `file` for `generator`.
pub fn build(
    file: &File,
    expansion: &Expansion,
    generator: &dyn Generator,
    mode: GenerationMode,
) -> FileView {
    let builder = ViewBuilder {
        file,
        generator,
        speller: TypeSpeller::new(&file.registry, &file.attributes, generator),
    };
    builder.file(expansion, mode)
}

struct ViewBuilder<'a> {
    file: &'a File,
    generator: &'a dyn Generator,
    speller: TypeSpeller<'a>,
}

impl ViewBuilder<'_> {
    fn language(&self) -> &str {
        self.generator.language()
    }

    fn file(&self, expansion: &Expansion, mode: GenerationMode) -> FileView {
        let file = self.file;
        let visible: Vec<&Interface> = file
            .interfaces
            .iter()
            .filter(|i| self.is_visible(i))
            .collect();

        let factories: BTreeMap<&str, &str> = visible
            .iter()
            .flat_map(|i| i.factories.iter().map(|f| (f.function.as_str(), i.name.as_str())))
            .collect();

        FileView {
            source_name: file.source_name.clone(),
            stem: source_stem(file).to_string(),
            language: self.language().to_string(),
            mode,
            namespace: file.namespace.joined(self.generator.namespace_separator()),
            namespace_components: file.namespace.components().to_vec(),
            includes: file.includes.clone(),
            core_module: CORE_MODULE,
            core_types: file.attributes.core_types().map(str::to_string).collect(),
            features: FeaturesView {
                events: file.features.contains(Features::EVENTS),
                ui_controls: file.features.contains(Features::UI_CONTROLS),
                arrays: file.features.contains(Features::ARRAYS),
            },
            documentation: doc_view(&file.documentation),
            aliases: file
                .aliases
                .values()
                .map(|alias| AliasView {
                    name: self.generator.escape_identifier(&alias.name),
                    target: self.speller.spell_ref(&alias.target),
                    opaque: alias.opaque,
                    documentation: doc_view(&alias.documentation),
                })
                .collect(),
            enumerations: file
                .enumerations
                .iter()
                .filter(|e| !e.ignore.is_ignored_for(self.language()))
                .map(|e| self.enumeration(e))
                .collect(),
            interfaces: visible.iter().map(|i| self.interface(i, None)).collect(),
            specializations: expansion
                .specializations
                .iter()
                .filter(|i| self.is_visible(i))
                .map(|i| self.interface(i, Some(self.flat_name(i))))
                .collect(),
            functions: file
                .functions
                .iter()
                .filter(|f| !f.ignore.is_ignored_for(self.language()))
                .map(|f| self.function(f, factories.get(f.name.as_str()).copied()))
                .collect(),
            constructors: expansion
                .constructors
                .iter()
                .filter(|c| visible.iter().any(|i| i.name == c.interface))
                .filter_map(|c| self.constructor(c))
                .collect(),
            syntax_errors: file.syntax_errors,
        }
    }

    fn is_visible(&self, interface: &Interface) -> bool {
        !interface.is_hidden() && !interface.ignore.is_ignored_for(self.language())
    }

    /// `IList<int>` -> `IList_int`
    fn flat_name(&self, interface: &Interface) -> String {
        let display = self.file.registry.display(interface.ty);
        let mut name = String::with_capacity(display.len());
        for c in display.chars() {
            if c.is_alphanumeric() || c == '_' {
                name.push(c);
            } else if !name.ends_with('_') {
                name.push('_');
            }
        }
        name.trim_end_matches('_').to_string()
    }

    fn interface(&self, interface: &Interface, flat_name: Option<String>) -> InterfaceView {
        let registry = &self.file.registry;
        let ty = registry.get(interface.ty);
        let is_generic = interface.is_generic(registry);
        let generic_parameters = if is_generic {
            ty.generic_args
                .iter()
                .filter(|arg| registry.get(**arg).is_generic_parameter)
                .map(|arg| registry.get(*arg).name.clone())
                .collect()
        } else {
            Vec::new()
        };

        let methods: Vec<MethodView> = interface
            .methods
            .iter()
            .filter(|m| !m.ignore.is_ignored_for(self.language()))
            .map(|m| self.method(m))
            .collect();

        InterfaceView {
            name: flat_name.unwrap_or_else(|| self.generator.escape_identifier(&interface.name)),
            type_name: self.speller.spell(interface.ty),
            identity: interface.identity(registry).map(|id| id.to_string()),
            explicit_identity: interface.explicit_identity,
            base: interface.base.as_ref().map(|base| self.speller.spell(base.id)),
            is_generic,
            generic_parameters,
            properties: self.properties(interface),
            events: interface
                .events
                .iter()
                .filter(|event| {
                    interface
                        .method(&event.method)
                        .is_some_and(|m| !m.ignore.is_ignored_for(self.language()))
                })
                .map(|event| EventView {
                    name: event.name.clone(),
                    method: self.generator.escape_identifier(&event.method),
                    sink: event.sink.clone(),
                })
                .collect(),
            methods,
            property_class: interface.property_class.as_ref().map(|class| PropertyClassView {
                kind: class.kind,
                category: class.category.clone(),
                hidden: class.hidden,
            }),
            documentation: doc_view(&interface.documentation),
        }
    }

    fn method(&self, method: &Method) -> MethodView {
        MethodView {
            name: self.generator.escape_identifier(&method.name),
            overloads: method.overloads.iter().map(|o| self.overload(o)).collect(),
            property: method.property.as_ref().map(|p| PropertyBindingView {
                name: p.name.clone(),
                accessor: accessor_name(p.accessor),
                is_default: p.is_default,
            }),
            event: method.event.as_ref().map(|e| EventView {
                name: e.name.clone(),
                method: self.generator.escape_identifier(&method.name),
                sink: e.sink.clone(),
            }),
            returns_self: method.returns_self,
            documentation: doc_view(&method.documentation),
        }
    }

    /// Groups accessor methods by property name, in order of first accessor.
    fn properties(&self, interface: &Interface) -> Vec<PropertyView> {
        let mut properties: Vec<PropertyView> = Vec::new();
        for method in &interface.methods {
            if method.ignore.is_ignored_for(self.language()) {
                continue;
            }
            let (Some(info), Some(overload)) = (&method.property, method.overloads.first()) else {
                continue;
            };
            let index = match properties.iter().position(|p| p.name == info.name) {
                Some(index) => index,
                None => {
                    properties.push(PropertyView {
                        name: info.name.clone(),
                        type_name: None,
                        getter: None,
                        setter: None,
                        is_default: false,
                    });
                    properties.len() - 1
                }
            };
            let property = &mut properties[index];
            property.is_default |= info.is_default;
            let name = self.generator.escape_identifier(&method.name);
            let value_type = match info.accessor {
                Accessor::Get => {
                    property.getter = Some(name);
                    self.getter_value_type(overload)
                }
                Accessor::Set => {
                    property.setter = Some(name);
                    overload.arguments.last().map(|arg| arg.ty.clone())
                }
            };
            if property.type_name.is_none() {
                property.type_name = value_type.map(|ty| self.speller.spell_ref(&ty));
            }
        }
        properties
    }

    /// `T GetX()` returns the value; `HRESULT GetX(T* value)` reports it
    /// through its last argument, one indirection removed.
    fn getter_value_type(&self, overload: &Overload) -> Option<TypeRef> {
        let registry = &self.file.registry;
        match &overload.return_type {
            Some(ret) if registry.get(ret.id).primitive != Some(Primitive::ResultCode) => {
                return Some(ret.clone());
            }
            _ => {}
        }
        let arg = overload.arguments.last()?;
        let modifiers = arg.ty.effective_modifiers(registry);
        let stripped = modifiers.strip_suffix('*').unwrap_or(modifiers);
        Some(TypeRef::with_modifiers(arg.ty.id, stripped))
    }

    fn overload(&self, overload: &Overload) -> OverloadView {
        let arguments: Vec<ArgumentView> = overload
            .arguments
            .iter()
            .map(|arg| {
                let type_name = self.speller.spell_ref(&arg.ty);
                let name = self.generator.escape_identifier(&arg.name);
                let declaration = self.generator.format_argument(arg, &type_name);
                ArgumentView {
                    name,
                    declaration,
                    type_name,
                    is_const: arg.is_const,
                    is_out: arg.is_out,
                    is_out_pointer: arg.is_out_pointer,
                    is_array: arg.ty.is_array(),
                    array_length: arg.array_length.clone(),
                    default_value: arg.default_value.clone(),
                    polymorphic: arg.polymorphic,
                    steal_reference: arg.steal_reference,
                }
            })
            .collect();
        let parameters = arguments
            .iter()
            .map(|arg| arg.declaration.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        OverloadView {
            return_type: match &overload.return_type {
                Some(ret) => self.speller.spell_ref(ret),
                None => "void".to_string(),
            },
            is_void: overload.return_type.is_none(),
            calling_convention: overload.calling_convention.clone(),
            arguments,
            parameters,
            polymorphic_return: overload.polymorphic_return,
        }
    }

    fn enumeration(&self, enumeration: &Enumeration) -> EnumView {
        EnumView {
            name: self.generator.escape_identifier(&enumeration.name),
            options: enumeration
                .options
                .iter()
                .map(|option| EnumOptionView {
                    name: self.generator.escape_identifier(&option.name),
                    value: option.value.clone(),
                    documentation: doc_view(&option.documentation),
                })
                .collect(),
            documentation: doc_view(&enumeration.documentation),
        }
    }

    fn function(&self, function: &Function, factory_for: Option<&str>) -> FunctionView {
        FunctionView {
            name: self.generator.escape_identifier(&function.name),
            overload: self.overload(&function.overload),
            factory_for: factory_for.map(str::to_string),
            documentation: doc_view(&function.documentation),
        }
    }

    fn constructor(&self, constructor: &Constructor) -> Option<ConstructorView> {
        let interface = self.file.interface(&constructor.interface)?;
        let forwarded = constructor.to_wrapped_overload();
        let dispatch = constructor
            .dispatch
            .iter()
            .map(|entry| {
                let call_arguments = interface
                    .factories
                    .iter()
                    .find(|f| f.function == entry.function)
                    .map(|factory| {
                        factory
                            .overload
                            .arguments
                            .iter()
                            .map(|arg| CallArgumentView {
                                name: forwarded
                                    .argument(&arg.name)
                                    .map(|a| self.generator.escape_identifier(&a.name)),
                                is_out: arg.is_out,
                                is_out_pointer: arg.is_out_pointer,
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                DispatchView {
                    function: self.generator.escape_identifier(&entry.function),
                    tag: self.generator.escape_identifier(&entry.tag),
                    call_arguments,
                }
            })
            .collect();

        Some(ConstructorView {
            interface: self.generator.escape_identifier(&constructor.interface),
            type_name: self.speller.spell(interface.ty),
            tag_enum: constructor.tag_enum.as_ref().map(|e| self.enumeration(e)),
            overload: self.overload(&constructor.overload),
            wrapped: self.overload(&forwarded),
            dispatch,
        })
    }
}

fn accessor_name(accessor: Accessor) -> &'static str {
    match accessor {
        Accessor::Get => "get",
        Accessor::Set => "set",
    }
}

fn doc_view(documentation: &Documentation) -> DocView {
    let mut view = DocView {
        brief: documentation.brief_text(),
        description: documentation.description_text(),
        is_private: documentation.is_private(),
        is_empty: documentation.is_empty(),
        ..DocView::default()
    };
    for tag in &documentation.tags {
        match tag {
            DocTag::Param { name, is_out, text } => view.params.push(ParamDocView {
                name: name.clone(),
                is_out: *is_out,
                text: text.clone(),
            }),
            DocTag::RetVal { name, text } => view.returns.push(NamedDocView {
                name: name.clone(),
                text: text.clone(),
            }),
            DocTag::Throws { name, text } => view.throws.push(NamedDocView {
                name: name.clone(),
                text: text.clone(),
            }),
            DocTag::Private => {}
            DocTag::Unknown { raw } => view.unknown.push(raw.clone()),
        }
    }
    view
}
