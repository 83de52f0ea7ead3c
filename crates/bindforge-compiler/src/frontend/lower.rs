//! Lowering from the concrete syntax tree to the unified model.
//!
//! Both dialects share this pass. It walks the items once, in source order,
//! so a type may be referenced before its declaration: the registry hands
//! out the canonical entry on first use and the declaration fills it in.

use tracing::{debug, warn};
use uuid::Uuid;

use crate::attribute::{AttributeError, DeclarationKind, PendingMetadata, SignatureMetadata};
use crate::diagnostic::{CompilerError, SourcePos};
use crate::docs::{parse_doc_comment, DocTag, Documentation};
use crate::model::{
    Accessor, Alias, Argument, EnumOption, Enumeration, Event, Factory, Features, File, Function,
    Interface, Method, Overload, PropertyInfo,
};
use crate::specialize::identity;
use crate::syntax::{
    ArgDirection, DocComment, EnumMember, InterfaceBody, Item, MethodDecl, SyntaxTree, TypeBody,
    TypeDecl, TypeExpr,
};
use crate::types::{interface_modifiers, Namespace, TypeId, TypeRef};

use super::ParseOptions;

/// Builds a [`File`] from a parsed tree.
///
/// Syntax errors on the tree are fatal unless `continue_on_errors` is set,
/// in which case they are counted on the file and logged.
pub fn lower(tree: SyntaxTree, options: &ParseOptions) -> Result<File, CompilerError> {
    let mut file = File::new(options.source_name.clone());

    if let Some(first) = tree.errors.first() {
        if !options.continue_on_errors {
            return Err(CompilerError::SyntaxError {
                message: first.message.clone(),
                file: options.source_name.clone(),
                line: first.pos.line,
                column: first.pos.column,
            });
        }
        for error in &tree.errors {
            warn!(
                file = %options.source_name,
                line = error.pos.line,
                column = error.pos.column,
                "syntax error skipped: {}",
                error.message
            );
        }
        file.syntax_errors = tree.errors.len();
    }

    let mut lowering = Lowering {
        file,
        unit_declared: false,
        factories: Vec::new(),
    };
    for item in tree.items {
        lowering.item(item)?;
    }
    lowering.attach_factories()?;

    let mut file = lowering.file;
    file.features = Features::scan(&file);
    debug!(
        file = %file.source_name,
        interfaces = file.interfaces.len(),
        functions = file.functions.len(),
        enumerations = file.enumerations.len(),
        "lowered file"
    );
    Ok(file)
}

struct Lowering {
    file: File,
    unit_declared: bool,
    /// Factories seen so far, with the position of their function.
    factories: Vec<(Factory, SourcePos)>,
}

impl Lowering {
    fn item(&mut self, item: Item) -> Result<(), CompilerError> {
        match item {
            Item::Unit { name, doc, pos } => self.unit(name, doc, pos),
            Item::Include { path, .. } => {
                self.file.add_include(path);
                Ok(())
            }
            Item::Type(decl) => self.type_decl(decl),
            Item::Function(decl) => self.function(decl),
        }
    }

    fn unit(&mut self, name: String, doc: Option<DocComment>, pos: SourcePos) -> Result<(), CompilerError> {
        let (documentation, pending) = self.metadata(doc.as_ref(), DeclarationKind::Unit)?;
        let unit = pending.into_unit();
        for core in unit.core_types {
            self.file.attributes.mark_core(core);
        }
        for value in unit.value_types {
            self.file.attributes.mark_value_type(value);
        }
        if self.file.documentation.is_empty() {
            self.file.documentation = documentation;
        }

        if name.is_empty() {
            return Ok(());
        }
        let namespace = Namespace::parse(&name);
        if self.unit_declared {
            let message = if namespace == self.file.namespace {
                format!("unit '{}' is declared more than once", namespace)
            } else {
                format!(
                    "unit '{}' conflicts with the earlier declaration '{}'",
                    namespace, self.file.namespace
                )
            };
            return Err(self.semantic(message, pos));
        }
        self.file.namespace = namespace;
        self.unit_declared = true;
        Ok(())
    }

    fn type_decl(&mut self, decl: TypeDecl) -> Result<(), CompilerError> {
        let (documentation, pending) = self.metadata(decl.doc.as_ref(), DeclarationKind::Type)?;
        let metadata = pending.into_type();
        if metadata.core_type {
            self.file.attributes.mark_core(decl.name.clone());
        }
        if metadata.value_type {
            self.file.attributes.mark_value_type(decl.name.clone());
        }
        let namespace = self.file.namespace.clone();

        match decl.body {
            TypeBody::Alias(target) => {
                let target = self.type_ref(&target);
                self.file.registry.bind(namespace, &decl.name, "");
                self.file.aliases.insert(
                    decl.name.clone(),
                    Alias {
                        name: decl.name,
                        target,
                        opaque: false,
                        documentation,
                    },
                );
            }
            TypeBody::OpaquePointer(target) => {
                let pointee = self
                    .file
                    .registry
                    .resolve(target.as_deref().unwrap_or("void"));
                self.file.registry.bind(namespace, &decl.name, "");
                self.file.aliases.insert(
                    decl.name.clone(),
                    Alias {
                        name: decl.name,
                        target: TypeRef::with_modifiers(pointee, "*"),
                        opaque: true,
                        documentation,
                    },
                );
            }
            TypeBody::Enum(members) => {
                let ty = self.file.registry.bind(namespace, &decl.name, "");
                let options = members
                    .into_iter()
                    .map(|member| self.enum_option(member))
                    .collect::<Result<Vec<_>, _>>()?;
                self.file.enumerations.push(Enumeration {
                    name: decl.name,
                    ty,
                    options,
                    ignore: metadata.ignore,
                    documentation,
                });
            }
            TypeBody::Interface(body) => {
                let mut interface = self.interface(
                    &decl.name,
                    &decl.generic_params,
                    decl.uuid.as_deref(),
                    body,
                    decl.pos,
                )?;
                interface.property_class = metadata.property_class;
                interface.ignore = metadata.ignore;
                interface.documentation = documentation;
                self.file.interfaces.push(interface);
            }
            TypeBody::Forward => {
                self.file.registry.bind(namespace, &decl.name, "");
            }
            TypeBody::Other { construct } => {
                return Err(CompilerError::UnsupportedConstruct {
                    construct,
                    name: decl.name,
                    file: self.file.source_name.clone(),
                    line: decl.pos.line,
                    column: decl.pos.column,
                });
            }
        }
        Ok(())
    }

    fn enum_option(&self, member: EnumMember) -> Result<EnumOption, CompilerError> {
        let mut option = EnumOption::new(member.name);
        option.value = member.value;
        if let Some(doc) = &member.doc {
            let parsed = parse_doc_comment(&doc.text)
                .map_err(|(offset, e)| self.attribute_error(doc, offset, e))?;
            if let Some(attribute) = parsed.attributes.first() {
                let error = AttributeError::NotApplicable {
                    attribute: attribute.name.clone(),
                    declaration: "an enumeration option".to_string(),
                };
                return Err(self.attribute_error(doc, attribute.line, error));
            }
            option.documentation = parsed.documentation;
        }
        Ok(option)
    }

    fn interface(
        &mut self,
        name: &str,
        generic_params: &[String],
        uuid: Option<&str>,
        body: InterfaceBody,
        pos: SourcePos,
    ) -> Result<Interface, CompilerError> {
        let namespace = self.file.namespace.clone();
        let params: Vec<TypeId> = generic_params
            .iter()
            .map(|param| self.file.registry.declare_generic_parameter(param))
            .collect();
        let ty = self.file.registry.bind(namespace, name, "");
        if !params.is_empty() {
            self.file.registry.set_generic_parameters(ty, params);
        }

        let mut interface = Interface::new(name, ty);
        interface.pos = pos;
        match uuid {
            Some(literal) => {
                let parsed = Uuid::parse_str(literal).map_err(|e| {
                    self.semantic(format!("invalid identity literal '{literal}': {e}"), pos)
                })?;
                self.file.registry.set_identity(ty, parsed);
                interface.explicit_identity = true;
            }
            None => {
                let computed = identity(&self.file.registry.identity_name(ty, None));
                self.file.registry.set_identity(ty, computed);
            }
        }

        if body.base.is_none() && (!body.methods.is_empty() || !body.properties.is_empty()) {
            return Err(self.semantic(
                format!("interface '{name}' declares members but has no base interface"),
                pos,
            ));
        }
        interface.base = body.base.as_ref().map(|base| self.type_ref(base));

        for decl in body.methods {
            self.method(&mut interface, decl)?;
        }

        for property in body.properties {
            let accessors = [
                (property.read, Accessor::Get),
                (property.write, Accessor::Set),
            ];
            for (accessor_name, accessor) in accessors {
                let Some(accessor_name) = accessor_name else {
                    continue;
                };
                let Some(method) = interface.method_mut(&accessor_name) else {
                    return Err(self.semantic(
                        format!(
                            "property '{}' refers to unknown method '{}'",
                            property.name, accessor_name
                        ),
                        property.pos,
                    ));
                };
                method.property = Some(PropertyInfo {
                    name: property.name.clone(),
                    accessor,
                    is_default: property.is_default,
                });
            }
        }

        Ok(interface)
    }

    fn method(&mut self, interface: &mut Interface, decl: MethodDecl) -> Result<(), CompilerError> {
        let (documentation, pending) = self.metadata(decl.doc.as_ref(), DeclarationKind::Method)?;
        let metadata = pending.into_method();
        let overload = self.overload(&decl, &documentation, &metadata.signature)?;

        let property = metadata.property_info(&decl.name);
        let event = metadata.event_info(&decl.name);

        // Later overloads may add bindings but never contradict earlier ones.
        if let Some(existing) = interface.method_mut(&decl.name) {
            let conflict = |binding: &str| {
                self.semantic(
                    format!("overloads of '{}' declare different {} bindings", decl.name, binding),
                    decl.pos,
                )
            };
            if let Some(later) = property {
                if existing.property.as_ref().is_some_and(|current| *current != later) {
                    return Err(conflict("property"));
                }
                existing.property.get_or_insert(later);
            }
            let mut added_event = None;
            if let Some(later) = event {
                match &existing.event {
                    Some(current) if *current != later => return Err(conflict("event")),
                    Some(_) => {}
                    None => {
                        added_event = Some(Event {
                            name: later.name.clone(),
                            method: existing.name.clone(),
                            sink: later.sink.clone(),
                        });
                        existing.event = Some(later);
                    }
                }
            }
            existing.overloads.push(overload);
            existing.ignore.merge(&metadata.ignore);
            existing.returns_self |= metadata.return_self;
            if let Some(event) = added_event {
                interface.events.push(event);
            }
            return Ok(());
        }

        let mut method = Method::new(decl.name.clone());
        method.overloads.push(overload);
        method.property = property;
        method.event = event;
        method.ignore = metadata.ignore.clone();
        method.returns_self = metadata.return_self;
        method.documentation = documentation;
        if let Some(event) = &method.event {
            interface.events.push(Event {
                name: event.name.clone(),
                method: method.name.clone(),
                sink: event.sink.clone(),
            });
        }
        interface.methods.push(method);
        Ok(())
    }

    fn function(&mut self, decl: MethodDecl) -> Result<(), CompilerError> {
        let (documentation, pending) = self.metadata(decl.doc.as_ref(), DeclarationKind::Function)?;
        let metadata = pending.into_function();
        let overload = self.overload(&decl, &documentation, &metadata.signature)?;

        if let Some(factory) = metadata.factory {
            self.factories.push((
                Factory {
                    interface: factory.interface,
                    tag: factory.tag.unwrap_or_else(|| decl.name.clone()),
                    function: decl.name.clone(),
                    overload: overload.clone(),
                    documentation: documentation.clone(),
                },
                decl.pos,
            ));
        }

        self.file.functions.push(Function {
            name: decl.name,
            overload,
            ignore: metadata.ignore,
            documentation,
            pos: decl.pos,
        });
        Ok(())
    }

    fn overload(
        &mut self,
        decl: &MethodDecl,
        documentation: &Documentation,
        signature: &SignatureMetadata,
    ) -> Result<Overload, CompilerError> {
        let mut overload = Overload {
            return_type: decl.return_type.as_ref().map(|ty| self.type_ref(ty)),
            calling_convention: decl.calling_convention.clone(),
            arguments: Vec::new(),
            polymorphic_return: false,
        };
        for arg in &decl.arguments {
            let mut argument = Argument::new(arg.name.clone(), self.type_ref(&arg.ty));
            argument.is_const = arg.is_const;
            argument.is_out = arg.direction == ArgDirection::Out;
            argument.is_out_pointer = arg.direction == ArgDirection::InOut;
            argument.default_value = arg.default_value.clone();
            overload.arguments.push(argument);
        }

        for tag in &documentation.tags {
            if let DocTag::Param { name, is_out: true, .. } = tag {
                if let Some(argument) = overload.argument_mut(name) {
                    argument.is_out = true;
                }
            }
        }

        if let Err((offset, error)) = signature.apply(&mut overload) {
            let doc = decl.doc.clone().unwrap_or(DocComment {
                text: String::new(),
                pos: decl.pos,
            });
            return Err(self.attribute_error(&doc, offset, error));
        }
        Ok(overload)
    }

    /// Canonical type for a written type expression.
    fn type_ref(&mut self, expr: &TypeExpr) -> TypeRef {
        let base = self.file.registry.resolve(&expr.name);
        let args: Vec<TypeId> = expr
            .args
            .iter()
            .map(|arg| {
                let arg = self.type_ref(arg);
                self.file.registry.with_modifiers(arg.id, &arg.modifiers)
            })
            .collect();
        let id = self.file.registry.instantiate(base, args);
        if expr.modifiers.is_empty() {
            return TypeRef::new(id);
        }
        let modifiers = interface_modifiers(&self.file.registry.get(id).name, &expr.modifiers);
        TypeRef::with_modifiers(id, modifiers)
    }

    fn attach_factories(&mut self) -> Result<(), CompilerError> {
        for (factory, pos) in std::mem::take(&mut self.factories) {
            let bare = factory
                .interface
                .rsplit(|c| c == ':' || c == '.')
                .next()
                .unwrap_or(&factory.interface)
                .to_string();
            let index = self.file.interfaces.iter().position(|i| i.name == bare);
            let Some(index) = index else {
                return Err(self.semantic(
                    format!(
                        "factory '{}' refers to unknown interface '{}'",
                        factory.function, factory.interface
                    ),
                    pos,
                ));
            };
            self.file.interfaces[index].factories.push(factory);
        }
        Ok(())
    }

    fn metadata(
        &self,
        doc: Option<&DocComment>,
        kind: DeclarationKind,
    ) -> Result<(Documentation, PendingMetadata), CompilerError> {
        let Some(doc) = doc else {
            return Ok((Documentation::default(), PendingMetadata::new(kind)));
        };
        let parsed = parse_doc_comment(&doc.text)
            .map_err(|(offset, e)| self.attribute_error(doc, offset, e))?;
        let pending = PendingMetadata::collect(kind, &parsed.attributes)
            .map_err(|(offset, e)| self.attribute_error(doc, offset, e))?;
        Ok((parsed.documentation, pending))
    }

    fn attribute_error(&self, doc: &DocComment, offset: usize, source: AttributeError) -> CompilerError {
        CompilerError::Attribute {
            source,
            file: self.file.source_name.clone(),
            line: doc.pos.line + offset,
            column: doc.pos.column,
        }
    }

    fn semantic(&self, message: String, pos: SourcePos) -> CompilerError {
        CompilerError::SemanticError {
            message,
            file: self.file.source_name.clone(),
            line: pos.line,
            column: pos.column,
        }
    }
}
