//! Recursive-descent grammar for the annotated C++ header dialect.

use crate::diagnostic::SourcePos;
use crate::syntax::{
    tokenize, ArgDecl, ArgDirection, Dialect, DocComment, EnumMember, InterfaceBody, Item,
    MethodDecl, SyntaxDiagnostic, SyntaxTree, TokenKind, TokenStream, TypeBody, TypeDecl, TypeExpr,
};

/// Macros and keywords that may sit between a return type and a name.
const CALLING_CONVENTIONS: &[&str] = &[
    "STDMETHODCALLTYPE",
    "__stdcall",
    "__cdecl",
    "__fastcall",
    "__vectorcall",
    "WINAPI",
    "APIENTRY",
    "CALLBACK",
    "STDAPICALLTYPE",
];

const SPECIFIERS: &[&str] = &["virtual", "static", "inline", "extern", "STDAPI_", "EXPORT"];

const BUILTIN_WORDS: &[&str] = &["unsigned", "signed", "long", "short", "int", "char"];

type Parse<T> = Result<T, SyntaxDiagnostic>;

/// Parses a header into a [`SyntaxTree`].
pub fn parse(source: &str) -> SyntaxTree {
    let (tokens, errors) = tokenize(source, Dialect::Cpp);
    let mut grammar = CppGrammar {
        stream: TokenStream::new(tokens, false),
        tree: SyntaxTree {
            items: Vec::new(),
            errors,
        },
        namespace: Vec::new(),
        namespace_doc: None,
        namespace_pos: SourcePos::default(),
        emitted_namespace: None,
    };
    grammar.items(false);
    grammar.tree
}

struct CppGrammar {
    stream: TokenStream,
    tree: SyntaxTree,
    namespace: Vec<String>,
    namespace_doc: Option<DocComment>,
    namespace_pos: SourcePos,
    emitted_namespace: Option<String>,
}

impl CppGrammar {
    /// Declarations until EOF, or until the `}` closing a block when `nested`.
    fn items(&mut self, nested: bool) {
        loop {
            if self.stream.at_eof() {
                if nested {
                    let error = self.stream.unexpected("'}'");
                    self.tree.errors.push(error);
                }
                return;
            }
            if nested && self.stream.eat_punct("}") {
                self.stream.eat_punct(";");
                return;
            }
            if let Err(error) = self.item() {
                self.tree.errors.push(error);
                self.stream.recover(false);
            }
        }
    }

    fn push_declaration(&mut self, item: Item) {
        if !self.namespace.is_empty() {
            let name = self.namespace.join("::");
            if self.emitted_namespace.as_deref() != Some(name.as_str()) {
                self.tree.items.push(Item::Unit {
                    name: name.clone(),
                    doc: self.namespace_doc.take(),
                    pos: self.namespace_pos,
                });
                self.emitted_namespace = Some(name);
            }
        }
        self.tree.items.push(item);
    }

    fn item(&mut self) -> Parse<()> {
        let doc = self.stream.doc();
        let pos = self.stream.peek().pos;

        if self.stream.peek().kind == TokenKind::Directive {
            let directive = self.stream.next();
            if let Some(path) = include_path(&directive.text) {
                self.tree.items.push(Item::Include { path, pos });
            }
            if doc.is_some() {
                self.tree.items.push(Item::Unit {
                    name: String::new(),
                    doc,
                    pos,
                });
            }
            return Ok(());
        }

        if self.stream.eat_punct(";") {
            return Ok(());
        }

        if self.stream.eat_keyword("namespace") {
            let name = self.qualified_name()?;
            self.stream.expect_punct("{")?;
            let components: Vec<String> = name.split("::").map(str::to_string).collect();
            let depth = components.len();
            self.namespace.extend(components);
            if doc.is_some() {
                self.namespace_doc = doc;
                self.namespace_pos = pos;
            } else if self.namespace.len() == depth {
                self.namespace_pos = pos;
            }
            self.items(true);
            let keep = self.namespace.len().saturating_sub(depth);
            self.namespace.truncate(keep);
            return Ok(());
        }

        if self.stream.is_keyword("extern") && self.stream.peek_at(1).kind == TokenKind::Str {
            self.stream.next();
            self.stream.next();
            if self.stream.eat_punct("{") {
                self.items(true);
                return Ok(());
            }
            return self.item();
        }

        if self.stream.is_keyword("using") {
            return self.using(doc, pos);
        }
        if self.stream.is_keyword("typedef") {
            return self.typedef(doc, pos);
        }
        if self.stream.is_keyword("enum") {
            let decl = self.enumeration(doc, pos)?;
            self.push_declaration(Item::Type(decl));
            return Ok(());
        }
        if self.stream.is_any_keyword(&["struct", "class", "union"]) {
            let decl = self.record(doc, pos)?;
            self.push_declaration(Item::Type(decl));
            return Ok(());
        }

        let mut generic_params = Vec::new();
        if self.stream.eat_keyword("template") {
            generic_params = self.template_parameters()?;
        }
        let mut uuid = None;
        while self.stream.is_punct("[") {
            uuid = self.attribute_block()?.or(uuid);
        }

        if self.stream.is_any_keyword(&["interface", "__interface"]) {
            let decl = self.interface(doc, pos, uuid, generic_params)?;
            self.push_declaration(Item::Type(decl));
            return Ok(());
        }
        if !generic_params.is_empty() || uuid.is_some() {
            if self.stream.is_any_keyword(&["struct", "class"]) {
                let decl = self.record(doc, pos)?;
                self.push_declaration(Item::Type(decl));
                return Ok(());
            }
            return Err(self.stream.unexpected("'interface'"));
        }

        let function = self.signature(doc, pos)?;
        self.push_declaration(Item::Function(function));
        Ok(())
    }

    fn using(&mut self, doc: Option<DocComment>, pos: SourcePos) -> Parse<()> {
        self.stream.expect_keyword("using")?;
        if self.stream.eat_keyword("namespace") {
            self.qualified_name()?;
            self.stream.expect_punct(";")?;
            return Ok(());
        }
        let name = self.stream.expect_ident()?;
        self.stream.expect_punct("=")?;
        let tagged = self.stream.is_any_keyword(&["struct", "class", "union"]);
        let ty = self.type_expr()?;
        self.stream.expect_punct(";")?;
        let decl = TypeDecl {
            name: name.text,
            generic_params: Vec::new(),
            uuid: None,
            doc,
            pos,
            body: alias_body(ty, tagged),
        };
        self.push_declaration(Item::Type(decl));
        Ok(())
    }

    fn typedef(&mut self, doc: Option<DocComment>, pos: SourcePos) -> Parse<()> {
        self.stream.expect_keyword("typedef")?;

        let body = if self.stream.is_any_keyword(&["struct", "union", "class"]) {
            let construct = self.stream.next().text;
            let tag = if self.stream.is_ident() {
                Some(self.stream.next().text)
            } else {
                None
            };
            if self.stream.is_punct("{") {
                self.stream.skip_balanced("{", "}");
                TypeBody::Other { construct }
            } else {
                let mut stars = 0;
                while self.stream.eat_punct("*") {
                    stars += 1;
                }
                match (stars, tag) {
                    (0, Some(tag)) => TypeBody::Alias(TypeExpr::named(tag)),
                    (0, None) => return Err(self.stream.unexpected("a struct name")),
                    (_, tag) => TypeBody::OpaquePointer(tag),
                }
            }
        } else if self.stream.is_keyword("enum") {
            self.stream.next();
            if self.stream.is_ident() && !self.stream.peek_at(1).is_punct(";") {
                self.stream.next();
            }
            if self.stream.eat_punct(":") {
                self.type_expr()?;
            }
            TypeBody::Enum(self.enum_members()?)
        } else {
            let ty = self.type_expr()?;
            if self.stream.eat_punct("(") {
                // `typedef void (CALLBACK *Callback)(int);`
                while self.stream.is_any_keyword(CALLING_CONVENTIONS) {
                    self.stream.next();
                }
                self.stream.expect_punct("*")?;
                let name = self.stream.expect_ident()?;
                self.stream.expect_punct(")")?;
                self.stream.skip_balanced("(", ")");
                self.stream.expect_punct(";")?;
                let decl = TypeDecl {
                    name: name.text,
                    generic_params: Vec::new(),
                    uuid: None,
                    doc,
                    pos,
                    body: TypeBody::Other {
                        construct: "function pointer".to_string(),
                    },
                };
                self.push_declaration(Item::Type(decl));
                return Ok(());
            }
            alias_body(ty, false)
        };

        let name = self.stream.expect_ident()?;
        let body = match body {
            TypeBody::Alias(mut ty) => {
                while self.stream.is_punct("[") {
                    self.stream.skip_balanced("[", "]");
                    ty.modifiers.push_str("[]");
                }
                if ty.name == name.text && ty.modifiers.is_empty() {
                    TypeBody::Forward
                } else {
                    TypeBody::Alias(ty)
                }
            }
            other => other,
        };
        self.stream.expect_punct(";")?;

        let decl = TypeDecl {
            name: name.text,
            generic_params: Vec::new(),
            uuid: None,
            doc,
            pos,
            body,
        };
        self.push_declaration(Item::Type(decl));
        Ok(())
    }

    fn enumeration(&mut self, doc: Option<DocComment>, pos: SourcePos) -> Parse<TypeDecl> {
        self.stream.expect_keyword("enum")?;
        if !self.stream.eat_keyword("class") {
            self.stream.eat_keyword("struct");
        }
        let name = self.stream.expect_ident()?;
        if self.stream.eat_punct(":") {
            self.type_expr()?;
        }
        let body = if self.stream.eat_punct(";") {
            TypeBody::Forward
        } else {
            let members = self.enum_members()?;
            self.stream.expect_punct(";")?;
            TypeBody::Enum(members)
        };
        Ok(TypeDecl {
            name: name.text,
            generic_params: Vec::new(),
            uuid: None,
            doc,
            pos,
            body,
        })
    }

    fn enum_members(&mut self) -> Parse<Vec<EnumMember>> {
        self.stream.expect_punct("{")?;
        let mut members = Vec::new();
        while !self.stream.eat_punct("}") {
            let doc = self.stream.doc();
            let name = self.stream.expect_ident()?;
            let value = if self.stream.eat_punct("=") {
                Some(self.expression(&[",", "}"]))
            } else {
                None
            };
            members.push(EnumMember {
                name: name.text,
                value,
                doc,
                pos: name.pos,
            });
            if !self.stream.eat_punct(",") && !self.stream.is_punct("}") {
                return Err(self.stream.unexpected("',' or '}'"));
            }
        }
        Ok(members)
    }

    fn record(&mut self, doc: Option<DocComment>, pos: SourcePos) -> Parse<TypeDecl> {
        let construct = self.stream.next().text;
        self.skip_declspec();
        let name = self.stream.expect_ident()?;
        let body = if self.stream.eat_punct(";") {
            TypeBody::Forward
        } else {
            while !self.stream.is_punct("{") && !self.stream.at_eof() {
                self.stream.next();
            }
            self.stream.skip_balanced("{", "}");
            self.stream.expect_punct(";")?;
            TypeBody::Other { construct }
        };
        Ok(TypeDecl {
            name: name.text,
            generic_params: Vec::new(),
            uuid: None,
            doc,
            pos,
            body,
        })
    }

    fn template_parameters(&mut self) -> Parse<Vec<String>> {
        self.stream.expect_punct("<")?;
        let mut params = Vec::new();
        loop {
            if !self.stream.eat_keyword("typename") {
                self.stream.expect_keyword("class")?;
            }
            params.push(self.stream.expect_ident()?.text);
            if self.stream.eat_punct("=") {
                self.type_expr()?;
            }
            if self.stream.eat_punct(">") {
                return Ok(params);
            }
            self.stream.expect_punct(",")?;
        }
    }

    /// `[object, uuid("…"), pointer_default(unique)]`; returns the uuid.
    fn attribute_block(&mut self) -> Parse<Option<String>> {
        self.stream.expect_punct("[")?;
        let mut uuid = None;
        while !self.stream.eat_punct("]") {
            let name = self.stream.expect_ident()?;
            if name.text == "uuid" {
                uuid = Some(self.uuid_arguments()?);
            } else if self.stream.is_punct("(") {
                self.stream.skip_balanced("(", ")");
            }
            if !self.stream.eat_punct(",") && !self.stream.is_punct("]") {
                return Err(self.stream.unexpected("',' or ']'"));
            }
        }
        Ok(uuid)
    }

    /// `("8f2e…")` or the unquoted MIDL form `(8f2e…)`.
    fn uuid_arguments(&mut self) -> Parse<String> {
        self.stream.expect_punct("(")?;
        if self.stream.peek().kind == TokenKind::Str {
            let literal = self.stream.next().text;
            self.stream.expect_punct(")")?;
            return Ok(literal);
        }
        let mut literal = String::new();
        while !self.stream.eat_punct(")") {
            if self.stream.at_eof() {
                return Err(self.stream.unexpected("')'"));
            }
            literal.push_str(&self.stream.next().text);
        }
        Ok(literal)
    }

    /// `__declspec(uuid("…"))`; other declspecs are skipped.
    fn declspec_uuid(&mut self) -> Parse<Option<String>> {
        let mut uuid = None;
        while self.stream.eat_keyword("__declspec") {
            self.stream.expect_punct("(")?;
            if self.stream.eat_keyword("uuid") {
                uuid = Some(self.uuid_arguments()?);
                self.stream.expect_punct(")")?;
            } else {
                while !self.stream.eat_punct(")") && !self.stream.at_eof() {
                    self.stream.skip_balanced("(", ")");
                    if !self.stream.is_punct(")") {
                        self.stream.next();
                    }
                }
            }
        }
        Ok(uuid)
    }

    fn skip_declspec(&mut self) {
        while self.stream.eat_keyword("__declspec") {
            self.stream.skip_balanced("(", ")");
        }
    }

    fn interface(
        &mut self,
        doc: Option<DocComment>,
        pos: SourcePos,
        uuid: Option<String>,
        generic_params: Vec<String>,
    ) -> Parse<TypeDecl> {
        self.stream.next();
        let uuid = self.declspec_uuid()?.or(uuid);
        let name = self.stream.expect_ident()?;

        if self.stream.eat_punct(";") {
            return Ok(TypeDecl {
                name: name.text,
                generic_params,
                uuid,
                doc,
                pos,
                body: TypeBody::Forward,
            });
        }

        let mut body = InterfaceBody::default();
        if self.stream.eat_punct(":") {
            self.stream.eat_keyword("public");
            self.stream.eat_keyword("virtual");
            body.base = Some(self.type_expr()?);
        }
        self.stream.expect_punct("{")?;

        while !self.stream.eat_punct("}") {
            if self.stream.at_eof() {
                return Err(self.stream.unexpected("'}'"));
            }
            match self.member() {
                Ok(Some(method)) => body.methods.push(method),
                Ok(None) => {}
                Err(error) => {
                    self.tree.errors.push(error);
                    self.stream.recover(false);
                }
            }
        }
        self.stream.eat_punct(";");

        Ok(TypeDecl {
            name: name.text,
            generic_params,
            uuid,
            doc,
            pos,
            body: TypeBody::Interface(body),
        })
    }

    fn member(&mut self) -> Parse<Option<MethodDecl>> {
        let doc = self.stream.doc();
        let pos = self.stream.peek().pos;

        if self.stream.is_any_keyword(&["public", "protected", "private"])
            && self.stream.peek_at(1).is_punct(":")
        {
            self.stream.next();
            self.stream.next();
            return Ok(None);
        }
        while self.stream.is_punct("[") {
            self.stream.skip_balanced("[", "]");
        }
        self.signature(doc, pos).map(Some)
    }

    /// `[virtual] Ret [CALLCONV] Name(args) [const] [= 0];`
    fn signature(&mut self, doc: Option<DocComment>, pos: SourcePos) -> Parse<MethodDecl> {
        while self.stream.is_any_keyword(SPECIFIERS) {
            self.stream.next();
        }
        self.skip_declspec();
        let return_type = self.type_expr()?;

        let mut calling_convention = None;
        let name = loop {
            let token = self.stream.expect_ident()?;
            if self.stream.is_punct("(") {
                break token;
            }
            if !CALLING_CONVENTIONS.contains(&token.text.as_str()) {
                return Err(SyntaxDiagnostic::new(
                    format!("expected '(' after '{}'", token.text),
                    token.pos,
                ));
            }
            calling_convention = Some(token.text);
        };

        let arguments = self.arguments()?;

        self.stream.eat_keyword("const");
        self.stream.eat_keyword("noexcept");
        self.stream.eat_keyword("override");
        if self.stream.eat_punct("=") {
            if self.stream.peek().kind != TokenKind::Number {
                return Err(self.stream.unexpected("'0'"));
            }
            self.stream.next();
        }
        self.stream.eat_keyword("PURE");
        if self.stream.is_punct("{") {
            self.stream.skip_balanced("{", "}");
            self.stream.eat_punct(";");
        } else {
            self.stream.expect_punct(";")?;
        }

        Ok(MethodDecl {
            name: name.text,
            return_type: Some(return_type).filter(|ty| !ty.is_void()),
            arguments,
            calling_convention,
            doc,
            pos,
        })
    }

    fn arguments(&mut self) -> Parse<Vec<ArgDecl>> {
        self.stream.expect_punct("(")?;
        let mut arguments = Vec::new();
        if self.stream.eat_punct(")") {
            return Ok(arguments);
        }
        if self.stream.is_keyword("void") && self.stream.peek_at(1).is_punct(")") {
            self.stream.next();
            self.stream.next();
            return Ok(arguments);
        }

        loop {
            let pos = self.stream.peek().pos;
            let mut direction = ArgDirection::In;
            while self.stream.is_punct("[") {
                direction = self.direction_block()?;
            }
            if self.stream.eat_keyword("_Out_") || self.stream.eat_keyword("OUT") {
                direction = ArgDirection::Out;
            } else if self.stream.eat_keyword("_Inout_") {
                direction = ArgDirection::InOut;
            } else if !self.stream.eat_keyword("_In_") {
                self.stream.eat_keyword("IN");
            }
            let is_const = self.stream.eat_keyword("const");
            let mut ty = self.type_expr()?;

            let name = if self.stream.is_ident() {
                self.stream.next().text
            } else {
                format!("arg{}", arguments.len())
            };
            while self.stream.is_punct("[") {
                self.stream.skip_balanced("[", "]");
                ty.modifiers.push_str("[]");
            }
            let default_value = if self.stream.eat_punct("=") {
                Some(self.expression(&[",", ")"]))
            } else {
                None
            };

            arguments.push(ArgDecl {
                name,
                ty,
                is_const,
                direction,
                default_value,
                pos,
            });

            if self.stream.eat_punct(")") {
                return Ok(arguments);
            }
            self.stream.expect_punct(",")?;
        }
    }

    /// `[in]`, `[out]`, `[in, out]`, `[out, retval]`, `[in, size_is(n)]`
    fn direction_block(&mut self) -> Parse<ArgDirection> {
        self.stream.expect_punct("[")?;
        let (mut is_in, mut is_out) = (false, false);
        while !self.stream.eat_punct("]") {
            let word = self.stream.expect_ident()?;
            match word.text.as_str() {
                "in" => is_in = true,
                "out" => is_out = true,
                _ => {}
            }
            if self.stream.is_punct("(") {
                self.stream.skip_balanced("(", ")");
            }
            if !self.stream.eat_punct(",") && !self.stream.is_punct("]") {
                return Err(self.stream.unexpected("',' or ']'"));
            }
        }
        Ok(match (is_in, is_out) {
            (true, true) => ArgDirection::InOut,
            (false, true) => ArgDirection::Out,
            _ => ArgDirection::In,
        })
    }

    fn type_expr(&mut self) -> Parse<TypeExpr> {
        self.stream.eat_keyword("const");
        if !self.stream.eat_keyword("struct") && !self.stream.eat_keyword("enum") {
            self.stream.eat_keyword("typename");
        }

        let name = if self.stream.is_any_keyword(&["unsigned", "signed", "long", "short"]) {
            let mut words = Vec::new();
            while self.stream.is_any_keyword(BUILTIN_WORDS) {
                words.push(self.stream.next().text);
            }
            words.join(" ")
        } else {
            self.qualified_name()?
        };

        let mut ty = TypeExpr::named(name);
        if self.stream.eat_punct("<") {
            loop {
                ty.args.push(self.type_expr()?);
                if self.stream.eat_punct(">") {
                    break;
                }
                self.stream.expect_punct(",")?;
            }
        }
        loop {
            if self.stream.eat_punct("*") {
                ty.modifiers.push('*');
            } else if self.stream.eat_punct("&") {
                ty.modifiers.push('&');
            } else if !self.stream.eat_keyword("const") {
                break;
            }
        }
        Ok(ty)
    }

    fn qualified_name(&mut self) -> Parse<String> {
        let mut name = String::new();
        if self.stream.eat_punct("::") {
            name.push_str("::");
        }
        name.push_str(&self.stream.expect_ident()?.text);
        while self.stream.is_punct("::") && self.stream.peek_at(1).kind == TokenKind::Ident {
            self.stream.next();
            name.push_str("::");
            name.push_str(&self.stream.next().text);
        }
        Ok(name.trim_start_matches("::").to_string())
    }

    /// Raw text of an expression up to one of `terminators` at depth zero.
    fn expression(&mut self, terminators: &[&str]) -> String {
        let mut text = String::new();
        let mut depth = 0usize;
        let mut previous_word = false;
        while !self.stream.at_eof() {
            if depth == 0 && terminators.iter().any(|t| self.stream.is_punct(t)) {
                break;
            }
            let token = self.stream.next();
            match token.text.as_str() {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => depth = depth.saturating_sub(1),
                _ => {}
            }
            let word = matches!(token.kind, TokenKind::Ident | TokenKind::Number);
            if word && previous_word {
                text.push(' ');
            }
            previous_word = word;
            match token.kind {
                TokenKind::Str => {
                    text.push('"');
                    text.push_str(&token.text);
                    text.push('"');
                }
                _ => text.push_str(&token.text),
            }
        }
        text
    }
}

fn include_path(directive: &str) -> Option<String> {
    let rest = directive.strip_prefix('#')?.trim_start().strip_prefix("include")?;
    let rest = rest.trim();
    let (open, close) = match rest.chars().next()? {
        '"' => ('"', '"'),
        '<' => ('<', '>'),
        _ => return None,
    };
    let inner = rest.strip_prefix(open)?;
    let end = inner.find(close)?;
    Some(inner[..end].to_string())
}

/// `typedef struct X* H;`, `using H = struct X*;` and `typedef void* H;`
/// are opaque handles; anything else is a plain alias.
fn alias_body(ty: TypeExpr, struct_tagged: bool) -> TypeBody {
    let pointer = ty.modifiers.starts_with('*') && ty.args.is_empty();
    if pointer && struct_tagged {
        TypeBody::OpaquePointer(Some(ty.name))
    } else if pointer && ty.name == "void" {
        TypeBody::OpaquePointer(None)
    } else {
        TypeBody::Alias(ty)
    }
}
