//! Recursive-descent grammar for the Delphi unit dialect.
//!
//! Only the `interface` section of a unit is read; parsing stops at
//! `implementation`.

use crate::diagnostic::SourcePos;
use crate::syntax::{
    tokenize, ArgDecl, ArgDirection, Dialect, DocComment, EnumMember, InterfaceBody, Item,
    MethodDecl, PropertyDecl, SyntaxDiagnostic, SyntaxTree, TokenKind, TokenStream, TypeBody,
    TypeDecl, TypeExpr,
};

/// Keywords that end a declaration section.
const SECTION_KEYWORDS: &[&str] = &[
    "type",
    "const",
    "var",
    "resourcestring",
    "threadvar",
    "function",
    "procedure",
    "uses",
    "interface",
    "implementation",
    "initialization",
    "finalization",
    "begin",
    "end",
];

const CALLING_CONVENTIONS: &[&str] = &["stdcall", "safecall", "cdecl", "register", "pascal", "winapi"];

const ROUTINE_DIRECTIVES: &[&str] = &[
    "overload",
    "virtual",
    "abstract",
    "reintroduce",
    "override",
    "dynamic",
    "inline",
    "static",
    "deprecated",
    "platform",
    "experimental",
    "assembler",
    "varargs",
    "delayed",
    "final",
    "dispid",
    "message",
    "external",
];

const VISIBILITY: &[&str] = &["public", "published", "private", "protected", "strict"];

type Parse<T> = Result<T, SyntaxDiagnostic>;

/// Parses a unit into a [`SyntaxTree`].
pub fn parse(source: &str) -> SyntaxTree {
    let (tokens, errors) = tokenize(source, Dialect::Pascal);
    let mut grammar = DelphiGrammar {
        stream: TokenStream::new(tokens, true),
        tree: SyntaxTree {
            items: Vec::new(),
            errors,
        },
    };
    grammar.unit();
    grammar.tree
}

struct DelphiGrammar {
    stream: TokenStream,
    tree: SyntaxTree,
}

impl DelphiGrammar {
    fn unit(&mut self) {
        while !self.stream.at_eof() {
            if self.stream.is_any_keyword(&["implementation", "initialization", "begin"])
                || (self.stream.is_keyword("end") && self.stream.peek_at(1).is_punct("."))
            {
                return;
            }
            if let Err(error) = self.section() {
                self.tree.errors.push(error);
                self.stream.recover(true);
            }
        }
    }

    fn section(&mut self) -> Parse<()> {
        let doc = self.stream.doc();
        let pos = self.stream.peek().pos;

        if self.stream.is_any_keyword(&["unit", "program", "library", "package"]) {
            self.stream.next();
            let name = self.dotted_name()?;
            self.stream.expect_punct(";")?;
            self.tree.items.push(Item::Unit { name, doc, pos });
        } else if self.stream.eat_keyword("interface") {
            if doc.is_some() {
                self.tree.items.push(Item::Unit {
                    name: String::new(),
                    doc,
                    pos,
                });
            }
        } else if self.stream.eat_keyword("uses") {
            loop {
                let pos = self.stream.peek().pos;
                let path = self.dotted_name()?;
                if self.stream.eat_keyword("in") {
                    self.stream.expect_str()?;
                }
                self.tree.items.push(Item::Include { path, pos });
                if self.stream.eat_punct(";") {
                    break;
                }
                self.stream.expect_punct(",")?;
            }
        } else if self.stream.eat_keyword("type") {
            self.type_section();
        } else if self.stream.is_any_keyword(&["const", "var", "resourcestring", "threadvar"]) {
            self.stream.next();
            while self.stream.is_ident() && !self.stream.is_any_keyword(SECTION_KEYWORDS) {
                self.stream.recover(true);
            }
        } else if self.stream.is_any_keyword(&["function", "procedure"]) {
            let routine = self.routine(doc, pos)?;
            self.tree.items.push(Item::Function(routine));
        } else {
            return Err(self.stream.unexpected("a declaration"));
        }
        Ok(())
    }

    fn type_section(&mut self) {
        while self.stream.is_ident() && !self.stream.is_any_keyword(SECTION_KEYWORDS) {
            match self.type_decl() {
                Ok(decl) => self.tree.items.push(Item::Type(decl)),
                Err(error) => {
                    self.tree.errors.push(error);
                    self.stream.recover(true);
                }
            }
        }
    }

    fn type_decl(&mut self) -> Parse<TypeDecl> {
        let doc = self.stream.doc();
        let name = self.stream.expect_ident()?;
        let pos = name.pos;

        let mut generic_params = Vec::new();
        if self.stream.eat_punct("<") {
            loop {
                generic_params.push(self.stream.expect_ident()?.text);
                if self.stream.eat_punct(":") {
                    self.type_expr()?;
                }
                if self.stream.eat_punct(">") {
                    break;
                }
                if !self.stream.eat_punct(";") {
                    self.stream.expect_punct(",")?;
                }
            }
        }
        self.stream.expect_punct("=")?;
        self.stream.eat_keyword("type");

        let mut uuid = None;
        let body = if self.stream.is_any_keyword(&["interface", "dispinterface"]) {
            self.stream.next();
            if self.stream.eat_punct(";") {
                TypeBody::Forward
            } else {
                let (guid, body) = self.interface_body()?;
                uuid = guid;
                TypeBody::Interface(body)
            }
        } else if self.stream.eat_punct("^") {
            let target = self.dotted_name()?;
            self.stream.expect_punct(";")?;
            TypeBody::OpaquePointer(Some(target))
        } else if self.stream.is_keyword("pointer") && self.stream.peek_at(1).is_punct(";") {
            self.stream.next();
            self.stream.next();
            TypeBody::OpaquePointer(None)
        } else if self.stream.is_punct("(") {
            let members = self.enum_members()?;
            self.stream.expect_punct(";")?;
            TypeBody::Enum(members)
        } else if self.stream.is_keyword("class") && self.stream.peek_at(1).is_punct(";") {
            self.stream.next();
            self.stream.next();
            TypeBody::Forward
        } else if self.stream.is_any_keyword(&["record", "packed", "class", "object"]) {
            self.stream.eat_keyword("packed");
            let construct = self.stream.next().text.to_ascii_lowercase();
            if construct == "class" && self.stream.eat_keyword("of") {
                self.dotted_name()?;
                self.stream.expect_punct(";")?;
                TypeBody::Other {
                    construct: "class reference".to_string(),
                }
            } else {
                self.skip_structured_body()?;
                TypeBody::Other { construct }
            }
        } else if self.stream.is_any_keyword(&["procedure", "function", "reference", "set", "file"]) {
            let construct = self.stream.peek().text.to_ascii_lowercase();
            self.stream.recover(true);
            TypeBody::Other { construct }
        } else {
            let ty = self.type_expr()?;
            self.stream.expect_punct(";")?;
            TypeBody::Alias(ty)
        };

        Ok(TypeDecl {
            name: name.text,
            generic_params,
            uuid,
            doc,
            pos,
            body,
        })
    }

    /// `(IBase) ['{GUID}'] members end;`
    fn interface_body(&mut self) -> Parse<(Option<String>, InterfaceBody)> {
        let mut body = InterfaceBody::default();
        if self.stream.eat_punct("(") {
            body.base = Some(self.type_expr()?);
            self.stream.expect_punct(")")?;
        }

        let mut uuid = None;
        if self.stream.is_punct("[") && self.stream.peek_at(1).kind == TokenKind::Str {
            self.stream.next();
            let literal = self.stream.next().text;
            self.stream.expect_punct("]")?;
            uuid = Some(literal.trim_matches(|c| c == '{' || c == '}').to_string());
        }

        while !self.stream.is_keyword("end") {
            if self.stream.at_eof() {
                return Err(self.stream.unexpected("'end'"));
            }
            if let Err(error) = self.member(&mut body) {
                self.tree.errors.push(error);
                self.stream.recover(true);
            }
        }
        self.stream.expect_keyword("end")?;
        self.stream.expect_punct(";")?;
        Ok((uuid, body))
    }

    fn member(&mut self, body: &mut InterfaceBody) -> Parse<()> {
        let doc = self.stream.doc();
        let pos = self.stream.peek().pos;
        if self.stream.is_any_keyword(VISIBILITY) {
            self.stream.next();
        } else if self.stream.is_any_keyword(&["function", "procedure"]) {
            body.methods.push(self.routine(doc, pos)?);
        } else if self.stream.eat_keyword("property") {
            body.properties.push(self.property(doc, pos)?);
        } else {
            return Err(self.stream.unexpected("a method or property"));
        }
        Ok(())
    }

    /// `function Name(args): Ret; directives` or `procedure Name(args); directives`
    fn routine(&mut self, doc: Option<DocComment>, pos: SourcePos) -> Parse<MethodDecl> {
        let is_function = self.stream.is_keyword("function");
        self.stream.next();
        let name = self.stream.expect_ident()?;

        let arguments = if self.stream.is_punct("(") {
            self.arguments()?
        } else {
            Vec::new()
        };
        let return_type = if is_function {
            self.stream.expect_punct(":")?;
            Some(self.type_expr()?)
        } else {
            None
        };
        self.stream.expect_punct(";")?;

        let mut calling_convention = None;
        loop {
            if self.stream.is_any_keyword(CALLING_CONVENTIONS) {
                calling_convention = Some(self.stream.next().text.to_ascii_lowercase());
            } else if self.stream.is_any_keyword(ROUTINE_DIRECTIVES) {
                // Directives with operands (`external 'lib' name 'x'`) run to `;`.
                while !self.stream.is_punct(";") && !self.stream.at_eof() {
                    self.stream.next();
                }
            } else {
                break;
            }
            self.stream.expect_punct(";")?;
        }

        Ok(MethodDecl {
            name: name.text,
            return_type,
            arguments,
            calling_convention,
            doc,
            pos,
        })
    }

    /// `(const A, B: Integer; var C: T; out D: IFoo; E: Integer = 0)`
    fn arguments(&mut self) -> Parse<Vec<ArgDecl>> {
        self.stream.expect_punct("(")?;
        let mut arguments = Vec::new();
        if self.stream.eat_punct(")") {
            return Ok(arguments);
        }
        loop {
            let pos = self.stream.peek().pos;
            let mut is_const = false;
            let mut direction = ArgDirection::In;
            if self.stream.eat_keyword("const") || self.stream.eat_keyword("constref") {
                is_const = true;
            } else if self.stream.eat_keyword("var") {
                direction = ArgDirection::InOut;
            } else if self.stream.eat_keyword("out") {
                direction = ArgDirection::Out;
            }

            let mut names = vec![self.stream.expect_ident()?.text];
            while self.stream.eat_punct(",") {
                names.push(self.stream.expect_ident()?.text);
            }
            // Untyped `var Buffer` parameters are raw pointers.
            let ty = if self.stream.eat_punct(":") {
                self.type_expr()?
            } else {
                TypeExpr::named("Pointer")
            };
            let default_value = if self.stream.eat_punct("=") {
                Some(self.expression(&[";", ")"]))
            } else {
                None
            };

            for name in names {
                arguments.push(ArgDecl {
                    name,
                    ty: ty.clone(),
                    is_const,
                    direction,
                    default_value: default_value.clone(),
                    pos,
                });
            }

            if self.stream.eat_punct(")") {
                return Ok(arguments);
            }
            self.stream.expect_punct(";")?;
        }
    }

    /// `property Name[Index: Integer]: T read Getter write Setter; default;`
    fn property(&mut self, doc: Option<DocComment>, pos: SourcePos) -> Parse<PropertyDecl> {
        let name = self.stream.expect_ident()?;
        if self.stream.is_punct("[") {
            self.stream.skip_balanced("[", "]");
        }
        self.stream.expect_punct(":")?;
        let ty = self.type_expr()?;

        let mut property = PropertyDecl {
            name: name.text,
            ty,
            read: None,
            write: None,
            is_default: false,
            doc,
            pos,
        };
        while !self.stream.eat_punct(";") {
            if self.stream.eat_keyword("read") {
                property.read = Some(self.stream.expect_ident()?.text);
            } else if self.stream.eat_keyword("write") {
                property.write = Some(self.stream.expect_ident()?.text);
            } else if self.stream.at_eof() {
                return Err(self.stream.unexpected("';'"));
            } else {
                // stored, index, dispid, default <value>, nodefault
                self.stream.next();
            }
        }
        if self.stream.is_keyword("default") && self.stream.peek_at(1).is_punct(";") {
            self.stream.next();
            self.stream.next();
            property.is_default = true;
        }
        Ok(property)
    }

    /// `(fmRgb, fmRgba = 4)`
    fn enum_members(&mut self) -> Parse<Vec<EnumMember>> {
        self.stream.expect_punct("(")?;
        let mut members = Vec::new();
        loop {
            let doc = self.stream.doc();
            let name = self.stream.expect_ident()?;
            let value = if self.stream.eat_punct("=") {
                Some(self.expression(&[",", ")"]))
            } else {
                None
            };
            members.push(EnumMember {
                name: name.text,
                value,
                doc,
                pos: name.pos,
            });
            if self.stream.eat_punct(")") {
                return Ok(members);
            }
            self.stream.expect_punct(",")?;
        }
    }

    /// Skips a `record`/`class`/`object` body up to its `end;`.
    fn skip_structured_body(&mut self) -> Parse<()> {
        if self.stream.is_punct("(") {
            self.stream.skip_balanced("(", ")");
        }
        let mut depth = 1usize;
        while depth > 0 {
            if self.stream.at_eof() {
                return Err(self.stream.unexpected("'end'"));
            }
            if self.stream.is_keyword("end") {
                depth -= 1;
            } else if self.stream.is_any_keyword(&["record", "object", "begin", "try", "asm"])
                || (self.stream.is_keyword("class") && self.opens_nested_class())
            {
                depth += 1;
            }
            self.stream.next();
        }
        self.stream.expect_punct(";")?;
        Ok(())
    }

    /// `class` opens a body unless it qualifies a member (`class function`)
    /// or is a forward/reference declaration.
    fn opens_nested_class(&self) -> bool {
        let next = self.stream.peek_at(1);
        if next.is_punct(";") {
            return false;
        }
        let member_words = [
            "function",
            "procedure",
            "property",
            "var",
            "operator",
            "constructor",
            "destructor",
            "of",
        ];
        !(next.kind == TokenKind::Ident
            && member_words.iter().any(|w| next.text.eq_ignore_ascii_case(w)))
    }

    fn type_expr(&mut self) -> Parse<TypeExpr> {
        if self.stream.eat_punct("^") {
            let mut ty = self.type_expr()?;
            ty.modifiers.insert(0, '*');
            return Ok(ty);
        }
        if self.stream.eat_keyword("array") {
            if self.stream.is_punct("[") {
                self.stream.skip_balanced("[", "]");
            }
            self.stream.expect_keyword("of")?;
            let mut ty = if self.stream.eat_keyword("const") {
                TypeExpr::named("Variant")
            } else {
                self.type_expr()?
            };
            ty.modifiers.push_str("[]");
            return Ok(ty);
        }

        let mut ty = TypeExpr::named(self.dotted_name()?);
        if self.stream.eat_punct("<") {
            loop {
                ty.args.push(self.type_expr()?);
                if self.stream.eat_punct(">") {
                    break;
                }
                self.stream.expect_punct(",")?;
            }
        }
        // Short strings: `string[20]`
        if self.stream.is_punct("[") {
            self.stream.skip_balanced("[", "]");
        }
        Ok(ty)
    }

    fn dotted_name(&mut self) -> Parse<String> {
        let mut name = self.stream.expect_ident()?.text;
        while self.stream.is_punct(".") && self.stream.peek_at(1).kind == TokenKind::Ident {
            self.stream.next();
            name.push('.');
            name.push_str(&self.stream.next().text);
        }
        Ok(name)
    }

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
                "(" | "[" => depth += 1,
                ")" | "]" => depth = depth.saturating_sub(1),
                _ => {}
            }
            let word = matches!(token.kind, TokenKind::Ident | TokenKind::Number);
            if word && previous_word {
                text.push(' ');
            }
            previous_word = word;
            match token.kind {
                TokenKind::Str => {
                    text.push('\'');
                    text.push_str(&token.text.replace('\'', "''"));
                    text.push('\'');
                }
                _ => text.push_str(&token.text),
            }
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT: &str = r#"
unit Acme.Media;

interface

uses Acme.Core, System.Types;

type
  TMillis = Integer;
  PSurface = ^TSurfaceRec;
  TFormat = (fmRgb, fmRgba = 4);

  /// Media player.
  IPlayer = interface(IUnknown)
    ['{8F2E3C6A-0B1D-4C52-9D7E-1A2B3C4D5E6F}']
    function GetVolume: Single; stdcall;
    procedure SetVolume(const Value: Single); stdcall;
    property Volume: Single read GetVolume write SetVolume;
  end;

  IList<T> = interface(IUnknown) function Get(Index: Integer): T; end;

function CreatePlayer(var Handle: Pointer; out Player: IPlayer): HRESULT; stdcall; external 'media.dll';

implementation

end.
"#;

    fn types(tree: &SyntaxTree) -> Vec<&TypeDecl> {
        tree.items
            .iter()
            .filter_map(|item| match item {
                Item::Type(decl) => Some(decl),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_unit_header_and_uses() {
        let tree = parse(UNIT);
        assert!(tree.errors.is_empty(), "{:?}", tree.errors);
        assert!(matches!(&tree.items[0], Item::Unit { name, .. } if name == "Acme.Media"));
        assert!(matches!(&tree.items[1], Item::Include { path, .. } if path == "Acme.Core"));
        assert!(matches!(&tree.items[2], Item::Include { path, .. } if path == "System.Types"));
    }

    #[test]
    fn test_type_section_shapes() {
        let tree = parse(UNIT);
        let decls = types(&tree);
        assert_eq!(decls[0].body, TypeBody::Alias(TypeExpr::named("Integer")));
        assert_eq!(decls[1].body, TypeBody::OpaquePointer(Some("TSurfaceRec".to_string())));
        let TypeBody::Enum(members) = &decls[2].body else {
            panic!("expected an enum");
        };
        assert_eq!(members.len(), 2);
        assert_eq!(members[1].value.as_deref(), Some("4"));
    }

    #[test]
    fn test_interface_with_guid_and_property() {
        let tree = parse(UNIT);
        let player = types(&tree)[3];
        assert_eq!(player.name, "IPlayer");
        assert_eq!(player.uuid.as_deref(), Some("8F2E3C6A-0B1D-4C52-9D7E-1A2B3C4D5E6F"));
        assert_eq!(player.doc.as_ref().unwrap().text, "Media player.");
        let TypeBody::Interface(body) = &player.body else {
            panic!("expected an interface");
        };
        assert_eq!(body.base.as_ref().unwrap().name, "IUnknown");
        assert_eq!(body.methods.len(), 2);
        assert_eq!(body.methods[0].calling_convention.as_deref(), Some("stdcall"));
        assert!(body.methods[1].return_type.is_none());
        assert!(body.methods[1].arguments[0].is_const);
        assert_eq!(body.properties[0].read.as_deref(), Some("GetVolume"));
        assert_eq!(body.properties[0].write.as_deref(), Some("SetVolume"));
    }

    #[test]
    fn test_generic_interface_and_function() {
        let tree = parse(UNIT);
        let list = types(&tree)[4];
        assert_eq!(list.generic_params, vec!["T"]);

        let function = tree
            .items
            .iter()
            .find_map(|item| match item {
                Item::Function(f) => Some(f),
                _ => None,
            })
            .unwrap();
        assert_eq!(function.name, "CreatePlayer");
        assert_eq!(function.arguments[0].direction, ArgDirection::InOut);
        assert_eq!(function.arguments[1].direction, ArgDirection::Out);
        assert_eq!(function.return_type.as_ref().unwrap().name, "HRESULT");
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let tree = parse("UNIT Foo; INTERFACE TYPE IFoo = INTERFACE END; IMPLEMENTATION END.");
        assert!(tree.errors.is_empty(), "{:?}", tree.errors);
        assert_eq!(types(&tree)[0].body, TypeBody::Interface(InterfaceBody::default()));
    }

    #[test]
    fn test_record_is_other_and_parsing_continues() {
        let source = "unit U; interface type TRec = record A: Integer; case B of 0: (C: Byte); end; IFoo = interface; implementation end.";
        let tree = parse(source);
        assert!(tree.errors.is_empty(), "{:?}", tree.errors);
        let decls = types(&tree);
        assert_eq!(
            decls[0].body,
            TypeBody::Other {
                construct: "record".to_string()
            }
        );
        assert_eq!(decls[1].name, "IFoo");
    }

    #[test]
    fn test_error_recovery_in_interface() {
        let source = "unit U; interface type IFoo = interface(IUnknown) procedure A; 42; procedure B; end; implementation end.";
        let tree = parse(source);
        assert_eq!(tree.errors.len(), 1);
        let TypeBody::Interface(body) = &types(&tree)[0].body else {
            panic!("expected an interface");
        };
        assert_eq!(body.methods.len(), 2);
    }
}
