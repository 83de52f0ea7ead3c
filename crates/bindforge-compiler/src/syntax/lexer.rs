//! Tokenizer for both source dialects.

use crate::diagnostic::SourcePos;

use super::{DocComment, SyntaxDiagnostic};

/// Lexical conventions to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `/* */` comments, `"..."` strings, `#` directives, `::` scopes.
    Cpp,
    /// `{ }` and `(* *)` comments, `'...'` strings, `$` hex literals.
    Pascal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    /// String or character literal; `text` holds the unquoted contents.
    Str,
    Number,
    /// A whole preprocessor line such as `#include "base.h"`.
    Directive,
    Punct,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub pos: SourcePos,
    /// Doc comment immediately preceding this token.
    pub doc: Option<DocComment>,
}

impl Token {
    pub fn is_punct(&self, punct: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == punct
    }
}

/// Splits `source` into tokens. The result always ends with an
/// [`TokenKind::Eof`] token.
pub fn tokenize(source: &str, dialect: Dialect) -> (Vec<Token>, Vec<SyntaxDiagnostic>) {
    let mut lexer = Lexer::new(source, dialect);
    lexer.run();
    (lexer.tokens, lexer.errors)
}

struct Lexer {
    chars: Vec<char>,
    index: usize,
    line: usize,
    column: usize,
    dialect: Dialect,
    pending_doc: Option<DocComment>,
    tokens: Vec<Token>,
    errors: Vec<SyntaxDiagnostic>,
}

impl Lexer {
    fn new(source: &str, dialect: Dialect) -> Self {
        Self {
            chars: source.chars().collect(),
            index: 0,
            line: 1,
            column: 1,
            dialect,
            pending_doc: None,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.index + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.index += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn pos(&self) -> SourcePos {
        SourcePos::new(self.line, self.column)
    }

    /// True when only whitespace precedes the cursor on the current line.
    fn at_line_start(&self) -> bool {
        self.chars[..self.index]
            .iter()
            .rev()
            .take_while(|c| **c != '\n')
            .all(|c| c.is_whitespace())
    }

    fn push(&mut self, kind: TokenKind, text: String, pos: SourcePos) {
        self.tokens.push(Token {
            kind,
            text,
            pos,
            doc: self.pending_doc.take(),
        });
    }

    fn run(&mut self) {
        while let Some(c) = self.peek() {
            let pos = self.pos();
            match c {
                c if c.is_whitespace() => {
                    self.advance();
                }
                '/' if self.peek_at(1) == Some('/') => self.line_comment(pos),
                '/' if self.dialect == Dialect::Cpp && self.peek_at(1) == Some('*') => {
                    self.block_comment(pos)
                }
                '{' if self.dialect == Dialect::Pascal => self.pascal_comment(pos, "}"),
                '(' if self.dialect == Dialect::Pascal && self.peek_at(1) == Some('*') => {
                    self.pascal_comment(pos, "*)")
                }
                '#' if self.dialect == Dialect::Cpp && self.at_line_start() => self.directive(pos),
                '"' if self.dialect == Dialect::Cpp => self.string(pos, '"'),
                '\'' => self.string(pos, '\''),
                '$' if self.dialect == Dialect::Pascal
                    && self.peek_at(1).is_some_and(|c| c.is_ascii_hexdigit()) =>
                {
                    self.number(pos)
                }
                c if c.is_ascii_digit() => self.number(pos),
                c if c.is_alphabetic() || c == '_' => self.identifier(pos),
                ':' if self.dialect == Dialect::Cpp && self.peek_at(1) == Some(':') => {
                    self.advance();
                    self.advance();
                    self.push(TokenKind::Punct, "::".to_string(), pos);
                }
                _ => {
                    self.advance();
                    self.push(TokenKind::Punct, c.to_string(), pos);
                }
            }
        }
        let pos = self.pos();
        self.push(TokenKind::Eof, String::new(), pos);
    }

    fn rest_of_line(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.advance();
        }
        text
    }

    fn line_comment(&mut self, pos: SourcePos) {
        let is_doc = self.peek_at(2) == Some('/') && self.peek_at(3) != Some('/');
        self.advance();
        self.advance();
        if !is_doc {
            self.rest_of_line();
            return;
        }
        self.advance();
        let line = self.rest_of_line();
        let line = line.strip_prefix(' ').unwrap_or(&line).trim_end().to_string();
        match &mut self.pending_doc {
            Some(doc) => {
                doc.text.push('\n');
                doc.text.push_str(&line);
            }
            None => self.pending_doc = Some(DocComment { text: line, pos }),
        }
    }

    fn block_comment(&mut self, pos: SourcePos) {
        let is_doc = self.peek_at(2) == Some('*') && self.peek_at(3) != Some('/');
        self.advance();
        self.advance();
        let mut body = String::new();
        loop {
            match self.peek() {
                None => {
                    self.errors
                        .push(SyntaxDiagnostic::new("unterminated block comment", pos));
                    return;
                }
                Some('*') if self.peek_at(1) == Some('/') => {
                    self.advance();
                    self.advance();
                    break;
                }
                Some(c) => {
                    body.push(c);
                    self.advance();
                }
            }
        }
        if is_doc {
            let text = strip_block_doc(&body);
            match &mut self.pending_doc {
                Some(doc) => {
                    doc.text.push('\n');
                    doc.text.push_str(&text);
                }
                None => self.pending_doc = Some(DocComment { text, pos }),
            }
        }
    }

    fn pascal_comment(&mut self, pos: SourcePos, terminator: &str) {
        // Openers are as long as their terminators: `{ }` and `(* *)`.
        let close: Vec<char> = terminator.chars().collect();
        for _ in 0..close.len() {
            self.advance();
        }
        loop {
            if self.peek().is_none() {
                self.errors.push(SyntaxDiagnostic::new("unterminated comment", pos));
                return;
            }
            if close
                .iter()
                .enumerate()
                .all(|(offset, c)| self.peek_at(offset) == Some(*c))
            {
                for _ in 0..close.len() {
                    self.advance();
                }
                return;
            }
            self.advance();
        }
    }

    fn directive(&mut self, pos: SourcePos) {
        let mut text = String::new();
        loop {
            let line = self.rest_of_line();
            match line.trim_end().strip_suffix('\\') {
                Some(continued) => {
                    text.push_str(continued);
                    text.push(' ');
                    self.advance();
                }
                None => {
                    text.push_str(&line);
                    break;
                }
            }
        }
        self.push(TokenKind::Directive, text.trim().to_string(), pos);
    }

    fn string(&mut self, pos: SourcePos, quote: char) {
        self.advance();
        let mut text = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    self.errors
                        .push(SyntaxDiagnostic::new("unterminated string literal", pos));
                    break;
                }
                Some('\\') if self.dialect == Dialect::Cpp => {
                    self.advance();
                    if let Some(escaped) = self.advance() {
                        text.push(escaped);
                    }
                }
                Some(c) if c == quote => {
                    self.advance();
                    // Pascal doubles the quote to escape it.
                    if self.dialect == Dialect::Pascal && self.peek() == Some(quote) {
                        self.advance();
                        text.push(quote);
                        continue;
                    }
                    break;
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
            }
        }
        self.push(TokenKind::Str, text, pos);
    }

    fn number(&mut self, pos: SourcePos) {
        let mut text = String::new();
        if let Some(c) = self.advance() {
            text.push(c);
        }
        while let Some(c) = self.peek() {
            let fraction = c == '.' && self.peek_at(1).is_some_and(|n| n.is_ascii_digit());
            if c.is_ascii_alphanumeric() || c == '_' || fraction {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        self.push(TokenKind::Number, text, pos);
    }

    fn identifier(&mut self, pos: SourcePos) {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        self.push(TokenKind::Ident, text, pos);
    }
}

/// Removes the leading `*` gutter of a `/** ... */` block.
fn strip_block_doc(body: &str) -> String {
    let lines: Vec<&str> = body
        .lines()
        .map(|line| {
            let line = line.trim();
            let line = line.strip_prefix('*').unwrap_or(line);
            line.strip_prefix(' ').unwrap_or(line).trim_end()
        })
        .collect();
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.is_empty()).map_or(start, |i| i + 1);
    lines[start..end].join("\n")
}
