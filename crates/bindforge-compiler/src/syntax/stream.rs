//! Cursor over a token vector with the helpers both grammars share.

use super::{DocComment, SyntaxDiagnostic, Token, TokenKind};

pub struct TokenStream {
    tokens: Vec<Token>,
    index: usize,
    /// Pascal keywords compare case-insensitively.
    case_insensitive: bool,
}

impl TokenStream {
    /// `tokens` must end with an EOF token, as produced by `tokenize`.
    pub fn new(tokens: Vec<Token>, case_insensitive: bool) -> Self {
        Self {
            tokens,
            index: 0,
            case_insensitive,
        }
    }

    pub fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    /// Looks `offset` tokens ahead; past the end this is the EOF token.
    pub fn peek_at(&self, offset: usize) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.index + offset).min(last)]
    }

    pub fn next(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.index += 1;
        }
        token
    }

    pub fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    /// Doc comment attached to the current token.
    pub fn doc(&self) -> Option<DocComment> {
        self.peek().doc.clone()
    }

    pub fn is_punct(&self, punct: &str) -> bool {
        self.peek().is_punct(punct)
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.keyword_at(0, keyword)
    }

    pub fn keyword_at(&self, offset: usize, keyword: &str) -> bool {
        let token = self.peek_at(offset);
        token.kind == TokenKind::Ident && self.text_matches(&token.text, keyword)
    }

    pub fn is_any_keyword(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|k| self.is_keyword(k))
    }

    pub fn is_ident(&self) -> bool {
        self.peek().kind == TokenKind::Ident
    }

    fn text_matches(&self, text: &str, keyword: &str) -> bool {
        if self.case_insensitive {
            text.eq_ignore_ascii_case(keyword)
        } else {
            text == keyword
        }
    }

    pub fn eat_punct(&mut self, punct: &str) -> bool {
        if self.is_punct(punct) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    pub fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.is_keyword(keyword) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    pub fn expect_punct(&mut self, punct: &str) -> Result<Token, SyntaxDiagnostic> {
        if self.is_punct(punct) {
            Ok(self.next())
        } else {
            Err(self.unexpected(&format!("'{punct}'")))
        }
    }

    pub fn expect_keyword(&mut self, keyword: &str) -> Result<Token, SyntaxDiagnostic> {
        if self.is_keyword(keyword) {
            Ok(self.next())
        } else {
            Err(self.unexpected(&format!("'{keyword}'")))
        }
    }

    pub fn expect_ident(&mut self) -> Result<Token, SyntaxDiagnostic> {
        if self.is_ident() {
            Ok(self.next())
        } else {
            Err(self.unexpected("an identifier"))
        }
    }

    pub fn expect_str(&mut self) -> Result<Token, SyntaxDiagnostic> {
        if self.peek().kind == TokenKind::Str {
            Ok(self.next())
        } else {
            Err(self.unexpected("a string literal"))
        }
    }

    /// "expected X, found Y" at the current token.
    pub fn unexpected(&self, expected: &str) -> SyntaxDiagnostic {
        let token = self.peek();
        let found = match token.kind {
            TokenKind::Eof => "end of file".to_string(),
            _ => format!("'{}'", token.text),
        };
        SyntaxDiagnostic::new(format!("expected {expected}, found {found}"), token.pos)
    }

    /// Skips a balanced group starting at the current `open` token.
    pub fn skip_balanced(&mut self, open: &str, close: &str) {
        if !self.eat_punct(open) {
            return;
        }
        let mut depth = 1usize;
        while depth > 0 && !self.at_eof() {
            if self.is_punct(open) {
                depth += 1;
            } else if self.is_punct(close) {
                depth -= 1;
            }
            self.index += 1;
        }
    }

    /// Error recovery: skips to just past the next `;` at nesting depth
    /// zero, or past a block opened and closed during the skip.
    ///
    /// A `}` (or `end` when `end_keyword` is set) that closes an enclosing
    /// block is left in place for its owner, unless it is the very token
    /// that caused the error.
    pub fn recover(&mut self, end_keyword: bool) {
        let start = self.index;
        let mut depth = 0usize;
        while !self.at_eof() {
            let closes_block = self.is_punct("}") || (end_keyword && self.is_keyword("end"));
            if depth == 0 && closes_block {
                if self.index == start {
                    self.index += 1;
                    if !self.eat_punct(";") {
                        self.eat_punct(".");
                    }
                }
                return;
            }
            if self.is_punct("{") || self.is_punct("(") || self.is_punct("[") {
                depth += 1;
            } else if self.is_punct(")") || self.is_punct("]") {
                depth = depth.saturating_sub(1);
            } else if self.is_punct("}") {
                depth -= 1;
                self.index += 1;
                if depth == 0 {
                    self.eat_punct(";");
                    return;
                }
                continue;
            } else if depth == 0 && self.is_punct(";") {
                self.index += 1;
                return;
            }
            self.index += 1;
        }
    }
}
