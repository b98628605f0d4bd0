//! Core parser infrastructure: token cursor, error reporting, helpers.

use rulang_lexer::{Token, TokenKind};
use rulang_types::ast::{Ident, Program};
use rulang_types::{ParseError, Span};

/// The Rulang parser.
///
/// Consumes a token stream produced by the lexer and builds an AST.
/// The grammar has no recovery points: the first mismatch aborts the
/// parse and is returned as a [`ParseError`].
pub struct Parser {
    /// The token stream (always ends with `Eof`).
    tokens: Vec<Token>,
    /// Current index into `tokens`.
    pos: usize,
}

impl Parser {
    /// Create a new parser from a token stream.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the current token without advancing.
    pub(crate) fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or_else(|| {
            self.tokens
                .last()
                .expect("token stream should end with Eof")
        })
    }

    /// Returns the kind of the current token.
    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Returns the previously consumed token's span.
    pub(crate) fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::point(1, 1)
        }
    }

    /// Returns the span of the current token.
    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    /// Returns `true` if the current token is `Eof`.
    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    /// Check if the current token matches the given kind exactly.
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Eat an optional comma.
    pub(crate) fn eat_comma(&mut self) -> bool {
        self.eat(&TokenKind::Comma)
    }

    /// Skip any run of `;` tokens. Semicolons are optional statement
    /// terminators — pure separators with no other grammar role.
    pub(crate) fn skip_semicolons(&mut self) {
        while self.check(&TokenKind::Semicolon) {
            self.advance();
        }
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    /// Expect a specific token kind. Returns the token if matched.
    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Result<Token, ParseError> {
        if self.check(expected) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("expected '{expected}'")))
        }
    }

    /// Expect an identifier token. Returns the name and span.
    pub(crate) fn expect_identifier(&mut self) -> Result<Ident, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                Ok(Ident::new(name, span))
            }
            _ => Err(self.error("expected identifier")),
        }
    }

    /// Expect an identifier OR any keyword used as a name.
    ///
    /// Keywords are contextually valid wherever a property-like name is
    /// expected: object-literal keys, member access after `.`
    /// (`order.state`, `req.body`), and `validate` field names.
    pub(crate) fn expect_name(&mut self) -> Result<Ident, ParseError> {
        let kind = self.peek_kind().clone();
        match &kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                let span = self.advance().span;
                Ok(Ident::new(name, span))
            }
            _ if kind.is_keyword() => {
                let span = self.advance().span;
                Ok(Ident::new(kind.to_string(), span))
            }
            _ => Err(self.error("expected name")),
        }
    }

    /// Expect a string literal token. Returns the string value and span.
    pub(crate) fn expect_string(&mut self) -> Result<(String, Span), ParseError> {
        match self.peek_kind().clone() {
            TokenKind::StringLit(s) => {
                let span = self.advance().span;
                Ok((s, span))
            }
            _ => Err(self.error("expected string literal")),
        }
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    /// Build a [`ParseError`] pointing at the current token.
    pub(crate) fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(self.current_span(), message, self.peek_kind().to_string())
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the token stream into a [`Program`] AST.
    pub fn parse(mut self) -> Result<Program, ParseError> {
        let start = self.current_span();
        let mut body = Vec::new();
        self.skip_semicolons();
        while !self.at_end() {
            body.push(self.parse_statement()?);
            self.skip_semicolons();
        }
        let span = if body.is_empty() {
            start
        } else {
            start.merge(self.previous_span())
        };
        Ok(Program { body, span })
    }
}
