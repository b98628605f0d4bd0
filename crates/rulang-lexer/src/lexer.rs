//! Core Rulang lexer — converts source text to a token stream.
//!
//! Features:
//! - All Rulang tokens (26 reserved words, operators, punctuation, literals)
//! - Single-line comments stripped (`//`)
//! - Strings opened by `"` or `'` with escape decoding; newlines are legal
//!   inside strings; an unterminated string at end of input still yields a
//!   string token with the accumulated content
//! - Fail-fast: the first unexpected character aborts scanning

use rulang_types::{LexError, SourceFile, Span};

use crate::token::{Token, TokenKind};

/// The Rulang lexer.
///
/// Converts source text into a vector of [`Token`]s, stopping at the
/// first [`LexError`].
pub struct Lexer<'src> {
    /// The full source text as bytes.
    source: &'src [u8],
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    col: u32,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source file.
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: source_file.source.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Lex the entire source into a token stream ending in `Eof`.
    pub fn lex(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            if self.at_end() {
                tokens.push(Token::new(TokenKind::Eof, self.current_span()));
                return Ok(tokens);
            }
            tokens.push(self.scan_token()?);
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start_line,
            start_col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    /// Skip spaces, tabs, carriage returns, newlines, and `//` comments.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
                self.advance();
            }
            if self.peek() == Some(b'/') && self.peek_at(1) == Some(b'/') {
                while let Some(ch) = self.peek() {
                    if ch == b'\n' {
                        break;
                    }
                    self.advance();
                }
                continue;
            }
            break;
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Token scanning
    // ─────────────────────────────────────────────────────────────

    /// Scan one token. The caller has already skipped whitespace and
    /// checked for end of input.
    fn scan_token(&mut self) -> Result<Token, LexError> {
        let start_line = self.line;
        let start_col = self.col;
        let start_pos = self.pos;
        let ch = self.advance().expect("caller checked at_end");

        let kind = match ch {
            // ── Punctuation ──
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,
            b'.' => TokenKind::Dot,
            b':' => TokenKind::Colon,

            // ── Operators ──
            b'+' => TokenKind::Plus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'%' => TokenKind::Percent,

            b'-' => {
                if self.peek() == Some(b'>') {
                    self.advance();
                    TokenKind::Arrow
                } else {
                    TokenKind::Minus
                }
            }

            b'=' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::EqEq
                } else {
                    TokenKind::Eq
                }
            }

            b'!' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::BangEq
                } else {
                    return Err(LexError::new(
                        self.span_from(start_line, start_col),
                        "unexpected character '!' (use '!=' for inequality)",
                    ));
                }
            }

            b'<' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::LessEq
                } else {
                    TokenKind::Less
                }
            }

            b'>' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::GreaterEq
                } else {
                    TokenKind::Greater
                }
            }

            // ── Literals ──
            b'"' | b'\'' => return Ok(self.scan_string(ch, start_line, start_col)),
            b'0'..=b'9' => self.scan_number(start_pos),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.scan_identifier(start_pos),

            _ => {
                return Err(LexError::new(
                    self.span_from(start_line, start_col),
                    format!("unexpected character '{}'", ch as char),
                ));
            }
        };

        Ok(Token::new(kind, self.span_from(start_line, start_col)))
    }

    // ─────────────────────────────────────────────────────────────
    // Number literals
    // ─────────────────────────────────────────────────────────────

    fn scan_number(&mut self, start_pos: usize) -> TokenKind {
        // First digit already consumed
        while let Some(b'0'..=b'9') = self.peek() {
            self.advance();
        }

        // Fractional part requires a digit after the dot, so `1.` stays
        // NUMBER DOT and `o.apply` style member access keeps working.
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            self.advance(); // consume '.'
            while let Some(b'0'..=b'9') = self.peek() {
                self.advance();
            }
        }

        let text = std::str::from_utf8(&self.source[start_pos..self.pos]).unwrap_or("0");
        TokenKind::NumberLit(text.parse().unwrap_or(0.0))
    }

    // ─────────────────────────────────────────────────────────────
    // Identifiers & keywords
    // ─────────────────────────────────────────────────────────────

    fn scan_identifier(&mut self, start_pos: usize) -> TokenKind {
        // First character was already consumed (letter or `_`)
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == b'_' {
                self.advance();
            } else {
                break;
            }
        }

        let text = std::str::from_utf8(&self.source[start_pos..self.pos]).unwrap_or("");
        TokenKind::from_keyword(text).unwrap_or_else(|| TokenKind::Identifier(text.to_string()))
    }

    // ─────────────────────────────────────────────────────────────
    // String literals
    // ─────────────────────────────────────────────────────────────

    /// Scan a string literal after consuming the opening quote.
    ///
    /// The string closes on the same quote character that opened it.
    /// Escapes `\n \t \r \\ \" \'` decode to their characters; any other
    /// escaped character decodes to itself. Reaching end of input before
    /// the closing quote still produces a string token (tolerant tail).
    fn scan_string(&mut self, quote: u8, start_line: u32, start_col: u32) -> Token {
        let mut buf: Vec<u8> = Vec::new();

        loop {
            match self.peek() {
                None => break, // unterminated: tolerate
                Some(ch) if ch == quote => {
                    self.advance();
                    break;
                }
                Some(b'\\') => {
                    self.advance(); // consume the '\'
                    match self.advance() {
                        Some(b'n') => buf.push(b'\n'),
                        Some(b't') => buf.push(b'\t'),
                        Some(b'r') => buf.push(b'\r'),
                        Some(b'\\') => buf.push(b'\\'),
                        Some(b'"') => buf.push(b'"'),
                        Some(b'\'') => buf.push(b'\''),
                        Some(other) => buf.push(other),
                        None => break,
                    }
                }
                Some(_) => {
                    let ch = self.advance().expect("peeked");
                    buf.push(ch);
                }
            }
        }

        let value = String::from_utf8_lossy(&buf).into_owned();
        Token::new(
            TokenKind::StringLit(value),
            self.span_from(start_line, start_col),
        )
    }
}
