//! Token types for the Rulang lexer.
//!
//! Defines [`TokenKind`] covering every lexeme in the language and
//! [`Token`], which pairs a kind with a source [`Span`].

use rulang_types::Span;
use std::fmt;

/// All 26 reserved identifiers in Rulang.
///
/// These cannot be used as variable names, but every one of them is still
/// valid as an object key or member name (`order.state`, `req.body`) — the
/// parser handles that contextually.
pub const ALL_KEYWORDS: &[&str] = &[
    // State machines (3)
    "state", "transition", "when",
    // Core statements (9)
    "let", "fn", "if", "else", "true", "false", "null", "return", "print",
    // HTTP declarations (9)
    "endpoint", "GET", "POST", "PUT", "DELETE", "PATCH", "middleware", "use", "next",
    // Validation & server (3)
    "validate", "optional", "server",
    // Logical operators (2)
    "and", "or",
];

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

/// A single token produced by the Rulang lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What kind of token this is.
    pub kind: TokenKind,
    /// Source location.
    pub span: Span,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns `true` if this token is a reserved keyword.
    pub fn is_keyword(&self) -> bool {
        self.kind.is_keyword()
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

/// Every token kind in the Rulang language.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals ──────────────────────────────────────────────

    /// Numeric literal (integer or decimal): `42`, `3.14`
    NumberLit(f64),
    /// String literal with escapes decoded: `"hello"`, `'hi'`
    StringLit(String),
    /// User-defined identifier: `order`, `req`
    Identifier(String),

    // ── State-Machine Keywords ───────────────────────────────

    /// `state`
    State,
    /// `transition`
    Transition,
    /// `when`
    When,

    // ── Core Statement Keywords ──────────────────────────────

    /// `let`
    Let,
    /// `fn`
    Fn,
    /// `if`
    If,
    /// `else`
    Else,
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,
    /// `return`
    Return,
    /// `print`
    Print,

    // ── HTTP Declaration Keywords ────────────────────────────

    /// `endpoint`
    Endpoint,
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `PATCH`
    Patch,
    /// `middleware`
    Middleware,
    /// `use`
    Use,
    /// `next`
    Next,

    // ── Validation & Server Keywords ─────────────────────────

    /// `validate`
    Validate,
    /// `optional`
    Optional,
    /// `server`
    Server,

    // ── Logical Operator Keywords ────────────────────────────

    /// `and`
    And,
    /// `or`
    Or,

    // ── Operators ────────────────────────────────────────────

    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `==`
    EqEq,
    /// `!=`
    BangEq,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `<=`
    LessEq,
    /// `>=`
    GreaterEq,
    /// `=`
    Eq,
    /// `->`
    Arrow,

    // ── Punctuation ──────────────────────────────────────────

    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `.`
    Dot,
    /// `:`
    Colon,

    // ── Special ──────────────────────────────────────────────

    /// End of file
    Eof,
}

impl TokenKind {
    /// Look up a reserved identifier. Returns `Some(kind)` for all 26
    /// reserved words, `None` for user identifiers.
    pub fn from_keyword(s: &str) -> Option<TokenKind> {
        Some(match s {
            "state" => TokenKind::State,
            "transition" => TokenKind::Transition,
            "when" => TokenKind::When,
            "let" => TokenKind::Let,
            "fn" => TokenKind::Fn,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            "return" => TokenKind::Return,
            "print" => TokenKind::Print,
            "endpoint" => TokenKind::Endpoint,
            "GET" => TokenKind::Get,
            "POST" => TokenKind::Post,
            "PUT" => TokenKind::Put,
            "DELETE" => TokenKind::Delete,
            "PATCH" => TokenKind::Patch,
            "middleware" => TokenKind::Middleware,
            "use" => TokenKind::Use,
            "next" => TokenKind::Next,
            "validate" => TokenKind::Validate,
            "optional" => TokenKind::Optional,
            "server" => TokenKind::Server,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            _ => return None,
        })
    }

    /// Returns `true` if this token kind is a reserved keyword.
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::State
                | TokenKind::Transition
                | TokenKind::When
                | TokenKind::Let
                | TokenKind::Fn
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
                | TokenKind::Return
                | TokenKind::Print
                | TokenKind::Endpoint
                | TokenKind::Get
                | TokenKind::Post
                | TokenKind::Put
                | TokenKind::Delete
                | TokenKind::Patch
                | TokenKind::Middleware
                | TokenKind::Use
                | TokenKind::Next
                | TokenKind::Validate
                | TokenKind::Optional
                | TokenKind::Server
                | TokenKind::And
                | TokenKind::Or
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Literals
            TokenKind::NumberLit(n) => write!(f, "{n}"),
            TokenKind::StringLit(s) => write!(f, "\"{s}\""),
            TokenKind::Identifier(s) => f.write_str(s),
            // Keywords — display the source text
            TokenKind::State => f.write_str("state"),
            TokenKind::Transition => f.write_str("transition"),
            TokenKind::When => f.write_str("when"),
            TokenKind::Let => f.write_str("let"),
            TokenKind::Fn => f.write_str("fn"),
            TokenKind::If => f.write_str("if"),
            TokenKind::Else => f.write_str("else"),
            TokenKind::True => f.write_str("true"),
            TokenKind::False => f.write_str("false"),
            TokenKind::Null => f.write_str("null"),
            TokenKind::Return => f.write_str("return"),
            TokenKind::Print => f.write_str("print"),
            TokenKind::Endpoint => f.write_str("endpoint"),
            TokenKind::Get => f.write_str("GET"),
            TokenKind::Post => f.write_str("POST"),
            TokenKind::Put => f.write_str("PUT"),
            TokenKind::Delete => f.write_str("DELETE"),
            TokenKind::Patch => f.write_str("PATCH"),
            TokenKind::Middleware => f.write_str("middleware"),
            TokenKind::Use => f.write_str("use"),
            TokenKind::Next => f.write_str("next"),
            TokenKind::Validate => f.write_str("validate"),
            TokenKind::Optional => f.write_str("optional"),
            TokenKind::Server => f.write_str("server"),
            TokenKind::And => f.write_str("and"),
            TokenKind::Or => f.write_str("or"),
            // Operators
            TokenKind::Plus => f.write_str("+"),
            TokenKind::Minus => f.write_str("-"),
            TokenKind::Star => f.write_str("*"),
            TokenKind::Slash => f.write_str("/"),
            TokenKind::Percent => f.write_str("%"),
            TokenKind::EqEq => f.write_str("=="),
            TokenKind::BangEq => f.write_str("!="),
            TokenKind::Less => f.write_str("<"),
            TokenKind::Greater => f.write_str(">"),
            TokenKind::LessEq => f.write_str("<="),
            TokenKind::GreaterEq => f.write_str(">="),
            TokenKind::Eq => f.write_str("="),
            TokenKind::Arrow => f.write_str("->"),
            // Punctuation
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::LBrace => f.write_str("{"),
            TokenKind::RBrace => f.write_str("}"),
            TokenKind::LBracket => f.write_str("["),
            TokenKind::RBracket => f.write_str("]"),
            TokenKind::Comma => f.write_str(","),
            TokenKind::Semicolon => f.write_str(";"),
            TokenKind::Dot => f.write_str("."),
            TokenKind::Colon => f.write_str(":"),
            // Special
            TokenKind::Eof => f.write_str("end of file"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
