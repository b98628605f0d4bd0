//! Expression parsing with full operator precedence.
//!
//! Precedence (lowest → highest):
//! 9. `=` (assignment, right-associative, identifier targets only)
//! 8. `or`
//! 7. `and`
//! 6. `==`, `!=`
//! 5. `<`, `>`, `<=`, `>=`
//! 4. `+`, `-`
//! 3. `*`, `/`, `%`
//! 2. unary `-`
//! 1. `()` (call), `.` (member access) — left-associative

use crate::parser::Parser;
use rulang_lexer::TokenKind;
use rulang_types::ast::*;
use rulang_types::ParseError;
use std::rc::Rc;

impl Parser {
    // ══════════════════════════════════════════════════════════════════════════
    // Entry Point
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse an expression.
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_assignment()
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Precedence Chain
    // ══════════════════════════════════════════════════════════════════════════

    /// `AssignExpr = OrExpr [ "=" AssignExpr ]`
    ///
    /// The left side must be a bare identifier; anything else is a parse
    /// error — the language has no member or index assignment.
    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_or()?;
        if self.eat(&TokenKind::Eq) {
            let value = self.parse_assignment()?;
            let name = match left.kind {
                ExprKind::Identifier(name) => Ident::new(name, left.span),
                _ => {
                    return Err(ParseError::new(
                        left.span,
                        "invalid assignment target (must be an identifier)",
                        "expression",
                    ));
                }
            };
            let span = left.span.merge(value.span);
            return Ok(Expr::new(
                ExprKind::Assign {
                    name,
                    value: Box::new(value),
                },
                span,
            ));
        }
        Ok(left)
    }

    /// `OrExpr = AndExpr { "or" AndExpr }`
    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.eat(&TokenKind::Or) {
            let right = self.parse_and()?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op: BinOp::Or,
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    /// `AndExpr = EqExpr { "and" EqExpr }`
    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;
        while self.eat(&TokenKind::And) {
            let right = self.parse_equality()?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op: BinOp::And,
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    /// `EqExpr = CompExpr { ("==" | "!=") CompExpr }`
    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::BangEq => BinOp::NotEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    /// `CompExpr = AddExpr { ("<" | ">" | "<=" | ">=") AddExpr }`
    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Less => BinOp::Less,
                TokenKind::Greater => BinOp::Greater,
                TokenKind::LessEq => BinOp::LessEq,
                TokenKind::GreaterEq => BinOp::GreaterEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    /// `AddExpr = MulExpr { ("+" | "-") MulExpr }`
    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    /// `MulExpr = UnaryExpr { ("*" | "/" | "%") UnaryExpr }`
    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    /// `UnaryExpr = [ "-" ] UnaryExpr | PostfixExpr`
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::Minus) {
            let start = self.current_span();
            self.advance();
            let operand = self.parse_unary()?;
            let span = start.merge(operand.span);
            return Ok(Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        self.parse_postfix()
    }

    /// `PostfixExpr = PrimaryExpr { "(" ArgList ")" | "." Name }`
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                TokenKind::LParen => {
                    self.advance(); // eat `(`
                    let args = self.parse_arg_list()?;
                    self.expect(&TokenKind::RParen)?;
                    let span = expr.span.merge(self.previous_span());
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    );
                }
                TokenKind::Dot => {
                    self.advance(); // eat `.`
                    let property = self.expect_name()?;
                    let span = expr.span.merge(property.span);
                    expr = Expr::new(
                        ExprKind::Member {
                            object: Box::new(expr),
                            property,
                        },
                        span,
                    );
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// Comma-separated argument expressions (possibly empty).
    fn parse_arg_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.eat_comma() {
                    break;
                }
            }
        }
        Ok(args)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Primary Expressions
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span();
        match self.peek_kind().clone() {
            // ── Literals ────────────────────────────────────────────────
            TokenKind::NumberLit(n) => {
                self.advance();
                Ok(Expr::new(ExprKind::NumberLit(n), start))
            }
            TokenKind::StringLit(s) => {
                self.advance();
                Ok(Expr::new(ExprKind::StringLit(s), start))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::new(ExprKind::BoolLit(true), start))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::new(ExprKind::BoolLit(false), start))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expr::new(ExprKind::NullLit, start))
            }

            // ── Identifiers ─────────────────────────────────────────────
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Expr::new(ExprKind::Identifier(name), start))
            }
            // `next` is a keyword, but inside handler bodies it names the
            // host-supplied continuation binding: `next()`.
            TokenKind::Next => {
                self.advance();
                Ok(Expr::new(ExprKind::Identifier("next".into()), start))
            }

            // ── Collections ─────────────────────────────────────────────
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::LBrace => self.parse_object_literal(),

            // ── Grouping ────────────────────────────────────────────────
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(&TokenKind::RParen)?;
                Ok(inner)
            }

            // ── Anonymous function ──────────────────────────────────────
            TokenKind::Fn => {
                self.advance(); // eat `fn`
                let params = self.parse_param_list()?;
                let body = Rc::new(self.parse_block()?);
                let span = start.merge(self.previous_span());
                Ok(Expr::new(ExprKind::FnExpr(FnExpr { params, body }), span))
            }

            _ => Err(self.error("expected expression")),
        }
    }

    /// `[ expr (, expr)* ]`
    fn parse_array_literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span();
        self.advance(); // eat `[`
        let mut elements = Vec::new();
        if !self.check(&TokenKind::RBracket) {
            loop {
                elements.push(self.parse_expression()?);
                if !self.eat_comma() {
                    break;
                }
                // allow a trailing comma
                if self.check(&TokenKind::RBracket) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RBracket)?;
        let span = start.merge(self.previous_span());
        Ok(Expr::new(ExprKind::ArrayLit(elements), span))
    }

    /// `{ key: value (, key: value)* }` — keys are identifiers, keyword
    /// lexemes, or string literals; entries keep declaration order.
    fn parse_object_literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span();
        self.advance(); // eat `{`
        let mut entries = Vec::new();
        if !self.check(&TokenKind::RBrace) {
            loop {
                let key = self.parse_object_key()?;
                self.expect(&TokenKind::Colon)?;
                let value = self.parse_expression()?;
                entries.push(ObjectEntry { key, value });
                if !self.eat_comma() {
                    break;
                }
                if self.check(&TokenKind::RBrace) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RBrace)?;
        let span = start.merge(self.previous_span());
        Ok(Expr::new(ExprKind::ObjectLit(entries), span))
    }

    fn parse_object_key(&mut self) -> Result<Ident, ParseError> {
        if let TokenKind::StringLit(s) = self.peek_kind().clone() {
            let span = self.advance().span;
            return Ok(Ident::new(s, span));
        }
        self.expect_name()
    }
}
