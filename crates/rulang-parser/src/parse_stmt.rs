//! Statement parsing.

use crate::parser::Parser;
use rulang_lexer::TokenKind;
use rulang_types::ast::*;
use rulang_types::ParseError;
use std::rc::Rc;

impl Parser {
    /// Parse a single statement, dispatching on the leading token.
    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.peek_kind() {
            TokenKind::State => self.parse_state_decl().map(Stmt::State),
            TokenKind::Transition => self.parse_transition_decl().map(Stmt::Transition),
            TokenKind::Let => self.parse_let_stmt().map(Stmt::Let),
            TokenKind::Fn => self.parse_fn_decl().map(Stmt::Fn),
            TokenKind::If => self.parse_if_stmt().map(Stmt::If),
            TokenKind::Return => self.parse_return_stmt().map(Stmt::Return),
            TokenKind::Print => self.parse_print_stmt().map(Stmt::Print),
            TokenKind::LBrace => self.parse_block().map(Stmt::Block),
            TokenKind::Endpoint => self.parse_endpoint_decl().map(Stmt::Endpoint),
            TokenKind::Middleware => self.parse_middleware_decl().map(Stmt::Middleware),
            TokenKind::Use => self.parse_use_stmt().map(Stmt::Use),
            TokenKind::Validate => self.parse_validate_stmt().map(Stmt::Validate),
            TokenKind::Server => self.parse_server_stmt().map(Stmt::Server),
            _ => {
                let expr = self.parse_expression()?;
                let span = expr.span;
                Ok(Stmt::Expr(ExprStmt { expr, span }))
            }
        }
    }

    /// Parse a block of statements: `{ stmts... }`
    pub(crate) fn parse_block(&mut self) -> Result<Block, ParseError> {
        let start = self.current_span();
        self.expect(&TokenKind::LBrace)?;
        self.skip_semicolons();
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            stmts.push(self.parse_statement()?);
            self.skip_semicolons();
        }
        self.expect(&TokenKind::RBrace)?;
        let span = start.merge(self.previous_span());
        Ok(Block { stmts, span })
    }

    /// `let name = expr`
    fn parse_let_stmt(&mut self) -> Result<LetStmt, ParseError> {
        let start = self.current_span();
        self.advance(); // eat `let`
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::Eq)?;
        let value = self.parse_expression()?;
        let span = start.merge(self.previous_span());
        Ok(LetStmt { name, value, span })
    }

    /// `fn name(params) { body }`
    fn parse_fn_decl(&mut self) -> Result<FnDecl, ParseError> {
        let start = self.current_span();
        self.advance(); // eat `fn`
        let name = self.expect_identifier()?;
        let params = self.parse_param_list()?;
        let body = Rc::new(self.parse_block()?);
        let span = start.merge(self.previous_span());
        Ok(FnDecl {
            name,
            params,
            body,
            span,
        })
    }

    /// `( name, name, ... )`
    pub(crate) fn parse_param_list(&mut self) -> Result<Vec<Ident>, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                params.push(self.expect_identifier()?);
                if !self.eat_comma() {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(params)
    }

    /// `if cond { ... } [else if ... | else { ... }]`
    fn parse_if_stmt(&mut self) -> Result<IfStmt, ParseError> {
        let start = self.current_span();
        self.advance(); // eat `if`
        let condition = self.parse_expression()?;
        let then_block = self.parse_block()?;
        let else_branch = if self.eat(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                Some(Box::new(ElseBranch::ElseIf(self.parse_if_stmt()?)))
            } else {
                Some(Box::new(ElseBranch::Block(self.parse_block()?)))
            }
        } else {
            None
        };
        let span = start.merge(self.previous_span());
        Ok(IfStmt {
            condition,
            then_block,
            else_branch,
            span,
        })
    }

    /// `return [expr]` — the argument is omitted when the next token
    /// cannot begin one (`}`, `;`, or end of input).
    fn parse_return_stmt(&mut self) -> Result<ReturnStmt, ParseError> {
        let start = self.current_span();
        self.advance(); // eat `return`
        let value = match self.peek_kind() {
            TokenKind::RBrace | TokenKind::Semicolon | TokenKind::Eof => None,
            _ => Some(self.parse_expression()?),
        };
        let span = start.merge(self.previous_span());
        Ok(ReturnStmt { value, span })
    }

    /// `print expr`
    fn parse_print_stmt(&mut self) -> Result<PrintStmt, ParseError> {
        let start = self.current_span();
        self.advance(); // eat `print`
        let value = self.parse_expression()?;
        let span = start.merge(self.previous_span());
        Ok(PrintStmt { value, span })
    }
}
