//! Declaration parsing: `state`, `transition`, `endpoint`, `middleware`,
//! `use`, `validate`, and `server`.

use crate::parser::Parser;
use rulang_lexer::TokenKind;
use rulang_types::ast::*;
use rulang_types::ParseError;
use std::rc::Rc;

impl Parser {
    /// `state NAME { ID (,? ID)* }` — commas between states are optional;
    /// the first identifier is the initial state.
    pub(crate) fn parse_state_decl(&mut self) -> Result<StateDecl, ParseError> {
        let start = self.current_span();
        self.advance(); // eat `state`
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::LBrace)?;
        let mut states = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            states.push(self.expect_identifier()?);
            self.eat_comma();
        }
        self.expect(&TokenKind::RBrace)?;
        if states.is_empty() {
            return Err(self.error(format!(
                "state machine '{}' declares no states",
                name.name
            )));
        }
        let span = start.merge(self.previous_span());
        Ok(StateDecl { name, states, span })
    }

    /// `transition NAME { (ID -> ID when DOTTED_ID)* }`
    pub(crate) fn parse_transition_decl(&mut self) -> Result<TransitionDecl, ParseError> {
        let start = self.current_span();
        self.advance(); // eat `transition`
        let state_name = self.expect_identifier()?;
        self.expect(&TokenKind::LBrace)?;
        let mut rules = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            rules.push(self.parse_transition_rule()?);
        }
        self.expect(&TokenKind::RBrace)?;
        let span = start.merge(self.previous_span());
        Ok(TransitionDecl {
            state_name,
            rules,
            span,
        })
    }

    /// One `FROM -> TO when EVENT` rule.
    fn parse_transition_rule(&mut self) -> Result<TransitionRule, ParseError> {
        let start = self.current_span();
        let from = self.expect_identifier()?;
        self.expect(&TokenKind::Arrow)?;
        let to = self.expect_identifier()?;
        self.expect(&TokenKind::When)?;
        let event = self.parse_dotted_name()?;
        let span = start.merge(self.previous_span());
        Ok(TransitionRule {
            from,
            to,
            event,
            span,
        })
    }

    /// A dotted identifier path (`payment.success`), joined into one string.
    fn parse_dotted_name(&mut self) -> Result<String, ParseError> {
        let mut event = self.expect_identifier()?.name;
        while self.eat(&TokenKind::Dot) {
            event.push('.');
            event.push_str(&self.expect_identifier()?.name);
        }
        Ok(event)
    }

    /// `endpoint METHOD STRING (use [ ID (, ID)* ])? BLOCK`
    pub(crate) fn parse_endpoint_decl(&mut self) -> Result<EndpointDecl, ParseError> {
        let start = self.current_span();
        self.advance(); // eat `endpoint`
        let method = self.parse_http_method()?;
        let (path, _) = self.expect_string()?;
        let middlewares = if self.eat(&TokenKind::Use) {
            self.parse_bracketed_names()?
        } else {
            Vec::new()
        };
        let body = Rc::new(self.parse_block()?);
        let span = start.merge(self.previous_span());
        Ok(EndpointDecl {
            method,
            path,
            middlewares,
            body,
            span,
        })
    }

    fn parse_http_method(&mut self) -> Result<HttpMethod, ParseError> {
        let method = match self.peek_kind() {
            TokenKind::Get => HttpMethod::Get,
            TokenKind::Post => HttpMethod::Post,
            TokenKind::Put => HttpMethod::Put,
            TokenKind::Delete => HttpMethod::Delete,
            TokenKind::Patch => HttpMethod::Patch,
            _ => return Err(self.error("expected HTTP method (GET, POST, PUT, DELETE, PATCH)")),
        };
        self.advance();
        Ok(method)
    }

    /// `middleware ID BLOCK`
    pub(crate) fn parse_middleware_decl(&mut self) -> Result<MiddlewareDecl, ParseError> {
        let start = self.current_span();
        self.advance(); // eat `middleware`
        let name = self.expect_identifier()?;
        let body = Rc::new(self.parse_block()?);
        let span = start.merge(self.previous_span());
        Ok(MiddlewareDecl { name, body, span })
    }

    /// `use ID` or `use [ ID (, ID)* ]`
    pub(crate) fn parse_use_stmt(&mut self) -> Result<UseStmt, ParseError> {
        let start = self.current_span();
        self.advance(); // eat `use`
        let names = if self.check(&TokenKind::LBracket) {
            self.parse_bracketed_names()?
        } else {
            vec![self.expect_identifier()?]
        };
        let span = start.merge(self.previous_span());
        Ok(UseStmt { names, span })
    }

    /// `[ ID (, ID)* ]` — the list may be empty.
    fn parse_bracketed_names(&mut self) -> Result<Vec<Ident>, ParseError> {
        self.expect(&TokenKind::LBracket)?;
        let mut names = Vec::new();
        if !self.check(&TokenKind::RBracket) {
            loop {
                names.push(self.expect_identifier()?);
                if !self.eat_comma() {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RBracket)?;
        Ok(names)
    }

    /// `validate EXPR { FIELD* }`
    pub(crate) fn parse_validate_stmt(&mut self) -> Result<ValidateStmt, ParseError> {
        let start = self.current_span();
        self.advance(); // eat `validate`
        let target = self.parse_expression()?;
        let fields = self.parse_field_block()?;
        let span = start.merge(self.previous_span());
        Ok(ValidateStmt {
            target,
            fields,
            span,
        })
    }

    /// `{ FIELD* }` with optional commas between fields.
    fn parse_field_block(&mut self) -> Result<Vec<ValidationField>, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            fields.push(self.parse_validation_field()?);
            self.eat_comma();
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(fields)
    }

    /// `ID : optional? TYPENAME NESTED?` — the type name is an ordinary
    /// identifier, and nested fields are only legal on `object`.
    fn parse_validation_field(&mut self) -> Result<ValidationField, ParseError> {
        let start = self.current_span();
        let name = self.expect_name()?;
        self.expect(&TokenKind::Colon)?;
        let optional = self.eat(&TokenKind::Optional);
        let type_ident = self.expect_identifier()?;
        let field_type = FieldType::parse(&type_ident.name).ok_or_else(|| {
            ParseError::new(
                type_ident.span,
                "expected a validation type (string, number, boolean, array, object)",
                type_ident.name.clone(),
            )
        })?;
        let nested = if self.check(&TokenKind::LBrace) {
            if field_type != FieldType::Object {
                return Err(self.error(format!(
                    "nested fields require type 'object', not '{field_type}'"
                )));
            }
            Some(self.parse_field_block()?)
        } else {
            None
        };
        let span = start.merge(self.previous_span());
        Ok(ValidationField {
            name,
            field_type,
            optional,
            nested,
            span,
        })
    }

    /// `server EXPR`
    pub(crate) fn parse_server_stmt(&mut self) -> Result<ServerStmt, ParseError> {
        let start = self.current_span();
        self.advance(); // eat `server`
        let port = self.parse_expression()?;
        let span = start.merge(self.previous_span());
        Ok(ServerStmt { port, span })
    }
}
