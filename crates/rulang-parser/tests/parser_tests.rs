//! Integration tests for the Rulang parser.
//!
//! Covers: statement dispatch, declarations (state, transition, endpoint,
//! middleware, use, validate, server), expression precedence, keyword
//! property access, and the fail-fast error cases.

use rulang_lexer::Lexer;
use rulang_parser::Parser;
use rulang_types::ast::*;
use rulang_types::{ParseError, SourceFile};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Parse source into a Program, panicking on error.
fn parse(source: &str) -> Program {
    let sf = SourceFile::new("test.ru", source);
    let tokens = Lexer::new(&sf).lex().expect("lex error");
    Parser::new(tokens).parse().expect("parse error")
}

/// Parse source expecting failure.
fn parse_err(source: &str) -> ParseError {
    let sf = SourceFile::new("test.ru", source);
    let tokens = Lexer::new(&sf).lex().expect("lex error");
    Parser::new(tokens).parse().expect_err("expected parse error")
}

/// Parse a single expression statement and return the expression.
fn parse_expr(source: &str) -> Expr {
    let prog = parse(source);
    assert_eq!(prog.body.len(), 1, "expected one statement");
    match prog.body.into_iter().next().unwrap() {
        Stmt::Expr(e) => e.expr,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────
// State & transition declarations
// ─────────────────────────────────────────────────────────────────────

#[test]
fn state_declaration_with_and_without_commas() {
    let prog = parse("state Order { CREATED, PAID SHIPPED }");
    let Stmt::State(decl) = &prog.body[0] else {
        panic!("expected state declaration");
    };
    assert_eq!(decl.name.name, "Order");
    let names: Vec<_> = decl.states.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["CREATED", "PAID", "SHIPPED"]);
}

#[test]
fn empty_state_declaration_is_rejected() {
    let err = parse_err("state Order { }");
    assert!(err.message.contains("no states"), "{}", err.message);
}

#[test]
fn transition_declaration_with_dotted_events() {
    let prog = parse(
        "transition Order {
            CREATED -> PAID when payment.success
            PAID -> SHIPPED when delivery.pickup
        }",
    );
    let Stmt::Transition(decl) = &prog.body[0] else {
        panic!("expected transition declaration");
    };
    assert_eq!(decl.state_name.name, "Order");
    assert_eq!(decl.rules.len(), 2);
    assert_eq!(decl.rules[0].from.name, "CREATED");
    assert_eq!(decl.rules[0].to.name, "PAID");
    assert_eq!(decl.rules[0].event, "payment.success");
    assert_eq!(decl.rules[1].event, "delivery.pickup");
}

#[test]
fn transition_rule_with_simple_event() {
    let prog = parse("transition T { A -> B when go }");
    let Stmt::Transition(decl) = &prog.body[0] else {
        panic!("expected transition declaration");
    };
    assert_eq!(decl.rules[0].event, "go");
}

// ─────────────────────────────────────────────────────────────────────
// Endpoint / middleware / use / server
// ─────────────────────────────────────────────────────────────────────

#[test]
fn endpoint_without_middlewares() {
    let prog = parse(r#"endpoint GET "/h" { res.json({m: "hi"}) }"#);
    let Stmt::Endpoint(decl) = &prog.body[0] else {
        panic!("expected endpoint declaration");
    };
    assert_eq!(decl.method, HttpMethod::Get);
    assert_eq!(decl.path, "/h");
    assert!(decl.middlewares.is_empty());
    assert_eq!(decl.body.stmts.len(), 1);
}

#[test]
fn endpoint_with_middleware_list() {
    let prog = parse(r#"endpoint POST "/orders" use [auth, log] { return }"#);
    let Stmt::Endpoint(decl) = &prog.body[0] else {
        panic!("expected endpoint declaration");
    };
    assert_eq!(decl.method, HttpMethod::Post);
    let names: Vec<_> = decl.middlewares.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["auth", "log"]);
}

#[test]
fn endpoint_with_empty_middleware_list() {
    let prog = parse(r#"endpoint DELETE "/x" use [] { return }"#);
    let Stmt::Endpoint(decl) = &prog.body[0] else {
        panic!("expected endpoint declaration");
    };
    assert!(decl.middlewares.is_empty());
}

#[test]
fn endpoint_requires_http_method() {
    let err = parse_err(r#"endpoint FETCH "/x" { }"#);
    assert!(err.message.contains("HTTP method"), "{}", err.message);
}

#[test]
fn middleware_declaration() {
    let prog = parse("middleware auth { next() }");
    let Stmt::Middleware(decl) = &prog.body[0] else {
        panic!("expected middleware declaration");
    };
    assert_eq!(decl.name.name, "auth");
    assert_eq!(decl.body.stmts.len(), 1);
}

#[test]
fn use_statement_single_and_list() {
    let prog = parse("use auth use [log, cors]");
    let Stmt::Use(single) = &prog.body[0] else {
        panic!("expected use statement");
    };
    assert_eq!(single.names.len(), 1);
    assert_eq!(single.names[0].name, "auth");
    let Stmt::Use(list) = &prog.body[1] else {
        panic!("expected use statement");
    };
    let names: Vec<_> = list.names.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["log", "cors"]);
}

#[test]
fn server_statement_takes_an_expression() {
    let prog = parse("server 3000 + 1");
    let Stmt::Server(decl) = &prog.body[0] else {
        panic!("expected server statement");
    };
    assert!(matches!(decl.port.kind, ExprKind::Binary { .. }));
}

// ─────────────────────────────────────────────────────────────────────
// Validate
// ─────────────────────────────────────────────────────────────────────

#[test]
fn validate_schema_fields() {
    let prog = parse("validate req.body { name: string, age: optional number }");
    let Stmt::Validate(decl) = &prog.body[0] else {
        panic!("expected validate statement");
    };
    assert!(matches!(decl.target.kind, ExprKind::Member { .. }));
    assert_eq!(decl.fields.len(), 2);
    assert_eq!(decl.fields[0].name.name, "name");
    assert_eq!(decl.fields[0].field_type, FieldType::String);
    assert!(!decl.fields[0].optional);
    assert_eq!(decl.fields[1].name.name, "age");
    assert_eq!(decl.fields[1].field_type, FieldType::Number);
    assert!(decl.fields[1].optional);
}

#[test]
fn validate_nested_object_fields() {
    let prog = parse(
        "validate req.body {
            address: object {
                city: string
                zip: optional string
            }
        }",
    );
    let Stmt::Validate(decl) = &prog.body[0] else {
        panic!("expected validate statement");
    };
    let address = &decl.fields[0];
    assert_eq!(address.field_type, FieldType::Object);
    let nested = address.nested.as_ref().expect("nested fields");
    assert_eq!(nested.len(), 2);
    assert_eq!(nested[0].name.name, "city");
    assert!(nested[1].optional);
}

#[test]
fn validate_rejects_nested_fields_on_non_object() {
    let err = parse_err("validate x { tags: array { n: number } }");
    assert!(err.message.contains("object"), "{}", err.message);
}

#[test]
fn validate_rejects_unknown_type_name() {
    let err = parse_err("validate x { age: int }");
    assert!(err.message.contains("validation type"), "{}", err.message);
    assert_eq!(err.actual, "int");
}

// ─────────────────────────────────────────────────────────────────────
// Core statements
// ─────────────────────────────────────────────────────────────────────

#[test]
fn let_fn_if_return_print() {
    let prog = parse(
        "let x = 1
         fn f(a, b) { return a + b }
         if x < 2 { print x } else { print 0 }
         ",
    );
    assert!(matches!(prog.body[0], Stmt::Let(_)));
    let Stmt::Fn(f) = &prog.body[1] else {
        panic!("expected fn declaration");
    };
    assert_eq!(f.params.len(), 2);
    assert!(matches!(prog.body[2], Stmt::If(_)));
}

#[test]
fn if_else_if_chain_nests_in_the_else_branch() {
    let prog = parse("if a { } else if b { } else { }");
    let Stmt::If(stmt) = &prog.body[0] else {
        panic!("expected if statement");
    };
    let Some(else_branch) = &stmt.else_branch else {
        panic!("expected else branch");
    };
    let ElseBranch::ElseIf(inner) = else_branch.as_ref() else {
        panic!("expected else-if");
    };
    assert!(matches!(
        inner.else_branch.as_deref(),
        Some(ElseBranch::Block(_))
    ));
}

#[test]
fn return_without_value_before_brace() {
    let prog = parse("fn f() { return }");
    let Stmt::Fn(f) = &prog.body[0] else {
        panic!("expected fn declaration");
    };
    let Stmt::Return(ret) = &f.body.stmts[0] else {
        panic!("expected return statement");
    };
    assert!(ret.value.is_none());
}

#[test]
fn return_with_value() {
    let prog = parse("fn f(n) { return n * 2 }");
    let Stmt::Fn(f) = &prog.body[0] else {
        panic!("expected fn declaration");
    };
    let Stmt::Return(ret) = &f.body.stmts[0] else {
        panic!("expected return statement");
    };
    assert!(ret.value.is_some());
}

#[test]
fn semicolons_are_optional_separators() {
    let prog = parse("let x = 1; let y = 2;; print x");
    assert_eq!(prog.body.len(), 3);
}

#[test]
fn bare_block_is_a_statement() {
    let prog = parse("{ let x = 1 }");
    let Stmt::Block(block) = &prog.body[0] else {
        panic!("expected block statement");
    };
    assert_eq!(block.stmts.len(), 1);
}

#[test]
fn statements_preserve_source_order() {
    let prog = parse("let a = 1 print a let b = 2 print b");
    let kinds: Vec<_> = prog
        .body
        .iter()
        .map(|s| match s {
            Stmt::Let(l) => format!("let {}", l.name.name),
            Stmt::Print(_) => "print".into(),
            _ => "other".into(),
        })
        .collect();
    assert_eq!(kinds, ["let a", "print", "let b", "print"]);
}

#[test]
fn parsing_is_deterministic() {
    let source = "state T { A B } transition T { A -> B when go } let x = 1 + 2 * 3";
    assert_eq!(parse(source), parse(source));
}

// ─────────────────────────────────────────────────────────────────────
// Expression precedence
// ─────────────────────────────────────────────────────────────────────

#[test]
fn multiplication_binds_tighter_than_addition() {
    let expr = parse_expr("1 + 2 * 3");
    let ExprKind::Binary { op, right, .. } = expr.kind else {
        panic!("expected binary expression");
    };
    assert_eq!(op, BinOp::Add);
    assert!(matches!(
        right.kind,
        ExprKind::Binary { op: BinOp::Mul, .. }
    ));
}

#[test]
fn and_binds_tighter_than_or() {
    let expr = parse_expr("a or b and c");
    let ExprKind::Binary { op, right, .. } = expr.kind else {
        panic!("expected binary expression");
    };
    assert_eq!(op, BinOp::Or);
    assert!(matches!(
        right.kind,
        ExprKind::Binary { op: BinOp::And, .. }
    ));
}

#[test]
fn comparison_binds_tighter_than_equality() {
    let expr = parse_expr("a == b < c");
    let ExprKind::Binary { op, right, .. } = expr.kind else {
        panic!("expected binary expression");
    };
    assert_eq!(op, BinOp::Eq);
    assert!(matches!(
        right.kind,
        ExprKind::Binary {
            op: BinOp::Less,
            ..
        }
    ));
}

#[test]
fn unary_minus_binds_tighter_than_multiplication() {
    let expr = parse_expr("-a * b");
    let ExprKind::Binary { op, left, .. } = expr.kind else {
        panic!("expected binary expression");
    };
    assert_eq!(op, BinOp::Mul);
    assert!(matches!(left.kind, ExprKind::Unary { .. }));
}

#[test]
fn assignment_is_right_associative() {
    let expr = parse_expr("a = b = 1");
    let ExprKind::Assign { name, value } = expr.kind else {
        panic!("expected assignment");
    };
    assert_eq!(name.name, "a");
    assert!(matches!(value.kind, ExprKind::Assign { .. }));
}

#[test]
fn assignment_to_non_identifier_is_rejected() {
    let err = parse_err("a.b = 1");
    assert!(err.message.contains("assignment target"), "{}", err.message);
    let err = parse_err("1 = 2");
    assert!(err.message.contains("assignment target"), "{}", err.message);
}

#[test]
fn parenthesized_grouping_overrides_precedence() {
    let expr = parse_expr("(1 + 2) * 3");
    let ExprKind::Binary { op, left, .. } = expr.kind else {
        panic!("expected binary expression");
    };
    assert_eq!(op, BinOp::Mul);
    assert!(matches!(
        left.kind,
        ExprKind::Binary { op: BinOp::Add, .. }
    ));
}

// ─────────────────────────────────────────────────────────────────────
// Postfix: calls & members
// ─────────────────────────────────────────────────────────────────────

#[test]
fn keyword_property_access_nests() {
    // `state` is a keyword, `body` follows `req` — both valid after `.`
    let expr = parse_expr("req.body.name");
    let ExprKind::Member { object, property } = expr.kind else {
        panic!("expected member access");
    };
    assert_eq!(property.name, "name");
    let ExprKind::Member { object, property } = object.kind else {
        panic!("expected nested member access");
    };
    assert_eq!(property.name, "body");
    assert!(matches!(object.kind, ExprKind::Identifier(ref n) if n == "req"));
}

#[test]
fn keyword_lexeme_as_member_name() {
    let expr = parse_expr("order.state");
    let ExprKind::Member { property, .. } = expr.kind else {
        panic!("expected member access");
    };
    assert_eq!(property.name, "state");
}

#[test]
fn chained_call_and_member() {
    // res.status(401).json(x) — call and member left-associate
    let expr = parse_expr(r#"res.status(401).json(x)"#);
    let ExprKind::Call { callee, args } = expr.kind else {
        panic!("expected call");
    };
    assert_eq!(args.len(), 1);
    let ExprKind::Member { object, property } = callee.kind else {
        panic!("expected member");
    };
    assert_eq!(property.name, "json");
    assert!(matches!(object.kind, ExprKind::Call { .. }));
}

#[test]
fn next_call_parses_as_identifier_call() {
    let expr = parse_expr("next()");
    let ExprKind::Call { callee, args } = expr.kind else {
        panic!("expected call");
    };
    assert!(args.is_empty());
    assert!(matches!(callee.kind, ExprKind::Identifier(ref n) if n == "next"));
}

// ─────────────────────────────────────────────────────────────────────
// Literals
// ─────────────────────────────────────────────────────────────────────

#[test]
fn array_literal() {
    let expr = parse_expr(r#"[1, "a", true]"#);
    let ExprKind::ArrayLit(elems) = &expr.kind else {
        panic!("expected array literal");
    };
    assert_eq!(elems.len(), 3);
    assert!(matches!(elems[0].kind, ExprKind::NumberLit(n) if n == 1.0));
    assert!(matches!(elems[2].kind, ExprKind::BoolLit(true)));
}

#[test]
fn object_literal_keeps_declaration_order() {
    let prog = parse(r#"print {b: 1, a: 2, "quoted key": 3, state: 4}"#);
    let Stmt::Print(stmt) = &prog.body[0] else {
        panic!("expected print statement");
    };
    let ExprKind::ObjectLit(entries) = &stmt.value.kind else {
        panic!("expected object literal");
    };
    let keys: Vec<_> = entries.iter().map(|e| e.key.name.as_str()).collect();
    assert_eq!(keys, ["b", "a", "quoted key", "state"]);
}

#[test]
fn anonymous_function_expression() {
    let prog = parse("let f = fn (a, b) { return a + b }");
    let Stmt::Let(stmt) = &prog.body[0] else {
        panic!("expected let statement");
    };
    let ExprKind::FnExpr(f) = &stmt.value.kind else {
        panic!("expected fn expression");
    };
    assert_eq!(f.params.len(), 2);
}

#[test]
fn null_true_false_literals() {
    assert!(matches!(parse_expr("null").kind, ExprKind::NullLit));
    assert!(matches!(parse_expr("true").kind, ExprKind::BoolLit(true)));
    assert!(matches!(parse_expr("false").kind, ExprKind::BoolLit(false)));
}

// ─────────────────────────────────────────────────────────────────────
// Errors carry position
// ─────────────────────────────────────────────────────────────────────

#[test]
fn parse_error_points_at_the_offending_token() {
    let err = parse_err("let = 1");
    assert_eq!(err.span.start_line, 1);
    assert_eq!(err.actual, "=");
}

#[test]
fn unclosed_block_is_an_error() {
    let err = parse_err("fn f() { let x = 1");
    assert_eq!(err.actual, "end of file");
}
