//! Core statement and expression evaluator.
//!
//! A tree-walking evaluator over the parsed program. `run` pre-registers
//! every compiled state machine as a `StateType` value in the caller's
//! root scope, then executes top-level statements in source order.
//! HTTP-flavored declarations are forwarded to the [`Host`]; handler
//! bodies are executed later via [`Evaluator::exec_handler`] in scopes
//! the host prepares.

use crate::error::{EvalError, EvalResult, Signal};
use crate::host::Host;
use crate::machine::{state_instance_member, state_type_member};
use crate::scope::Scope;
use crate::value::{Function, Value};
use rulang_compiler::CompiledProgram;
use rulang_types::ast::*;
use std::rc::Rc;

/// What a handler body did, as seen by the host's dispatch driver.
#[derive(Debug, Clone)]
pub enum HandlerOutcome {
    /// Ran to completion without `return` or `next()`.
    Completed,
    /// Terminated early via `return`.
    Returned(Value),
    /// Called `next()` — the driver continues down the chain.
    Next,
}

/// The tree-walking evaluator.
pub struct Evaluator<'h> {
    host: &'h mut dyn Host,
}

impl<'h> Evaluator<'h> {
    pub fn new(host: &'h mut dyn Host) -> Self {
        Self { host }
    }

    /// Execute the program's top-level statements against `root`.
    ///
    /// A top-level `return` stops execution quietly; a `next()` outside
    /// any dispatch is a type error.
    pub fn run(&mut self, compiled: &CompiledProgram, root: &Scope) -> Result<(), EvalError> {
        for (name, machine) in &compiled.machines {
            root.define(name.clone(), Value::StateType(machine.clone()));
        }
        for stmt in &compiled.program.body {
            match self.exec_stmt(stmt, root) {
                Ok(()) => {}
                Err(Signal::Return(_)) => break,
                Err(Signal::Next) => {
                    return Err(EvalError::Type("next() called outside a handler".into()));
                }
                Err(Signal::Error(e)) => return Err(e),
            }
        }
        Ok(())
    }

    /// Execute a middleware or endpoint body in a child of `scope`.
    ///
    /// This is the block-execution primitive the host's dispatch driver
    /// calls after binding `req`, `res`, and `next`. Control signals are
    /// resolved here into a [`HandlerOutcome`]; runtime errors propagate.
    pub fn exec_handler(
        &mut self,
        block: &Block,
        scope: &Scope,
    ) -> Result<HandlerOutcome, EvalError> {
        let child = scope.child();
        match self.exec_stmts(&block.stmts, &child) {
            Ok(()) => Ok(HandlerOutcome::Completed),
            Err(Signal::Return(value)) => Ok(HandlerOutcome::Returned(value)),
            Err(Signal::Next) => Ok(HandlerOutcome::Next),
            Err(Signal::Error(e)) => Err(e),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statement execution
    // ══════════════════════════════════════════════════════════════════════

    /// Execute statements directly in `scope` (no new frame).
    fn exec_stmts(&mut self, stmts: &[Stmt], scope: &Scope) -> EvalResult<()> {
        for stmt in stmts {
            self.exec_stmt(stmt, scope)?;
        }
        Ok(())
    }

    fn exec_stmt(&mut self, stmt: &Stmt, scope: &Scope) -> EvalResult<()> {
        match stmt {
            // Already handled by the state compiler.
            Stmt::State(_) | Stmt::Transition(_) => Ok(()),

            Stmt::Let(decl) => {
                let value = self.eval_expr(&decl.value, scope)?;
                scope.define(decl.name.name.clone(), value);
                Ok(())
            }

            Stmt::Fn(decl) => {
                let function = Value::Function(Rc::new(Function {
                    params: decl.params.clone(),
                    body: decl.body.clone(),
                    captured: scope.clone(),
                }));
                scope.define(decl.name.name.clone(), function);
                Ok(())
            }

            Stmt::If(stmt) => self.exec_if(stmt, scope),

            Stmt::Return(stmt) => {
                let value = match &stmt.value {
                    Some(expr) => self.eval_expr(expr, scope)?,
                    None => Value::Null,
                };
                Err(Signal::Return(value))
            }

            Stmt::Print(stmt) => {
                let line = self.eval_expr(&stmt.value, scope)?.to_string();
                self.host.print(&line);
                Ok(())
            }

            Stmt::Block(block) => self.exec_stmts(&block.stmts, &scope.child()),

            Stmt::Endpoint(decl) => {
                let middlewares: Vec<String> =
                    decl.middlewares.iter().map(|m| m.name.clone()).collect();
                self.host
                    .on_endpoint(decl.method, &decl.path, &middlewares, decl.body.clone());
                Ok(())
            }

            Stmt::Middleware(decl) => {
                self.host.on_middleware(&decl.name.name, decl.body.clone());
                Ok(())
            }

            Stmt::Use(stmt) => {
                let names: Vec<String> = stmt.names.iter().map(|n| n.name.clone()).collect();
                self.host.on_use(&names);
                Ok(())
            }

            Stmt::Server(stmt) => {
                let port = self.eval_expr(&stmt.port, scope)?;
                match port {
                    Value::Number(n) => {
                        self.host.on_server(n);
                        Ok(())
                    }
                    other => Err(EvalError::Type(format!(
                        "server port must be a number, got {}",
                        other.tag_name()
                    ))
                    .into()),
                }
            }

            Stmt::Validate(stmt) => {
                let target = self.eval_expr(&stmt.target, scope)?;
                if !matches!(target, Value::Object(_)) {
                    return Err(EvalError::Validation {
                        path: String::new(),
                        expected: "object".into(),
                        actual: target.tag_name().into(),
                    }
                    .into());
                }
                self.validate_fields(&target, &stmt.fields, "")
            }

            Stmt::Expr(stmt) => {
                self.eval_expr(&stmt.expr, scope)?;
                Ok(())
            }
        }
    }

    /// `if`: the then-branch runs in a child scope; an `else if` chain
    /// continues in the enclosing scope, while a plain `else` block
    /// opens its own child.
    fn exec_if(&mut self, stmt: &IfStmt, scope: &Scope) -> EvalResult<()> {
        if self.eval_expr(&stmt.condition, scope)?.is_truthy() {
            return self.exec_stmts(&stmt.then_block.stmts, &scope.child());
        }
        match stmt.else_branch.as_deref() {
            Some(ElseBranch::ElseIf(inner)) => self.exec_if(inner, scope),
            Some(ElseBranch::Block(block)) => self.exec_stmts(&block.stmts, &scope.child()),
            None => Ok(()),
        }
    }

    // ── Validation ────────────────────────────────────────────────────────

    fn validate_fields(
        &self,
        object: &Value,
        fields: &[ValidationField],
        prefix: &str,
    ) -> EvalResult<()> {
        for field in fields {
            let path = if prefix.is_empty() {
                field.name.name.clone()
            } else {
                format!("{prefix}.{}", field.name.name)
            };
            let entry = object.object_get(&field.name.name);
            match entry {
                None | Some(Value::Null) => {
                    if field.optional {
                        continue;
                    }
                    let actual = if entry.is_none() { "missing" } else { "null" };
                    return Err(EvalError::Validation {
                        path,
                        expected: field.field_type.as_str().into(),
                        actual: actual.into(),
                    }
                    .into());
                }
                Some(value) => {
                    if value.tag_name() != field.field_type.as_str() {
                        return Err(EvalError::Validation {
                            path,
                            expected: field.field_type.as_str().into(),
                            actual: value.tag_name().into(),
                        }
                        .into());
                    }
                    if let Some(nested) = &field.nested {
                        self.validate_fields(value, nested, &path)?;
                    }
                }
            }
        }
        Ok(())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expression evaluation
    // ══════════════════════════════════════════════════════════════════════

    pub fn eval_expr(&mut self, expr: &Expr, scope: &Scope) -> EvalResult<Value> {
        match &expr.kind {
            ExprKind::NumberLit(n) => Ok(Value::Number(*n)),
            ExprKind::StringLit(s) => Ok(Value::Str(s.clone())),
            ExprKind::BoolLit(b) => Ok(Value::Bool(*b)),
            ExprKind::NullLit => Ok(Value::Null),

            ExprKind::Identifier(name) => Ok(scope.get(name)?),

            ExprKind::Assign { name, value } => {
                let value = self.eval_expr(value, scope)?;
                scope.assign(&name.name, value.clone())?;
                Ok(value)
            }

            ExprKind::Binary { left, op, right } => self.eval_binary(left, *op, right, scope),

            ExprKind::Unary { op: _, operand } => {
                let value = self.eval_expr(operand, scope)?;
                match value {
                    Value::Number(n) => Ok(Value::Number(-n)),
                    other => Err(EvalError::Type(format!(
                        "cannot negate {}",
                        other.tag_name()
                    ))
                    .into()),
                }
            }

            ExprKind::Call { callee, args } => {
                let callee = self.eval_expr(callee, scope)?;
                let mut arg_values = Vec::with_capacity(args.len());
                for arg in args {
                    arg_values.push(self.eval_expr(arg, scope)?);
                }
                match callee {
                    Value::Function(function) => self.call_function(&function, arg_values),
                    Value::Native(native) => native.call(arg_values),
                    other => {
                        Err(EvalError::Type(format!("{} is not callable", other.tag_name()))
                            .into())
                    }
                }
            }

            ExprKind::Member { object, property } => {
                let value = self.eval_expr(object, scope)?;
                match &value {
                    Value::Object(_) => Ok(value
                        .object_get(&property.name)
                        .cloned()
                        .unwrap_or(Value::Null)),
                    Value::StateType(compiled) => state_type_member(compiled, &property.name),
                    Value::StateInstance(cell) => state_instance_member(cell, &property.name),
                    Value::Array(items) => match property.name.as_str() {
                        "length" => Ok(Value::Number(items.len() as f64)),
                        _ => Err(EvalError::Type(format!(
                            "array has no member '{}'",
                            property.name
                        ))
                        .into()),
                    },
                    other => Err(EvalError::Type(format!(
                        "cannot access member '{}' on {}",
                        property.name,
                        other.tag_name()
                    ))
                    .into()),
                }
            }

            ExprKind::ArrayLit(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval_expr(element, scope)?);
                }
                Ok(Value::Array(values))
            }

            ExprKind::ObjectLit(literal) => {
                let mut entries: Vec<(String, Value)> = Vec::with_capacity(literal.len());
                for entry in literal {
                    let value = self.eval_expr(&entry.value, scope)?;
                    // A repeated key keeps its first position, last value.
                    if let Some(slot) = entries.iter_mut().find(|(k, _)| *k == entry.key.name) {
                        slot.1 = value;
                    } else {
                        entries.push((entry.key.name.clone(), value));
                    }
                }
                Ok(Value::Object(entries))
            }

            ExprKind::FnExpr(f) => Ok(Value::Function(Rc::new(Function {
                params: f.params.clone(),
                body: f.body.clone(),
                captured: scope.clone(),
            }))),
        }
    }

    // ── Calls ─────────────────────────────────────────────────────────────

    /// Call a user function: child of the captured scope, parameters
    /// bound in order (missing arguments default to Null, extras are
    /// ignored), body executed until completion or `return`.
    fn call_function(&mut self, function: &Function, args: Vec<Value>) -> EvalResult<Value> {
        let call_scope = function.captured.child();
        let mut args = args.into_iter();
        for param in &function.params {
            call_scope.define(param.name.clone(), args.next().unwrap_or(Value::Null));
        }
        match self.exec_stmts(&function.body.stmts, &call_scope) {
            Ok(()) => Ok(Value::Null),
            Err(Signal::Return(value)) => Ok(value),
            Err(other) => Err(other),
        }
    }

    // ── Operators ─────────────────────────────────────────────────────────

    fn eval_binary(
        &mut self,
        left: &Expr,
        op: BinOp,
        right: &Expr,
        scope: &Scope,
    ) -> EvalResult<Value> {
        // Short-circuit logical operators: the result is always a Boolean
        // carrying the truthiness of the deciding operand.
        if op == BinOp::And {
            let lv = self.eval_expr(left, scope)?;
            return if !lv.is_truthy() {
                Ok(Value::Bool(false))
            } else {
                Ok(Value::Bool(self.eval_expr(right, scope)?.is_truthy()))
            };
        }
        if op == BinOp::Or {
            let lv = self.eval_expr(left, scope)?;
            return if lv.is_truthy() {
                Ok(Value::Bool(true))
            } else {
                Ok(Value::Bool(self.eval_expr(right, scope)?.is_truthy()))
            };
        }

        let lv = self.eval_expr(left, scope)?;
        let rv = self.eval_expr(right, scope)?;

        match op {
            BinOp::Add => self.eval_add(&lv, &rv),
            BinOp::Sub => self.eval_arith(&lv, &rv, |a, b| a - b, "-"),
            BinOp::Mul => self.eval_arith(&lv, &rv, |a, b| a * b, "*"),
            BinOp::Div => self.eval_arith(&lv, &rv, |a, b| a / b, "/"),
            BinOp::Mod => self.eval_arith(&lv, &rv, |a, b| a % b, "%"),
            BinOp::Eq => Ok(Value::Bool(lv.equals(&rv))),
            BinOp::NotEq => Ok(Value::Bool(!lv.equals(&rv))),
            BinOp::Less => self.eval_comparison(&lv, &rv, |a, b| a < b, "<"),
            BinOp::Greater => self.eval_comparison(&lv, &rv, |a, b| a > b, ">"),
            BinOp::LessEq => self.eval_comparison(&lv, &rv, |a, b| a <= b, "<="),
            BinOp::GreaterEq => self.eval_comparison(&lv, &rv, |a, b| a >= b, ">="),
            BinOp::And | BinOp::Or => unreachable!("handled above"),
        }
    }

    /// `+`: numeric addition, except that one String operand turns the
    /// operation into concatenation of both operands' string forms.
    fn eval_add(&self, lv: &Value, rv: &Value) -> EvalResult<Value> {
        match (lv, rv) {
            (Value::Str(_), _) | (_, Value::Str(_)) => Ok(Value::Str(format!("{lv}{rv}"))),
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            _ => Err(EvalError::Type(format!(
                "cannot add {} and {}",
                lv.tag_name(),
                rv.tag_name()
            ))
            .into()),
        }
    }

    fn eval_arith(
        &self,
        lv: &Value,
        rv: &Value,
        op: fn(f64, f64) -> f64,
        symbol: &str,
    ) -> EvalResult<Value> {
        match (lv, rv) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(op(*a, *b))),
            _ => Err(EvalError::Type(format!(
                "cannot apply '{symbol}' to {} and {}",
                lv.tag_name(),
                rv.tag_name()
            ))
            .into()),
        }
    }

    fn eval_comparison(
        &self,
        lv: &Value,
        rv: &Value,
        op: fn(f64, f64) -> bool,
        symbol: &str,
    ) -> EvalResult<Value> {
        match (lv, rv) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(op(*a, *b))),
            _ => Err(EvalError::Type(format!(
                "cannot apply '{symbol}' to {} and {}",
                lv.tag_name(),
                rv.tag_name()
            ))
            .into()),
        }
    }
}
