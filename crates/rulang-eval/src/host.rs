//! Host-support layer.
//!
//! The evaluator forwards HTTP-flavored declarations through the [`Host`]
//! trait; [`Registry`] is the reference implementation, recording routes,
//! middlewares, the `use` order, the server port, and `print` output.
//!
//! The rest of this module is the fixed Value-to-host handoff: building
//! the `req` Object from a [`RequestParts`] description, the shared
//! [`ResponseState`] cell behind the five `res` natives, and the
//! [`dispatch`] driver that runs a middleware chain and endpoint body,
//! consuming `next()`/`return` signals at the top.

use crate::error::{EvalError, Signal};
use crate::evaluator::{Evaluator, HandlerOutcome};
use crate::scope::Scope;
use crate::value::{NativeFn, Value};
use rulang_types::ast::{Block, HttpMethod};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

// ─────────────────────────────────────────────────────────────────────
// Host hooks
// ─────────────────────────────────────────────────────────────────────

/// Callbacks the evaluator invokes synchronously while running top-level
/// statements. Handler bodies are shared `Rc<Block>`s — the registry
/// keeps them alive for later dispatch.
pub trait Host {
    fn on_endpoint(
        &mut self,
        method: HttpMethod,
        path: &str,
        middlewares: &[String],
        body: Rc<Block>,
    );
    fn on_middleware(&mut self, name: &str, body: Rc<Block>);
    fn on_use(&mut self, names: &[String]);
    fn on_server(&mut self, port: f64);
    /// Sink for `print` output.
    fn print(&mut self, line: &str);
}

/// One registered endpoint.
#[derive(Debug, Clone)]
pub struct EndpointRoute {
    pub method: HttpMethod,
    pub path: String,
    pub middlewares: Vec<String>,
    pub body: Rc<Block>,
}

/// The reference host: records everything the program declares and
/// captures print output in a buffer.
#[derive(Debug, Default)]
pub struct Registry {
    pub endpoints: Vec<EndpointRoute>,
    pub middlewares: BTreeMap<String, Rc<Block>>,
    /// Global middleware names from `use`, in application order.
    pub global_middlewares: Vec<String>,
    pub port: Option<f64>,
    /// Captured `print` lines.
    pub output: Vec<String>,
}

impl Host for Registry {
    fn on_endpoint(
        &mut self,
        method: HttpMethod,
        path: &str,
        middlewares: &[String],
        body: Rc<Block>,
    ) {
        self.endpoints.push(EndpointRoute {
            method,
            path: path.to_string(),
            middlewares: middlewares.to_vec(),
            body,
        });
    }

    fn on_middleware(&mut self, name: &str, body: Rc<Block>) {
        self.middlewares.insert(name.to_string(), body);
    }

    fn on_use(&mut self, names: &[String]) {
        self.global_middlewares.extend(names.iter().cloned());
    }

    fn on_server(&mut self, port: f64) {
        self.port = Some(port);
    }

    fn print(&mut self, line: &str) {
        self.output.push(line.to_string());
    }
}

impl Registry {
    /// Resolve a request to a dispatch plan: the first route whose method
    /// and path match, its middleware chain (global `use` order first,
    /// then the endpoint's own list), and captured `:param` segments.
    ///
    /// Returns `Ok(None)` when no route matches; a chain naming an
    /// unregistered middleware is an error.
    pub fn plan(&self, method: HttpMethod, path: &str) -> Result<Option<DispatchPlan>, EvalError> {
        for route in &self.endpoints {
            if route.method != method {
                continue;
            }
            let Some(params) = match_path(&route.path, path) else {
                continue;
            };
            let mut chain = Vec::new();
            for name in self
                .global_middlewares
                .iter()
                .chain(route.middlewares.iter())
            {
                let body = self
                    .middlewares
                    .get(name)
                    .ok_or_else(|| EvalError::Name(format!("middleware '{name}'")))?;
                chain.push(body.clone());
            }
            return Ok(Some(DispatchPlan {
                middlewares: chain,
                body: route.body.clone(),
                params,
            }));
        }
        Ok(None)
    }
}

/// A resolved route, ready to execute.
#[derive(Debug, Clone)]
pub struct DispatchPlan {
    /// Middleware bodies in application order.
    pub middlewares: Vec<Rc<Block>>,
    /// The endpoint body.
    pub body: Rc<Block>,
    /// Captured `:param` values from the matched path.
    pub params: Vec<(String, String)>,
}

/// Match a registered pattern (`/users/:id`) against a request path
/// (`/users/42`), capturing `:name` segments. Segment counts must match
/// exactly.
pub fn match_path(pattern: &str, path: &str) -> Option<Vec<(String, String)>> {
    let pattern_segments: Vec<&str> = pattern.trim_matches('/').split('/').collect();
    let path_segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    if pattern_segments.len() != path_segments.len() {
        return None;
    }
    let mut params = Vec::new();
    for (pattern_seg, path_seg) in pattern_segments.iter().zip(path_segments.iter()) {
        if let Some(name) = pattern_seg.strip_prefix(':') {
            params.push((name.to_string(), path_seg.to_string()));
        } else if pattern_seg != path_seg {
            return None;
        }
    }
    Some(params)
}

// ─────────────────────────────────────────────────────────────────────
// Request construction
// ─────────────────────────────────────────────────────────────────────

/// Everything the host knows about an inbound request. [`dispatch`]
/// turns this into the `req` Object bound into the handler scope.
#[derive(Debug, Clone)]
pub struct RequestParts {
    pub method: String,
    pub path: String,
    /// Route params; filled in by the driver from the matched plan.
    pub params: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    /// Header keys are lowercased as they are added.
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl RequestParts {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            params: Vec::new(),
            query: Vec::new(),
            headers: Vec::new(),
            body: Value::Null,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into().to_lowercase(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }
}

/// Build the `req` Object from request parts.
pub fn req_object(request: &RequestParts) -> Value {
    Value::Object(vec![
        ("method".into(), Value::Str(request.method.clone())),
        ("path".into(), Value::Str(request.path.clone())),
        ("params".into(), string_map(&request.params)),
        ("query".into(), string_map(&request.query)),
        ("headers".into(), string_map(&request.headers)),
        ("body".into(), request.body.clone()),
    ])
}

fn string_map(pairs: &[(String, String)]) -> Value {
    Value::Object(
        pairs
            .iter()
            .map(|(k, v)| (k.clone(), Value::Str(v.clone())))
            .collect(),
    )
}

// ─────────────────────────────────────────────────────────────────────
// Response construction
// ─────────────────────────────────────────────────────────────────────

/// The response being assembled by a handler. Shared by every `res`
/// native through one cell, so chained and repeated calls all land in
/// the same place.
#[derive(Debug, Clone, Default)]
pub struct ResponseState {
    pub status: Option<u16>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    pub content_type: Option<String>,
    /// Set once a body-producing operation ran (`json`, `text`,
    /// `redirect`).
    pub sent: bool,
}

impl ResponseState {
    fn set_header(&mut self, key: String, value: String) {
        if let Some(slot) = self.headers.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.headers.push((key, value));
        }
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The body in its host wire encoding.
    pub fn body_json(&self) -> Option<serde_json::Value> {
        self.body.as_ref().map(Value::to_json)
    }
}

/// Build the `res` Object over a shared response cell.
///
/// `status` and `header` are chainable: they return a `res` Object over
/// the same cell, so `res.status(401).json(x)` accumulates into one
/// response.
pub fn res_object(response: Rc<RefCell<ResponseState>>) -> Value {
    let json = {
        let response = response.clone();
        NativeFn::new("json", move |mut args| {
            let value = if args.is_empty() {
                Value::Null
            } else {
                args.remove(0)
            };
            let mut r = response.borrow_mut();
            r.body = Some(value);
            r.content_type = Some("application/json".into());
            r.sent = true;
            Ok(Value::Null)
        })
    };

    let text = {
        let response = response.clone();
        NativeFn::new("text", move |args| match args.as_slice() {
            [Value::Str(s)] => {
                let mut r = response.borrow_mut();
                r.body = Some(Value::Str(s.clone()));
                r.content_type = Some("text/plain".into());
                r.sent = true;
                Ok(Value::Null)
            }
            [other] => Err(EvalError::Type(format!(
                "text expects a string, got {}",
                other.tag_name()
            ))
            .into()),
            _ => Err(EvalError::Type("text expects one string argument".into()).into()),
        })
    };

    let status = {
        let response = response.clone();
        NativeFn::new("status", move |args| match args.as_slice() {
            [Value::Number(n)] => {
                response.borrow_mut().status = Some(*n as u16);
                Ok(res_object(response.clone()))
            }
            _ => Err(EvalError::Type("status expects a number".into()).into()),
        })
    };

    let header = {
        let response = response.clone();
        NativeFn::new("header", move |args| match args.as_slice() {
            [Value::Str(key), Value::Str(value)] => {
                response
                    .borrow_mut()
                    .set_header(key.clone(), value.clone());
                Ok(res_object(response.clone()))
            }
            _ => Err(EvalError::Type("header expects two strings".into()).into()),
        })
    };

    let redirect = {
        let response = response.clone();
        NativeFn::new("redirect", move |args| match args.as_slice() {
            [Value::Str(url)] => {
                let mut r = response.borrow_mut();
                r.status = Some(302);
                r.set_header("Location".into(), url.clone());
                r.sent = true;
                Ok(Value::Null)
            }
            _ => Err(EvalError::Type("redirect expects a url string".into()).into()),
        })
    };

    Value::Object(vec![
        ("json".into(), Value::Native(json)),
        ("text".into(), Value::Native(text)),
        ("status".into(), Value::Native(status)),
        ("header".into(), Value::Native(header)),
        ("redirect".into(), Value::Native(redirect)),
    ])
}

/// The `next` binding: a native that unwinds to the dispatch driver.
pub fn next_native() -> Value {
    Value::Native(NativeFn::new("next", |_args| Err(Signal::Next)))
}

// ─────────────────────────────────────────────────────────────────────
// Dispatch driver
// ─────────────────────────────────────────────────────────────────────

/// Run a resolved route: global + endpoint middlewares in order, then
/// the endpoint body.
///
/// Each body runs in one fresh child scope of `root` holding `req`,
/// `res`, and `next`. A middleware that calls `next()` passes control
/// down the chain; one that returns — or completes without calling
/// `next()` — terminates the pipeline with whatever response it built.
/// Runtime errors propagate to the caller.
pub fn dispatch(
    evaluator: &mut Evaluator<'_>,
    root: &Scope,
    plan: &DispatchPlan,
    mut request: RequestParts,
) -> Result<ResponseState, EvalError> {
    request.params = plan.params.clone();

    let response = Rc::new(RefCell::new(ResponseState::default()));
    let scope = root.child();
    scope.define("req", req_object(&request));
    scope.define("res", res_object(response.clone()));
    scope.define("next", next_native());

    for body in &plan.middlewares {
        match evaluator.exec_handler(body, &scope)? {
            HandlerOutcome::Next => continue,
            HandlerOutcome::Returned(_) | HandlerOutcome::Completed => {
                return Ok(response.borrow().clone());
            }
        }
    }

    evaluator.exec_handler(&plan.body, &scope)?;
    let state = response.borrow().clone();
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_path_exact() {
        assert_eq!(match_path("/h", "/h"), Some(vec![]));
        assert_eq!(match_path("/a/b", "/a/b"), Some(vec![]));
        assert_eq!(match_path("/a/b", "/a/c"), None);
        assert_eq!(match_path("/a", "/a/b"), None);
    }

    #[test]
    fn test_match_path_params() {
        assert_eq!(
            match_path("/users/:id", "/users/42"),
            Some(vec![("id".to_string(), "42".to_string())])
        );
        assert_eq!(
            match_path("/a/:x/b/:y", "/a/1/b/2"),
            Some(vec![
                ("x".to_string(), "1".to_string()),
                ("y".to_string(), "2".to_string()),
            ])
        );
        assert_eq!(match_path("/users/:id", "/orders/42"), None);
    }

    #[test]
    fn test_match_path_root() {
        assert_eq!(match_path("/", "/"), Some(vec![]));
    }

    #[test]
    fn test_request_headers_are_lowercased() {
        let request = RequestParts::new("GET", "/x").with_header("Authorization", "Bearer t");
        assert_eq!(request.headers[0].0, "authorization");
    }

    #[test]
    fn test_response_header_replace() {
        let mut response = ResponseState::default();
        response.set_header("x-a".into(), "1".into());
        response.set_header("x-a".into(), "2".into());
        assert_eq!(response.headers.len(), 1);
        assert_eq!(response.header("x-a"), Some("2"));
    }
}
