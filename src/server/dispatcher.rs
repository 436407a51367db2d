//! The per-request pipeline: parse, route, run middleware and hooks, format.

use std::sync::Arc;

use log::{debug, error};
use serde_json::{json, Value};

use crate::parser::{parse_request, Request};
use crate::server::error::Error;
use crate::server::handler::{is_empty_result, BoxFuture, Context, ErrorHandler, Route, StageResult};
use crate::server::response::{Response, StatusCode};
use crate::server::router::Router;

/// Body used when a handler finishes without producing anything.
const EMPTY_HANDLER_BODY: &str = "Server Error";

/// Wrap a closure as an [`ErrorHandler`].
pub fn error_handler<F>(f: F) -> ErrorHandler
where
    F: for<'a> Fn(&'a mut Context, &'a Error) -> BoxFuture<'a, Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Logs the error and answers 500 with a generic JSON message.
pub fn default_error_handler() -> ErrorHandler {
    error_handler(|ctx, err| {
        Box::pin(async move {
            error!("Server error: {err}");
            ctx.response.set_status_code(StatusCode::InternalServerError);
            json!({ "success": false, "message": "Internal server error" })
        })
    })
}

/// Runs one raw request through the router and the callback pipeline.
///
/// Stage order for a matched route:
///
/// 1. global middleware whose scope covers the route, in registration order
/// 2. the route's group gate (`before_group`)
/// 3. `before_handler`
/// 4. the handler
/// 5. `after_handler`, whose result is ignored
///
/// A non-empty result from stages 1–3 becomes the body and skips everything after it.
/// Any error is handed to the error handler once, with a fresh response.
#[derive(Clone)]
pub struct Dispatcher {
    router: Arc<Router>,
    error_handler: ErrorHandler,
}

impl Dispatcher {
    pub fn new(router: Router) -> Self {
        Self {
            router: Arc::new(router),
            error_handler: default_error_handler(),
        }
    }

    /// Replace the default error handler.
    pub fn with_error_handler(mut self, handler: ErrorHandler) -> Self {
        self.error_handler = handler;
        self
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Handle one inbound message and return the bytes to write back.
    ///
    /// The connection is expected to be closed after the bytes are written.
    pub async fn dispatch(&self, input: &[u8]) -> Vec<u8> {
        self.handle(input).await.to_bytes()
    }

    /// Handle one inbound message and return the finished response.
    pub async fn handle(&self, input: &[u8]) -> Response {
        let request = match parse_request(input) {
            Ok(request) => request,
            Err(e) => return self.fail(Context::new(Request::placeholder()), e.into()).await,
        };

        let Some(route) = self.router.find(&request) else {
            return Self::not_found(&request);
        };

        debug!("{} {} -> {}", request.method, request.path, route.path);

        let mut ctx = Context::new(request);
        ctx.request.bind_params(&route.path);

        match self.run(route, &mut ctx).await {
            Ok(body) => {
                ctx.response.set_body(body);
                ctx.response
            }
            Err(e) => self.fail(ctx, e).await,
        }
    }

    async fn run(&self, route: &Route, ctx: &mut Context) -> Result<Value, Error> {
        for middleware in self.router.middleware() {
            if !middleware.scope.applies_to(&route.path) {
                continue;
            }
            if let Some(body) = non_empty((middleware.handler)(ctx).await)? {
                return Ok(body);
            }
        }

        if let Some(gate) = &route.before_group {
            if let Some(body) = non_empty(gate(ctx).await)? {
                return Ok(body);
            }
        }

        if let Some(hook) = &route.before_handler {
            if let Some(body) = non_empty(hook(ctx).await)? {
                return Ok(body);
            }
        }

        let result = (route.handler)(ctx).await?;

        if let Some(hook) = &route.after_handler {
            hook(ctx).await?;
        }

        Ok(match result {
            Some(Value::Null) | None => Value::String(EMPTY_HANDLER_BODY.to_string()),
            Some(body) => body,
        })
    }

    async fn fail(&self, mut ctx: Context, err: Error) -> Response {
        ctx.reset_response();
        let body = (self.error_handler)(&mut ctx, &err).await;
        ctx.response.set_body(body);
        ctx.response
    }

    fn not_found(request: &Request) -> Response {
        let mut response = Response::new(request);
        response.set_status_code(StatusCode::NotFound);
        response.set_body(json!({ "success": false, "message": "Not found" }));
        response
    }
}

/// Drop empty stage results so that only a real body short-circuits.
fn non_empty(result: StageResult) -> Result<Option<Value>, Error> {
    Ok(result?.filter(|value| !is_empty_result(value)))
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").field("router", &self.router).finish()
    }
}
