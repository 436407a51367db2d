//! A minimal HTTP/1.1 server runtime.
//!
//! This library turns the raw bytes of one request into a structured [`Request`], matches
//! it against a route table with `:name` path parameters, runs global middleware and
//! per-route hooks around the handler, and formats the resulting [`Response`] back into
//! wire bytes.
//!
//! # Features
//!
//! - Parse requests from byte slices: request line, headers, query string
//! - Decode JSON, URL-encoded and multipart form bodies based on `Content-Type`
//! - Exact and parameterized routing (`/users/:id`), route groups with a shared gate
//! - Global middleware scoped by an include list or an exclude list
//! - `before_handler` / `after_handler` hooks with short-circuit semantics
//! - A pluggable error handler, which may be asynchronous
//! - A small tokio server with connection limiting and graceful shutdown
//!
//! # Examples
//!
//! ## Parsing
//!
//! ```
//! use yinzer_http::{parse_request, Method};
//!
//! let request = parse_request(b"GET /search?q=rust HTTP/1.1\r\nHost: example.com\r\n\r\n").unwrap();
//! assert_eq!(request.method, Method::GET);
//! assert_eq!(request.get_query_param("q").unwrap(), "rust");
//! ```
//!
//! ## Error handling
//!
//! ```
//! use yinzer_http::{parse_request, ParserError};
//!
//! match parse_request(b"GET / HTTP/1.1\r\nAccept */*\r\n\r\n") {
//!     Ok(_) => println!("Request parsed successfully"),
//!     Err(ParserError::InvalidHeader(line)) => println!("Bad header line: {line}"),
//!     Err(err) => println!("Other error: {err}"),
//! }
//! ```
//!
//! ## Dispatching
//!
//! ```
//! use serde_json::json;
//! use yinzer_http::{stage, Dispatcher, MiddlewareScope, Router};
//!
//! # tokio_test();
//! # fn tokio_test() {
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let mut router = Router::new();
//! router.before_all(
//!     stage(|ctx| Box::pin(async move {
//!         if ctx.request.has_header("Authorization") {
//!             return Ok(None);
//!         }
//!         ctx.response.set_status(401)?;
//!         Ok(Some(json!({ "success": false, "message": "Unauthorized" })))
//!     })),
//!     MiddlewareScope::all_except(["/status"]),
//! );
//! router.get("/status", stage(|_ctx| Box::pin(async { Ok(Some(json!({ "success": true }))) })));
//! router.get("/users/:id", stage(|ctx| Box::pin(async move {
//!     Ok(ctx.request.param("id").map(|id| json!({ "id": id })))
//! })));
//!
//! let dispatcher = Dispatcher::new(router);
//! let bytes = dispatcher.dispatch(b"GET /users/7 HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
//! assert!(bytes.starts_with(b"HTTP/1.1 401 Unauthorized\r\n"));
//! # });
//! # }
//! ```
//!
//! See the `demos` directory for a complete application.

// Export the parser module
pub mod parser;

// Export the server module
pub mod server;

// Re-export commonly used items for convenience
pub use parser::{parse_request, Error as ParserError, Method, Request};
pub use server::{
    default_error_handler, error_handler, stage, BoxFuture, Context, Dispatcher, Error as ServerError,
    ErrorHandler, HttpServer, MiddlewareScope, Response, Route, Router, ServerConfig, Stage, StageResult,
    StatusCode,
};
