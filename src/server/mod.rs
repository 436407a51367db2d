//! Routing, dispatch and the TCP server.
//!
//! [`Router`] holds the route table and global middleware, [`Dispatcher`] runs one raw
//! request through it, and [`HttpServer`] feeds accepted connections to the dispatcher.

mod config;
mod dispatcher;
mod error;
mod handler;
mod http_server;
mod response;
mod router;

// Re-export public items
pub use config::ServerConfig;
pub use dispatcher::{default_error_handler, error_handler, Dispatcher};
pub use error::Error;
pub use handler::{
    is_empty_result, stage, BoxFuture, Context, ErrorHandler, Middleware, MiddlewareScope, Route, Stage,
    StageResult,
};
pub use http_server::HttpServer;
pub use response::{Response, StatusCode};
pub use router::Router;
