//! HTTP request parser module.
//!
//! Turns the raw bytes of one inbound message into a [`Request`]: request line, headers,
//! query string and a body decoded according to its `Content-Type`.

mod body;
mod decode;
mod error;
mod method;
mod request;

// Re-export public items
pub use body::parse_body;
pub use decode::{parse_headers, parse_params, parse_query, route_path};
pub use error::Error;
pub use method::Method;
pub use request::Request;

// Re-export the parse_request function
pub use request::parse_request;
