//! HTTP request parsing and representation.

use std::collections::HashMap;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::parser::body::parse_body;
use crate::parser::decode::{parse_headers, parse_params, parse_query, route_path};
use crate::parser::error::Error;
use crate::parser::method::Method;

/// Represents an HTTP request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// The protocol token from the request line, e.g. `HTTP/1.1`
    pub protocol: String,
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request path, including any query string
    pub path: String,
    /// The HTTP headers, in the order they were received
    pub headers: IndexMap<String, String>,
    /// The decoded request body; an empty object when there is none
    pub body: Value,
    /// Query parameters parsed from the path
    pub query: HashMap<String, String>,
    params: HashMap<String, String>,
}

impl Request {
    /// Create a new request with an empty body.
    ///
    /// Query parameters are decoded from `path`; a malformed query string is an error.
    pub fn new(
        method: Method,
        path: impl Into<String>,
        protocol: impl Into<String>,
        headers: IndexMap<String, String>,
    ) -> Result<Self, Error> {
        let path = path.into();
        let query = parse_query(&path)?;

        Ok(Self {
            protocol: protocol.into(),
            method,
            path,
            headers,
            body: Value::Object(Map::new()),
            query,
            params: HashMap::new(),
        })
    }

    /// Stand-in request used when the inbound bytes could not be parsed at all.
    pub(crate) fn placeholder() -> Self {
        Self {
            protocol: "HTTP/1.1".to_string(),
            method: Method::GET,
            path: String::new(),
            headers: IndexMap::new(),
            body: Value::Object(Map::new()),
            query: HashMap::new(),
            params: HashMap::new(),
        }
    }

    /// The path without its query string; this is what routes are matched against.
    pub fn route_path(&self) -> &str {
        route_path(&self.path)
    }

    /// Path parameters bound by the router. Empty until a route has matched.
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Get a single path parameter.
    pub fn param(&self, name: &str) -> Option<&String> {
        self.params.get(name)
    }

    /// Bind the `:name` segments of `pattern` against this request's path.
    ///
    /// Binding happens once per request; later calls are ignored.
    pub fn bind_params(&mut self, pattern: &str) {
        if self.params.is_empty() {
            self.params = parse_params(&self.path, pattern);
        }
    }

    /// Get a header value.
    ///
    /// Header names are stored as received; the lookup itself ignores ASCII case.
    pub fn get_header(&self, name: &str) -> Option<&String> {
        self.headers.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                Some(v)
            } else {
                None
            }
        })
    }

    /// Check if a header exists.
    pub fn has_header(&self, name: &str) -> bool {
        self.get_header(name).is_some()
    }

    /// Get a query parameter value.
    pub fn get_query_param(&self, name: &str) -> Option<&String> {
        self.query.get(name)
    }

    /// Deserialize the decoded body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        Ok(serde_json::from_value(self.body.clone())?)
    }

    /// Serialize the request back into wire format.
    ///
    /// A structured body is written as compact JSON; an empty object is treated as no
    /// body at all.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = format!("{} {} {}\r\n", self.method, self.path, self.protocol).into_bytes();

        for (name, value) in &self.headers {
            bytes.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
        }
        bytes.extend_from_slice(b"\r\n");

        let empty = matches!(&self.body, Value::Object(map) if map.is_empty());
        if !empty && !self.method.is_bodyless() {
            bytes.extend_from_slice(self.body.to_string().as_bytes());
        }

        bytes
    }
}

/// Parse an HTTP request from a byte slice.
///
/// # Arguments
///
/// * `input` - A byte slice containing one complete HTTP request
///
/// # Returns
///
/// The parsed request with empty params, or the first error encountered
pub fn parse_request(input: &[u8]) -> Result<Request, Error> {
    if input.is_empty() {
        return Err(Error::InvalidRequest);
    }

    let input = std::str::from_utf8(input)
        .map_err(|_| Error::MalformedRequestLine("Invalid UTF-8".to_string()))?;

    // Head and body are separated by the first blank line; without one there is no body.
    let (head, body) = input
        .split_once("\r\n\r\n")
        .unwrap_or((input.trim_end_matches("\r\n"), ""));
    let (request_line, header_block) = head.split_once("\r\n").unwrap_or((head, ""));

    let parts: Vec<&str> = request_line.split(' ').collect();
    let [method, path, protocol] = parts[..] else {
        return Err(Error::MalformedRequestLine(request_line.to_string()));
    };

    let method = Method::from_str(method)?;
    let headers = parse_headers(header_block)?;
    let mut request = Request::new(method, path, protocol, headers)?;

    if !body.is_empty() && !method.is_bodyless() {
        request.body = parse_body(&request.headers, body)?;
    }

    Ok(request)
}
