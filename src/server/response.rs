//! HTTP response types and utilities.

use std::time::SystemTime;

use indexmap::IndexMap;
use serde_json::Value;

use crate::parser::{Method, Request};
use crate::server::error::Error;

/// HTTP status codes with their standard reason phrases.
///
/// This is the complete set a [`Response`] can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok = 200,
    Created = 201,
    NoContent = 204,
    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    MethodNotAllowed = 405,
    TooManyRequests = 429,
    InternalServerError = 500,
}

impl StatusCode {
    /// Get the numeric status code.
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Get the reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::NoContent => "No Content",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::TooManyRequests => "Too Many Requests",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

impl TryFrom<u16> for StatusCode {
    type Error = Error;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            200 => Ok(StatusCode::Ok),
            201 => Ok(StatusCode::Created),
            204 => Ok(StatusCode::NoContent),
            400 => Ok(StatusCode::BadRequest),
            401 => Ok(StatusCode::Unauthorized),
            403 => Ok(StatusCode::Forbidden),
            404 => Ok(StatusCode::NotFound),
            405 => Ok(StatusCode::MethodNotAllowed),
            429 => Ok(StatusCode::TooManyRequests),
            500 => Ok(StatusCode::InternalServerError),
            _ => Err(Error::InvalidStatus(code)),
        }
    }
}

/// Represents an HTTP response being built for one request.
#[derive(Debug, Clone)]
pub struct Response {
    protocol: String,
    method: Method,
    path: String,
    status: StatusCode,
    headers: IndexMap<String, String>,
    body: Value,
}

impl Response {
    /// Create a response for `request`: 200 OK with the connection-management defaults.
    pub fn new(request: &Request) -> Self {
        let mut headers = IndexMap::new();
        headers.insert("Date".to_string(), httpdate::fmt_http_date(SystemTime::now()));
        headers.insert("Connection".to_string(), "keep-alive".to_string());
        headers.insert("Keep-Alive".to_string(), "timeout=5, max=1000".to_string());

        Self {
            protocol: request.protocol.clone(),
            method: request.method,
            path: request.path.clone(),
            status: StatusCode::Ok,
            headers,
            body: Value::String(String::new()),
        }
    }

    /// The protocol echoed from the request.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// The method echoed from the request.
    pub fn method(&self) -> Method {
        self.method
    }

    /// The path echoed from the request.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Set the status from a numeric code.
    ///
    /// Codes outside [`StatusCode`] leave the response untouched and return
    /// [`Error::InvalidStatus`].
    pub fn set_status(&mut self, code: u16) -> Result<(), Error> {
        self.status = StatusCode::try_from(code)?;
        Ok(())
    }

    /// Set the status from a known [`StatusCode`].
    pub fn set_status_code(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Merge header maps into the response; later entries win.
    pub fn add_headers<I, K, V>(&mut self, headers: impl IntoIterator<Item = I>)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for header in headers {
            for (name, value) in header {
                self.headers.insert(name.into(), value.into());
            }
        }
    }

    /// Add or replace a single header.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    /// Remove headers by name. Missing headers are ignored.
    pub fn remove_headers<S: AsRef<str>>(&mut self, names: impl IntoIterator<Item = S>) {
        for name in names {
            self.headers.shift_remove(name.as_ref());
        }
    }

    /// Set the response body and the matching `Content-Type` and `Content-Length`.
    ///
    /// Strings containing `<html>` are sent as `text/html`, other strings as
    /// `text/plain`, and everything else as `application/json`.
    pub fn set_body(&mut self, body: impl Into<Value>) {
        self.body = body.into();

        let (content_type, length) = match &self.body {
            Value::String(text) if text.contains("<html>") => ("text/html", text.len()),
            Value::String(text) => ("text/plain", text.len()),
            json => ("application/json", json.to_string().len()),
        };

        self.set_header("Content-Type", content_type);
        self.set_header("Content-Length", length.to_string());
    }

    /// Format the response as it goes on the wire.
    pub fn format_http_response(&self) -> String {
        let body = match &self.body {
            Value::String(text) => text.clone(),
            json => json.to_string(),
        };

        let headers = self
            .headers
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect::<Vec<String>>()
            .join("\r\n");

        format!(
            "{protocol} {code} {phrase}\r\n{headers}\r\n\r\n{body}",
            protocol = self.protocol,
            code = self.status.as_u16(),
            phrase = self.status.reason_phrase(),
        )
    }

    /// Convert the response to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.format_http_response().into_bytes()
    }
}
