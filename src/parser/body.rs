//! Content-type aware request body decoding.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::parser::error::Error;

const CONTENT_TYPE: &str = "Content-Type";
const MULTIPART_PART_MARKER: &str = "Content-Disposition: form-data;";

/// Decode `body` according to the `Content-Type` found in `headers`.
///
/// JSON is parsed strictly, URL-encoded forms and multipart forms become flat objects of
/// strings, and any other content type decodes to an empty object.
pub fn parse_body(headers: &IndexMap<String, String>, body: &str) -> Result<Value, Error> {
    let content_type = headers
        .iter()
        .find_map(|(k, v)| k.eq_ignore_ascii_case(CONTENT_TYPE).then_some(v.as_str()))
        .ok_or(Error::MissingContentType)?;

    let media_type = content_type.split(';').next().unwrap_or_default().trim();

    match media_type {
        "application/json" => Ok(serde_json::from_str(body)?),
        "application/x-www-form-urlencoded" => Ok(parse_form_urlencoded(body)),
        _ if content_type.contains("multipart/form-data") => parse_multipart(body),
        _ => Ok(Value::Object(Map::new())),
    }
}

fn parse_form_urlencoded(body: &str) -> Value {
    let fields = body
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
        .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
        .collect::<Map<String, Value>>();

    Value::Object(fields)
}

fn parse_multipart(body: &str) -> Result<Value, Error> {
    // Part headers other than Content-Disposition only show up on file parts.
    if body.contains(CONTENT_TYPE) {
        return Err(Error::UnsupportedBodyPart);
    }

    let mut fields = Map::new();
    for part in body.split(MULTIPART_PART_MARKER) {
        let Some(name) = part
            .split_once("name=\"")
            .and_then(|(_, rest)| rest.split_once('"'))
            .map(|(name, _)| name)
            .filter(|name| !name.is_empty())
        else {
            continue;
        };

        let Some(value) = part
            .split_once("\r\n\r\n")
            .map(|(_, rest)| rest.split_once("\r\n").map_or(rest, |(value, _)| value))
            .filter(|value| !value.is_empty())
        else {
            continue;
        };

        fields.insert(name.to_string(), Value::String(value.to_string()));
    }

    Ok(Value::Object(fields))
}
