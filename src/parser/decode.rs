//! Header, query string and path parameter decoding.
//!
//! These are plain string scanners with no knowledge of the request as a whole, so the
//! request parser and the router can share them.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::parser::error::Error;

/// Separator between a header name and its value.
const HEADER_SEPARATOR: &str = ": ";

/// Parse a block of `\r\n`-separated header lines.
///
/// Every line must contain `": "` with a non-empty name before it and a non-empty value
/// after it. Later duplicates overwrite earlier ones but keep the first position.
pub fn parse_headers(block: &str) -> Result<IndexMap<String, String>, Error> {
    let mut headers = IndexMap::new();
    if block.is_empty() {
        return Ok(headers);
    }

    for line in block.split("\r\n") {
        let (name, value) = line
            .split_once(HEADER_SEPARATOR)
            .ok_or_else(|| Error::InvalidHeader(line.to_string()))?;

        if name.is_empty() || value.is_empty() {
            return Err(Error::InvalidHeader(line.to_string()));
        }

        headers.insert(name.to_string(), value.to_string());
    }

    Ok(headers)
}

/// Parse the query string embedded in `path`, if any.
///
/// A path without `?` has an empty query. Otherwise every `&`-separated pair must be
/// `key=value` with both sides non-empty.
pub fn parse_query(path: &str) -> Result<HashMap<String, String>, Error> {
    let Some((_, query)) = path.split_once('?') else {
        return Ok(HashMap::new());
    };

    query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) if !key.is_empty() && !value.is_empty() => {
                Ok((key.to_string(), value.to_string()))
            }
            _ => Err(Error::InvalidQuery(pair.to_string())),
        })
        .collect()
}

/// The part of `path` that takes part in routing (everything before `?`).
pub fn route_path(path: &str) -> &str {
    path.split_once('?').map_or(path, |(route, _)| route)
}

/// Bind `:name` segments of `pattern` to the matching segments of `path`.
///
/// Segments are paired by position. Params with an empty name or an empty/missing value
/// are skipped rather than reported.
pub fn parse_params(path: &str, pattern: &str) -> HashMap<String, String> {
    let path_segments: Vec<&str> = route_path(path).split('/').collect();

    pattern
        .split('/')
        .enumerate()
        .filter_map(|(i, segment)| {
            let name = segment.strip_prefix(':')?;
            let value = path_segments.get(i)?;
            if name.is_empty() || value.is_empty() {
                return None;
            }
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_keep_insertion_order() {
        let headers = parse_headers("Host: localhost:5000\r\nAccept: */*\r\nHost: other").unwrap();
        let keys: Vec<&str> = headers.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Host", "Accept"]);
        assert_eq!(headers["Host"], "other");
    }

    #[test]
    fn test_header_value_may_contain_separator() {
        let headers = parse_headers("X-Test: a: b").unwrap();
        assert_eq!(headers["X-Test"], "a: b");
    }

    #[test]
    fn test_header_with_empty_value() {
        assert!(matches!(parse_headers("X-Empty: "), Err(Error::InvalidHeader(_))));
        assert!(matches!(parse_headers(": value"), Err(Error::InvalidHeader(_))));
    }

    #[test]
    fn test_query_parsing() {
        let query = parse_query("/search?name=john&age=30").unwrap();
        assert_eq!(query.len(), 2);
        assert_eq!(query["name"], "john");
        assert_eq!(query["age"], "30");
        assert!(parse_query("/search").unwrap().is_empty());
    }

    #[test]
    fn test_query_value_keeps_later_equals_signs() {
        let query = parse_query("/search?a=b=c&token=x==").unwrap();
        assert_eq!(query["a"], "b=c");
        assert_eq!(query["token"], "x==");
    }

    #[test]
    fn test_invalid_query_pairs() {
        assert!(matches!(parse_query("/search?name"), Err(Error::InvalidQuery(_))));
        assert!(matches!(parse_query("/search?=john"), Err(Error::InvalidQuery(_))));
        assert!(matches!(parse_query("/search?name="), Err(Error::InvalidQuery(_))));
        assert!(matches!(parse_query("/search?"), Err(Error::InvalidQuery(_))));
    }

    #[test]
    fn test_params_binding() {
        let params = parse_params("/users/1/post/3", "/users/:id/post/:post");
        assert_eq!(params.len(), 2);
        assert_eq!(params["id"], "1");
        assert_eq!(params["post"], "3");
    }

    #[test]
    fn test_params_ignore_query_and_missing_values() {
        let params = parse_params("/users/7?full=true", "/users/:id");
        assert_eq!(params["id"], "7");

        let params = parse_params("/users", "/users/:id");
        assert!(params.is_empty());

        let params = parse_params("/users/1", "/users/:");
        assert!(params.is_empty());
    }
}
