use http::Method;
use std::collections::HashMap;
use tracing::debug;
use url::Url;

/// The part of an inbound request the routing table looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    pub method: Method,
    /// Percent-decoded path with a leading `/` and no query string.
    pub path: String,
    /// Query pairs in the order they appeared.
    pub query: Vec<(String, String)>,
}

impl ParsedRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Get a query parameter by name
    ///
    /// Uses "last write wins" semantics: `?limit=10&limit=20` yields `20`.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .rfind(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Convert query pairs to a HashMap (last write wins).
    #[must_use]
    pub fn query_map(&self) -> HashMap<String, String> {
        self.query.iter().cloned().collect()
    }
}

/// Parse a request target into method, decoded path and query pairs.
///
/// Accepts origin-form (`/pets/7?verbose=true`) and absolute URLs. An
/// origin-form target keeps its path as sent, so `//pets/7` stays a path with
/// an empty first segment rather than naming a host. Dot segments are
/// normalised; an empty path becomes `/`.
///
/// The whole path is percent-decoded before matching. An encoded `%2F`
/// therefore becomes a segment separator, and `/files/a%2Fb` cannot match
/// `/files/{name}`. A path whose percent-encoding does not decode to UTF-8 is
/// kept as sent.
pub fn parse_request_url(method: Method, target: &str) -> Result<ParsedRequest, url::ParseError> {
    let url = if target.starts_with('/') {
        Url::parse(&format!("http://localhost{target}"))?
    } else {
        match Url::parse(target) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Url::parse("http://localhost/")?.join(target)?
            }
            Err(e) => return Err(e),
        }
    };

    let raw_path = url.path();
    let path = match urlencoding::decode(raw_path) {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            debug!(path = %raw_path, error = %e, "Path is not valid UTF-8 once decoded");
            raw_path.to_string()
        }
    };
    let path = if path.is_empty() { "/".to_string() } else { path };

    let query = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    Ok(ParsedRequest { method, path, query })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_form_with_query() {
        let req = parse_request_url(Method::GET, "/pets/7?verbose=true&tag=a&tag=b").unwrap();
        assert_eq!(req.path, "/pets/7");
        assert_eq!(req.query_param("verbose"), Some("true"));
        assert_eq!(req.query_param("tag"), Some("b"));
        assert_eq!(req.query.len(), 3);
    }

    #[test]
    fn test_absolute_url() {
        let req = parse_request_url(Method::POST, "https://api.example.com/v1/items?x=1").unwrap();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.path, "/v1/items");
        assert_eq!(req.query_map().get("x").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_path_is_percent_decoded() {
        let req = parse_request_url(Method::GET, "/users/John%20Doe").unwrap();
        assert_eq!(req.path, "/users/John Doe");
    }

    #[test]
    fn test_query_plus_is_space() {
        let req = parse_request_url(Method::GET, "/search?q=a+b").unwrap();
        assert_eq!(req.query_param("q"), Some("a b"));
    }

    #[test]
    fn test_empty_target_is_root() {
        let req = parse_request_url(Method::GET, "").unwrap();
        assert_eq!(req.path, "/");
        assert!(req.query.is_empty());
    }

    #[test]
    fn test_leading_double_slash_is_a_path() {
        let req = parse_request_url(Method::GET, "//pets/7?x=1").unwrap();
        assert_eq!(req.path, "//pets/7");
        assert_eq!(req.query_param("x"), Some("1"));
    }

    #[test]
    fn test_encoded_slash_splits_segments() {
        let req = parse_request_url(Method::GET, "/files/a%2Fb").unwrap();
        assert_eq!(req.path, "/files/a/b");
    }

    #[test]
    fn test_dot_segments_are_normalised() {
        let req = parse_request_url(Method::GET, "/a/b/../c").unwrap();
        assert_eq!(req.path, "/a/c");
    }
}
