//! Response snapshots.

use std::collections::HashMap;

use bytes::Bytes;
use http::StatusCode;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

use crate::context::Headers;

/// Provenance of a response, mirroring the fetch response types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Same-origin response with readable headers and body.
    #[default]
    Basic,
    /// Cross-origin response allowed by CORS.
    Cors,
    /// Cross-origin response the page cannot read.
    Opaque,
    /// Network error placeholder.
    Error,
}

impl ResponseType {
    /// Classify a response by comparing its URL's origin with the scope's.
    pub fn for_origin(scope: &Url, url: &Url) -> Self {
        if scope.origin() == url.origin() {
            Self::Basic
        } else {
            Self::Cors
        }
    }
}

/// An immutable response snapshot.
///
/// Cloning shares the body, so storing a clone in a cache and returning the
/// original costs no copy.
#[derive(Debug, Clone)]
pub struct Response {
    /// The HTTP status code.
    pub status: u16,
    /// The status reason phrase.
    pub status_text: String,
    /// The response headers.
    pub headers: Headers,
    /// The response body.
    pub body: Bytes,
    /// Response type.
    pub response_type: ResponseType,
    /// Final URL after redirects, if known.
    pub url: Option<Url>,
}

impl Response {
    /// Create a new response.
    pub fn new(status: u16, headers: Headers, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            status_text: reason_phrase(status),
            headers,
            body: body.into(),
            response_type: ResponseType::Basic,
            url: None,
        }
    }

    /// Create a 200 response with the given body.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(200, HashMap::new(), body)
    }

    /// Create a JSON response.
    pub fn json<T: Serialize>(status: u16, value: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        Ok(Self::new(status, HashMap::new(), body).with_header("Content-Type", "application/json"))
    }

    /// Set the response type.
    pub fn with_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    /// Set the final URL.
    pub fn with_url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Check if the response was successful (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if the response is a same-origin basic response.
    pub fn is_basic(&self) -> bool {
        self.response_type == ResponseType::Basic
    }

    /// Get a header value (case-insensitive).
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }

    /// Get the raw response body.
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Get the response body as text.
    pub fn text(&self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.to_vec())
    }

    /// Parse the response body as JSON.
    pub fn json_body<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

fn reason_phrase(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text_from_code() {
        assert_eq!(Response::ok("x").status_text, "OK");
        assert_eq!(
            Response::new(503, HashMap::new(), "").status_text,
            "Service Unavailable"
        );
        assert_eq!(Response::new(799, HashMap::new(), "").status_text, "");
    }

    #[test]
    fn test_is_success() {
        assert!(Response::new(200, HashMap::new(), "").is_success());
        assert!(Response::new(204, HashMap::new(), "").is_success());
        assert!(!Response::new(304, HashMap::new(), "").is_success());
        assert!(!Response::new(404, HashMap::new(), "").is_success());
    }

    #[test]
    fn test_json_response() {
        #[derive(Serialize, Deserialize, Debug, PartialEq)]
        struct Body {
            error: String,
        }

        let resp = Response::json(
            503,
            &Body {
                error: "Offline".to_string(),
            },
        )
        .unwrap();

        assert_eq!(resp.status, 503);
        assert_eq!(resp.content_type(), Some("application/json"));
        let body: Body = resp.json_body().unwrap();
        assert_eq!(body.error, "Offline");
    }

    #[test]
    fn test_clone_shares_body() {
        let resp = Response::ok(vec![1u8, 2, 3]);
        let cloned = resp.clone();
        assert_eq!(cloned.bytes().as_ptr(), resp.bytes().as_ptr());
    }

    #[test]
    fn test_response_type_for_origin() {
        let scope = Url::parse("https://apexnos.example/").unwrap();
        let same = Url::parse("https://apexnos.example/styles.css").unwrap();
        let other = Url::parse("https://fonts.googleapis.com/css2").unwrap();

        assert_eq!(ResponseType::for_origin(&scope, &same), ResponseType::Basic);
        assert_eq!(ResponseType::for_origin(&scope, &other), ResponseType::Cors);
    }

    #[test]
    fn test_header_case_insensitive() {
        let resp = Response::ok("").with_header("Content-Type", "text/html");
        assert_eq!(resp.header("content-type"), Some("text/html"));
    }
}
