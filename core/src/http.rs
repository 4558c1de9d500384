//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests are plain data: `DeepLClient` builds them without touching the
//! network and a `Transport` executes them. Responses own their body as a
//! reader; consuming an `HttpResponse` by value and letting it drop is what
//! releases the underlying connection, so every parse path closes the body
//! exactly once.

use std::fmt;
use std::io::{Cursor, Read};

/// HTTP method for a request. The DeepL endpoints only use these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by `DeepLClient::build_*` methods. Header names are lower-case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// First header value with the given (case-insensitive) name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Streaming response body. Dropping it releases the connection.
pub type ResponseBody = Box<dyn Read>;

/// An HTTP response with a not-yet-consumed body.
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: ResponseBody,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Read + 'static) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Box::new(body),
        }
    }

    /// Response backed by an in-memory body.
    pub fn from_bytes(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, Cursor::new(body.into()))
    }

    /// Drain the body and release it.
    pub fn into_bytes(mut self) -> std::io::Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.body.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let req = HttpRequest {
            method: HttpMethod::Get,
            url: "http://localhost/usage".to_string(),
            headers: vec![("authorization".to_string(), "DeepL-Auth-Key k".to_string())],
            body: None,
        };
        assert_eq!(req.header("Authorization"), Some("DeepL-Auth-Key k"));
        assert_eq!(req.header("content-type"), None);
    }

    #[test]
    fn into_bytes_drains_body() {
        let response = HttpResponse::from_bytes(200, "payload");
        assert_eq!(response.into_bytes().unwrap(), b"payload");
    }
}
