//! Wire encoders for request bodies: URL-encoded forms and multipart uploads.

use url::form_urlencoded;
use uuid::Uuid;

use crate::error::ValidationError;

/// Maximum size of a URL-encoded request body accepted by the API.
pub const MAX_FORM_BODY_SIZE: usize = 128 * 1024;

pub(crate) const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Ordered `application/x-www-form-urlencoded` body builder. Keys may repeat.
#[derive(Debug, Default)]
pub(crate) struct Form {
    pairs: Vec<(&'static str, String)>,
}

impl Form {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn field(&mut self, name: &'static str, value: impl Into<String>) -> &mut Self {
        self.pairs.push((name, value.into()));
        self
    }

    /// Adds the comma-joined list, or nothing when the list is empty.
    pub(crate) fn list(&mut self, name: &'static str, values: &[String]) -> &mut Self {
        if !values.is_empty() {
            self.field(name, values.join(","));
        }
        self
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>, ValidationError> {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.pairs {
            serializer.append_pair(name, value);
        }
        let encoded = serializer.finish();
        if encoded.len() > MAX_FORM_BODY_SIZE {
            return Err(ValidationError::BodyTooLarge {
                size: encoded.len(),
                limit: MAX_FORM_BODY_SIZE,
            });
        }
        Ok(encoded.into_bytes())
    }
}

/// `multipart/form-data` body builder.
#[derive(Debug)]
pub(crate) struct Multipart {
    boundary: String,
    body: Vec<u8>,
}

impl Multipart {
    pub(crate) fn new() -> Self {
        Self::with_boundary(format!("deepl-{}", Uuid::new_v4().simple()))
    }

    pub(crate) fn with_boundary(boundary: String) -> Self {
        Self {
            boundary,
            body: Vec::new(),
        }
    }

    pub(crate) fn text(&mut self, name: &str, value: &str) -> &mut Self {
        self.open_part(&format!("form-data; name=\"{name}\""), None);
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub(crate) fn file(&mut self, name: &str, filename: &str, content: &[u8]) -> &mut Self {
        let disposition = format!(
            "form-data; name=\"{name}\"; filename=\"{}\"",
            escape_filename(filename)
        );
        self.open_part(&disposition, Some("application/octet-stream"));
        self.body.extend_from_slice(content);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Closes the body and returns `(content_type, bytes)`.
    pub(crate) fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }

    fn open_part(&mut self, disposition: &str, content_type: Option<&str>) {
        self.body
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        self.body
            .extend_from_slice(format!("Content-Disposition: {disposition}\r\n").as_bytes());
        if let Some(content_type) = content_type {
            self.body
                .extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        self.body.extend_from_slice(b"\r\n");
    }
}

// Quotes and line breaks would terminate the header early.
fn escape_filename(filename: &str) -> String {
    filename
        .chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .map(|c| if c == '"' { "%22".to_string() } else { c.to_string() })
        .collect()
}
