//! Stateless HTTP request builder and response parser for the DeepL API.
//!
//! # Design
//! `DeepLClient` holds only the endpoint and the auth key. Each operation is
//! split into a `build_*` method that validates its input and produces an
//! `HttpRequest`, and a `parse_*` method that consumes an `HttpResponse`.
//! Validation happens entirely in `build_*`, so a rejected request never
//! reaches a transport. `parse_*` takes the response by value: the body is
//! released when it returns, whichever way it returns.

use std::io::Read;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::config::{parse_endpoint, ClientConfig};
use crate::encode::{Form, Multipart, FORM_CONTENT_TYPE};
use crate::error::{
    ApiError, ConfigError, Error, Result, TransportError, ValidationError, STATUS_QUOTA_EXCEEDED,
};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    DocumentHandle, DocumentStatus, DocumentTranslationRequest, DocumentTranslationStatus,
    TranslationRequest, TranslationResponse, Usage,
};

/// Error bodies are read up to this many bytes; the rest is discarded.
const MAX_ERROR_BODY_SIZE: u64 = 64 * 1024;

const UNSPECIFIED_DOCUMENT_ERROR: &str = "an unspecified error occurred during translation";

/// Request builder and response parser for the DeepL v2 API.
#[derive(Clone)]
pub struct DeepLClient {
    endpoint: Url,
    auth_key: String,
}

impl DeepLClient {
    /// Fails if `endpoint` is not a usable http(s) base URL.
    pub fn new(endpoint: &str, auth_key: impl Into<String>) -> std::result::Result<Self, ConfigError> {
        Ok(Self {
            endpoint: parse_endpoint(endpoint)?,
            auth_key: auth_key.into(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> std::result::Result<Self, ConfigError> {
        Ok(Self {
            endpoint: config.endpoint()?,
            auth_key: config.auth_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Points the client at another base URL, e.g. the free tier.
    pub fn set_endpoint(&mut self, endpoint: &str) -> std::result::Result<(), ConfigError> {
        self.endpoint = parse_endpoint(endpoint)?;
        Ok(())
    }

    pub fn build_translate(&self, request: &TranslationRequest) -> Result<HttpRequest> {
        if request.text.is_empty() || request.text.iter().any(String::is_empty) {
            return Err(ValidationError::Empty("text").into());
        }
        let target_lang = request
            .target_lang
            .ok_or(ValidationError::Missing("target_lang"))?;
        validate_glossary(request.glossary_id.as_deref())?;

        let mut form = Form::new();
        for text in &request.text {
            form.field("text", text.as_str());
        }
        if let Some(source_lang) = request.source_lang {
            form.field("source_lang", source_lang.as_str());
        }
        form.field("target_lang", target_lang.as_str())
            .list("tag_handling", &request.tag_handling)
            .list("non_splitting_tags", &request.non_splitting_tags)
            .list("ignore_tags", &request.ignore_tags);
        // The API's flag is "split", ours is "do not split".
        if request.do_not_split_sentences {
            form.field("split_sentences", "0");
        }
        if request.preserve_formatting {
            form.field("preserve_formatting", "1");
        }
        if let Some(formality) = request.formality {
            form.field("formality", formality.as_str());
        }
        if let Some(glossary_id) = &request.glossary_id {
            form.field("glossary_id", glossary_id.as_str());
        }

        self.post_form(&["translate"], &form)
    }

    pub fn build_usage(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.url(&["usage"]),
            headers: self.headers(None),
            body: None,
        }
    }

    pub fn build_start_document(&self, request: &DocumentTranslationRequest) -> Result<HttpRequest> {
        if request.file.is_empty() {
            return Err(ValidationError::Empty("file").into());
        }
        if request.filename.trim().is_empty() {
            return Err(ValidationError::Empty("filename").into());
        }
        let target_lang = request
            .target_lang
            .ok_or(ValidationError::Missing("target_lang"))?;
        validate_glossary(request.glossary_id.as_deref())?;

        let mut multipart = Multipart::new();
        multipart.file("file", &request.filename, &request.file);
        if let Some(source_lang) = request.source_lang {
            multipart.text("source_lang", source_lang.as_str());
        }
        multipart.text("target_lang", target_lang.as_str());
        if let Some(formality) = request.formality {
            multipart.text("formality", formality.as_str());
        }
        if let Some(glossary_id) = &request.glossary_id {
            multipart.text("glossary_id", glossary_id);
        }
        let (content_type, body) = multipart.finish();

        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.url(&["document"]),
            headers: self.headers(Some(&content_type)),
            body: Some(body),
        })
    }

    pub fn build_document_status(&self, handle: &DocumentHandle) -> Result<HttpRequest> {
        validate_handle(handle)?;
        let mut form = Form::new();
        form.field("document_key", handle.document_key.as_str());
        self.post_form(&["document", handle.document_id.as_str()], &form)
    }

    pub fn build_download_document(&self, handle: &DocumentHandle) -> Result<HttpRequest> {
        validate_handle(handle)?;
        let mut form = Form::new();
        form.field("document_key", handle.document_key.as_str());
        self.post_form(&["document", handle.document_id.as_str(), "result"], &form)
    }

    pub fn parse_translate(&self, response: HttpResponse) -> Result<TranslationResponse> {
        decode_json(check_status(response)?)
    }

    pub fn parse_usage(&self, response: HttpResponse) -> Result<Usage> {
        decode_json(check_status(response)?)
    }

    pub fn parse_start_document(&self, response: HttpResponse) -> Result<DocumentHandle> {
        decode_json(check_status(response)?)
    }

    /// A job in the `error` state is returned as `Error::DocumentTranslation`.
    pub fn parse_document_status(&self, response: HttpResponse) -> Result<DocumentTranslationStatus> {
        let bytes = read_body(check_status(response)?)?;
        let status: DocumentTranslationStatus = match serde_json::from_slice(&bytes) {
            Ok(status) => status,
            Err(e) => {
                return Err(salvage_document_error(&bytes)
                    .unwrap_or_else(|| Error::MalformedResponse(e.to_string())));
            }
        };
        if status.status == DocumentStatus::Error {
            let message = status
                .error_message
                .unwrap_or_else(|| UNSPECIFIED_DOCUMENT_ERROR.to_string());
            warn!(document_id = %status.document_id, %message, "document translation failed");
            return Err(Error::DocumentTranslation { message });
        }
        Ok(status)
    }

    pub fn parse_download_document(&self, response: HttpResponse) -> Result<Vec<u8>> {
        read_body(check_status(response)?)
    }

    fn post_form(&self, segments: &[&str], form: &Form) -> Result<HttpRequest> {
        let body = form.encode()?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.url(segments),
            headers: self.headers(Some(FORM_CONTENT_TYPE)),
            body: Some(body),
        })
    }

    fn url(&self, segments: &[&str]) -> String {
        let mut url = self.endpoint.clone();
        // Endpoints are checked to be base URLs when set.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.into()
    }

    fn headers(&self, content_type: Option<&str>) -> Vec<(String, String)> {
        let mut headers = vec![(
            "authorization".to_string(),
            format!("DeepL-Auth-Key {}", self.auth_key),
        )];
        if let Some(content_type) = content_type {
            headers.push(("content-type".to_string(), content_type.to_string()));
        }
        headers
    }
}

impl std::fmt::Debug for DeepLClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepLClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("auth_key", &"<redacted>")
            .finish()
    }
}

// Whether the glossary fits the language pair is left to the server.
fn validate_glossary(glossary_id: Option<&str>) -> std::result::Result<(), ValidationError> {
    match glossary_id {
        Some(id) if id.trim().is_empty() => Err(ValidationError::Empty("glossary_id")),
        _ => Ok(()),
    }
}

fn validate_handle(handle: &DocumentHandle) -> std::result::Result<(), ValidationError> {
    if handle.document_id.trim().is_empty() {
        return Err(ValidationError::Empty("document_id"));
    }
    if handle.document_key.trim().is_empty() {
        return Err(ValidationError::Empty("document_key"));
    }
    Ok(())
}

/// Map non-200 status codes to the matching `ApiError` variant.
///
/// Known codes get the `message` of the JSON error body when there is one;
/// other codes are reported without reading the body.
fn check_status(response: HttpResponse) -> Result<HttpResponse> {
    let status = response.status;
    let classify: fn(Option<String>) -> ApiError = match status {
        200 => return Ok(response),
        400 => ApiError::WrongRequest,
        403 => ApiError::AuthFailed,
        404 => ApiError::NotFound,
        413 => ApiError::RequestEntityTooLarge,
        429 => ApiError::TooManyRequests,
        STATUS_QUOTA_EXCEEDED => ApiError::QuotaExceeded,
        _ => {
            warn!(status, "server returned unexpected status code");
            return Err(ApiError::UnexpectedStatus(status).into());
        }
    };
    let err = classify(error_message(response));
    warn!(status, error = %err, "request rejected by server");
    Err(err.into())
}

fn error_message(response: HttpResponse) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    let mut bytes = Vec::new();
    let mut body = response.body.take(MAX_ERROR_BODY_SIZE);
    if let Err(e) = body.read_to_end(&mut bytes) {
        warn!(error = %e, "failed to read error body");
        return None;
    }
    serde_json::from_slice::<ErrorBody>(&bytes)
        .ok()
        .map(|body| body.message)
}

fn read_body(response: HttpResponse) -> Result<Vec<u8>> {
    Ok(response.into_bytes().map_err(TransportError::new)?)
}

fn decode_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T> {
    let bytes = read_body(response)?;
    serde_json::from_slice(&bytes).map_err(|e| Error::MalformedResponse(e.to_string()))
}

// A status body that fails strict decoding can still say the job failed,
// e.g. when the filename extension does not match the file content.
fn salvage_document_error(bytes: &[u8]) -> Option<Error> {
    let value: serde_json::Value = serde_json::from_slice(bytes).ok()?;
    if let Some(message) = value.get("error_message").and_then(|m| m.as_str()) {
        return Some(Error::DocumentTranslation {
            message: message.to_string(),
        });
    }
    if value.get("status").and_then(|s| s.as_str()) == Some("error") {
        return Some(Error::DocumentTranslation {
            message: UNSPECIFIED_DOCUMENT_ERROR.to_string(),
        });
    }
    None
}
