//! `DeepLClient` paired with a `Transport`: one call per API operation.
//!
//! Every method builds the request first, so validation failures never reach
//! the transport. Nothing is retried; a caller waiting on a document polls
//! `check_document_status` on its own schedule.

use tracing::debug;

use crate::client::DeepLClient;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{HttpRequest, HttpResponse};
use crate::language::Language;
use crate::transport::{Transport, UreqTransport};
use crate::types::{
    DocumentHandle, DocumentTranslationRequest, DocumentTranslationStatus, TranslationRequest,
    TranslationResponse, Usage,
};

/// Executes DeepL API calls. Safe to share between threads when the
/// transport is.
#[derive(Debug, Clone)]
pub struct Translator<T = UreqTransport> {
    client: DeepLClient,
    transport: T,
}

impl Translator {
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let client = DeepLClient::from_config(config)?;
        Ok(Self::with_transport(client, UreqTransport::new(config.timeout())))
    }

    /// See `ClientConfig::from_env` for the variables read.
    pub fn from_env() -> Result<Self> {
        Self::from_config(&ClientConfig::from_env()?)
    }
}

impl<T: Transport> Translator<T> {
    pub fn with_transport(client: DeepLClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &DeepLClient {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut DeepLClient {
        &mut self.client
    }

    pub fn translate(&self, request: &TranslationRequest) -> Result<TranslationResponse> {
        let request = self.client.build_translate(request)?;
        self.client.parse_translate(self.send(request)?)
    }

    /// Translates a single string with default options.
    pub fn translate_text(&self, text: &str, target_lang: Language) -> Result<String> {
        let response = self.translate(&TranslationRequest::new(text, target_lang))?;
        response
            .translations
            .into_iter()
            .next()
            .map(|translation| translation.text)
            .ok_or_else(|| Error::MalformedResponse("response contained no translations".to_string()))
    }

    pub fn usage(&self) -> Result<Usage> {
        let request = self.client.build_usage();
        self.client.parse_usage(self.send(request)?)
    }

    pub fn start_document_translation(&self, request: &DocumentTranslationRequest) -> Result<DocumentHandle> {
        let request = self.client.build_start_document(request)?;
        let handle = self.client.parse_start_document(self.send(request)?)?;
        debug!(document_id = %handle.document_id, "document uploaded");
        Ok(handle)
    }

    pub fn check_document_status(&self, handle: &DocumentHandle) -> Result<DocumentTranslationStatus> {
        let request = self.client.build_document_status(handle)?;
        self.client.parse_document_status(self.send(request)?)
    }

    /// Fetches the translated file. The server only serves it once the job
    /// is `done`; earlier calls fail with the server's answer.
    pub fn download_translated_document(&self, handle: &DocumentHandle) -> Result<Vec<u8>> {
        let request = self.client.build_download_document(handle)?;
        self.client.parse_download_document(self.send(request)?)
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self.transport.execute(request)?;
        debug!(status = response.status, "received response");
        Ok(response)
    }
}
