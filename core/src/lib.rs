//! Synchronous client for the DeepL translation API.
//!
//! # Overview
//! Text translation, document translation (upload, poll, download) and
//! usage reporting as typed calls.
//!
//! # Design
//! - `DeepLClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network (host-does-IO pattern).
//! - `Translator` pairs it with a `Transport`; `UreqTransport` is the default.
//! - Requests are validated before anything is sent. Non-200 answers are
//!   classified into `ApiError`, transport failures are kept separate.
//! - Document polling is left to the caller.
//!
//! ```no_run
//! use deepl_client::{Language, Translator};
//!
//! # fn main() -> deepl_client::Result<()> {
//! let translator = Translator::from_env()?;
//! let text = translator.translate_text("Hallo Welt!", Language::En)?;
//! println!("{text}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
mod encode;
pub mod error;
pub mod http;
pub mod language;
pub mod transport;
pub mod translator;
pub mod types;

pub use client::DeepLClient;
pub use config::{ClientConfig, FREE_ENDPOINT, PRO_ENDPOINT};
pub use encode::MAX_FORM_BODY_SIZE;
pub use error::{ApiError, ConfigError, Error, Result, TransportError, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use language::{DetectedLanguage, Formality, Language, UnknownLanguage};
pub use transport::{Transport, UreqTransport};
pub use translator::Translator;
pub use types::{
    DocumentHandle, DocumentStatus, DocumentTranslationRequest, DocumentTranslationStatus,
    Translation, TranslationRequest, TranslationResponse, Usage,
};
