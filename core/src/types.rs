//! Request and response types for the DeepL endpoints.
//!
//! # Design
//! Request types are plain structs with public fields so callers can use
//! struct-update syntax; required fields are checked when the request is
//! built, not here. Response types mirror the JSON the API returns and are
//! decoded strictly.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::language::{DetectedLanguage, Formality, Language};

/// Payload of a text translation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationRequest {
    /// Text segments to translate. Each segment may contain several
    /// sentences; translations come back in the same order.
    pub text: Vec<String>,
    /// Language of the input. `None` lets the API detect it.
    pub source_lang: Option<Language>,
    /// Language to translate into. Required.
    pub target_lang: Option<Language>,
    /// Kinds of tags to handle, e.g. `xml`.
    pub tag_handling: Vec<String>,
    /// XML tags which never split sentences.
    pub non_splitting_tags: Vec<String>,
    /// XML tags whose content is never translated.
    pub ignore_tags: Vec<String>,
    /// Stop the engine from splitting the input into sentences. Useful when
    /// every segment already is exactly one sentence.
    pub do_not_split_sentences: bool,
    /// Keep punctuation and casing at sentence boundaries as they are.
    pub preserve_formatting: bool,
    pub formality: Option<Formality>,
    /// Glossary to apply. The server rejects it unless `source_lang` is set
    /// and matches the glossary's language pair.
    pub glossary_id: Option<String>,
}

impl TranslationRequest {
    /// Single-segment request with everything else defaulted.
    pub fn new(text: impl Into<String>, target_lang: Language) -> Self {
        Self {
            text: vec![text.into()],
            target_lang: Some(target_lang),
            ..Self::default()
        }
    }
}

/// One translated segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub detected_source_language: DetectedLanguage,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub translations: Vec<Translation>,
}

/// Character usage for the current billing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub character_count: u64,
    pub character_limit: u64,
}

impl Usage {
    pub fn remaining(&self) -> u64 {
        self.character_limit.saturating_sub(self.character_count)
    }

    pub fn limit_reached(&self) -> bool {
        self.character_count >= self.character_limit
    }
}

/// Payload of a document upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentTranslationRequest {
    /// Raw file content. The server accepts .docx, .pptx, .pdf, .htm(l)
    /// and .txt and picks the format from `filename`.
    pub file: Vec<u8>,
    pub filename: String,
    pub source_lang: Option<Language>,
    pub target_lang: Option<Language>,
    pub formality: Option<Formality>,
    pub glossary_id: Option<String>,
}

impl DocumentTranslationRequest {
    pub fn new(file: impl Into<Vec<u8>>, filename: impl Into<String>, target_lang: Language) -> Self {
        Self {
            file: file.into(),
            filename: filename.into(),
            target_lang: Some(target_lang),
            ..Self::default()
        }
    }

    /// Reads `path` and uses its final component as the filename.
    pub fn from_path(path: impl AsRef<Path>, target_lang: Language) -> io::Result<Self> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} has no usable file name", path.display()),
                )
            })?;
        let file = std::fs::read(path)?;
        Ok(Self::new(file, filename, target_lang))
    }
}

/// Identifies an uploaded document. The key decrypts the document on the
/// server and is not stored anywhere by the client: keep it to poll and
/// download.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentHandle {
    pub document_id: String,
    pub document_key: String,
}

/// Server-side state of a document job: `queued -> translating -> done | error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Queued,
    Translating,
    Done,
    Error,
}

impl DocumentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, DocumentStatus::Done | DocumentStatus::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTranslationStatus {
    pub document_id: String,
    pub status: DocumentStatus,
    /// Estimated time until the translation is done.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds_remaining: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billed_characters: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl DocumentTranslationStatus {
    pub fn is_done(&self) -> bool {
        self.status == DocumentStatus::Done
    }
}
