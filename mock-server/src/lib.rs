//! In-memory emulation of the DeepL v2 endpoints used by the client.
//!
//! Translations are canned: a small phrase table, otherwise the input tagged
//! with the target language. Each status poll reports the current state of
//! a document and then advances it (`queued -> translating -> done`);
//! documents are removed once downloaded.

use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const DEFAULT_AUTH_KEY: &str = "mock-auth-key";

const LANGUAGES: &[&str] = &[
    "BG", "CS", "DA", "DE", "EL", "EN", "EN-GB", "EN-US", "ES", "ET", "FI", "FR", "HU", "ID", "IT",
    "JA", "LT", "LV", "NL", "PL", "PT", "PT-BR", "PT-PT", "RO", "RU", "SK", "SL", "SV", "TR", "UK",
    "ZH",
];

const DOCUMENT_EXTENSIONS: &[&str] = &["docx", "pptx", "pdf", "htm", "html", "txt"];

const PHRASES: &[(&str, &str, &str)] = &[
    ("Hallo Welt!", "EN", "Hello World!"),
    ("Guten Morgen", "EN", "Good morning"),
    ("Hello World!", "DE", "Hallo Welt!"),
];

/// Server behaviour knobs.
#[derive(Clone, Debug)]
pub struct MockConfig {
    pub auth_key: String,
    pub character_limit: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            auth_key: DEFAULT_AUTH_KEY.to_string(),
            character_limit: 500_000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Translating,
    Done,
    Error,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TranslationOut {
    pub detected_source_language: String,
    pub text: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub translations: Vec<TranslationOut>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UsageResponse {
    pub character_count: u64,
    pub character_limit: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentCreated {
    pub document_id: String,
    pub document_key: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentState {
    pub document_id: String,
    pub status: JobState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds_remaining: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billed_characters: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug)]
struct Job {
    key: String,
    state: JobState,
    target_lang: String,
    content: String,
    error_message: Option<String>,
}

#[derive(Debug, Default)]
struct Ledger {
    character_count: u64,
    jobs: HashMap<String, Job>,
}

#[derive(Clone)]
struct AppState {
    config: Arc<MockConfig>,
    ledger: Arc<RwLock<Ledger>>,
}

/// Error answer in DeepL's `{"message": ...}` shape.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    message: String,
}

impl ApiFailure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn quota_exceeded() -> Self {
        let status = StatusCode::from_u16(456).unwrap_or(StatusCode::TOO_MANY_REQUESTS);
        Self::new(status, "Quota Exceeded")
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "message": self.message });
        (self.status, Json(body)).into_response()
    }
}

pub fn app() -> Router {
    app_with(MockConfig::default())
}

pub fn app_with(config: MockConfig) -> Router {
    let state = AppState {
        config: Arc::new(config),
        ledger: Arc::new(RwLock::new(Ledger::default())),
    };
    Router::new()
        .route("/translate", post(translate))
        .route("/usage", get(usage))
        .route("/document", post(start_document))
        .route("/document/{id}", post(document_status))
        .route("/document/{id}/result", post(download_document))
        .with_state(state)
}

pub async fn run_with(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(config)).await
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiFailure> {
    let expected = format!("DeepL-Auth-Key {}", state.config.auth_key);
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(ApiFailure::new(StatusCode::FORBIDDEN, "Invalid authentication key")),
    }
}

fn form_values(body: &[u8]) -> Vec<(String, String)> {
    url::form_urlencoded::parse(body).into_owned().collect()
}

fn first<'a>(values: &'a [(String, String)], name: &str) -> Option<&'a str> {
    values
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn checked_language(value: Option<&str>, name: &str) -> Result<Option<String>, ApiFailure> {
    match value {
        None => Ok(None),
        Some(code) if LANGUAGES.contains(&code.to_ascii_uppercase().as_str()) => {
            Ok(Some(code.to_ascii_uppercase()))
        }
        Some(_) => Err(ApiFailure::bad_request(format!("Value for '{name}' not supported."))),
    }
}

/// Canned translation used for text and documents alike.
pub fn mock_translate(text: &str, target_lang: &str) -> String {
    PHRASES
        .iter()
        .find(|(source, target, _)| *source == text && *target == target_lang)
        .map(|(_, _, translated)| translated.to_string())
        .unwrap_or_else(|| format!("[{target_lang}] {text}"))
}

fn charge(ledger: &mut Ledger, limit: u64, characters: u64) -> Result<(), ApiFailure> {
    if ledger.character_count + characters > limit {
        return Err(ApiFailure::quota_exceeded());
    }
    ledger.character_count += characters;
    Ok(())
}

async fn translate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TranslateResponse>, ApiFailure> {
    authorize(&state, &headers)?;
    let values = form_values(&body);

    let texts: Vec<&str> = values
        .iter()
        .filter(|(k, _)| k == "text")
        .map(|(_, v)| v.as_str())
        .collect();
    if texts.is_empty() {
        return Err(ApiFailure::bad_request("Parameter 'text' not specified."));
    }
    let target_lang = checked_language(first(&values, "target_lang"), "target_lang")?
        .ok_or_else(|| ApiFailure::bad_request("Parameter 'target_lang' not specified."))?;
    let source_lang = checked_language(first(&values, "source_lang"), "source_lang")?;
    if first(&values, "glossary_id").is_some() && source_lang.is_none() {
        return Err(ApiFailure::bad_request(
            "Use of a glossary requires the source_lang parameter to be set.",
        ));
    }

    let characters: u64 = texts.iter().map(|t| t.chars().count() as u64).sum();
    charge(&mut *state.ledger.write().await, state.config.character_limit, characters)?;

    let detected = source_lang.unwrap_or_else(|| "DE".to_string());
    let translations = texts
        .iter()
        .map(|text| TranslationOut {
            detected_source_language: detected.clone(),
            text: mock_translate(text, &target_lang),
        })
        .collect();
    info!(segments = texts.len(), %target_lang, "translated text");
    Ok(Json(TranslateResponse { translations }))
}

async fn usage(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UsageResponse>, ApiFailure> {
    authorize(&state, &headers)?;
    let ledger = state.ledger.read().await;
    Ok(Json(UsageResponse {
        character_count: ledger.character_count,
        character_limit: state.config.character_limit,
    }))
}

async fn start_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<DocumentCreated>, ApiFailure> {
    authorize(&state, &headers)?;

    let mut file: Option<(String, Vec<u8>)> = None;
    let mut fields: Vec<(String, String)> = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiFailure::bad_request(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let filename = field.file_name().unwrap_or_default().to_string();
            let content = field
                .bytes()
                .await
                .map_err(|e| ApiFailure::bad_request(e.body_text()))?;
            file = Some((filename, content.to_vec()));
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ApiFailure::bad_request(e.body_text()))?;
            fields.push((name, value));
        }
    }

    let (filename, content) = file
        .filter(|(_, content)| !content.is_empty())
        .ok_or_else(|| ApiFailure::bad_request("Parameter 'file' not specified."))?;
    let extension = filename.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    if !extension.is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext.as_str())) {
        return Err(ApiFailure::bad_request("Invalid file data."));
    }
    let target_lang = checked_language(first(&fields, "target_lang"), "target_lang")?
        .ok_or_else(|| ApiFailure::bad_request("Parameter 'target_lang' not specified."))?;
    checked_language(first(&fields, "source_lang"), "source_lang")?;

    // Text files that are not UTF-8 fail during translation, not on upload.
    let (state_now, text, error_message) = match String::from_utf8(content) {
        Ok(text) => (JobState::Queued, text, None),
        Err(_) => (
            JobState::Error,
            String::new(),
            Some("Source file could not be decoded".to_string()),
        ),
    };

    let created = DocumentCreated {
        document_id: Uuid::new_v4().simple().to_string().to_uppercase(),
        document_key: Uuid::new_v4().simple().to_string().to_uppercase(),
    };
    let mut ledger = state.ledger.write().await;
    charge(
        &mut ledger,
        state.config.character_limit,
        text.chars().count() as u64,
    )?;
    ledger.jobs.insert(
        created.document_id.clone(),
        Job {
            key: created.document_key.clone(),
            state: state_now,
            target_lang,
            content: text,
            error_message,
        },
    );
    info!(document_id = %created.document_id, %filename, "document uploaded");
    Ok(Json(created))
}

fn find_job<'a>(
    ledger: &'a mut Ledger,
    id: &str,
    values: &[(String, String)],
) -> Result<&'a mut Job, ApiFailure> {
    let key = first(values, "document_key")
        .ok_or_else(|| ApiFailure::bad_request("Parameter 'document_key' not specified."))?;
    let job = ledger
        .jobs
        .get_mut(id)
        .ok_or_else(|| ApiFailure::new(StatusCode::NOT_FOUND, "Document not found"))?;
    if job.key != key {
        return Err(ApiFailure::bad_request("Invalid document key"));
    }
    Ok(job)
}

async fn document_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<DocumentState>, ApiFailure> {
    authorize(&state, &headers)?;
    let values = form_values(&body);
    let mut ledger = state.ledger.write().await;
    let job = find_job(&mut ledger, &id, &values)?;

    let current = job.state.clone();
    job.state = match current {
        JobState::Queued => JobState::Translating,
        JobState::Translating => JobState::Done,
        JobState::Done | JobState::Error => current.clone(),
    };
    let billed = job.content.chars().count() as u64;
    let response = DocumentState {
        document_id: id,
        seconds_remaining: (current == JobState::Translating).then_some(1),
        billed_characters: (current == JobState::Done).then_some(billed),
        status: current,
        error_message: job.error_message.clone(),
    };
    Ok(Json(response))
}

async fn download_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Vec<u8>, ApiFailure> {
    authorize(&state, &headers)?;
    let values = form_values(&body);
    let mut ledger = state.ledger.write().await;
    let job = find_job(&mut ledger, &id, &values)?;
    if job.state != JobState::Done {
        return Err(ApiFailure::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Document is not ready",
        ));
    }
    let translated = mock_translate(&job.content, &job.target_lang);
    ledger.jobs.remove(&id);
    info!(document_id = %id, "document downloaded");
    Ok(translated.into_bytes())
}
