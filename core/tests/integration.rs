//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every operation
//! over real HTTP through `UreqTransport`, checking that request building,
//! status classification and response parsing agree with the server.

use std::time::Duration;

use deepl_client::{
    ApiError, ClientConfig, DeepLClient, DocumentStatus, DocumentTranslationRequest, Error,
    Language, TranslationRequest, Translator, UreqTransport,
};
use mock_server::{MockConfig, DEFAULT_AUTH_KEY};

/// Start a mock server on a random port and return its base URL.
fn start_server(config: MockConfig) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with(listener, config).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn translator(base_url: &str, auth_key: &str) -> Translator {
    let config = ClientConfig {
        endpoint_url: Some(base_url.to_string()),
        timeout_secs: 10,
        ..ClientConfig::new(auth_key)
    };
    Translator::from_config(&config).unwrap()
}

#[test]
fn translate_and_usage() {
    let base_url = start_server(MockConfig::default());
    let translator = translator(&base_url, DEFAULT_AUTH_KEY);

    // Step 1: fresh account.
    let usage = translator.usage().unwrap();
    assert_eq!(usage.character_count, 0);
    assert_eq!(usage.character_limit, 500_000);

    // Step 2: single segment.
    let text = translator.translate_text("Hallo Welt!", Language::En).unwrap();
    assert_eq!(text, "Hello World!");

    // Step 3: several segments keep their order.
    let request = TranslationRequest {
        text: vec!["eins".to_string(), "zwei".to_string()],
        source_lang: Some(Language::De),
        target_lang: Some(Language::Fr),
        ..TranslationRequest::default()
    };
    let response = translator.translate(&request).unwrap();
    let texts: Vec<&str> = response.translations.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["[FR] eins", "[FR] zwei"]);
    assert!(response
        .translations
        .iter()
        .all(|t| t.detected_source_language == Language::De));

    // Step 4: usage reflects both calls.
    let usage = translator.usage().unwrap();
    assert_eq!(usage.character_count, 11 + 4 + 4);
}

#[test]
fn document_lifecycle() {
    let base_url = start_server(MockConfig::default());
    let translator = translator(&base_url, DEFAULT_AUTH_KEY);

    // Step 1: upload.
    let request = DocumentTranslationRequest::new(b"Hallo Welt!".to_vec(), "greeting.txt", Language::En);
    let handle = translator.start_document_translation(&request).unwrap();
    assert!(!handle.document_id.is_empty());
    assert!(!handle.document_key.is_empty());

    // Step 2: downloading before the job is done is refused.
    let err = translator.download_translated_document(&handle).unwrap_err();
    assert!(matches!(err, Error::Api(ApiError::UnexpectedStatus(503))));

    // Step 3: poll until done, as a caller would.
    let mut seen = Vec::new();
    loop {
        let status = translator.check_document_status(&handle).unwrap();
        seen.push(status.status);
        if status.status.is_terminal() {
            assert_eq!(status.billed_characters, Some(11));
            break;
        }
        assert!(seen.len() < 10, "document never finished: {seen:?}");
        std::thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(
        seen,
        vec![DocumentStatus::Queued, DocumentStatus::Translating, DocumentStatus::Done]
    );

    // Step 4: download.
    let bytes = translator.download_translated_document(&handle).unwrap();
    assert_eq!(bytes, b"Hello World!");

    // Step 5: the document is gone afterwards.
    let err = translator.check_document_status(&handle).unwrap_err();
    assert!(matches!(err, Error::Api(ApiError::NotFound(Some(_)))));
}

#[test]
fn failed_document_surfaces_server_message() {
    let base_url = start_server(MockConfig::default());
    let translator = translator(&base_url, DEFAULT_AUTH_KEY);

    let request = DocumentTranslationRequest::new(vec![0xff, 0xfe, 0x00], "binary.txt", Language::De);
    let handle = translator.start_document_translation(&request).unwrap();

    match translator.check_document_status(&handle).unwrap_err() {
        Error::DocumentTranslation { message } => {
            assert_eq!(message, "Source file could not be decoded")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn server_errors_are_classified() {
    let base_url = start_server(MockConfig {
        character_limit: 20,
        ..MockConfig::default()
    });

    let unauthorized = translator(&base_url, "wrong-key");
    match unauthorized.usage().unwrap_err() {
        Error::Api(ApiError::AuthFailed(message)) => {
            assert_eq!(message.as_deref(), Some("Invalid authentication key"))
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let translator = translator(&base_url, DEFAULT_AUTH_KEY);
    let err = translator
        .translate(&TranslationRequest::new("a".repeat(21), Language::En))
        .unwrap_err();
    assert!(matches!(err, Error::Api(ApiError::QuotaExceeded(_))));

    let glossary = TranslationRequest {
        glossary_id: Some("g-1".to_string()),
        ..TranslationRequest::new("Hallo", Language::En)
    };
    match translator.translate(&glossary).unwrap_err() {
        Error::Api(ApiError::WrongRequest(message)) => assert_eq!(
            message.as_deref(),
            Some("Use of a glossary requires the source_lang parameter to be set.")
        ),
        other => panic!("unexpected error: {other:?}"),
    }

    let request = DocumentTranslationRequest::new(b"data".to_vec(), "image.png", Language::En);
    match translator.start_document_translation(&request).unwrap_err() {
        Error::Api(ApiError::WrongRequest(message)) => {
            assert_eq!(message.as_deref(), Some("Invalid file data."))
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unreachable_server_is_a_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = DeepLClient::new(&format!("http://127.0.0.1:{port}"), "k").unwrap();
    let translator = Translator::with_transport(client, UreqTransport::new(Duration::from_secs(2)));

    let err = translator.usage().unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "{err:?}");
}
