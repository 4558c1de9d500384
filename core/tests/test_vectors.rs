//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Form bodies are compared as decoded pairs so
//! percent-encoding choices do not cause false negatives.

use deepl_client::{
    DeepLClient, DocumentHandle, DocumentTranslationStatus, Error, Formality, HttpMethod,
    HttpRequest, HttpResponse, Language, TranslationRequest, Usage,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

fn client() -> DeepLClient {
    DeepLClient::new(BASE_URL, "test-key").unwrap()
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

fn strings(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| items.iter().map(|v| v.as_str().unwrap().to_string()).collect())
        .unwrap_or_default()
}

fn pairs(value: &Value) -> Vec<(String, String)> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|pair| {
            let arr = pair.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect()
}

fn language(value: &Value) -> Option<Language> {
    value.as_str().map(|code| code.parse().unwrap())
}

fn translation_request(input: &Value) -> TranslationRequest {
    TranslationRequest {
        text: strings(&input["text"]),
        source_lang: language(&input["source_lang"]),
        target_lang: language(&input["target_lang"]),
        tag_handling: strings(&input["tag_handling"]),
        non_splitting_tags: strings(&input["non_splitting_tags"]),
        ignore_tags: strings(&input["ignore_tags"]),
        do_not_split_sentences: input["do_not_split_sentences"].as_bool().unwrap_or(false),
        preserve_formatting: input["preserve_formatting"].as_bool().unwrap_or(false),
        formality: input["formality"].as_str().map(|f| match f {
            "default" => Formality::Default,
            "more" => Formality::More,
            "less" => Formality::Less,
            other => panic!("unknown formality: {other}"),
        }),
        glossary_id: input["glossary_id"].as_str().map(str::to_string),
    }
}

fn assert_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: url");
    assert_eq!(req.headers, pairs(&expected["headers"]), "{name}: headers");
    match expected.get("form") {
        Some(form) => {
            let sent: Vec<(String, String)> =
                url::form_urlencoded::parse(req.body.as_deref().unwrap()).into_owned().collect();
            assert_eq!(sent, pairs(form), "{name}: form body");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse::from_bytes(
        sim["status"].as_u64().unwrap() as u16,
        sim["body"].as_str().unwrap(),
    )
}

fn assert_api_error(name: &str, err: Error, expected: &Value) {
    match err {
        Error::Api(api) => {
            assert_eq!(u64::from(api.status()), expected["status"].as_u64().unwrap(), "{name}: status");
            assert_eq!(api.message(), expected["message"].as_str(), "{name}: message");
        }
        other => panic!("{name}: expected API error, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Translate
// ---------------------------------------------------------------------------

#[test]
fn translate_test_vectors() {
    let raw = include_str!("../../test-vectors/translate.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();

        // Verify build
        let req = c.build_translate(&translation_request(&case["input"])).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        // Verify parse
        let result = c.parse_translate(simulated(case));
        if let Some(expected_error) = case.get("expected_error") {
            assert_api_error(name, result.unwrap_err(), expected_error);
            continue;
        }
        let parsed: Vec<(String, String)> = result
            .unwrap()
            .translations
            .into_iter()
            .map(|t| (t.detected_source_language.to_string(), t.text))
            .collect();
        assert_eq!(parsed, pairs(&case["expected_result"]), "{name}: parsed result");
    }
}

// ---------------------------------------------------------------------------
// Usage
// ---------------------------------------------------------------------------

#[test]
fn usage_test_vectors() {
    let raw = include_str!("../../test-vectors/usage.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();

        let req = c.build_usage();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_usage(simulated(case));
        if let Some(expected_error) = case.get("expected_error") {
            assert_api_error(name, result.unwrap_err(), expected_error);
            continue;
        }
        let expected: Usage = serde_json::from_value(case["expected_result"].clone()).unwrap();
        assert_eq!(result.unwrap(), expected, "{name}: parsed result");
    }
}

// ---------------------------------------------------------------------------
// Document status
// ---------------------------------------------------------------------------

#[test]
fn document_status_test_vectors() {
    let raw = include_str!("../../test-vectors/document_status.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    let handle: DocumentHandle = serde_json::from_value(vectors["handle"].clone()).unwrap();
    let req = c.build_document_status(&handle).unwrap();
    assert_request("status request", &req, &vectors["expected_request"]);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let result = c.parse_document_status(simulated(case));

        if let Some(expected_error) = case.get("expected_error") {
            assert_api_error(name, result.unwrap_err(), expected_error);
        } else if let Some(expected_message) = case.get("expected_document_error") {
            match result.unwrap_err() {
                Error::DocumentTranslation { message } => {
                    assert_eq!(message, expected_message.as_str().unwrap(), "{name}: message")
                }
                other => panic!("{name}: expected document error, got {other:?}"),
            }
        } else {
            let expected: DocumentTranslationStatus =
                serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}
