/*!
 * Tests for provider request building and response handling
 */

use serde_json::json;
use subtrans::app_config::{OpenAIConfig, ProvidersConfig, TranslationProvider};
use subtrans::errors::ProviderError;
use subtrans::providers::google::{Google, GoogleRequest, GoogleResponse};
use subtrans::providers::mymemory::{language_pair, MyMemory};
use subtrans::providers::openai::{build_system_prompt, OpenAI, OpenAIResponse};
use subtrans::providers::{ProviderClient, TranslationBackend};

/// The Google request body asks for plain text output
#[test]
fn test_google_request_shouldSerializeWithTextFormat() {
    let request = GoogleRequest::new("Hello", "en", "zh");
    let value = serde_json::to_value(&request).unwrap();

    assert_eq!(value, json!({"q": "Hello", "source": "en", "target": "zh", "format": "text"}));
}

/// The first translation is taken from a Google response
#[test]
fn test_google_response_shouldExtractFirstTranslation() {
    let response: GoogleResponse = serde_json::from_value(json!({
        "data": {"translations": [{"translatedText": "你好", "detectedSourceLanguage": "en"}]}
    }))
    .unwrap();
    assert_eq!(Google::extract_text(&response).as_deref(), Some("你好"));

    let empty: GoogleResponse = serde_json::from_value(json!({"data": {"translations": []}})).unwrap();
    assert_eq!(Google::extract_text(&empty), None);
}

/// The system prompt names both languages in plain English
#[test]
fn test_build_system_prompt_shouldNameBothLanguages() {
    let prompt = build_system_prompt("en", "zh");

    assert!(prompt.contains("English"));
    assert!(prompt.contains("Chinese"));
    assert!(prompt.contains("only"));
}

/// The OpenAI request carries the configured decoding settings
#[test]
fn test_openai_build_request_shouldUseConfiguredSettings() {
    let client = OpenAI::new(OpenAIConfig::default());
    let request = client.build_request("Good morning", "en", "fr");
    let value = serde_json::to_value(&request).unwrap();

    assert_eq!(value["model"], "gpt-3.5-turbo");
    assert_eq!(value["max_tokens"], 4000);
    assert!((value["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    assert_eq!(value["messages"][0]["role"], "system");
    assert_eq!(value["messages"][1]["role"], "user");
    assert_eq!(value["messages"][1]["content"], "Good morning");
}

/// Empty or absent completions fall back to the original text
#[test]
fn test_openai_extract_text_or_original_withEmptyContent_shouldReturnOriginal() {
    let null_content: OpenAIResponse =
        serde_json::from_value(json!({"choices": [{"message": {"role": "assistant", "content": null}}]})).unwrap();
    assert_eq!(OpenAI::extract_text_or_original(&null_content, "Bonjour"), "Bonjour");

    let blank_content: OpenAIResponse =
        serde_json::from_value(json!({"choices": [{"message": {"content": "   "}}]})).unwrap();
    assert_eq!(OpenAI::extract_text_or_original(&blank_content, "Bonjour"), "Bonjour");

    let no_choices: OpenAIResponse = serde_json::from_value(json!({"choices": []})).unwrap();
    assert_eq!(OpenAI::extract_text_or_original(&no_choices, "Bonjour"), "Bonjour");

    let answered: OpenAIResponse =
        serde_json::from_value(json!({"choices": [{"message": {"content": " Hello \n"}}]})).unwrap();
    assert_eq!(OpenAI::extract_text_or_original(&answered, "Bonjour"), "Hello");
}

/// MyMemory reads responseData.translatedText and reports quota problems
#[test]
fn test_mymemory_extract_text_shouldHandleBodyStatus() {
    assert_eq!(language_pair("en", "zh"), "en|zh");

    let ok = json!({"responseData": {"translatedText": "Hola"}, "responseStatus": 200});
    assert_eq!(MyMemory::extract_text(&ok).unwrap(), "Hola");

    let forbidden = json!({"responseData": {"translatedText": ""}, "responseStatus": 403, "responseDetails": "INVALID LANGUAGE PAIR"});
    assert!(matches!(MyMemory::extract_text(&forbidden), Err(ProviderError::AuthenticationError(_))));

    let server_error = json!({"responseStatus": 500, "responseDetails": "oops"});
    assert!(matches!(
        MyMemory::extract_text(&server_error),
        Err(ProviderError::ApiError { status_code: 500, .. })
    ));

    let missing = json!({"responseStatus": 200});
    assert!(matches!(MyMemory::extract_text(&missing), Err(ProviderError::ParseError(_))));
}

/// HTTP statuses map onto the error kinds
#[test]
fn test_provider_error_from_status_shouldClassifyStatuses() {
    assert!(matches!(
        ProviderError::from_status("X", 401, String::new()),
        ProviderError::AuthenticationError(_)
    ));
    assert!(matches!(
        ProviderError::from_status("X", 429, String::new()),
        ProviderError::RateLimitExceeded(_)
    ));
    assert!(matches!(
        ProviderError::from_status("X", 502, "bad gateway".to_string()),
        ProviderError::ApiError { status_code: 502, .. }
    ));
}

/// Timeouts have their own message
#[test]
fn test_provider_error_timeout_shouldBeDistinguishable() {
    let timeout = ProviderError::Timeout {
        provider: "MyMemory".to_string(),
        timeout_secs: 20,
    };

    assert!(timeout.is_timeout());
    assert_eq!(timeout.to_string(), "MyMemory request timed out after 20s");
    assert!(!ProviderError::ConnectionError("refused".to_string()).is_timeout());
}

/// Every provider identifier builds its own client
#[test]
fn test_provider_client_from_config_shouldMatchProvider() {
    let config = ProvidersConfig::default();

    let names: Vec<String> = TranslationProvider::ALL
        .iter()
        .map(|provider| ProviderClient::from_config(*provider, &config).name().to_string())
        .collect();

    assert_eq!(names, vec!["Google Translate", "OpenAI", "MyMemory"]);
}
