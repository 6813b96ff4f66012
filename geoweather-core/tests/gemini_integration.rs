//! Integration tests for GeminiProvider using wiremock.

use geoweather_core::{Coordinate, GeminiProvider, WeatherError, WeatherProvider};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn provider(server: &MockServer) -> GeminiProvider {
    GeminiProvider::new("test-key".into()).with_base_url(server.uri())
}

fn candidate(text: &str, chunks: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "groundingMetadata": { "groundingChunks": chunks }
        }]
    })
}

fn singapore() -> Coordinate {
    Coordinate::new(1.234567, 103.456789).unwrap()
}

#[tokio::test]
async fn test_weather_success_with_grounding() {
    let mock_server = MockServer::start().await;

    let text = "```json\n{\"locationName\":\"Singapore\",\"condition\":\"Clear\",\"temperature\":\"30°C\",\"humidity\":\"70%\",\"wind\":\"5 km/h\",\"source\":\"NEA\"}\n```";

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(serde_json::json!({ "tools": [{ "google_search": {} }] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(
            text,
            serde_json::json!([
                { "web": { "uri": "https://www.weather.gov.sg", "title": "weather.gov.sg" } },
                { "web": { "uri": "", "title": "empty" } }
            ]),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = provider(&mock_server).get_weather(&singapore()).await.unwrap();

    assert_eq!(result.details.location_name, "Singapore");
    assert_eq!(result.details.source, vec!["NEA".to_string()]);
    assert_eq!(result.raw_text, text);
    assert_eq!(result.grounding_sources.len(), 1);
    assert_eq!(result.grounding_sources[0].uri, "https://www.weather.gov.sg");
    assert_eq!(result.coordinate, singapore());
}

#[tokio::test]
async fn test_prompt_contains_coordinates() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(
            "{\"locationName\":\"Somewhere\"}",
            serde_json::json!([]),
        )))
        .mount(&mock_server)
        .await;

    provider(&mock_server).get_weather(&singapore()).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("1.234567"));
    assert!(prompt.contains("103.456789"));
}

#[tokio::test]
async fn test_non_json_answer_is_invalid_format() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(
            "It is sunny and warm today.",
            serde_json::json!([]),
        )))
        .mount(&mock_server)
        .await;

    let err = provider(&mock_server).get_weather(&singapore()).await.unwrap_err();
    match err {
        WeatherError::InvalidResponseFormat { snippet } => {
            assert_eq!(snippet, "It is sunny and warm today.");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_api_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        })))
        .mount(&mock_server)
        .await;

    let err = provider(&mock_server).get_weather(&singapore()).await.unwrap_err();
    assert!(matches!(err, WeatherError::Credential(_)), "got {err:?}");
}

#[tokio::test]
async fn test_quota_exceeded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": { "code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED" }
        })))
        .mount(&mock_server)
        .await;

    let err = provider(&mock_server).get_weather(&singapore()).await.unwrap_err();
    assert!(matches!(err, WeatherError::QuotaExceeded(_)), "got {err:?}");
}

#[tokio::test]
async fn test_invalid_argument() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": { "code": 400, "message": "Tool use is unsupported", "status": "INVALID_ARGUMENT" }
        })))
        .mount(&mock_server)
        .await;

    let err = provider(&mock_server).get_weather(&singapore()).await.unwrap_err();
    assert!(matches!(err, WeatherError::InvalidRequest(_)), "got {err:?}");
    assert!(err.user_message().contains("Tool use is unsupported"));
}

#[tokio::test]
async fn test_server_error_is_generic_and_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = provider(&mock_server).get_weather(&singapore()).await.unwrap_err();
    assert!(matches!(err, WeatherError::Generic(_)), "got {err:?}");
    assert!(err.user_message().starts_with("Failed to fetch weather data."));
}
