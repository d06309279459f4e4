use docqa_model::{ChatModel, GeminiChatModel, ModelError};

#[tokio::test]
async fn test_gemini_model_creation() {
    let result = GeminiChatModel::new("test-api-key", "gemini-2.5-flash");
    assert!(result.is_ok());

    let model = result.unwrap();
    assert_eq!(model.name(), "gemini-2.5-flash");
}

#[tokio::test]
async fn test_prefixed_model_name_is_reported_bare() {
    let model = GeminiChatModel::new("test-api-key", "models/gemini-2.5-pro").unwrap();
    assert_eq!(model.name(), "gemini-2.5-pro");
}

#[test]
fn test_invalid_api_key_is_a_client_error() {
    let err = GeminiChatModel::new("bad\nkey", "gemini-2.5-flash").err().unwrap();
    assert!(matches!(err, ModelError::Client { model, .. } if model == "gemini-2.5-flash"));
}

#[test]
fn test_empty_response_mentions_reason() {
    let err = ModelError::EmptyResponse { model: "m".into(), reason: Some("SAFETY".into()) };
    assert_eq!(err.to_string(), "m: empty response (SAFETY)");
    let err = ModelError::EmptyResponse { model: "m".into(), reason: None };
    assert_eq!(err.to_string(), "m: empty response");
}
