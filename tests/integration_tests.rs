use std::time::Duration;

use mathlens::client::Client;
use mathlens::mime::MimeType;
use mathlens::model::{EncodedImage, SolveResponse, SolverPrompt, SolverResult};
use mathlens::providers::{gemini, Gemini, Provider};

#[test]
fn test_client_creation() {
    let client = Gemini::create("test-key".to_string(), "gemini-1.5-pro".to_string());
    assert_eq!(client.model_options().model, "gemini-1.5-pro");
    assert_eq!(
        client.transport_options().timeout(),
        Some(gemini::DEFAULT_TIMEOUT)
    );
    assert_eq!(gemini::DEFAULT_TIMEOUT, Duration::from_secs(60));
}

#[test]
fn test_prompt_construction() {
    let image = EncodedImage {
        mime_type: MimeType::Bmp,
        data: "Qk0=".to_string(),
    };
    let prompt = SolverPrompt::new("find the derivative of x^2", image.clone());

    assert_eq!(
        prompt.instruction,
        "Description: find the derivative of x^2. Analyze and solve/explain the math equation in this image."
    );
    assert_eq!(prompt.image, image);
}

#[test]
fn test_solve_response_shape() {
    let response = SolveResponse::from(SolverResult {
        text: "x = 5".to_string(),
    });
    assert_eq!(
        serde_json::to_string(&response).unwrap(),
        r#"{"result":"x = 5"}"#
    );
}
