//! Wiremock tests for the remote chat-completions client.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shotterms::providers::RemoteInference;
use shotterms::{
    AngleHeight, Lighting, RemoteClient, RemoteConfig, ShotSize, ShotTermsError,
};

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn sends_chat_request_and_parses_terms() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "temperature": 0.1,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system" },
                { "role": "user", "content": "人物站在街道中央看向远方" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"shotSize":"远景(LS)","angleHeight":"平视(Eye Level)","lighting":"natural light","description":"人物站在街道中央","confidence":0.92}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = RemoteClient::with_base_url("sk-test", server.uri());
    let terms = client.parse("人物站在街道中央看向远方").await.unwrap();

    assert_eq!(terms.shot_size, Some(ShotSize::LongShot));
    assert_eq!(terms.angle_height, Some(AngleHeight::EyeLevel));
    assert_eq!(terms.lighting, Some(Lighting::Natural));
    assert_eq!(terms.description.as_deref(), Some("人物站在街道中央"));
    assert_eq!(terms.confidence, 0.92);
}

#[tokio::test]
async fn requests_configured_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({ "model": "shot-parser" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("{}")))
        .expect(1)
        .mount(&server)
        .await;

    let config = RemoteConfig::new()
        .service_credential("sk-test")
        .base_url(format!("{}/v1/", server.uri()))
        .model("shot-parser");
    let terms = RemoteClient::new(&config).parse("x").await.unwrap();

    // absent confidence falls back to the default
    assert_eq!(terms.confidence, 0.8);
    assert_eq!(terms.shot_size, None);
}

#[tokio::test]
async fn non_success_status_is_service_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let client = RemoteClient::with_base_url("sk-test", server.uri());
    let err = client.parse("x").await.unwrap_err();

    assert!(matches!(err, ShotTermsError::ServiceUnavailable(_)));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn unparsable_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let client = RemoteClient::with_base_url("sk-test", server.uri());
    let err = client.parse("x").await.unwrap_err();
    assert!(matches!(err, ShotTermsError::MalformedResponse(_)));
}

#[tokio::test]
async fn prose_content_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion("I think it is a medium shot.")),
        )
        .mount(&server)
        .await;

    let client = RemoteClient::with_base_url("sk-test", server.uri());
    let err = client.parse("x").await.unwrap_err();
    assert!(matches!(err, ShotTermsError::MalformedResponse(_)));
    assert!(err.is_service_failure());
}

#[tokio::test]
async fn empty_choices_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let client = RemoteClient::with_base_url("sk-test", server.uri());
    assert!(matches!(
        client.parse("x").await,
        Err(ShotTermsError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn fenced_content_with_unknown_values() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "```json\n{\"shotSize\":\"cinematic vista\",\"lighting\":\"逆光\",\"confidence\":1.7}\n```",
        )))
        .mount(&server)
        .await;

    let client = RemoteClient::with_base_url("sk-test", server.uri());
    let terms = client.parse("x").await.unwrap();

    assert_eq!(terms.shot_size, None);
    assert_eq!(terms.lighting, Some(Lighting::Backlight));
    assert_eq!(terms.confidence, 1.0);
}

#[tokio::test]
async fn missing_credential_fails_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("{}")))
        .expect(0)
        .mount(&server)
        .await;

    let client = RemoteClient::new(&RemoteConfig::new().base_url(server.uri()));
    let err = client.parse("x").await.unwrap_err();
    assert!(matches!(err, ShotTermsError::ServiceUnavailable(_)));
}

#[tokio::test]
async fn unreachable_service_is_unavailable() {
    // nothing listens on port 9 (discard) in test environments
    let client = RemoteClient::with_base_url("sk-test", "http://127.0.0.1:9");
    let err = client.parse("x").await.unwrap_err();
    assert!(matches!(err, ShotTermsError::ServiceUnavailable(_)));
}
