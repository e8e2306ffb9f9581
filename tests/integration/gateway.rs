//! HTTP gateway against the mock server

use mockito::Matcher;
use serde_json::json;

use supertonic_client::gateway::{HttpGateway, SynthesisGateway};
use supertonic_client::{BatchRequest, Error, ErrorKind, SynthesisRequest};

use crate::mock_server::{test_config, wav_fixture, MockServerFixture};

fn request(text: &str, voice: Option<&str>) -> SynthesisRequest {
    SynthesisRequest {
        text: text.to_string(),
        quality_steps: 10,
        speed: 1.0,
        voice_identifier: voice.map(str::to_string),
    }
}

#[tokio::test]
async fn test_health_reports_service_state() {
    let fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let mock = fixture
        .mock_health(json!({
            "status": "healthy",
            "model_loaded": true,
            "default_voice": "M1.json",
            "available_voices": ["M1.json", "M2.json", "F1.json", "F2.json"]
        }))
        .await;

    let gateway = HttpGateway::new(&fixture.config(dir.path())).unwrap();
    let health = gateway.health().await.unwrap();

    assert_eq!(health.status, "healthy");
    assert!(health.model_loaded);
    assert_eq!(health.default_voice.as_deref(), Some("M1.json"));
    assert_eq!(health.available_voices.len(), 4);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_synthesize_sends_wire_body_and_decodes_audio() {
    let fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let audio = wav_fixture(3);
    let mock = fixture
        .mock_synthesize(
            json!({
                "text": "Hello world",
                "total_step": 10,
                "speed": 1.0,
                "voice_style": "F1.json",
            }),
            &audio,
        )
        .await;

    let gateway = HttpGateway::new(&fixture.config(dir.path())).unwrap();
    let result = gateway
        .synthesize_one(&request("Hello world", Some("F1.json")))
        .await
        .unwrap();

    assert_eq!(result.as_bytes(), audio.as_slice());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_service_error_carries_status_and_body() {
    let fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let _mock = fixture
        .mock_json_response("POST", "/synthesize", 500, r#"{"detail":"model not loaded"}"#)
        .await;

    let gateway = HttpGateway::new(&fixture.config(dir.path())).unwrap();
    let err = gateway.synthesize_one(&request("hi", None)).await.unwrap_err();

    match err {
        Error::Service { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("model not loaded"));
        }
        other => panic!("expected service error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_audio_field_is_protocol_error() {
    let fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let _mock = fixture
        .mock_json_response("POST", "/synthesize", 200, r#"{"sample_rate": 44100}"#)
        .await;

    let gateway = HttpGateway::new(&fixture.config(dir.path())).unwrap();
    let err = gateway.synthesize_one(&request("hi", None)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
}

#[tokio::test]
async fn test_malformed_base64_is_protocol_error() {
    let fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let _mock = fixture
        .mock_json_response("POST", "/synthesize", 200, r#"{"audio_base64": "%%% not base64 %%%"}"#)
        .await;

    let gateway = HttpGateway::new(&fixture.config(dir.path())).unwrap();
    let err = gateway.synthesize_one(&request("hi", None)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
}

#[tokio::test]
async fn test_short_batch_response_is_protocol_error() {
    let fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let _mock = fixture.mock_batch(Matcher::Any, &[wav_fixture(1)]).await;

    let gateway = HttpGateway::new(&fixture.config(dir.path())).unwrap();
    let batch = BatchRequest::new(vec![request("one", None), request("two", None)]).unwrap();
    let err = gateway.synthesize_batch(&batch).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert_eq!(
        err.context().and_then(|c| c.field_path.as_deref()),
        Some("results")
    );
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = HttpGateway::new(&test_config("http://127.0.0.1:1", dir.path())).unwrap();

    let err = gateway.synthesize_one(&request("hi", None)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.to_string().contains("127.0.0.1:1"));
}
