//! Agent tool surface against the mock server

use mockito::Matcher;
use serde_json::json;

use supertonic_client::tool::{invoke_json_with, invoke_with, ToolInput, ToolMode};
use supertonic_client::{EffectiveConfig, SupertonicClient};

use crate::mock_server::{encode, wav_fixture, MockServerFixture};

#[tokio::test]
async fn test_health_mode() {
    let fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let _mock = fixture
        .mock_health(json!({"status": "healthy", "model_loaded": true}))
        .await;

    let response = invoke_with(fixture.builder(dir.path()), ToolInput::new(ToolMode::Health)).await;
    let value = response.to_json();

    assert_eq!(value["status"], "success");
    assert_eq!(value["health"]["status"], "healthy");
    assert_eq!(value["health"]["model_loaded"], true);
}

#[tokio::test]
async fn test_synthesize_inline_returns_base64() {
    let fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let audio = wav_fixture(9);
    let _mock = fixture
        .mock_synthesize(json!({"text": "hi", "voice_style": "F2.json"}), &audio)
        .await;

    let mut input = ToolInput::new(ToolMode::Synthesize);
    input.text = Some("hi".into());
    input.voice_style = Some("F2".into());

    let value = invoke_with(fixture.builder(dir.path()), input).await.to_json();
    assert_eq!(
        value,
        json!({"status": "success", "audio_base64": encode(&audio)})
    );
}

#[tokio::test]
async fn test_synthesize_save_reports_path() {
    let fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let audio = wav_fixture(9);
    let _mock = fixture.mock_synthesize(json!({"text": "save me"}), &audio).await;
    let dest = dir.path().join("voice").join("reply.wav");

    let mut input = ToolInput::new(ToolMode::Synthesize);
    input.text = Some("save me".into());
    input.save_path = Some(dest.clone());

    let value = invoke_with(fixture.builder(dir.path()), input).await.to_json();
    assert_eq!(value["status"], "success");
    assert_eq!(value["file_path"], dest.display().to_string());
    assert!(value["message"].as_str().unwrap().starts_with("Saved WAV audio to"));
    assert_eq!(std::fs::read(&dest).unwrap(), audio);
}

#[tokio::test]
async fn test_batch_to_directory() {
    let fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let _mock = fixture
        .mock_batch(Matcher::Any, &[wav_fixture(1), wav_fixture(2)])
        .await;
    let save_dir = dir.path().join("out");

    let mut input = ToolInput::new(ToolMode::BatchSynthesize);
    input.texts = Some(vec!["one".into(), "two".into()]);
    input.save_dir = Some(save_dir.clone());

    let value = invoke_with(fixture.builder(dir.path()), input).await.to_json();
    assert_eq!(value["status"], "success");
    assert_eq!(value["message"], "Batch synthesis complete. Saved 2 files.");
    assert_eq!(
        value["file_paths"],
        json!([
            save_dir.join("output_1.wav").display().to_string(),
            save_dir.join("output_2.wav").display().to_string()
        ])
    );
}

#[tokio::test]
async fn test_batch_with_every_save_failing_keeps_the_failure_kind() {
    let fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let _mock = fixture
        .mock_batch(Matcher::Any, &[wav_fixture(1), wav_fixture(2)])
        .await;
    let save_dir = dir.path().join("out");
    let builder = SupertonicClient::builder()
        .config(EffectiveConfig {
            default_format: "mp3".into(),
            ..fixture.config(dir.path())
        })
        .transcoder(None)
        .playback(None);

    let mut input = ToolInput::new(ToolMode::BatchSynthesize);
    input.texts = Some(vec!["one".into(), "two".into()]);
    input.save_dir = Some(save_dir.clone());

    let value = invoke_with(builder, input).await.to_json();
    assert_eq!(value["status"], "error");
    assert_eq!(value["error_kind"], "codec_unavailable");
    assert!(value["message"]
        .as_str()
        .unwrap()
        .starts_with("Batch synthesis failed: all 2 items failed to save"));
    assert!(!save_dir.join("output_1.mp3").exists());
}

#[tokio::test]
async fn test_raw_arguments_reach_the_server() {
    let fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let _mock = fixture
        .mock_health(json!({"status": "healthy", "model_loaded": true}))
        .await;

    let response = invoke_json_with(fixture.builder(dir.path()), json!({"mode": "health"})).await;
    assert!(response.is_success());
}

#[tokio::test]
async fn test_batch_inline_list() {
    let fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let audios = [wav_fixture(1), wav_fixture(2)];
    let _mock = fixture.mock_batch(Matcher::Any, &audios).await;

    let mut input = ToolInput::new(ToolMode::BatchSynthesize);
    input.texts = Some(vec!["one".into(), "two".into()]);

    let value = invoke_with(fixture.builder(dir.path()), input).await.to_json();
    assert_eq!(
        value,
        json!({"status": "success", "audio_base64_list": [encode(&audios[0]), encode(&audios[1])]})
    );
}

#[tokio::test]
async fn test_mismatched_batch_is_error_without_request() {
    let fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let mock = fixture.mock_never_called("POST", "/batch").await;

    let mut input = ToolInput::new(ToolMode::BatchSynthesize);
    input.texts = Some(vec!["one".into(), "two".into()]);
    input.voice_styles = Some(vec!["F1".into()]);

    let value = invoke_with(fixture.builder(dir.path()), input).await.to_json();
    assert_eq!(value["status"], "error");
    assert_eq!(value["error_kind"], "invalid_parameter");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_url_from_input_wins() {
    let fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();

    let mut input = ToolInput::new(ToolMode::Health);
    input.server_url = Some("http://127.0.0.1:1/".into());

    let value = invoke_with(fixture.builder(dir.path()), input).await.to_json();
    assert_eq!(value["status"], "error");
    assert_eq!(value["error_kind"], "transport_error");
    assert!(value["message"].as_str().unwrap().contains("127.0.0.1:1"));
}
