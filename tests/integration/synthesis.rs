//! Single synthesis through the client facade

use std::sync::Arc;

use serde_json::json;

use supertonic_client::gateway::SynthesisGateway;
use supertonic_client::{DeliveryMode, DeliveryOutcome, ErrorKind, SynthesisOptions};

use crate::mock_server::{dir_entries, wav_fixture, CountingGateway, MockServerFixture};

fn hello_options() -> SynthesisOptions {
    SynthesisOptions::new().voice("F1").quality(10).speed(1.0)
}

#[tokio::test]
async fn test_save_wav_is_byte_identical_to_payload() {
    let fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let audio = wav_fixture(7);
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

    let client = fixture.client(dir.path());
    let dest = dir.path().join("hello.wav");
    let outcome = client
        .synthesize("Hello world", &hello_options(), &DeliveryMode::Save(dest.clone()))
        .await
        .unwrap();

    assert_eq!(outcome, DeliveryOutcome::Saved(dest.clone()));
    assert_eq!(std::fs::read(&dest).unwrap(), audio);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_save_mp3_without_engine_leaves_no_temp_files() {
    let fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let _mock = fixture.mock_synthesize(json!({"text": "Hello world"}), &wav_fixture(7)).await;

    let client = fixture.client(dir.path());
    let dest = dir.path().join("hello.mp3");
    let err = client
        .synthesize("Hello world", &hello_options(), &DeliveryMode::Save(dest.clone()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CodecUnavailable);
    assert!(err.to_string().contains("ffmpeg"));
    assert!(!dest.exists());
    assert!(dir_entries(&dir.path().join("tmp")).is_empty());
}

#[tokio::test]
async fn test_inline_returns_decoded_payload() {
    let fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let audio = wav_fixture(2);
    let _mock = fixture.mock_synthesize(json!({"text": "inline"}), &audio).await;

    let client = fixture.client(dir.path());
    let outcome = client
        .synthesize("inline", &SynthesisOptions::new(), &DeliveryMode::inline())
        .await
        .unwrap();

    assert_eq!(outcome.inline_audio().unwrap().bytes(), audio.as_slice());
}

#[tokio::test]
async fn test_default_voice_is_normalized() {
    let fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let mock = fixture
        .mock_synthesize(
            json!({"voice_style": "M1.json", "total_step": 5}),
            &wav_fixture(1),
        )
        .await;

    let client = fixture.client(dir.path());
    let bytes = client
        .synthesize_bytes("defaults", &SynthesisOptions::new())
        .await
        .unwrap();

    assert_eq!(bytes, wav_fixture(1));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_synthesize_to_file_creates_parent_dirs() {
    let fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let audio = wav_fixture(4);
    let _mock = fixture.mock_synthesize(json!({"text": "nested"}), &audio).await;

    let client = fixture.client(dir.path());
    let dest = dir.path().join("a").join("b").join("nested.wav");
    let saved = client
        .synthesize_to_file("nested", &dest, &SynthesisOptions::new())
        .await
        .unwrap();

    assert_eq!(saved, dest);
    assert_eq!(std::fs::read(&dest).unwrap(), audio);
}

#[tokio::test]
async fn test_play_without_backend_is_playback_unavailable() {
    let fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let _mock = fixture.mock_synthesize(json!({"text": "play"}), &wav_fixture(5)).await;

    let client = fixture.client(dir.path());
    let err = client
        .synthesize("play", &SynthesisOptions::new(), &DeliveryMode::Play)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PlaybackUnavailable);
    assert!(dir_entries(&dir.path().join("tmp")).is_empty());
}

#[tokio::test]
async fn test_blank_text_never_reaches_the_service() {
    let fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let mock = fixture.mock_never_called("POST", "/synthesize").await;
    let counting = Arc::new(CountingGateway::new(&fixture.config(dir.path())));

    let client = fixture
        .builder(dir.path())
        .gateway(counting.clone() as Arc<dyn SynthesisGateway>)
        .build()
        .unwrap();
    let err = client
        .synthesize("   ", &SynthesisOptions::new(), &DeliveryMode::inline())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    assert_eq!(counting.count(), 0);
    mock.assert_async().await;
}
