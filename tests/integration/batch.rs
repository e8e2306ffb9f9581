//! Integration tests for batch synthesis

use std::sync::Arc;

use mockito::Matcher;
use serde_json::json;

use supertonic_client::gateway::SynthesisGateway;
use supertonic_client::{BatchDelivery, ErrorKind, SynthesisOptions};

use crate::mock_server::{dir_entries, wav_fixture, CountingGateway, MockServerFixture};

#[tokio::test]
async fn test_batch_results_keep_input_order() {
    let fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let audios = vec![wav_fixture(10), wav_fixture(20), wav_fixture(30)];
    let mock = fixture
        .mock_batch(
            Matcher::Json(json!({"requests": [
                {"text": "first", "total_step": 5, "speed": 1.0, "voice_style": "F1.json"},
                {"text": "second", "total_step": 5, "speed": 1.0, "voice_style": "M2.json"},
                {"text": "third", "total_step": 5, "speed": 1.0, "voice_style": "M1.json"}
            ]})),
            &audios,
        )
        .await;

    let client = fixture.client(dir.path());
    let out_dir = dir.path().join("batch");
    let outcome = client
        .batch_synthesize(
            &["first", "second", "third"],
            Some(&["F1", "M2.json", ""][..]),
            &SynthesisOptions::new().quality(5).speed(1.0),
            &BatchDelivery::Directory(out_dir.clone()),
        )
        .await
        .unwrap();

    assert!(outcome.all_succeeded());
    for (i, audio) in audios.iter().enumerate() {
        let path = out_dir.join(format!("output_{}.wav", i + 1));
        assert_eq!(outcome.saved_paths()[i], path.as_path());
        assert_eq!(&std::fs::read(&path).unwrap(), audio);
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_mismatched_voice_list_makes_no_calls() {
    let fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let mock = fixture.mock_never_called("POST", "/batch").await;
    let counting = Arc::new(CountingGateway::new(&fixture.config(dir.path())));

    let client = fixture
        .builder(dir.path())
        .gateway(counting.clone() as Arc<dyn SynthesisGateway>)
        .build()
        .unwrap();
    let err = client
        .batch_synthesize(
            &["one", "two", "three"],
            Some(&["F1", "F2"][..]),
            &SynthesisOptions::new(),
            &BatchDelivery::ReturnInline { format: None },
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    assert_eq!(counting.count(), 0);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_batch_is_one_round_trip() {
    let fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let never = fixture.mock_never_called("POST", "/synthesize").await;
    let batch = fixture
        .mock_batch(Matcher::Any, &[wav_fixture(1), wav_fixture(2)])
        .await;
    let counting = Arc::new(CountingGateway::new(&fixture.config(dir.path())));

    let client = fixture
        .builder(dir.path())
        .gateway(counting.clone() as Arc<dyn SynthesisGateway>)
        .build()
        .unwrap();
    let outcome = client
        .batch_synthesize::<_, &str>(
            &["a", "b"],
            None,
            &SynthesisOptions::new(),
            &BatchDelivery::ReturnInline { format: None },
        )
        .await
        .unwrap();

    assert_eq!(outcome.len(), 2);
    assert_eq!(counting.count(), 1);
    never.assert_async().await;
    batch.assert_async().await;
}

#[tokio::test]
async fn test_service_failure_aborts_whole_batch() {
    let fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let _mock = fixture
        .mock_json_response("POST", "/batch", 503, r#"{"detail":"busy"}"#)
        .await;

    let client = fixture.client(dir.path());
    let out_dir = dir.path().join("batch");
    let err = client
        .batch_synthesize::<_, &str>(
            &["a", "b"],
            None,
            &SynthesisOptions::new(),
            &BatchDelivery::Directory(out_dir.clone()),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Service);
    assert!(dir_entries(&out_dir).is_empty());
}

#[tokio::test]
async fn test_item_failure_is_recorded_in_its_slot() {
    let fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let audios = vec![wav_fixture(1), wav_fixture(2)];
    let _mock = fixture.mock_batch(Matcher::Any, &audios).await;

    let client = fixture.client(dir.path());
    let paths = vec![dir.path().join("one.mp3"), dir.path().join("two.wav")];
    let outcome = client
        .batch_synthesize::<_, &str>(
            &["a", "b"],
            None,
            &SynthesisOptions::new(),
            &BatchDelivery::Paths(paths.clone()),
        )
        .await
        .unwrap();

    assert_eq!(outcome.failure_count(), 1);
    assert_eq!(
        outcome.items[0].as_ref().unwrap_err().kind(),
        ErrorKind::CodecUnavailable
    );
    assert_eq!(std::fs::read(&paths[1]).unwrap(), audios[1]);
}
