//! Mock HTTP server setup for integration tests

use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::json;
use tokio::sync::Mutex;

use supertonic_client::gateway::{HttpGateway, SynthesisGateway};
use supertonic_client::{
    BatchRequest, EffectiveConfig, HealthStatus, SupertonicClient, SupertonicClientBuilder,
    SynthesisRequest, SynthesisResult,
};

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: Arc<Mutex<ServerGuard>>,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self {
            server: Arc::new(Mutex::new(server)),
            base_url,
        }
    }

    /// Config pointed at the mock server with all scratch and output under `dir`.
    pub fn config(&self, dir: &Path) -> EffectiveConfig {
        test_config(&self.base_url, dir)
    }

    /// Client builder with no transcoding engine and no playback backend.
    pub fn builder(&self, dir: &Path) -> SupertonicClientBuilder {
        SupertonicClient::builder()
            .config(self.config(dir))
            .transcoder(None)
            .playback(None)
    }

    pub fn client(&self, dir: &Path) -> SupertonicClient {
        self.builder(dir).build().unwrap()
    }

    pub async fn mock_health(&self, body: serde_json::Value) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("GET", "/health")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    /// `/synthesize` answering with `audio` whenever the body contains `expected`.
    pub async fn mock_synthesize(&self, expected: serde_json::Value, audio: &[u8]) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", "/synthesize")
            .match_body(Matcher::PartialJson(expected))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "audio_base64": encode(audio) }).to_string())
            .create_async()
            .await
    }

    /// `/batch` answering with one result per entry of `audios`, in order.
    pub async fn mock_batch(&self, body: Matcher, audios: &[Vec<u8>]) -> Mock {
        let results: Vec<_> = audios
            .iter()
            .map(|a| json!({ "audio_base64": encode(a) }))
            .collect();
        let mut server = self.server.lock().await;
        server
            .mock("POST", "/batch")
            .match_body(body)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "results": results }).to_string())
            .create_async()
            .await
    }

    pub async fn mock_json_response(
        &self,
        method: &str,
        path: &str,
        status: usize,
        body: &str,
    ) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock(method, path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// A route that must never be hit.
    pub async fn mock_never_called(&self, method: &str, path: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock(method, path)
            .with_status(500)
            .expect(0)
            .create_async()
            .await
    }
}

pub fn test_config(base_url: &str, dir: &Path) -> EffectiveConfig {
    std::fs::create_dir_all(dir.join("output")).unwrap();
    std::fs::create_dir_all(dir.join("tmp")).unwrap();
    EffectiveConfig {
        base_url: base_url.to_string(),
        timeout_seconds: 5,
        output_dir: dir.join("output"),
        temp_dir: Some(dir.join("tmp")),
        ..EffectiveConfig::default()
    }
}

pub fn encode(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// A short mono PCM16 WAV whose samples depend on `seed`.
pub fn wav_fixture(seed: i16) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 44_100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..64i16 {
            writer.write_sample(seed.wrapping_mul(31).wrapping_add(i)).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

pub fn dir_entries(dir: &Path) -> Vec<std::path::PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

/// Forwards to an [`HttpGateway`] and counts every call.
pub struct CountingGateway {
    inner: HttpGateway,
    pub calls: AtomicUsize,
}

impl CountingGateway {
    pub fn new(config: &EffectiveConfig) -> Self {
        Self {
            inner: HttpGateway::new(config).unwrap(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SynthesisGateway for CountingGateway {
    async fn health(&self) -> supertonic_client::Result<HealthStatus> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.health().await
    }

    async fn synthesize_one(
        &self,
        request: &SynthesisRequest,
    ) -> supertonic_client::Result<SynthesisResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.synthesize_one(request).await
    }

    async fn synthesize_batch(
        &self,
        batch: &BatchRequest,
    ) -> supertonic_client::Result<Vec<SynthesisResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.synthesize_batch(batch).await
    }
}
