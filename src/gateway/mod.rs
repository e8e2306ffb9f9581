//! TTS service gateway: health, single and batch synthesis.
//!
//! [`SynthesisGateway`] is the seam between request orchestration and the
//! network. [`HttpGateway`] is the production implementation; tests substitute
//! counting or scripted gateways.
//!
//! The gateway is the only source of [`Error::Transport`], [`Error::Service`]
//! and [`Error::Protocol`].
//!
//! [`Error::Transport`]: crate::Error::Transport
//! [`Error::Service`]: crate::Error::Service
//! [`Error::Protocol`]: crate::Error::Protocol

mod http;
mod types;

pub use http::HttpGateway;
pub use types::{HealthStatus, SynthesisResult};

use async_trait::async_trait;

use crate::request::{BatchRequest, SynthesisRequest};
use crate::Result;

pub const HEALTH_PATH: &str = "/health";
pub const SYNTHESIZE_PATH: &str = "/synthesize";
pub const BATCH_PATH: &str = "/batch";

#[async_trait]
pub trait SynthesisGateway: Send + Sync {
    async fn health(&self) -> Result<HealthStatus>;

    async fn synthesize_one(&self, request: &SynthesisRequest) -> Result<SynthesisResult>;

    /// Submit the whole batch in one call. `result[i]` answers `request[i]`.
    async fn synthesize_batch(&self, batch: &BatchRequest) -> Result<Vec<SynthesisResult>>;
}
