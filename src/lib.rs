//! # supertonic-client
//!
//! Client for a Supertonic text-to-speech HTTP service: resolves layered
//! configuration, sends single and batched synthesis requests, and delivers the
//! returned audio as a file, local playback, or inline bytes.
//!
//! ## Overview
//!
//! A call flows through a fixed pipeline:
//!
//! 1. [`config`] merges per-call overrides, the environment and built-in defaults.
//! 2. [`request`] builds wire requests, normalizing voices via [`voice`].
//! 3. [`gateway`] talks to the service over one HTTP session.
//! 4. [`codec`] passes WAV through or transcodes to compressed formats.
//! 5. [`delivery`] hands the audio to exactly one sink.
//!
//! Batches go through [`batch`], which submits one request for the whole list
//! and delivers the results index by index.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use supertonic_client::{DeliveryMode, SupertonicClient, SynthesisOptions};
//!
//! #[tokio::main]
//! async fn main() -> supertonic_client::Result<()> {
//!     let client = SupertonicClient::new()?;
//!
//!     let options = SynthesisOptions::new().voice("F1").quality(10).speed(1.0);
//!     let outcome = client
//!         .synthesize("Hello world", &options, &DeliveryMode::Save("hello.mp3".into()))
//!         .await?;
//!     println!("{:?}", outcome);
//!
//!     client.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Effective configuration and environment keys |
//! | [`voice`] | Voice identifier normalization |
//! | [`request`] | Single and batch request construction |
//! | [`validation`] | Caller-facing range checks for quality and speed |
//! | [`gateway`] | HTTP gateway to the TTS service |
//! | [`codec`] | Audio formats, WAV framing and transcoding |
//! | [`playback`] | Local playback backends |
//! | [`delivery`] | Save / play / return-inline routing |
//! | [`batch`] | Batch orchestration |
//! | [`client`] | Client facade and builder |
//! | [`tool`] | Agent tool-invocation surface |

pub mod batch;
pub mod client;
pub mod codec;
pub mod config;
pub mod delivery;
pub mod gateway;
pub mod playback;
pub mod request;
pub mod tool;
pub mod utils;
pub mod validation;
pub mod voice;

// Re-export main types for convenience
pub use batch::{BatchDelivery, BatchOutcome};
pub use client::{SupertonicClient, SupertonicClientBuilder};
pub use codec::AudioFormat;
pub use config::{ConfigOverrides, EffectiveConfig};
pub use delivery::{DeliveryMode, DeliveryOutcome, InlineAudio};
pub use gateway::{HealthStatus, SynthesisGateway, SynthesisResult};
pub use request::{BatchRequest, SynthesisOptions, SynthesisRequest};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext, ErrorKind};
