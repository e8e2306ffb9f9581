//! Agent tool-invocation surface.
//!
//! [`invoke`] takes a [`ToolInput`] (usually deserialized from a model's tool
//! call), runs it against the service and always answers with a
//! [`ToolResponse`]. Failures become `{"status": "error", ...}` payloads, never
//! a Rust error. [`invoke_json`] does the same for raw JSON arguments, so
//! malformed calls are answered in kind. [`definition`] publishes the matching
//! function-tool schema.

use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::batch::BatchDelivery;
use crate::client::{SupertonicClient, SupertonicClientBuilder};
use crate::delivery::{DeliveryMode, DeliveryOutcome};
use crate::gateway::HealthStatus;
use crate::request::SynthesisOptions;
use crate::validation::validate_knobs;
use crate::{Error, ErrorContext, ErrorKind, Result};

pub const TOOL_NAME: &str = "supertonic_text_to_speech";

const TOOL_DESCRIPTION: &str = "Interfaces with the Supertonic TTS server to perform \
text-to-speech synthesis.\n\n\
Modes:\n\
- health: Checks the status of the TTS server.\n\
- synthesize: Converts a single piece of text into speech. Can save to a file, play back \
directly, or return as base64 data.\n\
- batch_synthesize: Converts multiple pieces of text into speech.";

const NEXT_ACTION: &str =
    "The audio message has been sent to the user. Await the user's next input.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ToolMode {
    Health,
    Synthesize,
    BatchSynthesize,
}

/// Arguments of one tool call.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ToolInput {
    /// The operation to perform.
    pub mode: ToolMode,
    /// The text to synthesize. Required for 'synthesize' mode.
    #[serde(default)]
    pub text: Option<String>,
    /// A list of texts to synthesize. Required for 'batch_synthesize' mode.
    #[serde(default)]
    pub texts: Option<Vec<String>>,
    /// Voice style to use. Common options: 'M1' (deep, authoritative male), 'M2' (lighter,
    /// conversational male), 'F1' (professional, clear female), 'F2' (warm, expressive female).
    #[serde(default)]
    pub voice_style: Option<String>,
    /// A list of voice styles for batch synthesis. Must be the same length as `texts`.
    #[serde(default)]
    pub voice_styles: Option<Vec<String>>,
    /// Synthesis quality (1-20). Higher is better.
    #[serde(default)]
    pub quality: Option<u32>,
    /// Speech speed factor (0.5-2.0). Higher is faster.
    #[serde(default)]
    pub speed: Option<f32>,
    /// Full path to save the output audio file. If not provided for synthesis and playback is
    /// false, audio data is returned as base64.
    #[serde(default)]
    pub save_path: Option<PathBuf>,
    /// Directory to save output files for 'batch_synthesize' mode.
    #[serde(default)]
    pub save_dir: Option<PathBuf>,
    /// If true, synthesizes and plays the audio directly. Playback is non-blocking and takes
    /// time. Sending another playback request will interrupt the current audio, so consolidate
    /// all speech into a single, longer `text` in one tool call.
    #[serde(default)]
    pub playback: bool,
    /// The base URL of the Supertonic TTS server.
    #[serde(default)]
    pub server_url: Option<String>,
    /// Timeout for API requests in seconds.
    #[serde(default)]
    pub request_timeout: Option<u64>,
}

impl ToolInput {
    pub fn new(mode: ToolMode) -> Self {
        Self {
            mode,
            text: None,
            texts: None,
            voice_style: None,
            voice_styles: None,
            quality: None,
            speed: None,
            save_path: None,
            save_dir: None,
            playback: false,
            server_url: None,
            request_timeout: None,
        }
    }

    fn options(&self) -> SynthesisOptions {
        SynthesisOptions {
            voice: self.voice_style.clone(),
            quality: self.quality,
            speed: self.speed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Success,
    Error,
}

/// Result object handed back to the agent runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResponse {
    pub status: ToolStatus,
    #[serde(flatten)]
    pub payload: ToolPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolPayload {
    Health {
        health: HealthStatus,
    },
    Played {
        message: String,
        next_action: String,
    },
    Saved {
        message: String,
        file_path: PathBuf,
    },
    Inline {
        audio_base64: String,
    },
    BatchSaved {
        message: String,
        file_paths: Vec<PathBuf>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        errors: Vec<String>,
    },
    BatchInline {
        audio_base64_list: Vec<String>,
    },
    Error {
        message: String,
        error_kind: String,
    },
}

impl ToolResponse {
    pub fn success(payload: ToolPayload) -> Self {
        Self {
            status: ToolStatus::Success,
            payload,
        }
    }

    pub fn error(err: &Error) -> Self {
        Self::failure(err.kind(), err.to_string())
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::Error,
            payload: ToolPayload::Error {
                message: message.into(),
                error_kind: kind.name().to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ToolStatus::Success
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            json!({
                "status": "error",
                "message": e.to_string(),
                "error_kind": "serialization_error",
            })
        })
    }
}

/// Function-tool definition with a JSON schema generated from [`ToolInput`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: Option<String>,
    pub parameters: Option<serde_json::Value>,
}

pub fn definition() -> ToolDefinition {
    let schema = schemars::schema_for!(ToolInput);
    let parameters = serde_json::to_value(&schema).unwrap_or_else(|_| json!({}));
    ToolDefinition {
        tool_type: "function".to_string(),
        function: FunctionDefinition {
            name: TOOL_NAME.to_string(),
            description: Some(TOOL_DESCRIPTION.to_string()),
            parameters: Some(parameters),
        },
    }
}

/// Run one tool call against a client configured from the environment.
pub async fn invoke(input: ToolInput) -> ToolResponse {
    invoke_with(SupertonicClient::builder(), input).await
}

/// Run one tool call given as raw JSON arguments.
pub async fn invoke_json(args: serde_json::Value) -> ToolResponse {
    invoke_json_with(SupertonicClient::builder(), args).await
}

/// [`invoke_json`] starting from `builder`. Arguments that do not match the
/// schema answer with `invalid_parameter`.
pub async fn invoke_json_with(
    builder: SupertonicClientBuilder,
    args: serde_json::Value,
) -> ToolResponse {
    match serde_json::from_value::<ToolInput>(args) {
        Ok(input) => invoke_with(builder, input).await,
        Err(e) => {
            warn!(error = %e, "tool arguments rejected");
            ToolResponse::error(&Error::invalid_parameter_with_context(
                format!("Invalid tool arguments: {}", e),
                ErrorContext::new().with_field_path("arguments"),
            ))
        }
    }
}

/// Run one tool call, starting from `builder` for everything the input does
/// not set itself.
pub async fn invoke_with(builder: SupertonicClientBuilder, input: ToolInput) -> ToolResponse {
    match run(builder, &input).await {
        Ok(response) => response,
        Err(e) => {
            warn!(mode = ?input.mode, error = %e, "tool call failed");
            ToolResponse::error(&e)
        }
    }
}

async fn run(mut builder: SupertonicClientBuilder, input: &ToolInput) -> Result<ToolResponse> {
    validate_knobs(input.quality, input.speed)?;

    if let Some(url) = input.server_url.as_deref().filter(|u| !u.trim().is_empty()) {
        builder = builder.base_url_override(url);
    }
    if let Some(secs) = input.request_timeout {
        builder = builder.timeout_seconds(secs);
    }
    let client = builder.build()?;

    let response = match input.mode {
        ToolMode::Health => ToolResponse::success(ToolPayload::Health {
            health: client.health().await?,
        }),
        ToolMode::Synthesize => ToolResponse::success(synthesize(&client, input).await?),
        ToolMode::BatchSynthesize => batch_synthesize(&client, input).await?,
    };
    client.close();
    Ok(response)
}

async fn synthesize(client: &SupertonicClient, input: &ToolInput) -> Result<ToolPayload> {
    let text = input
        .text
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| required("text", "synthesize"))?;

    let mode = DeliveryMode::select(input.save_path.clone(), input.playback);
    let payload = match client.synthesize(text, &input.options(), &mode).await? {
        DeliveryOutcome::Played(diagnostic) => ToolPayload::Played {
            message: format!("Synthesis successful. {}", diagnostic),
            next_action: NEXT_ACTION.to_string(),
        },
        DeliveryOutcome::Saved(path) => {
            let format = client.router().codec().format_for(&path);
            ToolPayload::Saved {
                message: format!(
                    "Saved {} audio to {}",
                    format.extension().to_uppercase(),
                    path.display()
                ),
                file_path: path,
            }
        }
        DeliveryOutcome::Returned(audio) => ToolPayload::Inline {
            audio_base64: audio.to_base64(),
        },
    };
    Ok(payload)
}

async fn batch_synthesize(client: &SupertonicClient, input: &ToolInput) -> Result<ToolResponse> {
    let texts = input
        .texts
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| required("texts", "batch_synthesize"))?;

    let delivery = match &input.save_dir {
        Some(dir) => BatchDelivery::Directory(dir.clone()),
        None => BatchDelivery::ReturnInline { format: None },
    };
    let outcome = client
        .batch_synthesize(texts, input.voice_styles.as_deref(), &input.options(), &delivery)
        .await?;

    if let BatchDelivery::Directory(_) = delivery {
        if outcome.success_count() == 0 {
            if let Some((_, first)) = outcome.failures().next() {
                warn!(error = %first, "every batch item failed to save");
                return Ok(ToolResponse::failure(
                    first.kind(),
                    format!(
                        "Batch synthesis failed: all {} items failed to save; first failure: {}",
                        outcome.len(),
                        first
                    ),
                ));
            }
        }
        let file_paths: Vec<PathBuf> = outcome
            .saved_paths()
            .into_iter()
            .map(|p| p.to_path_buf())
            .collect();
        let errors = outcome
            .failures()
            .map(|(i, e)| format!("item {}: {}", i + 1, e))
            .collect();
        return Ok(ToolResponse::success(ToolPayload::BatchSaved {
            message: format!(
                "Batch synthesis complete. Saved {} files.",
                file_paths.len()
            ),
            file_paths,
            errors,
        }));
    }

    let mut audio_base64_list = Vec::with_capacity(outcome.len());
    for item in outcome.items {
        match item? {
            DeliveryOutcome::Returned(audio) => audio_base64_list.push(audio.to_base64()),
            other => {
                return Err(Error::unknown_with_context(
                    format!("inline batch produced {:?}", other),
                    ErrorContext::new().with_source("tool"),
                ))
            }
        }
    }
    Ok(ToolResponse::success(ToolPayload::BatchInline {
        audio_base64_list,
    }))
}

fn required(field: &str, mode: &str) -> Error {
    Error::invalid_parameter_with_context(
        format!("The '{}' parameter is required for '{}' mode.", field, mode),
        ErrorContext::new().with_field_path(field),
    )
}
