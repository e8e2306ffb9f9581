use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path that caused the error (e.g., "texts[1]", "results[2].audio_base64")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected length, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "request_builder", "gateway")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the Supertonic client.
///
/// Each variant is one class of failure; callers branch on the variant (or on
/// [`ErrorKind`]) instead of parsing messages.
#[derive(Debug, Error)]
pub enum Error {
    /// Input rejected before any network call (empty text, misaligned batch lists).
    #[error("Invalid parameter: {message}{}", format_context(.context))]
    InvalidParameter {
        message: String,
        context: ErrorContext,
    },

    /// Host unreachable or the request timed out.
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Host reachable but the service answered with a non-success status.
    #[error("Service error: HTTP {status}: {body}")]
    Service { status: u16, body: String },

    /// Success status but the response body is missing fields or malformed.
    #[error("Protocol error: {message}{}", format_context(.context))]
    Protocol {
        message: String,
        context: ErrorContext,
    },

    /// The target format needs a transcoding capability that is not present.
    #[error("Codec unavailable for '{format}': {message}")]
    CodecUnavailable { format: String, message: String },

    /// The transcoding engine ran but did not produce the target file.
    #[error("Transcoding to '{format}' failed: {message}")]
    Transcode { format: String, message: String },

    /// No usable local audio output backend.
    #[error("Playback unavailable: {message}")]
    PlaybackUnavailable { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown error: {message}{}", format_context(.context))]
    Unknown {
        message: String,
        context: ErrorContext,
    },
}

/// Stable, machine-readable name for each error class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidParameter,
    Transport,
    Service,
    Protocol,
    CodecUnavailable,
    Transcode,
    PlaybackUnavailable,
    Io,
    Serialization,
    Unknown,
}

impl ErrorKind {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvalidParameter => "invalid_parameter",
            Self::Transport => "transport_error",
            Self::Service => "service_error",
            Self::Protocol => "protocol_error",
            Self::CodecUnavailable => "codec_unavailable",
            Self::Transcode => "transcode_error",
            Self::PlaybackUnavailable => "playback_unavailable",
            Self::Io => "io_error",
            Self::Serialization => "serialization_error",
            Self::Unknown => "unknown",
        }
    }

    /// Whether the failure happened before anything was sent to the service.
    #[inline]
    pub fn is_pre_network(&self) -> bool {
        matches!(self, Self::InvalidParameter)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Error::InvalidParameter {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a new invalid-parameter error with structured context
    pub fn invalid_parameter_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::InvalidParameter {
            message: msg.into(),
            context,
        }
    }

    /// Create a new protocol error with structured context
    pub fn protocol_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Protocol {
            message: msg.into(),
            context,
        }
    }

    pub fn transport(msg: impl Into<String>, source: Option<reqwest::Error>) -> Self {
        Error::Transport {
            message: msg.into(),
            source,
        }
    }

    pub fn codec_unavailable(format: impl Into<String>, msg: impl Into<String>) -> Self {
        Error::CodecUnavailable {
            format: format.into(),
            message: msg.into(),
        }
    }

    pub fn playback_unavailable(msg: impl Into<String>) -> Self {
        Error::PlaybackUnavailable {
            message: msg.into(),
        }
    }

    /// Create a new unknown error with structured context
    pub fn unknown_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Unknown {
            message: msg.into(),
            context,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            Error::Transport { .. } => ErrorKind::Transport,
            Error::Service { .. } => ErrorKind::Service,
            Error::Protocol { .. } => ErrorKind::Protocol,
            Error::CodecUnavailable { .. } => ErrorKind::CodecUnavailable,
            Error::Transcode { .. } => ErrorKind::Transcode,
            Error::PlaybackUnavailable { .. } => ErrorKind::PlaybackUnavailable,
            Error::Io(_) => ErrorKind::Io,
            Error::Serialization(_) => ErrorKind::Serialization,
            Error::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::InvalidParameter { context, .. }
            | Error::Protocol { context, .. }
            | Error::Unknown { context, .. } => Some(context),
            _ => None,
        }
    }
}
