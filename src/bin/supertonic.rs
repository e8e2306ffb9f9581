//! supertonic: synthesize speech from text with a Supertonic TTS server.
//!
//! Examples:
//!   supertonic "Hello world" -o hello.wav
//!   supertonic "Hello world" -o hello.mp3
//!   supertonic "Test" -v F1 -q 10 -s 1.2 -o test.wav
//!   supertonic "Listen to this" --play
//!   supertonic --health
//!   supertonic "Remote" -u http://192.168.1.100:8765 -o out.mp3

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use clap::Parser;
use dotenv::dotenv;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use supertonic_client::config::{DEFAULT_BASE_URL, DEFAULT_QUALITY, DEFAULT_SPEED, DEFAULT_VOICE};
use supertonic_client::validation::{validate_quality, validate_speed};
use supertonic_client::{
    ConfigOverrides, DeliveryMode, EffectiveConfig, ErrorKind, SupertonicClient, SynthesisOptions,
    SynthesisResult,
};

/// Supertonic TTS client: synthesize speech from text
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Text to synthesize
    #[arg(value_name = "TEXT")]
    text: Option<String>,

    /// Output file path; the extension picks the format (wav, mp3, flac, ...)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(
        short,
        long,
        help = format!(
            "Voice style: M1, M2, F1, F2 (.json extension optional) [default: {}]",
            DEFAULT_VOICE
        )
    )]
    voice: Option<String>,

    #[arg(
        short,
        long,
        help = format!(
            "Quality: denoising steps 1-20, higher=better [default: {}]",
            DEFAULT_QUALITY
        )
    )]
    quality: Option<u32>,

    #[arg(
        short,
        long,
        help = format!("Speech speed 0.5-2.0, higher=faster [default: {}]", DEFAULT_SPEED)
    )]
    speed: Option<f32>,

    #[arg(short = 'u', long = "url", help = format!("Server URL [default: {}]", DEFAULT_BASE_URL))]
    url: Option<String>,

    /// Check server health and exit
    #[arg(long)]
    health: bool,

    /// Play audio immediately after generation
    #[arg(short, long)]
    play: bool,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if args.verbose { "debug" } else { "warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn report(e: &anyhow::Error) {
    match e.downcast_ref::<supertonic_client::Error>() {
        Some(err) if err.kind() == ErrorKind::Transport => {
            eprintln!("Error: {}", err);
            eprintln!("Make sure the Supertonic server is running:");
            eprintln!("  docker-compose up -d");
        }
        _ => eprintln!("Error: {:#}", e),
    }
}

async fn run(args: Args) -> Result<()> {
    let mut overrides = ConfigOverrides::new();
    overrides.base_url = args.url.clone();
    let config = EffectiveConfig::resolve(&overrides);

    let client = SupertonicClient::builder().config(config).build()?;

    if args.health {
        println!("Checking server health...");
        let health = client.health().await?;
        println!("Status: {}", health.status);
        println!("Model loaded: {}", health.model_loaded);
        println!(
            "Default voice: {}",
            health.default_voice.as_deref().unwrap_or("-")
        );
        println!("Available voices: {}", health.available_voices.join(", "));
        client.close();
        return Ok(());
    }

    let Some(text) = args.text.as_deref() else {
        bail!("text is required unless --health is specified");
    };

    let quality = validate_quality(args.quality.unwrap_or(client.config().default_quality))?;
    let speed = validate_speed(args.speed.unwrap_or(client.config().default_speed))?;
    let mut options = SynthesisOptions::new().quality(quality).speed(speed);
    if let Some(voice) = &args.voice {
        options = options.voice(voice);
    }

    let preview: String = text.chars().take(50).collect();
    let ellipsis = if text.chars().count() > 50 { "..." } else { "" };
    println!("Synthesizing: '{}{}'", preview, ellipsis);
    println!(
        "Voice: {}",
        supertonic_client::voice::normalize_label(
            args.voice.as_deref().unwrap_or(&client.config().default_voice)
        )
    );
    println!("Quality: {} steps", quality);
    println!("Speed: {}x", speed);

    let audio = SynthesisResult::from_bytes(client.synthesize_bytes(text, &options).await?);
    let router = client.router();

    let output = match (&args.output, args.play) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => None,
        (None, false) => Some(default_output_path(client.config())),
    };

    if let Some(path) = output {
        router
            .deliver(&audio, &DeliveryMode::Save(path.clone()))
            .with_context(|| format!("saving {}", path.display()))?;
        println!("✓ Saved to: {}", path.display());
    }

    if args.play {
        println!("▶ Playing audio...");
        let handle = router.start_playback(&audio)?;
        debug!(message = handle.message(), "playback scheduled");
        // The process would otherwise exit mid-clip.
        tokio::task::spawn_blocking(move || handle.wait())
            .await
            .context("playback thread")?;
        println!("✓ Playback complete");
    }

    client.close();
    Ok(())
}

/// `<OUTPUT_DIR>/supertonic_<millis>_<short uuid>.<DEFAULT_FORMAT>`
fn default_output_path(config: &EffectiveConfig) -> PathBuf {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let id = uuid::Uuid::new_v4().simple().to_string();
    config.output_dir.join(format!(
        "supertonic_{}_{}.{}",
        millis,
        &id[..8],
        config.default_format
    ))
}
